mod common;

use std::sync::Arc;

use assert_matches::assert_matches;

use sonique_app::likes::{LikeController, LikeSource, LikeTarget};
use sonique_app::loader::{FilteredList, ListSource};
use sonique_app::toast::ToastKind;
use sonique_app::AppError;
use sonique_client::ApiError;
use sonique_core::envelope::Page;
use sonique_core::filter::FilterState;
use sonique_core::likes::{LikeToggle, Likeable};
use sonique_core::models::{Clip, Sound};
use sonique_core::session::BearerToken;
use sonique_core::types::DbId;

use common::{anon_ctx, clip, page, sound, user_ctx, Calls};

struct ThreeSounds;

impl ListSource<Sound> for ThreeSounds {
    async fn fetch(&self, _filter: &FilterState, _token: Option<&BearerToken>) -> Result<Page<Sound>, ApiError> {
        Ok(page(vec![sound(1), sound(2), sound(3)], 1, 1))
    }
}

/// Answers every toggle with "liked, 42 likes".
#[derive(Default)]
struct FixedLikes {
    calls: Calls,
}

impl LikeSource for FixedLikes {
    async fn toggle_like(&self, _token: &BearerToken, target: LikeTarget, id: DbId) -> Result<LikeToggle, ApiError> {
        self.calls.record(format!("{target:?}:{id}"));
        Ok(LikeToggle {
            is_liked: true,
            likes_count: 42,
        })
    }
}

#[tokio::test]
async fn anonymous_like_is_refused_without_request() {
    let ctx = anon_ctx();
    let list = FilteredList::new(ThreeSounds, ctx.clone());
    list.reload().await.unwrap();
    let before = list.items().await;

    let source = Arc::new(FixedLikes::default());
    let likes = LikeController::new(ctx.clone(), Arc::clone(&source));

    assert_matches!(likes.toggle(&list, 2).await, Err(AppError::LoginRequired));
    assert!(source.calls.is_empty());
    assert_eq!(ctx.toasts.count(ToastKind::LoginRequired).await, 1);
    assert_eq!(list.items().await, before);
}

#[tokio::test]
async fn toggle_applies_server_state_to_target_only() {
    let ctx = user_ctx();
    let list = FilteredList::new(ThreeSounds, ctx.clone());
    list.reload().await.unwrap();
    let before = list.items().await;

    let source = Arc::new(FixedLikes::default());
    let likes = LikeController::new(ctx, Arc::clone(&source));
    likes.seed(&before).await;

    let state = likes.toggle(&list, 2).await.unwrap();
    assert_eq!(state.likes_count, 42);
    assert_eq!(source.calls.all(), vec!["Sound:2"]);

    let after = list.items().await;
    assert_eq!(after[0], before[0]);
    assert_eq!(after[2], before[2]);
    assert_eq!(
        after[1].like_state(),
        LikeToggle {
            is_liked: true,
            likes_count: 42
        }
    );
    assert!(likes.is_liked(2).await);
    assert_eq!(likes.liked_count().await, 1);
}

struct TwoClips;

impl ListSource<Clip> for TwoClips {
    async fn fetch(&self, _filter: &FilterState, _token: Option<&BearerToken>) -> Result<Page<Clip>, ApiError> {
        Ok(page(vec![clip(1, "published"), clip(2, "published")], 1, 1))
    }
}

#[tokio::test]
async fn clip_list_toggles_through_the_clip_endpoint() {
    let ctx = user_ctx();
    let list = FilteredList::new(TwoClips, ctx.clone());
    list.reload().await.unwrap();

    let source = Arc::new(FixedLikes::default());
    let likes = LikeController::new(ctx, Arc::clone(&source));
    likes.toggle(&list, 1).await.unwrap();

    assert_eq!(source.calls.all(), vec!["Clip:1"]);
    assert!(list.find(1).await.unwrap().is_liked);
    assert!(!list.find(2).await.unwrap().is_liked);
}

#[tokio::test]
async fn unlisted_toggle_only_tracks_the_liked_id() {
    let source = Arc::new(FixedLikes::default());
    let likes: LikeController<Sound, _> = LikeController::new(user_ctx(), Arc::clone(&source));

    likes.toggle_unlisted(9).await.unwrap();
    assert_eq!(source.calls.all(), vec!["Sound:9"]);
    assert!(likes.is_liked(9).await);
}
