//! Like/favorite reconciliation.
//!
//! The server is the only source of truth for like state: views never
//! bump counters themselves, they apply the `{is_liked, likes_count}` pair
//! the toggle endpoint returns to the one item it concerns.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::{Clip, Identified, Sound};
use crate::types::DbId;

/// Body of a successful `POST .../like`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LikeToggle {
    pub is_liked: bool,
    pub likes_count: u64,
}

/// Which toggle endpoint an item's likes go through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LikeTarget {
    Sound,
    Clip,
}

/// Items that carry a like flag and counter.
pub trait Likeable: Identified {
    const TARGET: LikeTarget;

    fn set_like_state(&mut self, state: LikeToggle);
    fn like_state(&self) -> LikeToggle;
}

impl Likeable for Sound {
    const TARGET: LikeTarget = LikeTarget::Sound;

    fn set_like_state(&mut self, state: LikeToggle) {
        self.is_liked = state.is_liked;
        self.likes_count = state.likes_count;
    }

    fn like_state(&self) -> LikeToggle {
        LikeToggle {
            is_liked: self.is_liked,
            likes_count: self.likes_count,
        }
    }
}

impl Likeable for Clip {
    const TARGET: LikeTarget = LikeTarget::Clip;

    fn set_like_state(&mut self, state: LikeToggle) {
        self.is_liked = state.is_liked;
        self.likes_count = state.likes_count;
    }

    fn like_state(&self) -> LikeToggle {
        LikeToggle {
            is_liked: self.is_liked,
            likes_count: self.likes_count,
        }
    }
}

/// Apply server truth for `id` to a list. Returns `true` if the item was
/// found. Siblings are left untouched.
pub fn apply_like<T: Likeable>(items: &mut [T], id: DbId, state: LikeToggle) -> bool {
    match items.iter_mut().find(|item| item.id() == id) {
        Some(item) => {
            item.set_like_state(state);
            true
        }
        None => false,
    }
}

/// Ids the current user has liked among the visible items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LikedSet(HashSet<DbId>);

impl LikedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a freshly loaded list.
    pub fn from_items<T: Likeable>(items: &[T]) -> Self {
        Self(
            items
                .iter()
                .filter(|item| item.like_state().is_liked)
                .map(Identified::id)
                .collect(),
        )
    }

    pub fn contains(&self, id: DbId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Reconcile one id with a toggle response.
    pub fn reconcile(&mut self, id: DbId, state: LikeToggle) {
        if state.is_liked {
            self.0.insert(id);
        } else {
            self.0.remove(&id);
        }
    }
}
