//! Video clip model.

use serde::{Deserialize, Serialize};

use super::Identified;
use crate::status::ClipStatus;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipAuthor {
    pub id: DbId,
    pub name: String,
}

/// A clip as listed by the public feed and the admin moderation page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: DbId,
    pub title: String,
    #[serde(default)]
    pub user: Option<ClipAuthor>,
    pub status: ClipStatus,
    #[serde(default)]
    pub views_count: u64,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub comments_count: u64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Identified for Clip {
    fn id(&self) -> DbId {
        self.id
    }
}
