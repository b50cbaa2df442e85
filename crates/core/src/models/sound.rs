//! Catalog sound model.

use serde::{Deserialize, Serialize};

use super::category::CategoryRef;
use super::{de_opt_amount, Identified};
use crate::status::SoundStatus;
use crate::types::{DbId, Timestamp};

/// A sound as returned by catalog and moderation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sound {
    pub id: DbId,
    pub title: String,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_free: bool,
    #[serde(default = "published")]
    pub status: SoundStatus,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub plays_count: u64,
    #[serde(default)]
    pub likes_count: u64,
    #[serde(default)]
    pub downloads_count: u64,
    #[serde(default)]
    pub is_liked: bool,
    #[serde(default)]
    pub cover_url: Option<String>,
    #[serde(default)]
    pub audio_url: Option<String>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

fn published() -> SoundStatus {
    SoundStatus::Published
}

impl Sound {
    /// Paid sounds need a purchase before download; free ones do not.
    pub fn requires_purchase(&self) -> bool {
        !self.is_free && self.price.is_some_and(|p| p > 0.0)
    }

    /// Price shown on cards: "Gratuit" or the amount in XAF.
    pub fn price_label(&self) -> String {
        match self.price {
            Some(p) if !self.is_free && p > 0.0 => format!("{p:.0} XAF"),
            _ => "Gratuit".to_string(),
        }
    }
}

impl Identified for Sound {
    fn id(&self) -> DbId {
        self.id
    }
}
