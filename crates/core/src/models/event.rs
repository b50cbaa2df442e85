//! Event and competition models.

use serde::{Deserialize, Serialize};

use super::{de_amount, de_opt_amount, Identified};
use crate::status::CompetitionStatus;
use crate::types::{DbId, Timestamp};

/// A scheduled event (concert, showcase) with optional paid entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub venue: Option<String>,
    pub starts_at: Timestamp,
    #[serde(default)]
    pub ends_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub price: Option<f64>,
    #[serde(default)]
    pub is_free: bool,
    /// `None` means unlimited seats.
    #[serde(default)]
    pub capacity: Option<u32>,
    #[serde(default)]
    pub registered_count: u32,
}

impl Event {
    /// Seats still available, `None` when the event has no capacity cap.
    pub fn remaining_capacity(&self) -> Option<u32> {
        self.capacity
            .map(|cap| cap.saturating_sub(self.registered_count))
    }

    pub fn is_full(&self) -> bool {
        self.remaining_capacity() == Some(0)
    }

    /// An event is over once its end (or start, when no end is set) has passed.
    pub fn has_ended(&self, now: Timestamp) -> bool {
        self.ends_at.unwrap_or(self.starts_at) < now
    }

    pub fn accepts_registration(&self, now: Timestamp) -> bool {
        !self.is_full() && !self.has_ended(now)
    }
}

impl Identified for Event {
    fn id(&self) -> DbId {
        self.id
    }
}

/// A music competition with an entry fee and a participant cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    pub id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: CompetitionStatus,
    pub starts_at: Timestamp,
    #[serde(default)]
    pub ends_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "de_amount")]
    pub entry_fee: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub prize_pool: f64,
    #[serde(default)]
    pub max_participants: Option<u32>,
    #[serde(default)]
    pub participants_count: u32,
}

impl Competition {
    pub fn spots_left(&self) -> Option<u32> {
        self.max_participants
            .map(|max| max.saturating_sub(self.participants_count))
    }

    /// Registration needs an open competition with spots left.
    pub fn accepts_participants(&self) -> bool {
        self.status == CompetitionStatus::Open && self.spots_left() != Some(0)
    }
}

impl Identified for Competition {
    fn id(&self) -> DbId {
        self.id
    }
}
