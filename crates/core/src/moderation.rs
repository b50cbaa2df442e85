//! Moderation actions and status buckets.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::models::{Clip, Identified, Sound};
use crate::status::{ClipStatus, SoundStatus, TransactionStatus};
use crate::types::DbId;

/// Bulk action applied to a selection of rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchAction {
    Approve,
    Reject,
    Delete,
    Feature,
    Unfeature,
    Refund,
}

impl BatchAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            BatchAction::Approve => "approve",
            BatchAction::Reject => "reject",
            BatchAction::Delete => "delete",
            BatchAction::Feature => "feature",
            BatchAction::Unfeature => "unfeature",
            BatchAction::Refund => "refund",
        }
    }

    /// Destructive actions need an explicit confirmation first.
    pub fn is_destructive(&self) -> bool {
        matches!(
            self,
            BatchAction::Reject | BatchAction::Delete | BatchAction::Refund
        )
    }

    /// Reject needs a reason attached to the request.
    pub fn needs_reason(&self) -> bool {
        matches!(self, BatchAction::Reject)
    }

    /// Clip status the server moves an item to, for status-changing actions.
    pub fn resulting_clip_status(&self) -> Option<ClipStatus> {
        match self {
            BatchAction::Approve => Some(ClipStatus::Published),
            BatchAction::Reject => Some(ClipStatus::Rejected),
            _ => None,
        }
    }

    pub fn resulting_transaction_status(&self) -> Option<TransactionStatus> {
        match self {
            BatchAction::Approve => Some(TransactionStatus::Completed),
            BatchAction::Reject => Some(TransactionStatus::Failed),
            BatchAction::Refund => Some(TransactionStatus::Refunded),
            _ => None,
        }
    }
}

/// Items grouped by status, preserving list order inside each bucket.
pub fn sound_buckets(sounds: &[Sound]) -> BTreeMap<&'static str, Vec<DbId>> {
    let mut buckets: BTreeMap<&'static str, Vec<DbId>> = SoundStatus::ALL
        .iter()
        .map(|s| (s.as_str(), Vec::new()))
        .collect();
    for sound in sounds {
        buckets
            .entry(sound.status.as_str())
            .or_default()
            .push(sound.id());
    }
    buckets
}

/// Count clips per status for the moderation tabs.
pub fn clip_counts(clips: &[Clip]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for clip in clips {
        *counts.entry(clip.status.as_str()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn destructive_actions() {
        assert!(BatchAction::Delete.is_destructive());
        assert!(BatchAction::Reject.is_destructive());
        assert!(BatchAction::Refund.is_destructive());
        assert!(!BatchAction::Approve.is_destructive());
        assert!(!BatchAction::Feature.is_destructive());
    }

    #[test]
    fn buckets_include_empty_statuses() {
        let sounds: Vec<Sound> = serde_json::from_value(serde_json::json!([
            {"id": 1, "title": "a", "status": "pending"},
            {"id": 2, "title": "b", "status": "rejected"},
            {"id": 3, "title": "c", "status": "pending"}
        ]))
        .unwrap();
        let buckets = sound_buckets(&sounds);
        assert_eq!(buckets["pending"], vec![1, 3]);
        assert_eq!(buckets["rejected"], vec![2]);
        assert!(buckets["approved"].is_empty());
        assert!(buckets["published"].is_empty());
    }
}
