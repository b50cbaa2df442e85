//! Entity status unions and their display configuration.
//!
//! Each status enum maps exhaustively onto a [`Badge`] so that adding a
//! status is a compile error until every view knows how to render it.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Badge
// ---------------------------------------------------------------------------

/// Colour family a badge is rendered with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Neutral,
    Info,
    Success,
    Warning,
    Danger,
}

/// Render configuration for a status value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: &'static str,
    pub tone: Tone,
}

impl Badge {
    const fn new(label: &'static str, tone: Tone) -> Self {
        Self { label, tone }
    }
}

/// Implemented by every status enum that is shown as a badge.
pub trait StatusBadge {
    fn badge(&self) -> Badge;
}

// ---------------------------------------------------------------------------
// Sound
// ---------------------------------------------------------------------------

/// Moderation lifecycle of an uploaded sound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoundStatus {
    Pending,
    Approved,
    Rejected,
    Published,
}

impl SoundStatus {
    pub const ALL: [SoundStatus; 4] = [
        SoundStatus::Pending,
        SoundStatus::Approved,
        SoundStatus::Rejected,
        SoundStatus::Published,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SoundStatus::Pending => "pending",
            SoundStatus::Approved => "approved",
            SoundStatus::Rejected => "rejected",
            SoundStatus::Published => "published",
        }
    }

    /// Whether a moderator can still approve or reject the sound.
    pub fn is_moderatable(&self) -> bool {
        matches!(self, SoundStatus::Pending)
    }
}

impl StatusBadge for SoundStatus {
    fn badge(&self) -> Badge {
        match self {
            SoundStatus::Pending => Badge::new("En attente", Tone::Warning),
            SoundStatus::Approved => Badge::new("Approuvé", Tone::Info),
            SoundStatus::Rejected => Badge::new("Rejeté", Tone::Danger),
            SoundStatus::Published => Badge::new("Publié", Tone::Success),
        }
    }
}

// ---------------------------------------------------------------------------
// Clip
// ---------------------------------------------------------------------------

/// Publication lifecycle of a video clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClipStatus {
    Draft,
    Pending,
    Published,
    Rejected,
}

impl ClipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClipStatus::Draft => "draft",
            ClipStatus::Pending => "pending",
            ClipStatus::Published => "published",
            ClipStatus::Rejected => "rejected",
        }
    }

    pub fn is_moderatable(&self) -> bool {
        matches!(self, ClipStatus::Pending)
    }
}

impl StatusBadge for ClipStatus {
    fn badge(&self) -> Badge {
        match self {
            ClipStatus::Draft => Badge::new("Brouillon", Tone::Neutral),
            ClipStatus::Pending => Badge::new("En attente", Tone::Warning),
            ClipStatus::Published => Badge::new("Publié", Tone::Success),
            ClipStatus::Rejected => Badge::new("Rejeté", Tone::Danger),
        }
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// Settlement state of a payment transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Refunded => "refunded",
        }
    }

    /// Only completed transactions can be refunded.
    pub fn is_refundable(&self) -> bool {
        matches!(self, TransactionStatus::Completed)
    }
}

impl StatusBadge for TransactionStatus {
    fn badge(&self) -> Badge {
        match self {
            TransactionStatus::Pending => Badge::new("En attente", Tone::Warning),
            TransactionStatus::Completed => Badge::new("Complété", Tone::Success),
            TransactionStatus::Failed => Badge::new("Échoué", Tone::Danger),
            TransactionStatus::Refunded => Badge::new("Remboursé", Tone::Neutral),
        }
    }
}

// ---------------------------------------------------------------------------
// Competition
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitionStatus {
    Upcoming,
    Open,
    Closed,
    Finished,
}

impl StatusBadge for CompetitionStatus {
    fn badge(&self) -> Badge {
        match self {
            CompetitionStatus::Upcoming => Badge::new("À venir", Tone::Info),
            CompetitionStatus::Open => Badge::new("Inscriptions ouvertes", Tone::Success),
            CompetitionStatus::Closed => Badge::new("Inscriptions closes", Tone::Warning),
            CompetitionStatus::Finished => Badge::new("Terminé", Tone::Neutral),
        }
    }
}
