//! Sound certification models (gold/platinum style milestones).
//!
//! Thresholds are decided server-side; the client only renders them.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// Output format of a certificate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CertificateFormat {
    Web,
    Pdf,
}

impl CertificateFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            CertificateFormat::Web => "web",
            CertificateFormat::Pdf => "pdf",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CertificationStats {
    #[serde(default)]
    pub total_certified: u64,
    #[serde(default)]
    pub gold: u64,
    #[serde(default)]
    pub platinum: u64,
    #[serde(default)]
    pub diamond: u64,
    #[serde(default)]
    pub pending_review: u64,
}

/// Web rendition of a certificate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certificate {
    pub sound_id: DbId,
    pub sound_title: String,
    #[serde(default)]
    pub artist_name: Option<String>,
    pub level: String,
    #[serde(default)]
    pub certificate_number: Option<String>,
    #[serde(default)]
    pub issued_at: Option<Timestamp>,
}
