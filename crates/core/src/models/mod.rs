//! Wire models for the entities the backend exposes.
//!
//! The backend owns every entity; these structs are read-only snapshots
//! that views hold for as long as they are mounted.

pub mod analytics;
pub mod category;
pub mod certification;
pub mod clip;
pub mod event;
pub mod payment;
pub mod sound;

use serde::{Deserialize, Deserializer};

use crate::types::DbId;

pub use analytics::{ContentAnalytics, GlobalAnalytics, TrendPoint, TrendSeries, UserAnalytics};
pub use category::{Category, CategoryRef};
pub use certification::{Certificate, CertificateFormat, CertificationStats};
pub use clip::{Clip, ClipAuthor};
pub use event::{Competition, Event};
pub use payment::{ArtistRevenue, PaymentStats, Transaction};
pub use sound::Sound;

/// Anything that carries a backend id; used to key reducers and dedupe
/// appended pages.
pub trait Identified {
    fn id(&self) -> DbId;
}

/// Decode an amount sent either as a JSON number or as a decimal string
/// (`"9.99"`), as the backend's decimal columns serialize.
pub(crate) fn de_opt_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Num(f64),
        Text(String),
    }

    match Option::<Raw>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Raw::Num(n)) => Ok(Some(n)),
        Some(Raw::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Raw::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Like [`de_opt_amount`] but defaults to zero.
pub(crate) fn de_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(de_opt_amount(deserializer)?.unwrap_or(0.0))
}
