//! Admin analytics dashboard payloads.

use serde::{Deserialize, Serialize};

use super::de_amount;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GlobalAnalytics {
    #[serde(default)]
    pub total_users: u64,
    #[serde(default)]
    pub total_sounds: u64,
    #[serde(default)]
    pub total_clips: u64,
    #[serde(default)]
    pub total_events: u64,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserAnalytics {
    #[serde(default)]
    pub new_users: u64,
    #[serde(default)]
    pub active_users: u64,
    #[serde(default)]
    pub artists: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentAnalytics {
    #[serde(default)]
    pub total_plays: u64,
    #[serde(default)]
    pub total_downloads: u64,
    #[serde(default)]
    pub total_likes: u64,
    #[serde(default)]
    pub pending_moderation: u64,
}

/// One data point on a trend chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub label: String,
    #[serde(default, deserialize_with = "de_amount")]
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    #[serde(default)]
    pub points: Vec<TrendPoint>,
}

impl TrendSeries {
    /// Percentage change between the first and last point.
    ///
    /// Returns `None` with fewer than two points or a zero baseline.
    pub fn change_percent(&self) -> Option<f64> {
        let first = self.points.first()?.value;
        let last = self.points.last()?.value;
        if self.points.len() < 2 || first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }

    /// Largest value, used to scale chart bars.
    pub fn peak(&self) -> f64 {
        self.points.iter().map(|p| p.value).fold(0.0, f64::max)
    }
}
