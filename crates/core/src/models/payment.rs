//! Payment administration models.

use serde::{Deserialize, Serialize};

use super::{de_amount, Identified};
use crate::status::TransactionStatus;
use crate::types::{DbId, Timestamp};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: DbId,
    #[serde(deserialize_with = "de_amount")]
    pub amount: f64,
    pub status: TransactionStatus,
    #[serde(default)]
    pub sound_id: Option<DbId>,
    #[serde(default)]
    pub sound_title: Option<String>,
    #[serde(default)]
    pub artist_id: Option<DbId>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub buyer_name: Option<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Identified for Transaction {
    fn id(&self) -> DbId {
        self.id
    }
}

/// Totals shown at the top of the payments dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PaymentStats {
    #[serde(default, deserialize_with = "de_amount")]
    pub total_revenue: f64,
    #[serde(default, deserialize_with = "de_amount")]
    pub platform_commission: f64,
    #[serde(default)]
    pub pending_count: u64,
    #[serde(default)]
    pub completed_count: u64,
    #[serde(default)]
    pub failed_count: u64,
    #[serde(default)]
    pub refunded_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtistRevenue {
    pub artist_id: DbId,
    pub artist_name: String,
    #[serde(default, deserialize_with = "de_amount")]
    pub total_revenue: f64,
    #[serde(default)]
    pub sales_count: u64,
    #[serde(default, deserialize_with = "de_amount")]
    pub pending_payout: f64,
}
