//! Sound category model.

use serde::{Deserialize, Serialize};

use super::Identified;
use crate::types::DbId;

/// Full category row as managed by the admin category page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "active")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default)]
    pub sounds_count: u64,
}

fn active() -> bool {
    true
}

impl Identified for Category {
    fn id(&self) -> DbId {
        self.id
    }
}

/// Category reference embedded in other entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Sort categories the way the admin table shows them: by `sort_order`,
/// then by name.
pub fn sort_categories(categories: &mut [Category]) {
    categories.sort_by(|a, b| {
        a.sort_order
            .cmp(&b.sort_order)
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}
