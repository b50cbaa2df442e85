//! Shopping cart provider.

use serde::Serialize;
use tokio::sync::RwLock;

use sonique_core::error::CoreError;
use sonique_core::models::Sound;
use sonique_core::types::DbId;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CartItem {
    pub sound_id: DbId,
    pub title: String,
    pub price: f64,
}

/// Sounds the user intends to buy. One line per sound.
#[derive(Debug, Default)]
pub struct Cart {
    items: RwLock<Vec<CartItem>>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sound. Returns `Ok(false)` when it is already in the cart.
    pub async fn add(&self, sound: &Sound) -> Result<bool, CoreError> {
        let price = match sound.price {
            Some(price) if sound.requires_purchase() => price,
            _ => {
                return Err(CoreError::Validation(format!(
                    "sound {} is free and cannot be added to the cart",
                    sound.id
                )))
            }
        };

        let mut items = self.items.write().await;
        if items.iter().any(|item| item.sound_id == sound.id) {
            return Ok(false);
        }
        items.push(CartItem {
            sound_id: sound.id,
            title: sound.title.clone(),
            price,
        });
        tracing::debug!(sound_id = sound.id, "Added to cart");
        Ok(true)
    }

    pub async fn remove(&self, sound_id: DbId) -> bool {
        let mut items = self.items.write().await;
        let before = items.len();
        items.retain(|item| item.sound_id != sound_id);
        items.len() != before
    }

    pub async fn clear(&self) {
        self.items.write().await.clear();
    }

    pub async fn contains(&self, sound_id: DbId) -> bool {
        self.items.read().await.iter().any(|item| item.sound_id == sound_id)
    }

    pub async fn items(&self) -> Vec<CartItem> {
        self.items.read().await.clone()
    }

    pub async fn count(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn total(&self) -> f64 {
        self.items.read().await.iter().map(|item| item.price).sum()
    }
}
