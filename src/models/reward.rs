//! Reward catalog model.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RewardCategory {
    Food,
    Leisure,
    Merch,
}

/// A redeemable reward. Supplied by the catalog, never mutated by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reward {
    pub id: String,
    pub name: String,
    pub cost: i64,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub description: String,
    pub category: RewardCategory,
}

/// A catalog entry as seen by one employee.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    #[serde(flatten)]
    pub reward: Reward,
    pub affordable: bool,
}
