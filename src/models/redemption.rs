//! Redemption records and request/response shapes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Employee, Sector};

/// One leg of a redemption. A shared redemption yields a payer leg and a gift leg.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionRecord {
    pub id: String,
    /// Payer, also on the gift leg
    pub user_id: String,
    pub reward_name: String,
    /// Points charged; 0 for a gift leg
    pub cost: i64,
    pub date: DateTime<Utc>,
    pub qr_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gifted_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gifted_to_id: Option<String>,
    pub is_gift: bool,
}

/// How a reward is redeemed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedemptionMode {
    Solo,
    /// Same charge as solo; a random colleague from the sector gets a free copy.
    Shared { target_sector: Sector },
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RedemptionModeKind {
    Solo,
    Shared,
}

/// Request body for redeeming a reward.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemRequest {
    pub employee_id: String,
    pub reward_id: String,
    #[serde(default = "default_mode")]
    pub mode: RedemptionModeKind,
    #[serde(default)]
    pub target_sector: Option<Sector>,
}

fn default_mode() -> RedemptionModeKind {
    RedemptionModeKind::Solo
}

impl RedeemRequest {
    /// Resolve the wire fields into a mode; shared mode needs a target sector.
    pub fn redemption_mode(&self) -> Option<RedemptionMode> {
        match (self.mode, self.target_sector) {
            (RedemptionModeKind::Solo, _) => Some(RedemptionMode::Solo),
            (RedemptionModeKind::Shared, Some(target_sector)) => {
                Some(RedemptionMode::Shared { target_sector })
            }
            (RedemptionModeKind::Shared, None) => None,
        }
    }
}

/// Result of a redemption.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RedemptionOutcome {
    pub employee: Employee,
    /// Payer leg first, then the gift leg when one was created
    pub records: Vec<RedemptionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gifted_to: Option<String>,
}
