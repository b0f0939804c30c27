//! Earning and spending rules of the points ledger.
//!
//! Pure functions only; the ledger applies them inside a transaction.

use chrono::{DateTime, TimeDelta, Utc};
use rand::seq::IndexedRandom;
use rand::Rng;

use crate::errors::AppError;
use crate::models::{Employee, Importance};

/// Articles older than this pay the late-read award only.
pub const LATE_READ_WINDOW_DAYS: i64 = 7;
pub const LATE_READ_AWARD: i64 = 1;
pub const SUGGESTION_AWARD: i64 = 30;
pub const MIN_SUGGESTION_CHARS: usize = 10;

pub fn is_late(published_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(published_at) > TimeDelta::days(LATE_READ_WINDOW_DAYS)
}

/// Points for reading an article at `now`. Never taken from the client.
pub fn read_award(importance: Importance, published_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    if is_late(published_at, now) {
        LATE_READ_AWARD
    } else {
        importance.base_award()
    }
}

/// Trim and length-check suggestion text before it reaches the ledger.
pub fn validate_suggestion_text(text: &str) -> Result<&str, AppError> {
    let trimmed = text.trim();
    if trimmed.chars().count() < MIN_SUGGESTION_CHARS {
        return Err(AppError::Validation(format!(
            "Suggestion text must be at least {} characters",
            MIN_SUGGESTION_CHARS
        )));
    }
    Ok(trimmed)
}

/// Uniform pick among eligible gift recipients.
pub fn pick_recipient<'a, R: Rng + ?Sized>(
    rng: &mut R,
    candidates: &'a [Employee],
) -> Option<&'a Employee> {
    candidates.choose(rng)
}

pub fn payer_token(payer_id: &str, at: DateTime<Utc>) -> String {
    format!("DELA-{}-{}", payer_id, at.timestamp_millis())
}

pub fn gift_token(recipient_id: &str, at: DateTime<Utc>) -> String {
    format!("GIFT-{}-{}", recipient_id, at.timestamp_millis())
}

pub fn gift_reward_name(reward_name: &str, payer_name: &str) -> String {
    format!("{} (Regal de {})", reward_name, payer_name)
}
