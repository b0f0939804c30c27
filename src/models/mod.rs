//! Data models for the engagement backend.
//!
//! Field names serialize in camelCase to match the presentation layer.

mod article;
mod datastore;
mod employee;
mod redemption;
mod reward;
mod suggestion;

pub use article::*;
pub use datastore::*;
pub use employee::*;
pub use redemption::*;
pub use reward::*;
pub use suggestion::*;
