//! royalty-core: progressive royalty computation for licensing agreements.
//!
//! Statements flow through `Agreement::apply_statements` into each
//! right's `RoyaltyStack`, which splits them across rate tiers. Each
//! resulting fragment becomes a `ReportItem` booked against the advance.

pub mod agreement;
pub mod config;
pub mod error;
pub mod report;
pub mod right;
pub mod stack;
pub mod statement;
pub mod store;
pub mod tier;
pub mod types;

pub use agreement::Agreement;
pub use error::{RoyaltyError, RoyaltyResult};
pub use report::ReportItem;
pub use right::{Category, Right};
pub use stack::{Fragment, Frame, RoyaltyStack};
pub use statement::Statement;
pub use tier::{Tier, TierTable};
