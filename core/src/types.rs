//! Shared primitive types used across the royalty engine.

/// A signed count of copies. Positive for sales, negative for returns.
pub type Copies = i64;

/// Position of a tier inside a `TierTable`, starting at 0.
pub type TierIndex = usize;

/// The canonical identifier of one persisted report run.
pub type RunId = String;

/// Fresh run identifier for a persisted report.
pub fn new_run_id() -> RunId {
    uuid::Uuid::new_v4().to_string()
}
