//! The royalty stack — per-right cumulative sales tracker.
//!
//! Sales fill tiers bottom-up; returns drain them top-down, so a return
//! always unwinds the most recently attributed units first. Frames are
//! contiguous from tier 0 and never empty: a frame is opened by the first
//! unit attributed to its tier and removed when its last unit is returned.
//!
//! The stack owns its frames outright. The `TierTable` is read-only
//! configuration lent to `apply` by the owning `Right`.

use crate::{
    error::{RoyaltyError, RoyaltyResult},
    tier::TierTable,
    types::{Copies, TierIndex},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub tier:         TierIndex,
    pub units_filled: u64,
}

/// The part of one `apply` call attributed to a single tier.
/// `copies` is negative for return fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub tier:   TierIndex,
    pub rate:   Decimal,
    pub copies: Copies,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoyaltyStack {
    frames: Vec<Frame>,
}

impl RoyaltyStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Net units attributed so far (sales minus returns).
    pub fn total_filled(&self) -> u64 {
        self.frames.iter().map(|f| f.units_filled).sum()
    }

    /// Highest tier currently holding units.
    pub fn top_tier(&self) -> Option<TierIndex> {
        self.frames.last().map(|f| f.tier)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop all attributed units.
    pub fn reset(&mut self) {
        self.frames.clear();
    }

    /// Attribute a signed delta and return the resulting fragments in the
    /// order they were applied. The fragments' copies sum to `delta`.
    ///
    /// Fails atomically: on error the stack is left exactly as it was.
    /// Net units are capped at `i64::MAX`; sales beyond that fail with
    /// `Overflow`.
    pub fn apply(&mut self, table: &TierTable, delta: Copies) -> RoyaltyResult<Vec<Fragment>> {
        if delta > 0 {
            let snapshot = self.frames.clone();
            self.push(table, delta.unsigned_abs()).inspect_err(|_| {
                self.frames = snapshot;
            })
        } else if delta < 0 {
            self.pop(table, delta.unsigned_abs())
        } else {
            Ok(Vec::new())
        }
    }

    fn push(&mut self, table: &TierTable, units: u64) -> RoyaltyResult<Vec<Fragment>> {
        let total = self.total_filled();
        if total.checked_add(units).map_or(true, |t| t > Copies::MAX as u64) {
            return Err(RoyaltyError::Overflow {
                context: format!("adding {units} copies to {total} already sold"),
            });
        }

        let mut fragments = Vec::new();
        let mut remaining = units;

        while remaining > 0 {
            let needs_new_frame = match self.frames.last() {
                None => true,
                Some(top) => table
                    .get(top.tier)
                    .and_then(|t| t.capacity)
                    .is_some_and(|capacity| top.units_filled >= capacity),
            };
            if needs_new_frame {
                let next = table.tier_at(self.total_filled());
                if next != self.frames.len() || next >= table.len() {
                    return Err(RoyaltyError::CapacityExhausted {
                        tier: self.frames.len().saturating_sub(1),
                    });
                }
                self.frames.push(Frame { tier: next, units_filled: 0 });
            }

            let top = self
                .frames
                .last_mut()
                .ok_or(RoyaltyError::CapacityExhausted { tier: 0 })?;
            let tier = table
                .get(top.tier)
                .ok_or(RoyaltyError::CapacityExhausted { tier: top.tier })?;
            let take = match tier.capacity {
                Some(capacity) => remaining.min(capacity - top.units_filled),
                None => remaining,
            };

            let tier_index = top.tier;
            top.units_filled = top.units_filled.checked_add(take).ok_or_else(|| {
                RoyaltyError::Overflow { context: format!("filling tier {tier_index}") }
            })?;
            remaining -= take;
            fragments.push(Fragment {
                tier:   top.tier,
                rate:   tier.rate,
                copies: take as Copies,
            });
        }

        Ok(fragments)
    }

    fn pop(&mut self, table: &TierTable, units: u64) -> RoyaltyResult<Vec<Fragment>> {
        let available = self.total_filled();
        if units > available {
            return Err(RoyaltyError::InvalidReturn { requested: units, available });
        }

        // Frames are contiguous, so the top one names the highest tier used.
        if let Some(top) = self.frames.last() {
            if top.tier >= table.len() {
                return Err(RoyaltyError::CapacityExhausted { tier: top.tier });
            }
        }

        let mut fragments = Vec::new();
        let mut remaining = units;

        while remaining > 0 {
            let Some(top) = self.frames.last_mut() else {
                break;
            };
            let tier = top.tier;
            let rate = table
                .get(tier)
                .map(|t| t.rate)
                .ok_or(RoyaltyError::CapacityExhausted { tier })?;
            let take = remaining.min(top.units_filled);
            top.units_filled -= take;
            remaining -= take;
            if top.units_filled == 0 {
                self.frames.pop();
            }
            fragments.push(Fragment {
                tier,
                rate,
                copies: -(take as Copies),
            });
        }

        Ok(fragments)
    }
}
