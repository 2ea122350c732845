//! Tier tables — the progressive rate scale of one right.
//!
//! Textual form: comma-separated `rate-limit` segments, e.g.
//! `7-5000,8-10000,9-0`. The limit is the cumulative lifetime-sales
//! threshold at which the tier ends; `0` marks the unbounded final tier.
//! Internally each tier stores its own width (capacity), so the example
//! above becomes 5000 units at 7%, 5000 units at 8%, then 9% forever.

use crate::{
    error::{RoyaltyError, RoyaltyResult},
    types::TierIndex,
};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tier {
    /// Royalty percentage, e.g. `7` for 7%.
    pub rate:     Decimal,
    /// Units paid at this rate. `None` for the unbounded final tier.
    pub capacity: Option<u64>,
}

impl Tier {
    pub fn bounded(rate: Decimal, capacity: u64) -> Self {
        Self { rate, capacity: Some(capacity) }
    }

    pub fn unbounded(rate: Decimal) -> Self {
        Self { rate, capacity: None }
    }

    pub fn is_unbounded(&self) -> bool {
        self.capacity.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierTable {
    tiers: Vec<Tier>,
}

impl TierTable {
    /// Build a table from already-structured tiers.
    ///
    /// Every tier except the last must be bounded with a non-zero width,
    /// the last must be unbounded, and rates must strictly increase.
    pub fn new(tiers: Vec<Tier>) -> RoyaltyResult<Self> {
        let rendered = render(&tiers);
        validate(&rendered, &tiers)?;
        Ok(Self { tiers })
    }

    /// Parse `rate-limit[,rate-limit...]`.
    pub fn from_string(spec: &str) -> RoyaltyResult<Self> {
        let spec = spec.trim();
        if spec.is_empty() {
            return Err(RoyaltyError::parse(spec, "empty tier specification"));
        }

        let mut steps: Vec<(Decimal, i64)> = Vec::new();
        for segment in spec.split(',') {
            let segment = segment.trim();
            let (rate, limit) = segment.split_once('-').ok_or_else(|| {
                RoyaltyError::parse(spec, format!("segment '{segment}' is not rate-limit"))
            })?;
            let rate = Decimal::from_str(rate.trim()).map_err(|e| {
                RoyaltyError::parse(spec, format!("bad rate '{rate}' in '{segment}': {e}"))
            })?;
            let limit: i64 = limit.trim().parse().map_err(|e| {
                RoyaltyError::parse(spec, format!("bad limit '{limit}' in '{segment}': {e}"))
            })?;
            steps.push((rate, limit));
        }

        let last = steps.len() - 1;
        for (i, &(rate, limit)) in steps.iter().enumerate() {
            if rate.is_sign_negative() {
                return Err(RoyaltyError::parse(spec, format!("negative rate {rate}")));
            }
            if limit < 0 {
                return Err(RoyaltyError::parse(spec, format!("negative limit {limit}")));
            }
            if limit == 0 && i != last {
                let reason = if steps[i + 1..].iter().any(|&(_, l)| l == 0) {
                    "more than one unbounded tier"
                } else {
                    "unbounded tier must be last"
                };
                return Err(RoyaltyError::parse(spec, reason));
            }
        }

        let mut tiers = Vec::with_capacity(steps.len());
        let mut prev_limit = 0i64;
        for &(rate, limit) in &steps {
            if limit == 0 {
                tiers.push(Tier::unbounded(rate));
            } else {
                if limit <= prev_limit {
                    return Err(RoyaltyError::parse(
                        spec,
                        format!("limit {limit} does not exceed previous limit {prev_limit}"),
                    ));
                }
                tiers.push(Tier::bounded(rate, (limit - prev_limit) as u64));
                prev_limit = limit;
            }
        }

        validate(spec, &tiers)?;
        Ok(Self { tiers })
    }

    pub fn tiers(&self) -> &[Tier] {
        &self.tiers
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn get(&self, index: TierIndex) -> Option<&Tier> {
        self.tiers.get(index)
    }

    /// The tier the next unit falls into when `cumulative_units_before`
    /// units have already been attributed.
    pub fn tier_at(&self, cumulative_units_before: u64) -> TierIndex {
        let mut end = 0u64;
        for (i, tier) in self.tiers.iter().enumerate() {
            match tier.capacity {
                None => return i,
                Some(capacity) => {
                    end += capacity;
                    if cumulative_units_before < end {
                        return i;
                    }
                }
            }
        }
        // Unreachable for validated tables: the last tier is unbounded.
        self.tiers.len() - 1
    }

    /// Canonical textual form, inverse of `from_string`.
    pub fn to_spec_string(&self) -> String {
        render(&self.tiers)
    }
}

impl fmt::Display for TierTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_spec_string())
    }
}

impl FromStr for TierTable {
    type Err = RoyaltyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

fn render(tiers: &[Tier]) -> String {
    let mut limit = 0u64;
    tiers
        .iter()
        .map(|t| match t.capacity {
            Some(capacity) => {
                limit += capacity;
                format!("{}-{}", t.rate.normalize(), limit)
            }
            None => format!("{}-0", t.rate.normalize()),
        })
        .collect::<Vec<_>>()
        .join(",")
}

fn validate(input: &str, tiers: &[Tier]) -> RoyaltyResult<()> {
    let Some(last) = tiers.last() else {
        return Err(RoyaltyError::parse(input, "no tiers"));
    };
    if !last.is_unbounded() {
        return Err(RoyaltyError::parse(input, "final tier must be unbounded (limit 0)"));
    }
    let unbounded = tiers.iter().filter(|t| t.is_unbounded()).count();
    if unbounded > 1 {
        return Err(RoyaltyError::parse(input, "more than one unbounded tier"));
    }
    if tiers.iter().any(|t| t.capacity == Some(0)) {
        return Err(RoyaltyError::parse(input, "bounded tier with zero capacity"));
    }
    for pair in tiers.windows(2) {
        if pair[1].rate <= pair[0].rate {
            return Err(RoyaltyError::parse(
                input,
                format!("rate {} does not exceed previous rate {}", pair[1].rate, pair[0].rate),
            ));
        }
    }
    if tiers.iter().any(|t| t.rate.is_sign_negative()) {
        return Err(RoyaltyError::parse(input, "negative rate"));
    }
    Ok(())
}
