//! Rights granted under a licensing agreement.
//!
//! Every right behaves identically; the category tag only decides which
//! statements it matches and how it is labelled in reports.

use crate::{
    error::RoyaltyResult,
    stack::{Fragment, RoyaltyStack},
    tier::TierTable,
    types::Copies,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    /// Print editions sold through bookshops.
    TradeVolume,
    Ebook,
    Audiobook,
    Other(String),
}

impl Category {
    pub fn label(&self) -> &str {
        category_label(self)
    }
}

/// Report label for a category.
pub fn category_label(category: &Category) -> &str {
    match category {
        Category::TradeVolume => "trade volume",
        Category::Ebook       => "ebook",
        Category::Audiobook   => "audiobook",
        Category::Other(name) => name,
    }
}

/// Map user-supplied text to a category. Matching ignores case and treats
/// `_` and `-` as spaces; unrecognised names are kept in that normalized
/// form as `Other`, so differently spelled labels still name one right.
pub fn parse_category(text: &str) -> Category {
    let normalized = text
        .trim()
        .to_lowercase()
        .replace(&['_', '-'][..], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    match normalized.as_str() {
        "trade volume" | "trade" | "print" => Category::TradeVolume,
        "ebook" | "e book"                 => Category::Ebook,
        "audiobook" | "audio book"         => Category::Audiobook,
        _                                  => Category::Other(normalized),
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_category(s))
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        parse_category(&s)
    }
}

impl From<&str> for Category {
    fn from(s: &str) -> Self {
        parse_category(s)
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.label().to_string()
    }
}

/// A right: a category bound to its tier table and sales history.
#[derive(Debug, Clone)]
pub struct Right {
    category: Category,
    tiers:    TierTable,
    stack:    RoyaltyStack,
}

impl Right {
    pub fn new(category: Category, tiers: TierTable) -> Self {
        Self {
            category,
            tiers,
            stack: RoyaltyStack::new(),
        }
    }

    /// Build a right from a `rate-limit[,rate-limit...]` string.
    pub fn from_string(category: impl Into<Category>, spec: &str) -> RoyaltyResult<Self> {
        Ok(Self::new(category.into(), TierTable::from_string(spec)?))
    }

    pub fn category(&self) -> &Category {
        &self.category
    }

    pub fn tiers(&self) -> &TierTable {
        &self.tiers
    }

    pub fn stack(&self) -> &RoyaltyStack {
        &self.stack
    }

    pub fn apply(&mut self, copies: Copies) -> RoyaltyResult<Vec<Fragment>> {
        self.stack.apply(&self.tiers, copies)
    }

    pub fn reset(&mut self) {
        self.stack.reset();
    }

    /// Put back a stack saved before an `apply` whose result was discarded.
    pub(crate) fn restore_stack(&mut self, stack: RoyaltyStack) {
        self.stack = stack;
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.category, self.tiers)
    }
}
