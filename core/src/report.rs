//! Report items and their plain-text rendering.
//!
//! The engine produces one `ReportItem` per tier fragment. Everything in
//! this module is presentation over that list.

use crate::{
    right::Category,
    types::{Copies, TierIndex},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportItem {
    pub date:         NaiveDate,
    pub right:        Category,
    pub tier:         TierIndex,
    pub copies:       Copies,
    /// Percentage as displayed, e.g. `"7%"`.
    pub rate:         String,
    pub price:        Decimal,
    /// Advance balance after this item's `due` was booked.
    pub advance_left: Decimal,
    pub due:          Decimal,
}

/// `7` -> `"7%"`, `7.50` -> `"7.5%"`.
pub fn format_rate(rate: Decimal) -> String {
    format!("{}%", rate.normalize())
}

/// Group consecutive items sharing a date. Items from `apply_statements`
/// are already date ordered, so each date appears once.
pub fn group_by_date(items: &[ReportItem]) -> Vec<(NaiveDate, Vec<&ReportItem>)> {
    let mut groups: Vec<(NaiveDate, Vec<&ReportItem>)> = Vec::new();
    for item in items {
        match groups.last_mut() {
            Some((date, group)) if *date == item.date => group.push(item),
            _ => groups.push((item.date, vec![item])),
        }
    }
    groups
}

pub fn render_text(items: &[ReportItem]) -> String {
    let mut out = String::new();
    for (date, group) in group_by_date(items) {
        let _ = writeln!(out, "{date}");
        for item in group {
            let _ = writeln!(
                out,
                "  {:<14} tier {}  {:>7} x {:>8} @ {:>5}  due {:>12}  advance left {:>12}",
                item.right.label(),
                item.tier,
                item.copies,
                item.price,
                item.rate,
                item.due,
                item.advance_left,
            );
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub items:        usize,
    pub net_copies:   Copies,
    pub total_due:    Decimal,
    pub advance:      Decimal,
    pub advance_left: Decimal,
    /// True once earned royalties cover the whole advance.
    pub earned_out:   bool,
    /// Royalties owed beyond the advance. Zero until earned out.
    pub payable:      Decimal,
}

impl ReportSummary {
    pub fn from_items(advance: Decimal, items: &[ReportItem]) -> Self {
        let total_due: Decimal = items.iter().map(|i| i.due).sum();
        let net_copies = items.iter().map(|i| i.copies).sum();
        let advance_left = advance - total_due;
        Self {
            items: items.len(),
            net_copies,
            total_due,
            advance,
            advance_left,
            earned_out: advance_left <= Decimal::ZERO,
            payable: (-advance_left).max(Decimal::ZERO),
        }
    }
}
