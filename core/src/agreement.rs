//! The licensing agreement — drives statements through the rights'
//! royalty stacks and books the earned royalties against the advance.
//!
//! ORDERING: statements are applied by date. The sort is stable, so
//! statements sharing a date keep their insertion order. That order
//! decides which statement recoups the advance first.
//!
//! FAILURE POLICY: abort-all. The first statement naming an unknown
//! right, or returning more copies than were sold, yields one error and
//! ends the sequence. The failing statement books nothing. Amounts too
//! large for `Decimal` fail the same way with `Overflow`.
//!
//! `apply_statements` advances the stacks and the advance balance
//! durably. Calling it twice without `reset` counts history twice; use
//! `report` for an idempotent full recomputation.

use crate::{
    error::{RoyaltyError, RoyaltyResult},
    report::{format_rate, ReportItem},
    right::{Category, Right},
    stack::Fragment,
    statement::Statement,
};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone)]
pub struct Agreement {
    advance:      Decimal,
    advance_left: Decimal,
    rights:       BTreeMap<Category, Right>,
    statements:   Vec<Statement>,
}

impl Agreement {
    pub fn new(advance: Decimal) -> Self {
        Self {
            advance,
            advance_left: advance,
            rights: BTreeMap::new(),
            statements: Vec::new(),
        }
    }

    pub fn with_rights(advance: Decimal, rights: impl IntoIterator<Item = Right>) -> Self {
        let mut agreement = Self::new(advance);
        for right in rights {
            agreement.add_right(right);
        }
        agreement
    }

    /// Add a right, replacing any right already held for its category.
    pub fn add_right(&mut self, right: Right) {
        self.rights.insert(right.category().clone(), right);
    }

    pub fn add_statements(&mut self, statements: impl IntoIterator<Item = Statement>) {
        self.statements.extend(statements);
    }

    pub fn advance(&self) -> Decimal {
        self.advance
    }

    pub fn advance_left(&self) -> Decimal {
        self.advance_left
    }

    pub fn rights(&self) -> impl Iterator<Item = &Right> {
        self.rights.values()
    }

    pub fn right(&self, category: &Category) -> Option<&Right> {
        self.rights.get(category)
    }

    pub fn statements(&self) -> &[Statement] {
        &self.statements
    }

    /// Stable sort by date.
    pub fn sort_statements(&mut self) {
        self.statements.sort_by_key(|s| s.date);
    }

    /// Restore the advance balance and empty every right's stack.
    pub fn reset(&mut self) {
        self.advance_left = self.advance;
        for right in self.rights.values_mut() {
            right.reset();
        }
    }

    /// Lazily apply all statements in date order, one item per tier
    /// fragment.
    pub fn apply_statements(&mut self) -> ReportItems<'_> {
        self.sort_statements();
        ReportItems {
            agreement: self,
            next:      0,
            pending:   VecDeque::new(),
            done:      false,
        }
    }

    /// Reset, then apply every statement and collect the items.
    pub fn report(&mut self) -> RoyaltyResult<Vec<ReportItem>> {
        self.reset();
        self.apply_statements().collect()
    }

    fn apply_one(&mut self, statement: &Statement) -> RoyaltyResult<Vec<ReportItem>> {
        let right = self
            .rights
            .get_mut(&statement.category)
            .ok_or_else(|| RoyaltyError::UnknownRight {
                category: statement.category.to_string(),
            })?;
        let before = right.stack().clone();
        let fragments = right.apply(statement.copies)?;

        match price_fragments(statement, &fragments, self.advance_left) {
            Ok((items, advance_left)) => {
                self.advance_left = advance_left;
                Ok(items)
            }
            Err(e) => {
                right.restore_stack(before);
                Err(e)
            }
        }
    }
}

/// Turn fragments into report items, returning the advance balance after
/// the last one. Nothing is booked if any amount overflows.
fn price_fragments(
    statement: &Statement,
    fragments: &[Fragment],
    mut advance_left: Decimal,
) -> RoyaltyResult<(Vec<ReportItem>, Decimal)> {
    let overflow = || RoyaltyError::Overflow {
        context: format!(
            "pricing {} copies of {} at {}",
            statement.copies, statement.category, statement.price
        ),
    };

    let mut items = Vec::with_capacity(fragments.len());
    for fragment in fragments {
        let due = Decimal::from(fragment.copies)
            .checked_mul(statement.price)
            .and_then(|d| d.checked_mul(fragment.rate))
            .and_then(|d| d.checked_div(Decimal::ONE_HUNDRED))
            .ok_or_else(overflow)?;
        advance_left = advance_left.checked_sub(due).ok_or_else(overflow)?;
        log::debug!(
            "{} {}: {} copies at {}% in tier {} -> due {due}, advance left {advance_left}",
            statement.date,
            statement.category,
            fragment.copies,
            fragment.rate,
            fragment.tier,
        );
        items.push(ReportItem {
            date:         statement.date,
            right:        statement.category.clone(),
            tier:         fragment.tier,
            copies:       fragment.copies,
            rate:         format_rate(fragment.rate),
            price:        statement.price,
            advance_left,
            due,
        });
    }
    Ok((items, advance_left))
}

/// Iterator returned by `Agreement::apply_statements`.
pub struct ReportItems<'a> {
    agreement: &'a mut Agreement,
    next:      usize,
    pending:   VecDeque<ReportItem>,
    done:      bool,
}

impl Iterator for ReportItems<'_> {
    type Item = RoyaltyResult<ReportItem>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(Ok(item));
            }
            if self.done {
                return None;
            }
            let Some(statement) = self.agreement.statements.get(self.next).cloned() else {
                self.done = true;
                log::info!(
                    "applied {} statements, advance left {}",
                    self.next,
                    self.agreement.advance_left
                );
                return None;
            };
            self.next += 1;

            match self.agreement.apply_one(&statement) {
                Ok(items) => self.pending.extend(items),
                Err(e) => {
                    log::warn!(
                        "statement {} {} ({} copies) rejected: {e}",
                        statement.date,
                        statement.category,
                        statement.copies
                    );
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

impl std::iter::FusedIterator for ReportItems<'_> {}
