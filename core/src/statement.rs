//! Sales statements — what the publisher reports each period.

use crate::{
    error::{RoyaltyError, RoyaltyResult},
    right::Category,
    types::Copies,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One reported line: copies sold (or returned, when negative) for a
/// category on a date, at a per-copy gross price.
///
/// Deserialization goes through `Statement::new`, so a positive price
/// holds however the statement was built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawStatement")]
pub struct Statement {
    pub date:     NaiveDate,
    pub category: Category,
    pub copies:   Copies,
    pub price:    Decimal,
}

#[derive(Deserialize)]
struct RawStatement {
    date:     NaiveDate,
    category: Category,
    copies:   Copies,
    price:    Decimal,
}

impl TryFrom<RawStatement> for Statement {
    type Error = RoyaltyError;

    fn try_from(raw: RawStatement) -> Result<Self, Self::Error> {
        Self::new(raw.date, raw.category, raw.copies, raw.price)
    }
}

impl Statement {
    pub fn new(
        date: NaiveDate,
        category: impl Into<Category>,
        copies: Copies,
        price: Decimal,
    ) -> RoyaltyResult<Self> {
        if price <= Decimal::ZERO {
            return Err(RoyaltyError::InvalidPrice { price });
        }
        Ok(Self {
            date,
            category: category.into(),
            copies,
            price,
        })
    }

    pub fn trade_volume(date: NaiveDate, copies: Copies, price: Decimal) -> RoyaltyResult<Self> {
        Self::new(date, Category::TradeVolume, copies, price)
    }

    pub fn ebook(date: NaiveDate, copies: Copies, price: Decimal) -> RoyaltyResult<Self> {
        Self::new(date, Category::Ebook, copies, price)
    }

    pub fn audiobook(date: NaiveDate, copies: Copies, price: Decimal) -> RoyaltyResult<Self> {
        Self::new(date, Category::Audiobook, copies, price)
    }

    pub fn is_return(&self) -> bool {
        self.copies < 0
    }
}
