//! Agreement configuration files.
//!
//! ```json
//! {
//!   "name": "Example title",
//!   "advance": "1500",
//!   "rights": [
//!     { "category": "trade_volume", "tiers": "7-5000,8-10000,9-0" },
//!     { "category": "ebook",        "tiers": "25-0" }
//!   ],
//!   "statements": [
//!     { "date": "2016-06-30", "category": "trade_volume", "copies": 143, "price": "28.40" }
//!   ]
//! }
//! ```
//!
//! Monetary values are JSON strings so they stay exact.

use crate::{
    agreement::Agreement,
    error::RoyaltyResult,
    right::{Category, Right},
    statement::Statement,
    types::Copies,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RightConfig {
    pub category: Category,
    /// `rate-limit[,rate-limit...]`
    pub tiers: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatementConfig {
    pub date:     NaiveDate,
    pub category: Category,
    pub copies:   Copies,
    pub price:    Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgreementConfig {
    #[serde(default)]
    pub name:       Option<String>,
    pub advance:    Decimal,
    pub rights:     Vec<RightConfig>,
    #[serde(default)]
    pub statements: Vec<StatementConfig>,
}

impl AgreementConfig {
    /// Load an agreement description from a JSON file.
    /// In tests, use AgreementConfig::default_test().
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        log::info!(
            "loaded agreement from {path}: {} rights, {} statements",
            config.rights.len(),
            config.statements.len()
        );
        Ok(config)
    }

    /// Validate tier strings and prices and assemble the agreement.
    pub fn build(&self) -> RoyaltyResult<Agreement> {
        let rights = self
            .rights
            .iter()
            .map(|r| Right::from_string(r.category.clone(), &r.tiers))
            .collect::<RoyaltyResult<Vec<_>>>()?;
        let statements = self
            .statements
            .iter()
            .map(|s| Statement::new(s.date, s.category.clone(), s.copies, s.price))
            .collect::<RoyaltyResult<Vec<_>>>()?;

        let mut agreement = Agreement::with_rights(self.advance, rights);
        agreement.add_statements(statements);
        Ok(agreement)
    }

    /// The worked example: a 1500 advance, progressive trade volume
    /// rates, a flat ebook rate and two years of statements.
    pub fn default_test() -> Self {
        let date = |y, m, d| NaiveDate::from_ymd_opt(y, m, d).expect("valid calendar date");
        let statement = |date: NaiveDate, category: Category, copies: Copies, price: Decimal| StatementConfig {
            date,
            category,
            copies,
            price,
        };
        Self {
            name: Some("test agreement".into()),
            advance: Decimal::new(1500, 0),
            rights: vec![
                RightConfig {
                    category: Category::TradeVolume,
                    tiers: "7-5000,8-10000,9-0".into(),
                },
                RightConfig {
                    category: Category::Ebook,
                    tiers: "25-0".into(),
                },
            ],
            statements: vec![
                statement(date(2016, 6, 30), Category::TradeVolume, 143, Decimal::new(2840, 2)),
                statement(date(2016, 6, 30), Category::Ebook, 89, Decimal::new(1356, 2)),
                statement(date(2016, 12, 31), Category::TradeVolume, 512, Decimal::new(3490, 2)),
                statement(date(2016, 12, 31), Category::Ebook, 124, Decimal::new(1423, 2)),
                statement(date(2017, 6, 30), Category::TradeVolume, -45, Decimal::new(3320, 2)),
            ],
        }
    }
}
