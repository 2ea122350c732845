//! Store methods for the statements a run consumed.

use super::{date_column, decimal_column, RoyaltyStore};
use crate::{error::RoyaltyResult, right::Category, statement::Statement};
use rusqlite::{params, types::Type};

impl RoyaltyStore {
    /// Persist statements in the order given. Runs inside one transaction.
    pub fn save_statements(&self, run_id: &str, statements: &[Statement]) -> RoyaltyResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO statement (run_id, seq, date, category, copies, price)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for (seq, s) in statements.iter().enumerate() {
                stmt.execute(params![
                    run_id,
                    seq as i64,
                    s.date.to_string(),
                    s.category.label(),
                    s.copies,
                    s.price.to_string(),
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    pub fn statements_for_run(&self, run_id: &str) -> RoyaltyResult<Vec<Statement>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, category, copies, price
             FROM statement WHERE run_id = ?1
             ORDER BY seq ASC",
        )?;
        let statements = stmt
            .query_map(params![run_id], |row| {
                Statement::new(
                    date_column(row, 0)?,
                    Category::from(row.get::<_, String>(1)?),
                    row.get(2)?,
                    decimal_column(row, 3)?,
                )
                .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(statements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RoyaltyError;
    use rust_decimal::Decimal;

    #[test]
    fn stored_statement_with_non_positive_price_is_rejected() {
        let store = RoyaltyStore::in_memory().unwrap();
        store.migrate().unwrap();
        store.insert_run("run-1", None, Decimal::ZERO, "0.1.0-test").unwrap();
        store
            .conn
            .execute(
                "INSERT INTO statement (run_id, seq, date, category, copies, price)
                 VALUES ('run-1', 0, '2016-06-30', 'ebook', 5, '-3')",
                [],
            )
            .unwrap();

        let err = store.statements_for_run("run-1").unwrap_err();

        assert!(matches!(
            err,
            RoyaltyError::Database(rusqlite::Error::FromSqlConversionFailure(3, _, _))
        ));
    }
}
