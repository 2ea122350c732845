//! Store methods for computed report items.

use super::{date_column, decimal_column, RoyaltyStore};
use crate::{error::RoyaltyResult, report::ReportItem, right::Category};
use rusqlite::{params, Statement};

const INSERT_REPORT_ITEM: &str = "INSERT INTO report_item
     (run_id, seq, date, category, tier, copies, rate, price, advance_left, due)
 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)";

impl RoyaltyStore {
    pub fn append_report_item(&self, run_id: &str, seq: usize, item: &ReportItem) -> RoyaltyResult<()> {
        let mut stmt = self.conn.prepare(INSERT_REPORT_ITEM)?;
        insert_report_item(&mut stmt, run_id, seq, item)
    }

    /// Persist a run's items in order, numbering them from 0. Runs inside
    /// one transaction: either every item is stored or none is.
    pub fn save_report_items(&self, run_id: &str, items: &[ReportItem]) -> RoyaltyResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(INSERT_REPORT_ITEM)?;
            for (seq, item) in items.iter().enumerate() {
                insert_report_item(&mut stmt, run_id, seq, item)?;
            }
        }
        tx.commit()?;
        log::debug!("saved {} report items for run {run_id}", items.len());
        Ok(())
    }

    pub fn report_items_for_run(&self, run_id: &str) -> RoyaltyResult<Vec<ReportItem>> {
        let mut stmt = self.conn.prepare(
            "SELECT date, category, tier, copies, rate, price, advance_left, due
             FROM report_item WHERE run_id = ?1
             ORDER BY seq ASC",
        )?;
        let items = stmt
            .query_map(params![run_id], |row| {
                Ok(ReportItem {
                    date:         date_column(row, 0)?,
                    right:        Category::from(row.get::<_, String>(1)?),
                    tier:         row.get::<_, i64>(2)? as usize,
                    copies:       row.get(3)?,
                    rate:         row.get(4)?,
                    price:        decimal_column(row, 5)?,
                    advance_left: decimal_column(row, 6)?,
                    due:          decimal_column(row, 7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    pub fn report_item_count(&self, run_id: &str) -> RoyaltyResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM report_item WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn insert_report_item(
    stmt: &mut Statement<'_>,
    run_id: &str,
    seq: usize,
    item: &ReportItem,
) -> RoyaltyResult<()> {
    stmt.execute(params![
        run_id,
        seq as i64,
        item.date.to_string(),
        item.right.label(),
        item.tier as i64,
        item.copies,
        item.rate,
        item.price.to_string(),
        item.advance_left.to_string(),
        item.due.to_string(),
    ])?;
    Ok(())
}
