//! Generic table scraping.
//!
//! Rows are enumerated, each row's `td` cells are read, rows with fewer
//! cells than the record's minimum are skipped and the rest are mapped
//! positionally. Order is DOM order.

use crate::locator::Locator;
use crate::page::BasePage;
use crate::result::TellerResult;

/// A record that can be built from one table row
pub trait TableRecord: Sized {
    /// Rows with fewer cells are not records
    const MIN_CELLS: usize;

    /// Map cells positionally; called only with at least `MIN_CELLS` cells
    fn from_cells(cells: Vec<String>) -> Self;
}

/// Turn scraped rows into records, skipping short rows
#[must_use]
pub fn records_from_rows<R: TableRecord>(rows: Vec<Vec<String>>) -> Vec<R> {
    rows.into_iter()
        .filter(|cells| cells.len() >= R::MIN_CELLS)
        .map(R::from_cells)
        .collect()
}

/// Read the trimmed `td` texts of every row matched by `rows`
pub async fn scrape_rows(base: &BasePage, rows: &Locator) -> TellerResult<Vec<Vec<String>>> {
    let count = base.count(rows).await?;
    let mut scraped = Vec::with_capacity(count);
    for index in 0..count {
        scraped.push(base.all_texts(&rows.nth(index).descendant("td")).await?);
    }
    tracing::debug!(%rows, rows = scraped.len(), "table scraped");
    Ok(scraped)
}

/// Scrape rows and map them to records
pub async fn scrape_table<R: TableRecord>(base: &BasePage, rows: &Locator) -> TellerResult<Vec<R>> {
    Ok(records_from_rows(scrape_rows(base, rows).await?))
}
