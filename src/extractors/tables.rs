// src/extractors/tables.rs

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;

use crate::utils::error::ExtractError;

// --- CSS Selectors (Lazy Static) ---
static TABLE_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Failed to compile TABLE_SELECTOR"));

static CRIME_TYPE_TABLE_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("table.crimetype").expect("Failed to compile CRIME_TYPE_TABLE_SELECTOR")
});

static ROW_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Failed to compile ROW_SELECTOR"));

static HEADER_CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th").expect("Failed to compile HEADER_CELL_SELECTOR"));

static DATA_CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td").expect("Failed to compile DATA_CELL_SELECTOR"));

static AGE_GROUP_HEADER_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("thead th").expect("Failed to compile AGE_GROUP_HEADER_SELECTOR"));

static ANY_CELL_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("Failed to compile ANY_CELL_SELECTOR"));

// --- Page schema constants ---
/// Every report page carries exactly five tables; anything else means the
/// portal changed its layout (or served a block page) and the page is skipped.
const EXPECTED_TABLE_COUNT: usize = 5;

/// Crime-type tables pack two logical rows into one visual row of four cells.
const CRIME_TYPE_ROW_WIDTH: usize = 4;

/// Output names for the four `table.crimetype` tables, in page order.
pub const CRIME_TYPE_RECORD_SETS: [&str; 4] = [
    "victim-count-by-crime-type",
    "victim-loss-by-crime-type",
    "subject-count-by-crime-type",
    "subject-loss-by-crime-type",
];

/// Output name for the final, age-group table.
pub const AGE_GROUP_RECORD_SET: &str = "victims-by-age-group";

// --- Data Structures ---

/// One extracted table: a header row plus data rows. Every row holds exactly
/// `columns.len()` cells; rows are only pushed after their shape is checked,
/// so the invariant is structural rather than relying on zip truncation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl RecordSet {
    fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    fn push_row(&mut self, cells: Vec<String>) {
        debug_assert_eq!(cells.len(), self.columns.len());
        self.rows.push(cells);
    }
}

/// The named record sets extracted from one report page. Either empty (the
/// page was skipped) or exactly the five fixed names in page order; partial
/// results are never produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionResult {
    tables: Vec<(String, RecordSet)>,
}

impl ExtractionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn tables(&self) -> &[(String, RecordSet)] {
        &self.tables
    }

    pub fn get(&self, name: &str) -> Option<&RecordSet> {
        self.tables
            .iter()
            .find(|(set_name, _)| set_name == name)
            .map(|(_, set)| set)
    }

    #[cfg(test)]
    pub(crate) fn from_tables(tables: Vec<(String, RecordSet)>) -> Self {
        Self { tables }
    }
}

// --- Main Extractor Structure ---
pub struct TableExtractor;

impl TableExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extracts the five report tables from a fetched page.
    ///
    /// Validation is two-tier: page-level schema mismatches (table count,
    /// missing class tags, header shapes) fail the whole page closed with one
    /// error log carrying the URL; malformed data rows are expected layout
    /// noise and are dropped silently.
    pub fn extract(&self, html: &str, url: &str) -> ExtractionResult {
        match self.try_extract(html) {
            Ok(result) => result,
            Err(err) => {
                tracing::error!("Schema check failed for {}: {}. Skipping...", url, err);
                ExtractionResult::empty()
            }
        }
    }

    fn try_extract(&self, html: &str) -> Result<ExtractionResult, ExtractError> {
        let document = Html::parse_document(html);

        let all_tables: Vec<ElementRef> = document.select(&TABLE_SELECTOR).collect();
        if all_tables.len() != EXPECTED_TABLE_COUNT {
            return Err(ExtractError::TableCount(all_tables.len()));
        }

        let crime_tables: Vec<ElementRef> =
            document.select(&CRIME_TYPE_TABLE_SELECTOR).collect();
        if crime_tables.len() != CRIME_TYPE_RECORD_SETS.len() {
            return Err(ExtractError::CrimeTypeTableCount(crime_tables.len()));
        }

        let mut tables = Vec::with_capacity(EXPECTED_TABLE_COUNT);
        for (name, table) in CRIME_TYPE_RECORD_SETS.iter().zip(&crime_tables) {
            tables.push(((*name).to_string(), reshape_crime_type_table(*table)?));
        }

        // The age-group table carries no class tag; it is identified as the
        // last table on the page, positionally.
        let age_table = all_tables
            .last()
            .copied()
            .ok_or(ExtractError::MissingAgeGroupTable)?;
        tables.push((
            AGE_GROUP_RECORD_SET.to_string(),
            reshape_age_group_table(age_table)?,
        ));

        Ok(ExtractionResult { tables })
    }
}

/// Reshapes one doubled-column crime-type table.
///
/// The page renders two logical rows side by side in one visual row of four
/// data cells; cells 0-1 and cells 2-3 each become a record keyed by the
/// table's own first two headers. Rows with any other cell count are blank
/// or separator artifacts and contribute nothing.
fn reshape_crime_type_table(table: ElementRef) -> Result<RecordSet, ExtractError> {
    let rows: Vec<ElementRef> = table.select(&ROW_SELECTOR).collect();

    let headers: Vec<String> = rows
        .first()
        .map(|row| {
            row.select(&HEADER_CELL_SELECTOR)
                .take(2)
                .map(cell_text)
                .collect()
        })
        .unwrap_or_default();
    if headers.len() < 2 {
        return Err(ExtractError::CrimeTypeHeader(headers.len()));
    }

    let mut set = RecordSet::new(headers);
    for row in rows.iter().skip(1) {
        let mut cells: Vec<String> = row.select(&DATA_CELL_SELECTOR).map(cell_text).collect();
        if cells.len() != CRIME_TYPE_ROW_WIDTH {
            continue;
        }
        let right = cells.split_off(2);
        set.push_row(cells);
        set.push_row(right);
    }
    Ok(set)
}

/// Reshapes the age-group table: three `thead` headers, then one record per
/// row with exactly three cells. Row labels are marked up as header cells,
/// so both cell kinds count.
fn reshape_age_group_table(table: ElementRef) -> Result<RecordSet, ExtractError> {
    let headers: Vec<String> = table
        .select(&AGE_GROUP_HEADER_SELECTOR)
        .map(cell_text)
        .collect();
    if headers.len() != 3 {
        return Err(ExtractError::AgeGroupHeader(headers.len()));
    }

    let mut set = RecordSet::new(headers);
    for row in table.select(&ROW_SELECTOR).skip(1) {
        let cells: Vec<String> = row.select(&ANY_CELL_SELECTOR).map(cell_text).collect();
        if cells.len() == set.columns.len() {
            set.push_row(cells);
        }
    }
    Ok(set)
}

/// Concatenated text content of a cell, kept exactly as the page renders it.
fn cell_text(cell: ElementRef) -> String {
    cell.text().collect()
}
