use crate::error::StorageError;
use crate::loader::parse_number;
use calamine::{Data, DataType, Range, Reader, open_workbook_auto};
use chrono::NaiveDate;
use core_types::{DailyBar, PriceHistory, TargetPriceEvent, parse_issue_date};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;
use tracing::{debug, info, warn};

// Column positions of a target-price sheet.
const TARGET_DATE: u32 = 0;
const TARGET_ISSUER: u32 = 1;
const TARGET_PRICE: u32 = 4;

// Column positions of a price sheet.
const PRICE_DATE: u32 = 0;
const PRICE_OPEN: u32 = 2;
const PRICE_CLOSE: u32 = 3;
const PRICE_CHANGE: u32 = 4;
const PRICE_LOW: u32 = 5;
const PRICE_HIGH: u32 = 6;

/// Lists the sheet names of a workbook in their stored order.
pub fn workbook_sheet_names(path: &Path) -> Result<Vec<String>, StorageError> {
    if !path.is_file() {
        return Err(StorageError::MissingInput(path.to_path_buf()));
    }
    let workbook = open_workbook_auto(path).map_err(|source| StorageError::Workbook {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(workbook.sheet_names())
}

/// Loads the target-price events of one workbook sheet, in row order.
///
/// Row 1 is a header. The issue date may be a date cell or text in any accepted
/// date format; the issuer and price come from columns B and E.
pub fn load_target_prices_from_workbook(
    path: &Path,
    sheet: &str,
) -> Result<Vec<TargetPriceEvent>, StorageError> {
    let range = read_sheet(path, sheet)?;
    let events = collect_rows(path, sheet, &range, parse_target_row)?;
    info!(path = %path.display(), sheet, rows = events.len(), "Loaded target prices.");
    Ok(events)
}

/// Loads the daily price history of one workbook sheet.
///
/// Only rows whose first cell is date-formatted are kept, so notes and
/// subtotal rows between the bars are passed over.
pub fn load_price_history_from_workbook(path: &Path, sheet: &str) -> Result<PriceHistory, StorageError> {
    let range = read_sheet(path, sheet)?;
    let bars = collect_rows(path, sheet, &range, parse_price_row)?;
    let history = PriceHistory::from_bars(bars);
    info!(
        path = %path.display(),
        sheet,
        rows = history.len(),
        indexed_dates = history.indexed_dates(),
        "Loaded price history."
    );
    Ok(history)
}

fn read_sheet(path: &Path, sheet: &str) -> Result<Range<Data>, StorageError> {
    if !path.is_file() {
        return Err(StorageError::MissingInput(path.to_path_buf()));
    }
    let workbook_error = |source| StorageError::Workbook {
        path: path.to_path_buf(),
        source,
    };

    let mut workbook = open_workbook_auto(path).map_err(workbook_error)?;
    if !workbook.sheet_names().iter().any(|name| name == sheet) {
        return Err(StorageError::MissingSheet {
            path: path.to_path_buf(),
            sheet: sheet.to_string(),
        });
    }
    workbook.worksheet_range(sheet).map_err(workbook_error)
}

/// A failed row: either skipped quietly or reported as malformed.
enum RowError {
    NotData,
    Malformed(String),
}

fn collect_rows<T>(
    path: &Path,
    sheet: &str,
    range: &Range<Data>,
    parse: fn(&SheetRow) -> Result<T, RowError>,
) -> Result<Vec<T>, StorageError> {
    let empty = || StorageError::EmptyTable(path.to_path_buf());
    let (Some((first, _)), Some((last, _))) = (range.start(), range.end()) else {
        return Err(empty());
    };

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    // Absolute row 0 is the header, wherever the used range begins.
    for row in first.max(1)..=last {
        let sheet_row = SheetRow { range, row };
        if sheet_row.is_blank() {
            continue;
        }
        match parse(&sheet_row) {
            Ok(parsed) => rows.push(parsed),
            Err(RowError::NotData) => debug!(path = %path.display(), sheet, row = row + 1, "Skipping non-date row."),
            Err(RowError::Malformed(reason)) => {
                warn!(path = %path.display(), sheet, row = row + 1, %reason, "Skipping malformed row.");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), sheet, skipped, "Some rows were skipped.");
    }
    if rows.is_empty() {
        return Err(empty());
    }
    Ok(rows)
}

struct SheetRow<'a> {
    range: &'a Range<Data>,
    row: u32,
}

impl SheetRow<'_> {
    fn cell(&self, column: u32) -> Option<&Data> {
        self.range
            .get_value((self.row, column))
            .filter(|cell| !matches!(cell, Data::Empty))
    }

    fn is_blank(&self) -> bool {
        let Some((_, first_column)) = self.range.start() else {
            return true;
        };
        let Some((_, last_column)) = self.range.end() else {
            return true;
        };
        (first_column..=last_column).all(|column| self.cell(column).is_none())
    }

    fn required(&self, column: u32) -> Result<&Data, RowError> {
        self.cell(column)
            .ok_or_else(|| RowError::Malformed(format!("column {} is missing", column + 1)))
    }

    fn number(&self, column: u32) -> Result<Decimal, RowError> {
        let cell = self.required(column)?;
        let value = match cell {
            Data::Float(f) => Decimal::try_from(*f).ok(),
            Data::Int(i) => Some(Decimal::from(*i)),
            Data::String(text) => parse_number(text),
            _ => None,
        };
        value.ok_or_else(|| RowError::Malformed(format!("column {}: invalid number '{cell}'", column + 1)))
    }

    fn price(&self, column: u32) -> Result<Decimal, RowError> {
        self.number(column).map(|price| price.trunc())
    }
}

/// Date-formatted cells only; a plain number in the date column is not a date.
fn date_value(cell: &Data) -> Option<NaiveDate> {
    match cell {
        Data::DateTime(_) | Data::DateTimeIso(_) => cell.as_date(),
        _ => None,
    }
}

fn parse_target_row(row: &SheetRow) -> Result<TargetPriceEvent, RowError> {
    let date_cell = row.required(TARGET_DATE)?;
    let issue_date = match date_cell {
        Data::String(text) => parse_issue_date(text),
        other => date_value(other),
    }
    .ok_or_else(|| RowError::Malformed(format!("column {}: invalid date '{date_cell}'", TARGET_DATE + 1)))?;

    let issuer = row.required(TARGET_ISSUER)?.to_string();
    let issuer = issuer.trim();
    if issuer.is_empty() {
        return Err(RowError::Malformed(format!("column {} is missing", TARGET_ISSUER + 1)));
    }

    let price = row.price(TARGET_PRICE)?;
    Ok(TargetPriceEvent::new(issue_date, price, issuer))
}

fn parse_price_row(row: &SheetRow) -> Result<DailyBar, RowError> {
    let date = row.cell(PRICE_DATE).and_then(date_value).ok_or(RowError::NotData)?;
    let percent_change = row
        .number(PRICE_CHANGE)?
        .to_f64()
        .ok_or_else(|| RowError::Malformed(format!("column {}: change out of range", PRICE_CHANGE + 1)))?;
    Ok(DailyBar {
        date,
        open: row.price(PRICE_OPEN)?,
        close: row.price(PRICE_CLOSE)?,
        low: row.price(PRICE_LOW)?,
        high: row.price(PRICE_HIGH)?,
        percent_change,
    })
}
