use crate::error::StorageError;
use core_types::{DailyBar, PriceHistory, TargetPriceEvent, parse_issue_date};
use csv::{ReaderBuilder, StringRecord, Trim};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::path::Path;
use std::str::FromStr;
use tracing::{info, warn};

// Column positions of the target-price table.
const TARGET_DATE: usize = 0;
const TARGET_ISSUER: usize = 1;
const TARGET_PRICE: usize = 2;

// Column positions of the price table.
const PRICE_DATE: usize = 0;
const PRICE_OPEN: usize = 1;
const PRICE_CLOSE: usize = 2;
const PRICE_CHANGE: usize = 3;
const PRICE_LOW: usize = 4;
const PRICE_HIGH: usize = 5;

/// Loads the target-price events of one sheet, in file order.
///
/// The first row is a header. Rows with an unparseable date or price are
/// logged and skipped.
pub fn load_target_prices(path: &Path, delimiter: u8) -> Result<Vec<TargetPriceEvent>, StorageError> {
    let events = load_rows(path, delimiter, parse_target_row)?;
    info!(path = %path.display(), rows = events.len(), "Loaded target prices.");
    Ok(events)
}

/// Loads a daily price history and indexes it by date.
///
/// Prices are truncated to whole units.
pub fn load_price_history(path: &Path, delimiter: u8) -> Result<PriceHistory, StorageError> {
    let bars = load_rows(path, delimiter, parse_price_row)?;
    let history = PriceHistory::from_bars(bars);
    info!(
        path = %path.display(),
        rows = history.len(),
        indexed_dates = history.indexed_dates(),
        "Loaded price history."
    );
    Ok(history)
}

fn load_rows<T>(
    path: &Path,
    delimiter: u8,
    parse: fn(&StringRecord) -> Result<T, String>,
) -> Result<Vec<T>, StorageError> {
    if !path.is_file() {
        return Err(StorageError::MissingInput(path.to_path_buf()));
    }

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Skipping unreadable row.");
                skipped += 1;
                continue;
            }
        };
        if record.iter().all(str::is_empty) {
            continue;
        }
        match parse(&record) {
            Ok(row) => rows.push(row),
            Err(reason) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                warn!(path = %path.display(), line, %reason, "Skipping malformed row.");
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        warn!(path = %path.display(), skipped, "Some rows were skipped.");
    }
    if rows.is_empty() {
        return Err(StorageError::EmptyTable(path.to_path_buf()));
    }
    Ok(rows)
}

fn parse_target_row(record: &StringRecord) -> Result<TargetPriceEvent, String> {
    let issue_date = date_cell(record, TARGET_DATE)?;
    let issuer = cell(record, TARGET_ISSUER)?;
    let price = price_cell(record, TARGET_PRICE)?;
    Ok(TargetPriceEvent::new(issue_date, price, issuer))
}

fn parse_price_row(record: &StringRecord) -> Result<DailyBar, String> {
    let percent_change = number_cell(record, PRICE_CHANGE)?
        .to_f64()
        .ok_or_else(|| format!("column {}: change out of range", PRICE_CHANGE + 1))?;
    Ok(DailyBar {
        date: date_cell(record, PRICE_DATE)?,
        open: price_cell(record, PRICE_OPEN)?,
        close: price_cell(record, PRICE_CLOSE)?,
        low: price_cell(record, PRICE_LOW)?,
        high: price_cell(record, PRICE_HIGH)?,
        percent_change,
    })
}

fn cell(record: &StringRecord, column: usize) -> Result<&str, String> {
    match record.get(column) {
        Some(text) if !text.is_empty() => Ok(text),
        _ => Err(format!("column {} is missing", column + 1)),
    }
}

fn date_cell(record: &StringRecord, column: usize) -> Result<chrono::NaiveDate, String> {
    let text = cell(record, column)?;
    parse_issue_date(text).ok_or_else(|| format!("column {}: invalid date '{text}'", column + 1))
}

fn number_cell(record: &StringRecord, column: usize) -> Result<Decimal, String> {
    let text = cell(record, column)?;
    parse_number(text).ok_or_else(|| format!("column {}: invalid number '{text}'", column + 1))
}

fn price_cell(record: &StringRecord, column: usize) -> Result<Decimal, String> {
    number_cell(record, column).map(|price| price.trunc())
}

/// Parses a number as spreadsheets export it.
///
/// Space-like thousands separators (plain, non-breaking and narrow) and a
/// trailing `%` are accepted. When both `,` and `.` appear, the later one is the
/// decimal separator and the other must group the integer digits in threes. A
/// lone `,` groups thousands when every group after the first has exactly three
/// digits (`1,050` is 1050), and is a decimal comma otherwise (`0,5`, `1,05`).
pub fn parse_number(text: &str) -> Option<Decimal> {
    let compact: String = text
        .trim()
        .trim_end_matches('%')
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\u{202f}'))
        .collect();

    let normalized = match (compact.rfind(','), compact.rfind('.')) {
        (Some(comma), Some(dot)) => {
            let (split, grouping) = if comma > dot { (comma, '.') } else { (dot, ',') };
            let (integer, fraction) = compact.split_at(split);
            if !is_grouped(integer, grouping) {
                return None;
            }
            format!("{}.{}", integer.replace(grouping, ""), &fraction[1..])
        }
        (Some(_), None) if is_grouped(&compact, ',') => compact.replace(',', ""),
        (Some(_), None) => compact.replace(',', "."),
        _ => compact,
    };
    if normalized.is_empty() {
        return None;
    }
    Decimal::from_str(&normalized).ok()
}

/// Whether `integer` is a digit run split by `separator` into groups of three
/// after a non-zero lead group of one to three digits.
fn is_grouped(integer: &str, separator: char) -> bool {
    let digits = integer.strip_prefix('-').unwrap_or(integer);
    let all_digits = |group: &str| group.bytes().all(|b| b.is_ascii_digit());

    let mut groups = digits.split(separator);
    let lead = groups.next().unwrap_or_default();
    if !(1..=3).contains(&lead.len()) || lead == "0" || !all_digits(lead) {
        return false;
    }
    let mut rest = groups.peekable();
    rest.peek().is_some() && rest.all(|group| group.len() == 3 && all_digits(group))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::fs;
    use tempfile::TempDir;

    fn write_sheet(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_spreadsheet_numbers() {
        assert_eq!(parse_number("1 234,56"), Some(dec!(1234.56)));
        assert_eq!(parse_number("-0,75 %"), Some(dec!(-0.75)));
        assert_eq!(parse_number("1\u{a0}050"), Some(dec!(1050)));
        assert_eq!(parse_number("12.5"), Some(dec!(12.5)));
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("n/a"), None);
    }

    #[test]
    fn comma_before_three_digits_groups_thousands() {
        assert_eq!(parse_number("1,050"), Some(dec!(1050)));
        assert_eq!(parse_number("12,345,678"), Some(dec!(12345678)));
        assert_eq!(parse_number("1.234,56"), Some(dec!(1234.56)));
        assert_eq!(parse_number("1,234.56"), Some(dec!(1234.56)));
        assert_eq!(parse_number("-1,050.5"), Some(dec!(-1050.5)));

        // Anything else keeps the decimal comma.
        assert_eq!(parse_number("0,5"), Some(dec!(0.5)));
        assert_eq!(parse_number("1,05"), Some(dec!(1.05)));
        assert_eq!(parse_number("0,750"), Some(dec!(0.750)));
        assert_eq!(parse_number("1234,567"), Some(dec!(1234.567)));

        // Mixed separators must group cleanly.
        assert_eq!(parse_number("1,23.5"), None);
        assert_eq!(parse_number("1.2.3,4"), None);
        assert_eq!(parse_number("1,5,6"), None);
    }

    #[test]
    fn comma_delimited_sheet_keeps_thousands_in_quoted_prices() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(
            &dir,
            "prices.csv",
            "date,open,close,change,low,high\n\
             2023-01-02,\"1,050\",\"1,062.40\",\"0,95\",\"1,041\",\"1,070\"\n",
        );

        let history = load_price_history(&path, b',').unwrap();

        let bar = &history.bars()[0];
        assert_eq!(bar.open, dec!(1050));
        assert_eq!(bar.close, dec!(1062));
        assert_eq!(bar.low, dec!(1041));
        assert_eq!(bar.high, dec!(1070));
        assert!((bar.percent_change - 0.95).abs() < 1e-9);
    }

    #[test]
    fn loads_targets_and_skips_malformed_rows() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(
            &dir,
            "targets.csv",
            "Datum;Vydavatel;Cena\n\
             02-led-2023;Broker A;1 050,9\n\
             not-a-date;Broker B;900\n\
             2023-03-15;Broker C;\n\
             16.03.2023;Broker D;875\n",
        );

        let events = load_target_prices(&path, b';').unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0], TargetPriceEvent::new(date(2023, 1, 2), dec!(1050), "Broker A"));
        assert_eq!(events[1].issue_date, date(2023, 3, 16));
        assert_eq!(events[1].issuer, "Broker D");
    }

    #[test]
    fn loads_price_history_newest_first_with_truncated_prices() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(
            &dir,
            "prices.csv",
            "date;open;close;change;low;high\n\
             2023-01-02;100,7;101,2;0,5%;99,9;102,8\n\
             2023-01-03;101;103;1,98 %;100;104\n",
        );

        let history = load_price_history(&path, b';').unwrap();

        assert_eq!(history.len(), 2);
        let newest = &history.bars()[0];
        assert_eq!(newest.date, date(2023, 1, 3));
        assert!((newest.percent_change - 1.98).abs() < 1e-9);
        let oldest = &history.bars()[1];
        assert_eq!(oldest.open, dec!(100));
        assert_eq!(oldest.close, dec!(101));
        assert_eq!(oldest.low, dec!(99));
        assert_eq!(oldest.high, dec!(102));
    }

    #[test]
    fn short_rows_are_malformed() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(
            &dir,
            "prices.csv",
            "date;open;close;change;low;high\n2023-01-02;100;101\n2023-01-03;101;103;1;100;104\n",
        );
        let history = load_price_history(&path, b';').unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn missing_file_is_missing_input() {
        let dir = TempDir::new().unwrap();
        let result = load_target_prices(&dir.path().join("absent.csv"), b';');
        assert!(matches!(result, Err(StorageError::MissingInput(_))));
    }

    #[test]
    fn header_only_table_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(&dir, "targets.csv", "Datum;Vydavatel;Cena\n");
        assert!(matches!(
            load_target_prices(&path, b';'),
            Err(StorageError::EmptyTable(_))
        ));
    }

    #[test]
    fn honours_configured_delimiter() {
        let dir = TempDir::new().unwrap();
        let path = write_sheet(&dir, "targets.tsv", "date\tissuer\tprice\n2023-01-02\tBroker\t500\n");
        let events = load_target_prices(&path, b'\t').unwrap();
        assert_eq!(events[0].price, dec!(500));
    }
}
