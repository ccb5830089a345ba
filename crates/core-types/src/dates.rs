//! Calendar helpers: shifting dates, parsing issue dates and rendering
//! the `dd-MMM-yyyy` textual format in either supported locale.

use crate::enums::Locale;
use chrono::{Datelike, Days, Months, NaiveDate};

const CS_MONTHS: [&str; 12] = [
    "led", "úno", "bře", "dub", "kvě", "čvn", "čvc", "srp", "zář", "říj", "lis", "pro",
];

const EN_MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A signed calendar offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateShift {
    Days(i64),
    Years(i32),
}

/// Shifts `date` by the given offset. Returns `None` if the result falls
/// outside chrono's representable range.
///
/// Year shifts clamp to the end of the month, so 29 February plus one year
/// lands on 28 February.
pub fn shift_date(date: NaiveDate, shift: DateShift) -> Option<NaiveDate> {
    match shift {
        DateShift::Days(n) if n >= 0 => date.checked_add_days(Days::new(n.unsigned_abs())),
        DateShift::Days(n) => date.checked_sub_days(Days::new(n.unsigned_abs())),
        DateShift::Years(n) => {
            let months = Months::new(n.unsigned_abs().checked_mul(12)?);
            if n >= 0 {
                date.checked_add_months(months)
            } else {
                date.checked_sub_months(months)
            }
        }
    }
}

/// Renders a date as `dd-MMM-yyyy` using the locale's abbreviated month names.
pub fn format_date(date: NaiveDate, locale: Locale) -> String {
    let months = match locale {
        Locale::Cs => &CS_MONTHS,
        Locale::En => &EN_MONTHS,
    };
    format!(
        "{:02}-{}-{:04}",
        date.day(),
        months[date.month0() as usize],
        date.year()
    )
}

/// Parses an issue date as written in a target-price table.
///
/// Accepts `dd-MMM-yyyy` with Czech or English month abbreviations,
/// ISO `yyyy-mm-dd` and `dd.mm.yyyy`.
pub fn parse_issue_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(text, "%d.%m.%Y") {
        return Some(date);
    }

    let mut parts = text.splitn(3, '-');
    let day: u32 = parts.next()?.trim().parse().ok()?;
    let month = month_from_abbreviation(parts.next()?.trim())?;
    let year: i32 = parts.next()?.trim().parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_from_abbreviation(abbr: &str) -> Option<u32> {
    let lower = abbr.trim_end_matches('.').to_lowercase();
    CS_MONTHS
        .iter()
        .position(|m| *m == lower)
        .or_else(|| EN_MONTHS.iter().position(|m| m.to_lowercase() == lower))
        .map(|i| i as u32 + 1)
}
