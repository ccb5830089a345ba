use chrono::NaiveDate;
use rust_decimal::Decimal;

/// One trading day of a price history.
///
/// Prices are whole units; `percent_change` is the day-over-day change in percent.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyBar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub close: Decimal,
    pub low: Decimal,
    pub high: Decimal,
    pub percent_change: f64,
}

/// A single published analyst target price.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetPriceEvent {
    pub issue_date: NaiveDate,
    pub price: Decimal,
    pub issuer: String,
}

impl TargetPriceEvent {
    pub fn new(issue_date: NaiveDate, price: Decimal, issuer: impl Into<String>) -> Self {
        Self {
            issue_date,
            price,
            issuer: issuer.into(),
        }
    }
}
