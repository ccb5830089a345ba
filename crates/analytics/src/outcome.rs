use crate::analyzer::TargetScan;
use crate::stats::WindowStats;
use chrono::NaiveDate;
use core_types::{Direction, DirectionMatch, TargetPriceEvent};
use rust_decimal::Decimal;
use rust_decimal::prelude::*;

/// The fully resolved result of one target-price event.
///
/// Built once by the `EventAnalyzer` after the scan and the window statistics
/// are known. Every return, difference and accuracy metric is derived from
/// these fields on read and never cached. Ratios that would divide by zero
/// come back as `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub issue_date: NaiveDate,
    /// One horizon after issuance, or the next trading date if that day had no bar.
    pub horizon_end: NaiveDate,
    pub issuer: String,
    pub target_price: Decimal,
    pub open_price: Decimal,
    /// Close on the last day of the window.
    pub close_price: Decimal,
    pub direction: Direction,
    pub reached: bool,
    pub reached_date: NaiveDate,
    /// Trading days before the hit, or the whole window when unreached.
    pub days_to_reach: usize,
    /// Price the realized return is measured at.
    pub profit: Decimal,
    pub stats: WindowStats,
}

impl AnalysisOutcome {
    pub fn new(
        event: &TargetPriceEvent,
        horizon_end: NaiveDate,
        open_price: Decimal,
        scan: TargetScan,
        stats: WindowStats,
    ) -> Self {
        Self {
            issue_date: event.issue_date,
            horizon_end,
            issuer: event.issuer.clone(),
            target_price: event.price,
            open_price,
            close_price: scan.final_close,
            direction: scan.direction,
            reached: scan.reached,
            reached_date: scan.reached_date,
            days_to_reach: scan.days_to_reach,
            profit: scan.profit,
            stats,
        }
    }

    /// Trading days in the window, both boundaries included.
    pub fn window_days(&self) -> usize {
        self.stats.trading_days
    }

    pub fn calendar_days_to_reach(&self) -> i64 {
        (self.reached_date - self.issue_date).num_days()
    }

    pub fn calendar_window_days(&self) -> i64 {
        (self.horizon_end - self.issue_date).num_days()
    }

    /// Did the window close move in the predicted direction?
    pub fn direction_match(&self) -> DirectionMatch {
        if self.target_price == self.open_price {
            return DirectionMatch::NotApplicable;
        }
        let matched = match self.direction {
            Direction::Higher => self.close_price > self.open_price,
            Direction::Lower => self.close_price < self.open_price,
        };
        if matched {
            DirectionMatch::Yes
        } else {
            DirectionMatch::No
        }
    }

    // --- Returns ---

    pub fn absolute_expected_return(&self) -> Decimal {
        self.signed_move(self.target_price)
    }

    /// Can be negative when the price moved against the prediction.
    pub fn absolute_realized_return(&self) -> Decimal {
        self.signed_move(self.profit)
    }

    pub fn relative_expected_return(&self) -> Option<Decimal> {
        percent_of(self.absolute_expected_return(), self.open_price)
    }

    pub fn relative_realized_return(&self) -> Option<Decimal> {
        percent_of(self.absolute_realized_return(), self.open_price)
    }

    pub fn absolute_difference(&self) -> Decimal {
        self.absolute_expected_return() - self.absolute_realized_return()
    }

    pub fn percentage_point_difference(&self) -> Option<Decimal> {
        Some(self.relative_expected_return()? - self.relative_realized_return()?)
    }

    /// Shortfall of the realized return as a percentage of the expected one.
    pub fn relative_difference(&self) -> Option<Decimal> {
        percent_of(
            self.percentage_point_difference()?,
            self.relative_expected_return()?,
        )
    }

    /// Expected return compounded to a yearly rate over issue -> horizon end.
    pub fn annualized_expected_return(&self) -> Option<f64> {
        annualize(self.relative_expected_return()?, self.calendar_window_days())
    }

    /// Realized return compounded to a yearly rate over issue -> reached date.
    pub fn annualized_realized_return(&self) -> Option<f64> {
        annualize(self.relative_realized_return()?, self.calendar_days_to_reach())
    }

    // --- Accuracy ---

    /// How far the window extreme in the predicted direction went past the target.
    pub fn absolute_accuracy(&self) -> Decimal {
        match self.direction {
            Direction::Higher => self.stats.max_high - self.target_price,
            Direction::Lower => self.target_price - self.stats.min_low,
        }
    }

    pub fn relative_accuracy(&self) -> Option<Decimal> {
        percent_of(self.absolute_accuracy(), self.target_price)
    }

    fn signed_move(&self, price: Decimal) -> Decimal {
        match self.direction {
            Direction::Higher => price - self.open_price,
            Direction::Lower => self.open_price - price,
        }
    }
}

/// `value / base * 100`, or `None` when `base` is zero.
fn percent_of(value: Decimal, base: Decimal) -> Option<Decimal> {
    value
        .checked_div(base)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
}

/// Compounds a percentage return earned over `days` calendar days to a yearly rate.
///
/// A zero-day span returns the rate unchanged. Non-finite results are `None`.
pub fn annualize(rate_pct: Decimal, days: i64) -> Option<f64> {
    let rate = rate_pct.to_f64()?;
    if days == 0 {
        return Some(rate);
    }
    let annual = ((1.0 + rate / 100.0).powf(365.0 / days as f64) - 1.0) * 100.0;
    annual.is_finite().then_some(annual)
}
