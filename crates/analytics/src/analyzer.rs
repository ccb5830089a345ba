use crate::error::AnalyticsError;
use crate::outcome::AnalysisOutcome;
use crate::stats::WindowStats;
use chrono::NaiveDate;
use configuration::AnalysisSettings;
use core_types::{DateShift, Direction, PriceHistory, TargetPriceEvent, Window, shift_date};
use rust_decimal::Decimal;
use std::fmt;

/// What became of a single target-price event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResolution {
    Resolved(AnalysisOutcome),
    Skipped(SkipReason),
}

/// Why an event produced no output row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The horizon ends after the configured cutoff date.
    BeyondCutoff { horizon_end: NaiveDate, cutoff: NaiveDate },
    /// The target equals the opening price, so it was met at issuance.
    TargetEqualsOpen { price: Decimal },
    /// No trading date was found within the search cap of a boundary.
    NoDataInRange { boundary: Boundary, date: NaiveDate },
}

/// The two ends of an observation window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Issue,
    HorizonEnd,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::BeyondCutoff { horizon_end, cutoff } => {
                write!(f, "horizon end {horizon_end} is after cutoff {cutoff}")
            }
            SkipReason::TargetEqualsOpen { price } => {
                write!(f, "target {price} equals the opening price")
            }
            SkipReason::NoDataInRange { boundary, date } => {
                write!(f, "no trading data near {boundary:?} boundary {date}")
            }
        }
    }
}

/// The result of walking a window forward looking for the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetScan {
    pub direction: Direction,
    pub reached: bool,
    /// The hit day, or the window's last day when the target was not reached.
    pub reached_date: NaiveDate,
    /// Days scanned before the hit (0 = hit on the start day), or the whole window.
    pub days_to_reach: usize,
    /// The target when reached, otherwise the window's final close.
    pub profit: Decimal,
    pub final_close: Decimal,
}

/// Positions of a resolved window plus the horizon end that is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ResolvedWindow {
    start: usize,
    end: usize,
    horizon_end: NaiveDate,
}

/// Resolves target-price events against a price history.
#[derive(Debug, Clone)]
pub struct EventAnalyzer {
    settings: AnalysisSettings,
}

impl EventAnalyzer {
    pub fn new(settings: AnalysisSettings) -> Self {
        Self { settings }
    }

    /// Resolves one event: window lookup, attainment scan and window statistics.
    ///
    /// Events that are out of scope come back as `Skipped`; an unusable window
    /// is an error, which callers log before moving on to the next event.
    pub fn analyze(
        &self,
        history: &PriceHistory,
        event: &TargetPriceEvent,
    ) -> Result<EventResolution, AnalyticsError> {
        let horizon_end = shift_date(
            event.issue_date,
            DateShift::Years(self.settings.horizon_years as i32),
        )
        .ok_or(AnalyticsError::DateOutOfRange(event.issue_date))?;

        if horizon_end > self.settings.cutoff_date {
            return Ok(EventResolution::Skipped(SkipReason::BeyondCutoff {
                horizon_end,
                cutoff: self.settings.cutoff_date,
            }));
        }

        let resolved = match self.resolve_window(history, event.issue_date, horizon_end) {
            Ok(resolved) => resolved,
            Err(reason) => return Ok(EventResolution::Skipped(reason)),
        };

        let open = history
            .get(resolved.start)
            .ok_or(AnalyticsError::MissingBar(resolved.start))?
            .open;
        if event.price == open {
            return Ok(EventResolution::Skipped(SkipReason::TargetEqualsOpen { price: open }));
        }

        let window = history.window(resolved.start, resolved.end)?;
        let scan = scan_target(&window, event.price);
        let stats = WindowStats::compute(&window);

        Ok(EventResolution::Resolved(AnalysisOutcome::new(
            event,
            resolved.horizon_end,
            open,
            scan,
            stats,
        )))
    }

    /// Maps the issue date and horizon end onto history positions.
    ///
    /// A boundary without an exact match moves forward to the next trading date.
    /// The reported horizon end is the date actually found.
    fn resolve_window(
        &self,
        history: &PriceHistory,
        issue_date: NaiveDate,
        horizon_end: NaiveDate,
    ) -> Result<ResolvedWindow, SkipReason> {
        let cap = self.settings.max_search_days;

        let (start, _) = history
            .nearest_forward(issue_date, cap)
            .ok_or(SkipReason::NoDataInRange {
                boundary: Boundary::Issue,
                date: issue_date,
            })?;
        let (end, resolved_end) = history
            .nearest_forward(horizon_end, cap)
            .ok_or(SkipReason::NoDataInRange {
                boundary: Boundary::HorizonEnd,
                date: horizon_end,
            })?;
        if resolved_end != horizon_end {
            tracing::debug!(%horizon_end, %resolved_end, "Horizon end moved to the next trading date.");
        }

        Ok(ResolvedWindow {
            start,
            end,
            horizon_end: resolved_end,
        })
    }
}

/// Walks the window forward in time and stops at the first day that touches the target.
///
/// A target at or above the window open is checked against daily highs,
/// one below it against daily lows.
pub fn scan_target(window: &Window<'_>, target: Decimal) -> TargetScan {
    let direction = Direction::from_target(target, window.first().open);
    let last = window.last();

    for (days, bar) in window.chronological().enumerate() {
        let hit = match direction {
            Direction::Higher => bar.high >= target,
            Direction::Lower => bar.low <= target,
        };
        if hit {
            return TargetScan {
                direction,
                reached: true,
                reached_date: bar.date,
                days_to_reach: days,
                profit: target,
                final_close: last.close,
            };
        }
    }

    TargetScan {
        direction,
        reached: false,
        reached_date: last.date,
        days_to_reach: window.trading_days(),
        profit: last.close,
        final_close: last.close,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::DailyBar;
    use rust_decimal_macros::dec;

    // ============================================================
    // Test Helpers
    // ============================================================

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn flat_bar(date: NaiveDate, price: Decimal) -> DailyBar {
        DailyBar {
            date,
            open: price,
            close: price,
            low: price - dec!(1),
            high: price + dec!(1),
            percent_change: 0.0,
        }
    }

    /// Every calendar day from `from` to `to` with a flat price of 100.
    fn daily_history(from: NaiveDate, to: NaiveDate) -> Vec<DailyBar> {
        from.iter_days()
            .take_while(|d| *d <= to)
            .map(|d| flat_bar(d, dec!(100)))
            .collect()
    }

    fn settings() -> AnalysisSettings {
        AnalysisSettings {
            cutoff_date: date(2025, 2, 1),
            horizon_years: 1,
            max_search_days: 31,
        }
    }

    fn resolved(resolution: EventResolution) -> AnalysisOutcome {
        match resolution {
            EventResolution::Resolved(outcome) => outcome,
            EventResolution::Skipped(reason) => panic!("expected a resolved event, got {reason}"),
        }
    }

    // ============================================================
    // Scan
    // ============================================================

    #[test]
    fn higher_target_hit_on_fifth_day() {
        let issue = date(2023, 1, 2);
        let mut bars = daily_history(issue, date(2024, 1, 2));
        bars[4].high = dec!(106);
        let history = PriceHistory::from_bars(bars);
        let analyzer = EventAnalyzer::new(settings());

        let event = TargetPriceEvent::new(issue, dec!(105), "Broker");
        let outcome = resolved(analyzer.analyze(&history, &event).unwrap());

        assert!(outcome.reached);
        assert_eq!(outcome.direction, Direction::Higher);
        assert_eq!(outcome.reached_date, date(2023, 1, 6));
        assert_eq!(outcome.days_to_reach, 4);
        assert_eq!(outcome.profit, dec!(105));
        assert_eq!(outcome.absolute_expected_return(), dec!(5));
        assert_eq!(outcome.relative_expected_return(), Some(dec!(5)));
        assert_eq!(outcome.horizon_end, date(2024, 1, 2));
    }

    #[test]
    fn lower_target_checks_lows_not_closes() {
        let issue = date(2023, 1, 2);
        let mut bars = daily_history(issue, date(2024, 1, 2));
        // close never gets there, the intraday low does
        bars[10].low = dec!(90);
        let history = PriceHistory::from_bars(bars);
        let analyzer = EventAnalyzer::new(settings());

        let event = TargetPriceEvent::new(issue, dec!(92), "Broker");
        let outcome = resolved(analyzer.analyze(&history, &event).unwrap());

        assert!(outcome.reached);
        assert_eq!(outcome.direction, Direction::Lower);
        assert_eq!(outcome.days_to_reach, 10);
        assert_eq!(outcome.profit, dec!(92));
        assert_eq!(outcome.close_price, dec!(100));
    }

    #[test]
    fn unreached_target_reports_window_end() {
        let issue = date(2023, 1, 2);
        let history = PriceHistory::from_bars(daily_history(issue, date(2024, 1, 2)));
        let analyzer = EventAnalyzer::new(settings());

        let event = TargetPriceEvent::new(issue, dec!(150), "Broker");
        let outcome = resolved(analyzer.analyze(&history, &event).unwrap());

        assert!(!outcome.reached);
        assert_eq!(outcome.reached_date, date(2024, 1, 2));
        assert_eq!(outcome.days_to_reach, outcome.stats.trading_days);
        assert_eq!(outcome.stats.trading_days, 366);
        assert_eq!(outcome.profit, dec!(100));
        assert!(outcome.reached_date <= outcome.horizon_end);
    }

    #[test]
    fn hit_on_start_day_counts_zero_days() {
        let day = date(2023, 1, 2);
        let mut first = flat_bar(day, dec!(100));
        first.high = dec!(110);
        let history = PriceHistory::from_bars(vec![flat_bar(date(2023, 1, 3), dec!(100)), first]);
        let window = history.window(1, 0).unwrap();

        let scan = scan_target(&window, dec!(108));
        assert!(scan.reached);
        assert_eq!(scan.days_to_reach, 0);
        assert_eq!(scan.reached_date, day);
    }

    // ============================================================
    // Window resolution
    // ============================================================

    #[test]
    fn issue_date_on_weekend_moves_to_next_trading_day() {
        // 2023-01-07 is a Saturday; the history skips to Monday the 9th
        let mut bars = daily_history(date(2023, 1, 9), date(2024, 1, 9));
        bars[0].open = dec!(98);
        let history = PriceHistory::from_bars(bars);
        let analyzer = EventAnalyzer::new(settings());

        let event = TargetPriceEvent::new(date(2023, 1, 7), dec!(120), "Broker");
        let outcome = resolved(analyzer.analyze(&history, &event).unwrap());

        assert_eq!(outcome.open_price, dec!(98));
        assert_eq!(outcome.issue_date, date(2023, 1, 7));
        assert_eq!(outcome.horizon_end, date(2024, 1, 7));
    }

    #[test]
    fn missing_horizon_end_reports_the_date_found() {
        let issue = date(2023, 1, 2);
        let mut bars = daily_history(issue, date(2023, 12, 31));
        bars.push(flat_bar(date(2024, 1, 5), dec!(100)));
        let history = PriceHistory::from_bars(bars);
        let analyzer = EventAnalyzer::new(settings());

        let event = TargetPriceEvent::new(issue, dec!(150), "Broker");
        let outcome = resolved(analyzer.analyze(&history, &event).unwrap());

        assert_eq!(outcome.horizon_end, date(2024, 1, 5));
        assert_eq!(outcome.reached_date, date(2024, 1, 5));
    }

    #[test]
    fn horizon_past_cutoff_is_skipped() {
        let issue = date(2024, 6, 1);
        let history = PriceHistory::from_bars(daily_history(issue, date(2024, 12, 31)));
        let analyzer = EventAnalyzer::new(settings());

        let event = TargetPriceEvent::new(issue, dec!(120), "Broker");
        assert_eq!(
            analyzer.analyze(&history, &event).unwrap(),
            EventResolution::Skipped(SkipReason::BeyondCutoff {
                horizon_end: date(2025, 6, 1),
                cutoff: date(2025, 2, 1),
            })
        );
    }

    #[test]
    fn target_equal_to_open_is_skipped() {
        let issue = date(2023, 1, 2);
        let history = PriceHistory::from_bars(daily_history(issue, date(2024, 1, 2)));
        let analyzer = EventAnalyzer::new(settings());

        let event = TargetPriceEvent::new(issue, dec!(100), "Broker");
        assert_eq!(
            analyzer.analyze(&history, &event).unwrap(),
            EventResolution::Skipped(SkipReason::TargetEqualsOpen { price: dec!(100) })
        );
    }

    #[test]
    fn history_ending_before_horizon_is_bounded() {
        let issue = date(2023, 1, 2);
        let history = PriceHistory::from_bars(daily_history(issue, date(2023, 6, 30)));
        let analyzer = EventAnalyzer::new(settings());

        let event = TargetPriceEvent::new(issue, dec!(120), "Broker");
        assert_eq!(
            analyzer.analyze(&history, &event).unwrap(),
            EventResolution::Skipped(SkipReason::NoDataInRange {
                boundary: Boundary::HorizonEnd,
                date: date(2024, 1, 2),
            })
        );
    }

    #[test]
    fn issue_before_history_is_bounded() {
        let history = PriceHistory::from_bars(daily_history(date(2023, 6, 1), date(2024, 6, 1)));
        let analyzer = EventAnalyzer::new(settings());

        let event = TargetPriceEvent::new(date(2023, 1, 2), dec!(120), "Broker");
        assert!(matches!(
            analyzer.analyze(&history, &event).unwrap(),
            EventResolution::Skipped(SkipReason::NoDataInRange { boundary: Boundary::Issue, .. })
        ));
    }

    #[test]
    fn directional_consistency_over_many_targets() {
        let issue = date(2023, 1, 2);
        let mut bars = daily_history(issue, date(2024, 1, 2));
        for (i, bar) in bars.iter_mut().enumerate() {
            let wiggle = Decimal::from((i % 7) as i64);
            bar.high = dec!(100) + wiggle;
            bar.low = dec!(100) - wiggle;
        }
        let history = PriceHistory::from_bars(bars);
        let analyzer = EventAnalyzer::new(settings());

        for target in [80, 94, 95, 99, 101, 105, 106, 107, 130] {
            let event = TargetPriceEvent::new(issue, Decimal::from(target), "Broker");
            let outcome = resolved(analyzer.analyze(&history, &event).unwrap());
            let touched = match outcome.direction {
                Direction::Higher => outcome.stats.max_high >= outcome.target_price,
                Direction::Lower => outcome.stats.min_low <= outcome.target_price,
            };
            assert_eq!(outcome.reached, touched, "target {target}");
            assert!(outcome.days_to_reach <= outcome.stats.trading_days);
            assert!(outcome.reached_date >= outcome.issue_date);
            assert!(outcome.reached_date <= outcome.horizon_end);
        }
    }
}
