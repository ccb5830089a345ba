use chrono::NaiveDate;
use core_types::Window;
use rust_decimal::Decimal;

/// Descriptive statistics over one observation window.
#[derive(Debug, Clone, PartialEq)]
pub struct WindowStats {
    pub max_high: Decimal,
    pub max_high_date: NaiveDate,
    pub min_low: Decimal,
    pub min_low_date: NaiveDate,
    pub avg_open: Decimal,
    pub avg_close: Decimal,
    /// Sample standard deviation of the daily percent change.
    pub volatility: f64,
    /// Bars in the window, both boundary days included.
    pub trading_days: usize,
}

impl WindowStats {
    /// Computes extremes, averages and volatility in a single forward pass.
    ///
    /// Ties on the extremes keep the chronologically first date.
    pub fn compute(window: &Window<'_>) -> Self {
        let first = window.first();
        let mut max_high = first.high;
        let mut max_high_date = first.date;
        let mut min_low = first.low;
        let mut min_low_date = first.date;
        let mut sum_open = Decimal::ZERO;
        let mut sum_close = Decimal::ZERO;
        let mut changes = Vec::with_capacity(window.trading_days());

        for bar in window.chronological() {
            if bar.high > max_high {
                max_high = bar.high;
                max_high_date = bar.date;
            }
            if bar.low < min_low {
                min_low = bar.low;
                min_low_date = bar.date;
            }
            sum_open += bar.open;
            sum_close += bar.close;
            changes.push(bar.percent_change);
        }

        let count = Decimal::from(window.trading_days());

        Self {
            max_high,
            max_high_date,
            min_low,
            min_low_date,
            avg_open: sum_open / count,
            avg_close: sum_close / count,
            volatility: sample_std_dev(&changes),
            trading_days: window.trading_days(),
        }
    }
}

/// Sample standard deviation (divisor n - 1). Zero for fewer than two values.
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let sum_squared_diff: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_squared_diff / (n - 1.0)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::{DailyBar, PriceHistory};
    use rust_decimal_macros::dec;

    fn bar(day: u32, open: Decimal, close: Decimal, low: Decimal, high: Decimal, change: f64) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2023, 3, day).unwrap(),
            open,
            close,
            low,
            high,
            percent_change: change,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 3, day).unwrap()
    }

    #[test]
    fn std_dev_matches_closed_form() {
        let value = sample_std_dev(&[1.0, -1.0, 2.0]);
        // mean 2/3, squared deviations sum to 14/3, divided by 2 -> 7/3
        assert!((value - (7.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((value - 1.528).abs() < 1e-3);
    }

    #[test]
    fn std_dev_is_zero_below_two_values() {
        assert_eq!(sample_std_dev(&[]), 0.0);
        assert_eq!(sample_std_dev(&[3.5]), 0.0);
    }

    #[test]
    fn extremes_keep_earliest_date_on_ties() {
        let history = PriceHistory::from_bars(vec![
            bar(1, dec!(100), dec!(101), dec!(95), dec!(110), 1.0),
            bar(2, dec!(101), dec!(102), dec!(95), dec!(108), -1.0),
            bar(3, dec!(102), dec!(103), dec!(97), dec!(110), 2.0),
        ]);
        let window = history.window(2, 0).unwrap();
        let stats = WindowStats::compute(&window);

        assert_eq!(stats.max_high, dec!(110));
        assert_eq!(stats.max_high_date, date(1));
        assert_eq!(stats.min_low, dec!(95));
        assert_eq!(stats.min_low_date, date(1));
        assert_eq!(stats.avg_open, dec!(101));
        assert_eq!(stats.avg_close, dec!(102));
        assert_eq!(stats.trading_days, 3);
        assert!((stats.volatility - 1.5275).abs() < 1e-3);
    }

    #[test]
    fn single_day_window_has_zero_volatility() {
        let history = PriceHistory::from_bars(vec![bar(1, dec!(50), dec!(52), dec!(49), dec!(53), 4.0)]);
        let stats = WindowStats::compute(&history.window(0, 0).unwrap());
        assert_eq!(stats.volatility, 0.0);
        assert_eq!(stats.max_high_date, date(1));
        assert_eq!(stats.avg_close, dec!(52));
    }
}
