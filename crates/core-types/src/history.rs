use crate::dates::{DateShift, shift_date};
use crate::error::CoreError;
use crate::structs::DailyBar;
use chrono::NaiveDate;
use std::collections::HashMap;

/// A daily price history ordered by **descending** date, indexed by calendar date.
///
/// Index 0 holds the most recent bar, so moving forward in time means moving
/// toward lower indices. Date lookups are exact-match only.
#[derive(Debug, Clone, Default)]
pub struct PriceHistory {
    bars: Vec<DailyBar>,
    index: HashMap<NaiveDate, usize>,
}

impl PriceHistory {
    /// Builds a history from bars in any order.
    ///
    /// Bars are stably sorted newest-first. When a date occurs more than once,
    /// the index points at the last occurrence in input order.
    pub fn from_bars(mut bars: Vec<DailyBar>) -> Self {
        let already_descending = bars.windows(2).all(|w| w[0].date >= w[1].date);
        if !already_descending {
            tracing::debug!("Price history was not in descending date order; sorting.");
            bars.sort_by(|a, b| b.date.cmp(&a.date));
        }

        let mut index = HashMap::with_capacity(bars.len());
        for (position, bar) in bars.iter().enumerate() {
            if index.insert(bar.date, position).is_some() {
                tracing::warn!(date = %bar.date, "Duplicate date in price history; keeping the later entry.");
            }
        }

        Self { bars, index }
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Number of distinct dates available for lookup.
    pub fn indexed_dates(&self) -> usize {
        self.index.len()
    }

    pub fn bars(&self) -> &[DailyBar] {
        &self.bars
    }

    pub fn get(&self, position: usize) -> Option<&DailyBar> {
        self.bars.get(position)
    }

    /// Exact-match lookup of a calendar date.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.index.get(&date).copied()
    }

    /// Finds the first indexed date at or after `date`, probing at most
    /// `max_days` calendar days (the starting date counts as the first probe).
    pub fn nearest_forward(&self, date: NaiveDate, max_days: u32) -> Option<(usize, NaiveDate)> {
        let mut probe = date;
        for _ in 0..max_days {
            if let Some(position) = self.position(probe) {
                return Some((position, probe));
            }
            probe = shift_date(probe, DateShift::Days(1))?;
        }
        None
    }

    /// Borrows the bars between two positions, inclusive of both.
    ///
    /// `start` is the older boundary and must not be smaller than `end`.
    pub fn window(&self, start: usize, end: usize) -> Result<Window<'_>, CoreError> {
        if start < end || start >= self.bars.len() {
            return Err(CoreError::InvalidWindow {
                start,
                end,
                len: self.bars.len(),
            });
        }
        Ok(Window {
            bars: &self.bars[end..=start],
        })
    }
}

/// A contiguous, non-empty slice of a [`PriceHistory`].
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    // newest first, like the history it borrows from
    bars: &'a [DailyBar],
}

impl<'a> Window<'a> {
    /// Iterates the window forward in time, from the start bar to the end bar.
    pub fn chronological(&self) -> impl DoubleEndedIterator<Item = &'a DailyBar> + ExactSizeIterator {
        self.bars.iter().rev()
    }

    /// Number of trading days in the window, both boundaries included.
    pub fn trading_days(&self) -> usize {
        self.bars.len()
    }

    /// The oldest bar, where the window opens.
    pub fn first(&self) -> &'a DailyBar {
        &self.bars[self.bars.len() - 1]
    }

    /// The newest bar, where the window closes.
    pub fn last(&self) -> &'a DailyBar {
        &self.bars[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn bar(day: u32) -> DailyBar {
        DailyBar {
            date: NaiveDate::from_ymd_opt(2023, 1, day).unwrap(),
            open: dec!(100),
            close: dec!(100),
            low: dec!(99),
            high: dec!(101),
            percent_change: 0.0,
        }
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, day).unwrap()
    }

    #[test]
    fn sorts_newest_first_and_indexes_dates() {
        let history = PriceHistory::from_bars(vec![bar(2), bar(3), bar(5)]);
        assert_eq!(history.bars()[0].date, date(5));
        assert_eq!(history.position(date(5)), Some(0));
        assert_eq!(history.position(date(2)), Some(2));
        assert_eq!(history.position(date(4)), None);
    }

    #[test]
    fn duplicate_dates_keep_last_entry() {
        let mut later = bar(3);
        later.close = dec!(120);
        let history = PriceHistory::from_bars(vec![bar(3), later, bar(2)]);
        assert_eq!(history.len(), 3);
        assert_eq!(history.indexed_dates(), 2);
        let position = history.position(date(3)).unwrap();
        assert_eq!(position, 1);
        assert_eq!(history.get(position).unwrap().close, dec!(120));

        // Sorting is stable, so input order still decides among equal dates.
        let mut last = bar(3);
        last.close = dec!(130);
        let history = PriceHistory::from_bars(vec![bar(2), bar(3), last]);
        let position = history.position(date(3)).unwrap();
        assert_eq!(history.get(position).unwrap().close, dec!(130));
    }

    #[test]
    fn nearest_forward_skips_gaps_and_respects_cap() {
        // 6th and 7th missing (weekend)
        let history = PriceHistory::from_bars(vec![bar(9), bar(5)]);
        assert_eq!(history.nearest_forward(date(6), 5), Some((0, date(9))));
        assert_eq!(history.nearest_forward(date(5), 1), Some((1, date(5))));
        assert_eq!(history.nearest_forward(date(6), 3), None);
        assert_eq!(history.nearest_forward(date(10), 30), None);
    }

    #[test]
    fn window_walks_forward_in_time() {
        let history = PriceHistory::from_bars(vec![bar(4), bar(3), bar(2)]);
        let window = history.window(2, 0).unwrap();
        let dates: Vec<_> = window.chronological().map(|b| b.date).collect();
        assert_eq!(dates, vec![date(2), date(3), date(4)]);
        assert_eq!(window.trading_days(), 3);
        assert_eq!(window.first().date, date(2));
        assert_eq!(window.last().date, date(4));
    }

    #[test]
    fn single_day_window_is_valid() {
        let history = PriceHistory::from_bars(vec![bar(4), bar(3)]);
        let window = history.window(1, 1).unwrap();
        assert_eq!(window.trading_days(), 1);
    }

    #[test]
    fn inverted_or_out_of_bounds_window_is_rejected() {
        let history = PriceHistory::from_bars(vec![bar(4), bar(3)]);
        assert_eq!(
            history.window(0, 1).unwrap_err(),
            CoreError::InvalidWindow { start: 0, end: 1, len: 2 }
        );
        assert!(history.window(2, 0).is_err());
    }
}
