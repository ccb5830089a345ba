use chrono::NaiveDate;
use core_types::CoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AnalyticsError {
    #[error("Window cannot be analyzed: {0}")]
    InvalidWindow(#[from] CoreError),

    #[error("Shifting {0} by the configured horizon leaves the supported date range")]
    DateOutOfRange(NaiveDate),

    #[error("Price history has no bar at position {0}")]
    MissingBar(usize),
}
