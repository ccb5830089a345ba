pub mod dates;
pub mod enums;
pub mod error;
pub mod history;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use dates::{DateShift, format_date, parse_issue_date, shift_date};
pub use enums::{Direction, DirectionMatch, Locale, yes_no};
pub use error::CoreError;
pub use history::{PriceHistory, Window};
pub use structs::{DailyBar, TargetPriceEvent};
