//! # Target Audit Storage Crate
//!
//! This crate is the file-system boundary of the system. It reads the two input
//! tables of a batch item, either as delimited files or as named sheets of one
//! spreadsheet workbook, and appends resolved outcomes to the output file.
//!
//! ## Architectural Principles
//!
//! - **Layer 2 Adapter:** All knowledge of delimiters, header rows, column positions
//!   and number formatting lives here. The analytics layer only ever sees typed
//!   `TargetPriceEvent`s, a `PriceHistory` and `AnalysisOutcome`s.
//! - **Row-level tolerance:** A malformed row is logged and skipped; only a missing
//!   file, a missing sheet or an empty table fails the load.
//! - **Append-only output:** Re-running a batch appends rows, and the header is
//!   written only into a new or empty file.
//!
//! ## Public API
//!
//! - `load_target_prices` / `load_price_history`: the delimited-file loaders.
//! - `load_target_prices_from_workbook` / `load_price_history_from_workbook`: the
//!   same tables read from a named workbook sheet.
//! - `OutcomeWriter`: the append-only outcome sink.
//! - `StorageError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod error;
pub mod loader;
pub mod workbook;
pub mod writer;

// Re-export the key components to create a clean, public-facing API.
pub use error::StorageError;
pub use loader::{load_price_history, load_target_prices, parse_number};
pub use workbook::{
    load_price_history_from_workbook, load_target_prices_from_workbook, workbook_sheet_names,
};
pub use writer::OutcomeWriter;
