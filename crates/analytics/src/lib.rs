//! # Target Price Analytics
//!
//! This crate decides, for each analyst target price, whether the market reached
//! it within the horizon and how the realized outcome compared to the prediction.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** This is a pure logic crate. It has no knowledge of files or
//!   sheets. It depends only on `core-types` and the analysis settings.
//! - **Resolve, then derive:** The `EventAnalyzer` walks the price window once and
//!   produces an immutable `AnalysisOutcome`. Every return and accuracy metric is
//!   derived from that value on read, so nothing can be observed half-populated.
//!
//! ## Public API
//!
//! - `EventAnalyzer`: window resolution, the target-attainment scan and window statistics.
//! - `AnalysisOutcome`: the resolved event with its derived metrics.
//! - `report`: the 33-column header and record rendering.
//! - `AnalyticsError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod analyzer;
pub mod error;
pub mod outcome;
pub mod report;
pub mod stats;

// Re-export the key components to create a clean, public-facing API.
pub use analyzer::{Boundary, EventAnalyzer, EventResolution, SkipReason, TargetScan, scan_target};
pub use error::AnalyticsError;
pub use outcome::{AnalysisOutcome, annualize};
pub use report::{COLUMN_COUNT, FIELD_DELIMITER, header, render_record};
pub use stats::{WindowStats, sample_std_dev};
