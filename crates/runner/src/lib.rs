//! # Target Audit Runner
//!
//! The batch driver. It walks the configured (target sheet, price sheet) pairs in
//! order and, for each pair, loads both tables, resolves every target-price event
//! and appends the outcomes to that pair's output file.
//!
//! ## Architectural Principles
//!
//! - **Layer 3 Orchestrator:** Owns no analysis logic. It wires `storage` loaders,
//!   the `analytics` `EventAnalyzer` and the `OutcomeWriter` together.
//! - **Failure isolation:** A failed batch item is logged and reported in its
//!   `SheetSummary`; the remaining items still run. Within an item, a bad event
//!   never stops the events after it.
//! - **Explicit configuration:** Everything it needs arrives in the `Config` value
//!   handed to `BatchRunner::new`.

use analytics::{AnalyticsError, EventAnalyzer, EventResolution, SkipReason};
use configuration::{BatchItem, Config, InputFormat};
use core_types::{PriceHistory, TargetPriceEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use storage::{
    OutcomeWriter, load_price_history, load_price_history_from_workbook, load_target_prices,
    load_target_prices_from_workbook, workbook_sheet_names,
};
use tracing::{debug, error, info, warn};

pub mod error;
pub mod summary;

pub use error::RunnerError;
pub use summary::{InputStatus, SheetCounts, SheetStatus, SheetSummary};

/// Runs every configured batch item through the analysis.
pub struct BatchRunner {
    config: Config,
    analyzer: EventAnalyzer,
    show_progress: bool,
}

impl BatchRunner {
    pub fn new(config: Config) -> Self {
        let analyzer = EventAnalyzer::new(config.analysis.clone());
        Self {
            config,
            analyzer,
            show_progress: true,
        }
    }

    /// Turns the per-sheet progress bar on or off.
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Processes all batch items in order and reports one summary per item.
    pub fn run(&self) -> Vec<SheetSummary> {
        info!(
            items = self.config.batch.len(),
            cutoff = %self.config.analysis.cutoff_date,
            "Starting target price analysis."
        );

        self.config
            .batch
            .iter()
            .map(|item| {
                let output = self.config.output.output_path(&item.target_sheet);
                let status = match self.run_item(item) {
                    Ok(counts) => {
                        info!(
                            sheet = %item.target_sheet,
                            events = counts.events,
                            written = counts.written,
                            skipped = counts.skipped(),
                            invalid = counts.invalid,
                            "Sheet finished."
                        );
                        SheetStatus::Completed(counts)
                    }
                    Err(e) => {
                        error!(sheet = %item.target_sheet, error = %e, "Sheet failed; continuing with the next one.");
                        SheetStatus::Failed(e.to_string())
                    }
                };
                SheetSummary {
                    target_sheet: item.target_sheet.clone(),
                    price_sheet: item.price_sheet.clone(),
                    output,
                    status,
                }
            })
            .collect()
    }

    /// Analyzes one (target sheet, price sheet) pair.
    ///
    /// Missing or empty input tables and output failures abort the item.
    pub fn run_item(&self, item: &BatchItem) -> Result<SheetCounts, RunnerError> {
        let (events, history) = self.load_inputs(item)?;

        let output_path = self.config.output.output_path(&item.target_sheet);
        let mut writer = OutcomeWriter::open(&output_path, self.config.output.locale)?;

        let progress_bar = self.progress_bar(events.len(), &item.target_sheet)?;
        let mut counts = SheetCounts {
            events: events.len(),
            ..SheetCounts::default()
        };

        for event in &events {
            match self.analyzer.analyze(&history, event) {
                Ok(EventResolution::Resolved(outcome)) => {
                    if outcome.reached {
                        counts.reached += 1;
                    }
                    writer.write(&outcome)?;
                }
                Ok(EventResolution::Skipped(reason)) => {
                    if matches!(reason, SkipReason::NoDataInRange { .. }) {
                        warn!(sheet = %item.target_sheet, issue_date = %event.issue_date, %reason, "Skipping event.");
                    } else {
                        debug!(sheet = %item.target_sheet, issue_date = %event.issue_date, %reason, "Skipping event.");
                    }
                    counts.record_skip(&reason);
                }
                Err(e @ AnalyticsError::InvalidWindow(_)) => {
                    warn!(sheet = %item.target_sheet, issue_date = %event.issue_date, error = %e, "Invalid window; no row written.");
                    counts.invalid += 1;
                }
                Err(e) => {
                    warn!(sheet = %item.target_sheet, issue_date = %event.issue_date, error = %e, "Event could not be analyzed.");
                    counts.invalid += 1;
                }
            }
            progress_bar.inc(1);
        }

        counts.written = writer.finish()?;
        progress_bar.finish_and_clear();
        Ok(counts)
    }

    fn load_inputs(&self, item: &BatchItem) -> Result<(Vec<TargetPriceEvent>, PriceHistory), RunnerError> {
        let input = &self.config.input;
        match input.format {
            InputFormat::Delimited => {
                let delimiter = input.delimiter_byte()?;
                let events = load_target_prices(&input.sheet_path(&item.target_sheet), delimiter)?;
                let history = load_price_history(&input.sheet_path(&item.price_sheet), delimiter)?;
                Ok((events, history))
            }
            InputFormat::Workbook => {
                let path = input.workbook_path();
                let events = load_target_prices_from_workbook(&path, &item.target_sheet)?;
                let history = load_price_history_from_workbook(&path, &item.price_sheet)?;
                Ok((events, history))
            }
        }
    }

    /// Reports which batch items have both input sheets in place.
    ///
    /// For a workbook, a sheet is present when the workbook lists it by name.
    pub fn check_inputs(&self) -> Vec<InputStatus> {
        let input = &self.config.input;
        let workbook_sheets = match input.format {
            InputFormat::Delimited => None,
            InputFormat::Workbook => Some(workbook_sheet_names(&input.workbook_path()).unwrap_or_else(|e| {
                warn!(error = %e, "Cannot list workbook sheets.");
                Vec::new()
            })),
        };
        let exists = |sheet: &str, path: &Path| match &workbook_sheets {
            Some(names) => names.iter().any(|name| name == sheet),
            None => path.is_file(),
        };

        self.config
            .batch
            .iter()
            .map(|item| {
                let target_path = input.sheet_path(&item.target_sheet);
                let price_path = input.sheet_path(&item.price_sheet);
                InputStatus {
                    target_sheet: item.target_sheet.clone(),
                    price_sheet: item.price_sheet.clone(),
                    target_exists: exists(&item.target_sheet, &target_path),
                    price_exists: exists(&item.price_sheet, &price_path),
                    target_path,
                    price_path,
                }
            })
            .collect()
    }

    fn progress_bar(&self, len: usize, sheet: &str) -> Result<ProgressBar, RunnerError> {
        if !self.show_progress {
            return Ok(ProgressBar::hidden());
        }
        let progress_bar = ProgressBar::new(len as u64);
        progress_bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")?
                .progress_chars("=>-"),
        );
        progress_bar.set_message(sheet.to_string());
        Ok(progress_bar)
    }
}
