use analytics::SkipReason;
use std::path::PathBuf;

/// Event tallies for one batch item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SheetCounts {
    pub events: usize,
    pub written: usize,
    pub reached: usize,
    pub beyond_cutoff: usize,
    pub target_equals_open: usize,
    pub no_data: usize,
    /// Events whose window could not be built.
    pub invalid: usize,
}

impl SheetCounts {
    pub fn record_skip(&mut self, reason: &SkipReason) {
        match reason {
            SkipReason::BeyondCutoff { .. } => self.beyond_cutoff += 1,
            SkipReason::TargetEqualsOpen { .. } => self.target_equals_open += 1,
            SkipReason::NoDataInRange { .. } => self.no_data += 1,
        }
    }

    pub fn skipped(&self) -> usize {
        self.beyond_cutoff + self.target_equals_open + self.no_data
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetStatus {
    Completed(SheetCounts),
    /// The item was aborted; rows written before the failure stay in the output.
    Failed(String),
}

/// What happened to one (target sheet, price sheet) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSummary {
    pub target_sheet: String,
    pub price_sheet: String,
    pub output: PathBuf,
    pub status: SheetStatus,
}

impl SheetSummary {
    pub fn is_completed(&self) -> bool {
        matches!(self.status, SheetStatus::Completed(_))
    }
}

/// Whether the input files of a batch item are present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputStatus {
    pub target_sheet: String,
    pub price_sheet: String,
    pub target_path: PathBuf,
    pub price_path: PathBuf,
    pub target_exists: bool,
    pub price_exists: bool,
}

impl InputStatus {
    pub fn is_ready(&self) -> bool {
        self.target_exists && self.price_exists
    }
}
