use crate::error::ConfigError;
use chrono::NaiveDate;
use core_types::Locale;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputSettings,
    #[serde(default)]
    pub output: OutputSettings,
    #[serde(default)]
    pub analysis: AnalysisSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
    /// The (target-price sheet, price-history sheet) pairs to process, in order.
    #[serde(default)]
    pub batch: Vec<BatchItem>,
}

/// How the input sheets are stored on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputFormat {
    /// One delimited file per sheet under `data_dir`.
    #[default]
    Delimited,
    /// A single spreadsheet workbook holding every sheet by name.
    Workbook,
}

/// Where the input tables live and how they are stored.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    pub format: InputFormat,
    /// Directory holding the sheet files or the workbook.
    pub data_dir: PathBuf,
    /// Workbook file name, relative to `data_dir`. Used by the workbook format only.
    pub workbook: PathBuf,
    /// File extension of each sheet, without the dot.
    pub extension: String,
    /// Single-character field delimiter of the input files.
    pub delimiter: String,
}

/// Where and how outcome records are written.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
    /// Appended to the target sheet name to form the output file name.
    pub file_suffix: String,
    pub locale: Locale,
}

/// Parameters of the target-price analysis itself.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisSettings {
    /// Events whose horizon ends after this date are skipped.
    pub cutoff_date: NaiveDate,
    /// Length of the observation horizon in calendar years.
    pub horizon_years: u32,
    /// Upper bound on the nearest-forward-date search, in calendar days.
    pub max_search_days: u32,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// When set, logs are also written to a daily-rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

/// One unit of batch work: a target-price sheet and the price history it is judged against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BatchItem {
    pub target_sheet: String,
    pub price_sheet: String,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            format: InputFormat::default(),
            data_dir: PathBuf::from("data"),
            workbook: PathBuf::from("target_prices.xlsx"),
            extension: "csv".to_string(),
            delimiter: ";".to_string(),
        }
    }
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            file_suffix: "_analysis.csv".to_string(),
            locale: Locale::default(),
        }
    }
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        Self {
            cutoff_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap_or(NaiveDate::MIN),
            horizon_years: 1,
            max_search_days: 31,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "target-audit.log".to_string(),
        }
    }
}

impl InputSettings {
    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8, ConfigError> {
        delimiter_byte(&self.delimiter)
    }

    /// Path of the file backing a sheet.
    ///
    /// In the workbook format every sheet lives in the same file.
    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        match self.format {
            InputFormat::Delimited => self.data_dir.join(format!("{}.{}", sheet, self.extension)),
            InputFormat::Workbook => self.workbook_path(),
        }
    }

    pub fn workbook_path(&self) -> PathBuf {
        self.data_dir.join(&self.workbook)
    }
}

impl OutputSettings {
    pub fn output_path(&self, target_sheet: &str) -> PathBuf {
        self.dir.join(format!("{}{}", target_sheet, self.file_suffix))
    }
}

impl Config {
    /// Checks the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one [[batch]] entry is required".to_string(),
            ));
        }
        for (i, item) in self.batch.iter().enumerate() {
            if item.target_sheet.trim().is_empty() || item.price_sheet.trim().is_empty() {
                return Err(ConfigError::ValidationError(format!(
                    "batch entry {} has an empty sheet name",
                    i + 1
                )));
            }
        }
        match self.input.format {
            InputFormat::Delimited => {
                self.input.delimiter_byte()?;
            }
            InputFormat::Workbook => check_workbook_extension(&self.input.workbook)?,
        }
        if self.analysis.horizon_years == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.horizon_years must be at least 1".to_string(),
            ));
        }
        if self.analysis.max_search_days == 0 {
            return Err(ConfigError::ValidationError(
                "analysis.max_search_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolves relative input/output directories against `base`.
    pub fn rebase(mut self, base: &Path) -> Self {
        if self.input.data_dir.is_relative() {
            self.input.data_dir = base.join(&self.input.data_dir);
        }
        if self.output.dir.is_relative() {
            self.output.dir = base.join(&self.output.dir);
        }
        self
    }
}

fn delimiter_byte(text: &str) -> Result<u8, ConfigError> {
    match text.as_bytes() {
        [b] => Ok(*b),
        _ if text == "\\t" => Ok(b'\t'),
        _ => Err(ConfigError::ValidationError(format!(
            "delimiter must be a single ASCII character, got '{text}'"
        ))),
    }
}

fn check_workbook_extension(workbook: &Path) -> Result<(), ConfigError> {
    let extension = workbook
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some(ext) if WORKBOOK_EXTENSIONS.contains(&ext) => Ok(()),
        _ => Err(ConfigError::ValidationError(format!(
            "input.workbook must end in one of {}, got '{}'",
            WORKBOOK_EXTENSIONS.join(", "),
            workbook.display()
        ))),
    }
}

/// Spreadsheet formats the workbook reader understands.
const WORKBOOK_EXTENSIONS: [&str; 5] = ["xlsx", "xlsm", "xlsb", "xls", "ods"];
