use crate::settings::Config;
use chrono::NaiveDate;
use core_types::Locale;
use std::path::PathBuf;

/// Settings that may be overridden for a single invocation.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct ConfigOverrides {
    /// Skip events whose horizon ends after this date (format: YYYY-MM-DD).
    #[cfg_attr(feature = "clap", arg(long))]
    pub cutoff_date: Option<NaiveDate>,

    /// Directory the outcome files are appended to.
    #[cfg_attr(feature = "clap", arg(long))]
    pub output_dir: Option<PathBuf>,

    /// Output locale for labels and dates ("cs" or "en").
    #[cfg_attr(feature = "clap", arg(long, value_parser = parse_locale))]
    pub locale: Option<Locale>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(cutoff) = self.cutoff_date {
            config.analysis.cutoff_date = cutoff;
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(locale) = self.locale {
            config.output.locale = locale;
        }
    }
}

#[cfg(feature = "clap")]
fn parse_locale(value: &str) -> Result<Locale, String> {
    value.parse()
}
