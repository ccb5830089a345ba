use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// The direction a target price predicts relative to the window's opening price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Higher,
    Lower,
}

impl Direction {
    /// A target at or above the open predicts a rise, anything below predicts a fall.
    pub fn from_target(target: Decimal, open: Decimal) -> Self {
        if target >= open {
            Direction::Higher
        } else {
            Direction::Lower
        }
    }

    pub fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Direction::Higher, Locale::Cs) => "Vyšší",
            (Direction::Lower, Locale::Cs) => "Nižší",
            (Direction::Higher, Locale::En) => "Higher",
            (Direction::Lower, Locale::En) => "Lower",
        }
    }
}

/// Whether the window's close moved the way the target predicted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionMatch {
    Yes,
    No,
    NotApplicable,
}

impl DirectionMatch {
    pub fn label(&self, locale: Locale) -> &'static str {
        match self {
            DirectionMatch::Yes => yes_no(true, locale),
            DirectionMatch::No => yes_no(false, locale),
            DirectionMatch::NotApplicable => "N/A",
        }
    }
}

/// Renders a boolean flag in the given locale.
pub fn yes_no(flag: bool, locale: Locale) -> &'static str {
    match (flag, locale) {
        (true, Locale::Cs) => "ANO",
        (false, Locale::Cs) => "NE",
        (true, Locale::En) => "YES",
        (false, Locale::En) => "NO",
    }
}

/// Output locale for labels, headers and dates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Cs,
    En,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cs" | "cz" | "cs-cz" => Ok(Locale::Cs),
            "en" | "en-us" | "en-gb" => Ok(Locale::En),
            other => Err(format!("unknown locale '{other}' (expected 'cs' or 'en')")),
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locale::Cs => write!(f, "cs"),
            Locale::En => write!(f, "en"),
        }
    }
}
