use crate::outcome::AnalysisOutcome;
use core_types::{Locale, format_date, yes_no};
use rust_decimal::{Decimal, RoundingStrategy};

/// Fields per output record: 24 outcome fields followed by 9 window statistics.
pub const COLUMN_COUNT: usize = 33;

/// Field delimiter of the output file.
pub const FIELD_DELIMITER: u8 = b';';

const HEADER_CS: [&str; COLUMN_COUNT] = [
    "Datum vydání",
    "Konec horizontu",
    "Vydavatel",
    "Cílová cena",
    "Otevírací cena",
    "Zavírací cena",
    "Předpověď",
    "Shoda směru",
    "Dosaženo",
    "Datum dosažení",
    "Dny do dosažení (obchodní)",
    "Dny do dosažení (kalendářní)",
    "Délka okna (obchodní)",
    "Délka okna (kalendářní)",
    "Zisková cena",
    "Očekávaný výnos",
    "Reálný výnos",
    "Rozdíl",
    "Očekávaný výnos %",
    "Reálný výnos %",
    "Rozdíl p.b.",
    "Relativní rozdíl %",
    "Roční očekávaný výnos %",
    "Roční reálný výnos %",
    "Maximum",
    "Minimum",
    "Datum maxima",
    "Datum minima",
    "Přesnost",
    "Přesnost %",
    "Průměrná otevírací cena",
    "Průměrná zavírací cena",
    "Volatilita",
];

const HEADER_EN: [&str; COLUMN_COUNT] = [
    "Issue date",
    "Horizon end",
    "Issuer",
    "Target price",
    "Open price",
    "Close price",
    "Prediction",
    "Direction match",
    "Reached",
    "Reached date",
    "Days to reach (trading)",
    "Days to reach (calendar)",
    "Window length (trading)",
    "Window length (calendar)",
    "Profit price",
    "Expected return",
    "Realized return",
    "Difference",
    "Expected return %",
    "Realized return %",
    "Difference pp",
    "Relative difference %",
    "Annualized expected return %",
    "Annualized realized return %",
    "Max high",
    "Min low",
    "Max high date",
    "Min low date",
    "Accuracy",
    "Accuracy %",
    "Average open",
    "Average close",
    "Volatility",
];

/// The column names in the language of `locale`.
pub fn header(locale: Locale) -> &'static [&'static str; COLUMN_COUNT] {
    match locale {
        Locale::Cs => &HEADER_CS,
        Locale::En => &HEADER_EN,
    }
}

/// Renders an outcome as the primary record followed by its window statistics.
///
/// Whole-unit price fields print as plain numbers, ratios and averages with two
/// decimals, and undefined ratios as `NaN`.
pub fn render_record(outcome: &AnalysisOutcome, locale: Locale) -> Vec<String> {
    let stats = &outcome.stats;
    vec![
        format_date(outcome.issue_date, locale),
        format_date(outcome.horizon_end, locale),
        outcome.issuer.clone(),
        whole(outcome.target_price),
        whole(outcome.open_price),
        whole(outcome.close_price),
        outcome.direction.label(locale).to_string(),
        outcome.direction_match().label(locale).to_string(),
        yes_no(outcome.reached, locale).to_string(),
        format_date(outcome.reached_date, locale),
        outcome.days_to_reach.to_string(),
        outcome.calendar_days_to_reach().to_string(),
        outcome.window_days().to_string(),
        outcome.calendar_window_days().to_string(),
        whole(outcome.profit),
        whole(outcome.absolute_expected_return()),
        whole(outcome.absolute_realized_return()),
        whole(outcome.absolute_difference()),
        two_places(outcome.relative_expected_return()),
        two_places(outcome.relative_realized_return()),
        two_places(outcome.percentage_point_difference()),
        two_places(outcome.relative_difference()),
        float_two_places(outcome.annualized_expected_return()),
        float_two_places(outcome.annualized_realized_return()),
        // window statistics
        whole(stats.max_high),
        whole(stats.min_low),
        format_date(stats.max_high_date, locale),
        format_date(stats.min_low_date, locale),
        whole(outcome.absolute_accuracy()),
        two_places(outcome.relative_accuracy()),
        two_places(Some(stats.avg_open)),
        two_places(Some(stats.avg_close)),
        float_two_places(Some(stats.volatility)),
    ]
}

fn whole(value: Decimal) -> String {
    value.normalize().to_string()
}

fn two_places(value: Option<Decimal>) -> String {
    match value {
        Some(v) => format!(
            "{:.2}",
            v.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        ),
        None => "NaN".to_string(),
    }
}

/// Rounds through the shortest decimal form of `value`, so `1.005` gives `1.01`
/// like the Decimal columns. Values a Decimal cannot hold keep plain float formatting.
fn float_two_places(value: Option<f64>) -> String {
    match value {
        Some(v) => match Decimal::try_from(v) {
            Ok(exact) => two_places(Some(exact)),
            Err(_) => format!("{v:.2}"),
        },
        None => "NaN".to_string(),
    }
}
