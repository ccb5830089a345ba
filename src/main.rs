use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Table, presets::UTF8_FULL};
use configuration::{Config, ConfigOverrides, init_tracing, load_config};
use runner::{BatchRunner, InputStatus, SheetStatus, SheetSummary};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;

/// The main entry point for the target-audit application.
fn main() -> ExitCode {
    // A missing .env file is fine; it only carries optional overrides.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match execute(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Audits analyst target prices against the market prices that followed them.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(long, short, global = true, default_value = "config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze every configured batch item and append the outcomes.
    Run(RunArgs),
    /// Check the configuration and that every input sheet exists.
    Validate,
}

#[derive(Parser)]
struct RunArgs {
    /// Start without asking for confirmation.
    #[arg(long, short)]
    yes: bool,

    #[command(flatten)]
    overrides: ConfigOverrides,
}

fn execute(cli: Cli) -> Result<ExitCode> {
    let mut config = load(&cli.config)?;

    match cli.command {
        Commands::Run(args) => {
            args.overrides.apply(&mut config);
            // Held until the end of the run so the file sink is flushed.
            let _guard = init_tracing(&config.logging).context("Failed to initialise logging")?;
            handle_run(config, args.yes)
        }
        Commands::Validate => {
            let _guard = init_tracing(&config.logging).context("Failed to initialise logging")?;
            Ok(handle_validate(config))
        }
    }
}

fn load(path: &Path) -> Result<Config> {
    let config = load_config(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    let base = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
    Ok(config.rebase(base))
}

// ==============================================================================
// Run Command Logic
// ==============================================================================

fn handle_run(config: Config, assume_yes: bool) -> Result<ExitCode> {
    if !assume_yes && !confirm("Start the target price analysis? (Y to confirm): ")? {
        println!("Analysis cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let runner = BatchRunner::new(config);
    let summaries = runner.run();
    println!("{}", summary_table(&summaries));

    let failed = summaries.iter().filter(|s| !s.is_completed()).count();
    info!(items = summaries.len(), failed, "Analysis finished.");
    if failed > 0 {
        eprintln!("{failed} of {} sheet(s) failed; see the log for details.", summaries.len());
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// Only an explicit `Y` (any case) starts the run.
fn confirm(prompt: &str) -> Result<bool> {
    print!("{prompt}");
    io::stdout().flush().context("Failed to write prompt")?;

    let mut answer = String::new();
    io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read confirmation input")?;
    Ok(answer.trim().eq_ignore_ascii_case("y"))
}

fn summary_table(summaries: &[SheetSummary]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Target sheet",
        "Price sheet",
        "Events",
        "Written",
        "Reached",
        "Past cutoff",
        "Target = open",
        "No data",
        "Invalid",
        "Status",
    ]);

    for summary in summaries {
        let mut row = vec![summary.target_sheet.clone(), summary.price_sheet.clone()];
        match &summary.status {
            SheetStatus::Completed(counts) => {
                row.extend(
                    [
                        counts.events,
                        counts.written,
                        counts.reached,
                        counts.beyond_cutoff,
                        counts.target_equals_open,
                        counts.no_data,
                        counts.invalid,
                    ]
                    .map(|n| n.to_string()),
                );
                row.push(format!("OK -> {}", summary.output.display()));
            }
            SheetStatus::Failed(reason) => {
                row.extend(std::iter::repeat_n("-".to_string(), 7));
                row.push(format!("FAILED: {reason}"));
            }
        }
        table.add_row(row);
    }
    table
}

// ==============================================================================
// Validate Command Logic
// ==============================================================================

fn handle_validate(config: Config) -> ExitCode {
    println!(
        "Configuration OK: {} batch item(s), cutoff {}, horizon {} year(s), locale {}.",
        config.batch.len(),
        config.analysis.cutoff_date,
        config.analysis.horizon_years,
        config.output.locale,
    );

    let statuses = BatchRunner::new(config).check_inputs();
    println!("{}", input_table(&statuses));

    if statuses.iter().all(InputStatus::is_ready) {
        ExitCode::SUCCESS
    } else {
        eprintln!("Some input sheets are missing.");
        ExitCode::FAILURE
    }
}

fn input_table(statuses: &[InputStatus]) -> Table {
    let mark = |exists: bool| if exists { "found" } else { "MISSING" };

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Target sheet", "Target file", "Price sheet", "Price file"]);
    for status in statuses {
        table.add_row(vec![
            status.target_sheet.clone(),
            format!("{} ({})", status.target_path.display(), mark(status.target_exists)),
            status.price_sheet.clone(),
            format!("{} ({})", status.price_path.display(), mark(status.price_exists)),
        ]);
    }
    table
}
