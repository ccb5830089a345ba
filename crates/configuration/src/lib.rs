use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod overrides;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use overrides::ConfigOverrides;
pub use settings::{
    AnalysisSettings, BatchItem, Config, InputFormat, InputSettings, LoggingSettings,
    OutputSettings,
};

/// Loads the application configuration from a TOML file.
///
/// Environment variables prefixed with `TARGET_AUDIT` override file values,
/// with `__` separating nested keys (e.g. `TARGET_AUDIT_ANALYSIS__CUTOFF_DATE`).
/// The result is validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path))
        .add_source(
            config::Environment::with_prefix("TARGET_AUDIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}
