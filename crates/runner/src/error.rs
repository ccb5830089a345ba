use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Configuration error: {0}")]
    Config(#[from] configuration::ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Progress bar template error: {0}")]
    ProgressBarTemplate(String),
}

impl From<indicatif::style::TemplateError> for RunnerError {
    fn from(error: indicatif::style::TemplateError) -> Self {
        RunnerError::ProgressBarTemplate(error.to_string())
    }
}
