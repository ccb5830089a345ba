use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Input table not found: {0}")]
    MissingInput(PathBuf),

    #[error("Input table has no usable rows: {0}")]
    EmptyTable(PathBuf),

    #[error("Sheet '{sheet}' not found in workbook {path}")]
    MissingSheet { path: PathBuf, sheet: String },

    #[error("Cannot read workbook {path}: {source}")]
    Workbook {
        path: PathBuf,
        #[source]
        source: calamine::Error,
    },

    #[error("Delimited-file error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
