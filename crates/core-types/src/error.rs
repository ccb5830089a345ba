use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Invalid window: start index {start}, end index {end}, history length {len}")]
    InvalidWindow { start: usize, end: usize, len: usize },
}
