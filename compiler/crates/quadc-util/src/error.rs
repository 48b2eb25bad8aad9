use thiserror::Error;

/// Errors raised by the interning/indexing primitives themselves, as
/// opposed to the user-facing STX/SEM-E/SEM-W protocol (see `quadc-sem`).
#[derive(Debug, Error)]
pub enum UtilError {
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

pub type UtilResult<T> = Result<T, UtilError>;
