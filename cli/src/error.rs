//! Error handling for the `quadc` CLI driver.
//!
//! The compiler core reports syntax/semantic diagnostics directly to
//! stderr as they occur (see `quadc_sem::Diagnostics`); this enum only
//! covers the shell around it: reading the input file and writing the
//! two output artifacts.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuadcError {
    #[error("failed to read '{path}': {source}")]
    ReadInput { path: PathBuf, source: std::io::Error },

    #[error("failed to write '{path}': {source}")]
    WriteOutput { path: PathBuf, source: std::io::Error },

    #[error("input path '{0}' has no file name")]
    NoFileName(PathBuf),
}

pub type Result<T> = std::result::Result<T, QuadcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_input_error_names_the_path() {
        let err = QuadcError::ReadInput {
            path: PathBuf::from("missing.qd"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().contains("missing.qd"));
    }

    #[test]
    fn no_file_name_error_names_the_path() {
        let err = QuadcError::NoFileName(PathBuf::from("/"));
        assert!(err.to_string().contains('/'));
    }
}
