//! Importer-specific error types

use thiserror::Error;

/// Errors that abort the run before any row is processed
#[derive(Debug, Error)]
pub enum ImportError {
    /// Input file or sheet is unusable (missing sheet, missing columns)
    #[error("Input error: {0}")]
    Input(String),

    /// Workbook could not be opened or read
    #[error("Workbook error: {0}")]
    Sheet(#[from] calamine::XlsxError),
}
