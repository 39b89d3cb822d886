//! Error taxonomy for the report pipeline.
//!
//! Fetch and capture failures are recovered locally (empty datasets,
//! skipped surfaces) and never abort the pipeline; validation and
//! delivery failures surface to the caller. No error here is fatal to
//! the process.

use thiserror::Error;

use crate::backend::BackendError;

#[derive(Debug, Error)]
pub enum ReportError {
    /// Preconditions unmet: nothing selected, files or term missing, or
    /// a dataset family still loading. Generation does not proceed.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A dataset family's network call failed.
    #[error(transparent)]
    Fetch(#[from] BackendError),

    /// A surface could not be located or rastered.
    #[error("capture failed: {0}")]
    Capture(String),

    /// Report transmission failed. The compiled document is retained so
    /// the caller can retry manually.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// PDF serialization failed.
    #[error("pdf rendering failed: {0}")]
    Pdf(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;
