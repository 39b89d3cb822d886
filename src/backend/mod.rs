//! Analytics backend abstraction.
//!
//! The pipeline consumes one aggregated dataset per family from an
//! analytics service. The service sits behind [`AnalyticsBackend`] so
//! the HTTP client can be swapped for the in-memory implementation in
//! tests and local development.

pub mod http;
#[cfg(any(test, feature = "local-backend"))]
pub mod local;
pub mod raw;

pub use http::HttpAnalyticsClient;
#[cfg(any(test, feature = "local-backend"))]
pub use local::LocalAnalyticsBackend;

use async_trait::async_trait;
use thiserror::Error;

use crate::api::Term;
use crate::models::AnalysisMode;
use raw::{CdevResult, CensusFacultyDrop, EquityResult, GenderResult, YoyFacultyCounts};

/// The independent dataset families the aggregator fetches. Families
/// never depend on one another's results and may complete in any order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DatasetFamily {
    Gender,
    Equity,
    Cdev,
    Yoy,
    Census,
}

impl DatasetFamily {
    pub const ALL: &'static [DatasetFamily] = &[
        DatasetFamily::Gender,
        DatasetFamily::Equity,
        DatasetFamily::Cdev,
        DatasetFamily::Yoy,
        DatasetFamily::Census,
    ];
}

/// Errors raised by a backend implementation.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("backend returned status {status}: {message}")]
    Status { status: u16, message: String },
    #[error("failed to decode backend response: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type BackendResult<T> = Result<T, BackendError>;

/// One file handed to the batch upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Read-side analytics endpoints plus the upload and delivery calls the
/// pipeline terminates in.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait AnalyticsBackend: Send + Sync {
    /// `GET /par_gender_agg` - gender participation counts per faculty.
    async fn participation_gender(&self) -> BackendResult<GenderResult>;

    /// `GET /equity_cohort_agg` - first generation, SES, indigenous and
    /// regional/remote counts.
    async fn equity_cohort(&self) -> BackendResult<EquityResult>;

    /// `GET /cdev_agg` - CDEV course enrolments by residency and gender.
    async fn cdev(&self) -> BackendResult<CdevResult>;

    /// `GET /yoy_comparison` - per-faculty counts for two successive
    /// years with residency breakdowns.
    async fn yoy_comparison(&self) -> BackendResult<Vec<YoyFacultyCounts>>;

    /// `GET /census_gender_drop?term=` - per-faculty drop counts after
    /// census day, scoped to the given term.
    async fn census_gender_drop(&self, term: &Term) -> BackendResult<Vec<CensusFacultyDrop>>;

    /// `POST /batch_upload` - multipart upload of the mode's file set.
    async fn upload_batch(&self, mode: AnalysisMode, files: &[UploadFile]) -> BackendResult<()>;

    /// `POST /send_email` - multipart delivery of a compiled report to a
    /// recipient address.
    async fn send_report(&self, filename: &str, pdf: Vec<u8>, email: &str) -> BackendResult<()>;
}
