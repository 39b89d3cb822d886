//! Delivery of compiled reports: local download or backend email.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::backend::AnalyticsBackend;
use crate::error::{ReportError, ReportResult};

/// Writes reports to disk or hands them to the backend's mailer.
pub struct DeliveryDispatcher {
    backend: Arc<dyn AnalyticsBackend>,
    output_dir: PathBuf,
}

impl DeliveryDispatcher {
    pub fn new(backend: Arc<dyn AnalyticsBackend>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            backend,
            output_dir: output_dir.into(),
        }
    }

    /// Write the document into the output directory, creating it if
    /// needed. Returns the path written.
    pub fn persist_locally(&self, filename: &str, pdf: &[u8]) -> ReportResult<PathBuf> {
        std::fs::create_dir_all(&self.output_dir)?;
        let path = self.output_dir.join(filename);
        std::fs::write(&path, pdf)?;
        info!(path = %path.display(), bytes = pdf.len(), "report saved");
        Ok(path)
    }

    /// Hand the document to the backend for email delivery.
    pub async fn transmit(&self, filename: &str, pdf: Vec<u8>, email: &str) -> ReportResult<()> {
        self.backend
            .send_report(filename, pdf, email)
            .await
            .map_err(|err| ReportError::Delivery(err.to_string()))?;
        info!(%email, %filename, "report emailed");
        Ok(())
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::local::LocalAnalyticsBackend;

    #[tokio::test]
    async fn persist_creates_directory_and_writes() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(LocalAnalyticsBackend::empty());
        let dispatcher = DeliveryDispatcher::new(backend, dir.path().join("nested"));

        let path = dispatcher
            .persist_locally("WIL_Report_2025-03-14.pdf", b"%PDF-stub")
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-stub");
    }

    #[tokio::test]
    async fn transmit_calls_the_backend() {
        let backend = Arc::new(LocalAnalyticsBackend::empty());
        let dispatcher = DeliveryDispatcher::new(Arc::clone(&backend) as _, "/tmp/unused");

        dispatcher
            .transmit("report.pdf", b"%PDF-stub".to_vec(), "coordinator@example.edu")
            .await
            .unwrap();
        assert_eq!(backend.send_calls(), 1);
    }
}
