//! End-to-end report generation: capture, compile, deliver.

use std::sync::Arc;

use chrono::Local;
use tracing::{error, info};

use crate::error::{ReportError, ReportResult};
use crate::services::capture::CaptureOrchestrator;
use crate::services::delivery::DeliveryDispatcher;
use crate::services::document::{compile_layout, render_pdf, report_filename};
use crate::state::StateStore;

/// Where a finished report should go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryRequest {
    /// Write the document into the configured output directory.
    Download,
    /// Email the document through the backend.
    Email(String),
}

/// What happened to a compiled report.
#[derive(Debug)]
pub enum DeliveryOutcome {
    Saved(std::path::PathBuf),
    Emailed(String),
    /// Delivery failed; the document bytes are kept so the caller can
    /// save or resend them.
    Failed { reason: String, pdf: Vec<u8> },
}

/// A finished generation run.
#[derive(Debug)]
pub struct GeneratedReport {
    pub filename: String,
    pub page_count: usize,
    pub outcome: DeliveryOutcome,
}

/// Runs the whole pipeline for one report.
pub struct ReportGenerator {
    state: Arc<StateStore>,
    orchestrator: CaptureOrchestrator,
    dispatcher: DeliveryDispatcher,
}

impl ReportGenerator {
    pub fn new(
        state: Arc<StateStore>,
        orchestrator: CaptureOrchestrator,
        dispatcher: DeliveryDispatcher,
    ) -> Self {
        Self {
            state,
            orchestrator,
            dispatcher,
        }
    }

    /// Generate a report for the selected sections and deliver it.
    ///
    /// Validation failures (empty selection, blank email, loading data)
    /// error out before any capture runs. A failed delivery is not an
    /// error: the outcome carries the compiled bytes instead.
    pub async fn generate(
        &self,
        section_ids: &[String],
        delivery: DeliveryRequest,
    ) -> ReportResult<GeneratedReport> {
        if let DeliveryRequest::Email(email) = &delivery {
            if email.trim().is_empty() {
                return Err(ReportError::Validation(
                    "recipient email must not be blank".to_string(),
                ));
            }
        }

        let state = self.state.snapshot();
        let surfaces = self.orchestrator.capture_selected(section_ids).await?;
        info!(
            mode = state.mode.as_str(),
            surfaces = surfaces.len(),
            "surfaces captured"
        );

        let title = state.mode.report_title(state.term.as_ref());
        let now = Local::now();
        let layout = compile_layout(&title, now, &surfaces);
        let page_count = layout.pages.len();
        let pdf = render_pdf(&layout, &surfaces)?;
        let filename = report_filename(now.date_naive());

        let outcome = match delivery {
            DeliveryRequest::Download => {
                let path = self.dispatcher.persist_locally(&filename, &pdf)?;
                DeliveryOutcome::Saved(path)
            }
            DeliveryRequest::Email(email) => {
                match self.dispatcher.transmit(&filename, pdf.clone(), &email).await {
                    Ok(()) => DeliveryOutcome::Emailed(email),
                    Err(err) => {
                        error!(error = %err, "report delivery failed, retaining document");
                        DeliveryOutcome::Failed {
                            reason: err.to_string(),
                            pdf,
                        }
                    }
                }
            }
        };

        Ok(GeneratedReport {
            filename,
            page_count,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::local::LocalAnalyticsBackend;
    use crate::render::SurfaceRegistry;
    use crate::services::aggregate::{ChartStore, LoadingFlags};
    use std::sync::RwLock;

    fn generator() -> ReportGenerator {
        let backend = Arc::new(LocalAnalyticsBackend::empty());
        let orchestrator = CaptureOrchestrator::new(
            Arc::new(SurfaceRegistry::new()),
            Arc::new(RwLock::new(ChartStore::default())),
            Arc::new(LoadingFlags::default()),
        );
        let dispatcher = DeliveryDispatcher::new(backend, "/tmp/unused");
        ReportGenerator::new(Arc::new(StateStore::new()), orchestrator, dispatcher)
    }

    #[tokio::test]
    async fn blank_email_is_rejected_before_capture() {
        let generator = generator();
        let result = generator
            .generate(
                &["gender_participation".to_string()],
                DeliveryRequest::Email("   ".to_string()),
            )
            .await;
        assert!(matches!(result, Err(ReportError::Validation(_))));
    }

    #[tokio::test]
    async fn empty_selection_is_rejected() {
        let generator = generator();
        let result = generator.generate(&[], DeliveryRequest::Download).await;
        assert!(matches!(result, Err(ReportError::Validation(_))));
    }
}
