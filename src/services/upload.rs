//! Mode-aware upload gate.
//!
//! Enrolment files are collected per drop area (one flat area, or
//! before/after census day). The gate checks the exact per-area counts
//! the active mode requires, and that census-bearing modes have a term
//! selected, before forwarding the batch to the backend.

use std::sync::Arc;

use tracing::info;

use crate::backend::{AnalyticsBackend, UploadFile};
use crate::error::{ReportError, ReportResult};
use crate::models::mode::FileArea;
use crate::state::{ReportState, StateStore};

/// Files collected on the upload screen, grouped by drop area.
#[derive(Debug, Default)]
pub struct UploadBatch {
    pub single: Vec<UploadFile>,
    pub before: Vec<UploadFile>,
    pub after: Vec<UploadFile>,
}

impl UploadBatch {
    fn count_for(&self, area: FileArea) -> usize {
        match area {
            FileArea::Single => self.single.len(),
            FileArea::Before => self.before.len(),
            FileArea::After => self.after.len(),
        }
    }

    fn total(&self) -> usize {
        self.single.len() + self.before.len() + self.after.len()
    }
}

/// Validates and forwards upload batches for the active mode.
pub struct UploadGate {
    backend: Arc<dyn AnalyticsBackend>,
    state: Arc<StateStore>,
}

impl UploadGate {
    pub fn new(backend: Arc<dyn AnalyticsBackend>, state: Arc<StateStore>) -> Self {
        Self { backend, state }
    }

    /// Check the batch against the active mode without sending it.
    pub fn validate(&self, state: &ReportState, batch: &UploadBatch) -> ReportResult<()> {
        let requirement = state.mode.file_requirement();
        for group in requirement.groups {
            let actual = batch.count_for(group.area);
            if actual != group.count {
                return Err(ReportError::Validation(format!(
                    "{} requires {} file(s) ({}), got {}",
                    requirement.description, group.count, group.description, actual
                )));
            }
        }
        // Areas outside the mode's groups must stay empty.
        for area in [FileArea::Single, FileArea::Before, FileArea::After] {
            if requirement.count_for(area) == 0 && batch.count_for(area) != 0 {
                return Err(ReportError::Validation(format!(
                    "{} does not accept files in the {:?} area",
                    requirement.description, area
                )));
            }
        }
        if state.mode.is_census_bearing() && state.term.is_none() {
            return Err(ReportError::Validation(
                "census analysis requires a selected term".to_string(),
            ));
        }
        Ok(())
    }

    /// Validate the batch and forward it to the backend. Before-census
    /// files precede after-census files in the forwarded order.
    pub async fn upload(&self, batch: UploadBatch) -> ReportResult<()> {
        let state = self.state.snapshot();
        self.validate(&state, &batch)?;

        let mut files = Vec::with_capacity(batch.total());
        files.extend(batch.single);
        files.extend(batch.before);
        files.extend(batch.after);
        info!(mode = state.mode.as_str(), files = files.len(), "uploading batch");
        self.backend
            .upload_batch(state.mode, &files)
            .await
            .map_err(ReportError::Fetch)?;
        Ok(())
    }
}
