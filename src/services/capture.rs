//! Concurrent capture of the chart surfaces behind the selected report
//! sections.
//!
//! Section ids resolve to an ordered list of capture targets. All
//! targets render concurrently; results come back in target order
//! regardless of which finishes first, so page order in the compiled
//! document is deterministic. A missing or failing surface is skipped
//! with a warning rather than aborting the run.

use std::sync::{Arc, RwLock};

use futures::future::join_all;
use tracing::warn;

use crate::error::{ReportError, ReportResult};
use crate::render::{RasterImage, SurfaceRegistry};
use crate::services::aggregate::{ChartStore, LoadingFlags};

/// One surface to capture, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureTarget {
    pub surface_id: String,
    pub title: String,
}

/// A captured surface with its page title and position in the document.
#[derive(Debug, Clone)]
pub struct CapturedSurface {
    pub title: String,
    pub image: RasterImage,
    pub sequence_index: usize,
}

/// Expand selected section ids into their capture targets, in section
/// order. Unknown ids pass through as a single target so custom
/// surfaces registered by callers still capture.
pub fn resolve_surfaces(section_ids: &[String]) -> Vec<CaptureTarget> {
    let mut targets = Vec::new();
    for id in section_ids {
        let expanded: &[(&str, &str)] = match id.as_str() {
            "gender_participation" => &[
                (
                    "gender_participation_chart1",
                    "Gender Participation - Faculty Breakdown",
                ),
                (
                    "gender_participation_chart2",
                    "Gender Participation - Overview",
                ),
            ],
            "wil_participation" => &[
                ("wil_participation_chart3", "WIL Participation - First Generation"),
                ("wil_participation_chart4", "WIL Participation - SES"),
                (
                    "wil_participation_chart5",
                    "WIL Participation - Indigenous Students",
                ),
                (
                    "wil_participation_chart6",
                    "WIL Participation - Regional Remote",
                ),
            ],
            "cdev_enrolments" => &[
                ("cdev_enrolments_chart7", "CDEV Enrolments - Residency Status"),
                ("cdev_enrolments_chart8", "CDEV Enrolments - Gender Proportion"),
            ],
            "yoy_comparison" => &[
                ("yoy_comparison_chart9", "YoY Comparison - Faculty Breakdown"),
                ("yoy_comparison_chart10", "YoY Comparison - Residency Status"),
            ],
            "chart_census1" => &[("chart_census1", "Census Day Gender Drop Analysis")],
            _ => {
                targets.push(CaptureTarget {
                    surface_id: id.clone(),
                    title: id.clone(),
                });
                continue;
            }
        };
        targets.extend(expanded.iter().map(|(surface_id, title)| CaptureTarget {
            surface_id: (*surface_id).to_string(),
            title: (*title).to_string(),
        }));
    }
    targets
}

/// Drives concurrent surface captures against the registry.
pub struct CaptureOrchestrator {
    registry: Arc<SurfaceRegistry>,
    charts: Arc<RwLock<ChartStore>>,
    loading: Arc<LoadingFlags>,
}

impl CaptureOrchestrator {
    pub fn new(
        registry: Arc<SurfaceRegistry>,
        charts: Arc<RwLock<ChartStore>>,
        loading: Arc<LoadingFlags>,
    ) -> Self {
        Self {
            registry,
            charts,
            loading,
        }
    }

    /// Capture every surface behind the given section ids.
    ///
    /// Fails fast when nothing is selected or a dataset family is still
    /// loading. Individual surface failures are skipped; the run only
    /// errors when no surface captured at all.
    pub async fn capture_selected(
        &self,
        section_ids: &[String],
    ) -> ReportResult<Vec<CapturedSurface>> {
        if section_ids.is_empty() {
            return Err(ReportError::Validation(
                "no report sections selected".to_string(),
            ));
        }
        if self.loading.any_loading() {
            return Err(ReportError::Validation(
                "chart data is still loading".to_string(),
            ));
        }

        let targets = resolve_surfaces(section_ids);
        let charts = self.charts.read().expect("chart store poisoned").clone();

        let captures = targets.iter().map(|target| {
            let charts = &charts;
            async move {
                let entry = self.registry.get(&target.surface_id)?;
                match entry.capture(charts).await {
                    Ok(image) => Some(image),
                    Err(err) => {
                        warn!(surface = %target.surface_id, error = %err, "surface capture failed");
                        None
                    }
                }
            }
        });

        let mut captured = Vec::with_capacity(targets.len());
        for (target, image) in targets.iter().zip(join_all(captures).await) {
            match image {
                Some(image) => captured.push(CapturedSurface {
                    title: target.title.clone(),
                    image,
                    sequence_index: captured.len(),
                }),
                None => warn!(surface = %target.surface_id, "surface skipped"),
            }
        }

        if captured.is_empty() {
            return Err(ReportError::Capture(
                "no surfaces could be captured".to_string(),
            ));
        }
        Ok(captured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn sections_expand_in_order() {
        let targets = resolve_surfaces(&ids(&["gender_participation", "chart_census1"]));
        let surface_ids: Vec<&str> = targets.iter().map(|t| t.surface_id.as_str()).collect();
        assert_eq!(
            surface_ids,
            vec![
                "gender_participation_chart1",
                "gender_participation_chart2",
                "chart_census1"
            ]
        );
        assert_eq!(targets[2].title, "Census Day Gender Drop Analysis");
    }

    #[test]
    fn unknown_ids_pass_through() {
        let targets = resolve_surfaces(&ids(&["custom_surface"]));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].surface_id, "custom_surface");
        assert_eq!(targets[0].title, "custom_surface");
    }

    #[test]
    fn wil_section_expands_to_four_charts() {
        let targets = resolve_surfaces(&ids(&["wil_participation"]));
        assert_eq!(targets.len(), 4);
        let titles: Vec<&str> = targets.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "WIL Participation - First Generation",
                "WIL Participation - SES",
                "WIL Participation - Indigenous Students",
                "WIL Participation - Regional Remote",
            ]
        );
    }

    #[test]
    fn cdev_and_yoy_titles_name_the_breakdown() {
        let targets = resolve_surfaces(&ids(&["cdev_enrolments", "yoy_comparison"]));
        let titles: Vec<&str> = targets.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(
            titles,
            vec![
                "CDEV Enrolments - Residency Status",
                "CDEV Enrolments - Gender Proportion",
                "YoY Comparison - Faculty Breakdown",
                "YoY Comparison - Residency Status",
            ]
        );
    }

    #[tokio::test]
    async fn empty_selection_is_rejected() {
        let orchestrator = CaptureOrchestrator::new(
            Arc::new(SurfaceRegistry::new()),
            Arc::new(RwLock::new(ChartStore::default())),
            Arc::new(LoadingFlags::default()),
        );
        assert!(matches!(
            orchestrator.capture_selected(&[]).await,
            Err(ReportError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn loading_blocks_capture() {
        use crate::backend::DatasetFamily;
        let loading = Arc::new(LoadingFlags::default());
        loading.set(DatasetFamily::Gender, true);
        let orchestrator = CaptureOrchestrator::new(
            Arc::new(SurfaceRegistry::new()),
            Arc::new(RwLock::new(ChartStore::default())),
            loading,
        );
        assert!(matches!(
            orchestrator
                .capture_selected(&ids(&["gender_participation"]))
                .await,
            Err(ReportError::Validation(_))
        ));
    }
}
