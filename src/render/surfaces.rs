//! The standard chart surfaces and their registry.
//!
//! Every capturable chart in the report maps to one [`ChartKind`]. The
//! renderer picks the backing dataset out of the chart store, shapes it
//! into bar series or donut slices, and rasterizes the markup. An empty
//! backing dataset is an error so captures of stale surfaces get
//! skipped instead of producing blank pages.

use async_trait::async_trait;

use super::raster::rasterize_svg;
use super::svg::{donut_chart, grouped_bar_chart, BarSeries, DonutSlice};
use super::{RasterImage, RenderError, SurfaceGeometry, SurfaceRegistry, SurfaceRenderer};
use crate::services::aggregate::ChartStore;

const FEMALE_COLOR: &str = "#E91E63";
const MALE_COLOR: &str = "#2196F3";
const UNSPECIFIED_COLOR: &str = "#9E9E9E";
const PREVIOUS_YEAR_COLOR: &str = "#90A4AE";
const CURRENT_YEAR_COLOR: &str = "#FF6B6B";
const PALETTE: [&str; 6] = [
    "#6A1B9A", "#45B7D1", "#FF6B6B", "#8E24AA", "#26A69A", "#FFA726",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    GenderByFaculty,
    GenderOverview,
    FirstGeneration,
    SocioEconomic,
    Indigenous,
    RegionalRemote,
    CdevResidency,
    CdevGender,
    YoyFaculty,
    YoyResidency,
    CensusDrop,
}

/// A chart surface rendered from the shared chart store.
pub struct ChartSurface {
    kind: ChartKind,
}

impl ChartSurface {
    pub fn new(kind: ChartKind) -> Self {
        Self { kind }
    }

    fn build_svg(&self, charts: &ChartStore, geometry: &SurfaceGeometry) -> Result<String, RenderError> {
        let (w, h) = (geometry.width, geometry.height);
        match self.kind {
            ChartKind::GenderByFaculty => {
                let rows = &charts.gender_by_faculty;
                if rows.is_empty() {
                    return Err(RenderError::EmptyDataset("gender_by_faculty"));
                }
                let categories: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
                Ok(grouped_bar_chart(
                    w,
                    h,
                    &categories,
                    &[
                        series("Female", FEMALE_COLOR, rows.iter().map(|r| r.female)),
                        series("Male", MALE_COLOR, rows.iter().map(|r| r.male)),
                        series(
                            "Unspecified",
                            UNSPECIFIED_COLOR,
                            rows.iter().map(|r| r.unspecified),
                        ),
                    ],
                ))
            }
            ChartKind::GenderOverview => {
                let rows = &charts.gender_totals;
                if rows.is_empty() {
                    return Err(RenderError::EmptyDataset("gender_totals"));
                }
                let slices: Vec<DonutSlice> = rows
                    .iter()
                    .map(|r| DonutSlice {
                        label: r.gender.clone(),
                        value: r.count as f64,
                        color: match r.gender.as_str() {
                            "Female" => FEMALE_COLOR,
                            "Male" => MALE_COLOR,
                            _ => UNSPECIFIED_COLOR,
                        }
                        .to_string(),
                    })
                    .collect();
                Ok(donut_chart(w, h, &slices))
            }
            ChartKind::FirstGeneration => {
                let rows = &charts.first_generation;
                if rows.is_empty() {
                    return Err(RenderError::EmptyDataset("first_generation"));
                }
                let categories: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
                Ok(grouped_bar_chart(
                    w,
                    h,
                    &categories,
                    &[
                        series(
                            "First Generation",
                            PALETTE[0],
                            rows.iter().map(|r| r.first_generation),
                        ),
                        series(
                            "Non First Generation",
                            PALETTE[1],
                            rows.iter().map(|r| r.non_first_generation),
                        ),
                    ],
                ))
            }
            ChartKind::SocioEconomic => {
                let rows = &charts.ses;
                if rows.is_empty() {
                    return Err(RenderError::EmptyDataset("ses"));
                }
                let categories: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
                Ok(grouped_bar_chart(
                    w,
                    h,
                    &categories,
                    &[
                        series("High", PALETTE[0], rows.iter().map(|r| r.high)),
                        series("Medium", PALETTE[1], rows.iter().map(|r| r.medium)),
                        series("Low", PALETTE[2], rows.iter().map(|r| r.low)),
                        series("Unknown", UNSPECIFIED_COLOR, rows.iter().map(|r| r.unknown)),
                    ],
                ))
            }
            ChartKind::Indigenous => {
                let rows = &charts.indigenous;
                if rows.is_empty() {
                    return Err(RenderError::EmptyDataset("indigenous"));
                }
                let categories: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
                Ok(grouped_bar_chart(
                    w,
                    h,
                    &categories,
                    &[
                        series("Indigenous", PALETTE[4], rows.iter().map(|r| r.indigenous)),
                        series(
                            "Non Indigenous",
                            PALETTE[1],
                            rows.iter().map(|r| r.non_indigenous),
                        ),
                    ],
                ))
            }
            ChartKind::RegionalRemote => {
                let rows = &charts.regional_remote;
                if rows.is_empty() {
                    return Err(RenderError::EmptyDataset("regional_remote"));
                }
                let slices: Vec<DonutSlice> = rows
                    .iter()
                    .enumerate()
                    .map(|(i, r)| DonutSlice {
                        label: r.regional_remote.clone(),
                        value: r.count as f64,
                        color: PALETTE[i % PALETTE.len()].to_string(),
                    })
                    .collect();
                Ok(donut_chart(w, h, &slices))
            }
            ChartKind::CdevResidency => {
                let rows = &charts.cdev_residency;
                if rows.is_empty() {
                    return Err(RenderError::EmptyDataset("cdev_residency"));
                }
                let categories: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
                let bars: Vec<BarSeries> = charts
                    .cdev_residency_types
                    .iter()
                    .enumerate()
                    .map(|(i, label)| {
                        series(
                            label,
                            PALETTE[i % PALETTE.len()],
                            rows.iter()
                                .map(|r| r.counts.get(label).copied().unwrap_or(0) as f64),
                        )
                    })
                    .collect();
                Ok(grouped_bar_chart(w, h, &categories, &bars))
            }
            ChartKind::CdevGender => {
                let rows = &charts.cdev_gender;
                if rows.is_empty() {
                    return Err(RenderError::EmptyDataset("cdev_gender"));
                }
                let categories: Vec<String> = rows.iter().map(|r| r.name.clone()).collect();
                Ok(grouped_bar_chart(
                    w,
                    h,
                    &categories,
                    &[
                        series("Female", FEMALE_COLOR, rows.iter().map(|r| r.female)),
                        series("Male", MALE_COLOR, rows.iter().map(|r| r.male)),
                    ],
                ))
            }
            ChartKind::YoyFaculty => {
                let rows = &charts.yoy_faculty;
                if rows.is_empty() {
                    return Err(RenderError::EmptyDataset("yoy_faculty"));
                }
                let categories: Vec<String> = rows.iter().map(|r| r.faculty_descr.clone()).collect();
                Ok(grouped_bar_chart(
                    w,
                    h,
                    &categories,
                    &[
                        series(
                            "2024",
                            PREVIOUS_YEAR_COLOR,
                            rows.iter().map(|r| r.previous as f64),
                        ),
                        series(
                            "2025",
                            CURRENT_YEAR_COLOR,
                            rows.iter().map(|r| r.current as f64),
                        ),
                    ],
                ))
            }
            ChartKind::YoyResidency => {
                let rows = &charts.yoy_residency;
                if rows.is_empty() {
                    return Err(RenderError::EmptyDataset("yoy_residency"));
                }
                let categories: Vec<String> = rows.iter().map(|r| r.label.clone()).collect();
                Ok(grouped_bar_chart(
                    w,
                    h,
                    &categories,
                    &[
                        series(
                            "2024",
                            PREVIOUS_YEAR_COLOR,
                            rows.iter().map(|r| r.previous as f64),
                        ),
                        series(
                            "2025",
                            CURRENT_YEAR_COLOR,
                            rows.iter().map(|r| r.current as f64),
                        ),
                    ],
                ))
            }
            ChartKind::CensusDrop => {
                let rows = &charts.census_drop;
                if rows.is_empty() {
                    return Err(RenderError::EmptyDataset("census_drop"));
                }
                let categories: Vec<String> = rows.iter().map(|r| r.faculty.clone()).collect();
                Ok(grouped_bar_chart(
                    w,
                    h,
                    &categories,
                    &[
                        series(
                            "Male Drop",
                            MALE_COLOR,
                            rows.iter().map(|r| r.male_drop as f64),
                        ),
                        series(
                            "Female Drop",
                            FEMALE_COLOR,
                            rows.iter().map(|r| r.female_drop as f64),
                        ),
                        series(
                            "Total Drop",
                            PALETTE[0],
                            rows.iter().map(|r| r.total_drop as f64),
                        ),
                    ],
                ))
            }
        }
    }
}

fn series(name: &str, color: &str, values: impl Iterator<Item = f64>) -> BarSeries {
    BarSeries {
        name: name.to_string(),
        color: color.to_string(),
        values: values.collect(),
    }
}

#[async_trait]
impl SurfaceRenderer for ChartSurface {
    async fn render(
        &self,
        charts: &ChartStore,
        geometry: &SurfaceGeometry,
    ) -> Result<RasterImage, RenderError> {
        let svg = self.build_svg(charts, geometry)?;
        rasterize_svg(&svg, geometry.width, geometry.height)
    }
}

/// Registry with every chart surface the report sections reference.
pub fn standard_registry() -> SurfaceRegistry {
    let mut registry = SurfaceRegistry::new();
    let surfaces: [(&str, ChartKind); 11] = [
        ("gender_participation_chart1", ChartKind::GenderByFaculty),
        ("gender_participation_chart2", ChartKind::GenderOverview),
        ("wil_participation_chart3", ChartKind::FirstGeneration),
        ("wil_participation_chart4", ChartKind::SocioEconomic),
        ("wil_participation_chart5", ChartKind::Indigenous),
        ("wil_participation_chart6", ChartKind::RegionalRemote),
        ("cdev_enrolments_chart7", ChartKind::CdevResidency),
        ("cdev_enrolments_chart8", ChartKind::CdevGender),
        ("yoy_comparison_chart9", ChartKind::YoyFaculty),
        ("yoy_comparison_chart10", ChartKind::YoyResidency),
        ("chart_census1", ChartKind::CensusDrop),
    ];
    for (id, kind) in surfaces {
        registry.register(id, Box::new(ChartSurface::new(kind)));
    }
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::datasets::{GenderShareRecord, GenderTotalRecord};

    fn charts_with_gender() -> ChartStore {
        ChartStore {
            gender_by_faculty: vec![GenderShareRecord {
                name: "Engineering".to_string(),
                female: 30.0,
                male: 60.0,
                unspecified: 10.0,
            }],
            gender_totals: vec![
                GenderTotalRecord {
                    gender: "Female".to_string(),
                    count: 30,
                },
                GenderTotalRecord {
                    gender: "Male".to_string(),
                    count: 60,
                },
            ],
            ..ChartStore::default()
        }
    }

    #[test]
    fn registry_holds_all_surfaces() {
        let registry = standard_registry();
        assert_eq!(registry.ids().len(), 11);
        assert!(registry.get("chart_census1").is_some());
        assert!(registry.get("nonexistent").is_none());
    }

    #[tokio::test]
    async fn empty_dataset_is_an_error() {
        let surface = ChartSurface::new(ChartKind::CensusDrop);
        let result = surface
            .render(&ChartStore::default(), &SurfaceGeometry::canonical())
            .await;
        assert!(matches!(result, Err(RenderError::EmptyDataset(_))));
    }

    #[tokio::test]
    async fn populated_surface_renders_at_requested_size() {
        let surface = ChartSurface::new(ChartKind::GenderByFaculty);
        let image = surface
            .render(&charts_with_gender(), &SurfaceGeometry::canonical())
            .await
            .unwrap();
        assert_eq!(image.width, 1200);
        assert_eq!(image.height, 600);
        assert_eq!(image.rgba.len(), 1200 * 600 * 4);
    }

    #[tokio::test]
    async fn donut_surface_renders() {
        let surface = ChartSurface::new(ChartKind::GenderOverview);
        assert!(surface
            .render(&charts_with_gender(), &SurfaceGeometry::canonical())
            .await
            .is_ok());
    }
}
