//! Data aggregation: fetch each dataset family and reshape the nested
//! backend counts into flat chart-ready records.
//!
//! Families are independent: they fetch concurrently, and a failure in
//! one only empties that family's datasets. The gender, equity and CDEV
//! families are mode-independent and fetch once at startup; the
//! year-over-year family follows mode changes and the census family
//! follows (mode, term) changes, clearing when their preconditions no
//! longer hold.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::watch;
use tracing::{info, warn};

use crate::api::Term;
use crate::backend::raw::{
    CdevResult, CensusFacultyDrop, EquityResult, GenderResult, YoyFacultyCounts,
};
use crate::backend::{AnalyticsBackend, DatasetFamily};
use crate::models::datasets::{
    CdevGenderRecord, CdevResidencyRecord, CensusDropRecord, FirstGenShareRecord,
    GenderShareRecord, GenderTotalRecord, IndigenousShareRecord, RegionalRecord, SesShareRecord,
    YoyFacultyRecord, YoyResidencyRecord,
};
use crate::models::AnalysisMode;
use crate::state::ReportState;

/// All chart-ready datasets held in process state. Replaced wholesale
/// per family on refetch, never merged.
#[derive(Debug, Clone, Default)]
pub struct ChartStore {
    pub gender_by_faculty: Vec<GenderShareRecord>,
    pub gender_totals: Vec<GenderTotalRecord>,
    pub first_generation: Vec<FirstGenShareRecord>,
    pub ses: Vec<SesShareRecord>,
    pub indigenous: Vec<IndigenousShareRecord>,
    pub regional_remote: Vec<RegionalRecord>,
    pub cdev_residency: Vec<CdevResidencyRecord>,
    pub cdev_residency_types: Vec<String>,
    pub cdev_gender: Vec<CdevGenderRecord>,
    pub yoy_faculty: Vec<YoyFacultyRecord>,
    pub yoy_residency: Vec<YoyResidencyRecord>,
    pub census_drop: Vec<CensusDropRecord>,
}

/// Per-family in-flight flags. A set flag blocks report generation
/// until the corresponding fetch resolves.
#[derive(Debug, Default)]
pub struct LoadingFlags {
    gender: AtomicBool,
    equity: AtomicBool,
    cdev: AtomicBool,
    yoy: AtomicBool,
    census: AtomicBool,
}

impl LoadingFlags {
    fn slot(&self, family: DatasetFamily) -> &AtomicBool {
        match family {
            DatasetFamily::Gender => &self.gender,
            DatasetFamily::Equity => &self.equity,
            DatasetFamily::Cdev => &self.cdev,
            DatasetFamily::Yoy => &self.yoy,
            DatasetFamily::Census => &self.census,
        }
    }

    pub fn set(&self, family: DatasetFamily, loading: bool) {
        self.slot(family).store(loading, Ordering::SeqCst);
    }

    pub fn is_loading(&self, family: DatasetFamily) -> bool {
        self.slot(family).load(Ordering::SeqCst)
    }

    pub fn any_loading(&self) -> bool {
        DatasetFamily::ALL.iter().any(|f| self.is_loading(*f))
    }
}

// ==================== Reshaping ====================

/// Percentage of `part` in `total`, rounded to two decimals. Zero
/// totals count as one so the division is always defined.
fn share2(part: u64, total: u64) -> f64 {
    let total = total.max(1) as f64;
    (part as f64 / total * 100.0 * 100.0).round() / 100.0
}

/// Same as [`share2`] but rounded to one decimal (CDEV gender chart).
fn share1(part: u64, total: u64) -> f64 {
    let total = total.max(1) as f64;
    (part as f64 / total * 100.0 * 10.0).round() / 10.0
}

fn short_faculty(name: &str) -> String {
    name.replace("Faculty of ", "")
        .replace("UNSW ", "")
        .replace("University of New South Wales ", "")
}

/// Gender family → faculty percentage rows plus overview totals.
pub fn reshape_gender(raw: &GenderResult) -> (Vec<GenderShareRecord>, Vec<GenderTotalRecord>) {
    let by_faculty = raw
        .by_faculty
        .iter()
        .map(|faculty| {
            let count = |code: &str| faculty.gender_counts.get(code).copied().unwrap_or(0);
            GenderShareRecord {
                name: faculty.faculty_descr.clone(),
                female: share2(count("F"), faculty.total_count),
                male: share2(count("M"), faculty.total_count),
                unspecified: share2(count("U"), faculty.total_count),
            }
        })
        .collect();

    let mut totals: BTreeMap<String, u64> = BTreeMap::new();
    for faculty in &raw.by_faculty {
        for (code, count) in &faculty.gender_counts {
            let name = match code.to_uppercase().as_str() {
                "F" => "Female",
                "M" => "Male",
                "U" => "Unspecified",
                _ => code.as_str(),
            }
            .to_string();
            *totals.entry(name).or_insert(0) += count;
        }
    }
    let mut overview: Vec<GenderTotalRecord> = totals
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(gender, count)| GenderTotalRecord { gender, count })
        .collect();
    // Female always leads; the rest order by descending count.
    overview.sort_by(|a, b| {
        let female_first = |g: &str| u8::from(g != "Female");
        female_first(&a.gender)
            .cmp(&female_first(&b.gender))
            .then(b.count.cmp(&a.count))
    });

    (by_faculty, overview)
}

/// Chart-ready records reshaped from one equity-cohort response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EquityCharts {
    pub first_generation: Vec<FirstGenShareRecord>,
    pub ses: Vec<SesShareRecord>,
    pub indigenous: Vec<IndigenousShareRecord>,
    pub regional_remote: Vec<RegionalRecord>,
}

pub fn reshape_equity(raw: &EquityResult) -> EquityCharts {
    EquityCharts {
        first_generation: raw
            .first_generation
            .iter()
            .map(|f| FirstGenShareRecord {
                name: f.faculty_descr.clone(),
                first_generation: share2(f.first_generation, f.total),
                non_first_generation: share2(f.non_first_generation, f.total),
            })
            .collect(),
        ses: raw
            .ses
            .iter()
            .map(|f| SesShareRecord {
                name: f.faculty_descr.clone(),
                high: share2(f.high, f.total),
                medium: share2(f.medium, f.total),
                low: share2(f.low, f.total),
                unknown: share2(f.unknown, f.total),
            })
            .collect(),
        indigenous: raw
            .atsi
            .iter()
            .map(|f| IndigenousShareRecord {
                name: f.faculty_descr.clone(),
                indigenous: share2(f.indigenous, f.total),
                non_indigenous: share2(f.non_indigenous, f.total),
            })
            .collect(),
        regional_remote: raw
            .regional_remote
            .iter()
            .map(|r| RegionalRecord {
                regional_remote: r.regional_remote.clone(),
                count: r.count,
            })
            .collect(),
    }
}

/// CDEV family → residency rows (with the union of residency labels)
/// and per-course gender percentages.
pub fn reshape_cdev(
    raw: &CdevResult,
) -> (Vec<CdevResidencyRecord>, Vec<String>, Vec<CdevGenderRecord>) {
    let mut residency_types: BTreeSet<String> = BTreeSet::new();
    for course in &raw.by_residency {
        for item in &course.residency_breakdown {
            residency_types.insert(item.residency_group_descr.clone());
        }
    }

    let residency = raw
        .by_residency
        .iter()
        .map(|course| {
            let mut counts: BTreeMap<String, u64> =
                residency_types.iter().map(|t| (t.clone(), 0)).collect();
            for item in &course.residency_breakdown {
                counts.insert(item.residency_group_descr.clone(), item.count);
            }
            CdevResidencyRecord {
                name: course
                    .course_name
                    .clone()
                    .unwrap_or_else(|| course.course_code.clone()),
                total: course.total,
                counts,
            }
        })
        .collect();

    let gender = raw
        .by_gender
        .iter()
        .map(|course| {
            let mut record = CdevGenderRecord {
                name: course.course_code.clone(),
                female: 0.0,
                male: 0.0,
            };
            for item in &course.gender_breakdown {
                let pct = share1(item.count, course.total);
                match item.gender.as_str() {
                    "F" => record.female = pct,
                    "M" => record.male = pct,
                    _ => {}
                }
            }
            record
        })
        .collect();

    (residency, residency_types.into_iter().collect(), gender)
}

/// Year-over-year family → faculty rows and residency rows sorted by
/// faculty then residency label.
pub fn reshape_yoy(raw: &[YoyFacultyCounts]) -> (Vec<YoyFacultyRecord>, Vec<YoyResidencyRecord>) {
    let faculty = raw
        .iter()
        .map(|f| YoyFacultyRecord {
            faculty_descr: f.faculty_descr.clone(),
            previous: f.previous,
            current: f.current,
        })
        .collect();

    let mut residency: Vec<YoyResidencyRecord> = Vec::new();
    for f in raw {
        for r in &f.residency_breakdown {
            let residency_label = if r.residency_group_descr == "International" {
                "International"
            } else {
                "Local"
            };
            residency.push(YoyResidencyRecord {
                label: format!("{}\n{}", residency_label, short_faculty(&f.faculty_descr)),
                faculty: f.faculty_descr.clone(),
                residency: r.residency_group_descr.clone(),
                previous: r.previous,
                current: r.current,
            });
        }
    }
    residency.sort_by(|a, b| {
        a.faculty
            .cmp(&b.faculty)
            .then_with(|| a.residency.cmp(&b.residency))
    });

    (faculty, residency)
}

pub fn reshape_census(raw: &[CensusFacultyDrop]) -> Vec<CensusDropRecord> {
    raw.iter()
        .map(|faculty| {
            let drop_for = |code: &str| {
                faculty
                    .gender_breakdown
                    .iter()
                    .find(|g| g.gender == code)
                    .map(|g| g.drop_count)
                    .unwrap_or(0)
            };
            CensusDropRecord {
                faculty: faculty
                    .faculty_descr
                    .as_deref()
                    .map(short_faculty)
                    .unwrap_or_default(),
                male_drop: drop_for("M"),
                female_drop: drop_for("F"),
                total_drop: faculty.total_drop,
            }
        })
        .collect()
}

// ==================== Aggregator ====================

/// Fetch-and-reshape driver for all dataset families.
pub struct DataAggregator {
    backend: Arc<dyn AnalyticsBackend>,
    charts: Arc<RwLock<ChartStore>>,
    loading: Arc<LoadingFlags>,
}

impl DataAggregator {
    pub fn new(backend: Arc<dyn AnalyticsBackend>) -> Self {
        Self {
            backend,
            charts: Arc::new(RwLock::new(ChartStore::default())),
            loading: Arc::new(LoadingFlags::default()),
        }
    }

    /// Shared handle to the chart datasets.
    pub fn charts(&self) -> Arc<RwLock<ChartStore>> {
        Arc::clone(&self.charts)
    }

    /// Current datasets, cloned.
    pub fn snapshot(&self) -> ChartStore {
        self.charts.read().expect("chart store poisoned").clone()
    }

    pub fn loading(&self) -> Arc<LoadingFlags> {
        Arc::clone(&self.loading)
    }

    fn write<F: FnOnce(&mut ChartStore)>(&self, apply: F) {
        let mut store = self.charts.write().expect("chart store poisoned");
        apply(&mut store);
    }

    /// Fetch the gender participation family and replace its datasets.
    /// On failure the datasets reset to empty.
    pub async fn refresh_gender(&self) {
        self.loading.set(DatasetFamily::Gender, true);
        match self.backend.participation_gender().await {
            Ok(raw) => {
                let (by_faculty, totals) = reshape_gender(&raw);
                self.write(|store| {
                    store.gender_by_faculty = by_faculty;
                    store.gender_totals = totals;
                });
            }
            Err(err) => {
                warn!(error = %err, "gender participation fetch failed");
                self.write(|store| {
                    store.gender_by_faculty = Vec::new();
                    store.gender_totals = Vec::new();
                });
            }
        }
        self.loading.set(DatasetFamily::Gender, false);
    }

    pub async fn refresh_equity(&self) {
        self.loading.set(DatasetFamily::Equity, true);
        match self.backend.equity_cohort().await {
            Ok(raw) => {
                let charts = reshape_equity(&raw);
                self.write(|store| {
                    store.first_generation = charts.first_generation;
                    store.ses = charts.ses;
                    store.indigenous = charts.indigenous;
                    store.regional_remote = charts.regional_remote;
                });
            }
            Err(err) => {
                warn!(error = %err, "equity cohort fetch failed");
                self.write(|store| {
                    store.first_generation = Vec::new();
                    store.ses = Vec::new();
                    store.indigenous = Vec::new();
                    store.regional_remote = Vec::new();
                });
            }
        }
        self.loading.set(DatasetFamily::Equity, false);
    }

    pub async fn refresh_cdev(&self) {
        self.loading.set(DatasetFamily::Cdev, true);
        match self.backend.cdev().await {
            Ok(raw) => {
                let (residency, types, gender) = reshape_cdev(&raw);
                self.write(|store| {
                    store.cdev_residency = residency;
                    store.cdev_residency_types = types;
                    store.cdev_gender = gender;
                });
            }
            Err(err) => {
                warn!(error = %err, "cdev fetch failed");
                self.write(|store| {
                    store.cdev_residency = Vec::new();
                    store.cdev_residency_types = Vec::new();
                    store.cdev_gender = Vec::new();
                });
            }
        }
        self.loading.set(DatasetFamily::Cdev, false);
    }

    /// Fetch or clear the year-over-year family for the given mode.
    pub async fn sync_yoy(&self, mode: AnalysisMode) {
        if !mode.is_yoy_bearing() {
            self.write(|store| {
                store.yoy_faculty = Vec::new();
                store.yoy_residency = Vec::new();
            });
            return;
        }
        self.loading.set(DatasetFamily::Yoy, true);
        match self.backend.yoy_comparison().await {
            Ok(raw) => {
                let (faculty, residency) = reshape_yoy(&raw);
                self.write(|store| {
                    store.yoy_faculty = faculty;
                    store.yoy_residency = residency;
                });
            }
            Err(err) => {
                warn!(error = %err, "yoy comparison fetch failed");
                self.write(|store| {
                    store.yoy_faculty = Vec::new();
                    store.yoy_residency = Vec::new();
                });
            }
        }
        self.loading.set(DatasetFamily::Yoy, false);
    }

    /// Fetch or clear the census-drop family. Fetches only when the
    /// mode is census-bearing and a term is selected.
    pub async fn sync_census(&self, mode: AnalysisMode, term: Option<&Term>) {
        let term = match (mode.is_census_bearing(), term) {
            (true, Some(term)) => term,
            _ => {
                self.write(|store| store.census_drop = Vec::new());
                return;
            }
        };
        self.loading.set(DatasetFamily::Census, true);
        match self.backend.census_gender_drop(term).await {
            Ok(raw) => {
                let records = reshape_census(&raw);
                self.write(|store| store.census_drop = records);
            }
            Err(err) => {
                warn!(error = %err, term = %term, "census gender drop fetch failed");
                self.write(|store| store.census_drop = Vec::new());
            }
        }
        self.loading.set(DatasetFamily::Census, false);
    }

    /// Startup fetch: the three mode-independent families concurrently,
    /// plus the mode-dependent families for the initial state.
    pub async fn refresh_all(&self, state: &ReportState) {
        tokio::join!(
            self.refresh_gender(),
            self.refresh_equity(),
            self.refresh_cdev(),
            self.sync_yoy(state.mode),
            self.sync_census(state.mode, state.term.as_ref()),
        );
    }

    /// Subscription loop: react to state changes the way the dataset
    /// triggers require. YoY refetches on mode changes only; census on
    /// mode or term changes.
    pub async fn watch(self: Arc<Self>, mut rx: watch::Receiver<ReportState>) {
        let mut seen = rx.borrow_and_update().clone();
        self.refresh_all(&seen).await;
        while rx.changed().await.is_ok() {
            let state = rx.borrow_and_update().clone();
            info!(mode = state.mode.as_str(), "report state changed");
            let mode_changed = state.mode != seen.mode;
            let term_changed = state.term != seen.term;
            if mode_changed {
                self.sync_yoy(state.mode).await;
            }
            if mode_changed || term_changed {
                self.sync_census(state.mode, state.term.as_ref()).await;
            }
            seen = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::raw::{FacultyGenderCounts, GenderCount};

    fn faculty(name: &str, f: u64, m: u64, u: u64, total: u64) -> FacultyGenderCounts {
        let mut gender_counts = BTreeMap::new();
        gender_counts.insert("F".to_string(), f);
        gender_counts.insert("M".to_string(), m);
        gender_counts.insert("U".to_string(), u);
        FacultyGenderCounts {
            faculty_descr: name.to_string(),
            gender_counts,
            total_count: total,
        }
    }

    #[test]
    fn gender_shares_are_percentages() {
        let raw = GenderResult {
            by_faculty: vec![faculty("Engineering", 30, 60, 10, 100)],
        };
        let (by_faculty, _) = reshape_gender(&raw);
        assert_eq!(by_faculty[0].female, 30.0);
        assert_eq!(by_faculty[0].male, 60.0);
        assert_eq!(by_faculty[0].unspecified, 10.0);
    }

    #[test]
    fn zero_total_does_not_divide_by_zero() {
        let raw = GenderResult {
            by_faculty: vec![faculty("Empty", 0, 0, 0, 0)],
        };
        let (by_faculty, totals) = reshape_gender(&raw);
        assert_eq!(by_faculty[0].female, 0.0);
        assert_eq!(by_faculty[0].male, 0.0);
        assert_eq!(by_faculty[0].unspecified, 0.0);
        // Zero-count genders are dropped from the overview entirely.
        assert!(totals.is_empty());
    }

    #[test]
    fn shares_round_to_two_decimals() {
        // 1/3 of 3 -> 33.33
        assert_eq!(share2(1, 3), 33.33);
        assert_eq!(share2(2, 3), 66.67);
    }

    #[test]
    fn overview_orders_female_before_male() {
        let raw = GenderResult {
            by_faculty: vec![faculty("A", 10, 90, 5, 105), faculty("B", 20, 40, 0, 60)],
        };
        let (_, totals) = reshape_gender(&raw);
        assert_eq!(totals[0].gender, "Female");
        assert_eq!(totals[0].count, 30);
        assert_eq!(totals[1].gender, "Male");
        assert_eq!(totals[1].count, 130);
        assert_eq!(totals[2].gender, "Unspecified");
    }

    #[test]
    fn overview_ranks_non_female_genders_by_count() {
        // Unspecified outnumbers Male; Female still leads.
        let raw = GenderResult {
            by_faculty: vec![faculty("A", 10, 20, 50, 80)],
        };
        let (_, totals) = reshape_gender(&raw);
        let order: Vec<&str> = totals.iter().map(|t| t.gender.as_str()).collect();
        assert_eq!(order, vec!["Female", "Unspecified", "Male"]);
    }

    #[test]
    fn cdev_residency_types_are_unioned_and_zero_filled() {
        use crate::backend::raw::{CdevCourseResidency, ResidencyCount};
        let raw = CdevResult {
            by_residency: vec![
                CdevCourseResidency {
                    course_code: "CDEV3000".to_string(),
                    course_name: None,
                    total: 40,
                    residency_breakdown: vec![ResidencyCount {
                        residency_group_descr: "Local".to_string(),
                        count: 40,
                    }],
                },
                CdevCourseResidency {
                    course_code: "CDEV6000".to_string(),
                    course_name: Some("Advanced Practice".to_string()),
                    total: 10,
                    residency_breakdown: vec![ResidencyCount {
                        residency_group_descr: "International".to_string(),
                        count: 10,
                    }],
                },
            ],
            by_gender: Vec::new(),
        };
        let (residency, types, _) = reshape_cdev(&raw);
        assert_eq!(types, vec!["International".to_string(), "Local".to_string()]);
        // Course code stands in when the name is missing.
        assert_eq!(residency[0].name, "CDEV3000");
        assert_eq!(residency[1].name, "Advanced Practice");
        // Absent labels zero-filled on every row.
        assert_eq!(residency[0].counts.get("International"), Some(&0));
        assert_eq!(residency[1].counts.get("Local"), Some(&0));
    }

    #[test]
    fn cdev_gender_uses_one_decimal() {
        use crate::backend::raw::CdevCourseGender;
        let raw = CdevResult {
            by_residency: Vec::new(),
            by_gender: vec![CdevCourseGender {
                course_code: "CDEV3000".to_string(),
                total: 3,
                gender_breakdown: vec![
                    GenderCount {
                        gender: "F".to_string(),
                        count: 1,
                    },
                    GenderCount {
                        gender: "M".to_string(),
                        count: 2,
                    },
                ],
            }],
        };
        let (_, _, gender) = reshape_cdev(&raw);
        assert_eq!(gender[0].female, 33.3);
        assert_eq!(gender[0].male, 66.7);
    }

    #[test]
    fn yoy_residency_labels_and_order() {
        use crate::backend::raw::YoyResidencyCounts;
        let raw = vec![
            YoyFacultyCounts {
                faculty_descr: "UNSW Business School".to_string(),
                previous: 10,
                current: 12,
                residency_breakdown: vec![YoyResidencyCounts {
                    residency_group_descr: "Local".to_string(),
                    previous: 10,
                    current: 12,
                }],
            },
            YoyFacultyCounts {
                faculty_descr: "Faculty of Engineering".to_string(),
                previous: 5,
                current: 6,
                residency_breakdown: vec![
                    YoyResidencyCounts {
                        residency_group_descr: "Local".to_string(),
                        previous: 3,
                        current: 4,
                    },
                    YoyResidencyCounts {
                        residency_group_descr: "International".to_string(),
                        previous: 2,
                        current: 2,
                    },
                ],
            },
        ];
        let (_, residency) = reshape_yoy(&raw);
        // Sorted by faculty, then residency.
        assert_eq!(residency[0].faculty, "Faculty of Engineering");
        assert_eq!(residency[0].residency, "International");
        assert_eq!(residency[0].label, "International\nEngineering");
        assert_eq!(residency[1].label, "Local\nEngineering");
        assert_eq!(residency[2].label, "Local\nBusiness School");
    }

    #[test]
    fn census_reshaping_strips_prefixes_and_fills_missing_genders() {
        use crate::backend::raw::CensusGenderDrop;
        let raw = vec![CensusFacultyDrop {
            faculty_descr: Some("Faculty of Science".to_string()),
            gender_breakdown: vec![CensusGenderDrop {
                gender: "F".to_string(),
                drop_count: 7,
            }],
            total_drop: 7,
        }];
        let records = reshape_census(&raw);
        assert_eq!(records[0].faculty, "Science");
        assert_eq!(records[0].female_drop, 7);
        assert_eq!(records[0].male_drop, 0);
        assert_eq!(records[0].total_drop, 7);
    }
}
