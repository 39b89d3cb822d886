//! In-memory analytics backend for tests and local development.
//!
//! Serves canned datasets shaped like the real service's responses,
//! counts calls per family, and can be told to fail individual families
//! to exercise the pipeline's local error recovery.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use super::raw::{
    AtsiCounts, CdevCourseGender, CdevCourseResidency, CdevResult, CensusFacultyDrop,
    CensusGenderDrop, EquityResult, FacultyGenderCounts, FirstGenCounts, GenderCount, GenderResult,
    RegionalCount, ResidencyCount, SesCounts, YoyFacultyCounts, YoyResidencyCounts,
};
use super::{AnalyticsBackend, BackendError, BackendResult, DatasetFamily, UploadFile};
use crate::api::Term;
use crate::models::AnalysisMode;

#[derive(Default)]
struct Counters {
    gender: AtomicUsize,
    equity: AtomicUsize,
    cdev: AtomicUsize,
    yoy: AtomicUsize,
    census: AtomicUsize,
    upload: AtomicUsize,
    send: AtomicUsize,
}

impl Counters {
    fn slot(&self, family: DatasetFamily) -> &AtomicUsize {
        match family {
            DatasetFamily::Gender => &self.gender,
            DatasetFamily::Equity => &self.equity,
            DatasetFamily::Cdev => &self.cdev,
            DatasetFamily::Yoy => &self.yoy,
            DatasetFamily::Census => &self.census,
        }
    }
}

/// Canned backend state. Tests mutate it through the helper methods.
pub struct LocalAnalyticsBackend {
    gender: Mutex<GenderResult>,
    equity: Mutex<EquityResult>,
    cdev: Mutex<CdevResult>,
    yoy: Mutex<Vec<YoyFacultyCounts>>,
    census: Mutex<HashMap<String, Vec<CensusFacultyDrop>>>,
    failing: Mutex<Vec<DatasetFamily>>,
    counters: Counters,
}

impl Default for LocalAnalyticsBackend {
    fn default() -> Self {
        Self::with_sample_data()
    }
}

impl LocalAnalyticsBackend {
    /// Empty backend: every family answers with an empty result.
    pub fn empty() -> Self {
        Self {
            gender: Mutex::new(GenderResult::default()),
            equity: Mutex::new(EquityResult::default()),
            cdev: Mutex::new(CdevResult::default()),
            yoy: Mutex::new(Vec::new()),
            census: Mutex::new(HashMap::new()),
            failing: Mutex::new(Vec::new()),
            counters: Counters::default(),
        }
    }

    /// Backend populated with a small representative dataset.
    pub fn with_sample_data() -> Self {
        let backend = Self::empty();
        *backend.gender.lock().unwrap() = sample_gender();
        *backend.equity.lock().unwrap() = sample_equity();
        *backend.cdev.lock().unwrap() = sample_cdev();
        *backend.yoy.lock().unwrap() = sample_yoy();
        backend.census.lock().unwrap().insert(
            "Term 1".to_string(),
            sample_census(),
        );
        backend
    }

    /// Make the given family fail with a 500 until cleared.
    pub fn fail_family(&self, family: DatasetFamily) {
        self.failing.lock().unwrap().push(family);
    }

    pub fn clear_failures(&self) {
        self.failing.lock().unwrap().clear();
    }

    /// How many times a family has been fetched.
    pub fn calls(&self, family: DatasetFamily) -> usize {
        self.counters.slot(family).load(Ordering::SeqCst)
    }

    pub fn upload_calls(&self) -> usize {
        self.counters.upload.load(Ordering::SeqCst)
    }

    pub fn send_calls(&self) -> usize {
        self.counters.send.load(Ordering::SeqCst)
    }

    pub fn set_census_data(&self, term: &str, data: Vec<CensusFacultyDrop>) {
        self.census.lock().unwrap().insert(term.to_string(), data);
    }

    fn record(&self, family: DatasetFamily) -> BackendResult<()> {
        self.counters.slot(family).fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(&family) {
            return Err(BackendError::Status {
                status: 500,
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl AnalyticsBackend for LocalAnalyticsBackend {
    async fn participation_gender(&self) -> BackendResult<GenderResult> {
        self.record(DatasetFamily::Gender)?;
        Ok(self.gender.lock().unwrap().clone())
    }

    async fn equity_cohort(&self) -> BackendResult<EquityResult> {
        self.record(DatasetFamily::Equity)?;
        Ok(self.equity.lock().unwrap().clone())
    }

    async fn cdev(&self) -> BackendResult<CdevResult> {
        self.record(DatasetFamily::Cdev)?;
        Ok(self.cdev.lock().unwrap().clone())
    }

    async fn yoy_comparison(&self) -> BackendResult<Vec<YoyFacultyCounts>> {
        self.record(DatasetFamily::Yoy)?;
        Ok(self.yoy.lock().unwrap().clone())
    }

    async fn census_gender_drop(&self, term: &Term) -> BackendResult<Vec<CensusFacultyDrop>> {
        self.record(DatasetFamily::Census)?;
        Ok(self
            .census
            .lock()
            .unwrap()
            .get(term.as_str())
            .cloned()
            .unwrap_or_default())
    }

    async fn upload_batch(&self, _mode: AnalysisMode, _files: &[UploadFile]) -> BackendResult<()> {
        self.counters.upload.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn send_report(&self, _filename: &str, _pdf: Vec<u8>, _email: &str) -> BackendResult<()> {
        self.counters.send.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn gender_counts(f: u64, m: u64, u: u64) -> BTreeMap<String, u64> {
    let mut counts = BTreeMap::new();
    counts.insert("F".to_string(), f);
    counts.insert("M".to_string(), m);
    counts.insert("U".to_string(), u);
    counts
}

fn sample_gender() -> GenderResult {
    GenderResult {
        by_faculty: vec![
            FacultyGenderCounts {
                faculty_descr: "Faculty of Engineering".to_string(),
                gender_counts: gender_counts(30, 60, 10),
                total_count: 100,
            },
            FacultyGenderCounts {
                faculty_descr: "Faculty of Science".to_string(),
                gender_counts: gender_counts(45, 50, 5),
                total_count: 100,
            },
            FacultyGenderCounts {
                faculty_descr: "UNSW Business School".to_string(),
                gender_counts: gender_counts(120, 110, 10),
                total_count: 240,
            },
        ],
    }
}

fn sample_equity() -> EquityResult {
    EquityResult {
        first_generation: vec![FirstGenCounts {
            faculty_descr: "Faculty of Engineering".to_string(),
            first_generation: 25,
            non_first_generation: 75,
            total: 100,
        }],
        ses: vec![SesCounts {
            faculty_descr: "Faculty of Engineering".to_string(),
            high: 40,
            medium: 30,
            low: 20,
            unknown: 10,
            total: 100,
        }],
        atsi: vec![AtsiCounts {
            faculty_descr: "Faculty of Engineering".to_string(),
            indigenous: 4,
            non_indigenous: 96,
            total: 100,
        }],
        regional_remote: vec![
            RegionalCount {
                regional_remote: "Major Cities".to_string(),
                count: 180,
            },
            RegionalCount {
                regional_remote: "Regional".to_string(),
                count: 32,
            },
        ],
    }
}

fn sample_cdev() -> CdevResult {
    CdevResult {
        by_residency: vec![
            CdevCourseResidency {
                course_code: "CDEV3000".to_string(),
                course_name: Some("Practice of Work".to_string()),
                total: 60,
                residency_breakdown: vec![
                    ResidencyCount {
                        residency_group_descr: "Local".to_string(),
                        count: 40,
                    },
                    ResidencyCount {
                        residency_group_descr: "International".to_string(),
                        count: 20,
                    },
                ],
            },
            CdevCourseResidency {
                course_code: "CDEV6000".to_string(),
                course_name: None,
                total: 25,
                residency_breakdown: vec![ResidencyCount {
                    residency_group_descr: "International".to_string(),
                    count: 25,
                }],
            },
        ],
        by_gender: vec![CdevCourseGender {
            course_code: "CDEV3000".to_string(),
            total: 60,
            gender_breakdown: vec![
                GenderCount {
                    gender: "F".to_string(),
                    count: 33,
                },
                GenderCount {
                    gender: "M".to_string(),
                    count: 27,
                },
            ],
        }],
    }
}

fn sample_yoy() -> Vec<YoyFacultyCounts> {
    vec![
        YoyFacultyCounts {
            faculty_descr: "Faculty of Engineering".to_string(),
            previous: 420,
            current: 465,
            residency_breakdown: vec![
                YoyResidencyCounts {
                    residency_group_descr: "Local".to_string(),
                    previous: 300,
                    current: 310,
                },
                YoyResidencyCounts {
                    residency_group_descr: "International".to_string(),
                    previous: 120,
                    current: 155,
                },
            ],
        },
        YoyFacultyCounts {
            faculty_descr: "UNSW Business School".to_string(),
            previous: 510,
            current: 498,
            residency_breakdown: vec![YoyResidencyCounts {
                residency_group_descr: "Local".to_string(),
                previous: 330,
                current: 320,
            }],
        },
    ]
}

fn sample_census() -> Vec<CensusFacultyDrop> {
    vec![CensusFacultyDrop {
        faculty_descr: Some("Faculty of Engineering".to_string()),
        gender_breakdown: vec![
            CensusGenderDrop {
                gender: "M".to_string(),
                drop_count: 14,
            },
            CensusGenderDrop {
                gender: "F".to_string(),
                drop_count: 9,
            },
        ],
        total_drop: 23,
    }]
}
