//! Chart-ready record types produced by the data aggregation service.
//!
//! Each record is one plotted category after reshaping a backend
//! response: nested per-category counts become flat percentage or count
//! rows keyed the way the corresponding chart consumes them.

use serde::Serialize;
use std::collections::BTreeMap;

/// Per-faculty gender split as percentages of the faculty total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenderShareRecord {
    pub name: String,
    pub female: f64,
    pub male: f64,
    pub unspecified: f64,
}

/// One slice of the gender overview donut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenderTotalRecord {
    pub gender: String,
    pub count: u64,
}

/// Per-faculty first-generation split as percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirstGenShareRecord {
    pub name: String,
    pub first_generation: f64,
    pub non_first_generation: f64,
}

/// Per-faculty socio-economic-status split as percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SesShareRecord {
    pub name: String,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub unknown: f64,
}

/// Per-faculty indigenous split as percentages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndigenousShareRecord {
    pub name: String,
    pub indigenous: f64,
    pub non_indigenous: f64,
}

/// Raw regional/remote counts, passed through unreshaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegionalRecord {
    pub regional_remote: String,
    pub count: u64,
}

/// Per-course residency counts for the CDEV family. The key set of
/// `counts` is the union of residency labels across all courses; labels
/// a course lacks are zero-filled so every row plots the same series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CdevResidencyRecord {
    pub name: String,
    pub total: u64,
    pub counts: BTreeMap<String, u64>,
}

/// Per-course gender split as percentages (one decimal).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CdevGenderRecord {
    pub name: String,
    pub female: f64,
    pub male: f64,
}

/// Per-faculty enrolment counts for two successive years.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YoyFacultyRecord {
    pub faculty_descr: String,
    pub previous: u64,
    pub current: u64,
}

/// Per-faculty, per-residency year-over-year counts. `label` is the
/// two-line axis label (`{Local|International}\n{short faculty name}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YoyResidencyRecord {
    pub label: String,
    pub faculty: String,
    pub residency: String,
    pub previous: u64,
    pub current: u64,
}

/// Per-faculty enrolment drops after census day, split by gender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CensusDropRecord {
    pub faculty: String,
    pub male_drop: u64,
    pub female_drop: u64,
    pub total_drop: u64,
}
