//! Raw response shapes returned by the analytics backend.
//!
//! Every endpoint wraps its payload in a `{code, message, result}`
//! envelope; the inner shapes are family-specific nested counts. Fields
//! the backend sometimes omits default to zero or empty, matching how
//! the aggregation layer tolerates partial payloads.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// JSON envelope shared by all analytics endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
    pub result: T,
}

// ==================== Gender participation family ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenderResult {
    #[serde(rename = "gender proportion in WIL", default)]
    pub by_faculty: Vec<FacultyGenderCounts>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FacultyGenderCounts {
    pub faculty_descr: String,
    /// Counts keyed by gender code (`F`, `M`, `U`, ...). Kept as a map
    /// so unexpected codes still contribute to the overview totals.
    #[serde(default)]
    pub gender_counts: BTreeMap<String, u64>,
    #[serde(default)]
    pub total_count: u64,
}

// ==================== Equity cohort family ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EquityResult {
    #[serde(rename = "first generation", default)]
    pub first_generation: Vec<FirstGenCounts>,
    #[serde(default)]
    pub ses: Vec<SesCounts>,
    #[serde(rename = "atsi group", default)]
    pub atsi: Vec<AtsiCounts>,
    #[serde(rename = "regional remote", default)]
    pub regional_remote: Vec<RegionalCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FirstGenCounts {
    pub faculty_descr: String,
    #[serde(rename = "First Generation", default)]
    pub first_generation: u64,
    #[serde(rename = "Non First Generation", default)]
    pub non_first_generation: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SesCounts {
    pub faculty_descr: String,
    #[serde(rename = "High", default)]
    pub high: u64,
    #[serde(rename = "Medium", default)]
    pub medium: u64,
    #[serde(rename = "Low", default)]
    pub low: u64,
    #[serde(rename = "Unknown", default)]
    pub unknown: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AtsiCounts {
    pub faculty_descr: String,
    #[serde(rename = "Indigenous", default)]
    pub indigenous: u64,
    #[serde(rename = "Non Indigenous", default)]
    pub non_indigenous: u64,
    #[serde(default)]
    pub total: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegionalCount {
    pub regional_remote: String,
    #[serde(default)]
    pub count: u64,
}

// ==================== CDEV family ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CdevResult {
    #[serde(rename = "CDEV by Residency and Course", default)]
    pub by_residency: Vec<CdevCourseResidency>,
    #[serde(rename = "CDEV by Gender", default)]
    pub by_gender: Vec<CdevCourseGender>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CdevCourseResidency {
    pub course_code: String,
    #[serde(default)]
    pub course_name: Option<String>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub residency_breakdown: Vec<ResidencyCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResidencyCount {
    pub residency_group_descr: String,
    #[serde(default)]
    pub count: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CdevCourseGender {
    pub course_code: String,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub gender_breakdown: Vec<GenderCount>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenderCount {
    pub gender: String,
    #[serde(default)]
    pub count: u64,
}

// ==================== Year-over-year family ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YoyFacultyCounts {
    pub faculty_descr: String,
    #[serde(rename = "2024", default)]
    pub previous: u64,
    #[serde(rename = "2025", default)]
    pub current: u64,
    #[serde(default)]
    pub residency_breakdown: Vec<YoyResidencyCounts>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct YoyResidencyCounts {
    pub residency_group_descr: String,
    #[serde(rename = "2024", default)]
    pub previous: u64,
    #[serde(rename = "2025", default)]
    pub current: u64,
}

// ==================== Census drop family ====================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CensusFacultyDrop {
    #[serde(default)]
    pub faculty_descr: Option<String>,
    #[serde(default)]
    pub gender_breakdown: Vec<CensusGenderDrop>,
    #[serde(default)]
    pub total_drop: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CensusGenderDrop {
    pub gender: String,
    #[serde(default)]
    pub drop_count: u64,
}
