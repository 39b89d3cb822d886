//! Public API surface for the report pipeline.
//!
//! This file consolidates the crate's data-carrying types: identifier
//! newtypes plus re-exports of the domain records, so downstream code
//! can import everything from one place.

pub use crate::models::datasets::{
    CdevGenderRecord, CdevResidencyRecord, CensusDropRecord, FirstGenShareRecord,
    GenderShareRecord, GenderTotalRecord, IndigenousShareRecord, RegionalRecord, SesShareRecord,
    YoyFacultyRecord, YoyResidencyRecord,
};
pub use crate::models::mode::{AnalysisMode, FileRequirement, ReportOptions};
pub use crate::models::section::{ReportSection, SectionSelection};
pub use crate::services::aggregate::ChartStore;
pub use crate::services::capture::CapturedSurface;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Academic period identifier scoping census-day analyses.
///
/// Owned by the process-wide state store; census fetches never run
/// without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Term(String);

impl Term {
    pub fn new(label: impl Into<String>) -> Self {
        Term(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The term labels offered on the upload screen.
pub const TERM_OPTIONS: &[&str] = &[
    "Hexamester 1",
    "Hexamester 4",
    "Semester 1 Canberra",
    "Semester 2 Canberra",
    "Summer Term",
    "Term 1",
    "Term 2",
    "Term 3",
];
