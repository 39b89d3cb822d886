//! Analysis mode resolution and per-mode file requirements.
//!
//! The active [`AnalysisMode`] is derived from two independent report
//! options (census-day drop analysis and year-over-year comparison).
//! Every consumer matches exhaustively on the enum so a future mode
//! cannot be silently ignored.

use serde::{Deserialize, Serialize};

use crate::api::Term;

/// The two user-facing report options from the upload screen.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOptions {
    /// Census-day drop analysis requested.
    pub census: bool,
    /// Year-over-year comparison requested.
    pub comparison: bool,
}

/// The closed set of analysis modes. Exactly one is active at a time.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Standard single-file analysis.
    #[default]
    Default,
    /// Year-over-year comparison of two enrolment snapshots.
    YoyComparison,
    /// Enrolment drops after census day within one term.
    CensusDay,
    /// Census-day drops combined with year-over-year comparison.
    CensusYoy,
}

impl AnalysisMode {
    /// Derive the mode from the two report options. Total and stable:
    /// all four combinations map to exactly one mode.
    pub fn from_options(options: ReportOptions) -> Self {
        match (options.census, options.comparison) {
            (true, true) => AnalysisMode::CensusYoy,
            (true, false) => AnalysisMode::CensusDay,
            (false, true) => AnalysisMode::YoyComparison,
            (false, false) => AnalysisMode::Default,
        }
    }

    /// Wire identifier used by the upload endpoint.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisMode::Default => "default",
            AnalysisMode::YoyComparison => "yoy_comparison",
            AnalysisMode::CensusDay => "census_day",
            AnalysisMode::CensusYoy => "census_yoy",
        }
    }

    /// True when the mode includes the year-over-year dataset family.
    pub fn is_yoy_bearing(&self) -> bool {
        matches!(self, AnalysisMode::YoyComparison | AnalysisMode::CensusYoy)
    }

    /// True when the mode includes the census-drop dataset family.
    /// Census-bearing modes additionally require a selected term before
    /// the census fetch may run.
    pub fn is_census_bearing(&self) -> bool {
        matches!(self, AnalysisMode::CensusDay | AnalysisMode::CensusYoy)
    }

    /// File counts this mode expects at upload time.
    pub fn file_requirement(&self) -> FileRequirement {
        match self {
            AnalysisMode::Default => FileRequirement {
                mode: *self,
                description: "Standard Analysis",
                groups: &[FileGroup {
                    area: FileArea::Single,
                    count: 1,
                    description: "Current data file",
                }],
            },
            AnalysisMode::YoyComparison => FileRequirement {
                mode: *self,
                description: "Year-over-Year Analysis",
                groups: &[FileGroup {
                    area: FileArea::Single,
                    count: 2,
                    description: "Previous Year file + Current Year file",
                }],
            },
            AnalysisMode::CensusDay => FileRequirement {
                mode: *self,
                description: "Census Day Analysis",
                groups: &[
                    FileGroup {
                        area: FileArea::Before,
                        count: 1,
                        description: "Before Census Day file",
                    },
                    FileGroup {
                        area: FileArea::After,
                        count: 1,
                        description: "After Census Day file",
                    },
                ],
            },
            AnalysisMode::CensusYoy => FileRequirement {
                mode: *self,
                description: "Census Day + Year-over-Year Analysis",
                groups: &[
                    FileGroup {
                        area: FileArea::Before,
                        count: 2,
                        description: "Before Census Day file + Previous Year file",
                    },
                    FileGroup {
                        area: FileArea::After,
                        count: 1,
                        description: "Current Year file",
                    },
                ],
            },
        }
    }

    /// Report title printed on the first page of the compiled document.
    pub fn report_title(&self, term: Option<&Term>) -> String {
        let suffix = term.map(|t| format!(" - {t}")).unwrap_or_default();
        match self {
            AnalysisMode::Default => "WIL Report".to_string(),
            AnalysisMode::YoyComparison => "Year-over-Year Comparison Report".to_string(),
            AnalysisMode::CensusDay => format!("Census Day Analysis Report{suffix}"),
            AnalysisMode::CensusYoy => format!("Combined Analysis Report{suffix}"),
        }
    }
}

/// Where a file group is collected on the upload screen.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileArea {
    /// One flat drop area (default and YoY modes).
    Single,
    /// Files dated before census day.
    Before,
    /// Files dated after census day.
    After,
}

/// One group of files the upload screen must collect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct FileGroup {
    pub area: FileArea,
    pub count: usize,
    pub description: &'static str,
}

/// Per-mode upload requirement: total count plus the before/after split
/// for census-bearing modes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileRequirement {
    pub mode: AnalysisMode,
    pub description: &'static str,
    pub groups: &'static [FileGroup],
}

impl FileRequirement {
    /// Total number of files across all groups.
    pub fn total(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }

    /// Expected count for a given area, zero when the area is unused.
    pub fn count_for(&self, area: FileArea) -> usize {
        self.groups
            .iter()
            .find(|g| g.area == area)
            .map(|g| g.count)
            .unwrap_or(0)
    }
}

/// Outcome of checking a supplied file count against the mode requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FileCountCheck {
    pub is_valid: bool,
    pub required: usize,
    pub actual: usize,
}

/// Check that the supplied file count exactly matches the mode's total
/// requirement. Uploads with too few *or* too many files are rejected.
pub fn validate_file_count(mode: AnalysisMode, actual: usize) -> FileCountCheck {
    let required = mode.file_requirement().total();
    FileCountCheck {
        is_valid: actual == required,
        required,
        actual,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_mapping_is_total() {
        let cases = [
            (false, false, AnalysisMode::Default),
            (false, true, AnalysisMode::YoyComparison),
            (true, false, AnalysisMode::CensusDay),
            (true, true, AnalysisMode::CensusYoy),
        ];
        for (census, comparison, expected) in cases {
            let options = ReportOptions { census, comparison };
            assert_eq!(AnalysisMode::from_options(options), expected);
            // Stable: same input, same output.
            assert_eq!(AnalysisMode::from_options(options), expected);
        }
    }

    #[test]
    fn file_totals_match_mode() {
        assert_eq!(AnalysisMode::Default.file_requirement().total(), 1);
        assert_eq!(AnalysisMode::YoyComparison.file_requirement().total(), 2);
        assert_eq!(AnalysisMode::CensusDay.file_requirement().total(), 2);
        assert_eq!(AnalysisMode::CensusYoy.file_requirement().total(), 3);
    }

    #[test]
    fn census_yoy_splits_before_and_after() {
        let req = AnalysisMode::CensusYoy.file_requirement();
        assert_eq!(req.count_for(FileArea::Before), 2);
        assert_eq!(req.count_for(FileArea::After), 1);
        assert_eq!(req.count_for(FileArea::Single), 0);
    }

    #[test]
    fn exact_count_required() {
        let check = validate_file_count(AnalysisMode::YoyComparison, 2);
        assert!(check.is_valid);
        assert!(!validate_file_count(AnalysisMode::YoyComparison, 1).is_valid);
        assert!(!validate_file_count(AnalysisMode::YoyComparison, 3).is_valid);
    }

    #[test]
    fn wire_names_round_trip() {
        for mode in [
            AnalysisMode::Default,
            AnalysisMode::YoyComparison,
            AnalysisMode::CensusDay,
            AnalysisMode::CensusYoy,
        ] {
            let json = serde_json::to_string(&mode).unwrap();
            assert_eq!(json, format!("\"{}\"", mode.as_str()));
        }
    }

    #[test]
    fn census_titles_carry_term() {
        let term = Term::new("Term 1");
        assert_eq!(
            AnalysisMode::CensusDay.report_title(Some(&term)),
            "Census Day Analysis Report - Term 1"
        );
        assert_eq!(
            AnalysisMode::CensusYoy.report_title(None),
            "Combined Analysis Report"
        );
        assert_eq!(AnalysisMode::Default.report_title(Some(&term)), "WIL Report");
    }
}
