//! Report section catalog and selection state.
//!
//! Sections are the user-selectable units of the compiled report. The
//! catalog is gated by the active [`AnalysisMode`]; the selection map is
//! always keyed by exactly the current catalog.

use serde::Serialize;

use super::mode::AnalysisMode;

/// A selectable report section. One section can expand into several
/// rendered surfaces at capture time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportSection {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub color: &'static str,
}

/// Sections available in every mode.
pub const BASE_SECTIONS: &[ReportSection] = &[
    ReportSection {
        id: "gender_participation",
        title: "Gender Participation",
        description: "Gender participation analysis including faculty breakdown and overview",
        color: "#6A1B9A",
    },
    ReportSection {
        id: "wil_participation",
        title: "WIL Participation",
        description: "WIL participation analysis including first generation, SES, indigenous students, and regional remote",
        color: "#8E24AA",
    },
    ReportSection {
        id: "cdev_enrolments",
        title: "CDEV Enrolments",
        description: "CDEV course enrollments analysis including residency status and gender proportion",
        color: "#8E24AA",
    },
];

/// Sections added for year-over-year bearing modes.
pub const YOY_SECTIONS: &[ReportSection] = &[ReportSection {
    id: "yoy_comparison",
    title: "YoY Comparison",
    description: "Year-over-year comparison analysis including faculty breakdown and residency status",
    color: "#FF6B6B",
}];

/// Sections added for census-bearing modes.
pub const CENSUS_SECTIONS: &[ReportSection] = &[ReportSection {
    id: "chart_census1",
    title: "Census Day Drop",
    description: "Compare male and female enrollment drops after census day by faculty",
    color: "#45B7D1",
}];

/// The ordered catalog of sections available in a mode: base sections
/// always, then YoY, then census as the mode requires.
pub fn catalog_for(mode: AnalysisMode) -> Vec<ReportSection> {
    let mut catalog: Vec<ReportSection> = BASE_SECTIONS.to_vec();
    match mode {
        AnalysisMode::Default => {}
        AnalysisMode::YoyComparison => catalog.extend_from_slice(YOY_SECTIONS),
        AnalysisMode::CensusDay => catalog.extend_from_slice(CENSUS_SECTIONS),
        AnalysisMode::CensusYoy => {
            catalog.extend_from_slice(YOY_SECTIONS);
            catalog.extend_from_slice(CENSUS_SECTIONS);
        }
    }
    catalog
}

/// Selection map over the current mode's catalog, in catalog order.
///
/// Switching modes rebuilds the map from scratch: stale keys are
/// discarded and every section starts unselected.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionSelection {
    mode: AnalysisMode,
    entries: Vec<(ReportSection, bool)>,
}

impl SectionSelection {
    /// All-unselected selection over the given mode's catalog.
    pub fn new(mode: AnalysisMode) -> Self {
        Self {
            mode,
            entries: catalog_for(mode).into_iter().map(|s| (s, false)).collect(),
        }
    }

    pub fn mode(&self) -> AnalysisMode {
        self.mode
    }

    /// Replace the whole selection with an all-false map over the new
    /// mode's catalog. Prior selections do not survive a mode switch.
    pub fn rebuild(&mut self, mode: AnalysisMode) {
        *self = Self::new(mode);
    }

    /// Toggle one section. Unknown ids are ignored and reported as false.
    pub fn toggle(&mut self, id: &str) -> bool {
        match self.entries.iter_mut().find(|(s, _)| s.id == id) {
            Some((_, selected)) => {
                *selected = !*selected;
                true
            }
            None => false,
        }
    }

    pub fn select_all(&mut self) {
        for (_, selected) in &mut self.entries {
            *selected = true;
        }
    }

    pub fn select_none(&mut self) {
        for (_, selected) in &mut self.entries {
            *selected = false;
        }
    }

    /// Gates report generation.
    pub fn has_any_selected(&self) -> bool {
        self.entries.iter().any(|(_, selected)| *selected)
    }

    /// Selected section ids in catalog order.
    pub fn selected_ids(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|(_, selected)| *selected)
            .map(|(s, _)| s.id)
            .collect()
    }

    /// The full key set, in catalog order.
    pub fn section_ids(&self) -> Vec<&'static str> {
        self.entries.iter().map(|(s, _)| s.id).collect()
    }

    pub fn sections(&self) -> impl Iterator<Item = &ReportSection> {
        self.entries.iter().map(|(s, _)| s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(mode: AnalysisMode) -> Vec<&'static str> {
        catalog_for(mode).iter().map(|s| s.id).collect()
    }

    #[test]
    fn base_sections_present_in_every_mode() {
        for mode in [
            AnalysisMode::Default,
            AnalysisMode::YoyComparison,
            AnalysisMode::CensusDay,
            AnalysisMode::CensusYoy,
        ] {
            let catalog = ids(mode);
            assert!(catalog.starts_with(&[
                "gender_participation",
                "wil_participation",
                "cdev_enrolments"
            ]));
        }
    }

    #[test]
    fn mode_specific_sections() {
        assert_eq!(ids(AnalysisMode::Default).len(), 3);
        assert!(ids(AnalysisMode::YoyComparison).contains(&"yoy_comparison"));
        assert!(!ids(AnalysisMode::YoyComparison).contains(&"chart_census1"));
        assert!(ids(AnalysisMode::CensusDay).contains(&"chart_census1"));
        assert!(!ids(AnalysisMode::CensusDay).contains(&"yoy_comparison"));
        let combined = ids(AnalysisMode::CensusYoy);
        assert!(combined.contains(&"yoy_comparison"));
        assert!(combined.contains(&"chart_census1"));
        assert_eq!(combined.len(), 5);
    }

    #[test]
    fn rebuild_discards_stale_selection() {
        let mut selection = SectionSelection::new(AnalysisMode::CensusYoy);
        selection.select_all();
        assert!(selection.has_any_selected());

        selection.rebuild(AnalysisMode::Default);
        assert_eq!(selection.section_ids(), ids(AnalysisMode::Default));
        assert!(!selection.has_any_selected());
    }

    #[test]
    fn key_set_tracks_catalog_after_any_switch() {
        let mut selection = SectionSelection::new(AnalysisMode::Default);
        for mode in [
            AnalysisMode::YoyComparison,
            AnalysisMode::CensusYoy,
            AnalysisMode::CensusDay,
            AnalysisMode::Default,
        ] {
            selection.rebuild(mode);
            assert_eq!(selection.section_ids(), ids(mode));
        }
    }

    #[test]
    fn toggle_and_order() {
        let mut selection = SectionSelection::new(AnalysisMode::CensusYoy);
        assert!(selection.toggle("chart_census1"));
        assert!(selection.toggle("gender_participation"));
        assert!(!selection.toggle("nonexistent"));
        // Catalog order, not toggle order.
        assert_eq!(
            selection.selected_ids(),
            vec!["gender_participation", "chart_census1"]
        );

        selection.select_none();
        assert!(!selection.has_any_selected());
    }
}
