//! Domain model types: analysis modes, file requirements, report
//! sections, and chart-ready dataset records.

pub mod datasets;
pub mod mode;
pub mod section;

pub use datasets::{
    CdevGenderRecord, CdevResidencyRecord, CensusDropRecord, FirstGenShareRecord,
    GenderShareRecord, GenderTotalRecord, IndigenousShareRecord, RegionalRecord, SesShareRecord,
    YoyFacultyRecord, YoyResidencyRecord,
};
pub use mode::{
    validate_file_count, AnalysisMode, FileArea, FileCountCheck, FileGroup, FileRequirement,
    ReportOptions,
};
pub use section::{catalog_for, ReportSection, SectionSelection};
