//! Service layer for business logic and orchestration.
//!
//! Services sit between the analytics backend and the delivery targets:
//! the aggregator keeps chart datasets current, the capture and
//! document services turn them into a paginated report, and the upload
//! and delivery services talk back to the backend.

pub mod aggregate;

pub mod capture;

pub mod delivery;

pub mod document;

pub mod generate;

pub mod upload;

pub use aggregate::{ChartStore, DataAggregator, LoadingFlags};
pub use capture::{CaptureOrchestrator, CapturedSurface};
pub use delivery::DeliveryDispatcher;
pub use document::{compile_layout, render_pdf, report_filename, DocumentLayout};
pub use generate::{DeliveryOutcome, DeliveryRequest, GeneratedReport, ReportGenerator};
pub use upload::{UploadBatch, UploadGate};
