//! # WIL Report Pipeline
//!
//! Mode-driven compilation of work-integrated-learning enrolment
//! reports.
//!
//! The pipeline fetches aggregated enrolment datasets from an analytics
//! backend, reshapes them into chart-ready records, renders the charts
//! offscreen, and compiles the captures into a paginated A4 PDF that is
//! saved locally or emailed through the backend.
//!
//! ## Features
//!
//! - **Mode Resolution**: Two report options resolve to one of four
//!   analysis modes with per-mode file requirements
//! - **Data Aggregation**: Concurrent per-family fetches with local
//!   error recovery and percentage reshaping
//! - **Section Catalog**: Mode-gated report sections with explicit
//!   selection state
//! - **Surface Capture**: Concurrent offscreen chart rendering at a
//!   canonical export geometry
//! - **Document Compilation**: Deterministic A4 pagination and PDF
//!   serialization
//! - **Delivery**: Local download or backend email with document
//!   retention on failure
//!
//! ## Architecture
//!
//! - [`api`]: Identifier newtypes and re-exported domain records
//! - [`backend`]: The analytics backend trait, its HTTP client, and the
//!   in-memory test implementation
//! - [`models`]: Modes, sections, and chart-ready record types
//! - [`render`]: Offscreen chart surfaces and rasterization
//! - [`services`]: Aggregation, capture, compilation, upload, delivery
//! - [`state`]: The process-wide mode and term store

pub mod api;

pub mod backend;
pub mod config;
pub mod error;
pub mod models;

pub mod render;

pub mod services;

pub mod state;
