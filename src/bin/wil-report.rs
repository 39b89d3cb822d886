//! WIL report pipeline binary.
//!
//! One-shot run: resolve the analysis mode from the report options,
//! fetch and reshape every dataset family the mode needs, capture the
//! selected chart surfaces, compile the PDF, and save or email it.
//!
//! # Usage
//!
//! ```bash
//! # Standard report saved to ./reports
//! cargo run --bin wil-report
//!
//! # Census + YoY report for Term 1, emailed
//! cargo run --bin wil-report -- --census --comparison \
//!   --term "Term 1" --email coordinator@example.edu
//!
//! # Only the gender sections, against the sample backend
//! cargo run --bin wil-report -- --local --sections gender_participation
//! ```
//!
//! # Environment Variables
//!
//! - `WIL_BACKEND_URL`: Analytics backend base URL (default: http://localhost:8088)
//! - `WIL_OUTPUT_DIR`: Directory for saved reports (default: ./reports)
//! - `RUST_LOG`: Log filter (default: info)

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::bail;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use wil_report::api::Term;
use wil_report::backend::{AnalyticsBackend, HttpAnalyticsClient};
use wil_report::config::Config;
use wil_report::models::section::catalog_for;
use wil_report::models::ReportOptions;
use wil_report::render::surfaces::standard_registry;
use wil_report::services::{
    CaptureOrchestrator, DataAggregator, DeliveryDispatcher, DeliveryOutcome, DeliveryRequest,
    ReportGenerator,
};
use wil_report::state::StateStore;

#[derive(Parser, Debug)]
#[command(name = "wil-report", about = "Compile a WIL enrolment report")]
struct Args {
    /// Include census-day drop analysis
    #[arg(long)]
    census: bool,

    /// Include year-over-year comparison
    #[arg(long)]
    comparison: bool,

    /// Academic term, required for census analysis (e.g. "Term 1")
    #[arg(long)]
    term: Option<String>,

    /// Email the report to this address instead of saving it
    #[arg(long)]
    email: Option<String>,

    /// Section ids to include (default: every section of the mode)
    #[arg(long, value_delimiter = ',')]
    sections: Vec<String>,

    /// Analytics backend base URL (overrides WIL_BACKEND_URL)
    #[arg(long)]
    backend_url: Option<String>,

    /// Directory for saved reports (overrides WIL_OUTPUT_DIR)
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Use the in-memory sample backend instead of HTTP
    #[cfg(feature = "local-backend")]
    #[arg(long)]
    local: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(url) = &args.backend_url {
        config.backend_url = url.clone();
    }
    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }

    let backend: Arc<dyn AnalyticsBackend> = make_backend(&args, &config);

    let state = Arc::new(StateStore::new());
    state.set_options(ReportOptions {
        census: args.census,
        comparison: args.comparison,
    });
    state.set_term(args.term.clone().map(Term::new));
    let snapshot = state.snapshot();
    info!(mode = snapshot.mode.as_str(), "analysis mode resolved");

    if snapshot.mode.is_census_bearing() && snapshot.term.is_none() {
        bail!("--term is required when --census is set");
    }

    // Fetch every dataset family the mode needs before capturing.
    let aggregator = DataAggregator::new(Arc::clone(&backend));
    aggregator.refresh_all(&snapshot).await;

    let section_ids = resolve_sections(&args, snapshot.mode)?;

    let orchestrator = CaptureOrchestrator::new(
        Arc::new(standard_registry()),
        aggregator.charts(),
        aggregator.loading(),
    );
    let dispatcher = DeliveryDispatcher::new(backend, config.output_dir);
    let generator = ReportGenerator::new(Arc::clone(&state), orchestrator, dispatcher);

    let delivery = match args.email {
        Some(email) => DeliveryRequest::Email(email),
        None => DeliveryRequest::Download,
    };
    let report = generator.generate(&section_ids, delivery).await?;

    match report.outcome {
        DeliveryOutcome::Saved(path) => {
            info!(path = %path.display(), pages = report.page_count, "report saved");
        }
        DeliveryOutcome::Emailed(email) => {
            info!(%email, pages = report.page_count, "report emailed");
        }
        DeliveryOutcome::Failed { reason, pdf } => {
            bail!(
                "delivery failed ({reason}); compiled document of {} bytes was not sent",
                pdf.len()
            );
        }
    }
    Ok(())
}

fn make_backend(args: &Args, config: &Config) -> Arc<dyn AnalyticsBackend> {
    #[cfg(feature = "local-backend")]
    if args.local {
        return Arc::new(wil_report::backend::LocalAnalyticsBackend::with_sample_data());
    }
    Arc::new(HttpAnalyticsClient::new(&config.backend_url))
}

/// Sections to compile: the full mode catalog by default, otherwise the
/// requested ids checked against it.
fn resolve_sections(args: &Args, mode: wil_report::models::AnalysisMode) -> anyhow::Result<Vec<String>> {
    let catalog = catalog_for(mode);
    if args.sections.is_empty() {
        return Ok(catalog.iter().map(|s| s.id.to_string()).collect());
    }
    for id in &args.sections {
        if !catalog.iter().any(|s| s.id == id) {
            bail!(
                "section '{id}' is not available in {} mode (available: {})",
                mode.as_str(),
                catalog.iter().map(|s| s.id).collect::<Vec<_>>().join(", ")
            );
        }
    }
    Ok(args.sections.clone())
}
