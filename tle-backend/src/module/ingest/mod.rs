//! Ingestion orchestrator and run report

mod manager;
mod report;

pub use manager::{IngestManager, regime_counts};
pub use report::{IngestReport, SourceOutcome, SourceStatus};
