use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What happened to one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SourceStatus {
    Fetched { records: usize },
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOutcome {
    /// e.g. `celestrak:iridium-33-debris`, `local:sats.txt`, `spacetrack:decay_5y`
    pub source: String,
    #[serde(flatten)]
    pub status: SourceStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub outcomes: Vec<SourceOutcome>,
}

impl IngestReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            started_at: Utc::now(),
            finished_at: None,
            outcomes: Vec::new(),
        }
    }

    pub fn record(&mut self, source: impl Into<String>, status: SourceStatus) {
        let source = source.into();
        match &status {
            SourceStatus::Fetched { records } => {
                tracing::info!("✓ {}: {} records", source, records)
            }
            SourceStatus::Skipped { reason } => tracing::warn!("- {} skipped: {}", source, reason),
            SourceStatus::Failed { reason } => tracing::error!("✗ {} failed: {}", source, reason),
        }
        self.outcomes.push(SourceOutcome { source, status });
    }

    pub fn fetched(&mut self, source: impl Into<String>, records: usize) {
        self.record(source, SourceStatus::Fetched { records });
    }

    pub fn skipped(&mut self, source: impl Into<String>, reason: impl ToString) {
        self.record(
            source,
            SourceStatus::Skipped {
                reason: reason.to_string(),
            },
        );
    }

    pub fn failed(&mut self, source: impl Into<String>, reason: impl ToString) {
        self.record(
            source,
            SourceStatus::Failed {
                reason: reason.to_string(),
            },
        );
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total_records(&self) -> usize {
        self.outcomes
            .iter()
            .map(|o| match o.status {
                SourceStatus::Fetched { records } => records,
                _ => 0,
            })
            .sum()
    }

    /// Sources that were skipped or failed
    pub fn problems(&self) -> impl Iterator<Item = &SourceOutcome> {
        self.outcomes
            .iter()
            .filter(|o| !matches!(o.status, SourceStatus::Fetched { .. }))
    }

    pub fn duration_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
    }

    pub fn log_summary(&self) {
        let problems = self.problems().count();
        tracing::info!(
            "Ingest run {} finished: {} sources, {} records, {} skipped/failed, {:.2}s",
            self.run_id,
            self.outcomes.len(),
            self.total_records(),
            problems,
            self.duration_seconds().unwrap_or_default()
        );
        for outcome in self.problems() {
            tracing::warn!("  {}: {:?}", outcome.source, outcome.status);
        }
    }
}

impl Default for IngestReport {
    fn default() -> Self {
        Self::new()
    }
}
