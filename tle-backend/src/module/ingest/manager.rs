//! Ingest manager - drives every configured source once
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use tle_common::{EarthModel, TleRecord};

use super::report::IngestReport;
use crate::config::IngestConfig;
use crate::module::celestrak::CelestrakClient;
use crate::module::local;
use crate::module::sink::{REPORT_FILE, TleSink};
use crate::module::spacetrack::{
    ArchiveRow, Credentials, NamedQuery, SpaceTrackClient, SpaceTrackError,
    tle_records_from_rows, with_session,
};
use crate::module::tle::{DerivedOrbit, analyze};

const SPACETRACK_SOURCE: &str = "spacetrack";
const SINK_RECORDS: &str = "sink:records";
const SINK_ORBITS: &str = "sink:orbits";

/// Runs the sources in order: CelesTrak groups, local files, Space-Track.
///
/// A source or output file that fails is recorded in the report and the run
/// moves on. Only an unusable output directory or report file aborts the run.
pub struct IngestManager {
    config: IngestConfig,
    earth: EarthModel,
    sink: TleSink,
}

impl IngestManager {
    pub fn new(config: IngestConfig) -> Self {
        let sink = TleSink::new(&config.output_dir, &config.basename);
        Self {
            config,
            earth: EarthModel::STANDARD,
            sink,
        }
    }

    pub fn sink(&self) -> &TleSink {
        &self.sink
    }

    /// Run with Space-Track credentials taken from the environment
    pub async fn run(&self) -> Result<IngestReport> {
        self.run_with_credentials(Credentials::from_env()).await
    }

    pub async fn run_with_credentials(
        &self,
        credentials: Result<Credentials, SpaceTrackError>,
    ) -> Result<IngestReport> {
        let mut report = IngestReport::new();
        tracing::info!("Starting ingest run {}", report.run_id);

        self.sink.ensure_output_dir().await?;

        let mut records = Vec::new();
        if self.config.celestrak.enabled {
            self.collect_celestrak(&mut report, &mut records).await;
        }
        if self.config.local.enabled {
            self.collect_local(&mut report, &mut records).await;
        }

        if records.is_empty() {
            tracing::info!("No TLE records from text sources, skipping record files");
        } else {
            let orbits = self.derive(&records);
            log_regime_counts(&orbits);
            if let Err(e) = self.sink.write_records(&records).await {
                report.failed(SINK_RECORDS, format!("{:#}", e));
            }
            if let Err(e) = self.sink.write_orbits(&orbits).await {
                report.failed(SINK_ORBITS, format!("{:#}", e));
            }
        }

        if self.config.spacetrack.enabled {
            self.collect_spacetrack(credentials, &mut report).await;
        }

        report.finish();
        report.log_summary();
        let path = self
            .sink
            .write_json(REPORT_FILE, &report)
            .await
            .context("Failed to write ingest report")?;
        tracing::info!("Report saved to {:?}", path);

        Ok(report)
    }

    pub fn derive(&self, records: &[TleRecord]) -> Vec<DerivedOrbit> {
        records.iter().map(|r| analyze(r, &self.earth)).collect()
    }

    async fn collect_celestrak(&self, report: &mut IngestReport, records: &mut Vec<TleRecord>) {
        let config = &self.config.celestrak;
        let client = match CelestrakClient::new(&config.base_url, config.timeout()) {
            Ok(client) => client,
            Err(e) => {
                report.failed("celestrak", format!("{:#}", e));
                return;
            }
        };

        for group in &config.groups {
            let source = format!("celestrak:{}", group);
            match client.fetch_group(group).await {
                Ok(group_records) => {
                    report.fetched(source, group_records.len());
                    records.extend(group_records);
                }
                Err(e) => report.failed(source, format!("{:#}", e)),
            }
        }
    }

    async fn collect_local(&self, report: &mut IngestReport, records: &mut Vec<TleRecord>) {
        let config = &self.config.local;
        let files = match local::list_tle_files(&config.input_dir, &config.extension).await {
            Ok(files) => files,
            Err(e) => {
                report.failed(
                    format!("local:{}", config.input_dir.display()),
                    format!("{:#}", e),
                );
                return;
            }
        };

        if files.is_empty() {
            report.skipped(
                format!("local:{}", config.input_dir.display()),
                format!("no .{} files", config.extension),
            );
            return;
        }

        for path in files {
            let source = format!("local:{}", local::group_for(&path));
            match local::read_tle_file(&path).await {
                Ok(file_records) => {
                    report.fetched(source, file_records.len());
                    records.extend(file_records);
                }
                Err(e) => report.failed(source, format!("{:#}", e)),
            }
        }
    }

    /// All queries share one login; the session is closed before any output is written
    async fn collect_spacetrack(
        &self,
        credentials: Result<Credentials, SpaceTrackError>,
        report: &mut IngestReport,
    ) {
        let config = &self.config.spacetrack;
        if config.queries.is_empty() {
            report.skipped(SPACETRACK_SOURCE, "no queries configured");
            return;
        }

        let credentials = match credentials {
            Ok(credentials) => credentials,
            Err(e) => {
                report.skipped(SPACETRACK_SOURCE, e);
                return;
            }
        };

        let client = match SpaceTrackClient::new(&config.base_url, config.timeout()) {
            Ok(client) => client,
            Err(e) => {
                report.failed(SPACETRACK_SOURCE, e);
                return;
            }
        };

        let queries = &config.queries;
        let session = with_session(&client, &credentials, |session| async move {
            let mut results = Vec::with_capacity(queries.len());
            for named in queries {
                tracing::info!("Running Space-Track query {} ({})", named.name, named.query.class());
                results.push((named, session.query(&named.query).await));
            }
            results
        })
        .await;

        let results = match session {
            Ok(results) => results,
            Err(e) => {
                report.failed(SPACETRACK_SOURCE, e);
                return;
            }
        };

        for (named, result) in results {
            let source = format!("{}:{}", SPACETRACK_SOURCE, named.name);
            match result {
                Ok(rows) => match self.save_archive_rows(named, &rows).await {
                    Ok(()) => report.fetched(source, rows.len()),
                    Err(e) => report.failed(source, format!("{:#}", e)),
                },
                Err(e) => report.failed(source, e),
            }
        }
    }

    /// Archive CSV, plus the derived orbit table for TLE-bearing classes
    async fn save_archive_rows(&self, named: &NamedQuery, rows: &[ArchiveRow]) -> Result<()> {
        self.sink.write_archive_rows(&named.name, rows).await?;

        if named.query.is_tle_class() {
            let records = tle_records_from_rows(&named.name, rows);
            if !records.is_empty() {
                let orbits = self.derive(&records);
                self.sink
                    .write_orbits_to(self.sink.archive_orbits_csv_path(&named.name), &orbits)
                    .await?;
            }
        }
        Ok(())
    }
}

/// Count of derived orbits per regime, `unknown` for unclassified records
pub fn regime_counts(orbits: &[DerivedOrbit]) -> BTreeMap<&'static str, usize> {
    let mut counts = BTreeMap::new();
    for orbit in orbits {
        let key = orbit.regime.map(|r| r.as_str()).unwrap_or("unknown");
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

fn log_regime_counts(orbits: &[DerivedOrbit]) {
    let counts = regime_counts(orbits);
    tracing::info!("Classified {} orbits: {:?}", orbits.len(), counts);
}
