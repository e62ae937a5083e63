//! Output files: combined CSV, per-group TLE text, derived orbit table,
//! archive query tables and the run report.
use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tle_common::TleRecord;
use tokio::fs;
use tracing::{debug, info};

use crate::module::spacetrack::ArchiveRow;
use crate::module::tle::DerivedOrbit;

pub const REPORT_FILE: &str = "ingest_report.json";

/// Writes every output of a run under one directory
pub struct TleSink {
    output_dir: PathBuf,
    basename: String,
}

impl TleSink {
    pub fn new<P: AsRef<Path>>(output_dir: P, basename: &str) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            basename: basename.to_string(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub async fn ensure_output_dir(&self) -> Result<()> {
        if !self.output_dir.exists() {
            fs::create_dir_all(&self.output_dir)
                .await
                .context("Failed to create output directory")?;
            info!("Created output directory: {:?}", self.output_dir);
        }
        Ok(())
    }

    pub fn combined_csv_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", self.basename))
    }

    pub fn group_tle_path(&self, group: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_{}.tle", self.basename, file_component(group)))
    }

    pub fn orbits_csv_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}_orbits.csv", self.basename))
    }

    pub fn archive_csv_path(&self, query_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("spacetrack_{}.csv", file_component(query_name)))
    }

    pub fn archive_orbits_csv_path(&self, query_name: &str) -> PathBuf {
        self.output_dir
            .join(format!("spacetrack_{}_orbits.csv", file_component(query_name)))
    }

    /// Combined `group,name,line1,line2` CSV plus one `.tle` file per group.
    /// Returns every path written.
    pub async fn write_records(&self, records: &[TleRecord]) -> Result<Vec<PathBuf>> {
        self.ensure_output_dir().await?;
        let mut written = Vec::new();

        let csv_path = self.combined_csv_path();
        write_file(&csv_path, serialize_csv(records)?).await?;
        info!("Saved {} rows to {:?}", records.len(), csv_path);
        written.push(csv_path);

        for (group, group_records) in group_records(records) {
            let path = self.group_tle_path(group);
            write_file(&path, format_tle_block(&group_records).into_bytes()).await?;
            debug!("Saved {} TLE sets to {:?}", group_records.len(), path);
            written.push(path);
        }

        Ok(written)
    }

    pub async fn write_orbits(&self, orbits: &[DerivedOrbit]) -> Result<PathBuf> {
        self.write_orbits_to(self.orbits_csv_path(), orbits).await
    }

    pub async fn write_orbits_to(&self, path: PathBuf, orbits: &[DerivedOrbit]) -> Result<PathBuf> {
        self.ensure_output_dir().await?;
        write_file(&path, serialize_csv(orbits)?).await?;
        info!("Saved {} derived orbits to {:?}", orbits.len(), path);
        Ok(path)
    }

    /// Archive rows pass straight through; columns are the union of keys
    pub async fn write_archive_rows(&self, query_name: &str, rows: &[ArchiveRow]) -> Result<PathBuf> {
        self.ensure_output_dir().await?;
        let path = self.archive_csv_path(query_name);
        write_file(&path, rows_to_csv(rows)?).await?;
        info!("Saved {} rows to {:?}", rows.len(), path);
        Ok(path)
    }

    pub async fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        self.ensure_output_dir().await?;
        let path = self.output_dir.join(file_name);
        let content = serde_json::to_string_pretty(value).context("Failed to serialize JSON")?;
        write_file(&path, content.into_bytes()).await?;
        Ok(path)
    }
}

async fn write_file(path: &Path, content: Vec<u8>) -> Result<()> {
    fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write {:?}", path))
}

/// Keep a group or query name usable as part of a file name
fn file_component(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\' | ':' | '\0') { '_' } else { c })
        .collect()
}

/// Records by group, groups in sorted order, record order preserved
pub fn group_records(records: &[TleRecord]) -> BTreeMap<&str, Vec<&TleRecord>> {
    let mut groups: BTreeMap<&str, Vec<&TleRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(record.source_group.as_str()).or_default().push(record);
    }
    groups
}

/// Repeated `name\nline1\nline2\n` blocks, readable by the triplet extractor
pub fn format_tle_block(records: &[&TleRecord]) -> String {
    let mut out = String::new();
    for record in records {
        out.push_str(&record.name);
        out.push('\n');
        out.push_str(&record.line1);
        out.push('\n');
        out.push_str(&record.line2);
        out.push('\n');
    }
    out
}

/// Header row from the field names of `T`, one row per item
pub fn serialize_csv<T: Serialize>(items: &[T]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for item in items {
        writer.serialize(item).context("Failed to serialize CSV row")?;
    }
    writer.into_inner().context("Failed to flush CSV writer")
}

/// CSV from heterogeneous JSON objects.
///
/// Columns appear in first-seen order; missing keys and nulls are empty
/// cells, strings are written raw, anything else as JSON text.
pub fn rows_to_csv(rows: &[ArchiveRow]) -> Result<Vec<u8>> {
    let mut columns: Vec<&str> = Vec::new();
    let mut seen = HashSet::new();
    for row in rows {
        for key in row.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key.as_str());
            }
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    if !columns.is_empty() {
        writer.write_record(&columns).context("Failed to write CSV header")?;
    }
    for row in rows {
        let cells = columns.iter().map(|column| match row.get(*column) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => other.to_string(),
        });
        writer.write_record(cells).context("Failed to write CSV row")?;
    }
    writer.into_inner().context("Failed to flush CSV writer")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::tle::{analyze, extract_from_text};
    use tempfile::TempDir;
    use tle_common::EarthModel;

    const L1: &str = "1 25544U 98067A   23245.54791667  .00016717  00000-0  10270-3 0  9993";
    const L2: &str = "2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.50377579413340";
    const OBJ_L1: &str = "1 57754U 23132A   23245.65206230 -.00000128  00000+0  00000+0 0  9999";
    const OBJ_L2: &str = "2 57754  19.2862  21.4741 5934257 346.7698 165.0186  4.18358561    14";

    fn sample_records() -> Vec<TleRecord> {
        vec![
            TleRecord::new("stations", "ISS (ZARYA)", L1, L2),
            TleRecord::new("debris", "2023-132A", OBJ_L1, OBJ_L2),
            TleRecord::new("stations", "ISS, \"copy\"", L1, L2),
        ]
    }

    #[tokio::test]
    async fn test_write_records_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let sink = TleSink::new(temp_dir.path().join("out"), "celestrak_debris");
        let records = sample_records();

        let written = sink.write_records(&records).await.unwrap();
        assert_eq!(written.len(), 3);

        let stations = std::fs::read_to_string(sink.group_tle_path("stations")).unwrap();
        let reparsed = extract_from_text(&stations, "stations");
        assert_eq!(reparsed, vec![records[0].clone(), records[2].clone()]);

        let debris = std::fs::read_to_string(sink.group_tle_path("debris")).unwrap();
        assert_eq!(extract_from_text(&debris, "debris"), vec![records[1].clone()]);
    }

    #[tokio::test]
    async fn test_combined_csv_reads_back() {
        let temp_dir = TempDir::new().unwrap();
        let sink = TleSink::new(temp_dir.path(), "all");
        let records = sample_records();
        sink.write_records(&records).await.unwrap();

        let mut reader = csv::Reader::from_path(sink.combined_csv_path()).unwrap();
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers, vec!["group", "name", "line1", "line2"]);

        let back: Vec<TleRecord> = reader.deserialize().map(|r| r.unwrap()).collect();
        assert_eq!(back, records);
    }

    #[tokio::test]
    async fn test_write_orbits_blank_cells_for_missing() {
        let temp_dir = TempDir::new().unwrap();
        let sink = TleSink::new(temp_dir.path(), "all");
        let earth = EarthModel::STANDARD;
        let orbits = vec![
            analyze(&TleRecord::new("g", "OBJ", OBJ_L1, OBJ_L2), &earth),
            analyze(&TleRecord::new("g", "BROKEN", "1 X", "2 short"), &earth),
        ];

        let path = sink.write_orbits(&orbits).await.unwrap();
        let content = std::fs::read_to_string(path).unwrap();
        let lines: Vec<&str> = content.lines().collect();

        assert!(lines[0].starts_with("group,name,norad_id,epoch,inclination_deg"));
        assert!(lines[0].ends_with(",regime"));
        assert!(lines[1].contains("57754"));
        assert!(lines[1].ends_with(",MEO"));
        assert_eq!(lines[2], "g,BROKEN,,,,,,,,,,");
    }

    #[test]
    fn test_rows_to_csv_union_of_columns() {
        let rows: Vec<ArchiveRow> = serde_json::from_str(
            r#"[{"OBJECT_NAME":"ISS","NORAD_CAT_ID":"25544","EPOCH":"2023-09-02"},
                {"NORAD_CAT_ID":"5","RCS":1.5,"DECAY":null}]"#,
        )
        .unwrap();
        let csv = String::from_utf8(rows_to_csv(&rows).unwrap()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(
            lines,
            vec![
                "OBJECT_NAME,NORAD_CAT_ID,EPOCH,RCS,DECAY",
                "ISS,25544,2023-09-02,,",
                ",5,,1.5,",
            ]
        );
        assert!(rows_to_csv(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_file_component() {
        assert_eq!(file_component("a/b\\c"), "a_b_c");
        assert_eq!(file_component("cosmos-2251-debris"), "cosmos-2251-debris");
    }
}
