//! Local TLE text files (e.g. ephemeris exports dropped into a directory)
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tle_common::TleRecord;
use tokio::fs;

use crate::module::tle::extract_from_text;

/// Files in `dir` with the given extension, sorted by name
pub async fn list_tle_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .await
        .with_context(|| format!("Failed to read input directory: {:?}", dir))?;

    let mut files = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let matches = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(extension));
        if matches && entry.file_type().await?.is_file() {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Group name for a file: its stem
pub fn group_for(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// Extract every triplet from one file, grouped under the file stem
pub async fn read_tle_file(path: &Path) -> Result<Vec<TleRecord>> {
    let bytes = fs::read(path)
        .await
        .with_context(|| format!("Failed to read TLE file: {:?}", path))?;
    let text = String::from_utf8_lossy(&bytes);

    let records = extract_from_text(&text, &group_for(path));
    tracing::info!("{:?}: {} TLE sets found", path, records.len());
    Ok(records)
}
