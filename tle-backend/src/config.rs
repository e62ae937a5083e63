use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::module::celestrak;
use crate::module::spacetrack::{self, NamedQuery};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    /// Log files older than this are deleted at start-up
    #[serde(default = "default_log_retention_days")]
    pub log_retention_days: u64,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Prefix of the combined CSV and per-group TLE files
    #[serde(default = "default_basename")]
    pub basename: String,

    #[serde(default)]
    pub celestrak: CelestrakConfig,

    #[serde(default)]
    pub local: LocalConfig,

    #[serde(default)]
    pub spacetrack: SpaceTrackConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CelestrakConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_celestrak_url")]
    pub base_url: String,

    #[serde(default = "default_groups")]
    pub groups: Vec<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    #[serde(default = "default_extension")]
    pub extension: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceTrackConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_spacetrack_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_queries")]
    pub queries: Vec<NamedQuery>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_retention_days() -> u64 {
    3
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("extracted_tles")
}

fn default_basename() -> String {
    "celestrak_debris".to_string()
}

fn default_true() -> bool {
    true
}

fn default_celestrak_url() -> String {
    celestrak::DEFAULT_BASE_URL.to_string()
}

fn default_groups() -> Vec<String> {
    celestrak::DEFAULT_DEBRIS_GROUPS
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("tle_input")
}

fn default_extension() -> String {
    "txt".to_string()
}

fn default_spacetrack_url() -> String {
    spacetrack::DEFAULT_BASE_URL.to_string()
}

fn default_queries() -> Vec<NamedQuery> {
    vec![NamedQuery {
        name: "cdm_public_30d".to_string(),
        query: spacetrack::ArchiveQuery::cdm_public("now-30 days"),
    }]
}

impl Default for CelestrakConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_celestrak_url(),
            groups: default_groups(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            input_dir: default_input_dir(),
            extension: default_extension(),
        }
    }
}

impl Default for SpaceTrackConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: default_spacetrack_url(),
            timeout_seconds: default_timeout_seconds(),
            queries: default_queries(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_dir: default_log_dir(),
            log_retention_days: default_log_retention_days(),
            output_dir: default_output_dir(),
            basename: default_basename(),
            celestrak: CelestrakConfig::default(),
            local: LocalConfig::default(),
            spacetrack: SpaceTrackConfig::default(),
        }
    }
}

impl CelestrakConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl SpaceTrackConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

impl IngestConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Invalid config file {:?}", path))
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: IngestConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read `path` if it exists, otherwise use defaults
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Query names become file names, so they must be safe and unique
    pub fn validate(&self) -> anyhow::Result<()> {
        let mut names = HashSet::new();
        for query in &self.spacetrack.queries {
            query.validate()?;
            if !names.insert(query.name.as_str()) {
                anyhow::bail!("duplicate Space-Track query name {:?}", query.name);
            }
        }
        if self.basename.trim().is_empty() {
            anyhow::bail!("basename must not be empty");
        }
        Ok(())
    }
}
