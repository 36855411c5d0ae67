//! Configuration and store factory.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use intervue_core::engine::EngineConfig;
use intervue_core::session::DEFAULT_TIME_LIMIT_SECS;
use intervue_core::traits::InterviewStore;

use crate::file::FileStore;
use crate::memory::MemoryStore;

/// Which storage backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Memory,
    #[default]
    File,
}

impl std::str::FromStr for StoreKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(StoreKind::Memory),
            "file" => Ok(StoreKind::File),
            other => Err(format!("unknown store kind: {other}")),
        }
    }
}

/// Top-level intervue configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntervueConfig {
    /// Storage backend.
    #[serde(default)]
    pub store: StoreKind,
    /// Where the file store keeps its document. May contain `${VAR}` references.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Countdown per question, in seconds.
    #[serde(default = "default_time_limit")]
    pub time_limit_secs: u32,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./intervue-data")
}

fn default_time_limit() -> u32 {
    DEFAULT_TIME_LIMIT_SECS
}

impl Default for IntervueConfig {
    fn default() -> Self {
        Self {
            store: StoreKind::default(),
            data_dir: default_data_dir(),
            time_limit_secs: default_time_limit(),
        }
    }
}

impl IntervueConfig {
    /// Engine settings derived from this configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            time_limit_secs: self.time_limit_secs.max(1),
            tick: Duration::from_secs(1),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
pub fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

/// Apply `INTERVUE_*` overrides read through `lookup`.
fn apply_overrides(
    config: &mut IntervueConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(dir) = lookup("INTERVUE_DATA_DIR") {
        config.data_dir = PathBuf::from(dir);
    }
    if let Some(limit) = lookup("INTERVUE_TIME_LIMIT") {
        config.time_limit_secs = limit
            .trim()
            .parse()
            .with_context(|| format!("invalid INTERVUE_TIME_LIMIT: {limit}"))?;
    }
    if let Some(kind) = lookup("INTERVUE_STORE") {
        config.store = kind.parse().map_err(|e: String| anyhow::anyhow!(e))?;
    }
    Ok(())
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `intervue.toml` in the current directory
/// 2. `~/.config/intervue/config.toml`
///
/// Environment variable overrides: `INTERVUE_DATA_DIR`, `INTERVUE_TIME_LIMIT`,
/// `INTERVUE_STORE`.
pub fn load_config() -> Result<IntervueConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<IntervueConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("intervue.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => parse_config_file(&path)?,
        None => IntervueConfig::default(),
    };

    apply_overrides(&mut config, |name| std::env::var(name).ok())?;

    let data_dir = resolve_env_vars(&config.data_dir.to_string_lossy());
    config.data_dir = PathBuf::from(data_dir);

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<IntervueConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<IntervueConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("intervue"))
}

/// Create the configured store.
pub async fn create_store(config: &IntervueConfig) -> Result<Arc<dyn InterviewStore>> {
    match config.store {
        StoreKind::Memory => Ok(Arc::new(MemoryStore::new())),
        StoreKind::File => {
            let store = FileStore::open(&config.data_dir)
                .await
                .with_context(|| format!("failed to open store in {}", config.data_dir.display()))?;
            Ok(Arc::new(store))
        }
    }
}
