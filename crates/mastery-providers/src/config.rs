//! Configuration loading and provider factory.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use mastery_core::classify::{CompositeRule, TagMap};
use mastery_core::engine::DEFAULT_BUCKET_WIDTH_DAYS;
use mastery_core::sync::SyncConfig;
use mastery_core::traits::{GraphProvider, HistoryProvider};

use crate::codeforces::{CodeforcesProvider, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use crate::graph::{BuiltinGraphProvider, FileGraphProvider};

/// Where submission history comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HistoryConfig {
    Codeforces {
        #[serde(default = "default_codeforces_url")]
        base_url: String,
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

impl Default for HistoryConfig {
    fn default() -> Self {
        HistoryConfig::Codeforces {
            base_url: default_codeforces_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_codeforces_url() -> String {
    DEFAULT_BASE_URL.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Top-level mastery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MasteryConfig {
    /// Width of a scoring bucket in days.
    #[serde(default = "default_bucket_width")]
    pub bucket_width_days: u32,
    /// Max concurrent syncs when several handles are given.
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
    /// Directory the JSON store writes learner records to.
    #[serde(default = "default_store_dir")]
    pub store_dir: PathBuf,
    /// Curriculum TOML file. The built-in roadmap is used when absent.
    #[serde(default)]
    pub curriculum: Option<PathBuf>,
    #[serde(default)]
    pub history: HistoryConfig,
    /// Extra or replacement judge tag → topic mappings.
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    /// Extra composite-topic rules.
    #[serde(default)]
    pub composites: Vec<CompositeRule>,
}

fn default_bucket_width() -> u32 {
    DEFAULT_BUCKET_WIDTH_DAYS
}
fn default_parallelism() -> usize {
    4
}
fn default_store_dir() -> PathBuf {
    PathBuf::from("./mastery-data")
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            bucket_width_days: default_bucket_width(),
            parallelism: default_parallelism(),
            store_dir: default_store_dir(),
            curriculum: None,
            history: HistoryConfig::default(),
            tags: BTreeMap::new(),
            composites: Vec::new(),
        }
    }
}

impl MasteryConfig {
    /// The default tag table with this config's overrides and composites applied.
    pub fn tag_map(&self) -> TagMap {
        self.composites.iter().cloned().fold(
            TagMap::default().with_overrides(self.tags.clone()),
            TagMap::with_composite,
        )
    }

    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            bucket_width_days: self.bucket_width_days,
            parallelism: self.parallelism,
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

fn resolve_path(path: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&path.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `mastery.toml` in the current directory
/// 2. `~/.config/mastery/config.toml`
///
/// Environment variable overrides: `MASTERY_CODEFORCES_URL`, `MASTERY_STORE_DIR`.
pub fn load_config() -> Result<MasteryConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
///
/// Relative `store_dir` and `curriculum` paths are taken relative to the
/// directory of the config file they came from.
pub fn load_config_from(path: Option<&Path>) -> Result<MasteryConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("mastery.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match &config_path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            let mut config = toml::from_str::<MasteryConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?;
            if let Some(dir) = path.parent() {
                anchor_paths(&mut config, dir);
            }
            config
        }
        None => MasteryConfig::default(),
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());

    config.store_dir = resolve_path(&config.store_dir);
    config.curriculum = config.curriculum.as_deref().map(resolve_path);
    let HistoryConfig::Codeforces { base_url, .. } = &mut config.history;
    *base_url = resolve_env_vars(base_url);

    tracing::debug!(
        source = ?config_path,
        store_dir = %config.store_dir.display(),
        "loaded configuration"
    );
    Ok(config)
}

fn anchor_paths(config: &mut MasteryConfig, dir: &Path) {
    if config.store_dir.is_relative() {
        config.store_dir = dir.join(&config.store_dir);
    }
    if let Some(curriculum) = &config.curriculum {
        if curriculum.is_relative() {
            config.curriculum = Some(dir.join(curriculum));
        }
    }
}

fn apply_env_overrides(config: &mut MasteryConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(url) = lookup("MASTERY_CODEFORCES_URL") {
        let HistoryConfig::Codeforces { base_url, .. } = &mut config.history;
        *base_url = url;
    }
    if let Some(dir) = lookup("MASTERY_STORE_DIR") {
        config.store_dir = PathBuf::from(dir);
    }
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("mastery"))
}

/// Create a history provider from its configuration.
pub fn create_history_provider(config: &HistoryConfig) -> Result<Box<dyn HistoryProvider>> {
    match config {
        HistoryConfig::Codeforces {
            base_url,
            timeout_secs,
        } => Ok(Box::new(CodeforcesProvider::new(
            Some(base_url.clone()),
            *timeout_secs,
        )?)),
    }
}

/// The configured curriculum file, or the built-in roadmap.
pub fn create_graph_provider(config: &MasteryConfig) -> Box<dyn GraphProvider> {
    match &config.curriculum {
        Some(path) => Box::new(FileGraphProvider::new(path)),
        None => Box::new(BuiltinGraphProvider),
    }
}
