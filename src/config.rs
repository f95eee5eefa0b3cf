use crate::hunks::Action;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HunkrConfig {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub headers: HeadersConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// [output] section configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Pretty-print JSON output
    #[serde(default = "default_true")]
    pub pretty: bool,
}

/// [headers] section configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HeadersConfig {
    /// Action used when `--action` is not given
    #[serde(default)]
    pub action: Action,
    /// Sort emitted headers by file position
    #[serde(default)]
    pub sort: bool,
}

/// [log] section configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when neither HUNKR_LOG nor RUST_LOG is set
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "warn".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { pretty: true }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

const LOCAL_CONFIG: &str = ".hunkr.toml";

fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("hunkr").join("config.toml"))
}

fn read_table(path: &Path) -> Option<toml::Table> {
    let content = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<toml::Table>(&content) {
        Ok(table) => Some(table),
        Err(e) => {
            tracing::warn!(path = %path.display(), "ignoring unreadable config: {e}");
            None
        }
    }
}

/// Load config by merging global defaults with per-directory overrides.
/// Priority: `<dir>/.hunkr.toml` > global `~/.config/hunkr/config.toml` > built-in defaults.
pub fn load_config(dir: &Path) -> HunkrConfig {
    load_config_from(global_config_path().as_deref(), &dir.join(LOCAL_CONFIG))
}

/// Merging is deep: individual fields within sections (e.g. `[headers]`)
/// override independently.
pub fn load_config_from(global_path: Option<&Path>, local_path: &Path) -> HunkrConfig {
    let global_table = global_path.and_then(read_table);
    let local_table = read_table(local_path);

    let merged = match (global_table, local_table) {
        (Some(mut global), Some(local)) => {
            deep_merge(&mut global, local);
            global
        }
        (Some(global), None) => global,
        (None, Some(local)) => local,
        (None, None) => return HunkrConfig::default(),
    };

    toml::Value::Table(merged).try_into().unwrap_or_else(|e| {
        tracing::warn!("config has invalid values, using defaults: {e}");
        HunkrConfig::default()
    })
}

/// Recursively merge `overlay` into `base`. Overlay values win; nested tables are merged recursively.
fn deep_merge(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), &value) {
            (Some(toml::Value::Table(base_table)), toml::Value::Table(overlay_table)) => {
                deep_merge(base_table, overlay_table.clone());
            }
            _ => {
                base.insert(key, value);
            }
        }
    }
}

/// Save config to the global config dir (~/.config/hunkr/config.toml).
pub fn save_config(config: &HunkrConfig) -> Result<PathBuf> {
    let path = global_config_path().context("Could not determine config directory")?;
    save_config_to(config, &path)?;
    Ok(path)
}

pub fn save_config_to(config: &HunkrConfig, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
