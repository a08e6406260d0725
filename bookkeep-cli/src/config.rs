use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use bookkeep_ingest::OutputLayout;
use bookkeep_report::category_rules::DEFAULT_CATEGORIES;

pub const DEFAULT_CONFIG_FILE: &str = "bookkeep.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsSection,
    pub document_ai: DocumentAiConfig,
    pub server: ServerSection,
    pub categorizer: CategorizerSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSection {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
}

/// Connection settings for the document-AI REST client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentAiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub api_version: String,
    pub poll_interval_ms: u64,
    pub max_polls: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    pub bind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CategorizerSection {
    pub categories: Vec<String>,
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            input_dir: PathBuf::from("input"),
            output_dir: PathBuf::from("output"),
        }
    }
}

impl Default for DocumentAiConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            api_version: "2024-11-30".to_string(),
            poll_interval_ms: 1000,
            max_polls: 120,
        }
    }
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

impl Default for CategorizerSection {
    fn default() -> Self {
        Self {
            categories: DEFAULT_CATEGORIES.iter().map(|c| c.to_string()).collect(),
        }
    }
}

impl Config {
    pub fn layout(&self) -> OutputLayout {
        OutputLayout::new(&self.paths.output_dir)
    }
}

pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

/// Read the config file if present, then apply environment overrides
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    let p = config_path(explicit);
    let mut cfg = if p.exists() {
        let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
        toml::from_str(&s).with_context(|| format!("parse {}", p.display()))?
    } else {
        if explicit.is_some() {
            anyhow::bail!("config not found: {}", p.display());
        }
        Config::default()
    };
    apply_env_overrides(&mut cfg, |k| std::env::var(k).ok());
    Ok(cfg)
}

fn apply_env_overrides(cfg: &mut Config, var: impl Fn(&str) -> Option<String>) {
    if let Some(endpoint) = var("AZURE_DOC_ENDPOINT").filter(|v| !v.trim().is_empty()) {
        cfg.document_ai.endpoint = endpoint.trim().to_string();
    }
    if let Some(key) = var("AZURE_DOC_KEY").filter(|v| !v.trim().is_empty()) {
        cfg.document_ai.api_key = key.trim().to_string();
    }
}

pub fn save_config(path: &Path, cfg: &Config) -> Result<()> {
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>) -> Result<()> {
    let p = config_path(explicit);
    if p.exists() {
        println!("Config already exists: {}", p.display());
        return Ok(());
    }
    save_config(&p, &Config::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}
