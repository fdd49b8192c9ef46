use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::document::{SelectorList, WatcherConfig};

/// Application configuration module
/// This module handles the engine configuration including loading,
/// validating and site-specific adjustments.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
pub struct Config {
    /// Engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Preference file; the platform config directory when absent
    #[serde(default)]
    pub preferences_path: Option<PathBuf>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Annotation engine configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EngineConfig {
    // @field: Selector for the ObservationTarget
    #[serde(default = "default_observation_selector")]
    pub observation_selector: String,

    // @field: Which mutations the watcher records
    #[serde(default)]
    pub watcher: WatcherConfig,

    // @field: Keep each converted fragment inside one extra sentinel element
    #[serde(default)]
    pub wrap_output: bool,

    // @field: Max queued mutation batches before coalescing
    #[serde(default = "default_batch_queue_capacity")]
    pub batch_queue_capacity: usize,

    // @field: Style sheets injected into the head at start
    #[serde(default)]
    pub extra_styles: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            observation_selector: default_observation_selector(),
            watcher: WatcherConfig::default(),
            wrap_output: false,
            batch_queue_capacity: default_batch_queue_capacity(),
            extra_styles: Vec::new(),
        }
    }
}

fn default_observation_selector() -> String {
    "body".to_string()
}

fn default_batch_queue_capacity() -> usize {
    64
}

/// Host-specific adjustments applied on top of the base configuration
struct SiteProfile {
    host: &'static str,
    styles: &'static [&'static str],
}

const SITE_PROFILES: &[SiteProfile] = &[SiteProfile {
    host: "www.youtube.com",
    styles: &["span.ytp-caption-segment { white-space: nowrap !important; }"],
}];

impl Config {
    /// Load a configuration file, falling back to defaults for missing fields
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let selector = self.engine.observation_selector.trim();
        if selector.is_empty() {
            return Err(anyhow!("Observation selector must not be empty"));
        }
        if SelectorList::parse(selector).is_none() {
            return Err(anyhow!("Unsupported observation selector: {}", selector));
        }
        if self.engine.batch_queue_capacity == 0 {
            return Err(anyhow!("Batch queue capacity must be at least 1"));
        }
        if !self.engine.watcher.observes_anything() {
            return Err(anyhow!("Watcher configuration observes no mutation kind"));
        }
        Ok(())
    }

    /// Copy of this configuration with the site profile for `url` applied
    pub fn for_url(&self, url: &str) -> Result<Self> {
        let parsed = Url::parse(url).with_context(|| format!("Invalid page URL: {}", url))?;
        let mut config = self.clone();
        if let Some(host) = parsed.host_str() {
            for profile in SITE_PROFILES.iter().filter(|p| p.host == host) {
                for style in profile.styles {
                    if !config.engine.extra_styles.iter().any(|s| s == style) {
                        config.engine.extra_styles.push(style.to_string());
                    }
                }
            }
        }
        Ok(config)
    }

    /// Preference file to use, if one can be determined
    pub fn resolved_preferences_path(&self) -> Option<PathBuf> {
        self.preferences_path
            .clone()
            .or_else(crate::preferences::JsonFilePreferenceStore::default_path)
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(anyhow!("Invalid log level: {}", s)),
        }
    }
}
