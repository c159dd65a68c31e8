use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::coalescer::{CoalescerConfig, MAX_INTERVAL};
use crate::error::{Result, SiteError};
use crate::panel::RowLabels;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub coalescer: CoalescerSettings,
    #[serde(default)]
    pub panel: PanelConfig,
}

impl Config {
    /// Resolve configuration: explicit file (or `SITESEARCH_CONFIG`), else the
    /// global file then the project file, then environment overrides.
    pub fn load(explicit_path: Option<&Path>, project_root: &Path) -> Result<Self> {
        let mut config = Self::default();

        let explicit = explicit_path
            .map(PathBuf::from)
            .or_else(|| std::env::var("SITESEARCH_CONFIG").ok().map(PathBuf::from));

        if let Some(path) = explicit {
            if let Some(patch) = Self::load_patch(&path)? {
                config.merge_patch(patch);
            }
        } else {
            if let Some(global) = Self::load_global()? {
                config.merge_patch(global);
            }
            if let Some(project) = Self::load_project(project_root)? {
                config.merge_patch(project);
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Path of the per-user config file, when a config directory exists.
    #[must_use]
    pub fn global_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sitesearch/config.toml"))
    }

    #[must_use]
    pub fn project_path(project_root: &Path) -> PathBuf {
        project_root.join(".sitesearch/config.toml")
    }

    fn load_global() -> Result<Option<ConfigPatch>> {
        match Self::global_path() {
            Some(path) => Self::load_patch(&path),
            None => Ok(None),
        }
    }

    fn load_project(project_root: &Path) -> Result<Option<ConfigPatch>> {
        Self::load_patch(&Self::project_path(project_root))
    }

    fn load_patch(path: &Path) -> Result<Option<ConfigPatch>> {
        if !path.exists() {
            return Ok(None);
        }

        let raw = std::fs::read_to_string(path)
            .map_err(|err| SiteError::Config(format!("read config {}: {err}", path.display())))?;
        let patch = toml::from_str(&raw)
            .map_err(|err| SiteError::Config(format!("parse config {}: {err}", path.display())))?;
        Ok(Some(patch))
    }

    fn merge_patch(&mut self, patch: ConfigPatch) {
        if let Some(patch) = patch.api {
            self.api.merge(patch);
        }
        if let Some(patch) = patch.coalescer {
            self.coalescer.merge(patch);
        }
        if let Some(patch) = patch.panel {
            self.panel.merge(patch);
        }
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Some(value) = env_string("SITESEARCH_API_ENDPOINT") {
            self.api.endpoint = value;
        }
        if let Some(value) = env_string("SITESEARCH_API_TOKEN") {
            self.api.auth_token = Some(value).filter(|token| !token.is_empty());
        }
        if let Some(value) = env_u64("SITESEARCH_API_TIMEOUT_SECS")? {
            self.api.timeout_secs = value;
        }

        if let Some(value) = env_u64("SITESEARCH_THROTTLE_MS")? {
            self.coalescer.throttle = Duration::from_millis(value);
        }
        if let Some(value) = env_u64("SITESEARCH_IDLE_CLEAR_MS")? {
            self.coalescer.idle_clear = Duration::from_millis(value);
        }
        if let Some(value) = env_bool("SITESEARCH_TRAILING") {
            self.coalescer.trailing = value;
        }
        if let Some(value) = env_u64("SITESEARCH_MAX_RECORDS")? {
            self.coalescer.max_records = usize::try_from(value).map_err(|_| {
                SiteError::Config(format!("invalid SITESEARCH_MAX_RECORDS value {value}"))
            })?;
        }

        if let Some(value) = env_string("SITESEARCH_SITE_URL") {
            self.panel.site_url = Some(value).filter(|url| !url.is_empty());
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.coalescer.max_records == 0 {
            return Err(SiteError::Config(
                "coalescer.max_records must be at least 1".to_string(),
            ));
        }
        if self.coalescer.throttle > MAX_INTERVAL {
            return Err(SiteError::Config(format!(
                "coalescer.throttle must be at most {}s",
                MAX_INTERVAL.as_secs()
            )));
        }
        if self.api.query_param.trim().is_empty() {
            return Err(SiteError::Config("api.query_param must not be empty".to_string()));
        }
        Ok(())
    }

    /// Coalescer tuning derived from the `[coalescer]` section.
    #[must_use]
    pub fn coalescer_config(&self) -> CoalescerConfig {
        CoalescerConfig {
            min_interval: self.coalescer.throttle,
            idle_clear: self.coalescer.idle_clear,
            trailing: self.coalescer.trailing,
            max_records: self.coalescer.max_records,
        }
    }

    #[must_use]
    pub fn row_labels(&self) -> RowLabels {
        RowLabels {
            note: self.panel.note_label.clone(),
            page: self.panel.page_label.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_query_param")]
    pub query_param: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_endpoint() -> String {
    "http://127.0.0.1:2333/search/algolia".to_string()
}

fn default_query_param() -> String {
    "keyword".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            query_param: default_query_param(),
            timeout_secs: default_timeout_secs(),
            auth_token: None,
        }
    }
}

impl ApiConfig {
    fn merge(&mut self, patch: ApiPatch) {
        if let Some(value) = patch.endpoint {
            self.endpoint = value;
        }
        if let Some(value) = patch.query_param {
            self.query_param = value;
        }
        if let Some(value) = patch.timeout_secs {
            self.timeout_secs = value;
        }
        if let Some(value) = patch.auth_token {
            self.auth_token = Some(value);
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoalescerSettings {
    #[serde(default = "default_throttle", with = "humantime_serde")]
    pub throttle: Duration,
    #[serde(default = "default_idle_clear", with = "humantime_serde")]
    pub idle_clear: Duration,
    #[serde(default = "default_trailing")]
    pub trailing: bool,
    #[serde(default = "default_max_records")]
    pub max_records: usize,
}

const fn default_throttle() -> Duration {
    Duration::from_millis(1000)
}

const fn default_idle_clear() -> Duration {
    Duration::from_millis(2000)
}

const fn default_trailing() -> bool {
    true
}

const fn default_max_records() -> usize {
    64
}

impl Default for CoalescerSettings {
    fn default() -> Self {
        Self {
            throttle: default_throttle(),
            idle_clear: default_idle_clear(),
            trailing: default_trailing(),
            max_records: default_max_records(),
        }
    }
}

impl CoalescerSettings {
    fn merge(&mut self, patch: CoalescerPatch) {
        if let Some(value) = patch.throttle {
            self.throttle = value;
        }
        if let Some(value) = patch.idle_clear {
            self.idle_clear = value;
        }
        if let Some(value) = patch.trailing {
            self.trailing = value;
        }
        if let Some(value) = patch.max_records {
            self.max_records = value;
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    #[serde(default)]
    pub site_url: Option<String>,
    #[serde(default = "default_note_label")]
    pub note_label: String,
    #[serde(default = "default_page_label")]
    pub page_label: String,
    #[serde(default = "default_empty_label")]
    pub empty_label: String,
}

fn default_note_label() -> String {
    "Journal".to_string()
}

fn default_page_label() -> String {
    "Page".to_string()
}

fn default_empty_label() -> String {
    "Nothing here".to_string()
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            site_url: None,
            note_label: default_note_label(),
            page_label: default_page_label(),
            empty_label: default_empty_label(),
        }
    }
}

impl PanelConfig {
    fn merge(&mut self, patch: PanelPatch) {
        if let Some(value) = patch.site_url {
            self.site_url = Some(value);
        }
        if let Some(value) = patch.note_label {
            self.note_label = value;
        }
        if let Some(value) = patch.page_label {
            self.page_label = value;
        }
        if let Some(value) = patch.empty_label {
            self.empty_label = value;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigPatch {
    pub api: Option<ApiPatch>,
    pub coalescer: Option<CoalescerPatch>,
    pub panel: Option<PanelPatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct ApiPatch {
    pub endpoint: Option<String>,
    pub query_param: Option<String>,
    pub timeout_secs: Option<u64>,
    pub auth_token: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct CoalescerPatch {
    #[serde(default, with = "humantime_serde")]
    pub throttle: Option<Duration>,
    #[serde(default, with = "humantime_serde")]
    pub idle_clear: Option<Duration>,
    pub trailing: Option<bool>,
    pub max_records: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct PanelPatch {
    pub site_url: Option<String>,
    pub note_label: Option<String>,
    pub page_label: Option<String>,
    pub empty_label: Option<String>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key).ok().map(|value| {
        matches!(
            value.to_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        )
    })
}

fn env_u64(key: &str) -> Result<Option<u64>> {
    match std::env::var(key) {
        Ok(value) => value.parse::<u64>().map(Some).map_err(|err| {
            SiteError::Config(format!("invalid {key} value {value}: {err}"))
        }),
        Err(_) => Ok(None),
    }
}
