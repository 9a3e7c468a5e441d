use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::{
    backend::ToastBackend,
    identity::configure_aumi,
    logging::LogConfig,
    manager::ToastManager,
    shortcut::ShortcutPolicy,
};

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "trace" => LogLevel::Trace,
            "debug" => LogLevel::Debug,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Notifier identity and runtime settings stored as JSON
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToastConfig {
    /// Display name, also the Start-Menu shortcut file name
    pub app_name: String,
    pub company: String,
    pub product: String,
    pub sub_product: String,
    pub version: String,
    pub shortcut_policy: ShortcutPolicy,
    /// Overrides the Start-Menu programs directory
    pub shortcut_dir: Option<PathBuf>,
    /// Whether to write logs to file
    pub log_to_file: bool,
    pub log_level: LogLevel,
    /// Maximum number of log files to keep
    pub log_max_files: usize,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            app_name: "WinToast".to_string(),
            company: "wintoast.".to_string(),
            product: "demo".to_string(),
            sub_product: String::new(),
            version: String::new(),
            shortcut_policy: ShortcutPolicy::default(),
            shortcut_dir: None,
            log_to_file: false,
            log_level: LogLevel::Info,
            log_max_files: 5,
        }
    }
}

impl ToastConfig {
    /// `<config dir>/wintoast/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get user config directory")?;
        Ok(config_dir.join("wintoast").join("config.json"))
    }

    /// Load configuration from path, returning defaults if the file doesn't exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(target: "toast::config", path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ToastConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        tracing::info!(target: "toast::config", path = %path.display(), "Loaded configuration");
        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!(target: "toast::config", path = %path.display(), "Saved configuration");
        Ok(())
    }

    pub fn aumi(&self) -> String {
        configure_aumi(&self.company, &self.product, &self.sub_product, &self.version)
    }

    /// Pushes identity, shortcut policy and shortcut directory into `manager`.
    pub fn apply<B: ToastBackend>(&self, manager: &mut ToastManager<B>) {
        manager.set_app_name(self.app_name.clone());
        manager.set_app_user_model_id(self.aumi());
        manager.set_shortcut_policy(self.shortcut_policy);
        manager.set_shortcut_dir(self.shortcut_dir.clone());
    }

    pub fn log_config(&self) -> LogConfig {
        LogConfig {
            max_files: self.log_max_files,
            level: self.log_level.as_str().to_string(),
            log_to_file: self.log_to_file,
            ..LogConfig::default()
        }
    }
}
