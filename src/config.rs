use colored::*;
use eyre::{Context, Result};
use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::dates;
use crate::error::{ZendeskError, ZendeskResult};
use crate::target::Target;
use crate::task::{AuthMethod, Credentials, PluginTask, RetryPolicy};

const REDACTED: &str = "********";

/// Connector configuration as written in zendesk.yaml
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub login_url: Option<String>,
    pub auth_method: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub token: Option<String>,
    pub access_token: Option<String>,
    pub target: Option<String>,
    /// ISO-8601 lower bound for incremental targets
    pub start_time: Option<String>,
    pub includes: Vec<String>,
    pub retry_limit: u32,
    pub retry_initial_wait_sec: u64,
    pub max_retry_wait_sec: u64,
    #[serde(alias = "connection_timeout")]
    pub connection_timeout_sec: u64,
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
            LogLevel::Off => "off",
        }
    }
}

/// Values given on the command line that win over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub target: Option<String>,
    pub start_time: Option<String>,
    pub includes: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        let retry = RetryPolicy::default();

        Self {
            login_url: None,
            auth_method: AuthMethod::default().as_str().to_string(),
            username: None,
            password: None,
            token: None,
            access_token: None,
            target: None,
            start_time: None,
            includes: Vec::new(),
            retry_limit: retry.retry_limit,
            retry_initial_wait_sec: retry.initial_wait_sec,
            max_retry_wait_sec: retry.max_wait_sec,
            connection_timeout_sec: 300,
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            let path = Self::expand_path(path);
            return Self::load_from_file(&path).context(format!("Failed to load config from {}", path.display()));
        }

        if let Ok(env_path) = std::env::var("ZENDESK_INPUT_CONFIG") {
            let path = PathBuf::from(env_path);
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn_fallback(&format!("Failed to load config from ZENDESK_INPUT_CONFIG: {}", e));
                    }
                }
            }
        }

        if let Ok(dir) = std::env::var("ZENDESK_INPUT_DIR") {
            let path = PathBuf::from(dir).join("zendesk.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn_fallback(&format!("Failed to load config from ZENDESK_INPUT_DIR: {}", e));
                    }
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let path = config_dir.join("zendesk-input").join("zendesk.yaml");
            if path.exists() {
                match Self::load_from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn_fallback(&format!("Failed to load config from {}: {}", path.display(), e));
                    }
                }
            }
        }

        // ./zendesk.yaml for development
        let local_config = PathBuf::from("zendesk.yaml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    warn_fallback(&format!("Failed to load local config: {}", e));
                }
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if overrides.target.is_some() {
            self.target = overrides.target;
        }
        if overrides.start_time.is_some() {
            self.start_time = overrides.start_time;
        }
        if !overrides.includes.is_empty() {
            self.includes = overrides.includes;
        }
        self
    }

    /// Expand `~` and env vars in a config file path
    pub fn expand_path(path: &Path) -> PathBuf {
        let path_str = path.to_string_lossy();
        let expanded = shellexpand::full(&path_str).unwrap_or_else(|_| path_str.clone());
        PathBuf::from(expanded.as_ref())
    }

    /// Validate into a task ready for requests
    pub fn to_task(&self) -> ZendeskResult<PluginTask> {
        let login_url = self
            .login_url
            .as_deref()
            .ok_or_else(|| ZendeskError::Config("login_url is required".to_string()))?;
        let target: Target = self
            .target
            .as_deref()
            .ok_or_else(|| ZendeskError::Config("target is required".to_string()))?
            .parse()?;
        let method: AuthMethod = self.auth_method.parse()?;

        let credentials = Credentials::resolve(
            method,
            expand(self.username.as_deref())?.as_deref(),
            expand(self.password.as_deref())?.as_deref(),
            expand(self.token.as_deref())?.as_deref(),
            expand(self.access_token.as_deref())?.as_deref(),
        )?;

        let retry = RetryPolicy {
            retry_limit: self.retry_limit,
            initial_wait_sec: self.retry_initial_wait_sec,
            max_wait_sec: self.max_retry_wait_sec,
        };

        let mut task = PluginTask::new(&expand_str(login_url)?, target, credentials)?
            .with_includes(self.includes.iter().cloned())
            .with_retry(retry)
            .with_connection_timeout(Duration::from_secs(self.connection_timeout_sec));

        if let Some(start_time) = self.start_time.as_deref() {
            task = task.with_start_time(dates::parse_iso(start_time)?);
        }

        Ok(task)
    }

    /// Copy with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mask = |v: &Option<String>| v.as_ref().map(|_| REDACTED.to_string());

        Self {
            password: mask(&self.password),
            token: mask(&self.token),
            access_token: mask(&self.access_token),
            ..self.clone()
        }
    }
}

/// Config loading runs before logging is set up, so fallback failures go to stderr
fn warn_fallback(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message);
}

/// Resolve a value written exactly as `${VAR}` from the environment.
/// Anything else, including values that merely contain `$`, is literal.
fn expand_str(value: &str) -> ZendeskResult<String> {
    if !regex_is_match!(r"^\$\{[A-Za-z_][A-Za-z0-9_]*\}$", value) {
        return Ok(value.to_string());
    }
    shellexpand::env(value)
        .map(|expanded| expanded.into_owned())
        .map_err(|e| ZendeskError::Config(format!("Failed to expand '{}': {}", value, e)))
}

fn expand(value: Option<&str>) -> ZendeskResult<Option<String>> {
    value.map(expand_str).transpose()
}
