use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Ports;

pub const CONFIG_FILE_NAME: &str = "vibedb.yaml";
pub const CONFIG_ENV: &str = "VIBEDB_CONFIG";
pub const ROOT_ENV: &str = "VIBEDB_ROOT";

/// How the daemon and `local_ydb` binaries get built
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct BuildConfig {
    /// Build tool, relative paths resolve against `source_dir`
    #[serde(default = "default_build_program")]
    pub program: PathBuf,

    /// Fixed argument list: build profile flag followed by target paths
    #[serde(default = "default_build_args")]
    pub args: Vec<String>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            program: default_build_program(),
            args: default_build_args(),
        }
    }
}

fn default_build_program() -> PathBuf {
    PathBuf::from("ya")
}

fn default_build_args() -> Vec<String> {
    ["make", "-r", "ydb/apps/ydbd", "ydb/public/tools/local_ydb"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Root configuration file structure
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct VibedbConfig {
    /// Directory holding one subdirectory per instance
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// YDB source checkout the binaries are built from
    #[serde(default = "default_source_dir")]
    pub source_dir: PathBuf,

    /// Executable name of the database daemon
    #[serde(default = "default_daemon_name")]
    pub daemon_name: String,

    #[serde(default)]
    pub build: BuildConfig,

    /// Instance-management binary, relative to `source_dir` unless absolute
    #[serde(default = "default_local_ydb")]
    pub local_ydb: PathBuf,

    /// Daemon binary handed to `local_ydb`, relative to `source_dir` unless absolute
    #[serde(default = "default_ydbd")]
    pub ydbd: PathBuf,

    #[serde(default)]
    pub ports: Ports,

    /// File name searched for by `vibedb config`
    #[serde(default = "default_config_file_name")]
    pub config_file_name: String,

    /// File name prefix searched for by `vibedb logs`
    #[serde(default = "default_log_file_prefix")]
    pub log_file_prefix: String,

    /// Editor for config files (falls back to $VISUAL, $EDITOR, vi)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,

    /// Pager for log files (falls back to $PAGER, less)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pager: Option<String>,
}

fn default_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("local-ydb")
}
fn default_source_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_daemon_name() -> String {
    "ydbd".into()
}
fn default_local_ydb() -> PathBuf {
    PathBuf::from("ydb/public/tools/local_ydb/local_ydb")
}
fn default_ydbd() -> PathBuf {
    PathBuf::from("ydb/apps/ydbd/ydbd")
}
fn default_config_file_name() -> String {
    "config.yaml".into()
}
fn default_log_file_prefix() -> String {
    "logfile_".into()
}

impl Default for VibedbConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            source_dir: default_source_dir(),
            daemon_name: default_daemon_name(),
            build: BuildConfig::default(),
            local_ydb: default_local_ydb(),
            ydbd: default_ydbd(),
            ports: Ports::default(),
            config_file_name: default_config_file_name(),
            log_file_prefix: default_log_file_prefix(),
            editor: None,
            pager: None,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

impl VibedbConfig {
    /// Load configuration from a file.
    ///
    /// Relative `root` and `source_dir` values resolve against the file's directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        let content = std::fs::read_to_string(path).map_err(io_err)?;
        let mut config = Self::parse(&content)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        config.anchor(&std::path::absolute(dir).map_err(io_err)?);
        Ok(config)
    }

    /// Parse configuration from a YAML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut config: VibedbConfig = serde_yaml::from_str(content)?;
        config.root = expand_home(&config.root);
        config.source_dir = expand_home(&config.source_dir);
        config.validate()?;
        Ok(config)
    }

    /// Find and load the config file, falling back to defaults when none exists.
    ///
    /// Search order: `$VIBEDB_CONFIG`, `<start_dir>/vibedb.yaml`, then the
    /// user config directory. `$VIBEDB_ROOT` overrides `root` afterwards.
    pub fn discover(start_dir: &Path) -> Result<(Option<PathBuf>, Self), ConfigError> {
        Self::discover_with(start_dir, |key| std::env::var(key).ok())
    }

    /// `discover` with an explicit environment lookup
    pub fn discover_with<F>(start_dir: &Path, env: F) -> Result<(Option<PathBuf>, Self), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut candidates = Vec::new();
        if let Some(env_path) = env(CONFIG_ENV).filter(|p| !p.trim().is_empty()) {
            // An explicit path must exist
            let path = start_dir.join(env_path);
            if !path.exists() {
                return Err(ConfigError::Invalid(format!(
                    "{} points to missing file {}",
                    CONFIG_ENV,
                    path.display()
                )));
            }
            candidates.push(path);
        }
        candidates.push(start_dir.join(CONFIG_FILE_NAME));
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("vibedb").join(CONFIG_FILE_NAME));
        }

        let (path, mut config) = Self::discover_in(&candidates)?;
        if path.is_none() {
            config.anchor(start_dir);
        }
        config.apply_overrides_with(start_dir, env);
        Ok((path, config))
    }

    /// Apply `$VIBEDB_ROOT` on top of whatever was loaded
    pub fn apply_env_overrides(&mut self, base: &Path) {
        self.apply_overrides_with(base, |key| std::env::var(key).ok());
    }

    fn apply_overrides_with<F>(&mut self, base: &Path, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(root) = env(ROOT_ENV).filter(|root| !root.trim().is_empty()) {
            self.set_root(Path::new(&root), base);
        }
    }

    /// Override `root`, resolving a relative path against `base`
    pub fn set_root(&mut self, root: &Path, base: &Path) {
        self.root = absolutize(&expand_home(root), base);
    }

    /// Make `root` and `source_dir` absolute.
    ///
    /// `source_dir` doubles as the working directory of every subprocess, so a
    /// relative program path under it would otherwise resolve twice.
    pub fn anchor(&mut self, base: &Path) {
        self.root = absolutize(&self.root, base);
        self.source_dir = absolutize(&self.source_dir, base);
    }

    /// Load the first existing candidate, or defaults when none exist
    pub fn discover_in(candidates: &[PathBuf]) -> Result<(Option<PathBuf>, Self), ConfigError> {
        for path in candidates {
            if path.is_file() {
                tracing::debug!(path = %path.display(), "loading config");
                return Ok((Some(path.clone()), Self::load(path)?));
            }
        }
        tracing::debug!("no config file found, using defaults");
        Ok((None, Self::default()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.root.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("root must not be empty".into()));
        }
        if self.daemon_name.is_empty() || self.daemon_name.contains(['/', '\\']) {
            return Err(ConfigError::Invalid(format!(
                "daemon_name must be a bare executable name, got {:?}",
                self.daemon_name
            )));
        }
        if self.config_file_name.is_empty() || self.log_file_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "config_file_name and log_file_prefix must not be empty".into(),
            ));
        }

        let mut seen = BTreeSet::new();
        for (name, port) in self.ports.env() {
            if port == 0 {
                return Err(ConfigError::Invalid(format!("{} must not be 0", name)));
            }
            if !seen.insert(port) {
                return Err(ConfigError::Invalid(format!(
                    "port {} is assigned more than once",
                    port
                )));
            }
        }
        Ok(())
    }

    /// Resolve a configured path against the source checkout
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.source_dir.join(path)
        }
    }

    pub fn build_program(&self) -> PathBuf {
        self.resolve(&self.build.program)
    }

    pub fn local_ydb_path(&self) -> PathBuf {
        self.resolve(&self.local_ydb)
    }

    pub fn ydbd_path(&self) -> PathBuf {
        self.resolve(&self.ydbd)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        // Drops `.` components
        base.join(path).components().collect()
    }
}

/// Expand a leading `~/` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}
