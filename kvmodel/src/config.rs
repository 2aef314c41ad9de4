//! Binary configuration module.
//!
//! Loads the settings of the `kvmodel` command-line tool from environment
//! variables.
//!
//! # Environment Variables
//!
//! - `KVMODEL_DATA_FILE`: Log file backing the store (default: `./data/kvmodel.log`)
//! - `KVMODEL_NAMESPACE`: Key namespace of the message table (default: `messages`)
//! - `KVMODEL_DEBUG`: `true` to log every key at debug level (default: `false`)
//! - `KVMODEL_SYNC_WRITES`: `true` to sync the log after every write (default: `false`)
//!
//! # Invariants
//!
//! - `namespace` is never empty and never contains the key separator `:`

use std::path::PathBuf;

/// Command-line tool configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Append-only log the store is replayed from.
    pub data_file: PathBuf,
    /// Namespace of the message table's keys.
    pub namespace: String,
    /// Log keys at debug level.
    pub debug: bool,
    /// Sync the log to disk after every write.
    pub sync_writes: bool,
}

/// Error returned when loading configuration fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable has an invalid value.
    InvalidValue { name: String, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidValue { name, message } => write!(f, "invalid value for {name}: {message}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl Config {
    /// Default data file.
    pub const DEFAULT_DATA_FILE: &'static str = "./data/kvmodel.log";
    /// Default table namespace.
    pub const DEFAULT_NAMESPACE: &'static str = "messages";

    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `KVMODEL_NAMESPACE` is set but empty or contains `:`
    /// - `KVMODEL_DEBUG` or `KVMODEL_SYNC_WRITES` is set but not `true` or `false`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_file = lookup("KVMODEL_DATA_FILE")
            .map_or_else(|| PathBuf::from(Self::DEFAULT_DATA_FILE), PathBuf::from);
        let namespace = Self::load_namespace(lookup("KVMODEL_NAMESPACE"))?;
        let debug = Self::load_flag("KVMODEL_DEBUG", lookup("KVMODEL_DEBUG"))?;
        let sync_writes = Self::load_flag("KVMODEL_SYNC_WRITES", lookup("KVMODEL_SYNC_WRITES"))?;

        Ok(Self {
            data_file,
            namespace,
            debug,
            sync_writes,
        })
    }

    fn load_namespace(value: Option<String>) -> Result<String, ConfigError> {
        let Some(namespace) = value else {
            return Ok(Self::DEFAULT_NAMESPACE.to_string());
        };

        if namespace.is_empty() || namespace.contains(':') {
            return Err(ConfigError::InvalidValue {
                name: "KVMODEL_NAMESPACE".to_string(),
                message: format!("'{namespace}' must be non-empty and must not contain ':'"),
            });
        }

        Ok(namespace)
    }

    /// Parse a boolean flag. Unset means `false`.
    fn load_flag(name: &str, value: Option<String>) -> Result<bool, ConfigError> {
        match value {
            Some(value) => value.parse::<bool>().map_err(|_| ConfigError::InvalidValue {
                name: name.to_string(),
                message: format!("'{value}' is not 'true' or 'false'"),
            }),
            None => Ok(false),
        }
    }
}
