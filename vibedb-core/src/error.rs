//! Typed failures for lifecycle operations.
//!
//! Only operations that must report a failure use these. Listing and scanning
//! never fail outward; they log and return an empty result instead.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::model::InstanceName;

/// What a `NotFound` error could not find
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Missing {
    /// No YDB source checkout (build tool) where the config points
    Workspace { searched: PathBuf },
    Instance { name: InstanceName },
    ConfigFile { instance: InstanceName },
    LogFile { instance: InstanceName },
    /// Neither an explicit instance nor a usable selection
    Selection,
}

impl fmt::Display for Missing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workspace { searched } => {
                write!(f, "no YDB source checkout found at {}", searched.display())
            }
            Self::Instance { name } => write!(f, "instance '{}' does not exist", name),
            Self::ConfigFile { instance } => {
                write!(f, "no config file found for instance '{}'", instance)
            }
            Self::LogFile { instance } => write!(f, "no log file found for instance '{}'", instance),
            Self::Selection => write!(f, "no instance selected"),
        }
    }
}

#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("invalid instance name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("{0}")]
    NotFound(Missing),

    #[error("instance '{name}' already exists")]
    AlreadyExists { name: InstanceName },

    #[error("instance '{name}' is already running")]
    AlreadyRunning { name: InstanceName },

    #[error("instance '{name}' is running, stop it first")]
    Running { name: InstanceName },

    #[error("build failed ({})", describe_code(.code))]
    BuildFailed { code: Option<i32> },

    #[error("deploy failed ({})", describe_code(.code))]
    DeployFailed { code: Option<i32> },

    #[error("start failed ({})", describe_code(.code))]
    StartFailed { code: Option<i32> },

    #[error("cancelled")]
    Cancelled,

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn describe_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl OrchestrationError {
    /// Errors caused by user input or state rather than a broken environment.
    ///
    /// The front end renders these as warnings.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidName { .. }
                | Self::NotFound(_)
                | Self::AlreadyExists { .. }
                | Self::AlreadyRunning { .. }
                | Self::Running { .. }
                | Self::Cancelled
        )
    }
}

pub type Result<T> = std::result::Result<T, OrchestrationError>;
