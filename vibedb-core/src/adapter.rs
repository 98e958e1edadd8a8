//! Collaborator traits for everything outside the core
//!
//! The core never talks to the OS or the terminal directly. Process listing,
//! subprocess execution, output display, confirmation and file viewing all go
//! through these traits so the front end supplies real implementations and
//! tests supply fakes.

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;

pub use crate::model::LogStream;

/// One process as seen in the process table, with its argv
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessLine {
    pub pid: u32,
    pub args: Vec<String>,
}

impl ProcessLine {
    pub fn new<I, S>(pid: u32, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            pid,
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Space-joined argv, for display only
    pub fn command_line(&self) -> String {
        self.args.join(" ")
    }
}

/// A process owned by the current user: pid and bare command name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OwnedProcess {
    pub pid: u32,
    pub name: String,
}

/// Read and signal the OS process table
#[async_trait]
pub trait ProcessTable: Send + Sync {
    /// Every visible process with its full invocation command line
    async fn command_lines(&self) -> io::Result<Vec<ProcessLine>>;

    /// Processes owned by the current user
    async fn owned_processes(&self) -> io::Result<Vec<OwnedProcess>>;

    /// Send a termination signal to all of `pids`
    async fn terminate(&self, pids: &[u32]) -> io::Result<()>;

    /// Pid of this tool, never signalled
    fn own_pid(&self) -> u32 {
        std::process::id()
    }
}

/// A subprocess to run to completion
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
    pub cwd: Option<PathBuf>,
}

impl ProcessSpec {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.env.insert(key.into(), value.to_string());
        self
    }

    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }
}

impl fmt::Display for ProcessSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Receives subprocess output line by line, in arrival order per stream
pub trait OutputSink: Send + Sync {
    fn push(&self, stream: LogStream, line: &str);
}

/// Runs a subprocess, streaming its output, and reports the exit code.
///
/// `Ok(None)` means the process was terminated by a signal.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    async fn run(&self, spec: &ProcessSpec, sink: Arc<dyn OutputSink>) -> io::Result<Option<i32>>;
}

/// Asks the user to approve a destructive action
#[async_trait]
pub trait Confirm: Send + Sync {
    async fn confirm(&self, prompt: &str) -> bool;
}

/// What kind of file is being handed to the viewer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    Config,
    Log,
}

impl FileKind {
    pub fn label(&self) -> &'static str {
        match self {
            FileKind::Config => "config",
            FileKind::Log => "log",
        }
    }
}

/// Displays a located config or log file
#[async_trait]
pub trait Viewer: Send + Sync {
    async fn show(&self, kind: FileKind, path: &Path) -> io::Result<()>;
}

/// Sink that drops everything
pub struct NullSink;

impl OutputSink for NullSink {
    fn push(&self, _stream: LogStream, _line: &str) {}
}
