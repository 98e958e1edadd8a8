//! Terminal implementations of the core collaborator traits

use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;

use vibedb_core::adapter::{Confirm, FileKind, LogStream, OutputSink, Viewer};
use vibedb_core::model::validate_instance_name;

/// Streams subprocess output straight to the terminal
pub struct TerminalSink {
    color: bool,
}

impl TerminalSink {
    pub fn new() -> Self {
        Self {
            color: io::stderr().is_terminal(),
        }
    }
}

impl Default for TerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for TerminalSink {
    fn push(&self, stream: LogStream, line: &str) {
        match stream {
            LogStream::Stdout => {
                let mut out = io::stdout().lock();
                let _ = writeln!(out, "{}", line);
            }
            LogStream::Stderr => {
                let mut err = io::stderr().lock();
                let _ = writeln!(err, "{}", line);
            }
            LogStream::System => {
                let mut err = io::stderr().lock();
                if self.color {
                    let _ = writeln!(err, "\x1b[36m==>\x1b[0m \x1b[1m{}\x1b[0m", line);
                } else {
                    let _ = writeln!(err, "==> {}", line);
                }
            }
        }
    }
}

/// Interactive yes/no prompt, defaulting to "no"
pub struct PromptConfirm;

#[async_trait]
impl Confirm for PromptConfirm {
    async fn confirm(&self, prompt: &str) -> bool {
        let prompt = prompt.to_string();
        let answer = tokio::task::spawn_blocking(move || {
            dialoguer::Confirm::new()
                .with_prompt(prompt)
                .default(false)
                .interact()
        })
        .await;

        match answer {
            Ok(Ok(yes)) => yes,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "confirmation prompt failed, treating as no");
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "confirmation task failed, treating as no");
                false
            }
        }
    }
}

/// Confirms everything (`--yes`)
pub struct AssumeYes;

#[async_trait]
impl Confirm for AssumeYes {
    async fn confirm(&self, prompt: &str) -> bool {
        tracing::debug!(prompt, "auto-confirmed");
        true
    }
}

/// Opens config files in an editor and log files in a pager
pub struct EditorViewer {
    editor: Option<String>,
    pager: Option<String>,
    print_only: bool,
}

impl EditorViewer {
    pub fn new(editor: Option<String>, pager: Option<String>, print_only: bool) -> Self {
        Self {
            editor,
            pager,
            print_only,
        }
    }

    /// Program (plus leading args) used for `kind`
    pub fn program_for(&self, kind: FileKind) -> Vec<String> {
        let env = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        let chosen = match kind {
            FileKind::Config => self
                .editor
                .clone()
                .or_else(|| env("VISUAL"))
                .or_else(|| env("EDITOR"))
                .unwrap_or_else(|| "vi".into()),
            FileKind::Log => self
                .pager
                .clone()
                .or_else(|| env("PAGER"))
                .unwrap_or_else(|| "less".into()),
        };
        chosen.split_whitespace().map(str::to_string).collect()
    }
}

#[async_trait]
impl Viewer for EditorViewer {
    async fn show(&self, kind: FileKind, path: &Path) -> io::Result<()> {
        if self.print_only || !io::stdout().is_terminal() {
            println!("{}", path.display());
            return Ok(());
        }

        let argv = self.program_for(kind);
        let Some((program, args)) = argv.split_first() else {
            return Err(io::Error::other(format!("no {} viewer configured", kind.label())));
        };

        tracing::debug!(program, file = %path.display(), "opening {} file", kind.label());
        let status = Command::new(program)
            .args(args)
            .arg(path)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(io::Error::other(format!("{} exited with {}", program, status)))
        }
    }
}

/// Ask for an instance name, validating inline
pub async fn prompt_instance_name() -> anyhow::Result<String> {
    let name = tokio::task::spawn_blocking(|| {
        dialoguer::Input::<String>::new()
            .with_prompt("Instance name")
            .validate_with(|input: &String| -> Result<(), String> {
                validate_instance_name(input).map(|_| ())
            })
            .interact_text()
    })
    .await??;
    Ok(name)
}
