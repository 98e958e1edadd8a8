use std::io;
use std::process::Stdio;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::task::JoinHandle;

use vibedb_core::adapter::{LogStream, OutputSink, ProcessRunner, ProcessSpec};

/// Runs subprocesses to completion, pushing each output line to the sink as it
/// arrives.
pub struct StreamingRunner;

impl StreamingRunner {
    pub fn new() -> Self {
        Self
    }

    fn spawn_reader<R>(reader: R, stream: LogStream, sink: Arc<dyn OutputSink>) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            let mut lines = BufReader::new(reader).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => sink.push(stream, &line),
                    Ok(None) => break,
                    Err(e) => {
                        tracing::debug!(?stream, error = %e, "output reader stopped");
                        break;
                    }
                }
            }
        })
    }
}

impl Default for StreamingRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ProcessRunner for StreamingRunner {
    async fn run(&self, spec: &ProcessSpec, sink: Arc<dyn OutputSink>) -> io::Result<Option<i32>> {
        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args);

        if let Some(cwd) = &spec.cwd {
            cmd.current_dir(cwd);
        }

        for (k, v) in &spec.env {
            cmd.env(k, v);
        }

        cmd.stdout(Stdio::piped());
        cmd.stderr(Stdio::piped());

        // Prevent child from inheriting stdin
        cmd.stdin(Stdio::null());

        let mut child = cmd.spawn()?;
        tracing::debug!(pid = ?child.id(), program = %spec.program.display(), "spawned");

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(Self::spawn_reader(stdout, LogStream::Stdout, sink.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(Self::spawn_reader(stderr, LogStream::Stderr, sink.clone()));
        }

        let status = child.wait().await?;

        // Drain whatever is still buffered before reporting the exit
        for reader in readers {
            if let Err(e) = reader.await {
                tracing::warn!(error = %e, "output reader task failed");
            }
        }

        Ok(status.code())
    }
}
