use std::io;

use async_trait::async_trait;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, Signal, System, UpdateKind};
use tokio::sync::RwLock;

use vibedb_core::adapter::{OwnedProcess, ProcessLine, ProcessTable};

/// Process table backed by a sysinfo snapshot, refreshed on every query
pub struct SysinfoProcessTable {
    sys: RwLock<System>,
}

impl SysinfoProcessTable {
    pub fn new() -> Self {
        Self {
            sys: RwLock::new(System::new()),
        }
    }

    async fn refresh(&self) -> tokio::sync::RwLockWriteGuard<'_, System> {
        let mut sys = self.sys.write().await;
        sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::new()
                .with_cmd(UpdateKind::Always)
                .with_user(UpdateKind::Always),
        );
        sys
    }
}

impl Default for SysinfoProcessTable {
    fn default() -> Self {
        Self::new()
    }
}

/// argv as reported by the OS, one element per argument
fn argv(process: &sysinfo::Process) -> Vec<String> {
    let cmd = process.cmd();
    if cmd.is_empty() {
        // Kernel threads and zombies have no argv
        return vec![process.name().to_string_lossy().into_owned()];
    }
    cmd.iter().map(|arg| arg.to_string_lossy().into_owned()).collect()
}

#[async_trait]
impl ProcessTable for SysinfoProcessTable {
    async fn command_lines(&self) -> io::Result<Vec<ProcessLine>> {
        let sys = self.refresh().await;
        Ok(sys
            .processes()
            .iter()
            .map(|(pid, process)| ProcessLine::new(pid.as_u32(), argv(process)))
            .collect())
    }

    async fn owned_processes(&self) -> io::Result<Vec<OwnedProcess>> {
        let sys = self.refresh().await;
        let me = sys
            .process(Pid::from_u32(self.own_pid()))
            .and_then(|p| p.user_id())
            .cloned()
            .ok_or_else(|| io::Error::other("cannot determine the current user"))?;

        Ok(sys
            .processes()
            .iter()
            .filter(|(_, process)| process.user_id() == Some(&me))
            .map(|(pid, process)| OwnedProcess {
                pid: pid.as_u32(),
                name: process.name().to_string_lossy().into_owned(),
            })
            .collect())
    }

    async fn terminate(&self, pids: &[u32]) -> io::Result<()> {
        let sys = self.refresh().await;
        let mut failed = Vec::new();

        for &pid in pids {
            let Some(process) = sys.process(Pid::from_u32(pid)) else {
                // Already gone
                tracing::debug!(pid, "process exited before it was signalled");
                continue;
            };
            match process.kill_with(Signal::Term) {
                Some(true) => tracing::debug!(pid, "sent SIGTERM"),
                Some(false) => failed.push(pid),
                // SIGTERM unsupported on this platform
                None => {
                    if !process.kill() {
                        failed.push(pid);
                    }
                }
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("failed to signal pid(s) {:?}", failed),
            ))
        }
    }
}
