//! Instance registry: a stateless projection of disk + process table
//!
//! `instances()` recomputes the full list on every call. `refresh()` only tells
//! subscribers that what they last rendered is stale.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::broadcast;

use crate::adapter::ProcessTable;
use crate::model::{Instance, InstanceDir};
use crate::scan;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RegistryEvent {
    /// The next read should be treated as fresh
    Invalidated,
}

/// List instance directories directly under `root`.
///
/// A missing root is a normal, uninitialized state and yields nothing. Read
/// errors are logged and degrade to whatever could be listed.
pub fn list_instance_directories(root: &Path) -> Vec<InstanceDir> {
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(root = %root.display(), error = %e, "failed to list instance root");
            return Vec::new();
        }
    };

    let mut dirs = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(root = %root.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };

        // Follows symlinks, so a link to a file is excluded
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            tracing::debug!(path = %path.display(), "skipping non UTF-8 directory name");
            continue;
        };

        dirs.push(InstanceDir {
            path: root.join(&name),
            name,
        });
    }
    dirs
}

pub struct Registry {
    root: PathBuf,
    daemon_name: String,
    table: Arc<dyn ProcessTable>,
    events: broadcast::Sender<RegistryEvent>,
}

impl Registry {
    pub fn new(root: impl Into<PathBuf>, daemon_name: impl Into<String>, table: Arc<dyn ProcessTable>) -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            root: root.into(),
            daemon_name: daemon_name.into(),
            table,
            events,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn daemon_name(&self) -> &str {
        &self.daemon_name
    }

    pub fn process_table(&self) -> &dyn ProcessTable {
        self.table.as_ref()
    }

    /// Current instances with their running flags. Never fails.
    pub async fn instances(&self) -> Vec<Instance> {
        let dirs = list_instance_directories(&self.root);
        if dirs.is_empty() {
            return Vec::new();
        }

        let running = scan::running_instance_names(self.table.as_ref(), &self.root, &self.daemon_name).await;
        dirs.into_iter()
            .map(|dir| {
                let is_running = running.contains(&dir.name);
                dir.into_instance(is_running)
            })
            .collect()
    }

    /// Look up a single instance by name
    pub async fn get(&self, name: &str) -> Option<Instance> {
        self.instances().await.into_iter().find(|i| i.name == name)
    }

    pub async fn is_running(&self, name: &str) -> bool {
        scan::running_instance_names(self.table.as_ref(), &self.root, &self.daemon_name)
            .await
            .contains(name)
    }

    /// Mark the current listing stale. A no-op when nobody is subscribed.
    pub fn refresh(&self) {
        if self.events.send(RegistryEvent::Invalidated).is_err() {
            tracing::trace!("registry refreshed with no subscribers");
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RegistryEvent> {
        self.events.subscribe()
    }
}
