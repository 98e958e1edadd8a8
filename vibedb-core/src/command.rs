//! Action dispatch
//!
//! Every user-facing command is an `Action`. The dispatcher resolves its
//! target from the explicit name or the current selection, runs it through
//! the lifecycle orchestrator, and returns a typed `Outcome` for the front end
//! to render.

use std::path::PathBuf;
use std::sync::Arc;

use crate::adapter::{Confirm, FileKind, OutputSink, Viewer};
use crate::error::{Missing, OrchestrationError, Result};
use crate::lifecycle::Lifecycle;
use crate::model::{Instance, InstanceName};
use crate::selector::{Selection, resolve_target};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Action {
    List,
    Refresh,
    Create { name: String },
    Start { target: Option<InstanceName> },
    Stop { target: Option<InstanceName> },
    Delete { target: Option<InstanceName> },
    EditConfig { target: Option<InstanceName> },
    OpenLogs { target: Option<InstanceName> },
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::List => "list",
            Action::Refresh => "refresh",
            Action::Create { .. } => "create",
            Action::Start { .. } => "start",
            Action::Stop { .. } => "stop",
            Action::Delete { .. } => "delete",
            Action::EditConfig { .. } => "config",
            Action::OpenLogs { .. } => "logs",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Listed(Vec<Instance>),
    Refreshed(Vec<Instance>),
    Created(Instance),
    Started(Instance),
    Stopped { instance: Instance, terminated: usize },
    Deleted(Instance),
    Shown { instance: Instance, kind: FileKind, path: PathBuf },
}

/// Front-end collaborators an action may need
#[derive(Clone)]
pub struct Host {
    pub sink: Arc<dyn OutputSink>,
    pub confirm: Arc<dyn Confirm>,
    pub viewer: Arc<dyn Viewer>,
}

pub struct Dispatcher {
    lifecycle: Arc<Lifecycle>,
    host: Host,
}

impl Dispatcher {
    pub fn new(lifecycle: Arc<Lifecycle>, host: Host) -> Self {
        Self { lifecycle, host }
    }

    pub async fn dispatch(&self, action: Action, selection: &Selection) -> Result<Outcome> {
        tracing::debug!(action = action.name(), "dispatching");
        let registry = self.lifecycle.registry();

        match action {
            Action::List => Ok(Outcome::Listed(registry.instances().await)),

            Action::Refresh => {
                registry.refresh();
                Ok(Outcome::Refreshed(registry.instances().await))
            }

            Action::Create { name } => {
                let instance = self
                    .lifecycle
                    .create_instance(&name, self.host.sink.clone())
                    .await?;
                Ok(Outcome::Created(instance))
            }

            Action::Start { target } => {
                let instance = self.target(target.as_deref(), selection).await?;
                self.lifecycle
                    .start_instance(&instance, self.host.sink.clone())
                    .await?;
                Ok(Outcome::Started(instance))
            }

            Action::Stop { target } => {
                let instance = self.target(target.as_deref(), selection).await?;
                let terminated = self.lifecycle.stop_instance(&instance).await?;
                Ok(Outcome::Stopped {
                    instance,
                    terminated,
                })
            }

            Action::Delete { target } => {
                let instance = self.target(target.as_deref(), selection).await?;
                self.lifecycle
                    .delete_instance(&instance, self.host.confirm.as_ref())
                    .await?;
                Ok(Outcome::Deleted(instance))
            }

            Action::EditConfig { target } => self.show(target.as_deref(), selection, FileKind::Config).await,

            Action::OpenLogs { target } => self.show(target.as_deref(), selection, FileKind::Log).await,
        }
    }

    /// A typed name must exist; only an absent name consults the selection
    async fn target(&self, explicit: Option<&str>, selection: &Selection) -> Result<Instance> {
        let instances = self.lifecycle.registry().instances().await;
        if let Some(name) = explicit {
            return instances
                .into_iter()
                .find(|i| i.name == name)
                .ok_or_else(|| {
                    OrchestrationError::NotFound(Missing::Instance {
                        name: name.to_string(),
                    })
                });
        }
        resolve_target(None, selection, &instances).ok_or(OrchestrationError::NotFound(Missing::Selection))
    }

    async fn show(&self, explicit: Option<&str>, selection: &Selection, kind: FileKind) -> Result<Outcome> {
        let instance = self.target(explicit, selection).await?;
        let path = self.lifecycle.locate(&instance, kind)?;
        self.host.viewer.show(kind, &path).await?;
        Ok(Outcome::Shown {
            instance,
            kind,
            path,
        })
    }
}
