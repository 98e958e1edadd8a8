//! Lifecycle orchestration: create, start, stop, delete and inspect instances
//!
//! Every step either completes or returns one typed `OrchestrationError`.
//! Nothing is retried and nothing is rolled back.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use walkdir::WalkDir;

use crate::adapter::{Confirm, FileKind, LogStream, OutputSink, ProcessRunner, ProcessSpec};
use crate::config::VibedbConfig;
use crate::error::{Missing, OrchestrationError, Result};
use crate::model::{Instance, validate_instance_name};
use crate::registry::Registry;
use crate::scan;

pub struct Lifecycle {
    config: Arc<VibedbConfig>,
    registry: Arc<Registry>,
    runner: Arc<dyn ProcessRunner>,
}

impl Lifecycle {
    pub fn new(config: Arc<VibedbConfig>, registry: Arc<Registry>, runner: Arc<dyn ProcessRunner>) -> Self {
        Self {
            config,
            registry,
            runner,
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn config(&self) -> &VibedbConfig {
        &self.config
    }

    /// Build the binaries and deploy a fresh instance named `name`.
    pub async fn create_instance(&self, name: &str, sink: Arc<dyn OutputSink>) -> Result<Instance> {
        let name = validate_instance_name(name).map_err(|reason| OrchestrationError::InvalidName {
            name: name.to_string(),
            reason,
        })?;

        let build_program = self.config.build_program();
        if !build_program.exists() {
            return Err(OrchestrationError::NotFound(Missing::Workspace {
                searched: build_program,
            }));
        }

        let root = self.registry.root();
        tokio::fs::create_dir_all(root).await?;

        let instance_dir = root.join(name);
        // create_dir is the serialization point for concurrent creates
        match tokio::fs::create_dir(&instance_dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(OrchestrationError::AlreadyExists {
                    name: name.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!(instance = name, path = %instance_dir.display(), "created instance directory");

        self.build(sink.clone()).await?;
        self.kill_stray_daemons(sink.as_ref()).await;
        self.deploy(&instance_dir, sink).await?;

        self.registry.refresh();
        let created = self.registry.get(name).await;
        Ok(created.unwrap_or_else(|| Instance::new(root, name, false)))
    }

    async fn build(&self, sink: Arc<dyn OutputSink>) -> Result<()> {
        let spec = ProcessSpec::new(self.config.build_program())
            .args(self.config.build.args.iter().cloned())
            .cwd(&self.config.source_dir);

        let code = self.run_step(&spec, sink).await?;
        if code != Some(0) {
            return Err(OrchestrationError::BuildFailed { code });
        }
        Ok(())
    }

    async fn deploy(&self, instance_dir: &Path, sink: Arc<dyn OutputSink>) -> Result<()> {
        let spec = self.local_ydb_spec("deploy", instance_dir);
        let code = self.run_step(&spec, sink).await?;
        if code != Some(0) {
            return Err(OrchestrationError::DeployFailed { code });
        }
        Ok(())
    }

    /// `local_ydb <subcommand>` with the working dir, binary path and fixed ports
    fn local_ydb_spec(&self, subcommand: &str, instance_dir: &Path) -> ProcessSpec {
        let mut spec = ProcessSpec::new(self.config.local_ydb_path())
            .arg(subcommand)
            .arg(format!("--ydb-working-dir={}", instance_dir.display()))
            .arg(format!("--ydb-binary-path={}", self.config.ydbd_path().display()))
            .arg("--fixed-ports")
            .cwd(&self.config.source_dir);
        for (key, port) in self.config.ports.env() {
            spec = spec.env(key, port);
        }
        spec
    }

    async fn run_step(&self, spec: &ProcessSpec, sink: Arc<dyn OutputSink>) -> Result<Option<i32>> {
        tracing::info!(command = %spec, "running");
        sink.push(LogStream::System, &format!("$ {}", spec));

        let code = self
            .runner
            .run(spec, sink.clone())
            .await
            .map_err(|source| OrchestrationError::Spawn {
                program: spec.program.display().to_string(),
                source,
            })?;

        tracing::debug!(command = %spec, ?code, "finished");
        Ok(code)
    }

    /// Best-effort: signal leftover daemons of the current user before deploying.
    async fn kill_stray_daemons(&self, sink: &dyn OutputSink) {
        let table = self.registry.process_table();
        let own_pid = table.own_pid();
        let daemon = self.registry.daemon_name();

        let pids: Vec<u32> = match table.owned_processes().await {
            Ok(procs) => procs
                .into_iter()
                .filter(|p| p.name == daemon && p.pid != own_pid)
                .map(|p| p.pid)
                .collect(),
            Err(e) => {
                tracing::warn!(error = %e, "failed to list processes, skipping stale daemon cleanup");
                return;
            }
        };
        if pids.is_empty() {
            return;
        }

        sink.push(
            LogStream::System,
            &format!("stopping {} stale {} process(es)", pids.len(), daemon),
        );
        if let Err(e) = table.terminate(&pids).await {
            tracing::warn!(error = %e, ?pids, "failed to stop stale daemons");
        }
    }

    /// Launch the daemon for an existing instance.
    pub async fn start_instance(&self, instance: &Instance, sink: Arc<dyn OutputSink>) -> Result<()> {
        self.ensure_exists(instance)?;
        if self.registry.is_running(&instance.name).await {
            return Err(OrchestrationError::AlreadyRunning {
                name: instance.name.clone(),
            });
        }

        let spec = self.local_ydb_spec("start", &instance.path);
        let code = self.run_step(&spec, sink).await?;
        self.registry.refresh();
        if code != Some(0) {
            return Err(OrchestrationError::StartFailed { code });
        }
        Ok(())
    }

    /// Terminate the daemons serving this instance only.
    ///
    /// Returns how many processes were signalled; zero means it was not running.
    pub async fn stop_instance(&self, instance: &Instance) -> Result<usize> {
        let table = self.registry.process_table();
        let lines = table.command_lines().await?;
        let own_pid = table.own_pid();

        let pids: Vec<u32> = scan::daemon_pids_for_instance(
            &lines,
            self.registry.root(),
            &instance.name,
            self.registry.daemon_name(),
        )
        .into_iter()
        .filter(|pid| *pid != own_pid)
        .collect();

        if pids.is_empty() {
            tracing::info!(instance = %instance.name, "not running");
            return Ok(0);
        }

        tracing::info!(instance = %instance.name, ?pids, "stopping");
        table.terminate(&pids).await?;
        self.registry.refresh();
        Ok(pids.len())
    }

    /// Remove the instance directory after confirmation.
    pub async fn delete_instance(&self, instance: &Instance, confirm: &dyn Confirm) -> Result<()> {
        self.ensure_exists(instance)?;
        if self.registry.is_running(&instance.name).await {
            return Err(OrchestrationError::Running {
                name: instance.name.clone(),
            });
        }

        let prompt = format!(
            "Delete instance '{}' and everything in {}?",
            instance.name,
            instance.path.display()
        );
        if !confirm.confirm(&prompt).await {
            return Err(OrchestrationError::Cancelled);
        }

        match tokio::fs::remove_dir_all(&instance.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(OrchestrationError::NotFound(Missing::Instance {
                    name: instance.name.clone(),
                }));
            }
            Err(e) => return Err(e.into()),
        }
        tracing::info!(instance = %instance.name, "deleted");
        self.registry.refresh();
        Ok(())
    }

    pub fn locate_config(&self, instance: &Instance) -> Result<PathBuf> {
        self.locate(instance, FileKind::Config)
    }

    pub fn locate_log(&self, instance: &Instance) -> Result<PathBuf> {
        self.locate(instance, FileKind::Log)
    }

    /// First matching file under the instance directory, in file-name order
    pub fn locate(&self, instance: &Instance, kind: FileKind) -> Result<PathBuf> {
        self.ensure_exists(instance)?;

        let matches = |file_name: &str| match kind {
            FileKind::Config => file_name == self.config.config_file_name,
            FileKind::Log => file_name.starts_with(&self.config.log_file_prefix),
        };

        for entry in WalkDir::new(&instance.path).sort_by_file_name() {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_str().is_some_and(matches) {
                return Ok(entry.into_path());
            }
        }

        Err(OrchestrationError::NotFound(match kind {
            FileKind::Config => Missing::ConfigFile {
                instance: instance.name.clone(),
            },
            FileKind::Log => Missing::LogFile {
                instance: instance.name.clone(),
            },
        }))
    }

    fn ensure_exists(&self, instance: &Instance) -> Result<()> {
        if instance.path.is_dir() {
            Ok(())
        } else {
            Err(OrchestrationError::NotFound(Missing::Instance {
                name: instance.name.clone(),
            }))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::adapter::{NullSink, OwnedProcess, ProcessLine};
    use crate::registry::tests::FakeTable;

    /// Records every spec and answers with scripted exit codes (default 0)
    #[derive(Default)]
    pub(crate) struct FakeRunner {
        pub calls: Mutex<Vec<ProcessSpec>>,
        pub codes: Mutex<VecDeque<Option<i32>>>,
        pub output: Vec<(LogStream, String)>,
    }

    impl FakeRunner {
        pub fn with_codes(codes: &[Option<i32>]) -> Self {
            Self {
                codes: Mutex::new(codes.iter().copied().collect()),
                ..Self::default()
            }
        }

        pub fn subcommands(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|s| s.args.first().cloned().unwrap_or_default())
                .collect()
        }
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn run(&self, spec: &ProcessSpec, sink: Arc<dyn OutputSink>) -> io::Result<Option<i32>> {
            self.calls.lock().unwrap().push(spec.clone());
            for (stream, line) in &self.output {
                sink.push(*stream, line);
            }
            Ok(self.codes.lock().unwrap().pop_front().unwrap_or(Some(0)))
        }
    }

    pub(crate) struct FixedConfirm(pub bool);

    #[async_trait]
    impl Confirm for FixedConfirm {
        async fn confirm(&self, _prompt: &str) -> bool {
            self.0
        }
    }

    #[derive(Default)]
    pub(crate) struct CollectSink(pub Mutex<Vec<(LogStream, String)>>);

    impl OutputSink for CollectSink {
        fn push(&self, stream: LogStream, line: &str) {
            self.0.lock().unwrap().push((stream, line.to_string()));
        }
    }

    pub(crate) struct Fixture {
        pub _dir: tempfile::TempDir,
        pub root: PathBuf,
        pub table: Arc<FakeTable>,
        pub runner: Arc<FakeRunner>,
        pub lifecycle: Lifecycle,
    }

    pub(crate) fn fixture(table: FakeTable, runner: FakeRunner) -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("ydb-src");
        std::fs::create_dir_all(&source).unwrap();
        std::fs::write(source.join("ya"), "#!/bin/sh\n").unwrap();

        let root = dir.path().join("instances");
        let config = VibedbConfig {
            root: root.clone(),
            source_dir: source,
            ..VibedbConfig::default()
        };
        let table = Arc::new(table);
        let runner = Arc::new(runner);
        let registry = Arc::new(Registry::new(&root, "ydbd", table.clone()));
        let lifecycle = Lifecycle::new(Arc::new(config), registry, runner.clone());
        Fixture {
            _dir: dir,
            root,
            table,
            runner,
            lifecycle,
        }
    }

    fn null_sink() -> Arc<dyn OutputSink> {
        Arc::new(NullSink)
    }

    #[tokio::test]
    async fn test_blank_and_bad_names_rejected_before_io() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        for bad in ["", "  ", "a/b", "x:y"] {
            let err = fx.lifecycle.create_instance(bad, null_sink()).await.unwrap_err();
            assert!(matches!(err, OrchestrationError::InvalidName { .. }), "{:?}", bad);
        }
        assert!(!fx.root.exists());
        assert!(fx.runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_runs_build_then_deploy() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        let mut rx = fx.lifecycle.registry().subscribe();

        let inst = fx.lifecycle.create_instance(" dev ", null_sink()).await.unwrap();
        assert_eq!(inst.name, "dev");
        assert_eq!(inst.path, fx.root.join("dev"));
        assert!(inst.path.is_dir());

        let calls = fx.runner.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].args, fx.lifecycle.config().build.args);
        assert_eq!(calls[1].args[0], "deploy");
        assert!(calls[1].args.contains(&format!("--ydb-working-dir={}", inst.path.display())));
        assert!(calls[1].args.contains(&"--fixed-ports".to_string()));
        assert_eq!(calls[1].env.get("GRPC_PORT").map(String::as_str), Some("2136"));
        assert_eq!(calls[1].env.len(), 6);

        assert_eq!(rx.try_recv().unwrap(), crate::registry::RegistryEvent::Invalidated);
    }

    #[tokio::test]
    async fn test_existing_directory_is_already_exists() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        std::fs::create_dir_all(fx.root.join("x")).unwrap();
        std::fs::write(fx.root.join("x").join("keep"), "data").unwrap();

        let err = fx.lifecycle.create_instance("x", null_sink()).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::AlreadyExists { ref name } if name == "x"));
        assert!(fx.root.join("x").join("keep").exists());
        assert!(fx.runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_create_same_name_one_wins() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        let (a, b) = tokio::join!(
            fx.lifecycle.create_instance("x", null_sink()),
            fx.lifecycle.create_instance("x", null_sink()),
        );
        let results = [a, b];
        let ok = results.iter().filter(|r| r.is_ok()).count();
        let exists = results
            .iter()
            .filter(|r| matches!(r, Err(OrchestrationError::AlreadyExists { .. })))
            .count();
        assert_eq!((ok, exists), (1, 1));
    }

    #[tokio::test]
    async fn test_build_failure_stops_before_deploy() {
        let fx = fixture(FakeTable::default(), FakeRunner::with_codes(&[Some(2)]));
        let err = fx.lifecycle.create_instance("x", null_sink()).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::BuildFailed { code: Some(2) }));
        assert_eq!(fx.runner.calls.lock().unwrap().len(), 1);
        // No rollback
        assert!(fx.root.join("x").is_dir());
    }

    #[tokio::test]
    async fn test_deploy_failure_carries_code() {
        let fx = fixture(FakeTable::default(), FakeRunner::with_codes(&[Some(0), Some(7)]));
        let err = fx.lifecycle.create_instance("x", null_sink()).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::DeployFailed { code: Some(7) }));
    }

    #[tokio::test]
    async fn test_missing_workspace_is_not_found() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        std::fs::remove_file(fx.lifecycle.config().build_program()).unwrap();
        let err = fx.lifecycle.create_instance("x", null_sink()).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::NotFound(Missing::Workspace { .. })));
        assert!(!fx.root.exists());
    }

    #[tokio::test]
    async fn test_stray_daemons_killed_except_self() {
        let table = FakeTable::default();
        *table.owned.lock().unwrap() = vec![
            OwnedProcess { pid: 1, name: "ydbd".into() },
            OwnedProcess { pid: 50, name: "ydbd".into() },
            OwnedProcess { pid: 51, name: "ydbd-helper".into() },
            OwnedProcess { pid: 52, name: "bash".into() },
            OwnedProcess { pid: 53, name: "ydbd".into() },
        ];
        let fx = fixture(table, FakeRunner::default());
        let sink = Arc::new(CollectSink::default());
        fx.lifecycle.create_instance("x", sink.clone()).await.unwrap();
        assert_eq!(*fx.table.terminated.lock().unwrap(), vec![vec![50, 53]]);
        assert!(sink.0.lock().unwrap().iter().any(|(_, l)| l.contains("stale")));
    }

    #[tokio::test]
    async fn test_stray_kill_failure_is_not_fatal() {
        let table = FakeTable {
            fail_terminate: true,
            ..FakeTable::default()
        };
        *table.owned.lock().unwrap() = vec![OwnedProcess { pid: 50, name: "ydbd".into() }];
        let fx = fixture(table, FakeRunner::default());
        fx.lifecycle.create_instance("x", null_sink()).await.unwrap();
        assert_eq!(fx.runner.subcommands().last().map(String::as_str), Some("deploy"));
    }

    #[tokio::test]
    async fn test_output_reaches_sink() {
        let runner = FakeRunner {
            output: vec![(LogStream::Stdout, "compiling".into()), (LogStream::Stderr, "warning".into())],
            ..FakeRunner::default()
        };
        let fx = fixture(FakeTable::default(), runner);
        let sink = Arc::new(CollectSink::default());
        fx.lifecycle.create_instance("x", sink.clone()).await.unwrap();
        let lines = sink.0.lock().unwrap().clone();
        assert!(lines.contains(&(LogStream::Stdout, "compiling".to_string())));
        assert!(lines.contains(&(LogStream::Stderr, "warning".to_string())));
        assert!(lines.iter().any(|(s, l)| *s == LogStream::System && l.starts_with("$ ")));
    }

    #[tokio::test]
    async fn test_stop_only_touches_target_instance() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        std::fs::create_dir_all(fx.root.join("a")).unwrap();
        std::fs::create_dir_all(fx.root.join("b")).unwrap();
        {
            let mut lines = fx.table.lines.lock().unwrap();
            *lines = FakeTable::running(&fx.root, &["a", "b"]).lines.into_inner().unwrap();
            lines.push(ProcessLine::new(
                77,
                ["ydbd".to_string(), format!("--yaml-config={}/a/node2/config.yaml", fx.root.display())],
            ));
        }

        let a = fx.lifecycle.registry().get("a").await.unwrap();
        assert!(a.running);
        let n = fx.lifecycle.stop_instance(&a).await.unwrap();
        assert_eq!(n, 2);
        assert_eq!(*fx.table.terminated.lock().unwrap(), vec![vec![1000, 77]]);

        assert!(!fx.lifecycle.registry().is_running("a").await);
        assert!(fx.lifecycle.registry().is_running("b").await);
    }

    #[tokio::test]
    async fn test_stop_not_running_is_zero() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        std::fs::create_dir_all(fx.root.join("a")).unwrap();
        let a = fx.lifecycle.registry().get("a").await.unwrap();
        assert_eq!(fx.lifecycle.stop_instance(&a).await.unwrap(), 0);
        assert!(fx.table.terminated.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_start_uses_local_ydb_start() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        std::fs::create_dir_all(fx.root.join("a")).unwrap();
        let a = fx.lifecycle.registry().get("a").await.unwrap();
        fx.lifecycle.start_instance(&a, null_sink()).await.unwrap();

        let calls = fx.runner.calls.lock().unwrap().clone();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].program, fx.lifecycle.config().local_ydb_path());
        assert_eq!(calls[0].args[0], "start");
        assert!(calls[0].args.contains(&"--fixed-ports".to_string()));
        assert_eq!(calls[0].env.get("MON_PORT").map(String::as_str), Some("8765"));
    }

    #[tokio::test]
    async fn test_start_failures() {
        let fx = fixture(FakeTable::default(), FakeRunner::with_codes(&[Some(3)]));
        let ghost = Instance::new(&fx.root, "ghost", false);
        let err = fx.lifecycle.start_instance(&ghost, null_sink()).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::NotFound(Missing::Instance { .. })));

        std::fs::create_dir_all(fx.root.join("a")).unwrap();
        let a = fx.lifecycle.registry().get("a").await.unwrap();
        let err = fx.lifecycle.start_instance(&a, null_sink()).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::StartFailed { code: Some(3) }));
    }

    #[tokio::test]
    async fn test_start_already_running() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        std::fs::create_dir_all(fx.root.join("a")).unwrap();
        *fx.table.lines.lock().unwrap() = vec![ProcessLine::new(
            9,
            ["ydbd".to_string(), format!("--yaml-config={}/a/config.yaml", fx.root.display())],
        )];
        let a = fx.lifecycle.registry().get("a").await.unwrap();
        let err = fx.lifecycle.start_instance(&a, null_sink()).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::AlreadyRunning { .. }));
        assert!(fx.runner.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        std::fs::create_dir_all(fx.root.join("a").join("data")).unwrap();
        let a = fx.lifecycle.registry().get("a").await.unwrap();

        let err = fx.lifecycle.delete_instance(&a, &FixedConfirm(false)).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::Cancelled));
        assert!(a.path.is_dir());

        let mut rx = fx.lifecycle.registry().subscribe();
        fx.lifecycle.delete_instance(&a, &FixedConfirm(true)).await.unwrap();
        assert!(!a.path.exists());
        assert!(rx.try_recv().is_ok());
        assert!(fx.lifecycle.registry().instances().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_refuses_running_instance() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        std::fs::create_dir_all(fx.root.join("a")).unwrap();
        *fx.table.lines.lock().unwrap() = vec![ProcessLine::new(
            9,
            ["ydbd".to_string(), format!("--yaml-config={}/a/config.yaml", fx.root.display())],
        )];
        let a = fx.lifecycle.registry().get("a").await.unwrap();
        let err = fx.lifecycle.delete_instance(&a, &FixedConfirm(true)).await.unwrap_err();
        assert!(matches!(err, OrchestrationError::Running { .. }));
        assert!(a.path.exists());
    }

    #[tokio::test]
    async fn test_locate_config_and_logs() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        let inst_dir = fx.root.join("a");
        std::fs::create_dir_all(inst_dir.join("node1")).unwrap();
        std::fs::create_dir_all(inst_dir.join("node2")).unwrap();
        std::fs::write(inst_dir.join("node2").join("config.yaml"), "x").unwrap();
        std::fs::write(inst_dir.join("node1").join("config.yaml"), "x").unwrap();
        std::fs::write(inst_dir.join("node1").join("logfile_ydbd.log"), "x").unwrap();
        let a = fx.lifecycle.registry().get("a").await.unwrap();

        assert_eq!(
            fx.lifecycle.locate_config(&a).unwrap(),
            inst_dir.join("node1").join("config.yaml")
        );
        assert_eq!(
            fx.lifecycle.locate_log(&a).unwrap(),
            inst_dir.join("node1").join("logfile_ydbd.log")
        );
    }

    #[tokio::test]
    async fn test_locate_reports_not_found() {
        let fx = fixture(FakeTable::default(), FakeRunner::default());
        std::fs::create_dir_all(fx.root.join("a")).unwrap();
        std::fs::write(fx.root.join("a").join("readme"), "x").unwrap();
        let a = fx.lifecycle.registry().get("a").await.unwrap();

        let err = fx.lifecycle.locate_config(&a).unwrap_err();
        assert!(matches!(err, OrchestrationError::NotFound(Missing::ConfigFile { .. })));
        let err = fx.lifecycle.locate_log(&a).unwrap_err();
        assert!(matches!(err, OrchestrationError::NotFound(Missing::LogFile { .. })));
    }
}
