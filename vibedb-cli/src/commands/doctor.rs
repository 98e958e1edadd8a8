use std::net::TcpListener;
use std::path::Path;

use vibedb_core::config::VibedbConfig;
use vibedb_core::registry::Registry;

#[derive(Debug)]
pub struct Check {
    pub name: String,
    pub passed: bool,
    pub message: String,
    pub hint: Option<String>,
}

impl Check {
    fn ok(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: true,
            message: message.into(),
            hint: None,
        }
    }

    fn fail(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            passed: false,
            message: message.into(),
            hint: None,
        }
    }

    fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Check the environment `vibedb` depends on. Returns whether everything passed.
pub async fn run_doctor(config: &VibedbConfig, config_path: Option<&Path>, registry: &Registry) -> bool {
    println!("vibedb doctor\n");

    match config_path {
        Some(path) => println!("Configuration: {}", path.display()),
        None => println!("Configuration: defaults (run `vibedb init` to write one)"),
    }
    println!();

    println!("Toolchain:");
    let checks = vec![
        check_source_checkout(config),
        check_binary("ydbd", &config.ydbd_path()),
        check_binary("local_ydb", &config.local_ydb_path()),
    ];
    for check in &checks {
        print_check(check);
    }
    println!();

    println!("Instances:");
    let instances = registry.instances().await;
    let running = instances.iter().filter(|i| i.running).count();
    let root_check = check_root(registry.root(), instances.len(), running);
    print_check(&root_check);
    println!();

    // Ports are expected to be taken while an instance is up
    let mut warnings = Vec::new();
    println!("Ports:");
    for (name, port) in config.ports.env() {
        let check = check_port(name, port, running > 0);
        print_check(&check);
        if !check.passed {
            warnings.push(check);
        }
    }
    println!();

    let failed: Vec<_> = checks
        .iter()
        .chain(std::iter::once(&root_check))
        .filter(|c| !c.passed)
        .collect();

    if failed.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
        return true;
    }

    if !failed.is_empty() {
        println!("Issues found:");
        for check in &failed {
            println!("  - {}: {}", check.name, check.message);
            if let Some(hint) = &check.hint {
                println!("    Hint: {}", hint);
            }
        }
    }
    if !warnings.is_empty() {
        println!("\nWarnings: {} port(s) in use", warnings.len());
    }
    false
}

fn print_check(check: &Check) {
    let icon = if check.passed { "✓" } else { "✗" };
    let color = if check.passed { "\x1b[32m" } else { "\x1b[31m" };
    let reset = "\x1b[0m";

    println!("  {}{}{} {}: {}", color, icon, reset, check.name, check.message);

    if let Some(hint) = &check.hint {
        println!("    └─ {}", hint);
    }
}

fn check_source_checkout(config: &VibedbConfig) -> Check {
    let program = config.build_program();
    if program.is_file() {
        Check::ok("source", config.source_dir.display().to_string())
    } else {
        Check::fail("source", format!("build tool not found at {}", program.display()))
            .with_hint("Set source_dir in vibedb.yaml to your YDB checkout")
    }
}

fn check_binary(name: &str, path: &Path) -> Check {
    if path.is_file() {
        Check::ok(name, path.display().to_string())
    } else {
        Check::fail(name, "not built yet")
            .with_hint("`vibedb create <name>` builds it before deploying")
    }
}

fn check_root(root: &Path, count: usize, running: usize) -> Check {
    if !root.exists() {
        return Check::ok("root", format!("{} (not created yet)", root.display()));
    }
    if !root.is_dir() {
        return Check::fail("root", format!("{} is not a directory", root.display()))
            .with_hint("Point root in vibedb.yaml or VIBEDB_ROOT at a directory");
    }
    Check::ok(
        "root",
        format!("{} ({} instance(s), {} running)", root.display(), count, running),
    )
}

fn check_port(name: &str, port: u16, instance_running: bool) -> Check {
    if is_port_available(port) {
        return Check::ok(name, format!("{} free", port));
    }
    let check = Check::fail(name, format!("{} is in use", port));
    if instance_running {
        check.with_hint("An instance is running; stop it before creating another")
    } else {
        check.with_hint("Another program holds this port; deploy will fail")
    }
}

fn is_port_available(port: u16) -> bool {
    TcpListener::bind(("127.0.0.1", port)).is_ok()
}
