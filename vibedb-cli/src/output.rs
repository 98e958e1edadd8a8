use std::io::{self, IsTerminal};
use std::path::Path;

use vibedb_core::command::Outcome;
use vibedb_core::error::OrchestrationError;
use vibedb_core::model::Instance;

const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

fn paint(color: &str, text: &str) -> String {
    if io::stdout().is_terminal() {
        format!("{}{}{}", color, text, RESET)
    } else {
        text.to_string()
    }
}

fn status_icon(instance: &Instance) -> &'static str {
    if instance.running { "●" } else { "○" }
}

fn status_label(instance: &Instance) -> &'static str {
    if instance.running { "running" } else { "stopped" }
}

/// Sorted copy for display; the registry itself guarantees no order
fn sorted(instances: &[Instance]) -> Vec<&Instance> {
    let mut sorted: Vec<_> = instances.iter().collect();
    sorted.sort_by(|a, b| a.name.cmp(&b.name));
    sorted
}

pub fn print_instances(instances: &[Instance], root: &Path, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&sorted(instances))?);
        return Ok(());
    }

    if instances.is_empty() {
        println!("No instances in {}", root.display());
        println!("  Run `vibedb create <name>` to build and deploy one");
        return Ok(());
    }

    let width = instances.iter().map(|i| i.name.len()).max().unwrap_or(4).max(4);
    println!("{:<width$}  {:<8}  {}", "NAME", "STATUS", "PATH", width = width);
    for instance in sorted(instances) {
        let color = if instance.running { GREEN } else { DIM };
        println!(
            "{:<width$}  {}  {}",
            instance.name,
            paint(color, &format!("{} {:<6}", status_icon(instance), status_label(instance))),
            instance.path.display(),
            width = width
        );
    }
    Ok(())
}

pub fn print_outcome(outcome: &Outcome, root: &Path, json: bool) -> anyhow::Result<()> {
    match outcome {
        Outcome::Listed(instances) | Outcome::Refreshed(instances) => {
            print_instances(instances, root, json)?;
        }
        Outcome::Created(instance) => {
            println!(
                "{} instance '{}' at {}",
                paint(GREEN, "Created"),
                instance.name,
                instance.path.display()
            );
        }
        Outcome::Started(instance) => {
            println!("{} instance '{}'", paint(GREEN, "Started"), instance.name);
        }
        Outcome::Stopped {
            instance,
            terminated: 0,
        } => {
            println!("Instance '{}' is not running", instance.name);
        }
        Outcome::Stopped {
            instance,
            terminated,
        } => {
            println!(
                "{} instance '{}' ({} process(es) signalled)",
                paint(YELLOW, "Stopped"),
                instance.name,
                terminated
            );
        }
        Outcome::Deleted(instance) => {
            println!("{} instance '{}'", paint(RED, "Deleted"), instance.name);
        }
        Outcome::Shown { .. } => {}
    }
    Ok(())
}

/// Print a failed action; user errors are warnings, the rest are errors
pub fn print_error(err: &OrchestrationError) {
    let color = io::stderr().is_terminal();
    let (label, code) = if err.is_user_error() {
        ("warning", YELLOW)
    } else {
        ("error", RED)
    };
    if color {
        eprintln!("{}{}{}: {}", code, label, RESET, err);
    } else {
        eprintln!("{}: {}", label, err);
    }

    if let OrchestrationError::NotFound(vibedb_core::error::Missing::Selection) = err {
        eprintln!("  Pass an instance name or set VIBEDB_SELECTED");
    }
}
