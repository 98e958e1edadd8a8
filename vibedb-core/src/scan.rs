//! Process scanning: which instances have a live daemon
//!
//! Liveness is best-effort. A failure to read the process table is logged and
//! reported as "nothing running", never as an error.
//!
//! Matching works on argv, never on a joined command line, so instance paths
//! containing spaces map back to the right instance.

use std::collections::BTreeSet;
use std::path::{MAIN_SEPARATOR, Path};

use crate::adapter::{ProcessLine, ProcessTable};
use crate::model::InstanceName;

const YAML_CONFIG_FLAG: &str = "--yaml-config";

/// Extract the `--yaml-config` value from argv, in `--flag=value` or `--flag value` form
pub fn yaml_config_path<S: AsRef<str>>(args: &[S]) -> Option<&str> {
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let arg: &str = arg.as_ref();
        if arg == YAML_CONFIG_FLAG {
            return iter.next().map(AsRef::<str>::as_ref);
        }
        if let Some(value) = arg
            .strip_prefix(YAML_CONFIG_FLAG)
            .and_then(|rest| rest.strip_prefix('='))
        {
            return Some(value);
        }
    }
    None
}

fn is_daemon<S: AsRef<str>>(args: &[S], daemon_name: &str) -> bool {
    args.iter().any(|arg| {
        let arg: &str = arg.as_ref();
        Path::new(arg)
            .file_name()
            .is_some_and(|name| name == daemon_name)
    })
}

/// Map a daemon's argv back to the instance it serves.
///
/// Returns the path segment right after `root/` in the `--yaml-config`
/// argument, or `None` if the process is not a daemon or points outside the root.
pub fn instance_name_from_args<S: AsRef<str>>(
    args: &[S],
    root: &Path,
    daemon_name: &str,
) -> Option<InstanceName> {
    if !is_daemon(args, daemon_name) {
        return None;
    }
    let config_path = yaml_config_path(args)?;

    let root = root.to_str()?.trim_end_matches(MAIN_SEPARATOR);
    let prefix = format!("{}{}", root, MAIN_SEPARATOR);
    let rest = config_path.strip_prefix(&prefix)?;

    let name = rest.split(MAIN_SEPARATOR).next()?;
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

/// Names of instances under `root` with a matching daemon in `lines`
pub fn running_names_from_lines(lines: &[ProcessLine], root: &Path, daemon_name: &str) -> BTreeSet<InstanceName> {
    lines
        .iter()
        .filter_map(|line| instance_name_from_args(&line.args, root, daemon_name))
        .collect()
}

/// Query the process table for running instances under `root`.
pub async fn running_instance_names(
    table: &dyn ProcessTable,
    root: &Path,
    daemon_name: &str,
) -> BTreeSet<InstanceName> {
    match table.command_lines().await {
        Ok(lines) => running_names_from_lines(&lines, root, daemon_name),
        Err(e) => {
            tracing::warn!(error = %e, "failed to read process table, assuming nothing is running");
            BTreeSet::new()
        }
    }
}

/// Pids of daemons serving instance `name` under `root`
pub fn daemon_pids_for_instance(
    lines: &[ProcessLine],
    root: &Path,
    name: &str,
    daemon_name: &str,
) -> Vec<u32> {
    lines
        .iter()
        .filter(|p| instance_name_from_args(&p.args, root, daemon_name).as_deref() == Some(name))
        .map(|p| p.pid)
        .collect()
}
