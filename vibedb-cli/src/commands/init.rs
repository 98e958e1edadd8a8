//! `vibedb init` command - writes a starter vibedb.yaml

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};

use vibedb_core::config::{CONFIG_FILE_NAME, VibedbConfig};

/// Walk up from `start` looking for a YDB checkout (a directory with the `ya` build tool)
pub fn find_source_checkout(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join("ya").is_file() && dir.join("ydb").is_dir())
        .map(Path::to_path_buf)
}

/// Run the init command
pub fn run_init(force: bool, output: Option<PathBuf>) -> anyhow::Result<()> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;
    let output_path = output.unwrap_or_else(|| cwd.join(CONFIG_FILE_NAME));

    if output_path.exists() && !force {
        bail!(
            "Config file {} already exists. Use --force to overwrite.",
            output_path.display()
        );
    }

    let mut config = VibedbConfig::default();
    match find_source_checkout(&cwd) {
        Some(source) => {
            println!("Detected YDB checkout: {}\n", source.display());
            config.source_dir = source;
        }
        None => {
            println!("No YDB checkout detected. Set source_dir before running `vibedb create`.\n");
            config.source_dir = cwd;
        }
    }

    let yaml = config.to_yaml()?;
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(&output_path, &yaml)
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    println!("Created: {}\n", output_path.display());
    println!("Next steps:");
    println!("  1. Review root, source_dir and ports in {}", CONFIG_FILE_NAME);
    println!("  2. Run `vibedb doctor` to check the toolchain");
    println!("  3. Run `vibedb create <name>` to build and deploy an instance");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_source_checkout_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("ydb-src");
        fs::create_dir_all(src.join("ydb").join("core").join("tx")).unwrap();
        fs::write(src.join("ya"), "").unwrap();

        let nested = src.join("ydb").join("core").join("tx");
        assert_eq!(find_source_checkout(&nested), Some(src));
        assert_eq!(find_source_checkout(dir.path()), None);
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vibedb.yaml");
        fs::write(&path, "root: /keep\n").unwrap();
        assert!(run_init(false, Some(path.clone())).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "root: /keep\n");
    }

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("vibedb.yaml");
        run_init(false, Some(path.clone())).unwrap();
        let config = VibedbConfig::load(&path).unwrap();
        assert_eq!(config.daemon_name, "ydbd");
    }
}
