use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub type InstanceName = String;

/// One local YDB deployment, backed by a directory under the root.
///
/// Nothing here is persisted: the registry rebuilds every `Instance` from the
/// filesystem and the process table on each read.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instance {
    pub name: InstanceName,
    pub path: PathBuf,
    pub running: bool,
}

impl Instance {
    pub fn new(root: &Path, name: impl Into<InstanceName>, running: bool) -> Self {
        let name = name.into();
        Self {
            path: root.join(&name),
            name,
            running,
        }
    }
}

/// A directory entry as seen by the directory reader, before liveness is known.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceDir {
    pub name: InstanceName,
    pub path: PathBuf,
}

impl InstanceDir {
    pub fn into_instance(self, running: bool) -> Instance {
        Instance {
            name: self.name,
            path: self.path,
            running,
        }
    }
}

/// Which output stream a line came from
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogStream {
    Stdout,
    Stderr,
    System,
}

/// The fixed network ports handed to `local_ydb` through the environment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ports {
    pub mon: u16,
    pub grpc: u16,
    pub grpc_tls: u16,
    pub ic: u16,
    pub grpc_ext: u16,
    pub public_http: u16,
}

impl Default for Ports {
    fn default() -> Self {
        Self {
            mon: 8765,
            grpc: 2136,
            grpc_tls: 2135,
            ic: 19001,
            grpc_ext: 2137,
            public_http: 8766,
        }
    }
}

impl Ports {
    /// Environment variables understood by `local_ydb --fixed-ports`
    pub fn env(&self) -> [(&'static str, u16); 6] {
        [
            ("MON_PORT", self.mon),
            ("GRPC_PORT", self.grpc),
            ("GRPC_TLS_PORT", self.grpc_tls),
            ("IC_PORT", self.ic),
            ("GRPC_EXT_PORT", self.grpc_ext),
            ("PUBLIC_HTTP_PORT", self.public_http),
        ]
    }
}

/// Characters that may not appear in an instance name
pub const RESERVED_NAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Check a user-supplied instance name and return its trimmed form.
///
/// Runs before any I/O so a bad name never touches the filesystem.
pub fn validate_instance_name(raw: &str) -> Result<&str, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("name must not be empty".into());
    }
    if name == "." || name == ".." {
        return Err("name must not be '.' or '..'".into());
    }
    if let Some(c) = name.chars().find(|c| RESERVED_NAME_CHARS.contains(c)) {
        return Err(format!("name must not contain '{}'", c));
    }
    if name.chars().any(char::is_control) {
        return Err("name must not contain control characters".into());
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instance_path_is_root_join_name() {
        let inst = Instance::new(Path::new("/home/dev/local-ydb"), "alpha", false);
        assert_eq!(inst.path, PathBuf::from("/home/dev/local-ydb/alpha"));
        assert_eq!(inst.name, "alpha");
    }

    #[test]
    fn test_validate_rejects_blank_names() {
        assert!(validate_instance_name("").is_err());
        assert!(validate_instance_name("   ").is_err());
        assert!(validate_instance_name("\t\n").is_err());
    }

    #[test]
    fn test_validate_rejects_reserved_chars() {
        for bad in ["a/b", "a\\b", "a:b", "a*", "what?", "<x>", "a|b", "\"q\""] {
            assert!(validate_instance_name(bad).is_err(), "accepted {:?}", bad);
        }
        assert!(validate_instance_name("..").is_err());
    }

    #[test]
    fn test_validate_trims() {
        assert_eq!(validate_instance_name("  dev-1 ").unwrap(), "dev-1");
        assert_eq!(validate_instance_name("my.db_2").unwrap(), "my.db_2");
    }

    #[test]
    fn test_ports_env_names() {
        let env = Ports::default().env();
        let names: Vec<_> = env.iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            [
                "MON_PORT",
                "GRPC_PORT",
                "GRPC_TLS_PORT",
                "IC_PORT",
                "GRPC_EXT_PORT",
                "PUBLIC_HTTP_PORT"
            ]
        );
        assert!(env.contains(&("GRPC_PORT", 2136)));
    }
}
