use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use patchbay_exec::daemon::DaemonPaths;
use patchbay_exec::daemon::DEFAULT_FETCH_URL;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Config {
    pub applications_root: PathBuf,
    pub finisher_script: PathBuf,
    pub daemon: DaemonConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            applications_root: PathBuf::from("/Applications"),
            finisher_script: PathBuf::from("/tmp/patchbay-relaunch.sh"),
            daemon: DaemonConfig::default(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct DaemonConfig {
    pub install_dir: PathBuf,
    pub binary_path: PathBuf,
    pub descriptor_path: PathBuf,
    pub fetch_url: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        let paths = DaemonPaths::standard();
        Self {
            install_dir: paths.install_dir,
            binary_path: paths.binary_path,
            descriptor_path: paths.descriptor_path,
            fetch_url: DEFAULT_FETCH_URL.to_string(),
        }
    }
}

impl Config {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("patchbay").join("config.toml"))
    }

    pub fn journal_path() -> Option<PathBuf> {
        dirs::data_local_dir().map(|dir| dir.join("patchbay").join("journal.jsonl"))
    }

    /// Loads the operator config, falling back to defaults when the file is
    /// absent. A malformed file is ignored with a warning, never fatal.
    pub fn load() -> (Self, Option<String>) {
        let Some(path) = Self::config_path() else {
            return (Self::default(), None);
        };
        match std::fs::read_to_string(path.as_path()) {
            Ok(raw) => match toml::from_str(raw.as_str()) {
                Ok(config) => (config, None),
                Err(err) => (
                    Self::default(),
                    Some(format!("ignoring malformed {}: {err}", path.display())),
                ),
            },
            Err(_) => (Self::default(), None),
        }
    }

    pub fn daemon_paths(&self) -> DaemonPaths {
        DaemonPaths {
            install_dir: self.daemon.install_dir.clone(),
            binary_path: self.daemon.binary_path.clone(),
            descriptor_path: self.daemon.descriptor_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config: Config = toml::from_str("").expect("parse");
        assert_eq!(config.applications_root, PathBuf::from("/Applications"));
        assert_eq!(config.daemon.fetch_url, DEFAULT_FETCH_URL);
    }

    #[test]
    fn partial_overrides_keep_remaining_defaults() {
        let config: Config = toml::from_str(
            r#"
applications_root = "/Users/op/Applications"

[daemon]
fetch_url = "https://mirror.example/ryzenadj"
"#,
        )
        .expect("parse");

        assert_eq!(
            config.applications_root,
            PathBuf::from("/Users/op/Applications")
        );
        assert_eq!(config.daemon.fetch_url, "https://mirror.example/ryzenadj");
        assert_eq!(
            config.daemon.binary_path,
            PathBuf::from("/usr/local/bin/ryzenadj")
        );
        assert_eq!(
            config.finisher_script,
            PathBuf::from("/tmp/patchbay-relaunch.sh")
        );
    }

    #[test]
    fn daemon_paths_reflect_config() {
        let mut config = Config::default();
        config.daemon.binary_path = PathBuf::from("/opt/pb/ryzenadj");
        let paths = config.daemon_paths();
        assert_eq!(paths.binary_path, PathBuf::from("/opt/pb/ryzenadj"));
        assert_eq!(paths.install_dir, PathBuf::from("/usr/local/bin"));
    }
}
