//! Configuration file discovery and first-run template generation.
//!
//! On a fresh installation no `berth.toml` exists, so the `up` command
//! writes a template populated with placeholder values and asks the user to
//! fill it in. Discovery follows the same search order `ortho-config` uses
//! when loading, so the template lands where a later run will find it.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use ortho_config::ConfigDiscovery;
use thiserror::Error;

use ortho_config::toml;

const APP_NAME: &str = "berth";
const CONFIG_ENV_VAR: &str = "BERTH_CONFIG_PATH";
const CONFIG_FILE_NAME: &str = "berth.toml";
const DOTFILE_NAME: &str = ".berth.toml";
const PROJECT_FILE_NAME: &str = "berth.toml";
const HETZNER_SECTION: &str = "hetzner";
const SESSION_SECTION: &str = "session";

const TOKEN_PLACEHOLDER: &str = "Hetzner API token";
const HOST_PLACEHOLDER: &str = "remote server hostname or IP address";
const USER_PLACEHOLDER: &str = "remote server user name";
const KEY_FILE_PLACEHOLDER: &str = "SSH key file-path";

/// Errors raised while locating or writing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    /// Raised when no configuration candidates are available.
    #[error("no configuration file candidates were discovered")]
    NoCandidates,
    /// Raised when file system operations fail.
    #[error("failed to access {path}: {message}")]
    Io {
        /// Path that could not be accessed.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when rendering TOML content fails.
    #[error("failed to render {path}: {message}")]
    Render {
        /// Path that could not be rendered.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
    /// Raised when a configuration path has an unexpected shape.
    #[error("invalid configuration path {path}: {message}")]
    InvalidPath {
        /// Path that was rejected.
        path: Utf8PathBuf,
        /// Human-readable error message.
        message: String,
    },
}

/// Locates `berth.toml` using `OrthoConfig`'s discovery search order.
#[derive(Clone, Debug)]
pub struct ConfigStore {
    discovery: ConfigDiscovery,
}

impl ConfigStore {
    /// Builds a config store using the standard Berth discovery settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            discovery: ConfigDiscovery::builder(APP_NAME)
                .env_var(CONFIG_ENV_VAR)
                .config_file_name(CONFIG_FILE_NAME)
                .dotfile_name(DOTFILE_NAME)
                .project_file_name(PROJECT_FILE_NAME)
                .build(),
        }
    }

    /// Builds a config store using an explicit discovery configuration.
    #[must_use]
    pub const fn with_discovery(discovery: ConfigDiscovery) -> Self {
        Self { discovery }
    }

    /// Reports whether a configuration file exists at any discovery
    /// candidate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] when candidate paths cannot be checked.
    pub fn config_file_exists(&self) -> Result<bool, ConfigStoreError> {
        Ok(self.resolve_target()?.exists)
    }

    /// Writes a template configuration file populated with placeholder
    /// values and returns the path it was written to.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigStoreError`] when the template cannot be rendered or
    /// written.
    pub fn write_template(&self) -> Result<Utf8PathBuf, ConfigStoreError> {
        let target = self.resolve_target()?;
        write_config(&target.path, &template_value())?;
        Ok(target.path)
    }

    fn resolve_target(&self) -> Result<ConfigTarget, ConfigStoreError> {
        let candidates = self.discovery.utf8_candidates();
        if candidates.is_empty() {
            return Err(ConfigStoreError::NoCandidates);
        }

        for candidate in &candidates {
            if path_exists(candidate)? {
                return Ok(ConfigTarget {
                    path: candidate.clone(),
                    exists: true,
                });
            }
        }

        let fallback = candidates
            .last()
            .cloned()
            .ok_or(ConfigStoreError::NoCandidates)?;
        Ok(ConfigTarget {
            path: fallback,
            exists: false,
        })
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Debug)]
struct ConfigTarget {
    path: Utf8PathBuf,
    exists: bool,
}

fn template_value() -> toml::Value {
    let mut hetzner = toml::value::Table::new();
    hetzner.insert(
        String::from("token"),
        toml::Value::String(String::from(TOKEN_PLACEHOLDER)),
    );

    let mut session = toml::value::Table::new();
    session.insert(
        String::from("host"),
        toml::Value::String(String::from(HOST_PLACEHOLDER)),
    );
    session.insert(
        String::from("user"),
        toml::Value::String(String::from(USER_PLACEHOLDER)),
    );
    session.insert(
        String::from("key_file"),
        toml::Value::String(String::from(KEY_FILE_PLACEHOLDER)),
    );

    let mut root = toml::value::Table::new();
    root.insert(
        String::from(HETZNER_SECTION),
        toml::Value::Table(hetzner),
    );
    root.insert(
        String::from(SESSION_SECTION),
        toml::Value::Table(session),
    );
    toml::Value::Table(root)
}

fn path_exists(path: &Utf8Path) -> Result<bool, ConfigStoreError> {
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    let file_name = path
        .file_name()
        .ok_or_else(|| ConfigStoreError::InvalidPath {
            path: path.to_path_buf(),
            message: String::from("configuration file path is missing a filename"),
        })?;

    match Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir
            .try_exists(file_name)
            .map_err(|err| ConfigStoreError::Io {
                path: path.to_path_buf(),
                message: err.to_string(),
            }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(ConfigStoreError::Io {
            path: parent.to_path_buf(),
            message: err.to_string(),
        }),
    }
}

fn write_config(path: &Utf8Path, value: &toml::Value) -> Result<(), ConfigStoreError> {
    let parent = path.parent().unwrap_or_else(|| Utf8Path::new("."));
    Dir::create_ambient_dir_all(parent, ambient_authority()).map_err(|err| {
        ConfigStoreError::Io {
            path: parent.to_path_buf(),
            message: err.to_string(),
        }
    })?;

    let file_name = path
        .file_name()
        .ok_or_else(|| ConfigStoreError::InvalidPath {
            path: path.to_path_buf(),
            message: String::from("configuration file path is missing a filename"),
        })?;
    let dir =
        Dir::open_ambient_dir(parent, ambient_authority()).map_err(|err| ConfigStoreError::Io {
            path: parent.to_path_buf(),
            message: err.to_string(),
        })?;

    let rendered = toml::to_string_pretty(value).map_err(|err| ConfigStoreError::Render {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    dir.write(file_name, rendered)
        .map_err(|err| ConfigStoreError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn discovery_for_path(path: &Utf8Path) -> ConfigDiscovery {
        let root = path
            .parent()
            .expect("temp path should have a parent directory");
        ConfigDiscovery::builder(APP_NAME)
            .env_var(CONFIG_ENV_VAR)
            .config_file_name(CONFIG_FILE_NAME)
            .dotfile_name(DOTFILE_NAME)
            .project_file_name(PROJECT_FILE_NAME)
            .clear_project_roots()
            .add_project_root(root)
            .build()
    }

    fn temp_config_path(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().join("berth.toml"))
            .unwrap_or_else(|err| panic!("temp path should be utf8: {}", err.display()))
    }

    fn parse_config(path: &Utf8Path) -> toml::Value {
        let contents = std::fs::read_to_string(path)
            .unwrap_or_else(|err| panic!("read config: {err}"));
        toml::from_str(&contents).unwrap_or_else(|err| panic!("parse config: {err}"))
    }

    fn string_at<'a>(value: &'a toml::Value, section: &str, key: &str) -> &'a str {
        value
            .get(section)
            .and_then(|table| table.get(key))
            .and_then(toml::Value::as_str)
            .unwrap_or_else(|| panic!("{section}.{key} should be a string"))
    }

    #[test]
    fn write_template_creates_config_file() {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let path = temp_config_path(&tmp);
        let store = ConfigStore::with_discovery(discovery_for_path(&path));

        let written_path = store
            .write_template()
            .unwrap_or_else(|err| panic!("write template: {err}"));

        assert_eq!(written_path, path);
        let value = parse_config(&path);
        assert_eq!(string_at(&value, "hetzner", "token"), TOKEN_PLACEHOLDER);
        assert_eq!(string_at(&value, "session", "host"), HOST_PLACEHOLDER);
        assert_eq!(string_at(&value, "session", "user"), USER_PLACEHOLDER);
        assert_eq!(
            string_at(&value, "session", "key_file"),
            KEY_FILE_PLACEHOLDER
        );
    }

    #[test]
    fn config_file_exists_reflects_generated_file() {
        let tmp = TempDir::new().unwrap_or_else(|err| panic!("tempdir: {err}"));
        let path = temp_config_path(&tmp);
        let store = ConfigStore::with_discovery(discovery_for_path(&path));

        let before = store
            .config_file_exists()
            .unwrap_or_else(|err| panic!("check config: {err}"));
        assert!(!before);

        store
            .write_template()
            .unwrap_or_else(|err| panic!("write template: {err}"));

        let after = store
            .config_file_exists()
            .unwrap_or_else(|err| panic!("check config: {err}"));
        assert!(after);
    }
}
