//! Configuration loading via `ortho-config`.
//!
//! Settings merge defaults, `berth.toml` (discovered per
//! [`crate::config_store`]), and environment variables in that order of
//! precedence. Validation runs after loading so missing fields produce
//! guidance naming both the environment variable and the file key that
//! would satisfy them.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

/// Hetzner Cloud credentials and key registration settings derived from
/// environment variables and configuration files.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "HCLOUD",
    discovery(
        app_name = "berth",
        env_var = "BERTH_CONFIG_PATH",
        config_file_name = "berth.toml",
        dotfile_name = ".berth.toml",
        project_file_name = "berth.toml"
    )
)]
pub struct HetznerConfig {
    /// API token used to authenticate against the Hetzner Cloud API. This
    /// value is required.
    pub token: String,
    /// Display name recorded alongside the SSH public key when it is
    /// uploaded. Defaults to `berth` so repeat runs reuse one entry.
    #[ortho_config(default = "berth".to_owned())]
    pub key_name: String,
}

/// Remote host settings for the SSH session opened once provisioning
/// completes.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "BERTH_SESSION",
    discovery(
        app_name = "berth",
        env_var = "BERTH_CONFIG_PATH",
        config_file_name = "berth.toml",
        dotfile_name = ".berth.toml",
        project_file_name = "berth.toml"
    )
)]
pub struct SessionConfig {
    /// Host name or IP address of the server to connect to. This value is
    /// required.
    pub host: String,
    /// Remote user to connect as. This value is required.
    pub user: String,
    /// TCP port the remote SSH daemon listens on.
    #[ortho_config(default = 22)]
    pub port: u16,
    /// Path to the SSH private key used for authentication. Supports tilde
    /// expansion (`~/.ssh/id_ed25519`). This value is required.
    pub key_file: String,
    /// Path to the `ssh` executable.
    #[ortho_config(default = "ssh".to_owned())]
    pub ssh_bin: String,
}

/// Metadata for a configuration field, used to generate actionable error messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
    section: &'static str,
}

impl FieldMetadata {
    const fn new(
        description: &'static str,
        env_var: &'static str,
        toml_key: &'static str,
        section: &'static str,
    ) -> Self {
        Self {
            description,
            env_var,
            toml_key,
            section,
        }
    }
}

fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField(format!(
            "missing {}: set {} or add {} to [{}] in berth.toml",
            metadata.description, metadata.env_var, metadata.toml_key, metadata.section
        )));
    }
    Ok(())
}

impl HetznerConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("berth")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values via environment variables or
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_field(
            &self.token,
            &FieldMetadata::new("Hetzner API token", "HCLOUD_TOKEN", "token", "hetzner"),
        )?;
        require_field(
            &self.key_name,
            &FieldMetadata::new(
                "SSH key display name",
                "HCLOUD_KEY_NAME",
                "key_name",
                "hetzner",
            ),
        )?;
        Ok(())
    }
}

impl SessionConfig {
    /// Loads configuration without attempting to parse CLI arguments. Values
    /// merge defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("berth")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Performs semantic validation on required fields. Error messages include
    /// guidance on how to provide missing values via environment variables or
    /// configuration files.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is empty
    /// and [`ConfigError::InvalidPort`] when the port is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_field(
            &self.host,
            &FieldMetadata::new("remote host", "BERTH_SESSION_HOST", "host", "session"),
        )?;
        require_field(
            &self.user,
            &FieldMetadata::new("remote user name", "BERTH_SESSION_USER", "user", "session"),
        )?;
        require_field(
            &self.key_file,
            &FieldMetadata::new(
                "SSH key file path",
                "BERTH_SESSION_KEY_FILE",
                "key_file",
                "session",
            ),
        )?;
        require_field(
            &self.ssh_bin,
            &FieldMetadata::new(
                "ssh executable path",
                "BERTH_SESSION_SSH_BIN",
                "ssh_bin",
                "session",
            ),
        )?;
        if self.port == 0 {
            return Err(ConfigError::InvalidPort);
        }
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Indicates the session port is zero, which cannot be connected to.
    #[error("invalid session port: port must be greater than zero")]
    InvalidPort,
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
