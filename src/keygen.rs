//! Interactive key-pair generation wizard.
//!
//! When no local key exists the wizard asks for consent, asks where to save
//! the pair, then generates an Ed25519 key-pair and writes both halves to
//! disk. A declined consent is a terminal user choice, not a failure: the
//! caller halts gracefully and points the operator at `ssh-keygen` instead.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs::Permissions;
use cap_std::{ambient_authority, fs_utf8::Dir};
use ssh_key::rand_core::OsRng;
use ssh_key::{Algorithm, LineEnding, PrivateKey};
use std::os::unix::fs::PermissionsExt;
use thiserror::Error;

use crate::prompt::{PromptError, Prompter, is_affirmative};
use crate::util::{expand_tilde, split_parent};

const PRIVATE_KEY_MODE: u32 = 0o600;
const PUBLIC_KEY_SUFFIX: &str = ".pub";

/// Errors raised by the key generation wizard.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum KeyGenError {
    /// Raised when the operator declines key generation. Terminal for the
    /// run, but not a failure.
    #[error("user declined key-pair generation")]
    Declined,
    /// Raised when the console conversation itself fails.
    #[error(transparent)]
    Prompt(#[from] PromptError),
    /// Raised when generating or persisting the key-pair fails. The caller
    /// must not assume any usable key exists afterwards.
    #[error("failed to generate key-pair at {path}: {message}")]
    Generation {
        /// Path the wizard attempted to write.
        path: Utf8PathBuf,
        /// Underlying error string.
        message: String,
    },
}

/// Runs the consent → path → generate conversation.
///
/// Returns the path the new private key was written to; the public half
/// lands next to it with a `.pub` suffix. An empty path response falls back
/// to `default_path`.
///
/// # Errors
///
/// Returns [`KeyGenError::Declined`] when consent is refused,
/// [`KeyGenError::Prompt`] when console I/O fails, and
/// [`KeyGenError::Generation`] when the pair cannot be produced or written.
pub fn run_wizard<P: Prompter>(
    prompter: &P,
    default_path: &str,
) -> Result<Utf8PathBuf, KeyGenError> {
    let consent = prompter.read_line("Would you like to generate a pair? [Y/n] ")?;
    if !is_affirmative(&consent) {
        return Err(KeyGenError::Declined);
    }

    let response =
        prompter.read_line(&format!("Enter file in which to save the key ({default_path}): "))?;
    let chosen = response.trim();
    let path = if chosen.is_empty() {
        Utf8PathBuf::from(expand_tilde(default_path))
    } else {
        Utf8PathBuf::from(expand_tilde(chosen))
    };

    generate_key_pair(&path)?;
    Ok(path)
}

/// Generates an Ed25519 pair and writes both halves, private first with
/// owner-only permissions.
fn generate_key_pair(path: &Utf8Path) -> Result<(), KeyGenError> {
    let private_key = PrivateKey::random(&mut OsRng, Algorithm::Ed25519)
        .map_err(|err| generation_error(path, &err))?;
    let private_material = private_key
        .to_openssh(LineEnding::LF)
        .map_err(|err| generation_error(path, &err))?;
    let public_material = private_key
        .public_key()
        .to_openssh()
        .map_err(|err| generation_error(path, &err))?;

    write_key_files(path, &private_material, &public_material)
}

fn write_key_files(
    path: &Utf8Path,
    private_material: &str,
    public_material: &str,
) -> Result<(), KeyGenError> {
    let (dir_path, file_name) = split_parent(path).ok_or_else(|| KeyGenError::Generation {
        path: path.to_path_buf(),
        message: String::from("path has no file name"),
    })?;

    Dir::create_ambient_dir_all(dir_path, ambient_authority())
        .map_err(|err| generation_error(path, &err))?;
    let dir = Dir::open_ambient_dir(dir_path, ambient_authority())
        .map_err(|err| generation_error(path, &err))?;

    dir.write(file_name, private_material)
        .map_err(|err| generation_error(path, &err))?;
    dir.set_permissions(
        file_name,
        Permissions::from_std(std::fs::Permissions::from_mode(PRIVATE_KEY_MODE)),
    )
    .map_err(|err| generation_error(path, &err))?;

    let public_name = format!("{file_name}{PUBLIC_KEY_SUFFIX}");
    dir.write(&public_name, format!("{public_material}\n"))
        .map_err(|err| generation_error(path, &err))?;
    Ok(())
}

fn generation_error(path: &Utf8Path, err: &dyn std::fmt::Display) -> KeyGenError {
    KeyGenError::Generation {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::ScriptedPrompter;
    use tempfile::TempDir;

    fn temp_key_path(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::from_path_buf(tmp.path().join("keys").join("id_ed25519"))
            .expect("utf8 temp path")
    }

    #[test]
    fn declined_consent_stops_before_any_write() {
        let tmp = TempDir::new().expect("tempdir");
        let path = temp_key_path(&tmp);
        let prompter = ScriptedPrompter::with_responses(["n"]);

        let err = run_wizard(&prompter, path.as_str()).expect_err("declined wizard");
        assert_eq!(err, KeyGenError::Declined);
        assert!(!path.as_std_path().exists(), "no key should be written");
    }

    #[test]
    fn empty_path_response_uses_default() {
        let tmp = TempDir::new().expect("tempdir");
        let path = temp_key_path(&tmp);
        let prompter = ScriptedPrompter::with_responses(["", ""]);

        let written = run_wizard(&prompter, path.as_str()).expect("wizard should succeed");
        assert_eq!(written, path);
        assert!(path.as_std_path().exists(), "private key file missing");
    }

    #[test]
    fn generated_pair_round_trips_through_parser() {
        let tmp = TempDir::new().expect("tempdir");
        let path = temp_key_path(&tmp);
        let prompter = ScriptedPrompter::with_responses(["y", path.as_str()]);

        let written = run_wizard(&prompter, "unused-default").expect("wizard should succeed");

        let private = std::fs::read_to_string(written.as_std_path()).expect("read private key");
        PrivateKey::from_openssh(&private).expect("generated key should parse");

        let public_path = format!("{written}{PUBLIC_KEY_SUFFIX}");
        let public = std::fs::read_to_string(&public_path).expect("read public key");
        assert!(
            public.starts_with("ssh-ed25519 "),
            "unexpected public material: {public}"
        );
        assert!(public.ends_with('\n'), "public key should end with newline");
    }

    #[test]
    fn private_key_file_is_owner_only() {
        let tmp = TempDir::new().expect("tempdir");
        let path = temp_key_path(&tmp);
        let prompter = ScriptedPrompter::with_responses(["Y", ""]);

        let written = run_wizard(&prompter, path.as_str()).expect("wizard should succeed");

        let metadata = std::fs::metadata(written.as_std_path()).expect("stat private key");
        assert_eq!(metadata.permissions().mode() & 0o777, PRIVATE_KEY_MODE);
    }

    #[test]
    fn exhausted_input_surfaces_prompt_error() {
        let prompter = ScriptedPrompter::new();

        let err = run_wizard(&prompter, "anywhere").expect_err("no input scripted");
        assert_eq!(err, KeyGenError::Prompt(PromptError::Closed));
    }
}
