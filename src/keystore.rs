//! Local SSH key resolution.
//!
//! The key store answers one question for the provisioning workflow: does a
//! usable key-pair exist at the configured path? A missing file is a distinct,
//! recoverable outcome (the generation wizard can run); an unreadable or
//! corrupt file is fatal. Successful resolution yields a [`KeyIdentity`]
//! carrying the public half and its fingerprint in the format the provider
//! reports for registered keys.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use md5::{Digest, Md5};
use ssh_key::{PrivateKey, PublicKey};
use thiserror::Error;

use crate::util::{expand_tilde, split_parent};

/// Reference to a resolved key-pair, valid for one provisioning run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct KeyIdentity {
    /// Public key in OpenSSH authorized-keys format (`ssh-ed25519 AAAA…`).
    pub public_key: String,
    /// Legacy MD5 colon-hex fingerprint of the public key's wire encoding.
    pub fingerprint: String,
}

/// Errors raised while resolving the local key-pair.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum KeyStoreError {
    /// Raised when no key material exists at the configured path. Recoverable:
    /// the generation wizard can create one.
    #[error("no private key found at {path}")]
    NotFound {
        /// Path that was probed.
        path: Utf8PathBuf,
    },
    /// Raised when the key file exists but cannot be read.
    #[error("failed to read private key {path}: {message}")]
    Io {
        /// Path that could not be read.
        path: Utf8PathBuf,
        /// Operating system error string.
        message: String,
    },
    /// Raised when key material is present but does not parse.
    #[error("failed to parse private key {path}: {message}")]
    Parse {
        /// Path that held the malformed material.
        path: Utf8PathBuf,
        /// Parser error string.
        message: String,
    },
}

/// Resolves the key-pair stored at a fixed filesystem location.
#[derive(Clone, Debug)]
pub struct KeyStore {
    path: Utf8PathBuf,
}

impl KeyStore {
    /// Creates a store for `path`, expanding a leading `~/`.
    #[must_use]
    pub fn new(path: &str) -> Self {
        Self {
            path: Utf8PathBuf::from(expand_tilde(path)),
        }
    }

    /// Returns the resolved private-key path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Reads and parses the private key, deriving the public identity.
    ///
    /// # Errors
    ///
    /// Returns [`KeyStoreError::NotFound`] when no file exists at the path,
    /// [`KeyStoreError::Io`] when the file cannot be read, and
    /// [`KeyStoreError::Parse`] when the material does not parse as an
    /// OpenSSH private key.
    pub fn resolve(&self) -> Result<KeyIdentity, KeyStoreError> {
        let contents = self.read_key_material()?;
        let private_key =
            PrivateKey::from_openssh(&contents).map_err(|err| KeyStoreError::Parse {
                path: self.path.clone(),
                message: err.to_string(),
            })?;
        identity_for(private_key.public_key()).map_err(|err| KeyStoreError::Parse {
            path: self.path.clone(),
            message: err.to_string(),
        })
    }

    fn read_key_material(&self) -> Result<String, KeyStoreError> {
        let (dir_path, file_name) = split_parent(&self.path).ok_or_else(|| KeyStoreError::Io {
            path: self.path.clone(),
            message: String::from("path has no file name"),
        })?;

        let dir = match Dir::open_ambient_dir(dir_path, ambient_authority()) {
            Ok(dir) => dir,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(KeyStoreError::NotFound {
                    path: self.path.clone(),
                });
            }
            Err(err) => {
                return Err(KeyStoreError::Io {
                    path: self.path.clone(),
                    message: err.to_string(),
                });
            }
        };

        match dir.read_to_string(file_name) {
            Ok(contents) => Ok(contents),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(KeyStoreError::NotFound {
                    path: self.path.clone(),
                })
            }
            Err(err) => Err(KeyStoreError::Io {
                path: self.path.clone(),
                message: err.to_string(),
            }),
        }
    }
}

/// Derives the [`KeyIdentity`] for a public key.
pub(crate) fn identity_for(public_key: &PublicKey) -> Result<KeyIdentity, ssh_key::Error> {
    Ok(KeyIdentity {
        public_key: public_key.to_openssh()?,
        fingerprint: md5_fingerprint(public_key)?,
    })
}

/// Computes the legacy MD5 fingerprint (`aa:bb:…`) over the key's wire
/// encoding. This matches the format the provider stores for registered keys,
/// so it doubles as the lookup token during registration.
pub(crate) fn md5_fingerprint(public_key: &PublicKey) -> Result<String, ssh_key::Error> {
    let blob = public_key.to_bytes()?;
    let digest = Md5::digest(&blob);
    let rendered = digest
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect::<Vec<_>>()
        .join(":");
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ssh_key::rand_core::OsRng;
    use ssh_key::{Algorithm, LineEnding};
    use tempfile::TempDir;

    fn write_fresh_key(dir: &TempDir) -> Utf8PathBuf {
        let private_key =
            PrivateKey::random(&mut OsRng, Algorithm::Ed25519).expect("generate key");
        let rendered = private_key.to_openssh(LineEnding::LF).expect("encode key");
        let path = dir.path().join("id_ed25519");
        std::fs::write(&path, rendered.as_bytes()).expect("write key");
        Utf8PathBuf::from_path_buf(path).expect("utf8 temp path")
    }

    #[test]
    fn resolve_missing_file_reports_not_found() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("absent");
        let store = KeyStore::new(path.to_str().expect("utf8 temp path"));

        let err = store.resolve().expect_err("missing key should not resolve");
        assert!(matches!(err, KeyStoreError::NotFound { .. }), "got {err:?}");
    }

    #[test]
    fn resolve_missing_parent_directory_reports_not_found() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("no-such-dir").join("id_ed25519");
        let store = KeyStore::new(path.to_str().expect("utf8 temp path"));

        let err = store.resolve().expect_err("missing parent dir");
        assert!(matches!(err, KeyStoreError::NotFound { .. }), "got {err:?}");
    }

    #[test]
    fn resolve_corrupt_material_reports_parse_error() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp.path().join("garbage");
        std::fs::write(&path, "not a key").expect("write garbage");
        let store = KeyStore::new(path.to_str().expect("utf8 temp path"));

        let err = store.resolve().expect_err("garbage should not parse");
        assert!(matches!(err, KeyStoreError::Parse { .. }), "got {err:?}");
    }

    #[test]
    fn resolve_valid_key_yields_identity() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_fresh_key(&tmp);
        let store = KeyStore::new(path.as_str());

        let identity = store.resolve().expect("fresh key should resolve");
        assert!(
            identity.public_key.starts_with("ssh-ed25519 "),
            "unexpected public key: {}",
            identity.public_key
        );
        assert_md5_format(&identity.fingerprint);
    }

    #[test]
    fn fingerprint_is_deterministic() {
        let tmp = TempDir::new().expect("tempdir");
        let path = write_fresh_key(&tmp);
        let store = KeyStore::new(path.as_str());

        let first = store.resolve().expect("first resolve");
        let second = store.resolve().expect("second resolve");
        assert_eq!(first.fingerprint, second.fingerprint);
    }

    fn assert_md5_format(fingerprint: &str) {
        let groups: Vec<&str> = fingerprint.split(':').collect();
        assert_eq!(groups.len(), 16, "unexpected fingerprint: {fingerprint}");
        for group in groups {
            assert_eq!(group.len(), 2, "unexpected group in {fingerprint}");
            assert!(
                group.chars().all(|ch| ch.is_ascii_hexdigit()),
                "non-hex group in {fingerprint}"
            );
        }
    }
}
