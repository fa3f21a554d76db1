//! Orchestrates the end-to-end provisioning reconciliation flow.
//!
//! The workflow resolves a local SSH key (offering to generate one when it
//! is absent), selects a target datacentre from the provider's catalogue,
//! and ensures the key is registered with the provider. Each stage fully
//! completes before the next begins; unrecovered failures abort the run.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::keygen::{KeyGenError, run_wizard};
use crate::keystore::{KeyIdentity, KeyStore, KeyStoreError};
use crate::prompt::{PromptError, Prompter};
use crate::provider::CloudProvider;
use crate::registrar::{RegistrarError, Registration, ensure_registered};
use crate::selector::{Selection, SelectionError, select_datacentre};

/// Result of a completed provisioning run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ProvisionOutcome {
    /// Every stage completed; the environment is ready for a session.
    Ready(ProvisionedEnvironment),
    /// The user declined key generation; the run stops without error.
    Declined,
}

/// State assembled by a successful run, handed to the session layer.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProvisionedEnvironment {
    /// The resolved key identity.
    pub identity: KeyIdentity,
    /// Path of the private key backing `identity`. Differs from the
    /// configured path when the generation wizard chose another location.
    pub key_path: Utf8PathBuf,
    /// The chosen datacentre.
    pub selection: Selection,
    /// Whether the key was freshly registered or already present.
    pub registration: Registration,
}

/// Errors surfaced while provisioning.
#[derive(Debug, Error)]
pub enum ProvisionError<ProviderError>
where
    ProviderError: std::error::Error + 'static,
{
    /// Raised when the configured key exists but cannot be read or parsed.
    #[error("failed to load SSH key: {0}")]
    KeyStore(#[source] KeyStoreError),
    /// Raised when the key generation wizard fails after consent was given.
    #[error("key generation wizard failed: {0}")]
    KeyGen(#[source] KeyGenError),
    /// Raised when a freshly generated key cannot be loaded back. This is
    /// an internal inconsistency rather than an expected I/O failure.
    #[error("freshly generated key at {path} failed to load: {source}")]
    FreshKeyUnreadable {
        /// Location the wizard reported writing the key to.
        path: Utf8PathBuf,
        /// Underlying load failure.
        #[source]
        source: KeyStoreError,
    },
    /// Raised when the datacentre catalogue cannot be fetched.
    #[error("failed to fetch datacentre catalogue: {0}")]
    Catalogue(#[source] ProviderError),
    /// Raised when datacentre selection fails.
    #[error("failed to select datacentre: {0}")]
    Selection(#[source] SelectionError),
    /// Raised when key registration cannot be reconciled.
    #[error("failed to reconcile SSH key registration: {0}")]
    Registration(#[source] RegistrarError<ProviderError>),
    /// Raised when an interactive prompt fails between stages.
    #[error("interactive prompt failed: {0}")]
    Prompt(#[from] PromptError),
}

/// Drives the provisioning workflow against a provider and a prompt.
#[derive(Debug)]
pub struct ProvisioningOrchestrator<P, U> {
    provider: P,
    prompter: U,
}

enum KeyResolution {
    Ready {
        identity: KeyIdentity,
        path: Utf8PathBuf,
    },
    Declined,
}

impl<P, U> ProvisioningOrchestrator<P, U>
where
    P: CloudProvider,
    U: Prompter,
{
    /// Creates a new orchestrator.
    #[must_use]
    pub const fn new(provider: P, prompter: U) -> Self {
        Self { provider, prompter }
    }

    /// Runs the full reconciliation flow.
    ///
    /// Resolves the key at `key_store`, invoking the generation wizard when
    /// no key exists, then selects a datacentre and ensures the key is
    /// registered under `display_name`.
    ///
    /// # Errors
    ///
    /// Returns [`ProvisionError`] when any stage fails beyond the handled
    /// absence cases. A declined wizard is not an error; it yields
    /// [`ProvisionOutcome::Declined`].
    pub async fn ensure_ready(
        &self,
        key_store: &KeyStore,
        display_name: &str,
    ) -> Result<ProvisionOutcome, ProvisionError<P::Error>> {
        let (identity, key_path) = match self.resolve_or_provision(key_store)? {
            KeyResolution::Ready { identity, path } => (identity, path),
            KeyResolution::Declined => return Ok(ProvisionOutcome::Declined),
        };

        let catalogue = self
            .provider
            .fetch_datacentres()
            .await
            .map_err(ProvisionError::Catalogue)?;
        let selection =
            select_datacentre(&self.prompter, &catalogue).map_err(ProvisionError::Selection)?;

        let registration = ensure_registered(&self.provider, &identity, display_name)
            .await
            .map_err(ProvisionError::Registration)?;
        self.announce_registration(registration, &identity)?;

        Ok(ProvisionOutcome::Ready(ProvisionedEnvironment {
            identity,
            key_path,
            selection,
            registration,
        }))
    }

    fn resolve_or_provision(
        &self,
        key_store: &KeyStore,
    ) -> Result<KeyResolution, ProvisionError<P::Error>> {
        match key_store.resolve() {
            Ok(identity) => Ok(KeyResolution::Ready {
                identity,
                path: key_store.path().to_owned(),
            }),
            Err(KeyStoreError::NotFound { .. }) => self.provision_fresh_key(key_store),
            Err(err) => Err(ProvisionError::KeyStore(err)),
        }
    }

    fn provision_fresh_key(
        &self,
        key_store: &KeyStore,
    ) -> Result<KeyResolution, ProvisionError<P::Error>> {
        self.prompter.inform("failed to find SSH key")?;

        let path = match run_wizard(&self.prompter, key_store.path().as_str()) {
            Ok(path) => path,
            Err(KeyGenError::Declined) => return Ok(KeyResolution::Declined),
            Err(err) => return Err(ProvisionError::KeyGen(err)),
        };
        self.prompter
            .inform(&format!("Successfully generated key \"{path}\""))?;

        // The wizard may have written somewhere other than the configured
        // path, so load from the path it reported.
        let fresh_store = KeyStore::new(path.as_str());
        let identity = fresh_store
            .resolve()
            .map_err(|source| ProvisionError::FreshKeyUnreadable {
                path: path.clone(),
                source,
            })?;

        Ok(KeyResolution::Ready { identity, path })
    }

    fn announce_registration(
        &self,
        registration: Registration,
        identity: &KeyIdentity,
    ) -> Result<(), PromptError> {
        match registration {
            Registration::AlreadyPresent => {
                self.prompter.inform("SSH public-key present on Hetzner")
            }
            Registration::Registered => {
                self.prompter.inform("Public key not present on Hetzner")?;
                self.prompter.inform(&format!(
                    "Successfully uploaded key \"{}\"",
                    identity.fingerprint
                ))
            }
        }
    }
}
