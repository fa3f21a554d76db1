//! Reconciles the local key identity against the provider's key registry.
//!
//! Registration is idempotent: presence is checked against a fresh
//! fingerprint listing on every call, and the public key is only uploaded
//! when its fingerprint is absent.

use thiserror::Error;

use crate::keystore::KeyIdentity;
use crate::provider::CloudProvider;

/// Outcome of reconciling a key with the provider's registry.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Registration {
    /// The fingerprint was already registered; nothing was uploaded.
    AlreadyPresent,
    /// The public key was uploaded under the configured display name.
    Registered,
}

/// Errors surfaced while reconciling key registration.
#[derive(Debug, Error)]
pub enum RegistrarError<ProviderError>
where
    ProviderError: std::error::Error + 'static,
{
    /// Raised when the provider's registered-key listing cannot be fetched.
    #[error("failed to list registered SSH keys: {0}")]
    List(#[source] ProviderError),
    /// Raised when uploading the public key fails.
    #[error("failed to register SSH key: {0}")]
    Register(#[source] ProviderError),
}

/// Ensures `identity` is registered with the provider.
///
/// # Errors
///
/// Returns [`RegistrarError::List`] when the fingerprint listing cannot be
/// fetched and [`RegistrarError::Register`] when the upload fails. An absent
/// fingerprint is not an error; it triggers the upload.
pub async fn ensure_registered<P: CloudProvider>(
    provider: &P,
    identity: &KeyIdentity,
    display_name: &str,
) -> Result<Registration, RegistrarError<P::Error>> {
    let fingerprints = provider
        .list_key_fingerprints()
        .await
        .map_err(RegistrarError::List)?;

    if fingerprints
        .iter()
        .any(|candidate| candidate == &identity.fingerprint)
    {
        return Ok(Registration::AlreadyPresent);
    }

    provider
        .register_key(display_name, &identity.public_key)
        .await
        .map_err(RegistrarError::Register)?;

    Ok(Registration::Registered)
}
