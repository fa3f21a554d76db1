//! Provider abstraction for datacentre discovery and SSH key registration.

use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// A single datacentre offered by the cloud provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Datacentre {
    /// Provider-assigned numeric identifier.
    pub id: u64,
    /// Short name used for selection (for example `fsn1-dc14`).
    pub name: String,
    /// Human-readable location description shown alongside the name.
    pub location: String,
}

/// Ordered datacentre listing plus the provider's optional recommendation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DatacentreCatalogue {
    entries: Vec<Datacentre>,
    recommendation: Option<u64>,
}

/// Errors raised by catalogue lookups.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum CatalogueError {
    /// Raised when no entry carries the requested name.
    #[error("datacentre '{name}' not found")]
    NameNotFound {
        /// Name that was looked up.
        name: String,
    },
    /// Raised when the provider's recommendation matches no catalogue entry.
    #[error("could not find recommended datacentre")]
    RecommendationMissing,
}

impl DatacentreCatalogue {
    /// Creates a catalogue from provider data.
    #[must_use]
    pub const fn new(entries: Vec<Datacentre>, recommendation: Option<u64>) -> Self {
        Self {
            entries,
            recommendation,
        }
    }

    /// Returns the catalogue entries in provider order.
    #[must_use]
    pub fn entries(&self) -> &[Datacentre] {
        &self.entries
    }

    /// Returns `true` when the provider reported no datacentres at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Finds an entry by exact, case-sensitive name.
    ///
    /// Names are expected to be unique but this is not enforced; when
    /// duplicates exist the first entry in catalogue order wins.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::NameNotFound`] when no entry matches.
    pub fn lookup_by_name(&self, name: &str) -> Result<&Datacentre, CatalogueError> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .ok_or_else(|| CatalogueError::NameNotFound {
                name: name.to_owned(),
            })
    }

    /// Finds the entry the provider recommends.
    ///
    /// A recommendation identifier that matches no entry is treated the same
    /// as an absent recommendation so callers can fall back to manual
    /// selection.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogueError::RecommendationMissing`] when the provider
    /// supplied no recommendation or the identifier matches no entry.
    pub fn lookup_recommended(&self) -> Result<&Datacentre, CatalogueError> {
        let id = self
            .recommendation
            .ok_or(CatalogueError::RecommendationMissing)?;
        self.entries
            .iter()
            .find(|entry| entry.id == id)
            .ok_or(CatalogueError::RecommendationMissing)
    }
}

/// Future returned by provider operations.
pub type ProviderFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Minimal interface implemented by cloud providers.
pub trait CloudProvider {
    /// Provider specific error type returned by each operation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fetches the datacentre catalogue and the provider's recommendation.
    fn fetch_datacentres(&self) -> ProviderFuture<'_, DatacentreCatalogue, Self::Error>;

    /// Lists the fingerprints of every SSH key registered on the account.
    fn list_key_fingerprints(&self) -> ProviderFuture<'_, Vec<String>, Self::Error>;

    /// Registers `public_key` (OpenSSH authorized-keys format) under
    /// `display_name`.
    fn register_key<'a>(
        &'a self,
        display_name: &'a str,
        public_key: &'a str,
    ) -> ProviderFuture<'a, (), Self::Error>;
}
