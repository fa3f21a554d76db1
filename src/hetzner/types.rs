//! Wire types for the Hetzner Cloud API.

use serde::{Deserialize, Serialize};

use crate::provider::{Datacentre, DatacentreCatalogue};

/// Response body of `GET /datacenters`.
#[derive(Debug, Deserialize)]
pub(crate) struct DatacentresResponse {
    #[serde(rename = "datacenters")]
    pub(crate) datacentres: Vec<DatacentreEntry>,
    pub(crate) recommendation: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DatacentreEntry {
    pub(crate) id: u64,
    pub(crate) name: String,
    pub(crate) location: LocationEntry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LocationEntry {
    pub(crate) description: String,
}

impl DatacentresResponse {
    /// Flattens the wire representation into the catalogue model.
    pub(crate) fn into_catalogue(self) -> DatacentreCatalogue {
        let entries = self
            .datacentres
            .into_iter()
            .map(|entry| Datacentre {
                id: entry.id,
                name: entry.name,
                location: entry.location.description,
            })
            .collect();
        DatacentreCatalogue::new(entries, self.recommendation)
    }
}

/// Response body of one `GET /ssh_keys` page.
#[derive(Debug, Deserialize)]
pub(crate) struct SshKeysResponse {
    pub(crate) ssh_keys: Vec<SshKeyEntry>,
    pub(crate) meta: Meta,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SshKeyEntry {
    pub(crate) fingerprint: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Meta {
    pub(crate) pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Pagination {
    pub(crate) next_page: Option<u64>,
}

/// Request body of `POST /ssh_keys`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateSshKeyRequest<'a> {
    pub(crate) name: &'a str,
    pub(crate) public_key: &'a str,
}

/// Error envelope returned by the API on failure responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorEnvelope {
    pub(crate) error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub(crate) code: String,
    pub(crate) message: String,
}
