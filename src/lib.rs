//! Core library for the Berth provisioning tool.
//!
//! The crate reconciles local SSH key material with a Hetzner Cloud account
//! (resolve or generate a key → select a datacentre → register the public
//! key) and hands the provisioned identity to an SSH session against the
//! configured server.

pub mod config;
pub mod config_store;
pub mod hetzner;
pub mod keygen;
pub mod keystore;
pub mod prompt;
pub mod provider;
pub mod provision;
pub mod registrar;
pub mod selector;
pub mod session;
pub mod test_support;
pub mod util;

pub use config::{ConfigError, HetznerConfig, SessionConfig};
pub use config_store::{ConfigStore, ConfigStoreError};
pub use hetzner::{HetznerApi, HetznerApiError};
pub use keygen::{KeyGenError, run_wizard};
pub use keystore::{KeyIdentity, KeyStore, KeyStoreError};
pub use prompt::{ConsolePrompter, PromptError, Prompter, is_affirmative};
pub use provider::{
    CatalogueError, CloudProvider, Datacentre, DatacentreCatalogue, ProviderFuture,
};
pub use provision::{
    ProvisionError, ProvisionOutcome, ProvisionedEnvironment, ProvisioningOrchestrator,
};
pub use registrar::{Registration, RegistrarError, ensure_registered};
pub use selector::{Selection, SelectionError, select_datacentre};
pub use session::{
    CommandOutput, CommandRunner, ProcessCommandRunner, SessionClient, SessionError,
};
pub use util::expand_tilde;
