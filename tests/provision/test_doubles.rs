//! Test doubles for the provisioning orchestrator.
//!
//! Provides a scripted provider that serves a fixed catalogue and
//! fingerprint list, records registration attempts, and allows controlled
//! failures for the catalogue, listing, and registration phases.

use std::sync::{Arc, Mutex, MutexGuard};

use berth::provider::ProviderFuture;
use berth::{CloudProvider, DatacentreCatalogue};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct ScriptedProvider {
    state: Arc<Mutex<State>>,
}

#[derive(Debug, Default)]
struct State {
    catalogue: DatacentreCatalogue,
    fingerprints: Vec<String>,
    fail_on_fetch: bool,
    fail_on_list: bool,
    fail_on_register: bool,
    fetch_calls: u32,
    register_calls: u32,
    registered: Vec<RegisteredKey>,
}

/// Record of one successful `register_key` call.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegisteredKey {
    pub display_name: String,
    pub public_key: String,
}

impl ScriptedProvider {
    pub fn new(catalogue: DatacentreCatalogue) -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                catalogue,
                ..State::default()
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|err| panic!("scripted provider lock poisoned: {err}"))
    }

    pub fn seed_fingerprint(&self, fingerprint: &str) {
        self.lock().fingerprints.push(fingerprint.to_owned());
    }

    pub fn fail_on_fetch(&self) {
        self.lock().fail_on_fetch = true;
    }

    pub fn fail_on_list(&self) {
        self.lock().fail_on_list = true;
    }

    pub fn fail_on_register(&self) {
        self.lock().fail_on_register = true;
    }

    pub fn fetch_calls(&self) -> u32 {
        self.lock().fetch_calls
    }

    pub fn register_calls(&self) -> u32 {
        self.lock().register_calls
    }

    pub fn registered_keys(&self) -> Vec<RegisteredKey> {
        self.lock().registered.clone()
    }
}

#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ScriptedProviderError {
    #[error("catalogue fetch failure")]
    Fetch,
    #[error("fingerprint list failure")]
    List,
    #[error("registration failure")]
    Register,
}

impl CloudProvider for ScriptedProvider {
    type Error = ScriptedProviderError;

    fn fetch_datacentres(&self) -> ProviderFuture<'_, DatacentreCatalogue, Self::Error> {
        Box::pin(async move {
            let mut state = self.lock();
            state.fetch_calls += 1;
            if state.fail_on_fetch {
                Err(ScriptedProviderError::Fetch)
            } else {
                Ok(state.catalogue.clone())
            }
        })
    }

    fn list_key_fingerprints(&self) -> ProviderFuture<'_, Vec<String>, Self::Error> {
        Box::pin(async move {
            let state = self.lock();
            if state.fail_on_list {
                Err(ScriptedProviderError::List)
            } else {
                Ok(state.fingerprints.clone())
            }
        })
    }

    fn register_key<'a>(
        &'a self,
        display_name: &'a str,
        public_key: &'a str,
    ) -> ProviderFuture<'a, (), Self::Error> {
        Box::pin(async move {
            let mut state = self.lock();
            state.register_calls += 1;
            if state.fail_on_register {
                return Err(ScriptedProviderError::Register);
            }
            state.registered.push(RegisteredKey {
                display_name: display_name.to_owned(),
                public_key: public_key.to_owned(),
            });
            Ok(())
        })
    }
}
