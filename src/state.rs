use std::sync::Arc;

use crate::config::Config;
use crate::dashboard::{ConnectionRegistry, Notifier};
use crate::db::Store;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub notifier: Notifier,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire a store into a fresh dashboard registry and notifier.
    pub fn new<S: Store + 'static>(store: Arc<S>, config: Config) -> Self {
        let notifier = Notifier::new(Arc::new(ConnectionRegistry::new()), store.clone());
        Self {
            store,
            notifier,
            config: Arc::new(config),
        }
    }
}
