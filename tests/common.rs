#![allow(dead_code)]

use interesthings::config::Config;
use interesthings::db::MemStore;
use interesthings::AppState;
use std::sync::Arc;

pub fn test_config() -> Config {
    Config {
        secret_key: "integration-test-secret".to_string(),
        bcrypt_cost: 4,
        ..Config::default()
    }
}

/// Application state over a fresh in-memory store
pub fn test_state() -> (AppState, Arc<MemStore>) {
    let store = Arc::new(MemStore::new());
    let state = AppState::new(store.clone(), test_config());
    (state, store)
}
