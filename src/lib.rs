pub mod auth;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

pub use routes::build_app;
pub use state::AppState;
