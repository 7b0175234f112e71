use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

/// Application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Environment (dev, staging, prod)
    #[serde(default = "default_environment")]
    pub environment: String,

    /// CORS allowed origins, comma separated
    pub cors_origins: Option<String>,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// JWT signing secret
    #[serde(default = "default_secret_key")]
    pub secret_key: String,

    /// Database URL; the in-memory store is used when absent
    pub db_url: Option<String>,

    #[serde(default = "default_db_max_connections")]
    pub db_max_connections: u32,

    /// Lifetime of issued tokens
    #[serde(default = "default_token_ttl_hours")]
    pub token_ttl_hours: u64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,
}

impl Config {
    /// Load configuration from environment variables or app.env file
    pub fn load() -> Result<Self, ConfigError> {
        // Try to load from app.env file first
        if std::path::Path::new("app.env").exists() {
            dotenvy::from_filename("app.env").ok();
        } else {
            // Fallback to .env file
            dotenvy::dotenv().ok();
        }

        match envy::from_env::<Config>() {
            Ok(config) => {
                info!("✅ Configuration loaded successfully");
                if config.secret_key == default_secret_key() {
                    warn!("SECRET_KEY not set, tokens are signed with the default secret");
                }
                Ok(config)
            }
            Err(e) => {
                error!("❌ Failed to load configuration: {}", e);
                Err(ConfigError::EnvError(e))
            }
        }
    }

    /// Get the full server address
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Allowed CORS origins; empty means any origin
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Check if running in development mode
    pub fn is_development(&self) -> bool {
        self.environment.to_lowercase() == "dev" || self.environment.to_lowercase() == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            cors_origins: None,
            service_name: default_service_name(),
            secret_key: default_secret_key(),
            db_url: None,
            db_max_connections: default_db_max_connections(),
            token_ttl_hours: default_token_ttl_hours(),
            bcrypt_cost: default_bcrypt_cost(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EnvError(envy::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EnvError(e) => write!(f, "Environment variable error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_service_name() -> String {
    "interesthings-api".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

fn default_secret_key() -> String {
    "changeme".to_string()
}

fn default_db_max_connections() -> u32 {
    20
}

fn default_token_ttl_hours() -> u64 {
    7 * 24
}

fn default_bcrypt_cost() -> u32 {
    10
}
