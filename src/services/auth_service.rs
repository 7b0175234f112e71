use axum::http;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

// Get the auth token from a request
pub fn get_auth_token<B>(req: &http::Request<B>) -> Result<String, String> {
    // 1. Try to get token from Authorization header
    if let Some(auth_header) = req.headers().get(http::header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header".to_string())?;
        auth_str
            .strip_prefix("Bearer ")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or_else(|| "Authorization header is not a bearer token".to_string())
    }
    // 2. Try to get token from cookies
    else {
        let cookie_header = req
            .headers()
            .get(http::header::COOKIE)
            .ok_or_else(|| "Missing Authorization header or Cookie".to_string())?
            .to_str()
            .map_err(|_| "Invalid Cookie header".to_string())?;

        for c in cookie::Cookie::split_parse(cookie_header).flatten() {
            if c.name() == "auth_token" {
                return Ok(c.value().to_string());
            }
        }
        Err("auth_token cookie not found".to_string())
    }
}

// Issue a signed token for a user
pub fn issue_jwt(user_id: &str, secret: &str, ttl_hours: u64) -> Result<String, jsonwebtoken::errors::Error> {
    let ttl_secs = i64::try_from(ttl_hours.saturating_mul(3600)).unwrap_or(i64::MAX);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: Utc::now().timestamp().saturating_add(ttl_secs),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
}

// Validate a JWT token and return the token data
pub fn validate_jwt(token: &str, secret: &str) -> Result<TokenData<Claims>, jsonwebtoken::errors::Error> {
    let validation = Validation::new(Algorithm::HS256);
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &validation)
}

// Hash a password off the async runtime
pub async fn hash_password(password: String, cost: u32) -> Result<String, String> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| format!("Password hashing task failed: {}", e))?
        .map_err(|e| {
            error!("Failed to hash password: {}", e);
            format!("Failed to hash password: {}", e)
        })
}

// Check a password against a stored hash; malformed hashes never match
pub async fn verify_password(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || bcrypt::verify(&password, &hash).unwrap_or(false))
        .await
        .unwrap_or(false)
}
