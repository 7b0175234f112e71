use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Public view of a user account
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(rename = "imgProfil", skip_serializing_if = "Option::is_none")]
    pub img_profil: Option<String>,
}

/// Request body for creating or replacing a user
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct UserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(rename = "imgProfil", default)]
    pub img_profil: Option<String>,
}

/// Request body for partially updating a user
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
pub struct UserPatchRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    #[serde(rename = "imgProfil")]
    pub img_profil: Option<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct LoginResponse {
    pub token: String,
}

pub fn validate_username(username: &str) -> Result<(), String> {
    match username.chars().count() {
        n if n < 3 => Err("Username is too short".to_string()),
        n if n > 20 => Err("Username is too long".to_string()),
        _ => Ok(()),
    }
}

pub fn validate_email(email: &str) -> Result<(), String> {
    match email.chars().count() {
        n if n < 3 => Err("Email is too short".to_string()),
        n if n > 100 => Err("Email is too long".to_string()),
        _ => Ok(()),
    }
}

pub fn validate_password(password: &str) -> Result<(), String> {
    if password.is_empty() {
        return Err("Password is required".to_string());
    }
    Ok(())
}

impl UserRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_username(&self.username)?;
        validate_email(&self.email)?;
        validate_password(&self.password)
    }
}

impl UserPatchRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(username) = &self.username {
            validate_username(username)?;
        }
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        if let Some(password) = &self.password {
            validate_password(password)?;
        }
        Ok(())
    }
}
