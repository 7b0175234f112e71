use axum::http::StatusCode;
use uuid::Uuid;

use crate::models::{ApiError, ErrorResponse};

/// Caller identified by a validated token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: Uuid,
}

pub fn is_owner(caller: &AuthUser, owner: Option<Uuid>) -> bool {
    owner == Some(caller.id)
}

/// Only the account holder may modify or delete their account
pub fn ensure_self(caller: &AuthUser, user_id: Uuid, action: &str) -> Result<(), ApiError> {
    if caller.id == user_id {
        return Ok(());
    }
    Err(ErrorResponse::reply(
        StatusCode::FORBIDDEN,
        format!("You are not allowed to {} this user", action),
    ))
}

/// Only the author of a resource may modify or delete it
pub fn ensure_owner(caller: &AuthUser, owner: Option<Uuid>, what: &str) -> Result<(), ApiError> {
    if is_owner(caller, owner) {
        return Ok(());
    }
    Err(ErrorResponse::reply(
        StatusCode::FORBIDDEN,
        format!("You must have created this {} to change it", what),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ownership_checks() {
        let caller = AuthUser { id: Uuid::new_v4() };
        let other = Uuid::new_v4();

        assert!(ensure_self(&caller, caller.id, "delete").is_ok());
        let (status, _) = ensure_self(&caller, other, "delete").unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);

        assert!(ensure_owner(&caller, Some(caller.id), "POI").is_ok());
        assert!(ensure_owner(&caller, Some(other), "POI").is_err());
        assert!(ensure_owner(&caller, None, "rating").is_err());
    }
}
