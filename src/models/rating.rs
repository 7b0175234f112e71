use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Rating left on a POI
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Rating {
    pub id: Uuid,
    pub posted_by: Option<Uuid>,
    pub poi: Option<Uuid>,
    pub value: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    pub date_add: DateTime<Utc>,
}

/// Request body for rating a POI
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct CreateRatingRequest {
    pub poi: Uuid,
    pub value: i32,
    pub comment: Option<String>,
}

impl CreateRatingRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !(1..=5).contains(&self.value) {
            return Err("Rating must be between 1 and 5".to_string());
        }
        match self.comment.as_ref().map(|c| c.chars().count()) {
            Some(n) if n < 5 => Err("Comment is too short".to_string()),
            Some(n) if n > 300 => Err("Comment is too long".to_string()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_and_comment_bounds() {
        let mut req = CreateRatingRequest {
            poi: Uuid::new_v4(),
            value: 5,
            comment: Some("Great spot".to_string()),
        };
        assert!(req.validate().is_ok());
        req.value = 0;
        assert!(req.validate().is_err());
        req.value = 6;
        assert!(req.validate().is_err());
        req.value = 1;
        req.comment = Some("meh".to_string());
        assert!(req.validate().is_err());
        req.comment = None;
        assert!(req.validate().is_ok());
    }
}
