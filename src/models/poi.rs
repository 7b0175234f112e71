use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

pub const DEFAULT_PAGE_SIZE: u32 = 100;
pub const MAX_PAGE_SIZE: u32 = 100;

/// GeoJSON point: `[longitude, latitude]` with an optional altitude
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<f64>,
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: "Point".to_string(),
            coordinates: vec![longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }

    pub fn altitude(&self) -> Option<f64> {
        self.coordinates.get(2).copied()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.kind != "Point" {
            return Err(format!("Unsupported geometry type '{}'", self.kind));
        }
        let c = &self.coordinates;
        let valid = (2..=3).contains(&c.len())
            && (-180.0..=180.0).contains(&c[0])
            && (-90.0..=90.0).contains(&c[1]);
        if !valid {
            return Err(format!(
                "{:?} is not a valid longitude/latitude(/altitude) coordinates array",
                c
            ));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Art,
    Funny,
    #[serde(rename = "WTF!")]
    Wtf,
    Spots,
    Shortcuts,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Art => "Art",
            Category::Funny => "Funny",
            Category::Wtf => "WTF!",
            Category::Spots => "Spots",
            Category::Shortcuts => "Shortcuts",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Art" => Ok(Category::Art),
            "Funny" => Ok(Category::Funny),
            "WTF!" => Ok(Category::Wtf),
            "Spots" => Ok(Category::Spots),
            "Shortcuts" => Ok(Category::Shortcuts),
            other => Err(format!("Unknown category '{}'", other)),
        }
    }
}

/// Point of interest
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub id: Uuid,
    pub posted_by: Uuid,
    pub pos: GeoPoint,
    pub photos: Vec<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub date_add: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub categorie: Option<Category>,
}

/// POI with the average of its ratings
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PoiSummary {
    #[serde(flatten)]
    pub poi: Poi,
    pub average_rating: Option<f64>,
}

/// Page of POIs sorted by average rating
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PoiPage {
    pub page: u32,
    pub page_size: u32,
    pub total: u64,
    pub data: Vec<PoiSummary>,
}

/// Raw pagination parameters; anything unusable falls back to the defaults
#[derive(Deserialize, IntoParams, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PoiPageQuery {
    pub page: Option<String>,
    pub page_size: Option<String>,
}

impl PoiPageQuery {
    pub fn page(&self) -> u32 {
        self.page
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(1)
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
            .as_deref()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|p| (1..=MAX_PAGE_SIZE).contains(p))
            .unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Request body for creating a POI
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct CreatePoiRequest {
    pub pos: GeoPoint,
    #[serde(default)]
    pub photos: Vec<String>,
    pub title: String,
    pub description: Option<String>,
    pub categorie: Option<Category>,
}

/// Request body for replacing the editable fields of a POI
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct ReplacePoiRequest {
    #[serde(default)]
    pub photos: Vec<String>,
    pub title: String,
    pub description: Option<String>,
    pub categorie: Option<Category>,
}

/// Request body for partially updating a POI
#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, Default)]
pub struct PatchPoiRequest {
    pub photos: Option<Vec<String>>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub categorie: Option<Category>,
    /// Rejected when present: the position cannot be changed
    #[schema(value_type = Option<Object>)]
    pub pos: Option<serde_json::Value>,
}

fn validate_title(title: &str) -> Result<(), String> {
    if title.trim().is_empty() {
        return Err("Title is required".to_string());
    }
    Ok(())
}

fn validate_description(description: Option<&str>) -> Result<(), String> {
    match description.map(|d| d.chars().count()) {
        Some(n) if n < 5 => Err("Description is too short".to_string()),
        Some(n) if n > 300 => Err("Description is too long".to_string()),
        _ => Ok(()),
    }
}

impl CreatePoiRequest {
    pub fn validate(&self) -> Result<(), String> {
        self.pos.validate()?;
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())
    }
}

impl ReplacePoiRequest {
    pub fn validate(&self) -> Result<(), String> {
        validate_title(&self.title)?;
        validate_description(self.description.as_deref())
    }
}

impl PatchPoiRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        validate_description(self.description.as_deref())
    }
}
