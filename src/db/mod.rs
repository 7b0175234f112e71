pub mod memstore;
pub mod pgstore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{Category, GeoPoint, Poi, PoiSummary, Rating, User};

pub use memstore::MemStore;
pub use pgstore::PgStore;

/// Errors raised by the data store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("store returned an invalid count: {0}")]
    InvalidCount(i64),
}

/// Current cardinality of the three counted collections.
#[async_trait]
pub trait CountSource: Send + Sync {
    async fn count_users(&self) -> Result<u64, StoreError>;
    async fn count_pois(&self) -> Result<u64, StoreError>;
    async fn count_ratings(&self) -> Result<u64, StoreError>;
}

/// Stored user, including the password hash that never leaves the server.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub img_profil: Option<String>,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            id: record.id,
            username: record.username,
            email: record.email,
            img_profil: record.img_profil,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub img_profil: Option<String>,
}

/// Fields to overwrite on a user; `None` leaves the field untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub img_profil: Option<Option<String>>,
}

#[derive(Debug, Clone)]
pub struct NewPoi {
    pub posted_by: Uuid,
    pub pos: GeoPoint,
    pub photos: Vec<String>,
    pub title: String,
    pub description: Option<String>,
    pub categorie: Option<Category>,
}

/// Fields to overwrite on a POI; `None` leaves the field untouched.
/// The position is fixed at creation.
#[derive(Debug, Clone, Default)]
pub struct PoiChanges {
    pub photos: Option<Vec<String>>,
    pub title: Option<String>,
    pub description: Option<Option<String>>,
    pub categorie: Option<Option<Category>>,
}

#[derive(Debug, Clone)]
pub struct NewRating {
    pub posted_by: Option<Uuid>,
    pub poi: Option<Uuid>,
    pub value: i32,
    pub comment: Option<String>,
}

/// Persistence operations used by the REST layer.
#[async_trait]
pub trait Store: CountSource {
    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError>;
    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError>;
    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError>;
    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserRecord>, StoreError>;
    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError>;

    /// One page of POIs, best rated first, unrated last.
    async fn list_pois(&self, page: u32, page_size: u32) -> Result<Vec<PoiSummary>, StoreError>;
    async fn get_poi(&self, id: Uuid) -> Result<Option<Poi>, StoreError>;
    async fn get_poi_summary(&self, id: Uuid) -> Result<Option<PoiSummary>, StoreError>;
    async fn insert_poi(&self, poi: NewPoi) -> Result<Poi, StoreError>;
    async fn update_poi(&self, id: Uuid, changes: PoiChanges) -> Result<Option<Poi>, StoreError>;
    /// Deletes the POI together with its ratings.
    async fn delete_poi(&self, id: Uuid) -> Result<bool, StoreError>;

    /// All ratings, newest first.
    async fn list_ratings(&self) -> Result<Vec<Rating>, StoreError>;
    async fn get_rating(&self, id: Uuid) -> Result<Option<Rating>, StoreError>;
    async fn insert_rating(&self, rating: NewRating) -> Result<Rating, StoreError>;
    async fn delete_rating(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub(crate) fn now() -> DateTime<Utc> {
    Utc::now()
}

pub(crate) fn to_count(n: i64) -> Result<u64, StoreError> {
    u64::try_from(n).map_err(|_| StoreError::InvalidCount(n))
}
