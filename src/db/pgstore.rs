use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::Error as SqlxError;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::{
    to_count, CountSource, NewPoi, NewRating, NewUser, PoiChanges, Store, StoreError, UserChanges,
    UserRecord,
};
use crate::models::{Category, GeoPoint, Poi, PoiSummary, Rating};

const SCHEMA: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        img_profil TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS pois (
        id UUID PRIMARY KEY,
        posted_by UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
        longitude DOUBLE PRECISION NOT NULL,
        latitude DOUBLE PRECISION NOT NULL,
        altitude DOUBLE PRECISION,
        photos TEXT[] NOT NULL DEFAULT '{}',
        title TEXT NOT NULL,
        description TEXT,
        date_add TIMESTAMPTZ NOT NULL DEFAULT now(),
        categorie TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS ratings (
        id UUID PRIMARY KEY,
        posted_by UUID REFERENCES users(id) ON DELETE SET NULL,
        poi UUID REFERENCES pois(id) ON DELETE CASCADE,
        value INTEGER NOT NULL CHECK (value BETWEEN 1 AND 5),
        comment TEXT,
        date_add TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    "CREATE INDEX IF NOT EXISTS ratings_poi_idx ON ratings (poi)",
];

const POI_SUMMARY_SELECT: &str = r#"
    SELECT p.*, AVG(r.value)::float8 AS average_rating
    FROM pois p
        LEFT JOIN ratings r ON r.poi = p.id
"#;

/// POI row, optionally joined with its average rating
#[derive(Debug, Clone, sqlx::FromRow)]
struct PoiRow {
    id: Uuid,
    posted_by: Uuid,
    longitude: f64,
    latitude: f64,
    altitude: Option<f64>,
    photos: Vec<String>,
    title: String,
    description: Option<String>,
    date_add: DateTime<Utc>,
    categorie: Option<String>,
    #[sqlx(default)]
    average_rating: Option<f64>,
}

impl PoiRow {
    fn into_poi(self) -> Poi {
        let mut pos = GeoPoint::new(self.longitude, self.latitude);
        if let Some(altitude) = self.altitude {
            pos.coordinates.push(altitude);
        }
        let categorie = self.categorie.and_then(|c| match c.parse::<Category>() {
            Ok(category) => Some(category),
            Err(e) => {
                warn!("Ignoring stored category of POI {}: {}", self.id, e);
                None
            }
        });
        Poi {
            id: self.id,
            posted_by: self.posted_by,
            pos,
            photos: self.photos,
            title: self.title,
            description: self.description,
            date_add: self.date_add,
            categorie,
        }
    }

    fn into_summary(self) -> PoiSummary {
        let average_rating = self.average_rating;
        PoiSummary {
            poi: self.into_poi(),
            average_rating,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct RatingRow {
    id: Uuid,
    posted_by: Option<Uuid>,
    poi: Option<Uuid>,
    value: i32,
    comment: Option<String>,
    date_add: DateTime<Utc>,
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Rating {
            id: row.id,
            posted_by: row.posted_by,
            poi: row.poi,
            value: row.value,
            comment: row.comment,
            date_add: row.date_add,
        }
    }
}

/// Map unique-constraint violations to conflicts
fn map_write_error(e: SqlxError) -> StoreError {
    match &e {
        SqlxError::Database(db_err) if db_err.is_unique_violation() => {
            StoreError::Conflict(db_err.message().to_string())
        }
        _ => StoreError::Database(e),
    }
}

/// Postgres-backed store
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a new database connection pool
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    /// * `max_connections` - Upper bound of pooled connections
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, SqlxError> {
        info!("Connecting to database...");

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(2)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .max_lifetime(Duration::from_secs(1800))
            .connect(database_url)
            .await?;

        info!("Database connection pool created successfully");

        Ok(Self { pool })
    }

    /// Create the tables when they do not exist yet
    pub async fn ensure_schema(&self) -> Result<(), SqlxError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("Database schema is up to date");
        Ok(())
    }

    fn log_pool(&self, operation: &str) {
        let pool_idle = self.pool.num_idle() as u32;
        let pool_size = self.pool.size();
        debug!(
            "{}. Pool connections: {} idle, {} in use",
            operation,
            pool_idle,
            pool_size.saturating_sub(pool_idle)
        );
    }

    async fn count(&self, table: &str) -> Result<u64, StoreError> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        let n = sqlx::query_scalar::<_, i64>(&sql).fetch_one(&self.pool).await?;
        to_count(n)
    }
}

#[async_trait]
impl CountSource for PgStore {
    async fn count_users(&self) -> Result<u64, StoreError> {
        self.count("users").await
    }

    async fn count_pois(&self) -> Result<u64, StoreError> {
        self.count("pois").await
    }

    async fn count_ratings(&self) -> Result<u64, StoreError> {
        self.count("ratings").await
    }
}

#[async_trait]
impl Store for PgStore {
    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let users = sqlx::query_as::<_, UserRecord>("SELECT * FROM users ORDER BY username")
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        self.log_pool("Creating user");
        let query_sql = r#"
            INSERT INTO users (id, username, email, password_hash, img_profil)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
        "#;
        sqlx::query_as::<_, UserRecord>(query_sql)
            .bind(Uuid::new_v4())
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.img_profil)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserRecord>, StoreError> {
        self.log_pool("Updating user");
        let query_sql = r#"
            UPDATE users SET
                username = COALESCE($2, username),
                email = COALESCE($3, email),
                password_hash = COALESCE($4, password_hash),
                img_profil = CASE WHEN $5 THEN $6 ELSE img_profil END
            WHERE id = $1
            RETURNING *
        "#;
        let replace_img = changes.img_profil.is_some();
        sqlx::query_as::<_, UserRecord>(query_sql)
            .bind(id)
            .bind(changes.username)
            .bind(changes.email)
            .bind(changes.password_hash)
            .bind(replace_img)
            .bind(changes.img_profil.flatten())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        self.log_pool("Deleting user");
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_pois(&self, page: u32, page_size: u32) -> Result<Vec<PoiSummary>, StoreError> {
        let query_sql = format!(
            "{} GROUP BY p.id ORDER BY average_rating DESC NULLS LAST, p.date_add DESC LIMIT $1 OFFSET $2",
            POI_SUMMARY_SELECT
        );
        let offset = i64::from(page.saturating_sub(1)) * i64::from(page_size);
        let rows = sqlx::query_as::<_, PoiRow>(&query_sql)
            .bind(i64::from(page_size))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(PoiRow::into_summary).collect())
    }

    async fn get_poi(&self, id: Uuid) -> Result<Option<Poi>, StoreError> {
        let row = sqlx::query_as::<_, PoiRow>("SELECT * FROM pois WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PoiRow::into_poi))
    }

    async fn get_poi_summary(&self, id: Uuid) -> Result<Option<PoiSummary>, StoreError> {
        let query_sql = format!("{} WHERE p.id = $1 GROUP BY p.id", POI_SUMMARY_SELECT);
        let row = sqlx::query_as::<_, PoiRow>(&query_sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(PoiRow::into_summary))
    }

    async fn insert_poi(&self, poi: NewPoi) -> Result<Poi, StoreError> {
        self.log_pool("Creating POI");
        let query_sql = r#"
            INSERT INTO pois (id, posted_by, longitude, latitude, altitude, photos, title, description, categorie)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
        "#;
        let row = sqlx::query_as::<_, PoiRow>(query_sql)
            .bind(Uuid::new_v4())
            .bind(poi.posted_by)
            .bind(poi.pos.longitude())
            .bind(poi.pos.latitude())
            .bind(poi.pos.altitude())
            .bind(&poi.photos)
            .bind(&poi.title)
            .bind(&poi.description)
            .bind(poi.categorie.map(|c| c.as_str()))
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.into_poi())
    }

    async fn update_poi(&self, id: Uuid, changes: PoiChanges) -> Result<Option<Poi>, StoreError> {
        self.log_pool("Updating POI");
        let query_sql = r#"
            UPDATE pois SET
                photos = COALESCE($2, photos),
                title = COALESCE($3, title),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                categorie = CASE WHEN $6 THEN $7 ELSE categorie END
            WHERE id = $1
            RETURNING *
        "#;
        let replace_description = changes.description.is_some();
        let replace_categorie = changes.categorie.is_some();
        let row = sqlx::query_as::<_, PoiRow>(query_sql)
            .bind(id)
            .bind(changes.photos)
            .bind(changes.title)
            .bind(replace_description)
            .bind(changes.description.flatten())
            .bind(replace_categorie)
            .bind(changes.categorie.flatten().map(|c| c.as_str()))
            .fetch_optional(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.map(PoiRow::into_poi))
    }

    async fn delete_poi(&self, id: Uuid) -> Result<bool, StoreError> {
        self.log_pool("Deleting POI");

        let mut tx = match self.pool.begin().await {
            Ok(tx) => tx,
            Err(e) => {
                error!(
                    "Failed to acquire connection from pool for POI {}: {}. Pool state: {} idle, {} total",
                    id,
                    e,
                    self.pool.num_idle(),
                    self.pool.size()
                );
                return Err(e.into());
            }
        };

        sqlx::query("DELETE FROM ratings WHERE poi = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM pois WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_ratings(&self) -> Result<Vec<Rating>, StoreError> {
        let rows = sqlx::query_as::<_, RatingRow>("SELECT * FROM ratings ORDER BY date_add DESC")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Rating::from).collect())
    }

    async fn get_rating(&self, id: Uuid) -> Result<Option<Rating>, StoreError> {
        let row = sqlx::query_as::<_, RatingRow>("SELECT * FROM ratings WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Rating::from))
    }

    async fn insert_rating(&self, rating: NewRating) -> Result<Rating, StoreError> {
        self.log_pool("Creating rating");
        let query_sql = r#"
            INSERT INTO ratings (id, posted_by, poi, value, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
        "#;
        let row = sqlx::query_as::<_, RatingRow>(query_sql)
            .bind(Uuid::new_v4())
            .bind(rating.posted_by)
            .bind(rating.poi)
            .bind(rating.value)
            .bind(&rating.comment)
            .fetch_one(&self.pool)
            .await
            .map_err(map_write_error)?;
        Ok(row.into())
    }

    async fn delete_rating(&self, id: Uuid) -> Result<bool, StoreError> {
        self.log_pool("Deleting rating");
        let result = sqlx::query("DELETE FROM ratings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
