use async_trait::async_trait;
use std::cmp::Ordering;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{
    now, CountSource, NewPoi, NewRating, NewUser, PoiChanges, Store, StoreError, UserChanges,
    UserRecord,
};
use crate::models::{Poi, PoiSummary, Rating};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, UserRecord>,
    pois: HashMap<Uuid, Poi>,
    ratings: HashMap<Uuid, Rating>,
}

impl Tables {
    fn summary(&self, poi: &Poi) -> PoiSummary {
        let values: Vec<f64> = self
            .ratings
            .values()
            .filter(|r| r.poi == Some(poi.id))
            .map(|r| r.value as f64)
            .collect();
        let average_rating = if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        };
        PoiSummary {
            poi: poi.clone(),
            average_rating,
        }
    }

    fn ensure_unique(&self, id: Option<Uuid>, username: &str, email: &str) -> Result<(), StoreError> {
        for user in self.users.values().filter(|u| Some(u.id) != id) {
            if user.username == username {
                return Err(StoreError::Conflict(format!("username '{}' is taken", username)));
            }
            if user.email == email {
                return Err(StoreError::Conflict(format!("email '{}' is taken", email)));
            }
        }
        Ok(())
    }

    fn remove_poi(&mut self, id: Uuid) -> bool {
        if self.pois.remove(&id).is_none() {
            return false;
        }
        self.ratings.retain(|_, r| r.poi != Some(id));
        true
    }
}

/// Process-local store, used when no database is configured
#[derive(Default)]
pub struct MemStore {
    tables: RwLock<Tables>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CountSource for MemStore {
    async fn count_users(&self) -> Result<u64, StoreError> {
        Ok(self.tables.read().await.users.len() as u64)
    }

    async fn count_pois(&self) -> Result<u64, StoreError> {
        Ok(self.tables.read().await.pois.len() as u64)
    }

    async fn count_ratings(&self) -> Result<u64, StoreError> {
        Ok(self.tables.read().await.ratings.len() as u64)
    }
}

#[async_trait]
impl Store for MemStore {
    async fn list_users(&self) -> Result<Vec<UserRecord>, StoreError> {
        let mut users: Vec<UserRecord> = self.tables.read().await.users.values().cloned().collect();
        users.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(users)
    }

    async fn get_user(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn insert_user(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let mut tables = self.tables.write().await;
        tables.ensure_unique(None, &user.username, &user.email)?;
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            img_profil: user.img_profil,
        };
        tables.users.insert(record.id, record.clone());
        debug!("User {} stored in memory", record.id);
        Ok(record)
    }

    async fn update_user(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserRecord>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(mut updated) = tables.users.get(&id).cloned() else {
            return Ok(None);
        };
        if let Some(username) = changes.username {
            updated.username = username;
        }
        if let Some(email) = changes.email {
            updated.email = email;
        }
        if let Some(password_hash) = changes.password_hash {
            updated.password_hash = password_hash;
        }
        if let Some(img_profil) = changes.img_profil {
            updated.img_profil = img_profil;
        }
        tables.ensure_unique(Some(id), &updated.username, &updated.email)?;
        tables.users.insert(id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete_user(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(false);
        }
        let owned: Vec<Uuid> = tables
            .pois
            .values()
            .filter(|p| p.posted_by == id)
            .map(|p| p.id)
            .collect();
        for poi_id in owned {
            tables.remove_poi(poi_id);
        }
        for rating in tables.ratings.values_mut() {
            if rating.posted_by == Some(id) {
                rating.posted_by = None;
            }
        }
        Ok(true)
    }

    async fn list_pois(&self, page: u32, page_size: u32) -> Result<Vec<PoiSummary>, StoreError> {
        let tables = self.tables.read().await;
        let mut summaries: Vec<PoiSummary> = tables.pois.values().map(|p| tables.summary(p)).collect();
        summaries.sort_by(|a, b| match (a.average_rating, b.average_rating) {
            (Some(x), Some(y)) => y
                .partial_cmp(&x)
                .unwrap_or(Ordering::Equal)
                .then_with(|| b.poi.date_add.cmp(&a.poi.date_add)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => b.poi.date_add.cmp(&a.poi.date_add),
        });
        let skip = (page.saturating_sub(1) as usize).saturating_mul(page_size as usize);
        Ok(summaries.into_iter().skip(skip).take(page_size as usize).collect())
    }

    async fn get_poi(&self, id: Uuid) -> Result<Option<Poi>, StoreError> {
        Ok(self.tables.read().await.pois.get(&id).cloned())
    }

    async fn get_poi_summary(&self, id: Uuid) -> Result<Option<PoiSummary>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.pois.get(&id).map(|p| tables.summary(p)))
    }

    async fn insert_poi(&self, poi: NewPoi) -> Result<Poi, StoreError> {
        let stored = Poi {
            id: Uuid::new_v4(),
            posted_by: poi.posted_by,
            pos: poi.pos,
            photos: poi.photos,
            title: poi.title,
            description: poi.description,
            date_add: now(),
            categorie: poi.categorie,
        };
        self.tables.write().await.pois.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn update_poi(&self, id: Uuid, changes: PoiChanges) -> Result<Option<Poi>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(poi) = tables.pois.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(photos) = changes.photos {
            poi.photos = photos;
        }
        if let Some(title) = changes.title {
            poi.title = title;
        }
        if let Some(description) = changes.description {
            poi.description = description;
        }
        if let Some(categorie) = changes.categorie {
            poi.categorie = categorie;
        }
        Ok(Some(poi.clone()))
    }

    async fn delete_poi(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.remove_poi(id))
    }

    async fn list_ratings(&self) -> Result<Vec<Rating>, StoreError> {
        let mut ratings: Vec<Rating> = self.tables.read().await.ratings.values().cloned().collect();
        ratings.sort_by(|a, b| b.date_add.cmp(&a.date_add));
        Ok(ratings)
    }

    async fn get_rating(&self, id: Uuid) -> Result<Option<Rating>, StoreError> {
        Ok(self.tables.read().await.ratings.get(&id).cloned())
    }

    async fn insert_rating(&self, rating: NewRating) -> Result<Rating, StoreError> {
        let stored = Rating {
            id: Uuid::new_v4(),
            posted_by: rating.posted_by,
            poi: rating.poi,
            value: rating.value,
            comment: rating.comment,
            date_add: now(),
        };
        self.tables.write().await.ratings.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn delete_rating(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.tables.write().await.ratings.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            password_hash: "hash".to_string(),
            img_profil: None,
        }
    }

    fn new_poi(owner: Uuid, title: &str) -> NewPoi {
        NewPoi {
            posted_by: owner,
            pos: GeoPoint::new(6.63, 46.52),
            photos: vec![],
            title: title.to_string(),
            description: None,
            categorie: None,
        }
    }

    async fn rate(store: &MemStore, poi: Uuid, by: Uuid, value: i32) -> Rating {
        store
            .insert_rating(NewRating {
                posted_by: Some(by),
                poi: Some(poi),
                value,
                comment: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn users_are_unique_and_sorted() {
        let store = MemStore::new();
        store.insert_user(new_user("JohnDoe")).await.unwrap();
        store.insert_user(new_user("JaneDoe")).await.unwrap();

        let err = store.insert_user(new_user("JohnDoe")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let names: Vec<String> = store
            .list_users()
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.username)
            .collect();
        assert_eq!(names, vec!["JaneDoe", "JohnDoe"]);
        assert_eq!(store.count_users().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn update_user_rejects_taken_username() {
        let store = MemStore::new();
        let john = store.insert_user(new_user("JohnDoe")).await.unwrap();
        store.insert_user(new_user("JaneDoe")).await.unwrap();

        let changes = UserChanges {
            username: Some("JaneDoe".to_string()),
            ..Default::default()
        };
        assert!(store.update_user(john.id, changes).await.is_err());

        let changes = UserChanges {
            img_profil: Some(Some("me.jpg".to_string())),
            ..Default::default()
        };
        let updated = store.update_user(john.id, changes).await.unwrap().unwrap();
        assert_eq!(updated.img_profil.as_deref(), Some("me.jpg"));
        assert_eq!(updated.username, "JohnDoe");
    }

    #[tokio::test]
    async fn pois_sorted_by_average_rating_and_paged() {
        let store = MemStore::new();
        let owner = store.insert_user(new_user("JohnDoe")).await.unwrap().id;
        let low = store.insert_poi(new_poi(owner, "Low")).await.unwrap();
        let high = store.insert_poi(new_poi(owner, "High")).await.unwrap();
        let unrated = store.insert_poi(new_poi(owner, "Unrated")).await.unwrap();
        rate(&store, low.id, owner, 2).await;
        rate(&store, high.id, owner, 5).await;
        rate(&store, high.id, owner, 4).await;

        let all = store.list_pois(1, 100).await.unwrap();
        let ids: Vec<Uuid> = all.iter().map(|s| s.poi.id).collect();
        assert_eq!(ids, vec![high.id, low.id, unrated.id]);
        assert_eq!(all[0].average_rating, Some(4.5));
        assert_eq!(all[2].average_rating, None);

        let second = store.list_pois(2, 2).await.unwrap();
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].poi.id, unrated.id);
    }

    #[tokio::test]
    async fn deleting_poi_removes_its_ratings() {
        let store = MemStore::new();
        let owner = store.insert_user(new_user("JohnDoe")).await.unwrap().id;
        let kept = store.insert_poi(new_poi(owner, "Kept")).await.unwrap();
        let gone = store.insert_poi(new_poi(owner, "Gone")).await.unwrap();
        rate(&store, kept.id, owner, 3).await;
        rate(&store, gone.id, owner, 3).await;
        rate(&store, gone.id, owner, 1).await;

        assert!(store.delete_poi(gone.id).await.unwrap());
        assert!(!store.delete_poi(gone.id).await.unwrap());
        assert_eq!(store.count_pois().await.unwrap(), 1);
        assert_eq!(store.count_ratings().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn deleting_user_cascades_to_their_pois() {
        let store = MemStore::new();
        let john = store.insert_user(new_user("JohnDoe")).await.unwrap().id;
        let jane = store.insert_user(new_user("JaneDoe")).await.unwrap().id;
        let johns = store.insert_poi(new_poi(john, "John's")).await.unwrap();
        let janes = store.insert_poi(new_poi(jane, "Jane's")).await.unwrap();
        rate(&store, johns.id, jane, 4).await;
        let kept = rate(&store, janes.id, john, 5).await;

        assert!(store.delete_user(john).await.unwrap());
        assert_eq!(store.count_users().await.unwrap(), 1);
        assert_eq!(store.count_pois().await.unwrap(), 1);
        assert_eq!(store.count_ratings().await.unwrap(), 1);

        let orphan = store.get_rating(kept.id).await.unwrap().unwrap();
        assert_eq!(orphan.posted_by, None);
        assert_eq!(orphan.poi, Some(janes.id));
    }
}
