use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    auth::{
        repo::{SessionStore, UserStore},
        repo_types::{SessionRecord, User},
    },
    db::StoreError,
    workouts::{
        repo::WorkoutStore,
        repo_types::{NewWorkout, Workout},
    },
};

/// In-process backend for all three stores, holding the same constraints as the SQL schema.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    workouts: Vec<Workout>,
    sessions: HashMap<Uuid, SessionRecord>,
    last_user_id: i64,
    last_workout_id: i64,
}

impl Tables {
    fn user_exists(&self, id: i64) -> bool {
        self.users.iter().any(|u| u.id == id)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub async fn session_count(&self) -> usize {
        self.inner.lock().await.sessions.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut t = self.inner.lock().await;
        if t.users.iter().any(|u| u.username == username) {
            return Err(StoreError::Unique("users_username_key".into()));
        }
        t.last_user_id += 1;
        let user = User {
            id: t.last_user_id,
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        t.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let t = self.inner.lock().await;
        Ok(t.users.iter().find(|u| u.username == username).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let t = self.inner.lock().await;
        Ok(t.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl WorkoutStore for MemoryStore {
    async fn insert(&self, user_id: i64, workout: &NewWorkout) -> Result<Workout, StoreError> {
        let mut t = self.inner.lock().await;
        if !t.user_exists(user_id) {
            return Err(StoreError::ConstraintViolation(format!(
                "workouts.user_id {user_id} references no user"
            )));
        }
        t.last_workout_id += 1;
        let row = Workout {
            id: t.last_workout_id,
            user_id,
            exercise: workout.exercise.clone(),
            reps: workout.reps,
            weight: workout.weight,
            date: workout.date,
        };
        t.workouts.push(row.clone());
        Ok(row)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Workout>, StoreError> {
        let t = self.inner.lock().await;
        let mut rows: Vec<Workout> = t
            .workouts
            .iter()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(rows)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create(
        &self,
        user_id: i64,
        expires_at: OffsetDateTime,
    ) -> Result<SessionRecord, StoreError> {
        let mut t = self.inner.lock().await;
        if !t.user_exists(user_id) {
            return Err(StoreError::ConstraintViolation(format!(
                "sessions.user_id {user_id} references no user"
            )));
        }
        let record = SessionRecord {
            id: Uuid::new_v4(),
            user_id,
            created_at: OffsetDateTime::now_utc(),
            expires_at,
        };
        t.sessions.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find(&self, id: Uuid) -> Result<Option<SessionRecord>, StoreError> {
        let t = self.inner.lock().await;
        Ok(t.sessions.get(&id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.inner.lock().await.sessions.remove(&id);
        Ok(())
    }

    async fn purge_expired(&self, now: OffsetDateTime) -> Result<u64, StoreError> {
        let mut t = self.inner.lock().await;
        let before = t.sessions.len();
        t.sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - t.sessions.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn squat() -> NewWorkout {
        NewWorkout {
            exercise: "Squat".into(),
            reps: 5,
            weight: 100.0,
            date: date!(2024 - 01 - 01),
        }
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = MemoryStore::new();
        let first = UserStore::create(&store, "alice", "h1").await.unwrap();
        let err = UserStore::create(&store, "alice", "h2").await.unwrap_err();
        assert!(matches!(err, StoreError::Unique(_)));
        let kept = store.find_by_username("alice").await.unwrap().unwrap();
        assert_eq!(kept, first);
    }

    #[tokio::test]
    async fn workouts_require_existing_owner() {
        let store = MemoryStore::new();
        let err = store.insert(99, &squat()).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation(_)));
    }

    #[tokio::test]
    async fn listing_is_owner_scoped_and_date_descending() {
        let store = MemoryStore::new();
        let a = UserStore::create(&store, "alice", "h").await.unwrap();
        let b = UserStore::create(&store, "bob", "h").await.unwrap();
        store.insert(a.id, &squat()).await.unwrap();
        let later = NewWorkout {
            date: date!(2024 - 03 - 01),
            ..squat()
        };
        store.insert(a.id, &later).await.unwrap();
        store.insert(b.id, &squat()).await.unwrap();

        let rows = store.list_by_user(a.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|w| w.user_id == a.id));
        assert_eq!(rows[0].date, date!(2024 - 03 - 01));
    }

    #[tokio::test]
    async fn deleting_missing_session_is_ok() {
        let store = MemoryStore::new();
        let u = UserStore::create(&store, "alice", "h").await.unwrap();
        let s = SessionStore::create(&store, u.id, OffsetDateTime::now_utc())
            .await
            .unwrap();
        store.delete(s.id).await.unwrap();
        store.delete(s.id).await.unwrap();
        assert!(store.find(s.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn purge_expired_keeps_live_sessions() {
        let store = MemoryStore::new();
        let u = UserStore::create(&store, "alice", "h").await.unwrap();
        let now = OffsetDateTime::now_utc();
        for _ in 0..3 {
            SessionStore::create(&store, u.id, now - time::Duration::minutes(5))
                .await
                .unwrap();
        }
        let live = SessionStore::create(&store, u.id, now + time::Duration::hours(1))
            .await
            .unwrap();

        assert_eq!(store.purge_expired(now).await.unwrap(), 3);
        assert_eq!(store.session_count().await, 1);
        assert!(store.find(live.id).await.unwrap().is_some());
        assert_eq!(store.purge_expired(now).await.unwrap(), 0);
    }
}
