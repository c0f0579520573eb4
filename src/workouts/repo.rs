use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{NewWorkout, Workout};
use crate::db::StoreError;

#[async_trait]
pub trait WorkoutStore: Send + Sync {
    /// Fails with `StoreError::ConstraintViolation` when `user_id` does not exist.
    async fn insert(&self, user_id: i64, workout: &NewWorkout) -> Result<Workout, StoreError>;
    /// Owner-scoped listing, newest date first, ties by id descending.
    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Workout>, StoreError>;
}

#[derive(Clone)]
pub struct PgWorkoutStore {
    db: PgPool,
}

impl PgWorkoutStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl WorkoutStore for PgWorkoutStore {
    async fn insert(&self, user_id: i64, workout: &NewWorkout) -> Result<Workout, StoreError> {
        let row = sqlx::query_as::<_, Workout>(
            r#"
            INSERT INTO workouts (user_id, exercise, reps, weight, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, exercise, reps, weight, date
            "#,
        )
        .bind(user_id)
        .bind(&workout.exercise)
        .bind(workout.reps)
        .bind(workout.weight)
        .bind(workout.date)
        .fetch_one(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_by_user(&self, user_id: i64) -> Result<Vec<Workout>, StoreError> {
        let rows = sqlx::query_as::<_, Workout>(
            r#"
            SELECT id, user_id, exercise, reps, weight, date
            FROM workouts
            WHERE user_id = $1
            ORDER BY date DESC, id DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
