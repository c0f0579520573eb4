use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::Date;

/// Workout row; immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Workout {
    pub id: i64,
    pub user_id: i64,
    pub exercise: String,
    pub reps: i32,
    pub weight: f64,
    pub date: Date,
}

/// Validated input for a new workout; the owner is attached by the service.
#[derive(Debug, Clone, PartialEq)]
pub struct NewWorkout {
    pub exercise: String,
    pub reps: i32,
    pub weight: f64,
    pub date: Date,
}
