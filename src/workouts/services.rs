use tracing::{error, info, instrument};

use super::{
    dto::{ChartPoint, ExportRow, WorkoutForm},
    repo_types::Workout,
};
use crate::{auth::repo_types::User, error::AppError, state::AppState};

pub const CSV_HEADER: [&str; 4] = ["Date", "Exercise", "Reps", "Weight"];

#[instrument(skip(state, user, form), fields(user_id = user.id))]
pub async fn log_workout(
    state: &AppState,
    user: &User,
    form: &WorkoutForm,
) -> Result<Workout, AppError> {
    let new = form.validate()?;
    let workout = state.workouts.insert(user.id, &new).await?;
    info!(workout_id = workout.id, exercise = %workout.exercise, "workout logged");
    Ok(workout)
}

pub async fn list_workouts(state: &AppState, user: &User) -> Result<Vec<Workout>, AppError> {
    Ok(state.workouts.list_by_user(user.id).await?)
}

pub async fn chart_series(state: &AppState, user: &User) -> Result<Vec<ChartPoint>, AppError> {
    Ok(chart_points(&list_workouts(state, user).await?))
}

pub fn chart_points(workouts: &[Workout]) -> Vec<ChartPoint> {
    workouts.iter().map(ChartPoint::from).collect()
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn export_csv(state: &AppState, user: &User) -> Result<Vec<u8>, AppError> {
    let workouts = list_workouts(state, user).await?;
    let body = render_csv(&workouts).map_err(|e| {
        error!(error = %e, "csv export failed");
        AppError::Export(e.to_string())
    })?;
    info!(rows = workouts.len(), bytes = body.len(), "csv exported");
    Ok(body)
}

/// Renders the full document in memory so a failure never yields a truncated file.
pub fn render_csv(workouts: &[Workout]) -> Result<Vec<u8>, csv::Error> {
    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    wtr.write_record(CSV_HEADER)?;
    for w in workouts {
        wtr.serialize(ExportRow::from(w))?;
    }
    wtr.into_inner().map_err(|e| e.into_error().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::{login, register};
    use time::macros::date;

    fn form(exercise: &str, reps: &str, weight: &str, date: &str) -> WorkoutForm {
        WorkoutForm {
            exercise: exercise.into(),
            reps: reps.into(),
            weight: weight.into(),
            date: date.into(),
        }
    }

    async fn user(state: &AppState, name: &str) -> User {
        register(state, name, "pw1234").await.unwrap()
    }

    fn parse_csv(bytes: &[u8]) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(bytes)
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[tokio::test]
    async fn alice_scenario() {
        let state = AppState::fake();
        let alice = user(&state, "alice").await;
        login(&state, "alice", "pw1234").await.unwrap();

        log_workout(&state, &alice, &form("Squat", "5", "100.0", "2024-01-01"))
            .await
            .unwrap();
        log_workout(&state, &alice, &form("Bench", "8", "60.0", "2024-01-02"))
            .await
            .unwrap();

        let list = list_workouts(&state, &alice).await.unwrap();
        let names: Vec<_> = list.iter().map(|w| w.exercise.as_str()).collect();
        assert_eq!(names, vec!["Bench", "Squat"]);
        assert_eq!(list[0].date, date!(2024 - 01 - 02));
        assert_eq!(list[1].date, date!(2024 - 01 - 01));

        let rows = parse_csv(&export_csv(&state, &alice).await.unwrap());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0], CSV_HEADER.map(String::from).to_vec());
        for (row, w) in rows[1..].iter().zip(&list) {
            assert_eq!(row[0], crate::workouts::dto::format_date(w.date));
            assert_eq!(row[1], w.exercise);
            assert_eq!(row[2].parse::<i32>().unwrap(), w.reps);
            assert_eq!(row[3].parse::<f64>().unwrap(), w.weight);
        }
    }

    #[tokio::test]
    async fn users_never_see_each_others_workouts() {
        let state = AppState::fake();
        let a = user(&state, "alice").await;
        let b = user(&state, "bobby").await;
        log_workout(&state, &a, &form("Squat", "5", "100", "2024-01-01"))
            .await
            .unwrap();
        let theirs = log_workout(&state, &b, &form("Curl", "12", "15", "2024-01-01"))
            .await
            .unwrap();

        let mine = list_workouts(&state, &a).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_ne!(mine[0], theirs);
        assert!(mine.iter().all(|w| w.user_id == a.id));

        let exported = parse_csv(&export_csv(&state, &a).await.unwrap());
        assert!(exported.iter().all(|r| r[1] != "Curl"));
    }

    #[tokio::test]
    async fn invalid_form_persists_nothing() {
        let state = AppState::fake();
        let a = user(&state, "alice").await;
        let err = log_workout(&state, &a, &form("", "0", "x", "nope"))
            .await
            .unwrap_err();
        assert_eq!(err.field_errors().len(), 4);
        assert!(list_workouts(&state, &a).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn chart_series_follows_listing_order() {
        let state = AppState::fake();
        let a = user(&state, "alice").await;
        for (d, reps) in [("2024-01-03", "3"), ("2024-01-01", "1"), ("2024-01-02", "2")] {
            log_workout(&state, &a, &form("Row", reps, "40", d))
                .await
                .unwrap();
        }
        let dates: Vec<_> = chart_series(&state, &a)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.date)
            .collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02", "2024-01-01"]);
    }

    #[test]
    fn empty_export_still_has_header() {
        let rows = parse_csv(&render_csv(&[]).unwrap());
        assert_eq!(rows, vec![CSV_HEADER.map(String::from).to_vec()]);
    }

    #[test]
    fn export_quotes_awkward_exercise_names() {
        let w = Workout {
            id: 1,
            user_id: 1,
            exercise: "Press, \"strict\"".into(),
            reps: 5,
            weight: 42.5,
            date: date!(2024 - 05 - 06),
        };
        let rows = parse_csv(&render_csv(&[w]).unwrap());
        assert_eq!(rows[1], vec!["2024-05-06", "Press, \"strict\"", "5", "42.5"]);
    }
}
