use axum::{
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use tracing::{instrument, warn};

use super::{
    dto::{ChartPoint, WorkoutForm},
    services::{chart_points, chart_series, export_csv, list_workouts, log_workout},
};
use crate::{
    auth::extractors::AuthSession,
    error::AppError,
    flash::{self, Flash},
    state::AppState,
    views,
};

pub fn workout_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route("/dashboard/chart.json", get(chart))
        .route("/log", get(log_form).post(submit_log))
        .route("/export", get(export))
}

#[instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn dashboard(
    State(state): State<AppState>,
    auth: AuthSession,
    jar: CookieJar,
) -> Result<(CookieJar, Html<String>), AppError> {
    let (jar, notices) = flash::take(jar);
    let workouts = list_workouts(&state, &auth.user).await?;
    let chart = chart_points(&workouts);
    let page = views::dashboard_page(&auth.user.username, &workouts, &chart, &notices)?;
    Ok((jar, page))
}

/// Chart series alone, for clients that draw their own plot.
pub async fn chart(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Json<Vec<ChartPoint>>, AppError> {
    Ok(Json(chart_series(&state, &auth.user).await?))
}

pub async fn log_form(auth: AuthSession) -> Html<String> {
    views::log_page(&auth.user.username, &WorkoutForm::default(), &[], &[])
}

#[instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn submit_log(
    State(state): State<AppState>,
    auth: AuthSession,
    jar: CookieJar,
    Form(form): Form<WorkoutForm>,
) -> Result<Response, AppError> {
    match log_workout(&state, &auth.user, &form).await {
        Ok(_) => Ok((flash::push(jar, Flash::WorkoutLogged), Redirect::to("/dashboard")).into_response()),
        Err(e @ AppError::Validation(_)) => {
            warn!(errors = e.field_errors().len(), "workout form rejected");
            Ok(views::log_page(&auth.user.username, &form, &[], e.field_errors()).into_response())
        }
        Err(e) => Err(e),
    }
}

#[instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn export(
    State(state): State<AppState>,
    auth: AuthSession,
) -> Result<Response, AppError> {
    let body = export_csv(&state, &auth.user).await?;
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (CONTENT_DISPOSITION, "attachment; filename=\"workouts.csv\""),
        ],
        body,
    )
        .into_response())
}
