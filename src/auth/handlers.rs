use axum::{
    extract::State,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginForm, RegisterForm},
        extractors::{AuthSession, SESSION_COOKIE},
        services,
    },
    error::AppError,
    flash::{self, Flash},
    state::AppState,
    views::{self, Notice},
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", get(register_form).post(register))
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
}

pub async fn register_form() -> Html<String> {
    views::register_page("", &[], &[])
}

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<RegisterForm>,
) -> Result<Response, AppError> {
    match services::register(&state, &form.username, &form.password).await {
        Ok(_) => Ok((flash::push(jar, Flash::AccountCreated), Redirect::to("/login")).into_response()),
        Err(AppError::DuplicateUsername) => Ok(views::register_page(
            &form.username,
            &[Notice::danger("That username is already taken.")],
            &[],
        )
        .into_response()),
        Err(e @ AppError::Validation(_)) => {
            Ok(views::register_page(&form.username, &[], e.field_errors()).into_response())
        }
        Err(e) => Err(e),
    }
}

pub async fn login_form(jar: CookieJar) -> (CookieJar, Html<String>) {
    let (jar, notices) = flash::take(jar);
    (jar, views::login_page("", &notices, &[]))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match services::login(&state, &form.username, &form.password).await {
        Ok(session) => {
            let cfg = &state.config.session;
            let cookie = Cookie::build((SESSION_COOKIE, session.token.clone()))
                .path("/")
                .http_only(true)
                .secure(cfg.cookie_secure)
                .same_site(SameSite::Lax)
                .expires(session.expires_at);
            Ok((jar.add(cookie), Redirect::to("/dashboard")).into_response())
        }
        Err(AppError::InvalidCredentials) => Ok(views::login_page(
            &form.username,
            &[Notice::danger("Invalid username or password.")],
            &[],
        )
        .into_response()),
        Err(e @ AppError::Validation(_)) => {
            Ok(views::login_page(&form.username, &[], e.field_errors()).into_response())
        }
        Err(e) => Err(e),
    }
}

#[instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthSession,
    jar: CookieJar,
) -> Result<(CookieJar, Redirect), AppError> {
    services::logout(&state, &auth.session).await?;
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    Ok((jar, Redirect::to("/login")))
}
