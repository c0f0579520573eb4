use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;

use super::{
    dto::Session,
    repo_types::User,
    services::{current_user, resolve_session},
};
use crate::{error::AppError, state::AppState};

pub const SESSION_COOKIE: &str = "liftlog_session";

/// Authenticated caller: the session plus the user it belongs to.
/// Rejects with a redirect to the login page.
pub struct AuthSession {
    pub session: Session,
    pub user: User,
}

fn presented_token(parts: &Parts) -> Option<String> {
    if let Some(cookie) = CookieJar::from_headers(&parts.headers).get(SESSION_COOKIE) {
        return Some(cookie.value().to_string());
    }
    let auth = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = presented_token(parts).ok_or(AppError::Unauthenticated)?;
        let session = resolve_session(state, &token)?;
        let user = current_user(state, &session).await?;
        Ok(AuthSession { session, user })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: (&str, &str)) -> Parts {
        Request::builder()
            .header(header.0, header.1)
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn token_read_from_cookie() {
        let p = parts(("cookie", "other=1; liftlog_session=abc.def"));
        assert_eq!(presented_token(&p).as_deref(), Some("abc.def"));
    }

    #[test]
    fn token_read_from_bearer_header() {
        let p = parts(("authorization", "Bearer xyz"));
        assert_eq!(presented_token(&p).as_deref(), Some("xyz"));
        let p = parts(("authorization", "Basic xyz"));
        assert_eq!(presented_token(&p), None);
    }
}
