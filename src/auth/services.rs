use axum::extract::FromRef;
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, instrument, warn};

use crate::{
    auth::{
        dto::{validate_login, validate_registration, Session},
        jwt::SessionKeys,
        password::{hash_password, verify_dummy, verify_password},
        repo_types::User,
    },
    db::StoreError,
    error::AppError,
    state::AppState,
};

#[instrument(skip(state, password))]
pub async fn register(state: &AppState, username: &str, password: &str) -> Result<User, AppError> {
    let creds = validate_registration(username, password)?;

    if state.users.find_by_username(creds.username).await?.is_some() {
        warn!(username = creds.username, "username already registered");
        return Err(AppError::DuplicateUsername);
    }

    let hash = hash_password(creds.password)?;

    // The unique index settles races between concurrent registrations.
    match state.users.create(creds.username, &hash).await {
        Ok(user) => {
            info!(user_id = user.id, username = %user.username, "user registered");
            Ok(user)
        }
        Err(StoreError::Unique(_)) => {
            warn!(username = creds.username, "username taken concurrently");
            Err(AppError::DuplicateUsername)
        }
        Err(e) => Err(e.into()),
    }
}

#[instrument(skip(state, password))]
pub async fn login(state: &AppState, username: &str, password: &str) -> Result<Session, AppError> {
    let creds = validate_login(username, password)?;

    let user = match state.users.find_by_username(creds.username).await? {
        Some(u) => u,
        None => {
            verify_dummy(creds.password);
            warn!(username = creds.username, "login unknown username");
            return Err(AppError::InvalidCredentials);
        }
    };

    if !verify_password(creds.password, &user.password_hash)? {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let now = OffsetDateTime::now_utc();
    let purged = state.sessions.purge_expired(now).await?;
    if purged > 0 {
        debug!(purged, "expired sessions removed");
    }

    let ttl = Duration::minutes(state.config.session.ttl_minutes);
    let record = state.sessions.create(user.id, now + ttl).await?;
    let token = SessionKeys::from_ref(state).sign(user.id, record.id, record.expires_at)?;

    info!(user_id = user.id, session_id = %record.id, "user logged in");
    Ok(Session {
        id: record.id,
        user_id: user.id,
        token,
        expires_at: record.expires_at,
    })
}

/// Invalidates the session; calling it again for the same session is a no-op.
#[instrument(skip(state, session), fields(session_id = %session.id))]
pub async fn logout(state: &AppState, session: &Session) -> Result<(), AppError> {
    state.sessions.delete(session.id).await?;
    info!(user_id = session.user_id, "user logged out");
    Ok(())
}

/// Checks a presented token and turns it into a `Session` value.
pub fn resolve_session(state: &AppState, token: &str) -> Result<Session, AppError> {
    let claims = SessionKeys::from_ref(state).verify(token).map_err(|e| {
        warn!(error = %e, "rejected session token");
        AppError::Unauthenticated
    })?;
    let expires_at = OffsetDateTime::from_unix_timestamp(claims.exp as i64)
        .map_err(|_| AppError::Unauthenticated)?;
    Ok(Session {
        id: claims.sid,
        user_id: claims.sub,
        token: token.to_string(),
        expires_at,
    })
}

pub async fn current_user(state: &AppState, session: &Session) -> Result<User, AppError> {
    let record = state
        .sessions
        .find(session.id)
        .await?
        .ok_or(AppError::Unauthenticated)?;

    if record.user_id != session.user_id {
        warn!(session_id = %session.id, "session owner mismatch");
        return Err(AppError::Unauthenticated);
    }
    if record.is_expired(OffsetDateTime::now_utc()) {
        state.sessions.delete(record.id).await?;
        return Err(AppError::Unauthenticated);
    }

    state
        .users
        .find_by_id(record.user_id)
        .await?
        .ok_or(AppError::Unauthenticated)
}
