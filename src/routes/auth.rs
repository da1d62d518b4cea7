// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Email/password authentication routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::{Validate, ValidationError, ValidationErrors};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::models::account::{normalize_email, Account};
use crate::models::{ProfileFields, UserProfile};
use crate::services::health;
use crate::services::password;
use crate::time_utils::now_rfc3339;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

/// Session returned by register and login; the token is also set as a cookie.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SessionResponse {
    pub uid: String,
    pub email: String,
    pub token: String,
}

#[derive(Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom(function = "health::validate_email_shape"))]
    pub email: String,
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
    #[serde(flatten)]
    #[validate(nested)]
    pub profile: ProfileFields,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Create an account and profile, then start a session.
async fn register(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<SessionResponse>)> {
    body.validate()?;

    let missing = body.profile.missing_for_registration();
    if !missing.is_empty() {
        let mut errors = ValidationErrors::new();
        for field in missing {
            errors.add(
                field,
                ValidationError::new("required").with_message("This field is required".into()),
            );
        }
        return Err(AppError::Validation(errors));
    }

    let email = body.email.trim().to_string();
    let email_key = normalize_email(&email);

    if state.db.get_account(&email_key).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".to_string()));
    }

    let password_hash = hash_in_background(body.password).await?;

    let uid = uuid::Uuid::new_v4().to_string();
    let now = now_rfc3339();

    let account = Account {
        uid: uid.clone(),
        email: email.clone(),
        password_hash,
        created_at: now.clone(),
    };

    let mut profile = UserProfile {
        uid: uid.clone(),
        email: email.clone(),
        created_at: now.clone(),
        updated_at: now,
        ..Default::default()
    };
    body.profile.apply_to(&mut profile);

    state.db.register_user(&email_key, &account, &profile).await?;

    tracing::info!(uid = %uid, "Registered new user");

    let (jar, session) = start_session(&state, jar, uid, email)?;
    Ok((StatusCode::CREATED, jar, Json(session)))
}

/// Verify credentials and start a session.
///
/// Unknown email and wrong password are indistinguishable to the caller.
async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let email_key = normalize_email(&body.email);

    let account = state
        .db
        .get_account(&email_key)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let hash = account.password_hash.clone();
    let valid = tokio::task::spawn_blocking(move || password::verify_password(&body.password, &hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password check panicked: {}", e)))??;

    if !valid {
        tracing::info!(uid = %account.uid, "Login rejected: wrong password");
        return Err(AppError::Unauthorized);
    }

    tracing::info!(uid = %account.uid, "User logged in");

    let (jar, session) = start_session(&state, jar, account.uid, account.email)?;
    Ok((jar, Json(session)))
}

/// Clear the session cookie.
async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> (StatusCode, CookieJar) {
    let removal = Cookie::build(SESSION_COOKIE)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure);

    (StatusCode::NO_CONTENT, jar.remove(removal))
}

async fn hash_in_background(plain: String) -> Result<String> {
    let hash = tokio::task::spawn_blocking(move || password::hash_password(&plain))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing panicked: {}", e)))??;
    Ok(hash)
}

fn start_session(
    state: &AppState,
    jar: CookieJar,
    uid: String,
    email: String,
) -> Result<(CookieJar, SessionResponse)> {
    let token = create_jwt(&uid, &email, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(state.config.cookie_secure)
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build();

    Ok((jar.add(cookie), SessionResponse { uid, email, token }))
}
