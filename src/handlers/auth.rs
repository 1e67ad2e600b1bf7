use axum::{extract::State, Extension, Json};
use chrono::{Duration, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::{
    jwt::{create_token_pair, hash_token, verify_token, TokenPair, TokenType},
    password::{hash_password, verify_password},
    Session,
};
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::models::user::{RefreshToken, User, UserProfile};
use crate::store::{AccountStore, StoreError};
use crate::AppState;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email(message = "A valid email address is required"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Name must be 1 to 100 characters"))]
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Create a token pair and persist the refresh token hash, optionally
/// linking it to the token it replaces.
async fn issue_token_pair(
    accounts: &dyn AccountStore,
    user_id: Uuid,
    email: &str,
    config: &Config,
    parent_token_id: Option<Uuid>,
) -> AppResult<TokenPair> {
    let tokens = create_token_pair(user_id, email, config)?;
    let now = Utc::now();
    let record = RefreshToken {
        id: Uuid::new_v4(),
        user_id,
        token_hash: hash_token(&tokens.refresh_token),
        expires_at: now + Duration::seconds(config.jwt_refresh_ttl_secs),
        revoked: false,
        parent_token_id,
        created_at: now,
    };
    accounts.insert_refresh_token(&record).await?;
    Ok(tokens)
}

pub async fn register(
    State(state): State<AppState>,
    AppJson(body): AppJson<RegisterRequest>,
) -> AppResult<Json<TokenPair>> {
    body.validate()?;

    let email = normalize_email(&body.email);
    let now = Utc::now();
    let user = User {
        id: Uuid::new_v4(),
        email,
        password_hash: hash_password(&body.password)?,
        name: body.name.trim().to_string(),
        created_at: now,
        updated_at: now,
    };

    state.accounts.create_user(&user).await.map_err(|e| match e {
        StoreError::Conflict(_) => AppError::Conflict("Email already registered".into()),
        other => AppError::Store(other),
    })?;
    tracing::info!(user_id = %user.id, "User registered");

    let tokens =
        issue_token_pair(state.accounts.as_ref(), user.id, &user.email, &state.config, None)
            .await?;
    Ok(Json(tokens))
}

pub async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    let user = state
        .accounts
        .find_user_by_email(&normalize_email(&body.email))
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(&body.password, &user.password_hash)? {
        return Err(AppError::Unauthorized);
    }

    let tokens =
        issue_token_pair(state.accounts.as_ref(), user.id, &user.email, &state.config, None)
            .await?;
    Ok(Json(tokens))
}

pub async fn refresh(
    State(state): State<AppState>,
    AppJson(body): AppJson<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    let token_data = verify_token(&body.refresh_token, &state.config)?;

    if token_data.claims.token_type != TokenType::Refresh {
        return Err(AppError::Unauthorized);
    }

    let stored = state
        .accounts
        .find_refresh_token(&hash_token(&body.refresh_token))
        .await?
        .ok_or(AppError::Unauthorized)?;

    // A rotated token presented again means the family leaked.
    if stored.revoked {
        tracing::warn!(
            user_id = %stored.user_id,
            token_id = %stored.id,
            "Refresh token reuse detected, revoking all tokens for user"
        );
        state.accounts.revoke_all_refresh_tokens(stored.user_id).await?;
        return Err(AppError::Unauthorized);
    }

    if stored.user_id != token_data.claims.sub || stored.expires_at <= Utc::now() {
        return Err(AppError::Unauthorized);
    }

    state.accounts.revoke_refresh_token(stored.id).await?;

    let tokens = issue_token_pair(
        state.accounts.as_ref(),
        token_data.claims.sub,
        &token_data.claims.email,
        &state.config,
        Some(stored.id),
    )
    .await?;
    Ok(Json(tokens))
}

pub async fn logout(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<serde_json::Value>> {
    let revoked = state
        .accounts
        .revoke_all_refresh_tokens(session.user_id)
        .await?;
    tracing::info!(user_id = %session.user_id, revoked, "User signed out");
    Ok(Json(serde_json::json!({ "message": "Logged out successfully" })))
}

pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<UserProfile>> {
    let user = state
        .accounts
        .find_user(session.user_id)
        .await?
        .ok_or(AppError::NotFound("User not found".into()))?;

    Ok(Json(user.into()))
}
