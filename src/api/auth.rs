// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration, login, and token refresh endpoints.
//!
//! All three are on the gate's allow-list: they are exactly the calls a
//! client makes before it has a usable token.

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    auth::{password, Role},
    error::ApiError,
    mailer::send_welcome_email,
    models::{
        LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, RegisterRequest,
        UserCreatedResponse,
    },
    state::AppState,
    store::NewUser,
};

const BAD_CREDENTIALS: &str = "No active account found with the given credentials";

/// Register a new account.
///
/// Always creates a `user` role account: the request shape has no role
/// field, so nothing a client sends can escalate.
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, description = "User registered", body = UserCreatedResponse),
        (status = 400, description = "Validation failure (e.g. password mismatch)"),
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserCreatedResponse>), ApiError> {
    if request.password != request.password_confirm {
        return Err(ApiError::validation("password_confirm", "Passwords don't match"));
    }

    let password_hash = password::hash_password(&request.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;

    let user = state.store.write().await.create_user(NewUser {
        email: request.email,
        full_name: request.full_name,
        role: Role::User,
        password_hash,
    })?;

    send_welcome_email(state.mailer.clone(), &user);

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            message: "User registered successfully".to_string(),
        }),
    ))
}

/// Login with email and password, receiving a token pair.
#[utoipa::path(
    post,
    path = "/api/token",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let user = state
        .store
        .read()
        .await
        .find_user_by_email(&request.email)
        .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

    if !user.is_active {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let verified = password::verify_password(&request.password, &user.password_hash)
        .map_err(|e| ApiError::internal(format!("Password verification failed: {e}")))?;
    if !verified {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    let pair = state
        .tokens
        .issue(&user)
        .map_err(|e| ApiError::internal(format!("Failed to sign token: {e}")))?;

    Ok(Json(LoginResponse {
        access: pair.access,
        refresh: pair.refresh,
        user: user.into(),
    }))
}

/// Mint a fresh access token from a refresh token.
///
/// Identity is re-derived from the store, so the new access token
/// reflects the account's current role and name.
#[utoipa::path(
    post,
    path = "/api/token/refresh",
    request_body = RefreshRequest,
    tag = "Auth",
    responses(
        (status = 200, description = "New access token", body = RefreshResponse),
        (status = 401, description = "Expired or invalid refresh token"),
    )
)]
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, ApiError> {
    let claims = state.tokens.validate_refresh(&request.refresh)?;

    let user = state
        .store
        .read()
        .await
        .find_user(claims.user_id)
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::unauthorized(BAD_CREDENTIALS))?;

    let access = state
        .tokens
        .issue_access(&user)
        .map_err(|e| ApiError::internal(format!("Failed to sign token: {e}")))?;

    Ok(Json(RefreshResponse { access }))
}
