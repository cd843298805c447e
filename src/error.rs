// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::collections::BTreeMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::store::StoreError;

/// API-boundary error: an HTTP status plus a JSON body, with optional
/// field-level detail for validation failures.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    pub fields: Option<BTreeMap<String, String>>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, String>>,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            fields: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// A 400 with per-field detail, for input validation failures.
    pub fn validation(field: impl Into<String>, detail: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        let detail = detail.into();
        fields.insert(field.into(), detail.clone());
        Self {
            status: StatusCode::BAD_REQUEST,
            message: detail,
            fields: Some(fields),
        }
    }
}

impl From<crate::auth::AuthError> for ApiError {
    fn from(err: crate::auth::AuthError) -> Self {
        ApiError::new(err.status_code(), err.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UserNotFound => ApiError::not_found("User not found"),
            StoreError::EmailTaken(_) => {
                ApiError::validation("email", "A user with this email already exists")
            }
            StoreError::PostNotFound => ApiError::not_found("Post not found"),
            // Deliberate masking: a non-pending moderation target is
            // reported exactly like an absent one.
            StoreError::PostNotPending { .. } => ApiError::not_found("Post not found"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorBody {
            error: self.message,
            fields: self.fields,
        });
        (self.status, body).into_response()
    }
}
