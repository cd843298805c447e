// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated users.
//!
//! Use the `Auth` extractor in handlers to require authentication:
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! The request gate normally validates the token and stashes the user in
//! request extensions; the extractors fall back to decoding the header
//! themselves so handlers also work when called outside the full router.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use super::{AuthError, AuthenticatedUser, Role};
use crate::state::AppState;

/// Pull the bearer token out of an Authorization header value.
pub(crate) fn bearer_token(header: &str) -> Result<&str, AuthError> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Extractor requiring a valid access token.
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // The gate middleware already validated the token on this request.
        if let Some(user) = parts.extensions.get::<AuthenticatedUser>().cloned() {
            return Ok(Auth(user));
        }

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingAuthHeader)?
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        let token = bearer_token(auth_header)?;
        let claims = state.tokens.validate_access(token)?;

        Ok(Auth(AuthenticatedUser::from_claims(claims)))
    }
}

/// Extractor requiring the admin role.
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !user.is_admin() {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(AdminOnly(user))
    }
}

/// Extractor requiring editor or admin.
pub struct EditorOrAdmin(pub AuthenticatedUser);

impl FromRequestParts<AppState> for EditorOrAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;

        if !matches!(user.role, Role::Editor | Role::Admin) {
            return Err(AuthError::InsufficientPermissions);
        }

        Ok(EditorOrAdmin(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use crate::store::{NewUser, StoredUser};
    use axum::http::Request;
    use uuid::Uuid;

    async fn seeded_user(state: &AppState, role: Role) -> StoredUser {
        state
            .store
            .write()
            .await
            .create_user(NewUser {
                email: format!("{}@example.com", Uuid::new_v4()),
                full_name: "Extract Me".to_string(),
                role,
                password_hash: "x".to_string(),
            })
            .unwrap()
    }

    fn parts_with_header(value: Option<String>) -> Parts {
        let mut builder = Request::builder().uri("/test");
        if let Some(value) = value {
            builder = builder.header("Authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_requires_header() {
        let state = AppState::default();
        let mut parts = parts_with_header(None);

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_rejects_non_bearer_header() {
        let state = AppState::default();
        let mut parts = parts_with_header(Some("Basic abc123".to_string()));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InvalidAuthHeader)));
    }

    #[tokio::test]
    async fn auth_decodes_a_real_token() {
        let state = AppState::default();
        let user = seeded_user(&state, Role::Editor).await;
        let pair = state.tokens.issue(&user).unwrap();
        let mut parts = parts_with_header(Some(format!("Bearer {}", pair.access)));

        let Auth(extracted) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(extracted.user_id, user.id);
        assert_eq!(extracted.role, Role::Editor);
        assert_eq!(extracted.email, user.email);
    }

    #[tokio::test]
    async fn auth_prefers_extensions() {
        let state = AppState::default();
        let mut parts = parts_with_header(None);

        let user = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "gate@example.com".to_string(),
            role: Role::Admin,
            full_name: "From Gate".to_string(),
            expires_at: 0,
        };
        parts.extensions.insert(user.clone());

        let Auth(extracted) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(extracted.user_id, user.user_id);
    }

    #[tokio::test]
    async fn admin_only_rejects_non_admin() {
        let state = AppState::default();
        let user = seeded_user(&state, Role::Editor).await;
        let pair = state.tokens.issue(&user).unwrap();
        let mut parts = parts_with_header(Some(format!("Bearer {}", pair.access)));

        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn editor_or_admin_accepts_both_and_rejects_users() {
        let state = AppState::default();

        for (role, ok) in [
            (Role::Admin, true),
            (Role::Editor, true),
            (Role::User, false),
        ] {
            let user = seeded_user(&state, role).await;
            let pair = state.tokens.issue(&user).unwrap();
            let mut parts = parts_with_header(Some(format!("Bearer {}", pair.access)));

            let result = EditorOrAdmin::from_request_parts(&mut parts, &state).await;
            assert_eq!(result.is_ok(), ok, "role {role}");
        }
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_token() {
        let state = AppState::default();
        let user = seeded_user(&state, Role::User).await;
        let pair = state.tokens.issue(&user).unwrap();
        let mut parts = parts_with_header(Some(format!("Bearer {}", pair.refresh)));

        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(result.is_err());
    }
}
