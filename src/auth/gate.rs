// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access-control request gate.
//!
//! Runs once per inbound request, before any handler:
//!
//! 1. Requests to allow-listed paths (registration, login, refresh, docs,
//!    health) pass untouched.
//! 2. Requests without credentials pass through as anonymous; handlers
//!    enforce their own authentication via extractors.
//! 3. A bearer token is validated, the decoded identity is attached to
//!    request extensions, and coarse path-prefix role rules are applied.
//!    Failures short-circuit with 401/403.
//!
//! Every validation attempt, pass or fail, is recorded in the access log.

use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};

use super::extractor::bearer_token;
use super::{AuthError, AuthenticatedUser, Role};
use crate::audit::{AccessEvent, AccessOutcome};
use crate::state::AppState;

/// Immutable gate rules, built once at startup.
///
/// Prefix tables instead of string literals scattered through handlers:
/// the route table and this config are the only two places that know the
/// URL layout.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Path prefixes that bypass the gate entirely.
    skip_prefixes: Vec<String>,
    /// Coarse role requirements per path prefix. The first matching
    /// prefix wins.
    role_prefixes: Vec<(String, Vec<Role>)>,
}

impl GateConfig {
    pub fn new(
        skip_prefixes: impl IntoIterator<Item = impl Into<String>>,
        role_prefixes: impl IntoIterator<Item = (impl Into<String>, Vec<Role>)>,
    ) -> Self {
        Self {
            skip_prefixes: skip_prefixes.into_iter().map(Into::into).collect(),
            role_prefixes: role_prefixes
                .into_iter()
                .map(|(prefix, roles)| (prefix.into(), roles))
                .collect(),
        }
    }

    pub fn is_skipped(&self, path: &str) -> bool {
        self.skip_prefixes.iter().any(|p| path.starts_with(p))
    }

    /// The roles allowed under the first matching restricted prefix, if
    /// the path is restricted at all.
    pub fn required_roles(&self, path: &str) -> Option<&[Role]> {
        self.role_prefixes
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix))
            .map(|(_, roles)| roles.as_slice())
    }
}

impl Default for GateConfig {
    /// The service's route layout: auth and docs endpoints are open,
    /// `/api/admin/` is admin-only, `/api/editor/` takes editors and
    /// admins.
    fn default() -> Self {
        Self::new(
            [
                "/api/register",
                "/api/token",
                "/health",
                "/docs",
                "/api-doc",
            ],
            [
                ("/api/admin/", vec![Role::Admin]),
                ("/api/editor/", vec![Role::Editor, Role::Admin]),
            ],
        )
    }
}

/// Gate middleware. Installed with
/// `axum::middleware::from_fn_with_state(state, access_gate)`.
pub async fn access_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if state.gate.is_skipped(&path) {
        return next.run(request).await;
    }

    // No credential: pass through as anonymous. Handlers that need an
    // identity reject via their extractors.
    let Some(auth_header) = request.headers().get(AUTHORIZATION) else {
        return next.run(request).await;
    };

    let token = match auth_header.to_str() {
        Ok(value) => match bearer_token(value) {
            Ok(token) => token,
            Err(e) => {
                state
                    .access_log
                    .record(AccessEvent::new(&path, AccessOutcome::TokenInvalid));
                return e.into_response();
            }
        },
        Err(_) => {
            state
                .access_log
                .record(AccessEvent::new(&path, AccessOutcome::TokenInvalid));
            return AuthError::InvalidAuthHeader.into_response();
        }
    };

    let user = match state.tokens.validate_access(token) {
        Ok(claims) => AuthenticatedUser::from_claims(claims),
        Err(e) => {
            let outcome = if e.is_expired() {
                AccessOutcome::TokenExpired
            } else {
                AccessOutcome::TokenInvalid
            };
            state.access_log.record(AccessEvent::new(&path, outcome));
            return e.into_response();
        }
    };

    if let Some(required) = state.gate.required_roles(&path) {
        if !required.contains(&user.role) {
            state.access_log.record(
                AccessEvent::new(&path, AccessOutcome::Denied)
                    .with_actor(user.email.clone(), user.role),
            );
            return AuthError::InsufficientPermissions.into_response();
        }
    }

    state.access_log.record(
        AccessEvent::new(&path, AccessOutcome::Granted).with_actor(user.email.clone(), user.role),
    );

    request.extensions_mut().insert(user);
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::NewUser;
    use axum::{
        body::Body,
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
        Router,
    };
    use tower::ServiceExt;

    async fn handler() -> &'static str {
        "ok"
    }

    fn gated_router(state: AppState) -> Router {
        Router::new()
            .route("/api/register", get(handler))
            .route("/api/posts", get(handler))
            .route("/api/admin/users", get(handler))
            .route("/api/editor/dashboard", get(handler))
            .layer(from_fn_with_state(state.clone(), access_gate))
            .with_state(state)
    }

    async fn token_for(state: &AppState, role: Role) -> String {
        let user = state
            .store
            .write()
            .await
            .create_user(NewUser {
                email: format!("{}@example.com", uuid::Uuid::new_v4()),
                full_name: "Gate Test".to_string(),
                role,
                password_hash: "x".to_string(),
            })
            .unwrap();
        state.tokens.issue(&user).unwrap().access
    }

    fn request(path: &str, token: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri(path);
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn skip_paths_bypass_the_gate() {
        let app = gated_router(AppState::default());
        let response = app
            .oneshot(request("/api/register", Some("garbage-not-a-token")))
            .await
            .unwrap();
        // Even a nonsense bearer token is ignored on a skip path.
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn anonymous_requests_pass_through() {
        let app = gated_router(AppState::default());
        let response = app.oneshot(request("/api/posts", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn expired_token_is_401() {
        let state = AppState::default();
        let expired = crate::auth::TokenService::new("test-secret", -10, -10);
        let user = state
            .store
            .write()
            .await
            .create_user(NewUser {
                email: "old@example.com".to_string(),
                full_name: "Old".to_string(),
                role: Role::User,
                password_hash: "x".to_string(),
            })
            .unwrap();
        let token = expired.issue(&user).unwrap().access;

        let app = gated_router(state);
        let response = app
            .oneshot(request("/api/posts", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn tampered_token_is_401() {
        let state = AppState::default();
        let forged = crate::auth::TokenService::new("other-secret", 1800, 1800);
        let user = state
            .store
            .write()
            .await
            .create_user(NewUser {
                email: "forger@example.com".to_string(),
                full_name: "Forger".to_string(),
                role: Role::Admin,
                password_hash: "x".to_string(),
            })
            .unwrap();
        let token = forged.issue(&user).unwrap().access;

        let app = gated_router(state);
        let response = app
            .oneshot(request("/api/admin/users", Some(&token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn admin_prefix_blocks_editors_and_users() {
        let state = AppState::default();
        let editor_token = token_for(&state, Role::Editor).await;
        let user_token = token_for(&state, Role::User).await;
        let admin_token = token_for(&state, Role::Admin).await;
        let app = gated_router(state);

        let response = app
            .clone()
            .oneshot(request("/api/admin/users", Some(&editor_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .clone()
            .oneshot(request("/api/admin/users", Some(&user_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app
            .oneshot(request("/api/admin/users", Some(&admin_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn editor_prefix_admits_editors_and_admins() {
        let state = AppState::default();
        let editor_token = token_for(&state, Role::Editor).await;
        let admin_token = token_for(&state, Role::Admin).await;
        let user_token = token_for(&state, Role::User).await;
        let app = gated_router(state);

        for token in [&editor_token, &admin_token] {
            let response = app
                .clone()
                .oneshot(request("/api/editor/dashboard", Some(token)))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
        }

        let response = app
            .oneshot(request("/api/editor/dashboard", Some(&user_token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn required_roles_uses_first_matching_prefix() {
        let gate = GateConfig::default();
        assert_eq!(gate.required_roles("/api/admin/users"), Some(&[Role::Admin][..]));
        assert_eq!(
            gate.required_roles("/api/editor/dashboard"),
            Some(&[Role::Editor, Role::Admin][..])
        );
        assert_eq!(gate.required_roles("/api/posts"), None);
    }
}
