// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    middleware::from_fn_with_state,
    routing::{get, patch, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{access_gate, AuthenticatedUser, Role},
    models::{
        AdminCreateUserRequest, AdminDashboardResponse, CreatePostRequest,
        EditorDashboardResponse, LoginRequest, LoginResponse, ModerationRequest, PostResponse,
        PostSummary, RefreshRequest, RefreshResponse, RegisterRequest, UpdatePostRequest,
        UpdateProfileRequest, UserCreatedResponse, UserResponse,
    },
    state::AppState,
    workflow::{Decision, PostStatus},
};

pub mod auth;
pub mod health;
pub mod posts;
pub mod users;

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/token", post(auth::login))
        .route("/token/refresh", post(auth::refresh))
        .route(
            "/profile",
            get(users::get_profile).patch(users::update_profile),
        )
        .route("/posts", get(posts::list_posts).post(posts::create_post))
        .route(
            "/posts/{post_id}",
            get(posts::get_post)
                .patch(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/admin/users",
            get(users::admin_list_users).post(users::admin_create_user),
        )
        .route("/admin/dashboard", get(users::admin_dashboard))
        .route("/admin/posts/pending", get(posts::pending_posts))
        .route("/admin/posts/{post_id}/approve", patch(posts::moderate_post))
        .route("/editor/dashboard", get(users::editor_dashboard))
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(from_fn_with_state(state, access_gate))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(CorsLayer::permissive()),
        )
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::refresh,
        users::get_profile,
        users::update_profile,
        users::admin_create_user,
        users::admin_list_users,
        users::admin_dashboard,
        users::editor_dashboard,
        posts::list_posts,
        posts::create_post,
        posts::get_post,
        posts::update_post,
        posts::delete_post,
        posts::pending_posts,
        posts::moderate_post,
        health::health,
        health::liveness
    ),
    components(
        schemas(
            Role,
            PostStatus,
            Decision,
            AuthenticatedUser,
            RegisterRequest,
            UserCreatedResponse,
            LoginRequest,
            LoginResponse,
            RefreshRequest,
            RefreshResponse,
            AdminCreateUserRequest,
            UpdateProfileRequest,
            UserResponse,
            CreatePostRequest,
            UpdatePostRequest,
            ModerationRequest,
            PostResponse,
            PostSummary,
            AdminDashboardResponse,
            EditorDashboardResponse,
            health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Registration, login, and token refresh"),
        (name = "Users", description = "Profile management"),
        (name = "Posts", description = "Post creation, listing, and editing"),
        (name = "Admin", description = "User administration and moderation"),
        (name = "Editor", description = "Editor tooling"),
        (name = "Health", description = "Service health")
    )
)]
struct ApiDoc;
