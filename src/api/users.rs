// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User profile and administration endpoints.

use axum::{extract::State, http::StatusCode, Json};
use chrono::{Duration, Utc};

use crate::{
    auth::{password, AdminOnly, Auth, EditorOrAdmin, Role},
    error::ApiError,
    mailer::send_welcome_email,
    models::{
        AdminCreateUserRequest, AdminDashboardResponse, EditorDashboardResponse, PostSummary,
        UpdateProfileRequest, UserCreatedResponse, UserResponse,
    },
    state::AppState,
    store::NewUser,
    workflow::PostStatus,
};

/// Get the caller's own profile.
///
/// Reads the account from the store rather than echoing token claims, so
/// a profile edit is visible before the token is reissued.
#[utoipa::path(
    get,
    path = "/api/profile",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Own profile", body = UserResponse),
        (status = 401, description = "Missing, expired, or invalid token"),
    )
)]
pub async fn get_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<UserResponse>, ApiError> {
    let stored = state
        .store
        .read()
        .await
        .find_user(user.user_id)
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(stored.into()))
}

/// Update the caller's own profile (name and email). Role is not
/// reachable from here.
#[utoipa::path(
    patch,
    path = "/api/profile",
    request_body = UpdateProfileRequest,
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Email already in use"),
    )
)]
pub async fn update_profile(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let updated = state
        .store
        .write()
        .await
        .update_profile(user.user_id, request.full_name, request.email)?;
    Ok(Json(updated.into()))
}

/// Admin-issued account creation: editors and users only, never admins.
#[utoipa::path(
    post,
    path = "/api/admin/users",
    request_body = AdminCreateUserRequest,
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Account created", body = UserCreatedResponse),
        (status = 400, description = "Disallowed role or duplicate email"),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn admin_create_user(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
    Json(request): Json<AdminCreateUserRequest>,
) -> Result<(StatusCode, Json<UserCreatedResponse>), ApiError> {
    if request.role == Role::Admin {
        return Err(ApiError::validation(
            "role",
            "Admin can only create users with 'editor' or 'user' roles",
        ));
    }

    let password_hash = password::hash_password(&request.password)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {e}")))?;

    let user = state.store.write().await.create_user(NewUser {
        email: request.email,
        full_name: request.full_name,
        role: request.role,
        password_hash,
    })?;

    send_welcome_email(state.mailer.clone(), &user);

    let title = match user.role {
        Role::Admin => "Admin",
        Role::Editor => "Editor",
        Role::User => "User",
    };

    Ok((
        StatusCode::CREATED,
        Json(UserCreatedResponse {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            message: format!("{title} created successfully"),
        }),
    ))
}

/// Admin view of all accounts.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "All user profiles", body = [UserResponse]),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn admin_list_users(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<Vec<UserResponse>> {
    let store = state.store.read().await;
    Json(store.list_users().into_iter().map(Into::into).collect())
}

/// Admin dashboard with system statistics.
#[utoipa::path(
    get,
    path = "/api/admin/dashboard",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "System statistics", body = AdminDashboardResponse),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn admin_dashboard(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<AdminDashboardResponse> {
    let store = state.store.read().await;
    let week_ago = Utc::now() - Duration::days(7);

    Json(AdminDashboardResponse {
        total_users: store.count_users_with_role(Role::User),
        total_editors: store.count_users_with_role(Role::Editor),
        total_admins: store.count_users_with_role(Role::Admin),
        active_users: store.count_active_users(),
        recent_registrations: store.count_users_joined_since(week_ago),
        total_posts: store.count_posts(),
        pending_posts: store.count_posts_with_status(PostStatus::Pending),
        approved_posts: store.count_posts_with_status(PostStatus::Approved),
        rejected_posts: store.count_posts_with_status(PostStatus::Rejected),
    })
}

/// Editor dashboard: the caller's own content statistics.
#[utoipa::path(
    get,
    path = "/api/editor/dashboard",
    tag = "Editor",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Own content statistics", body = EditorDashboardResponse),
        (status = 403, description = "Caller is neither editor nor admin"),
    )
)]
pub async fn editor_dashboard(
    EditorOrAdmin(user): EditorOrAdmin,
    State(state): State<AppState>,
) -> Json<EditorDashboardResponse> {
    let store = state.store.read().await;
    let posts = store.list_posts_by_author(user.user_id);

    let count_with = |status: PostStatus| posts.iter().filter(|p| p.status == status).count();

    Json(EditorDashboardResponse {
        my_posts: posts.len(),
        pending_posts: count_with(PostStatus::Pending),
        approved_posts: count_with(PostStatus::Approved),
        rejected_posts: count_with(PostStatus::Rejected),
        recent_posts: posts
            .iter()
            .take(5)
            .cloned()
            .map(PostSummary::from)
            .collect(),
        user_role: user.role,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::store::StoredUser;
    use uuid::Uuid;

    async fn seed_user(state: &AppState, email: &str, role: Role) -> StoredUser {
        state
            .store
            .write()
            .await
            .create_user(NewUser {
                email: email.to_string(),
                full_name: "Seeded".to_string(),
                role,
                password_hash: "x".to_string(),
            })
            .unwrap()
    }

    fn as_actor(user: &StoredUser) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            full_name: user.full_name.clone(),
            expires_at: 0,
        }
    }

    #[tokio::test]
    async fn profile_reflects_store_not_token() {
        let state = AppState::default();
        let user = seed_user(&state, "p@x.com", Role::User).await;

        let Json(profile) = get_profile(Auth(as_actor(&user)), State(state.clone()))
            .await
            .unwrap();
        assert_eq!(profile.email, "p@x.com");

        // Rename through the store; the next read sees the new name even
        // though the token still carries the old one.
        state
            .store
            .write()
            .await
            .update_profile(user.id, Some("Renamed".to_string()), None)
            .unwrap();
        let Json(profile) = get_profile(Auth(as_actor(&user)), State(state)).await.unwrap();
        assert_eq!(profile.full_name, "Renamed");
    }

    #[tokio::test]
    async fn update_profile_enforces_email_uniqueness() {
        let state = AppState::default();
        seed_user(&state, "taken@x.com", Role::User).await;
        let user = seed_user(&state, "mine@x.com", Role::User).await;

        let err = update_profile(
            Auth(as_actor(&user)),
            State(state),
            Json(UpdateProfileRequest {
                full_name: None,
                email: Some("TAKEN@x.com".to_string()),
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_can_create_editor_but_not_admin() {
        let state = AppState::default();
        let admin = seed_user(&state, "adm@x.com", Role::Admin).await;

        let (status, Json(created)) = admin_create_user(
            AdminOnly(as_actor(&admin)),
            State(state.clone()),
            Json(AdminCreateUserRequest {
                email: "ed@x.com".to_string(),
                full_name: "New Editor".to_string(),
                password: "pass-word-1".to_string(),
                role: Role::Editor,
            }),
        )
        .await
        .unwrap();
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created.role, Role::Editor);
        assert_eq!(created.message, "Editor created successfully");

        let err = admin_create_user(
            AdminOnly(as_actor(&admin)),
            State(state),
            Json(AdminCreateUserRequest {
                email: "adm2@x.com".to_string(),
                full_name: "Another Admin".to_string(),
                password: "pass-word-1".to_string(),
                role: Role::Admin,
            }),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.fields.unwrap().contains_key("role"));
    }

    #[tokio::test]
    async fn admin_list_returns_everyone() {
        let state = AppState::default();
        let admin = seed_user(&state, "adm@x.com", Role::Admin).await;
        seed_user(&state, "u1@x.com", Role::User).await;
        seed_user(&state, "u2@x.com", Role::User).await;

        let Json(users) = admin_list_users(AdminOnly(as_actor(&admin)), State(state)).await;
        assert_eq!(users.len(), 3);
    }

    #[tokio::test]
    async fn admin_dashboard_counts_roles_and_statuses() {
        let state = AppState::default();
        let admin = seed_user(&state, "adm@x.com", Role::Admin).await;
        let editor = seed_user(&state, "ed@x.com", Role::Editor).await;
        seed_user(&state, "u@x.com", Role::User).await;

        {
            let mut store = state.store.write().await;
            let post = store.create_post(&editor, "t".into(), "c".into());
            store
                .moderate_post(post.id, crate::workflow::Decision::Approve, admin.id, None)
                .unwrap();
            store.create_post(&editor, "t2".into(), "c2".into());
        }

        let Json(dashboard) = admin_dashboard(AdminOnly(as_actor(&admin)), State(state)).await;
        assert_eq!(dashboard.total_users, 1);
        assert_eq!(dashboard.total_editors, 1);
        assert_eq!(dashboard.total_admins, 1);
        assert_eq!(dashboard.active_users, 3);
        assert_eq!(dashboard.recent_registrations, 3);
        assert_eq!(dashboard.total_posts, 2);
        assert_eq!(dashboard.pending_posts, 1);
        assert_eq!(dashboard.approved_posts, 1);
        assert_eq!(dashboard.rejected_posts, 0);
    }

    #[tokio::test]
    async fn editor_dashboard_counts_only_own_posts() {
        let state = AppState::default();
        let editor = seed_user(&state, "ed@x.com", Role::Editor).await;
        let other = seed_user(&state, "other@x.com", Role::Editor).await;

        {
            let mut store = state.store.write().await;
            for i in 0..6 {
                store.create_post(&editor, format!("post {i}"), "c".into());
            }
            store.create_post(&other, "not mine".into(), "c".into());
        }

        let Json(dashboard) =
            editor_dashboard(EditorOrAdmin(as_actor(&editor)), State(state)).await;
        assert_eq!(dashboard.my_posts, 6);
        assert_eq!(dashboard.pending_posts, 6);
        assert_eq!(dashboard.recent_posts.len(), 5);
        assert_eq!(dashboard.user_role, Role::Editor);
        assert!(dashboard
            .recent_posts
            .iter()
            .all(|p| p.title.starts_with("post")));
    }

    #[tokio::test]
    async fn profile_of_deleted_account_is_not_found() {
        let state = AppState::default();
        let ghost = AuthenticatedUser {
            user_id: Uuid::new_v4(),
            email: "ghost@x.com".to_string(),
            role: Role::User,
            full_name: "Ghost".to_string(),
            expires_at: 0,
        };

        let err = get_profile(Auth(ghost), State(state)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }
}
