// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Post endpoints: creation, listing, editing, and moderation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::{
    auth::{AdminOnly, Auth},
    error::ApiError,
    models::{CreatePostRequest, ModerationRequest, PostResponse, UpdatePostRequest},
    policy,
    state::AppState,
    store::{MemoryStore, StoreError, StoredPost},
};

/// Resolve display names for a post under the caller's store guard.
fn to_response(store: &MemoryStore, post: StoredPost) -> PostResponse {
    let author_name = store
        .find_user(post.author_id)
        .map(|u| u.full_name)
        .unwrap_or_default();
    let approved_by_name = post
        .approved_by
        .and_then(|id| store.find_user(id))
        .map(|u| u.full_name);
    PostResponse::from_parts(post, author_name, approved_by_name)
}

/// List posts visible to the caller.
///
/// Admins see everything, editors see their own plus approved posts,
/// users see approved posts only.
#[utoipa::path(
    get,
    path = "/api/posts",
    tag = "Posts",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Visible posts, newest first", body = [PostResponse]),
        (status = 401, description = "Missing, expired, or invalid token"),
    )
)]
pub async fn list_posts(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Json<Vec<PostResponse>> {
    let store = state.store.read().await;
    let posts = store
        .list_posts_visible_to(user.user_id, user.role)
        .into_iter()
        .map(|post| to_response(&store, post))
        .collect();
    Json(posts)
}

/// Create a post.
///
/// Editors auto-submit: their posts start in `pending`. Everyone else
/// starts with a `draft`.
#[utoipa::path(
    post,
    path = "/api/posts",
    request_body = CreatePostRequest,
    tag = "Posts",
    security(("bearer" = [])),
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 401, description = "Missing, expired, or invalid token"),
    )
)]
pub async fn create_post(
    Auth(user): Auth,
    State(state): State<AppState>,
    Json(request): Json<CreatePostRequest>,
) -> Result<(StatusCode, Json<PostResponse>), ApiError> {
    let mut store = state.store.write().await;

    // The entry status comes from the stored account, not the token, so
    // a stale role claim cannot bypass the auto-submit rule.
    let author = store
        .find_user(user.user_id)
        .filter(|u| u.is_active)
        .ok_or_else(|| ApiError::unauthorized("No active account for this token"))?;

    let post = store.create_post(&author, request.title, request.content);
    let response = to_response(&store, post);
    Ok((StatusCode::CREATED, Json(response)))
}

/// Fetch a single post.
#[utoipa::path(
    get,
    path = "/api/posts/{post_id}",
    params(("post_id" = Uuid, Path, description = "Post identifier")),
    tag = "Posts",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 403, description = "Not visible to this role"),
        (status = 404, description = "No such post"),
    )
)]
pub async fn get_post(
    Auth(user): Auth,
    Path(post_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<PostResponse>, ApiError> {
    let store = state.store.read().await;
    let post = store
        .find_post(post_id)
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    if !policy::user_can_view_post(&user, &post) {
        return Err(ApiError::forbidden(
            "You don't have permission to view this post",
        ));
    }

    Ok(Json(to_response(&store, post)))
}

/// Edit a post's title or content.
///
/// Author or admin only. Status is untouched: an approved post edited
/// here stays approved without re-review.
#[utoipa::path(
    patch,
    path = "/api/posts/{post_id}",
    params(("post_id" = Uuid, Path, description = "Post identifier")),
    request_body = UpdatePostRequest,
    tag = "Posts",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 403, description = "Not the author or an admin"),
        (status = 404, description = "No such post"),
    )
)]
pub async fn update_post(
    Auth(user): Auth,
    Path(post_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let mut store = state.store.write().await;
    let post = store
        .find_post(post_id)
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    if !policy::user_can_view_post(&user, &post) {
        return Err(ApiError::forbidden(
            "You don't have permission to view this post",
        ));
    }
    if !policy::can_modify_post(&user, &post) {
        return Err(ApiError::forbidden("You can only edit your own posts"));
    }

    let updated = store.update_post_content(post_id, request.title, request.content)?;
    let response = to_response(&store, updated);
    Ok(Json(response))
}

/// Delete a post. Author or admin only.
#[utoipa::path(
    delete,
    path = "/api/posts/{post_id}",
    params(("post_id" = Uuid, Path, description = "Post identifier")),
    tag = "Posts",
    security(("bearer" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 403, description = "Not the author or an admin"),
        (status = 404, description = "No such post"),
    )
)]
pub async fn delete_post(
    Auth(user): Auth,
    Path(post_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let mut store = state.store.write().await;
    let post = store
        .find_post(post_id)
        .ok_or_else(|| ApiError::not_found("Post not found"))?;

    if !policy::can_modify_post(&user, &post) {
        return Err(ApiError::forbidden("You can only delete your own posts"));
    }

    store.delete_post(post_id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Admin queue of posts awaiting a decision.
#[utoipa::path(
    get,
    path = "/api/admin/posts/pending",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Pending posts, newest first", body = [PostResponse]),
        (status = 403, description = "Caller is not an admin"),
    )
)]
pub async fn pending_posts(
    AdminOnly(_admin): AdminOnly,
    State(state): State<AppState>,
) -> Json<Vec<PostResponse>> {
    let store = state.store.read().await;
    let posts = store
        .list_pending_posts()
        .into_iter()
        .map(|post| to_response(&store, post))
        .collect();
    Json(posts)
}

/// Approve or reject a pending post.
///
/// The lookup is scoped to pending posts: a post in any other status is
/// reported as absent, so callers cannot probe moderation state. The
/// real cause still reaches the logs.
#[utoipa::path(
    patch,
    path = "/api/admin/posts/{post_id}/approve",
    params(("post_id" = Uuid, Path, description = "Post identifier")),
    request_body = ModerationRequest,
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Decision applied", body = PostResponse),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No pending post with this id"),
    )
)]
pub async fn moderate_post(
    AdminOnly(admin): AdminOnly,
    Path(post_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<ModerationRequest>,
) -> Result<Json<PostResponse>, ApiError> {
    let mut store = state.store.write().await;

    let post = store
        .moderate_post(
            post_id,
            request.action,
            admin.user_id,
            request.rejection_reason,
        )
        .map_err(|e| {
            if let StoreError::PostNotPending { id, actual } = &e {
                tracing::warn!(
                    post_id = %id,
                    status = %actual,
                    moderator = %admin.email,
                    "Moderation refused: post is not pending"
                );
            }
            ApiError::from(e)
        })?;

    let response = to_response(&store, post);
    Ok(Json(response))
}
