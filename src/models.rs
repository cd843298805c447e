// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response data structures used by the REST API. All types
//! derive `Serialize`/`Deserialize` and `ToSchema` for JSON handling and
//! OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Accounts**: registration, login, token refresh, profiles
//! - **Posts**: creation, editing, listing, and the moderation decision body
//! - **Dashboards**: admin and editor statistics

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Role;
use crate::store::{StoredPost, StoredUser};
use crate::workflow::{Decision, PostStatus};

// =============================================================================
// Account Models
// =============================================================================

/// A user profile as exposed by the API. The password hash never leaves
/// the store layer.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct UserResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<StoredUser> for UserResponse {
    fn from(user: StoredUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            full_name: user.full_name,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Public self-registration request.
///
/// Any `role` field a client smuggles into the JSON is simply not part
/// of this shape: self-registration always produces a `user` account.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub password_confirm: String,
}

/// Response for successful account creation (registration or admin-issued).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserCreatedResponse {
    pub id: Uuid,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub message: String,
}

/// Login request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: token pair plus the identity it was minted for.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserResponse,
}

/// Token refresh request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// Token refresh response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RefreshResponse {
    pub access: String,
}

/// Admin request to create an editor or user account. `admin` is not an
/// accepted role here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminCreateUserRequest {
    pub email: String,
    pub full_name: String,
    pub password: String,
    pub role: Role,
}

/// Partial update of the caller's own profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

// =============================================================================
// Post Models
// =============================================================================

/// A post as exposed by the API, with author and moderator names resolved.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PostResponse {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub author_id: Uuid,
    pub author_name: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_by_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    pub rejection_reason: String,
}

impl PostResponse {
    /// Assemble from a stored post plus the display names the handler
    /// resolved under the same store lock.
    pub fn from_parts(
        post: StoredPost,
        author_name: String,
        approved_by_name: Option<String>,
    ) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            author_id: post.author_id,
            author_name,
            status: post.status,
            created_at: post.created_at,
            updated_at: post.updated_at,
            approved_by: post.approved_by,
            approved_by_name,
            approved_at: post.approved_at,
            rejection_reason: post.rejection_reason,
        }
    }
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
}

/// Partial update of a post's content. Status never changes here.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// Admin decision on a pending post.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ModerationRequest {
    pub action: Decision,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

// =============================================================================
// Dashboard Models
// =============================================================================

/// System statistics for the admin dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminDashboardResponse {
    pub total_users: usize,
    pub total_editors: usize,
    pub total_admins: usize,
    pub active_users: usize,
    /// Accounts created in the last seven days.
    pub recent_registrations: usize,
    pub total_posts: usize,
    pub pending_posts: usize,
    pub approved_posts: usize,
    pub rejected_posts: usize,
}

/// Compact post line for dashboard listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct PostSummary {
    pub id: Uuid,
    pub title: String,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
}

impl From<StoredPost> for PostSummary {
    fn from(post: StoredPost) -> Self {
        Self {
            id: post.id,
            title: post.title,
            status: post.status,
            created_at: post.created_at,
        }
    }
}

/// Own-content statistics for the editor dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EditorDashboardResponse {
    pub my_posts: usize,
    pub pending_posts: usize,
    pub approved_posts: usize,
    pub rejected_posts: usize,
    /// The caller's five most recent posts.
    pub recent_posts: Vec<PostSummary>,
    pub user_role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_has_no_role_field() {
        // A smuggled role value is dropped on deserialization.
        let request: RegisterRequest = serde_json::from_value(serde_json::json!({
            "email": "a@example.com",
            "full_name": "A",
            "password": "pw",
            "password_confirm": "pw",
            "role": "admin"
        }))
        .unwrap();
        let round_trip = serde_json::to_value(&request).unwrap();
        assert!(round_trip.get("role").is_none());
    }

    #[test]
    fn moderation_request_reason_is_optional() {
        let approve: ModerationRequest =
            serde_json::from_str(r#"{"action":"approve"}"#).unwrap();
        assert_eq!(approve.action, Decision::Approve);
        assert!(approve.rejection_reason.is_none());

        let reject: ModerationRequest =
            serde_json::from_str(r#"{"action":"reject","rejection_reason":"spam"}"#).unwrap();
        assert_eq!(reject.action, Decision::Reject);
        assert_eq!(reject.rejection_reason.as_deref(), Some("spam"));
    }

    #[test]
    fn post_response_resolves_names() {
        let now = Utc::now();
        let post = StoredPost {
            id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            author_id: Uuid::new_v4(),
            status: PostStatus::Approved,
            created_at: now,
            updated_at: now,
            approved_by: Some(Uuid::new_v4()),
            approved_at: Some(now),
            rejection_reason: String::new(),
        };

        let response =
            PostResponse::from_parts(post.clone(), "Author".into(), Some("Moderator".into()));
        assert_eq!(response.author_name, "Author");
        assert_eq!(response.approved_by_name.as_deref(), Some("Moderator"));
        assert_eq!(response.approved_by, post.approved_by);
    }
}
