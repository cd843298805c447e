// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! In-memory relational store for users and posts.
//!
//! The store is the only shared mutable state in the service and is held
//! behind the application state's `RwLock`. Every status-changing post
//! operation is a single lookup-and-update under that lock, so the
//! pending-only moderation guard cannot race: of two concurrent approvals
//! exactly one observes `pending`.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

use crate::auth::Role;
use crate::policy;
use crate::workflow::{self, Decision, PostStatus, WorkflowError};

/// Store-level failure, mapped to HTTP outcomes at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("user not found")]
    UserNotFound,

    #[error("email already registered: {0}")]
    EmailTaken(String),

    #[error("post not found")]
    PostNotFound,

    /// The moderation target exists but is not pending. Externally
    /// indistinguishable from [`StoreError::PostNotFound`]; kept separate
    /// so logs and tests see the real cause.
    #[error("post {id} is {actual}, not pending")]
    PostNotPending { id: Uuid, actual: PostStatus },
}

/// A persisted user account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredUser {
    pub id: Uuid,
    /// Unique, normalized (NFKC + lowercase) email address.
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub is_active: bool,
    /// Argon2 PHC string; never serialized out of the store layer.
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted post under moderation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredPost {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    /// Owning reference: removed with the author.
    pub author_id: Uuid,
    pub status: PostStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Weak reference: nulled if the moderator account is removed.
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    /// Non-empty only for rejected posts, and even there optional.
    pub rejection_reason: String,
}

/// Fields for creating a user. Role is decided by the caller: handlers
/// force `user` on self-registration and cap admin-created accounts at
/// `editor`.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub role: Role,
    pub password_hash: String,
}

/// Normalize an email for storage and lookup: NFKC, trimmed, lowercased.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().nfkc().collect::<String>().to_lowercase()
}

#[derive(Default)]
pub struct MemoryStore {
    users: HashMap<Uuid, StoredUser>,
    posts: HashMap<Uuid, StoredPost>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Create a user, enforcing email uniqueness on the normalized form.
    pub fn create_user(&mut self, new_user: NewUser) -> Result<StoredUser, StoreError> {
        let email = normalize_email(&new_user.email);
        if self.find_user_by_email(&email).is_some() {
            return Err(StoreError::EmailTaken(email));
        }

        let user = StoredUser {
            id: Uuid::new_v4(),
            email,
            full_name: new_user.full_name,
            role: new_user.role,
            is_active: true,
            password_hash: new_user.password_hash,
            created_at: Utc::now(),
        };

        if user.role == Role::Admin {
            tracing::warn!(email = %user.email, "Admin user created");
        } else {
            tracing::info!(email = %user.email, role = %user.role, "New user created");
        }

        self.users.insert(user.id, user.clone());
        Ok(user)
    }

    pub fn find_user(&self, id: Uuid) -> Option<StoredUser> {
        self.users.get(&id).cloned()
    }

    /// Look up by email; the argument is normalized before comparison.
    pub fn find_user_by_email(&self, email: &str) -> Option<StoredUser> {
        let email = normalize_email(email);
        self.users.values().find(|u| u.email == email).cloned()
    }

    pub fn list_users(&self) -> Vec<StoredUser> {
        let mut users: Vec<_> = self.users.values().cloned().collect();
        users.sort_by_key(|u| u.created_at);
        users
    }

    /// Update profile fields. Role and activation are deliberately not
    /// reachable from here; email changes re-check uniqueness.
    pub fn update_profile(
        &mut self,
        id: Uuid,
        full_name: Option<String>,
        email: Option<String>,
    ) -> Result<StoredUser, StoreError> {
        if let Some(ref raw) = email {
            let normalized = normalize_email(raw);
            if self
                .users
                .values()
                .any(|u| u.email == normalized && u.id != id)
            {
                return Err(StoreError::EmailTaken(normalized));
            }
        }

        let user = self.users.get_mut(&id).ok_or(StoreError::UserNotFound)?;
        if let Some(full_name) = full_name {
            user.full_name = full_name;
        }
        if let Some(raw) = email {
            user.email = normalize_email(&raw);
        }
        Ok(user.clone())
    }

    /// Remove a user account.
    ///
    /// Authored posts go with the account; posts the user moderated keep
    /// their status but lose the moderator reference. This is the
    /// external-store deletion path: its only other effect is a log line.
    pub fn delete_user(&mut self, id: Uuid) -> Result<(), StoreError> {
        let user = self.users.remove(&id).ok_or(StoreError::UserNotFound)?;

        self.posts.retain(|_, post| post.author_id != id);
        for post in self.posts.values_mut() {
            if post.approved_by == Some(id) {
                post.approved_by = None;
            }
        }

        tracing::warn!(email = %user.email, role = %user.role, "User deleted");
        Ok(())
    }

    pub fn count_users_with_role(&self, role: Role) -> usize {
        self.users.values().filter(|u| u.role == role).count()
    }

    pub fn count_active_users(&self) -> usize {
        self.users.values().filter(|u| u.is_active).count()
    }

    pub fn count_users_joined_since(&self, since: DateTime<Utc>) -> usize {
        self.users.values().filter(|u| u.created_at >= since).count()
    }

    // =========================================================================
    // Posts
    // =========================================================================

    /// Create a post. The entry status comes from the workflow state
    /// machine: editors auto-submit, everyone else drafts.
    pub fn create_post(
        &mut self,
        author: &StoredUser,
        title: String,
        content: String,
    ) -> StoredPost {
        let now = Utc::now();
        let post = StoredPost {
            id: Uuid::new_v4(),
            title,
            content,
            author_id: author.id,
            status: PostStatus::initial_for(author.role),
            created_at: now,
            updated_at: now,
            approved_by: None,
            approved_at: None,
            rejection_reason: String::new(),
        };
        self.posts.insert(post.id, post.clone());
        post
    }

    pub fn find_post(&self, id: Uuid) -> Option<StoredPost> {
        self.posts.get(&id).cloned()
    }

    /// Posts visible to a viewer, newest first. Visibility is the same
    /// predicate the detail endpoint uses, so the list and detail views
    /// cannot drift apart.
    pub fn list_posts_visible_to(&self, viewer_id: Uuid, role: Role) -> Vec<StoredPost> {
        let mut posts: Vec<_> = self
            .posts
            .values()
            .filter(|post| policy::can_view_post(role, viewer_id, post))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    pub fn list_posts_by_author(&self, author_id: Uuid) -> Vec<StoredPost> {
        let mut posts: Vec<_> = self
            .posts
            .values()
            .filter(|post| post.author_id == author_id)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    pub fn list_pending_posts(&self) -> Vec<StoredPost> {
        let mut posts: Vec<_> = self
            .posts
            .values()
            .filter(|post| post.status == PostStatus::Pending)
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        posts
    }

    /// Edit title/content. Status is untouched: an approved post stays
    /// approved after an edit (documented workflow gap).
    pub fn update_post_content(
        &mut self,
        id: Uuid,
        title: Option<String>,
        content: Option<String>,
    ) -> Result<StoredPost, StoreError> {
        let post = self.posts.get_mut(&id).ok_or(StoreError::PostNotFound)?;
        if let Some(title) = title {
            post.title = title;
        }
        if let Some(content) = content {
            post.content = content;
        }
        post.updated_at = Utc::now();
        Ok(post.clone())
    }

    pub fn delete_post(&mut self, id: Uuid) -> Result<(), StoreError> {
        if self.posts.remove(&id).is_some() {
            Ok(())
        } else {
            Err(StoreError::PostNotFound)
        }
    }

    /// Approve or reject a pending post.
    ///
    /// Lookup and transition happen as one conditional operation while the
    /// caller holds the write lock, the in-memory equivalent of
    /// `UPDATE ... WHERE id = ? AND status = 'pending'`.
    pub fn moderate_post(
        &mut self,
        id: Uuid,
        decision: Decision,
        moderator_id: Uuid,
        reason: Option<String>,
    ) -> Result<StoredPost, StoreError> {
        let post = self.posts.get_mut(&id).ok_or(StoreError::PostNotFound)?;

        workflow::apply_decision(post, decision, moderator_id, reason, Utc::now()).map_err(
            |WorkflowError::NotPending { actual }| StoreError::PostNotPending { id, actual },
        )?;

        Ok(post.clone())
    }

    pub fn count_posts(&self) -> usize {
        self.posts.len()
    }

    pub fn count_posts_with_status(&self, status: PostStatus) -> usize {
        self.posts.values().filter(|p| p.status == status).count()
    }
}
