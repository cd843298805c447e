// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Post approval workflow.
//!
//! Posts move through `draft -> pending -> approved | rejected`. The
//! entry state depends on who creates the post (editors auto-submit),
//! and only a pending post can be moderated. Approved and rejected are
//! terminal: there is no resubmission path, and editing a post's content
//! never changes its status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Role;
use crate::store::StoredPost;

/// Lifecycle status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    /// Authored but not submitted for review
    Draft,
    /// Awaiting an admin decision
    Pending,
    /// Published; visible to every role
    Approved,
    /// Declined; visible to the author and admins only
    Rejected,
}

impl PostStatus {
    /// Entry state for a newly created post.
    ///
    /// Editors auto-submit: their posts start in review. Everyone else
    /// starts with a draft.
    pub fn initial_for(role: Role) -> PostStatus {
        match role {
            Role::Editor => PostStatus::Pending,
            Role::Admin | Role::User => PostStatus::Draft,
        }
    }

    /// Whether the status has any outgoing transitions left.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PostStatus::Approved | PostStatus::Rejected)
    }
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PostStatus::Draft => "draft",
            PostStatus::Pending => "pending",
            PostStatus::Approved => "approved",
            PostStatus::Rejected => "rejected",
        };
        f.write_str(s)
    }
}

/// Moderation decision on a pending post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

/// A transition that the state machine refused.
///
/// Externally a non-pending post is masked as absent (404) so callers
/// cannot probe moderation state; this internal kind keeps the real
/// cause available for logging and tests.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkflowError {
    #[error("post is {actual}, not pending")]
    NotPending { actual: PostStatus },
}

/// Apply an admin decision to a post.
///
/// Only valid when the post is exactly `pending`. On approve the
/// rejection reason is cleared; on reject it is set to the supplied text
/// (which may be empty). Both paths record the deciding admin and the
/// decision instant.
pub fn apply_decision(
    post: &mut StoredPost,
    decision: Decision,
    moderator_id: Uuid,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> Result<(), WorkflowError> {
    if post.status != PostStatus::Pending {
        return Err(WorkflowError::NotPending {
            actual: post.status,
        });
    }

    post.status = match decision {
        Decision::Approve => PostStatus::Approved,
        Decision::Reject => PostStatus::Rejected,
    };
    post.approved_by = Some(moderator_id);
    post.approved_at = Some(now);
    post.rejection_reason = match decision {
        Decision::Approve => String::new(),
        Decision::Reject => reason.unwrap_or_default(),
    };
    post.updated_at = now;

    Ok(())
}
