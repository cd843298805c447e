// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authorization predicates.
//!
//! Every fine-grained permission decision in the service goes through
//! this module, so an endpoint can never enforce a subtly different
//! version of "owner or admin" than its neighbours. Predicates return
//! plain booleans; handlers turn a `false` into a 403.
//!
//! View permission is resource-state-dependent (an editor sees their own
//! unapproved posts but nobody else's), which is why [`can_view_post`]
//! inspects the post instead of collapsing into a role check.

use uuid::Uuid;

use crate::auth::{AuthenticatedUser, Role};
use crate::store::StoredPost;
use crate::workflow::PostStatus;

/// Exact role match.
pub fn has_role(user: &AuthenticatedUser, role: Role) -> bool {
    user.role == role
}

/// Role membership in a set.
pub fn has_any_role(user: &AuthenticatedUser, roles: &[Role]) -> bool {
    roles.contains(&user.role)
}

/// Object-level ownership: the actor owns the resource, or is an admin.
pub fn is_owner_or_admin(user: &AuthenticatedUser, owner_id: Uuid) -> bool {
    user.user_id == owner_id || user.role == Role::Admin
}

/// Whether a viewer may see a post.
///
/// - admin: everything
/// - editor: own posts, plus anything approved
/// - user: approved posts only
pub fn can_view_post(role: Role, viewer_id: Uuid, post: &StoredPost) -> bool {
    match role {
        Role::Admin => true,
        Role::Editor => post.author_id == viewer_id || post.status == PostStatus::Approved,
        Role::User => post.status == PostStatus::Approved,
    }
}

/// [`can_view_post`] over the authenticated actor.
pub fn user_can_view_post(user: &AuthenticatedUser, post: &StoredPost) -> bool {
    can_view_post(user.role, user.user_id, post)
}

/// Whether an actor may edit or delete a post: its author, or an admin.
pub fn can_modify_post(user: &AuthenticatedUser, post: &StoredPost) -> bool {
    is_owner_or_admin(user, post.author_id)
}
