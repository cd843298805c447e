// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::roles::Role;

/// Discriminator embedded in every token so an access token cannot be
/// replayed against the refresh endpoint and vice versa.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by an access token.
///
/// The full identity travels with the token: handlers can authorize
/// without a store round-trip. Role is the closed [`Role`] enum, so a
/// token minted with any other role string fails to decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Canonical user ID
    pub user_id: Uuid,

    /// Normalized account email
    pub email: String,

    /// Role claim driving every authorization decision
    pub role: Role,

    /// Display name
    pub full_name: String,

    /// Token kind (always `access`)
    pub token_type: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Claims carried by a refresh token.
///
/// Deliberately minimal: only enough to re-derive identity from the
/// store when minting a fresh access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Canonical user ID
    pub user_id: Uuid,

    /// Token kind (always `refresh`)
    pub token_type: TokenKind,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Authenticated user information extracted from a validated access token.
///
/// This is the primary type used throughout the application to represent
/// the authenticated actor making a request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user ID
    pub user_id: Uuid,

    /// Account email as embedded in the token
    pub email: String,

    /// User's role
    pub role: Role,

    /// Display name
    pub full_name: String,

    /// Token expiration (Unix timestamp, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from validated access claims.
    pub fn from_claims(claims: AccessClaims) -> Self {
        Self {
            user_id: claims.user_id,
            email: claims.email,
            role: claims.role,
            full_name: claims.full_name,
            expires_at: claims.exp,
        }
    }

    /// Check if the user has the required role privilege.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
