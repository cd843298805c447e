// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! JWT authentication for the content approval API.
//!
//! ## Auth Flow
//!
//! 1. Client logs in with email + password and receives an access/refresh
//!    token pair
//! 2. Client sends `Authorization: Bearer <access token>` on every request
//! 3. The request gate:
//!    - Verifies the HS256 signature and expiry
//!    - Attaches the decoded identity to the request context
//!    - Applies coarse path-prefix role restrictions
//!    - Records the attempt in the access log
//!
//! ## Security
//!
//! - Tokens are signed with a shared secret (`SECRET_KEY`); validity is
//!   purely cryptographic plus expiry, with no server-side session state
//! - The role claim is a closed enum; unknown role values fail validation
//! - Expired and invalid tokens are distinct 401 outcomes, never treated
//!   as anonymous

pub mod claims;
pub mod error;
pub mod extractor;
pub mod gate;
pub mod password;
pub mod roles;
pub mod tokens;

pub use claims::{AccessClaims, AuthenticatedUser, RefreshClaims, TokenKind};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth, EditorOrAdmin};
pub use gate::{access_gate, GateConfig};
pub use roles::Role;
pub use tokens::{TokenPair, TokenService};
