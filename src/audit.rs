// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Access logging for authentication and authorization decisions.
//!
//! Every token validation attempt at the request gate, successful or
//! not, is reported here. The sink emits structured tracing events:
//! recording is synchronous CPU work that never blocks on I/O in the
//! request path, and a failing subscriber is the subscriber's problem,
//! not the request's.

use crate::auth::Role;

/// Outcome of an access attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    /// Token valid; coarse path rules passed.
    Granted,
    /// Token valid but the path's role requirement failed.
    Denied,
    /// Token past its expiry.
    TokenExpired,
    /// Malformed token, bad signature, or unknown role claim.
    TokenInvalid,
}

impl AccessOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessOutcome::Granted => "granted",
            AccessOutcome::Denied => "denied",
            AccessOutcome::TokenExpired => "token_expired",
            AccessOutcome::TokenInvalid => "token_invalid",
        }
    }
}

/// A single access attempt.
#[derive(Debug, Clone)]
pub struct AccessEvent {
    /// Actor email, when the token decoded far enough to know it.
    pub actor: Option<String>,
    /// Role claim, when known.
    pub role: Option<Role>,
    /// Request path the attempt targeted.
    pub path: String,
    pub outcome: AccessOutcome,
}

impl AccessEvent {
    pub fn new(path: impl Into<String>, outcome: AccessOutcome) -> Self {
        Self {
            actor: None,
            role: None,
            path: path.into(),
            outcome,
        }
    }

    pub fn with_actor(mut self, actor: impl Into<String>, role: Role) -> Self {
        self.actor = Some(actor.into());
        self.role = Some(role);
        self
    }
}

/// Fire-and-forget access log backed by tracing.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLog;

impl AccessLog {
    pub fn new() -> Self {
        Self
    }

    /// Record an access attempt. Best-effort: never returns an error and
    /// never blocks.
    pub fn record(&self, event: AccessEvent) {
        let actor = event.actor.as_deref().unwrap_or("<anonymous>");
        let role = event.role.map(|r| r.as_str()).unwrap_or("<unknown>");
        match event.outcome {
            AccessOutcome::Granted => {
                tracing::info!(
                    actor,
                    role,
                    path = %event.path,
                    outcome = event.outcome.as_str(),
                    "Access granted"
                );
            }
            AccessOutcome::Denied | AccessOutcome::TokenExpired | AccessOutcome::TokenInvalid => {
                tracing::warn!(
                    actor,
                    role,
                    path = %event.path,
                    outcome = event.outcome.as_str(),
                    "Access refused"
                );
            }
        }
    }
}
