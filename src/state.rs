// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::audit::AccessLog;
use crate::auth::{GateConfig, TokenService};
use crate::mailer::{Mailer, NoopMailer};
use crate::store::MemoryStore;

/// Shared application state, cloned into every handler.
///
/// The store is the only mutable piece; everything else is immutable
/// after construction.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<MemoryStore>>,
    pub tokens: Arc<TokenService>,
    pub gate: Arc<GateConfig>,
    pub access_log: AccessLog,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub fn new(tokens: TokenService, gate: GateConfig, mailer: Arc<dyn Mailer>) -> Self {
        Self {
            store: Arc::new(RwLock::new(MemoryStore::new())),
            tokens: Arc::new(tokens),
            gate: Arc::new(gate),
            access_log: AccessLog::new(),
            mailer,
        }
    }
}

impl Default for AppState {
    /// Test-friendly state: fixed secret, default gate table, no mail.
    fn default() -> Self {
        Self::new(
            TokenService::new("test-secret", 1800, 86_400),
            GateConfig::default(),
            Arc::new(NoopMailer),
        )
    }
}
