// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Outbound email.
//!
//! The only mail this service sends is the welcome message on account
//! creation, and a delivery failure must never fail the request that
//! triggered it. Handlers call [`send_welcome_email`], which hands the
//! blocking SMTP transport to a worker thread and logs the outcome.

use std::sync::Arc;
use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};

use crate::config::SmtpConfig;
use crate::store::StoredUser;

/// Error from building or sending a message.
#[derive(Debug, thiserror::Error)]
pub enum MailerError {
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("smtp failure: {0}")]
    Smtp(String),
}

/// Mail delivery interface. Implementations are synchronous; callers
/// run them off the request path.
pub trait Mailer: Send + Sync {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError>;
}

/// SMTP-backed mailer (lettre relay transport).
pub struct SmtpMailer {
    transport: SmtpTransport,
    from: String,
}

impl SmtpMailer {
    pub fn new(config: &SmtpConfig) -> Result<Self, MailerError> {
        let transport = SmtpTransport::starttls_relay(&config.host)
            .map_err(|e| MailerError::Smtp(e.to_string()))?
            .port(config.port)
            .credentials(Credentials::new(
                config.username.clone(),
                config.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(30)))
            .build();

        Ok(Self {
            transport,
            from: config.from_address.clone(),
        })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailerError> {
        let message = Message::builder()
            .from(
                self.from
                    .parse()
                    .map_err(|_| MailerError::InvalidAddress(self.from.clone()))?,
            )
            .to(to
                .parse()
                .map_err(|_| MailerError::InvalidAddress(to.to_string()))?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailerError::Smtp(e.to_string()))?;

        self.transport
            .send(&message)
            .map(|_| ())
            .map_err(|e| MailerError::Smtp(e.to_string()))
    }
}

/// Mailer used when no SMTP relay is configured. Logs instead of sending.
#[derive(Debug, Default)]
pub struct NoopMailer;

impl Mailer for NoopMailer {
    fn send(&self, to: &str, subject: &str, _body: &str) -> Result<(), MailerError> {
        tracing::debug!(to, subject, "Mail delivery skipped (no SMTP configured)");
        Ok(())
    }
}

/// Send the welcome mail for a freshly created account, off the request
/// path. Failures are logged and swallowed.
pub fn send_welcome_email(mailer: Arc<dyn Mailer>, user: &StoredUser) {
    let to = user.email.clone();
    let subject = "Welcome to Our Platform".to_string();
    let body = format!(
        "Hello {},\n\n\
         Welcome to our platform! Your account has been created with the role: {}\n\n\
         You can now login with your email: {}\n\n\
         Best regards,\n\
         The Team\n",
        user.full_name, user.role, user.email
    );

    let _ = tokio::task::spawn_blocking(move || {
        if let Err(e) = mailer.send(&to, &subject, &body) {
            tracing::warn!(to, error = %e, "Failed to send welcome email");
        }
    });
}
