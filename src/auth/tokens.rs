// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Token issuance and validation.
//!
//! Tokens are signed with a shared HS256 secret. Validity is purely
//! cryptographic plus an expiry check: nothing is stored server-side and
//! there is no revocation list, so a role change only takes effect when
//! the client next obtains a token (known limitation).

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::claims::{AccessClaims, RefreshClaims, TokenKind};
use super::error::AuthError;
use crate::store::StoredUser;

/// An access/refresh token pair as returned by login.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// Issues and validates HS256-signed identity tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl TokenService {
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    /// Issue an access/refresh pair for a user.
    ///
    /// The access token embeds the full identity claim set; the refresh
    /// token carries only the user id, so identity is re-derived from the
    /// store when it is redeemed.
    pub fn issue(&self, user: &StoredUser) -> Result<TokenPair, jsonwebtoken::errors::Error> {
        Ok(TokenPair {
            access: self.issue_access(user)?,
            refresh: self.issue_refresh(user)?,
        })
    }

    /// Issue a fresh access token (used by login and token refresh).
    pub fn issue_access(&self, user: &StoredUser) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = AccessClaims {
            user_id: user.id,
            email: user.email.clone(),
            role: user.role,
            full_name: user.full_name.clone(),
            token_type: TokenKind::Access,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.access_ttl_secs)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    fn issue_refresh(&self, user: &StoredUser) -> Result<String, jsonwebtoken::errors::Error> {
        let now = Utc::now();
        let claims = RefreshClaims {
            user_id: user.id,
            token_type: TokenKind::Refresh,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.refresh_ttl_secs)).timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding_key)
    }

    /// Validate an access token and return its claims.
    pub fn validate_access(&self, token: &str) -> Result<AccessClaims, AuthError> {
        let claims: AccessClaims = self.decode(token)?;
        if claims.token_type != TokenKind::Access {
            return Err(AuthError::WrongTokenType);
        }
        Ok(claims)
    }

    /// Validate a refresh token and return its claims.
    pub fn validate_refresh(&self, token: &str) -> Result<RefreshClaims, AuthError> {
        let claims: RefreshClaims = self.decode(token)?;
        if claims.token_type != TokenKind::Refresh {
            return Err(AuthError::WrongTokenType);
        }
        Ok(claims)
    }

    fn decode<T: serde::de::DeserializeOwned>(&self, token: &str) -> Result<T, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        decode::<T>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                // Unknown role strings surface as serde failures here and
                // are rejected rather than defaulted.
                _ => AuthError::MalformedToken,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::Role;
    use chrono::Utc;
    use uuid::Uuid;

    fn sample_user() -> StoredUser {
        StoredUser {
            id: Uuid::new_v4(),
            email: "sam@example.com".to_string(),
            full_name: "Sam Carter".to_string(),
            role: Role::Editor,
            is_active: true,
            password_hash: "x".to_string(),
            created_at: Utc::now(),
        }
    }

    fn service() -> TokenService {
        TokenService::new("test-secret", 1800, 86_400)
    }

    #[test]
    fn round_trip_preserves_identity() {
        let svc = service();
        let user = sample_user();
        let pair = svc.issue(&user).unwrap();

        let claims = svc.validate_access(&pair.access).unwrap();
        assert_eq!(claims.user_id, user.id);
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, user.role);
        assert_eq!(claims.full_name, user.full_name);

        let refresh = svc.validate_refresh(&pair.refresh).unwrap();
        assert_eq!(refresh.user_id, user.id);
    }

    #[test]
    fn expired_token_is_expired_not_invalid() {
        let svc = TokenService::new("test-secret", -10, -10);
        let pair = svc.issue(&sample_user()).unwrap();

        assert_eq!(
            svc.validate_access(&pair.access).unwrap_err(),
            AuthError::TokenExpired
        );
        assert_eq!(
            svc.validate_refresh(&pair.refresh).unwrap_err(),
            AuthError::TokenExpired
        );
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let pair = service().issue(&sample_user()).unwrap();
        let other = TokenService::new("different-secret", 1800, 86_400);

        assert_eq!(
            other.validate_access(&pair.access).unwrap_err(),
            AuthError::InvalidSignature
        );
    }

    #[test]
    fn garbage_token_is_malformed() {
        assert_eq!(
            service().validate_access("not.a.token").unwrap_err(),
            AuthError::MalformedToken
        );
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let svc = service();
        let pair = svc.issue(&sample_user()).unwrap();

        assert_eq!(
            svc.validate_access(&pair.refresh).unwrap_err(),
            // The refresh token lacks the access claim fields entirely.
            AuthError::MalformedToken
        );
        assert_eq!(
            svc.validate_refresh(&pair.access).unwrap_err(),
            AuthError::WrongTokenType
        );
    }
}
