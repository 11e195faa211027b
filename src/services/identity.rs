// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity provider: attendee sign-in and long-lived admin credentials.
//!
//! The event platform hands every attendee an HS256 token signed with a
//! shared secret. Signing in verifies that token and yields the attendee's
//! profile. Admin credentials are JWTs signed with our own key and stored on
//! the attendee record.

use crate::error::AppError;
use crate::models::Attendee;
use async_trait::async_trait;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Admin credentials outlive an event by a wide margin.
pub const ADMIN_CREDENTIAL_TTL_SECS: usize = 365 * 24 * 60 * 60;

const ADMIN_SCOPE: &str = "qrhunt:admin";

/// Identity provider errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    /// The presented token is missing, malformed, expired or badly signed.
    #[error("invalid token: {0}")]
    InvalidToken(String),
    /// Issuing a credential failed.
    #[error("signing failed: {0}")]
    Signing(String),
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::InvalidToken(msg) => AppError::Identity(msg),
            IdentityError::Signing(msg) => {
                AppError::Internal(anyhow::anyhow!("Credential signing failed: {}", msg))
            }
        }
    }
}

/// Claims carried by an event platform attendee token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformClaims {
    /// Platform user ID
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    /// Set for event organizers, who may use the admin console.
    #[serde(default)]
    pub organizer: bool,
}

/// Claims of an admin credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminCredentialClaims {
    pub sub: String,
    pub iat: usize,
    pub exp: usize,
    pub scope: String,
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignedInUser {
    /// Profile as reported by the platform (never carries an admin token)
    pub profile: Attendee,
    pub organizer: bool,
}

/// External identity collaborator.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify a platform token and return the signed-in user.
    async fn sign_in(&self, platform_token: &str) -> Result<SignedInUser, IdentityError>;

    /// Issue a long-lived elevated credential for a user.
    async fn issue_admin_credential(&self, user_id: &str) -> Result<String, IdentityError>;

    async fn sign_out(&self, user_id: &str) -> Result<(), IdentityError>;
}

/// HS256 identity provider using shared secrets.
#[derive(Clone)]
pub struct JwtIdentityProvider {
    platform_secret: Vec<u8>,
    signing_key: Vec<u8>,
}

impl JwtIdentityProvider {
    pub fn new(platform_secret: &[u8], signing_key: &[u8]) -> Self {
        Self {
            platform_secret: platform_secret.to_vec(),
            signing_key: signing_key.to_vec(),
        }
    }
}

fn now_secs() -> Result<usize, IdentityError> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as usize)
        .map_err(|e| IdentityError::Signing(e.to_string()))
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn sign_in(&self, platform_token: &str) -> Result<SignedInUser, IdentityError> {
        let key = DecodingKey::from_secret(&self.platform_secret);
        let validation = Validation::new(Algorithm::HS256);

        let claims = decode::<PlatformClaims>(platform_token, &key, &validation)
            .map_err(|e| IdentityError::InvalidToken(e.to_string()))?
            .claims;

        if claims.sub.trim().is_empty() {
            return Err(IdentityError::InvalidToken("empty subject".to_string()));
        }

        tracing::debug!(user_id = %claims.sub, organizer = claims.organizer, "Platform token verified");

        Ok(SignedInUser {
            profile: Attendee {
                id: claims.sub,
                first_name: claims.first_name,
                last_name: claims.last_name,
                email: claims.email,
                title: claims.title,
                company: claims.company,
                image: claims.image,
                admin_token: None,
            },
            organizer: claims.organizer,
        })
    }

    async fn issue_admin_credential(&self, user_id: &str) -> Result<String, IdentityError> {
        let now = now_secs()?;
        let claims = AdminCredentialClaims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + ADMIN_CREDENTIAL_TTL_SECS,
            scope: ADMIN_SCOPE.to_string(),
        };

        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(&self.signing_key),
        )
        .map_err(|e| IdentityError::Signing(e.to_string()))
    }

    async fn sign_out(&self, user_id: &str) -> Result<(), IdentityError> {
        // Sessions are stateless; the client drops its cookie.
        tracing::info!(user_id, "Signed out");
        Ok(())
    }
}

/// Create a platform token (for tests and local tooling).
pub fn create_platform_token(claims: &PlatformClaims, secret: &[u8]) -> anyhow::Result<String> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(secret),
    )?)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLATFORM_SECRET: &[u8] = b"platform_secret_32_bytes_long!!!";
    const SIGNING_KEY: &[u8] = b"signing_key_32_bytes_minimum!!!!";

    fn claims(sub: &str) -> PlatformClaims {
        PlatformClaims {
            sub: sub.to_string(),
            exp: now_secs().unwrap() + 3600,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: Some("ada@example.com".to_string()),
            title: None,
            company: Some("Analytical Engines".to_string()),
            image: None,
            organizer: false,
        }
    }

    fn provider() -> JwtIdentityProvider {
        JwtIdentityProvider::new(PLATFORM_SECRET, SIGNING_KEY)
    }

    fn admin_claims(credential: &str, key: &[u8]) -> Option<AdminCredentialClaims> {
        decode::<AdminCredentialClaims>(
            credential,
            &DecodingKey::from_secret(key),
            &Validation::new(Algorithm::HS256),
        )
        .ok()
        .map(|data| data.claims)
    }

    #[tokio::test]
    async fn test_sign_in_returns_profile() {
        let token = create_platform_token(&claims("u1"), PLATFORM_SECRET).unwrap();
        let user = provider().sign_in(&token).await.unwrap();

        assert_eq!(user.profile.id, "u1");
        assert_eq!(user.profile.first_name, "Ada");
        assert_eq!(user.profile.company.as_deref(), Some("Analytical Engines"));
        assert!(user.profile.admin_token.is_none());
        assert!(!user.organizer);
    }

    #[tokio::test]
    async fn test_sign_in_rejects_wrong_secret() {
        let token = create_platform_token(&claims("u1"), b"some_other_secret_entirely!!!!!").unwrap();
        let result = provider().sign_in(&token).await;
        assert!(matches!(result, Err(IdentityError::InvalidToken(_))));
    }

    #[tokio::test]
    async fn test_sign_in_rejects_empty_subject() {
        let token = create_platform_token(&claims(" "), PLATFORM_SECRET).unwrap();
        assert!(provider().sign_in(&token).await.is_err());
    }

    #[tokio::test]
    async fn test_admin_credential_claims() {
        let credential = provider().issue_admin_credential("u1").await.unwrap();

        let claims = admin_claims(&credential, SIGNING_KEY).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.scope, ADMIN_SCOPE);
        assert_eq!(claims.exp - claims.iat, ADMIN_CREDENTIAL_TTL_SECS);
        assert!(admin_claims(&credential, PLATFORM_SECRET).is_none());
    }

    #[tokio::test]
    async fn test_admin_credential_does_not_sign_in() {
        let credential = provider().issue_admin_credential("u1").await.unwrap();
        // Signed with our key, not the platform secret
        assert!(provider().sign_in(&credential).await.is_err());
    }
}
