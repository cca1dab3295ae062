//! Short-lived credentials asserting the relay's identity downstream.

use std::time::Duration;

use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::SigningConfig;

#[derive(Debug, Error)]
pub enum CredentialError {
    /// The configured secret is empty. Raised at startup only.
    #[error("signing secret is empty")]
    MissingSecret,

    #[error("failed to sign credential: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

/// Claims carried by a relay credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
}

/// A signed bearer token.
#[derive(Clone)]
pub struct Credential {
    token: String,
    pub claims: Claims,
}

impl Credential {
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Value for the `Authorization` header.
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("claims", &self.claims)
            .finish_non_exhaustive()
    }
}

/// HS256 credential minter. The key is fixed for the process lifetime.
pub struct CredentialMinter {
    key: EncodingKey,
    header: Header,
    ttl: Duration,
}

impl CredentialMinter {
    pub fn new(config: &SigningConfig) -> Result<Self, CredentialError> {
        if config.secret.is_empty() {
            return Err(CredentialError::MissingSecret);
        }

        Ok(Self {
            key: EncodingKey::from_secret(config.secret.as_bytes()),
            header: Header::default(),
            ttl: Duration::from_secs(config.token_ttl_secs),
        })
    }

    /// Mint a credential issued now.
    pub fn mint(&self) -> Result<Credential, CredentialError> {
        self.mint_at(Utc::now().timestamp())
    }

    /// Mint a credential issued at `issued_at` (seconds since the epoch).
    pub fn mint_at(&self, issued_at: i64) -> Result<Credential, CredentialError> {
        let ttl = i64::try_from(self.ttl.as_secs()).unwrap_or(i64::MAX);
        let claims = Claims {
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
        };
        let token = encode(&self.header, &claims, &self.key)?;
        Ok(Credential { token, claims })
    }
}
