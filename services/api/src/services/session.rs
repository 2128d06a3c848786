//! services/api/src/services/session.rs
//!
//! The Session Issuer: signup, login and session token validation.
//!
//! Logout is stateless. A token stays cryptographically valid until it expires,
//! even after the client has been told to discard it.

use chrono::{DateTime, Duration, Utc};
use event_tracker_core::clock::Clock;
use event_tracker_core::domain::User;
use event_tracker_core::ports::{DatabaseService, PortError};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::services::password::PasswordHashing;
use crate::services::token::{SessionClaims, TokenSigner};

/// Validity window of an issued session token.
pub const SESSION_TTL_DAYS: i64 = 7;

const MISSING_CREDENTIALS: &str = "Email and password are required";
const EMAIL_IN_USE: &str = "Email already in use";

/// A freshly issued session.
#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub user: User,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionIssuer {
    db: Arc<dyn DatabaseService>,
    clock: Arc<dyn Clock>,
    hashing: PasswordHashing,
    signer: TokenSigner,
    /// Verified against when the email is unknown, so both failure paths cost the same.
    dummy_hash: String,
}

impl SessionIssuer {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        clock: Arc<dyn Clock>,
        hashing: PasswordHashing,
        signing_secret: &[u8],
    ) -> Result<Self, ServiceError> {
        let dummy_hash = hashing.hash_blocking("timing-equalizer")?;
        Ok(Self {
            db,
            clock,
            hashing,
            signer: TokenSigner::new(signing_secret),
            dummy_hash,
        })
    }

    /// Registers a new user. Returns the identity, never the hash.
    pub async fn signup(&self, email: &str, password: &str) -> Result<User, ServiceError> {
        if email.trim().is_empty() || password.is_empty() {
            warn!("Signup validation failed: missing fields");
            return Err(ServiceError::Validation(MISSING_CREDENTIALS.to_string()));
        }

        match self.db.get_user_by_email(email).await {
            Ok(_) => {
                warn!(email = %email, "Signup failed: email already in use");
                return Err(ServiceError::Conflict(EMAIL_IN_USE.to_string()));
            }
            Err(PortError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let password_hash = self.hashing.hash(password).await?;

        // A concurrent signup can still win the race; the store's unique key decides.
        let user = self
            .db
            .create_user_with_email(email, &password_hash)
            .await
            .map_err(|e| match e {
                PortError::Conflict(_) => {
                    warn!(email = %email, "Signup failed: email claimed concurrently");
                    ServiceError::Conflict(EMAIL_IN_USE.to_string())
                }
                other => other.into(),
            })?;

        info!(user_id = %user.id, email = %user.email, "User created");
        Ok(user)
    }

    /// Verifies credentials and issues a signed session token.
    pub async fn login(&self, email: &str, password: &str) -> Result<IssuedSession, ServiceError> {
        if email.trim().is_empty() || password.is_empty() {
            warn!("Login validation failed: missing fields");
            return Err(ServiceError::Validation(MISSING_CREDENTIALS.to_string()));
        }

        let credentials = match self.db.get_user_by_email(email).await {
            Ok(credentials) => credentials,
            Err(PortError::NotFound(_)) => {
                self.hashing.verify(password, &self.dummy_hash).await?;
                warn!(email = %email, "Login failed: user not found");
                return Err(ServiceError::InvalidCredentials);
            }
            Err(e) => return Err(e.into()),
        };

        if !self
            .hashing
            .verify(password, &credentials.hashed_password)
            .await?
        {
            warn!(user_id = %credentials.id, email = %email, "Login failed: incorrect password");
            return Err(ServiceError::InvalidCredentials);
        }

        let now = self.clock.now();
        let expires_at = now + Duration::days(SESSION_TTL_DAYS);
        let claims = SessionClaims {
            sub: credentials.id,
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };
        let token = self
            .signer
            .sign(&claims)
            .map_err(|e| ServiceError::Internal(format!("Failed to sign session token: {}", e)))?;

        info!(user_id = %credentials.id, email = %email, "Login successful");
        Ok(IssuedSession {
            user: credentials.to_user(),
            token,
            expires_at,
        })
    }

    /// Resolves a token to the user it was issued for.
    ///
    /// Every rejection reason collapses into `Unauthenticated`; store outages
    /// surface as `Internal`.
    pub async fn validate_token(&self, token: &str) -> Result<User, ServiceError> {
        let claims = self.signer.verify(token, self.clock.now()).map_err(|e| {
            debug!(reason = %e, "Session token rejected");
            ServiceError::Unauthenticated
        })?;

        match self.db.get_user_by_id(claims.sub).await {
            Ok(user) => Ok(user),
            Err(PortError::NotFound(_)) => {
                debug!(user_id = %claims.sub, "Session token names a user that no longer exists");
                Err(ServiceError::Unauthenticated)
            }
            Err(e) => Err(e.into()),
        }
    }
}
