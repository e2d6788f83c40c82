//! Account registration, login and bearer-token verification.
//!
//! Passwords are hashed with Argon2id (random salt, PHC string format).
//! Tokens are HS256 JWTs carrying the user id in `sub`.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AuthConfig, User, UserProfile};
use crate::domain::ports::UserRepository;

/// Shortest password accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// JWT claims issued at login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

/// Registers users, checks their credentials and issues bearer tokens.
pub struct AuthService<U: UserRepository + ?Sized> {
    users: Arc<U>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_ttl_secs: i64,
}

impl<U: UserRepository + ?Sized> AuthService<U> {
    /// Create a service signing tokens with `config.jwt_secret`.
    pub fn new(users: Arc<U>, config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.as_bytes();
        Self {
            users,
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl_secs: i64::try_from(config.token_ttl_secs).unwrap_or(i64::MAX),
        }
    }

    /// Create an account. Emails are compared trimmed and lowercased.
    #[instrument(skip(self, email, password))]
    pub async fn register(&self, email: &str, password: &str) -> DomainResult<UserProfile> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(DomainError::ValidationFailed(format!(
                "password must be at least {MIN_PASSWORD_LEN} characters"
            )));
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(DomainError::EmailAlreadyRegistered(email));
        }

        let password_hash = hash_password(password.to_string()).await?;
        let user = User::new(email, password_hash);
        self.users.insert(&user).await?;

        info!(user_id = %user.id, "user registered");
        Ok(user.profile())
    }

    /// Check credentials and issue a bearer token.
    #[instrument(skip(self, email, password))]
    pub async fn login(&self, email: &str, password: &str) -> DomainResult<String> {
        let email = normalize_email(email).map_err(|_| DomainError::InvalidCredentials)?;
        if password.is_empty() {
            return Err(DomainError::InvalidCredentials);
        }

        let Some(user) = self.users.find_by_email(&email).await? else {
            warn!("login for unknown email");
            return Err(DomainError::InvalidCredentials);
        };

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            warn!(user_id = %user.id, "login with wrong password");
            return Err(DomainError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        info!(user_id = %user.id, "user logged in");
        Ok(token)
    }

    /// Validate a bearer token and return the owner id it names.
    pub fn verify(&self, token: &str) -> DomainResult<Uuid> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.sub)
            .map_err(|e| DomainError::InvalidToken(e.to_string()))
    }

    fn issue_token(&self, user: &User) -> DomainResult<String> {
        let iat = Utc::now().timestamp();
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            iat,
            exp: iat.saturating_add(self.token_ttl_secs),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| DomainError::TokenError(e.to_string()))
    }
}

fn normalize_email(email: &str) -> DomainResult<String> {
    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(DomainError::ValidationFailed("email must be a valid address".to_string()));
    }
    Ok(email)
}

/// Argon2 is CPU bound; keep it off the async workers.
async fn hash_password(password: String) -> DomainResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| DomainError::CredentialError(e.to_string()))
    })
    .await
    .map_err(|e| DomainError::CredentialError(e.to_string()))?
}

async fn verify_password(password: String, hash: String) -> DomainResult<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash).map_err(|e| DomainError::CredentialError(e.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await
    .map_err(|e| DomainError::CredentialError(e.to_string()))?
}
