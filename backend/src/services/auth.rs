//! Authentication service for account registration, login, and token management
//!
//! Accounts are ledger identities: registration derives a fresh address and
//! binds a bcrypt credential to it. Roles are never embedded in tokens; the
//! registry is consulted live on every mutating call.

use std::collections::HashMap;
use std::sync::Arc;

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use shared::models::SessionTokens;
use shared::types::Address;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    accounts: Arc<RwLock<HashMap<Address, Account>>>,
    refresh_tokens: Arc<RwLock<HashMap<String, RefreshRecord>>>,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Stored account credential
#[derive(Debug, Clone)]
struct Account {
    name: String,
    password_hash: String,
}

/// Stored refresh token state
#[derive(Debug, Clone)]
struct RefreshRecord {
    address: Address,
    expires_at: i64,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Caller address
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(config: &Config) -> Self {
        Self {
            accounts: Arc::new(RwLock::new(HashMap::new())),
            refresh_tokens: Arc::new(RwLock::new(HashMap::new())),
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Register a new account: derive a fresh address, store the credential,
    /// and return a session
    pub async fn register(&self, name: &str, password: &str) -> AppResult<SessionTokens> {
        let address = Self::derive_address(name);

        let password_hash = hash(password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        self.accounts.write().await.insert(
            address.clone(),
            Account {
                name: name.to_string(),
                password_hash,
            },
        );

        tracing::info!(address = %address, "account registered");
        self.issue_session(address).await
    }

    /// Authenticate with address and password
    pub async fn login(&self, address: &Address, password: &str) -> AppResult<SessionTokens> {
        let account = self
            .accounts
            .read()
            .await
            .get(address)
            .cloned()
            .ok_or(AppError::InvalidCredentials)?;

        let valid = verify(password, &account.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        tracing::debug!(address = %address, name = %account.name, "login");
        self.issue_session(address.clone()).await
    }

    /// Rotate a refresh token into a new session
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<SessionTokens> {
        let now = Utc::now().timestamp();

        let record = {
            let mut tokens = self.refresh_tokens.write().await;
            tokens
                .remove(refresh_token)
                .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?
        };

        if record.expires_at <= now {
            return Err(AppError::Unauthorized("Refresh token expired".to_string()));
        }

        self.issue_session(record.address).await
    }

    /// Validate an access token and return its claims
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    /// Generate a fresh access/refresh token pair for an address
    async fn issue_session(&self, address: Address) -> AppResult<SessionTokens> {
        let now = Utc::now();
        let access_exp = now + Duration::seconds(self.access_token_expiry);

        let claims = Claims {
            sub: address.to_string(),
            exp: access_exp.timestamp(),
            iat: now.timestamp(),
        };

        let access_token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))?;

        let refresh_token = Uuid::new_v4().to_string();
        self.refresh_tokens.write().await.insert(
            refresh_token.clone(),
            RefreshRecord {
                address: address.clone(),
                expires_at: now.timestamp() + self.refresh_token_expiry,
            },
        );

        Ok(SessionTokens {
            address,
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Derive a fresh ledger address from random material and the owner name
    fn derive_address(name: &str) -> Address {
        let mut hasher = Sha256::new();
        hasher.update(Uuid::new_v4().as_bytes());
        hasher.update(name.as_bytes());
        let digest = hasher.finalize();
        Address::from_bytes(&digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        Config {
            environment: "test".to_string(),
            server: crate::config::ServerConfig::default(),
            jwt: crate::config::JwtConfig {
                secret: "test-secret".to_string(),
                access_token_expiry: 3600,
                refresh_token_expiry: 604800,
            },
            ledger: crate::config::LedgerConfig {
                admin_address: "0x00000000000000000000000000000000000000a0".to_string(),
                farmer_addresses: vec![],
                lab_officer_addresses: vec![],
                manufacturer_addresses: vec![],
            },
        }
    }

    #[test]
    fn derived_addresses_are_unique_and_well_formed() {
        let a = AuthService::derive_address("alice");
        let b = AuthService::derive_address("alice");
        assert_ne!(a, b);
        assert!(Address::parse(a.as_str()).is_ok());
    }

    #[tokio::test]
    async fn register_login_refresh_round_trip() {
        let auth = AuthService::new(&test_config());

        let session = auth.register("alice", "correct horse").await.unwrap();
        let claims = auth.validate_token(&session.access_token).unwrap();
        assert_eq!(claims.sub, session.address.to_string());

        let relogin = auth.login(&session.address, "correct horse").await.unwrap();
        assert_eq!(relogin.address, session.address);

        let refreshed = auth.refresh(&relogin.refresh_token).await.unwrap();
        assert_eq!(refreshed.address, session.address);

        // Refresh tokens are single-use
        assert!(auth.refresh(&relogin.refresh_token).await.is_err());
    }

    #[tokio::test]
    async fn login_rejects_bad_password() {
        let auth = AuthService::new(&test_config());
        let session = auth.register("bob", "password123").await.unwrap();

        let result = auth.login(&session.address, "wrong").await;
        assert!(matches!(result, Err(AppError::InvalidCredentials)));
    }
}
