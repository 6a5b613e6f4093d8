//! Account registration and token issuance

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::user::{RegisterUser, User, UserClaims},
    policy::Identity,
    repository::UsersRepository,
};

/// A freshly issued bearer token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64,
}

#[derive(Clone)]
pub struct UsersService {
    repository: Arc<dyn UsersRepository>,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(repository: Arc<dyn UsersRepository>, config: AuthConfig) -> Self {
        Self { repository, config }
    }

    /// Create an account; usernames are unique regardless of case
    pub async fn register(&self, data: &RegisterUser) -> AppResult<User> {
        data.validate()?;

        if self
            .repository
            .get_by_username(&data.username)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(format!(
                "Username '{}' is already taken",
                data.username
            )));
        }

        let hash = self.hash_password(&data.password)?;
        let user = self.repository.create(&data.username, &hash).await?;
        tracing::info!(user_id = user.id, "User registered");
        Ok(user)
    }

    /// Verify credentials and issue a JWT
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<(IssuedToken, User)> {
        let user = self
            .repository
            .get_by_username(username)
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid username or password".to_string()))?;

        if !self.verify_password(&user, password)? {
            tracing::warn!(user_id = user.id, "Failed login attempt");
            return Err(AppError::Authentication("Invalid username or password".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        Ok((token, user))
    }

    /// The account behind an identity
    pub async fn me(&self, identity: &Identity) -> AppResult<User> {
        self.repository.get_by_id(identity.user_id).await
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<IssuedToken> {
        let now = Utc::now().timestamp();
        let expires_in = self.config.jwt_expiration_hours as i64 * 3600;

        let claims = UserClaims {
            sub: user.username.clone(),
            user_id: user.id,
            exp: now + expires_in,
            iat: now,
        };

        let token = claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))?;

        Ok(IssuedToken { token, expires_in })
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }
}
