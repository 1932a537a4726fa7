//! Authentication and user management service

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
    models::{user::CreateUser, ActorContext, NewUser, User, UserClaims},
    repository::UserStore,
};

#[derive(Clone)]
pub struct UsersService {
    users: Arc<dyn UserStore>,
    config: AuthConfig,
}

impl UsersService {
    pub fn new(users: Arc<dyn UserStore>, config: AuthConfig) -> Self {
        Self { users, config }
    }

    /// Authenticate by email and password and return a signed JWT
    pub async fn authenticate(&self, email: &str, password: &str) -> AppResult<(String, User)> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::InvalidInput("Email and password are required".to_string()));
        }

        let user = self
            .users
            .get_by_email(email.trim())
            .await?
            .ok_or_else(|| AppError::Authentication("Invalid credentials".to_string()))?;

        if !self.verify_password(&user, password)? {
            tracing::debug!(user_id = user.id, "Rejected login");
            return Err(AppError::Authentication("Invalid credentials".to_string()));
        }

        let token = self.create_token_for_user(&user)?;
        tracing::info!(user_id = user.id, "User logged in");
        Ok((token, user))
    }

    fn create_token_for_user(&self, user: &User) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let exp = now + (self.config.jwt_expiration_hours as i64 * 3600);

        let claims = UserClaims {
            sub: user.email.clone(),
            user_id: user.id,
            is_librarian: user.is_librarian,
            exp,
            iat: now,
        };

        claims
            .create_token(&self.config.jwt_secret)
            .map_err(|e| AppError::Internal(format!("Failed to create token: {}", e)))
    }

    fn verify_password(&self, user: &User, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(&user.password)
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

    /// Create a new user account (librarians only)
    pub async fn create_user(&self, actor: ActorContext, user: CreateUser) -> AppResult<User> {
        actor.require_librarian()?;
        user.validate()?;

        let created = self
            .users
            .create(NewUser {
                email: user.email.trim().to_string(),
                password_hash: self.hash_password(&user.password)?,
                is_librarian: user.is_librarian,
            })
            .await?;

        tracing::info!(
            user_id = created.id,
            is_librarian = created.is_librarian,
            created_by = actor.actor_id,
            "User created"
        );
        Ok(created)
    }

    /// Create the configured bootstrap librarian if it does not exist yet
    pub async fn ensure_bootstrap_librarian(&self) -> AppResult<Option<User>> {
        let (Some(email), Some(password)) = (
            self.config.bootstrap_librarian_email.as_deref(),
            self.config.bootstrap_librarian_password.as_deref(),
        ) else {
            return Ok(None);
        };

        if self.users.get_by_email(email).await?.is_some() {
            return Ok(None);
        }

        let created = self
            .users
            .create(NewUser {
                email: email.to_string(),
                password_hash: self.hash_password(password)?,
                is_librarian: true,
            })
            .await?;
        tracing::info!(user_id = created.id, "Bootstrap librarian created");
        Ok(Some(created))
    }
}
