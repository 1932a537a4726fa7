//! User model, JWT claims and the actor context handed to services

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::error::AppError;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct User {
    pub id: i32,
    pub email: String,
    /// Hashed password (argon2)
    #[serde(skip_serializing)]
    pub password: String,
    pub is_librarian: bool,
}

/// Validated data for a new account; `password_hash` is already hashed
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub is_librarian: bool,
}

/// Create user request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUser {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[serde(default)]
    pub is_librarian: bool,
}

/// Identity of the caller, as established by the authorization layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorContext {
    pub actor_id: i32,
    pub is_librarian: bool,
}

impl ActorContext {
    pub fn patron(actor_id: i32) -> Self {
        Self {
            actor_id,
            is_librarian: false,
        }
    }

    pub fn librarian(actor_id: i32) -> Self {
        Self {
            actor_id,
            is_librarian: true,
        }
    }

    /// Require librarian authority
    pub fn require_librarian(&self) -> Result<(), AppError> {
        if self.is_librarian {
            Ok(())
        } else {
            Err(AppError::Unauthorized("Librarian privileges required".to_string()))
        }
    }
}

/// JWT Claims for authenticated users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserClaims {
    pub sub: String,
    pub user_id: i32,
    pub is_librarian: bool,
    pub exp: i64,
    pub iat: i64,
}

impl UserClaims {
    /// Create a new JWT token
    pub fn create_token(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{encode, EncodingKey, Header};
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }

    /// Parse JWT token
    pub fn from_token(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        use jsonwebtoken::{decode, DecodingKey, Validation};
        let token_data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(token_data.claims)
    }

    pub fn actor(&self) -> ActorContext {
        ActorContext {
            actor_id: self.user_id,
            is_librarian: self.is_librarian,
        }
    }
}
