use argon2::{
    password_hash::{Encoding, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::rngs::OsRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::{
    util::random_string, Database, DatabaseError, NewUser, PrimaryKey, UpdatedUser, UserData,
};

pub struct Auth<Db> {
    db: Arc<Db>,
    argon: Argon2<'static>,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
}

/// Signing configuration for access tokens
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub secret: String,
    pub access_token_ttl_in_minutes: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            secret: random_string(64),
            access_token_ttl_in_minutes: 60,
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    /// Username or password is incorrect
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// The supplied token is missing, expired, or doesn't resolve to a live user
    #[error("Invalid access token")]
    InvalidToken,
    /// Something else went wrong with the database
    #[error(transparent)]
    Db(DatabaseError),
    #[error("HashError: {0}")]
    HashError(String),
}

/// The claims signed into an access token
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    iat: i64,
    exp: i64,
}

/// A successful login or refresh: a short-lived signed access token and
/// the rotated refresh token that is persisted on the user.
#[derive(Debug)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub user: UserData,
}

#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug)]
pub struct NewPlainUser {
    pub username: String,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
}

impl<Db> Auth<Db>
where
    Db: Database,
{
    const REFRESH_TOKEN_LENGTH: usize = 64;

    pub fn new(db: &Arc<Db>, config: TokenConfig) -> Self {
        Self {
            db: db.clone(),
            argon: Argon2::default(),
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            access_token_ttl: Duration::minutes(config.access_token_ttl_in_minutes),
        }
    }

    /// Creates a user with a hashed password
    pub async fn register(&self, new_user: NewPlainUser) -> Result<UserData, AuthError> {
        let salt = SaltString::generate(&mut OsRng);
        let hashed_password = self
            .argon
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| AuthError::HashError(e.to_string()))?
            .to_string();

        self.db
            .create_user(NewUser {
                username: new_user.username,
                email: new_user.email,
                password: hashed_password,
                full_name: new_user.full_name,
                avatar: new_user.avatar,
                cover_image: new_user.cover_image,
            })
            .await
            .map_err(AuthError::Db)
    }

    /// Logs in a user by username or email, issuing a fresh token pair
    pub async fn login(&self, credentials: Credentials) -> Result<AuthTokens, AuthError> {
        let user = match self.db.user_by_username(&credentials.username).await {
            Ok(user) => user,
            Err(DatabaseError::NotFound { .. }) => self
                .db
                .user_by_email(&credentials.username)
                .await
                .map_err(|e| match e {
                    DatabaseError::NotFound { .. } => AuthError::InvalidCredentials,
                    err => AuthError::Db(err),
                })?,
            Err(e) => return Err(AuthError::Db(e)),
        };

        let stored_password = PasswordHash::parse(&user.password, Encoding::default())
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        self.argon
            .verify_password(credentials.password.as_bytes(), &stored_password)
            .map_err(|_| AuthError::InvalidCredentials)?;

        self.issue_tokens(user).await
    }

    /// Exchanges a live refresh token for a new token pair.
    /// The stored refresh token rotates on every use.
    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let user = self
            .db
            .user_by_refresh_token(refresh_token)
            .await
            .map_err(|e| match e {
                DatabaseError::NotFound { .. } => AuthError::InvalidToken,
                err => AuthError::Db(err),
            })?;

        self.issue_tokens(user).await
    }

    /// Clears the stored refresh token, ending the login
    pub async fn logout(&self, user_id: PrimaryKey) -> Result<(), DatabaseError> {
        self.db.set_refresh_token(user_id, None).await
    }

    /// Verifies an access token and resolves it to a live user
    pub async fn session(&self, access_token: &str) -> Result<UserData, AuthError> {
        let claims = decode::<Claims>(access_token, &self.decoding_key, &Validation::default())
            .map_err(|_| AuthError::InvalidToken)?
            .claims;

        let user_id: PrimaryKey = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;

        self.db.user_by_id(user_id).await.map_err(|e| match e {
            DatabaseError::NotFound { .. } => AuthError::InvalidToken,
            err => AuthError::Db(err),
        })
    }

    /// Updates a user's profile fields
    pub async fn update_user(&self, updated_user: UpdatedUser) -> Result<UserData, DatabaseError> {
        self.db.update_user(updated_user).await
    }

    async fn issue_tokens(&self, user: UserData) -> Result<AuthTokens, AuthError> {
        let now = Utc::now();

        let claims = Claims {
            sub: user.id.to_string(),
            iat: now.timestamp(),
            exp: (now + self.access_token_ttl).timestamp(),
        };

        let access_token = encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AuthError::HashError(e.to_string()))?;

        let refresh_token = random_string(Self::REFRESH_TOKEN_LENGTH);

        self.db
            .set_refresh_token(user.id, Some(refresh_token.clone()))
            .await
            .map_err(AuthError::Db)?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            user,
        })
    }
}
