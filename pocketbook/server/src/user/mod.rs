use argon2::password_hash::{PasswordHash, SaltString, rand_core::OsRng};
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Timelike, Utc};
use sea_orm::*;

use crate::entities::sea_orm_active_enums::Role;
use crate::entities::*;

/// A registered user. The password hash never leaves the service.
#[derive(Debug, PartialEq, Clone, Eq)]
pub struct User {
    id: i32,
    email: String,
    username: String,
    role: Role,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

impl From<user::Model> for User {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            username: model.username,
            role: model.role,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Error type for UserService operations.
#[derive(Debug, thiserror::Error)]
pub enum UserServiceError {
    #[error("Both email and password are required")]
    MissingCredentials,
    #[error("A user with email '{0}' is already registered")]
    EmailTaken(String),
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("User with ID {0} not found")]
    UserNotFound(i32),
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

/// Derives the display username: the first five characters of the email followed by
/// the last two digits of the registration hour and minute written side by side.
pub fn derive_username(email: &str, registered_at: DateTime<Utc>) -> String {
    let prefix: String = email.chars().take(5).collect();
    let time_digits = format!("{}{}", registered_at.hour(), registered_at.minute());
    let suffix_start = time_digits.len().saturating_sub(2);
    format!("{}{}", prefix, &time_digits[suffix_start..])
}

fn hash_password(password: &str) -> Result<String, UserServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| UserServiceError::PasswordHash(err.to_string()))
}

fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(err) => {
            tracing::warn!("Stored password hash is unreadable: {}", err);
            false
        }
    }
}

/// Reports a violation of the unique email index as [`UserServiceError::EmailTaken`].
fn insert_error(err: DbErr, email: &str) -> UserServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            UserServiceError::EmailTaken(email.to_string())
        }
        _ => UserServiceError::Database(err),
    }
}

pub struct UserService<'a> {
    db: &'a DatabaseConnection,
}

impl UserService<'_> {
    pub fn new(db: &DatabaseConnection) -> UserService<'_> {
        UserService { db }
    }

    /// Registers a new user with the `User` role.
    ///
    /// # Arguments
    ///
    /// * `email` - The email to register; must not be registered already.
    /// * `password` - The plain text password. Only its argon2 hash is stored.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `User` if successful, or an error otherwise.
    #[tracing::instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> Result<User, UserServiceError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(UserServiceError::MissingCredentials);
        }

        if self.find_by_email(email).await?.is_some() {
            return Err(UserServiceError::EmailTaken(email.to_string()));
        }

        let now = Utc::now();
        let active_model = user::ActiveModel {
            email: ActiveValue::Set(email.to_string()),
            password_hash: ActiveValue::Set(hash_password(password)?),
            role: ActiveValue::Set(Role::User),
            username: ActiveValue::Set(derive_username(email, now)),
            created_at: ActiveValue::Set(now),
            updated_at: ActiveValue::Set(now),
            ..Default::default()
        };
        // A concurrent registration can still win the race for the email.
        let created_model = active_model
            .insert(self.db)
            .await
            .map_err(|err| insert_error(err, email))?;
        tracing::info!("Registered user {}", created_model.id);
        Ok(User::from(created_model))
    }

    /// Checks an email/password pair and returns the matching user.
    #[tracing::instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<User, UserServiceError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(UserServiceError::MissingCredentials);
        }

        let model = self
            .find_by_email(email)
            .await?
            .ok_or(UserServiceError::InvalidCredentials)?;

        if !verify_password(password, &model.password_hash) {
            return Err(UserServiceError::InvalidCredentials);
        }

        Ok(User::from(model))
    }

    /// Retrieves a user by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_user_by_id(&self, id: i32) -> Result<User, UserServiceError> {
        let model = user::Entity::find_by_id(id)
            .one(self.db)
            .await?
            .ok_or(UserServiceError::UserNotFound(id))?;
        Ok(User::from(model))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<user::Model>, UserServiceError> {
        let model = user::Entity::find()
            .filter(user::Column::Email.eq(email))
            .one(self.db)
            .await?;
        Ok(model)
    }
}
