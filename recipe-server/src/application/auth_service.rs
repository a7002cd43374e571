use std::sync::Arc;

use tracing::instrument;
use uuid::Uuid;

use crate::data::user_repository::UserRepository;
use crate::domain::user::normalize_email;
use crate::domain::{error::DomainError, user::User};
use crate::infrastructure::security::{JwtKeys, hash_password};

pub const MIN_PASSWORD_LEN: usize = 5;

#[derive(Clone)]
pub struct AuthService {
    repo: Arc<dyn UserRepository>,
    keys: JwtKeys,
}

impl AuthService {
    pub fn new(repo: Arc<dyn UserRepository>, keys: JwtKeys) -> Self {
        Self { repo, keys }
    }

    pub fn keys(&self) -> &JwtKeys {
        &self.keys
    }

    pub async fn get_user(&self, id: Uuid) -> Result<User, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    /// Rejects an empty email, normalizes the domain part and stores a
    /// hashed password.
    #[instrument(skip(self, password))]
    pub async fn create_user(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, DomainError> {
        let user = self.build_user(email, password, name)?;
        self.repo.create(user).await
    }

    #[instrument(skip(self, password))]
    pub async fn create_superuser(&self, email: &str, password: &str) -> Result<User, DomainError> {
        let mut user = self.build_user(email, password, "")?;
        user.is_staff = true;
        user.is_superuser = true;
        self.repo.create(user).await
    }

    /// Public sign-up; stricter than [`create_user`](Self::create_user) about
    /// password length.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<User, DomainError> {
        check_password_len(password)?;
        self.create_user(email, password, name).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<String, DomainError> {
        let user = self
            .repo
            .find_by_email(&normalize_email(email))
            .await?
            .ok_or(DomainError::Unauthorized)?;

        if !user.is_active {
            return Err(DomainError::Unauthorized);
        }

        if !user.check_password(password) {
            return Err(DomainError::Unauthorized);
        }

        self.keys
            .generate_token(user.id)
            .map_err(|err| DomainError::Internal(err.to_string()))
    }

    #[instrument(skip(self, password))]
    pub async fn update_me(
        &self,
        id: Uuid,
        name: Option<String>,
        password: Option<String>,
    ) -> Result<User, DomainError> {
        let password_hash = match password {
            Some(password) => {
                check_password_len(&password)?;
                Some(hash(&password)?)
            }
            None => None,
        };
        let name = name.map(|n| n.trim().to_string());

        self.repo
            .update_profile(id, name, password_hash)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    fn build_user(&self, email: &str, password: &str, name: &str) -> Result<User, DomainError> {
        if email.trim().is_empty() {
            return Err(DomainError::Validation(
                "users must have an email address".into(),
            ));
        }
        Ok(User::new(
            normalize_email(email),
            name.trim().to_string(),
            hash(password)?,
        ))
    }
}

fn hash(password: &str) -> Result<String, DomainError> {
    hash_password(password).map_err(|err| DomainError::Internal(err.to_string()))
}

fn check_password_len(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(DomainError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}
