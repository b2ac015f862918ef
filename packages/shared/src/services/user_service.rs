use std::sync::Arc;

use tracing::debug;

use crate::models::auth::requests::RegisterRequest;
use crate::models::user::User;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::user_service_errors::UserServiceError;

const MIN_PASSWORD_LENGTH: usize = 8;

pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        UserService { repository }
    }

    pub async fn register(&self, request: &RegisterRequest) -> Result<User, UserServiceError> {
        let required = [
            ("username", &request.username),
            ("email", &request.email),
            ("password", &request.password),
            ("password2", &request.password2),
            ("first_name", &request.first_name),
            ("last_name", &request.last_name),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(UserServiceError::ValidationError(format!(
                "{}: This field is required.",
                field
            )));
        }
        if !request.email.contains('@') {
            return Err(UserServiceError::ValidationError(
                "email: Enter a valid email address.".to_string(),
            ));
        }
        if request.password != request.password2 {
            return Err(UserServiceError::ValidationError(
                "password: Password fields didn't match.".to_string(),
            ));
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(UserServiceError::ValidationError(format!(
                "password: This password is too short. It must contain at least {} characters.",
                MIN_PASSWORD_LENGTH
            )));
        }

        if self.repository.username_exists(&request.username).await? {
            return Err(UserServiceError::UserAlreadyExists);
        }

        let user = User::new(
            request.username.clone(),
            request.email.clone(),
            &request.password,
            request.first_name.clone(),
            request.last_name.clone(),
        );
        self.repository.create_user(&user).await?;
        debug!("Registered user {}", user.username);
        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserServiceError> {
        if user_id.is_empty() {
            return Err(UserServiceError::ValidationError(
                "User ID cannot be empty".to_string(),
            ));
        }
        Ok(self.repository.get_user_by_id(user_id).await?)
    }

    pub async fn get_user_by_username(&self, username: &str) -> Result<User, UserServiceError> {
        if username.is_empty() {
            return Err(UserServiceError::ValidationError(
                "Username cannot be empty".to_string(),
            ));
        }
        Ok(self.repository.get_user_by_username(username).await?)
    }
}
