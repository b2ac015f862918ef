use crate::repositories::errors::user_repository_errors::UserRepositoryError;

#[derive(Debug)]
pub enum UserServiceError {
    UserAlreadyExists,
    UserNotFound,
    ValidationError(String),
    RepositoryError(String),
}

impl std::fmt::Display for UserServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserServiceError::UserAlreadyExists => {
                write!(f, "A user with that username already exists.")
            }
            UserServiceError::UserNotFound => write!(f, "User not found"),
            UserServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            UserServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for UserServiceError {}

impl From<UserRepositoryError> for UserServiceError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::NotFound => UserServiceError::UserNotFound,
            UserRepositoryError::UsernameTaken => UserServiceError::UserAlreadyExists,
            other => UserServiceError::RepositoryError(other.to_string()),
        }
    }
}
