use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use lambda_http::tracing::error;
use serde_json::{json, Value};
use shared::models::outcome::Outcome;
use shared::services::errors::{
    auth_service_errors::AuthServiceError, game_service_errors::GameServiceError,
    user_service_errors::UserServiceError,
};

const INTERNAL_ERROR_MESSAGE: &str = "Internal Server Error!";

#[derive(Debug)]
pub enum ApiError {
    UserService(UserServiceError),
    AuthService(AuthServiceError),
    GameService(GameServiceError),
    InvalidPayload(String),
    Unauthorized,
}

impl From<UserServiceError> for ApiError {
    fn from(error: UserServiceError) -> Self {
        ApiError::UserService(error)
    }
}

impl From<AuthServiceError> for ApiError {
    fn from(error: AuthServiceError) -> Self {
        ApiError::AuthService(error)
    }
}

impl From<GameServiceError> for ApiError {
    fn from(error: GameServiceError) -> Self {
        ApiError::GameService(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidPayload(rejection.body_text())
    }
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::UserService(UserServiceError::UserAlreadyExists) => StatusCode::CONFLICT,
            ApiError::UserService(UserServiceError::UserNotFound) => StatusCode::NOT_FOUND,
            ApiError::UserService(UserServiceError::ValidationError(_)) => StatusCode::BAD_REQUEST,
            ApiError::UserService(UserServiceError::RepositoryError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            ApiError::AuthService(
                AuthServiceError::InvalidCredentials | AuthServiceError::ValidationError(_),
            ) => StatusCode::BAD_REQUEST,
            ApiError::AuthService(
                AuthServiceError::UserServiceError(_) | AuthServiceError::JwtError(_),
            ) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::AuthService(
                AuthServiceError::InvalidToken | AuthServiceError::ExpiredToken,
            ) => StatusCode::UNAUTHORIZED,

            ApiError::GameService(GameServiceError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::GameService(GameServiceError::Conflict) => StatusCode::CONFLICT,
            ApiError::GameService(GameServiceError::RepositoryError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::GameService(_) => StatusCode::BAD_REQUEST,

            ApiError::InvalidPayload(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::UserService(err) => err.to_string(),
            ApiError::AuthService(err) => err.to_string(),
            ApiError::GameService(err) => err.to_string(),
            ApiError::InvalidPayload(detail) => format!("Invalid request body: {}", detail),
            ApiError::Unauthorized => "Authentication credentials were not provided.".to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("Request failed: {}", self.message());
            INTERNAL_ERROR_MESSAGE.to_string()
        } else {
            self.message()
        };

        let body: Outcome<Value> = Outcome::error(message, json!({}));
        (status, Json(body)).into_response()
    }
}
