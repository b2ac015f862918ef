use axum::{extract::FromRequestParts, http::request::Parts};
use shared::models::user::Caller;
use shared::services::auth_service::AuthServiceTrait;

use crate::{error::ApiError, state::AppState};

#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub username: String,
}

impl AuthenticatedUser {
    pub fn caller(&self) -> Caller {
        Caller::new(&self.user_id, &self.username)
    }
}

impl FromRequestParts<AppState> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .ok_or(ApiError::Unauthorized)?
            .to_str()
            .map_err(|_| ApiError::Unauthorized)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let caller = state.auth_service.caller_from_token(token)?;

        Ok(AuthenticatedUser {
            user_id: caller.user_id,
            username: caller.username,
        })
    }
}
