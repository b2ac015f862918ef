use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lambda_http::tracing::{debug, warn};
use serde_json::{json, Value};

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};
use shared::models::auth::requests::{LoginRequest, RegisterRequest};
use shared::models::auth::responses::LoginResponse;
use shared::models::outcome::Outcome;
use shared::models::user::UserProfile;
use shared::services::auth_service::AuthServiceTrait;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/register", post(register))
        .route("/v1/login", post(login))
        .route("/v1/logout", post(logout))
        .route("/v1/who", get(who))
}

async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Outcome<UserProfile>>), ApiError> {
    let Json(request) = payload?;
    let user = state.user_service.register(&request).await.map_err(|e| {
        warn!("Failed to register user {}: {}", request.username, e);
        ApiError::from(e)
    })?;
    debug!("User registered: {}", user.username);
    Ok((
        StatusCode::CREATED,
        Json(Outcome::ok(
            "User was registered!",
            UserProfile::from(&user),
        )),
    ))
}

async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Outcome<LoginResponse>>), ApiError> {
    let Json(request) = payload?;
    let login = state
        .auth_service
        .authenticate_user(&request.username, &request.password)
        .await
        .map_err(|e| {
            warn!("Failed to authenticate user {}: {}", request.username, e);
            ApiError::from(e)
        })?;
    debug!("{} - Valid username/password combination.", request.username);
    Ok((
        StatusCode::ACCEPTED,
        Json(Outcome::ok("Success kid is successful!", login)),
    ))
}

/// Tokens are stateless, so logging out only acknowledges the caller.
async fn logout(
    authenticated_user: AuthenticatedUser,
) -> (StatusCode, Json<Outcome<Value>>) {
    let message = format!(
        "User {} has logged out successfully! bye-bye.",
        authenticated_user.username
    );
    debug!("{}", message);
    (StatusCode::ACCEPTED, Json(Outcome::ok(message, json!({}))))
}

async fn who(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
) -> Result<Json<Outcome<UserProfile>>, ApiError> {
    let user = state
        .user_service
        .get_user_by_id(&authenticated_user.user_id)
        .await?;
    Ok(Json(Outcome::ok(
        "This is who you are!",
        UserProfile::from(&user),
    )))
}
