use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use lambda_http::tracing::debug;
use uuid::Uuid;

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};
use shared::models::game::Game;
use shared::models::game_move::Move;
use shared::models::games::requests::{CreateGameRequest, MoveRequest, SeatRequest};
use shared::models::games::responses::GameDetails;
use shared::models::outcome::Outcome;
use shared::services::game_service::GameService;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/games", get(list_games).post(create_game))
        .route("/v1/games/{id}", get(get_game).put(assign_seat))
        .route("/v1/games/{id}/moves", get(list_moves).post(submit_move))
}

/// Decodes a body sent to a game. An unknown game is reported before a
/// malformed body.
async fn game_payload<T>(
    state: &AppState,
    game_id: Uuid,
    payload: Result<Json<T>, JsonRejection>,
) -> Result<T, ApiError> {
    match payload {
        Ok(Json(request)) => Ok(request),
        Err(rejection) => {
            state.game_service.load_game(game_id).await?;
            Err(ApiError::from(rejection))
        }
    }
}

async fn list_games(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
) -> Result<Json<Outcome<Vec<Game>>>, ApiError> {
    Ok(Json(state.game_service.list_games().await?))
}

async fn create_game(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    payload: Result<Json<CreateGameRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Outcome<Game>>), ApiError> {
    let Json(request) = payload?;
    let outcome = state.game_service.create_game(&request).await?;
    debug!("{} created game {}", user.username, outcome.data.id);
    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn get_game(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Outcome<GameDetails>>, ApiError> {
    let game_id = GameService::parse_game_id(&id)?;
    Ok(Json(state.game_service.get_game(game_id).await?))
}

async fn assign_seat(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<SeatRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Outcome<Game>>), ApiError> {
    let game_id = GameService::parse_game_id(&id)?;
    let request = game_payload(&state, game_id, payload).await?;
    let outcome = state
        .game_service
        .assign_seat(game_id, &user.caller(), &request)
        .await?;
    Ok((StatusCode::ACCEPTED, Json(outcome)))
}

async fn list_moves(
    State(state): State<AppState>,
    _user: AuthenticatedUser,
    Path(id): Path<String>,
) -> Result<Json<Outcome<Vec<Move>>>, ApiError> {
    let game_id = GameService::parse_game_id(&id)?;
    Ok(Json(state.game_service.list_moves(game_id).await?))
}

async fn submit_move(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Path(id): Path<String>,
    payload: Result<Json<MoveRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Outcome<Move>>), ApiError> {
    let game_id = GameService::parse_game_id(&id)?;
    let request = game_payload(&state, game_id, payload).await?;
    let outcome = state
        .game_service
        .submit_move(game_id, &user.caller(), &request)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}
