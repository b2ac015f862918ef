use crate::models::board::Symbol;
use crate::models::game::GameState;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[derive(Debug)]
pub enum GameServiceError {
    NotFound(String),
    NotReady,
    NotAPlayer(String),
    GameOver(GameState),
    OutOfBounds { x: i64, y: i64 },
    WrongTurn(Symbol),
    CellOccupied { x: u8, y: u8 },
    SeatTaken(Symbol),
    SameUserBothSeats,
    ValidationError(String),
    /// Someone else changed the game between read and write.
    Conflict,
    RepositoryError(GameRepositoryError),
}

/// Message describing a finished game, `None` while it is still running.
pub fn game_over_reason(state: GameState) -> Option<&'static str> {
    match state {
        GameState::WinnerX => Some("Game is over! Player X is the winner!"),
        GameState::WinnerO => Some("Game is over! Player O is the winner!"),
        GameState::Tie => Some("Game is over! Ended in Tie!"),
        GameState::TurnX | GameState::TurnO => None,
    }
}

impl std::fmt::Display for GameServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameServiceError::NotFound(_) => write!(f, "Game not found!"),
            GameServiceError::NotReady => write!(f, "Not all players are ready. Please wait!"),
            GameServiceError::NotAPlayer(user) => {
                write!(f, "Sorry {} is not a part of this game!", user)
            }
            GameServiceError::GameOver(state) => match game_over_reason(*state) {
                Some(reason) => f.write_str(reason),
                None => write!(f, "Game is over!"),
            },
            GameServiceError::OutOfBounds { .. } => {
                write!(f, "Move was not valid. Please try a different move!")
            }
            GameServiceError::WrongTurn(player) => write!(
                f,
                "It is not your turn {}! Sorry, please wait for {}.",
                player,
                player.other()
            ),
            GameServiceError::CellOccupied { .. } => {
                write!(f, "I am sorry a player already placed a move here!")
            }
            GameServiceError::SeatTaken(symbol) => write!(f, "Someone is already {}", symbol),
            GameServiceError::SameUserBothSeats => {
                write!(f, "Cannot be the same user for both players!")
            }
            GameServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            GameServiceError::Conflict => write!(
                f,
                "The game changed while your request was processed. Please try again!"
            ),
            GameServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
        }
    }
}

impl std::error::Error for GameServiceError {}

impl From<GameRepositoryError> for GameServiceError {
    fn from(err: GameRepositoryError) -> Self {
        match err {
            GameRepositoryError::Conflict => GameServiceError::Conflict,
            other => GameServiceError::RepositoryError(other),
        }
    }
}
