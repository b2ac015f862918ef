use serde::Serialize;

use crate::models::board::Board;
use crate::models::game::Game;

/// A game together with the board rebuilt from its moves.
#[derive(Debug, Clone, Serialize)]
pub struct GameDetails {
    #[serde(flatten)]
    pub game: Game,
    pub board: Board,
}
