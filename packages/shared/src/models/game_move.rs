use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::board::Symbol;

/// One accepted move. Written once by the game service and never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Move {
    pub id: Uuid,
    pub game_id: Uuid,
    pub player: Symbol,
    pub x: u8,
    pub y: u8,
    /// Position of the move in its game's history, starting at 0.
    pub sequence: u32,
    pub created_at: DateTime<Utc>,
}

impl Move {
    pub fn new(game_id: Uuid, player: Symbol, x: u8, y: u8, sequence: u32) -> Self {
        Move {
            id: Uuid::new_v4(),
            game_id,
            player,
            x,
            y,
            sequence,
            created_at: Utc::now(),
        }
    }

    /// Sort key of the move inside its game, unique per cell.
    pub fn cell_key(&self) -> String {
        format!("{}#{}", self.x, self.y)
    }
}
