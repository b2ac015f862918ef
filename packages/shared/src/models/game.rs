use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::models::board::Symbol;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    TurnX,
    TurnO,
    WinnerX,
    WinnerO,
    Tie,
}

impl GameState {
    pub fn turn(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => GameState::TurnX,
            Symbol::O => GameState::TurnO,
        }
    }

    pub fn winner(symbol: Symbol) -> Self {
        match symbol {
            Symbol::X => GameState::WinnerX,
            Symbol::O => GameState::WinnerO,
        }
    }

    /// Terminal states absorb: no move is accepted once one is reached.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GameState::WinnerX | GameState::WinnerO | GameState::Tie
        )
    }

    pub fn current_turn(self) -> Option<Symbol> {
        match self {
            GameState::TurnX => Some(Symbol::X),
            GameState::TurnO => Some(Symbol::O),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GameState::TurnX => "turn_x",
            GameState::TurnO => "turn_o",
            GameState::WinnerX => "winner_x",
            GameState::WinnerO => "winner_o",
            GameState::Tie => "tie",
        }
    }
}

impl fmt::Display for GameState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: Uuid,
    pub name: String,
    pub state: GameState,
    pub player_x: Option<String>,
    pub player_o: Option<String>,
    /// Bumped on every write; storage only accepts a write made against the
    /// version it currently holds.
    pub version: u64,
    pub created_at: DateTime<Utc>,
}

impl Game {
    pub fn new(name: &str) -> Self {
        Game {
            id: Uuid::new_v4(),
            name: name.to_string(),
            state: GameState::TurnX,
            player_x: None,
            player_o: None,
            version: 0,
            created_at: Utc::now(),
        }
    }

    pub fn seat(&self, symbol: Symbol) -> Option<&str> {
        match symbol {
            Symbol::X => self.player_x.as_deref(),
            Symbol::O => self.player_o.as_deref(),
        }
    }

    pub fn set_seat(&mut self, symbol: Symbol, user_id: &str) {
        let seat = match symbol {
            Symbol::X => &mut self.player_x,
            Symbol::O => &mut self.player_o,
        };
        *seat = Some(user_id.to_string());
    }

    /// The symbol the user plays in this game, if any.
    pub fn seat_of(&self, user_id: &str) -> Option<Symbol> {
        [Symbol::X, Symbol::O]
            .into_iter()
            .find(|symbol| self.seat(*symbol) == Some(user_id))
    }

    pub fn seats_filled(&self) -> bool {
        self.player_x.is_some() && self.player_o.is_some()
    }
}
