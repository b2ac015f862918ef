use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::game_move::Move;

/// Width and height of the grid.
pub const BOARD_SIZE: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Symbol {
    X,
    O,
}

impl Symbol {
    pub fn other(self) -> Symbol {
        match self {
            Symbol::X => Symbol::O,
            Symbol::O => Symbol::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Symbol::X => "x",
            Symbol::O => "o",
        }
    }

    pub fn parse(value: &str) -> Option<Symbol> {
        match value {
            "x" => Some(Symbol::X),
            "o" => Some(Symbol::O),
            _ => None,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of looking at a board once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Winner(Symbol),
    Tie,
    Undetermined,
}

/// A 3x3 grid addressed as `cells[y][x]`: `y` picks the row, `x` the column.
///
/// Never stored. It is rebuilt from a game's move history whenever needed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Board {
    cells: [[Option<Symbol>; BOARD_SIZE]; BOARD_SIZE],
}

impl Board {
    pub fn new() -> Self {
        Board::default()
    }

    /// Replays moves in order. Later moves on an occupied cell overwrite it,
    /// which cannot happen for a history accepted by the game service.
    pub fn from_moves(moves: &[Move]) -> Self {
        let mut board = Board::new();
        for game_move in moves {
            board.place(game_move.x as usize, game_move.y as usize, game_move.player);
        }
        board
    }

    /// Returns false when the coordinates fall outside the grid.
    pub fn place(&mut self, x: usize, y: usize, symbol: Symbol) -> bool {
        if x >= BOARD_SIZE || y >= BOARD_SIZE {
            return false;
        }
        self.cells[y][x] = Some(symbol);
        true
    }

    pub fn get(&self, x: usize, y: usize) -> Option<Symbol> {
        self.cells.get(y).and_then(|row| row.get(x)).copied().flatten()
    }

    pub fn rows(&self) -> &[[Option<Symbol>; BOARD_SIZE]; BOARD_SIZE] {
        &self.cells
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    pub fn is_full(&self) -> bool {
        self.occupied() == BOARD_SIZE * BOARD_SIZE
    }
}
