use crate::{
    models::{
        board::{Board, Symbol, Verdict, BOARD_SIZE},
        game::{Game, GameState},
        game_move::Move,
        games::requests::{MoveRequest, SeatRequest},
        user::Caller,
    },
    services::errors::game_service_errors::GameServiceError,
};

/// Rules of the game. Everything here is pure: no storage, no clock.
pub struct TicTacToeService;

impl TicTacToeService {
    /// Judge a board. Lines are checked rows first, then columns, then the
    /// main and anti diagonals; the first complete line decides the winner.
    pub fn evaluate(board: &Board) -> Verdict {
        let cells = board.rows();

        for row in cells.iter() {
            if let Some(symbol) = line_winner(row) {
                return Verdict::Winner(symbol);
            }
        }

        for x in 0..BOARD_SIZE {
            let column: [Option<Symbol>; BOARD_SIZE] = std::array::from_fn(|y| cells[y][x]);
            if let Some(symbol) = line_winner(&column) {
                return Verdict::Winner(symbol);
            }
        }

        let main: [Option<Symbol>; BOARD_SIZE] = std::array::from_fn(|i| cells[i][i]);
        if let Some(symbol) = line_winner(&main) {
            return Verdict::Winner(symbol);
        }
        let anti: [Option<Symbol>; BOARD_SIZE] =
            std::array::from_fn(|i| cells[i][BOARD_SIZE - 1 - i]);
        if let Some(symbol) = line_winner(&anti) {
            return Verdict::Winner(symbol);
        }

        if board.is_full() {
            Verdict::Tie
        } else {
            Verdict::Undetermined
        }
    }

    /// Check a proposed move. On success returns the caller's symbol and the
    /// cell to play. The checks run in a fixed order and the first failure wins.
    pub fn validate_move(
        game: &Game,
        moves: &[Move],
        caller: &Caller,
        request: &MoveRequest,
    ) -> Result<(Symbol, u8, u8), GameServiceError> {
        if !game.seats_filled() {
            return Err(GameServiceError::NotReady);
        }

        let player = game
            .seat_of(&caller.user_id)
            .ok_or_else(|| GameServiceError::NotAPlayer(caller.username.clone()))?;

        let (x, y) = match (request.x, request.y) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                return Err(GameServiceError::ValidationError(
                    "x and y are both required".to_string(),
                ))
            }
        };

        if game.state.is_terminal() {
            return Err(GameServiceError::GameOver(game.state));
        }

        let (x, y) = match (in_bounds(x), in_bounds(y)) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(GameServiceError::OutOfBounds { x, y }),
        };

        if game.state.current_turn() != Some(player) {
            return Err(GameServiceError::WrongTurn(player));
        }

        if moves.iter().any(|played| played.x == x && played.y == y) {
            return Err(GameServiceError::CellOccupied { x, y });
        }

        Ok((player, x, y))
    }

    /// Check a seat claim and return the symbol being claimed.
    pub fn validate_seat(
        game: &Game,
        caller: &Caller,
        request: &SeatRequest,
    ) -> Result<Symbol, GameServiceError> {
        let symbol = request
            .player
            .as_deref()
            .and_then(Symbol::parse)
            .ok_or_else(|| {
                GameServiceError::ValidationError("player must be either 'x' or 'o'".to_string())
            })?;

        if game.seat(symbol).is_some() {
            return Err(GameServiceError::SeatTaken(symbol));
        }
        if game.seat(symbol.other()) == Some(caller.user_id.as_str()) {
            return Err(GameServiceError::SameUserBothSeats);
        }

        Ok(symbol)
    }

    /// State and message following an accepted move by `player`.
    pub fn transition(player: Symbol, verdict: Verdict) -> (GameState, String) {
        match verdict {
            Verdict::Winner(winner) => (
                GameState::winner(winner),
                format!("Congratulations {} you are the winner!", winner),
            ),
            Verdict::Tie => (
                GameState::Tie,
                "Full board! Game ended in a tie.".to_string(),
            ),
            Verdict::Undetermined => {
                let next = player.other();
                (
                    GameState::turn(next),
                    format!("Move accepted! Now it is {}'s turn.", next),
                )
            }
        }
    }
}

fn line_winner(line: &[Option<Symbol>]) -> Option<Symbol> {
    let first = line.first().copied().flatten()?;
    line.iter()
        .all(|cell| *cell == Some(first))
        .then_some(first)
}

fn in_bounds(value: i64) -> Option<u8> {
    u8::try_from(value)
        .ok()
        .filter(|v| (*v as usize) < BOARD_SIZE)
}
