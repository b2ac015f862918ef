use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::Mutex;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{
    models::{
        board::Board,
        game::Game,
        game_move::Move,
        games::{
            requests::{CreateGameRequest, MoveRequest, SeatRequest},
            responses::GameDetails,
        },
        outcome::Outcome,
        user::Caller,
    },
    repositories::game_repository::GameRepository,
    services::{errors::game_service_errors::GameServiceError, tictactoe_service::TicTacToeService},
};

const MAX_NAME_LENGTH: usize = 100;

/// Lifecycle of games: creation, seating and move submission.
///
/// Every write to a game runs while holding that game's lock, and is stored
/// with a version check, so two requests can never both act on the same
/// snapshot of a game. Different games do not contend. Locks are only
/// registered for games that exist and are dropped once no request holds them.
pub struct GameService {
    repository: Arc<dyn GameRepository + Send + Sync>,
    locks: Mutex<HashMap<Uuid, Weak<Mutex<()>>>>,
}

impl GameService {
    pub fn new(repository: Arc<dyn GameRepository + Send + Sync>) -> Self {
        GameService {
            repository,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Unparseable ids are reported the same way as unknown ones.
    pub fn parse_game_id(raw: &str) -> Result<Uuid, GameServiceError> {
        Uuid::parse_str(raw).map_err(|_| GameServiceError::NotFound(raw.to_string()))
    }

    /// Lock for an existing game. Fails with `NotFound` before anything is
    /// registered when the game is unknown.
    async fn game_lock(&self, game_id: Uuid) -> Result<Arc<Mutex<()>>, GameServiceError> {
        self.load_game(game_id).await?;

        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| lock.strong_count() > 0);
        if let Some(lock) = locks.get(&game_id).and_then(Weak::upgrade) {
            return Ok(lock);
        }
        let lock = Arc::new(Mutex::new(()));
        locks.insert(game_id, Arc::downgrade(&lock));
        Ok(lock)
    }

    #[cfg(test)]
    async fn registered_locks(&self) -> usize {
        let mut locks = self.locks.lock().await;
        locks.retain(|_, lock| lock.strong_count() > 0);
        locks.len()
    }

    pub async fn load_game(&self, game_id: Uuid) -> Result<Game, GameServiceError> {
        self.repository
            .get_game(game_id)
            .await
            .map_err(|e| {
                error!("Failed to load game {}: {}", game_id, e);
                GameServiceError::from(e)
            })?
            .ok_or_else(|| GameServiceError::NotFound(game_id.to_string()))
    }

    pub async fn create_game(
        &self,
        request: &CreateGameRequest,
    ) -> Result<Outcome<Game>, GameServiceError> {
        let name = request.name.trim();
        if name.is_empty() {
            return Err(GameServiceError::ValidationError(
                "name: This field may not be blank.".to_string(),
            ));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(GameServiceError::ValidationError(format!(
                "name: Ensure this field has no more than {} characters.",
                MAX_NAME_LENGTH
            )));
        }

        let game = Game::new(name);
        self.repository.create_game(&game).await?;
        debug!("Created game {} ({})", game.id, game.name);
        Ok(Outcome::ok("Game was created!", game))
    }

    pub async fn list_games(&self) -> Result<Outcome<Vec<Game>>, GameServiceError> {
        let games = self.repository.list_games().await?;
        Ok(Outcome::ok("Here are the games!", games))
    }

    pub async fn get_game(&self, game_id: Uuid) -> Result<Outcome<GameDetails>, GameServiceError> {
        let game = self.load_game(game_id).await?;
        let moves = self.repository.filter_moves(game_id).await?;
        let board = Board::from_moves(&moves);
        Ok(Outcome::ok(
            "Look at this awesome game!",
            GameDetails { game, board },
        ))
    }

    pub async fn list_moves(&self, game_id: Uuid) -> Result<Outcome<Vec<Move>>, GameServiceError> {
        self.load_game(game_id).await?;
        let moves = self.repository.filter_moves(game_id).await?;
        Ok(Outcome::ok("Here are the moves!", moves))
    }

    /// Claim a seat. Seats are assigned once and never change the turn.
    pub async fn assign_seat(
        &self,
        game_id: Uuid,
        caller: &Caller,
        request: &SeatRequest,
    ) -> Result<Outcome<Game>, GameServiceError> {
        let lock = self.game_lock(game_id).await?;
        let _guard = lock.lock().await;

        let game = self.load_game(game_id).await?;
        let symbol = TicTacToeService::validate_seat(&game, caller, request).map_err(|e| {
            warn!("Seat claim by {} on {} rejected: {}", caller.username, game_id, e);
            e
        })?;

        let mut updated = game.clone();
        updated.set_seat(symbol, &caller.user_id);
        updated.version += 1;
        self.repository.save_game(&updated, game.version).await?;

        debug!("User {} seated as {} in {}", caller.username, symbol, game_id);
        Ok(Outcome::ok(format!("Set as player {}", symbol), updated))
    }

    /// Validate and apply a move, then move the game to its next state.
    pub async fn submit_move(
        &self,
        game_id: Uuid,
        caller: &Caller,
        request: &MoveRequest,
    ) -> Result<Outcome<Move>, GameServiceError> {
        let lock = self.game_lock(game_id).await?;
        let _guard = lock.lock().await;

        let game = self.load_game(game_id).await?;
        let moves = self.repository.filter_moves(game_id).await?;

        let (player, x, y) = TicTacToeService::validate_move(&game, &moves, caller, request)
            .map_err(|e| {
                warn!("Move by {} on {} rejected: {}", caller.username, game_id, e);
                e
            })?;

        let game_move = Move::new(game_id, player, x, y, moves.len() as u32);
        let mut board = Board::from_moves(&moves);
        board.place(x as usize, y as usize, player);
        let (state, message) =
            TicTacToeService::transition(player, TicTacToeService::evaluate(&board));

        let mut updated = game.clone();
        updated.state = state;
        updated.version += 1;
        self.repository
            .commit_move(&game_move, &updated, game.version)
            .await
            .map_err(|e| {
                error!("Failed to store move on {}: {}", game_id, e);
                GameServiceError::from(e)
            })?;

        debug!(
            "Player {} played ({}, {}) on {}, game is now {}",
            player, x, y, game_id, state
        );
        Ok(Outcome::ok(message, game_move))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::board::Symbol;
    use crate::models::game::GameState;
    use crate::models::outcome::Status;
    use crate::repositories::errors::game_repository_errors::GameRepositoryError;
    use crate::repositories::game_repository::{InMemoryGameRepository, MockGameRepository};

    fn alice() -> Caller {
        Caller::new("alice-id", "alice")
    }

    fn bob() -> Caller {
        Caller::new("bob-id", "bob")
    }

    fn seat(symbol: &str) -> SeatRequest {
        SeatRequest {
            player: Some(symbol.to_string()),
        }
    }

    async fn new_game(service: &GameService) -> Uuid {
        service
            .create_game(&CreateGameRequest {
                name: "test game".to_string(),
            })
            .await
            .unwrap()
            .data
            .id
    }

    /// A game with alice as x and bob as o.
    async fn ready_game(service: &GameService) -> Uuid {
        let game_id = new_game(service).await;
        service.assign_seat(game_id, &alice(), &seat("x")).await.unwrap();
        service.assign_seat(game_id, &bob(), &seat("o")).await.unwrap();
        game_id
    }

    fn service() -> GameService {
        GameService::new(Arc::new(InMemoryGameRepository::new()))
    }

    async fn play(
        service: &GameService,
        game_id: Uuid,
        moves: &[(Symbol, i64, i64)],
    ) -> Vec<Result<Outcome<Move>, GameServiceError>> {
        let mut results = Vec::new();
        for (symbol, x, y) in moves {
            let caller = match symbol {
                Symbol::X => alice(),
                Symbol::O => bob(),
            };
            results.push(
                service
                    .submit_move(game_id, &caller, &MoveRequest::at(*x, *y))
                    .await,
            );
        }
        results
    }

    async fn state_of(service: &GameService, game_id: Uuid) -> GameState {
        service.get_game(game_id).await.unwrap().data.game.state
    }

    #[tokio::test]
    async fn test_create_game() {
        let service = service();

        let outcome = service
            .create_game(&CreateGameRequest {
                name: "  padded  ".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(outcome.status, Status::Ok);
        assert_eq!(outcome.message, "Game was created!");
        assert_eq!(outcome.data.name, "padded");
        assert_eq!(outcome.data.state, GameState::TurnX);
        assert!(outcome.data.player_x.is_none() && outcome.data.player_o.is_none());
    }

    #[tokio::test]
    async fn test_create_game_requires_name() {
        let service = service();

        let blank = service.create_game(&CreateGameRequest::default()).await;
        assert!(matches!(blank, Err(GameServiceError::ValidationError(_))));

        let long = service
            .create_game(&CreateGameRequest {
                name: "n".repeat(101),
            })
            .await;
        assert!(matches!(long, Err(GameServiceError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_list_games() {
        let service = service();
        new_game(&service).await;
        new_game(&service).await;

        let outcome = service.list_games().await.unwrap();

        assert_eq!(outcome.message, "Here are the games!");
        assert_eq!(outcome.data.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_game() {
        let service = service();
        let missing = Uuid::new_v4();

        assert!(matches!(
            service.get_game(missing).await,
            Err(GameServiceError::NotFound(_))
        ));
        assert!(matches!(
            service.list_moves(missing).await,
            Err(GameServiceError::NotFound(_))
        ));
        assert!(matches!(
            service
                .submit_move(missing, &alice(), &MoveRequest::at(0, 0))
                .await,
            Err(GameServiceError::NotFound(_))
        ));
        assert!(matches!(
            GameService::parse_game_id("not-a-uuid"),
            Err(GameServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_assign_seat() {
        let service = service();
        let game_id = new_game(&service).await;

        let outcome = service
            .assign_seat(game_id, &alice(), &seat("x"))
            .await
            .unwrap();

        assert_eq!(outcome.message, "Set as player x");
        assert_eq!(outcome.data.player_x.as_deref(), Some("alice-id"));
        assert_eq!(outcome.data.state, GameState::TurnX);
    }

    #[tokio::test]
    async fn test_assign_same_seat_twice() {
        let service = service();
        let game_id = new_game(&service).await;
        service.assign_seat(game_id, &alice(), &seat("o")).await.unwrap();

        let result = service.assign_seat(game_id, &bob(), &seat("o")).await;

        match result {
            Err(err @ GameServiceError::SeatTaken(Symbol::O)) => {
                assert_eq!(err.to_string(), "Someone is already o")
            }
            other => panic!("Expected SeatTaken, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_same_user_cannot_take_both_seats() {
        let service = service();
        let game_id = new_game(&service).await;
        service.assign_seat(game_id, &alice(), &seat("x")).await.unwrap();

        let result = service.assign_seat(game_id, &alice(), &seat("o")).await;

        assert!(matches!(result, Err(GameServiceError::SameUserBothSeats)));
        let game = service.get_game(game_id).await.unwrap().data.game;
        assert!(game.player_o.is_none());
    }

    #[tokio::test]
    async fn test_row_win() {
        let service = service();
        let game_id = ready_game(&service).await;

        let results = play(
            &service,
            game_id,
            &[
                (Symbol::X, 0, 0),
                (Symbol::O, 0, 2),
                (Symbol::X, 1, 0),
                (Symbol::O, 1, 2),
                (Symbol::X, 2, 0),
            ],
        )
        .await;

        let last = results.last().unwrap().as_ref().unwrap();
        assert_eq!(last.message, "Congratulations x you are the winner!");
        assert_eq!(state_of(&service, game_id).await, GameState::WinnerX);
    }

    #[tokio::test]
    async fn test_full_board_tie() {
        let service = service();
        let game_id = ready_game(&service).await;

        let results = play(
            &service,
            game_id,
            &[
                (Symbol::X, 0, 0),
                (Symbol::O, 2, 0),
                (Symbol::X, 1, 0),
                (Symbol::O, 0, 1),
                (Symbol::X, 0, 2),
                (Symbol::O, 2, 2),
                (Symbol::X, 1, 1),
                (Symbol::O, 1, 2),
                (Symbol::X, 2, 1),
            ],
        )
        .await;

        assert!(results.iter().all(|result| result.is_ok()));
        let last = results.last().unwrap().as_ref().unwrap();
        assert_eq!(last.message, "Full board! Game ended in a tie.");
        assert_eq!(state_of(&service, game_id).await, GameState::Tie);
    }

    #[tokio::test]
    async fn test_turn_alternates_with_messages() {
        let service = service();
        let game_id = ready_game(&service).await;

        let first = service
            .submit_move(game_id, &alice(), &MoveRequest::at(1, 1))
            .await
            .unwrap();
        assert_eq!(first.message, "Move accepted! Now it is o's turn.");
        assert_eq!(first.data.player, Symbol::X);
        assert_eq!(state_of(&service, game_id).await, GameState::TurnO);

        let second = service
            .submit_move(game_id, &bob(), &MoveRequest::at(0, 0))
            .await
            .unwrap();
        assert_eq!(second.message, "Move accepted! Now it is x's turn.");
        assert_eq!(second.data.sequence, 1);
        assert_eq!(state_of(&service, game_id).await, GameState::TurnX);
    }

    #[tokio::test]
    async fn test_out_of_bounds() {
        let service = service();
        let game_id = ready_game(&service).await;

        let result = service
            .submit_move(game_id, &alice(), &MoveRequest::at(3, 0))
            .await;

        assert!(matches!(result, Err(GameServiceError::OutOfBounds { x: 3, y: 0 })));
        assert!(service.list_moves(game_id).await.unwrap().data.is_empty());
    }

    #[tokio::test]
    async fn test_second_move_by_same_player() {
        let service = service();
        let game_id = ready_game(&service).await;
        service
            .submit_move(game_id, &alice(), &MoveRequest::at(0, 0))
            .await
            .unwrap();

        let result = service
            .submit_move(game_id, &alice(), &MoveRequest::at(1, 1))
            .await;

        assert!(matches!(result, Err(GameServiceError::WrongTurn(Symbol::X))));
    }

    #[tokio::test]
    async fn test_cell_already_played_by_opponent() {
        let service = service();
        let game_id = ready_game(&service).await;
        service
            .submit_move(game_id, &alice(), &MoveRequest::at(2, 2))
            .await
            .unwrap();

        let result = service
            .submit_move(game_id, &bob(), &MoveRequest::at(2, 2))
            .await;

        assert!(matches!(
            result,
            Err(GameServiceError::CellOccupied { x: 2, y: 2 })
        ));
    }

    #[tokio::test]
    async fn test_moves_before_seats_are_filled() {
        let service = service();
        let game_id = new_game(&service).await;
        service.assign_seat(game_id, &alice(), &seat("x")).await.unwrap();

        let result = service
            .submit_move(game_id, &alice(), &MoveRequest::at(0, 0))
            .await;

        assert!(matches!(result, Err(GameServiceError::NotReady)));
    }

    #[tokio::test]
    async fn test_outsider_cannot_move() {
        let service = service();
        let game_id = ready_game(&service).await;

        let result = service
            .submit_move(game_id, &Caller::new("eve-id", "eve"), &MoveRequest::at(3, 3))
            .await;

        match result {
            Err(err @ GameServiceError::NotAPlayer(_)) => {
                assert_eq!(err.to_string(), "Sorry eve is not a part of this game!")
            }
            other => panic!("Expected NotAPlayer, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_finished_game_rejects_moves_without_writing() {
        let service = service();
        let game_id = ready_game(&service).await;
        play(
            &service,
            game_id,
            &[
                (Symbol::X, 0, 0),
                (Symbol::O, 0, 1),
                (Symbol::X, 1, 1),
                (Symbol::O, 0, 2),
                (Symbol::X, 2, 2),
            ],
        )
        .await;
        assert_eq!(state_of(&service, game_id).await, GameState::WinnerX);

        for (caller, x, y) in [(bob(), 2, 0), (alice(), 2, 1), (bob(), 9, 9)] {
            let result = service
                .submit_move(game_id, &caller, &MoveRequest::at(x, y))
                .await;
            match result {
                Err(err @ GameServiceError::GameOver(GameState::WinnerX)) => {
                    assert_eq!(err.to_string(), "Game is over! Player X is the winner!")
                }
                other => panic!("Expected GameOver, got {:?}", other),
            }
        }

        assert_eq!(service.list_moves(game_id).await.unwrap().data.len(), 5);
    }

    #[tokio::test]
    async fn test_get_game_renders_board() {
        let service = service();
        let game_id = ready_game(&service).await;
        play(&service, game_id, &[(Symbol::X, 2, 0), (Symbol::O, 0, 1)]).await;

        let outcome = service.get_game(game_id).await.unwrap();

        assert_eq!(outcome.message, "Look at this awesome game!");
        assert_eq!(outcome.data.board.get(2, 0), Some(Symbol::X));
        assert_eq!(outcome.data.board.get(0, 1), Some(Symbol::O));
        assert_eq!(outcome.data.board.occupied(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_moves_only_one_accepted() {
        let service = Arc::new(service());
        let game_id = ready_game(&service).await;

        let first = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .submit_move(game_id, &alice(), &MoveRequest::at(0, 0))
                    .await
            })
        };
        let second = {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .submit_move(game_id, &alice(), &MoveRequest::at(1, 1))
                    .await
            })
        };
        let results = [first.await.unwrap(), second.await.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(results
            .iter()
            .any(|r| matches!(r, Err(GameServiceError::WrongTurn(Symbol::X)))));
        assert_eq!(service.list_moves(game_id).await.unwrap().data.len(), 1);
    }

    #[tokio::test]
    async fn test_locks_are_not_kept_for_unknown_or_idle_games() {
        let service = service();

        for _ in 0..100 {
            let result = service
                .submit_move(Uuid::new_v4(), &alice(), &MoveRequest::at(0, 0))
                .await;
            assert!(matches!(result, Err(GameServiceError::NotFound(_))));
            let seated = service
                .assign_seat(Uuid::new_v4(), &alice(), &seat("x"))
                .await;
            assert!(matches!(seated, Err(GameServiceError::NotFound(_))));
        }
        assert_eq!(service.registered_locks().await, 0);

        let game_id = ready_game(&service).await;
        play(
            &service,
            game_id,
            &[
                (Symbol::X, 0, 0),
                (Symbol::O, 0, 1),
                (Symbol::X, 1, 0),
                (Symbol::O, 1, 1),
                (Symbol::X, 2, 0),
            ],
        )
        .await;
        assert_eq!(state_of(&service, game_id).await, GameState::WinnerX);
        assert_eq!(service.registered_locks().await, 0);
    }

    #[tokio::test]
    async fn test_lost_race_in_storage_is_a_conflict() {
        let mut game = Game::new("raced");
        game.set_seat(Symbol::X, "alice-id");
        game.set_seat(Symbol::O, "bob-id");
        let game_id = game.id;

        let mut mock_repo = MockGameRepository::new();
        mock_repo.expect_get_game().returning(move |_| {
            let game = game.clone();
            Box::pin(async move { Ok(Some(game)) })
        });
        mock_repo
            .expect_filter_moves()
            .returning(|_| Box::pin(async { Ok(Vec::new()) }));
        mock_repo
            .expect_commit_move()
            .returning(|_, _, _| Box::pin(async { Err(GameRepositoryError::Conflict) }));
        let service = GameService::new(Arc::new(mock_repo));

        let result = service
            .submit_move(game_id, &alice(), &MoveRequest::at(0, 0))
            .await;

        assert!(matches!(result, Err(GameServiceError::Conflict)));
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let mut mock_repo = MockGameRepository::new();
        mock_repo.expect_list_games().returning(|| {
            Box::pin(async { Err(GameRepositoryError::DynamoDb("unavailable".to_string())) })
        });
        let service = GameService::new(Arc::new(mock_repo));

        let result = service.list_games().await;

        assert!(matches!(result, Err(GameServiceError::RepositoryError(_))));
    }
}
