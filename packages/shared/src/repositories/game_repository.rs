use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::{AttributeValue, Put, TransactWriteItem};
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, from_items, to_attribute_value, to_item};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::game::Game;
use crate::models::game_move::Move;
use crate::repositories::errors::game_repository_errors::GameRepositoryError;

#[cfg(test)]
use mockall::automock;

type Item = HashMap<String, AttributeValue>;

/// Storage for games and their moves.
///
/// Writes to an existing game are conditional on `expected_version`, the
/// version the caller read. A write against a stale version fails with
/// [`GameRepositoryError::Conflict`] and changes nothing.
#[async_trait]
#[cfg_attr(test, automock)]
pub trait GameRepository: Send + Sync {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError>;

    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>, GameRepositoryError>;

    async fn list_games(&self) -> Result<Vec<Game>, GameRepositoryError>;

    /// Moves of one game, oldest first.
    async fn filter_moves(&self, game_id: Uuid) -> Result<Vec<Move>, GameRepositoryError>;

    /// Stores a move on its own. Fails with `Conflict` if the cell is taken.
    async fn save_move(&self, game_move: &Move) -> Result<(), GameRepositoryError>;

    async fn save_game(&self, game: &Game, expected_version: u64)
        -> Result<(), GameRepositoryError>;

    /// Stores a new move and the game state it produced as one unit. Fails
    /// with `Conflict` if the cell is already taken or the game moved on.
    async fn commit_move(
        &self,
        game_move: &Move,
        game: &Game,
        expected_version: u64,
    ) -> Result<(), GameRepositoryError>;
}

pub struct DynamoDbGameRepository {
    pub client: Client,
    pub games_table: String,
    pub moves_table: String,
}

impl DynamoDbGameRepository {
    pub fn new(client: Client, games_table: &str, moves_table: &str) -> Self {
        Self {
            client,
            games_table: games_table.to_string(),
            moves_table: moves_table.to_string(),
        }
    }

    fn attribute<T: serde::Serialize>(value: T) -> Result<AttributeValue, GameRepositoryError> {
        to_attribute_value(value).map_err(|e| GameRepositoryError::Serialization(e.to_string()))
    }

    fn game_item(game: &Game) -> Result<Item, GameRepositoryError> {
        to_item(game).map_err(|e| GameRepositoryError::Serialization(e.to_string()))
    }

    // Moves are keyed by (game_id, cell) so a cell can only be written once.
    fn move_item(game_move: &Move) -> Result<Item, GameRepositoryError> {
        let mut item: Item = to_item(game_move)
            .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
        item.insert("cell".to_string(), AttributeValue::S(game_move.cell_key()));
        Ok(item)
    }
}

#[async_trait]
impl GameRepository for DynamoDbGameRepository {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.games_table)
            .set_item(Some(Self::game_item(game)?))
            .condition_expression("attribute_not_exists(id)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => match e.as_service_error() {
                Some(PutItemError::ConditionalCheckFailedException(_)) => {
                    Err(GameRepositoryError::AlreadyExists)
                }
                _ => Err(GameRepositoryError::DynamoDb(e.to_string())),
            },
        }
    }

    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>, GameRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.games_table)
            .key("id", Self::attribute(game_id)?)
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        match output.item {
            Some(item) => {
                let game: Game = from_item(item)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                Ok(Some(game))
            }
            None => Ok(None),
        }
    }

    async fn list_games(&self) -> Result<Vec<Game>, GameRepositoryError> {
        let mut games: Vec<Game> = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.games_table)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

            if let Some(items) = output.items {
                let page: Vec<Game> = from_items(items)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                games.extend(page);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        games.sort_by_key(|game| game.created_at);
        Ok(games)
    }

    async fn filter_moves(&self, game_id: Uuid) -> Result<Vec<Move>, GameRepositoryError> {
        let mut moves: Vec<Move> = Vec::new();
        let mut start_key: Option<Item> = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.moves_table)
                .key_condition_expression("game_id = :game_id")
                .expression_attribute_values(":game_id", Self::attribute(game_id)?)
                .consistent_read(true)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

            if let Some(items) = output.items {
                let page: Vec<Move> = from_items(items)
                    .map_err(|e| GameRepositoryError::Serialization(e.to_string()))?;
                moves.extend(page);
            }

            match output.last_evaluated_key {
                Some(key) if !key.is_empty() => start_key = Some(key),
                _ => break,
            }
        }

        moves.sort_by_key(|game_move| game_move.sequence);
        Ok(moves)
    }

    async fn save_move(&self, game_move: &Move) -> Result<(), GameRepositoryError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.moves_table)
            .set_item(Some(Self::move_item(game_move)?))
            .condition_expression("attribute_not_exists(#cell)")
            .expression_attribute_names("#cell", "cell")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => match e.as_service_error() {
                Some(PutItemError::ConditionalCheckFailedException(_)) => {
                    Err(GameRepositoryError::Conflict)
                }
                _ => Err(GameRepositoryError::DynamoDb(e.to_string())),
            },
        }
    }

    async fn save_game(
        &self,
        game: &Game,
        expected_version: u64,
    ) -> Result<(), GameRepositoryError> {
        let result = self
            .client
            .put_item()
            .table_name(&self.games_table)
            .set_item(Some(Self::game_item(game)?))
            .condition_expression("#version = :expected")
            .expression_attribute_names("#version", "version")
            .expression_attribute_values(":expected", Self::attribute(expected_version)?)
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => match e.as_service_error() {
                Some(PutItemError::ConditionalCheckFailedException(_)) => {
                    Err(GameRepositoryError::Conflict)
                }
                _ => Err(GameRepositoryError::DynamoDb(e.to_string())),
            },
        }
    }

    async fn commit_move(
        &self,
        game_move: &Move,
        game: &Game,
        expected_version: u64,
    ) -> Result<(), GameRepositoryError> {
        let put_move = Put::builder()
            .table_name(&self.moves_table)
            .set_item(Some(Self::move_item(game_move)?))
            .condition_expression("attribute_not_exists(#cell)")
            .expression_attribute_names("#cell", "cell")
            .build()
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        let put_game = Put::builder()
            .table_name(&self.games_table)
            .set_item(Some(Self::game_item(game)?))
            .condition_expression("#version = :expected")
            .expression_attribute_names("#version", "version")
            .expression_attribute_values(":expected", Self::attribute(expected_version)?)
            .build()
            .map_err(|e| GameRepositoryError::DynamoDb(e.to_string()))?;

        self.client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder().put(put_move).build())
            .transact_items(TransactWriteItem::builder().put(put_game).build())
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(TransactWriteItemsError::TransactionCanceledException(_)) => {
                    GameRepositoryError::Conflict
                }
                _ => GameRepositoryError::DynamoDb(e.to_string()),
            })?;

        Ok(())
    }
}

#[derive(Default)]
struct GameStore {
    games: HashMap<Uuid, Game>,
    moves: HashMap<Uuid, Vec<Move>>,
}

/// Process-local store used for local runs and tests.
#[derive(Default)]
pub struct InMemoryGameRepository {
    store: RwLock<GameStore>,
}

impl InMemoryGameRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_version(
    store: &GameStore,
    game_id: Uuid,
    expected_version: u64,
) -> Result<(), GameRepositoryError> {
    match store.games.get(&game_id) {
        Some(current) if current.version == expected_version => Ok(()),
        Some(_) => Err(GameRepositoryError::Conflict),
        None => Err(GameRepositoryError::NotFound),
    }
}

fn cell_taken(store: &GameStore, game_move: &Move) -> bool {
    store.moves.get(&game_move.game_id).is_some_and(|moves| {
        moves
            .iter()
            .any(|existing| existing.x == game_move.x && existing.y == game_move.y)
    })
}

#[async_trait]
impl GameRepository for InMemoryGameRepository {
    async fn create_game(&self, game: &Game) -> Result<(), GameRepositoryError> {
        let mut store = self.store.write().await;
        if store.games.contains_key(&game.id) {
            return Err(GameRepositoryError::AlreadyExists);
        }
        store.games.insert(game.id, game.clone());
        Ok(())
    }

    async fn get_game(&self, game_id: Uuid) -> Result<Option<Game>, GameRepositoryError> {
        Ok(self.store.read().await.games.get(&game_id).cloned())
    }

    async fn list_games(&self) -> Result<Vec<Game>, GameRepositoryError> {
        let mut games: Vec<Game> = self.store.read().await.games.values().cloned().collect();
        games.sort_by_key(|game| game.created_at);
        Ok(games)
    }

    async fn filter_moves(&self, game_id: Uuid) -> Result<Vec<Move>, GameRepositoryError> {
        let mut moves = self
            .store
            .read()
            .await
            .moves
            .get(&game_id)
            .cloned()
            .unwrap_or_default();
        moves.sort_by_key(|game_move| game_move.sequence);
        Ok(moves)
    }

    async fn save_move(&self, game_move: &Move) -> Result<(), GameRepositoryError> {
        let mut store = self.store.write().await;
        if !store.games.contains_key(&game_move.game_id) {
            return Err(GameRepositoryError::NotFound);
        }
        if cell_taken(&store, game_move) {
            return Err(GameRepositoryError::Conflict);
        }
        store
            .moves
            .entry(game_move.game_id)
            .or_default()
            .push(game_move.clone());
        Ok(())
    }

    async fn save_game(
        &self,
        game: &Game,
        expected_version: u64,
    ) -> Result<(), GameRepositoryError> {
        let mut store = self.store.write().await;
        check_version(&store, game.id, expected_version)?;
        store.games.insert(game.id, game.clone());
        Ok(())
    }

    async fn commit_move(
        &self,
        game_move: &Move,
        game: &Game,
        expected_version: u64,
    ) -> Result<(), GameRepositoryError> {
        let mut store = self.store.write().await;
        check_version(&store, game.id, expected_version)?;

        if cell_taken(&store, game_move) {
            return Err(GameRepositoryError::Conflict);
        }

        store
            .moves
            .entry(game_move.game_id)
            .or_default()
            .push(game_move.clone());
        store.games.insert(game.id, game.clone());
        Ok(())
    }
}
