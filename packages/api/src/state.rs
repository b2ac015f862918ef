use std::sync::Arc;

use shared::config::{Config, Storage};
use shared::repositories::game_repository::{
    DynamoDbGameRepository, GameRepository, InMemoryGameRepository,
};
use shared::repositories::user_repository::{
    DynamoDbUserRepository, InMemoryUserRepository, UserRepository,
};
use shared::services::auth_service::AuthService;
use shared::services::game_service::GameService;
use shared::services::user_service::UserService;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<UserService>,
    pub game_service: Arc<GameService>,
}

impl AppState {
    pub fn new(
        user_repository: Arc<dyn UserRepository + Send + Sync>,
        game_repository: Arc<dyn GameRepository + Send + Sync>,
        jwt_secret: &str,
    ) -> Self {
        let user_service = Arc::new(UserService::new(user_repository));
        let auth_service = Arc::new(AuthService::new(user_service.clone(), jwt_secret));
        let game_service = Arc::new(GameService::new(game_repository));
        AppState {
            auth_service,
            user_service,
            game_service,
        }
    }

    /// Everything kept in process memory. Used for local runs and tests.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self::new(
            Arc::new(InMemoryUserRepository::new()),
            Arc::new(InMemoryGameRepository::new()),
            jwt_secret,
        )
    }

    pub async fn from_config(config: &Config) -> Self {
        match &config.storage {
            Storage::Memory => Self::in_memory(&config.jwt_secret),
            Storage::DynamoDb(tables) => {
                let aws_config = aws_config::load_from_env().await;
                let client = aws_sdk_dynamodb::Client::new(&aws_config);
                Self::new(
                    Arc::new(DynamoDbUserRepository::new(client.clone(), &tables.users)),
                    Arc::new(DynamoDbGameRepository::new(
                        client,
                        &tables.games,
                        &tables.moves,
                    )),
                    &config.jwt_secret,
                )
            }
        }
    }
}
