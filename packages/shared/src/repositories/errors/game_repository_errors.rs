#[derive(Debug)]
pub enum GameRepositoryError {
    NotFound,
    AlreadyExists,
    /// A conditional write lost against a concurrent writer.
    Conflict,
    Serialization(String),
    DynamoDb(String),
}

impl std::fmt::Display for GameRepositoryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameRepositoryError::NotFound => write!(f, "Game not found"),
            GameRepositoryError::AlreadyExists => write!(f, "Game already exists"),
            GameRepositoryError::Conflict => write!(f, "Game was modified concurrently"),
            GameRepositoryError::Serialization(msg) => {
                write!(f, "Serialization error: {}", msg)
            }
            GameRepositoryError::DynamoDb(msg) => write!(f, "DynamoDB error: {}", msg),
        }
    }
}

impl std::error::Error for GameRepositoryError {}
