use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::operation::transact_write_items::TransactWriteItemsError;
use aws_sdk_dynamodb::types::{AttributeValue, Put, TransactWriteItem};
use aws_sdk_dynamodb::Client;
use serde_dynamo::{from_item, to_attribute_value, to_item};
use tokio::sync::RwLock;

use crate::models::user::User;
use crate::repositories::errors::user_repository_errors::UserRepositoryError;

#[cfg(test)]
use mockall::automock;

const USERNAME_INDEX: &str = "GSI_UserByUsername";

/// Key of the item that reserves a username. It is written in the same
/// transaction as the user, so a username can only be claimed once.
fn username_guard_key(username: &str) -> String {
    format!("USERNAME#{}", username)
}

// No `username` attribute, so guards stay out of the username index.
fn username_guard_item(user: &User) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            "id".to_string(),
            AttributeValue::S(username_guard_key(&user.username)),
        ),
        ("user_id".to_string(), AttributeValue::S(user.id.clone())),
    ])
}

pub struct DynamoDbUserRepository {
    pub client: Client,
    pub table_name: String,
}

impl DynamoDbUserRepository {
    pub fn new(client: Client, table_name: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
        }
    }
}

#[async_trait]
#[cfg_attr(test, automock)]
pub trait UserRepository: Send + Sync {
    async fn create_user(&self, user: &User) -> Result<(), UserRepositoryError>;
    async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserRepositoryError>;
    async fn get_user_by_username(&self, username: &str) -> Result<User, UserRepositoryError>;
    async fn username_exists(&self, username: &str) -> Result<bool, UserRepositoryError>;
}

#[async_trait]
impl UserRepository for DynamoDbUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), UserRepositoryError> {
        let item = to_item(user).map_err(|e| UserRepositoryError::Serialization(e.to_string()))?;

        let put_user = Put::builder()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .condition_expression("attribute_not_exists(id)")
            .build()
            .map_err(|e| UserRepositoryError::DynamoDb(e.to_string()))?;

        let put_guard = Put::builder()
            .table_name(&self.table_name)
            .set_item(Some(username_guard_item(user)))
            .condition_expression("attribute_not_exists(id)")
            .build()
            .map_err(|e| UserRepositoryError::DynamoDb(e.to_string()))?;

        self.client
            .transact_write_items()
            .transact_items(TransactWriteItem::builder().put(put_user).build())
            .transact_items(TransactWriteItem::builder().put(put_guard).build())
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(TransactWriteItemsError::TransactionCanceledException(_)) => {
                    UserRepositoryError::UsernameTaken
                }
                _ => UserRepositoryError::DynamoDb(e.to_string()),
            })?;

        Ok(())
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserRepositoryError> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(
                "id",
                to_attribute_value(user_id)
                    .map_err(|e| UserRepositoryError::Serialization(e.to_string()))?,
            )
            .send()
            .await
            .map_err(|e| UserRepositoryError::DynamoDb(e.to_string()))?;
        if let Some(item) = output.item {
            let user: User =
                from_item(item).map_err(|e| UserRepositoryError::Serialization(e.to_string()))?;
            Ok(user)
        } else {
            Err(UserRepositoryError::NotFound)
        }
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, UserRepositoryError> {
        let output = self
            .client
            .query()
            .table_name(&self.table_name)
            .index_name(USERNAME_INDEX)
            .key_condition_expression("username = :username")
            .expression_attribute_values(
                ":username",
                to_attribute_value(username)
                    .map_err(|e| UserRepositoryError::Serialization(e.to_string()))?,
            )
            .limit(1)
            .send()
            .await
            .map_err(|e| UserRepositoryError::DynamoDb(e.to_string()))?;

        match output.items.and_then(|items| items.into_iter().next()) {
            Some(item) => {
                from_item(item).map_err(|e| UserRepositoryError::Serialization(e.to_string()))
            }
            None => Err(UserRepositoryError::NotFound),
        }
    }

    async fn username_exists(&self, username: &str) -> Result<bool, UserRepositoryError> {
        match self.get_user_by_username(username).await {
            Ok(_) => Ok(true),
            Err(UserRepositoryError::NotFound) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

/// Users kept in process memory, keyed by id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create_user(&self, user: &User) -> Result<(), UserRepositoryError> {
        let mut users = self.users.write().await;
        let taken = users
            .values()
            .any(|existing| existing.username == user.username || existing.id == user.id);
        if taken {
            return Err(UserRepositoryError::UsernameTaken);
        }
        users.insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserRepositoryError> {
        self.users
            .read()
            .await
            .get(user_id)
            .cloned()
            .ok_or(UserRepositoryError::NotFound)
    }

    async fn get_user_by_username(&self, username: &str) -> Result<User, UserRepositoryError> {
        self.users
            .read()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned()
            .ok_or(UserRepositoryError::NotFound)
    }

    async fn username_exists(&self, username: &str) -> Result<bool, UserRepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .any(|user| user.username == username))
    }
}
