use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// What every game and account operation hands back to the API layer:
/// a coarse status, a message meant for people and a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome<T> {
    pub data: T,
    pub status: Status,
    pub message: String,
}

impl<T> Outcome<T> {
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Outcome {
            data,
            status: Status::Ok,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>, data: T) -> Self {
        Outcome {
            data,
            status: Status::Error,
            message: message.into(),
        }
    }
}
