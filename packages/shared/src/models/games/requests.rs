use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct CreateGameRequest {
    #[serde(default)]
    pub name: String,
}

/// Seat claim. `player` is checked by the game service, so an unknown
/// symbol is reported as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SeatRequest {
    #[serde(default)]
    pub player: Option<String>,
}

/// Proposed coordinates. Either may be missing in a malformed payload.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MoveRequest {
    #[serde(default)]
    pub x: Option<i64>,
    #[serde(default)]
    pub y: Option<i64>,
}

impl MoveRequest {
    pub fn at(x: i64, y: i64) -> Self {
        MoveRequest {
            x: Some(x),
            y: Some(y),
        }
    }
}
