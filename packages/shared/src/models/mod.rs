pub mod auth;
pub mod board;
pub mod game;
pub mod game_move;
pub mod games;
pub mod outcome;
pub mod user;
