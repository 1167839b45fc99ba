//! TETRS core - falling-block puzzle engine
//!
//! Board model, pure engine transitions, animation-gated item effects,
//! piece spawning and the versus attack queue. Rendering, input and
//! networking live outside this crate and talk to it through
//! [`controller::RenderSink`], [`controller::Command`] and
//! [`controller::Notification`].

pub mod animation;
pub mod attack;
pub mod bag;
pub mod board;
pub mod config;
pub mod controller;
pub mod engine;
pub mod items;
pub mod piece;
pub mod score;
pub mod snapshot;
pub mod spawner;
pub mod tetromino;
pub mod versus;

pub use board::{BoardState, Cell, Special};
pub use config::GameConfig;
pub use controller::{Command, Controller, ControllerState, Notification, TickInfo};
pub use score::Difficulty;
pub use snapshot::GameSnapshot;
pub use versus::{Side, VersusMatch};
