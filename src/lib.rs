//! Splitris: a falling-block engine where pieces split apart.
//!
//! Full rows are emptied in place without shifting the board. The grid tracks
//! which cells each piece still owns; when a clear cuts a piece in two, every
//! connected fragment falls on its own until it lands.
//!
//! The engine is headless. A frontend drives it with [`Game::tick`], answers
//! "is this key held?" through [`KeyState`], and listens to board changes
//! through an [`Observer`].

pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod input;
pub mod observer;
pub mod piece;
pub mod rng;
pub mod scoring;
pub mod shape;

pub use config::{GameConfig, KeyBindings};
pub use error::EngineError;
pub use game::{Game, RunState};
pub use grid::{Cell, Direction, Grid, Pos};
pub use input::{Action, ActionGroup, KeyState, NoKeys};
pub use observer::{Event, EventLog, LoopControl, Observer};
pub use piece::{Piece, PieceId};
pub use scoring::Progress;
pub use shape::{PieceKind, Rgb, Template};
