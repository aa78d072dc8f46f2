//! WARGAME Core - Game engine
//!
//! This crate provides the core game logic for WARGAME:
//! - Board geometry (square grid, row/col coordinates)
//! - Unit types with damage and repair tables
//! - Game state, move legality and move effects
//! - Position evaluation (E0, E1, E2 heuristics)
//! - Game options and the remote move exchange capability

pub mod board;
pub mod error;
pub mod eval;
pub mod game;
pub mod options;
pub mod remote;
pub mod units;

// Re-exports for convenient access
pub use board::{Board, Coord, DEFAULT_DIM, MAX_DIM};
pub use error::{CoreError, SourceError};
pub use eval::{Evaluator, Heuristic, HealthEval, MaterialEval, PositionalEval, AI_VALUE};
pub use game::{Action, GameState, Move, Rejection};
pub use options::{Algorithm, GameOptions, GameType, Rules, MAX_TIME};
pub use remote::{MovePayload, MoveSink, MoveSource, RecordingSink, ScriptedSource};
pub use units::{Player, Unit, UnitType, MAX_HEALTH};
