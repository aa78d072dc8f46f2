//! Remote move exchange
//!
//! A peer process relays moves through some transport. The engine only
//! needs to ask "what is the move for turn N?" and to publish its own
//! moves; the transport itself lives outside this crate.

use std::collections::VecDeque;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::board::Coord;
use crate::error::SourceError;
use crate::game::Move;

/// Wire form of a relayed move. `turn` is the 1-based number of the move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovePayload {
    pub from: Coord,
    pub to: Coord,
    pub turn: u32,
}

impl MovePayload {
    pub fn new(mv: Move, turn: u32) -> Self {
        Self {
            from: mv.src,
            to: mv.dst,
            turn,
        }
    }

    pub fn to_move(&self) -> Move {
        Move::new(self.from, self.to)
    }
}

/// Supplies moves made elsewhere. Polled repeatedly until a move shows up.
pub trait MoveSource {
    /// The move intended for `turn`, or `Ok(None)` if it has not arrived yet
    fn fetch_move(&mut self, turn: u32) -> Result<Option<Move>, SourceError>;
}

/// Receives the moves this engine commits
pub trait MoveSink {
    fn post_move(&mut self, mv: Move, turn: u32) -> Result<(), SourceError>;
}

// ============================================================================
// SCRIPTED SOURCE
// ============================================================================

/// Replays a fixed list of payloads, e.g. a recorded game
#[derive(Clone, Debug, Default)]
pub struct ScriptedSource {
    pending: VecDeque<MovePayload>,
}

impl ScriptedSource {
    pub fn new(payloads: impl IntoIterator<Item = MovePayload>) -> Self {
        Self {
            pending: payloads.into_iter().collect(),
        }
    }

    /// Load a JSON array of payloads
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read move script: {}", path.display()))?;
        let payloads: Vec<MovePayload> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse move script: {}", path.display()))?;
        Ok(Self::new(payloads))
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl MoveSource for ScriptedSource {
    fn fetch_move(&mut self, turn: u32) -> Result<Option<Move>, SourceError> {
        // Payloads for turns already played are stale
        while self.pending.front().map_or(false, |p| p.turn < turn) {
            self.pending.pop_front();
        }
        match self.pending.front() {
            None => Err(SourceError::Closed),
            Some(p) if p.turn == turn => {
                let mv = p.to_move();
                self.pending.pop_front();
                Ok(Some(mv))
            }
            Some(_) => Ok(None),
        }
    }
}

/// Keeps every posted move in memory
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    pub posted: Vec<MovePayload>,
}

impl MoveSink for RecordingSink {
    fn post_move(&mut self, mv: Move, turn: u32) -> Result<(), SourceError> {
        self.posted.push(MovePayload::new(mv, turn));
        Ok(())
    }
}
