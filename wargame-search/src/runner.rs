//! Game runner - plays complete games between controllers
//!
//! Level 3 - Step-level implementation

use std::fmt;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use wargame_core::{
    Action, GameOptions, GameState, Move, MoveSink, MoveSource, Player, Rejection, SourceError,
};

use crate::context::SearchContext;
use crate::SearchError;

// ============================================================================
// CONTROLLERS
// ============================================================================

/// Who picks the moves for one side
pub enum Controller {
    /// Tree search
    Computer(Box<SearchContext>),
    /// Uniformly random legal moves
    Random(ChaCha8Rng),
    /// Moves relayed from elsewhere, polled until they arrive
    Remote(Box<dyn MoveSource>),
}

impl Controller {
    pub fn computer(options: &GameOptions) -> Self {
        Controller::Computer(Box::new(SearchContext::new(options.clone())))
    }

    pub fn random(seed: u64) -> Self {
        Controller::Random(ChaCha8Rng::seed_from_u64(seed))
    }

    pub fn remote(source: impl MoveSource + 'static) -> Self {
        Controller::Remote(Box::new(source))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Controller::Computer(_) => "computer",
            Controller::Random(_) => "random",
            Controller::Remote(_) => "remote",
        }
    }

    fn is_remote(&self) -> bool {
        matches!(self, Controller::Remote(_))
    }

    fn is_computer(&self) -> bool {
        matches!(self, Controller::Computer(_))
    }
}

/// Polling behaviour for remote controllers and the time rule
#[derive(Clone, Copy, Debug)]
pub struct RunnerConfig {
    pub poll_interval: Duration,
    /// Attempts per turn before giving up
    pub max_polls: u32,
    /// A computer side that thinks longer than `max_time` loses
    pub forfeit_on_overrun: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            max_polls: 600,
            forfeit_on_overrun: true,
        }
    }
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("move source failed on turn {turn}: {source}")]
    Source { turn: u32, source: SourceError },

    #[error("no move from {player} after {polls} polls on turn {turn}")]
    Timeout { player: Player, turn: u32, polls: u32 },

    #[error("{player} played {mv} on turn {turn}: {reason}")]
    IllegalMove {
        player: Player,
        mv: Move,
        turn: u32,
        reason: Rejection,
    },

    #[error(transparent)]
    Search(#[from] SearchError),
}

// ============================================================================
// OUTCOME
// ============================================================================

/// One played move
#[derive(Clone, Debug)]
pub struct TurnRecord {
    /// 1-based move number
    pub turn: u32,
    pub player: Player,
    pub mv: Move,
    pub action: Action,
    /// Backed-up search score, for computer moves
    pub score: Option<f64>,
    pub elapsed: Duration,
}

/// Why a side lost before its AI was destroyed
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ForfeitReason {
    NoLegalMove,
    /// A computer move took longer than `max_time`
    Overrun,
}

impl fmt::Display for ForfeitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForfeitReason::NoLegalMove => f.write_str("had no legal move"),
            ForfeitReason::Overrun => f.write_str("took too long to move"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Forfeit {
    pub player: Player,
    pub reason: ForfeitReason,
}

/// Outcome of a single game
#[derive(Clone, Debug)]
pub struct GameOutcome {
    pub winner: Player,
    pub turns_played: u32,
    pub history: Vec<TurnRecord>,
    pub final_state: GameState,
    pub forfeit: Option<Forfeit>,
}

impl GameOutcome {
    pub fn attacker_wins(&self) -> bool {
        self.winner == Player::Attacker
    }

    pub fn defender_wins(&self) -> bool {
        self.winner == Player::Defender
    }
}

type TurnObserver = Box<dyn FnMut(&TurnRecord, &GameState)>;

// ============================================================================
// GAME RUNNER
// ============================================================================

/// Alternates the two controllers until the game is decided
pub struct GameRunner {
    options: GameOptions,
    attacker: Controller,
    defender: Controller,
    sink: Option<Box<dyn MoveSink>>,
    config: RunnerConfig,
    observer: Option<TurnObserver>,
}

impl GameRunner {
    pub fn new(options: GameOptions, attacker: Controller, defender: Controller) -> Self {
        Self {
            options,
            attacker,
            defender,
            sink: None,
            config: RunnerConfig::default(),
            observer: None,
        }
    }

    /// Publish every move not made by a remote controller
    pub fn with_sink(mut self, sink: impl MoveSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    pub fn with_config(mut self, config: RunnerConfig) -> Self {
        self.config = config;
        self
    }

    /// Called after every move with the resulting state
    pub fn on_turn(mut self, observer: impl FnMut(&TurnRecord, &GameState) + 'static) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    pub fn options(&self) -> &GameOptions {
        &self.options
    }

    /// Play from the default setup
    pub fn play_game(&mut self) -> Result<GameOutcome, RunnerError> {
        self.play_from(GameState::new(self.options.rules()))
    }

    /// Play from `state` until a winner is known
    pub fn play_from(&mut self, mut state: GameState) -> Result<GameOutcome, RunnerError> {
        let mut history = Vec::new();
        let mut forfeit = None;

        tracing::info!(
            attacker = self.attacker.name(),
            defender = self.defender.name(),
            max_turns = state.rules().max_turns,
            "Game started"
        );

        while !state.is_finished() {
            let player = state.next_player();
            let turn = state.turns_played() + 1;
            let start = Instant::now();

            let controller = match player {
                Player::Attacker => &mut self.attacker,
                Player::Defender => &mut self.defender,
            };
            let choice = if state.legal_moves().is_empty() {
                None
            } else {
                next_move(controller, &state, turn, &self.config)?
            };

            let Some((mv, score)) = choice else {
                tracing::info!(%player, turn, "No legal move, side loses");
                state.set_has_ai(player, false);
                forfeit = Some(Forfeit {
                    player,
                    reason: ForfeitReason::NoLegalMove,
                });
                break;
            };

            let thinking = start.elapsed();
            if controller.is_computer() && thinking.as_secs_f64() > self.options.max_time {
                tracing::warn!(
                    %player,
                    turn,
                    elapsed_s = thinking.as_secs_f64(),
                    max_time = self.options.max_time,
                    "Move took longer than allowed"
                );
                if self.config.forfeit_on_overrun {
                    state.set_has_ai(player, false);
                    forfeit = Some(Forfeit {
                        player,
                        reason: ForfeitReason::Overrun,
                    });
                    break;
                }
            }

            let action = state
                .perform_move(mv)
                .map_err(|reason| RunnerError::IllegalMove {
                    player,
                    mv,
                    turn,
                    reason,
                })?;
            state.next_turn();

            let elapsed = start.elapsed();
            tracing::info!(%player, turn, %mv, ?action, "Move played");

            if !controller.is_remote() {
                if let Some(sink) = self.sink.as_mut() {
                    if let Err(e) = sink.post_move(mv, turn) {
                        tracing::warn!(turn, error = %e, "Failed to publish move");
                    }
                }
            }

            let record = TurnRecord {
                turn,
                player,
                mv,
                action,
                score,
                elapsed,
            };
            if let Some(observer) = self.observer.as_mut() {
                observer(&record, &state);
            }
            history.push(record);
        }

        let winner = state.winner().unwrap_or(Player::Defender);
        tracing::info!(%winner, turns = state.turns_played(), "Game over");

        Ok(GameOutcome {
            winner,
            turns_played: state.turns_played(),
            history,
            final_state: state,
            forfeit,
        })
    }
}

/// Ask a controller for its move. `None` means it has nothing to play.
fn next_move(
    controller: &mut Controller,
    state: &GameState,
    turn: u32,
    config: &RunnerConfig,
) -> Result<Option<(Move, Option<f64>)>, RunnerError> {
    match controller {
        Controller::Computer(ctx) => match ctx.choose_move(state) {
            Ok(decision) => Ok(Some((decision.mv, Some(decision.score)))),
            Err(SearchError::NoLegalMove(_)) => Ok(None),
            Err(e) => Err(e.into()),
        },
        Controller::Random(rng) => Ok(state.random_move(rng).map(|mv| (mv, None))),
        Controller::Remote(source) => {
            poll_remote(source.as_mut(), state, turn, config).map(|mv| Some((mv, None)))
        }
    }
}

/// Poll until the source delivers a legal move for `turn`
fn poll_remote(
    source: &mut dyn MoveSource,
    state: &GameState,
    turn: u32,
    config: &RunnerConfig,
) -> Result<Move, RunnerError> {
    let player = state.next_player();
    for attempt in 0..config.max_polls {
        if attempt > 0 {
            std::thread::sleep(config.poll_interval);
        }
        match source.fetch_move(turn) {
            Ok(Some(mv)) => match state.classify(mv) {
                Action::Rejected(reason) => {
                    tracing::warn!(%player, turn, %mv, %reason, "Ignoring illegal remote move");
                }
                _ => return Ok(mv),
            },
            Ok(None) => {}
            Err(e) if e.is_retryable() => {
                tracing::warn!(turn, error = %e, "Move source failed, retrying");
            }
            Err(e) => return Err(RunnerError::Source { turn, source: e }),
        }
    }
    Err(RunnerError::Timeout {
        player,
        turn,
        polls: config.max_polls,
    })
}
