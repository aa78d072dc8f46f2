//! Position evaluation
//!
//! Every evaluator scores from the Attacker's point of view:
//! `attacker_score - defender_score`. The Attacker maximizes, the Defender
//! minimizes.

use std::fmt;
use std::str::FromStr;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::game::{GameState, Move};
use crate::units::{Player, Unit, UnitType};

/// Flat value of a living AI; dominates every other term
pub const AI_VALUE: f64 = 9999.0;

/// Upper bound (exclusive) of the per-unit jitter used by E2
pub const DEFAULT_JITTER: u32 = 30;

const MOBILITY_BONUS: f64 = 2.0;
const PROXIMITY_WEIGHT: f64 = 100.0;

/// A static board scoring function
pub trait Evaluator {
    fn evaluate(&mut self, state: &GameState) -> f64;

    fn heuristic(&self) -> Heuristic;
}

/// Available heuristics, selectable from configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heuristic {
    /// Material only
    E0,
    /// Material and health
    E1,
    /// Material, health, position and mobility (randomized)
    E2,
}

impl Heuristic {
    /// Build an evaluator; `seed` only matters for E2
    pub fn evaluator(self, seed: Option<u64>) -> Box<dyn Evaluator> {
        match self {
            Heuristic::E0 => Box::new(MaterialEval),
            Heuristic::E1 => Box::new(HealthEval),
            Heuristic::E2 => Box::new(PositionalEval::new(seed)),
        }
    }
}

impl fmt::Display for Heuristic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Heuristic::E0 => "e0",
            Heuristic::E1 => "e1",
            Heuristic::E2 => "e2",
        };
        f.write_str(name)
    }
}

impl FromStr for Heuristic {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "e0" => Ok(Heuristic::E0),
            "e1" => Ok(Heuristic::E1),
            "e2" => Ok(Heuristic::E2),
            other => Err(CoreError::InvalidOptions(format!("unknown heuristic '{other}'"))),
        }
    }
}

// ============================================================================
// E0 / E1
// ============================================================================

/// E0: AI 9999, any other unit 3
#[derive(Clone, Copy, Debug, Default)]
pub struct MaterialEval;

impl Evaluator for MaterialEval {
    fn evaluate(&mut self, state: &GameState) -> f64 {
        side_difference(state, |unit| match unit.unit_type {
            UnitType::AI => AI_VALUE,
            _ => 3.0,
        })
    }

    fn heuristic(&self) -> Heuristic {
        Heuristic::E0
    }
}

/// E1: per-type base value plus weighted health
#[derive(Clone, Copy, Debug, Default)]
pub struct HealthEval;

impl Evaluator for HealthEval {
    fn evaluate(&mut self, state: &GameState) -> f64 {
        side_difference(state, unit_value)
    }

    fn heuristic(&self) -> Heuristic {
        Heuristic::E1
    }
}

/// Base plus health term shared by E1 and E2
pub fn unit_value(unit: &Unit) -> f64 {
    let health = f64::from(unit.health);
    match unit.unit_type {
        UnitType::AI => AI_VALUE,
        UnitType::Virus | UnitType::Tech => 20.0 + 2.0 * health,
        UnitType::Firewall => 15.0 + 1.5 * health,
        UnitType::Program => 10.0 + health,
    }
}

fn side_difference(state: &GameState, value: impl Fn(&Unit) -> f64) -> f64 {
    state
        .board()
        .units()
        .map(|(_, unit)| match unit.player {
            Player::Attacker => value(&unit),
            Player::Defender => -value(&unit),
        })
        .sum()
}

// ============================================================================
// E2
// ============================================================================

/// E2: E1 terms plus jitter, Virus pressure on the Defender AI and mobility
#[derive(Clone, Debug)]
pub struct PositionalEval {
    rng: ChaCha8Rng,
    jitter: u32,
}

impl PositionalEval {
    pub fn new(seed: Option<u64>) -> Self {
        Self::with_jitter(seed, DEFAULT_JITTER)
    }

    /// `jitter == 0` makes the evaluation deterministic
    pub fn with_jitter(seed: Option<u64>, jitter: u32) -> Self {
        let seed = seed.unwrap_or_else(rand::random::<u64>);
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            jitter,
        }
    }

    fn noise(&mut self) -> f64 {
        if self.jitter == 0 {
            0.0
        } else {
            f64::from(self.rng.gen_range(0..self.jitter))
        }
    }
}

impl Evaluator for PositionalEval {
    fn evaluate(&mut self, state: &GameState) -> f64 {
        let dim = state.dim();
        let defender_ai = state.ai_position(Player::Defender);

        let mut attacker_score = 0.0;
        let mut defender_score = 0.0;

        for (coord, unit) in state.board().units() {
            let mut score = unit_value(&unit) + self.noise();

            if unit.player == Player::Attacker && unit.unit_type == UnitType::Virus {
                if let Some(ai) = defender_ai {
                    score += PROXIMITY_WEIGHT / (coord.euclidean_distance(ai) + 1.0);
                }
            }

            // Each side's mobility is counted as if it were to move
            let mobility = coord
                .surrounding()
                .filter(|n| n.is_valid(dim))
                .filter(|&n| state.classify_as(unit.player, Move::new(coord, n)).is_legal())
                .count();
            score += MOBILITY_BONUS * mobility as f64;

            match unit.player {
                Player::Attacker => attacker_score += score,
                Player::Defender => defender_score += score,
            }
        }

        // Threat on the Defender AI from every attacking Virus
        if let Some(ai) = defender_ai {
            for (coord, unit) in state.player_units(Player::Attacker) {
                if unit.unit_type == UnitType::Virus {
                    defender_score -= PROXIMITY_WEIGHT / (ai.euclidean_distance(coord) + 1.0);
                }
            }
        }

        attacker_score - defender_score
    }

    fn heuristic(&self) -> Heuristic {
        Heuristic::E2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Coord;
    use crate::options::Rules;

    fn duel() -> GameState {
        let mut game = GameState::empty(Rules::default());
        game.place(Coord::new(4, 4), Unit::new(Player::Attacker, UnitType::AI));
        game.place(Coord::new(0, 0), Unit::new(Player::Defender, UnitType::AI));
        game.place(Coord::new(0, 2), Unit::new(Player::Attacker, UnitType::Virus));
        game
    }

    #[test]
    fn test_e0_initial_board_is_balanced() {
        let game = GameState::new(Rules::default());
        assert_eq!(MaterialEval.evaluate(&game), 0.0);
    }

    #[test]
    fn test_e1_initial_board() {
        // Defender fields Tech and Firewalls, the Attacker Viruses and Programs
        let game = GameState::new(Rules::default());
        assert_eq!(HealthEval.evaluate(&game), -9.5);
    }

    #[test]
    fn test_e1_tracks_health() {
        let mut game = duel();
        let full = HealthEval.evaluate(&game);
        game.place(
            Coord::new(0, 2),
            Unit::new(Player::Attacker, UnitType::Virus).with_health(4),
        );
        assert_eq!(full - HealthEval.evaluate(&game), 10.0);
    }

    #[test]
    fn test_losing_ai_dominates() {
        let game = duel();
        let mut no_ai = GameState::empty(Rules::default());
        no_ai.place(Coord::new(4, 4), Unit::new(Player::Attacker, UnitType::AI));
        no_ai.place(Coord::new(0, 2), Unit::new(Player::Attacker, UnitType::Virus));
        assert!(HealthEval.evaluate(&no_ai) - HealthEval.evaluate(&game) > 9000.0);
        assert!(MaterialEval.evaluate(&game) < MaterialEval.evaluate(&no_ai));
    }

    #[test]
    fn test_e2_without_jitter() {
        let game = duel();
        let mut eval = PositionalEval::with_jitter(Some(1), 0);
        // Both AIs have mobility 2, Virus base 38 + pressure 100/3 +
        // mobility 3, Defender threat penalty 100/3
        let expected = 38.0 + 6.0 + 200.0 / 3.0;
        assert!((eval.evaluate(&game) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_e2_ignores_side_to_move() {
        let mut game = GameState::empty(Rules::default());
        game.place(Coord::new(2, 2), Unit::new(Player::Attacker, UnitType::AI));
        game.place(Coord::new(0, 4), Unit::new(Player::Defender, UnitType::AI));
        let mut eval = PositionalEval::with_jitter(Some(1), 0);

        let attacker_turn = eval.evaluate(&game);
        let defender_turn = eval.evaluate(&game.clone().with_next_player(Player::Defender));

        // Attacker AI can go up or left, Defender AI only down
        assert_eq!(attacker_turn, 2.0);
        assert_eq!(defender_turn, attacker_turn);
    }

    #[test]
    fn test_e2_skips_distance_terms_without_defender_ai() {
        let mut game = GameState::empty(Rules::default());
        game.place(Coord::new(4, 4), Unit::new(Player::Attacker, UnitType::AI));
        game.place(Coord::new(2, 2), Unit::new(Player::Attacker, UnitType::Virus));
        game.place(Coord::new(0, 0), Unit::new(Player::Defender, UnitType::Program));
        assert!(game.ai_position(Player::Defender).is_none());

        let mut eval = PositionalEval::with_jitter(Some(1), 0);
        // Attacker: AI 9999 + 2 moves, Virus 38 + 4 moves
        // Defender: Program 19 + 2 moves; no pressure or threat terms
        let expected = (9999.0 + 4.0 + 38.0 + 8.0) - (19.0 + 4.0);
        assert_eq!(eval.evaluate(&game), expected);
    }

    #[test]
    fn test_e2_jitter_bounds_and_seed() {
        let game = duel();
        let exact = PositionalEval::with_jitter(None, 0).evaluate(&game);
        let mut a = PositionalEval::new(Some(9));
        let mut b = PositionalEval::new(Some(9));
        for _ in 0..20 {
            let score = a.evaluate(&game);
            assert_eq!(score, b.evaluate(&game));
            // Two attacker units, one defender unit
            assert!(score >= exact - 29.0 - 1e-9 && score < exact + 60.0);
        }
    }

    #[test]
    fn test_heuristic_selection() {
        assert_eq!(Heuristic::E1.evaluator(None).heuristic(), Heuristic::E1);
        assert_eq!("E2".parse::<Heuristic>().unwrap(), Heuristic::E2);
        assert!("e9".parse::<Heuristic>().is_err());
        assert_eq!(Heuristic::E0.to_string(), "e0");
    }
}
