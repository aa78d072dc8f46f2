//! Game state, move legality and move effects

use std::fmt;
use std::str::FromStr;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::board::{parse_pair, significant_chars, Board, Coord, MAX_DIM};
use crate::error::CoreError;
use crate::options::Rules;
use crate::units::{damage, repair, Player, Unit, UnitType, MAX_HEALTH, SELF_DESTRUCT_DAMAGE};

// ============================================================================
// CORE TYPES
// ============================================================================

/// A move: source and destination cell. `src == dst` is a self-destruct.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub src: Coord,
    pub dst: Coord,
}

impl Move {
    pub const fn new(src: Coord, dst: Coord) -> Self {
        Self { src, dst }
    }

    pub const fn self_destruct(at: Coord) -> Self {
        Self { src: at, dst: at }
    }

    pub fn is_self_destruct(&self) -> bool {
        self.src == self.dst
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.src, self.dst)
    }
}

impl FromStr for Move {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars = significant_chars(s);
        let parsed = match chars.as_slice() {
            [r0, c0, r1, c1] => parse_pair(*r0, *c0).zip(parse_pair(*r1, *c1)),
            _ => None,
        };
        parsed
            .map(|(src, dst)| Move::new(src, dst))
            .ok_or_else(|| CoreError::InvalidMove(s.to_string()))
    }
}

/// Why a move was refused
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    #[error("source or destination is not on the board")]
    OffBoard,
    #[error("no unit at the source cell")]
    EmptySource,
    #[error("it is {0}'s turn")]
    WrongTurn(Player),
    #[error("destination is not adjacent to the source")]
    NotAdjacent,
    #[error("this unit cannot repair the target")]
    CannotRepair,
    #[error("unit is engaged in combat")]
    EngagedInCombat,
    #[error("nothing to do on the destination cell")]
    NothingToDo,
    #[error("{0} units of this type cannot move in that direction")]
    WrongDirection(Player),
    #[error("destination is occupied")]
    Occupied,
}

/// Classification of a move against a state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    OrdinaryMove,
    Attack,
    Repair,
    SelfDestruct,
    Rejected(Rejection),
}

impl Action {
    pub fn is_legal(&self) -> bool {
        !matches!(self, Action::Rejected(_))
    }

    pub fn rejection(&self) -> Option<Rejection> {
        match self {
            Action::Rejected(reason) => Some(*reason),
            _ => None,
        }
    }
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state (clone to branch; clones share nothing)
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    board: Board,
    next_player: Player,
    turns_played: u32,
    rules: Rules,
    attacker_has_ai: bool,
    defender_has_ai: bool,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    /// Standard opening position
    ///
    /// # Panics
    ///
    /// If `rules.dim` is outside `3..=MAX_DIM`; `GameOptions::validate`
    /// rejects such dimensions.
    pub fn new(rules: Rules) -> Self {
        let m = match i8::try_from(rules.dim) {
            Ok(dim) if (3..=MAX_DIM).contains(&rules.dim) => dim - 1,
            _ => panic!("board dimension must be within 3..={MAX_DIM}, got {}", rules.dim),
        };
        let mut state = Self::empty(rules);

        let defender = [
            (0, 0, UnitType::AI),
            (1, 0, UnitType::Tech),
            (0, 1, UnitType::Tech),
            (2, 0, UnitType::Firewall),
            (0, 2, UnitType::Firewall),
            (1, 1, UnitType::Program),
        ];
        let attacker = [
            (m, m, UnitType::AI),
            (m - 1, m, UnitType::Virus),
            (m, m - 1, UnitType::Virus),
            (m - 2, m, UnitType::Program),
            (m, m - 2, UnitType::Program),
            (m - 1, m - 1, UnitType::Firewall),
        ];

        for (row, col, unit_type) in defender {
            state.place(Coord::new(row, col), Unit::new(Player::Defender, unit_type));
        }
        for (row, col, unit_type) in attacker {
            state.place(Coord::new(row, col), Unit::new(Player::Attacker, unit_type));
        }
        state
    }

    /// Board with no units; the Attacker moves first
    pub fn empty(rules: Rules) -> Self {
        Self {
            board: Board::new(rules.dim),
            next_player: Player::Attacker,
            turns_played: 0,
            rules,
            attacker_has_ai: false,
            defender_has_ai: false,
        }
    }

    /// Put a unit on the board (setup helper)
    pub fn place(&mut self, coord: Coord, unit: Unit) {
        if unit.unit_type == UnitType::AI {
            self.set_has_ai(unit.player, true);
        }
        self.board.set(coord, Some(unit));
    }

    pub fn with_next_player(mut self, player: Player) -> Self {
        self.next_player = player;
        self
    }

    pub fn with_turns_played(mut self, turns: u32) -> Self {
        self.turns_played = turns;
        self
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn get(&self, coord: Coord) -> Option<&Unit> {
        self.board.get(coord)
    }

    pub fn next_player(&self) -> Player {
        self.next_player
    }

    pub fn turns_played(&self) -> u32 {
        self.turns_played
    }

    pub fn rules(&self) -> Rules {
        self.rules
    }

    pub fn dim(&self) -> usize {
        self.rules.dim
    }

    pub fn has_ai(&self, player: Player) -> bool {
        match player {
            Player::Attacker => self.attacker_has_ai,
            Player::Defender => self.defender_has_ai,
        }
    }

    /// Declare a side's AI lost (forced loss)
    pub fn set_has_ai(&mut self, player: Player, alive: bool) {
        match player {
            Player::Attacker => self.attacker_has_ai = alive,
            Player::Defender => self.defender_has_ai = alive,
        }
    }

    /// Units belonging to `player`, row-major
    pub fn player_units(&self, player: Player) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        self.board.units().filter(move |(_, unit)| unit.player == player)
    }

    pub fn ai_position(&self, player: Player) -> Option<Coord> {
        self.player_units(player)
            .find(|(_, unit)| unit.unit_type == UnitType::AI)
            .map(|(coord, _)| coord)
    }

    /// Number of enemy units orthogonally adjacent to the unit at `coord`
    pub fn adjacent_enemies(&self, coord: Coord) -> usize {
        let owner = match self.board.get(coord) {
            Some(unit) => unit.player,
            None => return 0,
        };
        coord
            .adjacent()
            .filter_map(|n| self.board.get(n))
            .filter(|unit| unit.player != owner)
            .count()
    }

    pub fn is_engaged(&self, coord: Coord) -> bool {
        self.adjacent_enemies(coord) > 0
    }

    // ========================================================================
    // GAME RESULT
    // ========================================================================

    /// Winner, if the game is decided
    pub fn winner(&self) -> Option<Player> {
        if self.turns_played >= self.rules.max_turns {
            return Some(Player::Defender);
        }
        match (self.attacker_has_ai, self.defender_has_ai) {
            (true, true) => None,
            (true, false) => Some(Player::Attacker),
            (false, _) => Some(Player::Defender),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner().is_some()
    }

    // ========================================================================
    // LEGALITY
    // ========================================================================

    /// Classify a move for the side to move. Rules are checked in a fixed
    /// order; the first one that decides wins.
    pub fn classify(&self, mv: Move) -> Action {
        self.classify_as(self.next_player, mv)
    }

    /// Classify a move as if `mover` were the side to move
    pub fn classify_as(&self, mover: Player, mv: Move) -> Action {
        let dim = self.rules.dim;
        if !mv.src.is_valid(dim) || !mv.dst.is_valid(dim) {
            return Action::Rejected(Rejection::OffBoard);
        }

        let src = match self.board.get(mv.src) {
            Some(unit) => *unit,
            None => return Action::Rejected(Rejection::EmptySource),
        };
        if src.player != mover {
            return Action::Rejected(Rejection::WrongTurn(mover));
        }

        let dst = self.board.get(mv.dst).copied();
        if mv.is_self_destruct() {
            return Action::SelfDestruct;
        }
        if !mv.src.is_adjacent(mv.dst) {
            return Action::Rejected(Rejection::NotAdjacent);
        }

        // AI repairs Tech and Virus
        if src.unit_type == UnitType::AI {
            if let Some(target) = dst.filter(|d| d.player == src.player) {
                let repairable = matches!(target.unit_type, UnitType::Tech | UnitType::Virus);
                return if repairable && target.health < MAX_HEALTH {
                    Action::Repair
                } else {
                    Action::Rejected(Rejection::CannotRepair)
                };
            }
        }

        if src.unit_type.is_heavy() {
            if matches!(dst, Some(target) if target.player != src.player) {
                return Action::Attack;
            }
            if self.is_engaged(mv.src) {
                return Action::Rejected(Rejection::EngagedInCombat);
            }
        } else if let Some(target) = dst {
            if target.player != src.player {
                return Action::Attack;
            }
            // Tech repairs AI, Firewall and Program
            if src.unit_type == UnitType::Tech
                && target.unit_type.is_heavy()
                && target.health < MAX_HEALTH
            {
                return Action::Repair;
            }
            return Action::Rejected(Rejection::NothingToDo);
        }

        if src.unit_type.is_heavy() && !direction_allowed(src.player, mv) {
            return Action::Rejected(Rejection::WrongDirection(src.player));
        }

        if dst.is_none() {
            Action::OrdinaryMove
        } else {
            Action::Rejected(Rejection::Occupied)
        }
    }

    // ========================================================================
    // APPLY MOVE
    // ========================================================================

    /// Validate and perform a move in place. The turn is not advanced.
    pub fn perform_move(&mut self, mv: Move) -> Result<Action, Rejection> {
        let action = self.classify(mv);
        match action {
            Action::Rejected(reason) => return Err(reason),
            Action::OrdinaryMove => {
                let unit = self.board.take(mv.src);
                self.board.set(mv.dst, unit);
            }
            Action::Attack => self.perform_attack(mv),
            Action::Repair => self.perform_repair(mv),
            Action::SelfDestruct => self.perform_self_destruct(mv.src),
        }
        Ok(action)
    }

    /// Apply a move and advance the turn, returning the new state
    pub fn apply_move(&self, mv: Move) -> Result<Self, Rejection> {
        let mut next = self.clone();
        next.perform_move(mv)?;
        next.next_turn();
        Ok(next)
    }

    pub fn next_turn(&mut self) {
        self.next_player = self.next_player.opponent();
        self.turns_played += 1;
    }

    fn perform_attack(&mut self, mv: Move) {
        let (attacker, target) = match (self.board.get(mv.src), self.board.get(mv.dst)) {
            (Some(a), Some(t)) => (a.unit_type, t.unit_type),
            _ => return,
        };
        // Both amounts are fixed before either side is hit
        let to_target = damage(attacker, target);
        let to_attacker = damage(target, attacker);
        self.mod_health(mv.src, -i16::from(to_attacker));
        self.mod_health(mv.dst, -i16::from(to_target));
    }

    fn perform_repair(&mut self, mv: Move) {
        let amount = match (self.board.get(mv.src), self.board.get(mv.dst)) {
            (Some(r), Some(t)) => repair(r.unit_type, t.unit_type),
            _ => return,
        };
        self.mod_health(mv.dst, i16::from(amount));
    }

    fn perform_self_destruct(&mut self, at: Coord) {
        let health = match self.board.get(at) {
            Some(unit) => unit.health,
            None => return,
        };
        self.mod_health(at, -i16::from(health));
        for neighbour in at.surrounding() {
            if !self.board.is_empty(neighbour) {
                self.mod_health(neighbour, -i16::from(SELF_DESTRUCT_DAMAGE));
            }
        }
    }

    /// Change a unit's health and clear the cell if it died
    fn mod_health(&mut self, coord: Coord, delta: i16) {
        if let Some(unit) = self.board.get_mut(coord) {
            unit.mod_health(delta);
        }
        self.remove_dead(coord);
    }

    fn remove_dead(&mut self, coord: Coord) {
        let dead = matches!(self.board.get(coord), Some(unit) if !unit.is_alive());
        if !dead {
            return;
        }
        if let Some(unit) = self.board.take(coord) {
            if unit.unit_type == UnitType::AI {
                self.set_has_ai(unit.player, false);
            }
        }
    }

    // ========================================================================
    // MOVE GENERATION
    // ========================================================================

    /// Every legal move for the side to move: the 4 orthogonal moves and the
    /// self-destruct of each owned unit, filtered by `classify`
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for (src, _) in self.player_units(self.next_player) {
            for dst in src.adjacent() {
                let mv = Move::new(src, dst);
                if self.classify(mv).is_legal() {
                    moves.push(mv);
                }
            }
            let mv = Move::self_destruct(src);
            if self.classify(mv).is_legal() {
                moves.push(mv);
            }
        }
        moves
    }

    /// A uniformly chosen legal move
    pub fn random_move<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Move> {
        self.legal_moves().choose(rng).copied()
    }
}

/// Attacker heavy units advance up/left, Defender heavy units down/right
fn direction_allowed(player: Player, mv: Move) -> bool {
    match player {
        Player::Attacker => mv.dst.row <= mv.src.row && mv.dst.col <= mv.src.col,
        Player::Defender => mv.dst.row >= mv.src.row && mv.dst.col >= mv.src.col,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn c(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn mv(s: &str) -> Move {
        s.parse().unwrap()
    }

    fn empty_game() -> GameState {
        GameState::empty(Rules::default())
    }

    fn unit(player: Player, unit_type: UnitType) -> Unit {
        Unit::new(player, unit_type)
    }

    #[test]
    fn test_default_setup() {
        let game = GameState::new(Rules::default());
        assert_eq!(game.next_player(), Player::Attacker);
        assert_eq!(game.turns_played(), 0);
        assert_eq!(game.player_units(Player::Attacker).count(), 6);
        assert_eq!(game.player_units(Player::Defender).count(), 6);
        assert_eq!(game.ai_position(Player::Defender), Some(c("A0")));
        assert_eq!(game.ai_position(Player::Attacker), Some(c("E4")));
        assert_eq!(game.get(c("D3")).unwrap().unit_type, UnitType::Firewall);
        assert!(game.winner().is_none());
    }

    #[test]
    fn test_setup_dimension_bounds() {
        let small = GameState::new(Rules {
            dim: 3,
            ..Rules::default()
        });
        assert_eq!(small.ai_position(Player::Attacker), Some(c("C2")));

        let large = GameState::new(Rules {
            dim: MAX_DIM,
            ..Rules::default()
        });
        assert_eq!(large.ai_position(Player::Attacker), Some(Coord::new(15, 15)));
    }

    #[test]
    #[should_panic(expected = "board dimension")]
    fn test_oversized_setup_panics() {
        GameState::new(Rules {
            dim: 300,
            ..Rules::default()
        });
    }

    #[test]
    fn test_classify_as_other_side() {
        let game = GameState::new(Rules::default());
        // Attacker to move; the Defender Program is judged as if it were its turn
        assert_eq!(
            game.classify(mv("B1 C1")),
            Action::Rejected(Rejection::WrongTurn(Player::Attacker))
        );
        assert!(game.classify_as(Player::Defender, mv("B1 C1")).is_legal());
        assert_eq!(game.classify_as(Player::Attacker, mv("C4 B4")), game.classify(mv("C4 B4")));
    }

    #[test]
    fn test_move_parse_format() {
        let m = mv("A3 B2");
        assert_eq!(m, Move::new(Coord::new(0, 3), Coord::new(1, 2)));
        assert_eq!(m.to_string(), "A3 B2");
        assert_eq!(mv("a3,b2"), m);
        assert!("A3".parse::<Move>().is_err());
        assert!(mv("C2 C2").is_self_destruct());
    }

    #[test]
    fn test_rejection_order() {
        let game = GameState::new(Rules::default());
        assert_eq!(game.classify(mv("E4 F4")), Action::Rejected(Rejection::OffBoard));
        assert_eq!(game.classify(mv("C2 C1")), Action::Rejected(Rejection::EmptySource));
        assert_eq!(
            game.classify(mv("A0 A0")),
            Action::Rejected(Rejection::WrongTurn(Player::Attacker))
        );
        assert_eq!(game.classify(mv("E4 E4")), Action::SelfDestruct);
        assert_eq!(game.classify(mv("E2 C2")), Action::Rejected(Rejection::NotAdjacent));
    }

    #[test]
    fn test_directional_constraint() {
        let game = GameState::new(Rules::default());
        // Attacker Program on C4 may step up or left
        assert_eq!(game.classify(mv("C4 B4")), Action::OrdinaryMove);
        assert_eq!(game.classify(mv("C4 C3")), Action::OrdinaryMove);

        let mut game = empty_game();
        game.place(c("C2"), unit(Player::Attacker, UnitType::Firewall));
        assert_eq!(
            game.classify(mv("C2 D2")),
            Action::Rejected(Rejection::WrongDirection(Player::Attacker))
        );
        assert_eq!(
            game.classify(mv("C2 C3")),
            Action::Rejected(Rejection::WrongDirection(Player::Attacker))
        );

        let mut game = empty_game().with_next_player(Player::Defender);
        game.place(c("C2"), unit(Player::Defender, UnitType::Program));
        assert_eq!(game.classify(mv("C2 D2")), Action::OrdinaryMove);
        assert_eq!(
            game.classify(mv("C2 B2")),
            Action::Rejected(Rejection::WrongDirection(Player::Defender))
        );
    }

    #[test]
    fn test_tech_and_virus_move_freely() {
        let mut game = empty_game();
        game.place(c("C2"), unit(Player::Attacker, UnitType::Virus));
        game.place(c("C3"), unit(Player::Defender, UnitType::Firewall));
        for dst in ["B2", "D2", "C1"] {
            assert_eq!(game.classify(Move::new(c("C2"), c(dst))), Action::OrdinaryMove);
        }
        assert_eq!(game.classify(mv("C2 C3")), Action::Attack);
    }

    #[test]
    fn test_engaged_units_cannot_retreat_but_can_attack() {
        let mut game = empty_game();
        game.place(c("C2"), unit(Player::Attacker, UnitType::Program));
        game.place(c("B2"), unit(Player::Defender, UnitType::Tech));
        assert_eq!(game.classify(mv("C2 C1")), Action::Rejected(Rejection::EngagedInCombat));
        assert_eq!(game.classify(mv("C2 B2")), Action::Attack);
        assert!(game.is_engaged(c("C2")));
    }

    #[test]
    fn test_repair_rules() {
        let mut game = empty_game();
        game.place(c("C2"), unit(Player::Attacker, UnitType::AI));
        game.place(c("B2"), unit(Player::Attacker, UnitType::Virus).with_health(5));
        game.place(c("C1"), unit(Player::Attacker, UnitType::Virus));
        game.place(c("C3"), unit(Player::Attacker, UnitType::Program).with_health(2));
        assert_eq!(game.classify(mv("C2 B2")), Action::Repair);
        assert_eq!(game.classify(mv("C2 C1")), Action::Rejected(Rejection::CannotRepair));
        assert_eq!(game.classify(mv("C2 C3")), Action::Rejected(Rejection::CannotRepair));

        let mut game = empty_game();
        game.place(c("C2"), unit(Player::Attacker, UnitType::Tech));
        game.place(c("B2"), unit(Player::Attacker, UnitType::AI).with_health(7));
        game.place(c("C1"), unit(Player::Attacker, UnitType::Firewall));
        game.place(c("C3"), unit(Player::Attacker, UnitType::Virus).with_health(1));
        assert_eq!(game.classify(mv("C2 B2")), Action::Repair);
        assert_eq!(game.classify(mv("C2 C1")), Action::Rejected(Rejection::NothingToDo));
        assert_eq!(game.classify(mv("C2 C3")), Action::Rejected(Rejection::NothingToDo));
    }

    #[test]
    fn test_repair_caps_health() {
        let mut game = empty_game();
        game.place(c("C2"), unit(Player::Attacker, UnitType::Tech));
        game.place(c("B2"), unit(Player::Attacker, UnitType::AI).with_health(8));
        let action = game.perform_move(mv("C2 B2")).unwrap();
        assert_eq!(action, Action::Repair);
        assert_eq!(game.get(c("B2")).unwrap().health, 9);
        assert_eq!(game.get(c("C2")).unwrap().health, 9);
    }

    #[test]
    fn test_attack_virus_on_program() {
        let mut game = GameState::new(Rules::default());
        // Attacker Virus placed next to the Defender Program on B1
        let mut fresh = game.clone();
        fresh.place(c("B2"), unit(Player::Attacker, UnitType::Virus));
        assert_eq!(fresh.classify(mv("B2 B1")), Action::Attack);
        fresh.perform_move(mv("B2 B1")).unwrap();
        assert_eq!(fresh.get(c("B1")).unwrap().health, 3);
        assert_eq!(fresh.get(c("B2")).unwrap().health, 6);

        // Damage is clamped at the current health
        game.place(c("B2"), unit(Player::Attacker, UnitType::Virus).with_health(2));
        game.perform_move(mv("B2 B1")).unwrap();
        assert!(game.get(c("B2")).is_none());
        assert_eq!(game.get(c("B1")).unwrap().health, 3);
    }

    #[test]
    fn test_attack_kills_ai() {
        let mut game = empty_game();
        game.place(c("E4"), unit(Player::Attacker, UnitType::AI));
        game.place(c("B2"), unit(Player::Attacker, UnitType::Virus));
        game.place(c("B1"), unit(Player::Defender, UnitType::AI));
        assert!(game.winner().is_none());

        let next = game.apply_move(mv("B2 B1")).unwrap();
        assert!(!next.has_ai(Player::Defender));
        assert!(next.get(c("B1")).is_none());
        assert_eq!(next.get(c("B2")).unwrap().health, 6);
        assert_eq!(next.winner(), Some(Player::Attacker));
        // The original state is untouched
        assert!(game.has_ai(Player::Defender));
    }

    #[test]
    fn test_self_destruct() {
        let mut game = empty_game();
        game.place(c("C2"), unit(Player::Attacker, UnitType::Firewall));
        game.place(c("B1"), unit(Player::Defender, UnitType::Tech));
        game.place(c("B2"), unit(Player::Defender, UnitType::Program).with_health(1));
        game.place(c("D3"), unit(Player::Attacker, UnitType::Virus).with_health(5));
        game.place(c("C4"), unit(Player::Defender, UnitType::Firewall));

        let action = game.perform_move(mv("C2 C2")).unwrap();
        assert_eq!(action, Action::SelfDestruct);
        assert!(game.get(c("C2")).is_none());
        assert_eq!(game.get(c("B1")).unwrap().health, 7);
        assert!(game.get(c("B2")).is_none());
        assert_eq!(game.get(c("D3")).unwrap().health, 3);
        // Out of range
        assert_eq!(game.get(c("C4")).unwrap().health, 9);
    }

    #[test]
    fn test_self_destruct_on_edge() {
        let mut game = empty_game();
        game.place(c("A0"), unit(Player::Attacker, UnitType::Program));
        game.place(c("B1"), unit(Player::Defender, UnitType::AI));
        game.perform_move(mv("A0 A0")).unwrap();
        assert_eq!(game.get(c("B1")).unwrap().health, 7);
    }

    #[test]
    fn test_legal_moves_initial() {
        let game = GameState::new(Rules::default());
        let moves = game.legal_moves();
        // Every unit can self-destruct
        assert_eq!(moves.iter().filter(|m| m.is_self_destruct()).count(), 6);
        assert!(moves.contains(&mv("C4 B4")));
        assert!(moves.iter().all(|m| game.classify(*m).is_legal()));
        assert!(moves.iter().all(|m| game.get(m.src).unwrap().player == Player::Attacker));
    }

    #[test]
    fn test_apply_rejected() {
        let game = GameState::new(Rules::default());
        assert_eq!(game.apply_move(mv("A0 B0")), Err(Rejection::WrongTurn(Player::Attacker)));
        let next = game.apply_move(mv("C4 B4")).unwrap();
        assert_eq!(next.next_player(), Player::Defender);
        assert_eq!(next.turns_played(), 1);
    }

    #[test]
    fn test_max_turns_defender_wins() {
        let rules = Rules { dim: 5, max_turns: 4 };
        let game = GameState::new(rules).with_turns_played(4);
        assert!(game.has_ai(Player::Attacker) && game.has_ai(Player::Defender));
        assert_eq!(game.winner(), Some(Player::Defender));
    }

    #[test]
    fn test_random_move_is_legal() {
        let game = GameState::new(Rules::default());
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let m = game.random_move(&mut rng).unwrap();
        assert!(game.classify(m).is_legal());
        assert!(empty_game().random_move(&mut rng).is_none());
    }
}
