//! Unit type definitions and combat tables

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum (and starting) unit health
pub const MAX_HEALTH: u8 = 9;

/// Damage dealt to every surrounding unit by a self-destruct
pub const SELF_DESTRUCT_DAMAGE: u8 = 2;

/// The two sides
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Attacker = 0,
    Defender = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::Attacker => Player::Defender,
            Player::Defender => Player::Attacker,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Player::Attacker => "Attacker",
            Player::Defender => "Defender",
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unit type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitType {
    AI = 0,
    Tech = 1,
    Virus = 2,
    Program = 3,
    Firewall = 4,
}

impl UnitType {
    pub const ALL: [UnitType; 5] = [
        UnitType::AI,
        UnitType::Tech,
        UnitType::Virus,
        UnitType::Program,
        UnitType::Firewall,
    ];

    /// AI, Firewall and Program: pinned while engaged, directional movement
    pub fn is_heavy(self) -> bool {
        matches!(self, UnitType::AI | UnitType::Firewall | UnitType::Program)
    }

    fn initial(self) -> char {
        match self {
            UnitType::AI => 'A',
            UnitType::Tech => 'T',
            UnitType::Virus => 'V',
            UnitType::Program => 'P',
            UnitType::Firewall => 'F',
        }
    }
}

/// Damage dealt by the row type to the column type
/// (order: AI, Tech, Virus, Program, Firewall)
pub static DAMAGE_TABLE: [[u8; 5]; 5] = [
    [3, 3, 3, 3, 1], // AI
    [1, 1, 6, 1, 1], // Tech
    [9, 6, 1, 6, 1], // Virus
    [3, 3, 3, 3, 1], // Program
    [1, 1, 1, 1, 1], // Firewall
];

/// Health restored by the row type to the column type
pub static REPAIR_TABLE: [[u8; 5]; 5] = [
    [0, 1, 1, 0, 0], // AI
    [3, 0, 0, 3, 3], // Tech
    [0, 0, 0, 0, 0], // Virus
    [0, 0, 0, 0, 0], // Program
    [0, 0, 0, 0, 0], // Firewall
];

pub fn damage(attacker: UnitType, target: UnitType) -> u8 {
    DAMAGE_TABLE[attacker as usize][target as usize]
}

pub fn repair(repairer: UnitType, target: UnitType) -> u8 {
    REPAIR_TABLE[repairer as usize][target as usize]
}

/// A unit on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    pub player: Player,
    pub unit_type: UnitType,
    pub health: u8,
}

impl Unit {
    pub fn new(player: Player, unit_type: UnitType) -> Self {
        Self {
            player,
            unit_type,
            health: MAX_HEALTH,
        }
    }

    pub fn with_health(mut self, health: u8) -> Self {
        self.health = health.min(MAX_HEALTH);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    /// Apply a health delta, clamped to [0, MAX_HEALTH]
    pub fn mod_health(&mut self, delta: i16) {
        let health = (i16::from(self.health) + delta).clamp(0, i16::from(MAX_HEALTH));
        self.health = health as u8;
    }

    /// Damage this unit would actually inflict on `target`
    pub fn damage_amount(&self, target: &Unit) -> u8 {
        damage(self.unit_type, target.unit_type).min(target.health)
    }

    /// Health this unit would actually restore on `target`
    pub fn repair_amount(&self, target: &Unit) -> u8 {
        repair(self.unit_type, target.unit_type).min(MAX_HEALTH - target.health)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.player {
            Player::Attacker => 'a',
            Player::Defender => 'd',
        };
        write!(f, "{}{}{}", side, self.unit_type.initial(), self.health)
    }
}
