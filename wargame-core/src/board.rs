//! Square board geometry with (row, col) coordinates

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::units::Unit;

/// Default board dimension
pub const DEFAULT_DIM: usize = 5;

/// Largest dimension whose coordinates can still be written as two characters
pub const MAX_DIM: usize = 16;

const ROW_CHARS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const COL_CHARS: &str = "0123456789abcdef";
const SEPARATORS: &[char] = &[' ', ',', '.', ':', ';', '-', '_'];

/// Orthogonal direction vectors (drow, dcol): up, left, down, right
pub const ORTHOGONAL: [(i8, i8); 4] = [(-1, 0), (0, -1), (1, 0), (0, 1)];

/// Diagonal direction vectors, completing the 8-neighbourhood
pub const DIAGONAL: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Board cell coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub row: i8,
    pub col: i8,
}

impl Coord {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    /// Check if this coordinate lies on a `dim`x`dim` board
    pub fn is_valid(&self, dim: usize) -> bool {
        self.row >= 0 && self.col >= 0 && (self.row as usize) < dim && (self.col as usize) < dim
    }

    pub fn offset(&self, (dr, dc): (i8, i8)) -> Coord {
        Coord::new(self.row + dr, self.col + dc)
    }

    /// The 4 orthogonal neighbours (may be off board)
    pub fn adjacent(&self) -> impl Iterator<Item = Coord> + '_ {
        ORTHOGONAL.iter().map(move |&d| self.offset(d))
    }

    /// All 8 surrounding cells, orthogonal first (may be off board)
    pub fn surrounding(&self) -> impl Iterator<Item = Coord> + '_ {
        ORTHOGONAL
            .iter()
            .chain(DIAGONAL.iter())
            .map(move |&d| self.offset(d))
    }

    pub fn is_adjacent(&self, other: Coord) -> bool {
        (self.row - other.row).abs() + (self.col - other.col).abs() == 1
    }

    pub fn euclidean_distance(&self, other: Coord) -> f64 {
        let dr = f64::from(other.row - self.row);
        let dc = f64::from(other.col - self.col);
        (dr * dr + dc * dc).sqrt()
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let row = usize::try_from(self.row)
            .ok()
            .and_then(|r| ROW_CHARS.chars().nth(r))
            .unwrap_or('?');
        let col = usize::try_from(self.col)
            .ok()
            .and_then(|c| COL_CHARS.chars().nth(c))
            .unwrap_or('?');
        write!(f, "{row}{col}")
    }
}

impl FromStr for Coord {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars = significant_chars(s);
        match chars.as_slice() {
            [r, c] => parse_pair(*r, *c).ok_or_else(|| CoreError::InvalidCoord(s.to_string())),
            _ => Err(CoreError::InvalidCoord(s.to_string())),
        }
    }
}

/// Strip separators, keeping the characters that carry a coordinate
pub(crate) fn significant_chars(s: &str) -> Vec<char> {
    s.trim().chars().filter(|c| !SEPARATORS.contains(c)).collect()
}

pub(crate) fn parse_pair(row: char, col: char) -> Option<Coord> {
    let row = ROW_CHARS.find(row.to_ascii_uppercase())?;
    let col = COL_CHARS.find(col.to_ascii_lowercase())?;
    Some(Coord::new(row as i8, col as i8))
}

// ============================================================================
// BOARD
// ============================================================================

/// Dense `dim`x`dim` grid of optional units
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    dim: usize,
    cells: Vec<Option<Unit>>,
}

impl Board {
    pub fn new(dim: usize) -> Self {
        Self {
            dim,
            cells: vec![None; dim * dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    fn index(&self, coord: Coord) -> Option<usize> {
        if coord.is_valid(self.dim) {
            Some(coord.row as usize * self.dim + coord.col as usize)
        } else {
            None
        }
    }

    /// Unit at `coord`; `None` for empty or off-board cells
    pub fn get(&self, coord: Coord) -> Option<&Unit> {
        self.index(coord).and_then(|i| self.cells[i].as_ref())
    }

    pub fn get_mut(&mut self, coord: Coord) -> Option<&mut Unit> {
        let i = self.index(coord)?;
        self.cells[i].as_mut()
    }

    /// Place or clear a cell. Off-board writes are ignored.
    pub fn set(&mut self, coord: Coord, unit: Option<Unit>) {
        if let Some(i) = self.index(coord) {
            self.cells[i] = unit;
        }
    }

    pub fn take(&mut self, coord: Coord) -> Option<Unit> {
        let i = self.index(coord)?;
        self.cells[i].take()
    }

    pub fn is_empty(&self, coord: Coord) -> bool {
        self.get(coord).is_none()
    }

    /// Occupied cells in row-major order
    pub fn units(&self) -> impl Iterator<Item = (Coord, Unit)> + '_ {
        let dim = self.dim;
        self.cells.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|unit| (Coord::new((i / dim) as i8, (i % dim) as i8), unit))
        })
    }
}
