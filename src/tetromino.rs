//! Tetromino definitions and shapes
//!
//! Shapes are stored as small row-major matrices (row 0 is the top row) so a
//! piece's footprint can be stamped into the board, rotated as a whole and
//! shipped to an opponent as an attack pattern.

use crate::board::{Cell, ColorId, Special};
use serde::{Deserialize, Serialize};

/// Colour ids used in the board's colour grid
pub mod colors {
    use super::ColorId;

    pub const NONE: ColorId = 0;
    pub const WALL: ColorId = 1;
    pub const CYAN: ColorId = 2;
    pub const YELLOW: ColorId = 3;
    pub const MAGENTA: ColorId = 4;
    pub const GREEN: ColorId = 5;
    pub const RED: ColorId = 6;
    pub const BLUE: ColorId = 7;
    pub const ORANGE: ColorId = 8;
    pub const GARBAGE: ColorId = 9;
    pub const WEIGHT: ColorId = 10;
}

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TetrominoType {
    I, // Cyan - long bar
    O, // Yellow - square
    T, // Purple - T-shape
    S, // Green - S-shape
    Z, // Red - Z-shape
    J, // Blue - J-shape
    L, // Orange - L-shape
}

impl TetrominoType {
    /// Get the colour id for this tetromino
    pub fn color(&self) -> ColorId {
        match self {
            TetrominoType::I => colors::CYAN,
            TetrominoType::O => colors::YELLOW,
            TetrominoType::T => colors::MAGENTA,
            TetrominoType::S => colors::GREEN,
            TetrominoType::Z => colors::RED,
            TetrominoType::J => colors::BLUE,
            TetrominoType::L => colors::ORANGE,
        }
    }

    /// Piece id stamped into the board for ordinary blocks of this type.
    /// Ids start after the sentinel range.
    pub fn block_id(&self) -> u8 {
        match self {
            TetrominoType::I => 6,
            TetrominoType::O => 7,
            TetrominoType::T => 8,
            TetrominoType::S => 9,
            TetrominoType::Z => 10,
            TetrominoType::J => 11,
            TetrominoType::L => 12,
        }
    }

    /// Get all tetromino types for bag randomization
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    /// Spawn orientation as a 0/1 matrix
    fn layout(&self) -> &'static [&'static [u8]] {
        match self {
            TetrominoType::I => &[&[1, 1, 1, 1]],
            TetrominoType::O => &[&[1, 1], &[1, 1]],
            TetrominoType::T => &[&[0, 1, 0], &[1, 1, 1]],
            // .SS
            // SS.
            TetrominoType::S => &[&[0, 1, 1], &[1, 1, 0]],
            // ZZ.
            // .ZZ
            TetrominoType::Z => &[&[1, 1, 0], &[0, 1, 1]],
            TetrominoType::J => &[&[1, 0, 0], &[1, 1, 1]],
            TetrominoType::L => &[&[0, 0, 1], &[1, 1, 1]],
        }
    }

    /// Shape matrix in spawn orientation, every filled cell carrying this type's block id
    pub fn shape(&self) -> Shape {
        Shape::from_layout(self.layout(), Cell::Block(self.block_id()))
    }
}

/// Weight piece layout: `.XX.` over `XXXX`
const WEIGHT_LAYOUT: &[&[u8]] = &[&[0, 1, 1, 0], &[1, 1, 1, 1]];

/// What kind of piece is falling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    /// A tetromino, possibly carrying one item sentinel cell
    Tetromino(TetrominoType),
    /// The drilling weight item
    Weight,
}

impl PieceKind {
    pub fn color(&self) -> ColorId {
        match self {
            PieceKind::Tetromino(t) => t.color(),
            PieceKind::Weight => colors::WEIGHT,
        }
    }

    pub fn is_weight(&self) -> bool {
        matches!(self, PieceKind::Weight)
    }
}

/// A rectangular shape matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl Shape {
    fn from_layout(layout: &[&[u8]], fill: Cell) -> Self {
        let height = layout.len();
        let width = layout.first().map_or(0, |row| row.len());
        let cells = layout
            .iter()
            .flat_map(|row| row.iter())
            .map(|&v| if v == 0 { Cell::Empty } else { fill })
            .collect();
        Self {
            width,
            height,
            cells,
        }
    }

    /// The weight item shape
    pub fn weight() -> Self {
        Self::from_layout(WEIGHT_LAYOUT, Cell::Special(Special::Weight))
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn get(&self, row: usize, col: usize) -> Cell {
        if row >= self.height || col >= self.width {
            return Cell::Empty;
        }
        self.cells[row * self.width + col]
    }

    /// Iterate over filled cells as `(row, col, cell)`
    pub fn filled(&self) -> impl Iterator<Item = (usize, usize, Cell)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, cell)| !cell.is_empty())
            .map(|(i, &cell)| (i / self.width, i % self.width, cell))
    }

    /// Number of filled cells
    pub fn block_count(&self) -> usize {
        self.cells.iter().filter(|cell| !cell.is_empty()).count()
    }

    /// Replace the `index`-th filled cell (in row-major order) with `cell`
    pub fn with_marked_cell(&self, index: usize, cell: Cell) -> Self {
        let mut shape = self.clone();
        if let Some(slot) = shape
            .cells
            .iter_mut()
            .filter(|c| !c.is_empty())
            .nth(index)
        {
            *slot = cell;
        }
        shape
    }

    /// Shape rotated 90 degrees clockwise
    pub fn rotated_cw(&self) -> Self {
        let width = self.height;
        let height = self.width;
        let mut cells = vec![Cell::Empty; width * height];
        for r in 0..self.height {
            for c in 0..self.width {
                // (r, c) -> (c, height_old - 1 - r)
                let nr = c;
                let nc = self.height - 1 - r;
                cells[nr * width + nc] = self.cells[r * self.width + c];
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    /// Whether a filled cell carries the given sentinel
    pub fn contains(&self, special: Special) -> bool {
        self.cells.iter().any(|c| *c == Cell::Special(special))
    }
}
