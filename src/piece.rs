//! Active falling piece

use crate::board::{Cell, ColorId, GRID_WIDTH, INTERIOR_TOP, Special};
use crate::tetromino::{PieceKind, Shape, TetrominoType};
use serde::{Deserialize, Serialize};

/// An active falling piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    /// What this piece is
    pub kind: PieceKind,
    /// Current shape matrix (already rotated)
    pub shape: Shape,
    /// Board column of the matrix's left edge
    pub x: i32,
    /// Board row of the matrix's top edge (row increases downward)
    pub y: i32,
}

impl Piece {
    /// Create a plain tetromino at spawn position
    pub fn new(piece_type: TetrominoType) -> Self {
        Self::spawned(PieceKind::Tetromino(piece_type), piece_type.shape())
    }

    /// Tetromino whose `cell_index`-th block carries an item sentinel
    pub fn with_item(piece_type: TetrominoType, item: Special, cell_index: usize) -> Self {
        let shape = piece_type
            .shape()
            .with_marked_cell(cell_index, Cell::Special(item));
        Self::spawned(PieceKind::Tetromino(piece_type), shape)
    }

    /// The weight (drill) item piece
    pub fn weight() -> Self {
        Self::spawned(PieceKind::Weight, Shape::weight())
    }

    /// Spawn at top center of the interior
    fn spawned(kind: PieceKind, shape: Shape) -> Self {
        let x = ((GRID_WIDTH - shape.width()) / 2) as i32;
        Self {
            kind,
            shape,
            x,
            y: INTERIOR_TOP as i32,
        }
    }

    pub fn color(&self) -> ColorId {
        self.kind.color()
    }

    /// Absolute `(row, col, cell)` of every block
    pub fn blocks(&self) -> impl Iterator<Item = (i32, i32, Cell)> + '_ {
        self.shape
            .filled()
            .map(|(r, c, cell)| (self.y + r as i32, self.x + c as i32, cell))
    }

    /// The sentinel this piece carries, if it is an item piece
    pub fn item(&self) -> Option<Special> {
        if self.kind.is_weight() {
            return Some(Special::Weight);
        }
        Special::all()
            .into_iter()
            .find(|&special| self.shape.contains(special))
    }

    pub fn is_weight(&self) -> bool {
        self.kind.is_weight()
    }

    /// Weight pieces keep their orientation
    pub fn can_rotate(&self) -> bool {
        !self.kind.is_weight()
    }
}
