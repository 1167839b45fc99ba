//! Game board representation and collision detection
//!
//! The board is a pair of same-shaped grids (cells and colours) that include
//! the wall border: a two-row top margin, one wall column on each side and a
//! floor row. Grids are copy-on-write, so cloning a board is cheap and a
//! snapshot's board can never be changed behind its back.

use crate::tetromino::colors;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Playable width (interior columns)
pub const BOARD_WIDTH: usize = 10;
/// Playable height (interior rows)
pub const BOARD_HEIGHT: usize = 20;
/// Wall rows above the playable area
pub const TOP_MARGIN: usize = 2;

pub const GRID_WIDTH: usize = BOARD_WIDTH + 2;
pub const GRID_HEIGHT: usize = TOP_MARGIN + BOARD_HEIGHT + 1;

/// First and last interior row
pub const INTERIOR_TOP: usize = TOP_MARGIN;
pub const INTERIOR_BOTTOM: usize = TOP_MARGIN + BOARD_HEIGHT - 1;
/// First and last interior column
pub const INTERIOR_LEFT: usize = 1;
pub const INTERIOR_RIGHT: usize = BOARD_WIDTH;

/// Colour index stored in the colour grid
pub type ColorId = u8;

/// Special sentinel values with meaning beyond "occupied"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Special {
    AllClear,
    BoxClear,
    OneLineClear,
    Weight,
}

impl Special {
    /// Raw cell code
    pub fn code(&self) -> u8 {
        match self {
            Special::AllClear => 2,
            Special::BoxClear => 3,
            Special::OneLineClear => 4,
            Special::Weight => 5,
        }
    }

    /// Higher wins when a single placement stamps several sentinels
    pub fn priority(&self) -> u8 {
        match self {
            Special::AllClear => 3,
            Special::BoxClear => 2,
            Special::OneLineClear => 1,
            Special::Weight => 0,
        }
    }

    pub fn all() -> [Special; 4] {
        [
            Special::AllClear,
            Special::BoxClear,
            Special::OneLineClear,
            Special::Weight,
        ]
    }
}

/// A cell on the board
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    /// Wall or generic filled block (attack rows)
    Wall,
    Special(Special),
    /// Ordinary block carrying its piece id
    Block(u8),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }

    pub fn is_filled(&self) -> bool {
        !self.is_empty()
    }

    /// Raw code: 0 empty, 1 wall, 2..=5 sentinels, otherwise the piece id
    pub fn raw(&self) -> u8 {
        match self {
            Cell::Empty => 0,
            Cell::Wall => 1,
            Cell::Special(s) => s.code(),
            Cell::Block(id) => *id,
        }
    }

    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Cell::Empty,
            1 => Cell::Wall,
            2 => Cell::Special(Special::AllClear),
            3 => Cell::Special(Special::BoxClear),
            4 => Cell::Special(Special::OneLineClear),
            5 => Cell::Special(Special::Weight),
            id => Cell::Block(id),
        }
    }
}

/// A fixed-size copy-on-write grid
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grid<T> {
    width: usize,
    height: usize,
    data: Arc<Vec<T>>,
}

impl<T: Clone> Grid<T> {
    pub fn filled(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: Arc::new(vec![value; width * height]),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<&T> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.height || col >= self.width {
            return None;
        }
        Some(&self.data[row * self.width + col])
    }

    /// Returns false if out of bounds
    pub fn set(&mut self, row: usize, col: usize, value: T) -> bool {
        if row >= self.height || col >= self.width {
            return false;
        }
        Arc::make_mut(&mut self.data)[row * self.width + col] = value;
        true
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.data[row * self.width..(row + 1) * self.width]
    }

    /// Whether two grids still share storage
    pub fn shares_storage(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }
}

/// Immutable snapshot of the field: cells and colours including walls
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardState {
    cells: Grid<Cell>,
    colors: Grid<ColorId>,
}

impl Default for BoardState {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardState {
    /// Empty interior surrounded by walls
    pub fn new() -> Self {
        let mut cells = Grid::filled(GRID_WIDTH, GRID_HEIGHT, Cell::Empty);
        let mut colors = Grid::filled(GRID_WIDTH, GRID_HEIGHT, colors::NONE);
        for row in 0..GRID_HEIGHT {
            for col in 0..GRID_WIDTH {
                if Self::is_wall_position(row, col) {
                    cells.set(row, col, Cell::Wall);
                    colors.set(row, col, colors::WALL);
                }
            }
        }
        Self { cells, colors }
    }

    pub fn cells(&self) -> &Grid<Cell> {
        &self.cells
    }

    pub fn colors(&self) -> &Grid<ColorId> {
        &self.colors
    }

    /// Whether a grid position belongs to the fixed wall border
    pub fn is_wall_position(row: usize, col: usize) -> bool {
        row < TOP_MARGIN || row == GRID_HEIGHT - 1 || col == 0 || col == GRID_WIDTH - 1
    }

    pub fn is_interior(row: i32, col: i32) -> bool {
        row >= INTERIOR_TOP as i32
            && row <= INTERIOR_BOTTOM as i32
            && col >= INTERIOR_LEFT as i32
            && col <= INTERIOR_RIGHT as i32
    }

    /// Out-of-bounds positions read as wall
    pub fn cell(&self, row: i32, col: i32) -> Cell {
        self.cells.get(row, col).copied().unwrap_or(Cell::Wall)
    }

    pub fn color(&self, row: i32, col: i32) -> ColorId {
        self.colors.get(row, col).copied().unwrap_or(colors::WALL)
    }

    /// True if the position is out of bounds or holds anything
    pub fn is_occupied(&self, row: i32, col: i32) -> bool {
        self.cell(row, col).is_filled()
    }

    /// Write an interior cell. Returns false (and writes nothing) for walls
    /// and out-of-bounds positions.
    pub fn set(&mut self, row: i32, col: i32, cell: Cell, color: ColorId) -> bool {
        if !Self::is_interior(row, col) {
            return false;
        }
        let (row, col) = (row as usize, col as usize);
        self.cells.set(row, col, cell);
        self.colors.set(row, col, color);
        true
    }

    pub fn clear_cell(&mut self, row: i32, col: i32) -> bool {
        self.set(row, col, Cell::Empty, colors::NONE)
    }

    /// Check if an interior row is completely filled
    pub fn is_row_full(&self, row: usize) -> bool {
        (INTERIOR_LEFT..=INTERIOR_RIGHT).all(|col| self.cells.row(row)[col].is_filled())
    }

    pub fn row_contains(&self, row: usize, cell: Cell) -> bool {
        (INTERIOR_LEFT..=INTERIOR_RIGHT).any(|col| self.cells.row(row)[col] == cell)
    }

    /// Positions of every interior cell equal to `cell`, scanned top-left first
    pub fn positions_of(&self, cell: Cell) -> Vec<(usize, usize)> {
        let mut found = Vec::new();
        for row in INTERIOR_TOP..=INTERIOR_BOTTOM {
            for col in INTERIOR_LEFT..=INTERIOR_RIGHT {
                if self.cells.row(row)[col] == cell {
                    found.push((row, col));
                }
            }
        }
        found
    }

    /// Check if the interior is completely empty
    pub fn is_interior_empty(&self) -> bool {
        (INTERIOR_TOP..=INTERIOR_BOTTOM).all(|row| {
            (INTERIOR_LEFT..=INTERIOR_RIGHT).all(|col| self.cells.row(row)[col].is_empty())
        })
    }

    fn copy_interior_row(&mut self, from: usize, to: usize) {
        for col in INTERIOR_LEFT..=INTERIOR_RIGHT {
            let cell = self.cells.row(from)[col];
            let color = self.colors.row(from)[col];
            self.cells.set(to, col, cell);
            self.colors.set(to, col, color);
        }
    }

    fn clear_interior_row(&mut self, row: usize) {
        for col in INTERIOR_LEFT..=INTERIOR_RIGHT {
            self.cells.set(row, col, Cell::Empty);
            self.colors.set(row, col, colors::NONE);
        }
    }

    /// Remove an interior row: everything above shifts down one row and the
    /// top interior row is zero-filled. Rows outside the interior are ignored.
    pub fn remove_row(&mut self, row: usize) {
        if !(INTERIOR_TOP..=INTERIOR_BOTTOM).contains(&row) {
            return;
        }
        for r in (INTERIOR_TOP + 1..=row).rev() {
            self.copy_interior_row(r - 1, r);
        }
        self.clear_interior_row(INTERIOR_TOP);
    }

    /// Zero every interior cell, keeping the walls
    pub fn clear_interior(&mut self) {
        for row in INTERIOR_TOP..=INTERIOR_BOTTOM {
            self.clear_interior_row(row);
        }
    }

    /// Clear the square of the given radius around a center, clamped to the interior
    pub fn clear_region(&mut self, center_row: usize, center_col: usize, radius: usize) {
        let top = center_row.saturating_sub(radius).max(INTERIOR_TOP);
        let bottom = (center_row + radius).min(INTERIOR_BOTTOM);
        let left = center_col.saturating_sub(radius).max(INTERIOR_LEFT);
        let right = (center_col + radius).min(INTERIOR_RIGHT);
        for row in top..=bottom {
            for col in left..=right {
                self.cells.set(row, col, Cell::Empty);
                self.colors.set(row, col, colors::NONE);
            }
        }
    }

    /// Compact every interior column downward, preserving the order of
    /// filled cells and zero-filling the vacated top
    pub fn apply_gravity(&mut self) {
        for col in INTERIOR_LEFT..=INTERIOR_RIGHT {
            let mut write = INTERIOR_BOTTOM;
            for read in (INTERIOR_TOP..=INTERIOR_BOTTOM).rev() {
                let cell = self.cells.row(read)[col];
                if cell.is_empty() {
                    continue;
                }
                if write != read {
                    let color = self.colors.row(read)[col];
                    self.cells.set(write, col, cell);
                    self.colors.set(write, col, color);
                    self.cells.set(read, col, Cell::Empty);
                    self.colors.set(read, col, colors::NONE);
                }
                write = write.saturating_sub(1);
            }
        }
    }

    /// Push `rows` (top to bottom, indexed by interior column) in at the
    /// bottom of the interior. Existing rows shift up; whatever is pushed
    /// past the top interior row is lost.
    pub fn insert_bottom_rows(&mut self, rows: &[[Cell; BOARD_WIDTH]], color: ColorId) {
        let n = rows.len().min(BOARD_HEIGHT);
        if n == 0 {
            return;
        }
        for to in INTERIOR_TOP..=INTERIOR_BOTTOM - n {
            self.copy_interior_row(to + n, to);
        }
        for (i, row) in rows[rows.len() - n..].iter().enumerate() {
            let target = INTERIOR_BOTTOM + 1 - n + i;
            for (offset, &cell) in row.iter().enumerate() {
                let col = INTERIOR_LEFT + offset;
                let color = if cell.is_empty() { colors::NONE } else { color };
                self.cells.set(target, col, cell);
                self.colors.set(target, col, color);
            }
        }
    }

    /// Both grids share dimensions and every wall position is filled
    pub fn walls_intact(&self) -> bool {
        if self.cells.width() != self.colors.width() || self.cells.height() != self.colors.height()
        {
            return false;
        }
        (0..GRID_HEIGHT).all(|row| {
            (0..GRID_WIDTH).all(|col| {
                !Self::is_wall_position(row, col) || self.cells.row(row)[col].is_filled()
            })
        })
    }
}
