//! Pure board/piece transition functions
//!
//! Nothing in here owns state or time. Movement functions mutate only the
//! piece they are handed (and report whether it moved); everything that
//! changes the board returns a new [`BoardState`].

use crate::board::{BoardState, Cell, GRID_HEIGHT, INTERIOR_BOTTOM, INTERIOR_TOP, Special};
use crate::piece::Piece;
use crate::tetromino::Shape;

/// Horizontal offsets tried in order when a rotation collides.
///
/// A simple kick search, not SRS: the first offset that fits wins.
pub const ROTATION_KICKS: [i32; 5] = [0, -1, 1, -2, 2];

/// Rows checked for game over
const GAME_OVER_TOP: i32 = 2;
const GAME_OVER_BOTTOM: i32 = 3;
/// Columns checked for game over (the span above spawn)
const GAME_OVER_LEFT: i32 = 3;
const GAME_OVER_RIGHT: i32 = 7;

/// Whether `shape` placed with its top-left at (`y`, `x`) hits anything
pub fn collides(board: &BoardState, shape: &Shape, x: i32, y: i32) -> bool {
    shape
        .filled()
        .any(|(r, c, _)| board.is_occupied(y + r as i32, x + c as i32))
}

fn try_shift(piece: &mut Piece, board: &BoardState, dx: i32, dy: i32) -> bool {
    if collides(board, &piece.shape, piece.x + dx, piece.y + dy) {
        return false;
    }
    piece.x += dx;
    piece.y += dy;
    true
}

/// Try to move left, returns true if successful
pub fn try_move_left(piece: &mut Piece, board: &BoardState) -> bool {
    try_shift(piece, board, -1, 0)
}

/// Try to move right, returns true if successful
pub fn try_move_right(piece: &mut Piece, board: &BoardState) -> bool {
    try_shift(piece, board, 1, 0)
}

/// Try to move down, returns true if successful
pub fn try_move_down(piece: &mut Piece, board: &BoardState) -> bool {
    try_shift(piece, board, 0, 1)
}

/// Rotate clockwise, trying [`ROTATION_KICKS`] in order.
/// Returns false (piece untouched) if no offset fits.
pub fn rotate(piece: &mut Piece, board: &BoardState) -> bool {
    if !piece.can_rotate() {
        return false;
    }
    let rotated = piece.shape.rotated_cw();
    for dx in ROTATION_KICKS {
        if !collides(board, &rotated, piece.x + dx, piece.y) {
            piece.shape = rotated;
            piece.x += dx;
            return true;
        }
    }
    false
}

/// Rows the piece could fall without colliding. Weight pieces never hard-drop.
pub fn hard_drop_distance(piece: &Piece, board: &BoardState) -> u32 {
    if piece.is_weight() {
        return 0;
    }
    let mut distance = 0;
    while !collides(board, &piece.shape, piece.x, piece.y + distance as i32 + 1) {
        distance += 1;
    }
    distance
}

/// Stamp the piece into the board.
///
/// Returns the new board and the highest-priority clearing sentinel among
/// the stamped cells (the weight sentinel is never reported).
pub fn place(piece: &Piece, board: &BoardState) -> (BoardState, Option<Special>) {
    let mut next = board.clone();
    let color = piece.color();
    let mut special: Option<Special> = None;
    for (row, col, cell) in piece.blocks() {
        next.set(row, col, cell, color);
        if let Cell::Special(s) = cell {
            if s != Special::Weight && special.is_none_or(|cur| s.priority() > cur.priority()) {
                special = Some(s);
            }
        }
    }
    (next, special)
}

/// Full interior rows, scanned and returned bottom to top
pub fn find_full_lines(board: &BoardState) -> Vec<usize> {
    (INTERIOR_TOP..=INTERIOR_BOTTOM)
        .rev()
        .filter(|&row| board.is_row_full(row))
        .collect()
}

/// Remove every full row, compacting the rows above. Returns the new board
/// and the number of rows removed.
pub fn clear_and_compact(board: &BoardState) -> (BoardState, u32) {
    let mut next = board.clone();
    let mut cleared = 0;
    while let Some(&row) = find_full_lines(&next).first() {
        next.remove_row(row);
        cleared += 1;
    }
    (next, cleared)
}

/// Whether anything occupies the spawn window at the top of the interior
pub fn is_game_over(board: &BoardState) -> bool {
    (GAME_OVER_TOP..=GAME_OVER_BOTTOM)
        .any(|row| (GAME_OVER_LEFT..=GAME_OVER_RIGHT).any(|col| board.is_occupied(row, col)))
}

/// Whether every block of `piece` moved one row down would still be above the floor
pub fn can_drill_down(piece: &Piece) -> bool {
    piece
        .blocks()
        .all(|(row, _, _)| row + 1 < GRID_HEIGHT as i32 - 1)
}

/// Drill one row: the piece moves down and every interior cell its footprint
/// enters is erased. Walls are never touched.
pub fn drill_step(piece: &mut Piece, board: &BoardState) -> BoardState {
    let mut next = board.clone();
    piece.y += 1;
    for (row, col, _) in piece.blocks() {
        next.clear_cell(row, col);
    }
    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::fill_row;
    use crate::board::{INTERIOR_LEFT, INTERIOR_RIGHT};
    use crate::score::line_clear_score;
    use crate::tetromino::{TetrominoType, colors};

    #[test]
    fn test_move_left_at_wall_is_rejected() {
        let board = BoardState::new();
        let mut piece = Piece::new(TetrominoType::T);
        while try_move_left(&mut piece, &board) {}
        assert_eq!(piece.x, INTERIOR_LEFT as i32);
        let before = piece.clone();
        assert!(!try_move_left(&mut piece, &board));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_move_left_at_wall_on_filled_board() {
        let mut board = BoardState::new();
        fill_row(&mut board, INTERIOR_BOTTOM, &[]);
        fill_row(&mut board, INTERIOR_BOTTOM - 1, &[5]);
        let mut piece = Piece::new(TetrominoType::I);
        piece.x = INTERIOR_LEFT as i32;
        let before = piece.clone();
        assert!(!try_move_left(&mut piece, &board));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_move_down_until_floor() {
        let board = BoardState::new();
        let mut piece = Piece::new(TetrominoType::O);
        let mut steps = 0;
        while try_move_down(&mut piece, &board) {
            steps += 1;
        }
        // O is two rows tall: rows 2..=3 down to 20..=21
        assert_eq!(steps, 18);
        assert_eq!(piece.y, INTERIOR_BOTTOM as i32 - 1);
    }

    #[test]
    fn test_rotate_kicks_off_right_wall() {
        let board = BoardState::new();
        // Vertical I against the right wall
        let mut piece = Piece::new(TetrominoType::I);
        assert!(rotate(&mut piece, &board));
        assert_eq!(piece.shape.width(), 1);
        piece.x = INTERIOR_RIGHT as i32 - 1;
        piece.y = 10;
        // Back to horizontal: offsets 0, -1 and +1 overlap the wall, -2 fits
        assert!(rotate(&mut piece, &board));
        assert_eq!(piece.shape.width(), 4);
        assert_eq!(piece.x, INTERIOR_RIGHT as i32 - 3);
    }

    #[test]
    fn test_rotate_without_room_is_noop() {
        let mut board = BoardState::new();
        for row in 5..=9 {
            fill_row(&mut board, row, &[5]);
        }
        // Vertical I inside a one-wide shaft
        let mut piece = Piece::new(TetrominoType::I);
        piece.shape = piece.shape.rotated_cw();
        piece.x = 5;
        piece.y = 5;
        assert!(!collides(&board, &piece.shape, piece.x, piece.y));
        let before = piece.clone();
        assert!(!rotate(&mut piece, &board));
        assert_eq!(piece, before);
    }

    #[test]
    fn test_weight_does_not_rotate_or_hard_drop() {
        let board = BoardState::new();
        let mut piece = Piece::weight();
        assert!(!rotate(&mut piece, &board));
        assert_eq!(hard_drop_distance(&piece, &board), 0);
    }

    #[test]
    fn test_hard_drop_distance() {
        let board = BoardState::new();
        let piece = Piece::new(TetrominoType::I);
        // One row tall, from row 2 to row 21
        assert_eq!(hard_drop_distance(&piece, &board), 19);
    }

    #[test]
    fn test_place_reports_sentinel() {
        let board = BoardState::new();
        let mut piece = Piece::with_item(TetrominoType::T, Special::BoxClear, 0);
        piece.y = 10;
        let (placed, special) = place(&piece, &board);
        assert_eq!(special, Some(Special::BoxClear));
        assert_eq!(placed.positions_of(Cell::Special(Special::BoxClear)), vec![(10, 5)]);
        assert_eq!(placed.color(10, 5), colors::MAGENTA);
        // Original board untouched
        assert!(board.is_interior_empty());

        let (_, none) = place(&Piece::new(TetrominoType::T), &board);
        assert_eq!(none, None);
    }

    #[test]
    fn test_place_never_reports_weight() {
        let board = BoardState::new();
        let (placed, special) = place(&Piece::weight(), &board);
        assert_eq!(special, None);
        assert_eq!(placed.positions_of(Cell::Special(Special::Weight)).len(), 6);
    }

    #[test]
    fn test_tetris_clear() {
        let mut board = BoardState::new();
        fill_row(&mut board, 21, &[]);
        fill_row(&mut board, 20, &[]);
        fill_row(&mut board, 18, &[]);
        fill_row(&mut board, 19, &[7, 8, 9, 10]);
        let mut piece = Piece::new(TetrominoType::I);
        piece.x = 7;
        piece.y = 19;
        let (placed, special) = place(&piece, &board);
        assert_eq!(special, None);

        assert_eq!(find_full_lines(&placed), vec![21, 20, 19, 18]);
        let (cleared, count) = clear_and_compact(&placed);
        assert_eq!(count, 4);
        assert!(cleared.is_interior_empty());
        assert!(cleared.walls_intact());
        assert_eq!(line_clear_score(count, 1, 1.0), 800);
    }

    #[test]
    fn test_clear_removes_exactly_reported_rows() {
        let mut board = BoardState::new();
        fill_row(&mut board, 5, &[]);
        // Row 4 has a hole; after compaction it becomes row 5 and is still not full
        fill_row(&mut board, 4, &[3]);
        assert_eq!(find_full_lines(&board), vec![5]);

        let (cleared, count) = clear_and_compact(&board);
        assert_eq!(count, 1);
        assert!(find_full_lines(&cleared).is_empty());
        assert_eq!(cleared.cell(5, 3), Cell::Empty);
        assert_eq!(cleared.cell(5, 4), Cell::Block(6));
        assert!(cleared.row_contains(4, Cell::Empty));
        assert!((INTERIOR_LEFT..=INTERIOR_RIGHT).all(|c| cleared.cell(4, c as i32).is_empty()));
    }

    #[test]
    fn test_game_over_window() {
        let board = BoardState::new();
        assert!(!is_game_over(&board));

        let mut piece = Piece::new(TetrominoType::O);
        piece.y = 2;
        let (placed, _) = place(&piece, &board);
        assert!(is_game_over(&placed));

        let mut edge = BoardState::new();
        edge.set(3, 8, Cell::Block(6), colors::CYAN);
        edge.set(4, 5, Cell::Block(6), colors::CYAN);
        assert!(!is_game_over(&edge));
        edge.set(3, 7, Cell::Block(6), colors::CYAN);
        assert!(is_game_over(&edge));
    }

    #[test]
    fn test_drill_erases_footprint() {
        let mut board = BoardState::new();
        fill_row(&mut board, 10, &[]);
        let mut piece = Piece::weight();
        piece.y = 8;
        // Bottom row of the weight spans columns 4..=7 at row 9; one step enters row 10
        let drilled = drill_step(&mut piece, &board);
        assert_eq!(piece.y, 9);
        for col in 4..=7 {
            assert_eq!(drilled.cell(10, col), Cell::Empty);
        }
        assert_eq!(drilled.cell(10, 3), Cell::Block(6));
        assert_eq!(drilled.cell(10, 8), Cell::Block(6));
        assert!(drilled.walls_intact());
    }

    #[test]
    fn test_can_drill_down_stops_above_floor() {
        let mut piece = Piece::weight();
        piece.y = INTERIOR_BOTTOM as i32 - 2;
        assert!(can_drill_down(&piece));
        piece.y = INTERIOR_BOTTOM as i32 - 1;
        assert!(!can_drill_down(&piece));
    }
}
