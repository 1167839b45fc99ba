//! Versus-mode attack lines
//!
//! Multi-line clears send attack lines to the opponent. The receiving board
//! queues them (capped) and pushes them in from the bottom at its next landing.
//! An attack may carry the attacker's clearing piece so the inserted rows can
//! be carved to mirror its footprint.

use crate::board::{BOARD_WIDTH, BoardState, Cell, INTERIOR_LEFT};
use crate::tetromino::{Shape, colors};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Most attack lines a board can have queued
pub const MAX_PENDING: u32 = 10;

/// Footprint of the attacker's clearing piece
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackPattern {
    pub shape: Shape,
    /// Board column of the shape's left edge
    pub x: i32,
}

/// Lines accepted from one clear, with the footprint that clear carried
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attack {
    pub lines: u32,
    pub pattern: Option<AttackPattern>,
}

/// Pending attack lines for one board, one entry per accepted attack
#[derive(Debug, Clone, Default)]
pub struct AttackQueue {
    attacks: Vec<Attack>,
}

impl AttackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> u32 {
        self.attacks.iter().map(|attack| attack.lines).sum()
    }

    /// Queue solid attack lines up to [`MAX_PENDING`]; returns how many were accepted
    pub fn receive(&mut self, lines: u32) -> u32 {
        self.receive_with_pattern(lines, None)
    }

    /// Queue attack lines together with the attacker's piece footprint.
    /// Each accepted attack keeps its own pattern.
    pub fn receive_with_pattern(&mut self, lines: u32, pattern: Option<AttackPattern>) -> u32 {
        let accepted = MAX_PENDING.saturating_sub(self.pending()).min(lines);
        if accepted > 0 {
            self.attacks.push(Attack {
                lines: accepted,
                pattern,
            });
        }
        if accepted < lines {
            debug!(
                "Attack queue full: accepted {} of {} lines ({} pending)",
                accepted,
                lines,
                self.pending()
            );
        }
        accepted
    }

    /// Take every pending attack in arrival order, leaving the queue empty
    pub fn drain(&mut self) -> Vec<Attack> {
        std::mem::take(&mut self.attacks)
    }

    pub fn clear(&mut self) {
        self.attacks.clear();
    }
}

/// Attack lines sent for a clear: singles never attack
pub fn calculate_attack_lines(lines_cleared: u32) -> u32 {
    if lines_cleared >= 2 { lines_cleared } else { 0 }
}

/// Build `lines` attack rows (top to bottom). Without a pattern every row is
/// solid; with one, the shape's filled cells become holes, its bottom matrix
/// row lining up with the bottom attack row. Cells falling outside the
/// interior are ignored.
pub fn attack_rows(lines: u32, pattern: Option<&AttackPattern>) -> Vec<[Cell; BOARD_WIDTH]> {
    let n = lines as usize;
    let mut rows = vec![[Cell::Wall; BOARD_WIDTH]; n];
    let Some(pattern) = pattern else {
        return rows;
    };
    let shape_height = pattern.shape.height();
    for (i, row) in rows.iter_mut().enumerate() {
        // Distance from the bottom attack row equals distance from the shape's bottom row
        let from_bottom = n - 1 - i;
        if from_bottom >= shape_height {
            continue;
        }
        let shape_row = shape_height - 1 - from_bottom;
        for col in 0..pattern.shape.width() {
            if pattern.shape.get(shape_row, col).is_empty() {
                continue;
            }
            let board_col = pattern.x + col as i32 - INTERIOR_LEFT as i32;
            if (0..BOARD_WIDTH as i32).contains(&board_col) {
                row[board_col as usize] = Cell::Empty;
            }
        }
    }
    rows
}

/// Push attack rows in at the bottom of the interior
pub fn apply_attack(board: &BoardState, lines: u32, pattern: Option<&AttackPattern>) -> BoardState {
    let mut next = board.clone();
    if lines > 0 {
        next.insert_bottom_rows(&attack_rows(lines, pattern), colors::GARBAGE);
    }
    next
}

/// Push several attacks in, oldest first. Every attack is carved with its
/// own pattern, so later attacks sit below earlier ones.
pub fn apply_attacks(board: &BoardState, attacks: &[Attack]) -> BoardState {
    attacks.iter().fold(board.clone(), |next, attack| {
        apply_attack(&next, attack.lines, attack.pattern.as_ref())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::INTERIOR_BOTTOM;
    use crate::tetromino::TetrominoType;

    #[test]
    fn test_receive_clamps_to_cap() {
        let mut queue = AttackQueue::new();
        assert_eq!(queue.receive(9), 9);
        assert_eq!(queue.receive(5), 1);
        assert_eq!(queue.pending(), MAX_PENDING);
        assert_eq!(queue.receive(5), 0);
        assert_eq!(queue.pending(), MAX_PENDING);
    }

    #[test]
    fn test_drain_resets() {
        let mut queue = AttackQueue::new();
        queue.receive(3);
        assert_eq!(
            queue.drain(),
            vec![Attack {
                lines: 3,
                pattern: None
            }]
        );
        assert_eq!(queue.pending(), 0);
        assert!(queue.drain().is_empty());
    }

    #[test]
    fn test_pattern_only_kept_when_accepted() {
        let mut queue = AttackQueue::new();
        let pattern = AttackPattern {
            shape: TetrominoType::I.shape(),
            x: 1,
        };
        queue.receive(MAX_PENDING);
        assert_eq!(queue.receive_with_pattern(2, Some(pattern)), 0);
        let attacks = queue.drain();
        assert_eq!(attacks.len(), 1);
        assert_eq!(attacks[0].pattern, None);
        assert_eq!(queue.pending(), 0);
    }

    #[test]
    fn test_each_attack_keeps_its_pattern() {
        let mut queue = AttackQueue::new();
        let at = |x| AttackPattern {
            shape: TetrominoType::O.shape(),
            x,
        };
        assert_eq!(queue.receive_with_pattern(2, Some(at(1))), 2);
        assert_eq!(queue.receive_with_pattern(2, Some(at(5))), 2);
        assert_eq!(queue.pending(), 4);

        let attacks = queue.drain();
        assert_eq!(
            attacks,
            vec![
                Attack { lines: 2, pattern: Some(at(1)) },
                Attack { lines: 2, pattern: Some(at(5)) },
            ]
        );

        // Older attack on top, every inserted row keeps a hole
        let board = apply_attacks(&BoardState::new(), &attacks);
        let bottom = INTERIOR_BOTTOM as i32;
        for row in INTERIOR_BOTTOM - 3..=INTERIOR_BOTTOM {
            assert!(!board.is_row_full(row), "row {} is full", row);
        }
        assert!(board.cell(bottom - 3, 1).is_empty() && board.cell(bottom - 2, 2).is_empty());
        assert!(board.cell(bottom - 1, 5).is_empty() && board.cell(bottom, 6).is_empty());
        assert!(board.cell(bottom, 1).is_filled());
        assert!(board.walls_intact());
    }

    #[test]
    fn test_singles_never_attack() {
        assert_eq!(calculate_attack_lines(0), 0);
        assert_eq!(calculate_attack_lines(1), 0);
        assert_eq!(calculate_attack_lines(2), 2);
        assert_eq!(calculate_attack_lines(4), 4);
    }

    #[test]
    fn test_solid_rows_without_pattern() {
        let rows = attack_rows(2, None);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|row| row.iter().all(|c| c.is_filled())));
    }

    #[test]
    fn test_pattern_carves_holes() {
        // .T.
        // TTT   at board column 3 -> interior offsets 2..=4
        let pattern = AttackPattern {
            shape: TetrominoType::T.shape(),
            x: 3,
        };
        let rows = attack_rows(3, Some(&pattern));
        // Top row: above the shape, solid
        assert!(rows[0].iter().all(|c| c.is_filled()));
        // Middle row: shape's top row, one hole
        assert_eq!(rows[1].iter().filter(|c| c.is_empty()).count(), 1);
        assert!(rows[1][3].is_empty());
        // Bottom row: shape's bottom row, three holes
        assert!(rows[2][2].is_empty() && rows[2][3].is_empty() && rows[2][4].is_empty());
        assert!(rows[2][1].is_filled() && rows[2][5].is_filled());
    }

    #[test]
    fn test_pattern_outside_interior_is_ignored() {
        let pattern = AttackPattern {
            shape: TetrominoType::I.shape(),
            x: 9,
        };
        // Columns 9..=12: 9 and 10 are interior, 11 is wall, 12 is off the grid
        let rows = attack_rows(1, Some(&pattern));
        assert!(rows[0][8].is_empty() && rows[0][9].is_empty());
        assert_eq!(rows[0].iter().filter(|c| c.is_empty()).count(), 2);
    }

    #[test]
    fn test_apply_attack_shifts_board_up() {
        let mut board = BoardState::new();
        board.set(INTERIOR_BOTTOM as i32, 1, Cell::Block(7), colors::YELLOW);
        let after = apply_attack(&board, 2, None);
        assert_eq!(after.cell(INTERIOR_BOTTOM as i32 - 2, 1), Cell::Block(7));
        assert_eq!(after.cell(INTERIOR_BOTTOM as i32, 1), Cell::Wall);
        assert!(after.walls_intact());
        assert_eq!(apply_attack(&board, 0, None), board);
    }
}
