//! Immutable game snapshots
//!
//! A [`GameSnapshot`] is never changed after construction. Every change goes
//! through [`SnapshotBuilder`], which starts from a copy of the previous
//! snapshot (boards are copy-on-write, so this is cheap) and produces a new one.

use crate::animation::AnimationState;
use crate::board::BoardState;
use crate::piece::Piece;
use serde::Serialize;

/// The public state unit published by the controller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameSnapshot {
    board: BoardState,
    active: Option<Piece>,
    next: Option<Piece>,
    score: u64,
    total_lines_cleared: u32,
    current_level: u32,
    line_clear_count: u32,
    item_generate_count: u32,
    blocks_spawned: u32,
    last_line_clear_score: u64,
    animation: AnimationState,
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSnapshot {
    /// Fresh game: empty board with walls, no pieces yet
    pub fn new() -> Self {
        Self {
            board: BoardState::new(),
            active: None,
            next: None,
            score: 0,
            total_lines_cleared: 0,
            current_level: 1,
            line_clear_count: 0,
            item_generate_count: 0,
            blocks_spawned: 0,
            last_line_clear_score: 0,
            animation: AnimationState::Idle,
        }
    }

    pub fn board(&self) -> &BoardState {
        &self.board
    }

    pub fn active(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    pub fn next(&self) -> Option<&Piece> {
        self.next.as_ref()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn total_lines_cleared(&self) -> u32 {
        self.total_lines_cleared
    }

    pub fn current_level(&self) -> u32 {
        self.current_level
    }

    /// Cumulative lines counted towards item cadence
    pub fn line_clear_count(&self) -> u32 {
        self.line_clear_count
    }

    pub fn item_generate_count(&self) -> u32 {
        self.item_generate_count
    }

    pub fn blocks_spawned(&self) -> u32 {
        self.blocks_spawned
    }

    pub fn last_line_clear_score(&self) -> u64 {
        self.last_line_clear_score
    }

    pub fn animation(&self) -> &AnimationState {
        &self.animation
    }

    /// Start a builder seeded with this snapshot's values
    pub fn to_builder(&self) -> SnapshotBuilder {
        SnapshotBuilder {
            inner: self.clone(),
        }
    }
}

/// Copy-on-write builder for [`GameSnapshot`]
#[derive(Debug, Clone)]
#[must_use]
pub struct SnapshotBuilder {
    inner: GameSnapshot,
}

impl SnapshotBuilder {
    pub fn board(mut self, board: BoardState) -> Self {
        self.inner.board = board;
        self
    }

    pub fn active(mut self, active: Option<Piece>) -> Self {
        self.inner.active = active;
        self
    }

    pub fn next(mut self, next: Option<Piece>) -> Self {
        self.inner.next = next;
        self
    }

    pub fn score(mut self, score: u64) -> Self {
        self.inner.score = score;
        self
    }

    pub fn add_score(mut self, points: u64) -> Self {
        self.inner.score += points;
        self
    }

    pub fn total_lines_cleared(mut self, lines: u32) -> Self {
        self.inner.total_lines_cleared = lines;
        self
    }

    pub fn current_level(mut self, level: u32) -> Self {
        self.inner.current_level = level;
        self
    }

    pub fn line_clear_count(mut self, count: u32) -> Self {
        self.inner.line_clear_count = count;
        self
    }

    pub fn item_generate_count(mut self, count: u32) -> Self {
        self.inner.item_generate_count = count;
        self
    }

    pub fn blocks_spawned(mut self, count: u32) -> Self {
        self.inner.blocks_spawned = count;
        self
    }

    pub fn last_line_clear_score(mut self, score: u64) -> Self {
        self.inner.last_line_clear_score = score;
        self
    }

    pub fn animation(mut self, animation: AnimationState) -> Self {
        self.inner.animation = animation;
        self
    }

    pub fn build(self) -> GameSnapshot {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tetromino::TetrominoType;

    #[test]
    fn test_new_snapshot() {
        let snapshot = GameSnapshot::new();
        assert!(snapshot.board().walls_intact());
        assert!(snapshot.active().is_none());
        assert!(snapshot.next().is_none());
        assert_eq!(snapshot.current_level(), 1);
        assert_eq!(snapshot.animation(), &AnimationState::Idle);
    }

    #[test]
    fn test_builder_leaves_original_untouched() {
        let first = GameSnapshot::new();
        let second = first
            .to_builder()
            .add_score(300)
            .active(Some(Piece::new(TetrominoType::S)))
            .build();
        assert_eq!(first.score(), 0);
        assert!(first.active().is_none());
        assert_eq!(second.score(), 300);
        assert!(second.active().is_some());
        // The untouched board is still shared
        assert!(second.board().cells().shares_storage(first.board().cells()));
    }
}
