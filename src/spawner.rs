//! Piece spawning and item cadence
//!
//! The spawner promotes the previewed piece to the active one and decides
//! whether the new preview is an item. Counters live in the snapshot; the
//! spawner itself only keeps its random sources and the deferred-item flag.

use crate::bag::Bag;
use crate::board::Special;
use crate::piece::Piece;
use crate::score::{self, Difficulty};
use crate::snapshot::GameSnapshot;
use crate::tetromino::TetrominoType;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// One item per this many cleared lines
pub const ITEM_DIVISOR: u32 = 3;

/// Item kinds an item piece may carry
const ITEM_KINDS: [Special; 4] = [
    Special::AllClear,
    Special::BoxClear,
    Special::OneLineClear,
    Special::Weight,
];

/// Produces pieces and decides when items appear
#[derive(Debug, Clone)]
pub struct Spawner {
    bag: Bag,
    item_rng: ChaCha8Rng,
    item_mode: bool,
    /// An item became due after the last spawn; the next spawn must honour it
    item_pending: bool,
}

impl Spawner {
    pub fn new(seed: u64, difficulty: Difficulty, item_mode: bool) -> Self {
        Self {
            bag: Bag::with_seed(seed, difficulty),
            item_rng: ChaCha8Rng::seed_from_u64(seed.wrapping_add(1)),
            item_mode,
            item_pending: false,
        }
    }

    pub fn item_pending(&self) -> bool {
        self.item_pending
    }

    fn item_due(line_clear_count: u32, item_generate_count: u32) -> bool {
        line_clear_count / ITEM_DIVISOR > item_generate_count
    }

    fn normal_piece(&mut self) -> Piece {
        Piece::new(self.bag.next())
    }

    fn item_piece(&mut self) -> Piece {
        let item = ITEM_KINDS[self.item_rng.gen_range(0..ITEM_KINDS.len())];
        if item == Special::Weight {
            return Piece::weight();
        }
        let pieces = TetrominoType::all();
        let piece_type = pieces[self.item_rng.gen_range(0..pieces.len())];
        let cell = self.item_rng.gen_range(0..piece_type.shape().block_count());
        Piece::with_item(piece_type, item, cell)
    }

    /// Promote `next` to the active piece and choose a new `next`.
    ///
    /// Returns the new snapshot and the recomputed speed level.
    pub fn spawn(&mut self, snapshot: &GameSnapshot) -> (GameSnapshot, u32) {
        let current = match snapshot.next() {
            Some(next) => next.clone(),
            None => self.normal_piece(),
        };

        let mut item_generate_count = snapshot.item_generate_count();
        let next = if self.item_pending {
            self.item_pending = false;
            item_generate_count += 1;
            debug!("Spawning deferred item (#{})", item_generate_count);
            self.item_piece()
        } else if self.item_mode
            && Self::item_due(snapshot.line_clear_count(), item_generate_count)
        {
            item_generate_count += 1;
            debug!("Spawning item (#{})", item_generate_count);
            self.item_piece()
        } else {
            self.normal_piece()
        };

        let blocks_spawned = snapshot.blocks_spawned() + 1;
        let speed_level = score::speed_level(blocks_spawned, snapshot.total_lines_cleared());
        let next_snapshot = snapshot
            .to_builder()
            .active(Some(current))
            .next(Some(next))
            .item_generate_count(item_generate_count)
            .blocks_spawned(blocks_spawned)
            .build();
        (next_snapshot, speed_level)
    }

    /// Count cleared lines towards item cadence. If this makes an item due,
    /// the next spawn produces it even if a spawn already happened meanwhile.
    pub fn add_line_clear_count(&mut self, snapshot: &GameSnapshot, lines: u32) -> GameSnapshot {
        let before = snapshot.line_clear_count();
        let after = before + lines;
        let generated = snapshot.item_generate_count();
        if self.item_mode
            && !Self::item_due(before, generated)
            && Self::item_due(after, generated)
        {
            debug!("Item now due after {} cleared lines", after);
            self.item_pending = true;
        }
        snapshot.to_builder().line_clear_count(after).build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_spawn_fills_active_and_next() {
        let mut spawner = Spawner::new(5, Difficulty::Normal, false);
        let (snapshot, speed) = spawner.spawn(&GameSnapshot::new());
        assert!(snapshot.active().is_some());
        assert!(snapshot.next().is_some());
        assert_eq!(snapshot.blocks_spawned(), 1);
        assert_eq!(speed, 0);
    }

    #[test]
    fn test_next_is_promoted() {
        let mut spawner = Spawner::new(5, Difficulty::Normal, false);
        let (first, _) = spawner.spawn(&GameSnapshot::new());
        let previewed = first.next().cloned();
        let (second, _) = spawner.spawn(&first);
        assert_eq!(second.active().cloned(), previewed);
        assert_eq!(second.blocks_spawned(), 2);
    }

    #[test]
    fn test_item_cadence() {
        let mut spawner = Spawner::new(9, Difficulty::Normal, true);
        let snapshot = GameSnapshot::new()
            .to_builder()
            .line_clear_count(6)
            .item_generate_count(1)
            .build();
        let (after, _) = spawner.spawn(&snapshot);
        assert!(after.next().and_then(|p| p.item()).is_some());
        assert_eq!(after.item_generate_count(), 2);

        // 6 / 3 == 2 is no longer greater than 2
        let (again, _) = spawner.spawn(&after);
        assert_eq!(again.next().and_then(|p| p.item()), None);
        assert_eq!(again.item_generate_count(), 2);
    }

    #[test]
    fn test_no_items_outside_item_mode() {
        let mut spawner = Spawner::new(9, Difficulty::Normal, false);
        let mut snapshot = GameSnapshot::new().to_builder().line_clear_count(30).build();
        snapshot = spawner.add_line_clear_count(&snapshot, 3);
        assert!(!spawner.item_pending());
        for _ in 0..20 {
            let (next, _) = spawner.spawn(&snapshot);
            assert_eq!(next.next().and_then(|p| p.item()), None);
            snapshot = next;
        }
        assert_eq!(snapshot.item_generate_count(), 0);
    }

    #[test]
    fn test_deferred_item_is_consumed_once() {
        let mut spawner = Spawner::new(11, Difficulty::Normal, true);
        let snapshot = GameSnapshot::new().to_builder().line_clear_count(2).build();
        let snapshot = spawner.add_line_clear_count(&snapshot, 1);
        assert!(spawner.item_pending());
        assert_eq!(snapshot.line_clear_count(), 3);

        let (after, _) = spawner.spawn(&snapshot);
        assert!(!spawner.item_pending());
        assert!(after.next().and_then(|p| p.item()).is_some());
        assert_eq!(after.item_generate_count(), 1);

        let (later, _) = spawner.spawn(&after);
        assert_eq!(later.next().and_then(|p| p.item()), None);
    }

    #[test]
    fn test_speed_level_from_blocks() {
        let mut spawner = Spawner::new(1, Difficulty::Normal, false);
        let snapshot = GameSnapshot::new().to_builder().blocks_spawned(59).build();
        let (after, speed) = spawner.spawn(&snapshot);
        assert_eq!(after.blocks_spawned(), 60);
        assert_eq!(speed, 2);
    }
}
