//! Special-block (item) resolution
//!
//! [`plan`] turns the sentinel reported by a placement into an animation
//! request plus the [`Effect`] to apply once that animation completes.
//! [`apply`] is the only function that rewrites the board for an effect.

use crate::animation::AnimationRequest;
use crate::board::{BoardState, Cell, INTERIOR_BOTTOM, INTERIOR_TOP, Special};
use crate::engine;
use crate::piece::Piece;
use crate::score;

/// Half-width of the box-clear explosion (5x5)
pub const BOX_CLEAR_RADIUS: usize = 2;

/// A board rewrite waiting for its animation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Remove every full row
    LineClear { rows: Vec<usize> },
    /// Wipe the whole interior
    FullClear { score: u64 },
    /// Explode 5x5 around each center, then compact columns
    AreaClear {
        centers: Vec<(usize, usize)>,
        score: u64,
    },
    /// Remove the given rows whether full or not (sorted bottom first)
    ForcedLineClear { rows: Vec<usize>, score: u64 },
}

impl Effect {
    /// Score granted by the effect itself (line clears are scored on completion)
    pub fn score(&self) -> u64 {
        match self {
            Effect::LineClear { .. } => 0,
            Effect::FullClear { score }
            | Effect::AreaClear { score, .. }
            | Effect::ForcedLineClear { score, .. } => *score,
        }
    }
}

/// Counters the item scores depend on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemContext {
    pub level: u32,
    pub blocks_spawned: u32,
    pub line_clear_count: u32,
    pub difficulty_multiplier: f64,
    pub item_mode: bool,
}

/// What the controller should do with a placement's sentinel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Animate, then apply the effect
    Animate {
        request: AnimationRequest,
        effect: Effect,
    },
    /// Nothing special; continue with the regular line check
    PassThrough,
}

/// Plan the effect of a placed sentinel against the freshly stamped board
pub fn plan(special: Option<Special>, board: &BoardState, ctx: &ItemContext) -> Plan {
    match special {
        Some(Special::AllClear) => {
            let speed = score::speed_level(ctx.blocks_spawned, ctx.line_clear_count);
            Plan::Animate {
                request: AnimationRequest::FullClear,
                effect: Effect::FullClear {
                    score: score::all_clear_score(speed, ctx.item_mode),
                },
            }
        }
        Some(Special::BoxClear) => {
            let centers = board.positions_of(Cell::Special(Special::BoxClear));
            Plan::Animate {
                request: AnimationRequest::AreaClear(centers.clone()),
                effect: Effect::AreaClear {
                    centers,
                    score: score::line_clear_score(2, ctx.level, ctx.difficulty_multiplier),
                },
            }
        }
        Some(Special::OneLineClear) => {
            let rows = sentinel_rows(board, Special::OneLineClear);
            let score =
                score::line_clear_score(rows.len() as u32 + 1, ctx.level, ctx.difficulty_multiplier);
            Plan::Animate {
                request: AnimationRequest::LineFlash(rows.clone()),
                effect: Effect::ForcedLineClear { rows, score },
            }
        }
        // Weights drill before they are stamped; a stamped weight is inert
        Some(Special::Weight) | None => Plan::PassThrough,
    }
}

/// Interior rows holding at least one `special` cell, bottom first
fn sentinel_rows(board: &BoardState, special: Special) -> Vec<usize> {
    (INTERIOR_TOP..=INTERIOR_BOTTOM)
        .rev()
        .filter(|&row| board.row_contains(row, Cell::Special(special)))
        .collect()
}

/// Apply an effect. Returns the rewritten board and the number of rows removed.
pub fn apply(effect: &Effect, board: &BoardState) -> (BoardState, u32) {
    match effect {
        Effect::LineClear { .. } => engine::clear_and_compact(board),
        Effect::FullClear { .. } => {
            let mut next = board.clone();
            next.clear_interior();
            (next, 0)
        }
        Effect::AreaClear { centers, .. } => {
            let mut next = board.clone();
            for &(row, col) in centers {
                next.clear_region(row, col, BOX_CLEAR_RADIUS);
            }
            next.apply_gravity();
            (next, 0)
        }
        Effect::ForcedLineClear { rows, .. } => {
            let mut next = board.clone();
            // Rows are bottom first; each removal shifts the remaining ones down by one
            for (removed, &row) in rows.iter().enumerate() {
                next.remove_row(row + removed);
            }
            (next, rows.len() as u32)
        }
    }
}

/// Result of one drill period
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrillStep {
    /// The piece moved down one row, erasing what it entered
    Drilled(BoardState),
    /// The piece sits on the floor; the drill is over
    Bottomed,
}

/// Advance a drilling weight by one row
pub fn drill(piece: &mut Piece, board: &BoardState) -> DrillStep {
    if !engine::can_drill_down(piece) {
        return DrillStep::Bottomed;
    }
    DrillStep::Drilled(engine::drill_step(piece, board))
}
