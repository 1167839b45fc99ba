//! Scoring, level and speed formulas

use serde::{Deserialize, Serialize};

/// Highest level reachable through line clears
pub const MAX_LEVEL: u32 = 10;
/// Highest speed level
pub const MAX_SPEED_LEVEL: u32 = 6;
/// Blocks spawned per speed level step
const BLOCKS_PER_SPEED_LEVEL: u32 = 30;
/// Lines cleared per speed level step
const LINES_PER_SPEED_LEVEL: u32 = 5;
/// Flat multiplier applied to item effects when item mode is on
const ITEM_MODE_MULTIPLIER: f64 = 0.7;
/// Base score of the all-clear item
const ALL_CLEAR_BASE: f64 = 500.0;

/// Difficulty, fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    /// Score multiplier for this difficulty
    pub fn multiplier(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.9,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.1,
        }
    }
}

/// Score for clearing `lines` lines at `level`
pub fn line_clear_score(lines: u32, level: u32, multiplier: f64) -> u64 {
    let base = match lines {
        1 => 100,
        2 => 300,
        3 => 500,
        4 => 800,
        n => 100 * n as u64,
    };
    (base as f64 * level as f64 * multiplier).round() as u64
}

/// Score for one gravity step
pub fn auto_drop_score(speed_level: u32, multiplier: f64) -> u64 {
    ((speed_level + 1) as f64 * multiplier).round() as u64
}

/// Score for a hard drop of `distance` rows (2 points per row)
pub fn hard_drop_score(distance: u32) -> u64 {
    distance as u64 * 2
}

/// Level from total lines cleared, capped at [`MAX_LEVEL`]
pub fn level(total_lines_cleared: u32) -> u32 {
    (total_lines_cleared / 2 + 1).min(MAX_LEVEL)
}

/// Speed level from blocks spawned and lines cleared, capped at [`MAX_SPEED_LEVEL`]
pub fn speed_level(blocks_spawned: u32, lines_cleared: u32) -> u32 {
    (blocks_spawned / BLOCKS_PER_SPEED_LEVEL)
        .max(lines_cleared / LINES_PER_SPEED_LEVEL)
        .min(MAX_SPEED_LEVEL)
}

/// Multiplier applied to item effect scores
pub fn item_multiplier(item_mode: bool) -> f64 {
    if item_mode { ITEM_MODE_MULTIPLIER } else { 1.0 }
}

/// Score awarded by the all-clear item
pub fn all_clear_score(speed_level: u32, item_mode: bool) -> u64 {
    (ALL_CLEAR_BASE * (speed_level + 1) as f64 * item_multiplier(item_mode)).round() as u64
}

/// Suggested tick interval in milliseconds for a speed level
pub fn drop_interval_ms(speed_level: u32) -> u32 {
    1000u32
        .saturating_sub(120 * speed_level.min(MAX_SPEED_LEVEL))
        .max(100)
}
