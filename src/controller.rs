//! Game controller
//!
//! Owns the canonical snapshot and drives a single board: ticks and player
//! commands go in, snapshots go to the render sink and notifications pile up
//! in an outbox for the versus layer. Every stimulus runs to completion
//! before the next one is accepted, and nothing mutates the board while an
//! animation channel is active.

use crate::animation::{AnimationRequest, AnimationSequencer, Channel, Fired, Started};
use crate::attack::{self, AttackPattern, AttackQueue};
use crate::board::BoardState;
use crate::config::GameConfig;
use crate::engine;
use crate::items::{self, DrillStep, Effect, ItemContext, Plan};
use crate::piece::Piece;
use crate::score;
use crate::snapshot::GameSnapshot;
use crate::spawner::Spawner;
use crate::tetromino::Shape;
use serde::Serialize;
use tracing::{debug, info};

/// Most entries kept by [`MemoryHighScores`]
pub const MAX_HIGH_SCORES: usize = 10;

/// Controller lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ControllerState {
    Stopped,
    Running,
    Paused,
    /// Terminal until `reset`
    GameOver,
}

/// Player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    MoveDown,
    Rotate,
    HardDrop,
}

/// One delivery from the tick source. The controller keeps its own level and
/// speed, so `current_level` and `speed_level` are informational; only
/// `delta_ms` drives the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInfo {
    pub current_level: u32,
    pub speed_level: u32,
    pub delta_ms: u32,
}

/// Events published for the versus/network layer, in occurrence order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Moved {
        x: i32,
        y: i32,
    },
    Rotated,
    /// Footprint of the piece that just landed
    Landed {
        shape: Shape,
        x: i32,
    },
    LinesCleared {
        rows: Vec<usize>,
        count: u32,
        score: u64,
        shape: Option<Shape>,
        x: i32,
    },
    ScoreChanged {
        score: u64,
    },
    GameOver {
        final_score: u64,
    },
}

/// Render collaborator. Calls are fire-and-forget.
pub trait RenderSink {
    fn render(&mut self, _snapshot: &GameSnapshot) {}
    fn set_falling_piece(&mut self, _piece: Option<&Piece>) {}
    fn set_next_piece(&mut self, _piece: Option<&Piece>) {}
    fn set_score(&mut self, _score: u64) {}
    fn set_high_score(&mut self, _score: u64) {}
    fn repaint(&mut self) {}
}

/// Sink that draws nothing (headless play, tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl RenderSink for NullSink {}

/// High-score collaborator injected at construction
pub trait HighScoreBoard {
    /// Record a final score. Returns true if it made the board.
    fn submit(&mut self, score: u64) -> bool;
    fn best(&self) -> Option<u64>;
}

/// In-memory top-ten table
#[derive(Debug, Clone, Default)]
pub struct MemoryHighScores {
    scores: Vec<u64>,
}

impl MemoryHighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scores, best first
    pub fn scores(&self) -> &[u64] {
        &self.scores
    }
}

impl HighScoreBoard for MemoryHighScores {
    fn submit(&mut self, score: u64) -> bool {
        let rank = self.scores.iter().position(|&s| score > s).unwrap_or(self.scores.len());
        if rank >= MAX_HIGH_SCORES {
            return false;
        }
        self.scores.insert(rank, score);
        self.scores.truncate(MAX_HIGH_SCORES);
        true
    }

    fn best(&self) -> Option<u64> {
        self.scores.first().copied()
    }
}

/// The single owner of one board's game state
pub struct Controller {
    config: GameConfig,
    seed: u64,
    state: ControllerState,
    snapshot: GameSnapshot,
    sequencer: AnimationSequencer<Effect>,
    spawner: Spawner,
    attacks: AttackQueue,
    speed_level: u32,
    /// Footprint of the most recent landing, reported with line clears
    last_landed: Option<(Shape, i32)>,
    outbox: Vec<Notification>,
    sink: Box<dyn RenderSink>,
    high_scores: Box<dyn HighScoreBoard>,
}

impl Controller {
    pub fn new(
        config: GameConfig,
        sink: Box<dyn RenderSink>,
        high_scores: Box<dyn HighScoreBoard>,
    ) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        debug!(
            "New controller: {:?}, item mode {}, seed {}",
            config.difficulty, config.item_mode, seed
        );
        Self {
            spawner: Spawner::new(seed, config.difficulty, config.item_mode),
            config,
            seed,
            state: ControllerState::Stopped,
            snapshot: GameSnapshot::new(),
            sequencer: AnimationSequencer::new(),
            attacks: AttackQueue::new(),
            speed_level: 0,
            last_landed: None,
            outbox: Vec::new(),
            sink,
            high_scores,
        }
    }

    /// Headless controller with an in-memory high-score table
    pub fn headless(config: GameConfig) -> Self {
        Self::new(config, Box::new(NullSink), Box::new(MemoryHighScores::new()))
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> &GameSnapshot {
        &self.snapshot
    }

    pub fn speed_level(&self) -> u32 {
        self.speed_level
    }

    pub fn is_animating(&self) -> bool {
        self.sequencer.is_busy()
    }

    pub fn pending_attack_lines(&self) -> u32 {
        self.attacks.pending()
    }

    /// Interval the tick source should use at the current speed
    pub fn drop_interval_ms(&self) -> u32 {
        score::drop_interval_ms(self.speed_level)
    }

    /// Tick description for `delta_ms` at the current level and speed
    pub fn tick_info(&self, delta_ms: u32) -> TickInfo {
        TickInfo {
            current_level: self.snapshot.current_level(),
            speed_level: self.speed_level,
            delta_ms,
        }
    }

    /// Drain the outbox
    pub fn take_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.outbox)
    }

    /// `Stopped -> Running`, spawning the first piece
    pub fn start(&mut self) -> bool {
        if self.state != ControllerState::Stopped {
            debug!("Ignoring start while {:?}", self.state);
            return false;
        }
        info!("Game started");
        self.state = ControllerState::Running;
        if self.snapshot.active().is_none() && !self.sequencer.is_busy() {
            self.spawn_next();
        }
        true
    }

    pub fn pause(&mut self) -> bool {
        if self.state != ControllerState::Running {
            debug!("Ignoring pause while {:?}", self.state);
            return false;
        }
        self.state = ControllerState::Paused;
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.state != ControllerState::Paused {
            debug!("Ignoring resume while {:?}", self.state);
            return false;
        }
        self.state = ControllerState::Running;
        true
    }

    pub fn stop(&mut self) -> bool {
        if self.state != ControllerState::Running {
            debug!("Ignoring stop while {:?}", self.state);
            return false;
        }
        info!("Game stopped");
        self.state = ControllerState::Stopped;
        true
    }

    /// Back to `Stopped` with a fresh board. Cancels every animation.
    pub fn reset(&mut self) {
        info!("Game reset");
        self.sequencer.cancel_all();
        self.spawner = Spawner::new(self.seed, self.config.difficulty, self.config.item_mode);
        self.attacks.clear();
        self.speed_level = 0;
        self.last_landed = None;
        self.state = ControllerState::Stopped;
        self.commit(GameSnapshot::new());
        self.sink.set_falling_piece(None);
        self.sink.set_next_piece(None);
        self.sink.set_score(0);
        self.sink.repaint();
    }

    /// Queue attack lines from the opponent. Returns how many were accepted.
    pub fn queue_attack_lines(&mut self, lines: u32, shape: Option<Shape>, x: i32) -> u32 {
        let pattern = shape.map(|shape| AttackPattern { shape, x });
        let accepted = self.attacks.receive_with_pattern(lines, pattern);
        debug!(
            "Queued {} of {} attack lines ({} pending)",
            accepted,
            lines,
            self.attacks.pending()
        );
        accepted
    }

    /// Advance virtual time. Due animation events are handled first; a tick
    /// that handled any of them does not also apply gravity.
    pub fn tick(&mut self, info: TickInfo) {
        if self.state != ControllerState::Running {
            return;
        }

        self.sequencer.advance(info.delta_ms);
        let mut fired = false;
        while self.state == ControllerState::Running {
            let Some(event) = self.sequencer.poll() else {
                break;
            };
            fired = true;
            match event {
                Fired::Completed(effect) => self.complete(effect),
                Fired::DrillStep => self.drill_step(),
            }
        }
        if fired || self.sequencer.is_busy() || self.state != ControllerState::Running {
            return;
        }

        let Some(mut piece) = self.snapshot.active().cloned() else {
            self.spawn_next();
            return;
        };
        if engine::try_move_down(&mut piece, self.snapshot.board()) {
            let points = score::auto_drop_score(self.speed_level, self.config.difficulty_multiplier());
            let next = self
                .snapshot
                .to_builder()
                .active(Some(piece))
                .add_score(points)
                .build();
            self.commit(next);
            self.sink.set_falling_piece(self.snapshot.active());
            self.publish_score();
        } else {
            self.land(piece);
        }
    }

    pub fn move_left(&mut self) -> bool {
        self.command(Command::MoveLeft)
    }

    pub fn move_right(&mut self) -> bool {
        self.command(Command::MoveRight)
    }

    pub fn move_down(&mut self) -> bool {
        self.command(Command::MoveDown)
    }

    pub fn rotate(&mut self) -> bool {
        self.command(Command::Rotate)
    }

    pub fn hard_drop(&mut self) -> bool {
        self.command(Command::HardDrop)
    }

    /// Apply a player command. Returns true if it had an effect.
    pub fn command(&mut self, command: Command) -> bool {
        if self.state != ControllerState::Running {
            debug!("Ignoring {:?} while {:?}", command, self.state);
            return false;
        }
        if self.sequencer.is_busy() {
            debug!("Ignoring {:?} during {:?}", command, self.sequencer.active_channel());
            return false;
        }
        let Some(mut piece) = self.snapshot.active().cloned() else {
            return false;
        };

        let board = self.snapshot.board().clone();
        let moved = match command {
            Command::MoveLeft => engine::try_move_left(&mut piece, &board),
            Command::MoveRight => engine::try_move_right(&mut piece, &board),
            Command::MoveDown => engine::try_move_down(&mut piece, &board),
            Command::Rotate => engine::rotate(&mut piece, &board),
            Command::HardDrop => {
                self.drop_and_land(piece);
                return true;
            }
        };
        if !moved {
            return false;
        }

        let notification = match command {
            Command::Rotate => Notification::Rotated,
            _ => Notification::Moved {
                x: piece.x,
                y: piece.y,
            },
        };
        let next = self.snapshot.to_builder().active(Some(piece)).build();
        self.commit(next);
        self.sink.set_falling_piece(self.snapshot.active());
        self.outbox.push(notification);
        true
    }

    /// Award 2 points per row, then land right away
    fn drop_and_land(&mut self, mut piece: Piece) {
        let distance = engine::hard_drop_distance(&piece, self.snapshot.board());
        piece.y += distance as i32;
        let points = score::hard_drop_score(distance);
        let next = self
            .snapshot
            .to_builder()
            .active(Some(piece.clone()))
            .add_score(points)
            .build();
        self.commit(next);
        if points > 0 {
            self.publish_score();
        }
        self.land(piece);
    }

    /// The piece can no longer fall. Weights start drilling; everything
    /// else is stamped.
    fn land(&mut self, piece: Piece) {
        if piece.is_weight() && self.sequencer.start_drill() {
            self.sync_animation();
            return;
        }
        self.stamp(piece);
    }

    fn drill_step(&mut self) {
        let Some(mut piece) = self.snapshot.active().cloned() else {
            self.sequencer.stop(Channel::Drill);
            self.sync_animation();
            return;
        };
        match items::drill(&mut piece, self.snapshot.board()) {
            DrillStep::Drilled(board) => {
                let next = self
                    .snapshot
                    .to_builder()
                    .board(board)
                    .active(Some(piece))
                    .build();
                self.commit(next);
            }
            DrillStep::Bottomed => {
                debug!("Drill reached the floor at row {}", piece.y);
                self.sequencer.stop(Channel::Drill);
                self.stamp(piece);
            }
        }
    }

    /// Stamp the piece, take in queued attack lines, then start whatever
    /// effect the new board calls for
    fn stamp(&mut self, piece: Piece) {
        self.outbox.push(Notification::Landed {
            shape: piece.shape.clone(),
            x: piece.x,
        });
        self.last_landed = Some((piece.shape.clone(), piece.x));

        let (board, special) = engine::place(&piece, self.snapshot.board());
        let board = self.take_attacks(board);
        let placed = self.snapshot.to_builder().board(board).active(None).build();
        self.commit(placed);
        self.sink.set_falling_piece(None);

        let plan = items::plan(special, self.snapshot.board(), &self.item_context());
        let (request, effect) = match plan {
            Plan::Animate { request, effect } => (request, effect),
            Plan::PassThrough => {
                let rows = engine::find_full_lines(self.snapshot.board());
                if rows.is_empty() {
                    self.finish_landing();
                    return;
                }
                (AnimationRequest::LineFlash(rows.clone()), Effect::LineClear { rows })
            }
        };

        match self.sequencer.start(request, effect) {
            Started::Scheduled => self.sync_animation(),
            Started::Immediate(effect) => {
                debug!("Skipping {:?}, continuing without it", effect);
                self.finish_landing();
            }
        }
    }

    fn take_attacks(&mut self, board: BoardState) -> BoardState {
        let attacks = self.attacks.drain();
        if attacks.is_empty() {
            return board;
        }
        let lines: u32 = attacks.iter().map(|attack| attack.lines).sum();
        info!("Inserting {} attack lines from {} attacks", lines, attacks.len());
        attack::apply_attacks(&board, &attacks)
    }

    fn item_context(&self) -> ItemContext {
        ItemContext {
            level: self.snapshot.current_level(),
            blocks_spawned: self.snapshot.blocks_spawned(),
            line_clear_count: self.snapshot.line_clear_count(),
            difficulty_multiplier: self.config.difficulty_multiplier(),
            item_mode: self.config.item_mode,
        }
    }

    /// Animation finished: the effect's board rewrite happens here and only here
    fn complete(&mut self, effect: Effect) {
        let (board, removed) = items::apply(&effect, self.snapshot.board());
        let points = match &effect {
            Effect::LineClear { .. } => score::line_clear_score(
                removed,
                self.snapshot.current_level(),
                self.config.difficulty_multiplier(),
            ),
            other => other.score(),
        };

        let mut builder = self.snapshot.to_builder().board(board).add_score(points);
        if let Effect::LineClear { .. } = effect {
            let total = self.snapshot.total_lines_cleared() + removed;
            builder = builder
                .total_lines_cleared(total)
                .current_level(score::level(total));
        }
        if matches!(effect, Effect::LineClear { .. } | Effect::ForcedLineClear { .. }) {
            builder = builder.last_line_clear_score(points);
        }
        let mut next = builder.build();
        if removed > 0 {
            next = self.spawner.add_line_clear_count(&next, removed);
        }
        self.commit(next);

        if removed > 0 {
            let rows = match effect {
                Effect::LineClear { rows } | Effect::ForcedLineClear { rows, .. } => rows,
                _ => Vec::new(),
            };
            let (shape, x) = match &self.last_landed {
                Some((shape, x)) => (Some(shape.clone()), *x),
                None => (None, 0),
            };
            debug!("Cleared rows {:?} for {} points", rows, points);
            self.outbox.push(Notification::LinesCleared {
                rows,
                count: removed,
                score: self.snapshot.score(),
                shape,
                x,
            });
        }
        if points > 0 {
            self.publish_score();
        }
        self.finish_landing();
    }

    fn finish_landing(&mut self) {
        if engine::is_game_over(self.snapshot.board()) {
            self.game_over();
            return;
        }
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let (next, speed_level) = self.spawner.spawn(&self.snapshot);
        if speed_level != self.speed_level {
            debug!("Speed level {} -> {}", self.speed_level, speed_level);
        }
        self.speed_level = speed_level;
        let blocked = next
            .active()
            .is_some_and(|piece| engine::collides(next.board(), &piece.shape, piece.x, piece.y));
        self.commit(next);
        self.sink.set_falling_piece(self.snapshot.active());
        self.sink.set_next_piece(self.snapshot.next());
        if blocked {
            debug!("Spawned piece has no room");
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        if self.state == ControllerState::GameOver {
            return;
        }
        self.state = ControllerState::GameOver;
        self.sequencer.cancel_all();
        let final_score = self.snapshot.score();
        info!("Game over with score {}", final_score);
        self.outbox.push(Notification::GameOver { final_score });
        if self.high_scores.submit(final_score) {
            debug!("New high score entry {}", final_score);
        }
        if let Some(best) = self.high_scores.best() {
            self.sink.set_high_score(best);
        }
        self.sync_animation();
        self.sink.repaint();
    }

    fn publish_score(&mut self) {
        let score = self.snapshot.score();
        self.sink.set_score(score);
        self.outbox.push(Notification::ScoreChanged { score });
    }

    fn commit(&mut self, next: GameSnapshot) {
        self.snapshot = next;
        self.sync_animation();
    }

    /// Mirror the sequencer into the snapshot and hand it to the sink
    fn sync_animation(&mut self) {
        let animation = self.sequencer.state();
        if &animation != self.snapshot.animation() {
            self.snapshot = self.snapshot.to_builder().animation(animation).build();
        }
        self.sink.render(&self.snapshot);
    }
}
