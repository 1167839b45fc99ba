//! Two-board versus match
//!
//! Both boards are built from the same seed so they see the same pieces.
//! Every multi-line clear on one board is queued as attack lines on the
//! other, carrying the clearing piece's footprint. The first board to top
//! out loses.

use crate::attack::calculate_attack_lines;
use crate::config::GameConfig;
use crate::controller::{Command, Controller, ControllerState, Notification};
use serde::Serialize;
use tracing::info;

/// One side of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opponent(&self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    fn index(&self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Per-side match totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SideStats {
    /// Attack lines accepted by the opponent's queue
    pub lines_sent: u32,
    pub lines_cleared: u32,
}

pub struct VersusMatch {
    players: [Controller; 2],
    stats: [SideStats; 2],
    winner: Option<Side>,
    events: Vec<(Side, Notification)>,
}

impl VersusMatch {
    /// Two headless boards sharing one seed
    pub fn new(config: &GameConfig) -> Self {
        let seed = config.seed.unwrap_or_else(rand::random);
        let config = GameConfig {
            seed: Some(seed),
            ..config.clone()
        };
        info!("New versus match, seed {}", seed);
        Self::with_players(
            Controller::headless(config.clone()),
            Controller::headless(config),
        )
    }

    pub fn with_players(left: Controller, right: Controller) -> Self {
        Self {
            players: [left, right],
            stats: [SideStats::default(); 2],
            winner: None,
            events: Vec::new(),
        }
    }

    pub fn player(&self, side: Side) -> &Controller {
        &self.players[side.index()]
    }

    pub fn stats(&self, side: Side) -> SideStats {
        self.stats[side.index()]
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn is_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn start(&mut self) {
        for player in &mut self.players {
            player.start();
        }
    }

    /// Advance both boards by `delta_ms`
    pub fn tick(&mut self, delta_ms: u32) {
        if self.is_over() {
            return;
        }
        for side in [Side::Left, Side::Right] {
            let player = &mut self.players[side.index()];
            let info = player.tick_info(delta_ms);
            player.tick(info);
            self.route(side);
        }
    }

    /// Apply a command for one side. Returns true if it had an effect.
    pub fn command(&mut self, side: Side, command: Command) -> bool {
        if self.is_over() {
            return false;
        }
        let applied = self.players[side.index()].command(command);
        self.route(side);
        applied
    }

    /// Drain every event routed so far
    pub fn take_events(&mut self) -> Vec<(Side, Notification)> {
        std::mem::take(&mut self.events)
    }

    fn route(&mut self, from: Side) {
        let notifications = self.players[from.index()].take_notifications();
        self.deliver(from, notifications);
    }

    fn deliver(&mut self, from: Side, notifications: Vec<Notification>) {
        for notification in notifications {
            match &notification {
                Notification::LinesCleared {
                    count, shape, x, ..
                } => {
                    self.stats[from.index()].lines_cleared += count;
                    let lines = calculate_attack_lines(*count);
                    if lines > 0 {
                        let accepted = self.players[from.opponent().index()].queue_attack_lines(
                            lines,
                            shape.clone(),
                            *x,
                        );
                        self.stats[from.index()].lines_sent += accepted;
                        info!("{:?} sends {} attack lines ({} accepted)", from, lines, accepted);
                    }
                }
                Notification::GameOver { final_score } => {
                    if self.winner.is_none() {
                        let winner = from.opponent();
                        info!("{:?} topped out at {}, {:?} wins", from, final_score, winner);
                        self.winner = Some(winner);
                        let survivor = &mut self.players[winner.index()];
                        if survivor.state() == ControllerState::Running {
                            survivor.stop();
                        }
                    }
                }
                _ => {}
            }
            self.events.push((from, notification));
        }
    }
}
