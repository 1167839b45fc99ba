//! Animation sequencer
//!
//! Named animation channels gate board mutation: an effect is requested
//! together with its completion value, the sequencer holds it for the
//! channel's fixed delay, then hands the completion back to the caller,
//! which is the only place the effect's mutation happens. At most one
//! channel is active at a time.
//!
//! Time is virtual. The owner feeds elapsed milliseconds through
//! [`AnimationSequencer::advance`] and drains due events with
//! [`AnimationSequencer::poll`], on its own thread.

use serde::Serialize;
use tracing::debug;

/// Line flash before rows are removed
pub const LINE_FLASH_DELAY_MS: u32 = 120;
/// Flash before the whole interior is wiped
pub const FULL_CLEAR_DELAY_MS: u32 = 140;
/// Flash before the 5x5 explosions
pub const AREA_CLEAR_DELAY_MS: u32 = 140;
/// Interval between drill steps
pub const DRILL_PERIOD_MS: u32 = 60;

/// Animation channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Channel {
    LineFlash,
    FullClear,
    AreaClear,
    Drill,
}

impl Channel {
    /// Fixed delay (or period, for the drill) of this channel
    pub fn delay_ms(&self) -> u32 {
        match self {
            Channel::LineFlash => LINE_FLASH_DELAY_MS,
            Channel::FullClear => FULL_CLEAR_DELAY_MS,
            Channel::AreaClear => AREA_CLEAR_DELAY_MS,
            Channel::Drill => DRILL_PERIOD_MS,
        }
    }
}

/// What is currently animating, as seen by renderers
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub enum AnimationState {
    #[default]
    Idle,
    LineFlash {
        rows: Vec<usize>,
        black_phase: bool,
    },
    FullClear {
        black_phase: bool,
    },
    AreaClear {
        centers: Vec<(usize, usize)>,
        black_phase: bool,
    },
    Drill,
}

impl AnimationState {
    pub fn channel(&self) -> Option<Channel> {
        match self {
            AnimationState::Idle => None,
            AnimationState::LineFlash { .. } => Some(Channel::LineFlash),
            AnimationState::FullClear { .. } => Some(Channel::FullClear),
            AnimationState::AreaClear { .. } => Some(Channel::AreaClear),
            AnimationState::Drill => Some(Channel::Drill),
        }
    }
}

/// A one-shot animation request with its payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnimationRequest {
    LineFlash(Vec<usize>),
    FullClear,
    AreaClear(Vec<(usize, usize)>),
}

impl AnimationRequest {
    pub fn channel(&self) -> Channel {
        match self {
            AnimationRequest::LineFlash(_) => Channel::LineFlash,
            AnimationRequest::FullClear => Channel::FullClear,
            AnimationRequest::AreaClear(_) => Channel::AreaClear,
        }
    }

    fn is_empty(&self) -> bool {
        match self {
            AnimationRequest::LineFlash(rows) => rows.is_empty(),
            AnimationRequest::FullClear => false,
            AnimationRequest::AreaClear(centers) => centers.is_empty(),
        }
    }

    /// Active state with the black phase set
    fn into_state(self) -> AnimationState {
        match self {
            AnimationRequest::LineFlash(rows) => AnimationState::LineFlash {
                rows,
                black_phase: true,
            },
            AnimationRequest::FullClear => AnimationState::FullClear { black_phase: true },
            AnimationRequest::AreaClear(centers) => AnimationState::AreaClear {
                centers,
                black_phase: true,
            },
        }
    }
}

/// Outcome of [`AnimationSequencer::start`]
#[derive(Debug, PartialEq, Eq)]
#[must_use]
pub enum Started<C> {
    /// The channel is running; the completion comes back through `poll`
    Scheduled,
    /// Nothing was scheduled (busy or empty payload): run the completion
    /// now, without applying the effect
    Immediate(C),
}

/// A due timer event
#[derive(Debug, PartialEq, Eq)]
pub enum Fired<C> {
    /// A one-shot channel finished; the sequencer is idle again
    Completed(C),
    /// One drill period elapsed; the drill keeps running until stopped
    DrillStep,
}

#[derive(Debug)]
enum Timer<C> {
    OneShot { delay_ms: u32, on_complete: C },
    Repeating { period_ms: u32 },
}

#[derive(Debug)]
struct Active<C> {
    state: AnimationState,
    elapsed_ms: u32,
    timer: Timer<C>,
}

/// Timer-driven single-channel animation gate
#[derive(Debug)]
pub struct AnimationSequencer<C> {
    active: Option<Active<C>>,
}

impl<C> Default for AnimationSequencer<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> AnimationSequencer<C> {
    pub fn new() -> Self {
        Self { active: None }
    }

    /// True while any channel is active
    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_channel(&self) -> Option<Channel> {
        self.active.as_ref().and_then(|a| a.state.channel())
    }

    pub fn state(&self) -> AnimationState {
        self.active
            .as_ref()
            .map(|a| a.state.clone())
            .unwrap_or_default()
    }

    /// Start a one-shot channel. If another channel is active, or the payload
    /// is empty, the request is dropped and the completion is handed straight back.
    pub fn start(&mut self, request: AnimationRequest, on_complete: C) -> Started<C> {
        let channel = request.channel();
        if let Some(active) = &self.active {
            debug!(
                "Dropping {:?} request, {:?} is still active",
                channel,
                active.state.channel()
            );
            return Started::Immediate(on_complete);
        }
        if request.is_empty() {
            debug!("Empty {:?} request, completing immediately", channel);
            return Started::Immediate(on_complete);
        }
        debug!("Starting {:?} for {}ms", channel, channel.delay_ms());
        self.active = Some(Active {
            state: request.into_state(),
            elapsed_ms: 0,
            timer: Timer::OneShot {
                delay_ms: channel.delay_ms(),
                on_complete,
            },
        });
        Started::Scheduled
    }

    /// Start the repeating drill channel. Returns false if another channel is active.
    pub fn start_drill(&mut self) -> bool {
        if self.active.is_some() {
            debug!("Dropping drill request, a channel is still active");
            return false;
        }
        debug!("Starting drill every {}ms", DRILL_PERIOD_MS);
        self.active = Some(Active {
            state: AnimationState::Drill,
            elapsed_ms: 0,
            timer: Timer::Repeating {
                period_ms: DRILL_PERIOD_MS,
            },
        });
        true
    }

    /// Cancel the drill without completing anything. Other channels cannot be
    /// stopped this way; returns whether a channel was stopped.
    pub fn stop(&mut self, channel: Channel) -> bool {
        if channel != Channel::Drill || self.active_channel() != Some(Channel::Drill) {
            debug!("Ignoring stop for {:?}", channel);
            return false;
        }
        self.active = None;
        true
    }

    /// Drop every timer (pending completions are discarded)
    pub fn cancel_all(&mut self) {
        if let Some(active) = self.active.take() {
            debug!("Cancelled {:?}", active.state.channel());
        }
    }

    /// Let `delta_ms` of virtual time pass
    pub fn advance(&mut self, delta_ms: u32) {
        if let Some(active) = &mut self.active {
            active.elapsed_ms = active.elapsed_ms.saturating_add(delta_ms);
        }
    }

    /// Pop the next due event, if any. Call repeatedly until it returns None.
    pub fn poll(&mut self) -> Option<Fired<C>> {
        let active = self.active.as_mut()?;
        match active.timer {
            Timer::Repeating { period_ms } => {
                if active.elapsed_ms < period_ms {
                    return None;
                }
                active.elapsed_ms -= period_ms;
                Some(Fired::DrillStep)
            }
            Timer::OneShot { delay_ms, .. } => {
                if active.elapsed_ms < delay_ms {
                    return None;
                }
                let finished = self.active.take()?;
                match finished.timer {
                    Timer::OneShot { on_complete, .. } => Some(Fired::Completed(on_complete)),
                    Timer::Repeating { .. } => None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_shot_completes_after_delay() {
        let mut seq = AnimationSequencer::new();
        assert_eq!(
            seq.start(AnimationRequest::LineFlash(vec![21, 20]), "clear"),
            Started::Scheduled
        );
        assert!(seq.is_busy());
        assert_eq!(
            seq.state(),
            AnimationState::LineFlash {
                rows: vec![21, 20],
                black_phase: true
            }
        );

        seq.advance(LINE_FLASH_DELAY_MS - 1);
        assert_eq!(seq.poll(), None);
        seq.advance(1);
        assert_eq!(seq.poll(), Some(Fired::Completed("clear")));
        assert!(!seq.is_busy());
        assert_eq!(seq.state(), AnimationState::Idle);
        assert_eq!(seq.poll(), None);
    }

    #[test]
    fn test_second_request_completes_immediately() {
        let mut seq = AnimationSequencer::new();
        assert_eq!(
            seq.start(AnimationRequest::LineFlash(vec![21]), 1),
            Started::Scheduled
        );
        assert_eq!(
            seq.start(AnimationRequest::AreaClear(vec![(10, 5)]), 2),
            Started::Immediate(2)
        );
        // The first channel is still pending
        assert_eq!(seq.active_channel(), Some(Channel::LineFlash));
        seq.advance(LINE_FLASH_DELAY_MS);
        assert_eq!(seq.poll(), Some(Fired::Completed(1)));
    }

    #[test]
    fn test_empty_payload_completes_immediately() {
        let mut seq = AnimationSequencer::new();
        assert_eq!(
            seq.start(AnimationRequest::LineFlash(Vec::new()), ()),
            Started::Immediate(())
        );
        assert!(!seq.is_busy());
    }

    #[test]
    fn test_full_clear_delay() {
        let mut seq = AnimationSequencer::new();
        assert_eq!(seq.start(AnimationRequest::FullClear, 7), Started::Scheduled);
        seq.advance(LINE_FLASH_DELAY_MS);
        assert_eq!(seq.poll(), None);
        seq.advance(FULL_CLEAR_DELAY_MS - LINE_FLASH_DELAY_MS);
        assert_eq!(seq.poll(), Some(Fired::Completed(7)));
    }

    #[test]
    fn test_drill_repeats_until_stopped() {
        let mut seq: AnimationSequencer<()> = AnimationSequencer::new();
        assert!(seq.start_drill());
        assert!(!seq.start_drill());
        seq.advance(DRILL_PERIOD_MS * 2 + 10);
        assert_eq!(seq.poll(), Some(Fired::DrillStep));
        assert_eq!(seq.poll(), Some(Fired::DrillStep));
        assert_eq!(seq.poll(), None);
        assert!(seq.is_busy());

        assert!(!seq.stop(Channel::LineFlash));
        assert!(seq.stop(Channel::Drill));
        assert!(!seq.is_busy());
        seq.advance(DRILL_PERIOD_MS);
        assert_eq!(seq.poll(), None);
    }

    #[test]
    fn test_stop_does_not_cancel_one_shot() {
        let mut seq = AnimationSequencer::new();
        assert_eq!(seq.start(AnimationRequest::FullClear, 'x'), Started::Scheduled);
        assert!(!seq.stop(Channel::Drill));
        assert!(seq.is_busy());
        seq.cancel_all();
        assert!(!seq.is_busy());
    }
}
