//! # Blink Controller
//!
//! Eyelid closure as a four-state machine driven by `dt`.
//!
//! ```text
//!            next blink due
//!   ┌──────┐ ─────────────▶ ┌─────────┐  0.10s   ┌────────┐  0.05s   ┌─────────┐
//!   │ Open │                │ Closing │ ───────▶ │ Closed │ ───────▶ │ Opening │
//!   └──────┘ ◀───────────── └─────────┘  0 → 1   └────────┘  hold 1  └─────────┘
//!      ▲          0.15s, 1 → 0                                            │
//!      └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The first blink comes after `U[1, 4]` s. After each blink the next one
//! is `U[2, 6]` s away, except one time in five it is a double blink 0.1 s
//! later. The wait is a countdown consumed by `dt`, so a paused caller
//! pauses blinking too and an arbitrarily long run keeps blinking.

use std::fmt;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

/// Seconds to close.
pub const CLOSE_DURATION: f32 = 0.10;
/// Seconds held shut.
pub const CLOSED_DURATION: f32 = 0.05;
/// Seconds to reopen.
pub const OPEN_DURATION: f32 = 0.15;
/// Chance that a blink is immediately followed by another.
pub const DOUBLE_BLINK_CHANCE: f64 = 0.2;
/// Gap before the second blink of a double blink.
pub const DOUBLE_BLINK_GAP: f32 = 0.1;

/// Blink state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlinkState {
    /// Eyes open, waiting for the next blink.
    Open,
    /// Lids coming down.
    Closing,
    /// Lids shut.
    Closed,
    /// Lids going up.
    Opening,
}

impl fmt::Display for BlinkState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Open => "open",
            Self::Closing => "closing",
            Self::Closed => "closed",
            Self::Opening => "opening",
        };
        f.write_str(name)
    }
}

/// Eyelid state machine. 0 is open, 1 fully closed.
#[derive(Clone, Debug)]
pub struct BlinkController {
    state: BlinkState,
    value: f32,
    /// Time spent in the current state.
    timer: f32,
    /// Seconds since creation. Only reported, never compared.
    clock: f64,
    /// Countdown to the next blink while open.
    time_to_next_blink: f32,
    blinks: u64,
    rng: ChaCha8Rng,
}

impl BlinkController {
    /// Creates a controller with eyes open.
    #[must_use]
    pub fn new(mut rng: ChaCha8Rng) -> Self {
        let time_to_next_blink = rng.gen_range(1.0..=4.0);
        Self {
            state: BlinkState::Open,
            value: 0.0,
            timer: 0.0,
            clock: 0.0,
            time_to_next_blink,
            blinks: 0,
            rng,
        }
    }

    /// Advances by `dt` seconds and returns the closure value.
    pub fn update(&mut self, dt: f32) -> f32 {
        self.clock += f64::from(dt);

        match self.state {
            BlinkState::Open => {
                self.value = 0.0;
                self.time_to_next_blink -= dt;
                if self.time_to_next_blink <= 0.0 {
                    self.enter(BlinkState::Closing);
                }
            }
            BlinkState::Closing => {
                self.timer += dt;
                let t = (self.timer / CLOSE_DURATION).min(1.0);
                self.value = t;
                if t >= 1.0 {
                    self.enter(BlinkState::Closed);
                }
            }
            BlinkState::Closed => {
                self.timer += dt;
                self.value = 1.0;
                if self.timer >= CLOSED_DURATION {
                    self.enter(BlinkState::Opening);
                }
            }
            BlinkState::Opening => {
                self.timer += dt;
                let t = (self.timer / OPEN_DURATION).min(1.0);
                self.value = 1.0 - t;
                if t >= 1.0 {
                    self.enter(BlinkState::Open);
                    self.blinks += 1;
                    self.time_to_next_blink = if self.rng.gen_bool(DOUBLE_BLINK_CHANCE) {
                        DOUBLE_BLINK_GAP
                    } else {
                        self.rng.gen_range(2.0..=6.0)
                    };
                    tracing::trace!(
                        blinks = self.blinks,
                        next_in = self.time_to_next_blink,
                        "Blink finished"
                    );
                }
            }
        }
        self.value
    }

    fn enter(&mut self, state: BlinkState) {
        self.state = state;
        self.timer = 0.0;
    }

    /// Current state.
    #[inline]
    #[must_use]
    pub const fn state(&self) -> BlinkState {
        self.state
    }

    /// Current closure, `0.0..=1.0`.
    #[inline]
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.value
    }

    /// Seconds since creation.
    #[inline]
    #[must_use]
    pub const fn clock(&self) -> f64 {
        self.clock
    }

    /// Seconds until the next blink starts. Only meaningful while open.
    #[inline]
    #[must_use]
    pub const fn time_to_next_blink(&self) -> f32 {
        self.time_to_next_blink
    }

    /// Completed blinks.
    #[inline]
    #[must_use]
    pub const fn blink_count(&self) -> u64 {
        self.blinks
    }
}
