//! # Frame Sources
//!
//! Where each tick's [`Packet`] comes from: a capture clip being played
//! back, or procedural idle motion. Both fill the same packet shape, so
//! the session and encoders never care which one is active.

use std::sync::Arc;

use simulacra_motion::{BoneMap, MotionClip, Retargeter};
use simulacra_procedural::{IdleMotion, MotionSeed};
use simulacra_shared::constants::MAX_TICK_RATE;
use simulacra_shared::Packet;

/// Whether a source has more to give.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceStatus {
    /// Keep building from this source.
    Continue,
    /// The packet just built was the last one.
    Finished,
}

/// Playback of one clip.
#[derive(Clone, Debug)]
pub struct Playback {
    clip: Arc<MotionClip>,
    retarget: Retargeter,
    cursor: usize,
    looping: bool,
}

impl Playback {
    /// Resolves the bone mapping once and positions the cursor on the
    /// first frame.
    #[must_use]
    pub fn new(clip: Arc<MotionClip>, map: &BoneMap, looping: bool) -> Self {
        let retarget = Retargeter::new(&clip, map);
        tracing::debug!(
            mapped = retarget.len(),
            joints = clip.skeleton().len(),
            looping,
            "Playback prepared"
        );
        Self {
            clip,
            retarget,
            cursor: 0,
            looping,
        }
    }

    /// The clip.
    #[must_use]
    pub fn clip(&self) -> &Arc<MotionClip> {
        &self.clip
    }

    /// Index of the next frame to emit.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Whether the clip restarts at its end.
    #[inline]
    #[must_use]
    pub const fn looping(&self) -> bool {
        self.looping
    }

    /// Skips `skipped` frames, writes the next one into `packet`, and
    /// advances the cursor.
    ///
    /// A non-looping clip never skips past its last frame and reports
    /// [`SourceStatus::Finished`] once that frame has been emitted.
    pub fn build(&mut self, skipped: u32, packet: &mut Packet) -> SourceStatus {
        let len = self.clip.frame_count();
        if len == 0 {
            packet.clear();
            return SourceStatus::Finished;
        }

        self.cursor = self.cursor.saturating_add(skipped as usize);
        if self.looping {
            self.cursor %= len;
        } else {
            self.cursor = self.cursor.min(len - 1);
        }

        self.retarget.fill(&self.clip, self.cursor, packet);
        self.cursor += 1;

        if !self.looping && self.cursor >= len {
            SourceStatus::Finished
        } else {
            SourceStatus::Continue
        }
    }
}

/// The active source of motion.
#[derive(Clone, Debug)]
pub enum FrameSource {
    /// A capture clip.
    FilePlayback(Playback),
    /// Generated idle motion.
    Procedural(IdleMotion),
}

impl FrameSource {
    /// Idle motion from `seed`.
    #[must_use]
    pub fn idle(seed: MotionSeed) -> Self {
        Self::Procedural(IdleMotion::new(seed))
    }

    /// Playback of `clip`.
    #[must_use]
    pub fn playback(clip: Arc<MotionClip>, map: &BoneMap, looping: bool) -> Self {
        Self::FilePlayback(Playback::new(clip, map, looping))
    }

    /// Builds this tick's packet.
    ///
    /// `dt` is one tick; `skipped` is how many ticks the loop fell behind.
    /// Playback jumps ahead that many frames, idle motion integrates the
    /// whole span.
    pub fn build(&mut self, dt: f32, skipped: u32, packet: &mut Packet) -> SourceStatus {
        match self {
            Self::FilePlayback(playback) => playback.build(skipped, packet),
            Self::Procedural(idle) => {
                #[allow(clippy::cast_precision_loss)]
                let span = dt * (1 + skipped) as f32;
                idle.update(span).write_packet(packet);
                SourceStatus::Continue
            }
        }
    }

    /// Tick rate this source wants: the clip's frame rate, or `idle_rate`.
    /// Never above [`MAX_TICK_RATE`].
    #[must_use]
    pub fn tick_rate(&self, idle_rate: u32) -> u32 {
        let rate = match self {
            Self::FilePlayback(playback) => playback.clip.frame_rate(),
            Self::Procedural(_) => idle_rate,
        };
        rate.min(MAX_TICK_RATE)
    }

    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::FilePlayback(_) => "playback",
            Self::Procedural(_) => "idle",
        }
    }
}
