//! # Streaming Session
//!
//! One tick loop drives everything, in a fixed order per tick:
//!
//! 1. drain control commands
//! 2. accept-check (text: drop a dead peer, accept a new one)
//! 3. build the packet from the active source
//! 4. encode and write it
//!
//! Sockets are polled, never awaited, so a tick never blocks. A lost peer
//! puts the session back to listening; nothing after startup is fatal.
//!
//! ## Threading
//!
//! The session runs on whichever thread calls [`StreamingSession::run`].
//! Other threads steer it through a [`SessionHandle`]; the only state that
//! crosses over is an immutable `Arc<MotionClip>`.

pub mod connection;
pub mod control;
pub mod sink;
pub mod tick;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;

use simulacra_motion::{BoneMap, MotionClip};
use simulacra_procedural::MotionSeed;
use simulacra_shared::Packet;

pub use connection::{PeerState, TextPeer, WriteOutcome};
pub use control::{SessionCommand, SessionHandle, CONTROL_QUEUE_SIZE};
pub use sink::{BinarySink, Sink, TextSink};
pub use tick::{TickInfo, TickLoop, TickStats};

use crate::config::{Protocol, SimulacraConfig};
use crate::error::StreamResult;
use crate::source::{FrameSource, SourceStatus};

/// How often [`StreamingSession::run`] logs statistics.
pub const STATS_INTERVAL: Duration = Duration::from_secs(5);

/// Session counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Ticks executed.
    pub ticks: u64,
    /// Tick budgets collapsed into later ticks.
    pub skipped_ticks: u64,
    /// Text records written (fully or with a pending tail).
    pub records_written: u64,
    /// Text records discarded.
    pub records_dropped: u64,
    /// Peers accepted.
    pub connects: u64,
    /// Peers lost.
    pub disconnects: u64,
    /// Datagrams sent.
    pub datagrams_sent: u64,
    /// Datagrams dropped.
    pub datagrams_dropped: u64,
    /// Clips that played to their end.
    pub clips_finished: u64,
}

/// A running stream: one sink, one source, one tick loop.
pub struct StreamingSession {
    sink: Sink,
    source: FrameSource,
    packet: Packet,
    tick_loop: TickLoop,
    control: Receiver<SessionCommand>,
    running: Arc<AtomicBool>,
    bone_map: BoneMap,
    seed: MotionSeed,
    idle_rate: u32,
    stats: SessionStats,
}

impl StreamingSession {
    /// Binds the configured socket and starts in idle motion.
    ///
    /// # Errors
    ///
    /// Returns [`crate::StreamError::Bind`] if the socket cannot be bound
    /// and [`crate::StreamError::Config`] for invalid addresses or aliases.
    pub fn new(config: &SimulacraConfig) -> StreamResult<(Self, SessionHandle)> {
        config.validate()?;
        let bind = config.bind_addr()?;
        let sink = match config.stream.protocol {
            Protocol::Text => Sink::Text(TextSink::bind(bind, &config.device)?),
            Protocol::Binary => Sink::Binary(BinarySink::bind(
                bind,
                config.destination_addr()?,
                config.stream.skeleton_interval,
            )?),
        };

        let running = Arc::new(AtomicBool::new(true));
        let (handle, control) = SessionHandle::channel(Arc::clone(&running));
        let seed = config.motion_seed();
        let idle_rate = config.stream.tick_rate;

        let session = Self {
            sink,
            source: FrameSource::idle(seed),
            packet: Packet::with_capacity(simulacra_shared::BONE_COUNT),
            tick_loop: TickLoop::new(idle_rate),
            control,
            running,
            bone_map: config.bone_map()?,
            seed,
            idle_rate,
            stats: SessionStats::default(),
        };
        Ok((session, handle))
    }

    /// Local socket address.
    #[must_use]
    pub const fn local_addr(&self) -> std::net::SocketAddr {
        self.sink.local_addr()
    }

    /// Text peer state; `None` for the binary protocol.
    #[must_use]
    pub const fn peer_state(&self) -> Option<PeerState> {
        self.sink.peer_state()
    }

    /// The active source.
    #[must_use]
    pub const fn source(&self) -> &FrameSource {
        &self.source
    }

    /// The packet built by the last tick.
    #[must_use]
    pub const fn last_packet(&self) -> &Packet {
        &self.packet
    }

    /// Session counters.
    #[must_use]
    pub const fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Tick timing.
    #[must_use]
    pub const fn tick_stats(&self) -> &TickStats {
        self.tick_loop.stats()
    }

    /// Current tick duration.
    #[must_use]
    pub const fn tick_duration(&self) -> Duration {
        self.tick_loop.tick_duration()
    }

    /// Returns true until stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Switches to playing `clip` at its own frame rate.
    pub fn play(&mut self, clip: Arc<MotionClip>, looping: bool) {
        self.source = FrameSource::playback(clip, &self.bone_map, looping);
        self.tick_loop.set_rate(self.source.tick_rate(self.idle_rate));
        tracing::info!(tick_rate = self.source.tick_rate(self.idle_rate), looping, "Playing clip");
    }

    /// Switches to idle motion at the configured rate.
    pub fn idle(&mut self) {
        self.source = FrameSource::idle(self.seed);
        self.tick_loop.set_rate(self.idle_rate);
        tracing::info!(tick_rate = self.idle_rate, "Idle motion");
    }

    /// Stops the loop after the current tick.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    /// Runs one tick. `skipped` is how many tick budgets were missed
    /// before it.
    pub fn tick(&mut self, skipped: u32) {
        self.drain_control();

        self.sink.poll_connection(&mut self.stats);

        let dt = self.tick_loop.tick_duration().as_secs_f32();
        let status = self.source.build(dt, skipped, &mut self.packet);

        self.sink.deliver(&self.packet, &mut self.stats);

        self.stats.ticks += 1;
        self.stats.skipped_ticks += u64::from(skipped);

        if status == SourceStatus::Finished {
            tracing::info!(source = self.source.kind(), "Clip finished");
            self.stats.clips_finished += 1;
            self.idle();
        }
    }

    /// Runs the tick loop until stopped or until `duration` has elapsed.
    pub fn run(&mut self, duration: Option<Duration>) {
        let started = Instant::now();
        let mut last_report = started;
        tracing::info!(
            addr = %self.local_addr(),
            tick_rate = self.idle_rate,
            "Session running"
        );

        let expired = || duration.is_some_and(|d| started.elapsed() >= d);

        while self.is_running() && !expired() {
            self.tick_loop.wait_for_next_tick();
            while self.tick_loop.should_tick() && self.is_running() && !expired() {
                let info = self.tick_loop.begin_tick();
                self.tick(info.skipped);
                self.tick_loop.end_tick(info);
            }

            if last_report.elapsed() >= STATS_INTERVAL {
                self.log_stats();
                last_report = Instant::now();
            }
        }

        self.running.store(false, Ordering::Relaxed);
        self.log_stats();
        tracing::info!(elapsed_s = started.elapsed().as_secs_f32(), "Session stopped");
    }

    /// Logs counters and tick timing.
    pub fn log_stats(&self) {
        let s = &self.stats;
        let t = self.tick_loop.stats();
        tracing::info!(
            ticks = s.ticks,
            skipped = s.skipped_ticks,
            late = t.late_ticks,
            avg_tick_us = t.avg_tick_us,
            max_tick_us = t.max_tick_us,
            records_written = s.records_written,
            records_dropped = s.records_dropped,
            connects = s.connects,
            disconnects = s.disconnects,
            datagrams_sent = s.datagrams_sent,
            datagrams_dropped = s.datagrams_dropped,
            source = self.source.kind(),
            "Session stats"
        );
    }

    fn drain_control(&mut self) {
        while let Ok(command) = self.control.try_recv() {
            match command {
                SessionCommand::Play { clip, looping } => self.play(clip, looping),
                SessionCommand::Idle => self.idle(),
                SessionCommand::Stop => self.stop(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_config() -> SimulacraConfig {
        let mut config = SimulacraConfig::default();
        config.stream.bind = Some("127.0.0.1:0".to_owned());
        config
    }

    const CLIP: &str = "HIERARCHY
ROOT Hips
{
  OFFSET 0 0 0
  CHANNELS 6 Xposition Yposition Zposition Zrotation Xrotation Yrotation
}
MOTION
Frames: 2
Frame Time: 0.02
0 1 0 0 0 0
0 1 0 0 0 0
";

    #[test]
    fn test_starts_listening_in_idle() {
        let (session, handle) = StreamingSession::new(&text_config()).unwrap();
        assert_eq!(session.peer_state(), Some(PeerState::Listening));
        assert_eq!(session.source().kind(), "idle");
        assert!(session.is_running());
        assert!(handle.is_running());
    }

    #[test]
    fn test_tick_without_peer() {
        let (mut session, _handle) = StreamingSession::new(&text_config()).unwrap();
        session.tick(0);
        assert_eq!(session.stats().ticks, 1);
        assert_eq!(session.stats().records_written, 0);
        assert_eq!(session.last_packet().bones.len(), 5);
    }

    #[test]
    fn test_play_finishes_into_idle() {
        let (mut session, handle) = StreamingSession::new(&text_config()).unwrap();
        let clip = Arc::new(MotionClip::parse(CLIP).unwrap());
        handle.play(clip, false).unwrap();

        session.tick(0);
        assert_eq!(session.source().kind(), "playback");
        assert_eq!(session.tick_duration(), Duration::from_millis(20));

        session.tick(0);
        assert_eq!(session.source().kind(), "idle");
        assert_eq!(session.stats().clips_finished, 1);
        assert_eq!(session.tick_duration(), Duration::from_micros(16666));
    }

    #[test]
    fn test_stop_ends_run() {
        let (mut session, handle) = StreamingSession::new(&text_config()).unwrap();
        handle.stop().unwrap();
        session.run(Some(Duration::from_secs(5)));
        assert!(!session.is_running());
    }

    #[test]
    fn test_run_for_duration() {
        let (mut session, _handle) = StreamingSession::new(&text_config()).unwrap();
        session.run(Some(Duration::from_millis(100)));
        assert!(session.stats().ticks >= 3);
        assert!(!session.is_running());
    }

    #[test]
    fn test_run_for_duration_with_fast_clip() {
        let text = CLIP.replace("Frame Time: 0.02", "Frame Time: 0.0000001");
        let clip = Arc::new(MotionClip::parse(&text).unwrap());
        let (mut session, handle) = StreamingSession::new(&text_config()).unwrap();
        handle.play(clip, true).unwrap();

        let started = Instant::now();
        session.run(Some(Duration::from_millis(100)));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(session.source().kind(), "playback");
        assert_eq!(session.tick_duration(), Duration::from_millis(1));
    }

    #[test]
    fn test_bind_conflict_is_fatal() {
        let (first, _handle) = StreamingSession::new(&text_config()).unwrap();
        let mut config = text_config();
        config.stream.bind = Some(first.local_addr().to_string());
        assert!(matches!(
            StreamingSession::new(&config),
            Err(crate::StreamError::Bind { .. })
        ));
    }
}
