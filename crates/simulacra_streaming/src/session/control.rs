//! # Session Control
//!
//! Commands reach the tick loop through a bounded channel and are drained
//! once per tick boundary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender};

use simulacra_motion::MotionClip;

use crate::error::{StreamError, StreamResult};

/// Capacity of the control channel.
pub const CONTROL_QUEUE_SIZE: usize = 64;

/// A command for a running session.
#[derive(Clone, Debug)]
pub enum SessionCommand {
    /// Start playing a clip from its first frame.
    Play {
        /// The clip.
        clip: Arc<MotionClip>,
        /// Restart at the end instead of falling back to idle.
        looping: bool,
    },
    /// Switch to procedural idle.
    Idle,
    /// Stop the tick loop after the current tick.
    Stop,
}

/// Cloneable handle for steering a session from another thread.
#[derive(Clone, Debug)]
pub struct SessionHandle {
    commands: Sender<SessionCommand>,
    running: Arc<AtomicBool>,
}

impl SessionHandle {
    /// Creates a handle and the receiving end the session drains.
    pub(crate) fn channel(running: Arc<AtomicBool>) -> (Self, Receiver<SessionCommand>) {
        let (commands, receiver) = bounded(CONTROL_QUEUE_SIZE);
        (Self { commands, running }, receiver)
    }

    /// Plays `clip`.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SessionClosed`] if the session is gone.
    pub fn play(&self, clip: Arc<MotionClip>, looping: bool) -> StreamResult<()> {
        self.send(SessionCommand::Play { clip, looping })
    }

    /// Switches to idle motion.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SessionClosed`] if the session is gone.
    pub fn idle(&self) -> StreamResult<()> {
        self.send(SessionCommand::Idle)
    }

    /// Asks the session to stop at the next tick boundary.
    ///
    /// Takes effect even if the command queue is full.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::SessionClosed`] if the session is gone.
    pub fn stop(&self) -> StreamResult<()> {
        self.running.store(false, Ordering::Relaxed);
        match self.commands.try_send(SessionCommand::Stop) {
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => Err(StreamError::SessionClosed),
            _ => Ok(()),
        }
    }

    /// Returns true while the session has not been stopped.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn send(&self, command: SessionCommand) -> StreamResult<()> {
        self.commands
            .send(command)
            .map_err(|_| StreamError::SessionClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commands_arrive_in_order() {
        let (handle, receiver) = SessionHandle::channel(Arc::new(AtomicBool::new(true)));
        handle.idle().unwrap();
        handle.stop().unwrap();

        assert!(matches!(receiver.try_recv(), Ok(SessionCommand::Idle)));
        assert!(matches!(receiver.try_recv(), Ok(SessionCommand::Stop)));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn test_stop_clears_running() {
        let running = Arc::new(AtomicBool::new(true));
        let (handle, _receiver) = SessionHandle::channel(Arc::clone(&running));
        assert!(handle.is_running());
        handle.stop().unwrap();
        assert!(!running.load(Ordering::Relaxed));
    }

    #[test]
    fn test_closed_session() {
        let (handle, receiver) = SessionHandle::channel(Arc::new(AtomicBool::new(true)));
        drop(receiver);
        assert!(matches!(handle.idle(), Err(StreamError::SessionClosed)));
        assert!(matches!(handle.stop(), Err(StreamError::SessionClosed)));
    }
}
