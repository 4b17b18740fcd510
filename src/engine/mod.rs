//! The playback engine: routing, scheduling, session lifecycle, and the
//! shared audio output context.

pub mod context;
pub mod monitor;
pub mod routing;
pub mod scheduler;
pub mod session;

use std::sync::{Arc, Mutex};

pub use monitor::{MonitorFrame, MonitorRx};
pub use scheduler::{Scheduler, TransportState, TriggerRegistration};
pub use session::SessionManager;

use crate::voices::{VoiceKind, VoicePool};

/// Result alias carrying the engine's [`EngineError`] type.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Everything that can go wrong on the way to a ready session. All variants
/// are recovered at the session-manager boundary, which guarantees a clean
/// unconfigured state before re-raising.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The shared audio output context could not be started (environment
    /// precondition unmet, e.g. no output device).
    #[error("audio output unavailable: {0}")]
    Acquisition(String),
    /// The generation collaborator failed or returned a non-success result.
    #[error("score generation failed: {0}")]
    Fetch(String),
    /// The returned artifact could not be decoded into a score.
    #[error("could not decode score: {0}")]
    Parse(String),
}

impl From<midly::Error> for EngineError {
    fn from(err: midly::Error) -> Self {
        Self::Parse(err.to_string())
    }
}

/// One session's audio resources: a configured scheduler and its voice
/// pool. Lives inside the shared [`CoreSlot`]; swapping the slot contents
/// is the atomic session boundary.
pub struct PlaybackCore {
    pub scheduler: Scheduler,
    pub pool: VoicePool,
}

impl PlaybackCore {
    pub fn new(scheduler: Scheduler, pool: VoicePool) -> Self {
        Self { scheduler, pool }
    }

    /// One audio-callback step: fire due triggers, then render the mix.
    /// Rendering continues while stopped so release tails ring out.
    pub fn process(&mut self, out: &mut [f32]) {
        self.scheduler.process_block(out.len(), &mut self.pool);
        self.pool.render(out);
    }

    pub fn dispose(&mut self) {
        self.scheduler.dispose_all(&mut self.pool);
    }

    pub fn snapshot(&self) -> MonitorFrame {
        let mut active_notes = [0u8; 6];
        for (slot, kind) in active_notes.iter_mut().zip(VoiceKind::ALL) {
            *slot = self.pool.voice(kind).active_notes().min(u8::MAX as usize) as u8;
        }
        MonitorFrame {
            position_secs: self.scheduler.position_secs(),
            loop_end_secs: self.scheduler.transport().loop_end,
            is_playing: self.scheduler.is_playing(),
            active_notes,
        }
    }
}

/// The single shared handle between the session manager and the audio
/// callback. Exactly one session's core may live here at a time; the
/// manager is the only writer, the callback only reads through the lock.
pub type CoreSlot = Arc<Mutex<Option<PlaybackCore>>>;

pub fn new_core_slot() -> CoreSlot {
    Arc::new(Mutex::new(None))
}
