//! Session lifecycle: generate -> configure -> ready -> play/stop ->
//! regenerate.
//!
//! The manager owns the ordering guarantee that at most one session's audio
//! resources exist at a time. Every generation first retires the previous
//! session (dispose before configure), and every failure path lands back in
//! a clean unconfigured state - no orphaned voices, no dangling
//! registrations, no half-configured scheduler.

use crate::engine::context::AudioContext;
use crate::engine::monitor::{monitor_channel, MonitorRx};
use crate::engine::{new_core_slot, CoreSlot, PlaybackCore, Result, Scheduler};
use crate::io::source::{GenerateRequest, ScoreArtifact, ScoreSource};
use crate::io::midi;
use crate::voices::VoicePool;

enum Output {
    /// Real device; acquired lazily on the first generate.
    Device(Option<AudioContext>),
    /// No device - offline rendering and tests drive render_block directly.
    Offline { sample_rate: f32 },
}

pub struct SessionManager {
    slot: CoreSlot,
    output: Output,
    monitor_rx: Option<MonitorRx>,
    artifact: Option<ScoreArtifact>,
}

impl SessionManager {
    /// A manager that plays through the default output device.
    pub fn new() -> Self {
        Self {
            slot: new_core_slot(),
            output: Output::Device(None),
            monitor_rx: None,
            artifact: None,
        }
    }

    /// A manager with no audio device. The caller drives playback by
    /// calling [`SessionManager::render_block`] at its own pace.
    pub fn offline(sample_rate: f32) -> Self {
        Self {
            slot: new_core_slot(),
            output: Output::Offline { sample_rate },
            monitor_rx: None,
            artifact: None,
        }
    }

    /// Run one full generation cycle: retire the previous session, ensure
    /// the shared output, fetch a fresh artifact, decode it, and install a
    /// fresh voice pool + configured scheduler. On success the session is
    /// ready (stopped); on any error the state is clean and unconfigured.
    pub fn generate(
        &mut self,
        source: &mut dyn ScoreSource,
        request: &GenerateRequest,
    ) -> Result<()> {
        // Dispose before configure: no two sessions' events may ever fire
        // concurrently, so the old core goes away before anything can fail.
        self.dispose();

        let sample_rate = self.ensure_output()?;
        let artifact = source.generate(request)?;
        let score = midi::parse_score(&artifact.bytes)?;

        let pool = VoicePool::new(sample_rate);
        let mut scheduler = Scheduler::new(sample_rate);
        scheduler.configure(&score, request.bpm);

        *self.slot.lock().unwrap() = Some(PlaybackCore::new(scheduler, pool));
        self.artifact = Some(artifact);

        tracing::debug!(style = %request.style, bpm = request.bpm, "session ready");
        Ok(())
    }

    /// Start looping playback. No-op until a generation has succeeded.
    pub fn play(&mut self) {
        if let Some(core) = self.slot.lock().unwrap().as_mut() {
            core.scheduler.start();
        }
    }

    /// Halt dispatch, letting sounding envelopes release. No-op when
    /// already stopped or not ready.
    pub fn stop(&mut self) {
        if let Some(core) = self.slot.lock().unwrap().as_mut() {
            core.scheduler.stop();
        }
    }

    /// Tear down the active session: cancel every registration and dispose
    /// every voice, atomically from the audio callback's point of view.
    /// Idempotent; the output context (if any) stays alive for reuse.
    pub fn dispose(&mut self) {
        if let Some(mut core) = self.slot.lock().unwrap().take() {
            core.dispose();
        }
    }

    /// True once a generation has succeeded and playback controls work.
    pub fn is_ready(&self) -> bool {
        self.slot.lock().unwrap().is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.slot
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|core| core.scheduler.is_playing())
    }

    /// The last fetched artifact, byte-for-byte as the collaborator
    /// returned it. This crate only ever parses a copy.
    pub fn download(&self) -> Option<&ScoreArtifact> {
        self.artifact.as_ref()
    }

    /// Take the monitor receiver for the UI thread. Device output only;
    /// offline callers can inspect state synchronously.
    pub fn take_monitor(&mut self) -> Option<MonitorRx> {
        self.monitor_rx.take()
    }

    /// Render the next block through the active session (silence when there
    /// is none). The offline counterpart of the audio callback.
    pub fn render_block(&mut self, out: &mut [f32]) {
        let mut guard = self.slot.lock().unwrap();
        match guard.as_mut() {
            Some(core) => core.process(out),
            None => out.fill(0.0),
        }
    }

    /// Loop-local playhead and transport snapshot for offline callers.
    pub fn transport(&self) -> Option<crate::engine::TransportState> {
        self.slot
            .lock()
            .unwrap()
            .as_ref()
            .map(|core| *core.scheduler.transport())
    }

    /// Synchronous monitor frame for offline callers (device users get the
    /// same data through the monitor ring instead).
    pub fn snapshot(&self) -> Option<crate::engine::MonitorFrame> {
        self.slot.lock().unwrap().as_ref().map(PlaybackCore::snapshot)
    }

    fn ensure_output(&mut self) -> Result<f32> {
        match &mut self.output {
            Output::Offline { sample_rate } => Ok(*sample_rate),
            Output::Device(ctx @ None) => {
                let (tx, rx) = monitor_channel();
                let acquired = AudioContext::acquire(self.slot.clone(), Some(tx))?;
                let sample_rate = acquired.sample_rate();
                *ctx = Some(acquired);
                self.monitor_rx = Some(rx);
                Ok(sample_rate)
            }
            Output::Device(Some(ctx)) => Ok(ctx.sample_rate()),
        }
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::EngineError;
    use crate::io::source::StylePreset;

    struct FailingSource;

    impl ScoreSource for FailingSource {
        fn generate(&mut self, _request: &GenerateRequest) -> Result<ScoreArtifact> {
            Err(EngineError::Fetch("service unavailable".into()))
        }
    }

    struct GarbageSource;

    impl ScoreSource for GarbageSource {
        fn generate(&mut self, _request: &GenerateRequest) -> Result<ScoreArtifact> {
            Ok(ScoreArtifact {
                bytes: b"definitely not midi".to_vec(),
                filename: "broken.mid".into(),
            })
        }
    }

    fn request() -> GenerateRequest {
        GenerateRequest {
            style: StylePreset::BoomBap,
            bpm: 90,
            bars: 4,
            chords: true,
        }
    }

    #[test]
    fn fetch_failure_leaves_a_clean_unconfigured_state() {
        let mut manager = SessionManager::offline(1_000.0);
        let err = manager.generate(&mut FailingSource, &request()).unwrap_err();

        assert!(matches!(err, EngineError::Fetch(_)));
        assert!(!manager.is_ready());
        assert!(manager.download().is_none());

        // Controls stay defensive no-ops
        manager.play();
        assert!(!manager.is_playing());
    }

    #[test]
    fn parse_failure_leaves_a_clean_unconfigured_state() {
        let mut manager = SessionManager::offline(1_000.0);
        let err = manager.generate(&mut GarbageSource, &request()).unwrap_err();

        assert!(matches!(err, EngineError::Parse(_)));
        assert!(!manager.is_ready());
    }

    #[test]
    fn dispose_without_a_session_is_a_no_op() {
        let mut manager = SessionManager::offline(1_000.0);
        manager.dispose();
        manager.dispose();
        assert!(!manager.is_ready());
    }
}
