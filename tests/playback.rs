//! End-to-end playback tests: SMF bytes through the parser, routing table,
//! scheduler and voice pool, plus the session lifecycle around them.

use midly::{
    num::{u15, u24, u28, u4, u7},
    Format, Header, MetaMessage, MidiMessage, Smf, Timing, TrackEvent, TrackEventKind,
};

use beatloop::engine::routing::MIN_HAT_SUSTAIN;
use beatloop::engine::{EngineError, Scheduler, SessionManager};
use beatloop::io::{parse_score, GenerateRequest, ScoreArtifact, ScoreSource};
use beatloop::voices::{VoiceKind, VoicePool};

const SAMPLE_RATE: f32 = 1_000.0;
const PPQ: u16 = 480;

// --- SMF construction helpers -------------------------------------------

struct NoteSpec {
    channel: u8,
    key: u8,
    vel: u8,
    /// Start and duration in ticks (480 per beat, 120 bpm -> 960 per second)
    start: u32,
    len: u32,
}

fn encode(notes: &[NoteSpec]) -> Vec<u8> {
    // Absolute events, note-offs ordered before note-ons at the same tick
    let mut events: Vec<(u32, u8, TrackEventKind<'static>)> = Vec::new();
    for spec in notes {
        events.push((
            spec.start,
            1,
            TrackEventKind::Midi {
                channel: u4::from(spec.channel),
                message: MidiMessage::NoteOn {
                    key: u7::from(spec.key),
                    vel: u7::from(spec.vel),
                },
            },
        ));
        events.push((
            spec.start + spec.len,
            0,
            TrackEventKind::Midi {
                channel: u4::from(spec.channel),
                message: MidiMessage::NoteOff {
                    key: u7::from(spec.key),
                    vel: u7::from(0_u8),
                },
            },
        ));
    }
    events.sort_by_key(|(tick, order, _)| (*tick, *order));

    let mut track = vec![TrackEvent {
        delta: u28::from(0_u32),
        kind: TrackEventKind::Meta(MetaMessage::Tempo(u24::from(500_000_u32))),
    }];
    let mut previous = 0u32;
    for (tick, _, kind) in events {
        track.push(TrackEvent {
            delta: u28::from(tick - previous),
            kind,
        });
        previous = tick;
    }
    track.push(TrackEvent {
        delta: u28::from(0_u32),
        kind: TrackEventKind::Meta(MetaMessage::EndOfTrack),
    });

    let header = Header {
        format: Format::Parallel,
        timing: Timing::Metrical(u15::from(PPQ)),
    };
    let mut bytes = Vec::new();
    Smf {
        header,
        tracks: vec![track],
    }
    .write_std(&mut bytes)
    .unwrap();
    bytes
}

struct InMemorySource {
    bytes: Vec<u8>,
}

impl ScoreSource for InMemorySource {
    fn generate(&mut self, _request: &GenerateRequest) -> beatloop::engine::Result<ScoreArtifact> {
        Ok(ScoreArtifact {
            bytes: self.bytes.clone(),
            filename: "CrimsonEcho_Boombap_CDorian_90_X42.mid".into(),
        })
    }
}

// --- end-to-end examples -------------------------------------------------

#[test]
fn kick_fires_at_zero_and_hat_duration_is_clamped() {
    // Kick (36) at t=0 for 0.1s, closed hat (42) at t=0.5s for 0.01s
    let bytes = encode(&[
        NoteSpec {
            channel: 9,
            key: 36,
            vel: 127,
            start: 0,
            len: 96,
        },
        NoteSpec {
            channel: 9,
            key: 42,
            vel: 100,
            start: 480,
            len: 10,
        },
    ]);
    let score = parse_score(&bytes).unwrap();

    let mut scheduler = Scheduler::new(SAMPLE_RATE);
    let mut pool = VoicePool::new(SAMPLE_RATE);
    scheduler.configure(&score, 120);
    scheduler.start();

    // First sample: the kick fires with its own duration
    scheduler.process_block(1, &mut pool);
    let kick = pool.voice(VoiceKind::Kick).last_trigger().unwrap();
    assert!((kick.duration - 0.1).abs() < 1e-9);
    assert!(pool.voice(VoiceKind::HiHat).last_trigger().is_none());

    // Cross t=0.5s: the hat fires, clamped up to the sustain floor
    scheduler.process_block(520, &mut pool);
    let hat = pool.voice(VoiceKind::HiHat).last_trigger().unwrap();
    assert!((hat.duration - MIN_HAT_SUSTAIN).abs() < 1e-9);
    assert!(hat.pitch_name.is_none(), "hat triggers are unpitched");
}

#[test]
fn bass_note_and_simultaneous_chord_notes_coexist() {
    // Bass E2 at t=1.0 for 0.5s; two chord notes at the same instant
    let bytes = encode(&[
        NoteSpec {
            channel: 0,
            key: 40,
            vel: 100,
            start: 960,
            len: 480,
        },
        NoteSpec {
            channel: 2,
            key: 60,
            vel: 90,
            start: 960,
            len: 480,
        },
        NoteSpec {
            channel: 2,
            key: 64,
            vel: 90,
            start: 960,
            len: 480,
        },
    ]);
    let score = parse_score(&bytes).unwrap();

    let mut scheduler = Scheduler::new(SAMPLE_RATE);
    let mut pool = VoicePool::new(SAMPLE_RATE);
    scheduler.configure(&score, 120);
    scheduler.start();

    scheduler.process_block(1_050, &mut pool);

    let bass = pool.voice(VoiceKind::Bass);
    assert_eq!(bass.active_notes(), 1);
    assert_eq!(
        bass.last_trigger().unwrap().pitch_name.as_deref(),
        Some("E2")
    );

    // Both chord notes sound together - no preemption between them
    assert_eq!(pool.voice(VoiceKind::Chord).active_notes(), 2);
}

#[test]
fn percussion_fallback_plays_a_sound_for_every_note() {
    // Snare (38) and clap (39): neither is kick or hat, both must sound
    let bytes = encode(&[
        NoteSpec {
            channel: 9,
            key: 38,
            vel: 110,
            start: 0,
            len: 96,
        },
        NoteSpec {
            channel: 9,
            key: 39,
            vel: 110,
            start: 240,
            len: 96,
        },
    ]);
    let score = parse_score(&bytes).unwrap();

    let mut scheduler = Scheduler::new(SAMPLE_RATE);
    let mut pool = VoicePool::new(SAMPLE_RATE);
    scheduler.configure(&score, 120);

    // Both registrations landed on the snare voice
    assert!(scheduler
        .registrations()
        .iter()
        .all(|r| r.kind == VoiceKind::Snare));

    scheduler.start();
    scheduler.process_block(300, &mut pool);
    assert!(pool.voice(VoiceKind::Snare).last_trigger().is_some());
}

// --- session lifecycle ---------------------------------------------------

fn drum_bytes() -> Vec<u8> {
    encode(&[
        NoteSpec {
            channel: 9,
            key: 36,
            vel: 127,
            start: 0,
            len: 96,
        },
        NoteSpec {
            channel: 9,
            key: 42,
            vel: 100,
            start: 480,
            len: 10,
        },
    ])
}

#[test]
fn generate_play_stop_download_cycle() {
    let mut manager = SessionManager::offline(SAMPLE_RATE);
    let mut source = InMemorySource {
        bytes: drum_bytes(),
    };
    let request = GenerateRequest::default();

    assert!(!manager.is_ready());
    manager.generate(&mut source, &request).unwrap();
    assert!(manager.is_ready());
    assert!(!manager.is_playing(), "a fresh session starts stopped");

    // The artifact passes through byte-for-byte
    let artifact = manager.download().unwrap();
    assert_eq!(artifact.bytes, source.bytes);
    assert_eq!(artifact.filename, "CrimsonEcho_Boombap_CDorian_90_X42.mid");

    manager.play();
    assert!(manager.is_playing());

    let mut buf = vec![0.0f32; 256];
    manager.render_block(&mut buf);
    assert!(
        buf.iter().any(|s| s.abs() > 0.0),
        "the kick at t=0 must be audible in the first block"
    );

    let snapshot = manager.snapshot().unwrap();
    assert!(snapshot.is_playing);
    assert!(snapshot.active(VoiceKind::Kick) > 0);

    manager.stop();
    assert!(!manager.is_playing());
    manager.stop(); // idempotent

    manager.dispose();
    assert!(!manager.is_ready());
    manager.dispose(); // idempotent
}

#[test]
fn regenerate_while_playing_retires_the_old_session() {
    let mut manager = SessionManager::offline(SAMPLE_RATE);
    let request = GenerateRequest::default();

    let mut drums = InMemorySource {
        bytes: drum_bytes(),
    };
    manager.generate(&mut drums, &request).unwrap();
    manager.play();

    let mut buf = vec![0.0f32; 64];
    manager.render_block(&mut buf);

    // Second generation: a bass-only score, installed without an explicit
    // dispose call in between
    let mut bass_only = InMemorySource {
        bytes: encode(&[NoteSpec {
            channel: 0,
            key: 40,
            vel: 100,
            start: 0,
            len: 960,
        }]),
    };
    manager.generate(&mut bass_only, &request).unwrap();

    // The new session starts stopped and the old voices are gone
    assert!(!manager.is_playing());
    manager.play();
    for _ in 0..20 {
        manager.render_block(&mut buf);
    }

    let snapshot = manager.snapshot().unwrap();
    assert_eq!(
        snapshot.active(VoiceKind::Kick),
        0,
        "no registration from the first score may ever fire"
    );
    assert!(snapshot.active(VoiceKind::Bass) > 0);
}

#[test]
fn failed_regeneration_disables_controls_but_keeps_state_clean() {
    struct FailingSource;
    impl ScoreSource for FailingSource {
        fn generate(
            &mut self,
            _request: &GenerateRequest,
        ) -> beatloop::engine::Result<ScoreArtifact> {
            Err(EngineError::Fetch("503".into()))
        }
    }

    let mut manager = SessionManager::offline(SAMPLE_RATE);
    let request = GenerateRequest::default();

    let mut drums = InMemorySource {
        bytes: drum_bytes(),
    };
    manager.generate(&mut drums, &request).unwrap();
    manager.play();

    // The failed generation still tears the old session down first
    let err = manager.generate(&mut FailingSource, &request).unwrap_err();
    assert!(matches!(err, EngineError::Fetch(_)));
    assert!(!manager.is_ready());
    assert!(!manager.is_playing());

    // Rendering is silence, not a crash
    let mut buf = vec![0.1f32; 64];
    manager.render_block(&mut buf);
    assert!(buf.iter().all(|s| *s == 0.0));
}

#[test]
fn loop_repeats_without_event_loss() {
    let mut manager = SessionManager::offline(SAMPLE_RATE);
    let request = GenerateRequest::default();
    let mut source = InMemorySource {
        bytes: drum_bytes(),
    };
    manager.generate(&mut source, &request).unwrap();
    manager.play();

    // Loop length is the latest note end: hat at 0.5s plus its raw 10-tick
    // duration (~0.0104s). The routing clamp stretches the trigger, not the
    // score, so the loop stays at ~0.5104s = 510 samples.
    let loop_end = manager.transport().unwrap().loop_end;
    assert!((loop_end - 0.510416).abs() < 1e-3);

    // Render three passes and count kick onsets via activity edges
    let mut buf = vec![0.0f32; 10];
    let mut onsets = 0;
    let mut was_active = false;
    for _ in 0..((510 * 3) / 10) {
        manager.render_block(&mut buf);
        let active = manager.snapshot().unwrap().active(VoiceKind::Kick) > 0;
        if active && !was_active {
            onsets += 1;
        }
        was_active = active;
    }
    assert_eq!(onsets, 3, "one kick onset per loop pass");
}
