//! The shared audio output context.
//!
//! One cpal output stream per process, created on first acquisition and
//! never torn down between sessions - only the [`PlaybackCore`] inside the
//! shared slot is swapped. The callback renders whatever core is installed
//! (silence otherwise) in MAX_BLOCK_SIZE chunks and fans the mono mix out
//! to every hardware channel.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

use crate::engine::monitor::{MonitorFrame, MonitorTx};
use crate::engine::{CoreSlot, EngineError, Result};
use crate::MAX_BLOCK_SIZE;

pub struct AudioContext {
    // Held for its Drop; audio stops when the context is dropped.
    _stream: cpal::Stream,
    sample_rate: f32,
    channels: usize,
}

impl AudioContext {
    /// Open the default output device and start the stream.
    ///
    /// `slot` is the single shared core handle (see [`CoreSlot`] for the
    /// single-writer discipline); `monitor` receives one frame per callback
    /// for the UI.
    pub fn acquire(slot: CoreSlot, mut monitor: Option<MonitorTx>) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| EngineError::Acquisition("no default output device".into()))?;
        let config = device
            .default_output_config()
            .map_err(|e| EngineError::Acquisition(e.to_string()))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;

        let callback_slot = slot.clone();
        let mut render_buf = vec![0.0f32; MAX_BLOCK_SIZE];

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _| {
                    let mut guard = callback_slot.lock().unwrap();
                    let total_frames = data.len() / channels;
                    let mut frames_written = 0;

                    while frames_written < total_frames {
                        let frames = (total_frames - frames_written).min(MAX_BLOCK_SIZE);
                        let block = &mut render_buf[..frames];
                        block.fill(0.0);

                        if let Some(core) = guard.as_mut() {
                            core.process(block);
                        }

                        let out_off = frames_written * channels;
                        for (i, &sample) in block.iter().enumerate() {
                            for ch in 0..channels {
                                data[out_off + i * channels + ch] = sample;
                            }
                        }
                        frames_written += frames;
                    }

                    if let Some(tx) = monitor.as_mut() {
                        let frame: MonitorFrame =
                            guard.as_ref().map(|core| core.snapshot()).unwrap_or_default();
                        tx.push(frame);
                    }
                },
                |err| tracing::error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| EngineError::Acquisition(e.to_string()))?;

        stream
            .play()
            .map_err(|e| EngineError::Acquisition(e.to_string()))?;

        tracing::debug!(sample_rate, channels, "audio output acquired");

        Ok(Self {
            _stream: stream,
            sample_rate,
            channels,
        })
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}
