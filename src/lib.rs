pub mod dsp;
pub mod engine; // Scheduler, routing table, session lifecycle
pub mod io; // External interfaces: score decoding, generation boundary
pub mod score; // Parsed score model
pub mod voices; // The fixed six-voice pool

pub const MAX_BLOCK_SIZE: usize = 2048;
pub(crate) const MIN_TIME: f32 = 1.0 / 48_000.0;
