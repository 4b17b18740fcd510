// Purpose: realtime-safe synthesis primitives for the voice pool.
// Per-sample math only - no allocation, no locking on the render path.

pub mod envelope;
pub mod oscillator;

pub use envelope::{AdsrParams, Envelope};
pub use oscillator::{Oscillator, Waveform};
