// Purpose: external interfaces - score decoding and the generation boundary

pub mod midi;
pub mod source;

pub use midi::parse_score;
pub use source::{FileSource, GenerateRequest, ScoreArtifact, ScoreSource, StylePreset};
