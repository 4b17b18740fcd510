//! The score-generation boundary.
//!
//! Scores come from an external collaborator (a generation service, or a
//! file on disk standing in for one). This module owns the request shape,
//! the named style presets the service understands, and the artifact that
//! comes back: raw SMF bytes plus a suggested filename. The engine parses a
//! copy of the bytes for scheduling and otherwise passes them through
//! untouched for download.

use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::engine::{EngineError, Result};

/// Named generation presets. Each carries the tempo band the service
/// composes in, used to seed a sensible default bpm for the request.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylePreset {
    BoomBap,
    Trap,
    Drill,
    Storch,
    Edm,
    Flume,
    Dilla,
}

impl StylePreset {
    pub const ALL: [StylePreset; 7] = [
        StylePreset::BoomBap,
        StylePreset::Trap,
        StylePreset::Drill,
        StylePreset::Storch,
        StylePreset::Edm,
        StylePreset::Flume,
        StylePreset::Dilla,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StylePreset::BoomBap => "boombap",
            StylePreset::Trap => "trap",
            StylePreset::Drill => "drill",
            StylePreset::Storch => "storch",
            StylePreset::Edm => "edm",
            StylePreset::Flume => "flume",
            StylePreset::Dilla => "dilla",
        }
    }

    /// Inclusive bpm band the preset composes in.
    pub fn tempo_range(&self) -> (u16, u16) {
        match self {
            StylePreset::BoomBap => (85, 95),
            StylePreset::Trap => (130, 150),
            StylePreset::Drill => (140, 145),
            StylePreset::Storch => (90, 100),
            StylePreset::Edm => (120, 128),
            StylePreset::Flume => (80, 110),
            StylePreset::Dilla => (88, 92),
        }
    }

    /// Midpoint of the tempo band.
    pub fn default_bpm(&self) -> u16 {
        let (lo, hi) = self.tempo_range();
        (lo + hi) / 2
    }
}

impl std::fmt::Display for StylePreset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StylePreset {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        StylePreset::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown style preset: {s}"))
    }
}

/// Parameters for one generation call.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateRequest {
    pub style: StylePreset,
    pub bpm: u16,
    pub bars: u8,
    pub chords: bool,
}

impl Default for GenerateRequest {
    fn default() -> Self {
        let style = StylePreset::BoomBap;
        Self {
            style,
            bpm: style.default_bpm(),
            bars: 4,
            chords: true,
        }
    }
}

/// The collaborator's response: a time-coded binary score and the filename
/// it suggests for saving it. Never mutated by this crate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreArtifact {
    pub bytes: Vec<u8>,
    pub filename: String,
}

/// A provider of score artifacts.
///
/// Failures surface as [`EngineError::Fetch`] and abort session
/// configuration without touching scheduler state.
pub trait ScoreSource {
    fn generate(&mut self, request: &GenerateRequest) -> Result<ScoreArtifact>;
}

/// Reads an SMF from disk, standing in for the remote generation service.
/// Re-reads on every call so an updated file shows up on regenerate.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ScoreSource for FileSource {
    fn generate(&mut self, _request: &GenerateRequest) -> Result<ScoreArtifact> {
        let bytes = std::fs::read(&self.path)
            .map_err(|e| EngineError::Fetch(format!("{}: {e}", self.path.display())))?;
        let filename = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "beat.mid".into());
        Ok(ScoreArtifact { bytes, filename })
    }
}
