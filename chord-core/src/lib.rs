// chord-core/src/lib.rs

//! The core logic for the live chord detector.
//! This crate turns a stream of mono PCM chunks into a stabilized chord
//! label: framing, spectral analysis, chroma extraction, pitch-class
//! tracking, template matching and hysteresis. It is completely headless
//! and knows nothing about audio devices; those plug in through
//! [`source::AudioSource`].

pub mod channel;
pub mod chord;
pub mod chroma;
pub mod config;
pub mod detector;
pub mod fft;
pub mod frame_buffer;
pub mod noise_gate;
pub mod pipeline;
pub mod source;
pub mod stabilizer;
pub mod tracker;
pub mod tuning;

use serde::Serialize;

pub use config::{ConfigError, PipelineConfig};
pub use detector::ChordDetector;
pub use pipeline::Pipeline;
pub use source::{AudioSource, SourceError};

/// Label used whenever no chord template matches well enough.
pub const UNKNOWN_CHORD: &str = "Unknown";

/// Represents the outcome of classifying one analysis frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionResult {
    /// Chord label such as "C", "F#m7" or "Unknown".
    pub chord_name: String,
    /// Pitch names of the chord (or of the active set when unknown),
    /// ascending from C.
    pub note_names: Vec<String>,
    /// Match confidence (0.0 to 1.0).
    pub confidence: f32,
}

impl DetectionResult {
    /// An "Unknown" result with no notes and zero confidence.
    pub fn silent() -> Self {
        Self {
            chord_name: UNKNOWN_CHORD.to_string(),
            note_names: Vec::new(),
            confidence: 0.0,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.chord_name == UNKNOWN_CHORD
    }
}

impl Default for DetectionResult {
    fn default() -> Self {
        Self::silent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_fields() {
        let result = DetectionResult {
            chord_name: "Am".to_string(),
            note_names: vec!["C".into(), "E".into(), "A".into()],
            confidence: 0.5,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert_eq!(
            json,
            r#"{"chordName":"Am","noteNames":["C","E","A"],"confidence":0.5}"#
        );
    }

    #[test]
    fn default_result_is_silent_unknown() {
        let result = DetectionResult::default();
        assert!(result.is_unknown());
        assert!(result.note_names.is_empty());
        assert_eq!(result.confidence, 0.0);
    }
}
