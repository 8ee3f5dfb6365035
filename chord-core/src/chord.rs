//! # Chord Identification
//!
//! Scores the active pitch-class set against every rooted chord template
//! (12 roots x 11 qualities) and returns the best match, or "Unknown" when
//! nothing fits well enough.
//!
//! ## Scoring
//! `score = overlap - 0.12 * extra - 0.08 * missing`, where `overlap` is the
//! fraction of template notes present, `extra` counts active notes outside
//! the template and `missing` counts template notes not active. Extra notes
//! cost more than missing ones: an unplayed fifth is common, a stray note
//! more often means the wrong chord.

use once_cell::sync::Lazy;

use crate::tuning::{self, PITCH_CLASSES, PitchClassSet};
use crate::{DetectionResult, UNKNOWN_CHORD};

const EXTRA_PENALTY: f32 = 0.12;
const MISSING_PENALTY: f32 = 0.08;
/// Best scores below this are reported as "Unknown".
const MIN_SCORE: f32 = 0.4;
/// Confidence reported for a single active note.
const SINGLE_NOTE_CONFIDENCE: f32 = 0.35;
/// Confidence range for an "Unknown" with two or more notes.
const UNKNOWN_CONFIDENCE_MIN: f32 = 0.05;
const UNKNOWN_CONFIDENCE_MAX: f32 = 0.35;
const UNKNOWN_CONFIDENCE_OFFSET: f32 = 0.2;

/// A chord quality: display symbol plus intervals above the root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordQuality {
    pub name: &'static str,
    pub symbol: &'static str,
    pub intervals: &'static [u8],
}

/// All qualities in matching order. Ties between equal scores go to the
/// earlier entry, so the order is part of the behaviour.
pub static QUALITIES: [ChordQuality; 11] = [
    ChordQuality { name: "major", symbol: "", intervals: &[0, 4, 7] },
    ChordQuality { name: "minor", symbol: "m", intervals: &[0, 3, 7] },
    ChordQuality { name: "diminished", symbol: "dim", intervals: &[0, 3, 6] },
    ChordQuality { name: "augmented", symbol: "aug", intervals: &[0, 4, 8] },
    ChordQuality { name: "sus2", symbol: "sus2", intervals: &[0, 2, 7] },
    ChordQuality { name: "sus4", symbol: "sus4", intervals: &[0, 5, 7] },
    ChordQuality { name: "dominant7", symbol: "7", intervals: &[0, 4, 7, 10] },
    ChordQuality { name: "major7", symbol: "maj7", intervals: &[0, 4, 7, 11] },
    ChordQuality { name: "minor7", symbol: "m7", intervals: &[0, 3, 7, 10] },
    ChordQuality { name: "half-diminished7", symbol: "m7b5", intervals: &[0, 3, 6, 10] },
    ChordQuality { name: "diminished7", symbol: "dim7", intervals: &[0, 3, 6, 9] },
];

/// A quality placed on a specific root.
#[derive(Debug, Clone)]
pub struct ChordTemplate {
    pub root: usize,
    pub quality: &'static ChordQuality,
    pub notes: PitchClassSet,
}

impl ChordTemplate {
    /// Display name, e.g. "F#m7".
    pub fn name(&self) -> String {
        format!("{}{}", tuning::pitch_name(self.root), self.quality.symbol)
    }

    /// Heuristic match score of this template against an active set.
    ///
    /// Returns `None` when fewer than two notes are shared.
    pub fn score(&self, active: &PitchClassSet) -> Option<f32> {
        let shared = active.intersection(&self.notes).len();
        if shared < 2 {
            return None;
        }
        let overlap = shared as f32 / self.notes.len() as f32;
        let extra = active.difference(&self.notes).len() as f32;
        let missing = self.notes.difference(active).len() as f32;
        Some(overlap - EXTRA_PENALTY * extra - MISSING_PENALTY * missing)
    }
}

/// Every rooted template, roots ascending from C, qualities in
/// [`QUALITIES`] order within each root.
pub static TEMPLATES: Lazy<Vec<ChordTemplate>> = Lazy::new(|| {
    let mut templates = Vec::with_capacity(PITCH_CLASSES * QUALITIES.len());
    for root in 0..PITCH_CLASSES {
        for quality in QUALITIES.iter() {
            templates.push(ChordTemplate {
                root,
                quality,
                notes: PitchClassSet::from_intervals(quality.intervals).transpose(root),
            });
        }
    }
    templates
});

/// Finds the best-scoring template for an active set.
///
/// Uses strict `>` so the first template reaching the best score wins.
pub fn best_match(active: &PitchClassSet) -> Option<(&'static ChordTemplate, f32)> {
    let mut best: Option<(&'static ChordTemplate, f32)> = None;
    for template in TEMPLATES.iter() {
        if let Some(score) = template.score(active) {
            if best.is_none_or(|(_, best_score)| score > best_score) {
                best = Some((template, score));
            }
        }
    }
    best
}

/// Classifies an active pitch-class set.
pub fn identify(active: &PitchClassSet) -> DetectionResult {
    if active.len() < 2 {
        return DetectionResult {
            chord_name: UNKNOWN_CHORD.to_string(),
            note_names: active.note_names(),
            confidence: if active.is_empty() { 0.0 } else { SINGLE_NOTE_CONFIDENCE },
        };
    }

    match best_match(active) {
        Some((template, score)) if score >= MIN_SCORE => DetectionResult {
            chord_name: template.name(),
            note_names: template.notes.note_names(),
            confidence: score.clamp(0.0, 1.0),
        },
        best => {
            let score = best.map_or(f32::NEG_INFINITY, |(_, score)| score);
            DetectionResult {
                chord_name: UNKNOWN_CHORD.to_string(),
                note_names: active.note_names(),
                confidence: (score + UNKNOWN_CONFIDENCE_OFFSET)
                    .clamp(UNKNOWN_CONFIDENCE_MIN, UNKNOWN_CONFIDENCE_MAX),
            }
        }
    }
}
