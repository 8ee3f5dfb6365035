//! # Chroma Extraction
//!
//! Folds a magnitude spectrum into 12 pitch classes. Each bin votes for
//! the pitch class of its own frequency and of the fundamentals it could
//! be an overtone of, so a piano note and its partials reinforce the same
//! class instead of scattering energy across the octave.

use crate::tuning::{self, PITCH_CLASSES};

/// Per-frame energy per pitch class, index 0 = C.
pub type Chroma = [f32; PITCH_CLASSES];

/// Lowest frequency considered, in Hz (A1).
pub const MIN_FREQUENCY: f32 = 55.0;
/// Highest frequency considered, in Hz.
pub const MAX_FREQUENCY: f32 = 2000.0;
/// Bins quieter than this are ignored.
const MIN_MAGNITUDE: f32 = 1e-4;
/// Harmonic numbers folded back onto their fundamental.
const HARMONICS: std::ops::RangeInclusive<u32> = 1..=5;

fn in_range(frequency: f32) -> bool {
    (MIN_FREQUENCY..=MAX_FREQUENCY).contains(&frequency)
}

/// Computes a max-normalized chroma vector from a magnitude spectrum.
///
/// # Arguments
/// * `magnitudes` - Spectrum with `frame_size / 2` bins
/// * `sample_rate` - Sample rate in Hz
/// * `frame_size` - FFT size the spectrum was computed with
///
/// # Returns
/// * Chroma with every entry in [0, 1]; the largest entry is exactly 1
///   unless the whole vector is zero.
pub fn extract(magnitudes: &[f32], sample_rate: u32, frame_size: usize) -> Chroma {
    let mut chroma = [0.0; PITCH_CLASSES];
    let bin_width = sample_rate as f32 / frame_size as f32;

    for (bin, &magnitude) in magnitudes.iter().enumerate().skip(1) {
        let frequency = bin as f32 * bin_width;
        if !in_range(frequency) || magnitude < MIN_MAGNITUDE {
            continue;
        }

        for harmonic in HARMONICS {
            let fundamental = frequency / harmonic as f32;
            if !in_range(fundamental) {
                continue;
            }
            chroma[tuning::pitch_class(fundamental)] += magnitude / harmonic as f32;
        }
    }

    normalize(&mut chroma);
    chroma
}

/// Divides every entry by the maximum; leaves an all-zero vector alone.
pub fn normalize(chroma: &mut Chroma) {
    let max = chroma.iter().copied().fold(0.0_f32, f32::max);
    if max > 0.0 {
        for value in chroma.iter_mut() {
            *value = (*value / max).clamp(0.0, 1.0);
        }
    }
}
