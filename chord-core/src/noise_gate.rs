//! # Noise Gate
//!
//! Decides whether a frame carries musical signal by comparing its RMS
//! energy against an adaptively tracked noise floor.

/// Absolute minimum gate threshold.
const MIN_THRESHOLD: f32 = 0.004;
/// The gate opens at this multiple of the noise floor.
const FLOOR_MULTIPLIER: f32 = 2.8;
/// Floor smoothing while signal is present (rises slowly mid-note).
const ALPHA_SIGNAL: f32 = 0.995;
/// Floor smoothing during silence (re-centres quickly between notes).
const ALPHA_SILENCE: f32 = 0.92;
/// Loud frames are clamped to this before feeding the floor.
const MAX_FLOOR_INPUT: f32 = 0.02;
/// Floor at session start.
pub const INITIAL_NOISE_FLOOR: f32 = 0.002;

/// Root-mean-square energy of a frame. Zero for an empty frame.
pub fn rms(frame: &[f32]) -> f32 {
    if frame.is_empty() {
        return 0.0;
    }
    (frame.iter().map(|&s| s * s).sum::<f32>() / frame.len() as f32).sqrt()
}

#[derive(Debug, Clone)]
pub struct NoiseGate {
    noise_floor: f32,
}

impl Default for NoiseGate {
    fn default() -> Self {
        Self {
            noise_floor: INITIAL_NOISE_FLOOR,
        }
    }
}

impl NoiseGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn noise_floor(&self) -> f32 {
        self.noise_floor
    }

    /// Evaluates a raw (unwindowed) frame and updates the noise floor.
    pub fn evaluate(&mut self, frame: &[f32]) -> bool {
        let rms = rms(frame);
        let threshold = MIN_THRESHOLD.max(self.noise_floor * FLOOR_MULTIPLIER);
        let has_signal = rms > threshold;

        let alpha = if has_signal { ALPHA_SIGNAL } else { ALPHA_SILENCE };
        self.noise_floor = alpha * self.noise_floor + (1.0 - alpha) * rms.min(MAX_FLOOR_INPUT);

        has_signal
    }

    pub fn reset(&mut self) {
        self.noise_floor = INITIAL_NOISE_FLOOR;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rms_of_constant_signal() {
        assert!((rms(&[0.5; 64]) - 0.5).abs() < 1e-6);
        assert_eq!(rms(&[]), 0.0);
    }

    #[test]
    fn silence_is_gated_and_floor_decays() {
        let mut gate = NoiseGate::new();
        assert!(!gate.evaluate(&[0.0; 128]));
        // 0.92 * 0.002 + 0.08 * 0
        assert!((gate.noise_floor() - 0.00184).abs() < 1e-7);
    }

    #[test]
    fn loud_frame_opens_the_gate_and_floor_rises_slowly() {
        let mut gate = NoiseGate::new();
        assert!(gate.evaluate(&[0.1; 128]));
        // Input clamped to 0.02: 0.995 * 0.002 + 0.005 * 0.02
        assert!((gate.noise_floor() - 0.00209).abs() < 1e-7);
    }

    #[test]
    fn quiet_hum_just_above_minimum_threshold() {
        let mut gate = NoiseGate::new();
        // Threshold starts at max(0.004, 0.0056) = 0.0056.
        assert!(!gate.evaluate(&[0.005; 128]));
        assert!(gate.evaluate(&[0.01; 128]));
    }

    #[test]
    fn reset_restores_initial_floor() {
        let mut gate = NoiseGate::new();
        for _ in 0..50 {
            gate.evaluate(&[0.0; 32]);
        }
        gate.reset();
        assert_eq!(gate.noise_floor(), INITIAL_NOISE_FLOOR);
    }
}
