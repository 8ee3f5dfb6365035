//! # Active Pitch-Class Tracker
//!
//! Smooths chroma over time and keeps a per-pitch-class "hold" value with
//! fast attack and slow decay. Pitch classes whose hold is high enough form
//! the active set handed to the chord identifier.

use crate::chroma::Chroma;
use crate::tuning::{PITCH_CLASSES, PitchClassSet};

/// Weight of the previous smoothed value in the moving average.
const SMOOTHING: f32 = 0.82;
const STRONG_ATTACK_LEVEL: f32 = 0.34;
const STRONG_ATTACK: f32 = 0.30;
const WEAK_ATTACK_LEVEL: f32 = 0.23;
const WEAK_ATTACK: f32 = 0.08;
/// Hold decay per frame while playing but below the attack levels.
const PLAYING_DECAY: f32 = 0.965;
/// Hold decay per frame while the noise gate is closed.
const SILENCE_DECAY: f32 = 0.95;
/// A pitch class is active while its hold exceeds this.
const ACTIVE_LEVEL: f32 = 0.55;
/// Upper bound on the active set size.
pub const MAX_ACTIVE: usize = 5;

#[derive(Debug, Clone, Default)]
pub struct PitchClassTracker {
    smoothed: Chroma,
    hold: [f32; PITCH_CLASSES],
}

impl PitchClassTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn smoothed(&self) -> &Chroma {
        &self.smoothed
    }

    pub fn hold(&self) -> &[f32; PITCH_CLASSES] {
        &self.hold
    }

    /// Folds one frame of chroma into the tracker and returns the active set.
    pub fn update(&mut self, chroma: &Chroma, has_signal: bool) -> PitchClassSet {
        for (smoothed, &value) in self.smoothed.iter_mut().zip(chroma.iter()) {
            *smoothed = (SMOOTHING * *smoothed + (1.0 - SMOOTHING) * value).clamp(0.0, 1.0);
        }

        if !has_signal {
            for hold in self.hold.iter_mut() {
                *hold *= SILENCE_DECAY;
            }
        } else {
            for (hold, &smoothed) in self.hold.iter_mut().zip(self.smoothed.iter()) {
                if smoothed >= STRONG_ATTACK_LEVEL {
                    *hold = (*hold + STRONG_ATTACK).min(1.0);
                } else if smoothed >= WEAK_ATTACK_LEVEL {
                    *hold = (*hold + WEAK_ATTACK).min(1.0);
                } else {
                    *hold *= PLAYING_DECAY;
                }
            }
        }

        self.active_set()
    }

    /// Pitch classes whose hold exceeds the active level, capped to the
    /// strongest [`MAX_ACTIVE`].
    pub fn active_set(&self) -> PitchClassSet {
        let mut active: Vec<usize> = (0..PITCH_CLASSES)
            .filter(|&pc| self.hold[pc] > ACTIVE_LEVEL)
            .collect();

        if active.len() > MAX_ACTIVE {
            // Stable sort: equal holds keep ascending pitch-class order.
            active.sort_by(|&a, &b| self.hold[b].total_cmp(&self.hold[a]));
            active.truncate(MAX_ACTIVE);
        }

        active.into_iter().collect()
    }

    pub fn reset(&mut self) {
        self.smoothed = [0.0; PITCH_CLASSES];
        self.hold = [0.0; PITCH_CLASSES];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chroma_of(classes: &[usize]) -> Chroma {
        let mut chroma = [0.0; PITCH_CLASSES];
        for &pc in classes {
            chroma[pc] = 1.0;
        }
        chroma
    }

    #[test]
    fn sustained_triad_becomes_active_after_a_few_frames() {
        let mut tracker = PitchClassTracker::new();
        let chroma = chroma_of(&[0, 4, 7]);

        // smoothed: 0.18, 0.33, 0.45 -> holds 0, 0.08, 0.38, 0.68
        let frames: Vec<PitchClassSet> = (0..4).map(|_| tracker.update(&chroma, true)).collect();

        assert!(frames[2].is_empty());
        assert_eq!(frames[3].iter().collect::<Vec<_>>(), vec![0, 4, 7]);
    }

    #[test]
    fn silence_decays_hold_slowly() {
        let mut tracker = PitchClassTracker::new();
        let chroma = chroma_of(&[9]);
        for _ in 0..10 {
            tracker.update(&chroma, true);
        }
        assert_eq!(tracker.hold()[9], 1.0);

        // 0.95^11 ~= 0.569, 0.95^12 ~= 0.540
        let silent = [0.0; PITCH_CLASSES];
        for _ in 0..11 {
            assert!(tracker.update(&silent, false).contains(9));
        }
        assert!(!tracker.update(&silent, false).contains(9));
    }

    #[test]
    fn broadband_noise_is_capped_to_the_strongest_five() {
        let mut tracker = PitchClassTracker::new();
        let all = [1.0; PITCH_CLASSES];
        for _ in 0..10 {
            let active = tracker.update(&all, true);
            assert!(active.len() <= MAX_ACTIVE);
        }
        // Every hold is saturated at 1.0, so ties keep the lowest indices.
        assert_eq!(tracker.active_set().iter().collect::<Vec<_>>(), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn holds_stay_within_unit_range() {
        let mut tracker = PitchClassTracker::new();
        for frame in 0..200 {
            let mut chroma = [0.0; PITCH_CLASSES];
            for (pc, value) in chroma.iter_mut().enumerate() {
                *value = (((frame * 7 + pc * 5) % 11) as f32) / 10.0;
            }
            tracker.update(&chroma, frame % 9 != 0);
            assert!(tracker.hold().iter().all(|h| (0.0..=1.0).contains(h)));
            assert!(tracker.smoothed().iter().all(|s| (0.0..=1.0).contains(s)));
        }
    }

    #[test]
    fn reset_clears_state() {
        let mut tracker = PitchClassTracker::new();
        for _ in 0..10 {
            tracker.update(&chroma_of(&[2, 6, 9]), true);
        }
        tracker.reset();
        assert!(tracker.active_set().is_empty());
        assert!(tracker.smoothed().iter().all(|&s| s == 0.0));
    }
}
