//! # Musical Tuning Module
//!
//! Equal-temperament helpers with A4 fixed at 440 Hz: mapping frequencies
//! to MIDI numbers and pitch classes, naming pitch classes, and a compact
//! set type for groups of pitch classes.
//!
//! Pitch classes are indexed 0 = C through 11 = B and named with sharps.

use std::fmt;

/// Reference pitch A4 in Hz.
pub const A4_FREQUENCY: f32 = 440.0;
/// MIDI note number of A4.
pub const A4_MIDI: f32 = 69.0;
/// Number of pitch classes in an octave.
pub const PITCH_CLASSES: usize = 12;

/// Pitch-class names indexed from C.
pub const PITCH_NAMES: [&str; PITCH_CLASSES] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Fractional MIDI note number of a frequency.
pub fn midi_number(frequency: f32) -> f32 {
    A4_MIDI + 12.0 * (frequency / A4_FREQUENCY).log2()
}

/// Pitch class (0-11) of the nearest equal-tempered note.
pub fn pitch_class(frequency: f32) -> usize {
    (midi_number(frequency).round() as i32).rem_euclid(PITCH_CLASSES as i32) as usize
}

/// Name of a pitch class; indices wrap modulo 12.
pub fn pitch_name(pitch_class: usize) -> &'static str {
    PITCH_NAMES[pitch_class % PITCH_CLASSES]
}

/// A set of pitch classes stored as a 12-bit mask.
///
/// Iteration is always in ascending pitch-class order, which makes
/// "sorted" note lists free.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PitchClassSet(u16);

impl PitchClassSet {
    const MASK: u16 = (1 << PITCH_CLASSES) - 1;

    pub const fn empty() -> Self {
        Self(0)
    }

    /// Builds a set from arbitrary integers, reducing each modulo 12.
    pub fn from_intervals(intervals: &[u8]) -> Self {
        intervals.iter().fold(Self::empty(), |mut set, &i| {
            set.insert(i as usize);
            set
        })
    }

    pub fn insert(&mut self, pitch_class: usize) {
        self.0 |= 1 << (pitch_class % PITCH_CLASSES);
    }

    pub fn contains(&self, pitch_class: usize) -> bool {
        pitch_class < PITCH_CLASSES && self.0 & (1 << pitch_class) != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn intersection(&self, other: &Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Elements of `self` that are not in `other`.
    pub fn difference(&self, other: &Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Rotates every member up by `semitones`, wrapping at the octave.
    pub fn transpose(&self, semitones: usize) -> Self {
        let shift = (semitones % PITCH_CLASSES) as u32;
        let wide = (self.0 as u32) << shift;
        let wrapped = (wide | (wide >> PITCH_CLASSES)) as u16;
        Self(wrapped & Self::MASK)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..PITCH_CLASSES).filter(move |&pc| self.contains(pc))
    }

    /// Member names in ascending pitch-class order.
    pub fn note_names(&self) -> Vec<String> {
        self.iter().map(|pc| pitch_name(pc).to_string()).collect()
    }
}

impl FromIterator<usize> for PitchClassSet {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        let mut set = Self::empty();
        for pc in iter {
            set.insert(pc);
        }
        set
    }
}

impl fmt::Display for PitchClassSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{{}}}", self.note_names().join(", "))
    }
}
