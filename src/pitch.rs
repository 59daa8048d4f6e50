// jianpu -- numbered musical notation to timed pitch events
// Copyright (C) 2026  jianpu contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Pitches as the digitizer sees them: letters, accidentals and piano keys.

use std::fmt;

/// A key on an 88-key piano, numbered from 1 (A0) to 88 (C8).
/// Middle C is key 40, concert A (A4) is key 49.
///
/// The number is not clamped to the keyboard, since octave markers in a
/// notation may well run off either end.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub struct PianoKey(i32);

impl PianoKey {
    pub const MIDDLE_C: PianoKey = PianoKey(40);
    pub const CONCERT_A: PianoKey = PianoKey(49);

    pub fn new(number: i32) -> PianoKey {
        PianoKey(number)
    }

    pub fn number(self) -> i32 {
        self.0
    }

    /// Shift the key by the given number of semitones.
    pub fn transpose(self, semitones: i32) -> PianoKey {
        PianoKey(self.0 + semitones)
    }
}

/// The letter of a pitch in standard notation.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum PitchName {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
}

impl PitchName {
    pub fn from_char(ch: char) -> Option<PitchName> {
        match ch {
            'A' => Some(PitchName::A),
            'B' => Some(PitchName::B),
            'C' => Some(PitchName::C),
            'D' => Some(PitchName::D),
            'E' => Some(PitchName::E),
            'F' => Some(PitchName::F),
            'G' => Some(PitchName::G),
            _ => None,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            PitchName::A => 'A',
            PitchName::B => 'B',
            PitchName::C => 'C',
            PitchName::D => 'D',
            PitchName::E => 'E',
            PitchName::F => 'F',
            PitchName::G => 'G',
        }
    }

    /// The piano key of this pitch in the octave starting at middle C.
    ///
    /// # Examples
    ///
    /// ```
    /// use jianpu::pitch::*;
    ///
    /// assert_eq!(PitchName::C.key(Accidental::Natural), PianoKey::MIDDLE_C);
    /// assert_eq!(PitchName::A.key(Accidental::Natural), PianoKey::CONCERT_A);
    /// assert_eq!(PitchName::B.key(Accidental::Flat), PianoKey::new(50));
    /// ```
    pub fn key(self, accidental: Accidental) -> PianoKey {
        let semitones = match self {
            PitchName::C => 0,
            PitchName::D => 2,
            PitchName::E => 4,
            PitchName::F => 5,
            PitchName::G => 7,
            PitchName::A => 9,
            PitchName::B => 11,
        };
        PianoKey::MIDDLE_C.transpose(semitones + accidental.semitones())
    }
}

impl fmt::Display for PitchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Any offset applied to a pitch or a scale degree.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Accidental {
    /// A half-tone lower than written.
    Flat,
    /// Unchanged.
    Natural,
    /// A half-tone higher than written.
    Sharp,
}

impl Accidental {
    pub fn from_char(ch: char) -> Option<Accidental> {
        match ch {
            '#' => Some(Accidental::Sharp),
            'b' => Some(Accidental::Flat),
            _ => None,
        }
    }

    pub fn semitones(self) -> i32 {
        match self {
            Accidental::Flat => -1,
            Accidental::Natural => 0,
            Accidental::Sharp => 1,
        }
    }

    /// The marker written in front of a note, empty for naturals.
    pub fn marker(self) -> &'static str {
        match self {
            Accidental::Flat => "b",
            Accidental::Natural => "",
            Accidental::Sharp => "#",
        }
    }
}

impl Default for Accidental {
    fn default() -> Self {
        Accidental::Natural
    }
}

/// Semitone distance of the scale degrees 1 to 7 from the tonic in a major scale.
const MAJOR_SCALE: [i32; 7] = [0, 2, 4, 5, 7, 9, 11];

/// Resolve a scale degree relative to a tonic.
/// Returns `None` for rests (degree 0) and degrees outside of the scale.
///
/// # Examples
///
/// ```
/// use jianpu::pitch::*;
///
/// let c = PianoKey::MIDDLE_C;
/// assert_eq!(scale_key(c, Accidental::Natural, 1, 0), Some(c));
/// assert_eq!(scale_key(c, Accidental::Natural, 6, 0), Some(PianoKey::CONCERT_A));
/// assert_eq!(scale_key(c, Accidental::Sharp, 4, -1), Some(PianoKey::new(34)));
/// assert_eq!(scale_key(c, Accidental::Natural, 0, 0), None);
/// ```
pub fn scale_key(tonic: PianoKey, accidental: Accidental, degree: u8, octave: i32) -> Option<PianoKey> {
    let step = MAJOR_SCALE.get(usize::from(degree).checked_sub(1)?)?;
    Some(tonic.transpose(step + accidental.semitones() + 12 * octave))
}

/// Defines the tuning by assigning a frequency to a reference key.
/// All other keys follow in equal temperament at 12 half-tones per octave.
///
/// # Examples
///
/// ```
/// use jianpu::pitch::*;
/// assert_eq!(Tuning::default().frequency(PianoKey::new(37)), 220.0);
/// assert_eq!(Tuning::default().frequency(PianoKey::new(61)), 880.0);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tuning {
    pub reference_key: PianoKey,
    pub reference_frequency: f64,
}

impl Tuning {
    /// Return the frequency of a key relative to this tuning.
    pub fn frequency(&self, key: PianoKey) -> f64 {
        let semitones = key.number() - self.reference_key.number();
        let octaves = semitones as f64 / 12.0;
        self.reference_frequency * 2.0f64.powf(octaves)
    }
}

/// Default concert tuning, where A4 corresponds to 440 Hz.
impl Default for Tuning {
    fn default() -> Self {
        Tuning {
            reference_key: PianoKey::CONCERT_A,
            reference_frequency: 440.0,
        }
    }
}
