// jianpu -- numbered musical notation to timed pitch events
// Copyright (C) 2026  jianpu contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Walks a parsed notation as a timeline and produces timed frequency and
//! articulation events for a synthesizer.
//!
//! All times are in seconds from the start of the piece. A frequency event
//! sets the pitch of the single voice from its time on, a frequency of zero
//! means silence. A break event marks where the sound before it ends and a
//! fresh attack starts.

use log::{debug, trace, warn};
use snafu::Snafu;

use crate::notation::{self, NodeKind, ParsedNotation, Repeat, Span};
use crate::pitch::{self, Accidental, PianoKey, Tuning};

/// Defaults the digitizer starts from before any header token is seen.
#[derive(Debug, Clone, PartialEq)]
pub struct DigitizerConfig {
    /// Beats per minute.
    pub tempo: u32,
    /// Piano key of scale degree 1.
    pub tonic: PianoKey,
    /// Note value of one beat, the denominator of a time signature.
    pub unit: u32,
    /// How often a section between `||:` and `:||` is played in total.
    pub repeat_passes: u32,
    pub tuning: Tuning,
}

impl Default for DigitizerConfig {
    fn default() -> Self {
        DigitizerConfig {
            tempo: 60,
            tonic: PianoKey::MIDDLE_C,
            unit: 4,
            repeat_passes: 2,
            tuning: Tuning::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DigitizedNode {
    /// Switch the pitch to `value` Hz at `time`. Zero is a rest.
    Frequency { value: f64, time: f64 },
    /// An articulation boundary at `time`.
    /// `base` is the duration of a beat at that point, `before` the length of
    /// the sound that just ended, both for shaping the envelope.
    Break { base: f64, before: f64, time: f64 },
}

impl DigitizedNode {
    pub fn time(&self) -> f64 {
        match self {
            DigitizedNode::Frequency { time, .. } => *time,
            DigitizedNode::Break { time, .. } => *time,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DigitizedNotation {
    /// Events ordered by time.
    pub nodes: Vec<DigitizedNode>,
    /// Total length in seconds.
    pub duration: f64,
}

impl DigitizedNotation {
    /// `(time, frequency)` of all pitch changes.
    pub fn frequencies(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            DigitizedNode::Frequency { value, time } => Some((*time, *value)),
            DigitizedNode::Break { .. } => None,
        })
    }

    /// Times of all articulation boundaries.
    pub fn breaks(&self) -> impl Iterator<Item = f64> + '_ {
        self.nodes.iter().filter_map(|node| match node {
            DigitizedNode::Break { time, .. } => Some(*time),
            DigitizedNode::Frequency { .. } => None,
        })
    }
}

/// Reasons for refusing to digitize a notation.
#[derive(Debug, PartialEq, Snafu)]
pub enum DigitizeError {
    #[snafu(display("Tempo at {:?} has zero beats per minute", span))]
    ZeroTempo { span: Span },
    #[snafu(display("Time signature at {:?} has a zero beat unit", span))]
    ZeroUnit { span: Span },
    #[snafu(display("Invalid digitizer configuration: {}", reason))]
    InvalidConfig { reason: String },
    #[snafu(display("Token at {:?} leaves the representable range of pitch or time", span))]
    OutOfRange { span: Span },
}

/// Check for values that would turn durations infinite.
pub fn validate(notation: &ParsedNotation) -> Result<(), DigitizeError> {
    for node in &notation.nodes {
        match node.kind {
            NodeKind::Tempo { beat: 0 } => {
                return Err(DigitizeError::ZeroTempo {
                    span: node.span.clone(),
                })
            }
            NodeKind::TimeSignature { unit: 0, .. } => {
                return Err(DigitizeError::ZeroUnit {
                    span: node.span.clone(),
                })
            }
            _ => {}
        }
    }
    Ok(())
}

impl DigitizerConfig {
    fn validate(&self) -> Result<(), DigitizeError> {
        let reason = if self.tempo == 0 {
            "tempo must be positive"
        } else if self.unit == 0 {
            "unit must be positive"
        } else if self.repeat_passes == 0 {
            "a repeated section must be played at least once"
        } else if !(self.tuning.reference_frequency > 0.0) {
            "reference frequency must be positive"
        } else {
            return Ok(());
        };
        Err(DigitizeError::InvalidConfig {
            reason: reason.to_string(),
        })
    }
}

/// Digitize a notation starting from the default configuration.
pub fn digitize(notation: &ParsedNotation) -> Result<DigitizedNotation, DigitizeError> {
    digitize_with(notation, &DigitizerConfig::default())
}

/// Parse and digitize a notation text in one go.
///
/// # Examples
///
/// ```
/// let digitized = jianpu::digitizer::digitize_str("1 -").unwrap();
/// assert_eq!(digitized.duration, 2.0);
/// assert_eq!(digitized.frequencies().count(), 1);
/// ```
pub fn digitize_str(source: &str) -> Result<DigitizedNotation, DigitizeError> {
    digitize(&notation::parse(source))
}

pub fn digitize_with(
    notation: &ParsedNotation,
    config: &DigitizerConfig,
) -> Result<DigitizedNotation, DigitizeError> {
    config.validate()?;
    validate(notation)?;
    let mut digitizer = Digitizer::new(config, notation.nodes.len());
    digitizer.run(notation)?;
    Ok(digitizer.finish())
}

/// The state carried through a single pass over the nodes.
struct Digitizer<'a> {
    config: &'a DigitizerConfig,
    output: Vec<DigitizedNode>,

    /// Current position on the timeline.
    time: f64,
    /// Seconds per beat.
    beat_duration: f64,
    tonic: PianoKey,
    unit: u32,
    /// Number of grace notes waiting for their main note.
    leaning: u32,
    /// Length of the sound currently held, including ties and dashes.
    last_note_duration: f64,

    /// Index of the node following the last `||:`.
    anchor: Option<usize>,
    /// Which pass through the current repeated section we are in, from 1.
    pass: u32,
    /// The pass an alternate ending is restricted to.
    fine: Option<u32>,
    /// Upper bound on the number of jumps back over the whole run.
    rewinds_left: usize,
}

impl<'a> Digitizer<'a> {
    fn new(config: &'a DigitizerConfig, node_count: usize) -> Self {
        Digitizer {
            config,
            output: Vec::new(),
            time: 0.0,
            beat_duration: 60.0 / config.tempo as f64,
            tonic: config.tonic,
            unit: config.unit,
            leaning: 0,
            last_note_duration: 0.0,
            anchor: None,
            pass: 1,
            fine: None,
            rewinds_left: node_count.saturating_mul(config.repeat_passes as usize),
        }
    }

    fn run(&mut self, notation: &ParsedNotation) -> Result<(), DigitizeError> {
        let nodes = &notation.nodes;
        let mut index = 0;
        while index < nodes.len() {
            let node = &nodes[index];
            index += 1;

            let is_repeat_end = matches!(
                node.kind,
                NodeKind::BarLine {
                    repeat: Repeat::End,
                    ..
                }
            );
            if self.skipping() && !is_repeat_end {
                trace!("pass {}: skipping {:?}", self.pass, node.raw);
                continue;
            }

            match &node.kind {
                NodeKind::Tempo { beat } => self.beat_duration = 60.0 / *beat as f64,
                NodeKind::KeySignature {
                    accidental, pitch, ..
                } => self.tonic = pitch.key(*accidental),
                NodeKind::TimeSignature { unit, .. } => self.unit = *unit,
                NodeKind::Note {
                    continuation,
                    accidental,
                    notation,
                    octave,
                    dot,
                    half,
                    leaning,
                } => self.note(
                    *continuation,
                    *accidental,
                    *notation,
                    *octave,
                    NodeKind::note_length(*half, *dot),
                    *leaning,
                ),
                NodeKind::Dash => self.dash(),
                NodeKind::BarLine {
                    repeat: Repeat::Start,
                    ..
                } => {
                    self.anchor = Some(index);
                    self.pass = 1;
                    self.fine = None;
                }
                NodeKind::BarLine {
                    repeat: Repeat::End,
                    ..
                } => {
                    if let Some(target) = self.repeat_end() {
                        index = target;
                    }
                }
                NodeKind::BarLine {
                    repeat: Repeat::None,
                    ..
                } => {}
                NodeKind::Fine { except } => self.fine = Some(*except),
                NodeKind::Unknown { raw } => debug!("ignoring unknown token {:?}", raw),
            }

            if !self.is_finite() {
                return Err(DigitizeError::OutOfRange {
                    span: node.span.clone(),
                });
            }
        }
        Ok(())
    }

    /// Everything a renderer will see from the current state is a real number.
    fn is_finite(&self) -> bool {
        self.time.is_finite()
            && self.last_note_duration.is_finite()
            && self.output.last().map_or(true, |node| match node {
                DigitizedNode::Frequency { value, time } => value.is_finite() && time.is_finite(),
                DigitizedNode::Break { base, before, time } => {
                    base.is_finite() && before.is_finite() && time.is_finite()
                }
            })
    }

    /// Inside an alternate ending that does not belong to the current pass.
    fn skipping(&self) -> bool {
        matches!(self.fine, Some(except) if except != self.pass)
    }

    /// Decide whether a `:||` jumps back. Returns the index to continue at.
    fn repeat_end(&mut self) -> Option<usize> {
        let anchor = match self.anchor {
            Some(anchor) => anchor,
            None => {
                trace!("repeat end without a start, ignored");
                return None;
            }
        };
        self.fine = None;
        if self.pass < self.config.repeat_passes {
            if self.rewinds_left == 0 {
                warn!("too many repeats, continuing without jumping back");
            } else {
                self.rewinds_left -= 1;
                self.pass += 1;
                trace!("jumping back to node {} for pass {}", anchor, self.pass);
                return Some(anchor);
            }
        }
        // The section is done. The pass number stays around so that an ending
        // following the `:||` can still refer to it.
        self.anchor = None;
        None
    }

    fn note(
        &mut self,
        continuation: bool,
        accidental: Accidental,
        degree: u8,
        octave: i32,
        length: f64,
        leaning: bool,
    ) {
        let frequency = pitch::scale_key(self.tonic, accidental, degree, octave)
            .map_or(0.0, |key| self.config.tuning.frequency(key));
        let actual_duration = length * self.note_unit_duration();
        let leaning_duration = self.leaning as f64 * self.beat_duration / 4.0;

        if !continuation && self.leaning == 0 && degree != 0 {
            self.emit(DigitizedNode::Break {
                base: self.beat_duration,
                before: self.last_note_duration,
                time: self.time,
            });
        }
        self.emit(DigitizedNode::Frequency {
            value: frequency,
            time: self.time + leaning_duration,
        });

        if continuation {
            self.last_note_duration += actual_duration;
        } else {
            self.last_note_duration = actual_duration;
        }
        if leaning {
            self.leaning += 1;
        } else {
            self.leaning = 0;
            self.time += actual_duration;
        }
    }

    fn dash(&mut self) {
        let actual_duration = self.note_unit_duration();
        self.last_note_duration += actual_duration;
        self.time += actual_duration;
    }

    /// Seconds taken by a note of length 1 under the current time signature.
    fn note_unit_duration(&self) -> f64 {
        self.beat_duration * 4.0 / self.unit as f64
    }

    fn emit(&mut self, mut node: DigitizedNode) {
        // Long runs of grace notes can borrow more time than the following
        // notes have, keep the timeline ordered anyway.
        if let Some(last) = self.output.last().map(DigitizedNode::time) {
            match &mut node {
                DigitizedNode::Frequency { time, .. } | DigitizedNode::Break { time, .. } => {
                    *time = time.max(last)
                }
            }
        }
        self.output.push(node);
    }

    fn finish(mut self) -> DigitizedNotation {
        self.emit(DigitizedNode::Break {
            base: self.beat_duration,
            before: self.last_note_duration,
            time: self.time,
        });
        debug!(
            "digitized {} events over {} seconds",
            self.output.len(),
            self.time
        );
        DigitizedNotation {
            nodes: self.output,
            duration: self.time,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::notation::parse;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn key_frequency(number: i32) -> f64 {
        2.0f64.powf((number - 49) as f64 / 12.0) * 440.0
    }

    fn frequencies(source: &str) -> Vec<(f64, f64)> {
        digitize_str(source).unwrap().frequencies().collect()
    }

    fn assert_monotonic(digitized: &DigitizedNotation) {
        for pair in digitized.nodes.windows(2) {
            assert!(pair[0].time() <= pair[1].time(), "{:?}", pair);
        }
    }

    #[test]
    fn single_note_with_defaults() {
        let digitized = digitize_str("1").unwrap();
        let freqs: Vec<_> = digitized.frequencies().collect();
        assert_eq!(freqs.len(), 1);
        assert_eq!(freqs[0].0, 0.0);
        assert!(close(freqs[0].1, key_frequency(40)));
        assert!((freqs[0].1 - 261.63).abs() < 0.01);
        assert_eq!(digitized.duration, 1.0);
    }

    #[test]
    fn breaks_around_notes() {
        let digitized = digitize_str("1 2").unwrap();
        assert_eq!(
            digitized.nodes,
            vec![
                DigitizedNode::Break {
                    base: 1.0,
                    before: 0.0,
                    time: 0.0
                },
                DigitizedNode::Frequency {
                    value: key_frequency(40),
                    time: 0.0
                },
                DigitizedNode::Break {
                    base: 1.0,
                    before: 1.0,
                    time: 1.0
                },
                DigitizedNode::Frequency {
                    value: key_frequency(42),
                    time: 1.0
                },
                DigitizedNode::Break {
                    base: 1.0,
                    before: 1.0,
                    time: 2.0
                },
            ]
        );
    }

    #[test]
    fn dash_extends_previous_note() {
        let digitized = digitize_str("1 -").unwrap();
        assert_eq!(digitized.duration, 2.0);
        assert_eq!(digitized.frequencies().count(), 1);
        assert_eq!(
            digitized.nodes.last(),
            Some(&DigitizedNode::Break {
                base: 1.0,
                before: 2.0,
                time: 2.0
            })
        );
    }

    #[test]
    fn tie_does_not_rearticulate() {
        let digitized = digitize_str("3 ^3_ 5").unwrap();
        assert_eq!(digitized.breaks().collect::<Vec<_>>(), vec![0.0, 1.5, 2.5]);
        assert_eq!(digitized.frequencies().count(), 3);
        let befores: Vec<_> = digitized
            .nodes
            .iter()
            .filter_map(|node| match node {
                DigitizedNode::Break { before, .. } => Some(*before),
                _ => None,
            })
            .collect();
        assert_eq!(befores, vec![0.0, 1.5, 1.0]);
    }

    #[test]
    fn rests_are_silent_and_not_attacked() {
        let digitized = digitize_str("0 1").unwrap();
        assert_eq!(
            digitized.nodes[0],
            DigitizedNode::Frequency {
                value: 0.0,
                time: 0.0
            }
        );
        assert_eq!(digitized.breaks().collect::<Vec<_>>(), vec![1.0, 2.0]);
    }

    #[test]
    fn grace_note_borrows_from_main_note() {
        let plain = frequencies("2");
        let graced = digitize_str("1& 2").unwrap();
        let freqs: Vec<_> = graced.frequencies().collect();
        assert_eq!(freqs.len(), 2);
        assert_eq!(freqs[0].0, 0.0);
        assert_eq!(freqs[1].0, plain[0].0 + 0.25);
        assert_eq!(graced.duration, 1.0);
        // Only the grace note attacks, plus the closing break.
        assert_eq!(graced.breaks().collect::<Vec<_>>(), vec![0.0, 1.0]);
    }

    #[test]
    fn double_grace_note() {
        let freqs = frequencies("!120 5& 6& 1+");
        let times: Vec<_> = freqs.iter().map(|(time, _)| *time).collect();
        assert_eq!(times, vec![0.0, 0.125, 0.25]);
    }

    #[test]
    fn graces_never_run_backwards() {
        let digitized = digitize_str("1& 2& 3& 4& 5& 6& 7_ 1").unwrap();
        assert_monotonic(&digitized);
    }

    #[test]
    fn tempo_and_time_signature() {
        let digitized = digitize_str("!120 3/8 1 2_ 3.").unwrap();
        let times: Vec<_> = digitized.frequencies().map(|(time, _)| time).collect();
        assert_eq!(times, vec![0.0, 0.25, 0.375]);
        assert_eq!(digitized.duration, 0.75);
    }

    #[test]
    fn key_signature_flat() {
        let freqs = frequencies("1=bB 1");
        assert!(close(freqs[0].1, key_frequency(50)));
        assert!((freqs[0].1 - 466.16).abs() < 0.01);
        let natural = frequencies("1=B 1");
        assert!(close(natural[0].1, key_frequency(51)));
    }

    #[test]
    fn accidentals_and_octaves() {
        let freqs = frequencies("1=G #4 7- 3++");
        assert!(close(freqs[0].1, key_frequency(47 + 6)));
        assert!(close(freqs[1].1, key_frequency(47 + 11 - 12)));
        assert!(close(freqs[2].1, key_frequency(47 + 4 + 24)));
    }

    #[test]
    fn simple_repeat_plays_twice() {
        let digitized = digitize_str("||: 1 2 :||").unwrap();
        let freqs: Vec<_> = digitized.frequencies().collect();
        let times: Vec<_> = freqs.iter().map(|(time, _)| *time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(freqs[0].1, freqs[2].1);
        assert_eq!(freqs[1].1, freqs[3].1);
        assert_eq!(digitized.duration, 4.0);
        assert_monotonic(&digitized);
    }

    #[test]
    fn second_ending_only_on_second_pass() {
        let freqs = frequencies("||: 1 [2. 2 :|| 3");
        let values: Vec<_> = freqs.iter().map(|(_, value)| *value).collect();
        assert_eq!(
            values,
            vec![
                key_frequency(40),
                key_frequency(40),
                key_frequency(42),
                key_frequency(44)
            ]
        );
    }

    #[test]
    fn first_and_second_endings() {
        let digitized = digitize_str("||: 1 [1. 2 :|| [2. 3 ||").unwrap();
        let values: Vec<_> = digitized.frequencies().map(|(_, value)| value).collect();
        assert_eq!(
            values,
            vec![
                key_frequency(40),
                key_frequency(42),
                key_frequency(40),
                key_frequency(44)
            ]
        );
        assert_eq!(digitized.duration, 4.0);
    }

    #[test]
    fn plain_double_bar_does_not_repeat() {
        let digitized = digitize_str("||: 1 2 ||").unwrap();
        assert_eq!(digitized.duration, 2.0);
    }

    #[test]
    fn repeat_end_without_start_is_inert() {
        let digitized = digitize_str("1 :|| 2").unwrap();
        assert_eq!(digitized.frequencies().count(), 2);
        assert_eq!(digitized.duration, 2.0);
    }

    #[test]
    fn repeat_is_consumed_once() {
        let digitized = digitize_str("||: 1 :|| :|| 2 :||").unwrap();
        assert_eq!(digitized.duration, 3.0);
    }

    #[test]
    fn nested_start_moves_anchor() {
        let digitized = digitize_str("||: 1 ||: 2 :|| 3 :||").unwrap();
        let times: Vec<_> = digitized.frequencies().map(|(time, _)| time).collect();
        assert_eq!(times, vec![0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn configurable_repeat_passes() {
        let config = DigitizerConfig {
            repeat_passes: 3,
            ..DigitizerConfig::default()
        };
        let digitized = digitize_with(&parse("||: 1 [3. 2 :||"), &config).unwrap();
        assert_eq!(digitized.duration, 4.0);
        let config = DigitizerConfig {
            repeat_passes: 1,
            ..DigitizerConfig::default()
        };
        let digitized = digitize_with(&parse("||: 1 :||"), &config).unwrap();
        assert_eq!(digitized.duration, 1.0);
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        let digitized = digitize_str("1 @@ 2 ?x").unwrap();
        assert_eq!(digitized.duration, 2.0);
        assert_eq!(digitized.frequencies().count(), 2);
    }

    #[test]
    fn empty_notation() {
        let digitized = digitize_str("").unwrap();
        assert_eq!(digitized.duration, 0.0);
        assert_eq!(
            digitized.nodes,
            vec![DigitizedNode::Break {
                base: 1.0,
                before: 0.0,
                time: 0.0
            }]
        );
    }

    #[test]
    fn zero_tempo_is_rejected() {
        assert_eq!(
            digitize_str("1 !0 2"),
            Err(DigitizeError::ZeroTempo { span: 2..4 })
        );
    }

    #[test]
    fn zero_unit_is_rejected() {
        assert_eq!(
            digitize_str("3/0 1"),
            Err(DigitizeError::ZeroUnit { span: 0..3 })
        );
    }

    #[test]
    fn many_dots_stay_finite() {
        let digitized = digitize_str(&format!("1{} 2", ".".repeat(1100))).unwrap();
        assert_eq!(digitized.duration, 3.0);
        assert!(digitized.nodes.iter().all(|node| node.time().is_finite()));
    }

    #[test]
    fn unreachable_octave_is_rejected() {
        let source = format!("1 1{}", "+".repeat(1100));
        assert_eq!(
            digitize_str(&source),
            Err(DigitizeError::OutOfRange {
                span: 2..source.len()
            })
        );
    }

    #[test]
    fn invalid_config() {
        let config = DigitizerConfig {
            tempo: 0,
            ..DigitizerConfig::default()
        };
        assert!(matches!(
            digitize_with(&parse("1"), &config),
            Err(DigitizeError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn digitizing_is_repeatable() {
        let parsed = parse("!90 1=D ||: 1 2& 3_ ^3_ [2. 5 - :|| 0 6..");
        let first = digitize(&parsed).unwrap();
        let second = digitize(&parsed).unwrap();
        assert_eq!(first, second);
        assert_monotonic(&first);
        assert!(first.nodes.iter().all(|node| node.time().is_finite()));
    }
}
