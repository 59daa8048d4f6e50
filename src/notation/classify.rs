// jianpu -- numbered musical notation to timed pitch events
// Copyright (C) 2026  jianpu contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Grammar dispatch: turns a single token into a typed node.
//!
//! The rules are tried in the order of [`RULES`], most specific first.
//! The first rule that accepts a token decides its kind, tokens rejected by
//! all of them become [`NodeKind::Unknown`].

use super::{
    lexer::Span,
    line_map::LineMap,
    NodeKind, ParsedNode, Repeat,
};
use crate::pitch::{Accidental, PitchName};

/// Name of a grammar rule.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Rule {
    Tempo,
    KeySignature,
    TimeSignature,
    Note,
    Dash,
    BarLine,
    Fine,
}

/// A rule accepts a complete token or rejects it with `None`.
pub type Matcher = fn(&str) -> Option<NodeKind>;

/// All rules in order of precedence.
pub const RULES: &[(Rule, Matcher)] = &[
    (Rule::Tempo, match_tempo as Matcher),
    (Rule::KeySignature, match_key_signature as Matcher),
    (Rule::TimeSignature, match_time_signature as Matcher),
    (Rule::Note, match_note as Matcher),
    (Rule::Dash, match_dash as Matcher),
    (Rule::BarLine, match_bar_line as Matcher),
    (Rule::Fine, match_fine as Matcher),
];

/// Classify a token found at byte `offset` of the source.
/// The line map, if given, is used to attach a line/column position.
pub fn classify(token: &str, offset: usize, line_map: Option<&LineMap>) -> ParsedNode {
    let span: Span = offset..offset + token.len();
    ParsedNode {
        pos: line_map.map(|map| map.offset_to_pos(offset)),
        span,
        raw: token.to_string(),
        kind: classify_kind(token),
    }
}

/// Just the kind of a token, without any position information.
///
/// # Examples
///
/// ```
/// use jianpu::notation::{classify::classify_kind, NodeKind};
///
/// assert_eq!(classify_kind("!90"), NodeKind::Tempo { beat: 90 });
/// assert_eq!(classify_kind("-"), NodeKind::Dash);
/// assert!(classify_kind("8").is_unknown());
/// ```
pub fn classify_kind(token: &str) -> NodeKind {
    RULES
        .iter()
        .find_map(|(_, matcher)| matcher(token))
        .unwrap_or_else(|| NodeKind::Unknown {
            raw: token.to_string(),
        })
}

/// The first rule accepting the token, if any.
pub fn rule_of(token: &str) -> Option<Rule> {
    RULES
        .iter()
        .find(|(_, matcher)| matcher(token).is_some())
        .map(|(rule, _)| *rule)
}

/// A non-empty run of ASCII digits that fits into an `u32`.
fn digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn match_tempo(token: &str) -> Option<NodeKind> {
    let beat = digits(token.strip_prefix('!')?)?;
    Some(NodeKind::Tempo { beat })
}

fn match_key_signature(token: &str) -> Option<NodeKind> {
    let mut chars = token.chars();
    let tonic = match chars.next()? {
        ch @ '1'..='7' => ch as u8 - b'0',
        _ => return None,
    };
    if chars.next()? != '=' {
        return None;
    }
    let rest: Vec<char> = chars.collect();
    let (accidental, pitch) = match rest.as_slice() {
        [pitch] => (Accidental::Natural, PitchName::from_char(*pitch)?),
        [accidental, pitch] => (
            Accidental::from_char(*accidental)?,
            PitchName::from_char(*pitch)?,
        ),
        _ => return None,
    };
    Some(NodeKind::KeySignature {
        tonic,
        accidental,
        pitch,
    })
}

fn match_time_signature(token: &str) -> Option<NodeKind> {
    let (beat, unit) = token.split_once('/')?;
    Some(NodeKind::TimeSignature {
        beat: digits(beat)?,
        unit: digits(unit)?,
    })
}

fn match_note(token: &str) -> Option<NodeKind> {
    let (continuation, rest) = match token.strip_prefix('^') {
        Some(rest) => (true, rest),
        None => (false, token),
    };
    // A leading `b` is either a flat or the start of a name, try the flat first.
    let accidental = rest.chars().next().and_then(Accidental::from_char);
    let body = accidental
        .and_then(|accidental| Some((accidental, note_body(&rest[1..])?)))
        .or_else(|| Some((Accidental::Natural, note_body(rest)?)));
    let (accidental, body) = body?;
    Some(NodeKind::Note {
        continuation,
        accidental,
        notation: body.notation,
        octave: body.octave,
        dot: body.dot,
        half: body.half,
        leaning: body.leaning,
    })
}

/// Everything of a note after the continuation and accidental markers.
struct NoteBody {
    notation: u8,
    octave: i32,
    dot: u32,
    half: u32,
    leaning: bool,
}

fn note_body(s: &str) -> Option<NoteBody> {
    let first = s.chars().next()?;
    let (notation, rest) = match first {
        '0'..='7' => (first as u8 - b'0', &s[1..]),
        _ => {
            let name_len = s
                .find(|ch: char| !ch.is_ascii_alphabetic())
                .unwrap_or_else(|| s.len());
            if name_len == 0 {
                return None;
            }
            // Letters that spell no syllable are rests.
            (solfege_degree(&s[..name_len]).unwrap_or(0), &s[name_len..])
        }
    };

    let raised = count_leading(rest, '+');
    let lowered = if raised == 0 { count_leading(rest, '-') } else { 0 };
    let rest = &rest[raised + lowered..];
    let half = count_leading(rest, '_');
    let rest = &rest[half..];
    let dot = count_leading(rest, '.');
    let rest = &rest[dot..];
    let leaning = match rest {
        "" => false,
        "&" => true,
        _ => return None,
    };

    Some(NoteBody {
        notation,
        octave: raised as i32 - lowered as i32,
        dot: dot as u32,
        half: half as u32,
        leaning,
    })
}

/// Number of leading ASCII `marker` characters, which is also their length in bytes.
fn count_leading(s: &str, marker: char) -> usize {
    s.chars().take_while(|ch| *ch == marker).count()
}

/// Movable-do syllables, case insensitive.
fn solfege_degree(name: &str) -> Option<u8> {
    match name.to_ascii_lowercase().as_str() {
        "do" => Some(1),
        "re" => Some(2),
        "mi" => Some(3),
        "fa" => Some(4),
        "so" | "sol" => Some(5),
        "la" => Some(6),
        "ti" | "si" => Some(7),
        _ => None,
    }
}

fn match_dash(token: &str) -> Option<NodeKind> {
    if token == "-" {
        Some(NodeKind::Dash)
    } else {
        None
    }
}

fn match_bar_line(token: &str) -> Option<NodeKind> {
    let (end, repeat) = match token {
        "|" => (false, Repeat::None),
        "||" => (true, Repeat::None),
        "||:" => (false, Repeat::Start),
        ":||" => (false, Repeat::End),
        _ => return None,
    };
    Some(NodeKind::BarLine { end, repeat })
}

fn match_fine(token: &str) -> Option<NodeKind> {
    let except = digits(token.strip_prefix('[')?.strip_suffix('.')?)?;
    Some(NodeKind::Fine { except })
}
