// jianpu -- numbered musical notation to timed pitch events
// Copyright (C) 2026  jianpu contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Turns parsed nodes back into notation text.

use std::fmt::Write;

use super::{NodeKind, ParsedNode, ParsedNotation, Repeat};

/// The canonical token of a node kind.
/// Solfège names come out as scale-degree digits.
///
/// # Examples
///
/// ```
/// use jianpu::notation::{classify::classify_kind, pretty::token};
///
/// assert_eq!(token(&classify_kind("^b6+_.&")), "^b6+_.&");
/// assert_eq!(token(&classify_kind("sol--")), "5--");
/// ```
pub fn token(kind: &NodeKind) -> String {
    let mut out = String::new();
    match kind {
        NodeKind::Tempo { beat } => write!(&mut out, "!{}", beat).unwrap(),
        NodeKind::KeySignature {
            tonic,
            accidental,
            pitch,
        } => write!(&mut out, "{}={}{}", tonic, accidental.marker(), pitch).unwrap(),
        NodeKind::TimeSignature { beat, unit } => write!(&mut out, "{}/{}", beat, unit).unwrap(),
        NodeKind::Note {
            continuation,
            accidental,
            notation,
            octave,
            dot,
            half,
            leaning,
        } => {
            if *continuation {
                out.push('^');
            }
            out.push_str(accidental.marker());
            write!(&mut out, "{}", notation).unwrap();
            let octave_marker = if *octave < 0 { "-" } else { "+" };
            out.push_str(&octave_marker.repeat(octave.unsigned_abs() as usize));
            out.push_str(&"_".repeat(*half as usize));
            out.push_str(&".".repeat(*dot as usize));
            if *leaning {
                out.push('&');
            }
        }
        NodeKind::Dash => out.push('-'),
        NodeKind::BarLine { end, repeat } => out.push_str(match (repeat, end) {
            (Repeat::Start, _) => "||:",
            (Repeat::End, _) => ":||",
            (Repeat::None, true) => "||",
            (Repeat::None, false) => "|",
        }),
        NodeKind::Fine { except } => write!(&mut out, "[{}.", except).unwrap(),
        NodeKind::Unknown { raw } => out.push_str(raw),
    }
    out
}

/// Join the tokens of all nodes with single spaces, starting a new line
/// whenever the recorded source line of a node is past the one before it.
pub fn serialize(notation: &ParsedNotation) -> String {
    let mut out = String::new();
    let mut previous: Option<&ParsedNode> = None;
    for node in &notation.nodes {
        if let Some(previous) = previous {
            match (previous.pos, node.pos) {
                (Some(before), Some(after)) if after.line > before.line => out.push('\n'),
                _ => out.push(' '),
            }
        }
        out.push_str(&token(&node.kind));
        previous = Some(node);
    }
    out
}
