// jianpu -- numbered musical notation to timed pitch events
// Copyright (C) 2026  jianpu contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! The parsed form of a numbered-notation text: one typed node per token.

pub mod classify;
pub mod lexer;
pub mod line_map;
pub mod parser;
pub mod pretty;

use crate::pitch::{Accidental, PitchName};

pub use classify::classify;
pub use lexer::Span;
pub use line_map::{LineMap, Pos};
pub use parser::parse;

/// A single token of the notation together with its meaning.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNode {
    /// Byte range of the token in the source.
    pub span: Span,
    /// Human readable start position, if the source was available.
    pub pos: Option<Pos>,
    /// The token exactly as written.
    pub raw: String,
    pub kind: NodeKind,
}

/// Where a bar line sends playback.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Repeat {
    /// `||:`, remembered as the point to jump back to.
    Start,
    None,
    /// `:||`, jumps back to the last start.
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// `!120`
    Tempo { beat: u32 },
    /// `1=bB`
    KeySignature {
        tonic: u8,
        accidental: Accidental,
        pitch: PitchName,
    },
    /// `3/4`
    TimeSignature { beat: u32, unit: u32 },
    /// `^#5+_.&` and friends.
    Note {
        /// Tied to the previous note.
        continuation: bool,
        accidental: Accidental,
        /// Scale degree, 0 is a rest.
        notation: u8,
        octave: i32,
        dot: u32,
        half: u32,
        /// Grace note, borrows its time from the next note.
        leaning: bool,
    },
    Dash,
    BarLine { end: bool, repeat: Repeat },
    /// `[2.`
    Fine { except: u32 },
    Unknown { raw: String },
}

impl NodeKind {
    /// Length of a note in beats: halved once per underscore, then extended by
    /// half of the remaining length once per dot.
    ///
    /// # Examples
    ///
    /// ```
    /// use jianpu::notation::NodeKind;
    ///
    /// assert_eq!(NodeKind::note_length(0, 0), 1.0);
    /// assert_eq!(NodeKind::note_length(1, 0), 0.5);
    /// assert_eq!(NodeKind::note_length(0, 1), 1.5);
    /// assert_eq!(NodeKind::note_length(1, 2), 0.875);
    /// ```
    pub fn note_length(half: u32, dot: u32) -> f64 {
        let halved = 2.0f64.powi(-(half as i32));
        let dotted = 2.0 - 2.0f64.powi(-(dot as i32));
        halved * dotted
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, NodeKind::Unknown { .. })
    }
}

/// The result of parsing a notation text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedNotation {
    pub nodes: Vec<ParsedNode>,
}

impl ParsedNotation {
    /// The node kinds in order, without any positional information.
    pub fn kinds(&self) -> Vec<&NodeKind> {
        self.nodes.iter().map(|node| &node.kind).collect()
    }

    /// All tokens that did not match any rule of the grammar.
    pub fn unknown_nodes(&self) -> impl Iterator<Item = &ParsedNode> {
        self.nodes.iter().filter(|node| node.kind.is_unknown())
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
