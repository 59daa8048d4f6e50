// jianpu -- numbered musical notation to timed pitch events
// Copyright (C) 2026  jianpu contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Mapping byte offsets of a notation text to lines and columns.

use std::fmt::{self, Write};

use super::lexer::Span;

/// Position inside a text in a form that's useful for human readers.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Pos {
    /// Line number, starting at 1
    pub line: usize,
    /// Position within the line, in characters, starting at 1
    pub column: usize,
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A data structure for mapping byte offsets to line/column based positions.
pub struct LineMap<'a> {
    /// Ordered vector of the position of line breaks (`\n`)
    line_offsets: Vec<usize>,
    /// The original string, needed for obtaining the column indices.
    source: &'a str,
}

impl<'a> LineMap<'a> {
    pub fn new(s: &'a str) -> Self {
        Self {
            line_offsets: s
                .char_indices()
                .filter_map(|(pos, ch)| if ch == '\n' { Some(pos) } else { None })
                .collect(),
            source: s,
        }
    }

    /// # Examples
    ///
    /// ```
    /// # use jianpu::notation::line_map::{LineMap, Pos};
    /// let s = "1 2\n3 4_\n#5 ï6\n";
    /// let m = LineMap::new(s);
    /// assert_eq!(m.offset_to_pos(0), Pos { line: 1, column: 1 });
    /// assert_eq!(m.offset_to_pos(2), Pos { line: 1, column: 3 });
    /// assert_eq!(m.offset_to_pos(4), Pos { line: 2, column: 1 });
    /// assert_eq!(m.offset_to_pos(12), Pos { line: 3, column: 4 });
    /// assert_eq!(m.offset_to_pos(14), Pos { line: 3, column: 5 });
    /// ```
    pub fn offset_to_pos(&self, offset: usize) -> Pos {
        // An exact hit means `offset` is the `line`th line-break itself.
        let line = match self.line_offsets.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line,
        };
        let line_start = self.line_start(line + 1);
        let column = self.source[line_start..offset].chars().count() + 1;
        Pos {
            line: line + 1,
            column,
        }
    }

    /// Byte offset where the given line (starting at 1) begins.
    fn line_start(&self, line: usize) -> usize {
        if line <= 1 {
            0
        } else if line - 2 >= self.line_offsets.len() {
            self.source.len()
        } else {
            self.line_offsets[line - 2] + 1
        }
    }

    /// Return the extends of the given line (starting at 1)
    pub fn line_span(&self, line: usize) -> Span {
        let begin = self.line_start(line);
        let end = if line >= 1 && line - 1 < self.line_offsets.len() {
            self.line_offsets[line - 1]
        } else {
            self.source.len()
        };
        begin..end
    }

    /// Print the line containing `span`, preceded by the line before it,
    /// and underline the span with `^` symbols.
    /// Spans reaching past the end of their line are cut off there.
    ///
    /// # Examples
    ///
    /// ```
    /// # use jianpu::notation::line_map::LineMap;
    /// let s = "1=C !90\n1 2 @ 3\n4";
    /// let m = LineMap::new(s);
    /// assert_eq!(
    ///   m.highlight(&(12..13), false),
    /// r#"   1|1=C !90
    ///    2|1 2 @ 3
    ///          ^
    /// "#
    /// )
    /// ```
    pub fn highlight(&self, span: &Span, colored: bool) -> String {
        let mut out = String::new();
        let start = self.offset_to_pos(span.start);
        let display_start = 1.max(start.line - 1);

        let red = "\x1b[31;1m";
        let reset = "\x1b[0m";

        for line in display_start..=start.line {
            let line_span = self.line_span(line);
            let line_str = &self.source[line_span.start..line_span.end];
            let is_target = line == start.line;

            if colored && is_target {
                let begin = span.start - line_span.start;
                let end = span.end.min(line_span.end) - line_span.start;
                write!(
                    &mut out,
                    "{}{:4}|{}{}{}{}{}{}",
                    red,
                    line,
                    reset,
                    &line_str[..begin],
                    red,
                    &line_str[begin..end],
                    reset,
                    &line_str[end..]
                )
                .unwrap();
            } else {
                write!(&mut out, "{:4}|{}", line, line_str).unwrap();
            }
            out.push('\n');

            if is_target {
                let end_column = self
                    .offset_to_pos(span.end.min(line_span.end))
                    .column
                    .max(start.column + 1);
                out.push_str("     ");
                for _ in 1..start.column {
                    out.push(' ');
                }
                for _ in start.column..end_column {
                    out.push('^');
                }
                out.push('\n');
            }
        }
        out
    }
}
