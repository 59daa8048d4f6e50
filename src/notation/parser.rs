// jianpu -- numbered musical notation to timed pitch events
// Copyright (C) 2026  jianpu contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Sequences the classifier over all tokens of a source text.

use super::{
    classify::classify,
    lexer::{self, Span},
    line_map::LineMap,
    ParsedNode, ParsedNotation,
};

#[cfg(test)]
mod expect_tests;

/// Parse a complete notation text. Never fails, tokens that are not part of
/// the grammar end up as unknown nodes.
pub fn parse(source: &str) -> ParsedNotation {
    ParsedNotation {
        nodes: Parser::new(source).collect(),
    }
}

/// Lazily yields one node per token in source order.
pub struct Parser<'a> {
    line_map: LineMap<'a>,
    tokens: Box<dyn Iterator<Item = (&'a str, Span)> + 'a>,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> Self {
        Parser {
            line_map: LineMap::new(source),
            tokens: Box::new(lexer::tokenize(source)),
        }
    }
}

impl<'a> Iterator for Parser<'a> {
    type Item = ParsedNode;

    fn next(&mut self) -> Option<ParsedNode> {
        let (token, span) = self.tokens.next()?;
        Some(classify(token, span.start, Some(&self.line_map)))
    }
}
