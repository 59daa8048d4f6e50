// jianpu -- numbered musical notation to timed pitch events
// Copyright (C) 2026  jianpu contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Splits a notation text into whitespace separated tokens.

use logos::Logos;

// Re-exports
pub use logos::Span;

#[derive(Logos, Debug, PartialEq, Clone, Copy)]
pub enum Token {
    /// Any run of non-whitespace; the classifier decides what it means.
    #[regex(r"[^\s]+")]
    Word,

    #[error]
    #[regex(r"\s+", logos::skip)]
    Error,
}

/// Iterate over all tokens of `source` together with their byte ranges.
/// Calling it again starts over from the beginning.
pub fn tokenize(source: &str) -> impl Iterator<Item = (&str, Span)> + '_ {
    Token::lexer(source)
        .spanned()
        .filter(|(token, span)| *token == Token::Word && !span.is_empty())
        .map(move |(_, span)| (&source[span.clone()], span))
}

#[cfg(test)]
mod tests {
    use super::tokenize;
    use expect_test::{expect, Expect};

    fn check(input: &str, output: Expect) {
        let tokens = tokenize(input).collect::<Vec<_>>();
        let token_str = format!("{:?}", tokens);
        output.assert_eq(&token_str);
    }

    #[test]
    fn empty() {
        check("", expect![[r#"[]"#]]);
        check(" \n\t ", expect![[r#"[]"#]]);
    }

    #[test]
    fn single_line() {
        check(
            "!120 1 2_ -",
            expect![[r#"[("!120", 0..4), ("1", 5..6), ("2_", 7..9), ("-", 10..11)]"#]],
        );
    }

    #[test]
    fn whitespace_runs() {
        check(
            "  1=C\n\n 3/4\t|| ",
            expect![[r#"[("1=C", 2..5), ("3/4", 8..11), ("||", 12..14)]"#]],
        );
    }

    #[test]
    fn unicode_whitespace() {
        check(
            "1\u{3000}2\u{000B}3\u{00A0}4",
            expect![[r#"[("1", 0..1), ("2", 4..5), ("3", 6..7), ("4", 9..10)]"#]],
        );
    }

    #[test]
    fn restartable() {
        let source = "1 2 3";
        let first: Vec<_> = tokenize(source).collect();
        let second: Vec<_> = tokenize(source).collect();
        assert_eq!(first, second);
    }
}
