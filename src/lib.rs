// jianpu -- numbered musical notation to timed pitch events
// Copyright (C) 2026  jianpu contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! Numbered musical notation ("jianpu") in, timed pitch events out.
//!
//! Text is split into tokens, each token is classified into a
//! [`notation::ParsedNode`], and the [`digitizer`] walks those nodes to
//! produce frequency and articulation events for a synthesizer.

pub mod digitizer;
pub mod notation;
pub mod pitch;

pub use digitizer::{digitize, digitize_str, DigitizedNode, DigitizedNotation};
pub use notation::{parse, ParsedNotation};
