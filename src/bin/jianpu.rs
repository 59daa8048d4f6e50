// jianpu -- numbered musical notation to timed pitch events
// Copyright (C) 2026  jianpu contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation.
//
// A copy of the license can be found in the LICENSE file in the root of
// this repository.

//! `jianpu` - inspect what the digitizer makes of a notation file.

use std::io;
use std::path::PathBuf;
use std::str::FromStr;

use log::{error, info, warn};
use snafu::{ResultExt, Snafu};
use structopt::StructOpt;

use jianpu::digitizer::{self, DigitizeError, DigitizedNode, DigitizerConfig};
use jianpu::notation::{self, pretty, LineMap};
use jianpu::pitch::Tuning;

#[derive(Debug, StructOpt)]
#[structopt(name = "jianpu", about = "Turning numbered notation into timed pitches")]
struct Opt {
    #[structopt(short = "v", long = "verbose", parse(from_occurrences))]
    verbose: usize,

    /// The notation source.
    #[structopt(parse(from_os_str))]
    source: PathBuf,

    /// What to print: `events`, `nodes` or `text`.
    #[structopt(short, long, default_value = "events")]
    dump: Dump,

    /// Fail if the source contains tokens outside of the grammar.
    #[structopt(long)]
    strict: bool,

    /// Beats per minute before the first tempo mark.
    #[structopt(long, default_value = "60")]
    tempo: u32,

    /// Beat unit before the first time signature.
    #[structopt(long, default_value = "4")]
    unit: u32,

    /// How often a repeated section is played.
    #[structopt(long, default_value = "2")]
    repeat_passes: u32,

    /// Frequency of A4 in Hz.
    #[structopt(long, default_value = "440")]
    reference: f64,
}

#[derive(Debug, Clone, Copy)]
enum Dump {
    /// Digitized frequency and break events.
    Events,
    /// Parsed nodes with their positions.
    Nodes,
    /// The notation re-serialized in canonical form.
    Text,
}

impl FromStr for Dump {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "events" => Ok(Dump::Events),
            "nodes" => Ok(Dump::Nodes),
            "text" => Ok(Dump::Text),
            other => Err(format!("unknown dump format {:?}", other)),
        }
    }
}

#[derive(Debug, Snafu)]
enum CliError {
    #[snafu(display("Could not read {}: {}", path.display(), source))]
    ReadSource { path: PathBuf, source: io::Error },
    #[snafu(display("{}", source))]
    Digitize { source: DigitizeError },
    #[snafu(display("Found {} unknown token(s)", count))]
    UnknownTokens { count: usize },
}

fn main() {
    let opt = Opt::from_args();

    let level = match opt.verbose {
        0 => log::Level::Info,
        1 => log::Level::Debug,
        _ => log::Level::Trace,
    };
    simple_logger::init_with_level(level).unwrap();

    if let Err(err) = run(&opt) {
        error!("{}", err);
        std::process::exit(1);
    }
}

fn run(opt: &Opt) -> Result<(), CliError> {
    let source = std::fs::read_to_string(&opt.source).context(ReadSource {
        path: opt.source.clone(),
    })?;
    let line_map = LineMap::new(&source);
    let parsed = notation::parse(&source);
    info!("parsed {} tokens from {}", parsed.nodes.len(), opt.source.display());

    let mut unknown = 0;
    for node in parsed.unknown_nodes() {
        unknown += 1;
        warn!(
            "unknown token {:?}\n{}",
            node.raw,
            line_map.highlight(&node.span, true)
        );
    }
    if opt.strict && unknown > 0 {
        return Err(CliError::UnknownTokens { count: unknown });
    }

    match opt.dump {
        Dump::Nodes => {
            for node in &parsed.nodes {
                let pos = node
                    .pos
                    .map_or_else(|| "-".to_string(), |pos| pos.to_string());
                println!("{:>8} {:?}", pos, node.kind);
            }
        }
        Dump::Text => println!("{}", pretty::serialize(&parsed)),
        Dump::Events => {
            let config = DigitizerConfig {
                tempo: opt.tempo,
                unit: opt.unit,
                repeat_passes: opt.repeat_passes,
                tuning: Tuning {
                    reference_frequency: opt.reference,
                    ..Tuning::default()
                },
                ..DigitizerConfig::default()
            };
            let digitized = match digitizer::digitize_with(&parsed, &config) {
                Ok(digitized) => digitized,
                Err(err) => {
                    if let DigitizeError::ZeroTempo { span }
                    | DigitizeError::ZeroUnit { span }
                    | DigitizeError::OutOfRange { span } = &err
                    {
                        eprint!("{}", line_map.highlight(span, true));
                    }
                    return Err(err).context(Digitize);
                }
            };
            for node in &digitized.nodes {
                match node {
                    DigitizedNode::Frequency { value, time } => {
                        println!("{:>10.4}s  freq   {:.3} Hz", time, value)
                    }
                    DigitizedNode::Break { base, before, time } => println!(
                        "{:>10.4}s  break  base {:.4}s, before {:.4}s",
                        time, base, before
                    ),
                }
            }
            println!("duration {:.4}s", digitized.duration);
        }
    }
    Ok(())
}
