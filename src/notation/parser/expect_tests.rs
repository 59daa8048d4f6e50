use super::parse;
use expect_test::{expect, Expect};

fn check(input: &str, output: Expect) {
    let parsed = parse(input);
    let mut debug = String::new();
    for node in &parsed.nodes {
        let pos = node
            .pos
            .map_or_else(|| "-".to_string(), |pos| pos.to_string());
        debug.push_str(&format!("{:?} {} {:?}\n", node.span, pos, node.kind));
    }
    output.assert_eq(&debug);
}

#[test]
fn parse_empty() {
    check("", expect![[r#""#]]);
}

#[test]
fn parse_header_and_measure() {
    check(
        "!120 1=bB 3/4\n1 2_ - |\n",
        expect![[r#"
            0..4 1:1 Tempo { beat: 120 }
            5..9 1:6 KeySignature { tonic: 1, accidental: Flat, pitch: B }
            10..13 1:11 TimeSignature { beat: 3, unit: 4 }
            14..15 2:1 Note { continuation: false, accidental: Natural, notation: 1, octave: 0, dot: 0, half: 0, leaning: false }
            16..18 2:3 Note { continuation: false, accidental: Natural, notation: 2, octave: 0, dot: 0, half: 1, leaning: false }
            19..20 2:6 Dash
            21..22 2:8 BarLine { end: false, repeat: None }
        "#]],
    );
}

#[test]
fn parse_repeat_structure() {
    check(
        "||: ^5.& [2. :|| @x",
        expect![[r#"
            0..3 1:1 BarLine { end: false, repeat: Start }
            4..8 1:5 Note { continuation: true, accidental: Natural, notation: 5, octave: 0, dot: 1, half: 0, leaning: true }
            9..12 1:10 Fine { except: 2 }
            13..16 1:14 BarLine { end: false, repeat: End }
            17..19 1:18 Unknown { raw: "@x" }
        "#]],
    );
}

#[test]
fn parse_solfege() {
    check(
        "Do re+ #fa--",
        expect![[r#"
            0..2 1:1 Note { continuation: false, accidental: Natural, notation: 1, octave: 0, dot: 0, half: 0, leaning: false }
            3..6 1:4 Note { continuation: false, accidental: Natural, notation: 2, octave: 1, dot: 0, half: 0, leaning: false }
            7..12 1:8 Note { continuation: false, accidental: Sharp, notation: 4, octave: -2, dot: 0, half: 0, leaning: false }
        "#]],
    );
}

#[test]
fn unknown_tokens_do_not_stop_parsing() {
    let parsed = parse("1 ?? 2 !x 3");
    let unknown: Vec<_> = parsed.unknown_nodes().map(|node| node.raw.as_str()).collect();
    assert_eq!(unknown, vec!["??", "!x"]);
    assert_eq!(parsed.nodes.len(), 5);
}
