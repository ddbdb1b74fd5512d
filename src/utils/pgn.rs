//! PGN-style read/write for saving and restoring games.
//!
//! The move text uses long algebraic tokens (`1. e2e4 e7e5 2. g1f3 ...`), so a
//! file can be replayed without a SAN resolver. Positions that do not start
//! from the standard setup carry `SetUp`/`FEN` tags.

use std::collections::BTreeMap;

use crate::errors::{ChessError, ChessResult};
use crate::game_state::chess_rules::STARTING_POSITION_FEN;
use crate::game_state::chess_types::Color;
use crate::game_state::position::Position;
use crate::moves::chess_move::Move;
use crate::utils::long_algebraic::parse_long_algebraic;

#[derive(Debug, Clone)]
pub struct PgnGame {
    pub headers: BTreeMap<String, String>,
    pub initial_position: Position,
    pub moves: Vec<Move>,
    pub final_position: Position,
    pub result: String,
}

/// Standard seven-tag roster, dated today.
pub fn default_headers(result: &str) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::<String, String>::new();
    headers.insert("Event".to_owned(), "Casual Game".to_owned());
    headers.insert("Site".to_owned(), "Local".to_owned());
    headers.insert(
        "Date".to_owned(),
        chrono::Local::now().format("%Y.%m.%d").to_string(),
    );
    headers.insert("Round".to_owned(), "-".to_owned());
    headers.insert("White".to_owned(), "White".to_owned());
    headers.insert("Black".to_owned(), "Black".to_owned());
    headers.insert("Result".to_owned(), normalize_result(result).to_owned());
    headers
}

pub fn write_pgn(initial: &Position, moves: &[Move], result: &str) -> ChessResult<String> {
    write_pgn_with_headers(initial, moves, &default_headers(result))
}

pub fn write_pgn_with_headers(
    initial: &Position,
    moves: &[Move],
    headers: &BTreeMap<String, String>,
) -> ChessResult<String> {
    let mut headers = headers.clone();
    let initial_fen = initial.fen();
    if initial_fen != STARTING_POSITION_FEN {
        headers.insert("SetUp".to_owned(), "1".to_owned());
        headers.insert("FEN".to_owned(), initial_fen);
    }

    let mut out = String::new();
    for (key, value) in &headers {
        out.push_str(&format!("[{} \"{}\"]\n", key, escape_pgn_value(value)));
    }
    out.push('\n');

    let mut position = initial.clone();
    let mut movetext_parts = Vec::<String>::with_capacity(moves.len() + 1);
    for (index, mv) in moves.iter().enumerate() {
        if position.side_to_move() == Color::White {
            movetext_parts.push(format!("{}. {}", position.fullmove_number(), mv));
        } else if index == 0 {
            movetext_parts.push(format!("{}... {}", position.fullmove_number(), mv));
        } else {
            movetext_parts.push(mv.to_string());
        }
        position = position.play(mv)?;
    }

    let result = headers
        .get("Result")
        .map(|x| normalize_result(x))
        .unwrap_or("*");
    movetext_parts.push(result.to_owned());
    out.push_str(&movetext_parts.join(" "));
    out.push('\n');

    Ok(out)
}

pub fn read_pgn(pgn: &str) -> ChessResult<PgnGame> {
    let mut headers = BTreeMap::<String, String>::new();
    let mut movetext_lines = Vec::<String>::new();

    for line in pgn.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('[') {
            let (k, v) = parse_header_line(trimmed)?;
            headers.insert(k, v);
        } else {
            movetext_lines.push(trimmed.to_owned());
        }
    }

    let initial_position = if headers.get("SetUp").map(|x| x.as_str()) == Some("1") {
        let fen = headers
            .get("FEN")
            .ok_or_else(|| ChessError::InvalidPgn("SetUp is 1 but the FEN tag is missing".to_owned()))?;
        Position::from_fen(fen)?
    } else {
        Position::starting()
    };

    let mut position = initial_position.clone();
    let mut moves = Vec::<Move>::new();
    let mut result = "*".to_owned();

    let movetext = strip_pgn_comments_and_variations(&movetext_lines.join(" "));
    for token in movetext.split_whitespace() {
        if is_move_number_token(token) {
            continue;
        }

        let cleaned = trim_annotation_suffix(strip_move_number_prefix(token));
        if is_result_token(cleaned) {
            result = cleaned.to_owned();
            break;
        }

        let mv = parse_long_algebraic(cleaned, &position)
            .map_err(|err| ChessError::InvalidPgn(format!("move {} '{cleaned}': {err}", moves.len() + 1)))?;
        position = position.play(&mv)?;
        moves.push(mv);
    }

    if let Some(header_result) = headers.get("Result") {
        result = normalize_result(header_result).to_owned();
    }

    Ok(PgnGame {
        headers,
        initial_position,
        moves,
        final_position: position,
        result,
    })
}

fn parse_header_line(line: &str) -> ChessResult<(String, String)> {
    let invalid = || ChessError::InvalidPgn(format!("bad tag pair: {line}"));
    let inner = line
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .ok_or_else(invalid)?;
    let (key, value_raw) = inner.split_once(' ').ok_or_else(invalid)?;
    let value = value_raw
        .trim()
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .ok_or_else(invalid)?;
    Ok((key.trim().to_owned(), value.replace("\\\"", "\"")))
}

fn strip_pgn_comments_and_variations(text: &str) -> String {
    let mut out = String::new();
    let mut brace_depth = 0usize;
    let mut paren_depth = 0usize;

    for ch in text.chars() {
        match ch {
            '{' => brace_depth = brace_depth.saturating_add(1),
            '}' => brace_depth = brace_depth.saturating_sub(1),
            '(' => paren_depth = paren_depth.saturating_add(1),
            ')' => paren_depth = paren_depth.saturating_sub(1),
            _ if brace_depth == 0 && paren_depth == 0 => out.push(ch),
            _ => {}
        }
    }

    out
}

fn is_move_number_token(token: &str) -> bool {
    let digits = token.trim_end_matches('.');
    digits.len() < token.len() && !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}

/// `12.e2e4` style tokens with no space after the number.
fn strip_move_number_prefix(token: &str) -> &str {
    match token.rfind('.') {
        Some(dot) if token[..dot].trim_end_matches('.').chars().all(|c| c.is_ascii_digit()) => {
            &token[dot + 1..]
        }
        _ => token,
    }
}

fn trim_annotation_suffix(token: &str) -> &str {
    token.trim_end_matches(|c: char| matches!(c, '+' | '#' | '!' | '?'))
}

fn is_result_token(token: &str) -> bool {
    matches!(token, "1-0" | "0-1" | "1/2-1/2" | "*")
}

fn normalize_result(result: &str) -> &str {
    if is_result_token(result) {
        result
    } else {
        "*"
    }
}

fn escape_pgn_value(value: &str) -> String {
    value.replace('"', "\\\"")
}

#[cfg(test)]
mod tests {
    use super::{read_pgn, write_pgn, write_pgn_with_headers};
    use std::collections::BTreeMap;

    use crate::errors::ChessError;
    use crate::game_state::position::Position;
    use crate::utils::long_algebraic::parse_long_algebraic;

    #[test]
    fn pgn_round_trip_start_position_history() {
        let mut position = Position::starting();
        let mut history = Vec::new();

        for lan in ["e2e4", "e7e5", "g1f3", "b8c6"] {
            let mv = parse_long_algebraic(lan, &position).expect("LAN should parse");
            position = position.play(&mv).expect("move should apply");
            history.push(mv);
        }

        let pgn = write_pgn(&Position::starting(), &history, "*").expect("PGN should write");
        assert!(pgn.contains("1. e2e4 e7e5 2. g1f3 b8c6 *"));
        assert!(pgn.contains("[Date \""));

        let parsed = read_pgn(&pgn).expect("PGN should parse");
        assert_eq!(parsed.moves, history);
        assert_eq!(parsed.final_position, position);
        assert_eq!(parsed.result, "*");
    }

    #[test]
    fn pgn_round_trip_custom_fen_setup() {
        let initial = Position::from_fen("4k3/8/8/8/8/8/4P3/4K3 b - - 0 1").expect("FEN should parse");
        let mv = parse_long_algebraic("e8d7", &initial).expect("LAN should parse");
        let history = vec![mv];

        let mut headers = BTreeMap::<String, String>::new();
        headers.insert("Event".to_owned(), "Custom".to_owned());
        headers.insert("Result".to_owned(), "1-0".to_owned());

        let pgn = write_pgn_with_headers(&initial, &history, &headers).expect("PGN should write");
        assert!(pgn.contains("1... e8d7"));
        let parsed = read_pgn(&pgn).expect("PGN should parse");

        assert_eq!(parsed.initial_position, initial);
        assert_eq!(parsed.moves, history);
        assert_eq!(parsed.result, "1-0");
    }

    #[test]
    fn comments_variations_and_annotations_are_skipped() {
        let pgn = "[Result \"*\"]\n\n1. e2e4 {best by test} e7e5 (1... c7c5) 2.g1f3! *\n";
        let parsed = read_pgn(pgn).expect("PGN should parse");
        assert_eq!(parsed.moves.len(), 3);
    }

    #[test]
    fn illegal_move_in_movetext_is_rejected() {
        let err = read_pgn("1. e2e5 *").expect_err("illegal move must fail");
        assert!(matches!(err, ChessError::InvalidPgn(_)));

        let err = read_pgn("[SetUp \"1\"]\n1. e2e4 *").expect_err("missing FEN must fail");
        assert!(matches!(err, ChessError::InvalidPgn(_)));
    }
}
