//! Board-file loading.
//!
//! The board file is JSON with one stack list per color, each stack a
//! `[count, x, y]` triple:
//!
//! ```json
//! {
//!   "white": [[1, 0, 0], [2, 1, 1]],
//!   "black": [[3, 7, 7]]
//! }
//! ```
//!
//! Validation rejects out-of-range coordinates, zero counts, and squares
//! listed twice (within or across colors) before the solver ever sees the
//! state.

use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use expendibots_core::{Board, BoardError};

#[derive(Debug, Deserialize)]
struct BoardFile {
    white: Vec<[u8; 3]>,
    black: Vec<[u8; 3]>,
}

#[derive(Error, Debug)]
pub enum InputError {
    #[error("failed to read board file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed board JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid board setup: {0}")]
    Board(#[from] BoardError),
}

/// Parse a board from JSON text.
pub fn parse_board(text: &str) -> Result<Board, InputError> {
    let file: BoardFile = serde_json::from_str(text)?;
    let to_triples = |stacks: &[[u8; 3]]| -> Vec<(u8, u8, u8)> {
        stacks.iter().map(|&[n, x, y]| (n, x, y)).collect()
    };
    Ok(Board::from_stacks(
        &to_triples(&file.white),
        &to_triples(&file.black),
    )?)
}

/// Read and parse a board file.
pub fn load_board(path: &Path) -> Result<Board, InputError> {
    parse_board(&fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use expendibots_core::{Pos, Side};

    #[test]
    fn test_parse_valid_board() {
        let board = parse_board(
            r#"{"white": [[1, 0, 0], [2, 1, 1]], "black": [[3, 7, 7]]}"#,
        )
        .unwrap();
        assert_eq!(board.occupant(Pos::new(1, 1)), Some((Side::White, 2)));
        assert_eq!(board.total(Side::Black), 3);
    }

    #[test]
    fn test_parse_empty_sides() {
        let board = parse_board(r#"{"white": [], "black": []}"#).unwrap();
        assert_eq!(board.total(Side::White), 0);
        assert_eq!(board.total(Side::Black), 0);
    }

    #[test]
    fn test_reject_bad_json() {
        assert!(matches!(
            parse_board("{not json"),
            Err(InputError::Json(_))
        ));
        // Missing a color key is a format error, not a board error.
        assert!(matches!(
            parse_board(r#"{"white": []}"#),
            Err(InputError::Json(_))
        ));
    }

    #[test]
    fn test_reject_invalid_setups() {
        assert!(matches!(
            parse_board(r#"{"white": [[1, 8, 0]], "black": []}"#),
            Err(InputError::Board(BoardError::OutOfBounds { .. }))
        ));
        assert!(matches!(
            parse_board(r#"{"white": [[0, 2, 2]], "black": []}"#),
            Err(InputError::Board(BoardError::BadCount { .. }))
        ));
        assert!(matches!(
            parse_board(r#"{"white": [[1, 3, 3]], "black": [[1, 3, 3]]}"#),
            Err(InputError::Board(BoardError::DuplicateSquare { .. }))
        ));
    }
}
