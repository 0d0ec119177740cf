//! Fixed-width board pretty-printer.
//!
//! `y` grows upward, so row 7 prints first. Cells show the stack height and
//! color (`2W`, `1B`), dots for empty squares:
//!
//! ```text
//! 7 |  .  .  .  .  .  .  . 3B
//!   ...
//! 0 | 1W  .  .  .  .  .  .  .
//!   +------------------------
//!      0  1  2  3  4  5  6  7
//! ```

use std::fmt::Write;

use expendibots_core::{Board, Pos, Side, BOARD_SIZE};

/// Render the board as a multi-line string.
pub fn render(board: &Board) -> String {
    let mut out = String::new();
    for y in (0..BOARD_SIZE).rev() {
        let _ = write!(out, "{} |", y);
        for x in 0..BOARD_SIZE {
            match board.occupant(Pos::new(x, y)) {
                Some((Side::White, n)) => {
                    let _ = write!(out, "{:>2}W", n);
                }
                Some((Side::Black, n)) => {
                    let _ = write!(out, "{:>2}B", n);
                }
                None => out.push_str("  ."),
            }
        }
        out.push('\n');
    }
    out.push_str("  +");
    out.push_str(&"-".repeat(BOARD_SIZE as usize * 3));
    out.push('\n');
    out.push_str("   ");
    for x in 0..BOARD_SIZE {
        let _ = write!(out, "{:>3}", x);
    }
    out.push('\n');
    out
}
