//! Render a board file without solving it. Handy for checking that a setup
//! file says what you think it says.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use expendibots_core::Side;
use expendibots_solver::input;
use expendibots_solver::render::render;

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: render <board.json>")?;
    let board = input::load_board(&path)
        .with_context(|| format!("loading board from {}", path.display()))?;
    print!("{}", render(&board));
    println!(
        "\nWhite: {} pieces, Black: {} pieces",
        board.total(Side::White),
        board.total(Side::Black)
    );
    Ok(())
}
