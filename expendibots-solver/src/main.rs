//! Expendibots Solver
//!
//! Reads a board file, searches for a winning action sequence for White,
//! and prints it in referee notation.

use std::env;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};

use expendibots_core::Side;
use expendibots_solver::input;
use expendibots_solver::movegen::{ActionGenerator, StepRule};
use expendibots_solver::render::render;
use expendibots_solver::search::{SearchEngine, SearchFailure};

const USAGE: &str = "usage: solve <board.json> [--budget N] [--steps-by-pieces]";

fn main() -> Result<()> {
    // Parse command line arguments
    let mut board_path: Option<PathBuf> = None;
    let mut budget: Option<u64> = None;
    let mut step_rule = StepRule::StackHeight;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--budget" => {
                let value = args.next().context("--budget requires a value")?;
                budget = Some(value.parse().context("--budget expects a node count")?);
            }
            "--steps-by-pieces" => step_rule = StepRule::PiecesMoved,
            "--help" | "-h" => {
                println!("{USAGE}");
                return Ok(());
            }
            other => {
                if other.starts_with('-') || board_path.is_some() {
                    bail!("unexpected argument: {other}\n{USAGE}");
                }
                board_path = Some(PathBuf::from(other));
            }
        }
    }
    let board_path = board_path.context(USAGE)?;

    println!("Expendibots Solver");
    println!("==================");
    println!(
        "Mode: {}",
        match budget {
            Some(n) => format!("bounded ({} node budget)", n),
            None => "exhaustive".to_string(),
        }
    );
    println!("Step bound: {:?}", step_rule);
    println!();

    let board = input::load_board(&board_path)
        .with_context(|| format!("loading board from {}", board_path.display()))?;
    print!("{}", render(&board));
    println!(
        "\nWhite: {} pieces, Black: {} pieces\n",
        board.total(Side::White),
        board.total(Side::Black)
    );

    // Set up SIGINT handler so an exhaustive solve on an unwinnable board
    // can be stopped cleanly.
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        println!("\nInterrupt received, stopping search...");
        r.store(false, Ordering::SeqCst);
    })
    .context("setting Ctrl-C handler")?;

    let mut engine = SearchEngine::new(ActionGenerator::new(step_rule));
    engine.stats.log_interval = Some(Duration::from_secs(5));

    let start = Instant::now();
    let result = match budget {
        Some(n) => engine.search_with_budget(board, Side::White, n),
        None => engine.search_until_win(board, Side::White, running),
    };
    let elapsed = start.elapsed();

    println!();
    match result {
        Ok(plan) => {
            println!("Winning sequence ({} actions):", plan.actions.len());
            for (i, action) in plan.actions.iter().enumerate() {
                println!("{:3}. {}", i + 1, action);
            }
        }
        Err(SearchFailure::Exhausted { best_line, expanded }) => {
            println!("No win within budget ({} nodes expanded).", expanded);
            if best_line.is_empty() {
                println!("No line better than the starting position was found.");
            } else {
                println!("Best known line ({} actions):", best_line.len());
                for (i, action) in best_line.iter().enumerate() {
                    println!("{:3}. {}", i + 1, action);
                }
            }
        }
        Err(SearchFailure::NoSolution { expanded }) => {
            println!(
                "No winning sequence exists from this position ({} nodes expanded).",
                expanded
            );
        }
        Err(SearchFailure::Interrupted { expanded }) => {
            println!("Search interrupted after {} nodes.", expanded);
        }
    }

    println!("\nTime: {:.2}s", elapsed.as_secs_f64());
    engine.stats.print_summary();

    // Not finding a plan is a normal outcome and still exits 0; only
    // malformed input or I/O trouble surfaces through anyhow as an error.
    Ok(())
}
