//! Best-first planner for Expendibots: finds an action sequence that wipes
//! out the opposing side, treating the opponent as static.
//!
//! The rules live in `expendibots-core`; this crate adds legal-action
//! enumeration, the heuristic, the search drivers, and the I/O adapters
//! (board files, rendering, the `solve` and `render` binaries).

pub mod heuristic;
pub mod input;
pub mod movegen;
pub mod render;
pub mod search;
pub mod stats;
