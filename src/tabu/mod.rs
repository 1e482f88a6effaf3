//! Tabu search: best-admissible-move local search with short-term
//! memory.
//!
//! Each cycle the driver selects the best move that is either not tabu
//! or aspirated (it would beat the best solution ever seen), applies it
//! unconditionally — even when it worsens the current solution, which is
//! what lets the search climb out of local optima — and forbids its
//! reversal for a randomized number of cycles.
//!
//! # References
//!
//! - Glover, F. (1989). "Tabu Search—Part I", *ORSA Journal on Computing* 1(3), 190-206.
//! - Taillard, E. (1991). "Robust taboo search for the quadratic
//!   assignment problem", *Parallel Computing* 17, 443-455.

mod config;
mod runner;
mod types;

pub use config::TabuConfig;
pub use runner::{TabuResult, TabuRunner};
pub use types::TabuList;
