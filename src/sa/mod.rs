//! Simulated annealing over the shared move/neighborhood contract.
//!
//! Reuses the problem, move and separable-neighborhood abstractions of
//! the local-search core (no gain structure): candidate moves are drawn
//! by sweeping neighborhood partitions from a rotating origin and
//! accepted by the Metropolis criterion. Every temperature change calls
//! the neighborhood's `reset`, re-admitting regions that earlier sweeps
//! had excluded via don't-look bits.
//!
//! # References
//!
//! - Kirkpatrick, S., Gelatt, C. D., Vecchi, M. P. (1983). "Optimization
//!   by Simulated Annealing", *Science* 220(4598), 671-680.
//! - Lundy, M., Mees, A. (1986). "Convergence of an annealing
//!   algorithm", *Mathematical Programming* 34, 111-124.

mod config;
mod runner;

pub use config::{CoolingSchedule, SaConfig};
pub use runner::{SaResult, SaRunner};
