//! Incremental local-search metaheuristics.
//!
//! Interchangeable search drivers over a pluggable problem abstraction:
//!
//! - **Descent**: best-improvement or first-improvement local search,
//!   optionally driven by a gain structure or a thread-parallel
//!   neighborhood sweep.
//! - **Tabu Search (TS)**: best-admissible-move search with randomized
//!   tenures, aspiration, best-ever tracking and a cooperative-exchange
//!   hook; plain, gain-structure and parallel variants.
//! - **Simulated Annealing (SA)**: Metropolis acceptance over the same
//!   move/neighborhood contract with pluggable cooling schedules.
//!
//! # Architecture
//!
//! The core is the incremental evaluation machinery the drivers share:
//! a [`moves::Move`] knows its cost delta against any solution without a
//! full re-evaluation, a [`neighborhood::Neighborhood`] feeds candidate
//! moves to selection kernels, and a [`gain::GainStructure`] caches
//! every move's cost and restores that invariant incrementally around
//! each applied move. Because a wrong delta formula corrupts results
//! silently, every driver carries a runtime verification flag that
//! cross-checks incremental costs (and scanned gain entries) against
//! full re-evaluation and aborts on divergence.
//!
//! The [`problems`] module wires three classic problems into these
//! contracts: capacitated assignment, quadratic assignment and
//! Euclidean TSP with candidate-list-pruned 2-opt.

pub mod descent;
pub mod exchange;
pub mod gain;
pub mod matrix;
pub mod moves;
pub mod neighborhood;
pub mod problem;
pub mod problems;
pub mod reduction;
pub mod sa;
pub mod tabu;
