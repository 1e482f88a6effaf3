//! Worked problem instances.
//!
//! Three classic problems wired into the search contracts, each with
//! its own move family, neighborhood, tabu memory and — where the cost
//! structure admits closed-form deltas — gain structure:
//!
//! - [`assignment`]: capacitated assignment of loaded items to buckets
//!   (dense gain matrix with penalty-aware incremental updates),
//! - [`qap`]: quadratic assignment over permutations (upper-triangular
//!   gain with O(1) corrections for untouched pairs),
//! - [`tsp`]: Euclidean tours with candidate-list-pruned 2-opt and
//!   don't-look bits (no gain structure; the neighborhood itself prunes).
//!
//! Instances are built directly from matrices and point sets; reading
//! problem files is left to callers.

pub mod assignment;
pub mod qap;
pub mod tsp;
