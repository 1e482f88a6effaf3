//! Short-term memory contract for tabu search.

use crate::moves::Move;
use crate::problem::Problem;

/// Records forbidden moves as release cycles.
///
/// Implementations are matrices of "release cycle" values indexed by
/// move parameters: a move is forbidden while the current cycle counter
/// is below its recorded release cycle. Because matrices start
/// zero-filled, drivers begin counting at cycle 1 so that nothing is
/// tabu initially.
///
/// `make_tabu` is called *after* the move has been applied, so
/// implementations that key on solution state (e.g. "facility that just
/// left position i") read the post-move solution. The two tenures let a
/// problem forbid the forward and reverse directions of a move for
/// different durations.
pub trait TabuList<P: Problem, M: Move<P>>: Send {
    /// Is `m` forbidden at `cycle`?
    fn is_tabu(&self, m: &M, sol: &P::Solution, cycle: u32) -> bool;

    /// Forbids `m` (and/or its reverse) starting at `cycle`.
    fn make_tabu(
        &mut self,
        m: &M,
        sol: &P::Solution,
        cycle: u32,
        tenure_in: u32,
        tenure_out: u32,
    );
}
