//! The problem contract every search driver is generic over.

use num_traits::{Bounded, ToPrimitive, Zero};
use std::fmt::Debug;
use std::ops::{Add, AddAssign, Sub, SubAssign};

/// Scalar objective type: an integer or floating-point cost.
///
/// The `infeasible` sentinel (the type's maximum value) marks degenerate
/// moves — moves that would not change the solution report this value so
/// they are never selected as improving.
pub trait Evaluation:
    Copy
    + PartialOrd
    + Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + AddAssign
    + SubAssign
    + Zero
    + Bounded
    + ToPrimitive
    + 'static
{
    /// Sentinel cost for moves that must never be selected.
    #[inline]
    fn infeasible() -> Self {
        Self::max_value()
    }

    #[inline]
    fn is_infeasible(self) -> bool {
        !(self < Self::max_value())
    }

    /// Equality within the tolerance used by the incremental-cost
    /// cross-checks: exact for integers, |a - b| < 0.1 for floats.
    fn approx_eq(self, other: Self) -> bool;
}

impl Evaluation for i32 {
    fn approx_eq(self, other: Self) -> bool {
        self == other
    }
}

impl Evaluation for i64 {
    fn approx_eq(self, other: Self) -> bool {
        self == other
    }
}

impl Evaluation for f32 {
    fn approx_eq(self, other: Self) -> bool {
        (self - other).abs() < 0.1
    }
}

impl Evaluation for f64 {
    fn approx_eq(self, other: Self) -> bool {
        (self - other).abs() < 0.1
    }
}

/// A combinatorial minimization problem.
///
/// Implementors expose the full objective (used for gain initialization
/// and for the runtime consistency checks) and, when known, a lower
/// bound that lets drivers stop early. Drivers receive the problem by
/// reference; nothing in the crate assumes a process-wide instance, so
/// tests can run several problems concurrently.
pub trait Problem: Send + Sync {
    /// The solution representation. Cloned for trial copies and for the
    /// reference-cost cross-check; compared for the no-op move sentinel.
    type Solution: Clone + PartialEq + Send + Sync;

    /// The scalar objective type (lower is better).
    type Eval: Evaluation;

    /// Full objective evaluation. This is the slow path: drivers call it
    /// only at initialization and inside verification cross-checks.
    fn evaluation(&self, sol: &Self::Solution) -> Self::Eval;

    /// A known lower bound on the objective, used as an early-termination
    /// trigger. The default (the type's minimum) means "unknown".
    fn optimum(&self) -> Self::Eval {
        Self::Eval::min_value()
    }
}

/// A solution paired with its evaluation.
///
/// Invariant: `eval` equals `problem.evaluation(&solution)`. Drivers
/// re-check this on entry and exit when cost verification is enabled.
pub struct SolutionEval<P: Problem> {
    pub solution: P::Solution,
    pub eval: P::Eval,
}

impl<P: Problem> Clone for SolutionEval<P> {
    fn clone(&self) -> Self {
        Self {
            solution: self.solution.clone(),
            eval: self.eval,
        }
    }
}

impl<P: Problem> Debug for SolutionEval<P>
where
    P::Solution: Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolutionEval")
            .field("solution", &self.solution)
            .field("eval", &self.eval)
            .finish()
    }
}

impl<P: Problem> SolutionEval<P> {
    /// Pairs a solution with an already-known evaluation.
    pub fn from_parts(solution: P::Solution, eval: P::Eval) -> Self {
        Self { solution, eval }
    }

    /// Evaluates `solution` from scratch and pairs it with the result.
    pub fn evaluated(problem: &P, solution: P::Solution) -> Self {
        let eval = problem.evaluation(&solution);
        Self { solution, eval }
    }

    /// Asserts the pairing invariant.
    ///
    /// # Panics
    ///
    /// Panics if the stored evaluation has drifted from the full
    /// objective — a corruption in incremental bookkeeping.
    pub fn assert_consistent(&self, problem: &P) {
        let expected = problem.evaluation(&self.solution);
        assert!(
            self.eval.approx_eq(expected),
            "stored evaluation {:?} does not match full evaluation {:?}",
            self.eval,
            expected
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct SumProblem;

    impl Problem for SumProblem {
        type Solution = Vec<i64>;
        type Eval = i64;

        fn evaluation(&self, sol: &Vec<i64>) -> i64 {
            sol.iter().sum()
        }
    }

    #[test]
    fn test_infeasible_sentinel() {
        assert!(i64::infeasible().is_infeasible());
        assert!(!0i64.is_infeasible());
        assert!(f64::infeasible().is_infeasible());
        assert!(!1.5f64.is_infeasible());
    }

    #[test]
    fn test_approx_eq_tolerances() {
        assert!(3i64.approx_eq(3));
        assert!(!3i64.approx_eq(4));
        assert!(1.0f64.approx_eq(1.05));
        assert!(!1.0f64.approx_eq(1.2));
    }

    #[test]
    fn test_unknown_optimum_is_minimum() {
        assert_eq!(SumProblem.optimum(), i64::MIN);
    }

    #[test]
    fn test_solution_eval_consistency() {
        let se = SolutionEval::evaluated(&SumProblem, vec![1, 2, 3]);
        assert_eq!(se.eval, 6);
        se.assert_consistent(&SumProblem);
    }

    #[test]
    #[should_panic(expected = "does not match full evaluation")]
    fn test_solution_eval_drift_detected() {
        let se = SolutionEval::<SumProblem>::from_parts(vec![1, 2, 3], 7);
        se.assert_consistent(&SumProblem);
    }
}
