//! The gain structure: a cache of pre-computed move costs kept
//! consistent incrementally across the whole search.
//!
//! `init` pays one full O(|moves|) pass; afterwards the cache is
//! maintained by problem-specific closed-form update rules invoked
//! around every applied move. A logic error in those rules corrupts the
//! cache silently — there is no observable failure until the search
//! starts selecting wrong "best" moves — so [`GainStructure::scan`] can
//! cross-check every cached entry against the true incremental cost when
//! verification is enabled.

use crate::moves::Move;
use crate::neighborhood::MoveConsumer;
use crate::problem::{Evaluation, Problem};

/// A cache holding the current cost of every move in a fixed move family.
///
/// Invariant: between updates, the cached entry of every move equals
/// `move.cost(problem, current_solution)`.
///
/// Lifecycle: `init` computes every entry from scratch; thereafter, for
/// each applied move the driver calls `update_before` with the solution
/// still in its pre-move state, applies the move, then calls
/// `update_after` with the post-move state. One of the two hooks is
/// typically empty: irreversible moves must be accounted before
/// application while the old state is still readable, reversible ones
/// are often cheaper to account afterwards.
pub trait GainStructure<P: Problem> {
    type Move: Move<P>;

    /// Recomputes every cache entry from scratch.
    fn init(&mut self, problem: &P, sol: &P::Solution);

    /// Restores the cache invariant for the upcoming application of `m`;
    /// `sol` is still in its pre-move state.
    fn update_before(&mut self, _problem: &P, _m: &Self::Move, _sol: &P::Solution) {}

    /// Symmetric hook called after `m` has been applied to `sol`.
    fn update_after(&mut self, _problem: &P, _m: &Self::Move, _sol: &P::Solution) {}

    /// Visits every (move, cached cost) pair; stops early when `f`
    /// returns `true`.
    fn for_each<F: FnMut(Self::Move, P::Eval) -> bool>(&self, f: F);

    /// Feeds every cached (move, cost) pair to `consumer`, stopping when
    /// one is claimed. When `verify` is set, each cached entry is
    /// cross-checked against the move's true incremental cost.
    ///
    /// # Panics
    ///
    /// Panics on a cache/cost divergence with `verify` enabled: the
    /// update rules have corrupted the cache.
    fn scan<C: MoveConsumer<P, Self::Move>>(
        &self,
        problem: &P,
        sol: &P::Solution,
        consumer: &mut C,
        verify: bool,
    ) -> bool {
        let mut claimed = false;
        self.for_each(|m, cached| {
            if verify && !cached.is_infeasible() {
                let expected = m.cost(problem, sol);
                assert!(
                    cached.approx_eq(expected),
                    "stale gain entry: cached {:?}, expected {:?}",
                    cached,
                    expected
                );
            }
            claimed = consumer.offer_costed(problem, sol, m, cached);
            claimed
        });
        claimed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::neighborhood::FnConsumer;
    use crate::problem::SolutionEval;

    /// Minimize sum of squares over a small integer vector; moves
    /// increment or decrement one coordinate.
    struct Quadratic;

    impl Problem for Quadratic {
        type Solution = Vec<i64>;
        type Eval = i64;

        fn evaluation(&self, sol: &Vec<i64>) -> i64 {
            sol.iter().map(|x| x * x).sum()
        }
    }

    #[derive(Clone, Copy, Debug, PartialEq)]
    struct Step {
        index: usize,
        delta: i64,
    }

    impl Move<Quadratic> for Step {
        fn cost(&self, _problem: &Quadratic, sol: &Vec<i64>) -> i64 {
            let x = sol[self.index];
            let y = x + self.delta;
            y * y - x * x
        }

        fn apply(&self, sol: &mut Vec<i64>) {
            sol[self.index] += self.delta;
        }
    }

    /// Cache of all +1/-1 step costs, updated with the closed form.
    struct StepGain {
        costs: Vec<[i64; 2]>,
    }

    impl StepGain {
        fn new(len: usize) -> Self {
            Self {
                costs: vec![[0, 0]; len],
            }
        }
    }

    impl GainStructure<Quadratic> for StepGain {
        type Move = Step;

        fn init(&mut self, problem: &Quadratic, sol: &Vec<i64>) {
            for i in 0..self.costs.len() {
                for (k, delta) in [(0usize, -1i64), (1, 1)] {
                    self.costs[i][k] = Step { index: i, delta }.cost(problem, sol);
                }
            }
        }

        fn update_before(&mut self, _problem: &Quadratic, m: &Step, sol: &Vec<i64>) {
            // only the touched coordinate's entries change
            let y = sol[m.index] + m.delta;
            self.costs[m.index][0] = (y - 1) * (y - 1) - y * y;
            self.costs[m.index][1] = (y + 1) * (y + 1) - y * y;
        }

        fn for_each<F: FnMut(Step, i64) -> bool>(&self, mut f: F) {
            for (i, pair) in self.costs.iter().enumerate() {
                for (k, delta) in [(0usize, -1i64), (1, 1)] {
                    if f(Step { index: i, delta }, pair[k]) {
                        return;
                    }
                }
            }
        }
    }

    fn rebuilt(problem: &Quadratic, sol: &Vec<i64>) -> Vec<(Step, i64)> {
        let mut g = StepGain::new(sol.len());
        g.init(problem, sol);
        let mut out = Vec::new();
        g.for_each(|m, c| {
            out.push((m, c));
            false
        });
        out
    }

    #[test]
    fn test_init_matches_true_costs() {
        let problem = Quadratic;
        let sol = vec![3, -2, 0];
        let mut g = StepGain::new(3);
        g.init(&problem, &sol);
        g.for_each(|m, cached| {
            assert_eq!(cached, m.cost(&problem, &sol));
            false
        });
    }

    #[test]
    fn test_incremental_updates_match_rebuild() {
        let problem = Quadratic;
        let mut se = SolutionEval::evaluated(&problem, vec![5, -3, 2, 7]);
        let mut g = StepGain::new(4);
        g.init(&problem, &se.solution);

        let moves = [
            Step { index: 0, delta: -1 },
            Step { index: 2, delta: 1 },
            Step { index: 0, delta: -1 },
            Step { index: 3, delta: -1 },
        ];
        for m in moves {
            g.update_before(&problem, &m, &se.solution);
            se.eval += m.cost(&problem, &se.solution);
            m.apply(&mut se.solution);
            g.update_after(&problem, &m, &se.solution);
        }
        se.assert_consistent(&problem);

        let mut incremental = Vec::new();
        g.for_each(|m, c| {
            incremental.push((m, c));
            false
        });
        assert_eq!(incremental, rebuilt(&problem, &se.solution));
    }

    #[test]
    fn test_scan_verifies_entries() {
        let problem = Quadratic;
        let sol = vec![1, 2];
        let mut g = StepGain::new(2);
        g.init(&problem, &sol);
        let mut count = 0;
        let claimed = g.scan(
            &problem,
            &sol,
            &mut FnConsumer(|_: &Quadratic, _: &Vec<i64>, _: Step| {
                count += 1;
                false
            }),
            true,
        );
        assert!(!claimed);
        assert_eq!(count, 4);
    }

    #[test]
    #[should_panic(expected = "stale gain entry")]
    fn test_scan_detects_corruption() {
        let problem = Quadratic;
        let sol = vec![1, 2];
        let mut g = StepGain::new(2);
        g.init(&problem, &sol);
        g.costs[1][0] += 5; // corrupt one entry
        g.scan(
            &problem,
            &sol,
            &mut FnConsumer(|_: &Quadratic, _: &Vec<i64>, _: Step| false),
            true,
        );
    }
}
