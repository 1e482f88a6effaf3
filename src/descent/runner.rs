//! Descent execution engine.

use super::config::{DescentConfig, DescentPolicy};
use crate::gain::GainStructure;
use crate::moves::Move;
use crate::neighborhood::{MoveConsumer, Neighborhood, SeparableNeighborhood};
use crate::problem::{Problem, SolutionEval};
use crate::reduction::{BestMove, MoveReduction};
use num_traits::Zero;
use rayon::prelude::*;

/// Result of a descent run.
#[derive(Debug, Clone)]
pub struct DescentResult<S, E> {
    /// The local optimum reached.
    pub solution: S,
    /// Its evaluation.
    pub eval: E,
    /// Number of improving moves applied.
    pub moves_applied: usize,
    /// Evaluation after each applied move (strictly decreasing).
    pub eval_history: Vec<E>,
}

/// Selection kernel recording the best strictly improving move.
struct KeepBest<'a, M, E> {
    slot: &'a mut BestMove<M, E>,
    verify: bool,
}

impl<P, M> MoveConsumer<P, M> for KeepBest<'_, M, P::Eval>
where
    P: Problem,
    M: Move<P>,
{
    fn offer(&mut self, problem: &P, sol: &P::Solution, m: M) -> bool {
        let cost = m.checked_cost(problem, sol, self.verify);
        self.offer_costed(problem, sol, m, cost)
    }

    fn offer_costed(&mut self, _problem: &P, _sol: &P::Solution, m: M, cost: P::Eval) -> bool {
        if cost < P::Eval::zero() && cost < self.slot.cost() {
            self.slot.submit(m, cost);
        }
        false
    }
}

/// Claiming kernel for the first-improvement policy.
struct FirstImprove<M, E> {
    chosen: Option<(M, E)>,
    verify: bool,
}

impl<P, M> MoveConsumer<P, M> for FirstImprove<M, P::Eval>
where
    P: Problem,
    M: Move<P>,
{
    fn offer(&mut self, problem: &P, sol: &P::Solution, m: M) -> bool {
        let cost = m.checked_cost(problem, sol, self.verify);
        self.offer_costed(problem, sol, m, cost)
    }

    fn offer_costed(&mut self, _problem: &P, _sol: &P::Solution, m: M, cost: P::Eval) -> bool {
        if cost < P::Eval::zero() {
            self.chosen = Some((m, cost));
            return true;
        }
        false
    }
}

/// Descent runner.
pub struct DescentRunner;

impl DescentRunner {
    /// Runs descent over a full neighborhood enumeration.
    pub fn run<P, N>(
        problem: &P,
        neighborhood: &mut N,
        start: SolutionEval<P>,
        config: &DescentConfig,
    ) -> DescentResult<P::Solution, P::Eval>
    where
        P: Problem,
        N: Neighborhood<P>,
    {
        match config.policy {
            DescentPolicy::BestImprovement => Self::best_improvement(problem, neighborhood, start, config),
            DescentPolicy::FirstImprovement => Self::first_improvement(problem, neighborhood, start, config),
        }
    }

    /// Runs best-improvement descent over a gain structure, keeping the
    /// cache consistent around every applied move.
    pub fn run_gain<P, G>(
        problem: &P,
        gain: &mut G,
        start: SolutionEval<P>,
        config: &DescentConfig,
    ) -> DescentResult<P::Solution, P::Eval>
    where
        P: Problem,
        G: GainStructure<P>,
    {
        let mut se = start;
        if config.verify_costs {
            se.assert_consistent(problem);
        }

        gain.init(problem, &se.solution);

        let mut reduction = MoveReduction::new(1);
        let mut eval_history = Vec::new();
        loop {
            reduction.reset();
            {
                let mut keeper = KeepBest {
                    slot: reduction.slot(),
                    verify: config.verify_costs,
                };
                gain.scan(problem, &se.solution, &mut keeper, config.verify_costs);
            }
            let (mv, cost) = reduction.reduce();
            let Some(m) = mv else { break };

            gain.update_before(problem, &m, &se.solution);
            m.apply(&mut se.solution);
            gain.update_after(problem, &m, &se.solution);
            se.eval += cost;
            eval_history.push(se.eval);
        }

        if config.verify_costs {
            se.assert_consistent(problem);
        }
        DescentResult {
            moves_applied: eval_history.len(),
            solution: se.solution,
            eval: se.eval,
            eval_history,
        }
    }

    /// Runs best-improvement descent with the neighborhood sweep split
    /// across worker threads, one reduction per iteration.
    pub fn run_separable<P, N>(
        problem: &P,
        neighborhood: &N,
        start: SolutionEval<P>,
        config: &DescentConfig,
    ) -> DescentResult<P::Solution, P::Eval>
    where
        P: Problem,
        N: SeparableNeighborhood<P>,
    {
        let workers = if config.workers == 0 {
            rayon::current_num_threads()
        } else {
            config.workers
        };

        let mut se = start;
        if config.verify_costs {
            se.assert_consistent(problem);
        }

        let mut reduction = MoveReduction::new(workers);
        let mut eval_history = Vec::new();
        loop {
            reduction.reset();
            let partitions = neighborhood.partitions();
            let sol = &se.solution;
            let verify = config.verify_costs;
            reduction
                .slots_mut()
                .par_iter_mut()
                .enumerate()
                .for_each(|(worker, slot)| {
                    let mut keeper = KeepBest { slot, verify };
                    let mut p = worker;
                    while p < partitions {
                        neighborhood.explore_partition(problem, sol, p, &mut keeper);
                        p += workers;
                    }
                });

            let (mv, cost) = reduction.reduce();
            let Some(m) = mv else { break };
            m.apply(&mut se.solution);
            se.eval += cost;
            eval_history.push(se.eval);
        }

        if config.verify_costs {
            se.assert_consistent(problem);
        }
        DescentResult {
            moves_applied: eval_history.len(),
            solution: se.solution,
            eval: se.eval,
            eval_history,
        }
    }

    /// Human-readable algorithm name for the configured policy.
    pub fn name(config: &DescentConfig) -> &'static str {
        match config.policy {
            DescentPolicy::BestImprovement => "descent",
            DescentPolicy::FirstImprovement => "descent accepting the first improving move",
        }
    }

    /// Name of the gain-structure variant.
    pub fn gain_name() -> &'static str {
        "descent using a gain structure"
    }

    /// Name of the thread-parallel variant.
    pub fn separable_name() -> &'static str {
        "parallel descent with neighborhood separation"
    }

    fn best_improvement<P, N>(
        problem: &P,
        neighborhood: &mut N,
        start: SolutionEval<P>,
        config: &DescentConfig,
    ) -> DescentResult<P::Solution, P::Eval>
    where
        P: Problem,
        N: Neighborhood<P>,
    {
        let mut se = start;
        if config.verify_costs {
            se.assert_consistent(problem);
        }

        let mut reduction = MoveReduction::new(1);
        let mut eval_history = Vec::new();
        loop {
            reduction.reset();
            {
                let mut keeper = KeepBest {
                    slot: reduction.slot(),
                    verify: config.verify_costs,
                };
                neighborhood.explore(problem, &se.solution, &mut keeper);
            }
            let (mv, cost) = reduction.reduce();
            let Some(m) = mv else { break };
            m.apply(&mut se.solution);
            se.eval += cost;
            eval_history.push(se.eval);
        }

        if config.verify_costs {
            se.assert_consistent(problem);
        }
        DescentResult {
            moves_applied: eval_history.len(),
            solution: se.solution,
            eval: se.eval,
            eval_history,
        }
    }

    fn first_improvement<P, N>(
        problem: &P,
        neighborhood: &mut N,
        start: SolutionEval<P>,
        config: &DescentConfig,
    ) -> DescentResult<P::Solution, P::Eval>
    where
        P: Problem,
        N: Neighborhood<P>,
    {
        let mut se = start;
        if config.verify_costs {
            se.assert_consistent(problem);
        }

        let mut eval_history = Vec::new();
        loop {
            let mut kernel = FirstImprove {
                chosen: None,
                verify: config.verify_costs,
            };
            let claimed = neighborhood.explore(problem, &se.solution, &mut kernel);
            if !claimed {
                break;
            }
            let Some((m, cost)) = kernel.chosen else { break };
            m.apply(&mut se.solution);
            se.eval += cost;
            eval_history.push(se.eval);
        }

        if config.verify_costs {
            se.assert_consistent(problem);
        }
        DescentResult {
            moves_applied: eval_history.len(),
            solution: se.solution,
            eval: se.eval,
            eval_history,
        }
    }
}
