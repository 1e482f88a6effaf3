//! Tabu search execution engine.
//!
//! # Algorithm
//!
//! 1. Start from a given (solution, evaluation) pair, cycle counter at 1
//!    (tabu matrices are zero-filled).
//! 2. Each cycle:
//!    a. Scan the neighborhood (or the gain cache) for the best move
//!       that is non-tabu or aspirated.
//!    b. Apply it unconditionally; keep any gain structure consistent
//!       with `update_before`/`update_after` around the application.
//!    c. Make the move tabu for a randomized tenure.
//!    d. Track the best-ever solution; stop early at a known optimum.
//!    e. Run the cooperative exchange hook; rebuild the gain cache when
//!       a foreign solution is adopted.
//! 3. Return the best-ever solution, or — when the run did not improve
//!    on its input — the final current solution with the configured
//!    probability.

use super::config::TabuConfig;
use super::types::TabuList;
use crate::exchange::{CooperativeExchange, NoExchange};
use crate::gain::GainStructure;
use crate::moves::Move;
use crate::neighborhood::{MoveConsumer, Neighborhood, SeparableNeighborhood};
use crate::problem::{Problem, SolutionEval};
use crate::reduction::{BestMove, MoveReduction};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

/// Result of a tabu search run.
#[derive(Debug, Clone)]
pub struct TabuResult<S, E> {
    /// The returned solution (best-ever, or final current under the
    /// `return_current` policy).
    pub solution: S,
    /// Its evaluation.
    pub eval: E,
    /// Cycles executed.
    pub cycles: u32,
    /// Cycle at which the best-ever solution was found (0 = never
    /// improved on the input).
    pub best_cycle: u32,
    /// Current evaluation after each applied move.
    pub eval_history: Vec<E>,
}

/// Selection kernel: best move that is non-tabu or aspirated.
struct TabuKernel<'a, P: Problem, M, TL> {
    slot: &'a mut BestMove<M, P::Eval>,
    current_eval: P::Eval,
    best_eval: P::Eval,
    tabu: &'a TL,
    cycle: u32,
    verify: bool,
}

impl<P, M, TL> MoveConsumer<P, M> for TabuKernel<'_, P, M, TL>
where
    P: Problem,
    M: Move<P>,
    TL: TabuList<P, M>,
{
    fn offer(&mut self, problem: &P, sol: &P::Solution, m: M) -> bool {
        let cost = m.checked_cost(problem, sol, self.verify);
        self.offer_costed(problem, sol, m, cost)
    }

    fn offer_costed(&mut self, _problem: &P, sol: &P::Solution, m: M, cost: P::Eval) -> bool {
        // cheapest check first; the aspiration test only runs for moves
        // that would actually displace the tentative best
        if cost < self.slot.cost()
            && (!self.tabu.is_tabu(&m, sol, self.cycle)
                || cost + self.current_eval < self.best_eval)
        {
            self.slot.submit(m, cost);
        }
        false
    }
}

fn drawn_tenure(rng: &mut StdRng, base: u32) -> u32 {
    let lo = base * 9 / 10;
    let hi = base * 11 / 10;
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo
    }
}

fn seeded_rng(config: &TabuConfig) -> StdRng {
    StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random))
}

fn no_admissible_move() -> ! {
    panic!("no admissible move left (tabu tenure probably too high for the neighborhood size)")
}

/// Tabu search runner.
pub struct TabuRunner;

impl TabuRunner {
    /// Runs tabu search over a full neighborhood enumeration.
    pub fn run<P, N, TL>(
        problem: &P,
        neighborhood: &mut N,
        tabu_list: &mut TL,
        start: SolutionEval<P>,
        config: &TabuConfig,
    ) -> TabuResult<P::Solution, P::Eval>
    where
        P: Problem,
        N: Neighborhood<P>,
        TL: TabuList<P, N::Move>,
    {
        Self::run_with_exchange(problem, neighborhood, tabu_list, start, config, &mut NoExchange)
    }

    /// Full-neighborhood variant with a cooperative exchange hook.
    pub fn run_with_exchange<P, N, TL, X>(
        problem: &P,
        neighborhood: &mut N,
        tabu_list: &mut TL,
        start: SolutionEval<P>,
        config: &TabuConfig,
        exchange: &mut X,
    ) -> TabuResult<P::Solution, P::Eval>
    where
        P: Problem,
        N: Neighborhood<P>,
        TL: TabuList<P, N::Move>,
        X: CooperativeExchange<P>,
    {
        let mut se = start;
        if config.verify_costs {
            se.assert_consistent(problem);
        }
        let start_eval = se.eval;

        let mut rng = seeded_rng(config);
        let mut best = se.clone();
        let mut best_cycle = 0;
        let mut eval_history = Vec::with_capacity(config.max_cycles as usize);
        let optimum = problem.optimum();
        let mut reduction = MoveReduction::new(1);

        let mut cycle: u32 = 1;
        while cycle <= config.max_cycles {
            reduction.reset();
            {
                let mut kernel = TabuKernel {
                    slot: reduction.slot(),
                    current_eval: se.eval,
                    best_eval: best.eval,
                    tabu: &*tabu_list,
                    cycle,
                    verify: config.verify_costs,
                };
                neighborhood.explore(problem, &se.solution, &mut kernel);
            }
            let (mv, cost) = reduction.reduce();
            let Some(m) = mv else { no_admissible_move() };

            m.apply(&mut se.solution);
            let tenure_in = drawn_tenure(&mut rng, config.tenure_in);
            let tenure_out = drawn_tenure(&mut rng, config.tenure_out);
            tabu_list.make_tabu(&m, &se.solution, cycle, tenure_in, tenure_out);

            se.eval += cost;
            eval_history.push(se.eval);

            if se.eval < best.eval {
                best = se.clone();
                best_cycle = cycle;
                if !(se.eval > optimum) {
                    break;
                }
            }

            exchange.exchange(problem, &mut se);
            cycle += 1;
        }

        Self::finish(problem, config, &mut rng, start_eval, se, best, best_cycle, eval_history)
    }

    /// Runs tabu search over a gain structure: every cycle scans the
    /// cached move costs instead of re-evaluating the neighborhood.
    pub fn run_gain<P, G, TL>(
        problem: &P,
        gain: &mut G,
        tabu_list: &mut TL,
        start: SolutionEval<P>,
        config: &TabuConfig,
    ) -> TabuResult<P::Solution, P::Eval>
    where
        P: Problem,
        G: GainStructure<P>,
        TL: TabuList<P, G::Move>,
    {
        Self::run_gain_with_exchange(problem, gain, tabu_list, start, config, &mut NoExchange)
    }

    /// Gain-structure variant with a cooperative exchange hook; adopting
    /// a foreign solution triggers a full gain rebuild.
    pub fn run_gain_with_exchange<P, G, TL, X>(
        problem: &P,
        gain: &mut G,
        tabu_list: &mut TL,
        start: SolutionEval<P>,
        config: &TabuConfig,
        exchange: &mut X,
    ) -> TabuResult<P::Solution, P::Eval>
    where
        P: Problem,
        G: GainStructure<P>,
        TL: TabuList<P, G::Move>,
        X: CooperativeExchange<P>,
    {
        let mut se = start;
        if config.verify_costs {
            se.assert_consistent(problem);
        }
        let start_eval = se.eval;

        let mut rng = seeded_rng(config);
        let mut best = se.clone();
        let mut best_cycle = 0;
        let mut eval_history = Vec::with_capacity(config.max_cycles as usize);
        let optimum = problem.optimum();
        let mut reduction = MoveReduction::new(1);

        gain.init(problem, &se.solution);

        let mut cycle: u32 = 1;
        while cycle <= config.max_cycles {
            reduction.reset();
            {
                let mut kernel = TabuKernel {
                    slot: reduction.slot(),
                    current_eval: se.eval,
                    best_eval: best.eval,
                    tabu: &*tabu_list,
                    cycle,
                    verify: config.verify_costs,
                };
                gain.scan(problem, &se.solution, &mut kernel, config.verify_costs);
            }
            let (mv, cost) = reduction.reduce();
            let Some(m) = mv else { no_admissible_move() };

            gain.update_before(problem, &m, &se.solution);
            m.apply(&mut se.solution);
            gain.update_after(problem, &m, &se.solution);

            let tenure_in = drawn_tenure(&mut rng, config.tenure_in);
            let tenure_out = drawn_tenure(&mut rng, config.tenure_out);
            tabu_list.make_tabu(&m, &se.solution, cycle, tenure_in, tenure_out);

            se.eval += cost;
            eval_history.push(se.eval);

            if se.eval < best.eval {
                best = se.clone();
                best_cycle = cycle;
                if !(se.eval > optimum) {
                    break;
                }
            }

            if exchange.exchange(problem, &mut se) {
                gain.init(problem, &se.solution);
            }
            cycle += 1;
        }

        Self::finish(problem, config, &mut rng, start_eval, se, best, best_cycle, eval_history)
    }

    /// Runs tabu search with the neighborhood sweep split across worker
    /// threads; one deterministic reduction per cycle picks the move.
    pub fn run_separable<P, N, TL>(
        problem: &P,
        neighborhood: &N,
        tabu_list: &mut TL,
        start: SolutionEval<P>,
        config: &TabuConfig,
    ) -> TabuResult<P::Solution, P::Eval>
    where
        P: Problem,
        N: SeparableNeighborhood<P>,
        TL: TabuList<P, N::Move> + Sync,
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
        let start_eval = se.eval;

        let mut rng = seeded_rng(config);
        let mut best = se.clone();
        let mut best_cycle = 0;
        let mut eval_history = Vec::with_capacity(config.max_cycles as usize);
        let optimum = problem.optimum();
        let mut reduction = MoveReduction::new(workers);

        let mut cycle: u32 = 1;
        while cycle <= config.max_cycles {
            reduction.reset();
            let partitions = neighborhood.partitions();
            {
                let sol = &se.solution;
                let current_eval = se.eval;
                let best_eval = best.eval;
                let tabu = &*tabu_list;
                let verify = config.verify_costs;
                reduction
                    .slots_mut()
                    .par_iter_mut()
                    .enumerate()
                    .for_each(|(worker, slot)| {
                        let mut kernel = TabuKernel {
                            slot,
                            current_eval,
                            best_eval,
                            tabu,
                            cycle,
                            verify,
                        };
                        let mut p = worker;
                        while p < partitions {
                            neighborhood.explore_partition(problem, sol, p, &mut kernel);
                            p += workers;
                        }
                    });
            }
            let (mv, cost) = reduction.reduce();
            let Some(m) = mv else { no_admissible_move() };

            m.apply(&mut se.solution);
            let tenure_in = drawn_tenure(&mut rng, config.tenure_in);
            let tenure_out = drawn_tenure(&mut rng, config.tenure_out);
            tabu_list.make_tabu(&m, &se.solution, cycle, tenure_in, tenure_out);

            se.eval += cost;
            eval_history.push(se.eval);

            if se.eval < best.eval {
                best = se.clone();
                best_cycle = cycle;
                if !(se.eval > optimum) {
                    break;
                }
            }
            cycle += 1;
        }

        Self::finish(problem, config, &mut rng, start_eval, se, best, best_cycle, eval_history)
    }

    /// Human-readable algorithm names.
    pub fn name() -> &'static str {
        "tabu search"
    }

    pub fn gain_name() -> &'static str {
        "tabu search using a gain structure"
    }

    pub fn separable_name() -> &'static str {
        "parallel tabu search with neighborhood separation"
    }

    #[allow(clippy::too_many_arguments)]
    fn finish<P: Problem>(
        problem: &P,
        config: &TabuConfig,
        rng: &mut StdRng,
        start_eval: P::Eval,
        current: SolutionEval<P>,
        best: SolutionEval<P>,
        best_cycle: u32,
        eval_history: Vec<P::Eval>,
    ) -> TabuResult<P::Solution, P::Eval> {
        let improved = best.eval < start_eval;
        let returned = if improved || rng.random::<f64>() >= config.return_current {
            best
        } else {
            current
        };
        if config.verify_costs {
            returned.assert_consistent(problem);
        }
        TabuResult {
            cycles: eval_history.len() as u32,
            best_cycle,
            solution: returned.solution,
            eval: returned.eval,
            eval_history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::Blackboard;
    use crate::matrix::UpperTriMatrix;
    use crate::neighborhood::{PermutationNeighborhood, SwapMove};
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    /// Count of elements away from their home position.
    struct Displacement {
        known_optimum: bool,
    }

    impl Problem for Displacement {
        type Solution = Vec<usize>;
        type Eval = i64;

        fn evaluation(&self, sol: &Vec<usize>) -> i64 {
            sol.iter()
                .enumerate()
                .filter(|&(i, &v)| i != v)
                .count() as i64
        }

        fn optimum(&self) -> i64 {
            if self.known_optimum {
                0
            } else {
                i64::MIN
            }
        }
    }

    /// Release-cycle matrix keyed by the swapped index pair.
    struct PairTabuList {
        release: UpperTriMatrix<u32>,
    }

    impl PairTabuList {
        fn new(n: usize) -> Self {
            Self {
                release: UpperTriMatrix::filled(n, 0),
            }
        }
    }

    impl TabuList<Displacement, SwapMove> for PairTabuList {
        fn is_tabu(&self, m: &SwapMove, _sol: &Vec<usize>, cycle: u32) -> bool {
            cycle < self.release[(m.i, m.j)]
        }

        fn make_tabu(
            &mut self,
            m: &SwapMove,
            _sol: &Vec<usize>,
            cycle: u32,
            tenure_in: u32,
            _tenure_out: u32,
        ) {
            self.release[(m.i, m.j)] = cycle + tenure_in;
        }
    }

    /// Gain cache for `Displacement` rebuilt around each applied swap.
    struct SwapGain {
        n: usize,
        costs: UpperTriMatrix<i64>,
    }

    impl GainStructure<Displacement> for SwapGain {
        type Move = SwapMove;

        fn init(&mut self, problem: &Displacement, sol: &Vec<usize>) {
            for i in 0..self.n {
                for j in i + 1..self.n {
                    self.costs[(i, j)] = SwapMove { i, j }.cost(problem, sol);
                }
            }
        }

        fn update_after(&mut self, problem: &Displacement, m: &SwapMove, sol: &Vec<usize>) {
            for i in 0..self.n {
                for j in i + 1..self.n {
                    if i == m.i || i == m.j || j == m.i || j == m.j {
                        self.costs[(i, j)] = SwapMove { i, j }.cost(problem, sol);
                    }
                }
            }
        }

        fn for_each<F: FnMut(SwapMove, i64) -> bool>(&self, mut f: F) {
            for (i, j) in self.costs.pairs() {
                if f(SwapMove { i, j }, self.costs[(i, j)]) {
                    return;
                }
            }
        }
    }

    fn scrambled(n: usize, seed: u64) -> Vec<usize> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut perm: Vec<usize> = (0..n).collect();
        perm.shuffle(&mut rng);
        perm
    }

    fn verified() -> TabuConfig {
        TabuConfig::default().with_verify_costs(true).with_seed(42)
    }

    #[test]
    fn test_tabu_reaches_known_optimum_and_stops() {
        let problem = Displacement {
            known_optimum: true,
        };
        let mut nh = PermutationNeighborhood::<SwapMove>::new(8);
        let mut tl = PairTabuList::new(8);
        let start = SolutionEval::evaluated(&problem, scrambled(8, 5));

        let config = verified().with_tenure(3).with_max_cycles(200);
        let result = TabuRunner::run(&problem, &mut nh, &mut tl, start, &config);

        assert_eq!(result.eval, 0);
        assert!(result.cycles < 200, "optimum bound must stop the search early");
        assert_eq!(result.best_cycle, result.cycles);
    }

    #[test]
    fn test_best_ever_dominates_history() {
        let problem = Displacement {
            known_optimum: false,
        };
        let mut nh = PermutationNeighborhood::<SwapMove>::new(7);
        let mut tl = PairTabuList::new(7);
        let start = SolutionEval::evaluated(&problem, scrambled(7, 9));

        let config = verified().with_tenure(3).with_max_cycles(60);
        let result = TabuRunner::run(&problem, &mut nh, &mut tl, start, &config);

        assert_eq!(result.cycles, 60, "unknown optimum: full budget is spent");
        for &e in &result.eval_history {
            assert!(result.eval <= e);
        }
    }

    #[test]
    fn test_tenure_boundaries() {
        let mut tl = PairTabuList::new(5);
        let sol: Vec<usize> = (0..5).collect();
        let m = SwapMove { i: 1, j: 3 };

        // marked at cycle 10 with tenure 3: forbidden for cycles 11 and
        // 12, admissible again at cycle 13
        tl.make_tabu(&m, &sol, 10, 3, 3);
        assert!(tl.is_tabu(&m, &sol, 11));
        assert!(tl.is_tabu(&m, &sol, 12));
        assert!(!tl.is_tabu(&m, &sol, 13));
        // a different pair is unaffected
        assert!(!tl.is_tabu(&SwapMove { i: 0, j: 4 }, &sol, 11));
    }

    #[test]
    fn test_gain_variant_matches_plain_variant() {
        let problem = Displacement {
            known_optimum: false,
        };
        let start = SolutionEval::evaluated(&problem, scrambled(7, 13));
        let config = verified().with_tenure(4).with_max_cycles(40);

        let mut nh = PermutationNeighborhood::<SwapMove>::new(7);
        let mut tl = PairTabuList::new(7);
        let plain = TabuRunner::run(&problem, &mut nh, &mut tl, start.clone(), &config);

        let mut gain = SwapGain {
            n: 7,
            costs: UpperTriMatrix::filled(7, 0),
        };
        let mut tl = PairTabuList::new(7);
        let cached = TabuRunner::run_gain(&problem, &mut gain, &mut tl, start, &config);

        // identical enumeration order and seed: identical trajectory
        assert_eq!(plain.eval, cached.eval);
        assert_eq!(plain.solution, cached.solution);
        assert_eq!(plain.eval_history, cached.eval_history);
    }

    #[test]
    fn test_parallel_variant_is_deterministic() {
        let problem = Displacement {
            known_optimum: false,
        };
        let start = SolutionEval::evaluated(&problem, scrambled(9, 17));
        let config = verified().with_tenure(4).with_max_cycles(30).with_workers(3);

        let mut tl = PairTabuList::new(9);
        let nh = PermutationNeighborhood::<SwapMove>::new(9);
        let a = TabuRunner::run_separable(&problem, &nh, &mut tl, start.clone(), &config);

        let mut tl = PairTabuList::new(9);
        let b = TabuRunner::run_separable(&problem, &nh, &mut tl, start, &config);

        assert_eq!(a.eval, b.eval);
        assert_eq!(a.solution, b.solution);
        assert_eq!(a.eval_history, b.eval_history);
    }

    #[test]
    #[should_panic(expected = "no admissible move left")]
    fn test_excessive_tenure_is_fatal() {
        let problem = Displacement {
            known_optimum: false,
        };
        let mut nh = PermutationNeighborhood::<SwapMove>::new(5);
        let mut tl = PairTabuList::new(5);
        let start = SolutionEval::evaluated(&problem, scrambled(5, 21));

        // every pair becomes tabu within 10 cycles and stays so; once
        // the search stops improving, aspiration cannot admit anything
        let config = verified().with_tenure(100_000).with_max_cycles(500);
        TabuRunner::run(&problem, &mut nh, &mut tl, start, &config);
    }

    #[test]
    fn test_return_current_policy() {
        // start at the optimum: the run can never improve on its input,
        // so return_current = 1.0 must hand back the drifted current
        // solution rather than the best-ever copy of the start
        let problem = Displacement {
            known_optimum: false,
        };
        let mut nh = PermutationNeighborhood::<SwapMove>::new(6);
        let mut tl = PairTabuList::new(6);
        let start = SolutionEval::evaluated(&problem, (0..6).collect());

        let config = verified()
            .with_tenure(2)
            .with_max_cycles(7)
            .with_return_current(1.0);
        let result = TabuRunner::run(&problem, &mut nh, &mut tl, start.clone(), &config);

        assert_eq!(result.eval, problem.evaluation(&result.solution));
        assert_eq!(result.eval, *result.eval_history.last().unwrap());

        // with return_current = 0 the best-ever (the start) comes back
        let mut tl = PairTabuList::new(6);
        let config = verified().with_tenure(2).with_max_cycles(7);
        let result = TabuRunner::run(&problem, &mut nh, &mut tl, start, &config);
        assert_eq!(result.eval, 0);
    }

    #[test]
    fn test_exchange_adoption_rebuilds_gain() {
        let problem = Displacement {
            known_optimum: false,
        };
        let board = Blackboard::new();
        // pre-publish the optimum
        let mut seed_link = board.link(1, false);
        let mut published = SolutionEval::evaluated(&problem, (0..7).collect());
        seed_link.exchange(&problem, &mut published);

        let mut gain = SwapGain {
            n: 7,
            costs: UpperTriMatrix::filled(7, 0),
        };
        let mut tl = PairTabuList::new(7);
        let start = SolutionEval::evaluated(&problem, scrambled(7, 29));
        let mut link = board.link(2, true);

        // verify_costs cross-checks every scanned gain entry, so a stale
        // cache after the adoption rebuild would abort the run
        let config = verified().with_tenure(3).with_max_cycles(20);
        let result = TabuRunner::run_gain_with_exchange(
            &problem, &mut gain, &mut tl, start, &config, &mut link,
        );

        assert_eq!(result.eval, 0, "adopted incumbent becomes the best-ever");
    }

    #[test]
    fn test_names() {
        assert_eq!(TabuRunner::name(), "tabu search");
        assert!(TabuRunner::gain_name().contains("gain"));
        assert!(TabuRunner::separable_name().contains("parallel"));
    }
}
