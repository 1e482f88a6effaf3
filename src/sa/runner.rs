//! SA execution loop.

use super::config::{CoolingSchedule, SaConfig};
use crate::moves::Move;
use crate::neighborhood::{MoveConsumer, SeparableNeighborhood};
use crate::problem::{Evaluation, Problem, SolutionEval};
use num_traits::{ToPrimitive, Zero};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Result of a simulated-annealing run.
#[derive(Debug, Clone)]
pub struct SaResult<S, E> {
    /// The final current solution (the trajectory's end point).
    pub solution: S,
    /// Its evaluation.
    pub eval: E,
    /// Sweeps executed.
    pub sweeps: usize,
    /// Accepted moves (including improvements).
    pub accepted: usize,
    /// Temperature when the run stopped.
    pub final_temperature: f64,
}

/// Metropolis acceptance kernel: claims a candidate with probability
/// `min(1, exp(-delta / T))`.
struct Metropolis<'a, M, E> {
    chosen: Option<(M, E)>,
    rejected: u32,
    temperature: f64,
    rng: &'a mut StdRng,
    verify: bool,
}

impl<P, M> MoveConsumer<P, M> for Metropolis<'_, M, P::Eval>
where
    P: Problem,
    M: Move<P>,
{
    fn offer(&mut self, problem: &P, sol: &P::Solution, m: M) -> bool {
        let cost = m.checked_cost(problem, sol, self.verify);
        self.offer_costed(problem, sol, m, cost)
    }

    fn offer_costed(&mut self, _problem: &P, _sol: &P::Solution, m: M, cost: P::Eval) -> bool {
        let delta = cost.to_f64().unwrap_or(f64::INFINITY);
        let accept = cost <= P::Eval::zero()
            || self.rng.random::<f64>() < (-delta / self.temperature).exp();
        if accept && !cost.is_infeasible() {
            self.chosen = Some((m, cost));
            return true;
        }
        self.rejected += 1;
        false
    }
}

/// Simulated-annealing runner.
pub struct SaRunner;

impl SaRunner {
    /// Runs the annealing trajectory from `start`.
    ///
    /// # Panics
    ///
    /// Panics if `config` does not validate.
    pub fn run<P, N>(
        problem: &P,
        neighborhood: &mut N,
        start: SolutionEval<P>,
        config: &SaConfig,
    ) -> SaResult<P::Solution, P::Eval>
    where
        P: Problem,
        N: SeparableNeighborhood<P>,
    {
        config.validate().expect("invalid SaConfig");

        let mut se = start;
        if config.verify_costs {
            se.assert_consistent(problem);
        }

        let mut rng = StdRng::seed_from_u64(config.seed.unwrap_or_else(rand::random));
        let optimum = problem.optimum();

        let mut temperature = config.initial_temperature;
        let mut rejects: u32 = 0;
        let mut accepted = 0usize;
        let mut sweeps = 0usize;
        let mut next_step = match config.cooling {
            CoolingSchedule::Geometric { step_length, .. } => step_length,
            CoolingSchedule::LundyMees { .. } => 0,
        };

        while temperature > config.min_temperature
            && se.eval > optimum
            && rejects < config.max_rejects
        {
            let partitions = neighborhood.partitions().max(1);
            let origin = rng.random_range(0..partitions);
            {
                let mut kernel = Metropolis {
                    chosen: None,
                    rejected: 0,
                    temperature,
                    rng: &mut rng,
                    verify: config.verify_costs,
                };
                // rotate the sweep origin so low temperatures do not
                // favour the first partitions of the enumeration order
                for k in 0..partitions {
                    let p = (origin + k) % partitions;
                    if neighborhood.explore_partition(problem, &se.solution, p, &mut kernel) {
                        break;
                    }
                }
                if let Some((m, cost)) = kernel.chosen {
                    m.apply(&mut se.solution);
                    se.eval += cost;
                    accepted += 1;
                    rejects = 0;
                } else {
                    rejects += kernel.rejected;
                }
            }
            sweeps += 1;

            let cooled = match config.cooling {
                CoolingSchedule::Geometric { alpha, step_length } => {
                    if sweeps as u32 >= next_step {
                        next_step += step_length;
                        temperature *= alpha;
                        true
                    } else {
                        false
                    }
                }
                CoolingSchedule::LundyMees { beta } => {
                    temperature /= 1.0 + beta * temperature;
                    true
                }
            };
            if cooled {
                // a changed acceptance criterion re-admits regions the
                // neighborhood had learned to skip
                neighborhood.reset();
            }
        }

        if config.verify_costs {
            se.assert_consistent(problem);
        }
        SaResult {
            solution: se.solution,
            eval: se.eval,
            sweeps,
            accepted,
            final_temperature: temperature,
        }
    }

    /// Human-readable algorithm name.
    pub fn name() -> &'static str {
        "simulated annealing"
    }
}
