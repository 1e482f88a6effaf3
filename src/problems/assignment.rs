//! Capacitated assignment of loaded items to buckets.
//!
//! A solution assigns each item to one bucket. The objective sums a
//! per-assignment placement cost, an affinity cost paid by every ordered
//! item pair kept in *different* buckets, and a penalty proportional to
//! the total capacity overload. Reassigning one item changes the
//! affinity terms of every pair touching it and the overload of exactly
//! two buckets, which is what makes the closed-form gain updates below
//! possible.

use crate::gain::GainStructure;
use crate::matrix::Matrix;
use crate::moves::Move;
use crate::neighborhood::{MoveConsumer, Neighborhood, SeparableNeighborhood};
use crate::problem::{Evaluation, Problem};
use crate::tabu::TabuList;

/// Weight applied to each unit of capacity overload.
const OVERLOAD_PENALTY: f64 = 10.0;

/// Problem instance: placement costs, pairwise affinities, item loads
/// and bucket capacities.
pub struct Assignment {
    placement: Matrix<f64>,
    affinity: Matrix<f64>,
    load: Vec<f64>,
    capacity: Vec<f64>,
}

impl Assignment {
    /// Builds an instance.
    ///
    /// # Panics
    ///
    /// Panics if the matrix and vector dimensions disagree.
    pub fn new(
        placement: Matrix<f64>,
        affinity: Matrix<f64>,
        load: Vec<f64>,
        capacity: Vec<f64>,
    ) -> Self {
        let items = placement.rows();
        let buckets = placement.cols();
        assert_eq!(affinity.rows(), items, "affinity must be items x items");
        assert_eq!(affinity.cols(), items, "affinity must be items x items");
        assert_eq!(load.len(), items, "one load per item");
        assert_eq!(capacity.len(), buckets, "one capacity per bucket");
        Self {
            placement,
            affinity,
            load,
            capacity,
        }
    }

    pub fn items(&self) -> usize {
        self.placement.rows()
    }

    pub fn buckets(&self) -> usize {
        self.placement.cols()
    }

    #[inline]
    pub fn placement(&self, item: usize, bucket: usize) -> f64 {
        self.placement[(item, bucket)]
    }

    #[inline]
    pub fn affinity(&self, a: usize, b: usize) -> f64 {
        self.affinity[(a, b)]
    }

    #[inline]
    pub fn load(&self, item: usize) -> f64 {
        self.load[item]
    }

    /// Remaining capacity per bucket under `sol` (negative = overload).
    pub fn residuals(&self, sol: &[usize]) -> Vec<f64> {
        let mut residuals = self.capacity.clone();
        for (item, &bucket) in sol.iter().enumerate() {
            residuals[bucket] -= self.load[item];
        }
        residuals
    }

    /// Is `sol` within every bucket's capacity?
    pub fn is_feasible(&self, sol: &[usize]) -> bool {
        self.residuals(sol).iter().all(|&r| r >= -1e-5)
    }

    fn penalty(&self, sol: &[usize]) -> f64 {
        let overload: f64 = self
            .residuals(sol)
            .iter()
            .filter(|&&r| r < 0.0)
            .map(|&r| -r)
            .sum();
        OVERLOAD_PENALTY * overload
    }

    /// Exact change of the penalty term when `item` leaves the bucket
    /// with residual `residual_of_current` and joins `bucket`.
    /// `residuals` must reflect the state the item is leaving.
    fn delta_penalty(
        &self,
        residual_of_current: f64,
        residuals: &[f64],
        item: usize,
        bucket: usize,
    ) -> f64 {
        let load = self.load[item];
        let mut p = 0.0;

        if residual_of_current < 0.0 {
            let after_leave = residual_of_current + load;
            if after_leave > 0.0 {
                p = residual_of_current;
            } else {
                p = -load;
            }
        }

        let after_join = residuals[bucket] - load;
        if after_join < 0.0 {
            if residuals[bucket] < 0.0 {
                p += load;
            } else {
                p += -after_join;
            }
        }

        OVERLOAD_PENALTY * p
    }

    /// Affinity-plus-placement part of the cost of reassigning `item`
    /// to `bucket` (everything except the penalty change).
    fn pure_gain(&self, sol: &[usize], item: usize, bucket: usize) -> f64 {
        let mut g = 0.0;
        for other in 0..self.items() {
            if other == item {
                continue;
            }
            let pair = self.affinity(item, other) + self.affinity(other, item);
            if sol[other] == sol[item] {
                g += pair;
            }
            if sol[other] == bucket {
                g -= pair;
            }
        }
        g + self.placement(item, bucket) - self.placement(item, sol[item])
    }
}

impl Problem for Assignment {
    type Solution = Vec<usize>;
    type Eval = f64;

    fn evaluation(&self, sol: &Vec<usize>) -> f64 {
        let items = self.items();
        let mut acc = 0.0;
        for i in 0..items {
            acc += self.placement(i, sol[i]);
            for j in 0..items {
                if sol[i] != sol[j] {
                    acc += self.affinity(i, j);
                }
            }
        }
        acc + self.penalty(sol)
    }
}

/// Reassign one item to another bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reassign {
    pub item: usize,
    pub bucket: usize,
}

impl Move<Assignment> for Reassign {
    fn cost(&self, problem: &Assignment, sol: &Vec<usize>) -> f64 {
        if sol[self.item] == self.bucket {
            return f64::infeasible();
        }
        let residuals = problem.residuals(sol);
        problem.pure_gain(sol, self.item, self.bucket)
            + problem.delta_penalty(residuals[sol[self.item]], &residuals, self.item, self.bucket)
    }

    fn apply(&self, sol: &mut Vec<usize>) {
        sol[self.item] = self.bucket;
    }
}

/// One partition per item; a partition enumerates every other bucket.
#[derive(Debug)]
pub struct ReassignNeighborhood {
    items: usize,
    buckets: usize,
}

impl ReassignNeighborhood {
    pub fn new(problem: &Assignment) -> Self {
        Self {
            items: problem.items(),
            buckets: problem.buckets(),
        }
    }
}

impl Neighborhood<Assignment> for ReassignNeighborhood {
    type Move = Reassign;

    fn explore<C: MoveConsumer<Assignment, Reassign>>(
        &mut self,
        problem: &Assignment,
        sol: &Vec<usize>,
        consumer: &mut C,
    ) -> bool {
        for item in 0..self.items {
            if self.explore_partition(problem, sol, item, consumer) {
                return true;
            }
        }
        false
    }
}

impl SeparableNeighborhood<Assignment> for ReassignNeighborhood {
    fn partitions(&self) -> usize {
        self.items
    }

    fn explore_partition<C: MoveConsumer<Assignment, Reassign>>(
        &self,
        problem: &Assignment,
        sol: &Vec<usize>,
        item: usize,
        consumer: &mut C,
    ) -> bool {
        for bucket in 0..self.buckets {
            if sol[item] == bucket {
                continue;
            }
            if consumer.offer(problem, sol, Reassign { item, bucket }) {
                return true;
            }
        }
        false
    }
}

/// Release-cycle matrix over (item, bucket) pairs. A reassignment is
/// forbidden while its target entry or the item's current entry is
/// still active, which pins a freshly moved item for its tenure unless
/// aspiration overrides.
pub struct AssignmentTabuList {
    release: Matrix<u32>,
}

impl AssignmentTabuList {
    pub fn new(problem: &Assignment) -> Self {
        Self {
            release: Matrix::filled(problem.items(), problem.buckets(), 0),
        }
    }
}

impl TabuList<Assignment, Reassign> for AssignmentTabuList {
    fn is_tabu(&self, m: &Reassign, sol: &Vec<usize>, cycle: u32) -> bool {
        cycle < self.release[(m.item, m.bucket)] || cycle < self.release[(m.item, sol[m.item])]
    }

    fn make_tabu(
        &mut self,
        m: &Reassign,
        sol: &Vec<usize>,
        cycle: u32,
        tenure_in: u32,
        tenure_out: u32,
    ) {
        self.release[(m.item, m.bucket)] = cycle + tenure_in;
        self.release[(m.item, sol[m.item])] = cycle + tenure_out;
    }
}

/// Dense gain cache for [`Assignment`].
///
/// Two matrices are maintained: `pure` holds the penalty-free gains and
/// `total` the scan-visible costs (`pure` plus the penalty change, with
/// the infeasible sentinel on each item's current bucket). The residual
/// capacities are carried along so penalty corrections never rescan the
/// whole solution.
pub struct AssignmentGain {
    pure: Matrix<f64>,
    total: Matrix<f64>,
    residuals: Vec<f64>,
}

impl AssignmentGain {
    pub fn new(problem: &Assignment) -> Self {
        Self {
            pure: Matrix::filled(problem.items(), problem.buckets(), 0.0),
            total: Matrix::filled(problem.items(), problem.buckets(), 0.0),
            residuals: Vec::new(),
        }
    }
}

impl GainStructure<Assignment> for AssignmentGain {
    type Move = Reassign;

    fn init(&mut self, problem: &Assignment, sol: &Vec<usize>) {
        self.residuals = problem.residuals(sol);
        for item in 0..problem.items() {
            for bucket in 0..problem.buckets() {
                if sol[item] == bucket {
                    self.pure[(item, bucket)] = 0.0;
                    self.total[(item, bucket)] = f64::infeasible();
                } else {
                    let pure = problem.pure_gain(sol, item, bucket);
                    self.pure[(item, bucket)] = pure;
                    self.total[(item, bucket)] = pure
                        + problem.delta_penalty(
                            self.residuals[sol[item]],
                            &self.residuals,
                            item,
                            bucket,
                        );
                }
            }
        }
    }

    fn update_before(&mut self, problem: &Assignment, m: &Reassign, sol: &Vec<usize>) {
        let item = m.item;
        let old = sol[item];
        let new = m.bucket;
        let items = problem.items();
        let buckets = problem.buckets();

        // affinity corrections for every other item's row: the pair
        // term flips for partners of the old and new buckets, and the
        // old/new columns shift for everyone else
        for p in 0..items {
            if p == item {
                continue;
            }
            let pair = problem.affinity(p, item) + problem.affinity(item, p);
            let assigned = sol[p];
            if assigned == old {
                for q in 0..buckets {
                    if q != old && q != new {
                        self.pure[(p, q)] -= pair;
                    }
                }
                self.pure[(p, new)] -= 2.0 * pair;
            } else if assigned == new {
                for q in 0..buckets {
                    if q != old && q != new {
                        self.pure[(p, q)] += pair;
                    }
                }
                self.pure[(p, old)] += 2.0 * pair;
            } else {
                self.pure[(p, old)] += pair;
                self.pure[(p, new)] -= pair;
            }
        }

        // the moved item's row is rebased on its new home
        let base = self.pure[(item, new)];
        for q in 0..buckets {
            if q != old && q != new {
                self.pure[(item, q)] -= base;
            }
        }
        self.pure[(item, old)] = -base;
        self.pure[(item, new)] = 0.0;

        self.residuals[old] += problem.load(item);
        self.residuals[new] -= problem.load(item);

        // penalty re-correction: rows assigned to the old or new bucket
        // change entirely, every other row only in those two columns
        for c in 0..items {
            let home = if c == item { new } else { sol[c] };
            if home == old || home == new {
                for s in 0..buckets {
                    if s == home {
                        self.total[(c, s)] = f64::infeasible();
                    } else {
                        self.total[(c, s)] = self.pure[(c, s)]
                            + problem.delta_penalty(self.residuals[home], &self.residuals, c, s);
                    }
                }
            } else {
                self.total[(c, old)] = self.pure[(c, old)]
                    + problem.delta_penalty(self.residuals[home], &self.residuals, c, old);
                self.total[(c, new)] = self.pure[(c, new)]
                    + problem.delta_penalty(self.residuals[home], &self.residuals, c, new);
            }
        }
    }

    fn for_each<F: FnMut(Reassign, f64) -> bool>(&self, mut f: F) {
        for item in 0..self.total.rows() {
            for bucket in 0..self.total.cols() {
                if f(Reassign { item, bucket }, self.total[(item, bucket)]) {
                    return;
                }
            }
        }
    }
}
