//! Quadratic assignment: place facilities on locations so that
//! flow-weighted distances are minimized.
//!
//! The solution is a permutation `p` (facility `p[i]` sits at location
//! `i`) and the objective is `sum a(i,j) * b(p(i), p(j))` over all
//! ordered location pairs. Exchanging two locations admits a closed-form
//! delta, and — after a swap of `r` and `s` — the delta of every pair
//! disjoint from `{r, s}` can be corrected in O(1), which is what the
//! gain structure exploits. Both recurrences follow Taillard's robust
//! taboo search.

use crate::gain::GainStructure;
use crate::matrix::{Matrix, UpperTriMatrix};
use crate::moves::Move;
use crate::problem::Problem;
use crate::tabu::TabuList;

/// Problem instance: flow matrix `a`, distance matrix `b`.
pub struct Qap {
    a: Matrix<i64>,
    b: Matrix<i64>,
    best_known: Option<i64>,
}

impl Qap {
    /// Builds an instance from square flow and distance matrices.
    ///
    /// # Panics
    ///
    /// Panics if the matrices are not square or differ in size.
    pub fn new(a: Matrix<i64>, b: Matrix<i64>) -> Self {
        assert_eq!(a.rows(), a.cols(), "flow matrix must be square");
        assert_eq!(b.rows(), b.cols(), "distance matrix must be square");
        assert_eq!(a.rows(), b.rows(), "matrices must agree in size");
        Self {
            a,
            b,
            best_known: None,
        }
    }

    /// Records a known optimum so searches can stop on reaching it.
    pub fn with_best_known(mut self, value: i64) -> Self {
        self.best_known = Some(value);
        self
    }

    pub fn size(&self) -> usize {
        self.a.rows()
    }

    /// Exact objective change of exchanging locations `i` and `j`.
    pub fn swap_delta(&self, p: &[usize], i: usize, j: usize) -> i64 {
        let (a, b) = (&self.a, &self.b);
        let mut d = (a[(i, i)] - a[(j, j)]) * (b[(p[j], p[j])] - b[(p[i], p[i])])
            + (a[(i, j)] - a[(j, i)]) * (b[(p[j], p[i])] - b[(p[i], p[j])]);
        for k in 0..self.size() {
            if k != i && k != j {
                d += (a[(k, i)] - a[(k, j)]) * (b[(p[k], p[j])] - b[(p[k], p[i])])
                    + (a[(i, k)] - a[(j, k)]) * (b[(p[j], p[k])] - b[(p[i], p[k])]);
            }
        }
        d
    }

    /// O(1) correction for the delta of the pair `(i, j)` after the
    /// exchange of `r` and `s`, valid when `{i, j}` and `{r, s}` are
    /// disjoint. `p` is the post-exchange permutation.
    pub fn swap_delta_correction(
        &self,
        p: &[usize],
        i: usize,
        j: usize,
        r: usize,
        s: usize,
    ) -> i64 {
        let (a, b) = (&self.a, &self.b);
        (a[(r, i)] - a[(r, j)] + a[(s, j)] - a[(s, i)])
            * (b[(p[s], p[i])] - b[(p[s], p[j])] + b[(p[r], p[j])] - b[(p[r], p[i])])
            + (a[(i, r)] - a[(j, r)] + a[(j, s)] - a[(i, s)])
                * (b[(p[i], p[s])] - b[(p[j], p[s])] + b[(p[j], p[r])] - b[(p[i], p[r])])
    }
}

impl Problem for Qap {
    type Solution = Vec<usize>;
    type Eval = i64;

    fn evaluation(&self, sol: &Vec<usize>) -> i64 {
        let n = self.size();
        let mut cost = 0;
        for i in 0..n {
            for j in 0..n {
                cost += self.a[(i, j)] * self.b[(sol[i], sol[j])];
            }
        }
        cost
    }

    fn optimum(&self) -> i64 {
        self.best_known.unwrap_or(i64::MIN)
    }
}

/// Exchange the facilities at locations `i` and `j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swap {
    pub i: usize,
    pub j: usize,
}

impl From<(usize, usize)> for Swap {
    fn from((i, j): (usize, usize)) -> Self {
        Self { i, j }
    }
}

impl Move<Qap> for Swap {
    fn cost(&self, problem: &Qap, sol: &Vec<usize>) -> i64 {
        problem.swap_delta(sol, self.i, self.j)
    }

    fn apply(&self, sol: &mut Vec<usize>) {
        sol.swap(self.i, self.j);
    }
}

/// Taillard's tabu memory: release cycles per (location, facility)
/// reassignment. A swap is admissible as soon as either of the two
/// reassignments it undoes has expired; `make_tabu` records, post-move,
/// that each facility just left its previous location.
pub struct QapTabuList {
    release: Matrix<u32>,
}

impl QapTabuList {
    pub fn new(problem: &Qap) -> Self {
        Self {
            release: Matrix::filled(problem.size(), problem.size(), 0),
        }
    }
}

impl TabuList<Qap, Swap> for QapTabuList {
    fn is_tabu(&self, m: &Swap, sol: &Vec<usize>, cycle: u32) -> bool {
        !(cycle >= self.release[(m.i, sol[m.j])] || cycle >= self.release[(m.j, sol[m.i])])
    }

    fn make_tabu(
        &mut self,
        m: &Swap,
        sol: &Vec<usize>,
        cycle: u32,
        tenure_in: u32,
        tenure_out: u32,
    ) {
        // post-move, sol[j] is the facility that just left location i
        self.release[(m.i, sol[m.j])] = cycle + tenure_in;
        self.release[(m.j, sol[m.i])] = cycle + tenure_out;
    }
}

/// Upper-triangular gain cache over all location pairs.
///
/// The swap move is its own inverse, so the cache is refreshed *after*
/// the move: pairs disjoint from the applied swap get the O(1)
/// correction, pairs touching it a full delta recomputation.
pub struct QapGain {
    g: UpperTriMatrix<i64>,
}

impl QapGain {
    pub fn new(problem: &Qap) -> Self {
        Self {
            g: UpperTriMatrix::filled(problem.size(), 0),
        }
    }
}

impl GainStructure<Qap> for QapGain {
    type Move = Swap;

    fn init(&mut self, problem: &Qap, sol: &Vec<usize>) {
        for i in 0..problem.size() {
            for j in i + 1..problem.size() {
                self.g[(i, j)] = problem.swap_delta(sol, i, j);
            }
        }
    }

    fn update_after(&mut self, problem: &Qap, m: &Swap, sol: &Vec<usize>) {
        let (r, s) = (m.i, m.j);
        for i in 0..problem.size() {
            for j in i + 1..problem.size() {
                if i != r && i != s && j != r && j != s {
                    self.g[(i, j)] += problem.swap_delta_correction(sol, i, j, r, s);
                } else {
                    self.g[(i, j)] = problem.swap_delta(sol, i, j);
                }
            }
        }
    }

    fn for_each<F: FnMut(Swap, i64) -> bool>(&self, mut f: F) {
        for (i, j) in self.g.pairs() {
            if f(Swap { i, j }, self.g[(i, j)]) {
                return;
            }
        }
    }
}
