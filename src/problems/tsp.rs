//! Euclidean traveling-salesman tours with candidate-list-pruned 2-opt.
//!
//! The tour keeps both the city order and each city's position, so
//! successor/predecessor queries are O(1) and a 2-opt reconnection is a
//! segment reversal that maintains both arrays. Neighborhood scans are
//! pruned by precomputed nearest-neighbor candidate lists: once the
//! candidate's distance alone reaches the removed edge's length, no
//! cheaper reconnection can follow on that side, so the scan stops.

use crate::matrix::Matrix;
use crate::moves::Move;
use crate::neighborhood::{DontLookBits, MoveConsumer, Neighborhood};
use crate::problem::Problem;
use rand::Rng;

/// A cyclic tour: `order` holds the cities, `position` the index of
/// every city inside `order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    order: Vec<usize>,
    position: Vec<usize>,
}

impl Tour {
    /// The canonical tour 0, 1, .., n-1.
    pub fn canonical(n: usize) -> Self {
        Self::from_order((0..n).collect())
    }

    /// Builds a tour from an explicit city order.
    ///
    /// # Panics
    ///
    /// Panics if `order` is not a permutation of 0..n.
    pub fn from_order(order: Vec<usize>) -> Self {
        let mut position = vec![usize::MAX; order.len()];
        for (idx, &city) in order.iter().enumerate() {
            assert!(
                city < order.len() && position[city] == usize::MAX,
                "order must be a permutation"
            );
            position[city] = idx;
        }
        Self { order, position }
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// City following `city` along the tour.
    #[inline]
    pub fn next(&self, city: usize) -> usize {
        let mut i = self.position[city] + 1;
        if i == self.len() {
            i = 0;
        }
        self.order[i]
    }

    /// City preceding `city` along the tour.
    #[inline]
    pub fn prev(&self, city: usize) -> usize {
        let mut i = self.position[city];
        if i == 0 {
            i = self.len();
        }
        self.order[i - 1]
    }

    /// Does `b` lie strictly between `a` and `c` in tour direction?
    pub fn between(&self, a: usize, b: usize, c: usize) -> bool {
        let (pa, pb, pc) = (self.position[a], self.position[b], self.position[c]);
        (pa < pb && pb < pc) || (pa < pb && pc < pa) || (pb < pc && pc < pa)
    }

    /// 2-opt reconnection: removes edges (a, b) and (d, c), adds (a, d)
    /// and (b, c) by reversing the segment between b and d. Requires
    /// `next(a) == b` and `next(d) == c` (or the mirrored orientation).
    pub fn flip(&mut self, a: usize, b: usize, c: usize, d: usize) {
        let (a, b, c, d) = if self.next(b) == a {
            (c, d, a, b)
        } else {
            (a, b, c, d)
        };
        debug_assert_eq!(self.next(a), b);
        debug_assert_eq!(self.next(d), c);

        let mut i = self.position[b];
        let mut j = self.position[d];
        if j < i {
            // the segment wraps the array end; reverse the complement
            j = self.position[a];
            i = self.position[c];
        }
        while i < j {
            self.position[self.order[i]] = j;
            self.position[self.order[j]] = i;
            self.order.swap(i, j);
            i += 1;
            j -= 1;
        }
        debug_assert!(self.positions_consistent());
    }

    /// Cuts the tour at four random points and reconnects the segments
    /// in reverse order; the standard kick for restarting 2-opt.
    pub fn double_bridge<R: Rng>(&mut self, rng: &mut R) {
        let n = self.len();
        if n < 5 {
            return;
        }
        let mut cuts = [0usize; 5];
        for cut in cuts.iter_mut().take(4) {
            *cut = rng.random_range(0..n - 1);
        }
        cuts[..4].sort_unstable();
        cuts[4] = cuts[0];

        let mut reconnected = Vec::with_capacity(n);
        for seg in (0..4).rev() {
            let mut j = cuts[seg];
            while j != cuts[seg + 1] {
                reconnected.push(self.order[j]);
                j = (j + 1) % n;
            }
        }
        if reconnected.len() == n {
            *self = Self::from_order(reconnected);
        }
    }

    /// Do `order` and `position` still agree?
    pub fn positions_consistent(&self) -> bool {
        self.position.len() == self.order.len()
            && self.order.iter().enumerate().all(|(i, &c)| self.position[c] == i)
    }
}

/// Euclidean instance with rounded integer distances and k-nearest
/// candidate lists built once at construction.
pub struct Tsp {
    dist: Matrix<i64>,
    candidates: Vec<Vec<usize>>,
}

impl Tsp {
    /// Builds an instance from city coordinates; each city gets a
    /// distance-sorted candidate list of its `k` nearest neighbors.
    pub fn new(points: &[(f64, f64)], k: usize) -> Self {
        let n = points.len();
        let mut dist = Matrix::filled(n, n, 0i64);
        for i in 0..n {
            for j in 0..n {
                let dx = points[i].0 - points[j].0;
                let dy = points[i].1 - points[j].1;
                dist[(i, j)] = (dx * dx + dy * dy).sqrt().round() as i64;
            }
        }

        let mut candidates = Vec::with_capacity(n);
        for i in 0..n {
            let mut others: Vec<usize> = (0..n).filter(|&j| j != i).collect();
            others.sort_by_key(|&j| (dist[(i, j)], j));
            others.truncate(k);
            candidates.push(others);
        }

        Self { dist, candidates }
    }

    pub fn size(&self) -> usize {
        self.dist.rows()
    }

    #[inline]
    pub fn dist(&self, i: usize, j: usize) -> i64 {
        self.dist[(i, j)]
    }

    /// The `k` nearest cities of `city`, closest first.
    pub fn candidate_list(&self, city: usize) -> &[usize] {
        &self.candidates[city]
    }
}

impl Problem for Tsp {
    type Solution = Tour;
    type Eval = i64;

    fn evaluation(&self, sol: &Tour) -> i64 {
        let order = sol.order();
        let mut length = 0;
        for i in 0..order.len() {
            let j = (i + 1) % order.len();
            length += self.dist(order[i], order[j]);
        }
        length
    }
}

/// Reconnect the tour by removing edges (a, b) and (d, c) and adding
/// (a, d) and (b, c).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TwoOpt {
    pub a: usize,
    pub b: usize,
    pub c: usize,
    pub d: usize,
}

impl Move<Tsp> for TwoOpt {
    fn cost(&self, problem: &Tsp, _sol: &Tour) -> i64 {
        problem.dist(self.a, self.d) + problem.dist(self.b, self.c)
            - problem.dist(self.a, self.b)
            - problem.dist(self.c, self.d)
    }

    fn apply(&self, sol: &mut Tour) {
        sol.flip(self.a, self.b, self.c, self.d);
    }
}

/// Candidate-list-bounded 2-opt scan with don't-look bits.
///
/// Around each anchor city both incident edges are tried against the
/// anchor's candidate lists; a side's scan stops as soon as the
/// candidate edge alone is no shorter than the edge it would replace.
/// Anchors whose full scan claims nothing are switched off until a
/// claimed move touches them again, so this neighborhood is intended
/// for claiming consumers (first-improvement descent, annealing).
#[derive(Debug)]
pub struct TwoOptNeighborhood {
    dont_look: DontLookBits,
}

impl TwoOptNeighborhood {
    pub fn new(problem: &Tsp) -> Self {
        Self {
            dont_look: DontLookBits::new(problem.size()),
        }
    }
}

impl Neighborhood<Tsp> for TwoOptNeighborhood {
    type Move = TwoOpt;

    fn explore<C: MoveConsumer<Tsp, TwoOpt>>(
        &mut self,
        problem: &Tsp,
        sol: &Tour,
        consumer: &mut C,
    ) -> bool {
        for a in 0..problem.size() {
            if self.dont_look.is_set(a) {
                continue;
            }

            // successor side: replace edge (a, next(a))
            let b = sol.next(a);
            let removed = problem.dist(a, b);
            for &c in problem.candidate_list(b) {
                if problem.dist(b, c) >= removed {
                    break;
                }
                let d = sol.prev(c);
                if a == c || b == d {
                    continue;
                }
                let m = TwoOpt { a, b, c, d };
                if consumer.offer(problem, sol, m) {
                    for city in [a, b, c, d] {
                        self.dont_look.clear(city);
                    }
                    return true;
                }
            }

            // predecessor side: replace edge (prev(a), a)
            let b = sol.prev(a);
            let removed = problem.dist(a, b);
            for &c in problem.candidate_list(b) {
                if problem.dist(b, c) >= removed {
                    break;
                }
                let d = sol.next(c);
                if a == c || b == d {
                    continue;
                }
                let m = TwoOpt {
                    a: b,
                    b: a,
                    c: d,
                    d: c,
                };
                if consumer.offer(problem, sol, m) {
                    for city in [a, b, c, d] {
                        self.dont_look.clear(city);
                    }
                    return true;
                }
            }

            self.dont_look.set(a);
        }
        false
    }

    fn reset(&mut self) {
        self.dont_look.clear_all();
    }
}
