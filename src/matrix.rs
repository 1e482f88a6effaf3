//! Dense matrix storage for gain caches and tabu memories.
//!
//! Both matrix types store their entries in a single flat `Vec` with
//! row-major index arithmetic, so copies and resets are cheap and every
//! access is bounds-checked.

use std::ops::{Index, IndexMut};

/// A dense rows × cols matrix backed by one flat buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix<T> {
    data: Vec<T>,
    rows: usize,
    cols: usize,
}

impl<T: Clone> Matrix<T> {
    /// Creates a rows × cols matrix with every entry set to `fill`.
    pub fn filled(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            data: vec![fill; rows * cols],
            rows,
            cols,
        }
    }

    /// Builds a matrix from explicit rows. All rows must have equal length.
    ///
    /// # Panics
    ///
    /// Panics if the rows are ragged.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Self {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            assert_eq!(row.len(), ncols, "ragged matrix rows");
            data.extend(row);
        }
        Self {
            data,
            rows: nrows,
            cols: ncols,
        }
    }

    /// Resets every entry to `fill`.
    pub fn fill(&mut self, fill: T) {
        self.data.iter_mut().for_each(|x| *x = fill.clone());
    }
}

impl<T> Matrix<T> {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }
}

impl<T> Index<(usize, usize)> for Matrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        assert!(i < self.rows && j < self.cols);
        &self.data[i * self.cols + j]
    }
}

impl<T> IndexMut<(usize, usize)> for Matrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        assert!(i < self.rows && j < self.cols);
        &mut self.data[i * self.cols + j]
    }
}

/// A strictly upper-triangular n × n matrix: only entries with `j > i`
/// exist. Used for symmetric move families (e.g. index swaps) where the
/// (i, j) and (j, i) entries would be the same move.
#[derive(Debug, Clone, PartialEq)]
pub struct UpperTriMatrix<T> {
    data: Vec<T>,
    n: usize,
}

impl<T: Clone> UpperTriMatrix<T> {
    /// Creates an n × n strictly upper-triangular matrix filled with `fill`.
    pub fn filled(n: usize, fill: T) -> Self {
        let len = if n < 2 { 0 } else { n * (n - 1) / 2 };
        Self {
            data: vec![fill; len],
            n,
        }
    }
}

impl<T> UpperTriMatrix<T> {
    pub fn n(&self) -> usize {
        self.n
    }

    #[inline]
    fn offset(&self, i: usize, j: usize) -> usize {
        assert!(j > i && j < self.n, "upper-triangular access requires j > i");
        // row i starts after the i previous rows of lengths n-1, n-2, ...
        i * self.n - i * (i + 1) / 2 + (j - i - 1)
    }

    /// Iterates the index pairs (i, j) with j > i in row-major order.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let n = self.n;
        (0..n).flat_map(move |i| (i + 1..n).map(move |j| (i, j)))
    }
}

impl<T> Index<(usize, usize)> for UpperTriMatrix<T> {
    type Output = T;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &T {
        &self.data[self.offset(i, j)]
    }
}

impl<T> IndexMut<(usize, usize)> for UpperTriMatrix<T> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut T {
        let off = self.offset(i, j);
        &mut self.data[off]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_roundtrip() {
        let mut m = Matrix::filled(3, 4, 0i64);
        m[(0, 0)] = 1;
        m[(2, 3)] = 7;
        m[(1, 2)] = -4;
        assert_eq!(m[(0, 0)], 1);
        assert_eq!(m[(2, 3)], 7);
        assert_eq!(m[(1, 2)], -4);
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 4);
    }

    #[test]
    fn test_matrix_from_rows() {
        let m = Matrix::from_rows(vec![vec![1, 2], vec![3, 4], vec![5, 6]]);
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 2);
        assert_eq!(m[(1, 0)], 3);
        assert_eq!(m[(2, 1)], 6);
    }

    #[test]
    #[should_panic]
    fn test_matrix_out_of_bounds() {
        let m = Matrix::filled(2, 2, 0);
        let _ = m[(2, 0)];
    }

    #[test]
    fn test_utri_distinct_cells() {
        let n = 5;
        let mut m = UpperTriMatrix::filled(n, 0usize);
        // write a unique value into every cell, then read them all back
        let mut k = 1;
        for i in 0..n {
            for j in i + 1..n {
                m[(i, j)] = k;
                k += 1;
            }
        }
        let mut k = 1;
        for i in 0..n {
            for j in i + 1..n {
                assert_eq!(m[(i, j)], k, "cell ({i},{j})");
                k += 1;
            }
        }
    }

    #[test]
    fn test_utri_pairs_cover_all_cells() {
        let m = UpperTriMatrix::filled(6, 0u8);
        let pairs: Vec<_> = m.pairs().collect();
        assert_eq!(pairs.len(), 6 * 5 / 2);
        assert!(pairs.iter().all(|&(i, j)| j > i && j < 6));
        // row-major order, first and last
        assert_eq!(pairs[0], (0, 1));
        assert_eq!(*pairs.last().unwrap(), (4, 5));
    }

    #[test]
    #[should_panic]
    fn test_utri_rejects_lower_triangle() {
        let m = UpperTriMatrix::filled(4, 0);
        let _ = m[(2, 1)];
    }
}
