use std::collections::BTreeMap;
use core::ops::Range;
use num_traits::Zero;
use crate::solver::LinAlg;

/// Sparse matrix in compressed sparse column form
///
/// Holds a local block of rows of a row-partitioned sparse input.
/// The structure is fixed once built; row indices within a column are sorted.
#[derive(Debug, Clone)]
pub struct SpMat<L: LinAlg>
{
    n_row: usize,
    n_col: usize,
    indptr: Vec<usize>,
    indices: Vec<usize>,
    values: Vec<L::F>,
}

impl<L: LinAlg> SpMat<L>
{
    /// Creates an instance from `(row, column, value)` triplets.
    ///
    /// Returns the [`SpMat`] instance, or `None` if a triplet is out of range.
    /// Duplicated entries are summed up.
    pub fn from_triplets(n_row: usize, n_col: usize, triplets: &[(usize, usize, L::F)]) -> Option<Self>
    {
        // ordered by column, then by row
        let mut entries = BTreeMap::new();
        for &(r, c, v) in triplets {
            if r >= n_row || c >= n_col {
                return None;
            }
            let e = entries.entry((c, r)).or_insert_with(L::F::zero);
            *e = *e + v;
        }

        let mut indptr = vec![0; n_col + 1];
        let mut indices = Vec::with_capacity(entries.len());
        let mut values = Vec::with_capacity(entries.len());

        for ((c, r), v) in entries {
            indptr[c + 1] += 1;
            indices.push(r);
            values.push(v);
        }
        for c in 0.. n_col {
            indptr[c + 1] += indptr[c];
        }

        Some(SpMat {
            n_row, n_col, indptr, indices, values,
        })
    }

    /// Size of the matrix.
    ///
    /// Returns a tuple of a number of rows and columns.
    pub fn size(&self) -> (usize, usize)
    {
        (self.n_row, self.n_col)
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize
    {
        self.values.len()
    }

    /// Iterates `(row, value)` of the stored entries of a column.
    pub fn col_iter(&self, c: usize) -> impl Iterator<Item=(usize, L::F)> + '_
    {
        assert!(c < self.n_col);

        let span = self.indptr[c].. self.indptr[c + 1];
        self.indices[span.clone()].iter().copied().zip(self.values[span].iter().copied())
    }

    /// Copies a range of rows out into a new matrix.
    ///
    /// Returns the `rows.len()` by `n_col` matrix with rows renumbered from zero.
    pub fn rows(&self, rows: Range<usize>) -> Self
    {
        assert!(rows.end <= self.n_row);

        let mut indptr = vec![0; self.n_col + 1];
        let mut indices = Vec::new();
        let mut values = Vec::new();

        for c in 0.. self.n_col {
            for (r, v) in self.col_iter(c) {
                if rows.contains(&r) {
                    indices.push(r - rows.start);
                    values.push(v);
                }
            }
            indptr[c + 1] = indices.len();
        }

        SpMat {
            n_row: rows.len(),
            n_col: self.n_col,
            indptr, indices, values,
        }
    }
}

//

#[cfg(test)]
mod tests
{
    use crate::FloatGeneric;
    use super::*;

    type ASpMat = SpMat<FloatGeneric<f64>>;

    #[test]
    fn test_triplets()
    {
        let a = ASpMat::from_triplets(3, 2, &[
            (2, 0, 1.), (0, 0, 2.), (1, 1, 3.), (0, 0, 0.5),
        ]).unwrap();

        assert_eq!(a.nnz(), 3);
        assert_eq!(a.col_iter(0).collect::<Vec<_>>(), vec![(0, 2.5), (2, 1.)]);
        assert_eq!(a.col_iter(1).collect::<Vec<_>>(), vec![(1, 3.)]);

        let b = a.rows(1.. 3);
        assert_eq!(b.size(), (2, 2));
        assert_eq!(b.col_iter(0).collect::<Vec<_>>(), vec![(1, 1.)]);
        assert_eq!(b.col_iter(1).collect::<Vec<_>>(), vec![(0, 3.)]);

        assert!(ASpMat::from_triplets(2, 2, &[(2, 0, 1.)]).is_none());
    }
}
