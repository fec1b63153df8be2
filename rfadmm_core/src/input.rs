use core::ops::Range;
use num_traits::{Zero, One};
use crate::{LinAlgEx, Mat, SpMat};

/// Local input matrix
///
/// The closed set of matrix kinds an input \\(X\\) may take.
/// Every consumer matches on it instead of relying on runtime type inspection.
#[derive(Debug, Clone)]
pub enum InputMat<L: LinAlgEx>
{
    /// Dense input.
    Dense(Mat<L>),
    /// Sparse input.
    Sparse(SpMat<L>),
}

impl<L: LinAlgEx> InputMat<L>
{
    /// Size of the matrix.
    ///
    /// Returns a tuple of a number of rows (samples) and columns (raw features).
    pub fn size(&self) -> (usize, usize)
    {
        match self {
            InputMat::Dense(m) => m.size(),
            InputMat::Sparse(m) => m.size(),
        }
    }

    /// Copies a range of rows out, keeping the kind.
    pub fn row_slice(&self, rows: Range<usize>) -> Self
    {
        match self {
            InputMat::Dense(m) => InputMat::Dense(m.rows(rows)),
            InputMat::Sparse(m) => InputMat::Sparse(m.rows(rows)),
        }
    }

    /// Calculates \\(X\\,G_{:,J}\\) for a column range \\(J\\) of a dense matrix \\(G\\).
    ///
    /// * `g` is \\(G\\) with as many rows as \\(X\\) has columns.
    /// * `cols` is the column range \\(J\\) of \\(G\\).
    /// * `out` is overwritten with the product; it shall be `n_row` by `cols.len()`.
    pub fn mul_cols(&self, g: &Mat<L>, cols: Range<usize>, out: &mut Mat<L>)
    {
        let (n, d) = self.size();
        let s = cols.len();

        assert_eq!(g.n_row(), d);
        assert!(cols.end <= g.n_col());
        assert_eq!(out.size(), (n, s));

        let g_cols = &g.as_slice()[cols.start * d.. cols.end * d];

        match self {
            InputMat::Dense(x) => {
                if n > 0 && s > 0 {
                    L::gemm(false, false, n, s, d, L::F::one(), x.as_slice(), g_cols, L::F::zero(), out.as_mut_slice());
                }
            },
            InputMat::Sparse(x) => {
                out.fill_zero();
                let o = out.as_mut_slice();
                for col in 0.. d {
                    for (r, v) in x.col_iter(col) {
                        for c in 0.. s {
                            o[c * n + r] = o[c * n + r] + v * g_cols[c * d + col];
                        }
                    }
                }
            },
        }
    }

    /// Copies a column range \\(X_{:,J}\\) into a dense matrix.
    ///
    /// * `out` is overwritten; it shall be `n_row` by `cols.len()`.
    pub fn cols_into(&self, cols: Range<usize>, out: &mut Mat<L>)
    {
        let (n, d) = self.size();

        assert!(cols.end <= d);
        assert_eq!(out.size(), (n, cols.len()));

        match self {
            InputMat::Dense(x) => {
                L::copy(&x.as_slice()[cols.start * n.. cols.end * n], out.as_mut_slice());
            },
            InputMat::Sparse(x) => {
                out.fill_zero();
                for (c, col) in cols.enumerate() {
                    for (r, v) in x.col_iter(col) {
                        out[(r, c)] = v;
                    }
                }
            },
        }
    }

    /// Fingerprint of the shape and the values.
    ///
    /// Equal inputs give equal fingerprints, used to detect a stale block cache.
    pub fn fingerprint(&self) -> u64
    {
        use std::hash::{Hash, Hasher};
        use std::collections::hash_map::DefaultHasher;
        use num_traits::ToPrimitive;

        let mut h = DefaultHasher::new();
        self.size().hash(&mut h);
        match self {
            InputMat::Dense(_) => 0_u8,
            InputMat::Sparse(_) => 1_u8,
        }.hash(&mut h);

        let mut put = |r: usize, c: usize, v: L::F| {
            r.hash(&mut h);
            c.hash(&mut h);
            v.to_f64().unwrap_or(f64::NAN).to_bits().hash(&mut h);
        };

        match self {
            InputMat::Dense(x) => {
                let (n, d) = x.size();
                for c in 0.. d {
                    for r in 0.. n {
                        put(r, c, x[(r, c)]);
                    }
                }
            },
            InputMat::Sparse(x) => {
                for c in 0.. x.size().1 {
                    for (r, v) in x.col_iter(c) {
                        put(r, c, v);
                    }
                }
            },
        }

        h.finish()
    }
}

impl<L: LinAlgEx> From<Mat<L>> for InputMat<L>
{
    fn from(m: Mat<L>) -> Self
    {
        InputMat::Dense(m)
    }
}

impl<L: LinAlgEx> From<SpMat<L>> for InputMat<L>
{
    fn from(m: SpMat<L>) -> Self
    {
        InputMat::Sparse(m)
    }
}

//
