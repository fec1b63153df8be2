use core::ops::{Index, IndexMut, Deref, Range};
use num_traits::{Float, Zero};
use crate::solver::LinAlg;

//

/// Dense matrix
///
/// Matrix struct which owns a `Vec` of data array stored in column-major.
/// It is used for the local part of every row-partitioned matrix
/// (inputs, targets, outputs, duals) as well as the replicated weight matrices.
#[derive(Debug, Clone)]
pub struct Mat<L: LinAlg>
{
    n_row: usize,
    n_col: usize,
    array: Vec<L::F>,
}

impl<L: LinAlg> Mat<L>
{
    /// Creates an instance.
    ///
    /// Returns the [`Mat`] instance with zero data.
    /// * `n_row` is a number of rows.
    /// * `n_col` is a number of columns.
    pub fn new(n_row: usize, n_col: usize) -> Self
    {
        Mat {
            n_row,
            n_col,
            array: vec![L::F::zero(); n_row * n_col],
        }
    }

    /// Creates an instance from a column-major data array.
    ///
    /// Returns `None` if the array length differs from `n_row * n_col`.
    pub fn from_vec(n_row: usize, n_col: usize, array: Vec<L::F>) -> Option<Self>
    {
        if array.len() == n_row * n_col {
            Some(Mat {n_row, n_col, array})
        }
        else {
            None
        }
    }

    /// Size of the matrix.
    ///
    /// Returns a tuple of a number of rows and columns.
    pub fn size(&self) -> (usize, usize)
    {
        (self.n_row, self.n_col)
    }

    /// Number of rows.
    pub fn n_row(&self) -> usize
    {
        self.n_row
    }

    /// Number of columns.
    pub fn n_col(&self) -> usize
    {
        self.n_col
    }

    /// Column-major data array.
    pub fn as_slice(&self) -> &[L::F]
    {
        &self.array
    }

    /// Mutable column-major data array.
    pub fn as_mut_slice(&mut self) -> &mut[L::F]
    {
        &mut self.array
    }

    /// Data by a function.
    ///
    /// * `func` takes a row and a column of the matrix and returns data of each element.
    pub fn set_by_fn<M>(&mut self, mut func: M)
    where M: FnMut(usize, usize) -> L::F
    {
        for c in 0.. self.n_col {
            for r in 0.. self.n_row {
                self[(r, c)] = func(r, c);
            }
        }
    }
    /// Builder pattern of [`Mat::set_by_fn`].
    pub fn by_fn<M>(mut self, func: M) -> Self
    where M: FnMut(usize, usize) -> L::F
    {
        self.set_by_fn(func);
        self
    }

    /// Data by an iterator in column-major.
    ///
    /// * `iter` iterates matrix data in column-major.
    pub fn set_iter_colmaj<T, I>(&mut self, iter: T)
    where T: IntoIterator<Item=I>, I: Deref<Target=L::F>
    {
        for (e, v) in self.array.iter_mut().zip(iter) {
            *e = *v;
        }
    }
    /// Builder pattern of [`Mat::set_iter_colmaj`].
    pub fn iter_colmaj<T, I>(mut self, iter: T) -> Self
    where T: IntoIterator<Item=I>, I: Deref<Target=L::F>
    {
        self.set_iter_colmaj(iter);
        self
    }

    /// Data by an iterator in row-major.
    ///
    /// * `iter` iterates matrix data in row-major.
    pub fn set_iter_rowmaj<T, I>(&mut self, iter: T)
    where T: IntoIterator<Item=I>, I: Deref<Target=L::F>
    {
        let mut i = iter.into_iter();

        for r in 0.. self.n_row {
            for c in 0.. self.n_col {
                if let Some(v) = i.next() {
                    self[(r, c)] = *v;
                }
                else {
                    return;
                }
            }
        }
    }
    /// Builder pattern of [`Mat::set_iter_rowmaj`].
    pub fn iter_rowmaj<T, I>(mut self, iter: T) -> Self
    where T: IntoIterator<Item=I>, I: Deref<Target=L::F>
    {
        self.set_iter_rowmaj(iter);
        self
    }

    /// Copies a range of rows out into a new matrix.
    ///
    /// Returns the `rows.len()` by `n_col` matrix.
    pub fn rows(&self, rows: Range<usize>) -> Self
    {
        assert!(rows.end <= self.n_row);

        let n = rows.len();
        let mut sub = Mat::new(n, self.n_col);
        for c in 0.. self.n_col {
            let src = &self.array[c * self.n_row + rows.start.. c * self.n_row + rows.end];
            L::copy(src, &mut sub.array[c * n.. (c + 1) * n]);
        }
        sub
    }

    /// Overwrites rows from `start` with all rows of `sub`.
    pub fn set_rows(&mut self, start: usize, sub: &Self)
    {
        assert_eq!(sub.n_col, self.n_col);
        assert!(start + sub.n_row <= self.n_row);

        let n = sub.n_row;
        for c in 0.. self.n_col {
            let dst = &mut self.array[c * self.n_row + start.. c * self.n_row + start + n];
            L::copy(&sub.array[c * n.. (c + 1) * n], dst);
        }
    }

    /// Sets all elements zero.
    pub fn fill_zero(&mut self)
    {
        L::scale(L::F::zero(), &mut self.array);
    }

    /// Scales by \\(\alpha\\).
    ///
    /// * `alpha` is a scalar \\(\alpha\\).
    pub fn set_scale(&mut self, alpha: L::F)
    {
        L::scale(alpha, &mut self.array);
    }
    /// Builder pattern of [`Mat::set_scale`].
    pub fn scale(mut self, alpha: L::F) -> Self
    {
        self.set_scale(alpha);
        self
    }

    /// Calculates \\(\alpha X + Y\\) where this matrix is \\(Y\\).
    pub fn add(&mut self, alpha: L::F, x: &Self)
    {
        assert_eq!(x.size(), self.size());

        L::add(alpha, &x.array, &mut self.array);
    }

    /// Copies all elements of `x` of the same size.
    pub fn copy_from(&mut self, x: &Self)
    {
        assert_eq!(x.size(), self.size());

        L::copy(&x.array, &mut self.array);
    }

    /// Frobenius norm.
    pub fn norm(&self) -> L::F
    {
        L::norm(&self.array)
    }

    /// Checks that no element is NaN or infinite.
    pub fn is_finite(&self) -> bool
    {
        self.array.iter().all(|e| e.is_finite())
    }

    fn idx(&self, (r, c): (usize, usize)) -> usize
    {
        assert!(r < self.n_row);
        assert!(c < self.n_col);

        c * self.n_row + r
    }
}

//

impl<L: LinAlg> Index<(usize, usize)> for Mat<L>
{
    type Output = L::F;

    fn index(&self, index: (usize, usize)) -> &Self::Output
    {
        let i = self.idx(index);

        &self.array[i]
    }
}

impl<L: LinAlg> IndexMut<(usize, usize)> for Mat<L>
{
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output
    {
        let i = self.idx(index);

        &mut self.array[i]
    }
}

//

#[cfg(test)]
mod tests
{
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;
    use super::*;

    type AMat = Mat<FloatGeneric<f64>>;

    #[test]
    fn test_rows()
    {
        let a = AMat::new(4, 2).iter_rowmaj(&[
            1., 2.,
            3., 4.,
            5., 6.,
            7., 8.,
        ]);

        let sub = a.rows(1.. 3);
        assert_eq!(sub.size(), (2, 2));
        assert_float_eq!(sub.as_slice(), [3., 5., 4., 6.].as_ref(), abs_all <= 0.);

        let mut b = AMat::new(4, 2);
        b.set_rows(2, &sub);
        assert_float_eq!(b.as_slice(), [0., 0., 3., 5., 0., 0., 4., 6.].as_ref(), abs_all <= 0.);
    }

    #[test]
    fn test_add_norm()
    {
        let mut a = AMat::new(2, 2).by_fn(|r, c| (r + 2 * c) as f64);
        let b = a.clone().scale(2.);
        a.add(-1., &b);
        assert_float_eq!(a.as_slice(), [0., -1., -2., -3.].as_ref(), abs_all <= 0.);
        assert_float_eq!(a.norm(), 14_f64.sqrt(), abs <= 1e-12);
        assert!(a.is_finite());
    }
}
