use num_traits::Float;
use core::fmt::{Debug, LowerExp};
use core::marker::PhantomData;
use core::ops::{Index, IndexMut};
use crate::solver::LinAlg;
use crate::LinAlgEx;

/// `num::Float`-generic [`LinAlgEx`] implementation
///
/// All numeric operations are written in pure Rust, but slow.
/// `FloatGeneric<f64>` and `FloatGeneric<f32>` are the dense double and dense float backends.
#[derive(Debug, Clone, Copy)]
pub struct FloatGeneric<F>
{
    ph_f: PhantomData<F>,
}

impl<F> LinAlg for FloatGeneric<F>
where F: Float + Debug + LowerExp + Send + Sync + 'static
{
    type F = F;

    fn norm(x: &[F]) -> F
    {
        let mut sum = F::zero();
        for u in x {
            sum = sum + *u * *u;
        }
        sum.sqrt()
    }

    fn copy(x: &[F], y: &mut[F])
    {
        assert_eq!(x.len(), y.len());

        for (u, v) in x.iter().zip(y) {
            *v = *u;
        }
    }

    fn scale(alpha: F, x: &mut[F])
    {
        for u in x {
            *u = alpha * *u;
        }
    }

    fn add(alpha: F, x: &[F], y: &mut[F])
    {
        assert_eq!(x.len(), y.len());

        for (u, v) in x.iter().zip(y) {
            *v = *v + alpha * *u;
        }
    }
}

//

struct MatIdx<'a, F: Float>
{
    n_row: usize,
    n_col: usize,
    mat: &'a[F],
    transpose: bool,
}

impl<'a, F: Float> MatIdx<'a, F>
{
    fn idx(&self, (r, c): (usize, usize)) -> usize
    {
        let (r, c) = if !self.transpose {(r, c)} else {(c, r)};

        assert!(r < self.n_row);
        assert!(c < self.n_col);

        c * self.n_row + r
    }
}

impl<'a, F: Float> Index<(usize, usize)> for MatIdx<'a, F>
{
    type Output = F;

    fn index(&self, index: (usize, usize)) -> &Self::Output
    {
        &self.mat[self.idx(index)]
    }
}

//

struct MatIdxMut<'a, F: Float>
{
    n: usize,
    mat: &'a mut[F],
}

impl<'a, F: Float> MatIdxMut<'a, F>
{
    fn idx(&self, (r, c): (usize, usize)) -> usize
    {
        assert!(r < self.n);
        assert!(c < self.n);

        c * self.n + r
    }
}

impl<'a, F: Float> Index<(usize, usize)> for MatIdxMut<'a, F>
{
    type Output = F;

    fn index(&self, index: (usize, usize)) -> &Self::Output
    {
        &self.mat[self.idx(index)]
    }
}

impl<'a, F: Float> IndexMut<(usize, usize)> for MatIdxMut<'a, F>
{
    fn index_mut(&mut self, index: (usize, usize)) -> &mut Self::Output
    {
        let i = self.idx(index);
        &mut self.mat[i]
    }
}

//

// lower Cholesky factor overwrites the lower triangle of `chol`
fn cholesky<F: Float>(mat: &MatIdxMut<F>, chol: &mut MatIdxMut<F>) -> Result<(), ()>
{
    let n = mat.n;
    let f0 = F::zero();

    for j in 0.. n {
        let mut d = mat[(j, j)];
        for p in 0.. j {
            d = d - chol[(j, p)] * chol[(j, p)];
        }
        if !(d > f0) || !d.is_finite() {
            return Err(());
        }
        let l_jj = d.sqrt();
        chol[(j, j)] = l_jj;

        for i in j + 1.. n {
            let mut s = mat[(i, j)];
            for p in 0.. j {
                s = s - chol[(i, p)] * chol[(j, p)];
            }
            chol[(i, j)] = s / l_jj;
        }
    }

    Ok(())
}

//

impl<F> LinAlgEx for FloatGeneric<F>
where F: Float + Debug + LowerExp + Send + Sync + 'static
{
    // c = a*op(a)*op(b) + b*c
    fn gemm(trans_a: bool, trans_b: bool, m: usize, n: usize, k: usize,
        alpha: F, a: &[F], b: &[F], beta: F, c: &mut[F])
    {
        assert_eq!(a.len(), m * k);
        assert_eq!(b.len(), k * n);
        assert_eq!(c.len(), m * n);

        let f0 = F::zero();

        let (a_row, a_col) = if !trans_a {(m, k)} else {(k, m)};
        let (b_row, b_col) = if !trans_b {(k, n)} else {(n, k)};

        let mat_a = MatIdx {
            n_row: a_row, n_col: a_col, mat: a, transpose: trans_a,
        };
        let mat_b = MatIdx {
            n_row: b_row, n_col: b_col, mat: b, transpose: trans_b,
        };

        for j in 0.. n {
            for i in 0.. m {
                let mut ab = f0;
                for l in 0.. k {
                    ab = ab + mat_a[(i, l)] * mat_b[(l, j)];
                }
                let v = &mut c[j * m + i];
                *v = if beta == f0 {alpha * ab} else {alpha * ab + beta * *v};
            }
        }
    }

    // c = a*mat^T*mat + b*c
    fn gram(n_row: usize, n_col: usize, alpha: F, a: &[F], beta: F, c: &mut[F])
    {
        assert_eq!(a.len(), n_row * n_col);
        assert_eq!(c.len(), n_col * n_col);

        let f0 = F::zero();

        for j in 0.. n_col {
            let col_j = &a[j * n_row.. (j + 1) * n_row];
            for i in 0..= j {
                let col_i = &a[i * n_row.. (i + 1) * n_row];
                let mut s = f0;
                for (u, v) in col_i.iter().zip(col_j) {
                    s = s + *u * *v;
                }

                let upper = j * n_col + i;
                let val = if beta == f0 {alpha * s} else {alpha * s + beta * c[upper]};
                c[upper] = val;
                c[i * n_col + j] = val;
            }
        }
    }

    fn inv_spd_worklen(n: usize) -> usize
    {
        let len_chol = n * n;
        let len_v = n;

        len_chol + len_v
    }

    fn inv_spd(n: usize, mat: &mut[F], work: &mut[F]) -> Result<(), ()>
    {
        assert_eq!(mat.len(), n * n);
        assert!(work.len() >= Self::inv_spd_worklen(n));

        let f0 = F::zero();
        let f1 = F::one();

        let (chol, rest) = work.split_at_mut(n * n);
        let (v, _) = rest.split_at_mut(n);

        let mut chol = MatIdxMut {
            n, mat: chol,
        };
        for e in chol.mat.iter_mut() {
            *e = f0;
        }

        cholesky(&MatIdxMut {n, mat: &mut *mat}, &mut chol)?;

        let mut inv = MatIdxMut {
            n, mat,
        };

        // S^-1 e_c by L y = e_c, then L^T x = y
        for c in 0.. n {
            for i in 0.. n {
                let mut s = if i == c {f1} else {f0};
                for p in 0.. i {
                    s = s - chol[(i, p)] * v[p];
                }
                v[i] = s / chol[(i, i)];
            }
            for i in (0.. n).rev() {
                let mut s = v[i];
                for p in i + 1.. n {
                    s = s - chol[(p, i)] * v[p];
                }
                v[i] = s / chol[(i, i)];
            }
            for i in 0.. n {
                inv[(i, c)] = v[i];
            }
        }

        Ok(())
    }
}

//

#[cfg(test)]
mod tests
{
    use float_eq::assert_float_eq;
    use super::*;

    type La = FloatGeneric<f64>;

    #[test]
    fn test_gemm_trans()
    {
        // a: 2x3, b: 2x2 (column-major)
        let a = [1., 4., 2., 5., 3., 6.];
        let b = [1., 0., 1., 1.];
        let mut c = [0.; 6];

        // a^T b: 3x2
        La::gemm(true, false, 3, 2, 2, 1., &a, &b, 0., &mut c);
        assert_float_eq!(c, [1., 2., 3., 5., 7., 9.], abs_all <= 1e-12);

        // b a: 2x3, accumulated onto 2 * previous values interpreted as 2x3
        let mut d = [1.; 6];
        La::gemm(false, false, 2, 3, 2, 1., &b, &a, 2., &mut d);
        assert_float_eq!(d, [7., 6., 9., 7., 11., 8.], abs_all <= 1e-12);
    }

    #[test]
    fn test_gram_inv()
    {
        // z: 3x2
        let z = [1., 0., 1., 2., 1., 0.];
        let mut g = [0.; 4];
        La::gram(3, 2, 1., &z, 0., &mut g);
        assert_float_eq!(g, [2., 2., 2., 5.], abs_all <= 1e-12);

        for i in 0.. 2 {
            g[i * 2 + i] += 1.;
        }
        let mut w = vec![0.; La::inv_spd_worklen(2)];
        La::inv_spd(2, &mut g, &mut w).unwrap();

        // inverse of [[3, 2], [2, 6]]
        assert_float_eq!(g, [6. / 14., -2. / 14., -2. / 14., 3. / 14.], abs_all <= 1e-12);
    }

    #[test]
    fn test_inv_not_pd()
    {
        let mut s = [1., 2., 2., 1.];
        let mut w = vec![0.; La::inv_spd_worklen(2)];
        assert!(La::inv_spd(2, &mut s, &mut w).is_err());
    }
}
