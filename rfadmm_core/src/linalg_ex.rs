use crate::solver::LinAlg;

/// Linear algebra extended subtrait
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-svg.js"></script>
///
/// All matrices are stored in column-major.
pub trait LinAlgEx: LinAlg
{
    /// Calculates \\(\alpha\\,{\rm op}(A)\\,{\rm op}(B) + \beta C\\).
    ///
    /// * If `trans_a` is `true`, \\({\rm op}(A)=A^T\\), otherwise \\({\rm op}(A)=A\\). Likewise `trans_b` for \\(B\\).
    /// * `m` is a number of rows of \\({\rm op}(A)\\) and \\(C\\).
    /// * `n` is a number of columns of \\({\rm op}(B)\\) and \\(C\\).
    /// * `k` is a number of columns of \\({\rm op}(A)\\) and rows of \\({\rm op}(B)\\).
    /// * `alpha` is a scalar \\(\alpha\\).
    /// * `a` is a matrix \\(A\\), its length shall be `m * k`.
    /// * `b` is a matrix \\(B\\), its length shall be `k * n`.
    /// * `beta` is a scalar \\(\beta\\).
    /// * `c` is a matrix \\(C\\) before entry,
    ///   \\(\alpha\\,{\rm op}(A)\\,{\rm op}(B) + \beta C\\) on exit.
    ///   Its length shall be `m * n`.
    fn gemm(trans_a: bool, trans_b: bool, m: usize, n: usize, k: usize,
        alpha: Self::F, a: &[Self::F], b: &[Self::F], beta: Self::F, c: &mut[Self::F]);

    /// Calculates \\(\alpha A^T A + \beta C\\), a symmetric rank-k update.
    ///
    /// * `n_row` is a number of rows of \\(A\\).
    /// * `n_col` is a number of columns of \\(A\\), and rows and columns of \\(C\\).
    /// * `alpha` is a scalar \\(\alpha\\).
    /// * `a` is a matrix \\(A\\).
    /// * `beta` is a scalar \\(\beta\\).
    /// * `c` is a full-storage symmetric matrix \\(C\\) before entry,
    ///   \\(\alpha A^T A + \beta C\\) on exit, both triangles filled.
    fn gram(n_row: usize, n_col: usize, alpha: Self::F, a: &[Self::F], beta: Self::F, c: &mut[Self::F]);

    /// Query of a length of work slice that [`LinAlgEx::inv_spd`] requires.
    ///
    /// Returns a length of work slice.
    /// * `n` is a number of rows and columns of \\(S\\) (see [`LinAlgEx::inv_spd`]).
    fn inv_spd_worklen(n: usize) -> usize;

    /// Inverts a symmetric positive definite matrix \\(S\\) in place.
    ///
    /// Returns `Ok`, or `Err` if \\(S\\) turns out not to be positive definite.
    /// * `n` is a number of rows and columns of \\(S\\).
    /// * `mat` is the full-storage matrix \\(S\\) before entry, \\(S^{-1}\\) on exit.
    ///   On `Err` its content is unspecified.
    /// * `work` slice is used for temporal variables.
    fn inv_spd(n: usize, mat: &mut[Self::F], work: &mut[Self::F]) -> Result<(), ()>;
}
