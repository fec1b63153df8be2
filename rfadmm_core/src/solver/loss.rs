//! Loss and regularizer

use crate::solver::LinAlg;
use crate::Mat;

/// Loss function trait
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Expresses \\(\ell(O, Y)\\) over local predictions \\(O\\) and targets \\(Y\\),
/// both of which are `n` by `k` and separable across processes.
pub trait Loss<L: LinAlg>
{
    /// Calculates \\(\ell(O, Y)\\).
    ///
    /// * `o` is predictions \\(O\\).
    /// * `y` is targets \\(Y\\) of the same size.
    fn evaluate(&self, o: &Mat<L>, y: &Mat<L>) -> L::F;

    /// Calculates the proximal map of \\(t\\,\ell(\cdot, Y)\\) at \\(V\\),
    /// \\[
    /// \arg\min_O t\,\ell(O, Y) + \frac12 \\|O - V\\|^2.
    /// \\]
    ///
    /// * `input` is \\(V\\).
    /// * `step` is \\(t > 0\\).
    /// * `y` is targets \\(Y\\).
    /// * `out` is overwritten with the result. All matrices shall have the same size.
    fn prox(&self, input: &Mat<L>, step: L::F, y: &Mat<L>, out: &mut Mat<L>);
}

/// Regularizer trait
///
/// Expresses \\(r(W)\\) over the `D` by `k` weights.
pub trait Regularizer<L: LinAlg>
{
    /// Calculates \\(r(W)\\).
    ///
    /// The coordinating process uses it for the regularized objective it reports.
    fn evaluate(&self, w: &Mat<L>) -> L::F;

    /// Calculates the proximal map of \\(t\\,r\\) at \\(V - M\\),
    /// \\[
    /// \arg\min_W t\,r(W) + \frac12 \\|W - (V - M)\\|^2.
    /// \\]
    ///
    /// * `input` is \\(V\\).
    /// * `step` is \\(t > 0\\).
    /// * `dual` is \\(M\\).
    /// * `out` is overwritten with the result. All matrices shall have the same size.
    fn prox(&self, input: &Mat<L>, step: L::F, dual: &Mat<L>, out: &mut Mat<L>);
}
