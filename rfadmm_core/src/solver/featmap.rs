//! Feature map

use core::ops::Range;
use crate::{LinAlgEx, Mat, InputMat};

/// Feature map trait
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Expresses \\(z: \mathbb{R}^d \to \mathbb{R}^D\\) applied row by row to an input \\(X\\),
/// giving a feature matrix \\(Z = z(X)\\).
/// Output columns are produced block by block, so \\(Z\\) itself is never materialized as a whole.
///
/// A map shall be deterministic: identical arguments give identical output on every call and on every process.
pub trait FeatureMap<L: LinAlgEx>: Sync
{
    /// Number of raw features \\(d\\), the columns of \\(X\\).
    fn input_dim(&self) -> usize;

    /// Number of mapped features \\(D\\), the columns of \\(Z\\).
    fn output_dim(&self) -> usize;

    /// Calculates \\(Z_{:,J}\\).
    ///
    /// * `x` is \\(X\\) with [`FeatureMap::input_dim`] columns.
    /// * `range` is a column range \\(J\\) of \\(Z\\), within [`FeatureMap::output_dim`].
    /// * `z` is overwritten with \\(Z_{:,J}\\);
    ///   it shall have as many rows as `x` and `range.len()` columns.
    fn map(&self, x: &InputMat<L>, range: Range<usize>, z: &mut Mat<L>);
}
