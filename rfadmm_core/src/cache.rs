use std::sync::OnceLock;
use num_traits::{Zero, One};
use crate::solver::{FeatureMap, SolverError};
use crate::{LinAlgEx, Mat, InputMat, FeatureParts};

/// Block cache
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Holds \\((Z_j^T Z_j + I)^{-1}\\) for every feature block \\(J_j\\),
/// where \\(Z_j\\) is the block of mapped features of the local input.
/// Each entry is written once and read-only afterwards, so blocks are built and applied concurrently.
///
/// The cache is bound to a fingerprint of the input it was built from;
/// binding a different input drops every entry.
#[derive(Debug)]
pub struct BlockCache<L: LinAlgEx>
{
    parts: FeatureParts,
    entries: Vec<OnceLock<Mat<L>>>,
    key: Option<u64>,
}

impl<L: LinAlgEx> BlockCache<L>
{
    /// Creates an empty instance with one entry slot per block of `parts`.
    pub fn new(parts: FeatureParts) -> Self
    {
        let entries = (0.. parts.len()).map(|_| OnceLock::new()).collect();

        BlockCache {
            parts,
            entries,
            key: None,
        }
    }

    /// Feature blocks of the entries.
    pub fn parts(&self) -> &FeatureParts
    {
        &self.parts
    }

    /// Fingerprint of the input the entries belong to, if bound.
    pub fn key(&self) -> Option<u64>
    {
        self.key
    }

    /// Checks if the `j`-th entry is built.
    pub fn is_built(&self, j: usize) -> bool
    {
        self.entries[j].get().is_some()
    }

    /// Drops every entry and the binding.
    pub fn reset(&mut self)
    {
        for e in self.entries.iter_mut() {
            e.take();
        }
        self.key = None;
    }

    /// Changes the feature blocks.
    ///
    /// Entries are dropped only if `parts` differs from the current one.
    pub fn layout(&mut self, parts: FeatureParts)
    {
        if parts != self.parts {
            *self = BlockCache::new(parts);
        }
    }

    /// Binds the cache to an input fingerprint.
    ///
    /// Returns `true` if the entries are kept, i.e. `key` equals the current binding.
    pub fn bind(&mut self, key: u64) -> bool
    {
        if self.key == Some(key) {
            true
        }
        else {
            self.reset();
            self.key = Some(key);
            false
        }
    }

    /// Builds the `j`-th entry from `map` and `x`, unless already built.
    ///
    /// Returns `Ok`, or `Err` if \\(Z_j^T Z_j + I\\) could not be inverted.
    pub fn build<M>(&self, j: usize, map: &M, x: &InputMat<L>) -> Result<(), SolverError>
    where M: FeatureMap<L> + ?Sized
    {
        if self.is_built(j) {
            return Ok(());
        }

        let range = self.parts.range(j);
        let sj = range.len();
        let (n, _) = x.size();

        let mut z = Mat::new(n, sj);
        map.map(x, range, &mut z);

        let mut g = Mat::new(sj, sj);
        L::gram(n, sj, L::F::one(), z.as_slice(), L::F::zero(), g.as_mut_slice());
        for i in 0.. sj {
            g[(i, i)] = g[(i, i)] + L::F::one();
        }

        let mut work = vec![L::F::zero(); L::inv_spd_worklen(sj)];
        L::inv_spd(sj, g.as_mut_slice(), &mut work).map_err(|_| {
            log::error!("Block {}: Gram matrix not invertible", j);
            SolverError::SingularGram
        })?;

        // a concurrent builder may have won; its entry is identical
        let _ = self.entries[j].set(g);

        Ok(())
    }

    /// Calculates \\((Z_j^T Z_j + I)^{-1} R\\).
    ///
    /// Returns `Ok`, or `Err` if the `j`-th entry is not built.
    /// * `rhs` is \\(R\\), `sj` by `k`.
    /// * `out` is overwritten with the product, the same size as `rhs`.
    pub fn apply(&self, j: usize, rhs: &Mat<L>, out: &mut Mat<L>) -> Result<(), SolverError>
    {
        let inv = self.entries[j].get().ok_or_else(|| {
            log::error!("Block {}: cache entry not built", j);
            SolverError::CacheMissing
        })?;

        let (sj, k) = rhs.size();
        assert_eq!(inv.n_row(), sj);
        assert_eq!(out.size(), (sj, k));

        if sj > 0 && k > 0 {
            L::gemm(false, false, sj, k, sj, L::F::one(), inv.as_slice(), rhs.as_slice(), L::F::zero(), out.as_mut_slice());
        }

        Ok(())
    }
}

//

#[cfg(test)]
mod tests
{
    use core::ops::Range;
    use float_eq::assert_float_eq;
    use crate::FloatGeneric;
    use super::*;

    type La = FloatGeneric<f64>;

    // picks columns of the raw input
    struct Cols;

    impl FeatureMap<La> for Cols
    {
        fn input_dim(&self) -> usize
        {
            2
        }

        fn output_dim(&self) -> usize
        {
            2
        }

        fn map(&self, x: &InputMat<La>, range: Range<usize>, z: &mut Mat<La>)
        {
            x.cols_into(range, z);
        }
    }

    fn input() -> InputMat<La>
    {
        // z^T z = [[2, 2], [2, 5]]
        InputMat::from(Mat::new(3, 2).iter_rowmaj(&[
            1., 2.,
            0., 1.,
            1., 0.,
        ]))
    }

    #[test]
    fn test_build_apply()
    {
        let _ = env_logger::builder().is_test(true).try_init();

        let x = input();
        let cache = BlockCache::<La>::new(FeatureParts::new(2, 1));
        assert!(!cache.is_built(0));

        let rhs = Mat::new(2, 2).iter_rowmaj(&[
            1., 0.,
            0., 1.,
        ]);
        let mut out = Mat::new(2, 2);
        assert_eq!(cache.apply(0, &rhs, &mut out), Err(SolverError::CacheMissing));

        cache.build(0, &Cols, &x).unwrap();
        assert!(cache.is_built(0));
        cache.apply(0, &rhs, &mut out).unwrap();

        // inverse of [[3, 2], [2, 6]]
        let expected = [6. / 14., -2. / 14., -2. / 14., 3. / 14.];
        assert_float_eq!(out.as_slice(), expected.as_ref(), abs_all <= 1e-12);

        // second build keeps the entry
        cache.build(0, &Cols, &x).unwrap();
        let mut again = Mat::new(2, 2);
        cache.apply(0, &rhs, &mut again).unwrap();
        assert_float_eq!(again.as_slice(), out.as_slice(), abs_all <= 0.);
    }

    #[test]
    fn test_blocks_and_binding()
    {
        let x = input();
        let mut cache = BlockCache::<La>::new(FeatureParts::new(2, 2));

        assert!(!cache.bind(x.fingerprint()));
        cache.build(1, &Cols, &x).unwrap();
        assert!(!cache.is_built(0));
        assert!(cache.is_built(1));

        // block 1 is the second column: (1 + 5)^-1
        let mut out = Mat::new(1, 1);
        cache.apply(1, &Mat::new(1, 1).by_fn(|_, _| 1.), &mut out).unwrap();
        assert_float_eq!(out[(0, 0)], 1. / 6., abs <= 1e-12);

        assert!(cache.bind(x.fingerprint()));
        assert!(cache.is_built(1));

        assert!(!cache.bind(x.row_slice(0.. 2).fingerprint()));
        assert!(!cache.is_built(1));

        cache.build(1, &Cols, &x).unwrap();
        cache.layout(FeatureParts::new(2, 2));
        assert!(cache.is_built(1));
        cache.layout(FeatureParts::new(2, 1));
        assert_eq!(cache.parts().len(), 1);
        assert_eq!(cache.key(), None);
    }
}
