use core::marker::PhantomData;
use core::ops::Range;
use num_traits::Float;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand::distributions::Uniform;
use rand_distr::{Cauchy, Normal, Distribution};
use rfadmm_core::solver::{FeatureMap, SolverError};
use rfadmm_core::{LinAlgEx, Mat, InputMat};

//

/// Identity feature map, \\(z(x) = x\\) and \\(D = d\\).
///
/// Plain linear models are trained with it.
#[derive(Debug, Clone, Copy)]
pub struct LinearMap<L>
{
    ph_l: PhantomData<L>,
    dim: usize,
}

impl<L: LinAlgEx> LinearMap<L>
{
    /// Creates an instance for `dim` raw features.
    pub fn new(dim: usize) -> Self
    {
        LinearMap {
            ph_l: PhantomData,
            dim,
        }
    }
}

impl<L: LinAlgEx> FeatureMap<L> for LinearMap<L>
{
    fn input_dim(&self) -> usize
    {
        self.dim
    }

    fn output_dim(&self) -> usize
    {
        self.dim
    }

    fn map(&self, x: &InputMat<L>, range: Range<usize>, z: &mut Mat<L>)
    {
        x.cols_into(range, z);
    }
}

//

/// Shift-invariant kernel approximated by [`RandomFourier`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kernel
{
    /// \\(k(x, x') = \exp(-\\|x - x'\\|_2^2 / 2\sigma^2)\\), frequencies drawn from a normal distribution.
    Gaussian { sigma: f64 },
    /// \\(k(x, x') = \exp(-\\|x - x'\\|_1 / \sigma)\\), frequencies drawn from a Cauchy distribution.
    Laplacian { sigma: f64 },
}

/// Random Fourier feature map
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\[
/// z_j(x) = \sqrt{2 / D} \cos(\omega_j^T x + b_j), \quad j = 0, \ldots, D - 1
/// \\]
/// so that \\(z(x)^T z(x') \approx k(x, x')\\).
/// \\(\omega_j\\) follows the spectral density of the [`Kernel`] and \\(b_j\\) is uniform on \\([0, 2\pi)\\).
///
/// The draws depend only on the seed, so every process built with the same arguments holds the same map.
#[derive(Debug, Clone)]
pub struct RandomFourier<L: LinAlgEx>
{
    omega: Mat<L>,
    bias: Vec<L::F>,
    scale: L::F,
}

impl<L: LinAlgEx> RandomFourier<L>
{
    /// Creates an instance.
    ///
    /// Returns the [`RandomFourier`] instance, or `Err` with [`SolverError::InvalidParam`]
    /// if `sigma` is not positive or `output_dim` is zero.
    /// * `input_dim` is \\(d\\).
    /// * `output_dim` is \\(D\\).
    /// * `kernel` selects the frequency distribution.
    /// * `seed` seeds the random draws.
    pub fn new(input_dim: usize, output_dim: usize, kernel: Kernel, seed: u64) -> Result<Self, SolverError>
    {
        let sigma = match kernel {
            Kernel::Gaussian { sigma } | Kernel::Laplacian { sigma } => sigma,
        };
        if !(sigma > 0.) || output_dim == 0 {
            log::error!("Invalid random Fourier setting: sigma {}, output_dim {}", sigma, output_dim);
            return Err(SolverError::InvalidParam);
        }

        let cvt = |v: f64| num_traits::cast::<f64, L::F>(v).ok_or(SolverError::InvalidParam);

        let mut rng = StdRng::seed_from_u64(seed);
        let mut omega = Mat::new(input_dim, output_dim);

        match kernel {
            Kernel::Gaussian {..} => {
                let dist = Normal::new(0., 1. / sigma).map_err(|_| SolverError::InvalidParam)?;
                for e in omega.as_mut_slice() {
                    *e = cvt(dist.sample(&mut rng))?;
                }
            },
            Kernel::Laplacian {..} => {
                let dist = Cauchy::new(0., 1. / sigma).map_err(|_| SolverError::InvalidParam)?;
                for e in omega.as_mut_slice() {
                    *e = cvt(dist.sample(&mut rng))?;
                }
            },
        }

        let phase = Uniform::new(0., 2. * core::f64::consts::PI);
        let bias = (0.. output_dim)
            .map(|_| cvt(phase.sample(&mut rng)))
            .collect::<Result<Vec<_>, _>>()?;

        let scale = cvt((2. / output_dim as f64).sqrt())?;

        log::debug!("random Fourier features {} -> {}, {:?}", input_dim, output_dim, kernel);

        Ok(RandomFourier {
            omega, bias, scale,
        })
    }
}

impl<L: LinAlgEx> FeatureMap<L> for RandomFourier<L>
{
    fn input_dim(&self) -> usize
    {
        self.omega.n_row()
    }

    fn output_dim(&self) -> usize
    {
        self.omega.n_col()
    }

    fn map(&self, x: &InputMat<L>, range: Range<usize>, z: &mut Mat<L>)
    {
        let (n, _) = x.size();
        let start = range.start;

        if range.is_empty() {
            return;
        }
        if self.input_dim() == 0 {
            z.fill_zero();
        }
        else {
            x.mul_cols(&self.omega, range, z);
        }

        for c in 0.. z.n_col() {
            let b = self.bias[start + c];
            for r in 0.. n {
                z[(r, c)] = self.scale * (z[(r, c)] + b).cos();
            }
        }
    }
}

//

#[cfg(test)]
mod tests
{
    use float_eq::assert_float_eq;
    use rfadmm_core::FloatGeneric;
    use super::*;

    type La = FloatGeneric<f64>;
    type AMat = Mat<La>;

    fn input() -> InputMat<La>
    {
        InputMat::from(AMat::new(4, 3).by_fn(|r, c| ((r * 3 + c) as f64 * 0.37).sin()))
    }

    #[test]
    fn test_linear()
    {
        let x = input();
        let map = LinearMap::<La>::new(3);
        let mut z = AMat::new(4, 2);
        map.map(&x, 1.. 3, &mut z);

        let mut expected = AMat::new(4, 2);
        x.cols_into(1.. 3, &mut expected);
        assert_float_eq!(z.as_slice(), expected.as_slice(), abs_all <= 0.);
    }

    #[test]
    fn test_fourier_blocks_and_seed()
    {
        let _ = env_logger::builder().is_test(true).try_init();

        let x = input();
        let map = RandomFourier::<La>::new(3, 8, Kernel::Gaussian { sigma: 1.5 }, 7).unwrap();
        let same = RandomFourier::<La>::new(3, 8, Kernel::Gaussian { sigma: 1.5 }, 7).unwrap();
        let other = RandomFourier::<La>::new(3, 8, Kernel::Gaussian { sigma: 1.5 }, 8).unwrap();

        let mut full = AMat::new(4, 8);
        map.map(&x, 0.. 8, &mut full);
        assert!(full.is_finite());
        for e in full.as_slice() {
            assert!(e.abs() <= 0.5 + 1e-12);
        }

        // a block equals the same columns of the full map
        let mut block = AMat::new(4, 3);
        map.map(&x, 5.. 8, &mut block);
        let mut expected = AMat::new(4, 3);
        expected.set_by_fn(|r, c| full[(r, c + 5)]);
        assert_float_eq!(block.as_slice(), expected.as_slice(), abs_all <= 1e-12);

        let mut z_same = AMat::new(4, 8);
        same.map(&x, 0.. 8, &mut z_same);
        assert_float_eq!(z_same.as_slice(), full.as_slice(), abs_all <= 0.);

        let mut z_other = AMat::new(4, 8);
        other.map(&x, 0.. 8, &mut z_other);
        assert!(z_other.as_slice() != full.as_slice());
    }

    #[test]
    fn test_fourier_kernel_approx()
    {
        // z(x)^T z(x) = (2 / D) sum cos^2, close to k(x, x) = 1
        let x = InputMat::from(AMat::new(1, 2).iter_colmaj(&[0.3, -0.2]));
        for kernel in [Kernel::Gaussian { sigma: 1. }, Kernel::Laplacian { sigma: 1. }] {
            let map = RandomFourier::<La>::new(2, 2000, kernel, 1).unwrap();
            let mut z = AMat::new(1, 2000);
            map.map(&x, 0.. 2000, &mut z);
            let k = z.norm() * z.norm();
            assert_float_eq!(k, 1., abs <= 0.1);
        }

        assert_eq!(
            RandomFourier::<La>::new(2, 4, Kernel::Laplacian { sigma: 0. }, 1).err(),
            Some(SolverError::InvalidParam)
        );
    }
}
