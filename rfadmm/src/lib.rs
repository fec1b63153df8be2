/*!
Regularized linear models over random feature maps, trained by consensus ADMM.

<script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
<script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>

This crate provides losses, regularizers, feature maps and an in-process group of ranks
to be used with the solver of [`rfadmm_core`].

# General usage

1. Choose a [`rfadmm_core::LinAlgEx`] implementation to use:
   [`prelude::FloatGeneric`] is `num::Float`-generic and pure Rust.
1. Pick a [`rfadmm_core::solver::Loss`] such as [`SquaredLoss`] or [`HingeLoss`],
   a [`rfadmm_core::solver::Regularizer`] such as [`L2Reg`],
   and a [`rfadmm_core::solver::FeatureMap`] such as [`RandomFourier`].
1. Create a [`prelude::Solver`] instance and optionally set its parameters.
1. On every process, invoke [`prelude::Solver::train`] with its own rows of the input and the targets.
   A single process uses [`prelude::SingleComm`];
   [`run_group`] runs several ranks as threads, dividing rows by [`local_rows`].

# Examples

Ridge regression \\(\min_w \frac12 \\|Xw - y\\|^2 + \frac12 \\|w\\|^2\\)
of \\(y = 2x\\) at \\(x = 1, 2, 3\\), whose solution is \\(w = 28 / 15\\):

```
use float_eq::assert_float_eq;
use rfadmm::prelude::*;
use rfadmm::*;

//env_logger::init(); // Use any logger crate as `rfadmm` uses `log` crate.

type La = FloatGeneric<f64>;
type AMat = Mat<La>;

let x = InputMat::from(AMat::new(3, 1).iter_colmaj(&[1., 2., 3.]));
let y = AMat::new(3, 1).iter_colmaj(&[2., 4., 6.]);
let mut w = AMat::new(1, 1);

let mut s = Solver::<La, _, _, _>::new(SquaredLoss::new(), L2Reg::new(), LinearMap::new(1))
    .par(|p| {
        p.lambda = 1.;
        p.max_iter = 300;
    });
let report = s.train(&SingleComm, &x, &y, &mut w).unwrap();

assert_eq!(report.iterations, 300);
assert_float_eq!(w[(0, 0)], 28. / 15., abs <= 1e-9);
```
*/

mod loss;

pub use loss::*;

//

mod regularizer;

pub use regularizer::*;

//

mod featmap;

pub use featmap::*;

//

mod group;

pub use group::*;

//

/// Prelude
pub mod prelude
{
    pub use rfadmm_core::solver::{Solver, SolverError, SolverParam, TrainReport, Comm, SingleComm, predict};
    pub use rfadmm_core::{FloatGeneric, Mat, SpMat, InputMat, FeatureParts};
}
