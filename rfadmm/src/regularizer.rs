use core::marker::PhantomData;
use num_traits::{Float, Zero, One};
use rfadmm_core::solver::{Regularizer, LinAlg};
use rfadmm_core::Mat;

//

// out = g(input - dual) elementwise
fn map_shifted<L, G>(input: &Mat<L>, dual: &Mat<L>, out: &mut Mat<L>, g: G)
where L: LinAlg, G: Fn(L::F) -> L::F
{
    assert_eq!(input.size(), dual.size());
    assert_eq!(input.size(), out.size());

    for ((v, m), o) in input.as_slice().iter().zip(dual.as_slice()).zip(out.as_mut_slice()) {
        *o = g(*v - *m);
    }
}

//

/// Squared L2 regularizer
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\(r(W) = \frac12 \\|W\\|_F^2\\).
#[derive(Debug, Clone, Copy)]
pub struct L2Reg<L>
{
    ph_l: PhantomData<L>,
}

impl<L: LinAlg> L2Reg<L>
{
    pub fn new() -> Self
    {
        L2Reg {
            ph_l: PhantomData,
        }
    }
}

impl<L: LinAlg> Regularizer<L> for L2Reg<L>
{
    fn evaluate(&self, w: &Mat<L>) -> L::F
    {
        let f2 = L::F::one() + L::F::one();
        let norm = w.norm();

        norm * norm / f2
    }

    fn prox(&self, input: &Mat<L>, step: L::F, dual: &Mat<L>, out: &mut Mat<L>)
    {
        let f1 = L::F::one();

        map_shifted(input, dual, out, |u| u / (f1 + step));
    }
}

//

/// L1 regularizer
///
/// \\(r(W) = \\|W\\|_1\\), sum of absolute values of all elements.
#[derive(Debug, Clone, Copy)]
pub struct L1Reg<L>
{
    ph_l: PhantomData<L>,
}

impl<L: LinAlg> L1Reg<L>
{
    pub fn new() -> Self
    {
        L1Reg {
            ph_l: PhantomData,
        }
    }
}

impl<L: LinAlg> Regularizer<L> for L1Reg<L>
{
    fn evaluate(&self, w: &Mat<L>) -> L::F
    {
        w.as_slice().iter().fold(L::F::zero(), |acc, e| acc + e.abs())
    }

    fn prox(&self, input: &Mat<L>, step: L::F, dual: &Mat<L>, out: &mut Mat<L>)
    {
        map_shifted(input, dual, out, |u| u.signum() * (u.abs() - step).max(L::F::zero()));
    }
}

//

/// No regularization, \\(r(W) = 0\\).
#[derive(Debug, Clone, Copy)]
pub struct NoReg<L>
{
    ph_l: PhantomData<L>,
}

impl<L: LinAlg> NoReg<L>
{
    pub fn new() -> Self
    {
        NoReg {
            ph_l: PhantomData,
        }
    }
}

impl<L: LinAlg> Regularizer<L> for NoReg<L>
{
    fn evaluate(&self, _w: &Mat<L>) -> L::F
    {
        L::F::zero()
    }

    fn prox(&self, input: &Mat<L>, _step: L::F, dual: &Mat<L>, out: &mut Mat<L>)
    {
        map_shifted(input, dual, out, |u| u);
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

    #[test]
    fn test_prox_at_shifted_input()
    {
        let v = AMat::new(3, 1).iter_colmaj(&[2., -0.5, 1.]);
        let m = AMat::new(3, 1).iter_colmaj(&[0.5, 0.5, 1.]);
        let mut out = AMat::new(3, 1);

        // v - m = [1.5, -1, 0]
        L2Reg::new().prox(&v, 0.5, &m, &mut out);
        assert_float_eq!(out.as_slice(), [1., -2. / 3., 0.].as_ref(), abs_all <= 1e-12);

        L1Reg::new().prox(&v, 0.5, &m, &mut out);
        assert_float_eq!(out.as_slice(), [1., -0.5, 0.].as_ref(), abs_all <= 1e-12);

        NoReg::new().prox(&v, 0.5, &m, &mut out);
        assert_float_eq!(out.as_slice(), [1.5, -1., 0.].as_ref(), abs_all <= 0.);

        assert_float_eq!(L2Reg::<La>::new().evaluate(&v), 2.625, abs <= 1e-12);
        assert_float_eq!(L1Reg::<La>::new().evaluate(&v), 3.5, abs <= 1e-12);
        assert_float_eq!(NoReg::<La>::new().evaluate(&v), 0., abs <= 0.);
    }
}
