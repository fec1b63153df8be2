use core::marker::PhantomData;
use num_traits::{Float, Zero, One};
use rfadmm_core::solver::{Loss, LinAlg};
use rfadmm_core::Mat;

//

// elementwise map over (input, target) into out
fn map_elem<L, G>(input: &Mat<L>, y: &Mat<L>, out: &mut Mat<L>, g: G)
where L: LinAlg, G: Fn(L::F, L::F) -> L::F
{
    assert_eq!(input.size(), y.size());
    assert_eq!(input.size(), out.size());

    for ((v, t), o) in input.as_slice().iter().zip(y.as_slice()).zip(out.as_mut_slice()) {
        *o = g(*v, *t);
    }
}

fn sum_elem<L, G>(o: &Mat<L>, y: &Mat<L>, g: G) -> L::F
where L: LinAlg, G: Fn(L::F, L::F) -> L::F
{
    assert_eq!(o.size(), y.size());

    o.as_slice().iter().zip(y.as_slice())
        .fold(L::F::zero(), |acc, (v, t)| acc + g(*v, *t))
}

fn soft_threshold<F: Float>(u: F, t: F) -> F
{
    u.signum() * (u.abs() - t).max(F::zero())
}

//

/// Squared loss
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// \\(\ell(O, Y) = \frac12 \\|O - Y\\|_F^2\\), ridge regression with [`crate::L2Reg`].
#[derive(Debug, Clone, Copy)]
pub struct SquaredLoss<L>
{
    ph_l: PhantomData<L>,
}

impl<L: LinAlg> SquaredLoss<L>
{
    pub fn new() -> Self
    {
        SquaredLoss {
            ph_l: PhantomData,
        }
    }
}

impl<L: LinAlg> Loss<L> for SquaredLoss<L>
{
    fn evaluate(&self, o: &Mat<L>, y: &Mat<L>) -> L::F
    {
        let f2 = L::F::one() + L::F::one();

        sum_elem(o, y, |v, t| (v - t) * (v - t)) / f2
    }

    fn prox(&self, input: &Mat<L>, step: L::F, y: &Mat<L>, out: &mut Mat<L>)
    {
        let f1 = L::F::one();

        map_elem(input, y, out, |v, t| (v + step * t) / (f1 + step));
    }
}

//

/// Least absolute deviation loss
///
/// \\(\ell(O, Y) = \\|O - Y\\|_1\\).
#[derive(Debug, Clone, Copy)]
pub struct LadLoss<L>
{
    ph_l: PhantomData<L>,
}

impl<L: LinAlg> LadLoss<L>
{
    pub fn new() -> Self
    {
        LadLoss {
            ph_l: PhantomData,
        }
    }
}

impl<L: LinAlg> Loss<L> for LadLoss<L>
{
    fn evaluate(&self, o: &Mat<L>, y: &Mat<L>) -> L::F
    {
        sum_elem(o, y, |v, t| (v - t).abs())
    }

    fn prox(&self, input: &Mat<L>, step: L::F, y: &Mat<L>, out: &mut Mat<L>)
    {
        map_elem(input, y, out, |v, t| t + soft_threshold(v - t, step));
    }
}

//

/// Hinge loss
///
/// \\(\ell(O, Y) = \sum_{i,c} \max(0, 1 - Y_{ic} O_{ic})\\) with targets \\(Y_{ic} \in \\{-1, 1\\}\\).
#[derive(Debug, Clone, Copy)]
pub struct HingeLoss<L>
{
    ph_l: PhantomData<L>,
}

impl<L: LinAlg> HingeLoss<L>
{
    pub fn new() -> Self
    {
        HingeLoss {
            ph_l: PhantomData,
        }
    }
}

impl<L: LinAlg> Loss<L> for HingeLoss<L>
{
    fn evaluate(&self, o: &Mat<L>, y: &Mat<L>) -> L::F
    {
        let f1 = L::F::one();

        sum_elem(o, y, |v, t| (f1 - t * v).max(L::F::zero()))
    }

    fn prox(&self, input: &Mat<L>, step: L::F, y: &Mat<L>, out: &mut Mat<L>)
    {
        let f1 = L::F::one();

        // margin s = t * o, and o = t * s for t = +-1
        map_elem(input, y, out, |v, t| {
            let a = t * v;
            let s = if a >= f1 {
                a
            }
            else if a <= f1 - step {
                a + step
            }
            else {
                f1
            };
            t * s
        });
    }
}

//

/// Logistic loss
///
/// \\(\ell(O, Y) = \sum_{i,c} \log(1 + e^{-Y_{ic} O_{ic}})\\) with targets \\(Y_{ic} \in \\{-1, 1\\}\\).
/// Its proximal map has no closed form and is solved by safeguarded Newton iterations.
#[derive(Debug, Clone, Copy)]
pub struct LogisticLoss<L: LinAlg>
{
    ph_l: PhantomData<L>,
    max_newton: usize,
    eps: L::F,
}

impl<L: LinAlg> LogisticLoss<L>
{
    pub fn new() -> Self
    {
        let ten: L::F = num_traits::cast(10).unwrap();

        LogisticLoss {
            ph_l: PhantomData,
            max_newton: 50,
            eps: ten.powi(-12).max(L::F::epsilon()),
        }
    }

    fn softplus(u: L::F) -> L::F
    {
        if u > L::F::zero() {
            u + (-u).exp().ln_1p()
        }
        else {
            u.exp().ln_1p()
        }
    }

    fn sigmoid(u: L::F) -> L::F
    {
        let f1 = L::F::one();

        if u >= L::F::zero() {
            f1 / (f1 + (-u).exp())
        }
        else {
            let e = u.exp();
            e / (f1 + e)
        }
    }

    // root of g(o) = o - v - step * t * sigmoid(-t * o), increasing in o
    fn prox_elem(&self, v: L::F, step: L::F, t: L::F) -> L::F
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();
        let f2 = f1 + f1;

        let g = |o: L::F| o - v - step * t * Self::sigmoid(-t * o);

        let bound = v + step * t;
        let (mut lo, mut hi) = if bound >= v {(v, bound)} else {(bound, v)};
        let mut o = v;

        for _ in 0.. self.max_newton {
            let go = g(o);
            if go.abs() <= self.eps {
                break;
            }
            if go > f0 {
                hi = o;
            }
            else {
                lo = o;
            }

            let s = Self::sigmoid(-t * o);
            let dg = f1 + step * t * t * s * (f1 - s);
            let next = o - go / dg;

            o = if next > lo && next < hi {next} else {(lo + hi) / f2};
        }

        o
    }
}

impl<L: LinAlg> Loss<L> for LogisticLoss<L>
{
    fn evaluate(&self, o: &Mat<L>, y: &Mat<L>) -> L::F
    {
        sum_elem(o, y, |v, t| Self::softplus(-t * v))
    }

    fn prox(&self, input: &Mat<L>, step: L::F, y: &Mat<L>, out: &mut Mat<L>)
    {
        map_elem(input, y, out, |v, t| self.prox_elem(v, step, t));
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

    fn col(v: &[f64]) -> AMat
    {
        AMat::new(v.len(), 1).iter_colmaj(v)
    }

    #[test]
    fn test_squared()
    {
        let l = SquaredLoss::<La>::new();
        let o = col(&[1., 2.]);
        let y = col(&[0., 4.]);
        assert_float_eq!(l.evaluate(&o, &y), 2.5, abs <= 1e-12);

        let mut out = col(&[0., 0.]);
        l.prox(&o, 1., &y, &mut out);
        assert_float_eq!(out.as_slice(), [0.5, 3.].as_ref(), abs_all <= 1e-12);
    }

    #[test]
    fn test_lad_hinge()
    {
        let o = col(&[3., 0.5, -1.]);
        let y = col(&[1., 1., -1.]);
        let mut out = col(&[0., 0., 0.]);

        let lad = LadLoss::<La>::new();
        assert_float_eq!(lad.evaluate(&o, &y), 2.5, abs <= 1e-12);
        lad.prox(&o, 1., &y, &mut out);
        assert_float_eq!(out.as_slice(), [2., 1., -1.].as_ref(), abs_all <= 1e-12);

        let hinge = HingeLoss::<La>::new();
        assert_float_eq!(hinge.evaluate(&o, &y), 0.5, abs <= 1e-12);
        hinge.prox(&col(&[3., 0.5, 0.]), 1., &y, &mut out);
        // margins 3 (kept), 0.5 (clipped to 1), 0 (shifted by the step)
        assert_float_eq!(out.as_slice(), [3., 1., -1.].as_ref(), abs_all <= 1e-12);
        hinge.prox(&col(&[-2., 0.5, 0.]), 0.25, &y, &mut out);
        assert_float_eq!(out.as_slice(), [-1.75, 0.75, -0.25].as_ref(), abs_all <= 1e-12);
    }

    #[test]
    fn test_logistic()
    {
        let l = LogisticLoss::<La>::new();
        let y = col(&[1., -1., 1.]);
        let v = col(&[0., 2., -30.]);

        assert_float_eq!(l.evaluate(&col(&[0.]), &col(&[1.])), 2_f64.ln(), abs <= 1e-12);
        assert!(l.evaluate(&v, &y).is_finite());

        let step = 0.7;
        let mut out = col(&[0., 0., 0.]);
        l.prox(&v, step, &y, &mut out);

        // optimality: o - v = step * t * sigmoid(-t * o)
        for i in 0.. 3 {
            let (o, v, t) = (out[(i, 0)], v[(i, 0)], y[(i, 0)]);
            let s = 1. / (1. + (t * o).exp());
            assert_float_eq!(o - v, step * t * s, abs <= 1e-9);
        }
    }
}
