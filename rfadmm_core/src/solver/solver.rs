//! Consensus ADMM training over feature blocks

use num_traits::{Float, Zero, One};
use core::ops::Range;
use rayon::prelude::*;
use crate::solver::{LinAlg, SolverError, Loss, Regularizer, FeatureMap, Comm};
use crate::{LinAlgEx, Mat, InputMat, FeatureParts, BlockCache};

//

/// Solver parameters.
///
/// Every process of a group shall use the same parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverParam<F: Float>
{
    /// Regularization weight \\(\lambda\\).
    pub lambda: F,
    /// ADMM penalty \\(\rho\\).
    pub rho: F,
    /// Max iteration number.
    pub max_iter: usize,
    /// Tolerance of the relative loss change, used only if `early_stop` is `true`.
    pub tol: F,
    /// Stops before `max_iter` once the loss change falls within `tol`.
    pub early_stop: bool,
    /// Number of feature blocks.
    pub num_feature_partitions: usize,
    /// Number of worker threads processing feature blocks.
    pub num_threads: usize,
    /// Period of iterations to output progress log(for debug/trace level).
    pub log_period: usize,
    /// Rank of the coordinating process.
    pub root: usize,
}

impl<F: Float> Default for SolverParam<F>
{
    fn default() -> Self
    {
        let ten = F::from(10).unwrap();

        SolverParam {
            lambda: F::one(),
            rho: F::one(),
            max_iter: 1000,
            tol: ten.powi(-1),
            early_stop: false,
            num_feature_partitions: 1,
            num_threads: 1,
            log_period: 10,
            root: 0,
        }
    }
}

impl<F: Float> SolverParam<F>
{
    /// Checks the parameters.
    ///
    /// Returns `Ok`, or `Err` with [`SolverError::InvalidParam`].
    pub fn validate(&self) -> Result<(), SolverError>
    {
        if !(self.rho > F::zero()) {
            log::error!("rho must be positive");
            return Err(SolverError::InvalidParam);
        }
        if !(self.lambda >= F::zero()) {
            log::error!("lambda must be non-negative");
            return Err(SolverError::InvalidParam);
        }
        if self.max_iter == 0 {
            log::error!("max_iter must be positive");
            return Err(SolverError::InvalidParam);
        }
        if self.num_feature_partitions == 0 {
            log::error!("num_feature_partitions must be positive");
            return Err(SolverError::InvalidParam);
        }
        if self.num_threads == 0 {
            log::error!("num_threads must be positive");
            return Err(SolverError::InvalidParam);
        }
        Ok(())
    }
}

//

/// Result of [`Solver::train`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrainReport<F>
{
    /// Number of completed rounds.
    pub iterations: usize,
    /// Total loss over all processes, one entry per round plus the last one.
    /// Empty except on the coordinating process.
    pub loss_history: Vec<F>,
    /// Regularized objective \\(\ell + \lambda r(\bar W)\\) paired with each entry of `loss_history`,
    /// \\(\bar W\\) being the consensus weights the loss is evaluated at.
    pub objective_history: Vec<F>,
    /// `true` if stopped by the tolerance before `max_iter`.
    pub stopped_early: bool,
}

//

// Wbar stays zero through round 2, so the first three reported losses are equal.
const WARMUP_ROUNDS: usize = 3;

fn cast<F: Float>(v: usize) -> F
{
    F::from(v).unwrap_or_else(F::infinity)
}

/// Calculates \\(R = O - \sum_j O_j\\), summing in block order.
fn block_residual<L: LinAlg>(o: &Mat<L>, outs: &[Mat<L>], r: &mut Mat<L>)
{
    r.fill_zero();
    for o_j in outs {
        r.add(L::F::one(), o_j);
    }
    r.set_scale(-L::F::one());
    r.add(L::F::one(), o);
}

//

enum Role<L: LinAlg>
{
    Coordinator {
        w: Mat<L>,
        mu: Mat<L>,
    },
    Worker,
}

struct BlockState<L: LinAlg>
{
    range: Range<usize>,
    z: Mat<L>,
    wi: Mat<L>,
    mu: Mat<L>,
    zt_obar: Mat<L>,
}

impl<L: LinAlgEx> BlockState<L>
{
    fn new(range: Range<usize>, n: usize, k: usize) -> Self
    {
        let sj = range.len();

        BlockState {
            range,
            z: Mat::new(n, sj),
            wi: Mat::new(sj, k),
            mu: Mat::new(sj, k),
            zt_obar: Mat::new(sj, k),
        }
    }

    // local regression of this block, returns its prediction into o_j
    fn regress<M>(&mut self, j: usize, map: &M, cache: &BlockCache<L>,
        x: &InputMat<L>, wbar: &Mat<L>, nu: &Mat<L>, o_j: &mut Mat<L>) -> Result<(), SolverError>
    where M: FeatureMap<L>
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();
        let (n, k) = nu.size();
        let sj = self.range.len();

        map.map(x, self.range.clone(), &mut self.z);

        let mut rhs = wbar.rows(self.range.clone());
        rhs.add(-f1, &self.mu);
        rhs.add(f1, &self.zt_obar);
        if sj > 0 && k > 0 {
            L::gemm(true, false, sj, k, n, f1, self.z.as_slice(), nu.as_slice(), f1, rhs.as_mut_slice());
        }

        cache.apply(j, &rhs, &mut self.wi)?;

        o_j.fill_zero();
        if n > 0 && k > 0 {
            L::gemm(false, false, n, k, sj, f1, self.z.as_slice(), self.wi.as_slice(), f0, o_j.as_mut_slice());
        }

        self.mu.add(f1, &self.wi);

        self.zt_obar.fill_zero();
        if sj > 0 && k > 0 {
            L::gemm(true, false, sj, k, n, f1, self.z.as_slice(), o_j.as_slice(), f0, self.zt_obar.as_mut_slice());
        }

        Ok(())
    }

    // folds the residual into zt_obar, returns the consensus prediction into o_j
    fn correct(&mut self, r: &Mat<L>, scale: L::F, wbar: &Mat<L>, o_j: &mut Mat<L>)
    {
        let f0 = L::F::zero();
        let f1 = L::F::one();
        let (n, k) = r.size();
        let sj = self.range.len();

        if sj > 0 && k > 0 {
            L::gemm(true, false, sj, k, n, scale, self.z.as_slice(), r.as_slice(), f1, self.zt_obar.as_mut_slice());
        }

        o_j.fill_zero();
        if n > 0 && k > 0 {
            let wbar_j = wbar.rows(self.range.clone());
            L::gemm(false, false, n, k, sj, f1, self.z.as_slice(), wbar_j.as_slice(), f0, o_j.as_mut_slice());
        }
    }
}

//

/// Consensus ADMM solver
///
/// <script src="https://polyfill.io/v3/polyfill.min.js?features=es6"></script>
/// <script id="MathJax-script" async src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js"></script>
///
/// Trains a linear model over mapped features, solving
/// \\[
/// \begin{array}{ll}
/// {\rm minimize} & \ell(Z W, Y) + \lambda\, r(W)
/// \end{array}
/// \\]
/// where
/// * variables \\( W \in \mathbb{R}^{D \times k} \\)
/// * \\( Z = z(X) \\) is the feature map applied to the input rows,
///   which are distributed over the processes of a [`Comm`] group.
///
/// The weights are split both by processes (data parallel) and by feature blocks (model parallel).
/// Each block keeps a cached inverse of its regularized Gram matrix in a [`BlockCache`],
/// which survives between [`Solver::train`] calls on the same input.
pub struct Solver<L, LO, R, M>
where L: LinAlgEx, LO: Loss<L>, R: Regularizer<L>, M: FeatureMap<L>
{
    /// solver parameters.
    pub par: SolverParam<L::F>,

    loss: LO,
    reg: R,
    map: M,
    cache: BlockCache<L>,
}

impl<L, LO, R, M> Solver<L, LO, R, M>
where L: LinAlgEx, LO: Loss<L>, R: Regularizer<L>, M: FeatureMap<L>
{
    /// Creates an instance.
    ///
    /// Returns [`Solver`] instance.
    /// * `loss` is \\(\ell\\).
    /// * `reg` is \\(r\\).
    /// * `map` is \\(z\\).
    pub fn new(loss: LO, reg: R, map: M) -> Self
    {
        let par = SolverParam::default();
        let cache = BlockCache::new(FeatureParts::new(map.output_dim(), par.num_feature_partitions));

        Solver {
            par, loss, reg, map, cache,
        }
    }

    /// Changes solver parameters.
    ///
    /// Returns [`Solver`] with its parameters changed.
    /// * `f` is a function to change parameters given by its argument.
    pub fn par<P>(mut self, f: P) -> Self
    where P: FnOnce(&mut SolverParam<L::F>)
    {
        f(&mut self.par);
        self
    }

    /// Feature map \\(z\\).
    pub fn map(&self) -> &M
    {
        &self.map
    }

    /// Block cache of the last trained input.
    pub fn cache(&self) -> &BlockCache<L>
    {
        &self.cache
    }

    /// Starts to train.
    ///
    /// Returns `Ok` with [`TrainReport`], or `Err` with [`SolverError`] type.
    /// Every process of `comm` shall call this with its own rows.
    /// * `comm` is the process group.
    /// * `x` is local input rows \\(X\\).
    /// * `y` is local target rows \\(Y\\).
    /// * `w` is overwritten with the consensus weights \\(W\\), the same on every process.
    ///   It shall be \\(D\\) by \\(k\\).
    pub fn train<C>(&mut self, comm: &C, x: &InputMat<L>, y: &Mat<L>, w: &mut Mat<L>)
    -> Result<TrainReport<L::F>, SolverError>
    where C: Comm<L>
    {
        self.par.validate()?;

        let dim_d = self.map.output_dim();
        let (n, d) = x.size();
        let k = y.n_col();
        let np = self.par.num_feature_partitions;

        if np > dim_d {
            log::error!("num_feature_partitions {} must be <= {}", np, dim_d);
            return Err(SolverError::InvalidParam);
        }
        if self.par.root >= comm.size() {
            log::error!("root {} must be < {}", self.par.root, comm.size());
            return Err(SolverError::InvalidParam);
        }
        if d != self.map.input_dim() || y.n_row() != n || w.size() != (dim_d, k) {
            log::error!("Size mismatch: x{:?}, y{:?}, w{:?}, map ({}, {})",
                x.size(), y.size(), w.size(), self.map.input_dim(), dim_d);
            return Err(SolverError::SizeMismatch);
        }

        log::debug!("{:?}", self.par);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.par.num_threads)
            .build()
            .map_err(|e| {
                log::error!("{}", e);
                SolverError::ThreadPool
            })?;

        let core = SolverCore {
            par: &self.par,
            loss: &self.loss,
            reg: &self.reg,
            map: &self.map,
            pool,
        };

        core.train(&mut self.cache, comm, x, y, w)
    }
}

//

/// Calculates \\(Z W\\) block by block.
///
/// Returns the `n` by `k` predictions.
/// * `map` is \\(z\\).
/// * `parts` is the feature blocks; any partition of \\(D\\) gives the same result up to rounding.
/// * `x` is input rows \\(X\\).
/// * `w` is \\(W\\), \\(D\\) by \\(k\\).
pub fn predict<L, M>(map: &M, parts: &FeatureParts, x: &InputMat<L>, w: &Mat<L>) -> Mat<L>
where L: LinAlgEx, M: FeatureMap<L> + ?Sized
{
    let f1 = L::F::one();
    let (n, _) = x.size();
    let k = w.n_col();

    assert_eq!(parts.total(), w.n_row());
    assert_eq!(map.output_dim(), w.n_row());

    let mut o = Mat::new(n, k);
    for range in parts.ranges() {
        let sj = range.len();
        if n == 0 || sj == 0 || k == 0 {
            continue;
        }

        let mut z = Mat::new(n, sj);
        map.map(x, range.clone(), &mut z);
        let w_j = w.rows(range.clone());
        L::gemm(false, false, n, k, sj, f1, z.as_slice(), w_j.as_slice(), f1, o.as_mut_slice());
    }
    o
}

//

struct SolverCore<'a, L, LO, R, M>
where L: LinAlgEx, LO: Loss<L>, R: Regularizer<L>, M: FeatureMap<L>
{
    par: &'a SolverParam<L::F>,
    loss: &'a LO,
    reg: &'a R,
    map: &'a M,
    pool: rayon::ThreadPool,
}

impl<'a, L, LO, R, M> SolverCore<'a, L, LO, R, M>
where L: LinAlgEx, LO: Loss<L>, R: Regularizer<L>, M: FeatureMap<L>
{
    fn train<C>(&self, cache: &mut BlockCache<L>, comm: &C, x: &InputMat<L>, y: &Mat<L>, w: &mut Mat<L>)
    -> Result<TrainReport<L::F>, SolverError>
    where C: Comm<L>
    {
        log::info!("----- Initializing");

        let f0 = L::F::zero();
        let f1 = L::F::one();
        let par = self.par;
        let root = par.root;
        let dim_d = w.n_row();
        let (n, _) = x.size();
        let k = y.n_col();
        let np = par.num_feature_partitions;

        // Build block cache
        cache.layout(FeatureParts::new(dim_d, np));
        if cache.bind(x.fingerprint()) {
            log::debug!("reuse block cache");
        }
        {
            let cache = &*cache;
            let map = self.map;
            self.pool.install(|| {
                (0.. np).into_par_iter().try_for_each(|j| cache.build(j, map, x))
            })?;
        }

        // Initialize variables
        let mut role = if comm.rank() == root {
            Role::Coordinator {
                w: Mat::new(dim_d, k),
                mu: Mat::new(dim_d, k),
            }
        }
        else {
            Role::Worker
        };

        let mut blocks: Vec<BlockState<L>> = cache.parts().ranges().iter()
            .map(|range| BlockState::new(range.clone(), n, k))
            .collect();
        let mut outs = vec![Mat::<L>::new(n, k); np];

        let mut wbar = Mat::<L>::new(dim_d, k);
        let mut wi = Mat::<L>::new(dim_d, k);
        let mut o = Mat::<L>::new(n, k);
        let mut obar = Mat::<L>::new(n, k);
        let mut nu = Mat::<L>::new(n, k);
        let mut r = Mat::<L>::new(n, k);
        let mut pred = Mat::<L>::new(n, k);

        let inv_np1 = f1 / cast::<L::F>(np + 1);
        let inv_p1 = f1 / cast::<L::F>(comm.size() + 1);
        let step_loss = f1 / par.rho;
        let step_reg = par.lambda / par.rho;

        let mut local_loss = [self.loss.evaluate(&pred, y)];
        let mut total_loss = [f0];
        let mut loss_history = Vec::new();
        let mut objective_history = Vec::new();
        let mut stopped_early = false;

        // lambda r(Wbar) at the Wbar which the next reduced loss is evaluated with
        let mut reg_value = par.lambda * self.reg.evaluate(&wbar);

        log::info!("----- Started");
        let mut iter = 0;
        while iter < par.max_iter {
            let log_trig = if par.log_period > 0 {
                iter % par.log_period == 0
            }
            else {
                if iter == 0 && log::log_enabled!(log::Level::Debug) {
                    log::warn!("log_period == 0: no periodic log");
                }
                false
            };

            // Loss aggregation
            comm.reduce_sum(&local_loss, &mut total_loss, root)?;
            if let Role::Coordinator {..} = role {
                let objective = total_loss[0] + reg_value;
                if log_trig || iter + 1 == par.max_iter {
                    log::debug!("{}: loss {:.3e} objective {:.3e}", iter, total_loss[0], objective);
                }
                else {
                    log::trace!("{}: loss {:.3e} objective {:.3e}", iter, total_loss[0], objective);
                }
                loss_history.push(total_loss[0]);
                objective_history.push(objective);
            }

            if par.early_stop {
                let mut flag = [f0];
                if let Role::Coordinator {..} = role {
                    if self.converged(&loss_history) {
                        flag[0] = f1;
                    }
                }
                comm.broadcast(&mut flag, root)?;
                if flag[0] > f0 {
                    stopped_early = true;
                    break;
                }
            }

            // Broadcast consensus weights
            comm.broadcast(wbar.as_mut_slice(), root)?;
            if let Role::Coordinator {..} = role {
                reg_value = par.lambda * self.reg.evaluate(&wbar);
            }

            // Local dual residuals
            for b in blocks.iter_mut() {
                b.mu.add(-f1, &wbar.rows(b.range.clone()));
            }
            obar.add(-f1, &nu);

            // Output proximal step
            self.loss.prox(&obar, step_loss, y, &mut o);

            // Weight proximal step
            if let Role::Coordinator {w: ref mut w_c, ref mu} = role {
                self.reg.prox(&wbar, step_reg, mu, w_c);
            }

            // Per-block local regression
            self.regress_blocks(cache, &mut blocks, &mut outs, x, &wbar, &nu)?;

            // Cross-block correction
            block_residual(&o, &outs, &mut r);
            self.correct_blocks(&mut blocks, &mut outs, &r, &wbar);
            pred.fill_zero();
            for o_j in outs.iter() {
                pred.add(f1, o_j);
            }
            local_loss[0] = self.loss.evaluate(&pred, y);

            // Output consensus
            obar.copy_from(&o);
            obar.add(-inv_np1, &r);
            nu.add(f1, &o);
            nu.add(-f1, &obar);

            // Weight consensus
            for b in blocks.iter() {
                wi.set_rows(b.range.start, &b.wi);
            }
            comm.reduce_sum(wi.as_slice(), wbar.as_mut_slice(), root)?;
            if let Role::Coordinator {w: ref w_c, ref mut mu} = role {
                wbar.add(f1, w_c);
                wbar.set_scale(inv_p1);
                mu.add(f1, w_c);
                mu.add(-f1, &wbar);
            }

            comm.barrier()?;

            iter += 1;
        } // end of loop

        if !stopped_early {
            comm.reduce_sum(&local_loss, &mut total_loss, root)?;
            if let Role::Coordinator {..} = role {
                let objective = total_loss[0] + reg_value;
                log::debug!("{}: loss {:.3e} objective {:.3e}", iter, total_loss[0], objective);
                loss_history.push(total_loss[0]);
                objective_history.push(objective);
            }
        }
        comm.broadcast(wbar.as_mut_slice(), root)?;
        w.copy_from(&wbar);

        if !wbar.is_finite() {
            log::warn!("non-finite weights");
        }

        if stopped_early {
            log::warn!("----- Stopped at {}", iter);
        }
        else {
            log::info!("----- Finished");
        }

        Ok(TrainReport {
            iterations: iter,
            loss_history,
            objective_history,
            stopped_early,
        })
    }

    fn regress_blocks(&self, cache: &BlockCache<L>, blocks: &mut [BlockState<L>], outs: &mut [Mat<L>],
        x: &InputMat<L>, wbar: &Mat<L>, nu: &Mat<L>) -> Result<(), SolverError>
    {
        let map = self.map;

        self.pool.install(|| {
            blocks.par_iter_mut().zip(outs.par_iter_mut()).enumerate()
                .try_for_each(|(j, (b, o_j))| b.regress(j, map, cache, x, wbar, nu, o_j))
        })
    }

    fn correct_blocks(&self, blocks: &mut [BlockState<L>], outs: &mut [Mat<L>], r: &Mat<L>, wbar: &Mat<L>)
    {
        let scale = L::F::one() / cast::<L::F>(blocks.len() + 1);

        self.pool.install(|| {
            blocks.par_iter_mut().zip(outs.par_iter_mut())
                .for_each(|(b, o_j)| b.correct(r, scale, wbar, o_j))
        });
    }

    fn converged(&self, loss_history: &[L::F]) -> bool
    {
        let len = loss_history.len();
        if len <= WARMUP_ROUNDS {
            return false;
        }

        let prev = loss_history[len - 2];
        let cur = loss_history[len - 1];

        (prev - cur).abs() <= self.par.tol * prev.abs().max(L::F::one())
    }
}

//
