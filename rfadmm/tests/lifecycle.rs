use float_eq::assert_float_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use rfadmm::prelude::*;
use rfadmm::*;

type La = FloatGeneric<f64>;
type AMat = Mat<La>;

//

fn synthetic(n: usize, d: usize, seed: u64) -> (AMat, AMat)
{
    let mut rng = StdRng::seed_from_u64(seed);
    let normal = Normal::new(0., 1.).unwrap();

    let x = AMat::new(n, d).by_fn(|_, _| normal.sample(&mut rng));
    let y = AMat::new(n, 1).by_fn(|r, _| x[(r, 0)] - 0.5 * x[(r, d - 1)]);

    (x, y)
}

//

#[test]
fn test_cache_reuse_and_reset()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (x1, y1) = synthetic(30, 3, 1);
    let (x2, y2) = synthetic(30, 3, 2);
    let (x1, x2) = (InputMat::from(x1), InputMat::from(x2));

    let map = RandomFourier::new(3, 12, Kernel::Gaussian { sigma: 1. }, 4).unwrap();
    let mut s = Solver::<La, _, _, _>::new(SquaredLoss::new(), L2Reg::new(), map)
        .par(|p| {
            p.max_iter = 40;
            p.num_feature_partitions = 3;
        });
    assert_eq!(s.cache().key(), None);

    let mut w_a = AMat::new(12, 1);
    s.train(&SingleComm, &x1, &y1, &mut w_a).unwrap();
    let key1 = s.cache().key();
    assert_eq!(key1, Some(x1.fingerprint()));
    for j in 0.. 3 {
        assert!(s.cache().is_built(j));
    }

    // same input: entries kept, same weights
    let mut w_b = AMat::new(12, 1);
    s.train(&SingleComm, &x1, &y1, &mut w_b).unwrap();
    assert_eq!(s.cache().key(), key1);
    assert_float_eq!(w_a.as_slice(), w_b.as_slice(), abs_all <= 0.);

    // different input: entries rebuilt for it
    let mut w_c = AMat::new(12, 1);
    s.train(&SingleComm, &x2, &y2, &mut w_c).unwrap();
    assert_eq!(s.cache().key(), Some(x2.fingerprint()));
    assert!(s.cache().key() != key1);

    let mut fresh = Solver::<La, _, _, _>::new(SquaredLoss::new(), L2Reg::new(), s.map().clone())
        .par(|p| {
            p.max_iter = 40;
            p.num_feature_partitions = 3;
        });
    let mut w_d = AMat::new(12, 1);
    fresh.train(&SingleComm, &x2, &y2, &mut w_d).unwrap();
    assert_float_eq!(w_c.as_slice(), w_d.as_slice(), abs_all <= 0.);

    // other blocks
    s.par.num_feature_partitions = 4;
    s.train(&SingleComm, &x2, &y2, &mut w_d).unwrap();
    assert_eq!(s.cache().parts().len(), 4);
}

#[test]
fn test_precondition_errors()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let (x, y) = synthetic(10, 2, 3);
    let x = InputMat::from(x);

    let solver = || Solver::<La, _, _, _>::new(SquaredLoss::new(), L2Reg::new(), LinearMap::new(2));

    let mut w = AMat::new(3, 1);
    assert_eq!(solver().train(&SingleComm, &x, &y, &mut w).err(), Some(SolverError::SizeMismatch));

    let mut w = AMat::new(2, 1);
    assert_eq!(solver().train(&SingleComm, &x, &y.rows(0.. 9), &mut w).err(), Some(SolverError::SizeMismatch));

    let mut s = solver().par(|p| p.num_feature_partitions = 3);
    assert_eq!(s.train(&SingleComm, &x, &y, &mut w).err(), Some(SolverError::InvalidParam));

    let mut s = solver().par(|p| p.rho = -1.);
    assert_eq!(s.train(&SingleComm, &x, &y, &mut w).err(), Some(SolverError::InvalidParam));

    let mut s = solver().par(|p| p.root = 1);
    assert_eq!(s.train(&SingleComm, &x, &y, &mut w).err(), Some(SolverError::InvalidParam));

    let mut s = solver();
    assert!(s.train(&SingleComm, &x, &y, &mut w).is_ok());
}

#[test]
fn test_early_stop()
{
    let _ = env_logger::builder().is_test(true).try_init();

    let n = 40;
    let (x, y) = synthetic(n, 4, 5);
    let x = InputMat::from(x);

    let run = |early_stop: bool| {
        run_group::<La, _, _>(2, |comm| {
            let rows = local_rows(n, comm.size(), comm.rank());
            let mut w = AMat::new(4, 1);
            let mut s = Solver::<La, _, _, _>::new(SquaredLoss::new(), L2Reg::new(), LinearMap::new(4))
                .par(|p| {
                    p.lambda = 0.5;
                    p.max_iter = 1000;
                    p.num_feature_partitions = 2;
                    p.tol = 1e-8;
                    p.early_stop = early_stop;
                    p.root = 1;
                });
            let report = s.train(&comm, &x.row_slice(rows.clone()), &y.rows(rows), &mut w).unwrap();
            (w, report)
        })
    };

    let full = run(false);
    let stopped = run(true);

    let (w_full, r_full) = &full[1];
    assert!(!r_full.stopped_early);
    assert_eq!(r_full.iterations, 1000);

    let (w_stop, r_stop) = &stopped[1];
    assert!(r_stop.stopped_early);
    assert!(r_stop.iterations < 1000);
    assert_eq!(r_stop.loss_history.len(), r_stop.iterations + 1);
    assert_eq!(stopped[0].1.iterations, r_stop.iterations);
    assert!(stopped[0].1.loss_history.is_empty());
    assert_float_eq!(stopped[0].0.as_slice(), w_stop.as_slice(), abs_all <= 0.);

    assert_float_eq!(w_stop.as_slice(), w_full.as_slice(), abs_all <= 1e-4);
}

#[test]
fn test_dense_float()
{
    let _ = env_logger::builder().is_test(true).try_init();

    type LaF = FloatGeneric<f32>;

    let x = InputMat::from(Mat::<LaF>::new(3, 1).iter_colmaj(&[1., 2., 3.]));
    let y = Mat::<LaF>::new(3, 1).iter_colmaj(&[2., 4., 6.]);
    let mut w = Mat::<LaF>::new(1, 1);

    let mut s = Solver::<LaF, _, _, _>::new(SquaredLoss::new(), L2Reg::new(), LinearMap::new(1))
        .par(|p| {
            p.max_iter = 300;
        });
    s.train(&SingleComm, &x, &y, &mut w).unwrap();

    assert_float_eq!(w[(0, 0)], 28. / 15., abs <= 1e-4);
}
