use core::ops::Range;
use num_traits::{Zero, One};
use crossbeam_channel::{unbounded, Receiver, Sender};
use rfadmm_core::solver::{Comm, LinAlg, SolverError};
use rfadmm_core::split_range;

/// Rows owned by `rank` out of `n` samples split over `size` processes.
///
/// The split is the same balanced one used for feature blocks.
pub fn local_rows(n: usize, size: usize, rank: usize) -> Range<usize>
{
    split_range(n, size, rank)
}

//

/// Communicator of a rank in a group of threads
///
/// Each ordered pair of ranks has its own channel, so messages of successive collectives never interleave.
/// Reductions are summed in rank order, giving the same result as a sequential sum.
/// When a rank drops out, collectives of the others fail with [`SolverError::CommFailure`] instead of blocking forever.
pub struct ThreadComm<L: LinAlg>
{
    rank: usize,
    tx: Vec<Sender<Vec<L::F>>>,
    rx: Vec<Receiver<Vec<L::F>>>,
}

impl<L: LinAlg> ThreadComm<L>
{
    /// Creates communicators of all ranks of a group.
    ///
    /// Returns `size` instances, the `i`-th one for rank `i`.
    pub fn group(size: usize) -> Vec<Self>
    {
        // chan[src][dst]
        let mut tx_all: Vec<Vec<Sender<Vec<L::F>>>> = (0.. size).map(|_| Vec::with_capacity(size)).collect();
        let mut rx_all: Vec<Vec<Receiver<Vec<L::F>>>> = (0.. size).map(|_| Vec::with_capacity(size)).collect();

        for src in 0.. size {
            for dst in 0.. size {
                let (tx, rx) = unbounded();
                tx_all[src].push(tx);
                rx_all[dst].push(rx);
            }
        }

        tx_all.into_iter().zip(rx_all).enumerate()
            .map(|(rank, (tx, rx))| ThreadComm {rank, tx, rx})
            .collect()
    }

    fn send(&self, dst: usize, buf: &[L::F]) -> Result<(), SolverError>
    {
        self.tx[dst].send(buf.to_vec()).map_err(|_| {
            log::error!("rank {}: rank {} disconnected", self.rank, dst);
            SolverError::CommFailure
        })
    }

    fn recv(&self, src: usize, len: usize) -> Result<Vec<L::F>, SolverError>
    {
        let msg = self.rx[src].recv().map_err(|_| {
            log::error!("rank {}: rank {} disconnected", self.rank, src);
            SolverError::CommFailure
        })?;

        if msg.len() != len {
            log::error!("rank {}: message length {} from rank {} must be {}", self.rank, msg.len(), src, len);
            return Err(SolverError::CommFailure);
        }
        Ok(msg)
    }

    fn check_root(&self, root: usize) -> Result<(), SolverError>
    {
        if root >= self.tx.len() {
            log::error!("rank {}: invalid root {}", self.rank, root);
            return Err(SolverError::CommFailure);
        }
        Ok(())
    }
}

impl<L: LinAlg> Comm<L> for ThreadComm<L>
{
    fn rank(&self) -> usize
    {
        self.rank
    }

    fn size(&self) -> usize
    {
        self.tx.len()
    }

    fn broadcast(&self, buf: &mut[L::F], root: usize) -> Result<(), SolverError>
    {
        self.check_root(root)?;

        if self.rank == root {
            for dst in (0.. self.size()).filter(|&r| r != root) {
                self.send(dst, buf)?;
            }
        }
        else {
            let msg = self.recv(root, buf.len())?;
            L::copy(&msg, buf);
        }
        Ok(())
    }

    fn reduce_sum(&self, send: &[L::F], recv: &mut[L::F], root: usize) -> Result<(), SolverError>
    {
        self.check_root(root)?;
        assert_eq!(send.len(), recv.len());

        if self.rank == root {
            let mut acc = vec![L::F::zero(); send.len()];
            for src in 0.. self.size() {
                if src == root {
                    L::add(L::F::one(), send, &mut acc);
                }
                else {
                    let msg = self.recv(src, send.len())?;
                    L::add(L::F::one(), &msg, &mut acc);
                }
            }
            L::copy(&acc, recv);
        }
        else {
            self.send(root, send)?;
        }
        Ok(())
    }

    fn barrier(&self) -> Result<(), SolverError>
    {
        // gather to rank 0, then release
        if self.rank == 0 {
            for src in 1.. self.size() {
                self.recv(src, 0)?;
            }
            for dst in 1.. self.size() {
                self.send(dst, &[])?;
            }
        }
        else {
            self.send(0, &[])?;
            self.recv(0, 0)?;
        }
        Ok(())
    }
}

//

/// Runs `f` on a group of `size` ranks, one scoped thread per rank.
///
/// Returns the results in rank order. A panic of any rank is propagated.
pub fn run_group<L, T, G>(size: usize, f: G) -> Vec<T>
where L: LinAlg, T: Send, G: Fn(ThreadComm<L>) -> T + Sync
{
    let f = &f;

    std::thread::scope(|s| {
        let handles: Vec<_> = ThreadComm::<L>::group(size).into_iter()
            .map(|comm| s.spawn(move || f(comm)))
            .collect();

        handles.into_iter()
            .map(|h| h.join().unwrap_or_else(|e| std::panic::resume_unwind(e)))
            .collect()
    })
}

//
