//! Process group communication

use crate::solver::{LinAlg, SolverError};

/// Communicator trait
///
/// A group of `size` processes identified by ranks `0.. size`.
/// Every collective shall be called by all processes of the group in the same order;
/// a process that skips one stalls the others.
pub trait Comm<L: LinAlg>
{
    /// Rank of this process.
    fn rank(&self) -> usize;

    /// Number of processes.
    fn size(&self) -> usize;

    /// Copies `buf` of `root` into `buf` of every process.
    ///
    /// Returns `Ok`, or `Err` if the collective could not complete.
    fn broadcast(&self, buf: &mut[L::F], root: usize) -> Result<(), SolverError>;

    /// Sums `send` of every process into `recv` of `root`.
    ///
    /// Returns `Ok`, or `Err` if the collective could not complete.
    /// `recv` of other processes is left untouched.
    /// `send` and `recv` shall have the same length.
    fn reduce_sum(&self, send: &[L::F], recv: &mut[L::F], root: usize) -> Result<(), SolverError>;

    /// Waits until every process reaches this point.
    fn barrier(&self) -> Result<(), SolverError>;
}

//

/// Group of a single process.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleComm;

impl<L: LinAlg> Comm<L> for SingleComm
{
    fn rank(&self) -> usize
    {
        0
    }

    fn size(&self) -> usize
    {
        1
    }

    fn broadcast(&self, _buf: &mut[L::F], root: usize) -> Result<(), SolverError>
    {
        if root != 0 {
            log::error!("Invalid root {} of SingleComm", root);
            return Err(SolverError::CommFailure);
        }
        Ok(())
    }

    fn reduce_sum(&self, send: &[L::F], recv: &mut[L::F], root: usize) -> Result<(), SolverError>
    {
        if root != 0 {
            log::error!("Invalid root {} of SingleComm", root);
            return Err(SolverError::CommFailure);
        }
        L::copy(send, recv);
        Ok(())
    }

    fn barrier(&self) -> Result<(), SolverError>
    {
        Ok(())
    }
}
