/// Solver errors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SolverError
{
    /// Invalid [`crate::solver::SolverParam`].
    InvalidParam,
    /// Dimension mismatch among the input, the targets, the feature map and the weights.
    SizeMismatch,
    /// Failure to invert the regularized Gram matrix of a feature block.
    SingularGram,
    /// Block cache entry used before being built.
    CacheMissing,
    /// Failure caused by [`crate::solver::Comm`].
    CommFailure,
    /// Failure to create the worker thread pool.
    ThreadPool,
}

impl core::fmt::Display for SolverError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", match &self {
            SolverError::InvalidParam => "InvalidParam: invalid solver parameter",
            SolverError::SizeMismatch => "SizeMismatch: dimension mismatch",
            SolverError::SingularGram => "SingularGram: block Gram matrix not invertible",
            SolverError::CacheMissing => "CacheMissing: block cache entry not built",
            SolverError::CommFailure  => "CommFailure: failure caused by Comm",
            SolverError::ThreadPool   => "ThreadPool: failure to create worker threads",
        })
    }
}

//

impl std::error::Error for SolverError {}
