
mod linalg;
mod loss;
mod featmap;
mod comm;
mod solver_error;
mod solver;

pub use linalg::*;
pub use loss::*;
pub use featmap::*;
pub use comm::*;
pub use solver_error::*;
pub use solver::*;
