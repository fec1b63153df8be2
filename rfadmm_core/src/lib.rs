pub mod solver;

//

mod linalg_ex;

pub use linalg_ex::*;

//

mod floatgeneric;

pub use floatgeneric::*;

//

mod mat;
mod spmat;
mod input;

pub use mat::*;
pub use spmat::*;
pub use input::*;

//

mod partition;
mod cache;

pub use partition::*;
pub use cache::*;
