mod contract;
mod job;
mod money;
mod profile;
mod settlement;

pub use contract::*;
pub use job::*;
pub use money::*;
pub use profile::*;
pub use settlement::*;
