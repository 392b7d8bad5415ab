// Application layer - the operations the request layer calls into:
// settlement, deposits, reports and the contract/job reads.

pub mod error;
pub mod reporting;
mod service;

pub use error::*;
pub use reporting::*;
pub use service::*;
