//! Operations exposed by [`TestsEngine`](crate::TestsEngine)
//!
//! Each submodule adds one `impl TestsEngine` block.

mod audit;
mod generate;
mod init;
pub mod plan;
mod repair;
mod run;

pub use generate::NOTHING_TO_GENERATE;
pub use repair::{REPAIR_DESCRIPTION, UNKNOWN_FAILURE};
