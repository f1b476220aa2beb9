//! Typed records and request envelopes for the execution partition.

mod execution;
mod maps;
mod requests;
mod tasks;

pub use execution::*;
pub use maps::*;
pub use requests::*;
pub use tasks::*;
