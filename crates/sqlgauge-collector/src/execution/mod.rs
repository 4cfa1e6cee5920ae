//! Query execution
//!
//! - [`ServerQueryRunner`] runs one query against one server
//! - [`Collector`] fans a cycle out over every (server, query) pair
//! - [`CycleReport`] gathers what each task produced or why it failed

mod report;
mod runner;
mod scheduler;


pub use report::*;
pub use runner::*;
pub use scheduler::*;
