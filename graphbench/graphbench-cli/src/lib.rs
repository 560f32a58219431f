//! Library for the graphbench CLI: the benchmark workload, the runner that
//! sequences it, and output formatting.

pub mod commands;
pub mod output;
pub mod runner;
pub mod workload;

pub use commands::*;
pub use output::*;
pub use runner::{run_benchmark, BenchReport, StageReport};
