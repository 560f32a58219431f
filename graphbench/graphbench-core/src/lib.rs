//! Core types for graphbench, a benchmarking harness for graph database drivers.
//!
//! This crate defines the driver seam the benchmark runs against, the guards
//! that release result streams and connections exactly once, the benchmark
//! configuration, and stage timing.

pub mod config;
pub mod driver;
pub mod error;
pub mod query;
pub mod target;
pub mod timing;
pub mod value;

// Recording driver for tests (available in all builds for integration tests)
pub mod recording;

pub use config::BenchConfig;
pub use driver::{Connection, Driver, DriverScope, ResultStream, Results, Session};
pub use error::{BenchError, Result};
pub use query::{Record, Statement};
pub use target::{ConnectTarget, TlsMode};
pub use timing::{timed, Stopwatch, Timing};
pub use value::Value;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{
        BenchConfig, CalculateConfig, CleanConfig, ConnectionConfig, PopulateConfig,
        WorkloadConfig,
    };
    pub use crate::driver::{Connection, Driver, DriverScope, ResultStream, Results, Session};
    pub use crate::error::{BenchError, Result};
    pub use crate::query::{Record, Statement};
    pub use crate::target::{ConnectTarget, TlsMode};
    pub use crate::timing::{timed, Stopwatch, Timing};
    pub use crate::value::Value;
}
