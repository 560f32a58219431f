//! Neo4j driver for graphbench, built on `neo4rs`.
//!
//! The Bolt protocol, connection pooling and query execution all live in
//! `neo4rs`; this crate only maps the benchmark's driver seam onto it.

pub mod connection;
pub mod convert;

pub use connection::{driver_uri, Neo4jConnection, Neo4jDriver, Neo4jResults};
