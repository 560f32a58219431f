//! Conversions between graphbench values and Bolt values.

use graphbench_core::error::{BenchError, Result};
use graphbench_core::query::{Record, Statement};
use graphbench_core::value::Value;
use neo4rs::{BoltType, Query, Row};

/// Convert a parameter value to its Bolt form
pub fn to_bolt(value: &Value) -> BoltType {
    match value {
        Value::Null => BoltType::from(None::<i64>),
        Value::Boolean(v) => BoltType::from(*v),
        Value::Integer(v) => BoltType::from(*v),
        Value::Float(v) => BoltType::from(*v),
        Value::String(v) => BoltType::from(v.clone()),
    }
}

/// Build a `neo4rs` query with all parameters bound
pub fn to_query(statement: &Statement) -> Query {
    statement
        .params()
        .iter()
        .fold(neo4rs::query(statement.text()), |query, (key, value)| {
            query.param(key, to_bolt(value))
        })
}

/// Decode the statement's declared columns out of a row
pub fn to_record(row: &Row, columns: &[String]) -> Result<Record> {
    let values = columns
        .iter()
        .map(|column| {
            row.get::<Value>(column).map_err(|e| {
                BenchError::fetch(format!("Failed to decode column '{}': {}", column, e))
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Record::new(columns.to_vec(), values)
}
