//! Statements submitted to the driver and the records they produce.

use crate::error::{BenchError, Result};
use crate::value::Value;
use std::fmt;

/// A query template with its bound parameters.
///
/// `columns` names the projected fields the caller intends to read; drivers
/// that decode rows by key use it to build [`Record`]s in a stable order.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    text: String,
    params: Vec<(String, Value)>,
    columns: Vec<String>,
}

impl Statement {
    /// Create a statement without parameters
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: Vec::new(),
            columns: Vec::new(),
        }
    }

    /// Bind a named parameter, replacing an earlier binding of the same name
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.params.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.params.push((name, value)),
        }
        self
    }

    /// Declare a projected column
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn params(&self) -> &[(String, Value)] {
        &self.params
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Look up a bound parameter by name
    pub fn get_param(&self, name: &str) -> Option<&Value> {
        self.params
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text.trim())?;
        if !self.params.is_empty() {
            let params: Vec<String> = self
                .params
                .iter()
                .map(|(key, value)| format!("{}: {}", key, value))
                .collect();
            write!(f, " {{{}}}", params.join(", "))?;
        }
        Ok(())
    }
}

/// One result row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    columns: Vec<String>,
    values: Vec<Value>,
}

impl Record {
    /// Build a record from parallel column and value lists
    pub fn new(columns: Vec<String>, values: Vec<Value>) -> Result<Self> {
        if columns.len() != values.len() {
            return Err(BenchError::invalid_input(format!(
                "record has {} columns but {} values",
                columns.len(),
                values.len()
            )));
        }
        Ok(Self { columns, values })
    }

    /// Build a single-column record
    pub fn single(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            columns: vec![column.into()],
            values: vec![value.into()],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Field by position
    pub fn field(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Field by column name
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|index| self.values.get(index))
    }

    /// Field by position, decoded as an integer
    pub fn field_i64(&self, index: usize) -> Result<i64> {
        let value = self.field(index).ok_or_else(|| {
            BenchError::fetch(format!(
                "no field at index {} (record has {})",
                index,
                self.len()
            ))
        })?;

        value.as_i64().ok_or_else(|| {
            BenchError::fetch(format!(
                "field {} is {}, expected integer",
                index,
                value.type_name()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_builder() {
        let stmt = Statement::new("CALL example.calculate.save($i, $j) YIELD out AS o RETURN o")
            .param("i", 0)
            .param("j", 80000)
            .column("o");

        assert_eq!(stmt.params().len(), 2);
        assert_eq!(stmt.get_param("j"), Some(&Value::Integer(80000)));
        assert_eq!(stmt.columns(), ["o".to_string()]);
    }

    #[test]
    fn test_param_rebinding_replaces() {
        let stmt = Statement::new("RETURN $x").param("x", 1).param("x", 2);
        assert_eq!(stmt.params().len(), 1);
        assert_eq!(stmt.get_param("x"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_statement_display() {
        let stmt = Statement::new(" RETURN $a ").param("a", 5);
        assert_eq!(stmt.to_string(), "RETURN $a {a: 5}");
    }

    #[test]
    fn test_record_access() {
        let record = Record::new(
            vec!["o".to_string(), "name".to_string()],
            vec![Value::Integer(10), Value::from("x")],
        )
        .unwrap();

        assert_eq!(record.field_i64(0).unwrap(), 10);
        assert_eq!(record.get("name"), Some(&Value::from("x")));
        assert!(record.field_i64(1).is_err());
        assert!(record.field_i64(2).is_err());
    }

    #[test]
    fn test_record_shape_mismatch() {
        let result = Record::new(vec!["a".to_string()], vec![]);
        assert!(result.is_err());
    }
}
