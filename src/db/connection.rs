use crate::{
    common::error::{AdapterError, Result},
    core::types::Value,
};

/// A live database handle.
///
/// The adapter never opens, pools or shares connections; it is handed one
/// and uses it for one call at a time.
pub trait Connection {
    /// Runs a statement that returns rows.
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet>;

    /// Runs a statement and returns the number of affected rows.
    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64>;

    /// Key generated by the most recent insert, when the database reports one.
    fn last_insert_id(&mut self) -> Option<i64> {
        None
    }

    /// Runs caller-supplied SQL that returns rows, with no parameters.
    fn query_raw(&mut self, _sql: &str) -> Result<ResultSet> {
        Err(AdapterError::Unsupported("raw query"))
    }

    /// Runs caller-supplied SQL, with no parameters.
    fn execute_raw(&mut self, _sql: &str) -> Result<u64> {
        Err(AdapterError::Unsupported("raw execution"))
    }

    /// Runs every statement in order as one batch and returns the affected
    /// row count of each.
    fn execute_batch(&mut self, _statements: &[String]) -> Result<Vec<u64>> {
        Err(AdapterError::Unsupported("batch execution"))
    }
}

impl<C: Connection + ?Sized> Connection for &mut C {
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        (**self).query(sql, params)
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        (**self).execute(sql, params)
    }

    fn last_insert_id(&mut self) -> Option<i64> {
        (**self).last_insert_id()
    }

    fn query_raw(&mut self, sql: &str) -> Result<ResultSet> {
        (**self).query_raw(sql)
    }

    fn execute_raw(&mut self, sql: &str) -> Result<u64> {
        (**self).execute_raw(sql)
    }

    fn execute_batch(&mut self, statements: &[String]) -> Result<Vec<u64>> {
        (**self).execute_batch(statements)
    }
}

/// Rows returned by a query, fully read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ResultRow<'_>> {
        self.rows.iter().map(|values| ResultRow {
            columns: &self.columns,
            values,
        })
    }

    pub fn into_rows(self) -> Vec<Vec<Value>> {
        self.rows
    }
}

/// One row of a [`ResultSet`].
#[derive(Debug, Clone, Copy)]
pub struct ResultRow<'a> {
    columns: &'a [String],
    values: &'a [Value],
}

impl<'a> ResultRow<'a> {
    /// Value of the named column, matched case-insensitively.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.columns
            .iter()
            .position(|name| name.eq_ignore_ascii_case(column))
            .and_then(|idx| self.values.get(idx))
    }

    pub fn columns(&self) -> &'a [String] {
        self.columns
    }

    pub fn values(&self) -> &'a [Value] {
        self.values
    }
}
