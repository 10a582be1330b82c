use std::path::Path;

use rusqlite::{params_from_iter, types::ValueRef};
use tracing::trace;

use crate::{
    common::error::{AdapterError, DatabaseError, Result},
    core::types::Value,
    db::connection::{Connection, ResultSet},
};

impl From<rusqlite::Error> for AdapterError {
    fn from(err: rusqlite::Error) -> Self {
        AdapterError::Database(DatabaseError::new(err))
    }
}

/// [`Connection`] over a SQLite database.
///
/// Pragmas and busy timeouts are set on the wrapped handle, see
/// [`SqliteConnection::inner`].
#[derive(Debug)]
pub struct SqliteConnection {
    conn: rusqlite::Connection,
}

impl SqliteConnection {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            conn: rusqlite::Connection::open(path)?,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: rusqlite::Connection::open_in_memory()?,
        })
    }

    pub fn from_connection(conn: rusqlite::Connection) -> Self {
        Self { conn }
    }

    pub fn inner(&self) -> &rusqlite::Connection {
        &self.conn
    }

    pub fn into_inner(self) -> rusqlite::Connection {
        self.conn
    }

    fn fetch(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        let mut stmt = self.conn.prepare(sql)?;
        let columns = stmt
            .column_names()
            .into_iter()
            .map(String::from)
            .collect::<Vec<_>>();

        let mut rows = stmt.query(params_from_iter(params.iter().map(to_sqlite)))?;
        let mut result = Vec::new();
        while let Some(row) = rows.next()? {
            let values = (0..columns.len())
                .map(|idx| row.get_ref(idx).map(from_sqlite))
                .collect::<rusqlite::Result<Vec<_>>>()?;
            result.push(values);
        }

        trace!(rows = result.len(), "Fetched rows");
        Ok(ResultSet::new(columns, result))
    }
}

impl Connection for SqliteConnection {
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        self.fetch(sql, params)
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let count = self
            .conn
            .execute(sql, params_from_iter(params.iter().map(to_sqlite)))?;
        Ok(count as u64)
    }

    /// SQLite reports 0 until a row has been inserted on this connection.
    fn last_insert_id(&mut self) -> Option<i64> {
        match self.conn.last_insert_rowid() {
            0 => None,
            id => Some(id),
        }
    }

    fn query_raw(&mut self, sql: &str) -> Result<ResultSet> {
        self.fetch(sql, &[])
    }

    fn execute_raw(&mut self, sql: &str) -> Result<u64> {
        self.execute(sql, &[])
    }

    fn execute_batch(&mut self, statements: &[String]) -> Result<Vec<u64>> {
        statements
            .iter()
            .map(|sql| self.execute(sql, &[]))
            .collect()
    }
}

fn to_sqlite(value: &Value) -> rusqlite::types::Value {
    use rusqlite::types::Value as Sql;

    match value {
        Value::Int64(i) => Sql::Integer(*i),
        Value::Float64(f) => Sql::Real(*f),
        Value::Text(s) => Sql::Text(s.clone()),
        Value::Bool(b) => Sql::Integer(i64::from(*b)),
        Value::Blob(bytes) => Sql::Blob(bytes.clone()),
        Value::Null => Sql::Null,
    }
}

fn from_sqlite(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::Int64(i),
        ValueRef::Real(f) => Value::Float64(f),
        ValueRef::Text(bytes) => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Blob(bytes.to_vec()),
    }
}
