pub(crate) mod common;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod schema;
pub(crate) mod sql;

#[cfg(test)]
pub(crate) mod testing;

pub use common::error::{
    AdapterError, ConversionError, DatabaseError, DialectError, Result, SchemaError,
};
pub use crate::core::types::{DataType, FromValue, Value};
pub use db::{
    adapter::Adapter,
    batch::BatchQueue,
    binder::{BoundValues, FieldBinder},
    connection::{Connection, ResultRow, ResultSet},
    join::{JoinPlan, JoinSide, JoinSpec},
    sqlite::SqliteConnection,
    view::View,
};
pub use schema::{Entity, Extras, Field, Getter, Schema, SchemaBuilder, Setter};
pub use sql::{
    binding::bind_named,
    compiler::{
        Bindings, ClauseDescriptor, ClauseKind, EntityBindings, Scope, TableScope, compile,
    },
    pagination::Pagination,
    statement::{Query, Statement, StatementBuilder},
};
