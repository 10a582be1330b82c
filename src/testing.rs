//! Fixture entities and connections shared by the unit tests.

use std::sync::LazyLock;

use crate::{
    Entity, Extras, Schema, SchemaError,
    common::error::Result,
    core::types::Value,
    db::{
        connection::{Connection, ResultSet},
        sqlite::SqliteConnection,
    },
    field,
};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub age: Option<i64>,
}

impl Entity for User {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: LazyLock<Result<Schema<User>, SchemaError>> = LazyLock::new(|| {
            Schema::builder("users")
                .key("id")
                .field(field!(User, id: Int64))
                .field(field!(User, name: Text))
                .field(field!(User, age: Int64))
                .build()
        });
        SCHEMA.as_ref().map_err(Clone::clone)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Order {
    pub id: Option<i64>,
    pub customer: Option<String>,
    pub total: Option<f64>,
    pub extras: Extras,
}

impl Entity for Order {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: LazyLock<Result<Schema<Order>, SchemaError>> = LazyLock::new(|| {
            Schema::builder("orders")
                .key("id")
                .field(field!(Order, id: Int64))
                .field(field!(Order, customer => "customer_name", Text))
                .field(field!(Order, total: Float64))
                .build()
        });
        SCHEMA.as_ref().map_err(Clone::clone)
    }

    fn extras(&self) -> Option<&Extras> {
        Some(&self.extras)
    }

    fn extras_mut(&mut self) -> Option<&mut Extras> {
        Some(&mut self.extras)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderItem {
    pub id: Option<i64>,
    pub order_id: Option<i64>,
    pub product: Option<String>,
    pub quantity: Option<i64>,
    pub extras: Extras,
}

impl Entity for OrderItem {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: LazyLock<Result<Schema<OrderItem>, SchemaError>> = LazyLock::new(|| {
            Schema::builder("order_items")
                .key("id")
                .field(field!(OrderItem, id: Int64))
                .field(field!(OrderItem, order_id: Int64))
                .field(field!(OrderItem, product: Text))
                .field(field!(OrderItem, quantity: Int64))
                .build()
        });
        SCHEMA.as_ref().map_err(Clone::clone)
    }

    fn extras(&self) -> Option<&Extras> {
        Some(&self.extras)
    }

    fn extras_mut(&mut self) -> Option<&mut Extras> {
        Some(&mut self.extras)
    }
}

/// An entity whose key names a column it does not map.
#[derive(Debug, Clone, Default)]
pub struct Broken {
    pub id: Option<i64>,
}

impl Entity for Broken {
    fn schema() -> Result<&'static Schema<Self>, SchemaError> {
        static SCHEMA: LazyLock<Result<Schema<Broken>, SchemaError>> = LazyLock::new(|| {
            Schema::builder("broken")
                .key("uuid")
                .field(field!(Broken, id: Int64))
                .build()
        });
        SCHEMA.as_ref().map_err(Clone::clone)
    }
}

const FIXTURE_DDL: &str = "
    CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER);
    CREATE TABLE orders (id INTEGER PRIMARY KEY, customer_name TEXT, total REAL);
    CREATE TABLE order_items (
        id INTEGER PRIMARY KEY,
        order_id INTEGER NOT NULL REFERENCES orders (id),
        product TEXT,
        quantity INTEGER
    );
";

/// In-memory database with the fixture tables created.
pub fn sqlite() -> SqliteConnection {
    let conn = SqliteConnection::open_in_memory().expect("open in-memory database");
    conn.inner()
        .execute_batch(FIXTURE_DDL)
        .expect("create fixture tables");
    conn
}

/// Records every statement and answers queries with a canned result. Raw and
/// batch execution are left unsupported.
#[derive(Debug, Default)]
pub struct RecordingConnection {
    pub statements: Vec<(String, Vec<Value>)>,
    pub result: ResultSet,
}

impl Connection for RecordingConnection {
    fn query(&mut self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        self.statements.push((sql.to_owned(), params.to_vec()));
        Ok(self.result.clone())
    }

    fn execute(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        self.statements.push((sql.to_owned(), params.to_vec()));
        Ok(1)
    }
}
