use std::collections::BTreeMap;

use crate::{Schema, common::error::SchemaError, core::types::Value};

/// An application record that maps onto one row of a physical table.
///
/// Implementors build their schema once and hand out the cached result:
///
/// ```ignore
/// impl Entity for User {
///     fn schema() -> Result<&'static Schema<Self>, SchemaError> {
///         static SCHEMA: LazyLock<Result<Schema<User>, SchemaError>> = LazyLock::new(|| {
///             Schema::builder("users")
///                 .key("id")
///                 .field(field!(User, id: Int64))
///                 .field(field!(User, name: Text))
///                 .build()
///         });
///         SCHEMA.as_ref().map_err(Clone::clone)
///     }
/// }
/// ```
///
/// A schema error is returned from every adapter call on the type, so a
/// misdeclared entity fails before any SQL is built.
pub trait Entity: Default + 'static {
    fn schema() -> Result<&'static Schema<Self>, SchemaError>;

    /// Non-persistent values attached by joins, if the type keeps them.
    fn extras(&self) -> Option<&Extras> {
        None
    }

    fn extras_mut(&mut self) -> Option<&mut Extras> {
        None
    }
}

/// Ad hoc values carried by a hydrated entity that are not part of its
/// schema, such as columns projected from the other side of a join.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extras(BTreeMap<String, Value>);

impl Extras {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
