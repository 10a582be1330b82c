use std::{marker::PhantomData, ops::Range};

use tracing::trace;

use crate::{
    Entity, Schema,
    common::error::{AdapterError, Result},
    core::types::Value,
};

/// Column/value pairs read from an entity, in schema order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundValues(Vec<(&'static str, Value)>);

impl BoundValues {
    /// Reads every schema field of `entity` that currently holds a value.
    pub fn extract<E>(schema: &Schema<E>, entity: &E) -> Self {
        Self(
            schema
                .fields()
                .iter()
                .map(|field| (field.column(), field.get(entity)))
                .filter(|(_, value)| !value.is_null())
                .collect(),
        )
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(column))
            .map(|(_, value)| value)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.iter().map(|(column, _)| *column)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Value)> {
        self.0.iter().map(|(column, value)| (*column, value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Moves values between entities of type `E` and result rows.
pub struct FieldBinder<E: 'static> {
    schema: &'static Schema<E>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> FieldBinder<E> {
    /// Fails if the entity's schema is malformed.
    pub fn new() -> Result<Self> {
        Ok(Self {
            schema: E::schema()?,
            _entity: PhantomData,
        })
    }

    pub fn schema(&self) -> &'static Schema<E> {
        self.schema
    }

    pub fn extract_fields(&self, entity: &E) -> BoundValues {
        BoundValues::extract(self.schema, entity)
    }

    /// Builds a new entity from a result row.
    pub fn hydrate(&self, columns: &[String], row: &[Value]) -> Result<E> {
        let mut entity = E::default();
        self.hydrate_into(&mut entity, columns, row)?;
        Ok(entity)
    }

    /// Assigns each mapped column of `row` to its field. Columns the schema
    /// does not map are skipped and fields missing from the row keep their
    /// current value.
    pub fn hydrate_into(&self, entity: &mut E, columns: &[String], row: &[Value]) -> Result<()> {
        for (column, value) in columns.iter().zip(row) {
            match self.schema.field_by_column(column) {
                Some(field) => {
                    field
                        .set(entity, value.clone())
                        .map_err(|source| AdapterError::Hydration {
                            field: field.name().to_owned(),
                            source,
                        })?;
                }
                None => trace!(column = %column, table = self.schema.table(), "Skipping unmapped column"),
            }
        }
        Ok(())
    }

    /// Builds an entity from a joined row. Columns in `own` belong to this
    /// entity's side of the join; mapped ones set fields and the rest, along
    /// with every column from the other side, become extras.
    pub fn hydrate_join(&self, columns: &[String], row: &[Value], own: Range<usize>) -> Result<E> {
        let mut entity = E::default();

        for (idx, (column, value)) in columns.iter().zip(row).enumerate() {
            let field = own
                .contains(&idx)
                .then(|| self.schema.field_by_column(column))
                .flatten();

            match field {
                Some(field) => {
                    field
                        .set(&mut entity, value.clone())
                        .map_err(|source| AdapterError::Hydration {
                            field: field.name().to_owned(),
                            source,
                        })?;
                }
                None => match entity.extras_mut() {
                    Some(extras) => extras.insert(column.clone(), value.clone()),
                    None => trace!(column = %column, "Entity keeps no extras, dropping joined column"),
                },
            }
        }

        Ok(entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Broken, Order, User};

    fn columns(names: &[&str]) -> Vec<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    #[test]
    fn test_extract_fields_skips_unset() {
        let binder = FieldBinder::<User>::new().unwrap();
        let user = User {
            id: None,
            name: Some("Alice".into()),
            age: Some(30),
        };

        let bound = binder.extract_fields(&user);
        assert_eq!(bound.columns().collect::<Vec<_>>(), vec!["name", "age"]);
        assert_eq!(bound.get("age"), Some(&Value::Int64(30)));
        assert!(!bound.contains("id"));
    }

    #[test]
    fn test_extract_fields_uses_column_names() {
        let binder = FieldBinder::<Order>::new().unwrap();
        let order = Order {
            customer: Some("ACME".into()),
            ..Order::default()
        };

        let bound = binder.extract_fields(&order);
        assert_eq!(bound.len(), 1);
        assert_eq!(bound.get("customer_name"), Some(&Value::Text("ACME".into())));
    }

    #[test]
    fn test_hydrate_ignores_unmapped_columns() {
        let binder = FieldBinder::<User>::new().unwrap();
        let user = binder
            .hydrate(
                &columns(&["ID", "name", "nickname"]),
                &[Value::Int64(1), Value::Text("Bob".into()), Value::Text("b".into())],
            )
            .unwrap();

        assert_eq!(user.id, Some(1));
        assert_eq!(user.name.as_deref(), Some("Bob"));
        assert_eq!(user.age, None);
    }

    #[test]
    fn test_hydrate_reports_field_on_type_mismatch() {
        let binder = FieldBinder::<User>::new().unwrap();
        let err = binder
            .hydrate(&columns(&["age"]), &[Value::Text("old".into())])
            .unwrap_err();

        let AdapterError::Hydration { field, source } = err else {
            panic!("Expected hydration error");
        };
        assert_eq!(field, "age");
        assert_eq!(source.found, "String");
    }

    #[test]
    fn test_hydrate_join_routes_other_side_to_extras() {
        let binder = FieldBinder::<Order>::new().unwrap();
        let order = binder
            .hydrate_join(
                &columns(&["id", "total", "product", "quantity"]),
                &[
                    Value::Int64(4),
                    Value::Int64(12),
                    Value::Text("pen".into()),
                    Value::Int64(3),
                ],
                0..2,
            )
            .unwrap();

        assert_eq!(order.id, Some(4));
        assert_eq!(order.total, Some(12.0));
        assert_eq!(order.extras.get("product"), Some(&Value::Text("pen".into())));
        assert_eq!(order.extras.get("quantity"), Some(&Value::Int64(3)));
        assert!(!order.extras.contains("id"));
    }

    #[test]
    fn test_binder_rejects_broken_schema() {
        let err = FieldBinder::<Broken>::new().err().expect("schema should fail");
        assert!(matches!(err, AdapterError::Schema(_)));
    }
}
