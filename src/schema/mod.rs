use std::fmt;

use crate::{
    common::error::{ConversionError, SchemaError},
    core::types::{DataType, Value},
};

pub use entity::{Entity, Extras};

pub mod entity;

/// Reads a field's current value off an entity. Unset fields return `Value::Null`.
pub type Getter<E> = fn(&E) -> Value;

/// Assigns a value read from the database to a field.
pub type Setter<E> = fn(&mut E, Value) -> Result<(), ConversionError>;

/// One persistent field of an entity: its name, the column it maps to and
/// the accessor pair used instead of runtime reflection.
pub struct Field<E> {
    name: &'static str,
    column: &'static str,
    data_type: DataType,
    get: Getter<E>,
    set: Setter<E>,
}

impl<E> Field<E> {
    pub fn new(
        name: &'static str,
        column: &'static str,
        data_type: DataType,
        get: Getter<E>,
        set: Setter<E>,
    ) -> Self {
        Self {
            name,
            column,
            data_type,
            get,
            set,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn column(&self) -> &'static str {
        self.column
    }

    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// The field's current value on `entity`.
    pub fn get(&self, entity: &E) -> Value {
        (self.get)(entity)
    }

    /// Stores `value` into the field, coercing it to the declared type first.
    pub fn set(&self, entity: &mut E, value: Value) -> Result<(), ConversionError> {
        (self.set)(entity, value.coerce(self.data_type))
    }
}

impl<E> fmt::Debug for Field<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("name", &self.name)
            .field("column", &self.column)
            .field("data_type", &self.data_type)
            .finish()
    }
}

/// The persistent shape of an entity type.
///
/// A schema is only obtainable through [`SchemaBuilder::build`], so every
/// `Schema` value satisfies:
/// - the table name and all columns are plain SQL identifiers
/// - no column and no field name is declared twice
/// - the key names exactly one declared column
pub struct Schema<E> {
    table: String,
    key_index: usize,
    fields: Vec<Field<E>>,
}

impl<E> Schema<E> {
    pub fn builder(table: impl Into<String>) -> SchemaBuilder<E> {
        SchemaBuilder {
            table: table.into(),
            key: None,
            fields: Vec::new(),
        }
    }

    /// Physical table name.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Primary key column name.
    pub fn key(&self) -> &'static str {
        self.fields[self.key_index].column
    }

    pub fn key_field(&self) -> &Field<E> {
        &self.fields[self.key_index]
    }

    /// The key's current value on `entity`.
    pub fn key_value(&self, entity: &E) -> Value {
        self.key_field().get(entity)
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[Field<E>] {
        &self.fields
    }

    /// Column names in declaration order.
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|field| field.column)
    }

    pub fn field_by_column(&self, column: &str) -> Option<&Field<E>> {
        self.fields
            .iter()
            .find(|field| field.column.eq_ignore_ascii_case(column))
    }

    /// Looks a field up by field name first, then by column name.
    pub fn resolve(&self, name: &str) -> Option<&Field<E>> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .or_else(|| self.field_by_column(name))
    }
}

impl<E> fmt::Debug for Schema<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("table", &self.table)
            .field("key", &self.key())
            .field("fields", &self.fields)
            .finish()
    }
}

/// Collects field registrations and validates them into a [`Schema`].
pub struct SchemaBuilder<E> {
    table: String,
    key: Option<&'static str>,
    fields: Vec<Field<E>>,
}

impl<E> SchemaBuilder<E> {
    /// Names the primary key column.
    pub fn key(mut self, column: &'static str) -> Self {
        self.key = Some(column);
        self
    }

    pub fn field(mut self, field: Field<E>) -> Self {
        self.fields.push(field);
        self
    }

    pub fn build(self) -> Result<Schema<E>, SchemaError> {
        if self.table.is_empty() {
            return Err(SchemaError::EmptyTable);
        }
        if !is_identifier(&self.table) {
            return Err(SchemaError::InvalidIdentifier(self.table));
        }

        for (idx, field) in self.fields.iter().enumerate() {
            for name in [field.name, field.column] {
                if !is_identifier(name) {
                    return Err(SchemaError::InvalidIdentifier(name.to_owned()));
                }
            }

            let earlier = &self.fields[..idx];
            if earlier
                .iter()
                .any(|other| other.column.eq_ignore_ascii_case(field.column))
            {
                return Err(SchemaError::DuplicateColumn {
                    table: self.table.clone(),
                    column: field.column.to_owned(),
                });
            }
            if earlier.iter().any(|other| other.name == field.name) {
                return Err(SchemaError::DuplicateField {
                    table: self.table.clone(),
                    field: field.name.to_owned(),
                });
            }
        }

        let Some(key) = self.key else {
            return Err(SchemaError::MissingKey { table: self.table });
        };

        let Some(key_index) = self
            .fields
            .iter()
            .position(|field| field.column.eq_ignore_ascii_case(key))
        else {
            return Err(SchemaError::UnknownKey {
                table: self.table,
                key: key.to_owned(),
            });
        };

        Ok(Schema {
            table: self.table,
            key_index,
            fields: self.fields,
        })
    }
}

/// Whether `name` can be interpolated into SQL as a bare identifier.
pub(crate) fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Registers a struct field as a persistent [`Field`].
///
/// ```ignore
/// field!(User, id: Int64)                    // column `id`
/// field!(User, name => "user_name", Text)    // column `user_name`
/// ```
///
/// The struct field must be `Clone`, convertible into a [`Value`](crate::Value)
/// and implement [`FromValue`](crate::FromValue). Use `Option<T>` for fields
/// that may be unset.
#[macro_export]
macro_rules! field {
    ($entity:ty, $name:ident : $data_type:ident) => {
        $crate::field!($entity, $name => stringify!($name), $data_type)
    };
    ($entity:ty, $name:ident => $column:expr, $data_type:ident) => {
        $crate::Field::<$entity>::new(
            stringify!($name),
            $column,
            $crate::DataType::$data_type,
            |entity| $crate::Value::from(::std::clone::Clone::clone(&entity.$name)),
            |entity, value| {
                entity.$name = $crate::FromValue::from_value(value)?;
                Ok(())
            },
        )
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::User;

    fn user_fields() -> SchemaBuilder<User> {
        Schema::builder("users")
            .field(field!(User, id: Int64))
            .field(field!(User, name: Text))
            .field(field!(User, age: Int64))
    }

    #[test]
    fn test_build_schema() {
        let schema = user_fields().key("id").build().unwrap();

        assert_eq!(schema.table(), "users");
        assert_eq!(schema.key(), "id");
        assert_eq!(schema.columns().collect::<Vec<_>>(), vec!["id", "name", "age"]);
    }

    #[test]
    fn test_missing_key() {
        let err = user_fields().build().unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingKey {
                table: "users".into()
            }
        );
    }

    #[test]
    fn test_unknown_key() {
        let err = user_fields().key("uuid").build().unwrap_err();
        assert!(matches!(err, SchemaError::UnknownKey { key, .. } if key == "uuid"));
    }

    #[test]
    fn test_duplicate_column() {
        let err = user_fields()
            .field(field!(User, age => "name", Int64))
            .key("id")
            .build()
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateColumn { column, .. } if column == "name"));
    }

    #[test]
    fn test_duplicate_field() {
        let err = user_fields()
            .field(field!(User, age => "years", Int64))
            .key("id")
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateField {
                table: "users".into(),
                field: "age".into()
            }
        );
    }

    #[test]
    fn test_invalid_identifiers() {
        let err = Schema::<User>::builder("users; drop")
            .field(field!(User, id: Int64))
            .key("id")
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::InvalidIdentifier("users; drop".into()));

        let err = Schema::<User>::builder("").build().unwrap_err();
        assert_eq!(err, SchemaError::EmptyTable);

        let err = Schema::builder("users")
            .field(field!(User, id => "user id", Int64))
            .key("id")
            .build()
            .unwrap_err();
        assert_eq!(err, SchemaError::InvalidIdentifier("user id".into()));
    }

    #[test]
    fn test_resolve_by_name_or_column() {
        let schema = Schema::builder("users")
            .field(field!(User, id: Int64))
            .field(field!(User, name => "user_name", Text))
            .key("id")
            .build()
            .unwrap();

        assert_eq!(schema.resolve("name").unwrap().column(), "user_name");
        assert_eq!(schema.resolve("user_name").unwrap().name(), "name");
        assert!(schema.resolve("age").is_none());
    }

    #[test]
    fn test_accessors() {
        let schema = user_fields().key("id").build().unwrap();
        let mut user = User {
            name: Some("Alice".into()),
            ..Default::default()
        };

        let name = schema.resolve("name").unwrap();
        assert_eq!(name.get(&user), Value::Text("Alice".into()));
        assert_eq!(schema.key_value(&user), Value::Null);

        schema.key_field().set(&mut user, Value::Int64(4)).unwrap();
        assert_eq!(user.id, Some(4));

        let err = name.set(&mut user, Value::Int64(1)).unwrap_err();
        assert_eq!(err.expected, "String");
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("order_items"));
        assert!(is_identifier("_tmp1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a-b"));
        assert!(!is_identifier(""));
    }
}
