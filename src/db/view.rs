use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    Entity, Schema,
    common::error::{DialectError, Result},
    core::types::Value,
    sql::parser::DialectParser,
};

/// A read-only projection of an entity exposing only selected fields.
///
/// Serializes as a map from field name to value, in selection order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct View(Vec<(String, Value)>);

impl View {
    /// Projects `entity` onto `fields`, a field list naming schema fields
    /// (by field or column name) or extras. `*` and an absent list select
    /// every schema field followed by every extra.
    pub fn mask<E: Entity>(schema: &Schema<E>, entity: &E, fields: Option<&str>) -> Result<Self> {
        let src = fields.filter(|text| !text.trim().is_empty());
        let names = match src {
            Some(src) => DialectParser::new(src).parse_field_list()?,
            None => None,
        };

        let Some(names) = names else {
            let mut values = schema
                .fields()
                .iter()
                .map(|field| (field.name().to_owned(), field.get(entity)))
                .collect::<Vec<_>>();
            if let Some(extras) = entity.extras() {
                values.extend(extras.iter().map(|(name, value)| (name.to_owned(), value.clone())));
            }
            return Ok(Self(values));
        };

        let mut values = Vec::with_capacity(names.len());
        for name in names {
            if let Some(field) = schema.resolve(name.name) {
                values.push((field.name().to_owned(), field.get(entity)));
            } else if let Some(value) = entity.extras().and_then(|extras| extras.get(name.name)) {
                values.push((name.name.to_owned(), value.clone()));
            } else {
                return Err(DialectError::new(
                    format!("Unknown field `{}`", name.name),
                    src.unwrap_or_default(),
                    name.offset,
                    name.len,
                )
                .into());
            }
        }

        Ok(Self(values))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for View {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Int64(i) => serializer.serialize_i64(*i),
            Value::Float64(f) => serializer.serialize_f64(*f),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Blob(bytes) => serializer.serialize_bytes(bytes),
            Value::Null => serializer.serialize_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        AdapterError,
        testing::{Order, User},
    };

    fn carol() -> User {
        User {
            id: Some(3),
            name: Some("Carol".into()),
            age: None,
        }
    }

    #[test]
    fn test_mask_selected_fields() {
        let user = carol();
        let view = View::mask(User::schema().unwrap(), &user, Some("name, id")).unwrap();
        assert_eq!(view.names().collect::<Vec<_>>(), vec!["name", "id"]);
        assert_eq!(
            serde_json::to_string(&view).unwrap(),
            r#"{"name":"Carol","id":3}"#
        );
    }

    #[test]
    fn test_mask_all_includes_extras() {
        let mut order = Order {
            id: Some(1),
            customer: Some("ACME".into()),
            total: Some(2.5),
            ..Order::default()
        };
        order.extras.insert("product", Value::Text("pen".into()));

        let view = View::mask(Order::schema().unwrap(), &order, None).unwrap();
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            serde_json::json!({"id": 1, "customer": "ACME", "total": 2.5, "product": "pen"})
        );

        let view = View::mask(Order::schema().unwrap(), &order, Some("customer_name, product")).unwrap();
        assert_eq!(view.get("customer"), Some(&Value::Text("ACME".into())));
        assert_eq!(view.get("product"), Some(&Value::Text("pen".into())));
    }

    #[test]
    fn test_mask_rejects_unknown_field() {
        let user = carol();
        let err = View::mask(User::schema().unwrap(), &user, Some("name, password")).unwrap_err();
        let AdapterError::Dialect(err) = err else {
            panic!("Expected dialect error");
        };
        assert_eq!(err.message, "Unknown field `password`");
        assert_eq!(err.span.offset(), 6);
    }

    #[test]
    fn test_null_serializes_as_null() {
        let user = carol();
        let view = View::mask(User::schema().unwrap(), &user, Some("age")).unwrap();
        assert_eq!(serde_json::to_string(&view).unwrap(), r#"{"age":null}"#);
    }
}
