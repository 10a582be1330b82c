use crate::{
    Entity, Field, Schema,
    common::error::{AdapterError, DialectError, Result},
    core::types::Value,
    db::binder::BoundValues,
    sql::{
        compiler::{ClauseDescriptor, ClauseKind, EntityBindings, Scope, TableScope, compile},
        pagination::Pagination,
        parser::DialectParser,
    },
};

/// A SQL statement with its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }
}

/// The dialect fragments of a select.
///
/// ```ignore
/// let query = Query::new()
///     .filter("age > 18")
///     .order("name")
///     .page(0, 10);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Query<'q> {
    pub where_clause: Option<&'q str>,
    pub choice: Option<&'q str>,
    pub order: Option<&'q str>,
    pub group: Option<&'q str>,
    pub pagination: Pagination,
}

impl<'q> Query<'q> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, where_clause: &'q str) -> Self {
        self.where_clause = Some(where_clause);
        self
    }

    pub fn choice(mut self, choice: &'q str) -> Self {
        self.choice = Some(choice);
        self
    }

    pub fn order(mut self, order: &'q str) -> Self {
        self.order = Some(order);
        self
    }

    pub fn group(mut self, group: &'q str) -> Self {
        self.group = Some(group);
        self
    }

    pub fn page(self, index: u64, size: u64) -> Self {
        self.pagination(Pagination::page(index, size))
    }

    pub fn pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

/// A bare string is a WHERE clause.
impl<'q> From<&'q str> for Query<'q> {
    fn from(where_clause: &'q str) -> Self {
        Query::new().filter(where_clause)
    }
}

/// Builds statements for one entity without running them.
pub struct StatementBuilder<'a, E> {
    schema: &'a Schema<E>,
    entity: &'a E,
}

impl<'a, E: Entity> StatementBuilder<'a, E> {
    pub fn new(entity: &'a E) -> Result<Self> {
        Ok(Self::with_schema(E::schema()?, entity))
    }
}

impl<'a, E> StatementBuilder<'a, E> {
    pub fn with_schema(schema: &'a Schema<E>, entity: &'a E) -> Self {
        Self { schema, entity }
    }

    /// Select by primary key. `None` when the key is not set.
    pub fn load(&self) -> Option<Statement> {
        let key = self.schema.key_value(self.entity);
        if key.is_null() {
            return None;
        }

        let sql = format!(
            "SELECT {} FROM {} WHERE {} = ?",
            self.all_columns(),
            self.schema.table(),
            self.schema.key()
        );
        Some(Statement::new(sql, vec![key]))
    }

    pub fn select(&self, query: &Query<'_>) -> Result<Statement> {
        let bindings = EntityBindings::new(self.schema, self.entity);
        let scope = Scope::new(TableScope::of(self.schema)).with_bindings(&bindings);

        let choice = compile(ClauseKind::Choice, query.choice, &scope)?;
        let where_clause = compile(ClauseKind::Where, query.where_clause, &scope)?;
        let group = compile(ClauseKind::Group, query.group, &scope)?;
        let order = compile(ClauseKind::Order, query.order, &scope)?;

        let mut sql = format!(
            "SELECT {} FROM {}",
            choice.map_or_else(|| self.all_columns(), |choice| choice.sql),
            self.schema.table()
        );
        let params = append_clauses(&mut sql, where_clause, group, order, query.pagination)?;

        Ok(Statement::new(sql, params))
    }

    /// Inserts the named fields that hold a value. The key is only written
    /// when it is named explicitly, `*` names every other field.
    pub fn insert(&self, fields: Option<&str>) -> Result<Statement> {
        let bound = BoundValues::extract(self.schema, self.entity);
        let mut columns = Vec::new();
        let mut params = Vec::new();

        let named = self.named_fields(fields)?.unwrap_or_else(|| self.unkeyed_fields());
        for field in named {
            if let Some(value) = bound.get(field.column()) {
                columns.push(field.column());
                params.push(value.clone());
            }
        }

        let sql = if columns.is_empty() {
            format!("INSERT INTO {} DEFAULT VALUES", self.schema.table())
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                self.schema.table(),
                columns.join(", "),
                placeholders(columns.len())
            )
        };

        Ok(Statement::new(sql, params))
    }

    /// Writes the fields named in the list, unset ones as NULL. Without a list
    /// only the set fields are written. Without a WHERE clause the update is
    /// scoped to the entity's key.
    pub fn update(&self, fields: Option<&str>, where_clause: Option<&str>) -> Result<Statement> {
        let assignments: Vec<(&str, Value)> = match self.named_fields(fields)? {
            Some(named) => named
                .into_iter()
                .map(|field| (field.column(), field.get(self.entity)))
                .collect(),
            None => {
                let bound = BoundValues::extract(self.schema, self.entity);
                self.unkeyed_fields()
                    .into_iter()
                    .filter_map(|field| {
                        bound
                            .get(field.column())
                            .map(|value| (field.column(), value.clone()))
                    })
                    .collect()
            }
        };
        if assignments.is_empty() {
            return Err(AdapterError::validation(format!(
                "No fields to update in `{}`",
                self.schema.table()
            )));
        }

        let mut params = Vec::with_capacity(assignments.len() + 1);
        let mut columns = Vec::with_capacity(assignments.len());
        for (column, value) in assignments {
            columns.push(format!("{column} = ?"));
            params.push(value);
        }

        let filter = self.filter_or_key("update", where_clause)?;
        let sql = format!(
            "UPDATE {} SET {} WHERE {}",
            self.schema.table(),
            columns.join(", "),
            filter.sql
        );
        params.extend(filter.params);

        Ok(Statement::new(sql, params))
    }

    /// Deletes matching rows, or the entity's own row without a WHERE clause.
    pub fn delete(&self, where_clause: Option<&str>) -> Result<Statement> {
        let filter = self.filter_or_key("delete", where_clause)?;
        let sql = format!("DELETE FROM {} WHERE {}", self.schema.table(), filter.sql);
        Ok(Statement::new(sql, filter.params))
    }

    fn all_columns(&self) -> String {
        self.schema.columns().collect::<Vec<_>>().join(", ")
    }

    /// The caller's WHERE clause, or `key = ?` bound to the entity's key.
    fn filter_or_key(&self, action: &str, where_clause: Option<&str>) -> Result<Statement> {
        let bindings = EntityBindings::new(self.schema, self.entity);
        let scope = Scope::new(TableScope::of(self.schema)).with_bindings(&bindings);

        if let Some(clause) = compile(ClauseKind::Where, where_clause, &scope)? {
            return Ok(Statement::new(clause.sql, clause.params));
        }

        let key = self.schema.key_value(self.entity);
        if key.is_null() {
            return Err(AdapterError::validation(format!(
                "Cannot {action} `{}` without a filter: key `{}` is not set",
                self.schema.table(),
                self.schema.key()
            )));
        }
        Ok(Statement::new(format!("{} = ?", self.schema.key()), vec![key]))
    }

    /// Every field except the key.
    fn unkeyed_fields(&self) -> Vec<&'a Field<E>> {
        let schema = self.schema;
        schema
            .fields()
            .iter()
            .filter(|field| !field.column().eq_ignore_ascii_case(schema.key()))
            .collect()
    }

    /// Resolves an explicit field list. Missing, blank and `*` lists give
    /// `None`.
    fn named_fields(&self, fields: Option<&str>) -> Result<Option<Vec<&'a Field<E>>>> {
        let schema = self.schema;
        let Some(src) = fields.filter(|text| !text.trim().is_empty()) else {
            return Ok(None);
        };
        let Some(names) = DialectParser::new(src).parse_field_list()? else {
            return Ok(None);
        };

        let mut named: Vec<&'a Field<E>> = Vec::with_capacity(names.len());
        for name in names {
            let Some(field) = schema.resolve(name.name) else {
                return Err(DialectError::new(
                    format!("Unknown field `{}`", name.name),
                    src,
                    name.offset,
                    name.len,
                )
                .into());
            };
            if named.iter().any(|seen| std::ptr::eq(*seen, field)) {
                return Err(DialectError::new(
                    format!("Field `{}` is listed more than once", name.name),
                    src,
                    name.offset,
                    name.len,
                )
                .into());
            }
            named.push(field);
        }

        Ok(Some(named))
    }
}

/// Appends WHERE, GROUP BY, ORDER BY and LIMIT in that order and returns the
/// parameters of the WHERE clause.
pub(crate) fn append_clauses(
    sql: &mut String,
    where_clause: Option<ClauseDescriptor>,
    group: Option<ClauseDescriptor>,
    order: Option<ClauseDescriptor>,
    pagination: Pagination,
) -> Result<Vec<Value>> {
    let pagination = pagination.validate()?;
    let mut params = Vec::new();
    if let Some(clause) = where_clause {
        sql.push_str(&format!(" WHERE {}", clause.sql));
        params = clause.params;
    }
    if let Some(clause) = group {
        sql.push_str(&format!(" GROUP BY {}", clause.sql));
    }
    if let Some(clause) = order {
        sql.push_str(&format!(" ORDER BY {}", clause.sql));
    }
    if pagination != Pagination::All {
        sql.push_str(&format!(" {pagination}"));
    }
    Ok(params)
}

fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}
