use tracing::{debug, instrument, warn};

use crate::{
    Entity,
    common::error::{AdapterError, Result},
    core::types::{DataType, Value},
    db::{
        batch::BatchQueue,
        binder::FieldBinder,
        connection::{Connection, ResultSet},
        join::{JoinSide, JoinSpec},
        view::View,
    },
    sql::{
        binding::bind_named,
        compiler::EntityBindings,
        statement::{Query, Statement, StatementBuilder},
    },
};

/// Runs entity operations against an injected connection.
///
/// Every statement is built from the entity's current field values at call
/// time. Failures are returned to the caller and also kept as the adapter's
/// last error until the next failure replaces them.
#[derive(Debug)]
pub struct Adapter<C> {
    conn: C,
    batch: BatchQueue,
    last_error: Option<AdapterError>,
}

impl<C: Connection> Adapter<C> {
    pub fn new(conn: C) -> Self {
        Self {
            conn,
            batch: BatchQueue::default(),
            last_error: None,
        }
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.conn
    }

    pub fn into_inner(self) -> C {
        self.conn
    }

    /// The most recent failure of any operation on this adapter.
    pub fn last_error(&self) -> Option<&AdapterError> {
        self.last_error.as_ref()
    }

    pub fn clear_last_error(&mut self) {
        self.last_error = None;
    }

    /// Loads the row whose key matches `entity`'s key into `entity`.
    ///
    /// Returns `false` when no row matches or the key is not set; the entity
    /// is left untouched in both cases.
    #[instrument(name = "adapter::load", level = "debug", skip_all)]
    pub fn load<E: Entity>(&mut self, entity: &mut E) -> Result<bool> {
        self.record(|this| {
            let binder = FieldBinder::<E>::new()?;
            let Some(statement) = StatementBuilder::with_schema(binder.schema(), entity).load() else {
                debug!(table = binder.schema().table(), "Key not set, nothing to load");
                return Ok(false);
            };

            let set = this.fetch(&statement)?;
            match set.rows.first() {
                Some(row) => {
                    binder.hydrate_into(entity, &set.columns, row)?;
                    Ok(true)
                }
                None => Ok(false),
            }
        })
    }

    /// Selects rows of `E`'s table.
    ///
    /// ```ignore
    /// let adults = adapter.select(&User::default(), "age > 18")?;
    /// let page = adapter.select(&User::default(), Query::new().order("id").page(1, 10))?;
    /// ```
    #[instrument(name = "adapter::select", level = "debug", skip_all)]
    pub fn select<'q, E: Entity>(&mut self, entity: &E, query: impl Into<Query<'q>>) -> Result<Vec<E>> {
        let query = query.into();
        self.record(|this| {
            let binder = FieldBinder::<E>::new()?;
            let statement = StatementBuilder::with_schema(binder.schema(), entity).select(&query)?;
            let set = this.fetch(&statement)?;
            hydrate_all(&binder, &set)
        })
    }

    /// Runs a complete statement whose `:name` tokens are bound to `entity`'s
    /// fields and hydrates the rows into `E`.
    #[instrument(name = "adapter::query", level = "debug", skip_all)]
    pub fn query<E: Entity>(&mut self, entity: &E, text: &str) -> Result<Vec<E>> {
        self.record(|this| {
            let binder = FieldBinder::<E>::new()?;
            let statement = bind_named(text, &EntityBindings::new(binder.schema(), entity))?;
            let set = this.fetch(&statement)?;
            hydrate_all(&binder, &set)
        })
    }

    /// Inserts the named fields of `entity`, `*` or `None` for all but the key.
    /// A key generated by the database is written back to an unset key field.
    #[instrument(name = "adapter::insert", level = "debug", skip_all)]
    pub fn insert<E: Entity>(&mut self, entity: &mut E, fields: Option<&str>) -> Result<u64> {
        self.record(|this| {
            let statement = StatementBuilder::new(&*entity)?.insert(fields)?;
            let count = this.execute(&statement)?;
            this.assign_generated_key(entity, count)?;
            Ok(count)
        })
    }

    /// Updates the named fields, scoped to `entity`'s key without a WHERE
    /// clause.
    #[instrument(name = "adapter::update", level = "debug", skip_all)]
    pub fn update<E: Entity>(
        &mut self,
        entity: &E,
        fields: Option<&str>,
        where_clause: Option<&str>,
    ) -> Result<u64> {
        self.record(|this| {
            let statement = StatementBuilder::new(entity)?.update(fields, where_clause)?;
            this.execute(&statement)
        })
    }

    #[instrument(name = "adapter::delete", level = "debug", skip_all)]
    pub fn delete<E: Entity>(&mut self, entity: &E, where_clause: Option<&str>) -> Result<u64> {
        self.record(|this| {
            let statement = StatementBuilder::new(entity)?.delete(where_clause)?;
            this.execute(&statement)
        })
    }

    /// Runs a complete statement with `:name` bindings and returns the rows
    /// as they come.
    #[instrument(name = "adapter::select_query", level = "debug", skip_all)]
    pub fn select_query<E: Entity>(&mut self, entity: &E, text: &str) -> Result<ResultSet> {
        self.record(|this| {
            let statement = bind_named(text, &EntityBindings::new(E::schema()?, entity))?;
            this.fetch(&statement)
        })
    }

    /// Runs caller-supplied SQL as is. Nothing is checked or bound.
    #[instrument(name = "adapter::select_query_raw", level = "debug", skip_all)]
    pub fn select_query_raw(&mut self, sql: &str) -> Result<ResultSet> {
        self.record(|this| {
            debug!(sql, "Running raw query");
            this.conn.query_raw(sql)
        })
    }

    #[instrument(name = "adapter::update_query", level = "debug", skip_all)]
    pub fn update_query<E: Entity>(&mut self, entity: &E, text: &str) -> Result<u64> {
        self.record(|this| {
            let statement = bind_named(text, &EntityBindings::new(E::schema()?, entity))?;
            this.execute(&statement)
        })
    }

    #[instrument(name = "adapter::update_query_raw", level = "debug", skip_all)]
    pub fn update_query_raw(&mut self, sql: &str) -> Result<u64> {
        self.record(|this| {
            debug!(sql, "Running raw statement");
            this.conn.execute_raw(sql)
        })
    }

    #[instrument(name = "adapter::insert_query", level = "debug", skip_all)]
    pub fn insert_query<E: Entity>(&mut self, entity: &mut E, text: &str) -> Result<u64> {
        self.record(|this| {
            let statement = bind_named(text, &EntityBindings::new(E::schema()?, &*entity))?;
            let count = this.execute(&statement)?;
            this.assign_generated_key(entity, count)?;
            Ok(count)
        })
    }

    #[instrument(name = "adapter::insert_query_raw", level = "debug", skip_all)]
    pub fn insert_query_raw<E: Entity>(&mut self, entity: &mut E, sql: &str) -> Result<u64> {
        self.record(|this| {
            debug!(sql, "Running raw insert");
            let count = this.conn.execute_raw(sql)?;
            this.assign_generated_key(entity, count)?;
            Ok(count)
        })
    }

    /// Joins and hydrates into the primary type.
    #[instrument(name = "adapter::primary_join", level = "debug", skip_all)]
    pub fn primary_join<P: Entity, F: Entity>(&mut self, spec: &JoinSpec<'_, P, F>) -> Result<Vec<P>> {
        self.record(|this| this.join(spec, JoinSide::Primary))
    }

    /// Joins and hydrates into the foreign type.
    #[instrument(name = "adapter::foreign_join", level = "debug", skip_all)]
    pub fn foreign_join<P: Entity, F: Entity>(&mut self, spec: &JoinSpec<'_, P, F>) -> Result<Vec<F>> {
        self.record(|this| this.join(spec, JoinSide::Foreign))
    }

    /// [`Adapter::primary_join`] listing the newest primary rows first unless
    /// the join already has an order.
    pub fn join_latest<P: Entity, F: Entity>(&mut self, spec: JoinSpec<'_, P, F>) -> Result<Vec<P>> {
        self.primary_join(&spec.newest_first())
    }

    /// Starts a new batch, dropping any statements queued before.
    pub fn start_batch(&mut self) {
        self.batch.start();
    }

    pub fn add_batch(&mut self, sql: impl Into<String>) -> Result<()> {
        let result = self.batch.add(sql);
        self.capture(result)
    }

    /// Runs every queued statement in one batch. The queue is emptied first,
    /// so a failed batch is not retried by the next call.
    #[instrument(name = "adapter::batch_update", level = "debug", skip_all)]
    pub fn batch_update(&mut self) -> Result<Vec<u64>> {
        self.record(|this| {
            let statements = this.batch.take()?;
            debug!(statements = statements.len(), "Running batch");
            this.conn.execute_batch(&statements)
        })
    }

    /// Projects `entity` onto the named fields.
    pub fn view<E: Entity>(&mut self, entity: &E, fields: Option<&str>) -> Result<View> {
        self.record(|_| View::mask(E::schema()?, entity, fields))
    }

    pub fn view_all<E: Entity>(&mut self, entities: &[E], fields: Option<&str>) -> Result<Vec<View>> {
        self.record(|_| {
            let schema = E::schema()?;
            entities
                .iter()
                .map(|entity| View::mask(schema, entity, fields))
                .collect()
        })
    }

    fn join<P: Entity, F: Entity, R: Entity>(
        &mut self,
        spec: &JoinSpec<'_, P, F>,
        side: JoinSide,
    ) -> Result<Vec<R>> {
        let binder = FieldBinder::<R>::new()?;
        let plan = spec.plan(side)?;
        let set = self.fetch(&plan.statement)?;
        set.rows
            .iter()
            .map(|row| binder.hydrate_join(&plan.result_columns, row, plan.own.clone()))
            .collect()
    }

    fn fetch(&mut self, statement: &Statement) -> Result<ResultSet> {
        debug!(sql = %statement.sql, params = statement.params.len(), "Running query");
        let set = self.conn.query(&statement.sql, &statement.params)?;
        debug!(rows = set.len(), "Query returned");
        Ok(set)
    }

    fn execute(&mut self, statement: &Statement) -> Result<u64> {
        debug!(sql = %statement.sql, params = statement.params.len(), "Running statement");
        let count = self.conn.execute(&statement.sql, &statement.params)?;
        debug!(count, "Statement affected rows");
        Ok(count)
    }

    /// Writes the connection's last insert id into an unset integer key once
    /// the insert stored at least one row.
    fn assign_generated_key<E: Entity>(&mut self, entity: &mut E, count: u64) -> Result<()> {
        let field = E::schema()?.key_field();
        if count == 0 || !field.get(entity).is_null() || field.data_type() != DataType::Int64 {
            return Ok(());
        }
        if let Some(id) = self.conn.last_insert_id() {
            field
                .set(entity, Value::Int64(id))
                .map_err(|source| AdapterError::Hydration {
                    field: field.name().to_owned(),
                    source,
                })?;
        }
        Ok(())
    }

    fn record<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let result = op(self);
        self.capture(result)
    }

    fn capture<T>(&mut self, result: Result<T>) -> Result<T> {
        if let Err(err) = &result {
            warn!(error = %err, "Adapter operation failed");
            self.last_error = Some(err.clone());
        }
        result
    }
}

fn hydrate_all<E: Entity>(binder: &FieldBinder<E>, set: &ResultSet) -> Result<Vec<E>> {
    set.rows
        .iter()
        .map(|row| binder.hydrate(&set.columns, row))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        db::sqlite::SqliteConnection,
        testing::{self, Broken, Order, OrderItem, RecordingConnection, User},
    };

    fn adapter() -> Adapter<SqliteConnection> {
        Adapter::new(testing::sqlite())
    }

    fn user(name: &str, age: i64) -> User {
        User {
            id: None,
            name: Some(name.into()),
            age: Some(age),
        }
    }

    fn seed_users(adapter: &mut Adapter<SqliteConnection>, count: i64) {
        for idx in 1..=count {
            let mut user = user(&format!("user{idx}"), 20 + idx);
            adapter.insert(&mut user, Some("name, age")).unwrap();
        }
    }

    #[test]
    fn test_insert_then_select() {
        let mut adapter = adapter();
        let mut alice = user("Alice", 30);

        assert_eq!(adapter.insert(&mut alice, Some("name,age")).unwrap(), 1);
        assert_eq!(alice.id, Some(1));

        let found = adapter.select(&User::default(), "age > 18").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name.as_deref(), Some("Alice"));
        assert_eq!(found[0], alice);
    }

    #[test]
    fn test_insert_issues_one_statement_with_two_params() {
        let mut adapter = Adapter::new(RecordingConnection::default());
        let mut alice = user("Alice", 30);

        assert_eq!(adapter.insert(&mut alice, Some("name,age")).unwrap(), 1);
        let statements = &adapter.connection().statements;
        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].0, "INSERT INTO users (name, age) VALUES (?, ?)");
        assert_eq!(statements[0].1.len(), 2);
        // The recording connection reports no generated key.
        assert_eq!(alice.id, None);
    }

    #[test]
    fn test_load_round_trip() {
        let mut adapter = adapter();
        let mut bob = user("Bob", 44);
        adapter.insert(&mut bob, None).unwrap();

        let mut loaded = User {
            id: bob.id,
            ..User::default()
        };
        assert!(adapter.load(&mut loaded).unwrap());
        assert_eq!(loaded, bob);
    }

    #[test]
    fn test_load_not_found_leaves_entity() {
        let mut adapter = adapter();
        let mut ghost = User {
            id: Some(99),
            name: Some("Ghost".into()),
            age: None,
        };

        assert!(!adapter.load(&mut ghost).unwrap());
        assert_eq!(ghost.name.as_deref(), Some("Ghost"));
        assert!(adapter.last_error().is_none());
    }

    #[test]
    fn test_load_without_key_issues_no_sql() {
        let mut adapter = Adapter::new(RecordingConnection::default());
        let mut nobody = User::default();

        assert!(!adapter.load(&mut nobody).unwrap());
        assert!(adapter.connection().statements.is_empty());
    }

    #[test]
    fn test_unknown_column_rejected_before_sql() {
        let mut adapter = Adapter::new(RecordingConnection::default());

        let err = adapter.select(&User::default(), "salary > 10").unwrap_err();
        assert!(err.is_validation());
        assert!(adapter.connection().statements.is_empty());
        assert_eq!(
            adapter.last_error().map(ToString::to_string),
            Some(err.to_string())
        );
    }

    #[test]
    fn test_update_and_delete_by_key() {
        let mut adapter = adapter();
        let mut carol = user("Carol", 20);
        adapter.insert(&mut carol, None).unwrap();
        adapter.insert(&mut user("Dan", 50), None).unwrap();

        carol.age = Some(21);
        assert_eq!(adapter.update(&carol, Some("age"), None).unwrap(), 1);

        let mut check = User {
            id: carol.id,
            ..User::default()
        };
        adapter.load(&mut check).unwrap();
        assert_eq!(check.age, Some(21));

        assert_eq!(adapter.delete(&carol, None).unwrap(), 1);
        assert!(!adapter.load(&mut check).unwrap());
        assert_eq!(adapter.select(&User::default(), Query::new()).unwrap().len(), 1);
    }

    #[test]
    fn test_update_without_key_issues_no_sql() {
        let mut adapter = Adapter::new(RecordingConnection::default());
        let err = adapter
            .update(&user("Eve", 33), Some("age"), None)
            .unwrap_err();
        assert!(matches!(err, AdapterError::Validation(_)));

        let err = adapter.delete(&User::default(), None).unwrap_err();
        assert!(matches!(err, AdapterError::Validation(_)));
        assert!(adapter.connection().statements.is_empty());
    }

    #[test]
    fn test_pagination_pages() {
        let mut adapter = adapter();
        seed_users(&mut adapter, 25);
        let all = User::default();

        let first = adapter
            .select(&all, Query::new().order("id").page(0, 10))
            .unwrap();
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].id, Some(1));

        let second = adapter
            .select(&all, Query::new().order("id").page(1, 10))
            .unwrap();
        let ids = second.iter().filter_map(|user| user.id).collect::<Vec<_>>();
        assert_eq!(ids, (11..=20).collect::<Vec<_>>());

        let everything = adapter.select(&all, Query::new().order("id")).unwrap();
        assert_eq!(everything.len(), 25);
    }

    #[test]
    fn test_select_with_choice_leaves_other_fields_default() {
        let mut adapter = adapter();
        seed_users(&mut adapter, 2);

        let names = adapter
            .select(&User::default(), Query::new().choice("name").order("name DESC"))
            .unwrap();
        assert_eq!(names.len(), 2);
        assert_eq!(names[0].name.as_deref(), Some("user2"));
        assert_eq!(names[0].id, None);
    }

    #[test]
    fn test_batch_update() {
        let mut adapter = adapter();
        seed_users(&mut adapter, 2);

        adapter.start_batch();
        adapter.add_batch("UPDATE users SET age=31 WHERE id=1").unwrap();
        adapter.add_batch("UPDATE users SET age=32 WHERE id=2").unwrap();
        assert_eq!(adapter.batch_update().unwrap(), vec![1, 1]);
        assert!(adapter.batch.is_empty());

        let ages = adapter
            .select(&User::default(), Query::new().order("id"))
            .unwrap()
            .into_iter()
            .filter_map(|user| user.age)
            .collect::<Vec<_>>();
        assert_eq!(ages, vec![31, 32]);
    }

    #[test]
    fn test_add_batch_requires_start() {
        let mut adapter = adapter();
        let err = adapter.add_batch("DELETE FROM users").unwrap_err();
        assert!(err.is_validation());
        assert!(adapter.last_error().is_some());
    }

    #[test]
    fn test_batch_needs_supporting_connection() {
        let mut adapter = Adapter::new(RecordingConnection::default());
        adapter.start_batch();
        adapter.add_batch("DELETE FROM users").unwrap();

        let err = adapter.batch_update().unwrap_err();
        assert!(matches!(err, AdapterError::Unsupported(_)));
        assert!(adapter.batch.is_empty());
    }

    #[test]
    fn test_database_error_is_recorded() {
        let mut adapter = adapter();
        let err = adapter.update_query_raw("UPDATE missing SET x = 1").unwrap_err();

        assert!(matches!(err, AdapterError::Database(_)));
        assert!(matches!(
            adapter.last_error(),
            Some(AdapterError::Database(_))
        ));

        adapter.clear_last_error();
        assert!(adapter.last_error().is_none());
    }

    #[test]
    fn test_raw_paths_unsupported() {
        let mut adapter = Adapter::new(RecordingConnection::default());
        let err = adapter.select_query_raw("SELECT 1").unwrap_err();
        assert!(matches!(err, AdapterError::Unsupported(_)));
        assert!(matches!(
            adapter.last_error(),
            Some(AdapterError::Unsupported(_))
        ));
    }

    #[test]
    fn test_query_with_bindings() {
        let mut adapter = adapter();
        seed_users(&mut adapter, 3);

        let probe = User {
            age: Some(22),
            ..User::default()
        };
        let found = adapter
            .query(&probe, "SELECT * FROM users WHERE age >= :age ORDER BY id")
            .unwrap();
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].name.as_deref(), Some("user2"));

        let set = adapter
            .select_query(&probe, "SELECT COUNT(*) AS n FROM users WHERE age = :age")
            .unwrap();
        assert_eq!(set.columns, vec!["n"]);
        assert_eq!(set.rows, vec![vec![Value::Int64(1)]]);

        let changed = adapter
            .update_query(&probe, "UPDATE users SET age = age + 1 WHERE age = :age")
            .unwrap();
        assert_eq!(changed, 1);
    }

    #[test]
    fn test_insert_queries_assign_key() {
        let mut adapter = adapter();

        let mut frank = user("Frank", 60);
        adapter
            .insert_query(&mut frank, "INSERT INTO users (name, age) VALUES (:name, :age)")
            .unwrap();
        assert_eq!(frank.id, Some(1));

        let mut gina = User::default();
        adapter
            .insert_query_raw(&mut gina, "INSERT INTO users (name) VALUES ('Gina')")
            .unwrap();
        assert_eq!(gina.id, Some(2));
    }

    #[test]
    fn test_empty_insert_leaves_key_unset() {
        let mut adapter = adapter();
        adapter.insert(&mut user("Alice", 30), None).unwrap();

        let mut nobody = User::default();
        let count = adapter
            .insert_query_raw(&mut nobody, "INSERT INTO users (name) SELECT name FROM users WHERE 0")
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(nobody.id, None);
    }

    #[test]
    fn test_update_without_list_keeps_unset_columns() {
        let mut adapter = adapter();
        let mut hank = user("Hank", 40);
        adapter.insert(&mut hank, None).unwrap();

        let older = User {
            id: hank.id,
            name: None,
            age: Some(41),
        };
        assert_eq!(adapter.update(&older, None, None).unwrap(), 1);

        let mut check = User {
            id: hank.id,
            ..User::default()
        };
        adapter.load(&mut check).unwrap();
        assert_eq!(check.name.as_deref(), Some("Hank"));
        assert_eq!(check.age, Some(41));
    }

    #[test]
    fn test_later_failure_replaces_last_error() {
        let mut adapter = adapter();

        adapter.update_query_raw("UPDATE missing SET x = 1").unwrap_err();
        assert!(matches!(
            adapter.last_error(),
            Some(AdapterError::Database(_))
        ));

        adapter.select(&User::default(), "salary > 10").unwrap_err();
        assert!(matches!(
            adapter.last_error(),
            Some(AdapterError::Dialect(_))
        ));
    }

    fn seed_orders(adapter: &mut Adapter<SqliteConnection>, count: i64) {
        for idx in 1..=count {
            let mut order = Order {
                customer: Some(format!("customer{idx}")),
                total: Some(idx as f64 * 10.0),
                ..Order::default()
            };
            adapter.insert(&mut order, None).unwrap();

            let mut item = OrderItem {
                order_id: order.id,
                product: Some(format!("product{idx}")),
                quantity: Some(idx),
                ..OrderItem::default()
            };
            adapter.insert(&mut item, Some("order_id, product, quantity")).unwrap();
        }
    }

    #[test]
    fn test_join_latest_pages_orders() {
        let mut adapter = adapter();
        seed_orders(&mut adapter, 7);

        let order = Order::default();
        let item = OrderItem::default();
        let orders = adapter
            .join_latest(
                JoinSpec::new(&order, &item, "order_id")
                    .foreign_choice("product, quantity")
                    .page(0, 5),
            )
            .unwrap();

        assert_eq!(orders.len(), 5);
        let ids = orders.iter().filter_map(|order| order.id).collect::<Vec<_>>();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
        assert_eq!(
            orders[0].extras.get("product"),
            Some(&Value::Text("product7".into()))
        );
        assert_eq!(orders[0].extras.get("quantity"), Some(&Value::Int64(7)));
        assert_eq!(orders[0].customer.as_deref(), Some("customer7"));
    }

    #[test]
    fn test_foreign_join_hydrates_items() {
        let mut adapter = adapter();
        seed_orders(&mut adapter, 3);

        let order = Order {
            id: Some(2),
            ..Order::default()
        };
        let item = OrderItem::default();
        let items = adapter
            .foreign_join(
                &JoinSpec::new(&order, &item, "order_id")
                    .primary_choice("customer_name AS customer")
                    .filter("orders.id = :id"),
            )
            .unwrap();

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product.as_deref(), Some("product2"));
        assert_eq!(
            items[0].extras.get("customer"),
            Some(&Value::Text("customer2".into()))
        );
    }

    #[test]
    fn test_broken_schema_fails_every_call() {
        let mut adapter = Adapter::new(RecordingConnection::default());
        let err = adapter.select(&Broken::default(), Query::new()).unwrap_err();
        assert!(matches!(err, AdapterError::Schema(_)));
        assert!(adapter.connection().statements.is_empty());
    }

    #[test]
    fn test_view_all() {
        let mut adapter = adapter();
        seed_users(&mut adapter, 2);
        let users = adapter
            .select(&User::default(), Query::new().order("id"))
            .unwrap();

        let views = adapter.view_all(&users, Some("name")).unwrap();
        assert_eq!(
            serde_json::to_string(&views).unwrap(),
            r#"[{"name":"user1"},{"name":"user2"}]"#
        );
        assert!(adapter.view(&users[0], Some("secret")).is_err());
    }
}
