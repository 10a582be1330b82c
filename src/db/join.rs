use std::ops::Range;

use crate::{
    Entity,
    common::error::{AdapterError, Result},
    sql::{
        compiler::{ClauseKind, EntityBindings, Scope, TableScope, compile},
        pagination::Pagination,
        statement::{Statement, append_clauses},
    },
};

/// The side of a join whose type the rows are hydrated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    Primary,
    Foreign,
}

/// A one-to-many inner join from `primary` to `foreign`, where the foreign
/// table holds a column referencing the primary key.
///
/// Both entities provide `:name` bindings for the WHERE clause, the primary
/// entity first.
#[derive(Debug, Clone)]
pub struct JoinSpec<'a, P, F> {
    primary: &'a P,
    foreign: &'a F,
    foreign_key: &'a str,
    where_clause: Option<&'a str>,
    primary_choice: Option<&'a str>,
    foreign_choice: Option<&'a str>,
    order: Option<&'a str>,
    group: Option<&'a str>,
    pagination: Pagination,
    newest_first: bool,
}

/// A planned join statement and the names of the columns it returns.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinPlan {
    pub statement: Statement,
    pub result_columns: Vec<String>,

    /// Positions of the columns selected from the result side.
    pub own: Range<usize>,
}

impl<'a, P: Entity, F: Entity> JoinSpec<'a, P, F> {
    pub fn new(primary: &'a P, foreign: &'a F, foreign_key: &'a str) -> Self {
        Self {
            primary,
            foreign,
            foreign_key,
            where_clause: None,
            primary_choice: None,
            foreign_choice: None,
            order: None,
            group: None,
            pagination: Pagination::All,
            newest_first: false,
        }
    }

    pub fn filter(mut self, where_clause: &'a str) -> Self {
        self.where_clause = Some(where_clause);
        self
    }

    pub fn primary_choice(mut self, choice: &'a str) -> Self {
        self.primary_choice = Some(choice);
        self
    }

    pub fn foreign_choice(mut self, choice: &'a str) -> Self {
        self.foreign_choice = Some(choice);
        self
    }

    pub fn order(mut self, order: &'a str) -> Self {
        self.order = Some(order);
        self
    }

    pub fn group(mut self, group: &'a str) -> Self {
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

    /// Orders by the primary key, descending, unless an order is given.
    pub fn newest_first(mut self) -> Self {
        self.newest_first = true;
        self
    }

    pub fn plan(&self, result: JoinSide) -> Result<JoinPlan> {
        let primary = P::schema()?;
        let foreign = F::schema()?;

        if primary.table().eq_ignore_ascii_case(foreign.table()) {
            return Err(AdapterError::validation(format!(
                "Cannot join `{}` to itself",
                primary.table()
            )));
        }
        let Some(foreign_key) = foreign.field_by_column(self.foreign_key) else {
            return Err(AdapterError::validation(format!(
                "Foreign key `{}` is not a column of `{}`",
                self.foreign_key,
                foreign.table()
            )));
        };

        let primary_scope = Scope::new(TableScope::of(primary)).qualified();
        let foreign_scope = Scope::new(TableScope::of(foreign)).qualified();
        let (primary_default, foreign_default) = match result {
            JoinSide::Primary => (Some("*"), None),
            JoinSide::Foreign => (None, Some("*")),
        };
        let primary_choice = compile(
            ClauseKind::Choice,
            self.primary_choice.or(primary_default),
            &primary_scope,
        )?;
        let foreign_choice = compile(
            ClauseKind::Choice,
            self.foreign_choice.or(foreign_default),
            &foreign_scope,
        )?;

        let bindings = (
            EntityBindings::new(primary, self.primary),
            EntityBindings::new(foreign, self.foreign),
        );
        let scope = Scope::joined(TableScope::of(primary), TableScope::of(foreign))
            .with_bindings(&bindings);

        let default_order = format!("{}.{} DESC", primary.table(), primary.key());
        let order = match self.order {
            Some(order) => Some(order),
            None if self.newest_first => Some(default_order.as_str()),
            None => None,
        };

        let where_clause = compile(ClauseKind::Where, self.where_clause, &scope)?;
        let group = compile(ClauseKind::Group, self.group, &scope)?;
        let order = compile(ClauseKind::Order, order, &scope)?;

        let mut select = Vec::new();
        let mut result_columns = Vec::new();
        let mut primary_len = 0;
        for (idx, choice) in [primary_choice, foreign_choice].into_iter().enumerate() {
            if let Some(choice) = choice {
                if idx == 0 {
                    primary_len = choice.outputs.len();
                }
                select.push(choice.sql);
                result_columns.extend(choice.outputs);
            }
        }
        let own = match result {
            JoinSide::Primary => 0..primary_len,
            JoinSide::Foreign => primary_len..result_columns.len(),
        };

        let mut sql = format!(
            "SELECT {} FROM {p} INNER JOIN {f} ON {p}.{} = {f}.{}",
            select.join(", "),
            primary.key(),
            foreign_key.column(),
            p = primary.table(),
            f = foreign.table(),
        );
        let params = append_clauses(&mut sql, where_clause, group, order, self.pagination)?;

        Ok(JoinPlan {
            statement: Statement::new(sql, params),
            result_columns,
            own,
        })
    }
}
