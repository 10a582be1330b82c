use crate::{
    Schema,
    common::error::DialectError,
    core::types::Value,
    sql::{
        operator::{COMPARISON_PRECEDENCE, UnaryOperator},
        parser::{ChoiceTarget, ColumnRef, DialectParser, Direction, Expression},
    },
};

type Result<T, E = DialectError> = std::result::Result<T, E>;

/// The SQL clause a dialect fragment is compiled into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClauseKind {
    Where,
    Order,
    Group,
    Choice,
}

/// A compiled dialect fragment.
#[derive(Debug, Clone, PartialEq)]
pub struct ClauseDescriptor {
    pub kind: ClauseKind,

    /// Every column the fragment references, as rendered.
    pub columns: Vec<String>,

    /// SQL text with `?` placeholders.
    pub sql: String,

    /// Values for the placeholders, in order.
    pub params: Vec<Value>,

    /// Output column names of a CHOICE list (aliases where given).
    pub outputs: Vec<String>,
}

/// Source of values for `:name` bindings.
pub trait Bindings {
    fn binding(&self, name: &str) -> Option<Value>;
}

/// Binds `:name` to the current value of a field of `entity`, looked up by
/// field name first and column name second.
pub struct EntityBindings<'a, E> {
    schema: &'a Schema<E>,
    entity: &'a E,
}

impl<'a, E> EntityBindings<'a, E> {
    pub fn new(schema: &'a Schema<E>, entity: &'a E) -> Self {
        Self { schema, entity }
    }
}

impl<E> Bindings for EntityBindings<'_, E> {
    fn binding(&self, name: &str) -> Option<Value> {
        self.schema
            .resolve(name)
            .map(|field| field.get(self.entity))
    }
}

impl<A: Bindings, B: Bindings> Bindings for (A, B) {
    fn binding(&self, name: &str) -> Option<Value> {
        self.0.binding(name).or_else(|| self.1.binding(name))
    }
}

/// The column allowlist of one table.
#[derive(Debug, Clone)]
pub struct TableScope<'a> {
    pub table: &'a str,
    pub columns: Vec<&'a str>,
}

impl<'a> TableScope<'a> {
    pub fn of<E>(schema: &'a Schema<E>) -> Self {
        Self {
            table: schema.table(),
            columns: schema.columns().collect(),
        }
    }

    fn find(&self, name: &str) -> Option<&'a str> {
        self.columns
            .iter()
            .copied()
            .find(|column| column.eq_ignore_ascii_case(name))
    }
}

/// Everything a fragment may refer to.
///
/// Bare columns resolve against the tables in order. With `qualify` set,
/// every rendered column carries its table name, which keeps join
/// statements unambiguous.
pub struct Scope<'a> {
    tables: Vec<TableScope<'a>>,
    bindings: Option<&'a dyn Bindings>,
    qualify: bool,
}

impl<'a> Scope<'a> {
    pub fn new(table: TableScope<'a>) -> Self {
        Self {
            tables: vec![table],
            bindings: None,
            qualify: false,
        }
    }

    pub fn joined(primary: TableScope<'a>, foreign: TableScope<'a>) -> Self {
        Self {
            tables: vec![primary, foreign],
            bindings: None,
            qualify: true,
        }
    }

    pub fn qualified(mut self) -> Self {
        self.qualify = true;
        self
    }

    pub fn with_bindings(mut self, bindings: &'a dyn Bindings) -> Self {
        self.bindings = Some(bindings);
        self
    }
}

/// Compiles one dialect fragment against `scope`.
///
/// Missing or blank input yields `None` so the caller can leave the clause out
/// entirely. Unknown columns, unknown tables and unknown bindings are rejected
/// here, before any statement is built.
pub fn compile(
    kind: ClauseKind,
    raw: Option<&str>,
    scope: &Scope<'_>,
) -> Result<Option<ClauseDescriptor>> {
    let Some(src) = raw.filter(|text| !text.trim().is_empty()) else {
        return Ok(None);
    };

    let mut parser = DialectParser::new(src);
    let mut renderer = Renderer {
        src,
        scope,
        sql: String::new(),
        params: Vec::new(),
        columns: Vec::new(),
        outputs: Vec::new(),
    };

    match kind {
        ClauseKind::Where => {
            let expr = parser.parse_predicate()?;
            renderer.expression(&expr)?;
        }
        ClauseKind::Order => {
            for (idx, target) in parser.parse_order_list()?.iter().enumerate() {
                renderer.separator(idx);
                renderer.column(&target.column)?;
                match target.direction {
                    Some(Direction::Asc) => renderer.sql.push_str(" ASC"),
                    Some(Direction::Desc) => renderer.sql.push_str(" DESC"),
                    Some(Direction::Other(word)) => {
                        renderer.sql.push(' ');
                        renderer.sql.push_str(word);
                    }
                    None => {}
                }
            }
        }
        ClauseKind::Group => {
            for (idx, column) in parser.parse_group_list()?.iter().enumerate() {
                renderer.separator(idx);
                renderer.column(column)?;
            }
        }
        ClauseKind::Choice => {
            let mut idx = 0;
            for target in parser.parse_choice_list()? {
                match target {
                    ChoiceTarget::Star { table, offset } => {
                        for (table, column) in renderer.star(table, offset)? {
                            renderer.separator(idx);
                            renderer.push_column(table, column);
                            renderer.outputs.push(column.to_owned());
                            idx += 1;
                        }
                    }
                    ChoiceTarget::Column { column, alias } => {
                        renderer.separator(idx);
                        let name = renderer.column(&column)?;
                        if let Some(alias) = alias {
                            renderer.sql.push_str(&format!(" AS {alias}"));
                        }
                        renderer.outputs.push(alias.unwrap_or(name).to_owned());
                        idx += 1;
                    }
                }
            }
        }
    }

    Ok(Some(ClauseDescriptor {
        kind,
        columns: renderer.columns,
        sql: renderer.sql,
        params: renderer.params,
        outputs: renderer.outputs,
    }))
}

struct Renderer<'a, 's> {
    src: &'a str,
    scope: &'a Scope<'s>,
    sql: String,
    params: Vec<Value>,
    columns: Vec<String>,
    outputs: Vec<String>,
}

impl<'s> Renderer<'_, 's> {
    fn separator(&mut self, idx: usize) {
        if idx > 0 {
            self.sql.push_str(", ");
        }
    }

    fn error(&self, message: String, offset: usize, len: usize) -> DialectError {
        DialectError::new(message, self.src, offset, len)
    }

    /// Resolves a column reference against the scope, returning the table it
    /// belongs to and its declared spelling.
    fn resolve(&self, column: &ColumnRef<'_>) -> Result<(&'s str, &'s str)> {
        match column.table {
            Some(table) => {
                let Some(scope) = self
                    .scope
                    .tables
                    .iter()
                    .find(|scope| scope.table.eq_ignore_ascii_case(table))
                else {
                    return Err(self.error(
                        format!("Unknown table `{table}`"),
                        column.offset,
                        table.len(),
                    ));
                };
                scope
                    .find(column.name)
                    .map(|name| (scope.table, name))
                    .ok_or_else(|| {
                        self.error(
                            format!("Unknown column `{column}`"),
                            column.offset,
                            column.len,
                        )
                    })
            }
            None => self
                .scope
                .tables
                .iter()
                .find_map(|scope| scope.find(column.name).map(|name| (scope.table, name)))
                .ok_or_else(|| {
                    self.error(
                        format!("Unknown column `{column}`"),
                        column.offset,
                        column.len,
                    )
                }),
        }
    }

    /// Renders a validated column and returns its declared name.
    fn column(&mut self, column: &ColumnRef<'_>) -> Result<&'s str> {
        let (table, name) = self.resolve(column)?;
        self.push_column(table, name);
        Ok(name)
    }

    fn push_column(&mut self, table: &str, name: &str) {
        if self.scope.qualify {
            let qualified = format!("{table}.{name}");
            self.sql.push_str(&qualified);
            self.columns.push(qualified);
        } else {
            self.sql.push_str(name);
            self.columns.push(name.to_owned());
        }
    }

    fn star(&self, table: Option<&str>, offset: usize) -> Result<Vec<(&'s str, &'s str)>> {
        let tables = self
            .scope
            .tables
            .iter()
            .filter(|scope| table.is_none_or(|table| scope.table.eq_ignore_ascii_case(table)))
            .collect::<Vec<_>>();

        if let (Some(table), true) = (table, tables.is_empty()) {
            return Err(self.error(format!("Unknown table `{table}`"), offset, table.len()));
        }

        Ok(tables
            .into_iter()
            .flat_map(|scope| scope.columns.iter().map(|column| (scope.table, *column)))
            .collect())
    }

    fn expression(&mut self, expr: &Expression<'_>) -> Result<()> {
        match expr {
            Expression::Column(column) => {
                self.column(column)?;
            }
            Expression::Literal(literal) => {
                self.sql.push_str(&literal.to_string());
            }
            Expression::Binding { name, offset, len } => {
                let Some(bindings) = self.scope.bindings else {
                    return Err(self.error(
                        format!("Binding `:{name}` is not available in this clause"),
                        *offset,
                        *len,
                    ));
                };
                let Some(value) = bindings.binding(name) else {
                    return Err(self.error(format!("Unknown binding `:{name}`"), *offset, *len));
                };
                self.sql.push('?');
                self.params.push(value);
            }
            Expression::Unary {
                op: UnaryOperator::Not,
                expr: operand,
            } => {
                self.sql.push_str("NOT ");
                self.child(operand, operand.precedence() < expr.precedence())?;
            }
            Expression::Unary {
                op: UnaryOperator::Negate,
                expr: operand,
            } => {
                self.sql.push('-');
                let is_leaf = matches!(
                    &**operand,
                    Expression::Column(_) | Expression::Binding { .. }
                );
                self.child(operand, !is_leaf)?;
            }
            Expression::BinaryOp { left, op, right } => {
                let prec = op.precedence();
                self.child(left, left.precedence() < prec)?;
                self.sql.push_str(&format!(" {} ", op.to_symbol()));
                self.child(right, right.precedence() <= prec)?;
            }
            Expression::Is {
                expr,
                predicate,
                is_negated,
            } => {
                self.operand(expr)?;
                self.sql.push_str(if *is_negated { " IS NOT " } else { " IS " });
                self.sql.push_str(&predicate.to_string());
            }
            Expression::Like {
                expr,
                pattern,
                is_negated,
            } => {
                self.operand(expr)?;
                self.sql.push_str(if *is_negated { " NOT LIKE " } else { " LIKE " });
                self.operand(pattern)?;
            }
            Expression::InList {
                expr,
                list,
                is_negated,
            } => {
                self.operand(expr)?;
                self.sql.push_str(if *is_negated { " NOT IN (" } else { " IN (" });
                for (idx, item) in list.iter().enumerate() {
                    self.separator(idx);
                    self.expression(item)?;
                }
                self.sql.push(')');
            }
            Expression::Between {
                expr,
                low,
                high,
                is_negated,
            } => {
                self.operand(expr)?;
                self.sql
                    .push_str(if *is_negated { " NOT BETWEEN " } else { " BETWEEN " });
                self.operand(low)?;
                self.sql.push_str(" AND ");
                self.operand(high)?;
            }
        }

        Ok(())
    }

    /// Operand of IS/LIKE/IN/BETWEEN. Anything at comparison level or looser
    /// is wrapped.
    fn operand(&mut self, expr: &Expression<'_>) -> Result<()> {
        self.child(expr, expr.precedence() <= COMPARISON_PRECEDENCE)
    }

    fn child(&mut self, expr: &Expression<'_>, parenthesize: bool) -> Result<()> {
        if parenthesize {
            self.sql.push('(');
            self.expression(expr)?;
            self.sql.push(')');
        } else {
            self.expression(expr)?;
        }
        Ok(())
    }
}
