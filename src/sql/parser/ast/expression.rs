use std::fmt;

use crate::sql::{
    operator::{COMPARISON_PRECEDENCE, Operator, UnaryOperator},
    parser::Literal,
};

/// A column reference, optionally qualified with its table (`orders.id`).
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnRef<'src> {
    pub table: Option<&'src str>,
    pub name: &'src str,

    /// Byte offset of the reference in the fragment.
    pub offset: usize,
    pub len: usize,
}

impl fmt::Display for ColumnRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.table {
            Some(table) => write!(f, "{table}.{}", self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// An expression in a WHERE clause.
///
/// Expressions form a tree structure representing the filtering logic.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression<'src> {
    /// Column reference (e.g., `age`, `users.name`)
    Column(ColumnRef<'src>),

    /// Literal value (e.g., `25`, `'Alice'`)
    Literal(Literal<'src>),

    /// Field of the bound entity (e.g., `:id`)
    Binding {
        name: &'src str,
        offset: usize,
        len: usize,
    },

    Unary {
        op: UnaryOperator,
        expr: Box<Expression<'src>>,
    },

    BinaryOp {
        left: Box<Expression<'src>>,
        op: Operator,
        right: Box<Expression<'src>>,
    },

    Is {
        expr: Box<Expression<'src>>,
        predicate: IsPredicate,
        is_negated: bool,
    },

    Like {
        expr: Box<Expression<'src>>,
        pattern: Box<Expression<'src>>,
        is_negated: bool,
    },

    InList {
        expr: Box<Expression<'src>>,
        list: Vec<Expression<'src>>,
        is_negated: bool,
    },

    Between {
        expr: Box<Expression<'src>>,
        low: Box<Expression<'src>>,
        high: Box<Expression<'src>>,
        is_negated: bool,
    },
}

impl Expression<'_> {
    /// Binding power of the expression's outermost operator. Leaves bind
    /// tightest and never need parentheses.
    pub fn precedence(&self) -> u8 {
        match self {
            Expression::Column(_) | Expression::Literal(_) | Expression::Binding { .. } => u8::MAX,
            Expression::Unary { op, .. } => op.precedence(),
            Expression::BinaryOp { op, .. } => op.precedence(),
            Expression::Is { .. }
            | Expression::Like { .. }
            | Expression::InList { .. }
            | Expression::Between { .. } => COMPARISON_PRECEDENCE,
        }
    }
}

/// Predicates to the 'IS' keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IsPredicate {
    True,
    False,
    Null,
}

impl fmt::Display for IsPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IsPredicate::True => write!(f, "TRUE"),
            IsPredicate::False => write!(f, "FALSE"),
            IsPredicate::Null => write!(f, "NULL"),
        }
    }
}
