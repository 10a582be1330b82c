use std::fmt;

/// Binary operators allowed in a WHERE clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    /// Equality (=)
    Equal,
    NotEqual,

    /// Logical AND
    And,
    /// Logical OR
    Or,

    /// Greater than (>)
    GreaterThan,
    GreaterThanEqual,

    /// Less than (<)
    LessThan,
    LessThanEqual,

    Add,
    Multiply,
    Divide,
    Subtract,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_symbol())
    }
}

impl Operator {
    pub fn to_symbol(self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::GreaterThan => ">",
            Operator::GreaterThanEqual => ">=",
            Operator::LessThan => "<",
            Operator::LessThanEqual => "<=",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    /// Returns the binding power (precedence) of this operator.
    ///
    /// Operators with a higher number bind tighter. The values line up with
    /// SQL's own ordering so a rendered clause means what was parsed.
    pub fn precedence(self) -> u8 {
        match self {
            Operator::Or => 2,
            Operator::And => 3,
            Operator::NotEqual
            | Operator::Equal
            | Operator::LessThan
            | Operator::LessThanEqual
            | Operator::GreaterThan
            | Operator::GreaterThanEqual => COMPARISON_PRECEDENCE,
            Operator::Add | Operator::Subtract => 7,
            Operator::Multiply | Operator::Divide => 10,
        }
    }
}

/// Binding power of prefix `NOT`: looser than comparisons, tighter than AND.
pub const NOT_PRECEDENCE: u8 = 4;

/// Binding power shared by comparisons and the IS/LIKE/IN/BETWEEN postfixes.
pub const COMPARISON_PRECEDENCE: u8 = 5;

/// Binding power of unary minus.
pub const NEGATE_PRECEDENCE: u8 = 12;

/// Prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Negate,
}

impl UnaryOperator {
    pub fn precedence(self) -> u8 {
        match self {
            UnaryOperator::Not => NOT_PRECEDENCE,
            UnaryOperator::Negate => NEGATE_PRECEDENCE,
        }
    }
}
