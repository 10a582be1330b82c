use std::{borrow::Cow, fmt};

/// A literal value written in a dialect fragment.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal<'src> {
    Int64(i64),
    Float64(f64),
    Text(Cow<'src, str>),
    Bool(bool),
    Null,
}

/// Renders the literal back as SQL text, re-escaping quotes in strings.
impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Int64(num) => write!(f, "{num}"),
            Literal::Float64(num) if num.fract() == 0.0 && num.is_finite() => write!(f, "{num:.1}"),
            Literal::Float64(num) => write!(f, "{num}"),
            Literal::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Bool(true) => write!(f, "TRUE"),
            Literal::Bool(false) => write!(f, "FALSE"),
            Literal::Null => write!(f, "NULL"),
        }
    }
}
