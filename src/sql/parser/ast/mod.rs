pub(crate) use expression::*;
pub(crate) use target::*;

pub(crate) mod expression;
pub(crate) mod target;
