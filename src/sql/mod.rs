pub(crate) mod binding;
pub(crate) mod compiler;
pub(crate) mod keyword;
pub(crate) mod lexer;
pub(crate) mod operator;
pub(crate) mod pagination;
pub(crate) mod parser;
pub(crate) mod statement;
