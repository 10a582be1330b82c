use std::iter::Peekable;

use crate::{
    common::error::DialectError,
    sql::{
        keyword::Keyword,
        lexer::{Lexeme, Lexer, Token},
        operator::{COMPARISON_PRECEDENCE, NEGATE_PRECEDENCE, NOT_PRECEDENCE, Operator, UnaryOperator},
    },
};

pub(crate) use ast::*;
pub(crate) use literal::Literal;

pub(crate) mod ast;
pub(crate) mod literal;

type Result<T> = std::result::Result<T, DialectError>;

/// What can follow a complete operand inside an expression.
#[derive(Debug, Clone, Copy)]
enum Infix {
    Binary(Operator),

    /// IS, LIKE, IN, BETWEEN, or NOT introducing one of the last three.
    Postfix,
}

/// Parser for dialect fragments.
///
/// Uses recursive descent with precedence climbing over a peekable token
/// stream. Each entry point consumes the whole fragment; trailing tokens are
/// an error.
pub(crate) struct DialectParser<'src> {
    src: &'src str,

    /// Token stream from the lexer
    lexer: Peekable<Lexer<'src>>,
}

impl<'src> DialectParser<'src> {
    pub fn new(fragment: &'src str) -> Self {
        let lexer = Lexer::new(fragment);
        Self {
            src: fragment,
            lexer: lexer.peekable(),
        }
    }

    /// Parses a WHERE fragment.
    pub fn parse_predicate(&mut self) -> Result<Expression<'src>> {
        let expr = self.parse_expression(0)?;
        self.expect_end()?;
        Ok(expr)
    }

    /// Parses `column [ASC|DESC], ...`.
    pub fn parse_order_list(&mut self) -> Result<Vec<OrderTarget<'src>>> {
        let mut targets = Vec::new();

        loop {
            let column = self.expect_column()?;

            let direction = match self.peek_token()? {
                Some(Token::Keyword(Keyword::Asc)) => Some(Direction::Asc),
                Some(Token::Keyword(Keyword::Desc)) => Some(Direction::Desc),
                Some(Token::Identifier(word)) => Some(Direction::Other(*word)),
                _ => None,
            };
            if direction.is_some() {
                self.next_lexeme()?;
            }

            targets.push(OrderTarget { column, direction });

            if !self.consume_if(&Token::Comma)? {
                break;
            }
        }

        self.expect_end()?;
        Ok(targets)
    }

    /// Parses `column, ...`.
    pub fn parse_group_list(&mut self) -> Result<Vec<ColumnRef<'src>>> {
        let mut columns = vec![self.expect_column()?];
        while self.consume_if(&Token::Comma)? {
            columns.push(self.expect_column()?);
        }

        self.expect_end()?;
        Ok(columns)
    }

    /// Parses `*` or `column [AS alias], ...`, where a column may also be
    /// `table.column` or `table.*`.
    pub fn parse_choice_list(&mut self) -> Result<ChoiceList<'src>> {
        let mut targets = Vec::new();

        loop {
            let Lexeme { token, offset, len } = self.next_lexeme()?;

            let target = match token {
                Token::Asterisk => ChoiceTarget::Star {
                    table: None,
                    offset,
                },
                Token::Identifier(first) if self.consume_if(&Token::Dot)? => {
                    let next = self.next_lexeme()?;
                    match next.token {
                        Token::Asterisk => ChoiceTarget::Star {
                            table: Some(first),
                            offset,
                        },
                        Token::Identifier(name) => {
                            let column = ColumnRef {
                                table: Some(first),
                                name,
                                offset,
                                len: next.offset + next.len - offset,
                            };
                            self.reject_call(&column)?;
                            let alias = self.parse_alias()?;
                            ChoiceTarget::Column { column, alias }
                        }
                        t => {
                            return Err(self.error(
                                format!("Expected a column name or '*', but found {t}"),
                                next.offset,
                                next.len,
                            ));
                        }
                    }
                }
                Token::Identifier(name) => {
                    let column = ColumnRef {
                        table: None,
                        name,
                        offset,
                        len,
                    };
                    self.reject_call(&column)?;
                    let alias = self.parse_alias()?;
                    ChoiceTarget::Column { column, alias }
                }
                t => {
                    return Err(self.error(
                        format!("Expected a column name or '*', but found {t}"),
                        offset,
                        len,
                    ));
                }
            };

            targets.push(target);

            if !self.consume_if(&Token::Comma)? {
                break;
            }
        }

        self.expect_end()?;
        Ok(targets)
    }

    /// Parses the field list of an insert, update or view. `*` yields `None`.
    pub fn parse_field_list(&mut self) -> Result<FieldList<'src>> {
        if self.consume_if(&Token::Asterisk)? {
            self.expect_end()?;
            return Ok(None);
        }

        let mut fields = Vec::new();
        loop {
            let Lexeme { token, offset, len } = self.next_lexeme()?;
            match token {
                Token::Identifier(name) => fields.push(FieldName { name, offset, len }),
                t => {
                    return Err(self.error(
                        format!("Expected a field name, but found {t}"),
                        offset,
                        len,
                    ));
                }
            }

            if !self.consume_if(&Token::Comma)? {
                break;
            }
        }

        self.expect_end()?;
        Ok(Some(fields))
    }

    fn parse_expression(&mut self, min_prec: u8) -> Result<Expression<'src>> {
        let mut lhs = self.parse_prefix()?;

        while let Some(infix) = self.peek_infix()? {
            let precedence = match infix {
                Infix::Binary(op) => op.precedence(),
                Infix::Postfix => COMPARISON_PRECEDENCE,
            };
            if precedence < min_prec {
                break;
            }

            lhs = match infix {
                Infix::Binary(op) => {
                    // consume op
                    self.next_lexeme()?;

                    let rhs = self.parse_expression(precedence + 1)?;
                    Expression::BinaryOp {
                        left: Box::new(lhs),
                        op,
                        right: Box::new(rhs),
                    }
                }
                Infix::Postfix => self.parse_postfix(lhs)?,
            };
        }

        Ok(lhs)
    }

    fn parse_prefix(&mut self) -> Result<Expression<'src>> {
        let Lexeme { token, offset, len } = self.next_lexeme()?;

        let expr = match token {
            Token::Keyword(Keyword::Not) => Expression::Unary {
                op: UnaryOperator::Not,
                expr: Box::new(self.parse_expression(NOT_PRECEDENCE)?),
            },
            Token::Minus => {
                let is_number = matches!(
                    self.peek_token()?,
                    Some(Token::Integer(_) | Token::Float(_))
                );
                if is_number {
                    match self.next_lexeme()?.token {
                        Token::Integer(i) => Expression::Literal(Literal::Int64(-i)),
                        Token::Float(f) => Expression::Literal(Literal::Float64(-f)),
                        _ => unreachable!("peeked a number"),
                    }
                } else {
                    Expression::Unary {
                        op: UnaryOperator::Negate,
                        expr: Box::new(self.parse_expression(NEGATE_PRECEDENCE)?),
                    }
                }
            }
            Token::Keyword(kw) if kw.is_bool_literal() => {
                Expression::Literal(Literal::Bool(matches!(kw, Keyword::True)))
            }
            Token::Keyword(Keyword::Null) => Expression::Literal(Literal::Null),
            Token::Integer(i) => Expression::Literal(Literal::Int64(i)),
            Token::Float(f) => Expression::Literal(Literal::Float64(f)),
            Token::String(s) => Expression::Literal(Literal::Text(s)),
            Token::Binding(name) => Expression::Binding { name, offset, len },
            Token::Identifier(name) => {
                let column = self.finish_column(name, offset, len)?;
                self.reject_call(&column)?;
                Expression::Column(column)
            }
            Token::LeftParen => {
                let expr = self.parse_expression(0)?;
                self.expect_token(Token::RightParen)?;
                expr
            }
            t => {
                return Err(self.error(
                    format!("Expected a column or value, but found {t}"),
                    offset,
                    len,
                ));
            }
        };

        Ok(expr)
    }

    fn parse_postfix(&mut self, expr: Expression<'src>) -> Result<Expression<'src>> {
        let Lexeme { token, offset, len } = self.next_lexeme()?;

        let (keyword, is_negated) = match token {
            Token::Keyword(Keyword::Not) => {
                let next = self.next_lexeme()?;
                match next.token {
                    Token::Keyword(kw @ (Keyword::Like | Keyword::In | Keyword::Between)) => {
                        (kw, true)
                    }
                    t => {
                        return Err(self.error(
                            format!("Expected LIKE, IN or BETWEEN after NOT, found {t}"),
                            next.offset,
                            next.len,
                        ));
                    }
                }
            }
            Token::Keyword(kw) => (kw, false),
            t => {
                return Err(self.error(format!("Expected an operator, found {t}"), offset, len));
            }
        };

        let expr = Box::new(expr);
        match keyword {
            Keyword::Is => {
                let is_negated = self.consume_if(&Token::Keyword(Keyword::Not))?;
                let next = self.next_lexeme()?;
                let predicate = match next.token {
                    Token::Keyword(Keyword::True) => IsPredicate::True,
                    Token::Keyword(Keyword::False) => IsPredicate::False,
                    Token::Keyword(Keyword::Null) => IsPredicate::Null,
                    t => {
                        return Err(self.error(
                            format!("Expected TRUE/FALSE/NULL after IS, found {t}"),
                            next.offset,
                            next.len,
                        ));
                    }
                };
                Ok(Expression::Is {
                    expr,
                    predicate,
                    is_negated,
                })
            }
            Keyword::Like => Ok(Expression::Like {
                expr,
                pattern: Box::new(self.parse_expression(COMPARISON_PRECEDENCE + 1)?),
                is_negated,
            }),
            Keyword::In => {
                self.expect_token(Token::LeftParen)?;
                let mut list = vec![self.parse_expression(0)?];
                while self.consume_if(&Token::Comma)? {
                    list.push(self.parse_expression(0)?);
                }
                self.expect_token(Token::RightParen)?;

                Ok(Expression::InList {
                    expr,
                    list,
                    is_negated,
                })
            }
            Keyword::Between => {
                let low = self.parse_expression(COMPARISON_PRECEDENCE + 1)?;
                self.expect_token(Token::Keyword(Keyword::And))?;
                let high = self.parse_expression(COMPARISON_PRECEDENCE + 1)?;

                Ok(Expression::Between {
                    expr,
                    low: Box::new(low),
                    high: Box::new(high),
                    is_negated,
                })
            }
            kw => Err(self.error(format!("Unexpected keyword {kw}"), offset, len)),
        }
    }

    fn peek_infix(&mut self) -> Result<Option<Infix>> {
        let Some(token) = self.peek_token()? else {
            return Ok(None);
        };

        let infix = match token {
            Token::Equal => Infix::Binary(Operator::Equal),
            Token::NotEqual => Infix::Binary(Operator::NotEqual),
            Token::GreaterThan => Infix::Binary(Operator::GreaterThan),
            Token::LessThan => Infix::Binary(Operator::LessThan),
            Token::GreaterThanEqual => Infix::Binary(Operator::GreaterThanEqual),
            Token::LessThanEqual => Infix::Binary(Operator::LessThanEqual),

            Token::Plus => Infix::Binary(Operator::Add),
            Token::Minus => Infix::Binary(Operator::Subtract),
            Token::Asterisk => Infix::Binary(Operator::Multiply),
            Token::Slash => Infix::Binary(Operator::Divide),

            Token::Keyword(Keyword::And) => Infix::Binary(Operator::And),
            Token::Keyword(Keyword::Or) => Infix::Binary(Operator::Or),

            Token::Keyword(
                Keyword::Is | Keyword::Like | Keyword::In | Keyword::Between | Keyword::Not,
            ) => Infix::Postfix,

            _ => return Ok(None),
        };

        Ok(Some(infix))
    }

    /// Completes a column reference whose first identifier was just consumed.
    fn finish_column(&mut self, first: &'src str, offset: usize, len: usize) -> Result<ColumnRef<'src>> {
        if !self.consume_if(&Token::Dot)? {
            return Ok(ColumnRef {
                table: None,
                name: first,
                offset,
                len,
            });
        }

        let next = self.next_lexeme()?;
        match next.token {
            Token::Identifier(name) => Ok(ColumnRef {
                table: Some(first),
                name,
                offset,
                len: next.offset + next.len - offset,
            }),
            t => Err(self.error(
                format!("Expected a column name after '{first}.', found {t}"),
                next.offset,
                next.len,
            )),
        }
    }

    fn expect_column(&mut self) -> Result<ColumnRef<'src>> {
        let Lexeme { token, offset, len } = self.next_lexeme()?;
        match token {
            Token::Identifier(name) => {
                let column = self.finish_column(name, offset, len)?;
                self.reject_call(&column)?;
                Ok(column)
            }
            t => Err(self.error(format!("Expected a column name, but found {t}"), offset, len)),
        }
    }

    fn parse_alias(&mut self) -> Result<Option<&'src str>> {
        if self.consume_if(&Token::Keyword(Keyword::As))? {
            let Lexeme { token, offset, len } = self.next_lexeme()?;
            return match token {
                Token::Identifier(alias) => Ok(Some(alias)),
                t => Err(self.error(format!("Expected an alias after AS, found {t}"), offset, len)),
            };
        }

        // implicit alias: `name user_name`
        if let Some(Token::Identifier(alias)) = self.peek_token()? {
            let alias = *alias;
            self.next_lexeme()?;
            return Ok(Some(alias));
        }

        Ok(None)
    }

    fn reject_call(&mut self, column: &ColumnRef<'src>) -> Result<()> {
        if self.peek_is(&Token::LeftParen) {
            return Err(self.error(
                format!("Function calls are not supported: `{column}(...)`"),
                column.offset,
                column.len,
            ));
        }
        Ok(())
    }

    fn error(&self, message: impl Into<String>, offset: usize, len: usize) -> DialectError {
        DialectError::new(message, self.src, offset, len)
    }

    fn next_lexeme(&mut self) -> Result<Lexeme<'src>> {
        match self.lexer.next() {
            Some(result) => result,
            None => Err(self.error("Unexpected end of input", self.src.len(), 0)),
        }
    }

    fn peek_token(&mut self) -> Result<Option<&Token<'src>>> {
        match self.lexer.peek() {
            Some(Ok(lexeme)) => Ok(Some(&lexeme.token)),
            Some(Err(err)) => Err(err.clone()),
            None => Ok(None),
        }
    }

    fn peek_is(&mut self, expected: &Token<'src>) -> bool {
        matches!(self.lexer.peek(), Some(Ok(lexeme)) if lexeme.token == *expected)
    }

    fn consume_if(&mut self, expected: &Token<'src>) -> Result<bool> {
        if let Some(Err(err)) = self.lexer.peek() {
            return Err(err.clone());
        }

        if self.peek_is(expected) {
            self.lexer.next();
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn expect_token(&mut self, expected: Token<'src>) -> Result<()> {
        let Lexeme { token, offset, len } = self.next_lexeme()?;
        if token == expected {
            Ok(())
        } else {
            Err(self.error(format!("Expected {expected}, found {token}"), offset, len))
        }
    }

    fn expect_end(&mut self) -> Result<()> {
        match self.lexer.next() {
            None => Ok(()),
            Some(Err(err)) => Err(err),
            Some(Ok(Lexeme { token, offset, len })) => {
                Err(self.error(format!("Unexpected {token}"), offset, len))
            }
        }
    }
}
