use std::{borrow::Cow, fmt, str::FromStr};

use crate::{common::error::DialectError, sql::keyword::Keyword};

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'src> {
    Keyword(Keyword),
    Identifier(&'src str),
    Integer(i64),
    Float(f64),
    String(Cow<'src, str>),

    /// `:name`, a reference to a field of the bound entity.
    Binding(&'src str),

    Comma,
    Dot,
    Asterisk,
    Plus,
    Minus,
    Slash,

    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,

    LeftParen,
    RightParen,
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Keyword(keyword) => write!(f, "keyword {keyword}"),
            Token::Identifier(name) => write!(f, "`{name}`"),
            Token::Integer(num) => write!(f, "{num}"),
            Token::Float(num) => write!(f, "{num}"),
            Token::String(s) => write!(f, "'{s}'"),
            Token::Binding(name) => write!(f, ":{name}"),
            Token::Comma => write!(f, "','"),
            Token::Dot => write!(f, "'.'"),
            Token::Asterisk => write!(f, "'*'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Slash => write!(f, "'/'"),
            Token::Equal => write!(f, "'='"),
            Token::NotEqual => write!(f, "'!='"),
            Token::GreaterThan => write!(f, "'>'"),
            Token::GreaterThanEqual => write!(f, "'>='"),
            Token::LessThan => write!(f, "'<'"),
            Token::LessThanEqual => write!(f, "'<='"),
            Token::LeftParen => write!(f, "'('"),
            Token::RightParen => write!(f, "')'"),
        }
    }
}

/// A token together with the byte range it was read from.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme<'src> {
    pub token: Token<'src>,
    pub offset: usize,
    pub len: usize,
}

/// Tokenizer for dialect fragments.
///
/// Anything outside the dialect (statement separators, comments, quoted
/// identifiers, positional placeholders) is an error, and the lexer stops
/// producing tokens after the first one.
pub(crate) struct Lexer<'src> {
    whole: &'src str,
    rest: &'src str,
    position: usize,
    failed: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            whole: input,
            rest: input,
            position: 0,
            failed: false,
        }
    }

    fn error(&mut self, message: impl Into<String>, offset: usize, len: usize) -> DialectError {
        self.failed = true;
        DialectError::new(message, self.whole, offset, len)
    }

    fn advance(&mut self, len: usize) -> &'src str {
        let consumed = &self.rest[..len];
        self.rest = &self.rest[len..];
        self.position += len;
        consumed
    }

    fn skip_whitespace(&mut self) {
        let non_whitespace_pos = self
            .rest
            .char_indices()
            .find(|(_, ch)| !ch.is_whitespace())
            .map(|(pos, _)| pos)
            .unwrap_or(self.rest.len());

        self.advance(non_whitespace_pos);
    }

    fn consume_word(&mut self) -> &'src str {
        let word_end = self
            .rest
            .find(|c: char| !c.is_ascii_alphanumeric() && c != '_')
            .unwrap_or(self.rest.len());

        self.advance(word_end)
    }

    /// Reads a single-quoted literal. A doubled quote inside is an escaped quote.
    fn consume_string(&mut self) -> Result<Cow<'src, str>, DialectError> {
        let start = self.position;
        let bytes = self.rest.as_bytes();

        let mut escaped = false;
        let mut end = None;
        let mut idx = 1;
        while idx < bytes.len() {
            if bytes[idx] == b'\'' {
                if bytes.get(idx + 1) == Some(&b'\'') {
                    escaped = true;
                    idx += 2;
                    continue;
                }
                end = Some(idx);
                break;
            }
            idx += 1;
        }

        let Some(end) = end else {
            let len = self.rest.len();
            return Err(self.error("Unterminated string literal", start, len));
        };

        let content = &self.rest[1..end];
        self.advance(end + 1);

        Ok(if escaped {
            Cow::Owned(content.replace("''", "'"))
        } else {
            Cow::Borrowed(content)
        })
    }

    fn consume_number(&mut self) -> Result<Token<'src>, DialectError> {
        let start = self.position;

        let digits_end = self
            .rest
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.rest.len());

        let after = &self.rest[digits_end..];
        let is_float = after.starts_with('.')
            && after[1..].starts_with(|c: char| c.is_ascii_digit());

        let number_end = if is_float {
            let fraction_end = after[1..]
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after.len() - 1);
            digits_end + 1 + fraction_end
        } else {
            digits_end
        };

        if self.rest[number_end..].starts_with(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            let len = self.rest[number_end..]
                .find(|c: char| !c.is_ascii_alphanumeric() && c != '_' && c != '.')
                .unwrap_or(self.rest.len() - number_end);
            return Err(self.error("Invalid number literal", start, number_end + len));
        }

        let number_str = self.advance(number_end);
        let token = if is_float {
            number_str.parse::<f64>().map(Token::Float).ok()
        } else {
            number_str.parse::<i64>().map(Token::Integer).ok()
        };

        token.ok_or_else(|| self.error("Number literal out of range", start, number_str.len()))
    }

    fn single(&mut self, token: Token<'src>) -> Token<'src> {
        self.advance(1);
        token
    }

    fn pair(&mut self, second: char, matched: Token<'src>, alone: Token<'src>) -> Token<'src> {
        if self.rest[1..].starts_with(second) {
            self.advance(2);
            matched
        } else {
            self.advance(1);
            alone
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Lexeme<'src>, DialectError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        self.skip_whitespace();

        let start = self.position;
        let char = self.rest.chars().next()?;

        let token = match char {
            ',' => self.single(Token::Comma),
            '.' => self.single(Token::Dot),
            '*' => self.single(Token::Asterisk),
            '+' => self.single(Token::Plus),
            '(' => self.single(Token::LeftParen),
            ')' => self.single(Token::RightParen),
            '=' => self.single(Token::Equal),
            '>' => self.pair('=', Token::GreaterThanEqual, Token::GreaterThan),
            '<' if self.rest.starts_with("<>") => {
                self.advance(2);
                Token::NotEqual
            }
            '<' => self.pair('=', Token::LessThanEqual, Token::LessThan),
            '!' if self.rest.starts_with("!=") => {
                self.advance(2);
                Token::NotEqual
            }
            '-' if self.rest.starts_with("--") => {
                return Some(Err(self.error("Comments are not allowed", start, 2)));
            }
            '-' => self.single(Token::Minus),
            '/' if self.rest.starts_with("/*") => {
                return Some(Err(self.error("Comments are not allowed", start, 2)));
            }
            '/' => self.single(Token::Slash),
            '\'' => match self.consume_string() {
                Ok(value) => Token::String(value),
                Err(err) => return Some(Err(err)),
            },
            ':' if self.rest[1..].starts_with(|c: char| c.is_ascii_alphabetic() || c == '_') => {
                self.advance(1);
                Token::Binding(self.consume_word())
            }
            ':' => {
                return Some(Err(self.error("Expected a field name after ':'", start, 1)));
            }
            '"' | '`' | '[' => {
                return Some(Err(self.error("Quoted identifiers are not supported", start, 1)));
            }
            _ if char.is_ascii_digit() => match self.consume_number() {
                Ok(token) => token,
                Err(err) => return Some(Err(err)),
            },
            _ if char.is_ascii_alphabetic() || char == '_' => {
                let word = self.consume_word();
                Keyword::from_str(word)
                    .map(Token::Keyword)
                    .unwrap_or(Token::Identifier(word))
            }
            _ => {
                let message = format!("Unexpected character '{char}'");
                return Some(Err(self.error(message, start, char.len_utf8())));
            }
        };

        Some(Ok(Lexeme {
            token,
            offset: start,
            len: self.position - start,
        }))
    }
}
