use crate::{
    common::error::DialectError,
    sql::{compiler::Bindings, statement::Statement},
};

/// Rewrites a complete statement, replacing each `:name` outside quoted text
/// with `?` and collecting the bound value. Everything else is passed through
/// as written.
pub fn bind_named(text: &str, bindings: &dyn Bindings) -> Result<Statement, DialectError> {
    let mut sql = String::with_capacity(text.len());
    let mut params = Vec::new();
    let mut chars = text.char_indices().peekable();
    let mut quote: Option<(char, usize)> = None;

    while let Some((idx, c)) = chars.next() {
        if let Some((open, _)) = quote {
            sql.push(c);
            if c == open {
                // Doubled quote is an escape, stay inside the literal.
                if chars.peek().is_some_and(|&(_, next)| next == open) {
                    if let Some((_, next)) = chars.next() {
                        sql.push(next);
                    }
                } else {
                    quote = None;
                }
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some((c, idx));
                sql.push(c);
            }
            ':' if chars.peek().is_some_and(|&(_, next)| next == ':') => {
                // `::` cast, not a binding.
                sql.push_str("::");
                chars.next();
            }
            ':' if chars
                .peek()
                .is_some_and(|&(_, next)| next.is_ascii_alphabetic() || next == '_') =>
            {
                let start = idx + 1;
                let mut end = start;
                while let Some(&(pos, next)) = chars.peek() {
                    if !(next.is_ascii_alphanumeric() || next == '_') {
                        break;
                    }
                    end = pos + next.len_utf8();
                    chars.next();
                }

                let name = &text[start..end];
                let Some(value) = bindings.binding(name) else {
                    return Err(DialectError::new(
                        format!("Unknown binding `:{name}`"),
                        text,
                        idx,
                        end - idx,
                    ));
                };
                sql.push('?');
                params.push(value);
            }
            _ => sql.push(c),
        }
    }

    if let Some((open, offset)) = quote {
        return Err(DialectError::new(
            format!("Unterminated {open} quote"),
            text,
            offset,
            text.len() - offset,
        ));
    }

    Ok(Statement::new(sql, params))
}
