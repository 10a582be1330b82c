use strum::{Display, EnumString};

/// Keywords recognized by the dialect.
///
/// These keywords are case-insensitive. Anything else that looks like a word
/// lexes as an identifier and has to survive column allowlisting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, Display)]
#[strum(ascii_case_insensitive, serialize_all = "UPPERCASE")]
pub enum Keyword {
    And,
    Or,
    Not,
    Is,
    Like,
    In,
    Between,
    As,

    Asc,
    Desc,

    True,
    False,
    Null,
}

impl Keyword {
    pub fn is_bool_literal(self) -> bool {
        matches!(self, Self::True | Self::False)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_case_insensitive() {
        assert_eq!(Keyword::from_str("and").unwrap(), Keyword::And);
        assert_eq!(Keyword::from_str("DeSc").unwrap(), Keyword::Desc);
        assert!(Keyword::from_str("select").is_err());
    }

    #[test]
    fn test_display_uppercase() {
        assert_eq!(Keyword::Between.to_string(), "BETWEEN");
    }
}
