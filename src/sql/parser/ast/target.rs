use super::expression::ColumnRef;

/// One entry of a CHOICE (projection) list.
#[derive(Debug, Clone, PartialEq)]
pub enum ChoiceTarget<'src> {
    /// `*` or `table.*`
    Star { table: Option<&'src str>, offset: usize },

    /// `column [AS alias]`
    Column {
        column: ColumnRef<'src>,
        alias: Option<&'src str>,
    },
}

/// Choice list
pub type ChoiceList<'src> = Vec<ChoiceTarget<'src>>;

/// Sort direction following an ORDER column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction<'src> {
    Asc,
    Desc,

    /// Any other single word. It is passed through for the database to reject.
    Other(&'src str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct OrderTarget<'src> {
    pub column: ColumnRef<'src>,
    pub direction: Option<Direction<'src>>,
}

/// A name in an insert/update/view field list.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldName<'src> {
    pub name: &'src str,
    pub offset: usize,
    pub len: usize,
}

/// Field list, `None` for `*`.
pub type FieldList<'src> = Option<Vec<FieldName<'src>>>;
