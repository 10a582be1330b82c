use std::fmt;

use crate::common::error::{AdapterError, Result};

/// Largest LIMIT or OFFSET the database accepts.
const MAX_ROWS: u64 = i64::MAX as u64;

/// Which slice of an ordered result set a select returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Pagination {
    /// Every matching row.
    #[default]
    All,

    /// Zero-based page `index` of `size` rows.
    Page { index: u64, size: u64 },
}

impl Pagination {
    pub fn page(index: u64, size: u64) -> Self {
        Pagination::Page { index, size }
    }

    /// Validates a `(pageIndex, pageSize)` pair as it arrives from callers
    /// that use `-1, -1` for "no limit".
    pub fn from_raw(index: i64, size: i64) -> Result<Self> {
        match (index, size) {
            (-1, -1) => Ok(Pagination::All),
            (index, size) if index >= 0 && size >= 0 => Pagination::Page {
                index: index.unsigned_abs(),
                size: size.unsigned_abs(),
            }
            .validate(),
            (index, size) => Err(AdapterError::validation(format!(
                "Invalid pagination ({index}, {size}): use -1, -1 for all rows or non-negative values for a page"
            ))),
        }
    }

    /// Rejects pages whose limit or offset does not fit a signed 64-bit
    /// integer.
    pub fn validate(self) -> Result<Self> {
        let Pagination::Page { index, size } = self else {
            return Ok(self);
        };
        match index.checked_mul(size) {
            Some(offset) if offset <= MAX_ROWS && size <= MAX_ROWS => Ok(self),
            _ => Err(AdapterError::validation(format!(
                "Invalid pagination ({index}, {size}): page is out of range"
            ))),
        }
    }

    pub fn offset(&self) -> Option<u64> {
        match self {
            Pagination::All => None,
            Pagination::Page { index, size } => Some(index.saturating_mul(*size)),
        }
    }

    pub fn limit(&self) -> Option<u64> {
        match self {
            Pagination::All => None,
            Pagination::Page { size, .. } => Some(*size),
        }
    }
}

/// Renders the LIMIT clause, or nothing for [`Pagination::All`].
impl fmt::Display for Pagination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.limit(), self.offset()) {
            (Some(limit), Some(offset)) => write!(f, "LIMIT {limit} OFFSET {offset}"),
            _ => Ok(()),
        }
    }
}
