use crate::common::error::{AdapterError, Result};

/// Raw statements queued for a single batched call.
#[derive(Debug, Clone, Default)]
pub struct BatchQueue {
    statements: Option<Vec<String>>,
}

impl BatchQueue {
    /// Starts a new, empty batch, discarding anything queued before.
    pub fn start(&mut self) {
        self.statements = Some(Vec::new());
    }

    pub fn add(&mut self, sql: impl Into<String>) -> Result<()> {
        match &mut self.statements {
            Some(statements) => {
                statements.push(sql.into());
                Ok(())
            }
            None => Err(AdapterError::validation(
                "No batch started: call start_batch before add_batch",
            )),
        }
    }

    /// Hands out the queued statements, leaving the batch started and empty.
    pub fn take(&mut self) -> Result<Vec<String>> {
        match &mut self.statements {
            Some(statements) => Ok(std::mem::take(statements)),
            None => Err(AdapterError::validation("No batch started")),
        }
    }

    pub fn is_started(&self) -> bool {
        self.statements.is_some()
    }

    pub fn len(&self) -> usize {
        self.statements.as_ref().map_or(0, Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
