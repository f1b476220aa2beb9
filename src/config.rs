use crate::driver::BatchKind;
use crate::error::StoreError;

/// Runtime configuration for an execution store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Keyspace the bound session targets; informational, the statements
    /// themselves are keyspace-relative.
    pub keyspace: String,
    /// Batch kind used for every composed mutation.
    pub batch_kind: BatchKind,
    /// Upper bound on statements per batch. Batches are bounded by partition;
    /// a composed batch over the limit is rejected before submission.
    pub max_batch_statements: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            keyspace: "flowstore".into(),
            batch_kind: BatchKind::Logged,
            max_batch_statements: 10_000,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.keyspace.is_empty() {
            return Err(StoreError::InvalidConfig("keyspace must not be empty".into()));
        }
        if self.max_batch_statements == 0 {
            return Err(StoreError::InvalidConfig(
                "max_batch_statements must be positive".into(),
            ));
        }
        Ok(())
    }
}
