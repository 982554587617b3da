//! Save-format migrations.
//!
//! Each registered step rewrites a serialized snapshot from one version to
//! the next; the registry chains steps so saves written several versions
//! ago still load. No steps exist yet at format version 1; the framework
//! is here so bumping [`crate::snapshot::FORMAT_VERSION`] is a local
//! change, not a save-wipe.

use std::collections::BTreeMap;

use crate::snapshot::DeserializeError;

#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("no migration path from version {from} to version {to}")]
    NoPath { from: u32, to: u32 },
    #[error("migration from version {from} to version {to} failed: {reason}")]
    StepFailed { from: u32, to: u32, reason: String },
    #[error("deserialization error: {0}")]
    Deserialize(#[from] DeserializeError),
}

/// A step rewriting snapshot bytes from version N to version N+1.
pub type MigrationFn = fn(&[u8]) -> Result<Vec<u8>, MigrationError>;

/// Migration steps keyed by source version.
#[derive(Default)]
pub struct MigrationRegistry {
    steps: BTreeMap<u32, MigrationFn>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the step from `from_version` to `from_version + 1`.
    pub fn register(&mut self, from_version: u32, step: MigrationFn) {
        self.steps.insert(from_version, step);
    }

    /// Whether an unbroken chain of steps covers `from..to`.
    pub fn can_migrate(&self, from: u32, to: u32) -> bool {
        if from >= to {
            return from == to;
        }
        (from..to).all(|v| self.steps.contains_key(&v))
    }

    /// Rewrite `data` from version `from` up to version `to`, chaining
    /// steps. Identity when `from == to`; downgrades are never supported.
    pub fn migrate(&self, data: &[u8], from: u32, to: u32) -> Result<Vec<u8>, MigrationError> {
        if from == to {
            return Ok(data.to_vec());
        }
        if from > to {
            return Err(MigrationError::NoPath { from, to });
        }
        let mut current = data.to_vec();
        for version in from..to {
            let step = self
                .steps
                .get(&version)
                .ok_or(MigrationError::NoPath { from, to })?;
            current = step(&current)?;
        }
        Ok(current)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }
}

impl std::fmt::Debug for MigrationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationRegistry")
            .field("steps", &self.steps.keys().collect::<Vec<_>>())
            .finish()
    }
}

// ===========================================================================
// Tests
// ===========================================================================
