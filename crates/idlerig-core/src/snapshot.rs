//! Snapshot persistence for the engine.
//!
//! Binary serialization via `bitcode` with a versioned header, plus a
//! fixed-capacity ring buffer of recent snapshots for rollback and replay
//! debugging. The catalog is static reference data and is never part of a
//! snapshot; restoring takes the catalog the host already owns.

use crate::catalog::Catalog;
use crate::engine::Engine;
use crate::rng::SimRng;
use crate::state::GameState;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying an engine snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x1D1E_0001;

/// Current wire format version. Increment on breaking changes.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header carried by every serialized snapshot, validated before the
/// payload is touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Tick count when the snapshot was taken.
    pub tick: u64,
}

impl SnapshotHeader {
    pub fn new(tick: u64) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// Decode a snapshot far enough to return its header. bitcode has no
/// partial decode, so this pays for a full decode; use sparingly.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    let snapshot: GameSnapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

/// The serializable portion of the engine: game state plus RNG. The event
/// bus (closures) and command queue (transient) are excluded and recreated
/// empty on restore.
#[derive(Debug, Serialize, Deserialize)]
struct GameSnapshot {
    header: SnapshotHeader,
    state: GameState,
    rng: SimRng,
}

// ---------------------------------------------------------------------------
// SnapshotHistory
// ---------------------------------------------------------------------------

/// One retained snapshot.
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    pub tick: u64,
    /// Serialized engine state (bitcode bytes).
    pub data: Vec<u8>,
}

/// Fixed-capacity ring of recent snapshots, oldest evicted first.
#[derive(Debug)]
pub struct SnapshotHistory {
    entries: Vec<Option<SnapshotEntry>>,
    head: usize,
    len: usize,
    total_taken: u64,
}

impl SnapshotHistory {
    /// Capacity 0 is clamped to 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: (0..capacity).map(|_| None).collect(),
            head: 0,
            len: 0,
            total_taken: 0,
        }
    }

    pub fn push(&mut self, entry: SnapshotEntry) {
        self.entries[self.head] = Some(entry);
        self.head = (self.head + 1) % self.capacity();
        if self.len < self.capacity() {
            self.len += 1;
        }
        self.total_taken += 1;
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Snapshots ever taken, including evicted ones.
    pub fn total_taken(&self) -> u64 {
        self.total_taken
    }

    /// Index 0 is the oldest retained snapshot.
    pub fn get(&self, index: usize) -> Option<&SnapshotEntry> {
        if index >= self.len {
            return None;
        }
        let start = if self.len < self.capacity() {
            0
        } else {
            self.head
        };
        self.entries[(start + index) % self.capacity()].as_ref()
    }

    pub fn latest(&self) -> Option<&SnapshotEntry> {
        if self.len == 0 {
            return None;
        }
        self.get(self.len - 1)
    }

    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry = None;
        }
        self.head = 0;
        self.len = 0;
    }
}

// ---------------------------------------------------------------------------
// Engine persistence
// ---------------------------------------------------------------------------

impl Engine {
    /// Serialize game state and RNG to a bitcode blob with header.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let snapshot = GameSnapshot {
            header: SnapshotHeader::new(self.state.tick),
            state: self.state.clone(),
            rng: self.rng.clone(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Restore an engine from a blob. The header is validated before the
    /// payload is accepted; version mismatch is an error, never a panic.
    /// Out-of-range health and broken parent links in the payload are
    /// healed rather than rejected.
    ///
    /// Event listeners and queued commands are not persisted; re-register
    /// listeners after restoring.
    pub fn deserialize(catalog: Catalog, data: &[u8]) -> Result<Self, DeserializeError> {
        let snapshot: GameSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;
        let mut state = snapshot.state;
        state.inventory.normalize();
        Ok(Engine::from_parts(catalog, state, snapshot.rng))
    }

    /// Restore, migrating older formats up to the current version first.
    pub fn deserialize_with_migrations(
        catalog: Catalog,
        data: &[u8],
        migrations: &crate::migration::MigrationRegistry,
    ) -> Result<Self, DeserializeError> {
        match read_snapshot_header(data) {
            Ok(header) if header.version < FORMAT_VERSION => {
                let migrated = migrations
                    .migrate(data, header.version, FORMAT_VERSION)
                    .map_err(|e| DeserializeError::Decode(format!("migration failed: {e}")))?;
                Self::deserialize(catalog, &migrated)
            }
            _ => Self::deserialize(catalog, data),
        }
    }

    /// Serialize the current state into the history ring.
    pub fn take_snapshot(&self, history: &mut SnapshotHistory) -> Result<(), SerializeError> {
        let data = self.serialize()?;
        history.push(SnapshotEntry {
            tick: self.state.tick,
            data,
        });
        Ok(())
    }

    /// Restore the snapshot at `index` in the history ring. `None` if the
    /// index is out of range.
    pub fn restore_snapshot(
        catalog: Catalog,
        history: &SnapshotHistory,
        index: usize,
    ) -> Option<Result<Self, DeserializeError>> {
        let entry = history.get(index)?;
        Some(Self::deserialize(catalog, &entry.data))
    }
}

// ===========================================================================
// Tests
// ===========================================================================
