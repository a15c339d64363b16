//! Versioned on-disk snapshot of the pin collection.
//!
//! The whole collection is serialized into one JSON file, rewritten
//! wholesale after every mutation. The loader tolerates a missing file, a
//! corrupt file, and the legacy unversioned shape (a bare array of cached
//! papers); in the worst case the store starts empty.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::Paper;

use super::Group;

/// Current snapshot schema version.
pub const SNAPSHOT_VERSION: u32 = 1;

/// One bucket's ordering inside a snapshot.
///
/// `group: None` is the ungrouped bucket. Stored as a list because JSON
/// object keys cannot express the optional group id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderEntry {
    /// Group id, or `None` for ungrouped.
    pub group: Option<String>,

    /// Paper ids in display order.
    pub papers: Vec<String>,
}

/// The persisted pin collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinSnapshot {
    /// Schema version tag.
    pub version: u32,

    /// Pinned paper ids, most recent first.
    pub pins: Vec<String>,

    /// Cached paper metadata by id.
    pub papers: HashMap<String, Paper>,

    /// Named groups in display order.
    pub groups: Vec<Group>,

    /// Per-bucket ordering.
    pub order: Vec<OrderEntry>,
}

impl PinSnapshot {
    /// An empty collection.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            pins: Vec::new(),
            papers: HashMap::new(),
            groups: Vec::new(),
            order: Vec::new(),
        }
    }
}

/// Errors from snapshot I/O.
#[derive(thiserror::Error, Debug)]
pub enum PersistError {
    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load a snapshot, migrating legacy shapes and swallowing corruption.
///
/// Returns `None` when nothing usable is on disk; the caller starts empty.
#[must_use]
pub fn load_snapshot(path: &Path) -> Option<PinSnapshot> {
    let raw = std::fs::read_to_string(path).ok()?;

    if let Ok(snapshot) = serde_json::from_str::<PinSnapshot>(&raw) {
        if snapshot.version == SNAPSHOT_VERSION {
            return Some(snapshot);
        }
        tracing::warn!(
            version = snapshot.version,
            "unknown pin snapshot version, starting with an empty collection"
        );
        return None;
    }

    // Legacy shape: a bare array of cached papers, all ungrouped.
    if let Ok(papers) = serde_json::from_str::<Vec<Paper>>(&raw) {
        tracing::info!(count = papers.len(), "migrating legacy pin file");
        return Some(migrate_legacy(papers));
    }

    tracing::warn!(path = %path.display(), "corrupt pin file, starting with an empty collection");
    None
}

/// Write a snapshot wholesale.
///
/// # Errors
///
/// Returns error on filesystem or serialization failure.
pub fn write_snapshot(path: &Path, snapshot: &PinSnapshot) -> Result<(), PersistError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_vec_pretty(snapshot)?;
    std::fs::write(path, json)?;
    Ok(())
}

fn migrate_legacy(papers: Vec<Paper>) -> PinSnapshot {
    let pins: Vec<String> = papers.iter().map(|p| p.id.clone()).collect();
    PinSnapshot {
        version: SNAPSHOT_VERSION,
        order: vec![OrderEntry { group: None, papers: pins.clone() }],
        papers: papers.into_iter().map(|p| (p.id.clone(), p)).collect(),
        pins,
        groups: Vec::new(),
    }
}
