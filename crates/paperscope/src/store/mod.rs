//! The pinned-paper collection.
//!
//! Owns membership, grouping, and ordering of pinned papers. Local state is
//! authoritative for structure (which papers, which bucket, what order);
//! the remote graph is authoritative for paper content, applied via
//! [`PinStore::refresh`]. Every successful mutation is written through to
//! disk; rejected or no-op calls touch nothing.

pub mod persist;

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::client::OpenAlexClient;
use crate::config::limits;
use crate::error::{CapacityError, ClientResult};
use crate::models::{Paper, normalize_id};

use persist::{OrderEntry, PinSnapshot, SNAPSHOT_VERSION};

/// Generated group identifier.
pub type GroupId = String;

/// A bucket key: a group id, or `None` for the ungrouped bucket.
pub type Bucket = Option<GroupId>;

/// A named partition of the pin collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Group {
    /// Generated unique id.
    pub id: GroupId,

    /// User-supplied display name.
    pub name: String,
}

/// Result of a pin toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PinToggle {
    /// The paper was added to the collection.
    Pinned,

    /// The paper was removed from the collection.
    Unpinned,
}

/// The canonical pinned-paper collection.
#[derive(Debug)]
pub struct PinStore {
    /// Pinned ids, most recent first (user-reorderable via buckets).
    pins: Vec<String>,

    /// Cached metadata by id.
    papers: HashMap<String, Paper>,

    /// Named groups in creation order.
    groups: Vec<Group>,

    /// Per-bucket display ordering. Invariant: the union of all bucket
    /// sequences equals `pins` exactly, with no duplicates.
    order: HashMap<Bucket, Vec<String>>,

    /// Snapshot file, or `None` for an in-memory store.
    path: Option<PathBuf>,
}

impl PinStore {
    /// Create an empty in-memory store (no persistence).
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            pins: Vec::new(),
            papers: HashMap::new(),
            groups: Vec::new(),
            order: HashMap::from([(None, Vec::new())]),
            path: None,
        }
    }

    /// Hydrate a store from the snapshot at `path`.
    ///
    /// A missing, corrupt, or legacy file never fails construction; the
    /// store starts empty (or migrated) instead.
    #[must_use]
    pub fn load(path: PathBuf) -> Self {
        let snapshot = persist::load_snapshot(&path).unwrap_or_else(PinSnapshot::empty);

        let mut order: HashMap<Bucket, Vec<String>> =
            snapshot.order.into_iter().map(|e| (e.group, e.papers)).collect();
        order.entry(None).or_default();

        let mut store = Self {
            pins: snapshot.pins,
            papers: snapshot.papers,
            groups: snapshot.groups,
            order,
            path: Some(path),
        };
        store.repair();
        store
    }

    /// Pinned ids, most recent first.
    #[must_use]
    pub fn pins(&self) -> &[String] {
        &self.pins
    }

    /// Number of pinned papers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pins.len()
    }

    /// True when nothing is pinned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    /// Whether `paper_id` is pinned.
    #[must_use]
    pub fn is_pinned(&self, paper_id: &str) -> bool {
        self.pins.iter().any(|id| id == paper_id)
    }

    /// Cached metadata for a pinned paper.
    #[must_use]
    pub fn paper(&self, paper_id: &str) -> Option<&Paper> {
        self.papers.get(paper_id)
    }

    /// Groups in creation order.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Ids in a bucket, in display order.
    #[must_use]
    pub fn bucket_order(&self, bucket: &Bucket) -> &[String] {
        self.order.get(bucket).map_or(&[], Vec::as_slice)
    }

    /// Papers in a bucket, in display order.
    #[must_use]
    pub fn bucket_papers(&self, bucket: &Bucket) -> Vec<&Paper> {
        self.bucket_order(bucket).iter().filter_map(|id| self.papers.get(id)).collect()
    }

    /// Pin or unpin a paper.
    ///
    /// The paper id is normalized first, so a prefixed and a bare spelling
    /// address the same pin. Pinning inserts at the front of the collection
    /// and of the ungrouped bucket. Unpinning removes the paper from its
    /// bucket and drops its cached metadata.
    ///
    /// # Errors
    ///
    /// Returns [`CapacityError::PinLimit`] when pinning at capacity; the
    /// collection is left unchanged.
    pub fn toggle_pin(&mut self, mut paper: Paper) -> Result<PinToggle, CapacityError> {
        paper.id = normalize_id(&paper.id);
        if self.is_pinned(&paper.id) {
            let id = paper.id;
            self.pins.retain(|p| *p != id);
            for bucket in self.order.values_mut() {
                bucket.retain(|p| *p != id);
            }
            self.papers.remove(&id);
            self.commit();
            return Ok(PinToggle::Unpinned);
        }

        if self.pins.len() >= limits::MAX_PINS {
            return Err(CapacityError::PinLimit { max: limits::MAX_PINS });
        }

        self.pins.insert(0, paper.id.clone());
        self.order.entry(None).or_default().insert(0, paper.id.clone());
        self.papers.insert(paper.id.clone(), paper);
        self.commit();
        Ok(PinToggle::Pinned)
    }

    /// Create a group with a generated unique id.
    ///
    /// A blank (whitespace-only) name is rejected and returns `None`.
    pub fn create_group(&mut self, name: &str) -> Option<GroupId> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }

        let id = uuid::Uuid::new_v4().to_string();
        self.groups.push(Group { id: id.clone(), name: name.to_string() });
        self.order.entry(Some(id.clone())).or_default();
        self.commit();
        Some(id)
    }

    /// Rename a group. No-op (returns false) for an unknown id or blank name.
    pub fn rename_group(&mut self, group_id: &str, name: &str) -> bool {
        let name = name.trim();
        if name.is_empty() {
            return false;
        }
        let Some(group) = self.groups.iter_mut().find(|g| g.id == group_id) else {
            return false;
        };

        group.name = name.to_string();
        self.commit();
        true
    }

    /// Delete a group, moving its papers to the end of the ungrouped
    /// bucket in their previous relative order.
    pub fn delete_group(&mut self, group_id: &str) -> bool {
        let Some(pos) = self.groups.iter().position(|g| g.id == group_id) else {
            return false;
        };

        let members = self.order.remove(&Some(group_id.to_string())).unwrap_or_default();
        self.order.entry(None).or_default().extend(members);
        self.groups.remove(pos);
        self.commit();
        true
    }

    /// Move a pinned paper to the end of another bucket.
    ///
    /// No-op when the paper is not pinned or the target group is unknown.
    pub fn move_paper_to_group(&mut self, paper_id: &str, target: Bucket) -> bool {
        let end = self.bucket_order(&target).len();
        self.move_paper_to_group_at(paper_id, target, end)
    }

    /// Atomically move a pinned paper into a bucket at a specific position.
    ///
    /// The id is normalized before the membership check. The single-call
    /// replacement for the fragile move-then-reorder pair: removal from the
    /// old bucket and insertion at `index` (clamped to the target length)
    /// happen in one state transition.
    pub fn move_paper_to_group_at(&mut self, paper_id: &str, target: Bucket, index: usize) -> bool {
        let paper_id = normalize_id(paper_id);
        if !self.is_pinned(&paper_id) {
            return false;
        }
        if let Some(ref gid) = target {
            if !self.groups.iter().any(|g| g.id == *gid) {
                return false;
            }
        }

        for bucket in self.order.values_mut() {
            bucket.retain(|id| *id != paper_id);
        }

        let slot = self.order.entry(target).or_default();
        let index = index.min(slot.len());
        slot.insert(index, paper_id);
        self.commit();
        true
    }

    /// Relocate the element at `from` to `to` within a bucket.
    ///
    /// A stable single-element move, not a swap. No-op (returns false) when
    /// either index is out of bounds or the bucket is unknown.
    pub fn reorder_in_group(&mut self, bucket: &Bucket, from: usize, to: usize) -> bool {
        let Some(seq) = self.order.get_mut(bucket) else {
            return false;
        };
        if from >= seq.len() || to >= seq.len() {
            return false;
        }

        let id = seq.remove(from);
        seq.insert(to, id);
        self.commit();
        true
    }

    /// Refresh cached metadata from the remote graph in one batched call.
    ///
    /// On success each paper's content fields are replaced wholesale while
    /// membership and ordering stay untouched. On failure the last-known
    /// local copies are retained unmodified.
    ///
    /// # Errors
    ///
    /// Returns error when the batched fetch fails; local state is unchanged.
    pub async fn refresh(&mut self, client: &OpenAlexClient) -> ClientResult<usize> {
        if self.pins.is_empty() {
            return Ok(0);
        }

        let works = client.get_works_by_ids(&self.pins).await?;
        let fresh: Vec<Paper> = works.iter().map(Paper::from).collect();
        Ok(self.apply_refresh(fresh))
    }

    /// Apply refreshed metadata: content from remote, structure from local.
    ///
    /// Ids not currently pinned are ignored; pinned ids missing from the
    /// batch keep their cached copy.
    pub fn apply_refresh(&mut self, fresh: Vec<Paper>) -> usize {
        let mut updated = 0;
        for paper in fresh {
            if self.is_pinned(&paper.id) {
                self.papers.insert(paper.id.clone(), paper);
                updated += 1;
            }
        }
        if updated > 0 {
            self.commit();
        }
        updated
    }

    /// Empty the collection. Named groups persist, empty.
    pub fn clear_pins(&mut self) {
        self.pins.clear();
        self.papers.clear();
        for bucket in self.order.values_mut() {
            bucket.clear();
        }
        self.commit();
    }

    /// Diagnostic: the bucket orders partition `pins` exactly.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        let flattened: Vec<&String> = self.order.values().flatten().collect();
        if flattened.len() != self.pins.len() {
            return false;
        }

        let bucketed: std::collections::HashSet<&String> = flattened.into_iter().collect();
        bucketed.len() == self.pins.len() && self.pins.iter().all(|id| bucketed.contains(id))
    }

    /// Current state as a persistable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> PinSnapshot {
        let mut order: Vec<OrderEntry> = Vec::with_capacity(self.order.len());
        order.push(OrderEntry { group: None, papers: self.bucket_order(&None).to_vec() });
        for group in &self.groups {
            order.push(OrderEntry {
                group: Some(group.id.clone()),
                papers: self.bucket_order(&Some(group.id.clone())).to_vec(),
            });
        }

        PinSnapshot {
            version: SNAPSHOT_VERSION,
            pins: self.pins.clone(),
            papers: self.papers.clone(),
            groups: self.groups.clone(),
            order,
        }
    }

    /// Post-mutation hook: verify the partition invariant and write through.
    fn commit(&mut self) {
        debug_assert!(self.is_consistent(), "bucket orders must partition the pin list");

        if let Some(ref path) = self.path {
            if let Err(err) = persist::write_snapshot(path, &self.snapshot()) {
                tracing::warn!(path = %path.display(), error = %err, "failed to persist pins");
            }
        }
    }

    /// Drop references to ids that fell out of sync in a hand-edited or
    /// partially written file, so the partition invariant holds from the
    /// first mutation.
    fn repair(&mut self) {
        let pinned: std::collections::HashSet<String> = self.pins.iter().cloned().collect();

        let mut seen = std::collections::HashSet::new();
        for bucket in self.order.values_mut() {
            bucket.retain(|id| pinned.contains(id) && seen.insert(id.clone()));
        }

        let placed: std::collections::HashSet<String> =
            self.order.values().flatten().cloned().collect();
        let missing: Vec<String> =
            self.pins.iter().filter(|id| !placed.contains(*id)).cloned().collect();
        self.order.entry(None).or_default().extend(missing);

        self.papers.retain(|id, _| pinned.contains(id));
    }
}
