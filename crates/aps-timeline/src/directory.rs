//! Resources and the ordered resource directory.
//!
//! # Design
//!
//! The directory is a sorted-`Vec` ordered map: `add` binary-searches for the
//! insertion point (O(log n) search, O(n) shift), `get` is an exact-match
//! binary search, and `get_by_index` makes the key order directly indexable.
//! For the directory sizes a stage sees (tens to low thousands of machines)
//! this beats a tree map on lookup and iteration.
//!
//! A directory is the sole owner of its resources.  Independent directories
//! are never required to agree: the same physical resource may sit at
//! different ordinal positions in different stages, so per-stage dense
//! indices live in external maps, never on the resource itself.

use aps_core::{AttributeSet, Operation, ResourceKey, SetupNumber};

use crate::{TimelineError, TimelineResult};

// ── Capability ────────────────────────────────────────────────────────────────

/// What a resource is able to process.
///
/// A closed set of variants with one common read contract
/// ([`eligible`](Capability::eligible)); dispatch is by pattern matching.
/// Eligibility *filtering* — deciding which resources an activity may even
/// consider — is the caller's job; this core only evaluates the predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Capability {
    /// General-purpose machine: eligible when it carries every tag the
    /// operation requires.
    Machine { tags: AttributeSet },
    /// Dedicated cell bound to a single setup family.
    Dedicated { setup: SetupNumber },
}

impl Capability {
    /// `true` if a resource with this capability can run `op`.
    pub fn eligible(&self, op: &Operation) -> bool {
        match self {
            Capability::Machine { tags } => tags.is_superset(&op.attributes),
            Capability::Dedicated { setup } => *setup == op.setup_number,
        }
    }
}

// ── Resource ──────────────────────────────────────────────────────────────────

/// A schedulable unit (machine, line, cell).
///
/// Carries no per-stage state: stage-local ordinals are kept in external
/// maps so the same resource definition can be shared read-only across
/// stages.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resource {
    key: ResourceKey,
    name: String,
    capability: Capability,
}

impl Resource {
    pub fn new(key: ResourceKey, name: impl Into<String>, capability: Capability) -> Self {
        Self { key, name: name.into(), capability }
    }

    #[inline]
    pub fn key(&self) -> ResourceKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn capability(&self) -> &Capability {
        &self.capability
    }

    /// `true` if this resource can run `op`.
    pub fn eligible(&self, op: &Operation) -> bool {
        self.capability.eligible(op)
    }
}

// ── ResourceDirectory ─────────────────────────────────────────────────────────

/// Ordered map `ResourceKey → Resource`, maintained in ascending key order.
#[derive(Debug, Default)]
pub struct ResourceDirectory {
    /// Resources sorted ascending by key; no two entries share a key.
    entries: Vec<Resource>,
}

impl ResourceDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &ResourceKey) -> bool {
        self.position(key).is_ok()
    }

    /// Insert `resource`, keeping sort order.
    ///
    /// Fails with [`TimelineError::DuplicateKey`] if the key is already
    /// present; the directory is unchanged on failure.
    pub fn add(&mut self, resource: Resource) -> TimelineResult<()> {
        match self.position(&resource.key()) {
            Ok(_) => Err(TimelineError::DuplicateKey(resource.key())),
            Err(pos) => {
                self.entries.insert(pos, resource);
                Ok(())
            }
        }
    }

    /// Remove and return the resource at `key`, preserving the order of the
    /// remaining entries.
    pub fn remove(&mut self, key: &ResourceKey) -> TimelineResult<Resource> {
        match self.position(key) {
            Ok(pos) => Ok(self.entries.remove(pos)),
            Err(_) => Err(TimelineError::NotFound(*key)),
        }
    }

    /// Exact-match lookup.
    pub fn get(&self, key: &ResourceKey) -> TimelineResult<&Resource> {
        match self.position(key) {
            Ok(pos) => Ok(&self.entries[pos]),
            Err(_) => Err(TimelineError::NotFound(*key)),
        }
    }

    /// The i-th resource in key order.
    pub fn get_by_index(&self, index: usize) -> TimelineResult<&Resource> {
        self.entries.get(index).ok_or(TimelineError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Ordinal position of `key` within this directory, if present.
    ///
    /// Ordinals are only meaningful for this directory instance — other
    /// directories may order the same resource differently.
    pub fn ordinal_of(&self, key: &ResourceKey) -> Option<usize> {
        self.position(key).ok()
    }

    /// Resources in ascending key order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.entries.iter()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = ResourceKey> + '_ {
        self.entries.iter().map(|r| r.key())
    }

    fn position(&self, key: &ResourceKey) -> Result<usize, usize> {
        self.entries.binary_search_by(|r| r.key().cmp(key))
    }
}
