//! Per-resource ordered run sets.
//!
//! A *run* is an ordered group of activities placed together as one
//! sequencing decision — in practice, a maximal changeover-free group.  The
//! collection is dense and index-aligned with the directory it was built
//! from: one run set per resource, in key order, size fixed at construction.
//! Resources added to the directory afterwards are not tracked.
//!
//! Stage-local ordinals live in the collection's own key → ordinal map;
//! nothing is stamped onto the shared `Resource` values.

use std::sync::Arc;

use aps_core::{Activity, ResourceKey};
use rustc_hash::FxHashMap;

use crate::{ResourceDirectory, TimelineError, TimelineResult};

// ── ActivityRun ───────────────────────────────────────────────────────────────

/// An ordered group of activities placed as one sequencing decision.
#[derive(Clone, Debug, Default)]
pub struct ActivityRun {
    activities: Vec<Arc<Activity>>,
}

impl ActivityRun {
    pub fn new(activities: Vec<Arc<Activity>>) -> Self {
        Self { activities }
    }

    /// A run of one activity.
    pub fn single(activity: Arc<Activity>) -> Self {
        Self { activities: vec![activity] }
    }

    /// Append an activity to the end of the run.
    pub fn push(&mut self, activity: Arc<Activity>) {
        self.activities.push(activity);
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn first(&self) -> Option<&Arc<Activity>> {
        self.activities.first()
    }

    pub fn last(&self) -> Option<&Arc<Activity>> {
        self.activities.last()
    }

    pub fn activities(&self) -> &[Arc<Activity>] {
        &self.activities
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Activity>> {
        self.activities.iter()
    }
}

// ── ActivityRunSet ────────────────────────────────────────────────────────────

/// Ordered, append-only list of runs on one resource.
///
/// No overlap or ordering validation happens here — that is the timeline's
/// job; a run set only records grouping.
pub struct ActivityRunSet {
    resource: ResourceKey,
    runs: Vec<ActivityRun>,
}

impl ActivityRunSet {
    pub fn new(resource: ResourceKey) -> Self {
        Self { resource, runs: Vec::new() }
    }

    #[inline]
    pub fn resource(&self) -> ResourceKey {
        self.resource
    }

    /// Append a new run.
    pub fn push(&mut self, run: ActivityRun) {
        self.runs.push(run);
    }

    /// The i-th run in placement order.
    pub fn run(&self, index: usize) -> TimelineResult<&ActivityRun> {
        self.runs.get(index).ok_or(TimelineError::IndexOutOfRange {
            index,
            len: self.runs.len(),
        })
    }

    /// Mutable access to the most recent run, if any.
    pub fn last_mut(&mut self) -> Option<&mut ActivityRun> {
        self.runs.last_mut()
    }

    pub fn last(&self) -> Option<&ActivityRun> {
        self.runs.last()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityRun> {
        self.runs.iter()
    }
}

// ── ActivityRunSets ───────────────────────────────────────────────────────────

/// Dense collection of run sets, one per resource of a directory snapshot.
pub struct ActivityRunSets {
    /// Run sets in the directory's key order at construction time.
    sets: Vec<ActivityRunSet>,
    /// Key → ordinal map, valid for the lifetime of this collection only.
    ordinals: FxHashMap<ResourceKey, usize>,
}

impl ActivityRunSets {
    /// Build one empty run set per resource currently in `directory`, in the
    /// directory's key order.
    pub fn from_directory(directory: &ResourceDirectory) -> Self {
        let mut sets = Vec::with_capacity(directory.len());
        let mut ordinals =
            FxHashMap::with_capacity_and_hasher(directory.len(), Default::default());
        for (ordinal, key) in directory.keys().enumerate() {
            ordinals.insert(key, ordinal);
            sets.push(ActivityRunSet::new(key));
        }
        Self { sets, ordinals }
    }

    pub fn len(&self) -> usize {
        self.sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }

    /// Ordinal of `key` in this collection, if the resource was present at
    /// construction time.
    pub fn ordinal(&self, key: &ResourceKey) -> Option<usize> {
        self.ordinals.get(key).copied()
    }

    pub fn get(&self, index: usize) -> TimelineResult<&ActivityRunSet> {
        self.sets.get(index).ok_or(TimelineError::IndexOutOfRange {
            index,
            len: self.sets.len(),
        })
    }

    pub fn get_mut(&mut self, index: usize) -> TimelineResult<&mut ActivityRunSet> {
        let len = self.sets.len();
        self.sets
            .get_mut(index)
            .ok_or(TimelineError::IndexOutOfRange { index, len })
    }

    pub fn by_key(&self, key: &ResourceKey) -> TimelineResult<&ActivityRunSet> {
        let ordinal = self.ordinal(key).ok_or(TimelineError::NotFound(*key))?;
        Ok(&self.sets[ordinal])
    }

    pub fn by_key_mut(&mut self, key: &ResourceKey) -> TimelineResult<&mut ActivityRunSet> {
        let ordinal = self.ordinal(key).ok_or(TimelineError::NotFound(*key))?;
        Ok(&mut self.sets[ordinal])
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityRunSet> {
        self.sets.iter()
    }
}
