//! Per-resource block timelines and the batch → primary-block relation.
//!
//! # Why append-only
//!
//! During a simulation pass every placement lands at the right frontier of
//! its resource's timeline, so the storage is a plain `Vec<Block>` with O(1)
//! tail access and positions that stay valid for the whole pass.  A
//! [`BlockRef`] is therefore a stable node reference: resource key plus
//! position.
//!
//! # Ordering invariant
//!
//! Block end times are monotonically non-decreasing along the `Vec`.  Every
//! append validates against the current tail *before* pushing, so a rejected
//! append leaves the timeline untouched.

use std::sync::Arc;

use aps_core::{Activity, BatchId, ResourceKey, Ticks};
use rustc_hash::FxHashMap;

use crate::{LeftNeighbor, TimelineError, TimelineResult};

// ── Block / BlockRef ──────────────────────────────────────────────────────────

/// What kind of occupation a block represents.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum BlockKind {
    /// Processing time of the occupying activity.
    Work,
    /// A batch cleanout following that batch's work.  The block still
    /// references the batched activity that required it.
    Cleanout,
}

/// A contiguous occupied interval on a resource's timeline.
#[derive(Clone, Debug)]
pub struct Block {
    activity: Arc<Activity>,
    end: Ticks,
    kind: BlockKind,
}

impl Block {
    pub fn activity(&self) -> &Arc<Activity> {
        &self.activity
    }

    #[inline]
    pub fn end(&self) -> Ticks {
        self.end
    }

    #[inline]
    pub fn kind(&self) -> BlockKind {
        self.kind
    }

    pub fn is_cleanout(&self) -> bool {
        self.kind == BlockKind::Cleanout
    }
}

/// A stable reference to one block (node) on one resource's timeline.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct BlockRef {
    pub resource: ResourceKey,
    pub position: usize,
}

// ── ResourceTimeline ──────────────────────────────────────────────────────────

/// Ordered sequence of occupied intervals on one resource.
pub struct ResourceTimeline {
    resource: ResourceKey,
    blocks: Vec<Block>,
}

impl ResourceTimeline {
    pub fn new(resource: ResourceKey) -> Self {
        Self { resource, blocks: Vec::new() }
    }

    #[inline]
    pub fn resource(&self) -> ResourceKey {
        self.resource
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// All blocks in timeline order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// End time of the tail block — the resource's current right frontier.
    pub fn end(&self) -> Option<Ticks> {
        self.blocks.last().map(|b| b.end)
    }

    /// The current last node, or `None` if the timeline is empty.
    pub fn tail(&self) -> Option<BlockRef> {
        if self.blocks.is_empty() {
            None
        } else {
            Some(BlockRef { resource: self.resource, position: self.blocks.len() - 1 })
        }
    }

    pub fn tail_block(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn block(&self, position: usize) -> Option<&Block> {
        self.blocks.get(position)
    }

    /// Resolve a node reference on this timeline.
    pub fn get(&self, node: BlockRef) -> Option<&Block> {
        debug_assert_eq!(node.resource, self.resource, "node belongs to another timeline");
        self.blocks.get(node.position)
    }

    /// Append a work block ending at `end`.
    ///
    /// Fails with [`TimelineError::OrderingViolation`] if `end` precedes the
    /// current tail's end time; the timeline is unchanged on failure.
    pub fn append(&mut self, activity: Arc<Activity>, end: Ticks) -> TimelineResult<BlockRef> {
        self.push(activity, end, BlockKind::Work)
    }

    /// Append a cleanout block ending at `end`.  Same ordering contract as
    /// [`append`](ResourceTimeline::append).
    pub fn append_cleanout(
        &mut self,
        activity: Arc<Activity>,
        end: Ticks,
    ) -> TimelineResult<BlockRef> {
        self.push(activity, end, BlockKind::Cleanout)
    }

    /// Build a [`LeftNeighbor`] snapshot from a timeline node.
    ///
    /// `None` (empty timeline) yields the uninitialized snapshot.
    pub fn snapshot(&self, node: Option<BlockRef>) -> LeftNeighbor {
        match node {
            None => LeftNeighbor::uninitialized(),
            Some(n) => {
                debug_assert_eq!(n.resource, self.resource, "node belongs to another timeline");
                LeftNeighbor::from_block(&self.blocks[n.position], n)
            }
        }
    }

    fn push(
        &mut self,
        activity: Arc<Activity>,
        end: Ticks,
        kind: BlockKind,
    ) -> TimelineResult<BlockRef> {
        if let Some(tail) = self.blocks.last() {
            if end < tail.end {
                return Err(TimelineError::OrderingViolation { tail: tail.end, attempted: end });
            }
        }
        let node = BlockRef { resource: self.resource, position: self.blocks.len() };
        self.blocks.push(Block { activity, end, kind });
        Ok(node)
    }
}

// ── BatchBlockIndex ───────────────────────────────────────────────────────────

/// Lookup table `BatchId → primary BlockRef`.
///
/// Timelines own their nodes; batches hold no back-pointer.  This table is
/// the one place the "which node is a batch's defining block" relation
/// lives, and it stores lookup-only references.
#[derive(Default)]
pub struct BatchBlockIndex {
    inner: FxHashMap<BatchId, BlockRef>,
}

impl BatchBlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `node` as the primary block of `batch`.
    ///
    /// The first registration wins; returns `true` if this call registered
    /// it, `false` if the batch already had a primary block.
    pub fn register_primary(&mut self, batch: BatchId, node: BlockRef) -> bool {
        if self.inner.contains_key(&batch) {
            return false;
        }
        self.inner.insert(batch, node);
        true
    }

    /// The timeline node where `batch`'s defining block lives, if registered.
    pub fn primary_block(&self, batch: BatchId) -> Option<BlockRef> {
        self.inner.get(&batch).copied()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
