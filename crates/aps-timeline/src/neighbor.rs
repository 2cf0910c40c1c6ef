//! Left-neighbor snapshots — the values that price a changeover.
//!
//! # Two construction paths
//!
//! A snapshot can be built from a concrete timeline node
//! ([`ResourceTimeline::snapshot`]) or from a hypothetical `(activity, end)`
//! pair ([`LeftNeighbor::for_candidate`]).  Both populate the same fields;
//! the candidate path additionally resolves the activity's batch primary
//! block so a caller pricing a multi-resource batch can walk further left on
//! that resource's own timeline.  Candidate snapshots never touch a
//! timeline, so the optimizer can probe speculative placements freely and
//! discard the results.
//!
//! Snapshots are immutable once built.

use std::sync::Arc;

use aps_core::{Activity, AttributeSet, CleanSpan, Operation, SetupNumber, Ticks};

use crate::{BatchBlockIndex, Block, BlockRef};

/// Everything known about the activity immediately preceding a candidate
/// slot, or nothing at all (empty timeline).
pub struct LeftNeighbor {
    inner: Option<NeighborInfo>,
}

struct NeighborInfo {
    activity: Arc<Activity>,
    end: Ticks,
    setup_number: SetupNumber,
    attributes: AttributeSet,
    scheduled_cleanout: CleanSpan,
    /// The neighbor's timeline node, when one exists: the source node for
    /// node-built snapshots, the batch's primary block for candidate-built
    /// snapshots of batched activities.
    node: Option<BlockRef>,
}

impl LeftNeighbor {
    /// The snapshot of "no predecessor": nothing is populated and
    /// [`scheduled_cleanout`](LeftNeighbor::scheduled_cleanout) is
    /// `NotApplicable`.
    pub fn uninitialized() -> Self {
        Self { inner: None }
    }

    pub(crate) fn from_block(block: &Block, node: BlockRef) -> Self {
        Self::populate(block.activity().clone(), block.end(), Some(node))
    }

    /// Build a snapshot for a hypothetical placement of `activity` ending at
    /// `end`, without any timeline involvement.
    ///
    /// When the activity is batched and its batch has a registered primary
    /// block, that node is recorded so the caller can keep walking left.
    pub fn for_candidate(
        activity: &Arc<Activity>,
        end: Ticks,
        primaries: &BatchBlockIndex,
    ) -> Self {
        let node = activity.batch_id().and_then(|b| primaries.primary_block(b));
        Self::populate(activity.clone(), end, node)
    }

    fn populate(activity: Arc<Activity>, end: Ticks, node: Option<BlockRef>) -> Self {
        let op = activity.operation();
        let info = NeighborInfo {
            setup_number: op.setup_number,
            attributes: op.attributes.clone(),
            scheduled_cleanout: activity.clean_span(),
            end,
            node,
            activity,
        };
        Self { inner: Some(info) }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    pub fn activity(&self) -> Option<&Arc<Activity>> {
        self.inner.as_ref().map(|i| &i.activity)
    }

    /// End time of the neighboring block.
    pub fn end(&self) -> Option<Ticks> {
        self.inner.as_ref().map(|i| i.end)
    }

    pub fn setup_number(&self) -> Option<SetupNumber> {
        self.inner.as_ref().map(|i| i.setup_number)
    }

    pub fn attributes(&self) -> Option<&AttributeSet> {
        self.inner.as_ref().map(|i| &i.attributes)
    }

    /// The neighbor's batch clean span; `NotApplicable` when the neighbor is
    /// unbatched or the snapshot is uninitialized.
    pub fn scheduled_cleanout(&self) -> CleanSpan {
        match &self.inner {
            Some(i) => i.scheduled_cleanout,
            None => CleanSpan::NotApplicable,
        }
    }

    /// The neighbor's timeline node, for further left-walks.
    pub fn node(&self) -> Option<BlockRef> {
        self.inner.as_ref().and_then(|i| i.node)
    }

    // ── Changeover pricing ────────────────────────────────────────────────

    /// Would appending an activity of `next` after this neighbor require a
    /// changeover?
    ///
    /// An empty timeline never requires one.  Otherwise a changeover is
    /// required when the setup numbers differ or the attribute sets are not
    /// equal.
    pub fn requires_changeover(&self, next: &Operation) -> bool {
        match &self.inner {
            None => false,
            Some(i) => i.setup_number != next.setup_number || i.attributes != next.attributes,
        }
    }

    /// Changeover duration charged before `next` can start: the operation's
    /// `setup_ticks` when a changeover is required, else 0.
    pub fn changeover_ticks(&self, next: &Operation) -> u64 {
        if self.requires_changeover(next) { next.setup_ticks } else { 0 }
    }
}
