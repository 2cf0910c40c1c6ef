//! Read-only domain contracts: `Operation`, `Batch`, `Activity`.
//!
//! These types are produced and owned by upstream planning logic; this core
//! only reads their sequencing-relevant fields.  They are shared via `Arc`
//! so that independent stages can be driven from different threads without
//! copying the plan, and none of them derive serde — transient sequencing
//! state is rebuilt per simulation pass, never persisted.

use std::sync::Arc;

use crate::{ActivityId, AttributeSet, BatchId, CleanSpan, OperationId, SetupNumber};

// ── Operation ─────────────────────────────────────────────────────────────────

/// The work definition an activity executes.
///
/// Many activities may share one operation; the operation carries everything
/// a changeover decision needs.
#[derive(Clone, Debug)]
pub struct Operation {
    pub id: OperationId,
    /// Ordered setup identity; equal numbers sequence without a changeover.
    pub setup_number: SetupNumber,
    /// Categorical tags compared for setup compatibility.
    pub attributes: AttributeSet,
    /// Processing duration of one activity, in ticks.
    pub run_ticks: u64,
    /// Changeover duration charged when the left neighbor is dissimilar.
    pub setup_ticks: u64,
}

// ── Batch ─────────────────────────────────────────────────────────────────────

/// A group of activities processed as one campaign, sharing a cleanout.
///
/// The batch's primary timeline block is *not* stored here — timelines own
/// their nodes, and the batch → primary-block relation lives in an external
/// lookup table keyed by `BatchId`.
#[derive(Clone, Debug)]
pub struct Batch {
    pub id: BatchId,
    /// Cleanout requirement inserted on the timeline after the batch's work.
    pub clean_span: CleanSpan,
}

// ── Activity ──────────────────────────────────────────────────────────────────

/// A unit of work released to a resource.
#[derive(Clone, Debug)]
pub struct Activity {
    pub id: ActivityId,
    operation: Arc<Operation>,
    batch: Option<Arc<Batch>>,
}

impl Activity {
    /// An unbatched activity.
    pub fn new(id: ActivityId, operation: Arc<Operation>) -> Self {
        Self { id, operation, batch: None }
    }

    /// An activity that is a member of `batch`.
    pub fn batched(id: ActivityId, operation: Arc<Operation>, batch: Arc<Batch>) -> Self {
        Self { id, operation, batch: Some(batch) }
    }

    pub fn operation(&self) -> &Arc<Operation> {
        &self.operation
    }

    pub fn batch(&self) -> Option<&Arc<Batch>> {
        self.batch.as_ref()
    }

    pub fn batch_id(&self) -> Option<BatchId> {
        self.batch.as_ref().map(|b| b.id)
    }

    #[inline]
    pub fn setup_number(&self) -> SetupNumber {
        self.operation.setup_number
    }

    pub fn attributes(&self) -> &AttributeSet {
        &self.operation.attributes
    }

    #[inline]
    pub fn run_ticks(&self) -> u64 {
        self.operation.run_ticks
    }

    /// The batch's clean span, or `NotApplicable` for unbatched activities.
    pub fn clean_span(&self) -> CleanSpan {
        match &self.batch {
            Some(b) => b.clean_span,
            None => CleanSpan::NotApplicable,
        }
    }
}
