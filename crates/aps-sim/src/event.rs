//! Discrete simulation events.

use std::sync::Arc;

use aps_core::{Activity, ResourceKey, Ticks};

// ── EventKind ─────────────────────────────────────────────────────────────────

/// What happens when an event is processed.
#[derive(Clone, Debug)]
pub enum EventKind {
    /// An activity is released to its resource and placed at the timeline
    /// tail (computing changeover against the left neighbor).
    WorkStart(Arc<Activity>),
    /// A previously placed activity's work block ends.
    WorkComplete(Arc<Activity>),
    /// A batch cleanout begins on the resource.  `span` is the cleanout
    /// duration in ticks; `activity` is the batched activity that required it.
    CleanoutStart { activity: Arc<Activity>, span: u64 },
    /// A cleanout block ends.
    CleanoutComplete,
}

impl EventKind {
    /// Short kind name for observers and logs.
    pub fn label(&self) -> &'static str {
        match self {
            EventKind::WorkStart(_) => "work-start",
            EventKind::WorkComplete(_) => "work-complete",
            EventKind::CleanoutStart { .. } => "cleanout-start",
            EventKind::CleanoutComplete => "cleanout-complete",
        }
    }
}

// ── SimEvent ──────────────────────────────────────────────────────────────────

/// A discrete occurrence at an absolute time on one resource.
///
/// Immutable once enqueued; the queue assigns the secondary tie-break rank
/// at enqueue time, not here.
#[derive(Clone, Debug)]
pub struct SimEvent {
    pub time: Ticks,
    pub resource: ResourceKey,
    pub kind: EventKind,
}

impl SimEvent {
    pub fn work_start(time: Ticks, resource: ResourceKey, activity: Arc<Activity>) -> Self {
        Self { time, resource, kind: EventKind::WorkStart(activity) }
    }

    pub fn work_complete(time: Ticks, resource: ResourceKey, activity: Arc<Activity>) -> Self {
        Self { time, resource, kind: EventKind::WorkComplete(activity) }
    }

    pub fn cleanout_start(
        time: Ticks,
        resource: ResourceKey,
        activity: Arc<Activity>,
        span: u64,
    ) -> Self {
        Self { time, resource, kind: EventKind::CleanoutStart { activity, span } }
    }

    pub fn cleanout_complete(time: Ticks, resource: ResourceKey) -> Self {
        Self { time, resource, kind: EventKind::CleanoutComplete }
    }
}
