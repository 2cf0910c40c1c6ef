//! The `Stage` — one simulation phase over a subset of resources.
//!
//! A stage owns its resource directory snapshot, its event queue, and all
//! per-resource timeline state.  Nothing here is shared between stages:
//! if the surrounding optimizer simulates stages in parallel, each stage is
//! an independent instance and only the immutable domain objects
//! (`Operation`, `Batch`, `Activity`, `Resource` definitions) are shared.
//!
//! # Drain loop
//!
//! Draining processes events in `(time, rank)` order.  A `WorkStart` builds
//! the left-neighbor snapshot from the timeline tail, charges a changeover
//! when the neighbor is dissimilar, appends the work block, records the
//! placement in the resource's run set, and enqueues the follow-on events it
//! discovers (`WorkComplete`, and on a batch's first placement its
//! `CleanoutStart`).  Events are processed atomically: a stage abandoned
//! between `next_event` calls needs no rollback.

use std::sync::Arc;

use aps_core::{Activity, CleanSpan, ResourceKey, Ticks};
use aps_timeline::{
    ActivityRun, ActivityRunSets, BatchBlockIndex, LeftNeighbor, ResourceDirectory,
    ResourceTimeline, TimelineError,
};

use crate::{
    EnqueueOrder, EventKind, EventQueue, SimError, SimEvent, SimResult, StageObserver, TieBreak,
};

// ── StagePhase / StageLimits ──────────────────────────────────────────────────

/// Lifecycle of a stage: `Idle → Simulating → Drained`.
///
/// `Drained` is terminal — adding events afterwards does not resurrect the
/// stage; callers build a fresh one per pass.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum StagePhase {
    /// Constructed, no event extracted yet (the queue may hold seed events).
    Idle,
    /// At least one event extracted and the queue has not run dry.
    Simulating,
    /// The queue ran dry; further extraction fails.
    Drained,
}

/// External bounds imposed on a drain.  The core has no intrinsic timeouts;
/// callers that need wall-clock bounds stop between `run` calls.
#[derive(Copy, Clone, Debug, Default)]
pub struct StageLimits {
    /// Stop after this many events in one `run` call; `None` drains fully.
    pub max_events: Option<u64>,
}

impl StageLimits {
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn max_events(n: u64) -> Self {
        Self { max_events: Some(n) }
    }
}

// ── Stage ─────────────────────────────────────────────────────────────────────

/// One simulation phase: a resource directory snapshot plus its event queue
/// and the timeline state the drain builds up.
pub struct Stage<T: TieBreak = EnqueueOrder> {
    directory: ResourceDirectory,
    queue: EventQueue<T>,
    /// One timeline per resource, index-aligned with `run_sets` ordinals.
    timelines: Vec<ResourceTimeline>,
    run_sets: ActivityRunSets,
    primaries: BatchBlockIndex,
    phase: StagePhase,
    processed: u64,
}

impl Stage<EnqueueOrder> {
    /// A stage over `directory` with the default FIFO tie-break.
    pub fn new(directory: ResourceDirectory) -> Self {
        Self::with_tie_break(directory, EnqueueOrder::default())
    }

    /// A stage pre-loaded with seed events (e.g. from a dispatch list).
    pub fn seeded(directory: ResourceDirectory, events: Vec<SimEvent>) -> Self {
        let mut stage = Self::new(directory);
        for event in events {
            stage.add_event(event);
        }
        stage
    }
}

impl<T: TieBreak> Stage<T> {
    /// A stage using a custom equal-time tie-break.
    pub fn with_tie_break(directory: ResourceDirectory, tie: T) -> Self {
        let run_sets = ActivityRunSets::from_directory(&directory);
        let timelines = directory.keys().map(ResourceTimeline::new).collect();
        Self {
            directory,
            queue: EventQueue::with_tie_break(tie),
            timelines,
            run_sets,
            primaries: BatchBlockIndex::new(),
            phase: StagePhase::Idle,
            processed: 0,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn directory(&self) -> &ResourceDirectory {
        &self.directory
    }

    pub fn phase(&self) -> StagePhase {
        self.phase
    }

    /// Number of pending events.
    pub fn event_count(&self) -> usize {
        self.queue.len()
    }

    /// Total events handled by `run` so far.
    pub fn processed(&self) -> u64 {
        self.processed
    }

    pub fn run_sets(&self) -> &ActivityRunSets {
        &self.run_sets
    }

    pub fn primary_blocks(&self) -> &BatchBlockIndex {
        &self.primaries
    }

    /// The timeline of `key`, if the resource was in the directory snapshot.
    pub fn timeline(&self, key: &ResourceKey) -> Option<&ResourceTimeline> {
        self.run_sets.ordinal(key).map(|i| &self.timelines[i])
    }

    // ── Event queue surface ───────────────────────────────────────────────

    /// Insert an event.  May be called at any time, including mid-drain for
    /// events discovered while processing the current one.
    pub fn add_event(&mut self, event: SimEvent) {
        self.queue.push(event);
    }

    /// Remove and return the minimum event by `(time, rank)`.
    ///
    /// Fails with [`SimError::QueueEmpty`] when the queue is empty; the
    /// first such failure moves the stage to its terminal `Drained` phase.
    pub fn next_event(&mut self) -> SimResult<SimEvent> {
        if self.phase == StagePhase::Drained {
            return Err(SimError::QueueEmpty);
        }
        match self.queue.pop() {
            Some(event) => {
                self.phase = StagePhase::Simulating;
                Ok(event)
            }
            None => {
                self.phase = StagePhase::Drained;
                Err(SimError::QueueEmpty)
            }
        }
    }

    // ── Probe API ─────────────────────────────────────────────────────────

    /// Snapshot of what currently occupies the end of `key`'s timeline.
    pub fn left_neighbor(&self, key: &ResourceKey) -> SimResult<LeftNeighbor> {
        let timeline = self.timeline(key).ok_or(TimelineError::NotFound(*key))?;
        Ok(timeline.snapshot(timeline.tail()))
    }

    /// Snapshot for a hypothetical placement of `activity` ending at `end`.
    /// Pure read — no timeline is touched.
    pub fn candidate_snapshot(&self, activity: &Arc<Activity>, end: Ticks) -> LeftNeighbor {
        LeftNeighbor::for_candidate(activity, end, &self.primaries)
    }

    // ── Drain loop ────────────────────────────────────────────────────────

    /// Drain the queue in `(time, rank)` order, dispatching each event.
    ///
    /// Returns the number of events handled by this call.  Hitting
    /// `limits.max_events` stops early and leaves the stage `Simulating`;
    /// an empty queue moves it to `Drained`.
    pub fn run<O: StageObserver>(
        &mut self,
        limits: &StageLimits,
        observer: &mut O,
    ) -> SimResult<u64> {
        let mut handled: u64 = 0;
        loop {
            if let Some(max) = limits.max_events {
                if handled >= max {
                    break;
                }
            }
            if self.queue.is_empty() {
                if self.phase != StagePhase::Drained {
                    self.phase = StagePhase::Drained;
                    observer.on_drained(self.processed);
                }
                break;
            }
            let event = self.next_event()?;
            observer.on_event(&event);
            self.handle_event(event, observer)?;
            handled += 1;
            self.processed += 1;
        }
        Ok(handled)
    }

    fn handle_event<O: StageObserver>(
        &mut self,
        event: SimEvent,
        observer: &mut O,
    ) -> SimResult<()> {
        let SimEvent { time, resource, kind } = event;
        match kind {
            EventKind::WorkStart(activity) => self.place(resource, activity, time, observer),
            EventKind::CleanoutStart { activity, span } => {
                self.cleanout(resource, activity, span, time, observer)
            }
            // Completions carry no state transition of their own — the block
            // was appended when the work/cleanout started.
            EventKind::WorkComplete(_) | EventKind::CleanoutComplete => Ok(()),
        }
    }

    /// Place `activity` at the tail of `resource`'s timeline.
    fn place<O: StageObserver>(
        &mut self,
        resource: ResourceKey,
        activity: Arc<Activity>,
        now: Ticks,
        observer: &mut O,
    ) -> SimResult<()> {
        let ordinal = self
            .run_sets
            .ordinal(&resource)
            .ok_or(TimelineError::NotFound(resource))?;
        let timeline = &mut self.timelines[ordinal];
        let left = timeline.snapshot(timeline.tail());

        let ready = left.end().unwrap_or(now).max(now);
        let changeover = left.changeover_ticks(activity.operation());
        if changeover > 0 {
            observer.on_changeover(resource, changeover);
        }
        let end = ready + changeover + activity.run_ticks();

        let node = timeline.append(activity.clone(), end)?;
        observer.on_block(resource, node, end);

        // A changeover (or an empty run set) starts a new run; otherwise the
        // placement extends the current changeover-free group.
        let run_set = self.run_sets.get_mut(ordinal)?;
        match run_set.last_mut() {
            Some(run) if changeover == 0 => run.push(activity.clone()),
            _ => run_set.push(ActivityRun::single(activity.clone())),
        }

        // A batch's first placement registers its primary block and
        // schedules the batch cleanout at this block's end.
        if let Some(batch) = activity.batch() {
            let (batch_id, clean_span) = (batch.id, batch.clean_span);
            if self.primaries.register_primary(batch_id, node) {
                if let CleanSpan::Ticks(span) = clean_span {
                    self.queue
                        .push(SimEvent::cleanout_start(end, resource, activity.clone(), span));
                }
            }
        }

        self.queue.push(SimEvent::work_complete(end, resource, activity));
        Ok(())
    }

    /// Append a cleanout block after `resource`'s current tail.
    fn cleanout<O: StageObserver>(
        &mut self,
        resource: ResourceKey,
        activity: Arc<Activity>,
        span: u64,
        now: Ticks,
        observer: &mut O,
    ) -> SimResult<()> {
        let ordinal = self
            .run_sets
            .ordinal(&resource)
            .ok_or(TimelineError::NotFound(resource))?;
        let timeline = &mut self.timelines[ordinal];

        // Batch members placed after the cleanout was scheduled have moved
        // the tail; the cleanout starts when the resource is next free.
        let start = timeline.end().unwrap_or(now).max(now);
        let end = start + span;
        let node = timeline.append_cleanout(activity, end)?;
        observer.on_block(resource, node, end);

        self.queue.push(SimEvent::cleanout_complete(end, resource));
        Ok(())
    }
}
