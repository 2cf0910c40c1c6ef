//! Stage observer trait for progress reporting and data collection.

use aps_core::{ResourceKey, Ticks};
use aps_timeline::BlockRef;

use crate::SimEvent;

/// Callbacks invoked by [`Stage::run`][crate::Stage::run] at key points in
/// the drain loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example — changeover counter
///
/// ```rust,ignore
/// #[derive(Default)]
/// struct ChangeoverCounter { count: usize, ticks: u64 }
///
/// impl StageObserver for ChangeoverCounter {
///     fn on_changeover(&mut self, _resource: ResourceKey, ticks: u64) {
///         self.count += 1;
///         self.ticks += ticks;
///     }
/// }
/// ```
pub trait StageObserver {
    /// Called for every event, after extraction and before handling.
    fn on_event(&mut self, _event: &SimEvent) {}

    /// Called when a placement is charged a changeover of `ticks`.
    fn on_changeover(&mut self, _resource: ResourceKey, _ticks: u64) {}

    /// Called after a block (work or cleanout) is appended to a timeline.
    fn on_block(&mut self, _resource: ResourceKey, _node: BlockRef, _end: Ticks) {}

    /// Called once when the queue runs dry.  `processed` is the total event
    /// count handled by this stage across all `run` calls.
    fn on_drained(&mut self, _processed: u64) {}
}

/// A [`StageObserver`] that does nothing.  Use when you need to call `run`
/// but don't want progress callbacks.
pub struct NoopObserver;

impl StageObserver for NoopObserver {}
