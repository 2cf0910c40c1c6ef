//! `aps-sim` — per-stage discrete-event simulation for the aps scheduling
//! engine.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                 |
//! |--------------|----------------------------------------------------------|
//! | [`event`]    | `SimEvent`, `EventKind`                                  |
//! | [`queue`]    | `EventQueue` (binary heap), `TieBreak`, `EnqueueOrder`   |
//! | [`stage`]    | `Stage`, `StagePhase`, `StageLimits`                     |
//! | [`observer`] | `StageObserver`, `NoopObserver`                          |
//! | [`loader`]   | `load_dispatch_csv`, `load_dispatch_reader`              |
//! | [`error`]    | `SimError`, `SimResult<T>`                               |
//!
//! # Determinism
//!
//! A drain is a pure function of the insertion sequence: events extract in
//! `(time, rank)` order and the default tie-break assigns ranks from a
//! monotone enqueue counter.  Re-running a stage with the same seed events
//! reproduces the same timelines, run sets, and follow-on events, which is
//! what makes drains usable as regression fixtures.

pub mod error;
pub mod event;
pub mod loader;
pub mod observer;
pub mod queue;
pub mod stage;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SimError, SimResult};
pub use event::{EventKind, SimEvent};
pub use loader::{DispatchList, load_dispatch_csv, load_dispatch_reader};
pub use observer::{NoopObserver, StageObserver};
pub use queue::{EnqueueOrder, EventQueue, TieBreak};
pub use stage::{Stage, StageLimits, StagePhase};
