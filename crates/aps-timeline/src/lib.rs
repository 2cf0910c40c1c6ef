//! `aps-timeline` — resource directories, block timelines, and left-neighbor
//! snapshots.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`directory`] | `Capability`, `Resource`, `ResourceDirectory`              |
//! | [`timeline`]  | `Block`, `BlockRef`, `ResourceTimeline`, `BatchBlockIndex` |
//! | [`neighbor`]  | `LeftNeighbor` snapshot + changeover pricing               |
//! | [`run_set`]   | `ActivityRun`, `ActivityRunSet`, `ActivityRunSets`         |
//! | [`error`]     | `TimelineError`, `TimelineResult<T>`                       |
//!
//! # The two questions this crate answers
//!
//! For every placement the optimizer considers: *where on a resource's
//! timeline does an activity land* (ordered directory + append-only block
//! list), and *what does it cost to put it there* (the tail's
//! [`LeftNeighbor`] snapshot, which carries the setup number, attribute set,
//! and cleanout requirement needed to price the changeover).

pub mod directory;
pub mod error;
pub mod neighbor;
pub mod run_set;
pub mod timeline;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use directory::{Capability, Resource, ResourceDirectory};
pub use error::{TimelineError, TimelineResult};
pub use neighbor::LeftNeighbor;
pub use run_set::{ActivityRun, ActivityRunSet, ActivityRunSets};
pub use timeline::{BatchBlockIndex, Block, BlockKind, BlockRef, ResourceTimeline};
