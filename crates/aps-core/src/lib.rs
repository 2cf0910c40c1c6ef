//! `aps-core` — foundational types for the `aps` finite-capacity scheduling
//! engine.
//!
//! This crate is a dependency of every other `aps-*` crate.  It intentionally
//! has no `aps-*` dependencies and no required external ones (only optional
//! `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                    |
//! |-----------|-------------------------------------------------------------|
//! | [`ids`]   | `ResourceId`, `ActivityId`, `OperationId`, `BatchId`, `AttributeId`, `ResourceKey` |
//! | [`time`]  | `Ticks`                                                     |
//! | [`setup`] | `SetupNumber`, `AttributeSet`, `CleanSpan`                  |
//! | [`model`] | `Operation`, `Batch`, `Activity` read contracts             |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                        |
//! |---------|---------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to the durable public types    |
//!           | (keys, IDs, `Ticks`, setup values).  Domain read contracts    |
//!           | stay non-serializable — they are never persisted.             |

pub mod ids;
pub mod model;
pub mod setup;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use ids::{ActivityId, AttributeId, BatchId, OperationId, ResourceId, ResourceKey};
pub use model::{Activity, Batch, Operation};
pub use setup::{AttributeSet, CleanSpan, SetupNumber};
pub use time::Ticks;
