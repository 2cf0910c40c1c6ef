//! CSV dispatch-list loader.
//!
//! # CSV format
//!
//! One row per released activity.  Resources are created on first sight;
//! operations and batches are deduplicated by ID and shared across rows.
//!
//! ```csv
//! resource_rank,resource_id,activity_id,operation_id,setup_number,attributes,run_ticks,setup_ticks,batch_id,clean_span,release_tick
//! 0,1,100,10,1,3;7,20,5,,,0
//! 0,1,101,10,1,3;7,20,5,,,0
//! 0,2,102,11,2,4,15,5,1,30,10
//! 0,2,103,11,2,4,15,5,1,30,10
//! ```
//!
//! | Field        | Meaning                                                  |
//! |--------------|----------------------------------------------------------|
//! | `attributes` | `;`-separated `u16` tags; empty for none                 |
//! | `batch_id`   | empty for unbatched activities                           |
//! | `clean_span` | empty or `na` for no cleanout, else a tick count (`u64`) |
//!
//! Each row seeds one `WorkStart` event at `release_tick`.  Every resource's
//! capability is `Machine` with the union of the tags seen on its rows, so a
//! loaded directory is self-consistently eligible for its own dispatch list.

use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::Deserialize;

use aps_core::{
    Activity, ActivityId, AttributeId, AttributeSet, Batch, BatchId, CleanSpan, Operation,
    OperationId, ResourceId, ResourceKey, SetupNumber, Ticks,
};
use aps_timeline::{Capability, Resource, ResourceDirectory};

use crate::{SimError, SimEvent, SimResult};

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct DispatchRecord {
    resource_rank: u16,
    resource_id:   u32,
    activity_id:   u32,
    operation_id:  u32,
    setup_number:  u16,
    attributes:    String,
    run_ticks:     u64,
    setup_ticks:   u64,
    batch_id:      Option<u32>,
    clean_span:    String,
    release_tick:  u64,
}

impl DispatchRecord {
    fn resource_key(&self) -> ResourceKey {
        ResourceKey::new(self.resource_rank, ResourceId(self.resource_id))
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// A loaded dispatch list: the directory of referenced resources plus the
/// seed events, ready for [`Stage::seeded`][crate::Stage::seeded].
#[derive(Debug)]
pub struct DispatchList {
    pub directory: ResourceDirectory,
    pub events: Vec<SimEvent>,
}

/// Load a dispatch list from a CSV file.
pub fn load_dispatch_csv(path: &Path) -> SimResult<DispatchList> {
    let file = std::fs::File::open(path).map_err(SimError::Io)?;
    load_dispatch_reader(file)
}

/// Like [`load_dispatch_csv`] but accepts any `Read` source.
///
/// Useful for testing (pass a `std::io::Cursor`) or loading from network
/// streams.
pub fn load_dispatch_reader<R: Read>(reader: R) -> SimResult<DispatchList> {
    // ── Parse CSV rows ────────────────────────────────────────────────────
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut rows: Vec<DispatchRecord> = Vec::new();
    for result in csv_reader.deserialize::<DispatchRecord>() {
        rows.push(result.map_err(|e| SimError::Parse(e.to_string()))?);
    }

    // ── Build the directory (capability = union of tags per resource) ─────
    let mut tags_by_key: FxHashMap<ResourceKey, Vec<AttributeId>> = FxHashMap::default();
    for row in &rows {
        tags_by_key
            .entry(row.resource_key())
            .or_default()
            .extend(parse_attributes(&row.attributes)?);
    }

    let mut directory = ResourceDirectory::new();
    for (key, tags) in tags_by_key {
        let capability = Capability::Machine { tags: AttributeSet::new(tags) };
        directory.add(Resource::new(key, format!("R{}", key.id.0), capability))?;
    }

    // ── Build shared operations/batches and seed events ───────────────────
    let mut operations: FxHashMap<u32, Arc<Operation>> = FxHashMap::default();
    let mut batches: FxHashMap<u32, Arc<Batch>> = FxHashMap::default();
    let mut events = Vec::with_capacity(rows.len());

    for row in rows {
        let attributes = AttributeSet::new(parse_attributes(&row.attributes)?);
        let operation = operations
            .entry(row.operation_id)
            .or_insert_with(|| {
                Arc::new(Operation {
                    id:           OperationId(row.operation_id),
                    setup_number: SetupNumber(row.setup_number),
                    attributes,
                    run_ticks:    row.run_ticks,
                    setup_ticks:  row.setup_ticks,
                })
            })
            .clone();

        let activity = match row.batch_id {
            None => Arc::new(Activity::new(ActivityId(row.activity_id), operation)),
            Some(id) => {
                let clean_span = parse_clean_span(&row.clean_span)?;
                let batch = batches
                    .entry(id)
                    .or_insert_with(|| Arc::new(Batch { id: BatchId(id), clean_span }))
                    .clone();
                Arc::new(Activity::batched(ActivityId(row.activity_id), operation, batch))
            }
        };

        events.push(SimEvent::work_start(
            Ticks(row.release_tick),
            row.resource_key(),
            activity,
        ));
    }

    Ok(DispatchList { directory, events })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn parse_attributes(s: &str) -> Result<Vec<AttributeId>, SimError> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(Vec::new());
    }
    s.split(';')
        .map(|tag| {
            tag.trim().parse::<u16>().map(AttributeId).map_err(|_| {
                SimError::Parse(format!("invalid attribute tag {tag:?}: expected a u16"))
            })
        })
        .collect()
}

fn parse_clean_span(s: &str) -> Result<CleanSpan, SimError> {
    match s.trim() {
        "" | "na" => Ok(CleanSpan::NotApplicable),
        n => n.parse::<u64>().map(CleanSpan::Ticks).map_err(|_| {
            SimError::Parse(format!(
                "invalid clean span {n:?}: expected \"na\" or a tick count (u64)"
            ))
        }),
    }
}
