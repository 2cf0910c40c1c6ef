//! Integration tests for aps-sim.

use std::sync::Arc;

use aps_core::{
    Activity, ActivityId, AttributeId, AttributeSet, Batch, BatchId, CleanSpan, Operation,
    OperationId, ResourceId, ResourceKey, SetupNumber, Ticks,
};
use aps_timeline::{Capability, Resource, ResourceDirectory, TimelineError};

use crate::{
    EventKind, EventQueue, SimError, SimEvent, Stage, StageLimits, StageObserver, TieBreak,
};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn op(setup: u16, run_ticks: u64, setup_ticks: u64) -> Arc<Operation> {
    Arc::new(Operation {
        id:           OperationId(setup as u32),
        setup_number: SetupNumber(setup),
        attributes:   AttributeSet::empty(),
        run_ticks,
        setup_ticks,
    })
}

fn act(id: u32, operation: Arc<Operation>) -> Arc<Activity> {
    Arc::new(Activity::new(ActivityId(id), operation))
}

fn batched(id: u32, operation: Arc<Operation>, batch: Arc<Batch>) -> Arc<Activity> {
    Arc::new(Activity::batched(ActivityId(id), operation, batch))
}

fn key(rank: u16, id: u32) -> ResourceKey {
    ResourceKey::new(rank, ResourceId(id))
}

fn machine(rank: u16, id: u32) -> Resource {
    Resource::new(
        key(rank, id),
        format!("M{id}"),
        Capability::Machine { tags: AttributeSet::empty() },
    )
}

fn directory(ids: &[u32]) -> ResourceDirectory {
    let mut dir = ResourceDirectory::new();
    for &id in ids {
        dir.add(machine(0, id)).unwrap();
    }
    dir
}

/// Activity ID of a `WorkStart` event (panics on other kinds).
fn started_id(event: &SimEvent) -> u32 {
    match &event.kind {
        EventKind::WorkStart(a) => a.id.0,
        other => panic!("expected work-start, got {}", other.label()),
    }
}

/// Records every extracted event as `(time, resource, label)`.
#[derive(Default)]
struct Recorder {
    events: Vec<(u64, ResourceKey, &'static str)>,
    changeovers: Vec<(ResourceKey, u64)>,
    drained_at: Option<u64>,
}

impl StageObserver for Recorder {
    fn on_event(&mut self, event: &SimEvent) {
        self.events.push((event.time.0, event.resource, event.kind.label()));
    }

    fn on_changeover(&mut self, resource: ResourceKey, ticks: u64) {
        self.changeovers.push((resource, ticks));
    }

    fn on_drained(&mut self, processed: u64) {
        self.drained_at = Some(processed);
    }
}

// ── EventQueue ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod queue {
    use super::*;

    #[test]
    fn pops_in_time_order() {
        let mut q = EventQueue::new();
        let o = op(1, 10, 0);
        q.push(SimEvent::work_start(Ticks(10), key(0, 1), act(1, o.clone())));
        q.push(SimEvent::work_start(Ticks(5), key(0, 1), act(2, o.clone())));
        q.push(SimEvent::work_start(Ticks(7), key(0, 1), act(3, o)));

        assert_eq!(q.len(), 3);
        assert_eq!(q.peek_time(), Some(Ticks(5)));
        let times: Vec<u64> = std::iter::from_fn(|| q.pop()).map(|e| e.time.0).collect();
        assert_eq!(times, vec![5, 7, 10]);
        assert!(q.is_empty());
    }

    #[test]
    fn equal_times_pop_in_insertion_order() {
        let mut q = EventQueue::new();
        let o = op(1, 10, 0);
        for id in [1, 2, 3] {
            q.push(SimEvent::work_start(Ticks(10), key(0, id), act(id, o.clone())));
        }
        let ids: Vec<u32> = std::iter::from_fn(|| q.pop()).map(|e| started_id(&e)).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn pop_empty_returns_none() {
        let mut q = EventQueue::new();
        assert!(q.pop().is_none());
        assert!(q.peek_time().is_none());
    }

    #[test]
    fn custom_tie_break_is_injectable() {
        // Reverse-insertion ranks: equal-time events pop LIFO.
        struct LifoOrder {
            next: u64,
        }
        impl TieBreak for LifoOrder {
            fn rank(&mut self, _event: &SimEvent) -> u64 {
                self.next -= 1;
                self.next
            }
        }

        let mut q = EventQueue::with_tie_break(LifoOrder { next: u64::MAX });
        let o = op(1, 10, 0);
        for id in [1, 2, 3] {
            q.push(SimEvent::work_start(Ticks(10), key(0, id), act(id, o.clone())));
        }
        let ids: Vec<u32> = std::iter::from_fn(|| q.pop()).map(|e| started_id(&e)).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn extraction_is_deterministic_across_runs() {
        use rand::rngs::SmallRng;
        use rand::{Rng, SeedableRng};

        // Same insertion sequence → same extraction sequence, with heavy
        // time collisions to exercise the tie-break.
        let mut rng = SmallRng::seed_from_u64(7);
        let times: Vec<u64> = (0..300).map(|_| rng.gen_range(0..40)).collect();

        let o = op(1, 10, 0);
        let drain = |times: &[u64]| -> Vec<(u64, u32)> {
            let mut q = EventQueue::new();
            for (i, &t) in times.iter().enumerate() {
                q.push(SimEvent::work_start(Ticks(t), key(0, 1), act(i as u32, o.clone())));
            }
            std::iter::from_fn(|| q.pop())
                .map(|e| (e.time.0, started_id(&e)))
                .collect()
        };

        let first = drain(&times);
        let second = drain(&times);
        assert_eq!(first, second);
        assert!(first.windows(2).all(|w| w[0].0 <= w[1].0), "times must be non-decreasing");
    }
}

// ── Stage lifecycle ───────────────────────────────────────────────────────────

#[cfg(test)]
mod stage_lifecycle {
    use super::*;
    use crate::StagePhase;

    #[test]
    fn idle_to_simulating_to_drained() {
        let mut stage = Stage::new(directory(&[1]));
        stage.add_event(SimEvent::work_start(Ticks(0), key(0, 1), act(1, op(1, 10, 0))));
        assert_eq!(stage.phase(), StagePhase::Idle);
        assert_eq!(stage.event_count(), 1);

        stage.next_event().unwrap();
        assert_eq!(stage.phase(), StagePhase::Simulating);

        let err = stage.next_event().unwrap_err();
        assert!(matches!(err, SimError::QueueEmpty));
        assert_eq!(stage.phase(), StagePhase::Drained);
    }

    #[test]
    fn drained_is_terminal() {
        let mut stage = Stage::new(directory(&[1]));
        assert!(stage.next_event().is_err());
        assert_eq!(stage.phase(), StagePhase::Drained);

        // Late arrivals do not resurrect a drained stage.
        stage.add_event(SimEvent::work_start(Ticks(0), key(0, 1), act(1, op(1, 10, 0))));
        assert!(matches!(stage.next_event(), Err(SimError::QueueEmpty)));
    }

    #[test]
    fn max_events_stops_early_and_keeps_simulating() {
        let mut stage = Stage::new(directory(&[1]));
        let o = op(1, 10, 0);
        for id in 0..3 {
            stage.add_event(SimEvent::work_start(Ticks(0), key(0, 1), act(id, o.clone())));
        }

        let handled = stage.run(&StageLimits::max_events(1), &mut crate::NoopObserver).unwrap();
        assert_eq!(handled, 1);
        assert_eq!(stage.phase(), StagePhase::Simulating);
        assert!(stage.event_count() > 0);

        // Finishing the drain reaches the terminal phase.
        stage.run(&StageLimits::unbounded(), &mut crate::NoopObserver).unwrap();
        assert_eq!(stage.phase(), StagePhase::Drained);
        assert_eq!(stage.processed(), 6); // 3 placements + 3 completions
    }

    #[test]
    fn event_for_unknown_resource_errors() {
        let mut stage = Stage::new(directory(&[1]));
        stage.add_event(SimEvent::work_start(Ticks(0), key(9, 9), act(1, op(1, 10, 0))));
        let err = stage.run(&StageLimits::unbounded(), &mut crate::NoopObserver).unwrap_err();
        assert!(matches!(err, SimError::Timeline(TimelineError::NotFound(_))));
    }
}

// ── Stage drains ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod stage_drain {
    use super::*;

    /// The canonical two-resource drain: a later-enqueued but earlier-timed
    /// cleanout runs first; equal-time starts keep their enqueue order.
    #[test]
    fn drain_orders_by_time_then_enqueue_order() {
        let r1 = key(0, 1);
        let r2 = key(0, 2);
        let o = op(1, 10, 0);

        let mut stage = Stage::new(directory(&[1, 2]));
        stage.add_event(SimEvent::work_start(Ticks(10), r1, act(1, o.clone())));
        stage.add_event(SimEvent::work_start(Ticks(10), r2, act(2, o.clone())));
        stage.add_event(SimEvent::cleanout_start(Ticks(5), r1, act(3, o), 2));

        let mut rec = Recorder::default();
        let handled = stage.run(&StageLimits::unbounded(), &mut rec).unwrap();
        assert_eq!(handled, 6);

        assert_eq!(
            rec.events,
            vec![
                (5, r1, "cleanout-start"),
                (7, r1, "cleanout-complete"),
                (10, r1, "work-start"),
                (10, r2, "work-start"),
                (20, r1, "work-complete"),
                (20, r2, "work-complete"),
            ]
        );
        assert_eq!(rec.drained_at, Some(6));

        // The cleanout block occupies [..7]; work starts at its release.
        let tl = stage.timeline(&r1).unwrap();
        assert_eq!(tl.len(), 2);
        assert!(tl.block(0).unwrap().is_cleanout());
        assert_eq!(tl.end(), Some(Ticks(20)));
    }

    #[test]
    fn snapshot_flips_from_uninitialized_to_tail_state() {
        let r1 = key(0, 1);
        let mut stage = Stage::new(directory(&[1]));
        assert!(!stage.left_neighbor(&r1).unwrap().is_initialized());

        stage.add_event(SimEvent::work_start(Ticks(0), r1, act(1, op(5, 100, 0))));
        stage.run(&StageLimits::unbounded(), &mut crate::NoopObserver).unwrap();

        let snap = stage.left_neighbor(&r1).unwrap();
        assert!(snap.is_initialized());
        assert_eq!(snap.end(), Some(Ticks(100)));
        assert_eq!(snap.setup_number(), Some(SetupNumber(5)));
    }

    #[test]
    fn changeovers_split_runs_and_extend_makespan() {
        let r1 = key(0, 1);
        let same = op(1, 10, 5);
        let other = op(2, 10, 5);

        let mut stage = Stage::new(directory(&[1]));
        stage.add_event(SimEvent::work_start(Ticks(0), r1, act(1, same.clone())));
        stage.add_event(SimEvent::work_start(Ticks(0), r1, act(2, same)));
        stage.add_event(SimEvent::work_start(Ticks(0), r1, act(3, other)));

        let mut rec = Recorder::default();
        stage.run(&StageLimits::unbounded(), &mut rec).unwrap();

        // a1: [0,10]  a2: [10,20]  a3: changeover 5 then [25,35].
        let tl = stage.timeline(&r1).unwrap();
        let ends: Vec<u64> = tl.blocks().iter().map(|b| b.end().0).collect();
        assert_eq!(ends, vec![10, 20, 35]);
        assert_eq!(rec.changeovers, vec![(r1, 5)]);

        // Two runs: the changeover-free pair, then the dissimilar activity.
        let rs = stage.run_sets().by_key(&r1).unwrap();
        assert_eq!(rs.len(), 2);
        assert_eq!(rs.run(0).unwrap().len(), 2);
        assert_eq!(rs.run(1).unwrap().first().unwrap().id, ActivityId(3));
    }

    #[test]
    fn batch_placement_schedules_one_cleanout() {
        let r1 = key(0, 1);
        let b = Arc::new(Batch { id: BatchId(1), clean_span: CleanSpan::Ticks(30) });
        let o = op(1, 10, 5);

        let mut stage = Stage::new(directory(&[1]));
        stage.add_event(SimEvent::work_start(Ticks(0), r1, batched(1, o.clone(), b.clone())));
        stage.add_event(SimEvent::work_start(Ticks(0), r1, batched(2, o, b)));
        stage.run(&StageLimits::unbounded(), &mut crate::NoopObserver).unwrap();

        // Both members run back-to-back, then one cleanout after the batch.
        let tl = stage.timeline(&r1).unwrap();
        let ends: Vec<u64> = tl.blocks().iter().map(|b| b.end().0).collect();
        assert_eq!(ends, vec![10, 20, 50]);
        assert!(tl.block(2).unwrap().is_cleanout());
        assert_eq!(tl.blocks().iter().filter(|b| b.is_cleanout()).count(), 1);

        // The first member's block is the batch's primary block.
        let primary = stage.primary_blocks().primary_block(BatchId(1)).unwrap();
        assert_eq!(primary.position, 0);
        assert_eq!(primary.resource, r1);

        // One changeover-free run holds both members.
        let rs = stage.run_sets().by_key(&r1).unwrap();
        assert_eq!(rs.len(), 1);
        assert_eq!(rs.run(0).unwrap().len(), 2);
    }

    #[test]
    fn candidate_probe_resolves_primary_and_mutates_nothing() {
        let r1 = key(0, 1);
        let b = Arc::new(Batch { id: BatchId(1), clean_span: CleanSpan::Ticks(30) });
        let o = op(1, 10, 5);

        let mut stage = Stage::new(directory(&[1]));
        stage.add_event(SimEvent::work_start(Ticks(0), r1, batched(1, o.clone(), b.clone())));
        stage.run(&StageLimits::unbounded(), &mut crate::NoopObserver).unwrap();
        let placed_blocks = stage.timeline(&r1).unwrap().len();

        // Probing a hypothetical later member of the same batch resolves the
        // batch's primary block without touching any timeline.
        let probe = batched(99, o, b);
        let snap = stage.candidate_snapshot(&probe, Ticks(500));
        assert_eq!(snap.end(), Some(Ticks(500)));
        assert_eq!(snap.scheduled_cleanout(), CleanSpan::Ticks(30));
        assert_eq!(snap.node().unwrap().position, 0);
        assert_eq!(stage.timeline(&r1).unwrap().len(), placed_blocks);
    }
}

// ── Dispatch loader ───────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::Cursor;

    use super::*;
    use crate::load_dispatch_reader;

    const CSV: &[u8] = b"\
resource_rank,resource_id,activity_id,operation_id,setup_number,attributes,run_ticks,setup_ticks,batch_id,clean_span,release_tick\n\
0,1,100,10,1,3;7,20,5,,,0\n\
0,1,101,10,1,3;7,20,5,,,0\n\
0,2,102,11,2,4,15,5,1,30,10\n\
0,2,103,11,2,4,15,5,1,30,10\n\
";

    #[test]
    fn loads_directory_and_seed_events() {
        let list = load_dispatch_reader(Cursor::new(CSV)).unwrap();
        assert_eq!(list.directory.len(), 2);
        assert_eq!(list.directory.get(&key(0, 1)).unwrap().name(), "R1");
        assert_eq!(list.events.len(), 4);
        assert!(matches!(list.events[0].kind, EventKind::WorkStart(_)));
        assert_eq!(list.events[2].time, Ticks(10));
        assert_eq!(list.events[2].resource, key(0, 2));
    }

    #[test]
    fn operations_and_batches_are_shared() {
        let list = load_dispatch_reader(Cursor::new(CSV)).unwrap();
        let acts: Vec<&Arc<Activity>> = list
            .events
            .iter()
            .map(|e| match &e.kind {
                EventKind::WorkStart(a) => a,
                other => panic!("expected work-start, got {}", other.label()),
            })
            .collect();

        assert!(Arc::ptr_eq(acts[0].operation(), acts[1].operation()));
        assert!(!Arc::ptr_eq(acts[1].operation(), acts[2].operation()));
        assert!(Arc::ptr_eq(acts[2].batch().unwrap(), acts[3].batch().unwrap()));
        assert_eq!(acts[2].clean_span(), CleanSpan::Ticks(30));
        assert_eq!(acts[0].clean_span(), CleanSpan::NotApplicable);
    }

    #[test]
    fn machine_capability_is_union_of_row_tags() {
        let list = load_dispatch_reader(Cursor::new(CSV)).unwrap();
        let r1 = list.directory.get(&key(0, 1)).unwrap();
        match r1.capability() {
            Capability::Machine { tags } => {
                assert!(tags.contains(AttributeId(3)));
                assert!(tags.contains(AttributeId(7)));
                assert!(!tags.contains(AttributeId(4)));
            }
            other => panic!("expected machine capability, got {other:?}"),
        }
    }

    #[test]
    fn invalid_attribute_tag_errors() {
        let bad = b"\
resource_rank,resource_id,activity_id,operation_id,setup_number,attributes,run_ticks,setup_ticks,batch_id,clean_span,release_tick\n\
0,1,100,10,1,not-a-tag,20,5,,,0\n\
";
        let err = load_dispatch_reader(Cursor::new(bad.as_slice())).unwrap_err();
        assert!(matches!(err, SimError::Parse(_)));
    }

    #[test]
    fn invalid_clean_span_errors() {
        let bad = b"\
resource_rank,resource_id,activity_id,operation_id,setup_number,attributes,run_ticks,setup_ticks,batch_id,clean_span,release_tick\n\
0,1,100,10,1,,20,5,1,soon,0\n\
";
        let err = load_dispatch_reader(Cursor::new(bad.as_slice())).unwrap_err();
        assert!(matches!(err, SimError::Parse(_)));
    }

    #[test]
    fn loaded_list_drives_a_full_drain() {
        let list = load_dispatch_reader(Cursor::new(CSV)).unwrap();
        let mut stage = Stage::seeded(list.directory, list.events);
        stage.run(&StageLimits::unbounded(), &mut crate::NoopObserver).unwrap();

        // R1: two same-setup activities back-to-back.
        let ends: Vec<u64> =
            stage.timeline(&key(0, 1)).unwrap().blocks().iter().map(|b| b.end().0).collect();
        assert_eq!(ends, vec![20, 40]);

        // R2: batch members [10,25] and [25,40], then a 30-tick cleanout.
        let ends: Vec<u64> =
            stage.timeline(&key(0, 2)).unwrap().blocks().iter().map(|b| b.end().0).collect();
        assert_eq!(ends, vec![25, 40, 70]);
        assert!(stage.timeline(&key(0, 2)).unwrap().block(2).unwrap().is_cleanout());
    }
}
