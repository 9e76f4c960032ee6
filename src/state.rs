//! Per-target records, the shared panel, and point-in-time snapshots.
//!
//! Each [`TargetRecord`] is mutated by exactly one state machine task and
//! lives behind its own lock, so concurrent machines never contend and a
//! reader always observes a record's fields together. The in-flight counter
//! is the only value written by more than one task and is atomic.

use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;

use crate::registry::Target;

/// Measurement slots per target: the qualifying attempt plus three
/// follow-up probes.
pub const MEASUREMENT_SLOTS: usize = 4;

/// Lifecycle status of one target.
///
/// Transitions are monotonic: `Pending → Retrying* → {Up | Timeout | Down}`,
/// and a record never re-enters `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetStatus {
    /// First attempt outstanding.
    Pending,
    /// A timed-out attempt is being retried.
    Retrying,
    /// The relay answered; follow-up measurements may still be filling in.
    Up,
    /// Every attempt timed out.
    Timeout,
    /// A definitive non-timeout failure.
    Down,
}

impl TargetStatus {
    /// True once no further status transition can occur.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TargetStatus::Up | TargetStatus::Timeout | TargetStatus::Down)
    }

    /// Short symbol for display.
    pub fn symbol(&self) -> &'static str {
        match self {
            TargetStatus::Pending => "pending",
            TargetStatus::Retrying => "retry",
            TargetStatus::Up => "up",
            TargetStatus::Timeout => "timeout",
            TargetStatus::Down => "down",
        }
    }
}

/// One measurement cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// No probe issued for this slot yet.
    Idle,
    /// A probe is bound to this slot and has not resolved.
    Waiting,
    /// The probe resolved with a latency in milliseconds.
    Done(u64),
    /// The probe resolved without a usable measurement; the slot stays
    /// empty and is excluded from the average.
    Missed,
}

impl Slot {
    pub fn value(&self) -> Option<u64> {
        match self {
            Slot::Done(ms) => Some(*ms),
            _ => None,
        }
    }

    pub fn is_waiting(&self) -> bool {
        matches!(self, Slot::Waiting)
    }
}

/// Mutable per-target state, owned by one state machine task.
#[derive(Debug, Clone)]
pub struct TargetRecord {
    /// Stable 1-based display position; never changes after assignment.
    pub sequence: usize,
    pub target: Target,
    pub status: TargetStatus,
    /// Attempt number of the qualifying probe. Meaningful while retrying;
    /// retained after settling so the table can show how many tries a
    /// target needed.
    pub attempt: u32,
    pub slots: [Slot; MEASUREMENT_SLOTS],
    /// Short failure classification, set only when `status` is `Down`.
    pub error_code: Option<String>,
}

impl TargetRecord {
    pub fn new(sequence: usize, target: Target) -> Self {
        Self {
            sequence,
            target,
            status: TargetStatus::Pending,
            attempt: 1,
            slots: [Slot::Idle; MEASUREMENT_SLOTS],
            error_code: None,
        }
    }

    /// Mark the qualifying probe for the current attempt as outstanding.
    pub fn begin_attempt(&mut self) {
        debug_assert!(!self.status.is_terminal());
        self.slots[0] = Slot::Waiting;
    }

    /// The current attempt timed out and another attempt will be made.
    pub fn record_retry(&mut self) {
        debug_assert!(!self.status.is_terminal());
        self.status = TargetStatus::Retrying;
        self.attempt += 1;
        self.slots[0] = Slot::Waiting;
    }

    /// The qualifying probe succeeded: slot 1 is populated and the
    /// follow-up slots become outstanding.
    pub fn record_up(&mut self, latency_ms: u64) {
        debug_assert!(!self.status.is_terminal());
        self.status = TargetStatus::Up;
        self.slots[0] = Slot::Done(latency_ms);
        for slot in &mut self.slots[1..] {
            *slot = Slot::Waiting;
        }
    }

    /// All attempts timed out; terminal.
    pub fn record_timeout(&mut self) {
        debug_assert!(!self.status.is_terminal());
        self.status = TargetStatus::Timeout;
        self.slots[0] = Slot::Missed;
    }

    /// A definitive failure; terminal, never retried.
    pub fn record_down(&mut self, code: String) {
        debug_assert!(!self.status.is_terminal());
        self.status = TargetStatus::Down;
        self.error_code = Some(code);
        self.slots[0] = Slot::Missed;
    }

    /// Resolve a follow-up slot with a measurement, or leave it empty when
    /// the follow-up probe produced no usable sample.
    pub fn resolve_slot(&mut self, index: usize, latency_ms: Option<u64>) {
        debug_assert!(index >= 1 && index < MEASUREMENT_SLOTS);
        debug_assert!(self.slots[index].is_waiting());
        self.slots[index] = match latency_ms {
            Some(ms) => Slot::Done(ms),
            None => Slot::Missed,
        };
    }

    /// Number of populated measurement slots.
    pub fn populated_count(&self) -> usize {
        self.slots.iter().filter(|s| s.value().is_some()).count()
    }

    /// Arithmetic mean of the populated slots only. `None` until at least
    /// one slot holds a value.
    pub fn average_ms(&self) -> Option<f64> {
        let values: Vec<u64> = self.slots.iter().filter_map(|s| s.value()).collect();
        if values.is_empty() {
            return None;
        }
        Some(values.iter().sum::<u64>() as f64 / values.len() as f64)
    }

    /// Eligible for top-3 ranking: up with every slot populated.
    pub fn is_rankable(&self) -> bool {
        self.status == TargetStatus::Up && self.populated_count() == MEASUREMENT_SLOTS
    }

    /// Terminal status and no outstanding measurement slots.
    pub fn is_settled(&self) -> bool {
        self.status.is_terminal() && !self.slots.iter().any(|s| s.is_waiting())
    }
}

/// Shared state observed by the display loop and mutated by the probe tasks.
///
/// Records are partitioned one lock per target; the machine task for index
/// `i` is the only writer of record `i`.
pub struct PanelState {
    records: Vec<RwLock<TargetRecord>>,
    in_flight: AtomicUsize,
}

impl PanelState {
    /// Build one pending record per target, in input order.
    pub fn new(targets: Vec<Target>) -> Self {
        let records = targets
            .into_iter()
            .enumerate()
            .map(|(i, target)| RwLock::new(TargetRecord::new(i + 1, target)))
            .collect();
        Self {
            records,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The lock guarding one target's record.
    pub fn record(&self, index: usize) -> &RwLock<TargetRecord> {
        &self.records[index]
    }

    /// Net number of outstanding follow-up measurements.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Account for newly issued follow-up probes.
    pub fn add_in_flight(&self, n: usize) {
        self.in_flight.fetch_add(n, Ordering::SeqCst);
    }

    /// Account for one resolved follow-up probe.
    pub fn finish_in_flight(&self) {
        let previous = self.in_flight.fetch_sub(1, Ordering::SeqCst);
        debug_assert!(previous > 0);
    }

    /// Clone every record under its own read lock into an immutable
    /// snapshot for rendering. Rows come out in sequence order.
    pub fn snapshot(&self, tick: u64) -> Snapshot {
        let rows = self.records.iter().map(|r| r.read().clone()).collect();
        Snapshot {
            rows,
            in_flight: self.in_flight(),
            tick,
        }
    }
}

/// Overall run phase derived from a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// At least one target has no decided outcome yet.
    Discovering,
    /// All targets decided, follow-up measurements still resolving.
    Measuring,
    Complete,
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Discovering => "discovering",
            Phase::Measuring => "measuring",
            Phase::Complete => "complete",
        }
    }
}

/// Point-in-time view of the whole panel, used for one rendered frame.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub rows: Vec<TargetRecord>,
    pub in_flight: usize,
    /// Animation frame counter, supplied by the display loop.
    pub tick: u64,
}

impl Snapshot {
    pub fn phase(&self) -> Phase {
        if self.rows.iter().any(|r| !r.status.is_terminal()) {
            Phase::Discovering
        } else if self.in_flight > 0 {
            Phase::Measuring
        } else {
            Phase::Complete
        }
    }

    pub fn count(&self, status: TargetStatus) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }

    /// Targets that have not reached a terminal status.
    pub fn unsettled_count(&self) -> usize {
        self.rows.iter().filter(|r| !r.status.is_terminal()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Target, Tier};

    fn target(id: &str) -> Target {
        Target::new(id, id, Tier::Core)
    }

    fn record() -> TargetRecord {
        TargetRecord::new(1, target("use1"))
    }

    #[test]
    fn new_record_is_pending_on_first_attempt() {
        let rec = record();
        assert_eq!(rec.status, TargetStatus::Pending);
        assert_eq!(rec.attempt, 1);
        assert_eq!(rec.slots, [Slot::Idle; MEASUREMENT_SLOTS]);
        assert!(rec.error_code.is_none());
    }

    #[test]
    fn retry_increments_attempt_and_keeps_slot_waiting() {
        let mut rec = record();
        rec.begin_attempt();
        rec.record_retry();
        assert_eq!(rec.status, TargetStatus::Retrying);
        assert_eq!(rec.attempt, 2);
        assert!(rec.slots[0].is_waiting());
    }

    #[test]
    fn up_populates_slot_one_and_opens_followups() {
        let mut rec = record();
        rec.begin_attempt();
        rec.record_up(100);
        assert_eq!(rec.status, TargetStatus::Up);
        assert_eq!(rec.slots[0], Slot::Done(100));
        assert!(rec.slots[1..].iter().all(|s| s.is_waiting()));
        assert!(!rec.is_settled());
    }

    #[test]
    fn down_captures_error_code() {
        let mut rec = record();
        rec.begin_attempt();
        rec.record_down("403".to_string());
        assert_eq!(rec.status, TargetStatus::Down);
        assert_eq!(rec.error_code.as_deref(), Some("403"));
        assert!(rec.is_settled());
        assert_eq!(rec.average_ms(), None);
    }

    #[test]
    fn timeout_leaves_no_measurements() {
        let mut rec = record();
        rec.begin_attempt();
        rec.record_retry();
        rec.record_retry();
        rec.record_retry();
        rec.record_timeout();
        assert_eq!(rec.status, TargetStatus::Timeout);
        assert_eq!(rec.attempt, 4);
        assert_eq!(rec.populated_count(), 0);
        assert!(rec.is_settled());
    }

    #[test]
    fn average_uses_populated_slots_only() {
        let mut rec = record();
        rec.begin_attempt();
        rec.record_up(100);
        rec.resolve_slot(1, Some(120));
        rec.resolve_slot(2, None);
        rec.resolve_slot(3, Some(110));
        assert_eq!(rec.populated_count(), 3);
        assert_eq!(rec.average_ms(), Some(110.0));
        assert!(!rec.is_rankable());
        assert!(rec.is_settled());
    }

    #[test]
    fn full_slots_make_a_target_rankable() {
        let mut rec = record();
        rec.begin_attempt();
        rec.record_up(100);
        rec.resolve_slot(1, Some(120));
        rec.resolve_slot(2, Some(90));
        rec.resolve_slot(3, Some(110));
        assert_eq!(rec.average_ms(), Some(105.0));
        assert!(rec.is_rankable());
    }

    #[test]
    fn panel_snapshot_preserves_sequence_order() {
        let panel = PanelState::new(vec![target("a"), target("b"), target("c")]);
        let snap = panel.snapshot(0);
        let seqs: Vec<usize> = snap.rows.iter().map(|r| r.sequence).collect();
        assert_eq!(seqs, [1, 2, 3]);
    }

    #[test]
    fn in_flight_counter_round_trips() {
        let panel = PanelState::new(vec![target("a")]);
        panel.add_in_flight(3);
        assert_eq!(panel.in_flight(), 3);
        panel.finish_in_flight();
        panel.finish_in_flight();
        assert_eq!(panel.in_flight(), 1);
        panel.finish_in_flight();
        assert_eq!(panel.in_flight(), 0);
    }

    #[test]
    fn phase_tracks_discovery_then_measurement_then_complete() {
        let panel = PanelState::new(vec![target("a")]);
        assert_eq!(panel.snapshot(0).phase(), Phase::Discovering);

        {
            let mut rec = panel.record(0).write();
            rec.begin_attempt();
            rec.record_up(50);
        }
        panel.add_in_flight(3);
        assert_eq!(panel.snapshot(1).phase(), Phase::Measuring);

        for slot in 1..MEASUREMENT_SLOTS {
            panel.record(0).write().resolve_slot(slot, Some(60));
            panel.finish_in_flight();
        }
        assert_eq!(panel.snapshot(2).phase(), Phase::Complete);
    }
}
