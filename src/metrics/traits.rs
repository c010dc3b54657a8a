//! # Metrics Trait Hierarchy
//!
//! Recording and snapshotting are split so that engines only ever write
//! counters, and tests/benches only ever read snapshots.
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │     CoreMetricsRecorder     │
//!                    │  get_hit/get_miss/insert    │
//!                    │  evict/clear                │
//!                    └──────────────┬──────────────┘
//!                                   │
//!          ┌────────────────────────┼────────────────────────┐
//!          ▼                        ▼                        ▼
//!   ┌─────────────┐         ┌──────────────┐         ┌──────────────┐
//!   │ LruRecorder │         │ LfuRecorder  │         │ LrukRecorder │
//!   │ pop/touch   │         │ decay/purge  │         │ promote      │
//!   └─────────────┘         └──────────────┘         │ forget       │
//!                                                    └──────────────┘
//!
//!   MetricsSnapshotProvider<S>: copy counters out as a plain struct
//! ```

/// Counters common to every policy.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_call(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evict_call(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_clear(&mut self);
}

pub trait LruMetricsRecorder: CoreMetricsRecorder {
    fn record_pop_lru_call(&mut self);
    fn record_pop_lru_found(&mut self);
    fn record_touch_call(&mut self);
    fn record_touch_found(&mut self);
}

pub trait LfuMetricsRecorder: CoreMetricsRecorder {
    fn record_pop_lfu_call(&mut self);
    fn record_pop_lfu_found(&mut self);
    /// One aging pass; `entries` is the number of relinked entries.
    fn record_decay(&mut self, entries: usize);
    fn record_purge(&mut self);
}

pub trait LrukMetricsRecorder: CoreMetricsRecorder {
    fn record_promotion(&mut self);
    fn record_history_forget(&mut self);
    fn record_pending_write(&mut self);
}

/// Produces a point-in-time copy of an engine's counters.
pub trait MetricsSnapshotProvider<S> {
    fn snapshot(&self) -> S;
}
