#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LruMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub clear_calls: u64,

    pub pop_lru_calls: u64,
    pub pop_lru_found: u64,
    pub touch_calls: u64,
    pub touch_found: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LfuMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub clear_calls: u64,

    pub pop_lfu_calls: u64,
    pub pop_lfu_found: u64,
    pub decay_passes: u64,
    pub decayed_entries: u64,
    pub purges: u64,

    pub cache_len: usize,
    pub capacity: usize,
    pub total_access_count: u64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LrukMetricsSnapshot {
    pub get_calls: u64,
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_calls: u64,
    pub insert_updates: u64,
    pub insert_new: u64,

    pub evict_calls: u64,
    pub evicted_entries: u64,
    pub clear_calls: u64,

    pub promotions: u64,
    pub history_forgets: u64,
    pub pending_writes: u64,

    pub cache_len: usize,
    pub capacity: usize,
    pub history_len: usize,
    pub pending_len: usize,
}

impl LruMetricsSnapshot {
    /// Hits over total gets, 0.0 before the first get.
    pub fn hit_rate(&self) -> f64 {
        hit_rate(self.get_hits, self.get_calls)
    }
}

impl LfuMetricsSnapshot {
    pub fn hit_rate(&self) -> f64 {
        hit_rate(self.get_hits, self.get_calls)
    }
}

impl LrukMetricsSnapshot {
    pub fn hit_rate(&self) -> f64 {
        hit_rate(self.get_hits, self.get_calls)
    }
}

fn hit_rate(hits: u64, calls: u64) -> f64 {
    if calls == 0 {
        0.0
    } else {
        hits as f64 / calls as f64
    }
}
