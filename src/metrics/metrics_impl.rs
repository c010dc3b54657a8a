use crate::metrics::traits::{
    CoreMetricsRecorder, LfuMetricsRecorder, LruMetricsRecorder, LrukMetricsRecorder,
};

#[derive(Debug, Default, Clone)]
pub struct LruMetrics {
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
}

#[derive(Debug, Default, Clone)]
pub struct LfuMetrics {
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
}

#[derive(Debug, Default, Clone)]
pub struct LrukMetrics {
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
}

macro_rules! impl_core_recorder {
    ($ty:ty) => {
        impl CoreMetricsRecorder for $ty {
            fn record_get_hit(&mut self) {
                self.get_calls += 1;
                self.get_hits += 1;
            }

            fn record_get_miss(&mut self) {
                self.get_calls += 1;
                self.get_misses += 1;
            }

            fn record_insert_call(&mut self) {
                self.insert_calls += 1;
            }

            fn record_insert_new(&mut self) {
                self.insert_new += 1;
            }

            fn record_insert_update(&mut self) {
                self.insert_updates += 1;
            }

            fn record_evict_call(&mut self) {
                self.evict_calls += 1;
            }

            fn record_evicted_entry(&mut self) {
                self.evicted_entries += 1;
            }

            fn record_clear(&mut self) {
                self.clear_calls += 1;
            }
        }
    };
}

impl_core_recorder!(LruMetrics);
impl_core_recorder!(LfuMetrics);
impl_core_recorder!(LrukMetrics);

impl LruMetricsRecorder for LruMetrics {
    fn record_pop_lru_call(&mut self) {
        self.pop_lru_calls += 1;
    }

    fn record_pop_lru_found(&mut self) {
        self.pop_lru_found += 1;
    }

    fn record_touch_call(&mut self) {
        self.touch_calls += 1;
    }

    fn record_touch_found(&mut self) {
        self.touch_found += 1;
    }
}

impl LfuMetricsRecorder for LfuMetrics {
    fn record_pop_lfu_call(&mut self) {
        self.pop_lfu_calls += 1;
    }

    fn record_pop_lfu_found(&mut self) {
        self.pop_lfu_found += 1;
    }

    fn record_decay(&mut self, entries: usize) {
        self.decay_passes += 1;
        self.decayed_entries += entries as u64;
    }

    fn record_purge(&mut self) {
        self.purges += 1;
    }
}

impl LrukMetricsRecorder for LrukMetrics {
    fn record_promotion(&mut self) {
        self.promotions += 1;
    }

    fn record_history_forget(&mut self) {
        self.history_forgets += 1;
    }

    fn record_pending_write(&mut self) {
        self.pending_writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_counters_split_hits_and_misses() {
        let mut m = LruMetrics::default();
        m.record_get_hit();
        m.record_get_hit();
        m.record_get_miss();
        assert_eq!(m.get_calls, 3);
        assert_eq!(m.get_hits, 2);
        assert_eq!(m.get_misses, 1);
    }

    #[test]
    fn decay_accumulates_entries() {
        let mut m = LfuMetrics::default();
        m.record_decay(3);
        m.record_decay(5);
        assert_eq!(m.decay_passes, 2);
        assert_eq!(m.decayed_entries, 8);
    }
}
