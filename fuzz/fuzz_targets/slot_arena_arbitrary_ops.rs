#![no_main]

use kcache::ds::{SlotArena, SlotId};
use libfuzzer_sys::fuzz_target;

// Insert/remove churn: live ids stay readable, freed slots are reused.
fuzz_target!(|data: &[u8]| {
    let mut arena: SlotArena<u8> = SlotArena::new();
    let mut live: Vec<(SlotId, u8)> = Vec::new();

    for pair in data.chunks_exact(2) {
        let value = pair[1];
        match pair[0] % 4 {
            0 | 1 => {
                let slots_before = arena.slot_count();
                let had_free = arena.len() < slots_before;
                let id = arena.insert(value);
                if had_free {
                    assert_eq!(arena.slot_count(), slots_before);
                }
                live.push((id, value));
            },
            2 => {
                if !live.is_empty() {
                    let (id, v) = live.swap_remove(usize::from(value) % live.len());
                    assert_eq!(arena.remove(id), Some(v));
                    assert_eq!(arena.get(id), None);
                    assert_eq!(arena.remove(id), None);
                }
            },
            3 => {
                arena.clear();
                live.clear();
            },
            _ => unreachable!(),
        }

        assert_eq!(arena.len(), live.len());
        for &(id, v) in &live {
            assert_eq!(arena.get(id), Some(&v));
        }
    }
});
