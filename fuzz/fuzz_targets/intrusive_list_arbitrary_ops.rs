#![no_main]

use std::collections::VecDeque;

use kcache::ds::{IntrusiveList, SlotId};
use libfuzzer_sys::fuzz_target;

// Mirrors every operation on a VecDeque of (id, value) and compares order.
fuzz_target!(|data: &[u8]| {
    let mut list: IntrusiveList<u8> = IntrusiveList::new();
    let mut model: VecDeque<(SlotId, u8)> = VecDeque::new();

    for pair in data.chunks_exact(2) {
        let value = pair[1];
        let pick = |model: &VecDeque<(SlotId, u8)>| {
            if model.is_empty() {
                None
            } else {
                Some(usize::from(value) % model.len())
            }
        };

        match pair[0] % 7 {
            0 => {
                let id = list.push_front(value);
                model.push_front((id, value));
            },
            1 => {
                let id = list.push_back(value);
                model.push_back((id, value));
            },
            2 => assert_eq!(list.pop_front(), model.pop_front().map(|(_, v)| v)),
            3 => assert_eq!(list.pop_back(), model.pop_back().map(|(_, v)| v)),
            4 => {
                if let Some(pos) = pick(&model) {
                    let (id, v) = model.remove(pos).unwrap();
                    assert!(list.move_to_front(id));
                    model.push_front((id, v));
                }
            },
            5 => {
                if let Some(pos) = pick(&model) {
                    let (id, v) = model.remove(pos).unwrap();
                    assert_eq!(list.remove(id), Some(v));
                    assert!(!list.contains(id));
                }
            },
            6 => {
                list.clear();
                model.clear();
            },
            _ => unreachable!(),
        }

        list.check_invariants().unwrap();
        assert_eq!(list.len(), model.len());
        assert!(list.iter().copied().eq(model.iter().map(|(_, v)| *v)));
    }
});
