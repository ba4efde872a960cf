// SPDX-FileCopyrightText: © 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

#![no_main]

use std::collections::VecDeque;

use arbitrary::Arbitrary;
use foundation_deque::Deque;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
pub enum Operation {
    PushBack(u16),
    PushFront(u16),
    PopBack,
    PopFront,
    Get(u8),
    Clone,
    Clear,
}

#[derive(Debug, Arbitrary)]
pub struct Data {
    pub capacity: u8,
    pub operations: Vec<Operation>,
}

fuzz_target!(|data: Data| {
    let mut deque = Deque::with_capacity(usize::from(data.capacity));
    let mut model = VecDeque::new();

    for operation in data.operations {
        match operation {
            Operation::PushBack(v) => {
                deque.push_back(v);
                model.push_back(v);
            }
            Operation::PushFront(v) => {
                deque.push_front(v);
                model.push_front(v);
            }
            Operation::PopBack => assert_eq!(deque.pop_back(), model.pop_back()),
            Operation::PopFront => assert_eq!(deque.pop_front(), model.pop_front()),
            Operation::Get(i) => {
                let i = usize::from(i);
                assert_eq!(deque.get(i), model.get(i));
            }
            Operation::Clone => {
                let mut copy = Deque::new();
                copy.clone_from(&deque);
                deque = copy;
            }
            Operation::Clear => {
                deque.clear();
                model.clear();
            }
        }

        assert_eq!(deque.len(), model.len());
        assert!(deque.len() <= deque.capacity());
        assert_eq!(deque.front(), model.front());
        assert_eq!(deque.back(), model.back());
    }
});
