// SPDX-FileCopyrightText: © 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Replays a few pushes and pops, run with `RUST_LOG=trace` to see the
//! deque grow.
//!
//! ```text
//! RUST_LOG=trace cargo run -p foundation-deque --example replay --features log
//! ```

use foundation_deque::Deque;

fn main() {
    env_logger::init();

    let mut deque = Deque::with_capacity(2);
    for (i, word) in ["ring", "buffer", "double", "ended", "queue"].iter().enumerate() {
        if i % 2 == 0 {
            deque.push_back(*word);
        } else {
            deque.push_front(*word);
        }
        log::info!("len={} capacity={} {:?}", deque.len(), deque.capacity(), deque);
    }

    while let Some(word) = deque.pop_front() {
        log::info!("popped {word}, {} left", deque.len());
    }

    let copy = deque.clone();
    log::info!("copy of the empty deque keeps capacity {}", copy.capacity());
}
