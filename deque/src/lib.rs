// SPDX-FileCopyrightText: © 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! # Foundation Deque.
//!
//! A double-ended queue stored in a ring buffer that doubles its capacity
//! when it runs out of room. Allocation and construction are kept apart:
//! the free slots of the buffer are raw memory, and only the elements in
//! the queue are ever initialized or dropped.
//!
//! Every operation either succeeds or leaves the queue as it was, except
//! for the capacity which may grow on insertion.
//!
//! # Examples
//!
//! ```rust
//! use foundation_deque::Deque;
//!
//! let mut deque = Deque::new();
//! deque.push_back(1);
//! deque.push_back(2);
//! deque.push_front(0);
//!
//! assert_eq!(deque.front(), Some(&0));
//! assert_eq!(deque.back(), Some(&2));
//! assert_eq!(deque, [0, 1, 2]);
//!
//! assert_eq!(deque.pop_back(), Some(2));
//! assert_eq!(deque.len(), 2);
//! assert_eq!(deque.capacity(), 4);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub(crate) mod fmt;

mod error;
mod raw;

use core::{
    cmp, fmt as core_fmt,
    ops::{Index, IndexMut},
    ptr,
};

use crate::raw::RawBuf;

pub use crate::error::{Error, Result, TryPushError};

/// A double-ended queue backed by a growable ring buffer.
///
/// The element at logical index `i` lives in the physical slot
/// `(head + i) % capacity`. Only those `len` slots hold values.
pub struct Deque<T> {
    buf: RawBuf<T>,
    head: usize,
    len: usize,
}

impl<T> Deque<T> {
    /// Creates an empty deque without allocating.
    pub const fn new() -> Self {
        Self {
            buf: RawBuf::new(),
            head: 0,
            len: 0,
        }
    }

    /// Creates an empty deque with room for exactly `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if the storage can't be allocated.
    pub fn with_capacity(capacity: usize) -> Self {
        match Self::try_with_capacity(capacity) {
            Ok(deque) => deque,
            Err(e) => storage_error(e),
        }
    }

    /// Creates an empty deque with room for exactly `capacity` elements.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        Ok(Self {
            buf: RawBuf::try_with_capacity(capacity)?,
            head: 0,
            len: 0,
        })
    }

    /// Number of elements in the deque.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Number of slots allocated.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    /// Returns `true` if the deque contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Returns the element at logical `index`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        if index < self.len {
            let slot = self.physical_index(index);
            // SAFETY: slots of the logical window are initialized.
            Some(unsafe { &*self.buf.slot(slot) })
        } else {
            None
        }
    }

    /// Returns the element at logical `index`, or `None` if out of bounds.
    #[must_use]
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        if index < self.len {
            let slot = self.physical_index(index);
            // SAFETY: slots of the logical window are initialized.
            Some(unsafe { &mut *self.buf.slot(slot) })
        } else {
            None
        }
    }

    #[must_use]
    pub fn front(&self) -> Option<&T> {
        self.get(0)
    }

    #[must_use]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        self.get_mut(0)
    }

    #[must_use]
    pub fn back(&self) -> Option<&T> {
        self.get(self.len.checked_sub(1)?)
    }

    #[must_use]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        self.get_mut(self.len.checked_sub(1)?)
    }

    /// Appends an element to the back of the deque.
    ///
    /// # Panics
    ///
    /// Panics if the deque is full and its storage can't be grown.
    pub fn push_back(&mut self, value: T) {
        if let Err(e) = self.try_push_back(value) {
            storage_error(e.error)
        }
    }

    /// Appends an element to the back of the deque.
    ///
    /// If the deque is full and can't grow, `value` is handed back in the
    /// error and the deque is left untouched.
    pub fn try_push_back(&mut self, value: T) -> core::result::Result<(), TryPushError<T>> {
        if self.is_full() {
            if let Err(error) = self.grow() {
                return Err(TryPushError { error, value });
            }
        }

        let slot = self.physical_index(self.len);
        // SAFETY: `len < capacity`, so the slot after the back is free.
        unsafe { self.buf.write(slot, value) };
        self.len += 1;

        Ok(())
    }

    /// Prepends an element to the front of the deque.
    ///
    /// # Panics
    ///
    /// Panics if the deque is full and its storage can't be grown.
    pub fn push_front(&mut self, value: T) {
        if let Err(e) = self.try_push_front(value) {
            storage_error(e.error)
        }
    }

    /// Prepends an element to the front of the deque.
    ///
    /// If the deque is full and can't grow, `value` is handed back in the
    /// error and the deque is left untouched.
    pub fn try_push_front(&mut self, value: T) -> core::result::Result<(), TryPushError<T>> {
        if self.is_full() {
            if let Err(error) = self.grow() {
                return Err(TryPushError { error, value });
            }
        }

        let slot = self.wrap_sub(self.head, 1);
        // SAFETY: `len < capacity`, so the slot before the front is free.
        unsafe { self.buf.write(slot, value) };
        self.head = slot;
        self.len += 1;

        Ok(())
    }

    /// Removes the last element and returns it, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        self.len -= 1;
        let slot = self.physical_index(self.len);
        // SAFETY: the slot was the back of the window, it is now outside of
        // it and is read exactly once.
        Some(unsafe { self.buf.read(slot) })
    }

    /// Removes the first element and returns it, or `None` if empty.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let slot = self.head;
        self.head = self.wrap_add(self.head, 1);
        self.len -= 1;
        // SAFETY: the slot was the front of the window, it is now outside of
        // it and is read exactly once.
        Some(unsafe { self.buf.read(slot) })
    }

    /// Drops every element, keeping the allocated capacity.
    pub fn clear(&mut self) {
        struct Dropper<T>(*mut [T]);

        impl<T> Drop for Dropper<T> {
            fn drop(&mut self) {
                // SAFETY: see below.
                unsafe { ptr::drop_in_place(self.0) }
            }
        }

        let (front, back) = self.raw_runs();
        // The window is emptied before dropping so a panicking destructor
        // can't lead to a double drop.
        self.head = 0;
        self.len = 0;

        // SAFETY: both runs were initialized and are no longer reachable
        // from the deque. If dropping `front` panics, `_back` still drops
        // the second run during unwinding.
        unsafe {
            let _back = Dropper(back);
            ptr::drop_in_place(front);
        }
    }

    /// Maps a logical index onto its physical slot.
    ///
    /// `logical` may be at most `capacity`, a zero capacity maps everything
    /// to slot 0.
    fn physical_index(&self, logical: usize) -> usize {
        self.wrap_add(self.head, logical)
    }

    /// `(idx + add) % capacity`, for `idx < capacity` and `add <= capacity`.
    fn wrap_add(&self, idx: usize, add: usize) -> usize {
        let capacity = self.capacity();
        if capacity == 0 {
            return 0;
        }

        debug_assert!(idx < capacity && add <= capacity);
        let room = capacity - idx;
        if add < room {
            idx + add
        } else {
            add - room
        }
    }

    /// `(idx - sub) % capacity`, for `idx < capacity` and `sub <= capacity`.
    fn wrap_sub(&self, idx: usize, sub: usize) -> usize {
        let capacity = self.capacity();
        if capacity == 0 {
            return 0;
        }

        debug_assert!(idx < capacity && sub <= capacity);
        if sub <= idx {
            idx - sub
        } else {
            capacity - (sub - idx)
        }
    }

    /// Lengths of the (at most) two contiguous runs of slots making up the
    /// logical window: `head..` first, then the wrapped part from slot 0.
    fn run_lens(&self) -> (usize, usize) {
        let first = cmp::min(self.len, self.capacity() - self.head);
        (first, self.len - first)
    }

    fn raw_runs(&self) -> (*mut [T], *mut [T]) {
        let (first, second) = self.run_lens();

        // SAFETY: `head <= capacity` and both runs end within the block.
        unsafe {
            (
                ptr::slice_from_raw_parts_mut(self.buf.slot(self.head), first),
                ptr::slice_from_raw_parts_mut(self.buf.slot(0), second),
            )
        }
    }

    /// Replaces the storage with one twice as large (or of one slot when
    /// empty), moving the elements to the start of the new block.
    ///
    /// The new block is obtained before anything is moved, on error the
    /// deque is left untouched.
    fn grow(&mut self) -> Result<()> {
        debug_assert!(self.is_full());

        let old_capacity = self.capacity();
        let new_capacity = match old_capacity {
            0 => 1,
            n => n.checked_mul(2).ok_or(Error::CapacityOverflow)?,
        };

        let mut buf = match RawBuf::try_with_capacity(new_capacity) {
            Ok(buf) => buf,
            Err(e) => {
                warn!("can't grow deque to {} slots: {}", new_capacity, e);
                return Err(e);
            }
        };

        debug!("growing deque from {} to {} slots", old_capacity, new_capacity);

        let (first, second) = self.run_lens();
        // SAFETY: the runs hold exactly `len` initialized values and the new
        // block has room for `len + 1`. The values are moved bitwise, the
        // old block is freed without dropping anything.
        unsafe {
            ptr::copy_nonoverlapping(self.buf.slot(self.head), buf.slot(0), first);
            ptr::copy_nonoverlapping(self.buf.slot(0), buf.slot(first), second);
        }

        core::mem::swap(&mut self.buf, &mut buf);
        self.head = 0;
        trace!("relocated {} elements", self.len);

        Ok(())
    }
}

impl<T: Clone> Deque<T> {
    /// Clones the deque, reporting allocation failure instead of
    /// panicking.
    ///
    /// The copy has the same capacity as `self`, with its front element
    /// at the first slot.
    pub fn try_clone(&self) -> Result<Self> {
        let mut copy = Self::try_with_capacity(self.capacity())?;

        for index in 0..self.len {
            // If `clone` panics `copy` drops the elements cloned so far.
            let value = self[index].clone();
            // SAFETY: `copy.head` is 0 and slot `index` is past its window.
            unsafe { copy.buf.write(index, value) };
            copy.len += 1;
        }

        Ok(copy)
    }

    /// Replaces the contents of `self` by a copy of `source`.
    ///
    /// The copy is built first and then swapped in, so `self` is left
    /// unchanged if cloning fails or panics.
    pub fn try_clone_from(&mut self, source: &Self) -> Result<()> {
        let mut copy = source.try_clone()?;
        trace!("replacing {} elements by {}", self.len, copy.len);
        core::mem::swap(self, &mut copy);

        Ok(())
    }
}

#[cold]
#[track_caller]
fn storage_error(e: Error) -> ! {
    panic!("{}", e)
}

impl<T> Drop for Deque<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T> Default for Deque<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> Clone for Deque<T> {
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(copy) => copy,
            Err(e) => storage_error(e),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        if let Err(e) = self.try_clone_from(source) {
            storage_error(e)
        }
    }
}

impl<T: core_fmt::Debug> core_fmt::Debug for Deque<T> {
    fn fmt(&self, f: &mut core_fmt::Formatter<'_>) -> core_fmt::Result {
        f.debug_list()
            .entries((0..self.len).map(|i| &self[i]))
            .finish()
    }
}

impl<T> Index<usize> for Deque<T> {
    type Output = T;

    #[track_caller]
    fn index(&self, index: usize) -> &T {
        match self.get(index) {
            Some(value) => value,
            None => panic!(
                "index out of bounds: the len is {} but the index is {}",
                self.len,
                index
            ),
        }
    }
}

impl<T> IndexMut<usize> for Deque<T> {
    #[track_caller]
    fn index_mut(&mut self, index: usize) -> &mut T {
        let len = self.len;
        match self.get_mut(index) {
            Some(value) => value,
            None => panic!(
                "index out of bounds: the len is {} but the index is {}",
                len,
                index
            ),
        }
    }
}

impl<T: PartialEq> PartialEq for Deque<T> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && (0..self.len).all(|i| self[i] == other[i])
    }
}

impl<T: Eq> Eq for Deque<T> {}

impl<T: PartialEq> PartialEq<[T]> for Deque<T> {
    fn eq(&self, other: &[T]) -> bool {
        self.len == other.len() && other.iter().enumerate().all(|(i, v)| self[i] == *v)
    }
}

impl<T: PartialEq> PartialEq<&[T]> for Deque<T> {
    fn eq(&self, other: &&[T]) -> bool {
        *self == **other
    }
}

impl<T: PartialEq, const N: usize> PartialEq<[T; N]> for Deque<T> {
    fn eq(&self, other: &[T; N]) -> bool {
        *self == other[..]
    }
}

impl<T> Extend<T> for Deque<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            self.push_back(value);
        }
    }
}

impl<T> FromIterator<T> for Deque<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut deque = Self::new();
        deque.extend(iter);
        deque
    }
}

impl<T, const N: usize> From<[T; N]> for Deque<T> {
    fn from(values: [T; N]) -> Self {
        let mut deque = Self::with_capacity(N);
        deque.extend(values);
        deque
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::{string::String, vec::Vec};

    use super::*;

    fn contents<T: Clone>(deque: &Deque<T>) -> Vec<T> {
        (0..deque.len()).map(|i| deque[i].clone()).collect()
    }

    #[test]
    fn test_new_does_not_allocate() {
        let deque: Deque<String> = Deque::new();
        assert_eq!(deque.capacity(), 0);
        assert_eq!(deque.len(), 0);
        assert_eq!(deque.head, 0);
        assert!(deque.is_empty());
    }

    #[test]
    fn test_with_capacity_constructs_nothing() {
        let deque: Deque<String> = Deque::with_capacity(16);
        assert_eq!(deque.capacity(), 16);
        assert!(deque.is_empty());
    }

    #[test]
    fn test_wrap_add() {
        let deque: Deque<u8> = Deque::with_capacity(4);
        assert_eq!(deque.wrap_add(0, 0), 0);
        assert_eq!(deque.wrap_add(1, 2), 3);
        assert_eq!(deque.wrap_add(3, 1), 0);
        assert_eq!(deque.wrap_add(2, 3), 1);
        assert_eq!(deque.wrap_add(3, 4), 3);
    }

    #[test]
    fn test_wrap_sub() {
        let deque: Deque<u8> = Deque::with_capacity(4);
        assert_eq!(deque.wrap_sub(0, 1), 3);
        assert_eq!(deque.wrap_sub(3, 1), 2);
        assert_eq!(deque.wrap_sub(1, 3), 2);
        assert_eq!(deque.wrap_sub(2, 4), 2);
    }

    #[test]
    fn test_zero_capacity_index() {
        let deque: Deque<u8> = Deque::new();
        assert_eq!(deque.physical_index(0), 0);
        assert_eq!(deque.wrap_sub(0, 0), 0);
    }

    #[test]
    fn test_wrap_add_near_usize_max() {
        let deque: Deque<()> = Deque::with_capacity(usize::MAX);
        assert_eq!(deque.wrap_add(usize::MAX - 1, usize::MAX - 1), usize::MAX - 2);
    }

    #[test]
    fn test_physical_layout_after_wrap() {
        let mut deque = Deque::with_capacity(4);
        deque.push_back(1);
        deque.push_back(2);
        assert_eq!(deque.pop_front(), Some(1));
        assert_eq!(deque.pop_front(), Some(2));
        assert_eq!(deque.head, 2);

        deque.push_back(3);
        deque.push_back(4);
        deque.push_back(5);
        assert_eq!(deque.physical_index(2), 0);

        deque.push_front(9);
        assert_eq!(deque.head, 1);
        assert_eq!(deque.capacity(), 4);
        assert_eq!(contents(&deque), [9, 3, 4, 5]);
    }

    #[test]
    fn test_grow_rebases_head() {
        let mut deque = Deque::with_capacity(4);
        deque.push_back(1);
        deque.push_back(2);
        deque.pop_front();
        deque.pop_front();
        for i in 3..=5 {
            deque.push_back(i);
        }
        deque.push_front(9);
        assert_ne!(deque.head, 0);

        deque.push_back(6);
        assert_eq!(deque.head, 0);
        assert_eq!(deque.capacity(), 8);
        assert_eq!(contents(&deque), [9, 3, 4, 5, 6]);
    }

    #[test]
    fn test_grow_from_empty() {
        let mut deque = Deque::new();
        deque.push_front("a");
        assert_eq!(deque.capacity(), 1);
        assert_eq!(deque.head, 0);
        deque.push_front("b");
        assert_eq!(deque.capacity(), 2);
        assert_eq!(deque.head, 1);
        assert_eq!(contents(&deque), ["b", "a"]);
    }

    #[test]
    fn test_grow_overflow_leaves_deque_untouched() {
        let mut deque: Deque<()> = Deque::with_capacity(usize::MAX);
        deque.len = usize::MAX;

        let err = deque.try_push_back(()).unwrap_err();
        assert_eq!(err.error, Error::CapacityOverflow);
        let err = deque.try_push_front(()).unwrap_err();
        assert_eq!(err.error, Error::CapacityOverflow);

        assert_eq!(deque.len(), usize::MAX);
        assert_eq!(deque.capacity(), usize::MAX);
        assert_eq!(deque.head, 0);
    }

    #[test]
    #[should_panic(expected = "capacity overflow")]
    fn test_push_panics_on_overflow() {
        let mut deque: Deque<()> = Deque::with_capacity(usize::MAX);
        deque.len = usize::MAX;
        deque.push_back(());
    }

    #[test]
    fn test_clone_rebases_layout() {
        let mut deque = Deque::with_capacity(4);
        deque.push_back(String::from("b"));
        deque.push_front(String::from("a"));
        assert_eq!(deque.head, 3);

        let copy = deque.clone();
        assert_eq!(copy.head, 0);
        assert_eq!(copy.capacity(), 4);
        assert_eq!(copy, deque);
    }

    #[test]
    fn test_clear_keeps_capacity() {
        let mut deque: Deque<String> = ["x", "y", "z"].map(String::from).into();
        deque.pop_front();
        deque.push_back("w".into());
        deque.clear();

        assert!(deque.is_empty());
        assert_eq!(deque.head, 0);
        assert_eq!(deque.capacity(), 3);

        deque.push_back("v".into());
        assert_eq!(deque, [String::from("v")]);
    }

    #[test]
    fn test_accessors_on_empty() {
        let mut deque: Deque<u8> = Deque::new();
        assert_eq!(deque.front(), None);
        assert_eq!(deque.back(), None);
        assert_eq!(deque.front_mut(), None);
        assert_eq!(deque.back_mut(), None);
        assert_eq!(deque.get(0), None);
        assert_eq!(deque.pop_front(), None);
        assert_eq!(deque.pop_back(), None);
    }

    #[test]
    #[should_panic(expected = "index out of bounds: the len is 2 but the index is 2")]
    fn test_index_out_of_bounds() {
        let deque = Deque::from([1, 2]);
        let _value = deque[2];
    }

    #[test]
    fn test_debug() {
        let mut deque = Deque::with_capacity(2);
        deque.push_back(2);
        deque.push_front(1);
        assert_eq!(std::format!("{deque:?}"), "[1, 2]");
    }
}
