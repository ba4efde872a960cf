// SPDX-FileCopyrightText: © 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Uninitialized slot storage.

use alloc::alloc::{self as heap, Layout};
use core::{marker::PhantomData, mem, ptr, ptr::NonNull};

use crate::{Error, Result};

/// A heap block of `capacity` slots of `T`.
///
/// The block never reads, writes or drops a `T` on its own, callers decide
/// which slots hold a value. Dropping it only releases the memory.
pub(crate) struct RawBuf<T> {
    ptr: NonNull<T>,
    capacity: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send> Send for RawBuf<T> {}
unsafe impl<T: Sync> Sync for RawBuf<T> {}

impl<T> RawBuf<T> {
    const IS_ZST: bool = mem::size_of::<T>() == 0;

    /// An empty block, no allocation is made.
    pub const fn new() -> Self {
        Self {
            ptr: NonNull::dangling(),
            capacity: 0,
            _marker: PhantomData,
        }
    }

    /// Allocate a block for exactly `capacity` slots.
    pub fn try_with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Ok(Self::new());
        }

        let layout = Layout::array::<T>(capacity).map_err(|_| Error::CapacityOverflow)?;
        if Self::IS_ZST {
            return Ok(Self {
                ptr: NonNull::dangling(),
                capacity,
                _marker: PhantomData,
            });
        }

        // SAFETY: `layout` has a non-zero size.
        let ptr = unsafe { heap::alloc(layout) }.cast::<T>();
        match NonNull::new(ptr) {
            Some(ptr) => Ok(Self {
                ptr,
                capacity,
                _marker: PhantomData,
            }),
            None => Err(Error::AllocFailed { capacity }),
        }
    }

    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Pointer to `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must be at most `capacity`.
    pub unsafe fn slot(&self, slot: usize) -> *mut T {
        debug_assert!(slot <= self.capacity);
        self.ptr.as_ptr().add(slot)
    }

    /// Move `value` into `slot`.
    ///
    /// # Safety
    ///
    /// `slot` must be in bounds and must not hold a value.
    pub unsafe fn write(&mut self, slot: usize, value: T) {
        ptr::write(self.slot(slot), value);
    }

    /// Move the value out of `slot`, leaving it uninitialized.
    ///
    /// # Safety
    ///
    /// `slot` must be in bounds and must hold a value.
    pub unsafe fn read(&mut self, slot: usize) -> T {
        ptr::read(self.slot(slot))
    }
}

impl<T> Drop for RawBuf<T> {
    fn drop(&mut self) {
        if self.capacity == 0 || Self::IS_ZST {
            return;
        }

        if let Ok(layout) = Layout::array::<T>(self.capacity) {
            // SAFETY: the block was allocated with this very layout.
            unsafe { heap::dealloc(self.ptr.as_ptr().cast(), layout) }
        }
    }
}
