// SPDX-FileCopyrightText: © 2024 Foundation Devices, Inc. <hello@foundation.xyz>
// SPDX-License-Identifier: GPL-3.0-or-later

use derive_more::Display;

pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while obtaining storage for a [`Deque`](crate::Deque).
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-03", derive(defmt::Format))]
pub enum Error {
    /// The number of slots does not fit in the address space.
    #[display("capacity overflow")]
    CapacityOverflow,
    /// The allocator refused to provide the slots.
    #[display("memory allocation of {capacity} slots failed")]
    AllocFailed { capacity: usize },
}

/// A push that could not grow the deque.
///
/// Holds the element that was not inserted so it can be recovered with
/// [`TryPushError::into_inner`].
#[derive(Debug, Display)]
#[display("{error}")]
pub struct TryPushError<T> {
    pub error: Error,
    pub value: T,
}

impl<T> TryPushError<T> {
    /// Returns the element that was rejected.
    pub fn into_inner(self) -> T {
        self.value
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "std")]
impl<T: core::fmt::Debug> std::error::Error for TryPushError<T> {}
