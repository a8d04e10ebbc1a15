//! Error types for arena operations.

use std::io;

/// Result type for arena operations.
pub type Result<T> = std::result::Result<T, ArenaError>;

/// Everything that can go wrong while reserving, committing, pushing or
/// releasing arena memory.
#[derive(Debug, thiserror::Error)]
pub enum ArenaError {
  /// The address range could not be reserved.
  #[error("failed to reserve {size} bytes of address space: {source}")]
  Reservation {
    size: usize,
    #[source]
    source: io::Error,
  },

  /// Granting read/write access to an already reserved range failed.
  #[error("failed to commit {len} bytes at offset {offset}: {source}")]
  Commit {
    offset: usize,
    len: usize,
    #[source]
    source: io::Error,
  },

  /// Returning a reservation to the system failed.
  #[error("failed to release {size} bytes of address space: {source}")]
  Release {
    size: usize,
    #[source]
    source: io::Error,
  },

  /// The request does not fit and the arena is not allowed to chain.
  #[error("arena exhausted: {requested} bytes requested, {reserved} bytes reserved")]
  Exhausted { requested: usize, reserved: usize },

  /// The requested alignment is zero or not a power of two.
  #[error("alignment {0} is not a power of two")]
  InvalidAlignment(usize),

  /// Size plus alignment padding does not fit in `usize`.
  #[error("allocation of {size} bytes aligned to {align} overflows the address space")]
  SizeOverflow { size: usize, align: usize },

  /// A caller buffer shorter than the node header.
  #[error("backing buffer of {len} bytes cannot hold the {header}-byte node header")]
  BufferTooSmall { len: usize, header: usize },
}

impl ArenaError {
  pub(crate) fn reservation(size: usize) -> Self {
    Self::Reservation {
      size,
      source: io::Error::last_os_error(),
    }
  }

  pub(crate) fn commit(
    offset: usize,
    len: usize,
  ) -> Self {
    Self::Commit {
      offset,
      len,
      source: io::Error::last_os_error(),
    }
  }

  pub(crate) fn release(size: usize) -> Self {
    Self::Release {
      size,
      source: io::Error::last_os_error(),
    }
  }
}
