//! Arena configuration.

/// Size of `n` kibibytes.
pub const fn kib(n: usize) -> usize {
  n * 1024
}

/// Size of `n` mebibytes.
pub const fn mib(n: usize) -> usize {
  n * 1024 * 1024
}

/// Address space reserved per node unless configured otherwise.
pub const DEFAULT_RESERVE_SIZE: usize = mib(64);

/// Commit granularity unless configured otherwise.
pub const DEFAULT_COMMIT_SIZE: usize = mib(4);

/// Page granularity used when [`ArenaFlags::LARGE_PAGES`] is requested.
pub const LARGE_PAGE_SIZE: usize = mib(2);

bitflags::bitflags! {
  /// Behaviour switches for an arena.
  #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
  pub struct ArenaFlags: u32 {
    /// Overflowing the reservation is an error instead of chaining a new node.
    const NO_CHAIN    = 1 << 0;
    /// Round sizes to large pages and ask the kernel to back them with huge pages.
    const LARGE_PAGES = 1 << 1;
  }
}

/// Sizes and flags an [`Arena`](crate::Arena) is created with.
///
/// Both sizes are rounded up to the backend's page size when the arena is
/// created. Every node chained later uses the same values.
///
/// ```rust
/// use rarena::{ArenaFlags, ArenaParams, kib, mib};
///
/// let params = ArenaParams::default()
///   .with_reserve_size(mib(1))
///   .with_commit_size(kib(64))
///   .with_flags(ArenaFlags::NO_CHAIN);
///
/// assert_eq!(params.reserve_size, 1024 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaParams {
  pub reserve_size: usize,
  pub commit_size: usize,
  pub flags: ArenaFlags,
}

impl ArenaParams {
  pub fn new(
    reserve_size: usize,
    commit_size: usize,
    flags: ArenaFlags,
  ) -> Self {
    Self {
      reserve_size,
      commit_size,
      flags,
    }
  }

  pub fn with_reserve_size(
    mut self,
    reserve_size: usize,
  ) -> Self {
    self.reserve_size = reserve_size;
    self
  }

  pub fn with_commit_size(
    mut self,
    commit_size: usize,
  ) -> Self {
    self.commit_size = commit_size;
    self
  }

  pub fn with_flags(
    mut self,
    flags: ArenaFlags,
  ) -> Self {
    self.flags = flags;
    self
  }

  pub fn can_chain(&self) -> bool {
    !self.flags.contains(ArenaFlags::NO_CHAIN)
  }
}

impl Default for ArenaParams {
  fn default() -> Self {
    Self::new(DEFAULT_RESERVE_SIZE, DEFAULT_COMMIT_SIZE, ArenaFlags::empty())
  }
}
