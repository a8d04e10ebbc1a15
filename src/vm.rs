//! Virtual memory primitives the arena is built on.
//!
//! ```text
//!   reserve(res)                  commit(0, cmt)            release(res)
//!   ┌───────────────────────┐     ┌──────┬────────────────┐
//!   │       PROT_NONE       │ ──▶ │  RW  │   PROT_NONE    │ ──▶  (unmapped)
//!   └───────────────────────┘     └──────┴────────────────┘
//! ```
//!
//! The backend knows nothing about cursors or chains. It is a trait so tests
//! (or embedders) can observe and fail individual calls.

use std::ptr::{self, NonNull};

use libc::{
  MAP_ANONYMOUS, MAP_FAILED, MAP_PRIVATE, PROT_NONE, PROT_READ, PROT_WRITE, c_void,
};

use crate::{
  error::{ArenaError, Result},
  params::{ArenaFlags, LARGE_PAGE_SIZE},
};

/// Reserve/commit/release over a page-granular address space.
pub trait VirtualMemory {
  /// Granularity reservations and commits are rounded to. Must be a power
  /// of two.
  fn page_size(
    &self,
    flags: ArenaFlags,
  ) -> usize;

  /// Reserves `size` bytes of address space without access rights.
  fn reserve(
    &self,
    size: usize,
    flags: ArenaFlags,
  ) -> Result<NonNull<u8>>;

  /// Grants read/write access to `[offset, offset + len)` of a reservation.
  ///
  /// # Safety
  ///
  /// `base` must come from [`reserve`](Self::reserve) on this backend and the
  /// range must lie within the reserved size.
  unsafe fn commit(
    &self,
    base: NonNull<u8>,
    offset: usize,
    len: usize,
  ) -> Result<()>;

  /// Returns the whole reservation to the system.
  ///
  /// # Safety
  ///
  /// `base` and `size` must describe a live reservation of this backend. No
  /// pointer into it may be used afterwards.
  unsafe fn release(
    &self,
    base: NonNull<u8>,
    size: usize,
  ) -> Result<()>;
}

/// Anonymous private mappings via `mmap`/`mprotect`/`munmap`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemMemory;

impl SystemMemory {
  /// The system page size reported by `sysconf(_SC_PAGESIZE)`.
  pub fn os_page_size() -> usize {
    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };

    // sysconf only fails for unknown names.
    if page_size < 1 { 4096 } else { page_size as usize }
  }
}

impl VirtualMemory for SystemMemory {
  fn page_size(
    &self,
    flags: ArenaFlags,
  ) -> usize {
    let os = Self::os_page_size();

    if flags.contains(ArenaFlags::LARGE_PAGES) {
      os.max(LARGE_PAGE_SIZE)
    } else {
      os
    }
  }

  fn reserve(
    &self,
    size: usize,
    flags: ArenaFlags,
  ) -> Result<NonNull<u8>> {
    let addr = unsafe {
      libc::mmap(
        ptr::null_mut(),
        size,
        PROT_NONE,
        MAP_PRIVATE | MAP_ANONYMOUS,
        -1,
        0,
      )
    };

    if addr == MAP_FAILED {
      return Err(ArenaError::reservation(size));
    }

    if flags.contains(ArenaFlags::LARGE_PAGES) {
      advise_huge_pages(addr, size);
    }

    NonNull::new(addr.cast::<u8>()).ok_or_else(|| ArenaError::reservation(size))
  }

  unsafe fn commit(
    &self,
    base: NonNull<u8>,
    offset: usize,
    len: usize,
  ) -> Result<()> {
    let addr = unsafe { base.as_ptr().add(offset) } as *mut c_void;

    if unsafe { libc::mprotect(addr, len, PROT_READ | PROT_WRITE) } != 0 {
      return Err(ArenaError::commit(offset, len));
    }

    Ok(())
  }

  unsafe fn release(
    &self,
    base: NonNull<u8>,
    size: usize,
  ) -> Result<()> {
    if unsafe { libc::munmap(base.as_ptr() as *mut c_void, size) } != 0 {
      return Err(ArenaError::release(size));
    }

    Ok(())
  }
}

// Only a hint: transparent huge pages may be disabled.
#[cfg(target_os = "linux")]
fn advise_huge_pages(
  addr: *mut c_void,
  size: usize,
) {
  if unsafe { libc::madvise(addr, size, libc::MADV_HUGEPAGE) } != 0 {
    tracing::trace!(size, "huge page advice rejected");
  }
}

#[cfg(not(target_os = "linux"))]
fn advise_huge_pages(
  _addr: *mut c_void,
  _size: usize,
) {
}
