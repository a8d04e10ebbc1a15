//! One contiguous region of an arena chain.

use std::ptr::NonNull;

use crate::{
  align::checked_align_pow2,
  align_pow2,
  error::{ArenaError, Result},
  params::ArenaFlags,
  vm::VirtualMemory,
};

/// Bytes skipped at the front of every node before the first allocation.
pub const NODE_HEADER_SIZE: usize = 128;

/// Aligned `[start, end)` offsets of a prospective allocation within a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Span {
  pub start: usize,
  pub end: usize,
}

/// Cursor and watermarks for a single region.
///
/// ```text
///   base                         base + pos     base + cmt           base + res
///   ┌──────────┬──────────────────────┬──────────────┬────────────────────┐
///   │  header  │     allocations      │  committed   │  reserved only     │
///   └──────────┴──────────────────────┴──────────────┴────────────────────┘
///   ◀───────── NODE_HEADER_SIZE
/// ```
///
/// `0 <= pos <= cmt <= res` holds at all times.
#[derive(Debug)]
pub(crate) struct ArenaNode {
  base: NonNull<u8>,
  /// Logical offset of `base` within the arena's position numbering.
  pub base_pos: usize,
  pub pos: usize,
  pub cmt: usize,
  pub res: usize,
  pub commit_size: usize,
  pub reserve_size: usize,
}

impl ArenaNode {
  /// Reserves a fresh region and commits its first `commit_size` bytes.
  ///
  /// Both sizes are rounded up to the backend's page size. The commit size is
  /// capped by the reserve size.
  pub fn reserve<B: VirtualMemory>(
    vm: &B,
    reserve_size: usize,
    commit_size: usize,
    flags: ArenaFlags,
    base_pos: usize,
  ) -> Result<Self> {
    let page = vm.page_size(flags);

    let res = checked_align_pow2(reserve_size.max(NODE_HEADER_SIZE), page)
      .ok_or(ArenaError::SizeOverflow {
        size: reserve_size,
        align: page,
      })?;
    // res is a page multiple, so rounding the clamped value cannot pass it.
    let commit_size = align_pow2!(commit_size.clamp(NODE_HEADER_SIZE, res), page);

    let base = vm.reserve(res, flags)?;

    if let Err(err) = unsafe { vm.commit(base, 0, commit_size) } {
      if let Err(release_err) = unsafe { vm.release(base, res) } {
        tracing::warn!(error = %release_err, "failed to release region after commit failure");
      }
      return Err(err);
    }

    Ok(Self {
      base,
      base_pos,
      pos: NODE_HEADER_SIZE,
      cmt: commit_size,
      res,
      commit_size,
      reserve_size: res,
    })
  }

  /// Wraps memory that is already fully accessible and never grows.
  pub fn adopt(
    base: NonNull<u8>,
    len: usize,
  ) -> Result<Self> {
    if len < NODE_HEADER_SIZE {
      return Err(ArenaError::BufferTooSmall {
        len,
        header: NODE_HEADER_SIZE,
      });
    }

    Ok(Self {
      base,
      base_pos: 0,
      pos: NODE_HEADER_SIZE,
      cmt: len,
      res: len,
      commit_size: len,
      reserve_size: len,
    })
  }

  pub fn base(&self) -> NonNull<u8> {
    self.base
  }

  /// Logical position of the cursor.
  pub fn position(&self) -> usize {
    self.base_pos + self.pos
  }

  /// Computes where `size` bytes aligned to `align` would land.
  ///
  /// Alignment is applied to the address, not the offset, so it holds even
  /// for bases that are not page aligned. The span may exceed `res`; callers
  /// check [`fits`](Self::fits).
  pub fn place(
    &self,
    size: usize,
    align: usize,
  ) -> Result<Span> {
    let overflow = || ArenaError::SizeOverflow { size, align };

    let addr = self.base.as_ptr() as usize;
    let cursor = addr.checked_add(self.pos).ok_or_else(overflow)?;
    let start = checked_align_pow2(cursor, align).ok_or_else(overflow)? - addr;
    let end = start.checked_add(size).ok_or_else(overflow)?;

    Ok(Span { start, end })
  }

  pub fn fits(
    &self,
    span: Span,
  ) -> bool {
    span.end <= self.res
  }

  /// Extends the committed prefix so `end` is accessible.
  ///
  /// The new watermark is the next multiple of `commit_size` covering `end`,
  /// capped at `res`. Only `[cmt, new_cmt)` is handed to the backend.
  pub fn commit_to<B: VirtualMemory>(
    &mut self,
    vm: &B,
    end: usize,
  ) -> Result<()> {
    debug_assert!(end <= self.res);

    if end <= self.cmt {
      return Ok(());
    }

    let new_cmt = end.div_ceil(self.commit_size).saturating_mul(self.commit_size).min(self.res);
    let len = new_cmt - self.cmt;

    unsafe { vm.commit(self.base, self.cmt, len)? };

    tracing::trace!(offset = self.cmt, len, committed = new_cmt, "committed arena pages");
    self.cmt = new_cmt;

    Ok(())
  }

  /// Moves the cursor past `span` and returns the start address.
  pub fn advance(
    &mut self,
    span: Span,
  ) -> NonNull<u8> {
    debug_assert!(span.start >= self.pos);
    debug_assert!(span.end <= self.cmt);

    self.pos = span.end;

    // SAFETY: span.start <= span.end <= cmt, so the result stays inside the
    // committed part of the region starting at base.
    unsafe { self.base.add(span.start) }
  }

  /// Rolls the cursor back to the logical position `target`.
  ///
  /// Targets before this node's first usable byte clamp to it; targets at or
  /// past the cursor leave it untouched.
  pub fn rewind(
    &mut self,
    target: usize,
  ) {
    let floor = self.base_pos + NODE_HEADER_SIZE;
    let rel = target.max(floor) - self.base_pos;

    if rel < self.pos {
      self.pos = rel;
    }
  }

  /// Returns the region to the backend.
  ///
  /// # Safety
  ///
  /// The node must have been created by [`reserve`](Self::reserve) on `vm` and
  /// must not be used afterwards.
  pub unsafe fn release<B: VirtualMemory>(
    &self,
    vm: &B,
  ) -> Result<()> {
    unsafe { vm.release(self.base, self.res) }
  }
}
