//! Operations shared by every arena flavour, and temporary scopes on top of
//! them.

use std::{
  alloc::Layout,
  mem,
  ops::{Deref, DerefMut},
  ptr::{self, NonNull},
};

use crate::error::{ArenaError, Result};

/// A bump allocator with save/restore by logical position.
///
/// Implementors provide the three primitive operations. Everything else is
/// expressed in terms of them.
///
/// Pointers handed out stay valid until the arena is popped below them,
/// cleared, or released. Nothing ties them to a borrow of the arena, so
/// dereferencing them is `unsafe` and the caller's responsibility.
pub trait BumpArena {
  /// Reserves `size` bytes aligned to `align` (a power of two).
  ///
  /// The memory is uninitialized.
  fn push(
    &mut self,
    size: usize,
    align: usize,
  ) -> Result<NonNull<u8>>;

  /// The arena-wide cursor used as save/restore coordinate.
  fn logical_position(&self) -> usize;

  /// Rolls the current node back to `position`.
  ///
  /// Only the node receiving allocations is rewound. A position that lies in
  /// an earlier node clamps to the start of the current one.
  fn pop_to(
    &mut self,
    position: usize,
  );

  /// Rolls back the last `amount` bytes.
  fn pop(
    &mut self,
    amount: usize,
  ) {
    let position = self.logical_position().saturating_sub(amount);
    self.pop_to(position);
  }

  /// Rewinds to the very start, keeping all reserved and committed memory.
  fn clear(&mut self) {
    self.pop_to(0);
  }

  fn push_layout(
    &mut self,
    layout: Layout,
  ) -> Result<NonNull<u8>> {
    self.push(layout.size(), layout.align())
  }

  /// Same as [`push`](Self::push) but the bytes are zeroed.
  fn push_zeroed(
    &mut self,
    size: usize,
    align: usize,
  ) -> Result<NonNull<u8>> {
    let ptr = self.push(size, align)?;
    unsafe { ptr::write_bytes(ptr.as_ptr(), 0, size) };
    Ok(ptr)
  }

  /// Moves `value` into the arena.
  ///
  /// Its destructor never runs.
  fn push_value<T>(
    &mut self,
    value: T,
  ) -> Result<NonNull<T>> {
    let ptr = self.push_layout(Layout::new::<T>())?.cast::<T>();
    unsafe { ptr.write(value) };
    Ok(ptr)
  }

  /// Room for `count` uninitialized values of `T`.
  fn push_array<T>(
    &mut self,
    count: usize,
  ) -> Result<NonNull<[T]>> {
    let layout = Layout::array::<T>(count).map_err(|_| ArenaError::SizeOverflow {
      size: count.saturating_mul(mem::size_of::<T>()),
      align: mem::align_of::<T>(),
    })?;
    let ptr = self.push_layout(layout)?.cast::<T>();
    Ok(NonNull::slice_from_raw_parts(ptr, count))
  }

  /// Copies `values` into the arena.
  fn push_slice<T: Copy>(
    &mut self,
    values: &[T],
  ) -> Result<NonNull<[T]>> {
    let ptr = self.push_array::<T>(values.len())?;
    unsafe { ptr::copy_nonoverlapping(values.as_ptr(), ptr.cast::<T>().as_ptr(), values.len()) };
    Ok(ptr)
  }

  /// Copies `s` into the arena.
  fn push_str(
    &mut self,
    s: &str,
  ) -> Result<NonNull<str>> {
    let bytes = self.push_slice(s.as_bytes())?;
    // SAFETY: the bytes were copied from a valid str and the pointer is non-null.
    Ok(unsafe { NonNull::new_unchecked(bytes.as_ptr() as *mut str) })
  }

  /// Opens a temporary scope that rolls back everything pushed through it.
  fn begin_temp(&mut self) -> Temp<'_, Self>
  where
    Self: Sized,
  {
    Temp::begin(self)
  }
}

/// Saved position that is restored when the scope ends.
///
/// ```text
///   begin ─┐                         ┌─ end / drop
///          ▼                         ▼
///   ┌──────┬─────────────────────────┐
///   │ kept │   rolled back on end    │
///   └──────┴─────────────────────────┘
///          ▲
///      saved position
/// ```
///
/// The scope dereferences to the arena, so allocations are made through it.
/// Nested scopes borrow the outer one, which makes them end in reverse order
/// of creation.
///
/// ```rust
/// use rarena::{Arena, BumpArena, Temp};
///
/// let mut arena = Arena::new().unwrap();
/// let before = arena.logical_position();
///
/// {
///   let mut temp = Temp::begin(&mut arena);
///   temp.push(64, 8).unwrap();
///
///   let mut inner = temp.begin_temp();
///   inner.push(32, 8).unwrap();
///   inner.end();
///
///   temp.end();
/// }
///
/// assert_eq!(arena.logical_position(), before);
/// ```
pub struct Temp<'a, A: BumpArena + ?Sized> {
  arena: &'a mut A,
  pos: usize,
}

impl<'a, A: BumpArena + ?Sized> Temp<'a, A> {
  pub fn begin(arena: &'a mut A) -> Self {
    let pos = arena.logical_position();
    Self { arena, pos }
  }

  pub fn saved_position(&self) -> usize {
    self.pos
  }

  /// Restores the saved position. Dropping the scope does the same.
  pub fn end(self) {}
}

impl<A: BumpArena + ?Sized> Deref for Temp<'_, A> {
  type Target = A;

  fn deref(&self) -> &Self::Target {
    self.arena
  }
}

impl<A: BumpArena + ?Sized> DerefMut for Temp<'_, A> {
  fn deref_mut(&mut self) -> &mut Self::Target {
    self.arena
  }
}

impl<A: BumpArena + ?Sized> BumpArena for Temp<'_, A> {
  fn push(
    &mut self,
    size: usize,
    align: usize,
  ) -> Result<NonNull<u8>> {
    self.arena.push(size, align)
  }

  fn logical_position(&self) -> usize {
    self.arena.logical_position()
  }

  fn pop_to(
    &mut self,
    position: usize,
  ) {
    self.arena.pop_to(position);
  }
}

impl<A: BumpArena + ?Sized> Drop for Temp<'_, A> {
  fn drop(&mut self) {
    self.arena.pop_to(self.pos);
  }
}
