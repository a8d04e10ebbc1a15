//! Arena over a caller-owned buffer.

use std::{marker::PhantomData, ptr::NonNull};

use crate::{
  error::{ArenaError, Result},
  node::ArenaNode,
  temp::BumpArena,
};

/// An arena that lives entirely inside a buffer it borrows.
///
/// Nothing is reserved, committed or released: the whole buffer is usable
/// from the start and the arena can never grow past it. Running out is an
/// [`ArenaError::Exhausted`] error.
///
/// ```rust
/// use rarena::{BumpArena, FixedArena, NODE_HEADER_SIZE};
///
/// let mut buf = [0u8; 1024];
/// let mut arena = FixedArena::new(&mut buf).unwrap();
///
/// let n = arena.push_value(7u32).unwrap();
/// assert_eq!(unsafe { n.read() }, 7);
///
/// arena.clear();
/// assert_eq!(arena.logical_position(), NODE_HEADER_SIZE);
/// ```
#[derive(Debug)]
pub struct FixedArena<'buf> {
  node: ArenaNode,
  _buf: PhantomData<&'buf mut [u8]>,
}

impl<'buf> FixedArena<'buf> {
  /// Fails with [`ArenaError::BufferTooSmall`] if `buf` cannot even hold the
  /// node header.
  pub fn new(buf: &'buf mut [u8]) -> Result<Self> {
    let len = buf.len();
    let base = NonNull::from(buf).cast::<u8>();

    Ok(Self {
      node: ArenaNode::adopt(base, len)?,
      _buf: PhantomData,
    })
  }

  /// Size of the borrowed buffer.
  pub fn capacity(&self) -> usize {
    self.node.res
  }

  /// Bytes left after the cursor, ignoring alignment padding.
  pub fn remaining(&self) -> usize {
    self.node.res - self.node.pos
  }
}

impl BumpArena for FixedArena<'_> {
  fn push(
    &mut self,
    size: usize,
    align: usize,
  ) -> Result<NonNull<u8>> {
    if !align.is_power_of_two() {
      return Err(ArenaError::InvalidAlignment(align));
    }

    let span = self.node.place(size, align)?;

    if !self.node.fits(span) {
      return Err(ArenaError::Exhausted {
        requested: size,
        reserved: self.node.res,
      });
    }

    Ok(self.node.advance(span))
  }

  fn logical_position(&self) -> usize {
    self.node.position()
  }

  fn pop_to(
    &mut self,
    position: usize,
  ) {
    self.node.rewind(position);
  }
}
