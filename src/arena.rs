use std::ptr::NonNull;

use tracing::{debug, warn};

use crate::{
  error::{ArenaError, Result},
  node::{ArenaNode, NODE_HEADER_SIZE},
  params::{ArenaFlags, ArenaParams},
  temp::BumpArena,
  vm::{SystemMemory, VirtualMemory},
};

/// A chain of virtual-memory regions with a bump cursor.
///
/// The chain is owned oldest to newest; the last node is the one receiving
/// allocations. Every node is released exactly once, by [`release`] or on
/// drop.
///
/// [`release`]: Arena::release
pub struct Arena<B: VirtualMemory = SystemMemory> {
  chain: Vec<ArenaNode>,
  vm: B,
  params: ArenaParams,
}

impl Arena<SystemMemory> {
  /// Arena with [`ArenaParams::default`] over system memory.
  pub fn new() -> Result<Self> {
    Self::with_params(ArenaParams::default())
  }

  pub fn with_params(params: ArenaParams) -> Result<Self> {
    Self::with_backend(params, SystemMemory)
  }
}

impl<B: VirtualMemory> Arena<B> {
  /// Reserves the first node through `vm` and commits its initial prefix.
  pub fn with_backend(
    params: ArenaParams,
    vm: B,
  ) -> Result<Self> {
    let head = ArenaNode::reserve(
      &vm,
      params.reserve_size,
      params.commit_size,
      params.flags,
      0,
    )?;

    // Later nodes reuse the page-rounded sizes of the head.
    let params = ArenaParams {
      reserve_size: head.reserve_size,
      commit_size: head.commit_size,
      flags: params.flags,
    };

    debug!(
      reserve_size = params.reserve_size,
      commit_size = params.commit_size,
      flags = ?params.flags,
      "created arena"
    );

    Ok(Self {
      chain: vec![head],
      vm,
      params,
    })
  }

  pub fn params(&self) -> ArenaParams {
    self.params
  }

  pub fn flags(&self) -> ArenaFlags {
    self.params.flags
  }

  /// Number of nodes in the chain.
  pub fn node_count(&self) -> usize {
    self.chain.len()
  }

  /// Committed bytes over the whole chain, headers included.
  pub fn committed_size(&self) -> usize {
    self.chain.iter().map(|node| node.cmt).sum()
  }

  /// Reserved bytes over the whole chain.
  pub fn reserved_size(&self) -> usize {
    self.chain.iter().map(|node| node.res).sum()
  }

  pub fn backend(&self) -> &B {
    &self.vm
  }

  /// Releases every node, newest first.
  ///
  /// All nodes are attempted even if one fails; the first failure is
  /// returned.
  pub fn release(mut self) -> Result<()> {
    self.release_chain()
  }

  fn current(&self) -> &ArenaNode {
    &self.chain[self.chain.len() - 1]
  }

  fn current_mut(&mut self) -> &mut ArenaNode {
    let last = self.chain.len() - 1;
    &mut self.chain[last]
  }

  /// Reserves, but does not link, a node able to hold `size` bytes aligned
  /// to `align`.
  fn reserve_next(
    &self,
    size: usize,
    align: usize,
  ) -> Result<ArenaNode> {
    let prev = self.current();
    let base_pos = prev.base_pos + prev.res;

    // Worst case padding after the header is align - 1.
    let required = NODE_HEADER_SIZE
      .checked_add(align - 1)
      .and_then(|n| n.checked_add(size))
      .ok_or(ArenaError::SizeOverflow { size, align })?;

    let (reserve_size, commit_size) = if required > self.params.reserve_size {
      (required, required)
    } else {
      (self.params.reserve_size, self.params.commit_size)
    };

    ArenaNode::reserve(
      &self.vm,
      reserve_size,
      commit_size,
      self.params.flags,
      base_pos,
    )
  }

  /// Serves a push from a fresh node, linking it only once the push has
  /// succeeded.
  fn push_chained(
    &mut self,
    size: usize,
    align: usize,
  ) -> Result<NonNull<u8>> {
    let mut node = self.reserve_next(size, align)?;

    let placed = node.place(size, align).and_then(|span| {
      node.commit_to(&self.vm, span.end)?;
      Ok(span)
    });

    let span = match placed {
      Ok(span) => span,
      Err(err) => {
        // SAFETY: node was reserved through self.vm and never linked.
        if let Err(release_err) = unsafe { node.release(&self.vm) } {
          warn!(error = %release_err, "failed to release unlinked arena node");
        }
        return Err(err);
      }
    };

    let ptr = node.advance(span);

    debug!(
      nodes = self.chain.len() + 1,
      base_pos = node.base_pos,
      reserve_size = node.reserve_size,
      requested = size,
      "chained arena node"
    );

    self.chain.push(node);
    Ok(ptr)
  }

  fn release_chain(&mut self) -> Result<()> {
    if self.chain.is_empty() {
      return Ok(());
    }

    let nodes = self.chain.len();
    let mut result = Ok(());

    while let Some(node) = self.chain.pop() {
      // SAFETY: every node in the chain was reserved through self.vm and is
      // dropped right after.
      if let Err(err) = unsafe { node.release(&self.vm) } {
        if result.is_ok() {
          result = Err(err);
        }
      }
    }

    debug!(nodes, "released arena");
    result
  }
}

impl<B: VirtualMemory> BumpArena for Arena<B> {
  /// Bumps the current node's cursor, committing or chaining as needed.
  ///
  /// ```text
  ///   fits in cmt ─────────────────────────────▶ advance
  ///   fits in res ──▶ commit [cmt, new cmt) ───▶ advance
  ///   exceeds res ──▶ reserve node ──▶ commit ──▶ advance ──▶ link
  /// ```
  fn push(
    &mut self,
    size: usize,
    align: usize,
  ) -> Result<NonNull<u8>> {
    if !align.is_power_of_two() {
      return Err(ArenaError::InvalidAlignment(align));
    }

    let span = self.current().place(size, align)?;

    if !self.current().fits(span) {
      if !self.params.can_chain() {
        return Err(ArenaError::Exhausted {
          requested: size,
          reserved: self.current().res,
        });
      }

      return self.push_chained(size, align);
    }

    let last = self.chain.len() - 1;
    let node = &mut self.chain[last];
    node.commit_to(&self.vm, span.end)?;

    Ok(node.advance(span))
  }

  fn logical_position(&self) -> usize {
    self.current().position()
  }

  fn pop_to(
    &mut self,
    position: usize,
  ) {
    self.current_mut().rewind(position);
  }
}

impl<B: VirtualMemory> Drop for Arena<B> {
  fn drop(&mut self) {
    if let Err(err) = self.release_chain() {
      warn!(error = %err, "failed to release arena memory");
    }
  }
}

impl<B: VirtualMemory> std::fmt::Debug for Arena<B> {
  fn fmt(
    &self,
    f: &mut std::fmt::Formatter<'_>,
  ) -> std::fmt::Result {
    f.debug_struct("Arena")
      .field("params", &self.params)
      .field("nodes", &self.chain.len())
      .field("position", &self.chain.last().map(ArenaNode::position))
      .finish()
  }
}
