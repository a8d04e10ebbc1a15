//! # rarena - Region-Based Memory Allocation
//!
//! This crate provides a **chained arena allocator** built on virtual memory.
//! Allocations are carved out of large reservations by bumping a cursor and
//! are freed all at once by moving the cursor back.
//!
//! ## Overview
//!
//! ```text
//!   Arena Concept:
//!
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                     RESERVED ADDRESS SPACE                           │
//!   │                                                                      │
//!   │   ┌────────┬─────┬─────┬─────┬──────────────┬──────────────────────┐ │
//!   │   │ header │ A1  │ A2  │ A3  │  committed   │   reserved only      │ │
//!   │   └────────┴─────┴─────┴─────┴──────────────┴──────────────────────┘ │
//!   │                              ▲              ▲                      ▲ │
//!   │                              │              │                      │ │
//!   │                             pos            cmt                    res│
//!   │                                                                      │
//!   └──────────────────────────────────────────────────────────────────────┘
//!
//!   Each push "bumps" pos forward. Pages are committed on demand.
//!   Freeing is O(1): pos moves back to a saved position.
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//!   rarena
//!   ├── align      - Power-of-two rounding (align_pow2!, checked_align_pow2)
//!   ├── error      - ArenaError and Result
//!   ├── params     - ArenaParams, ArenaFlags, default sizes
//!   ├── vm         - VirtualMemory trait and the mmap-based SystemMemory
//!   ├── node       - One reservation with its cursor (internal)
//!   ├── arena      - Arena: chain of nodes, grows on overflow
//!   ├── fixed      - FixedArena: caller buffer, never grows
//!   └── temp       - BumpArena trait and Temp scopes
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use rarena::{Arena, BumpArena};
//!
//! let mut arena = Arena::new().unwrap();
//!
//! // Five i32 values, 4-byte aligned.
//! let numbers = arena.push_array::<i32>(5).unwrap().cast::<i32>();
//! unsafe {
//!   for i in 0..5 {
//!     numbers.add(i).write(i as i32 * 10);
//!   }
//!   assert_eq!(numbers.add(4).read(), 40);
//! }
//!
//! // Everything after a saved position goes away when the scope ends.
//! let saved = arena.logical_position();
//! {
//!   let mut temp = arena.begin_temp();
//!   temp.push_str("scratch").unwrap();
//! }
//! assert_eq!(arena.logical_position(), saved);
//!
//! arena.release().unwrap();
//! ```
//!
//! ## How It Works
//!
//! A node reserves its whole range with no access rights and commits pages
//! only as the cursor reaches them:
//!
//! ```text
//!   push(size, align)
//!
//!          start = align_up(pos)       end = start + size
//!                 │                          │
//!   ┌─────────────▼──────────────────────────▼───────────────┐
//!   │  used  │pad│        new allocation     │               │
//!   └────────────────────────────────────────────────────────┘
//!
//!   end > res  →  chain a new node, retry there
//!   end > cmt  →  commit [cmt, round_up(end, commit_size))
//!   pos = end  →  return start
//! ```
//!
//! When a node is exhausted a new one is linked after it. Logical positions
//! keep increasing across the chain:
//!
//! ```text
//!   Chain:
//!
//!   ┌────────────────┐    ┌────────────────┐    ┌────────────────┐
//!   │ node 0         │ ─▶ │ node 1         │ ─▶ │ node 2         │ ◀── current
//!   │ base_pos = 0   │    │ base_pos = R   │    │ base_pos = 2R  │
//!   └────────────────┘    └────────────────┘    └────────────────┘
//! ```
//!
//! ## Features
//!
//! - **Lazy commit**: physical memory is only requested for touched pages
//! - **Transparent growth**: overflow chains a new reservation
//! - **Bulk free**: `pop`, `pop_to`, `clear` and temporary scopes
//! - **Caller buffers**: `FixedArena` works on any `&mut [u8]`
//!
//! ## Limitations
//!
//! - **Single-threaded only**: arenas are neither `Send` nor `Sync`
//! - **No per-object free**: memory is reclaimed by rewinding only
//! - **Rewinds stay in the current node**: popping to a position inside an
//!   earlier node clamps to the start of the current node; earlier nodes keep
//!   their allocations until the arena is released
//! - **Unix-only**: requires `libc` (`mmap`, `mprotect`, `munmap`)
//!
//! ## Safety
//!
//! Pushes return raw pointers that are not tied to a borrow of the arena.
//! Reading or writing through them is `unsafe`; they dangle once the arena
//! is rewound below them or released.

pub mod align;
mod arena;
mod error;
mod fixed;
mod node;
mod params;
mod temp;
mod vm;

pub use align::checked_align_pow2;
pub use arena::Arena;
pub use error::{ArenaError, Result};
pub use fixed::FixedArena;
pub use node::NODE_HEADER_SIZE;
pub use params::{
  ArenaFlags, ArenaParams, DEFAULT_COMMIT_SIZE, DEFAULT_RESERVE_SIZE, LARGE_PAGE_SIZE, kib, mib,
};
pub use temp::{BumpArena, Temp};
pub use vm::{SystemMemory, VirtualMemory};
