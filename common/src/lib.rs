//! Support code shared by the driver crates.
//!
//! - [`sync`]: interrupt masking and the synchronization primitives built
//!   on top of it (scoped critical sections, IRQ-safe spinlocks)
//! - [`arch`]: architecture-specific implementations of the masking
//!   interface

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod sync;
