//! Hardware Abstraction Layer - Platform-Independent Contracts
//!
//! The traits and types here are the seam between the generic data-path
//! engine in [`crate::port`] and register-level backends in [`crate::hw`].
//! Backends must not leak platform types through this layer.

pub mod serial;
