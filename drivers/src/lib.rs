//! Interrupt-Driven Serial Driver Core
//!
//! This crate implements a buffered serial (UART) driver split into a
//! hardware-independent engine and small register-level backends:
//!
//! # Module Organization
//!
//! - [`ring`]: lock-free single-producer/single-consumer byte FIFO shared
//!   between interrupt handlers and foreground code
//! - [`hal`]: the operations contract a hardware backend implements, plus
//!   configuration and error types
//! - [`port`]: per-peripheral state and the read/write/flush data path
//! - [`hw`]: register-level backends (ARM PrimeCell PL011)
//! - [`irq`]: interrupt vector handler registry
//! - [`uart`]: statically-allocated port instances and console helpers
//!
//! # Design Principles
//!
//! 1. **One engine, many backends**: the data path in [`port`] never
//!    touches a register; backends never touch a ring buffer
//! 2. **Interrupt masking is the only lock**: every multi-step state
//!    update runs inside a scoped [`common::sync::IrqGuard`]
//! 3. **Availability over strict delivery**: link errors are counted,
//!    never surfaced as call failures
//! 4. **No allocation**: buffers are const-generic arrays, ports are
//!    statics

#![cfg_attr(not(test), no_std)]

pub mod hal;
pub mod hw;
pub mod irq;
pub mod port;
pub mod ring;
pub mod uart;

// Re-export commonly used types
pub use hal::serial::{DeviceConfig, Pending, SerialConfig, SerialError, SerialHw};
pub use port::{PortFlags, SerialPort, SerialStats};
pub use ring::RingBuffer;
