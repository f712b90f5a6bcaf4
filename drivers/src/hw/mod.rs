//! Register-level hardware backends implementing
//! [`crate::hal::serial::SerialHw`].

pub mod pl011;
