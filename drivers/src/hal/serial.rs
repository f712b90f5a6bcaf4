//! Serial Port (UART) Hardware Abstraction Layer.
//!
//! This module defines the operations contract a hardware backend
//! implements to plug into the generic buffered engine, plus the
//! configuration and error types shared across backends.

use bitflags::bitflags;

/// Serial port configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Baud rate in bits per second.
    pub baud_rate: u32,
    /// Number of data bits per frame.
    pub data_bits: DataBits,
    /// Parity checking mode.
    pub parity: Parity,
    /// Number of stop bits.
    pub stop_bits: StopBits,
}

impl SerialConfig {
    /// Create a standard 8N1 configuration at the specified baud rate.
    ///
    /// 8N1 means: 8 data bits, no parity, 1 stop bit. The backends in
    /// this crate only accept 8N1; the frame format fields exist so the
    /// rejection is explicit rather than silent.
    pub const fn new_8n1(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }

    /// Whether this is an 8N1 frame format.
    pub const fn is_8n1(&self) -> bool {
        matches!(self.data_bits, DataBits::Eight)
            && matches!(self.parity, Parity::None)
            && matches!(self.stop_bits, StopBits::One)
    }
}

impl Default for SerialConfig {
    /// Default configuration: 115200 baud, 8N1.
    fn default() -> Self {
        Self::new_8n1(115200)
    }
}

/// Number of data bits per frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

/// Parity mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Parity {
    /// No parity bit.
    None,
    /// Odd parity.
    Odd,
    /// Even parity.
    Even,
}

/// Number of stop bits.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StopBits {
    /// One stop bit.
    One,
    /// Two stop bits.
    Two,
}

/// Serial port errors.
///
/// Link-quality conditions (framing, parity, break, overrun) are not
/// errors at this level: they are counted in [`crate::port::SerialStats`]
/// and never fail a call.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SerialError {
    /// Operation would block: RX ring empty on read, TX full on a
    /// non-blocking write, TX holding register full on `try_transmit`.
    /// Transient; callers retry.
    WouldBlock,
    /// Invalid configuration parameter.
    InvalidConfig,
    /// The port has not been configured (or was deconfigured).
    Unconfigured,
}

bitflags! {
    /// Per-byte receive status, as reported by the hardware alongside
    /// the data.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct LineStatus: u8 {
        /// Framing error: stop bit not seen where expected.
        const FRAME = 1 << 0;
        /// Parity check failed.
        const PARITY = 1 << 1;
        /// Break condition on the line.
        const BREAK = 1 << 2;
        /// Receive FIFO overrun; data was lost in hardware.
        const OVERRUN = 1 << 3;
    }
}

bitflags! {
    /// Outstanding work, per direction and per layer.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct Pending: u8 {
        /// Hardware receive FIFO holds data.
        const HW_RX = 1 << 0;
        /// Hardware is still shifting out transmit data.
        const HW_TX = 1 << 1;
        /// Software RX ring is non-empty.
        const SW_RX = 1 << 2;
        /// Software TX ring is non-empty.
        const SW_TX = 1 << 3;

        const RX = Self::HW_RX.bits() | Self::SW_RX.bits();
        const TX = Self::HW_TX.bits() | Self::SW_TX.bits();
    }
}

/// Pin-routing descriptor for one serial signal.
///
/// `port == None` means the signal is unused and must not be routed.
/// The core never interprets these fields; they pass through to the
/// board's [`ConfigurePin`] hook.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PinDescriptor {
    /// GPIO port/bank, `None` for an unused signal.
    pub port: Option<u8>,
    /// Pin number within the port.
    pub pin: u8,
    /// Mode / alternate-function selector, board-defined encoding.
    pub function: u8,
}

impl PinDescriptor {
    /// A descriptor for a signal that is not wired up.
    pub const UNUSED: Self = Self {
        port: None,
        pin: 0,
        function: 0,
    };
}

/// Board hook that routes one pin: `(descriptor, enable, initial_high)`.
///
/// Called only from backend `configure` implementations, never from the
/// generic engine.
pub type ConfigurePin = fn(&PinDescriptor, bool, bool) -> Result<(), SerialError>;

/// Static per-instance wiring supplied by the board.
///
/// The core never mutates this; it is forwarded to the backend at
/// configure time.
#[derive(Debug, Copy, Clone)]
pub struct DeviceConfig {
    /// Peripheral input clock in Hz, used for baud divisors.
    pub clock_hz: u32,
    /// Interrupt line for this instance at the interrupt controller.
    pub irq: u32,
    /// Transmit signal routing.
    pub tx_pin: PinDescriptor,
    /// Receive signal routing.
    pub rx_pin: PinDescriptor,
    /// Board pin-routing hook.
    pub configure_pin: ConfigurePin,
}

/// Operations contract for a serial hardware backend.
///
/// One implementation exists per hardware kind; the generic engine in
/// [`crate::port::SerialPort`] drives any compliant backend. All methods
/// are non-blocking: the engine owns every wait.
pub trait SerialHw {
    /// Apply or tear down the hardware configuration.
    ///
    /// `Some(config)`: route pins, program baud and frame format (8N1
    /// only), clear stale error state, enable the receive interrupt at
    /// the peripheral (the transmit interrupt is armed lazily by the
    /// engine), then enable the peripheral. Must be idempotent.
    ///
    /// `None`: mask all interrupts at the peripheral and disable it.
    fn configure(&mut self, config: Option<&SerialConfig>) -> Result<(), SerialError>;

    /// Place one byte in the transmit holding register.
    ///
    /// Never spins. Returns [`SerialError::WouldBlock`] when the
    /// hardware has no room.
    fn try_transmit(&mut self, byte: u8) -> Result<(), SerialError>;

    /// Arm or disarm the transmit-ready interrupt at the peripheral.
    ///
    /// The interrupt-controller side stays armed from configure time;
    /// this only touches the peripheral's own mask.
    fn set_tx_interrupt(&mut self, enabled: bool);

    /// Hardware-side pending work: [`Pending::HW_RX`] and
    /// [`Pending::HW_TX`] only. The engine supplies the software bits
    /// and calls this inside a critical section so the sample is
    /// consistent with respect to interrupts.
    fn pending(&self) -> Pending;

    /// Take one received unit and its per-byte status, or `None` when
    /// the receive FIFO is empty. This is the register read an RX
    /// interrupt handler performs; keeping it in the contract lets the
    /// handler logic live once in the engine.
    fn try_receive(&mut self) -> Option<(u8, LineStatus)>;
}
