//! Statically-allocated UART instances and console helpers.
//!
//! One [`SerialPort`] exists per physical peripheral, owned by an
//! IRQ-safe lock so foreground code and the interrupt path share it
//! without ambient mutable state.

use common::sync::IrqSpinLock;

use crate::hal::serial::{DeviceConfig, PinDescriptor, SerialConfig, SerialError};
use crate::hw::pl011::Pl011;
use crate::port::{PortFlags, SerialPort};

cfg_if::cfg_if! {
    if #[cfg(feature = "bcm2711")] {
        /// PL011 base address on the BCM2711.
        pub const UART0_BASE: usize = 0xFE20_1000;
        /// UART interrupt line at the interrupt controller.
        pub const UART0_IRQ: u32 = 153;
    } else {
        /// PL011 base address on the BCM2835.
        pub const UART0_BASE: usize = 0x2020_1000;
        /// UART interrupt line at the interrupt controller.
        pub const UART0_IRQ: u32 = 57;
    }
}

cfg_if::cfg_if! {
    if #[cfg(target_arch = "arm")] {
        type BoardIrq = common::arch::ArmIrq;
    } else {
        // Host builds (tests, tooling) have no interrupts to mask.
        type BoardIrq = common::sync::NullIrq;
    }
}

/// UART reference clock as set up by the firmware.
const PL011_CLOCK_HZ: u32 = 48_000_000;

/// BCM283x alternate function 0.
const PIN_FN_ALT0: u8 = 4;

/// TXD0/RXD0 routing for UART0.
///
/// The firmware already leaves GPIO 14/15 on ALT0 for the PL011, so the
/// hook has nothing to reprogram; boards that repurpose those pins
/// supply their own mux code here.
fn uart0_pin(_pin: &PinDescriptor, _enable: bool, _initial_high: bool) -> Result<(), SerialError> {
    Ok(())
}

const UART0_DEVICE: DeviceConfig = DeviceConfig {
    clock_hz: PL011_CLOCK_HZ,
    irq: UART0_IRQ,
    tx_pin: PinDescriptor {
        port: Some(0),
        pin: 14,
        function: PIN_FN_ALT0,
    },
    rx_pin: PinDescriptor {
        port: Some(0),
        pin: 15,
        function: PIN_FN_ALT0,
    },
    configure_pin: uart0_pin,
};

/// UART0 port type: 256-byte software buffers per direction.
pub type Uart0 = SerialPort<Pl011, BoardIrq, 256, 256>;

/// Global UART0 instance.
static UART0: IrqSpinLock<Uart0, BoardIrq> = IrqSpinLock::new(SerialPort::new(unsafe {
    Pl011::new(UART0_BASE, UART0_DEVICE)
}));

/// Configure UART0 at `baud_rate` and bind its interrupt handler.
///
/// Console semantics: line-feed translation on, writes blocking.
/// Idempotent; reconfiguring discards buffered data.
pub fn init_uart0(baud_rate: u32) -> Result<(), SerialError> {
    {
        let mut port = UART0.lock();
        port.set_flags(PortFlags::TRANSLATE_ONLCR);
        port.configure(Some(SerialConfig::new_8n1(baud_rate)))?;
    }
    crate::irq::register(UART0_IRQ, uart0_irq);
    Ok(())
}

/// Disable UART0 and unbind its interrupt handler.
pub fn shutdown_uart0() -> Result<(), SerialError> {
    crate::irq::unregister(UART0_IRQ);
    UART0.lock().configure(None)
}

fn uart0_irq() {
    UART0.lock().handle_irq();
}

/// Execute a closure with exclusive access to UART0.
///
/// The port lock masks interrupts, so UART0's own handler cannot run
/// inside `f`; the engine's write path still makes progress by feeding
/// the hardware directly while it holds the lock.
pub fn with_uart0<F, R>(f: F) -> R
where
    F: FnOnce(&mut Uart0) -> R,
{
    let mut port = UART0.lock();
    f(&mut port)
}

/// Write a string to UART0, blocking until fully buffered.
pub fn print(s: &str) {
    with_uart0(|uart| {
        let mut bytes = s.as_bytes();
        while !bytes.is_empty() {
            match uart.write(bytes) {
                Ok(n) => bytes = &bytes[n..],
                Err(_) => break,
            }
        }
    });
}

/// Writer adapter for the `core::fmt::Write` trait.
pub struct UartWriter;

impl core::fmt::Write for UartWriter {
    fn write_str(&mut self, s: &str) -> core::fmt::Result {
        print(s);
        Ok(())
    }
}

/// Write a formatted string to UART0.
#[macro_export]
macro_rules! uart_print {
    ($($arg:tt)*) => {{
        use core::fmt::Write;
        let _ = write!($crate::uart::UartWriter, $($arg)*);
    }};
}

/// Write a formatted string with newline to UART0.
#[macro_export]
macro_rules! uart_println {
    () => { $crate::uart_print!("\n") };
    ($($arg:tt)*) => {{
        $crate::uart_print!($($arg)*);
        $crate::uart_print!("\n");
    }};
}
