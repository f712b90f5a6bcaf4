//! ARM PrimeCell PL011 UART backend.
//!
//! Implements the serial operations contract on the PL011's register
//! interface. The buffering, blocking and line-ending logic all live in
//! [`crate::port`]; this module only knows registers.
//!
//! The PL011 reports per-byte receive errors in bits 8..=11 of the data
//! register, read together with the byte itself, which maps directly
//! onto [`LineStatus`].

use core::ptr::{read_volatile, write_volatile};

use log::debug;

use crate::hal::serial::{
    DeviceConfig, LineStatus, Pending, SerialConfig, SerialError, SerialHw,
};

// Register offsets
const DR_OFFSET: usize = 0x00;
const RSRECR_OFFSET: usize = 0x04;
const FR_OFFSET: usize = 0x18;
const IBRD_OFFSET: usize = 0x24;
const FBRD_OFFSET: usize = 0x28;
const LCRH_OFFSET: usize = 0x2C;
const CR_OFFSET: usize = 0x30;
const IFLS_OFFSET: usize = 0x34;
const IMSC_OFFSET: usize = 0x38;
const ICR_OFFSET: usize = 0x44;

// Data Register (DR) receive status bits
const DR_FE: u32 = 1 << 8;
const DR_PE: u32 = 1 << 9;
const DR_BE: u32 = 1 << 10;
const DR_OE: u32 = 1 << 11;

// Flag Register (FR) bits
const FR_BUSY: u32 = 1 << 3;
const FR_RXFE: u32 = 1 << 4;
const FR_TXFF: u32 = 1 << 5;
const FR_TXFE: u32 = 1 << 7;

// Control Register (CR) bits
const CR_UARTEN: u32 = 1 << 0;
const CR_TXE: u32 = 1 << 8;
const CR_RXE: u32 = 1 << 9;

// Line Control Register (LCRH) bits
const LCRH_FEN: u32 = 1 << 4;
const LCRH_WLEN_8: u32 = 0b11 << 5;

// Interrupt Mask Set/Clear (IMSC) bits
const IMSC_RXIM: u32 = 1 << 4;
const IMSC_TXIM: u32 = 1 << 5;
const IMSC_RTIM: u32 = 1 << 6;

// FIFO level select: interrupt at half-full both ways
const IFLS_HALF: u32 = (0b010 << 3) | 0b010;

/// PL011 UART backend.
pub struct Pl011 {
    base: usize,
    device: DeviceConfig,
}

impl Pl011 {
    /// Create a backend for the PL011 at `base`.
    ///
    /// # Safety
    ///
    /// - `base` must point to a valid PL011 peripheral
    /// - Only one instance may exist per UART hardware
    /// - The region must be mapped as device memory
    pub const unsafe fn new(base: usize, device: DeviceConfig) -> Self {
        Self { base, device }
    }

    /// The board wiring this instance was created with.
    pub fn device(&self) -> &DeviceConfig {
        &self.device
    }

    #[inline]
    fn read_reg(&self, offset: usize) -> u32 {
        unsafe { read_volatile((self.base + offset) as *const u32) }
    }

    #[inline]
    fn write_reg(&mut self, offset: usize, value: u32) {
        unsafe { write_volatile((self.base + offset) as *mut u32, value) }
    }

    /// Wait for the transmit shifter to go idle.
    fn wait_idle(&self) {
        while self.read_reg(FR_OFFSET) & FR_BUSY != 0 {
            core::hint::spin_loop();
        }
    }

    /// Integer and fractional baud divisors for this instance's clock.
    fn divisors(&self, baud_rate: u32) -> Result<(u32, u32), SerialError> {
        if baud_rate == 0 {
            return Err(SerialError::InvalidConfig);
        }

        // BAUDDIV = FUARTCLK / (16 * baud), fractional part in 1/64ths
        let divisor = ((self.device.clock_hz as u64) << 6) / (16 * baud_rate as u64);

        let integer = (divisor >> 6) as u32;
        let fractional = (divisor & 0x3F) as u32;

        if integer == 0 || integer > 0xFFFF {
            return Err(SerialError::InvalidConfig);
        }

        Ok((integer, fractional))
    }

    fn route_pins(&self, enable: bool) -> Result<(), SerialError> {
        let route = self.device.configure_pin;
        if self.device.tx_pin.port.is_some() {
            // TX idles high
            route(&self.device.tx_pin, enable, true)?;
        }
        if self.device.rx_pin.port.is_some() {
            route(&self.device.rx_pin, enable, false)?;
        }
        Ok(())
    }
}

impl SerialHw for Pl011 {
    fn configure(&mut self, config: Option<&SerialConfig>) -> Result<(), SerialError> {
        let Some(config) = config else {
            // Deconfigure: silence the peripheral before releasing it.
            self.write_reg(IMSC_OFFSET, 0);
            self.write_reg(ICR_OFFSET, 0x07FF);
            self.write_reg(CR_OFFSET, 0);
            self.route_pins(false)?;
            return Ok(());
        };

        if !config.is_8n1() {
            return Err(SerialError::InvalidConfig);
        }

        let (ibrd, fbrd) = self.divisors(config.baud_rate)?;

        self.route_pins(true)?;

        // Disable the UART and let any in-flight frame finish
        let cr = self.read_reg(CR_OFFSET);
        self.write_reg(CR_OFFSET, cr & !CR_UARTEN);
        self.wait_idle();

        // Flush FIFOs
        let lcrh = self.read_reg(LCRH_OFFSET);
        self.write_reg(LCRH_OFFSET, lcrh & !LCRH_FEN);

        self.write_reg(IBRD_OFFSET, ibrd);
        self.write_reg(FBRD_OFFSET, fbrd);

        // 8N1 with FIFOs enabled
        self.write_reg(LCRH_OFFSET, LCRH_WLEN_8 | LCRH_FEN);

        // Clear stale interrupts and sticky receive errors
        self.write_reg(ICR_OFFSET, 0x07FF);
        self.write_reg(RSRECR_OFFSET, 0);

        self.write_reg(IFLS_OFFSET, IFLS_HALF);

        // Receive and receive-timeout interrupts only; the engine arms
        // the transmit interrupt once there is buffered data.
        self.write_reg(IMSC_OFFSET, IMSC_RXIM | IMSC_RTIM);

        self.write_reg(CR_OFFSET, CR_UARTEN | CR_TXE | CR_RXE);

        debug!("pl011: ibrd={ibrd} fbrd={fbrd}");
        Ok(())
    }

    fn try_transmit(&mut self, byte: u8) -> Result<(), SerialError> {
        if self.read_reg(FR_OFFSET) & FR_TXFF != 0 {
            return Err(SerialError::WouldBlock);
        }
        self.write_reg(DR_OFFSET, byte as u32);
        Ok(())
    }

    fn set_tx_interrupt(&mut self, enabled: bool) {
        let imsc = self.read_reg(IMSC_OFFSET);
        let imsc = if enabled {
            imsc | IMSC_TXIM
        } else {
            imsc & !IMSC_TXIM
        };
        self.write_reg(IMSC_OFFSET, imsc);
    }

    fn pending(&self) -> Pending {
        let fr = self.read_reg(FR_OFFSET);
        let mut pending = Pending::empty();
        if fr & FR_RXFE == 0 {
            pending |= Pending::HW_RX;
        }
        // Draining means either the shifter is busy or the TX FIFO
        // still holds data.
        if fr & FR_BUSY != 0 || fr & FR_TXFE == 0 {
            pending |= Pending::HW_TX;
        }
        pending
    }

    fn try_receive(&mut self) -> Option<(u8, LineStatus)> {
        if self.read_reg(FR_OFFSET) & FR_RXFE != 0 {
            return None;
        }

        // One read yields the byte and its error flags together.
        let dr = self.read_reg(DR_OFFSET);
        let mut status = LineStatus::empty();
        if dr & DR_FE != 0 {
            status |= LineStatus::FRAME;
        }
        if dr & DR_PE != 0 {
            status |= LineStatus::PARITY;
        }
        if dr & DR_BE != 0 {
            status |= LineStatus::BREAK;
        }
        if dr & DR_OE != 0 {
            status |= LineStatus::OVERRUN;
        }

        Some(((dr & 0xFF) as u8, status))
    }
}

// SAFETY: Pl011 wraps memory-mapped hardware; exclusive access is
// enforced by the owning SerialPort and its lock.
unsafe impl Send for Pl011 {}
