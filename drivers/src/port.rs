//! Per-peripheral state and the generic serial data path.
//!
//! [`SerialPort`] pairs one hardware backend with a software ring buffer
//! per direction and implements the operations applications call:
//! [`SerialPort::read`], [`SerialPort::write`], [`SerialPort::flush`] and
//! [`SerialPort::pending_state`], plus the interrupt service routines
//! that move bytes between the hardware FIFOs and the rings.
//!
//! Concurrency model: single-threaded foreground code preempted by
//! interrupt handlers. Each ring has one producer and one consumer; for
//! RX the handler produces and `read` consumes, for TX `write` produces
//! and the handler consumes. Any update touching more than a single ring
//! index runs inside an [`IrqGuard`], which restores the caller's
//! interrupt-masking state on drop.

use core::marker::PhantomData;

use bitflags::bitflags;
use common::sync::{IrqControl, IrqGuard};
use log::debug;

use crate::hal::serial::{LineStatus, Pending, SerialConfig, SerialError, SerialHw};
use crate::ring::{Push, RingBuffer};

bitflags! {
    /// Per-port behavior flags.
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct PortFlags: u8 {
        /// Expand each outgoing line feed to carriage return + line
        /// feed (ONLCR).
        const TRANSLATE_ONLCR = 1 << 0;
        /// Never block in [`SerialPort::write`]; report
        /// [`SerialError::WouldBlock`] instead.
        const NONBLOCK_WRITE = 1 << 1;
    }
}

/// Per-port event counters.
///
/// Link-quality conditions are recorded here instead of failing calls;
/// applications poll these at their own pace. All counters are
/// monotonic for the lifetime of the port.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct SerialStats {
    /// Units taken from the hardware receiver, including errored ones.
    pub rx_bytes: u32,
    /// Bytes handed to the hardware transmitter.
    pub tx_bytes: u32,
    /// Received bytes discarded because the RX ring was full.
    pub rx_dropped: u32,
    /// Framing errors (byte discarded).
    pub frame_errors: u32,
    /// Parity errors (byte discarded).
    pub parity_errors: u32,
    /// Break conditions seen on the line.
    pub breaks: u32,
    /// Hardware receive overruns.
    pub overruns: u32,
}

impl SerialStats {
    pub const fn new() -> Self {
        Self {
            rx_bytes: 0,
            tx_bytes: 0,
            rx_dropped: 0,
            frame_errors: 0,
            parity_errors: 0,
            breaks: 0,
            overruns: 0,
        }
    }
}

/// Progress of an ONLCR expansion that could not finish in one call.
///
/// Once a line feed's expansion is committed it is counted as consumed;
/// the owed bytes live here and are emitted before any new input on the
/// next write (or recovered by `flush`ing after a later write).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum TxExpand {
    /// No expansion in progress.
    Idle,
    /// Carriage return still owed (line feed follows it).
    PendingCr,
    /// Carriage return emitted, line feed still owed.
    PendingLf,
}

/// One serial peripheral: hardware backend, software buffers, flags and
/// counters.
///
/// `RX`/`TX` are the ring capacities (one slot of each is sacrificed to
/// distinguish full from empty). `I` is the platform's interrupt
/// masking; instances are statically allocated, typically wrapped in an
/// [`common::sync::IrqSpinLock`] (see [`crate::uart`]).
pub struct SerialPort<H: SerialHw, I: IrqControl, const RX: usize, const TX: usize> {
    hw: H,
    rx_ring: RingBuffer<RX>,
    tx_ring: RingBuffer<TX>,
    flags: PortFlags,
    tx_expand: TxExpand,
    stats: SerialStats,
    configured: bool,
    _irq: PhantomData<fn() -> I>,
}

impl<H: SerialHw, I: IrqControl, const RX: usize, const TX: usize> SerialPort<H, I, RX, TX> {
    /// Wrap a hardware backend. The port starts unconfigured.
    pub const fn new(hw: H) -> Self {
        Self {
            hw,
            rx_ring: RingBuffer::new(),
            tx_ring: RingBuffer::new(),
            flags: PortFlags::empty(),
            tx_expand: TxExpand::Idle,
            stats: SerialStats::new(),
            configured: false,
            _irq: PhantomData,
        }
    }

    /// Apply (`Some`) or tear down (`None`) the port configuration.
    ///
    /// Both directions' rings and any mid-expansion transmit state are
    /// reset on success and on deconfigure. A failed configure leaves
    /// the port in its prior state.
    pub fn configure(&mut self, config: Option<SerialConfig>) -> Result<(), SerialError> {
        let _guard = IrqGuard::<I>::new();

        match config {
            Some(cfg) => {
                self.hw.configure(Some(&cfg))?;
                self.reset_buffers();
                self.configured = true;
                debug!("serial: configured, {} baud", cfg.baud_rate);
            }
            None => {
                let result = self.hw.configure(None);
                self.reset_buffers();
                self.configured = false;
                debug!("serial: deconfigured");
                result?;
            }
        }

        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    /// Replace the behavior flags.
    pub fn set_flags(&mut self, flags: PortFlags) {
        self.flags = flags;
    }

    pub fn flags(&self) -> PortFlags {
        self.flags
    }

    /// Snapshot of the event counters, taken atomically with respect to
    /// the interrupt handlers.
    pub fn stats(&self) -> SerialStats {
        let _guard = IrqGuard::<I>::new();
        self.stats
    }

    /// Drain buffered receive data into `dest`.
    ///
    /// Never blocks: an empty RX ring is a normal condition reported as
    /// [`SerialError::WouldBlock`]. Interrupts are masked only for the
    /// duration of the copy so a receive interrupt cannot race the
    /// drain.
    pub fn read(&mut self, dest: &mut [u8]) -> Result<usize, SerialError> {
        if !self.configured {
            return Err(SerialError::Unconfigured);
        }

        let _guard = IrqGuard::<I>::new();
        let count = self.rx_ring.pop_into(dest);
        if count == 0 && !dest.is_empty() {
            return Err(SerialError::WouldBlock);
        }
        Ok(count)
    }

    /// Transmit `bytes`, expanding LF to CR LF when
    /// [`PortFlags::TRANSLATE_ONLCR`] is set.
    ///
    /// Returns the number of *source* bytes consumed; synthesized
    /// carriage returns are not counted. Without
    /// [`PortFlags::NONBLOCK_WRITE`] the call blocks (interrupts
    /// restored while waiting) only while nothing has been consumed
    /// yet; once any byte is in, buffer-full ends the call with a
    /// partial count. [`SerialError::WouldBlock`] is returned only when
    /// zero bytes could be consumed.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, SerialError> {
        if !self.configured {
            return Err(SerialError::Unconfigured);
        }

        let nonblock = self.flags.contains(PortFlags::NONBLOCK_WRITE);
        let mut consumed = 0usize;

        // Finish an expansion owed from an earlier call before taking
        // new input. Those bytes were already accounted to that call.
        while self.tx_expand != TxExpand::Idle {
            let (byte, next) = match self.tx_expand {
                TxExpand::PendingCr => (b'\r', TxExpand::PendingLf),
                TxExpand::PendingLf => (b'\n', TxExpand::Idle),
                TxExpand::Idle => break,
            };
            if !self.emit(byte, !nonblock && consumed == 0) {
                return Err(SerialError::WouldBlock);
            }
            self.tx_expand = next;
        }

        for &byte in bytes {
            if self.flags.contains(PortFlags::TRANSLATE_ONLCR) && byte == b'\n' {
                if !self.emit(b'\r', !nonblock && consumed == 0) {
                    if consumed == 0 {
                        return Err(SerialError::WouldBlock);
                    }
                    // Commit the line feed: both expansion bytes are
                    // owed from state, so the caller must not resend.
                    self.tx_expand = TxExpand::PendingCr;
                    return Ok(consumed + 1);
                }
                if !self.emit(b'\n', !nonblock && consumed == 0) {
                    self.tx_expand = TxExpand::PendingLf;
                    return Ok(consumed + 1);
                }
                self.tx_expand = TxExpand::Idle;
                consumed += 1;
            } else {
                if !self.emit(byte, !nonblock && consumed == 0) {
                    return if consumed == 0 {
                        Err(SerialError::WouldBlock)
                    } else {
                        Ok(consumed)
                    };
                }
                consumed += 1;
            }
        }

        Ok(consumed)
    }

    /// Outstanding work in both layers and directions.
    ///
    /// Hardware and software state are sampled under one critical
    /// section so the bits are mutually consistent.
    pub fn pending_state(&self) -> Result<Pending, SerialError> {
        if !self.configured {
            return Err(SerialError::Unconfigured);
        }

        let _guard = IrqGuard::<I>::new();
        Ok(self.pending_locked())
    }

    /// Busy-wait until no work is pending in the masked directions.
    ///
    /// Spins with interrupts restored between samples so the handlers
    /// can make progress; unbounded if the line never drains. Callers
    /// own any timeout policy. Used before clock-gating the peripheral
    /// for low-power states.
    pub fn flush(&mut self, directions: Pending) -> Result<(), SerialError> {
        if !self.configured {
            return Err(SerialError::Unconfigured);
        }

        loop {
            {
                let _guard = IrqGuard::<I>::new();
                if !self.pending_locked().intersects(directions) {
                    return Ok(());
                }
                if directions.intersects(Pending::TX) {
                    self.service_tx();
                }
            }
            core::hint::spin_loop();
        }
    }

    /// Receive-side interrupt service routine.
    ///
    /// Drains the hardware FIFO completely: corrupt units (frame or
    /// parity error) are counted and discarded, everything else goes to
    /// the RX ring with newest-wins overflow. The receive interrupt
    /// itself stays armed for the configured lifetime of the port.
    pub fn handle_rx_irq(&mut self) {
        while let Some((byte, status)) = self.hw.try_receive() {
            // An errored unit still counts as received.
            self.stats.rx_bytes = self.stats.rx_bytes.wrapping_add(1);

            if status.contains(LineStatus::FRAME) {
                self.stats.frame_errors = self.stats.frame_errors.wrapping_add(1);
            }
            if status.contains(LineStatus::PARITY) {
                self.stats.parity_errors = self.stats.parity_errors.wrapping_add(1);
            }
            if status.contains(LineStatus::BREAK) {
                self.stats.breaks = self.stats.breaks.wrapping_add(1);
            }
            if status.contains(LineStatus::OVERRUN) {
                self.stats.overruns = self.stats.overruns.wrapping_add(1);
            }

            if status.intersects(LineStatus::FRAME | LineStatus::PARITY) {
                // Corrupt byte: counted, never delivered.
                continue;
            }

            if self.rx_ring.push(byte) == Push::Overwrote {
                self.stats.rx_dropped = self.stats.rx_dropped.wrapping_add(1);
            }
        }
    }

    /// Transmit-side interrupt service routine.
    ///
    /// Moves bytes from the TX ring to the hardware until one side runs
    /// out. When the ring empties the transmit-ready interrupt is
    /// disarmed, maintaining "armed iff the TX ring is non-empty".
    pub fn handle_tx_irq(&mut self) {
        while let Some(byte) = self.tx_ring.peek() {
            if self.hw.try_transmit(byte).is_err() {
                // Hardware full again; the interrupt stays armed and
                // refires when there is room.
                return;
            }
            self.tx_ring.pop(false);
            self.stats.tx_bytes = self.stats.tx_bytes.wrapping_add(1);
        }
        self.hw.set_tx_interrupt(false);
    }

    /// Combined handler for peripherals with a single interrupt line.
    pub fn handle_irq(&mut self) {
        self.handle_rx_irq();
        if !self.tx_ring.is_empty() {
            self.handle_tx_irq();
        }
    }

    fn reset_buffers(&mut self) {
        self.rx_ring.reset();
        self.tx_ring.reset();
        self.tx_expand = TxExpand::Idle;
    }

    /// Pending bits; caller holds the critical section.
    fn pending_locked(&self) -> Pending {
        let mut pending = self.hw.pending();
        if !self.rx_ring.is_empty() {
            pending |= Pending::SW_RX;
        }
        if !self.tx_ring.is_empty() {
            pending |= Pending::SW_TX;
        }
        pending
    }

    /// Enqueue one outgoing byte.
    ///
    /// With `may_block` the call retries until the byte is placed,
    /// re-enabling interrupts between attempts so the transmit handler
    /// can drain the ring; while waiting it also moves one buffered
    /// byte toward the hardware itself, which keeps the wait live even
    /// before the first transmit interrupt fires. Returns `false` only
    /// when `may_block` is unset and there was no room.
    fn emit(&mut self, byte: u8, may_block: bool) -> bool {
        loop {
            {
                let _guard = IrqGuard::<I>::new();
                if self.tx_offer(byte) {
                    return true;
                }
                if !may_block {
                    return false;
                }
                self.service_tx();
            }
            // Guard dropped: caller's interrupt state restored for the
            // duration of the wait.
            core::hint::spin_loop();
        }
    }

    /// One placement attempt; caller holds the critical section.
    fn tx_offer(&mut self, byte: u8) -> bool {
        if self.tx_ring.is_empty() {
            // Fast path: hardware has room and nothing is queued ahead
            // of this byte, so skip buffering and interrupt traffic.
            if self.hw.try_transmit(byte).is_ok() {
                self.stats.tx_bytes = self.stats.tx_bytes.wrapping_add(1);
                return true;
            }
        }

        // The TX ring never overwrites: full means the caller waits or
        // gives up. Newest-wins is an RX-only policy.
        if self.tx_ring.is_full() {
            return false;
        }

        if self.tx_ring.push(byte) == Push::WasEmpty {
            // Empty -> non-empty under the same critical section as the
            // arm decision, so the handler cannot disarm in between.
            self.hw.set_tx_interrupt(true);
        }
        true
    }

    /// Move at most one buffered byte to the hardware; caller holds the
    /// critical section. Mirrors one step of [`Self::handle_tx_irq`].
    fn service_tx(&mut self) {
        if let Some(byte) = self.tx_ring.peek() {
            if self.hw.try_transmit(byte).is_ok() {
                self.tx_ring.pop(false);
                self.stats.tx_bytes = self.stats.tx_bytes.wrapping_add(1);
                if self.tx_ring.is_empty() {
                    self.hw.set_tx_interrupt(false);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::serial::Parity;
    use common::sync::NullIrq;
    use std::collections::VecDeque;

    /// Scripted backend: transmit refusals are programmable, received
    /// units come from a queue.
    struct StubHw {
        sent: Vec<u8>,
        rx_fifo: VecDeque<(u8, LineStatus)>,
        refuse_tx: usize,
        refuse_tx_forever: bool,
        tx_attempts: usize,
        tx_irq_armed: bool,
        configured: bool,
    }

    impl StubHw {
        fn new() -> Self {
            Self {
                sent: Vec::new(),
                rx_fifo: VecDeque::new(),
                refuse_tx: 0,
                refuse_tx_forever: false,
                tx_attempts: 0,
                tx_irq_armed: false,
                configured: false,
            }
        }
    }

    impl SerialHw for StubHw {
        fn configure(&mut self, config: Option<&SerialConfig>) -> Result<(), SerialError> {
            match config {
                Some(cfg) => {
                    if !cfg.is_8n1() || cfg.baud_rate == 0 {
                        return Err(SerialError::InvalidConfig);
                    }
                    self.configured = true;
                }
                None => {
                    self.configured = false;
                    self.tx_irq_armed = false;
                }
            }
            Ok(())
        }

        fn try_transmit(&mut self, byte: u8) -> Result<(), SerialError> {
            self.tx_attempts += 1;
            if self.refuse_tx_forever {
                return Err(SerialError::WouldBlock);
            }
            if self.refuse_tx > 0 {
                self.refuse_tx -= 1;
                return Err(SerialError::WouldBlock);
            }
            self.sent.push(byte);
            Ok(())
        }

        fn set_tx_interrupt(&mut self, enabled: bool) {
            self.tx_irq_armed = enabled;
        }

        fn pending(&self) -> Pending {
            // The stub shifter is instantaneous, so HW_TX never lingers.
            if self.rx_fifo.is_empty() {
                Pending::empty()
            } else {
                Pending::HW_RX
            }
        }

        fn try_receive(&mut self) -> Option<(u8, LineStatus)> {
            self.rx_fifo.pop_front()
        }
    }

    type TestPort = SerialPort<StubHw, NullIrq, 16, 8>;

    fn configured_port() -> TestPort {
        let mut port = TestPort::new(StubHw::new());
        port.configure(Some(SerialConfig::default())).unwrap();
        port
    }

    #[test]
    fn unconfigured_port_rejects_io() {
        let mut port = TestPort::new(StubHw::new());
        assert_eq!(port.read(&mut [0u8; 4]), Err(SerialError::Unconfigured));
        assert_eq!(port.write(b"x"), Err(SerialError::Unconfigured));
        assert_eq!(port.pending_state(), Err(SerialError::Unconfigured));
        assert_eq!(port.flush(Pending::all()), Err(SerialError::Unconfigured));
    }

    #[test]
    fn configure_rejects_non_8n1() {
        let mut port = TestPort::new(StubHw::new());
        let mut cfg = SerialConfig::default();
        cfg.parity = Parity::Even;
        assert_eq!(port.configure(Some(cfg)), Err(SerialError::InvalidConfig));
        assert!(!port.is_configured());
    }

    #[test]
    fn fast_path_skips_buffering_and_interrupts() {
        let mut port = configured_port();
        let data = [0x41u8, 0x42, 0x43];
        assert_eq!(port.write(&data), Ok(3));
        assert_eq!(port.hw.sent, data);
        assert!(!port.hw.tx_irq_armed);
        assert_eq!(port.pending_state(), Ok(Pending::empty()));
    }

    #[test]
    fn onlcr_expands_lf_to_crlf() {
        let mut port = configured_port();
        port.set_flags(PortFlags::TRANSLATE_ONLCR);
        assert_eq!(port.write(&[0x41, 0x0A]), Ok(2));
        assert_eq!(port.hw.sent, [0x41, 0x0D, 0x0A]);
    }

    #[test]
    fn onlcr_round_trip_through_loopback() {
        let mut port = configured_port();
        port.set_flags(PortFlags::TRANSLATE_ONLCR);
        assert_eq!(port.write(&[0x41, 0x0A]), Ok(2));

        // Wire TX back to RX.
        let echoed: Vec<u8> = port.hw.sent.clone();
        for byte in echoed {
            port.hw.rx_fifo.push_back((byte, LineStatus::empty()));
        }
        port.handle_rx_irq();

        let mut dest = [0u8; 8];
        let n = port.read(&mut dest).unwrap();
        assert_eq!(&dest[..n], &[0x41, 0x0D, 0x0A]);
    }

    #[test]
    fn lf_passes_through_without_translation() {
        let mut port = configured_port();
        assert_eq!(port.write(&[0x41, 0x0A]), Ok(2));
        assert_eq!(port.hw.sent, [0x41, 0x0A]);
    }

    #[test]
    fn nonblocking_write_under_backpressure_consumes_at_most_ring() {
        let mut port = configured_port();
        port.set_flags(PortFlags::NONBLOCK_WRITE);
        port.hw.refuse_tx_forever = true;

        let data = [0x55u8; 20];
        // TX ring capacity 8 -> 7 usable slots.
        assert_eq!(port.write(&data), Ok(7));
        assert!(port.hw.tx_irq_armed);
        // Only the initial fast-path probe touched the hardware; the
        // call must not have spun on it.
        assert_eq!(port.hw.tx_attempts, 1);

        assert_eq!(port.write(&data), Err(SerialError::WouldBlock));
    }

    #[test]
    fn blocking_write_completes_as_handler_drains() {
        let mut port = configured_port();
        // Refuse long enough that the ring is still full when the
        // second call starts, forcing it through the blocking wait.
        port.hw.refuse_tx = 12;

        let data: Vec<u8> = (0..20u8).collect();
        let mut total = 0usize;
        for _ in 0..1000 {
            if total == data.len() {
                break;
            }
            match port.write(&data[total..]) {
                Ok(n) => total += n,
                Err(SerialError::WouldBlock) => {}
                Err(e) => panic!("unexpected error: {e:?}"),
            }
            // Simulated transmit interrupt.
            port.handle_tx_irq();
        }
        assert_eq!(total, 20);

        port.handle_tx_irq();
        assert_eq!(port.hw.sent, data);
        assert!(!port.hw.tx_irq_armed);
    }

    #[test]
    fn tx_irq_disarms_when_ring_empties() {
        let mut port = configured_port();
        port.hw.refuse_tx_forever = true;
        port.set_flags(PortFlags::NONBLOCK_WRITE);
        port.write(&[1, 2, 3]).unwrap();
        assert!(port.hw.tx_irq_armed);

        port.hw.refuse_tx_forever = false;
        port.handle_tx_irq();
        assert_eq!(port.hw.sent, [1, 2, 3]);
        assert!(!port.hw.tx_irq_armed);
        assert_eq!(port.stats().tx_bytes, 3);
    }

    #[test]
    fn frame_error_counted_received_but_not_delivered() {
        let mut port = configured_port();
        port.hw.rx_fifo.push_back((b'x', LineStatus::FRAME));
        port.hw.rx_fifo.push_back((b'y', LineStatus::empty()));
        port.handle_rx_irq();

        let stats = port.stats();
        assert_eq!(stats.frame_errors, 1);
        assert_eq!(stats.rx_bytes, 2);

        let mut dest = [0u8; 4];
        let n = port.read(&mut dest).unwrap();
        assert_eq!(&dest[..n], b"y");
    }

    #[test]
    fn overrun_and_break_recorded_byte_still_delivered() {
        let mut port = configured_port();
        port.hw
            .rx_fifo
            .push_back((b'z', LineStatus::OVERRUN | LineStatus::BREAK));
        port.handle_rx_irq();

        let stats = port.stats();
        assert_eq!(stats.overruns, 1);
        assert_eq!(stats.breaks, 1);
        assert_eq!(stats.frame_errors, 0);

        let mut dest = [0u8; 4];
        assert_eq!(port.read(&mut dest), Ok(1));
        assert_eq!(dest[0], b'z');
    }

    #[test]
    fn rx_overflow_drops_oldest_and_counts() {
        let mut port = configured_port();
        // RX ring capacity 16 -> 15 usable.
        for byte in 0..20u8 {
            port.hw.rx_fifo.push_back((byte, LineStatus::empty()));
        }
        port.handle_rx_irq();

        let stats = port.stats();
        assert_eq!(stats.rx_bytes, 20);
        assert_eq!(stats.rx_dropped, 5);

        let mut dest = [0u8; 32];
        let n = port.read(&mut dest).unwrap();
        let expected: Vec<u8> = (5..20u8).collect();
        assert_eq!(&dest[..n], &expected[..]);
    }

    #[test]
    fn read_on_empty_ring_would_block() {
        let mut port = configured_port();
        assert_eq!(port.read(&mut [0u8; 4]), Err(SerialError::WouldBlock));
        // Zero-length destination is trivially satisfied.
        assert_eq!(port.read(&mut []), Ok(0));
    }

    #[test]
    fn flush_drains_all_pending_work() {
        let mut port = configured_port();
        port.hw.refuse_tx = 3;
        assert_eq!(port.write(&[1, 2, 3, 4]), Ok(4));
        assert_eq!(
            port.pending_state(),
            Ok(Pending::SW_TX),
            "bytes should be queued behind the refusing hardware"
        );

        port.flush(Pending::all()).unwrap();
        assert_eq!(port.pending_state(), Ok(Pending::empty()));
        assert_eq!(port.hw.sent, [1, 2, 3, 4]);
    }

    #[test]
    fn expansion_resumes_across_calls_without_duplication() {
        let mut port: SerialPort<StubHw, NullIrq, 16, 4> = SerialPort::new(StubHw::new());
        port.configure(Some(SerialConfig::default())).unwrap();
        port.set_flags(PortFlags::TRANSLATE_ONLCR | PortFlags::NONBLOCK_WRITE);
        port.hw.refuse_tx_forever = true;

        // Fill two of the three usable TX slots.
        assert_eq!(port.write(b"ab"), Ok(2));
        // The CR fits, the LF does not: the line feed is committed and
        // owed from state.
        assert_eq!(port.write(b"\n"), Ok(1));

        port.hw.refuse_tx_forever = false;
        port.handle_tx_irq();
        assert_eq!(port.hw.sent, b"ab\r");

        // Next write finishes the expansion before new input.
        assert_eq!(port.write(b"x"), Ok(1));
        assert_eq!(port.hw.sent, b"ab\r\nx");
    }

    #[test]
    fn deconfigure_discards_buffered_data() {
        let mut port = configured_port();
        port.hw.refuse_tx_forever = true;
        port.set_flags(PortFlags::NONBLOCK_WRITE);
        port.write(&[9, 9, 9]).unwrap();
        port.hw.rx_fifo.push_back((7, LineStatus::empty()));
        port.handle_rx_irq();

        port.configure(None).unwrap();
        assert!(!port.is_configured());
        assert!(!port.hw.configured);

        port.hw.refuse_tx_forever = false;
        port.configure(Some(SerialConfig::default())).unwrap();
        assert_eq!(port.pending_state(), Ok(Pending::empty()));
        assert_eq!(port.read(&mut [0u8; 4]), Err(SerialError::WouldBlock));
    }

    #[test]
    fn stats_survive_reconfigure() {
        let mut port = configured_port();
        port.hw.rx_fifo.push_back((b'q', LineStatus::FRAME));
        port.handle_rx_irq();
        port.configure(Some(SerialConfig::default())).unwrap();
        assert_eq!(port.stats().frame_errors, 1);
    }
}
