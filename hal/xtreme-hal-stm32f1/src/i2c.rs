//! I2C1 slave for the host bus
//!
//! embassy-stm32 only drives I2C as a master, so the slave side is run at
//! register level. The peripheral stretches the clock until each event is
//! serviced, which is what lets a plain interrupt handler keep up with the
//! host: [`I2cSlave::service`] is called from `I2C1_EV`,
//! [`I2cSlave::clear_faults`] from `I2C1_ER`.

use embassy_stm32::gpio::{AfType, Flex, OutputType, Speed};
use embassy_stm32::i2c::{SclPin, SdaPin};
use embassy_stm32::interrupt::{self, InterruptExt};
use embassy_stm32::pac::i2c::I2c as Regs;
use embassy_stm32::peripherals::I2C1;
use embassy_stm32::{pac, rcc, Peri};

pub use xtreme_hal::i2c::{BusFault, SlaveEvent};

/// Register-level I2C1 slave
pub struct I2cSlave<'d> {
    regs: Regs,
    _pins: [Flex<'d>; 2],
}

impl<'d> I2cSlave<'d> {
    /// Configure I2C1 to answer at the 7-bit `address`
    ///
    /// `pclk1_mhz` is the APB1 clock the peripheral runs from. Interrupts are
    /// left disabled; call [`enable_interrupts`](Self::enable_interrupts)
    /// once the handlers can reach this slave.
    pub fn new(
        _peri: Peri<'d, I2C1>,
        scl: Peri<'d, impl SclPin<I2C1>>,
        sda: Peri<'d, impl SdaPin<I2C1>>,
        address: u8,
        pclk1_mhz: u8,
    ) -> Self {
        let scl_af = scl.af_num();
        let sda_af = sda.af_num();
        let pins = [
            open_drain(scl_af, Flex::new(scl)),
            open_drain(sda_af, Flex::new(sda)),
        ];

        rcc::enable_and_reset::<I2C1>();

        let regs = pac::I2C1;
        regs.cr2().write(|w| {
            w.set_freq(pclk1_mhz);
            w.set_itevten(true);
            w.set_iterren(true);
            w.set_itbufen(true);
        });
        regs.oar1().write(|w| w.set_add(u16::from(address & 0x7f) << 1));
        regs.cr1().write(|w| {
            w.set_ack(true);
            w.set_pe(true);
        });

        Self { regs, _pins: pins }
    }

    /// Unmask the event and error interrupts
    pub fn enable_interrupts(&self) {
        for irq in [interrupt::I2C1_EV, interrupt::I2C1_ER] {
            irq.unpend();
            // SAFETY: handlers for both lines are installed by the firmware
            unsafe { irq.enable() };
        }
    }

    /// Service pending events
    ///
    /// `handler` sees every event in bus order. For
    /// [`SlaveEvent::ByteRequested`] its return value is transmitted, 0 if
    /// it returns `None`.
    pub fn service(&mut self, mut handler: impl FnMut(SlaveEvent) -> Option<u8>) {
        let sr1 = self.regs.sr1().read();

        if sr1.addr() {
            // Reading SR2 after SR1 clears ADDR
            let sr2 = self.regs.sr2().read();
            handler(SlaveEvent::AddressMatched { read: sr2.tra() });
        }
        if sr1.stopf() {
            // Writing CR1 after SR1 clears STOPF
            self.regs.cr1().write(|w| {
                w.set_ack(true);
                w.set_pe(true);
            });
            handler(SlaveEvent::Stop);
        }
        if sr1.rxne() {
            let byte = self.regs.dr().read().dr();
            handler(SlaveEvent::ByteReceived(byte));
        }
        if sr1.txe() {
            let byte = handler(SlaveEvent::ByteRequested).unwrap_or(0);
            self.regs.dr().write(|w| w.set_dr(byte));
        }
    }

    /// Clear error flags, returning the most significant one seen
    ///
    /// The peripheral recovers from every slave-side error by itself; the
    /// flags only need clearing to release the interrupt line.
    pub fn clear_faults(&mut self) -> Option<BusFault> {
        let sr1 = self.regs.sr1().read();
        let fault = if sr1.berr() {
            Some(BusFault::Bus)
        } else if sr1.arlo() {
            Some(BusFault::ArbitrationLost)
        } else if sr1.ovr() {
            Some(BusFault::Overrun)
        } else if sr1.af() {
            Some(BusFault::AcknowledgeFailure)
        } else {
            None
        };

        self.regs.sr1().modify(|w| {
            w.set_berr(false);
            w.set_arlo(false);
            w.set_af(false);
            w.set_ovr(false);
            w.set_pecerr(false);
            w.set_timeout(false);
        });
        fault
    }
}

fn open_drain(af_num: u8, mut pin: Flex<'_>) -> Flex<'_> {
    pin.set_as_af_unchecked(af_num, AfType::output(OutputType::OpenDrain, Speed::Low));
    pin
}
