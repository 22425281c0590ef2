//! Host bus interrupt wiring
//!
//! The I2C slave and the producer half of the rings live in a static that
//! only the two I2C1 interrupt handlers touch after [`install`]. The main
//! loop never locks it.

use core::cell::RefCell;

use defmt::*;
use embassy_stm32::interrupt;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use xtreme_hal_stm32f1::i2c::I2cSlave;
use xtreme_protocol::{BusLink, BOUNDARY_RING_SIZE, DATA_RING_SIZE};

/// Interrupt half of the bus rings
pub type Link = BusLink<'static, DATA_RING_SIZE, BOUNDARY_RING_SIZE>;

struct HostBus {
    slave: I2cSlave<'static>,
    link: Link,
}

static HOST_BUS: Mutex<CriticalSectionRawMutex, RefCell<Option<HostBus>>> =
    Mutex::new(RefCell::new(None));

/// Hand the slave and the link to the interrupt handlers and unmask them
pub fn install(slave: I2cSlave<'static>, link: Link) {
    HOST_BUS.lock(|bus| {
        slave.enable_interrupts();
        *bus.borrow_mut() = Some(HostBus { slave, link });
    });
    debug!("Host bus interrupts enabled");
}

#[interrupt]
fn I2C1_EV() {
    HOST_BUS.lock(|bus| {
        if let Some(HostBus { slave, link }) = bus.borrow_mut().as_mut() {
            slave.service(|event| link.on_event(event));
        }
    });
}

#[interrupt]
fn I2C1_ER() {
    HOST_BUS.lock(|bus| {
        if let Some(HostBus { slave, .. }) = bus.borrow_mut().as_mut() {
            if let Some(fault) = slave.clear_faults() {
                trace!("Host bus fault: {:?}", fault);
            }
        }
    });
}
