//! I2C slave event model
//!
//! The controller listens on the mainboard's I2C bus as a slave. Chip HALs
//! translate their status registers into [`SlaveEvent`]s so the bus link in
//! the protocol crate stays independent of register layouts.

/// A single event observed by the I2C slave peripheral
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveEvent {
    /// Our address matched; `read` is true when the master reads from us
    AddressMatched { read: bool },
    /// The master wrote a byte
    ByteReceived(u8),
    /// The master wants the next byte
    ByteRequested,
    /// Stop condition detected
    Stop,
}

/// Transient bus fault reported by the error interrupt
///
/// Faults are cleared where they are detected; the type exists so that
/// implementations can report what happened to a debug log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusFault {
    /// Misplaced start or stop condition
    Bus,
    /// Arbitration lost
    ArbitrationLost,
    /// Master did not acknowledge (normal end of a read)
    AcknowledgeFailure,
    /// Data register overrun or underrun
    Overrun,
}
