//! GPIO pin abstractions
//!
//! Provides traits for digital input and output pins plus the jumper probe
//! used at boot to read configuration straps.

/// Digital output pin
pub trait OutputPin {
    /// Set the pin high (logic 1)
    fn set_high(&mut self);

    /// Set the pin low (logic 0)
    fn set_low(&mut self);

    /// Set the pin to a specific state
    fn set_state(&mut self, high: bool) {
        if high {
            self.set_high();
        } else {
            self.set_low();
        }
    }
}

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Detect a jumper between two pins
///
/// `drive` is toggled while `sense` (an input with pull-up) is watched. The
/// jumper is present only if `sense` follows `drive` both low and high,
/// which rules out a sense pin that is merely stuck. `settle` is called
/// after every drive change to give the line time to follow.
pub fn pins_connected<O, I, S>(drive: &mut O, sense: &I, mut settle: S) -> bool
where
    O: OutputPin,
    I: InputPin,
    S: FnMut(),
{
    drive.set_low();
    settle();
    let follows_low = sense.is_low();

    drive.set_high();
    settle();
    let follows_high = sense.is_high();

    follows_low && follows_high
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    struct Line<'a>(&'a Cell<bool>);

    impl OutputPin for Line<'_> {
        fn set_high(&mut self) {
            self.0.set(true);
        }
        fn set_low(&mut self) {
            self.0.set(false);
        }
    }

    struct Sense<'a> {
        line: Option<&'a Cell<bool>>,
    }

    impl InputPin for Sense<'_> {
        fn is_high(&self) -> bool {
            // Pulled up when nothing drives it
            self.line.map(Cell::get).unwrap_or(true)
        }
    }

    #[test]
    fn test_jumper_detected() {
        let wire = Cell::new(true);
        let mut drive = Line(&wire);
        let sense = Sense { line: Some(&wire) };
        assert!(pins_connected(&mut drive, &sense, || {}));
    }

    #[test]
    fn test_open_jumper() {
        let wire = Cell::new(true);
        let mut drive = Line(&wire);
        let sense = Sense { line: None };
        assert!(!pins_connected(&mut drive, &sense, || {}));
    }

    #[test]
    fn test_stuck_low_sense_is_not_a_jumper() {
        struct Grounded;
        impl InputPin for Grounded {
            fn is_high(&self) -> bool {
                false
            }
        }
        let wire = Cell::new(true);
        let mut drive = Line(&wire);
        assert!(!pins_connected(&mut drive, &Grounded, || {}));
    }
}
