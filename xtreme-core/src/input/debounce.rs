//! Button press and auto-repeat
//!
//! Left and right repeat while held: the first press is accepted at once,
//! the first repeat needs the button held for longer than
//! `first_repeat_ms` since that press, and every further repeat longer than
//! `repeat_ms` since the previous one. Confirm fires once per press.
//!
//! Timestamps are milliseconds from any monotonic clock.

use super::buttons::Buttons;

/// Repeat timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DebounceConfig {
    /// Hold time before the first repeat
    pub first_repeat_ms: u64,
    /// Interval between further repeats
    pub repeat_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            first_repeat_ms: 500,
            repeat_ms: 100,
        }
    }
}

/// Per-button repeat state
#[derive(Debug, Clone, Copy, Default)]
struct RepeatTimer {
    repeats: u32,
    last_accepted_ms: u64,
}

/// Turns sampled button levels into accepted presses
#[derive(Debug, Clone)]
pub struct ButtonDebouncer {
    config: DebounceConfig,
    previous: Buttons,
    left: RepeatTimer,
    right: RepeatTimer,
}

impl ButtonDebouncer {
    pub fn new(config: DebounceConfig) -> Self {
        Self {
            config,
            previous: Buttons::NONE,
            left: RepeatTimer::default(),
            right: RepeatTimer::default(),
        }
    }

    /// Feed the current raw levels, get the presses accepted now
    pub fn update(&mut self, raw: Buttons, now_ms: u64) -> Buttons {
        let mut accepted = raw;

        if self.previous.contains(Buttons::CONFIRM) {
            accepted.set(Buttons::CONFIRM, false);
        }

        let config = self.config;
        for (button, timer) in [
            (Buttons::LEFT, &mut self.left),
            (Buttons::RIGHT, &mut self.right),
        ] {
            if self.previous.contains(button) {
                if raw.contains(button) {
                    let delay = if timer.repeats > 0 {
                        config.repeat_ms
                    } else {
                        config.first_repeat_ms
                    };
                    if now_ms.saturating_sub(timer.last_accepted_ms) > delay {
                        timer.repeats += 1;
                    } else {
                        accepted.set(button, false);
                    }
                } else {
                    timer.repeats = 0;
                }
            }
            if accepted.contains(button) {
                timer.last_accepted_ms = now_ms;
            }
        }

        self.previous = raw;
        accepted
    }
}

impl Default for ButtonDebouncer {
    fn default() -> Self {
        Self::new(DebounceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Hold `button` from `start` for `duration` ms in `tick` steps, returning accept times
    fn hold(
        deb: &mut ButtonDebouncer,
        button: Buttons,
        start: u64,
        duration: u64,
        tick: u64,
    ) -> Vec<u64> {
        let mut accepted = Vec::new();
        let mut now = start;
        while now < start + duration {
            if deb.update(button, now).contains(button) {
                accepted.push(now);
            }
            now += tick;
        }
        accepted
    }

    #[test]
    fn test_press_then_repeats() {
        let mut deb = ButtonDebouncer::default();
        let times = hold(&mut deb, Buttons::RIGHT, 0, 1000, 10);
        assert_eq!(times[0], 0);
        assert_eq!(times[1], 510);
        assert_eq!(times[2], 620);
        assert_eq!(times[3], 730);
    }

    #[test]
    fn test_confirm_is_edge_triggered() {
        let mut deb = ButtonDebouncer::default();
        let times = hold(&mut deb, Buttons::CONFIRM, 0, 2000, 10);
        assert_eq!(times, vec![0]);
        assert!(deb.update(Buttons::NONE, 2000).is_empty());
        assert!(deb.update(Buttons::CONFIRM, 2010).contains(Buttons::CONFIRM));
    }

    #[test]
    fn test_buttons_repeat_independently() {
        let mut deb = ButtonDebouncer::default();
        assert!(deb.update(Buttons::LEFT, 0).contains(Buttons::LEFT));
        let both = Buttons::LEFT | Buttons::RIGHT;
        let got = deb.update(both, 200);
        assert!(got.contains(Buttons::RIGHT));
        assert!(!got.contains(Buttons::LEFT));
        let got = deb.update(both, 510);
        assert!(got.contains(Buttons::LEFT));
        assert!(!got.contains(Buttons::RIGHT));
    }

    #[test]
    fn test_release_restarts_sequence() {
        let mut deb = ButtonDebouncer::default();
        hold(&mut deb, Buttons::LEFT, 0, 900, 10);
        assert!(deb.update(Buttons::NONE, 900).is_empty());
        let times = hold(&mut deb, Buttons::LEFT, 910, 700, 10);
        assert_eq!(times[0], 910);
        assert_eq!(times[1], 1420);
    }

    proptest! {
        #[test]
        fn prop_first_repeat_gap_longer(
            tick in 1u64..50,
            first in 100u64..800,
            repeat in 20u64..99,
            gap in 1u64..2000,
        ) {
            let config = DebounceConfig { first_repeat_ms: first, repeat_ms: repeat };
            let mut deb = ButtonDebouncer::new(config);
            let duration = first + 6 * repeat + 10 * tick;

            for round in 0..2 {
                let start = round * (duration + gap);
                let times = hold(&mut deb, Buttons::LEFT, start, duration, tick);
                deb.update(Buttons::NONE, start + duration);

                prop_assert_eq!(times[0], start);
                prop_assert!(times.len() >= 3);
                let first_gap = times[1] - times[0];
                prop_assert!(first_gap > first);
                for pair in times[1..].windows(2) {
                    let later_gap = pair[1] - pair[0];
                    prop_assert!(later_gap > repeat);
                    prop_assert!(first_gap > later_gap);
                }
            }
        }
    }
}
