//! Idle power handling.
//!
//! While the engine is idle the processor is parked in a wait state that
//! any interrupt ends. The timer is disarmed while idle, so in practice only
//! a button edge wakes the device. There is no idle timeout.

/// Low-power wait primitive of the target.
///
/// Typical implementations execute `sleep` (AVR/PIC) or `wfi` (Cortex-M).
pub trait WaitForInterrupt {
    /// Blocks until an interrupt is pending.
    fn wait_for_interrupt(&mut self);
}

/// A busy-waiting stand-in for targets (or hosts) without a sleep
/// instruction.
#[derive(Debug, Default, Clone, Copy)]
pub struct SpinWait;

impl WaitForInterrupt for SpinWait {
    fn wait_for_interrupt(&mut self) {
        core::hint::spin_loop();
    }
}

/// Parks the processor once if `transmitting` is `false`.
///
/// Returns whether the processor was parked.
pub fn park_if_idle<P: WaitForInterrupt>(power: &mut P, transmitting: bool) -> bool {
    if transmitting {
        return false;
    }
    power.wait_for_interrupt();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct CountingWait {
        waits: u32,
    }

    impl WaitForInterrupt for CountingWait {
        fn wait_for_interrupt(&mut self) {
            self.waits += 1;
        }
    }

    #[test]
    fn test_parks_only_when_idle() {
        let mut power = CountingWait::default();
        assert!(park_if_idle(&mut power, false));
        assert!(!park_if_idle(&mut power, true));
        assert!(park_if_idle(&mut power, false));
        assert_eq!(power.waits, 2);

        assert!(park_if_idle(&mut SpinWait, false));
    }
}
