use super::{CountdownTimer, Interval, ReloadPair};

/// Register-level access to a 16-bit overflow timer whose counter is exposed
/// as two 8-bit registers.
///
/// Implement this for the target's timer peripheral. The counter counts up
/// and raises its overflow interrupt when it wraps past `0xFFFF`.
pub trait ReloadRegisters {
    /// Stops the counter.
    fn stop(&mut self);
    /// Writes the low half of the counter.
    fn write_low(&mut self, value: u8);
    /// Writes the high half of the counter.
    fn write_high(&mut self, value: u8);
    /// Starts the counter.
    fn start(&mut self);
}

/// A [`CountdownTimer`] over a 16-bit overflow timer.
///
/// The counter is stopped and both halves are written inside
/// `critical_section::with`, so an overflow can never be taken between the
/// two 8-bit writes.
#[derive(Debug)]
pub struct OverflowTimer<R: ReloadRegisters> {
    regs: R,
    reload: ReloadPair,
}

impl<R: ReloadRegisters> OverflowTimer<R> {
    /// Wraps the timer registers with the reload values to use.
    pub fn new(regs: R, reload: ReloadPair) -> Self {
        Self { regs, reload }
    }

    /// The configured reload values.
    pub fn reload(&self) -> ReloadPair {
        self.reload
    }

    /// Gives back the register block.
    pub fn free(self) -> R {
        self.regs
    }
}

impl<R: ReloadRegisters> CountdownTimer for OverflowTimer<R> {
    fn arm(&mut self, interval: Interval) {
        let [high, low] = self.reload.get(interval).to_be_bytes();
        critical_section::with(|_| {
            self.regs.stop();
            self.regs.write_low(low);
            self.regs.write_high(high);
            self.regs.start();
        });
    }

    fn disarm(&mut self) {
        critical_section::with(|_| self.regs.stop());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Op {
        Stop,
        Low(u8),
        High(u8),
        Start,
    }

    #[derive(Debug, Default)]
    struct Regs {
        ops: heapless::Vec<Op, 16>,
    }

    impl ReloadRegisters for Regs {
        fn stop(&mut self) {
            let _ = self.ops.push(Op::Stop);
        }
        fn write_low(&mut self, value: u8) {
            let _ = self.ops.push(Op::Low(value));
        }
        fn write_high(&mut self, value: u8) {
            let _ = self.ops.push(Op::High(value));
        }
        fn start(&mut self) {
            let _ = self.ops.push(Op::Start);
        }
    }

    #[test]
    fn test_arm_writes_reload_while_stopped() {
        let mut timer = OverflowTimer::new(Regs::default(), ReloadPair::REFERENCE);
        timer.arm(Interval::Short);
        timer.arm(Interval::Long);
        timer.disarm();
        let regs = timer.free();
        assert_eq!(
            &regs.ops[..],
            &[
                Op::Stop,
                Op::Low(0x6e),
                Op::High(0xff),
                Op::Start,
                Op::Stop,
                Op::Low(0x22),
                Op::High(0xff),
                Op::Start,
                Op::Stop,
            ]
        );
    }
}
