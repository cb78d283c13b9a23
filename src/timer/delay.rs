use crate::driver::Remote;
use crate::error::Result;
use crate::events::{Event, EventQueue};
use crate::input::ButtonMonitor;
use crate::store::CodeStore;
use crate::timer::SoftTimer;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};

/// Capacity of the edge queue used by the polled loop.
pub const POLL_QUEUE_LEN: usize = 4;

/// Runs one iteration of the polled loop.
///
/// Sleeps `poll_us`, advances the software timer, samples the button and
/// then handles whatever became pending, timer expiry first.
///
/// # Arguments
/// - `remote`: the transmitter, timed by a [`SoftTimer`]
/// - `button`: edge detector over the button pin
/// - `queue`: event queue carried between iterations
/// - `delay`: a delay provider implementing `DelayNs`, typically from the HAL
/// - `poll_us`: polling period; phases end on the first poll at or after
///   their deadline, and the lateness is taken off the next phase
///
/// # Returns
/// The number of events handled.
pub fn poll_remote<LED, RF, S, P, D>(
    remote: &mut Remote<LED, RF, S, SoftTimer>,
    button: &mut ButtonMonitor<P>,
    queue: &mut EventQueue<POLL_QUEUE_LEN>,
    delay: &mut D,
    poll_us: u32,
) -> Result<usize>
where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    P: InputPin,
    D: DelayNs,
{
    delay.delay_us(poll_us);
    if remote.timer_mut().advance(poll_us) {
        queue.post(Event::TimerExpired)?;
    }
    if let Some(edge) = button.sample()? {
        queue.post(edge)?;
    }
    remote.dispatch(queue)
}

/// Runs a blocking loop that polls the button and drives the remote's
/// software timer.
///
/// This is a timing loop for targets where the button and timer interrupts
/// are unavailable or undesired. Timing accuracy is bounded by `poll_us`
/// plus the loop overhead.
///
/// # Example
/// ```rust,ignore
/// use megacode::timer::{SoftTimer, TimerTuning, run_remote_loop};
/// let mut remote = Remote::new(led, rf, SliceStore::new(&EEPROM), SoftTimer::new(TimerTuning::REFERENCE));
/// if remote.power_on().is_ok() {
///     run_remote_loop(&mut remote, &mut ButtonMonitor::new(button), &mut delay, 50);
/// }
/// ```
///
/// # Notes
/// - This loop never returns; it is intended for single-purpose firmware.
/// - Errors are logged and the loop keeps going. A full queue drops the edge.
pub fn run_remote_loop<LED, RF, S, P, D>(
    remote: &mut Remote<LED, RF, S, SoftTimer>,
    button: &mut ButtonMonitor<P>,
    delay: &mut D,
    poll_us: u32,
) -> !
where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    P: InputPin,
    D: DelayNs,
{
    let mut queue = EventQueue::new();
    loop {
        if let Err(_e) = poll_remote(remote, button, &mut queue, delay, poll_us) {
            warn!("megacode: polled loop error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEFAULT_CODE_STORE;
    use crate::engine::TxState;
    use crate::store::SliceStore;
    use crate::timer::{Interval, TimerTuning};
    use embedded_hal_mock::eh1::delay::NoopDelay;
    use embedded_hal_mock::eh1::digital::{
        Mock as PinMock, State as PinState, Transaction as PinTransaction,
    };

    #[test]
    fn test_poll_starts_and_times_first_phase() {
        let led = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::High),
        ]);
        let rf = PinMock::new(&[
            PinTransaction::set(PinState::Low),
            PinTransaction::set(PinState::Low),
        ]);
        let button = PinMock::new(&[
            PinTransaction::get(PinState::High),
            PinTransaction::get(PinState::Low),
            PinTransaction::get(PinState::Low),
            PinTransaction::get(PinState::Low),
        ]);
        let mut remote = Remote::new(
            led,
            rf,
            SliceStore::new(&DEFAULT_CODE_STORE),
            SoftTimer::new(TimerTuning::REFERENCE),
        );
        remote.power_on().unwrap();
        let mut button = ButtonMonitor::new(button);
        let mut queue = EventQueue::new();
        let mut delay = NoopDelay::new();

        // released: nothing happens
        assert_eq!(poll_remote(&mut remote, &mut button, &mut queue, &mut delay, 500), Ok(0));
        // press: phase 0 arms the long interval
        assert_eq!(poll_remote(&mut remote, &mut button, &mut queue, &mut delay, 500), Ok(1));
        assert_eq!(remote.state(), TxState::Transmitting);
        assert_eq!(remote.timer_mut().armed(), Some(Interval::Long));
        // 2 ms later, window A of the first bit (a 1: no pulse)
        assert_eq!(poll_remote(&mut remote, &mut button, &mut queue, &mut delay, 1_000), Ok(0));
        assert_eq!(poll_remote(&mut remote, &mut button, &mut queue, &mut delay, 1_000), Ok(1));
        assert_eq!(remote.timer_mut().armed(), Some(Interval::Short));
        assert_eq!(remote.engine().phase(), 2);

        let (mut led, mut rf, _, _) = remote.free();
        led.done();
        rf.done();
        button.pin.done();
    }
}
