use crate::driver::Remote;
use crate::error::Result;
use crate::events::Event;
use crate::power::{WaitForInterrupt, park_if_idle};
use crate::store::CodeStore;
use crate::timer::CountdownTimer;
use core::cell::RefCell;
use critical_section::Mutex;
use embedded_hal::digital::OutputPin;

/// The global slot holding the remote shared between `main` and the
/// interrupt handlers.
pub type GlobalRemote<LED, RF, S, T> = Mutex<RefCell<Option<Remote<LED, RF, S, T>>>>;

/// Used to initialize the global static `Remote` for use with
/// `critical_section`.
///
/// # Returns
/// * An empty mutable ref-cell
///
/// # Example
/// ```rust,ignore
/// use megacode::store::SliceStore;
/// use megacode::timer::{GlobalRemote, OverflowTimer, global_remote_init};
/// use some_hal::{Gp0, Gp1, Timer1};
///
/// static REMOTE: GlobalRemote<Gp0, Gp1, SliceStore<'static>, OverflowTimer<Timer1>> =
///     global_remote_init();
/// ```
pub const fn global_remote_init<LED, RF, S, T>() -> GlobalRemote<LED, RF, S, T>
where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    T: CountdownTimer,
{
    Mutex::new(RefCell::new(None))
}

/// Stores `remote` in the global slot and runs its power-on check.
///
/// Enable interrupts only if this returns `Ok`. On
/// [`Error::NotProgrammed`](crate::error::Error::NotProgrammed) the LED has
/// been lit and the device must stay inert.
///
///# Example
/// ```rust,ignore
/// fn main() -> ! {
///     let remote = Remote::new(led, rf, SliceStore::new(&EEPROM), timer);
///     if global_remote_setup(&REMOTE, remote).is_ok() {
///         unsafe { enable_interrupts() };
///     }
///     run_idle_loop(&REMOTE, &mut power)
/// }
/// ```
pub fn global_remote_setup<LED, RF, S, T>(
    global_remote: &'static GlobalRemote<LED, RF, S, T>,
    remote: Remote<LED, RF, S, T>,
) -> Result<()>
where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    T: CountdownTimer,
{
    critical_section::with(|cs| {
        let mut slot = global_remote.borrow(cs).borrow_mut();
        let remote = slot.insert(remote);
        remote.power_on()
    })
}

/// Feeds `event` to the global remote, if it has been set up.
///
/// Pin failures cannot be reported from an interrupt; they are logged and
/// dropped.
pub fn global_remote_event<LED, RF, S, T>(
    global_remote: &'static GlobalRemote<LED, RF, S, T>,
    event: Event,
) where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    T: CountdownTimer,
{
    critical_section::with(|cs| {
        if let Some(remote) = global_remote.borrow(cs).borrow_mut().as_mut() {
            if let Err(_e) = remote.handle(event) {
                warn!("megacode: output failure while handling event");
            }
        }
    });
}

/// Handles a button edge. `pressed` is the debounced-by-latency level read in
/// the pin-change interrupt (active low: pin low means pressed).
///
///# Example
/// ```rust,ignore
/// #[interrupt]
/// fn PCINT0() {
///     global_button_edge(&REMOTE, button.is_low().unwrap_or(false));
/// }
/// ```
pub fn global_button_edge<LED, RF, S, T>(
    global_remote: &'static GlobalRemote<LED, RF, S, T>,
    pressed: bool,
) where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    T: CountdownTimer,
{
    let event = if pressed { Event::Press } else { Event::Release };
    global_remote_event(global_remote, event);
}

/// Handles a timer expiry.
///
///# Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM1_OVF() {
///     global_timer_expired(&REMOTE);
/// }
/// ```
///
/// # Notes
/// Targets with a single interrupt vector should test the timer flag
/// before the pin-change flag, matching
/// [`EventQueue`](crate::events::EventQueue).
pub fn global_timer_expired<LED, RF, S, T>(global_remote: &'static GlobalRemote<LED, RF, S, T>)
where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    T: CountdownTimer,
{
    global_remote_event(global_remote, Event::TimerExpired);
}

/// Whether the global remote is transmitting. `false` before setup.
pub fn global_is_transmitting<LED, RF, S, T>(
    global_remote: &'static GlobalRemote<LED, RF, S, T>,
) -> bool
where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    T: CountdownTimer,
{
    critical_section::with(|cs| {
        global_remote
            .borrow(cs)
            .borrow()
            .as_ref()
            .is_some_and(Remote::is_transmitting)
    })
}

/// Parks the processor if the global remote is idle. Returns whether it
/// parked.
pub fn global_park_if_idle<LED, RF, S, T, P>(
    global_remote: &'static GlobalRemote<LED, RF, S, T>,
    power: &mut P,
) -> bool
where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    T: CountdownTimer,
    P: WaitForInterrupt,
{
    park_if_idle(power, global_is_transmitting(global_remote))
}

/// The main loop of interrupt-driven firmware: sleep whenever idle, spin
/// while transmitting. All work happens in the interrupt handlers.
pub fn run_idle_loop<LED, RF, S, T, P>(
    global_remote: &'static GlobalRemote<LED, RF, S, T>,
    power: &mut P,
) -> !
where
    LED: OutputPin,
    RF: OutputPin,
    S: CodeStore,
    T: CountdownTimer,
    P: WaitForInterrupt,
{
    loop {
        let _ = global_park_if_idle(global_remote, power);
    }
}
