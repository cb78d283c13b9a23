/// Declares a static global `REMOTE` instance protected by a `critical_section` mutex.
///
/// This macro creates a `static` singleton `REMOTE` suitable for use in
/// interrupt-based firmware, where `main` and the interrupt handlers need to
/// share the transmitter.
///
/// # Arguments
/// - `$led`: The concrete type of the status LED pin (must implement `OutputPin`)
/// - `$rf`: The concrete type of the RF transmit pin (must implement `OutputPin`)
/// - `$store`: The concrete code store type (must implement `CodeStore`)
/// - `$timer`: The concrete timer type (must implement `CountdownTimer`)
///
/// # Example
/// ```rust,ignore
/// init_remote!(Gp0, Gp1, SliceStore<'static>, OverflowTimer<Timer1>);
/// ```
#[macro_export]
macro_rules! init_remote {
    ( $led:ty, $rf:ty, $store:ty, $timer:ty ) => {
        pub static REMOTE: $crate::timer::GlobalRemote<$led, $rf, $store, $timer> =
            $crate::critical_section::Mutex::new(core::cell::RefCell::new(None));
    };
}

/// Builds a `Remote` and stores it in the global `REMOTE`, evaluating to the
/// result of its power-on check.
///
/// # Arguments
/// - `$led`: The status LED pin
/// - `$rf`: The RF transmit pin
/// - `$store`: The code store
/// - `$timer`: The one-shot timer
///
/// # Example
/// ```rust,ignore
/// fn main() -> ! {
///     if setup_remote!(led, rf, SliceStore::new(&EEPROM), timer).is_ok() {
///         unsafe { enable_interrupts() };
///     }
///     megacode::timer::run_idle_loop(&REMOTE, &mut power)
/// }
/// ```
///
/// # Notes
/// - Requires `init_remote!` to have been used earlier.
/// - Call before enabling interrupts; leave them disabled on error.
#[macro_export]
macro_rules! setup_remote {
    ( $led:expr, $rf:expr, $store:expr, $timer:expr ) => {
        $crate::timer::global_remote_setup(
            &REMOTE,
            $crate::driver::Remote::new($led, $rf, $store, $timer),
        )
    };
}

/// Forwards a button edge to the global `REMOTE`.
///
/// `$pressed` is the level read in the pin-change interrupt, `true` when the
/// (active-low) button is down.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn PCINT0() {
///     button_edge!(button.is_low().unwrap_or(false));
/// }
/// ```
#[macro_export]
macro_rules! button_edge {
    ( $pressed:expr ) => {
        $crate::timer::global_button_edge(&REMOTE, $pressed)
    };
}

/// Forwards a timer expiry to the global `REMOTE`.
///
/// This macro is intended to be invoked from the timer overflow ISR. The
/// engine re-arms the timer before returning.
///
/// # Example
/// ```rust,ignore
/// #[interrupt]
/// fn TIM1_OVF() {
///     timer_expired!();
/// }
/// ```
///
/// # Notes
/// - Safe to call before setup; it silently does nothing.
#[macro_export]
macro_rules! timer_expired {
    () => {
        $crate::timer::global_timer_expired(&REMOTE)
    };
}
