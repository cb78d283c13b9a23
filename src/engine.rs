//! The megacode transmission engine.
//!
//! [`Engine`] is a pure state machine: it consumes [`Event`]s and returns the
//! ordered list of hardware [`Effect`]s they cause. It owns all transmission
//! state (the state flag, the phase counter and the cached code byte) and is
//! the only place that state changes. Applying the effects to real pins and
//! timers is the job of [`crate::driver::Remote`].
//!
//! ## States
//!
//! ```text
//!            press (code valid)              release
//!   Idle ─────────────────────────▶ Transmitting ──────▶ Finishing
//!    ▲                                 │    ▲                 │
//!    │                                 └────┘                 │
//!    │                          frame boundary: restart       │
//!    └────────────────────────────────────────────────────────┘
//!                         frame boundary: stop
//! ```
//!
//! Presses while busy, releases while idle or finishing, and timer expiries
//! while idle are ignored.
//!
//! See [`crate::encoding`] for the phase layout.

use heapless::Vec;

use crate::consts::{BLANK_PHASE, BOUNDARY_PHASE, PHASES_PER_BIT};
use crate::encoding::{PhaseKind, bit_value};
use crate::events::Event;
use crate::store::CodeStore;
use crate::timer::Interval;

/// Transmission state.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum TxState {
    /// Nothing is being sent; the timer is disarmed.
    #[default]
    Idle,
    /// Frames are sent back to back while the button is held.
    Transmitting,
    /// The button was released; the current frame is completed, then the
    /// engine stops.
    Finishing,
}

/// A hardware command produced by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Effect {
    /// Drive the status LED (`true` = lit).
    Led(bool),
    /// Drive the RF transmit line (`true` = carrier on).
    Rf(bool),
    /// Arm the one-shot timer.
    Arm(Interval),
    /// Stop the timer.
    Disarm,
}

/// Maximum number of effects a single event produces.
pub const MAX_EFFECTS: usize = 4;

/// Ordered effects of one event. Apply them in order: the engine always
/// de-asserts one output before asserting the other.
pub type Effects = Vec<Effect, MAX_EFFECTS>;

/// The transmission state machine.
#[derive(Debug)]
pub struct Engine<S: CodeStore> {
    store: S,
    state: TxState,
    phase: u8,
    byte: u8,
    programmed: bool,
    frames_sent: u16,
}

impl<S: CodeStore> Engine<S> {
    /// Creates an idle engine and performs the one-time validity check of
    /// the code store.
    pub fn new(mut store: S) -> Self {
        let programmed = store.is_programmed();
        Self {
            store,
            state: TxState::Idle,
            phase: 0,
            byte: 0,
            programmed,
            frames_sent: 0,
        }
    }

    /// Current state.
    pub fn state(&self) -> TxState {
        self.state
    }

    /// `true` unless the engine is idle.
    pub fn is_transmitting(&self) -> bool {
        self.state != TxState::Idle
    }

    /// Whether the startup check found a valid code.
    pub fn is_programmed(&self) -> bool {
        self.programmed
    }

    /// The phase that the next timer expiry will process. Meaningless while
    /// idle.
    pub fn phase(&self) -> u8 {
        self.phase
    }

    /// Number of frames completed since power-on.
    pub fn frames_sent(&self) -> u16 {
        self.frames_sent
    }

    /// Gives back the code store.
    pub fn free(self) -> S {
        self.store
    }

    /// Handles one event and returns the effects to apply.
    pub fn handle(&mut self, event: Event) -> Effects {
        let mut effects = Effects::new();
        match (event, self.state) {
            (Event::Press, TxState::Idle) if self.programmed => {
                debug!("megacode: start");
                self.state = TxState::Transmitting;
                self.phase = 0;
                self.step(&mut effects);
            }
            (Event::Press, TxState::Idle) => {
                trace!("megacode: press ignored, no code programmed");
            }
            (Event::Release, TxState::Transmitting) => {
                debug!("megacode: release at phase {}", self.phase);
                self.state = TxState::Finishing;
            }
            (Event::TimerExpired, TxState::Transmitting | TxState::Finishing) => {
                self.step(&mut effects);
            }
            _ => {}
        }
        effects
    }

    /// Processes the current phase and advances the phase counter.
    fn step(&mut self, effects: &mut Effects) {
        let phase = self.phase;
        let kind = PhaseKind::of(phase);
        trace!("megacode: phase {}", phase);
        match kind {
            PhaseKind::Pause { bit } => {
                if phase % PHASES_PER_BIT == 0 && bit % 8 == 0 {
                    self.byte = self.store.read(bit / 8);
                }
                emit(effects, Effect::Rf(false));
                emit(effects, Effect::Led(true));
            }
            PhaseKind::WindowA { bit } | PhaseKind::WindowB { bit } => {
                if kind.pulses(bit_value(self.byte, bit)) {
                    emit(effects, Effect::Led(false));
                    emit(effects, Effect::Rf(true));
                }
            }
            PhaseKind::Blank => {
                emit(effects, Effect::Rf(false));
                emit(effects, Effect::Led(true));
            }
            PhaseKind::Boundary => {
                self.frames_sent = self.frames_sent.wrapping_add(1);
                self.phase = 0;
                if self.state == TxState::Finishing {
                    debug!("megacode: stop after {} frames", self.frames_sent);
                    self.state = TxState::Idle;
                    emit(effects, Effect::Led(false));
                    emit(effects, Effect::Disarm);
                } else {
                    emit(effects, Effect::Arm(kind.interval()));
                }
                return;
            }
        }
        emit(effects, Effect::Arm(kind.interval()));
        self.phase = if phase < BLANK_PHASE {
            phase + 1
        } else {
            BOUNDARY_PHASE
        };
    }
}

fn emit(effects: &mut Effects, effect: Effect) {
    // A phase emits at most three effects.
    let _ = effects.push(effect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::{BOUNDARY_UNITS, DEFAULT_CODE_STORE, FRAME_UNITS};
    use crate::encoding::{decode_pulse_offsets, pulse_offset};
    use crate::store::{Megacode, SliceStore};

    /// A stretch of time during which the outputs were constant.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    struct Segment {
        led: bool,
        rf: bool,
        units: u16,
    }

    /// Replays effects onto simulated outputs, recording one segment per
    /// armed interval.
    #[derive(Debug, Default)]
    struct Scope {
        led: bool,
        rf: bool,
        segments: Vec<Segment, 512>,
        armed: bool,
    }

    impl Scope {
        fn apply(&mut self, effects: &Effects) {
            for effect in effects {
                match *effect {
                    Effect::Led(on) => self.led = on,
                    Effect::Rf(on) => self.rf = on,
                    Effect::Arm(interval) => {
                        self.armed = true;
                        self.segments
                            .push(Segment {
                                led: self.led,
                                rf: self.rf,
                                units: interval.units(),
                            })
                            .unwrap();
                    }
                    Effect::Disarm => self.armed = false,
                }
                assert!(!(self.led && self.rf), "LED and RF asserted together");
            }
        }
    }

    fn engine(table: &[u8]) -> Engine<SliceStore<'_>> {
        Engine::new(SliceStore::new(table))
    }

    fn expire(engine: &mut Engine<SliceStore<'_>>, scope: &mut Scope, count: usize) {
        for _ in 0..count {
            scope.apply(&engine.handle(Event::TimerExpired));
        }
    }

    /// Ticks after the press up to and including the end of the blank phase.
    const FRAME_TICKS: usize = BLANK_PHASE as usize;

    #[test]
    fn test_unprogrammed_store_never_transmits() {
        let mut engine = engine(&[0x49, 0x17, 0xc2, 0x00]);
        assert!(!engine.is_programmed());
        for event in [Event::Press, Event::TimerExpired, Event::Release, Event::Press] {
            assert!(engine.handle(event).is_empty());
            assert_eq!(engine.state(), TxState::Idle);
        }
    }

    #[test]
    fn test_press_starts_phase_zero_immediately() {
        let mut engine = engine(&DEFAULT_CODE_STORE);
        let effects = engine.handle(Event::Press);
        assert_eq!(engine.state(), TxState::Transmitting);
        assert_eq!(
            &effects[..],
            &[Effect::Rf(false), Effect::Led(true), Effect::Arm(Interval::Long)]
        );
        assert_eq!(engine.phase(), 1);
    }

    #[test]
    fn test_first_bits_of_reference_code() {
        // 0xC9 = 1100_1001: the first bit is 1, so window A stays idle and
        // window B carries the pulse; the third bit is 0.
        let mut engine = engine(&DEFAULT_CODE_STORE);
        let _ = engine.handle(Event::Press);

        let window_a = engine.handle(Event::TimerExpired);
        assert_eq!(&window_a[..], &[Effect::Arm(Interval::Short)]);
        let pause = engine.handle(Event::TimerExpired);
        assert_eq!(
            &pause[..],
            &[Effect::Rf(false), Effect::Led(true), Effect::Arm(Interval::Long)]
        );
        let window_b = engine.handle(Event::TimerExpired);
        assert_eq!(
            &window_b[..],
            &[Effect::Led(false), Effect::Rf(true), Effect::Arm(Interval::Short)]
        );

        // bit 1 (also 1), then bit 2 (0) pulses in window A
        let mut scope = Scope::default();
        expire(&mut engine, &mut scope, 4);
        let _ = engine.handle(Event::TimerExpired);
        let window_a = engine.handle(Event::TimerExpired);
        assert_eq!(
            &window_a[..],
            &[Effect::Led(false), Effect::Rf(true), Effect::Arm(Interval::Short)]
        );
    }

    #[test]
    fn test_frame_is_bit_exact_and_146_units_long() {
        let mut engine = engine(&DEFAULT_CODE_STORE);
        let mut scope = Scope::default();
        scope.apply(&engine.handle(Event::Press));
        expire(&mut engine, &mut scope, FRAME_TICKS);

        assert_eq!(scope.segments.len(), BLANK_PHASE as usize + 1);
        let total: u16 = scope.segments.iter().map(|s| s.units).sum();
        assert_eq!(total, FRAME_UNITS);
        assert_eq!(total, 146);

        // Recover the pulse positions from the recorded waveform.
        let mut offsets = [0u16; 24];
        let mut found = 0;
        let mut at = 0u16;
        for segment in scope.segments.iter() {
            if segment.rf {
                assert_eq!(segment.units, 1);
                assert!(!segment.led);
                offsets[found] = at;
                found += 1;
            } else {
                assert!(segment.led);
            }
            at += segment.units;
        }
        assert_eq!(found, 24);
        assert_eq!(offsets[0], pulse_offset(0, true));
        assert_eq!(decode_pulse_offsets(&offsets), Megacode::new(0xc917c2));

        // The blank closes the frame: LED on, RF off, two units.
        assert_eq!(
            scope.segments.last(),
            Some(&Segment {
                led: true,
                rf: false,
                units: 2
            })
        );
    }

    #[test]
    fn test_frame_length_is_independent_of_code() {
        for table in [[0x80, 0x00, 0x00, 0x00], [0xff, 0xff, 0xff, 0x00], [0xaa, 0x55, 0x0f, 0x00]] {
            let mut engine = engine(&table);
            let mut scope = Scope::default();
            scope.apply(&engine.handle(Event::Press));
            expire(&mut engine, &mut scope, FRAME_TICKS);
            let total: u16 = scope.segments.iter().map(|s| s.units).sum();
            assert_eq!(total, FRAME_UNITS);
            assert_eq!(scope.segments.iter().filter(|s| s.rf).count(), 24);
        }
    }

    #[test]
    fn test_held_button_repeats_frames() {
        let mut engine = engine(&DEFAULT_CODE_STORE);
        let mut scope = Scope::default();
        scope.apply(&engine.handle(Event::Press));
        expire(&mut engine, &mut scope, FRAME_TICKS);

        // boundary slot: restart
        let boundary = engine.handle(Event::TimerExpired);
        assert_eq!(&boundary[..], &[Effect::Arm(Interval::Short)]);
        assert_eq!(engine.state(), TxState::Transmitting);
        assert_eq!(engine.phase(), 0);
        assert_eq!(engine.frames_sent(), 1);
        scope.apply(&boundary);

        let start = scope.segments.len();
        expire(&mut engine, &mut scope, FRAME_TICKS + 1);
        let second = &scope.segments[start..start + FRAME_TICKS + 1];
        assert_eq!(second, &scope.segments[..FRAME_TICKS + 1]);

        // Frames start every FRAME_UNITS + BOUNDARY_UNITS.
        let period: u16 = scope.segments[..start].iter().map(|s| s.units).sum();
        assert_eq!(period, FRAME_UNITS + BOUNDARY_UNITS);
        assert!(scope.armed);
    }

    #[test]
    fn test_release_mid_frame_completes_frame() {
        let mut engine = engine(&DEFAULT_CODE_STORE);
        let mut scope = Scope::default();
        scope.apply(&engine.handle(Event::Press));
        // run into bit 10
        expire(&mut engine, &mut scope, 10 * PHASES_PER_BIT as usize + 1);
        assert!(engine.handle(Event::Release).is_empty());
        assert_eq!(engine.state(), TxState::Finishing);

        expire(&mut engine, &mut scope, FRAME_TICKS - (10 * PHASES_PER_BIT as usize + 1));
        assert_eq!(engine.state(), TxState::Finishing);
        let total: u16 = scope.segments.iter().map(|s| s.units).sum();
        assert_eq!(total, FRAME_UNITS);

        let stop = engine.handle(Event::TimerExpired);
        assert_eq!(&stop[..], &[Effect::Led(false), Effect::Disarm]);
        scope.apply(&stop);
        assert_eq!(engine.state(), TxState::Idle);
        assert!(!scope.led && !scope.rf && !scope.armed);
        assert_eq!(engine.frames_sent(), 1);

        // spurious expiry after stop
        assert!(engine.handle(Event::TimerExpired).is_empty());
    }

    #[test]
    fn test_re_press_is_ignored() {
        let mut engine = engine(&DEFAULT_CODE_STORE);
        let _ = engine.handle(Event::Press);
        for _ in 0..5 {
            let _ = engine.handle(Event::TimerExpired);
        }
        let phase = engine.phase();

        assert!(engine.handle(Event::Press).is_empty());
        assert_eq!(engine.state(), TxState::Transmitting);
        assert_eq!(engine.phase(), phase);

        let _ = engine.handle(Event::Release);
        assert!(engine.handle(Event::Press).is_empty());
        assert!(engine.handle(Event::Release).is_empty());
        assert_eq!(engine.state(), TxState::Finishing);
        assert_eq!(engine.phase(), phase);
    }

    #[test]
    fn test_release_while_idle_is_ignored() {
        let mut engine = engine(&DEFAULT_CODE_STORE);
        assert!(engine.handle(Event::Release).is_empty());
        assert_eq!(engine.state(), TxState::Idle);
    }

    #[test]
    fn test_press_after_stop_restarts_from_phase_zero() {
        let mut engine = engine(&DEFAULT_CODE_STORE);
        let _ = engine.handle(Event::Press);
        let _ = engine.handle(Event::Release);
        for _ in 0..=FRAME_TICKS {
            let _ = engine.handle(Event::TimerExpired);
        }
        assert_eq!(engine.state(), TxState::Idle);

        let effects = engine.handle(Event::Press);
        assert_eq!(engine.state(), TxState::Transmitting);
        assert_eq!(engine.phase(), 1);
        assert_eq!(effects.last(), Some(&Effect::Arm(Interval::Long)));
    }

    #[test]
    fn test_store_is_read_once_per_byte_group() {
        #[derive(Debug)]
        struct CountingStore {
            reads: [u8; 4],
        }
        impl CodeStore for CountingStore {
            fn read(&mut self, offset: u8) -> u8 {
                self.reads[usize::from(offset)] += 1;
                DEFAULT_CODE_STORE[usize::from(offset)]
            }
        }

        let mut engine = Engine::new(CountingStore { reads: [0; 4] });
        let _ = engine.handle(Event::Press);
        for _ in 0..FRAME_TICKS {
            let _ = engine.handle(Event::TimerExpired);
        }
        // offset 0 was also read once by the startup check
        assert_eq!(engine.free().reads, [2, 1, 1, 0]);
    }
}
