//! Mock implementations for testing without hardware.
//!
//! This module provides test doubles for all hardware and transport traits,
//! enabling development and testing on desktop without physical hardware.
//!
//! # Available Mocks
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockOutputs`] | [`Outputs`] | Records every PWM/digital write |
//! | [`MockAnalog`] | [`AnalogInput`] | Fixed raw ADC value |
//! | [`MockBattery`] | [`BatterySensor`] | Fixed reading, counts measurements |
//! | [`MockClock`] | [`Clock`] | Controllable, shareable time source |
//! | [`MockRemote`] | [`CommandSource`] | Settable snapshot, captured report |
//!
//! # Example
//!
//! ```rust
//! use rs_trainz_remote::{CommandSnapshot, Device, Direction};
//! use rs_trainz_remote::config::Config;
//! use rs_trainz_remote::hal::MockOutputs;
//!
//! let config = Config::default();
//! let mut device = Device::new(MockOutputs::new(), &config);
//! device.reset().unwrap();
//!
//! device.tick(CommandSnapshot::new(50, Direction::Forward)).unwrap();
//!
//! let outputs = device.outputs();
//! assert_eq!(outputs.duty(config.pwm.motor_forward), 128);
//! assert_eq!(outputs.duty(config.pwm.motor_reverse), 0);
//! ```
//!
//! [`Outputs`]: crate::traits::Outputs
//! [`AnalogInput`]: crate::traits::AnalogInput
//! [`BatterySensor`]: crate::traits::BatterySensor
//! [`Clock`]: crate::traits::Clock
//! [`CommandSource`]: crate::traits::CommandSource

extern crate alloc;
use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::Cell;

use crate::battery::BatteryReading;
use crate::commands::{CommandSnapshot, OutboundReport};
use crate::traits::{
    AnalogInput, BatterySensor, Clock, CommandSource, GpioPin, Outputs, PwmChannel,
};

// ============================================================================
// Hardware Mocks
// ============================================================================

/// One recorded write to a [`MockOutputs`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputEvent {
    /// `set_pwm_duty(channel, duty)`
    Pwm(PwmChannel, u8),
    /// `set_digital(pin, level)`
    Digital(GpioPin, bool),
}

/// Mock peripheral outputs.
///
/// Records every write in order and keeps the latest value per channel and
/// pin. Also watches the two motor channels and latches
/// [`motor_overlap_seen`](Self::motor_overlap_seen) if both are ever non-zero
/// at the same time.
///
/// # Example
///
/// ```rust
/// use rs_trainz_remote::hal::{MockOutputs, OutputEvent};
/// use rs_trainz_remote::traits::{Outputs, PwmChannel};
///
/// let mut outputs = MockOutputs::new();
/// outputs.set_pwm_duty(PwmChannel(0), 200).unwrap();
/// outputs.set_pwm_duty(PwmChannel(1), 10).unwrap();
///
/// assert!(outputs.motor_overlap_seen);
/// assert_eq!(outputs.events[0], OutputEvent::Pwm(PwmChannel(0), 200));
/// assert_eq!(outputs.pwm_writes(PwmChannel(0)), 1);
/// ```
#[derive(Debug)]
pub struct MockOutputs {
    /// Every write, oldest first.
    pub events: Vec<OutputEvent>,
    /// Latched if both motor channels were non-zero after any write.
    pub motor_overlap_seen: bool,
    /// When set, every write fails with `Err(())` and is not recorded.
    pub fail_writes: bool,
    /// When `Some(n)`, the next `n` writes succeed and every later one fails.
    pub fail_after: Option<usize>,
    duties: BTreeMap<PwmChannel, u8>,
    levels: BTreeMap<GpioPin, bool>,
    motor_channels: (PwmChannel, PwmChannel),
}

impl MockOutputs {
    /// Creates mock outputs watching motor channels 0 and 1.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            motor_overlap_seen: false,
            fail_writes: false,
            fail_after: None,
            duties: BTreeMap::new(),
            levels: BTreeMap::new(),
            motor_channels: (PwmChannel(0), PwmChannel(1)),
        }
    }

    /// Watch a different pair of motor channels for overlap.
    pub fn with_motor_channels(mut self, forward: PwmChannel, reverse: PwmChannel) -> Self {
        self.motor_channels = (forward, reverse);
        self
    }

    /// Latest duty written to `channel` (0 if never written).
    pub fn duty(&self, channel: PwmChannel) -> u8 {
        self.duties.get(&channel).copied().unwrap_or(0)
    }

    /// Latest level written to `pin` (low if never written).
    pub fn level(&self, pin: GpioPin) -> bool {
        self.levels.get(&pin).copied().unwrap_or(false)
    }

    /// Number of writes to `channel`.
    pub fn pwm_writes(&self, channel: PwmChannel) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, OutputEvent::Pwm(c, _) if *c == channel))
            .count()
    }

    /// Number of writes to `pin`.
    pub fn digital_writes(&self, pin: GpioPin) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, OutputEvent::Digital(p, _) if *p == pin))
            .count()
    }

    /// Forget recorded events, keeping the current output values.
    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Let the next `n` writes through, then fail every write.
    pub fn fail_after_writes(&mut self, n: usize) {
        self.fail_after = Some(n);
    }

    fn accept_write(&mut self) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        match self.fail_after {
            Some(0) => Err(()),
            Some(n) => {
                self.fail_after = Some(n - 1);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl Default for MockOutputs {
    fn default() -> Self {
        Self::new()
    }
}

impl Outputs for MockOutputs {
    type Error = ();

    fn set_pwm_duty(&mut self, channel: PwmChannel, duty: u8) -> Result<(), ()> {
        self.accept_write()?;
        self.duties.insert(channel, duty);
        self.events.push(OutputEvent::Pwm(channel, duty));
        let (fw, rw) = self.motor_channels;
        if self.duty(fw) != 0 && self.duty(rw) != 0 {
            self.motor_overlap_seen = true;
        }
        Ok(())
    }

    fn set_digital(&mut self, pin: GpioPin, level: bool) -> Result<(), ()> {
        self.accept_write()?;
        self.levels.insert(pin, level);
        self.events.push(OutputEvent::Digital(pin, level));
        Ok(())
    }
}

/// Mock ADC channel returning a settable raw value.
#[derive(Debug, Default)]
pub struct MockAnalog {
    /// Value returned by `read_raw`.
    pub value: u16,
    /// Number of conversions performed.
    pub read_count: usize,
}

impl MockAnalog {
    /// Creates a mock ADC channel reading `value`.
    pub fn new(value: u16) -> Self {
        Self {
            value,
            read_count: 0,
        }
    }
}

impl AnalogInput for MockAnalog {
    fn read_raw(&mut self) -> u16 {
        self.read_count += 1;
        self.value
    }
}

/// Mock battery sensor returning a settable reading.
///
/// # Example
///
/// ```rust
/// use rs_trainz_remote::battery::BatteryReading;
/// use rs_trainz_remote::hal::MockBattery;
/// use rs_trainz_remote::traits::BatterySensor;
///
/// let mut battery = MockBattery::new(BatteryReading::new(90, 8_640));
/// assert_eq!(battery.read_battery().percentage, 90);
/// assert_eq!(battery.read_count, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockBattery {
    /// Reading returned by the next measurement.
    pub reading: BatteryReading,
    /// Number of measurements performed.
    pub read_count: usize,
}

impl MockBattery {
    /// Creates a mock sensor returning `reading`.
    pub fn new(reading: BatteryReading) -> Self {
        Self {
            reading,
            read_count: 0,
        }
    }

    /// Change the reading returned by future measurements.
    pub fn set(&mut self, reading: BatteryReading) {
        self.reading = reading;
    }
}

impl BatterySensor for MockBattery {
    fn read_battery(&mut self) -> BatteryReading {
        self.read_count += 1;
        self.reading
    }
}

/// Mock clock for testing.
///
/// Clones share the same time, so a test can keep a handle and advance it
/// after moving a clone into the component under test.
///
/// # Example
///
/// ```rust
/// use rs_trainz_remote::hal::MockClock;
/// use rs_trainz_remote::traits::Clock;
///
/// let clock = MockClock::new();
/// let shared = clock.clone();
///
/// clock.set(1000);
/// assert_eq!(shared.now_ms(), 1000);
///
/// shared.advance(500);
/// assert_eq!(clock.now_ms(), 1500);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockClock {
    current_ms: Rc<Cell<u64>>,
}

impl MockClock {
    /// Creates a new mock clock starting at 0ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the current time in milliseconds.
    pub fn set(&self, ms: u64) {
        self.current_ms.set(ms);
    }

    /// Advances the clock by the given duration.
    pub fn advance(&self, ms: u64) {
        self.current_ms.set(self.current_ms.get() + ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.get()
    }
}

// ============================================================================
// Transport Mocks
// ============================================================================

/// Mock command source.
///
/// Holds one current snapshot (what the transport decoded last) and
/// captures the outbound report.
#[derive(Debug, Default)]
pub struct MockRemote {
    current: CommandSnapshot,
    report: OutboundReport,
    /// Number of `read` calls.
    pub read_count: usize,
    /// Number of `clear_inputs` calls.
    pub clear_count: usize,
}

impl MockRemote {
    /// Creates a connected mock source with a default snapshot.
    pub fn new() -> Self {
        Self {
            report: OutboundReport {
                battery_percentage: 0,
                connected: true,
            },
            ..Default::default()
        }
    }

    /// Replace the current snapshot, as if a remote update arrived.
    pub fn push(&mut self, snapshot: CommandSnapshot) {
        self.current = snapshot;
    }

    /// Change the connection flag.
    pub fn set_connected(&mut self, connected: bool) {
        self.report.connected = connected;
    }

    /// Current outbound report.
    pub fn report(&self) -> OutboundReport {
        self.report
    }

    /// Current snapshot without counting a read.
    pub fn peek(&self) -> CommandSnapshot {
        self.current
    }
}

impl CommandSource for MockRemote {
    fn read(&mut self) -> CommandSnapshot {
        self.read_count += 1;
        self.current
    }

    fn write_report(&mut self, percentage: i8) {
        self.report.battery_percentage = percentage;
    }

    fn is_connected(&self) -> bool {
        self.report.connected
    }

    fn clear_inputs(&mut self) {
        self.clear_count += 1;
        self.current = CommandSnapshot::default();
    }
}
