//! Hardware abstraction traits for PWM outputs, digital outputs, and battery sensing.
//!
//! This module defines the peripheral capabilities the control loop needs,
//! so that the device state machine can run against ESP32 hardware or the
//! desktop mocks without modification.
//!
//! # Key Traits
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Outputs`] | PWM duty cycles and digital levels |
//! | [`AnalogInput`] | Raw ADC counts from a sense pin |
//! | [`BatterySensor`] | Battery percentage and millivolts |
//! | [`Clock`] | Time source for throttled sampling |
//!
//! # Implementation
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For ESP32 hardware, use the
//! implementations from `hal::esp32` (requires `esp32` feature).
//!
//! # Example
//!
//! ```rust
//! use rs_trainz_remote::traits::{Outputs, PwmChannel, GpioPin};
//! use rs_trainz_remote::hal::MockOutputs;
//!
//! let mut outputs = MockOutputs::new();
//! outputs.set_pwm_duty(PwmChannel(0), 128).unwrap();
//! outputs.set_digital(GpioPin(16), true).unwrap();
//!
//! assert_eq!(outputs.duty(PwmChannel(0)), 128);
//! assert!(outputs.level(GpioPin(16)));
//! ```

use crate::battery::BatteryReading;

/// Direction of train travel.
///
/// Selects which of the two H-bridge PWM channels carries the speed duty.
///
/// # Default
///
/// Defaults to [`Forward`](Self::Forward), matching the reset state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Direction {
    /// Moving forward (forward channel driven).
    #[default]
    Forward,
    /// Moving in reverse (reverse channel driven).
    Reverse,
}

impl Direction {
    /// Returns the direction as a lowercase string.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_trainz_remote::Direction;
    ///
    /// assert_eq!(Direction::Forward.as_str(), "forward");
    /// assert_eq!(Direction::Reverse.as_str(), "reverse");
    /// ```
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
        }
    }

    /// Decode the direction switch field of the register block.
    ///
    /// The switch reads `1` when set to forward and `0` otherwise. Any
    /// non-zero value is treated as forward.
    ///
    /// # Examples
    ///
    /// ```
    /// use rs_trainz_remote::Direction;
    ///
    /// assert_eq!(Direction::from_register(1), Direction::Forward);
    /// assert_eq!(Direction::from_register(0), Direction::Reverse);
    /// assert_eq!(Direction::from_register(7), Direction::Forward);
    /// ```
    #[inline]
    pub const fn from_register(value: u8) -> Self {
        if value != 0 {
            Direction::Forward
        } else {
            Direction::Reverse
        }
    }

    /// Encode the direction as a register value (`1` forward, `0` reverse).
    #[inline]
    pub const fn to_register(self) -> u8 {
        match self {
            Direction::Forward => 1,
            Direction::Reverse => 0,
        }
    }
}

/// Identifier of a PWM channel (LEDC channel on ESP32).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PwmChannel(pub u8);

/// Identifier of a digital output pin (GPIO number).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GpioPin(pub u8);

/// Peripheral output capability: PWM duty cycles and digital levels.
///
/// Implementations must already be configured (PWM frequency/resolution,
/// pin directions) when handed to the controller. Writing to an output
/// before configuration is undefined on the target hardware.
///
/// Duty is always expressed with 8-bit resolution (0 = off, 255 = full).
///
/// # Example Implementation
///
/// ```rust,ignore
/// use rs_trainz_remote::traits::{Outputs, PwmChannel, GpioPin};
///
/// struct Board { /* ledc + gpio handles */ }
///
/// impl Outputs for Board {
///     type Error = ();
///
///     fn set_pwm_duty(&mut self, channel: PwmChannel, duty: u8) -> Result<(), ()> {
///         // ledc_set_duty(channel.0, duty) ...
///         Ok(())
///     }
///
///     fn set_digital(&mut self, pin: GpioPin, level: bool) -> Result<(), ()> {
///         // gpio_set_level(pin.0, level) ...
///         Ok(())
///     }
/// }
/// ```
pub trait Outputs {
    /// Error type for output operations.
    type Error;

    /// Set the duty cycle of a PWM channel (0-255).
    fn set_pwm_duty(&mut self, channel: PwmChannel, duty: u8) -> Result<(), Self::Error>;

    /// Drive a digital output high (`true`) or low (`false`).
    fn set_digital(&mut self, pin: GpioPin, level: bool) -> Result<(), Self::Error>;
}

/// Raw analog input (one ADC channel).
///
/// There is no error path: a failed conversion is reported as `0` counts
/// and treated downstream as a valid but inaccurate sample.
pub trait AnalogInput {
    /// Returns the latest conversion in raw ADC counts.
    fn read_raw(&mut self) -> u16;
}

/// Battery sensing capability.
///
/// Converts whatever the hardware provides into a charge percentage and a
/// battery voltage in millivolts. Calibration lives inside the implementation.
pub trait BatterySensor {
    /// Perform one measurement.
    fn read_battery(&mut self) -> BatteryReading;
}

/// Time source trait for `no_std` compatibility.
///
/// Provides monotonic time in milliseconds for throttled sampling.
///
/// # Example
///
/// ```rust
/// use rs_trainz_remote::traits::Clock;
/// use rs_trainz_remote::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// assert_eq!(clock.now_ms(), 0);
///
/// clock.advance(100);
/// assert_eq!(clock.now_ms(), 100);
/// ```
pub trait Clock {
    /// Returns current time in milliseconds since an arbitrary epoch.
    ///
    /// Must be monotonically increasing.
    fn now_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Direction Tests
    // =========================================================================

    #[test]
    fn direction_default_is_forward() {
        assert_eq!(Direction::default(), Direction::Forward);
    }

    #[test]
    fn direction_register_roundtrip_for_canonical_values() {
        assert_eq!(Direction::from_register(Direction::Forward.to_register()), Direction::Forward);
        assert_eq!(Direction::from_register(Direction::Reverse.to_register()), Direction::Reverse);
    }

    #[test]
    fn direction_nonzero_register_is_forward() {
        for value in 1..=u8::MAX {
            assert_eq!(Direction::from_register(value), Direction::Forward);
        }
    }

    // =========================================================================
    // Clock Blanket Impl Tests
    // =========================================================================

    struct FixedClock(u64);

    impl Clock for FixedClock {
        fn now_ms(&self) -> u64 {
            self.0
        }
    }

    #[test]
    fn clock_reference_delegates() {
        let clock = FixedClock(42);
        let by_ref = &clock;
        assert_eq!(Clock::now_ms(&by_ref), 42);
    }
}
