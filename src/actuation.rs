//! Mapping from commands to physical outputs.
//!
//! The motor is driven through an H-bridge with one PWM input per direction:
//!
//! - Forward: forward channel = duty, reverse channel = 0
//! - Reverse: forward channel = 0, reverse channel = duty
//!
//! Driving both inputs at once shorts the bridge. [`Actuator::apply`] always
//! zeroes the inactive channel before writing the active one, so no write
//! sequence ever leaves both channels non-zero.
//!
//! # Example
//!
//! ```rust
//! use rs_trainz_remote::actuation::{motor_duties, speed_to_duty, Actuator, MotorDuties};
//! use rs_trainz_remote::config::Config;
//! use rs_trainz_remote::hal::MockOutputs;
//! use rs_trainz_remote::Direction;
//!
//! assert_eq!(speed_to_duty(50), 128);
//! assert_eq!(
//!     motor_duties(50, Direction::Reverse),
//!     MotorDuties { forward: 0, reverse: 128 }
//! );
//!
//! let config = Config::default();
//! let mut actuator = Actuator::new(MockOutputs::new(), &config);
//! actuator.apply(100, Direction::Forward).unwrap();
//! assert_eq!(actuator.outputs().duty(config.pwm.motor_forward), 255);
//! ```

use crate::config::Config;
use crate::traits::{Direction, GpioPin, Outputs, PwmChannel};

/// Maximum 8-bit duty value.
pub const MAX_DUTY: u8 = 255;

/// Speed percentage that maps to full duty.
pub const SPEED_MAX: i8 = 100;

/// Rescale a speed percentage (0-100) to an 8-bit duty cycle (0-255).
///
/// Rounds to nearest. Speeds outside 0-100 are clamped first, so a
/// negative speed drives nothing.
///
/// # Examples
///
/// ```
/// use rs_trainz_remote::actuation::speed_to_duty;
///
/// assert_eq!(speed_to_duty(0), 0);
/// assert_eq!(speed_to_duty(50), 128);
/// assert_eq!(speed_to_duty(100), 255);
/// assert_eq!(speed_to_duty(-20), 0);
/// ```
pub fn speed_to_duty(speed: i8) -> u8 {
    let speed = speed.clamp(0, SPEED_MAX) as u16;
    let span = SPEED_MAX as u16;
    ((speed * MAX_DUTY as u16 + span / 2) / span) as u8
}

/// Duty cycles of the two motor channels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MotorDuties {
    /// Forward channel duty.
    pub forward: u8,
    /// Reverse channel duty.
    pub reverse: u8,
}

impl MotorDuties {
    /// Both channels off.
    pub const OFF: Self = Self {
        forward: 0,
        reverse: 0,
    };

    /// Returns true if at most one channel is driven.
    #[inline]
    pub const fn is_safe(&self) -> bool {
        self.forward == 0 || self.reverse == 0
    }
}

/// Compute the channel duties for a speed and direction.
///
/// The inactive channel is always zero.
pub fn motor_duties(speed: i8, direction: Direction) -> MotorDuties {
    let duty = speed_to_duty(speed);
    match direction {
        Direction::Forward => MotorDuties {
            forward: duty,
            reverse: 0,
        },
        Direction::Reverse => MotorDuties {
            forward: 0,
            reverse: duty,
        },
    }
}

/// Drives motor, headlight and horn through an [`Outputs`] implementation.
///
/// All operations are idempotent: repeating a call rewrites the same values.
pub struct Actuator<O: Outputs> {
    outputs: O,
    motor_forward: PwmChannel,
    motor_reverse: PwmChannel,
    buzzer: PwmChannel,
    led: GpioPin,
    horn_duty: u8,
}

impl<O: Outputs> Actuator<O> {
    /// Create an actuator using the channel/pin assignments of `config`.
    ///
    /// `outputs` must already be configured; nothing is written here.
    pub fn new(outputs: O, config: &Config) -> Self {
        Self {
            outputs,
            motor_forward: config.pwm.motor_forward,
            motor_reverse: config.pwm.motor_reverse,
            buzzer: config.pwm.buzzer,
            led: config.pins.led,
            horn_duty: config.device.horn_duty,
        }
    }

    /// Drive the motor at `speed` percent in `direction`.
    pub fn apply(&mut self, speed: i8, direction: Direction) -> Result<(), O::Error> {
        let duties = motor_duties(speed, direction);
        // Inactive channel first.
        match direction {
            Direction::Forward => {
                self.outputs.set_pwm_duty(self.motor_reverse, duties.reverse)?;
                self.outputs.set_pwm_duty(self.motor_forward, duties.forward)?;
            }
            Direction::Reverse => {
                self.outputs.set_pwm_duty(self.motor_forward, duties.forward)?;
                self.outputs.set_pwm_duty(self.motor_reverse, duties.reverse)?;
            }
        }
        Ok(())
    }

    /// Switch the headlight.
    pub fn apply_light(&mut self, on: bool) -> Result<(), O::Error> {
        self.outputs.set_digital(self.led, on)
    }

    /// Sound or silence the horn. The horn has a single fixed volume.
    pub fn apply_horn(&mut self, on: bool) -> Result<(), O::Error> {
        let duty = if on { self.horn_duty } else { 0 };
        self.outputs.set_pwm_duty(self.buzzer, duty)
    }

    /// Motor off, light off, horn off.
    pub fn all_off(&mut self) -> Result<(), O::Error> {
        self.outputs.set_pwm_duty(self.motor_forward, 0)?;
        self.outputs.set_pwm_duty(self.motor_reverse, 0)?;
        self.apply_light(false)?;
        self.apply_horn(false)
    }

    /// Borrow the underlying outputs.
    pub fn outputs(&self) -> &O {
        &self.outputs
    }

    /// Mutably borrow the underlying outputs.
    pub fn outputs_mut(&mut self) -> &mut O {
        &mut self.outputs
    }

    /// Consume the actuator and return the outputs.
    pub fn into_inner(self) -> O {
        self.outputs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockOutputs, OutputEvent};

    fn actuator() -> (Actuator<MockOutputs>, Config) {
        let config = Config::default();
        (Actuator::new(MockOutputs::new(), &config), config)
    }

    // =========================================================================
    // Pure mappings
    // =========================================================================

    #[test]
    fn speed_to_duty_endpoints() {
        assert_eq!(speed_to_duty(0), 0);
        assert_eq!(speed_to_duty(100), 255);
    }

    #[test]
    fn speed_to_duty_rounds_to_nearest() {
        assert_eq!(speed_to_duty(1), 3); // 2.55
        assert_eq!(speed_to_duty(10), 26); // 25.5
        assert_eq!(speed_to_duty(25), 64); // 63.75
        assert_eq!(speed_to_duty(50), 128); // 127.5
        assert_eq!(speed_to_duty(99), 252); // 252.45
    }

    #[test]
    fn speed_to_duty_clamps() {
        assert_eq!(speed_to_duty(i8::MIN), 0);
        assert_eq!(speed_to_duty(-1), 0);
        assert_eq!(speed_to_duty(101), 255);
        assert_eq!(speed_to_duty(i8::MAX), 255);
    }

    #[test]
    fn speed_to_duty_is_monotonic() {
        let mut prev = 0;
        for speed in 0..=100 {
            let duty = speed_to_duty(speed);
            assert!(duty >= prev);
            prev = duty;
        }
    }

    #[test]
    fn motor_duties_never_drive_both_channels() {
        for speed in i8::MIN..=i8::MAX {
            for dir in [Direction::Forward, Direction::Reverse] {
                assert!(motor_duties(speed, dir).is_safe());
            }
        }
    }

    #[test]
    fn motor_duties_select_channel() {
        assert_eq!(
            motor_duties(50, Direction::Forward),
            MotorDuties {
                forward: 128,
                reverse: 0
            }
        );
        assert_eq!(
            motor_duties(50, Direction::Reverse),
            MotorDuties {
                forward: 0,
                reverse: 128
            }
        );
        assert_eq!(motor_duties(0, Direction::Reverse), MotorDuties::OFF);
    }

    // =========================================================================
    // Actuator
    // =========================================================================

    #[test]
    fn apply_forward_sets_channels() {
        let (mut act, config) = actuator();
        act.apply(50, Direction::Forward).unwrap();
        assert_eq!(act.outputs().duty(config.pwm.motor_forward), 128);
        assert_eq!(act.outputs().duty(config.pwm.motor_reverse), 0);
    }

    #[test]
    fn apply_writes_inactive_channel_first() {
        let (mut act, config) = actuator();
        act.apply(60, Direction::Reverse).unwrap();
        assert_eq!(
            act.outputs().events,
            vec![
                OutputEvent::Pwm(config.pwm.motor_forward, 0),
                OutputEvent::Pwm(config.pwm.motor_reverse, 153),
            ]
        );

        act.outputs_mut().events.clear();
        act.apply(60, Direction::Forward).unwrap();
        assert_eq!(
            act.outputs().events,
            vec![
                OutputEvent::Pwm(config.pwm.motor_reverse, 0),
                OutputEvent::Pwm(config.pwm.motor_forward, 153),
            ]
        );
    }

    #[test]
    fn direction_flip_never_overlaps() {
        let (mut act, _) = actuator();
        act.apply(100, Direction::Forward).unwrap();
        act.apply(100, Direction::Reverse).unwrap();
        act.apply(100, Direction::Forward).unwrap();
        assert!(!act.outputs().motor_overlap_seen);
    }

    #[test]
    fn horn_uses_fixed_duty() {
        let (mut act, config) = actuator();
        act.apply_horn(true).unwrap();
        assert_eq!(act.outputs().duty(config.pwm.buzzer), 127);
        act.apply_horn(false).unwrap();
        assert_eq!(act.outputs().duty(config.pwm.buzzer), 0);
    }

    #[test]
    fn light_is_digital() {
        let (mut act, config) = actuator();
        act.apply_light(true).unwrap();
        assert!(act.outputs().level(config.pins.led));
        act.apply_light(false).unwrap();
        assert!(!act.outputs().level(config.pins.led));
    }

    #[test]
    fn repeated_calls_are_idempotent() {
        let (mut act, config) = actuator();
        act.apply(30, Direction::Forward).unwrap();
        act.apply_light(true).unwrap();
        act.apply_horn(true).unwrap();
        let first = (
            act.outputs().duty(config.pwm.motor_forward),
            act.outputs().duty(config.pwm.motor_reverse),
            act.outputs().duty(config.pwm.buzzer),
            act.outputs().level(config.pins.led),
        );
        act.apply(30, Direction::Forward).unwrap();
        act.apply_light(true).unwrap();
        act.apply_horn(true).unwrap();
        let second = (
            act.outputs().duty(config.pwm.motor_forward),
            act.outputs().duty(config.pwm.motor_reverse),
            act.outputs().duty(config.pwm.buzzer),
            act.outputs().level(config.pins.led),
        );
        assert_eq!(first, second);
    }

    #[test]
    fn all_off_clears_everything() {
        let (mut act, config) = actuator();
        act.apply(80, Direction::Reverse).unwrap();
        act.apply_light(true).unwrap();
        act.apply_horn(true).unwrap();

        act.all_off().unwrap();
        assert_eq!(act.outputs().duty(config.pwm.motor_forward), 0);
        assert_eq!(act.outputs().duty(config.pwm.motor_reverse), 0);
        assert_eq!(act.outputs().duty(config.pwm.buzzer), 0);
        assert!(!act.outputs().level(config.pins.led));
    }

    #[test]
    fn custom_horn_duty() {
        let config = Config::default()
            .with_device(crate::config::DeviceConfig::default().with_horn_duty(200));
        let mut act = Actuator::new(MockOutputs::new(), &config);
        act.apply_horn(true).unwrap();
        assert_eq!(act.outputs().duty(config.pwm.buzzer), 200);
    }
}
