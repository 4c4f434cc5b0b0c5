//! Device state machine: applied-state tracking, reset, and per-tick actuation.
//!
//! [`Device`] owns the record of the last `(speed, direction)` pair actually
//! written to the motor. Each [`tick`](Device::tick) reapplies light and horn
//! (cheap, stateless outputs) and only reconfigures the motor PWM when the
//! incoming pair differs from that record, so bursts of identical commands
//! collapse into one motor write.
//!
//! # Lifecycle
//!
//! ```text
//! Uninitialized --reset()--> Ready --tick()--> Ready
//! ```
//!
//! [`reset`](Device::reset) is the single safe-default entry point. It must
//! be called after peripherals are configured and before the first tick.
//!
//! # Example
//!
//! ```rust
//! use rs_trainz_remote::{CommandSnapshot, Device, Direction, TickOutcome};
//! use rs_trainz_remote::config::Config;
//! use rs_trainz_remote::hal::MockOutputs;
//!
//! let config = Config::default();
//! let mut device = Device::new(MockOutputs::new(), &config);
//! device.reset().unwrap();
//!
//! let cmd = CommandSnapshot::new(50, Direction::Forward);
//! assert_eq!(device.tick(cmd).unwrap(), TickOutcome::Actuated);
//! assert_eq!(device.tick(cmd).unwrap(), TickOutcome::Unchanged);
//! ```

use core::fmt;

use crate::actuation::Actuator;
use crate::commands::CommandSnapshot;
use crate::config::Config;
use crate::traits::{Direction, Outputs};

/// Lifecycle state of the device.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DeviceState {
    /// Peripherals may be configured but no reset has run yet.
    #[default]
    Uninitialized,
    /// Reset done; ticks are accepted.
    Ready,
}

/// The last motor command actually applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AppliedState {
    /// Speed percentage as received.
    pub speed: i8,
    /// Direction of travel.
    pub direction: Direction,
}

impl AppliedState {
    /// Motor stopped, direction forward.
    pub const SAFE: Self = Self {
        speed: 0,
        direction: Direction::Forward,
    };

    /// Returns true if `snapshot` asks for a different speed or direction.
    #[inline]
    pub fn differs_from(&self, snapshot: &CommandSnapshot) -> bool {
        (self.speed, self.direction) != snapshot.motion()
    }
}

/// What a tick did to the motor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Speed and direction matched the applied state; motor untouched.
    Unchanged,
    /// Motor reconfigured and applied state updated.
    Actuated,
}

/// Errors from the device state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceError<E> {
    /// `tick` was called before `reset`.
    NotReady,
    /// A peripheral write failed.
    Output(E),
}

impl<E: fmt::Debug> fmt::Display for DeviceError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::NotReady => write!(f, "device not reset"),
            DeviceError::Output(e) => write!(f, "output write failed: {:?}", e),
        }
    }
}

#[cfg(feature = "std")]
impl<E: fmt::Debug> std::error::Error for DeviceError<E> {}

/// Device state machine.
///
/// Generic over the output implementation so the same logic runs on the
/// ESP32 LEDC/GPIO drivers and on [`MockOutputs`](crate::hal::MockOutputs).
pub struct Device<O: Outputs> {
    actuator: Actuator<O>,
    applied: AppliedState,
    state: DeviceState,
}

impl<O: Outputs> Device<O> {
    /// Create a device in the [`DeviceState::Uninitialized`] state.
    ///
    /// No output is written until [`reset`](Self::reset).
    pub fn new(outputs: O, config: &Config) -> Self {
        Self {
            actuator: Actuator::new(outputs, config),
            applied: AppliedState::SAFE,
            state: DeviceState::Uninitialized,
        }
    }

    /// Enter the safe default state.
    ///
    /// Stops the motor, switches light and horn off, and records
    /// `{speed: 0, direction: forward}` as applied. The device stays
    /// uninitialized if any write fails.
    pub fn reset(&mut self) -> Result<(), DeviceError<O::Error>> {
        self.actuator.all_off().map_err(DeviceError::Output)?;
        self.applied = AppliedState::SAFE;
        self.state = DeviceState::Ready;
        log::info!("device reset: motor stopped, light and horn off");
        Ok(())
    }

    /// Apply one command snapshot.
    ///
    /// Light then horn are written every call. Speed and direction are
    /// written only when either differs from the applied state.
    pub fn tick(
        &mut self,
        snapshot: CommandSnapshot,
    ) -> Result<TickOutcome, DeviceError<O::Error>> {
        if self.state != DeviceState::Ready {
            return Err(DeviceError::NotReady);
        }

        self.actuator
            .apply_light(snapshot.light)
            .map_err(DeviceError::Output)?;
        self.actuator
            .apply_horn(snapshot.horn)
            .map_err(DeviceError::Output)?;

        if !self.applied.differs_from(&snapshot) {
            return Ok(TickOutcome::Unchanged);
        }

        self.actuator
            .apply(snapshot.speed, snapshot.direction)
            .map_err(DeviceError::Output)?;
        self.applied = AppliedState {
            speed: snapshot.speed,
            direction: snapshot.direction,
        };
        log::debug!(
            "motor: {}% {}",
            snapshot.speed,
            snapshot.direction.as_str()
        );
        Ok(TickOutcome::Actuated)
    }

    /// The last applied speed and direction.
    #[inline]
    pub fn applied(&self) -> AppliedState {
        self.applied
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> DeviceState {
        self.state
    }

    /// Returns true once `reset` has succeeded.
    #[inline]
    pub fn is_ready(&self) -> bool {
        self.state == DeviceState::Ready
    }

    /// Borrow the underlying outputs.
    pub fn outputs(&self) -> &O {
        self.actuator.outputs()
    }

    /// Mutably borrow the underlying outputs.
    pub fn outputs_mut(&mut self) -> &mut O {
        self.actuator.outputs_mut()
    }
}
