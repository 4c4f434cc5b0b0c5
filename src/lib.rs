//! # rs-trainz-remote
//!
//! Onboard control loop for a battery-powered model train driven from a
//! phone over a wireless link.
//!
//! ## Features
//!
//! - **Hardware abstraction**: Traits for PWM/digital outputs, ADC input, battery sensing, and time
//! - **Change-only motor writes**: Identical commands never reconfigure the motor PWM
//! - **H-bridge safety**: At most one motor direction channel is ever driven
//! - **Throttled battery sampling**: Cached percentage/voltage, re-measured once per interval
//! - **Transport-agnostic**: Any transport exposing the remote register block can drive it
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `traits` - Hardware and command source abstractions
//! - `commands` - Command snapshot and report types
//! - `actuation` - Speed/direction to duty cycle mapping
//! - `battery` - Battery sensing and throttled monitor
//! - `device` - Applied-state tracking, reset, and tick
//! - `controller` - One control iteration over source, battery, and device
//! - `remote` - Register block adapter and device naming
//! - `hal` - Concrete implementations (mock for testing, esp32 for hardware)
//!
//! ## Example
//!
//! ```rust
//! use rs_trainz_remote::{CommandSnapshot, Device, Direction, TickOutcome};
//! use rs_trainz_remote::config::Config;
//! use rs_trainz_remote::hal::MockOutputs;
//!
//! let config = Config::default();
//! let mut device = Device::new(MockOutputs::new(), &config);
//!
//! // Peripherals are configured; enter the safe state
//! device.reset().unwrap();
//!
//! // Forward at half speed
//! let cmd = CommandSnapshot::new(50, Direction::Forward).with_light(true);
//! assert_eq!(device.tick(cmd).unwrap(), TickOutcome::Actuated);
//!
//! // Same command again: light/horn rewritten, motor untouched
//! assert_eq!(device.tick(cmd).unwrap(), TickOutcome::Unchanged);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![warn(missing_docs)]

extern crate alloc;

/// Speed/direction, light and horn mapping onto peripheral outputs.
pub mod actuation;
/// Battery sensing and throttled sampling.
pub mod battery;
/// Command snapshot and outbound report types.
pub mod commands;
/// Board configuration: pins, PWM, battery calibration, device naming.
pub mod config;
/// Control loop over command source, battery monitor and device.
pub mod controller;
/// Device state machine.
pub mod device;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Register block adapter for the wireless transport.
pub mod remote;
/// Core traits for hardware and command source abstraction.
pub mod traits;

// Re-exports for convenience
pub use actuation::{motor_duties, speed_to_duty, Actuator, MotorDuties};
pub use battery::{BatteryMonitor, BatteryReading, DividerSensor};
pub use commands::{CommandSnapshot, OutboundReport};
pub use controller::TrainController;
pub use device::{AppliedState, Device, DeviceError, DeviceState, TickOutcome};
pub use remote::{device_name, RegisterBlock};
pub use traits::{
    AnalogInput, BatterySensor, Clock, CommandSource, Direction, GpioPin, Outputs, PwmChannel,
};

#[cfg(feature = "std")]
pub use remote::SharedRegisters;

// Config re-exports
pub use config::{BatteryConfig, Config, DeviceConfig, PinConfig, PinMismatch, PwmConfig};
