//! Trait definitions for hardware abstraction and the wireless command source.
//!
//! This module defines the core abstractions that allow the control loop to:
//! - Run on different hardware (ESP32, desktop mock)
//! - Be driven by any transport that exposes the remote register block
//!
//! # Submodules
//!
//! - `hardware`: PWM/digital outputs, analog input, battery sensing, clock
//! - `remote`: Command snapshot source and battery report sink
//!
//! # Hardware Abstraction
//!
//! - [`Outputs`]: PWM duty cycles and digital levels
//! - [`AnalogInput`]: Raw ADC counts
//! - [`BatterySensor`]: Percentage and millivolts
//! - [`Clock`]: Time source for `no_std` environments

pub mod hardware;
pub mod remote;

pub use hardware::*;
pub use remote::*;
