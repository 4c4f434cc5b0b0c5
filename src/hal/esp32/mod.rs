//! ESP32 hardware abstraction layer for the wireless train controller.
//!
//! This module provides hardware implementations for an ESP32 DevKit
//! driving a small DC locomotive through a dual-input H-bridge.
//!
//! # Hardware Configuration
//!
//! - **MCU**: ESP32 (Xtensa dual core, BLE)
//! - **Motor Driver**: dual PWM input H-bridge (one input per direction)
//! - **Battery**: 2S Li-ion through a 16.2k/9.3k divider
//! - **Extras**: headlight LED, piezo buzzer
//!
//! # Pin Assignments
//!
//! Defaults live in [`PinConfig`](crate::config::PinConfig); the firmware
//! checks the configuration against the pins it wires at boot.

mod battery;
mod clock;
mod outputs;

pub use battery::Esp32BatteryInput;
pub use clock::Esp32Clock;
pub use outputs::{Esp32OutputError, Esp32Outputs};
