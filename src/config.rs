//! Board configuration: pins, PWM channels, battery calibration, device naming.
//!
//! Uses `heapless::String` for `no_std` compatibility while remaining
//! ergonomic to use on desktop with `std`. Defaults match the reference
//! board (ESP32 DevKit, L298-style H-bridge, 2S Li-ion pack through a
//! 16.2k/9.3k divider).
//!
//! # Example
//!
//! ```rust
//! use rs_trainz_remote::config::{BatteryConfig, Config, DeviceConfig};
//!
//! // Use defaults
//! let config = Config::default();
//! assert_eq!(config.battery.sample_interval_ms, 60_000);
//!
//! // Or customize
//! let config = Config::default()
//!     .with_battery(BatteryConfig::default().with_calibration(6000, 8400))
//!     .with_device(DeviceConfig::default().with_horn_duty(200));
//! ```

use core::fmt;

use crate::traits::{GpioPin, PwmChannel};
use heapless::String as HString;

/// Maximum length of the advertised device name in bytes.
///
/// The BLE stack takes the name as a 16-byte C string, so 15 bytes remain
/// for visible characters.
pub const MAX_NAME_LEN: usize = 15;

/// Type alias for the advertised device name.
pub type NameString = HString<MAX_NAME_LEN>;

/// Create a [`NameString`] from a `&str`, truncating at a char boundary if too long.
pub fn name_string(s: &str) -> NameString {
    let mut end = s.len().min(MAX_NAME_LEN);
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    let mut hs = NameString::new();
    // Cannot fail: `end` never exceeds the capacity.
    let _ = hs.push_str(&s[..end]);
    hs
}

// ============================================================================
// Main Config
// ============================================================================

/// Complete board configuration
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Config {
    /// GPIO assignments
    pub pins: PinConfig,
    /// PWM channel and timer settings
    pub pwm: PwmConfig,
    /// Battery sense calibration and sampling
    pub battery: BatteryConfig,
    /// Control loop and device identity
    pub device: DeviceConfig,
}

impl Config {
    /// Set pin configuration
    pub fn with_pins(mut self, pins: PinConfig) -> Self {
        self.pins = pins;
        self
    }

    /// Set PWM configuration
    pub fn with_pwm(mut self, pwm: PwmConfig) -> Self {
        self.pwm = pwm;
        self
    }

    /// Set battery configuration
    pub fn with_battery(mut self, battery: BatteryConfig) -> Self {
        self.battery = battery;
        self
    }

    /// Set device configuration
    pub fn with_device(mut self, device: DeviceConfig) -> Self {
        self.device = device;
        self
    }
}

// ============================================================================
// Pin Config
// ============================================================================

/// GPIO assignments
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PinConfig {
    /// Headlight LED (digital output)
    pub led: GpioPin,
    /// Motor forward input of the H-bridge
    pub motor_forward: GpioPin,
    /// Motor reverse input of the H-bridge
    pub motor_reverse: GpioPin,
    /// Piezo buzzer
    pub buzzer: GpioPin,
    /// Battery divider tap (ADC input)
    pub battery_sense: GpioPin,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            led: GpioPin(16),
            motor_forward: GpioPin(18),
            motor_reverse: GpioPin(19),
            buzzer: GpioPin(4),
            battery_sense: GpioPin(34),
        }
    }
}

impl PinConfig {
    /// Set the LED pin
    pub fn with_led(mut self, pin: u8) -> Self {
        self.led = GpioPin(pin);
        self
    }

    /// Set the motor forward/reverse pins
    pub fn with_motor(mut self, forward: u8, reverse: u8) -> Self {
        self.motor_forward = GpioPin(forward);
        self.motor_reverse = GpioPin(reverse);
        self
    }

    /// Set the buzzer pin
    pub fn with_buzzer(mut self, pin: u8) -> Self {
        self.buzzer = GpioPin(pin);
        self
    }

    /// Set the battery sense pin
    pub fn with_battery_sense(mut self, pin: u8) -> Self {
        self.battery_sense = GpioPin(pin);
        self
    }

    /// Compare against the pins the firmware actually wired up.
    ///
    /// Returns the first role whose configured pin differs.
    pub fn check_wiring(&self, wired: &PinConfig) -> Result<(), PinMismatch> {
        let roles = [
            ("led", self.led, wired.led),
            ("motor forward", self.motor_forward, wired.motor_forward),
            ("motor reverse", self.motor_reverse, wired.motor_reverse),
            ("buzzer", self.buzzer, wired.buzzer),
            ("battery sense", self.battery_sense, wired.battery_sense),
        ];
        match roles.into_iter().find(|(_, configured, wired)| configured != wired) {
            Some((role, configured, wired)) => Err(PinMismatch {
                role,
                configured,
                wired,
            }),
            None => Ok(()),
        }
    }
}

/// A configured pin that disagrees with the board wiring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinMismatch {
    /// Which output or input
    pub role: &'static str,
    /// Pin named in the configuration
    pub configured: GpioPin,
    /// Pin the firmware drives
    pub wired: GpioPin,
}

impl fmt::Display for PinMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} configured on GPIO{} but wired to GPIO{}",
            self.role, self.configured.0, self.wired.0
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PinMismatch {}

// ============================================================================
// PWM Config
// ============================================================================

/// PWM channel assignments and timer settings
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PwmConfig {
    /// Channel driving the forward motor input
    pub motor_forward: PwmChannel,
    /// Channel driving the reverse motor input
    pub motor_reverse: PwmChannel,
    /// Channel driving the buzzer
    pub buzzer: PwmChannel,
    /// Motor PWM frequency in Hz
    pub motor_freq_hz: u32,
    /// Buzzer PWM frequency in Hz (sets the horn pitch)
    pub buzzer_freq_hz: u32,
    /// Duty resolution in bits (8 = 256 steps)
    pub resolution_bits: u8,
}

impl Default for PwmConfig {
    fn default() -> Self {
        Self {
            motor_forward: PwmChannel(0),
            motor_reverse: PwmChannel(1),
            buzzer: PwmChannel(3),
            motor_freq_hz: 1_000,
            buzzer_freq_hz: 500,
            resolution_bits: 8,
        }
    }
}

impl PwmConfig {
    /// Set the motor channels
    pub fn with_motor_channels(mut self, forward: u8, reverse: u8) -> Self {
        self.motor_forward = PwmChannel(forward);
        self.motor_reverse = PwmChannel(reverse);
        self
    }

    /// Set the buzzer channel
    pub fn with_buzzer_channel(mut self, channel: u8) -> Self {
        self.buzzer = PwmChannel(channel);
        self
    }

    /// Set the motor PWM frequency
    pub fn with_motor_freq_hz(mut self, hz: u32) -> Self {
        self.motor_freq_hz = hz;
        self
    }

    /// Set the buzzer PWM frequency
    pub fn with_buzzer_freq_hz(mut self, hz: u32) -> Self {
        self.buzzer_freq_hz = hz;
        self
    }

    /// Set the PWM timer resolution
    pub fn with_resolution_bits(mut self, bits: u8) -> Self {
        self.resolution_bits = bits;
        self
    }
}

// ============================================================================
// Battery Config
// ============================================================================

/// Battery sense calibration and sampling schedule
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatteryConfig {
    /// Pack voltage reported as 0% (millivolts)
    pub empty_mv: u32,
    /// Pack voltage reported as 100% (millivolts)
    pub full_mv: u32,
    /// ADC reference voltage (millivolts)
    pub reference_mv: u32,
    /// ADC resolution in bits
    pub adc_bits: u8,
    /// Voltage divider ratio, `(R1 + R2) / R2`
    pub divider_ratio: f32,
    /// Minimum time between two real measurements (milliseconds)
    pub sample_interval_ms: u64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            empty_mv: 5_400,
            full_mv: 9_000,
            reference_mv: 3_300,
            adc_bits: 10,
            divider_ratio: divider_ratio(16.2, 9.3),
            sample_interval_ms: 60_000,
        }
    }
}

impl BatteryConfig {
    /// Set the empty/full calibration points
    pub fn with_calibration(mut self, empty_mv: u32, full_mv: u32) -> Self {
        self.empty_mv = empty_mv;
        self.full_mv = full_mv;
        self
    }

    /// Set the ADC reference voltage and resolution
    pub fn with_adc(mut self, reference_mv: u32, bits: u8) -> Self {
        self.reference_mv = reference_mv;
        self.adc_bits = bits;
        self
    }

    /// Set the divider ratio from the resistor values
    pub fn with_divider(mut self, r1: f32, r2: f32) -> Self {
        self.divider_ratio = divider_ratio(r1, r2);
        self
    }

    /// Set the sampling interval
    pub fn with_sample_interval_ms(mut self, ms: u64) -> Self {
        self.sample_interval_ms = ms;
        self
    }

    /// Full-scale ADC count (`2^bits`)
    pub fn adc_full_scale(&self) -> u32 {
        1u32 << self.adc_bits.min(16)
    }
}

/// Ratio of a two-resistor divider, `(R1 + R2) / R2`, where the ADC taps
/// across R2.
pub fn divider_ratio(r1: f32, r2: f32) -> f32 {
    (r1 + r2) / r2
}

// ============================================================================
// Device Config
// ============================================================================

/// Control loop and device identity
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DeviceConfig {
    /// Prefix of the advertised name ("Train" -> "Train-AB:CD")
    pub name_prefix: NameString,
    /// Buzzer duty while the horn is held
    pub horn_duty: u8,
    /// Control loop period in milliseconds
    pub loop_interval_ms: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            name_prefix: name_string("Train"),
            horn_duty: 127,
            loop_interval_ms: 20,
        }
    }
}

impl DeviceConfig {
    /// Set the name prefix
    pub fn with_name_prefix(mut self, prefix: &str) -> Self {
        self.name_prefix = name_string(prefix);
        self
    }

    /// Set the horn duty
    pub fn with_horn_duty(mut self, duty: u8) -> Self {
        self.horn_duty = duty;
        self
    }

    /// Set the control loop period
    pub fn with_loop_interval_ms(mut self, ms: u32) -> Self {
        self.loop_interval_ms = ms;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
