//! Motor, buzzer and headlight outputs using ESP32 LEDC PWM and GPIO.
//!
//! The H-bridge is controlled via two PWM signals:
//! - Forward input (GPIO18, LEDC channel 0)
//! - Reverse input (GPIO19, LEDC channel 1)
//!
//! The piezo buzzer sits on its own LEDC timer (GPIO4, channel 3) so the
//! horn pitch is independent of the motor PWM frequency. The headlight LED
//! is a plain push-pull output (GPIO16).

use crate::config::Config;
use crate::traits::{GpioPin, Outputs, PwmChannel};
use embedded_hal::digital::{Error as _, ErrorKind, OutputPin, PinState};
use esp_idf_hal::ledc::LedcDriver;
use esp_idf_hal::sys::EspError;

/// Errors from [`Esp32Outputs`].
#[derive(Debug)]
pub enum Esp32OutputError {
    /// The LEDC driver rejected the write.
    Esp(EspError),
    /// The GPIO driver rejected the write.
    Gpio(ErrorKind),
    /// No driver is attached to this PWM channel.
    UnknownChannel(PwmChannel),
    /// No driver is attached to this pin.
    UnknownPin(GpioPin),
}

impl From<EspError> for Esp32OutputError {
    fn from(e: EspError) -> Self {
        Esp32OutputError::Esp(e)
    }
}

/// Board outputs for the ESP32 train controller.
///
/// Takes drivers that are already configured: LEDC timers and channels
/// attached to their pins, LED pin set to output. Building the drivers is
/// the boot sequence's job and must happen before the device reset.
///
/// # Example
///
/// ```ignore
/// use rs_trainz_remote::hal::esp32::Esp32Outputs;
///
/// let outputs = Esp32Outputs::new(&config, motor_fw, motor_rw, buzzer, led);
/// let mut device = Device::new(outputs, &config);
/// device.reset()?;
/// ```
pub struct Esp32Outputs<'d, L: OutputPin> {
    motor_forward: (PwmChannel, LedcDriver<'d>),
    motor_reverse: (PwmChannel, LedcDriver<'d>),
    buzzer: (PwmChannel, LedcDriver<'d>),
    led: (GpioPin, L),
}

impl<'d, L: OutputPin> Esp32Outputs<'d, L> {
    /// Wrap configured drivers, tagging them with the channel/pin ids of `config`.
    pub fn new(
        config: &Config,
        motor_forward: LedcDriver<'d>,
        motor_reverse: LedcDriver<'d>,
        buzzer: LedcDriver<'d>,
        led: L,
    ) -> Self {
        Self {
            motor_forward: (config.pwm.motor_forward, motor_forward),
            motor_reverse: (config.pwm.motor_reverse, motor_reverse),
            buzzer: (config.pwm.buzzer, buzzer),
            led: (config.pins.led, led),
        }
    }

    fn driver(&mut self, channel: PwmChannel) -> Option<&mut LedcDriver<'d>> {
        [
            &mut self.motor_forward,
            &mut self.motor_reverse,
            &mut self.buzzer,
        ]
        .into_iter()
        .find(|(id, _)| *id == channel)
        .map(|(_, driver)| driver)
    }
}

/// Scale an 8-bit duty to the driver's resolution.
fn scale_duty(duty: u8, max_duty: u32) -> u32 {
    duty as u32 * max_duty / 255
}

impl<L: OutputPin> Outputs for Esp32Outputs<'_, L> {
    type Error = Esp32OutputError;

    fn set_pwm_duty(&mut self, channel: PwmChannel, duty: u8) -> Result<(), Self::Error> {
        let driver = self
            .driver(channel)
            .ok_or(Esp32OutputError::UnknownChannel(channel))?;
        let scaled = scale_duty(duty, driver.get_max_duty());
        driver.set_duty(scaled)?;
        Ok(())
    }

    fn set_digital(&mut self, pin: GpioPin, level: bool) -> Result<(), Self::Error> {
        let (id, led) = &mut self.led;
        if *id != pin {
            return Err(Esp32OutputError::UnknownPin(pin));
        }
        led.set_state(PinState::from(level))
            .map_err(|e| Esp32OutputError::Gpio(e.kind()))
    }
}
