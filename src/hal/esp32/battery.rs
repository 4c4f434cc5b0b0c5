//! Battery divider tap read through the ESP32 one-shot ADC.
//!
//! The pack voltage reaches GPIO34 (ADC1 channel 6) through a 16.2k/9.3k
//! divider. GPIO34 is input-only and on ADC1, so it keeps working while the
//! radio is active (ADC2 does not).

use crate::traits::AnalogInput;
use esp_idf_hal::adc::attenuation::DB_11;
use esp_idf_hal::adc::oneshot::config::AdcChannelConfig;
use esp_idf_hal::adc::oneshot::{AdcChannelDriver, AdcDriver};
use esp_idf_hal::adc::ADC1;
use esp_idf_hal::gpio::Gpio34;
use esp_idf_hal::peripheral::Peripheral;

/// Battery sense input on GPIO34.
///
/// # Example
///
/// ```ignore
/// use rs_trainz_remote::battery::DividerSensor;
/// use rs_trainz_remote::hal::esp32::Esp32BatteryInput;
///
/// let adc1 = AdcDriver::new(peripherals.adc1)?;
/// let input = Esp32BatteryInput::new(&adc1, peripherals.pins.gpio34)?;
/// let sensor = DividerSensor::new(input, &config.battery);
/// ```
pub struct Esp32BatteryInput<'d> {
    channel: AdcChannelDriver<'d, Gpio34, &'d AdcDriver<'d, ADC1>>,
}

impl<'d> Esp32BatteryInput<'d> {
    /// Creates the ADC channel with 11 dB attenuation (full 0-3.3V range).
    ///
    /// # Errors
    ///
    /// Returns an error if ADC channel initialization fails.
    pub fn new(
        adc: &'d AdcDriver<'d, ADC1>,
        pin: impl Peripheral<P = Gpio34> + 'd,
    ) -> Result<Self, esp_idf_hal::sys::EspError> {
        let config = AdcChannelConfig {
            attenuation: DB_11,
            ..Default::default()
        };
        let channel = AdcChannelDriver::new(adc, pin, &config)?;
        Ok(Self { channel })
    }
}

impl AnalogInput for Esp32BatteryInput<'_> {
    fn read_raw(&mut self) -> u16 {
        // A failed conversion reads as an empty battery for this interval.
        self.channel.read_raw().unwrap_or(0)
    }
}
