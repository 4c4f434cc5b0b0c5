//! Battery level monitoring with a throttled sampling schedule.
//!
//! Two layers:
//!
//! - [`DividerSensor`] turns raw ADC counts from a resistor-divider tap into
//!   pack millivolts and a charge percentage (two-point linear calibration).
//! - [`BatteryMonitor`] wraps any [`BatterySensor`] and only re-measures once
//!   the sampling interval has elapsed, returning the cached reading
//!   otherwise.
//!
//! # Example
//!
//! ```rust
//! use rs_trainz_remote::battery::{BatteryMonitor, DividerSensor};
//! use rs_trainz_remote::config::BatteryConfig;
//! use rs_trainz_remote::hal::{MockAnalog, MockClock};
//!
//! let clock = MockClock::new();
//! let config = BatteryConfig::default().with_divider(20.0, 10.0);
//! let sensor = DividerSensor::new(MockAnalog::new(700), &config);
//! let mut monitor = BatteryMonitor::new(sensor, clock.clone(), config.sample_interval_ms);
//!
//! let first = monitor.sample();
//! clock.advance(1_000);
//! assert_eq!(monitor.sample(), first); // still cached
//! ```

use crate::config::BatteryConfig;
use crate::traits::{AnalogInput, BatterySensor, Clock};

/// One battery measurement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BatteryReading {
    /// Charge estimate, 0 to 100.
    pub percentage: u8,
    /// Pack voltage in millivolts.
    pub voltage_mv: u32,
}

impl BatteryReading {
    /// Create a reading.
    pub const fn new(percentage: u8, voltage_mv: u32) -> Self {
        Self {
            percentage,
            voltage_mv,
        }
    }

    /// Percentage as the signed register value shown on the remote gauge.
    #[inline]
    pub fn report_value(&self) -> i8 {
        self.percentage.min(100) as i8
    }
}

/// Linear two-point charge estimate.
///
/// At or below `empty_mv` reads 0, at or above `full_mv` reads 100, and
/// in between scales linearly (integer division, rounds down).
///
/// # Examples
///
/// ```
/// use rs_trainz_remote::battery::linear_level;
///
/// assert_eq!(linear_level(5_000, 5_400, 9_000), 0);
/// assert_eq!(linear_level(7_200, 5_400, 9_000), 50);
/// assert_eq!(linear_level(9_500, 5_400, 9_000), 100);
/// ```
pub fn linear_level(voltage_mv: u32, empty_mv: u32, full_mv: u32) -> u8 {
    if voltage_mv <= empty_mv {
        0
    } else if voltage_mv >= full_mv {
        100
    } else {
        ((voltage_mv - empty_mv) as u64 * 100 / (full_mv - empty_mv) as u64) as u8
    }
}

/// Battery sensor reading a resistor-divider tap through an ADC channel.
///
/// Conversion: `counts * reference_mv / 2^bits` gives the tap voltage,
/// multiplied by the divider ratio gives the pack voltage, truncated to
/// whole millivolts.
pub struct DividerSensor<A: AnalogInput> {
    input: A,
    empty_mv: u32,
    full_mv: u32,
    reference_mv: u32,
    full_scale: u32,
    divider_ratio: f32,
}

impl<A: AnalogInput> DividerSensor<A> {
    /// Create a sensor from an ADC channel and the battery calibration.
    pub fn new(input: A, config: &BatteryConfig) -> Self {
        Self {
            input,
            empty_mv: config.empty_mv,
            full_mv: config.full_mv,
            reference_mv: config.reference_mv,
            full_scale: config.adc_full_scale(),
            divider_ratio: config.divider_ratio,
        }
    }

    /// Convert raw ADC counts to pack millivolts.
    pub fn counts_to_mv(&self, counts: u16) -> u32 {
        let tap_scaled = counts as u32 as f32 * self.reference_mv as f32;
        (tap_scaled * self.divider_ratio / self.full_scale as f32) as u32
    }

    /// Access the underlying analog input.
    pub fn input_mut(&mut self) -> &mut A {
        &mut self.input
    }
}

impl<A: AnalogInput> BatterySensor for DividerSensor<A> {
    fn read_battery(&mut self) -> BatteryReading {
        let counts = self.input.read_raw();
        let voltage_mv = self.counts_to_mv(counts);
        BatteryReading {
            percentage: linear_level(voltage_mv, self.empty_mv, self.full_mv),
            voltage_mv,
        }
    }
}

/// Throttled battery monitor.
///
/// The first [`sample`](Self::sample) always measures. Later calls measure
/// again only when at least `interval_ms` has passed since the last
/// measurement.
pub struct BatteryMonitor<S: BatterySensor, C: Clock> {
    sensor: S,
    clock: C,
    interval_ms: u64,
    last: Option<(u64, BatteryReading)>,
}

impl<S: BatterySensor, C: Clock> BatteryMonitor<S, C> {
    /// Create a monitor. Nothing is measured until the first `sample()`.
    pub fn new(sensor: S, clock: C, interval_ms: u64) -> Self {
        Self {
            sensor,
            clock,
            interval_ms,
            last: None,
        }
    }

    /// Return the current reading, measuring only if the interval elapsed.
    pub fn sample(&mut self) -> BatteryReading {
        let now = self.clock.now_ms();
        match self.last {
            Some((at, reading)) if now.saturating_sub(at) < self.interval_ms => reading,
            _ => self.measure(now),
        }
    }

    /// Measure now regardless of the interval.
    pub fn force_sample(&mut self) -> BatteryReading {
        let now = self.clock.now_ms();
        self.measure(now)
    }

    /// Last measured reading without measuring.
    pub fn last_reading(&self) -> Option<BatteryReading> {
        self.last.map(|(_, reading)| reading)
    }

    /// Sampling interval in milliseconds.
    pub fn interval_ms(&self) -> u64 {
        self.interval_ms
    }

    /// Access the wrapped sensor.
    pub fn sensor_mut(&mut self) -> &mut S {
        &mut self.sensor
    }

    fn measure(&mut self, now: u64) -> BatteryReading {
        let reading = self.sensor.read_battery();
        log::debug!(
            "battery voltage is {}mV ({}%)",
            reading.voltage_mv,
            reading.percentage
        );
        self.last = Some((now, reading));
        reading
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hal::{MockAnalog, MockBattery, MockClock};

    fn config_div3() -> BatteryConfig {
        // ratio 3.0, 3300 mV reference, 10-bit
        BatteryConfig::default().with_divider(20.0, 10.0)
    }

    // =========================================================================
    // linear_level
    // =========================================================================

    #[test]
    fn level_clamps_at_calibration_points() {
        assert_eq!(linear_level(0, 5_400, 9_000), 0);
        assert_eq!(linear_level(5_400, 5_400, 9_000), 0);
        assert_eq!(linear_level(9_000, 5_400, 9_000), 100);
        assert_eq!(linear_level(u32::MAX, 5_400, 9_000), 100);
    }

    #[test]
    fn level_scales_linearly() {
        assert_eq!(linear_level(6_300, 5_400, 9_000), 25);
        assert_eq!(linear_level(8_100, 5_400, 9_000), 75);
        // rounds down
        assert_eq!(linear_level(5_435, 5_400, 9_000), 0);
        assert_eq!(linear_level(5_436, 5_400, 9_000), 1);
    }

    #[test]
    fn level_with_inverted_calibration_does_not_panic() {
        assert_eq!(linear_level(5_000, 9_000, 5_400), 0);
        assert_eq!(linear_level(9_500, 9_000, 5_400), 100);
    }

    // =========================================================================
    // DividerSensor
    // =========================================================================

    #[test]
    fn divider_sensor_converts_counts() {
        let sensor = DividerSensor::new(MockAnalog::new(0), &config_div3());
        assert_eq!(sensor.counts_to_mv(0), 0);
        // 512 / 1024 * 3300 = 1650 mV at the tap, x3 = 4950 mV
        assert_eq!(sensor.counts_to_mv(512), 4_950);
        // 1024 counts would be full reference
        assert_eq!(sensor.counts_to_mv(1_024), 9_900);
    }

    #[test]
    fn divider_sensor_reports_percentage() {
        let mut sensor = DividerSensor::new(MockAnalog::new(768), &config_div3());
        // 768 / 1024 * 3300 * 3 = 7425 mV -> (7425 - 5400) * 100 / 3600 = 56
        let reading = sensor.read_battery();
        assert_eq!(reading.voltage_mv, 7_425);
        assert_eq!(reading.percentage, 56);
    }

    #[test]
    fn divider_sensor_failed_read_is_empty() {
        let mut sensor = DividerSensor::new(MockAnalog::new(0), &config_div3());
        assert_eq!(sensor.read_battery(), BatteryReading::new(0, 0));
    }

    #[test]
    fn divider_sensor_default_ratio() {
        let sensor = DividerSensor::new(MockAnalog::new(0), &BatteryConfig::default());
        // 512 counts -> 1650 mV tap * 2.7419 = 4524.19
        assert_eq!(sensor.counts_to_mv(512), 4_524);
    }

    // =========================================================================
    // BatteryMonitor throttling
    // =========================================================================

    #[test]
    fn first_sample_measures() {
        let clock = MockClock::new();
        let battery = MockBattery::new(BatteryReading::new(80, 8_280));
        let mut monitor = BatteryMonitor::new(battery, clock, 60_000);

        assert_eq!(monitor.last_reading(), None);
        assert_eq!(monitor.sample(), BatteryReading::new(80, 8_280));
        assert_eq!(monitor.sensor_mut().read_count, 1);
    }

    #[test]
    fn samples_within_interval_are_cached() {
        let clock = MockClock::new();
        let battery = MockBattery::new(BatteryReading::new(80, 8_280));
        let mut monitor = BatteryMonitor::new(battery, clock.clone(), 60_000);

        let first = monitor.sample();
        monitor.sensor_mut().set(BatteryReading::new(10, 5_760));

        for _ in 0..10 {
            clock.advance(5_000);
            assert_eq!(monitor.sample(), first);
        }
        // t = 50s
        assert_eq!(monitor.sensor_mut().read_count, 1);
    }

    #[test]
    fn sample_after_interval_measures_again() {
        let clock = MockClock::new();
        let battery = MockBattery::new(BatteryReading::new(80, 8_280));
        let mut monitor = BatteryMonitor::new(battery, clock.clone(), 60_000);

        monitor.sample();
        monitor.sensor_mut().set(BatteryReading::new(79, 8_244));

        clock.advance(59_999);
        assert_eq!(monitor.sample().percentage, 80);

        clock.advance(1);
        assert_eq!(monitor.sample().percentage, 79);
        assert_eq!(monitor.sensor_mut().read_count, 2);

        // interval restarts from the new measurement
        clock.advance(30_000);
        monitor.sensor_mut().set(BatteryReading::new(50, 7_200));
        assert_eq!(monitor.sample().percentage, 79);
    }

    #[test]
    fn force_sample_bypasses_interval() {
        let clock = MockClock::new();
        let battery = MockBattery::new(BatteryReading::new(80, 8_280));
        let mut monitor = BatteryMonitor::new(battery, clock.clone(), 60_000);

        monitor.sample();
        monitor.sensor_mut().set(BatteryReading::new(42, 6_912));
        assert_eq!(monitor.force_sample().percentage, 42);
        assert_eq!(monitor.last_reading(), Some(BatteryReading::new(42, 6_912)));
    }

    #[test]
    fn zero_interval_measures_every_call() {
        let clock = MockClock::new();
        let battery = MockBattery::new(BatteryReading::new(80, 8_280));
        let mut monitor = BatteryMonitor::new(battery, clock, 0);

        monitor.sample();
        monitor.sample();
        monitor.sample();
        assert_eq!(monitor.sensor_mut().read_count, 3);
    }

    #[test]
    fn report_value_is_bounded() {
        assert_eq!(BatteryReading::new(100, 0).report_value(), 100);
        assert_eq!(BatteryReading::new(255, 0).report_value(), 100);
        assert_eq!(BatteryReading::new(0, 0).report_value(), 0);
    }
}
