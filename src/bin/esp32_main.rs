//! ESP32 wireless train controller.
//!
//! This is the main entry point for the onboard controller. Boot order is
//! fixed: peripherals are configured first (LEDC timers and channels, LED
//! pin, ADC), then the device is reset into its safe state, then the control
//! loop starts. Each loop iteration:
//! - Reads the remote command snapshot from the shared register block
//! - Samples the battery (once per minute) and reports it back
//! - Applies light and horn, then speed/direction when they changed
//!
//! The wireless transport owns the other handle to the register block and
//! is started separately.
//!
//! # Build
//!
//! ```bash
//! cargo build --release --features esp32 --bin esp32_main
//! espflash flash --monitor target/xtensa-esp32-espidf/release/esp32_main
//! ```

use esp_idf_hal::adc::oneshot::AdcDriver;
use esp_idf_hal::gpio::{Pin, PinDriver};
use esp_idf_hal::ledc::{config::TimerConfig, LedcDriver, LedcTimerDriver, Resolution};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_hal::prelude::*;
use rs_trainz_remote::hal::esp32::{Esp32BatteryInput, Esp32Clock, Esp32Outputs};
use rs_trainz_remote::{
    device_name, BatteryConfig, BatteryMonitor, Config, Device, DividerSensor, GpioPin,
    PinConfig, SharedRegisters, TrainController,
};
use std::thread;
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    // Initialize ESP-IDF
    esp_idf_hal::sys::link_patches();
    esp_idf_svc::log::EspLogger::initialize_default();

    println!();
    println!("================================");
    println!("  rs-trainz-remote Controller");
    println!("================================");
    println!();

    // =========================================================================
    // Configuration
    // =========================================================================
    // One-shot ADC on the ESP32 converts at 12 bits.
    let config = Config::default().with_battery(BatteryConfig::default().with_adc(3_300, 12));

    let peripherals = Peripherals::take()?;
    let board = peripherals.pins;

    // =========================================================================
    // Pin Check
    // =========================================================================
    let wired = PinConfig {
        led: gpio(&board.gpio16),
        motor_forward: gpio(&board.gpio18),
        motor_reverse: gpio(&board.gpio19),
        buzzer: gpio(&board.gpio4),
        battery_sense: gpio(&board.gpio34),
    };
    config.pins.check_wiring(&wired)?;
    let pins = &config.pins;

    // =========================================================================
    // PWM Timers
    // =========================================================================
    let resolution = ledc_resolution(config.pwm.resolution_bits)?;
    let motor_timer = LedcTimerDriver::new(
        peripherals.ledc.timer0,
        &TimerConfig::default()
            .frequency(config.pwm.motor_freq_hz.Hz())
            .resolution(resolution),
    )?;
    let buzzer_timer = LedcTimerDriver::new(
        peripherals.ledc.timer1,
        &TimerConfig::default()
            .frequency(config.pwm.buzzer_freq_hz.Hz())
            .resolution(resolution),
    )?;
    println!(
        "[OK] PWM timers (motor {} Hz, buzzer {} Hz, {}-bit)",
        config.pwm.motor_freq_hz, config.pwm.buzzer_freq_hz, config.pwm.resolution_bits
    );

    // =========================================================================
    // Outputs
    // =========================================================================
    let motor_fw = LedcDriver::new(peripherals.ledc.channel0, &motor_timer, board.gpio18)?;
    let motor_rw = LedcDriver::new(peripherals.ledc.channel1, &motor_timer, board.gpio19)?;
    let buzzer = LedcDriver::new(peripherals.ledc.channel3, &buzzer_timer, board.gpio4)?;
    let led = PinDriver::output(board.gpio16)?;
    let outputs = Esp32Outputs::new(&config, motor_fw, motor_rw, buzzer, led);
    println!(
        "[OK] Outputs initialized (motor GPIO{}/{}, buzzer GPIO{}, LED GPIO{})",
        pins.motor_forward.0, pins.motor_reverse.0, pins.buzzer.0, pins.led.0
    );

    // =========================================================================
    // Battery Sense (ADC1)
    // =========================================================================
    let adc1 = AdcDriver::new(peripherals.adc1)?;
    let battery_input = Esp32BatteryInput::new(&adc1, board.gpio34)?;
    let sensor = DividerSensor::new(battery_input, &config.battery);
    let battery = BatteryMonitor::new(sensor, Esp32Clock::new(), config.battery.sample_interval_ms);
    println!(
        "[OK] Battery sense initialized (GPIO{} ADC)",
        pins.battery_sense.0
    );

    // =========================================================================
    // Remote Register Block
    // =========================================================================
    // The BLE transport is a separate task holding a clone of this handle.
    let registers = SharedRegisters::new();
    let name = device_name(&config.device.name_prefix, read_mac()?);
    println!("[OK] Remote registers ready, device name '{}'", name);

    // =========================================================================
    // Reset to Safe State
    // =========================================================================
    let device = Device::new(outputs, &config);
    let mut controller = TrainController::new(device, registers, battery);
    controller
        .reset()
        .map_err(|e| anyhow::anyhow!("Device reset failed: {}", e))?;
    println!("[OK] Device reset");

    println!();
    println!(
        "Starting control loop ({}ms)...",
        config.device.loop_interval_ms
    );
    println!();

    // =========================================================================
    // Main Control Loop
    // =========================================================================
    let interval = Duration::from_millis(config.device.loop_interval_ms as u64);
    loop {
        if let Err(e) = controller.poll() {
            log::warn!("control loop: {}", e);
        }
        thread::sleep(interval);
    }
}

/// Board pin number as a config pin id.
fn gpio(pin: &impl Pin) -> GpioPin {
    GpioPin(pin.pin() as u8)
}

/// LEDC timer resolution for a configured bit width.
fn ledc_resolution(bits: u8) -> anyhow::Result<Resolution> {
    Ok(match bits {
        8 => Resolution::Bits8,
        10 => Resolution::Bits10,
        12 => Resolution::Bits12,
        other => anyhow::bail!("unsupported PWM resolution: {} bits", other),
    })
}

/// Factory-programmed base MAC address.
fn read_mac() -> anyhow::Result<[u8; 6]> {
    let mut mac = [0u8; 6];
    // SAFETY: `mac` is a valid 6-byte buffer for the duration of the call.
    let err = unsafe { esp_idf_hal::sys::esp_efuse_mac_get_default(mac.as_mut_ptr()) };
    esp_idf_hal::sys::esp!(err)?;
    Ok(mac)
}
