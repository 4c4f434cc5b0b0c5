//! Scheduler-facing controller that ties everything together.
//!
//! [`TrainController`] owns the command source, the battery monitor and the
//! device state machine, and runs one control iteration per
//! [`poll`](TrainController::poll) in a fixed order:
//!
//! 1. read the command snapshot
//! 2. sample the battery (throttled)
//! 3. write the battery percentage into the report
//! 4. apply light and horn, then speed/direction on change
//!
//! # Example
//!
//! ```rust
//! use rs_trainz_remote::{CommandSnapshot, Device, Direction, TrainController};
//! use rs_trainz_remote::battery::{BatteryMonitor, BatteryReading};
//! use rs_trainz_remote::config::Config;
//! use rs_trainz_remote::hal::{MockBattery, MockClock, MockOutputs, MockRemote};
//!
//! let config = Config::default();
//! let clock = MockClock::new();
//! let battery = BatteryMonitor::new(
//!     MockBattery::new(BatteryReading::new(88, 8_568)),
//!     clock.clone(),
//!     config.battery.sample_interval_ms,
//! );
//! let device = Device::new(MockOutputs::new(), &config);
//! let mut controller = TrainController::new(device, MockRemote::new(), battery);
//!
//! controller.reset().unwrap();
//!
//! controller.source_mut().push(CommandSnapshot::new(50, Direction::Forward));
//! controller.poll().unwrap();
//!
//! assert_eq!(controller.source().report().battery_percentage, 88);
//! assert_eq!(controller.device().outputs().duty(config.pwm.motor_forward), 128);
//! ```

use crate::battery::{BatteryMonitor, BatteryReading};
use crate::device::{AppliedState, Device, DeviceError, TickOutcome};
use crate::traits::{BatterySensor, Clock, CommandSource, Outputs};

/// One control loop over a command source, battery monitor and device.
pub struct TrainController<O, S, B, C>
where
    O: Outputs,
    S: CommandSource,
    B: BatterySensor,
    C: Clock,
{
    device: Device<O>,
    source: S,
    battery: BatteryMonitor<B, C>,
    connected: bool,
}

impl<O, S, B, C> TrainController<O, S, B, C>
where
    O: Outputs,
    S: CommandSource,
    B: BatterySensor,
    C: Clock,
{
    /// Assemble a controller. Call [`reset`](Self::reset) before polling.
    pub fn new(device: Device<O>, source: S, battery: BatteryMonitor<B, C>) -> Self {
        Self {
            device,
            source,
            battery,
            connected: false,
        }
    }

    /// Clear the remote input fields and put the device in its safe state.
    ///
    /// Clearing the inputs first keeps a stale remote value from being
    /// applied on the first poll.
    pub fn reset(&mut self) -> Result<(), DeviceError<O::Error>> {
        self.source.clear_inputs();
        self.device.reset()
    }

    /// Run one control iteration.
    pub fn poll(&mut self) -> Result<TickOutcome, DeviceError<O::Error>> {
        let snapshot = self.source.read();

        let reading = self.battery.sample();
        self.source.write_report(reading.report_value());

        let connected = self.source.is_connected();
        if connected != self.connected {
            if connected {
                log::info!("remote connected");
            } else {
                log::info!("remote disconnected");
            }
            self.connected = connected;
        }

        self.device.tick(snapshot)
    }

    /// Last applied speed and direction.
    pub fn applied(&self) -> AppliedState {
        self.device.applied()
    }

    /// Last battery measurement, if any.
    pub fn battery_reading(&self) -> Option<BatteryReading> {
        self.battery.last_reading()
    }

    /// Borrow the device.
    pub fn device(&self) -> &Device<O> {
        &self.device
    }

    /// Mutably borrow the device.
    pub fn device_mut(&mut self) -> &mut Device<O> {
        &mut self.device
    }

    /// Borrow the command source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutably borrow the command source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Mutably borrow the battery monitor.
    pub fn battery_mut(&mut self) -> &mut BatteryMonitor<B, C> {
        &mut self.battery
    }
}
