//! Property tests for the device state machine and battery throttle.
//!
//! Host only; proptest does not build for the ESP-IDF target.

#![cfg(not(target_os = "espidf"))]

use proptest::collection::vec;
use proptest::prelude::*;
use rs_trainz_remote::{
    battery::BatteryMonitor,
    config::Config,
    hal::{MockBattery, MockClock, MockOutputs},
    AppliedState, BatteryReading, CommandSnapshot, Device, Direction, TickOutcome,
};

fn ready_device() -> (Device<MockOutputs>, Config) {
    let config = Config::default();
    let mut device = Device::new(MockOutputs::new(), &config);
    device.reset().unwrap();
    (device, config)
}

fn arb_direction() -> impl Strategy<Value = Direction> {
    prop_oneof![Just(Direction::Forward), Just(Direction::Reverse)]
}

/// Snapshots drawn from a small speed set so repeats are common, plus the
/// full `i8` range now and then.
fn arb_snapshot() -> impl Strategy<Value = CommandSnapshot> {
    let speed = prop_oneof![
        4 => prop::sample::select(vec![0i8, 25, 50, 100]),
        1 => any::<i8>(),
    ];
    (speed, arb_direction(), any::<bool>(), any::<bool>()).prop_map(
        |(speed, direction, light, horn)| {
            CommandSnapshot::new(speed, direction)
                .with_light(light)
                .with_horn(horn)
        },
    )
}

// ── Device state machine ──────────────────────────────────────

proptest! {
    /// After every tick the applied state is the latest snapshot's motion.
    #[test]
    fn applied_state_tracks_latest_snapshot(cmds in vec(arb_snapshot(), 1..=64)) {
        let (mut device, _) = ready_device();

        for cmd in cmds {
            device.tick(cmd).unwrap();
            prop_assert_eq!(
                device.applied(),
                AppliedState { speed: cmd.speed, direction: cmd.direction }
            );
        }
    }

    /// The motor is written exactly when (speed, direction) changes.
    #[test]
    fn motor_actuates_exactly_on_change(cmds in vec(arb_snapshot(), 1..=64)) {
        let (mut device, config) = ready_device();
        let mut previous = AppliedState::SAFE;

        for cmd in cmds {
            device.outputs_mut().clear_events();
            let outcome = device.tick(cmd).unwrap();
            let motor_writes = device.outputs().pwm_writes(config.pwm.motor_forward)
                + device.outputs().pwm_writes(config.pwm.motor_reverse);

            if previous.differs_from(&cmd) {
                prop_assert_eq!(outcome, TickOutcome::Actuated);
                prop_assert_eq!(motor_writes, 2);
            } else {
                prop_assert_eq!(outcome, TickOutcome::Unchanged);
                prop_assert_eq!(motor_writes, 0);
            }
            previous = device.applied();
        }
    }

    /// Both motor channels are never driven at once, not even between the
    /// two writes of one actuation.
    #[test]
    fn motor_channels_never_both_driven(
        cmds in vec(arb_snapshot(), 1..=64),
        reset_at in vec(any::<bool>(), 64),
    ) {
        let (mut device, config) = ready_device();

        for (cmd, reset) in cmds.into_iter().zip(reset_at) {
            if reset {
                device.reset().unwrap();
            }
            device.tick(cmd).unwrap();
            let fw = device.outputs().duty(config.pwm.motor_forward);
            let rw = device.outputs().duty(config.pwm.motor_reverse);
            prop_assert!(fw == 0 || rw == 0, "fw={} rw={}", fw, rw);
        }
        prop_assert!(!device.outputs().motor_overlap_seen);
    }

    /// Reset lands in the safe state from anywhere.
    #[test]
    fn reset_is_always_safe(cmds in vec(arb_snapshot(), 0..=16)) {
        let (mut device, config) = ready_device();
        for cmd in cmds {
            device.tick(cmd).unwrap();
        }

        device.reset().unwrap();
        prop_assert_eq!(device.applied(), AppliedState::SAFE);
        prop_assert_eq!(device.outputs().duty(config.pwm.motor_forward), 0);
        prop_assert_eq!(device.outputs().duty(config.pwm.motor_reverse), 0);
        prop_assert_eq!(device.outputs().duty(config.pwm.buzzer), 0);
        prop_assert!(!device.outputs().level(config.pins.led));
    }
}

// ── Battery throttle ──────────────────────────────────────────

proptest! {
    /// Any number of samples inside the interval return the first reading
    /// and measure once; the first sample past the interval measures again.
    #[test]
    fn samples_within_interval_are_identical(
        interval_ms in 1u64..=120_000,
        steps in vec(0u64..=5_000, 1..=32),
        first in 0u8..=100,
        later in 0u8..=100,
    ) {
        let clock = MockClock::new();
        let sensor = MockBattery::new(BatteryReading::new(first, 7_000));
        let mut monitor = BatteryMonitor::new(sensor, clock.clone(), interval_ms);

        let reading = monitor.sample();
        monitor.sensor_mut().set(BatteryReading::new(later, 6_000));

        let mut elapsed = 0u64;
        for step in steps {
            if elapsed + step >= interval_ms {
                break;
            }
            elapsed += step;
            clock.advance(step);
            prop_assert_eq!(monitor.sample(), reading);
        }
        prop_assert_eq!(monitor.sensor_mut().read_count, 1);

        clock.advance(interval_ms - elapsed);
        prop_assert_eq!(monitor.sample(), BatteryReading::new(later, 6_000));
        prop_assert_eq!(monitor.sensor_mut().read_count, 2);
    }
}
