//! Command source trait for the wireless remote.
//!
//! The wireless transport (BLE GATT server and UI protocol) runs outside the
//! core. It decodes remote events into a shared register block and sends the
//! report fields back to the phone. [`CommandSource`] is the narrow view the
//! control loop has of that block.
//!
//! # Register Layout
//!
//! ```text
//! inputs   speed      i8   0..100 slider position
//!          light      u8   1 = on
//!          horn       u8   1 = pressed
//!          direction  u8   1 = forward
//! outputs  battery    i8   0..100 gauge
//! other    connected  u8   1 = remote connected
//! ```

use crate::commands::CommandSnapshot;

/// Source of remote commands and sink for the battery report.
///
/// `read()` is non-blocking and returns whatever the transport decoded last.
/// There is no atomicity across fields beyond what the transport provides.
///
/// # Example
///
/// ```rust
/// use rs_trainz_remote::traits::CommandSource;
/// use rs_trainz_remote::hal::MockRemote;
/// use rs_trainz_remote::{CommandSnapshot, Direction};
///
/// let mut remote = MockRemote::new();
/// remote.push(CommandSnapshot::new(40, Direction::Forward));
///
/// assert_eq!(remote.read().speed, 40);
///
/// remote.write_report(87);
/// assert_eq!(remote.report().battery_percentage, 87);
/// ```
pub trait CommandSource {
    /// Returns the latest command snapshot.
    fn read(&mut self) -> CommandSnapshot;

    /// Writes the battery percentage into the outbound report.
    fn write_report(&mut self, percentage: i8);

    /// Whether a remote client is currently connected.
    ///
    /// Defaults to `true` for sources without a connection concept.
    fn is_connected(&self) -> bool {
        true
    }

    /// Resets the input fields to the safe default
    /// (speed 0, forward, light off, horn off).
    ///
    /// Called by the device reset so that a stale remote value is not
    /// re-applied on the first tick after boot.
    fn clear_inputs(&mut self);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::Direction;

    struct FixedSource {
        snapshot: CommandSnapshot,
        battery: i8,
    }

    impl CommandSource for FixedSource {
        fn read(&mut self) -> CommandSnapshot {
            self.snapshot
        }

        fn write_report(&mut self, percentage: i8) {
            self.battery = percentage;
        }

        fn clear_inputs(&mut self) {
            self.snapshot = CommandSnapshot::default();
        }
    }

    #[test]
    fn is_connected_default_impl() {
        let source = FixedSource {
            snapshot: CommandSnapshot::default(),
            battery: 0,
        };
        assert!(source.is_connected());
    }

    #[test]
    fn clear_inputs_restores_default() {
        let mut source = FixedSource {
            snapshot: CommandSnapshot::new(90, Direction::Reverse).with_horn(true),
            battery: 0,
        };
        source.clear_inputs();
        assert_eq!(source.read(), CommandSnapshot::default());
        source.write_report(12);
        assert_eq!(source.battery, 12);
    }
}
