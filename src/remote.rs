//! Command source adapter over the wireless transport's register block.
//!
//! The transport (BLE GATT server plus the phone UI protocol) owns a small
//! block of registers. It writes the input fields as remote events arrive
//! and reads the output field when it notifies the phone. This module
//! provides:
//!
//! - [`RegisterBlock`]: the raw block, with its wire layout
//! - [`SharedRegisters`]: a cloneable handle for when the transport runs on
//!   its own thread (`std` only)
//! - [`device_name`]: the advertised `"Train-XX:YY"` name
//!
//! Both block types implement [`CommandSource`], which is all the control
//! loop sees.
//!
//! # Example
//!
//! ```rust
//! use rs_trainz_remote::remote::RegisterBlock;
//! use rs_trainz_remote::traits::CommandSource;
//! use rs_trainz_remote::Direction;
//!
//! let mut regs = RegisterBlock::default();
//! regs.set_input_bytes([60, 1, 0, 0]); // speed 60, light on, reverse
//!
//! let snapshot = regs.read();
//! assert_eq!(snapshot.speed, 60);
//! assert!(snapshot.light);
//! assert_eq!(snapshot.direction, Direction::Reverse);
//!
//! regs.write_report(75);
//! assert_eq!(regs.output_bytes(), [75, 0]);
//! ```

use core::fmt::Write as _;

use crate::commands::{CommandSnapshot, OutboundReport};
use crate::config::NameString;
use crate::traits::{CommandSource, Direction};

/// The transport's shared register block.
///
/// Field order matches the wire layout: four input bytes followed by the
/// battery output byte and the connection flag.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RegisterBlock {
    /// Slider position, 0..100
    pub speed: i8,
    /// 1 if the light switch is on
    pub light: u8,
    /// 1 while the horn button is pressed
    pub horn: u8,
    /// 1 if the direction switch is on (forward)
    pub direction: u8,
    /// Battery gauge, 0..100
    pub battery: i8,
    /// 1 if a remote is connected
    pub connected: u8,
}

impl Default for RegisterBlock {
    fn default() -> Self {
        Self {
            speed: 0,
            light: 0,
            horn: 0,
            direction: Direction::Forward.to_register(),
            battery: 0,
            connected: 0,
        }
    }
}

impl RegisterBlock {
    /// Number of input bytes on the wire.
    pub const INPUT_LEN: usize = 4;

    /// Number of output bytes on the wire.
    pub const OUTPUT_LEN: usize = 2;

    /// Decode the input fields.
    pub fn snapshot(&self) -> CommandSnapshot {
        CommandSnapshot {
            speed: self.speed,
            direction: Direction::from_register(self.direction),
            light: self.light != 0,
            horn: self.horn != 0,
        }
    }

    /// Decode the output fields.
    pub fn report(&self) -> OutboundReport {
        OutboundReport {
            battery_percentage: self.battery,
            connected: self.connected != 0,
        }
    }

    /// Input fields in wire order.
    pub fn input_bytes(&self) -> [u8; Self::INPUT_LEN] {
        [self.speed as u8, self.light, self.horn, self.direction]
    }

    /// Overwrite the input fields from a wire buffer.
    pub fn set_input_bytes(&mut self, bytes: [u8; Self::INPUT_LEN]) {
        self.speed = bytes[0] as i8;
        self.light = bytes[1];
        self.horn = bytes[2];
        self.direction = bytes[3];
    }

    /// Output fields in wire order.
    pub fn output_bytes(&self) -> [u8; Self::OUTPUT_LEN] {
        [self.battery as u8, self.connected]
    }

    /// Encode a snapshot into the input fields.
    pub fn set_snapshot(&mut self, snapshot: CommandSnapshot) {
        self.speed = snapshot.speed;
        self.light = snapshot.light as u8;
        self.horn = snapshot.horn as u8;
        self.direction = snapshot.direction.to_register();
    }
}

impl CommandSource for RegisterBlock {
    fn read(&mut self) -> CommandSnapshot {
        self.snapshot()
    }

    fn write_report(&mut self, percentage: i8) {
        self.battery = percentage;
    }

    fn is_connected(&self) -> bool {
        self.connected != 0
    }

    fn clear_inputs(&mut self) {
        self.set_snapshot(CommandSnapshot::default());
    }
}

/// Cloneable handle to a register block shared with a transport thread.
///
/// Each access takes the lock for one short copy, so a read never tears a
/// single field, but the four input fields may still mix two remote updates.
///
/// # Example
///
/// ```rust
/// use rs_trainz_remote::remote::SharedRegisters;
/// use rs_trainz_remote::traits::CommandSource;
///
/// let mut core_side = SharedRegisters::new();
/// let transport_side = core_side.clone();
///
/// transport_side.update(|regs| regs.speed = 40);
/// assert_eq!(core_side.read().speed, 40);
///
/// core_side.write_report(66);
/// assert_eq!(transport_side.get().battery, 66);
/// ```
#[cfg(feature = "std")]
#[derive(Clone, Debug, Default)]
pub struct SharedRegisters {
    inner: std::sync::Arc<std::sync::Mutex<RegisterBlock>>,
}

#[cfg(feature = "std")]
impl SharedRegisters {
    /// Create a handle to a fresh register block.
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current block.
    pub fn get(&self) -> RegisterBlock {
        *self.lock()
    }

    /// Mutate the block under the lock.
    pub fn update<R>(&self, f: impl FnOnce(&mut RegisterBlock) -> R) -> R {
        f(&mut self.lock())
    }

    /// Set the connection flag (transport side).
    pub fn set_connected(&self, connected: bool) {
        self.lock().connected = connected as u8;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, RegisterBlock> {
        // A panicking writer cannot leave a Copy block half-written.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[cfg(feature = "std")]
impl CommandSource for SharedRegisters {
    fn read(&mut self) -> CommandSnapshot {
        self.lock().snapshot()
    }

    fn write_report(&mut self, percentage: i8) {
        self.lock().battery = percentage;
    }

    fn is_connected(&self) -> bool {
        self.lock().connected != 0
    }

    fn clear_inputs(&mut self) {
        self.lock().clear_inputs();
    }
}

/// Advertised device name: `"{prefix}-XX:YY"` from the last two MAC octets.
///
/// The result is capped at [`MAX_NAME_LEN`](crate::config::MAX_NAME_LEN)
/// (15) bytes, the visible part of a 16-byte C string. The suffix takes 6
/// bytes, so a prefix longer than 9 bytes loses the tail of the suffix.
///
/// # Examples
///
/// ```
/// use rs_trainz_remote::remote::device_name;
///
/// let name = device_name("Train", [0x24, 0x6F, 0x28, 0x1A, 0xB3, 0x0C]);
/// assert_eq!(name.as_str(), "Train-B3:0C");
/// ```
pub fn device_name(prefix: &str, mac: [u8; 6]) -> NameString {
    let mut name = crate::config::name_string(prefix);
    // Overflow truncates; the name stays valid.
    let _ = write!(name, "-{:02X}:{:02X}", mac[4], mac[5]);
    name
}
