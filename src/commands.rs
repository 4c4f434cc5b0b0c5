//! Command snapshot and outbound report types.
//!
//! The wireless transport decodes remote UI events into a small register
//! block. The core never sees that block directly: it reads a
//! [`CommandSnapshot`] through a [`CommandSource`] and writes an
//! [`OutboundReport`] field back.
//!
//! # Snapshot Consistency
//!
//! A snapshot is an instantaneous copy of four independently written
//! fields. Two fields may come from different remote update events; the
//! control loop treats every snapshot as already consistent and catches up
//! on the next tick.
//!
//! ```rust
//! use rs_trainz_remote::{CommandSnapshot, Direction};
//!
//! let snapshot = CommandSnapshot::new(50, Direction::Forward)
//!     .with_light(true);
//!
//! assert_eq!(snapshot.motion(), (50, Direction::Forward));
//! assert!(snapshot.light);
//! assert!(!snapshot.horn);
//! ```
//!
//! [`CommandSource`]: crate::traits::CommandSource

use crate::traits::Direction;

/// One read of the remote command fields.
///
/// Speed is a signed percentage. The slider UI only produces `0..=100`;
/// negative values are accepted here and mapped to zero duty by the
/// actuation layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommandSnapshot {
    /// Requested speed in percent.
    pub speed: i8,
    /// Requested direction of travel.
    pub direction: Direction,
    /// Headlight on.
    pub light: bool,
    /// Horn button held.
    pub horn: bool,
}

impl CommandSnapshot {
    /// Create a snapshot with light and horn off.
    pub const fn new(speed: i8, direction: Direction) -> Self {
        Self {
            speed,
            direction,
            light: false,
            horn: false,
        }
    }

    /// Set the light flag.
    pub const fn with_light(mut self, light: bool) -> Self {
        self.light = light;
        self
    }

    /// Set the horn flag.
    pub const fn with_horn(mut self, horn: bool) -> Self {
        self.horn = horn;
        self
    }

    /// The `(speed, direction)` pair that drives motor actuation.
    #[inline]
    pub const fn motion(&self) -> (i8, Direction) {
        (self.speed, self.direction)
    }
}

/// Status fields reported back to the remote UI.
///
/// `battery_percentage` is written by the control loop each cycle.
/// `connected` belongs to the transport and is read-only to the core.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct OutboundReport {
    /// Battery charge shown on the remote gauge (0-100).
    pub battery_percentage: i8,
    /// Whether a remote client is connected.
    pub connected: bool,
}
