//! Configuration types for log bridges.

use std::time::Duration;

use crate::StreamLogError;

/// Default ring buffer capacity in bytes.
pub const DEFAULT_RING_CAPACITY: usize = 2048;

/// Default frame capacity in bytes, the size of one cloud publish payload.
pub const DEFAULT_FRAME_CAPACITY: usize = 622;

/// Default interval between pumps when a [`Session`](crate::Session) drives the bridge.
pub const DEFAULT_PUMP_INTERVAL: Duration = Duration::from_millis(10);

/// What to do with a log line that does not fit in one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlongPolicy {
    /// Drop the whole line once it overflows the frame buffer.
    ///
    /// Sinks only ever see complete lines. Overlong lines are reported with
    /// [`BridgeEvent::LineDiscarded`](crate::BridgeEvent::LineDiscarded).
    #[default]
    Discard,

    /// Deliver the line as several consecutive frames, each at most
    /// `frame_capacity` bytes. Nothing is dropped.
    Split,
}

impl OverlongPolicy {
    /// Maps the `split long entries` switch onto a policy.
    #[must_use]
    pub fn from_split(split: bool) -> Self {
        if split {
            Self::Split
        } else {
            Self::Discard
        }
    }

    /// Returns `true` if overlong lines are split across frames.
    #[must_use]
    pub fn splits(self) -> bool {
        matches!(self, Self::Split)
    }
}

/// Configuration for a log bridge.
///
/// Capacities are fixed once the bridge is built; nothing is resized
/// afterwards.
///
/// # Example
///
/// ```
/// use stream_log::{BridgeConfig, OverlongPolicy};
///
/// let config = BridgeConfig {
///     frame_capacity: 128,
///     overlong: OverlongPolicy::Split,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Bytes the ring buffer holds between pumps.
    ///
    /// When the producer outruns the pump the newest bytes are dropped and a
    /// [`BridgeEvent::BytesDropped`](crate::BridgeEvent::BytesDropped) is
    /// emitted on the next pump.
    /// Default: 2048
    pub ring_capacity: usize,

    /// Largest payload handed to a sink in one frame.
    ///
    /// Default: 622
    pub frame_capacity: usize,

    /// Handling of lines longer than `frame_capacity`.
    ///
    /// Default: [`OverlongPolicy::Discard`]
    pub overlong: OverlongPolicy,

    /// How often a [`Session`](crate::Session) pumps the ring.
    ///
    /// Unused when the caller pumps manually.
    /// Default: 10ms
    pub pump_interval: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            ring_capacity: DEFAULT_RING_CAPACITY,
            frame_capacity: DEFAULT_FRAME_CAPACITY,
            overlong: OverlongPolicy::default(),
            pump_interval: DEFAULT_PUMP_INTERVAL,
        }
    }
}

impl BridgeConfig {
    /// Checks that every capacity and interval is usable.
    pub fn validate(&self) -> Result<(), StreamLogError> {
        if self.ring_capacity == 0 {
            return Err(StreamLogError::InvalidRingCapacity {
                capacity: self.ring_capacity,
            });
        }
        if self.frame_capacity == 0 {
            return Err(StreamLogError::InvalidFrameCapacity {
                capacity: self.frame_capacity,
            });
        }
        if self.pump_interval.is_zero() {
            return Err(StreamLogError::InvalidPumpInterval);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlong_policy_default() {
        assert_eq!(OverlongPolicy::default(), OverlongPolicy::Discard);
    }

    #[test]
    fn test_overlong_policy_from_split() {
        assert_eq!(OverlongPolicy::from_split(true), OverlongPolicy::Split);
        assert_eq!(OverlongPolicy::from_split(false), OverlongPolicy::Discard);
        assert!(OverlongPolicy::Split.splits());
        assert!(!OverlongPolicy::Discard.splits());
    }

    #[test]
    fn test_bridge_config_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.ring_capacity, 2048);
        assert_eq!(config.frame_capacity, 622);
        assert_eq!(config.overlong, OverlongPolicy::Discard);
        assert_eq!(config.pump_interval, Duration::from_millis(10));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_ring() {
        let config = BridgeConfig {
            ring_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StreamLogError::InvalidRingCapacity { capacity: 0 })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_frame() {
        let config = BridgeConfig {
            frame_capacity: 0,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StreamLogError::InvalidFrameCapacity { capacity: 0 })
        ));
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let config = BridgeConfig {
            pump_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StreamLogError::InvalidPumpInterval)
        ));
    }
}
