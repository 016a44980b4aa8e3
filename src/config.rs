//! Timing constants for the driver scenarios.

use std::time::Duration;

/// Delays used by the scenario scripts.
///
/// Defaults: 100ms period, second observer joins after 300ms, observers are
/// held for 300ms after that, control case runs for 500ms.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScenarioConfig {
    /// Interval period of the source.
    pub period: Duration,
    /// Delay before the second observer subscribes.
    pub join_after: Duration,
    /// How long observers stay subscribed once the second one has joined.
    pub hold_for: Duration,
    /// Lifetime of both subscriptions in the control case.
    pub control_window: Duration,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(100),
            join_after: Duration::from_millis(300),
            hold_for: Duration::from_millis(300),
            control_window: Duration::from_millis(500),
        }
    }
}

impl ScenarioConfig {
    /// Same delays, divided by `factor`. Handy for quick real-clock runs.
    /// A factor of 0 is treated as 1.
    #[must_use]
    pub fn scaled(&self, factor: u32) -> Self {
        let factor = factor.max(1);
        Self {
            period: self.period / factor,
            join_after: self.join_after / factor,
            hold_for: self.hold_for / factor,
            control_window: self.control_window / factor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaling_keeps_ratios() {
        let fast = ScenarioConfig::default().scaled(10);
        assert_eq!(Duration::from_millis(10), fast.period);
        assert_eq!(Duration::from_millis(30), fast.join_after);
        assert_eq!(Duration::from_millis(50), fast.control_window);
    }

    #[test]
    fn zero_factor_keeps_defaults() {
        assert_eq!(ScenarioConfig::default(), ScenarioConfig::default().scaled(0));
    }
}
