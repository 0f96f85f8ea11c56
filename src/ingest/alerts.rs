use serde::Serialize;

use crate::config::{REACTOR_ALERT_CELSIUS, VAPOR_ALERT_CELSIUS};

use super::parser::Reading;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertThresholds {
    /// Reactor temperatures above this raise the reactor alert.
    pub reactor_max: f64,
    /// Vapor temperatures below this raise the vapor alert while the reactor is overheating.
    pub vapor_min: f64,
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            reactor_max: REACTOR_ALERT_CELSIUS,
            vapor_min: VAPOR_ALERT_CELSIUS,
        }
    }
}

/// Alert flags, recomputed from every accepted reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertState {
    pub reactor_alert: bool,
    pub vapor_alert: bool,
}

impl AlertState {
    pub fn evaluate(reading: &Reading, thresholds: &AlertThresholds) -> Self {
        let reactor_alert = reading.reactor > thresholds.reactor_max;
        // A cold vapor line only matters while the reactor is running hot.
        let vapor_alert = reactor_alert && reading.vapor < thresholds.vapor_min;
        Self {
            reactor_alert,
            vapor_alert,
        }
    }

    pub fn any(&self) -> bool {
        self.reactor_alert || self.vapor_alert
    }
}
