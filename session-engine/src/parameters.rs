//! Plugin parameter types

use serde::{Deserialize, Serialize};

/// Plugin parameter information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter ID
    pub id: u32,
    /// Parameter name
    pub name: String,
    /// Current normalized value (0.0 to 1.0)
    pub value: f64,
    /// Minimum plain value
    pub min: f64,
    /// Maximum plain value
    pub max: f64,
    /// Default normalized value
    pub default: f64,
    /// Parameter unit (e.g., "Hz", "dB", "%")
    pub unit: String,
    /// Step count (0 = continuous)
    pub step_count: i32,
    /// Whether the parameter is read-only
    pub is_read_only: bool,
    /// Whether the parameter is a bypass control
    pub is_bypass: bool,
}

impl Parameter {
    /// A continuous parameter with a plain range and a plain default
    pub fn continuous(id: u32, name: &str, unit: &str, min: f64, max: f64, default: f64) -> Self {
        let mut param = Self {
            id,
            name: name.to_string(),
            value: 0.0,
            min,
            max,
            default: 0.0,
            unit: unit.to_string(),
            step_count: 0,
            is_read_only: false,
            is_bypass: false,
        };
        param.default = param.plain_to_normalized(default);
        param.value = param.default;
        param
    }

    /// An on/off switch
    pub fn switch(id: u32, name: &str, on: bool) -> Self {
        let default = if on { 1.0 } else { 0.0 };
        Self {
            id,
            name: name.to_string(),
            value: default,
            min: 0.0,
            max: 1.0,
            default,
            unit: String::new(),
            step_count: 1,
            is_read_only: false,
            is_bypass: false,
        }
    }

    /// Convert normalized value (0.0-1.0) to plain value
    pub fn normalized_to_plain(&self, normalized: f64) -> f64 {
        if self.step_count > 0 {
            let steps = self.step_count as f64;
            let step = (normalized * steps).round();
            self.min + (step / steps) * (self.max - self.min)
        } else {
            self.min + normalized * (self.max - self.min)
        }
    }

    /// Convert plain value to normalized value (0.0-1.0)
    pub fn plain_to_normalized(&self, plain: f64) -> f64 {
        if (self.max - self.min).abs() < f64::EPSILON {
            0.0
        } else {
            ((plain - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        }
    }

    /// Format the value as a string with unit
    pub fn format_value(&self, normalized: f64) -> String {
        let plain = self.normalized_to_plain(normalized);

        if self.is_switch() {
            if plain > 0.5 {
                "On".to_string()
            } else {
                "Off".to_string()
            }
        } else if self.step_count > 1 {
            format!("{:.0} {}", plain, self.unit).trim_end().to_string()
        } else if self.unit.is_empty() {
            format!("{:.3}", plain)
        } else {
            format!("{:.2} {}", plain, self.unit)
        }
    }

    /// Check if this is a discrete/stepped parameter
    pub fn is_discrete(&self) -> bool {
        self.step_count > 0
    }

    /// Check if this is an on/off parameter
    pub fn is_switch(&self) -> bool {
        self.step_count == 1
    }
}
