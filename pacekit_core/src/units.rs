//! Distance and duration value types plus unit conversion.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Miles per kilometer.
pub const MILES_PER_KILOMETER: f64 = 0.621371;

/// Miles per meter.
pub const MILES_PER_METER: f64 = 0.000621371;

// ============================================================================
// Units
// ============================================================================

/// Unit a distance is expressed in
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Miles,
    Kilometers,
    Meters,
}

impl DistanceUnit {
    /// Short label used next to a value ("mi", "km", "m")
    pub fn shorthand(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "mi",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Meters => "m",
        }
    }

    /// Wire name of the unit
    pub fn name(self) -> &'static str {
        match self {
            DistanceUnit::Miles => "miles",
            DistanceUnit::Kilometers => "kilometers",
            DistanceUnit::Meters => "meters",
        }
    }

    /// How many miles one of this unit is
    pub fn miles_factor(self) -> f64 {
        match self {
            DistanceUnit::Miles => 1.0,
            DistanceUnit::Kilometers => MILES_PER_KILOMETER,
            DistanceUnit::Meters => MILES_PER_METER,
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DistanceUnit {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "mi" | "mile" | "miles" => Ok(DistanceUnit::Miles),
            "km" | "kilometer" | "kilometers" => Ok(DistanceUnit::Kilometers),
            "m" | "meter" | "meters" => Ok(DistanceUnit::Meters),
            other => Err(Error::InvalidArgument(format!(
                "unrecognized distance unit '{}'",
                other
            ))),
        }
    }
}

/// Shorthand label for a unit
pub fn unit_shorthand(unit: DistanceUnit) -> &'static str {
    unit.shorthand()
}

/// Which metric drives a block
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum MetricType {
    #[default]
    #[serde(rename = "Distance")]
    Distance,
    #[serde(rename = "Time")]
    Time,
}

impl MetricType {
    pub fn other(self) -> MetricType {
        match self {
            MetricType::Distance => MetricType::Time,
            MetricType::Time => MetricType::Distance,
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricType::Distance => write!(f, "Distance"),
            MetricType::Time => write!(f, "Time"),
        }
    }
}

// ============================================================================
// Distance
// ============================================================================

/// A distance value in a given unit
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub struct Distance {
    pub value: f64,
    pub unit: DistanceUnit,
}

impl Distance {
    pub fn new(value: f64, unit: DistanceUnit) -> Self {
        Self { value, unit }
    }

    pub fn miles(value: f64) -> Self {
        Self::new(value, DistanceUnit::Miles)
    }

    pub fn kilometers(value: f64) -> Self {
        Self::new(value, DistanceUnit::Kilometers)
    }

    pub fn meters(value: f64) -> Self {
        Self::new(value, DistanceUnit::Meters)
    }

    /// The same distance converted to miles
    pub fn in_miles(&self) -> f64 {
        self.value * self.unit.miles_factor()
    }

    pub fn unit_shorthand(&self) -> &'static str {
        self.unit.shorthand()
    }

    /// Distance with a zero value in the same unit
    pub fn zeroed(unit: DistanceUnit) -> Self {
        Self::new(0.0, unit)
    }
}

/// Convert a distance to miles
pub fn distance_in_miles(distance: &Distance) -> f64 {
    distance.in_miles()
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit)
    }
}

impl FromStr for Distance {
    type Err = Error;

    /// Parses "5mi", "3.1 km", "400m" or "1.5 miles"
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| Error::InvalidArgument(format!("distance '{}' has no unit", s)))?;
        let (number, unit) = s.split_at(split);
        let value: f64 = number
            .parse()
            .map_err(|_| Error::InvalidArgument(format!("invalid distance value '{}'", number)))?;
        Ok(Distance::new(value, unit.parse()?))
    }
}

// ============================================================================
// Duration
// ============================================================================

/// A length of time in whole seconds
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub struct Duration {
    pub seconds: u32,
}

impl Duration {
    pub fn new(seconds: u32) -> Self {
        Self { seconds }
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.seconds;
        if secs >= 3600 {
            write!(f, "{}h {}m", secs / 3600, (secs % 3600) / 60)
        } else if secs >= 60 {
            let (minutes, rest) = (secs / 60, secs % 60);
            if rest > 0 {
                write!(f, "{}m {}s", minutes, rest)
            } else {
                write!(f, "{} minutes", minutes)
            }
        } else {
            write!(f, "{} seconds", secs)
        }
    }
}

/// Format seconds as "m:ss"
pub fn format_clock(seconds: u32) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Format a per-mile pace as "m:ss min/mile"
pub fn format_pace(seconds_per_mile: u32) -> String {
    format!("{} min/mile", format_clock(seconds_per_mile))
}

/// Parse "m:ss" (or plain seconds) into seconds
pub fn parse_clock(s: &str) -> Result<u32> {
    let s = s.trim();
    let invalid = || Error::InvalidArgument(format!("invalid time '{}'", s));

    match s.split_once(':') {
        Some((minutes, seconds)) => {
            let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
            let seconds: u32 = seconds.parse().map_err(|_| invalid())?;
            if seconds >= 60 {
                return Err(invalid());
            }
            minutes
                .checked_mul(60)
                .and_then(|m| m.checked_add(seconds))
                .ok_or_else(invalid)
        }
        None => s.parse().map_err(|_| invalid()),
    }
}
