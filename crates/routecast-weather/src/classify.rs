//! Bad-weather rules for a single forecast day.

use serde::{Deserialize, Serialize};

/// A rule that a forecast day broke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Flag {
    TemperatureOutOfRange,
    HighWind,
    HighPrecipitation,
}

impl Flag {
    pub fn description(&self) -> &'static str {
        match self {
            Self::TemperatureOutOfRange => "temperature out of safe range",
            Self::HighWind => "high wind",
            Self::HighPrecipitation => "high precipitation probability",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.description())
    }
}

/// Classification of a forecast day. `Bad` always carries at least one flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "flags", rename_all = "lowercase")]
pub enum Verdict {
    Good,
    Bad(Vec<Flag>),
}

impl Verdict {
    pub fn is_good(&self) -> bool {
        matches!(self, Self::Good)
    }

    pub fn flags(&self) -> &[Flag] {
        match self {
            Self::Good => &[],
            Self::Bad(flags) => flags,
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Good => f.write_str("good"),
            Self::Bad(flags) => {
                let described: Vec<_> = flags.iter().map(Flag::description).collect();
                write!(f, "bad ({})", described.join(", "))
            }
        }
    }
}

/// Safe bounds. A value equal to a bound is still safe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SafeRanges {
    pub min_temp: f64,
    pub max_temp: f64,
    pub max_wind_speed: f64,
    pub max_precipitation_probability: f64,
}

impl Default for SafeRanges {
    fn default() -> Self {
        Self {
            min_temp: -15.0,
            max_temp: 35.0,
            max_wind_speed: 50.0,
            max_precipitation_probability: 60.0,
        }
    }
}

impl SafeRanges {
    /// Flags are reported in rule order: temperature, wind, precipitation.
    pub fn classify(&self, max_temp: f64, wind_speed: f64, precipitation_probability: f64) -> Verdict {
        let mut flags = Vec::new();

        if max_temp < self.min_temp || max_temp > self.max_temp {
            flags.push(Flag::TemperatureOutOfRange);
        }
        if wind_speed > self.max_wind_speed {
            flags.push(Flag::HighWind);
        }
        if precipitation_probability > self.max_precipitation_probability {
            flags.push(Flag::HighPrecipitation);
        }

        if flags.is_empty() {
            Verdict::Good
        } else {
            Verdict::Bad(flags)
        }
    }
}

/// Classify with the default thresholds.
pub fn classify(max_temp: f64, wind_speed: f64, precipitation_probability: f64) -> Verdict {
    SafeRanges::default().classify(max_temp, wind_speed, precipitation_probability)
}
