//! Weather snapshot and the good-weather policy.
//!
//! The snapshot is a point-in-time reading fetched fresh per interaction;
//! every field may be unknown. The policy collapses a snapshot into the
//! single boolean that gates outdoor activities. Canonical rule: unknown
//! rain probability counts as bad weather (pessimistic default).

use serde::{Deserialize, Serialize};

/// Rain probability (percent) above which weather counts as bad.
const DEFAULT_RAIN_THRESHOLD: u8 = 50;

/// A point-in-time weather reading for one municipality.
///
/// Fields mirror what the daily municipal forecast provides for the
/// current six-hour block; any of them may be missing without affecting
/// selection beyond the derived weather flag.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WeatherSnapshot {
    /// Temperature in °C at the current hour.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_temp: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_temp: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_temp: Option<f32>,
    /// Sky state description, e.g. "Despejado".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sky_state: Option<String>,
    /// Wind speed in km/h for the current block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<f32>,
    /// Rain probability in percent (0–100) for the current block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rain_probability: Option<u8>,
}

impl WeatherSnapshot {
    /// Degraded fallback when the provider cannot be reached: everything
    /// unknown, which the pessimistic policy maps to bad weather.
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }
}

/// Pure policy turning a [`WeatherSnapshot`] into the good-weather flag.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GoodWeatherPolicy {
    /// Rain probability (percent) at or above which weather is bad.
    pub rain_threshold: u8,
    /// Optional wind limit in km/h; exceeding it is bad regardless of rain.
    pub wind_limit_kmh: Option<f32>,
}

impl Default for GoodWeatherPolicy {
    fn default() -> Self {
        Self {
            rain_threshold: DEFAULT_RAIN_THRESHOLD,
            wind_limit_kmh: None,
        }
    }
}

impl GoodWeatherPolicy {
    /// Unknown rain probability is bad weather. Unknown wind speed does
    /// not force bad weather on its own.
    #[must_use]
    pub fn is_good(&self, snapshot: &WeatherSnapshot) -> bool {
        let Some(rain) = snapshot.rain_probability else {
            return false;
        };
        if rain >= self.rain_threshold {
            return false;
        }
        match (self.wind_limit_kmh, snapshot.wind_speed) {
            (Some(limit), Some(wind)) if wind > limit => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with_rain(rain: Option<u8>) -> WeatherSnapshot {
        WeatherSnapshot {
            rain_probability: rain,
            ..WeatherSnapshot::unknown()
        }
    }

    #[test]
    fn low_rain_probability_is_good() {
        let policy = GoodWeatherPolicy::default();
        assert!(policy.is_good(&snapshot_with_rain(Some(20))));
    }

    #[test]
    fn high_rain_probability_is_bad() {
        let policy = GoodWeatherPolicy::default();
        assert!(!policy.is_good(&snapshot_with_rain(Some(80))));
    }

    #[test]
    fn unknown_rain_probability_is_bad() {
        // Pessimistischer Default: ohne Daten keine Outdoor-Empfehlung.
        let policy = GoodWeatherPolicy::default();
        assert!(!policy.is_good(&snapshot_with_rain(None)));
        assert!(!policy.is_good(&WeatherSnapshot::unknown()));
    }

    #[test]
    fn threshold_is_inclusive_on_the_bad_side() {
        let policy = GoodWeatherPolicy::default();
        assert!(policy.is_good(&snapshot_with_rain(Some(49))));
        assert!(!policy.is_good(&snapshot_with_rain(Some(50))));
    }

    #[test]
    fn wind_limit_overrides_good_rain() {
        let policy = GoodWeatherPolicy {
            wind_limit_kmh: Some(50.0),
            ..GoodWeatherPolicy::default()
        };
        let mut snap = snapshot_with_rain(Some(10));
        snap.wind_speed = Some(70.0);
        assert!(!policy.is_good(&snap));

        snap.wind_speed = Some(30.0);
        assert!(policy.is_good(&snap));

        // Unbekannter Wind allein macht das Wetter nicht schlecht.
        snap.wind_speed = None;
        assert!(policy.is_good(&snap));
    }
}
