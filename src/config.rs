use serde_derive::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::Error;

/// Tracker tuning. Durations are whole milliseconds, both on the wire and in memory.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct TrackerConfig {
    /// Silence after which the followed object is considered lost.
    #[serde(rename = "staleness_timeout_ms", with = "millis")]
    pub staleness_timeout: Duration,

    /// Cap on blind forward prediction; the box freezes once it is reached.
    #[serde(rename = "max_extrapolation_window_ms", with = "millis")]
    pub max_extrapolation_window: Duration,

    /// Lower bound for the interval velocity is computed over.
    #[serde(rename = "min_sample_interval_ms", with = "millis")]
    pub min_sample_interval: Duration,

    /// Drop the track after this many consecutive empty observations.
    pub max_missed_detections: Option<u32>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            staleness_timeout: Duration::from_millis(400),
            max_extrapolation_window: Duration::from_millis(150),
            min_sample_interval: Duration::from_millis(5),
            max_missed_detections: None,
        }
    }
}

impl TrackerConfig {
    pub fn from_json(s: &str) -> Result<Self, Error> {
        let config: TrackerConfig = serde_json::from_str(s)?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), Error> {
        for (name, d) in [
            ("staleness_timeout", self.staleness_timeout),
            ("max_extrapolation_window", self.max_extrapolation_window),
            ("min_sample_interval", self.min_sample_interval),
        ] {
            if d.subsec_nanos() % 1_000_000 != 0 {
                return Err(Error::InvalidConfig(format!(
                    "{} ({:?}) must be a whole number of milliseconds",
                    name, d
                )));
            }
        }

        if self.max_extrapolation_window.is_zero() {
            return Err(Error::InvalidConfig(
                "max_extrapolation_window must be positive".into(),
            ));
        }

        if self.max_extrapolation_window >= self.staleness_timeout {
            return Err(Error::InvalidConfig(format!(
                "max_extrapolation_window ({:?}) must be shorter than staleness_timeout ({:?})",
                self.max_extrapolation_window, self.staleness_timeout
            )));
        }

        if self.min_sample_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "min_sample_interval must be positive".into(),
            ));
        }

        if self.max_missed_detections == Some(0) {
            return Err(Error::InvalidConfig(
                "max_missed_detections must be at least 1".into(),
            ));
        }

        Ok(())
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
