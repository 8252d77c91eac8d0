use std::{env, str::FromStr};

use serde::Deserialize;

use crate::error::{PlanningError, Result};

/// How a duty event that runs past midnight appears on the day logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MidnightPolicy {
    /// Clip the segment at hour 24 and drop the remainder.
    #[default]
    Truncate,
    /// Repeat the remainder from hour 0 on the following day.
    Carry,
}

impl FromStr for MidnightPolicy {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "truncate" => Ok(MidnightPolicy::Truncate),
            "carry" => Ok(MidnightPolicy::Carry),
            _ => Err(()),
        }
    }
}

/// Property-carrying driver limits.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HosRules {
    pub max_driving_hours: f64,
    pub max_on_duty_hours: f64,
    pub required_rest_hours: f64,
    pub max_cycle_hours: f64,
    pub average_speed_mph: f64,
    pub midnight_policy: MidnightPolicy,
}

impl Default for HosRules {
    fn default() -> Self {
        Self {
            max_driving_hours: 11.0,
            max_on_duty_hours: 14.0,
            required_rest_hours: 10.0,
            max_cycle_hours: 70.0,
            average_speed_mph: 60.0,
            midnight_policy: MidnightPolicy::Truncate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StopRules {
    pub fuel_interval_miles: f64,
    pub fuel_exclusion_miles: f64,
    pub fuel_stop_hours: f64,
    pub pickup_hours: f64,
    pub dropoff_hours: f64,
}

impl Default for StopRules {
    fn default() -> Self {
        Self {
            fuel_interval_miles: 1000.0,
            fuel_exclusion_miles: 50.0,
            fuel_stop_hours: 0.25,
            pickup_hours: 1.0,
            dropoff_hours: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub hos: HosRules,
    pub stops: StopRules,
    pub geocode_attempts: u32,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            hos: HosRules::default(),
            stops: StopRules::default(),
            geocode_attempts: 2,
            log_filter: "info".to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Settings::default();
        let hos = &mut settings.hos;

        override_with(&lookup, "HOS_MAX_DRIVING_HOURS", &mut hos.max_driving_hours)?;
        override_with(&lookup, "HOS_MAX_ON_DUTY_HOURS", &mut hos.max_on_duty_hours)?;
        override_with(&lookup, "HOS_REST_HOURS", &mut hos.required_rest_hours)?;
        override_with(&lookup, "HOS_MAX_CYCLE_HOURS", &mut hos.max_cycle_hours)?;
        override_with(&lookup, "HOS_AVERAGE_SPEED_MPH", &mut hos.average_speed_mph)?;
        override_with(&lookup, "HOS_MIDNIGHT_POLICY", &mut hos.midnight_policy)?;
        override_with(
            &lookup,
            "HOS_FUEL_INTERVAL_MILES",
            &mut settings.stops.fuel_interval_miles,
        )?;
        override_with(&lookup, "HOS_GEOCODE_ATTEMPTS", &mut settings.geocode_attempts)?;

        if let Some(filter) = lookup("HOS_LOG") {
            settings.log_filter = filter;
        }

        if settings.hos.average_speed_mph <= 0.0 {
            return Err(PlanningError::InvalidConfig {
                key: "HOS_AVERAGE_SPEED_MPH".to_string(),
                value: settings.hos.average_speed_mph.to_string(),
            });
        }
        if settings.stops.fuel_interval_miles <= 0.0 {
            return Err(PlanningError::InvalidConfig {
                key: "HOS_FUEL_INTERVAL_MILES".to_string(),
                value: settings.stops.fuel_interval_miles.to_string(),
            });
        }

        Ok(settings)
    }
}

fn override_with<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    slot: &mut T,
) -> Result<()> {
    if let Some(raw) = lookup(key) {
        *slot = raw.trim().parse().map_err(|_| PlanningError::InvalidConfig {
            key: key.to_string(),
            value: raw.clone(),
        })?;
    }
    Ok(())
}
