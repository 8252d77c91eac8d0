use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanningError {
    #[error("Could not geocode {address:?} after {attempts} attempt(s). Please try using format: 'City, State' (e.g., 'Los Angeles, CA'), or use a major city name")]
    UnresolvedLocation { address: String, attempts: u32 },

    #[error("Routing service unavailable: {reason}")]
    RoutingUnavailable { reason: String },

    #[error("A route needs at least 2 waypoints, got {count}")]
    TooFewWaypoints { count: usize },

    #[error("Current cycle hours must be between 0 and 70, got {hours}")]
    InvalidCycleHours { hours: f64 },

    #[error("The {field} must not be empty")]
    EmptyAddress { field: &'static str },

    #[error("Invalid value {value:?} for setting {key}")]
    InvalidConfig { key: String, value: String },

    #[error("Could not read route feed: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, PlanningError>;
