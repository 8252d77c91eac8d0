pub mod config;
pub mod data;
pub mod error;
pub mod feed;
pub mod logbook;
pub mod logging;
pub mod planner;
pub mod routing;
pub mod simulator;
pub mod trip;

pub use error::{PlanningError, Result};
