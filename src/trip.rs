use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
    config::Settings,
    data::{DailyLog, Point, Route, Stop, TripSummary},
    error::{PlanningError, Result},
    planner::plan_stops,
    routing::{Geocoder, RouteProvider},
    simulator::simulate,
};

#[derive(Debug, Clone, Deserialize)]
pub struct TripRequest {
    pub current_location: String,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub current_cycle_hours: f64,
}

impl TripRequest {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("current location", &self.current_location),
            ("pickup location", &self.pickup_location),
            ("dropoff location", &self.dropoff_location),
        ] {
            if value.trim().is_empty() {
                return Err(PlanningError::EmptyAddress { field });
            }
        }

        validate_cycle_hours(self.current_cycle_hours)
    }
}

pub fn validate_cycle_hours(hours: f64) -> Result<()> {
    if !hours.is_finite() || !(0.0..=70.0).contains(&hours) {
        return Err(PlanningError::InvalidCycleHours { hours });
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Waypoint {
    pub name: String,
    pub coords: Point,
}

impl Waypoint {
    pub fn new(name: impl Into<String>, coords: Point) -> Self {
        Self {
            name: name.into(),
            coords,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub total_distance: f64,
    pub total_duration: f64,
    pub coordinates: Vec<Point>,
    pub waypoints: Vec<Waypoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripPlan {
    pub route: RouteInfo,
    pub stops: Vec<Stop>,
    pub daily_logs: Vec<DailyLog>,
    pub summary: TripSummary,
}

impl TripPlan {
    /// Places stops on `route`, simulates the duty timeline and attaches the route metadata.
    pub fn assemble(
        route: Route,
        waypoints: Vec<Waypoint>,
        cycle_hours: f64,
        start_time: NaiveDateTime,
        settings: &Settings,
    ) -> Self {
        let stops = plan_stops(&route, &settings.stops);
        let simulation = simulate(route.distance, &stops, cycle_hours, start_time, &settings.hos);

        let mut summary = simulation.summary;
        summary.estimated_duration = Some(route.duration);

        TripPlan {
            route: RouteInfo {
                total_distance: route.distance,
                total_duration: route.duration,
                coordinates: route.coordinates,
                waypoints,
            },
            stops,
            daily_logs: simulation.daily_logs,
            summary,
        }
    }
}

/// Resolves a request's addresses, routes through them and plans the trip.
#[derive(Debug)]
pub struct TripPlanner<G, R> {
    geocoder: G,
    router: R,
    settings: Settings,
}

impl<G: Geocoder, R: RouteProvider> TripPlanner<G, R> {
    pub fn new(geocoder: G, router: R, settings: Settings) -> Self {
        Self {
            geocoder,
            router,
            settings,
        }
    }

    pub fn plan(&self, request: &TripRequest, start_time: NaiveDateTime) -> Result<TripPlan> {
        request.validate()?;

        let waypoints = [
            ("Start", &request.current_location),
            ("Pickup", &request.pickup_location),
            ("Dropoff", &request.dropoff_location),
        ]
        .into_iter()
        .map(|(name, address)| {
            self.geocoder
                .geocode(address)
                .map(|coords| Waypoint::new(name, coords))
        })
        .collect::<Result<Vec<_>>>()?;

        let points: Vec<Point> = waypoints.iter().map(|waypoint| waypoint.coords).collect();
        let route = self.router.route(&points)?;
        info!(
            distance = route.distance,
            duration = route.duration,
            legs = route.legs.len(),
            "Resolved route"
        );

        Ok(TripPlan::assemble(
            route,
            waypoints,
            request.current_cycle_hours,
            start_time,
            &self.settings,
        ))
    }
}
