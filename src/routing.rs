//! Seams to the geocoding and routing services the planner depends on.

use std::{collections::HashMap, thread, time::Duration};

use itertools::Itertools;
use tracing::{debug, warn};

use crate::{
    data::{Leg, Point, Route},
    error::{PlanningError, Result},
    logbook::round2,
};

const EARTH_RADIUS_MILES: f64 = 3958.7613;
const FALLBACK_SPEED_MPH: f64 = 60.0;

pub trait Geocoder {
    fn geocode(&self, address: &str) -> Result<Point>;
}

pub trait RouteProvider {
    /// Routes through `waypoints` in order; legs follow consecutive waypoint pairs.
    fn route(&self, waypoints: &[Point]) -> Result<Route>;
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn geocode(&self, address: &str) -> Result<Point> {
        (**self).geocode(address)
    }
}

impl<P: RouteProvider + ?Sized> RouteProvider for &P {
    fn route(&self, waypoints: &[Point]) -> Result<Route> {
        (**self).route(waypoints)
    }
}

const CITIES: &[(&str, &str, f64, f64)] = &[
    ("los angeles", "california", 34.0522, -118.2437),
    ("new york", "new york", 40.7128, -74.0060),
    ("chicago", "illinois", 41.8781, -87.6298),
    ("houston", "texas", 29.7604, -95.3698),
    ("phoenix", "arizona", 33.4484, -112.0740),
    ("philadelphia", "pennsylvania", 39.9526, -75.1652),
    ("san antonio", "texas", 29.4241, -98.4936),
    ("san diego", "california", 32.7157, -117.1611),
    ("dallas", "texas", 32.7767, -96.7970),
    ("san jose", "california", 37.3382, -121.8863),
    ("austin", "texas", 30.2672, -97.7431),
    ("jacksonville", "florida", 30.3322, -81.6557),
    ("san francisco", "california", 37.7749, -122.4194),
    ("columbus", "ohio", 39.9612, -82.9988),
    ("fort worth", "texas", 32.7555, -97.3308),
    ("indianapolis", "indiana", 39.7684, -86.1581),
    ("charlotte", "north carolina", 35.2271, -80.8431),
    ("seattle", "washington", 47.6062, -122.3321),
    ("denver", "colorado", 39.7392, -104.9903),
    ("boston", "massachusetts", 42.3601, -71.0589),
    ("nashville", "tennessee", 36.1627, -86.7816),
    ("detroit", "michigan", 42.3314, -83.0458),
    ("portland", "oregon", 45.5152, -122.6784),
    ("las vegas", "nevada", 36.1699, -115.1398),
    ("memphis", "tennessee", 35.1495, -90.0490),
    ("atlanta", "georgia", 33.7490, -84.3880),
    ("miami", "florida", 25.7617, -80.1918),
];

const STATE_CODES: &[(&str, &str)] = &[
    ("arizona", "az"),
    ("california", "ca"),
    ("colorado", "co"),
    ("florida", "fl"),
    ("georgia", "ga"),
    ("illinois", "il"),
    ("indiana", "in"),
    ("massachusetts", "ma"),
    ("michigan", "mi"),
    ("nevada", "nv"),
    ("new york", "ny"),
    ("north carolina", "nc"),
    ("ohio", "oh"),
    ("oregon", "or"),
    ("pennsylvania", "pa"),
    ("tennessee", "tn"),
    ("texas", "tx"),
    ("washington", "wa"),
];

/// Offline lookup of major US cities, keyed by "city, st" and "city, state".
#[derive(Debug, Clone)]
pub struct CityTable {
    entries: HashMap<String, Point>,
}

impl Default for CityTable {
    fn default() -> Self {
        let codes: HashMap<&str, &str> = STATE_CODES.iter().copied().collect();
        let entries = CITIES
            .iter()
            .flat_map(|&(city, state, lat, lng)| {
                let point = Point::from_lat_lng(lat, lng);
                let mut keys = vec![format!("{city}, {state}")];
                if let Some(code) = codes.get(state) {
                    keys.push(format!("{city}, {code}"));
                }
                keys.into_iter().map(move |key| (key, point))
            })
            .collect();
        Self { entries }
    }
}

impl CityTable {
    pub fn lookup(&self, address: &str) -> Option<Point> {
        let key = address
            .split(',')
            .map(|part| part.split_whitespace().join(" "))
            .join(", ")
            .to_lowercase();
        self.entries.get(&key).copied()
    }
}

impl Geocoder for CityTable {
    fn geocode(&self, address: &str) -> Result<Point> {
        self.lookup(address)
            .ok_or_else(|| PlanningError::UnresolvedLocation {
                address: address.to_string(),
                attempts: 1,
            })
    }
}

/// Retries the wrapped geocoder a bounded number of times.
#[derive(Debug, Clone)]
pub struct RetryingGeocoder<G> {
    inner: G,
    attempts: u32,
    delay: Duration,
}

impl<G: Geocoder> RetryingGeocoder<G> {
    pub fn new(inner: G, attempts: u32) -> Self {
        Self {
            inner,
            attempts: attempts.max(1),
            delay: Duration::from_secs(1),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl<G: Geocoder> Geocoder for RetryingGeocoder<G> {
    fn geocode(&self, address: &str) -> Result<Point> {
        for attempt in 1..=self.attempts {
            match self.inner.geocode(address) {
                Ok(point) => {
                    debug!(address, attempt, lat = point.lat(), lng = point.lng(), "Geocoded");
                    return Ok(point);
                }
                Err(err) => {
                    warn!(address, attempt, error = %err, "Geocoding attempt failed");
                    if attempt < self.attempts && !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                }
            }
        }

        Err(PlanningError::UnresolvedLocation {
            address: address.to_string(),
            attempts: self.attempts,
        })
    }
}

/// Great-circle distance between two points.
pub fn haversine_miles(from: Point, to: Point) -> f64 {
    let (lat1, lat2) = (from.lat().to_radians(), to.lat().to_radians());
    let d_lat = lat2 - lat1;
    let d_lng = (to.lng() - from.lng()).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * a.sqrt().asin()
}

/// Estimates a route from straight lines between waypoints at a fixed average speed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StraightLineRouter;

impl RouteProvider for StraightLineRouter {
    fn route(&self, waypoints: &[Point]) -> Result<Route> {
        if waypoints.len() < 2 {
            return Err(PlanningError::TooFewWaypoints {
                count: waypoints.len(),
            });
        }

        let distances = waypoints
            .iter()
            .tuple_windows()
            .map(|(&from, &to)| haversine_miles(from, to))
            .collect_vec();
        let total: f64 = distances.iter().sum();

        Ok(Route {
            distance: round1(total),
            duration: round2(total / FALLBACK_SPEED_MPH),
            coordinates: waypoints.to_vec(),
            legs: distances
                .into_iter()
                .map(|distance| Leg {
                    distance: round1(distance),
                    duration: round2(distance / FALLBACK_SPEED_MPH),
                })
                .collect(),
        })
    }
}

/// Uses `primary`, degrading to straight-line estimates when it is unreachable.
#[derive(Debug, Clone)]
pub struct FallbackRouter<P> {
    primary: P,
    fallback: StraightLineRouter,
}

impl<P: RouteProvider> FallbackRouter<P> {
    pub fn new(primary: P) -> Self {
        Self {
            primary,
            fallback: StraightLineRouter,
        }
    }
}

impl<P: RouteProvider> RouteProvider for FallbackRouter<P> {
    fn route(&self, waypoints: &[Point]) -> Result<Route> {
        match self.primary.route(waypoints) {
            Err(PlanningError::RoutingUnavailable { reason }) => {
                warn!(%reason, "Routing service unavailable, using straight-line estimate");
                self.fallback.route(waypoints)
            }
            other => other,
        }
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
