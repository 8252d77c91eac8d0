use itertools::Itertools;
use tracing::debug;

use crate::{
    config::StopRules,
    data::{Point, Route, Stop, StopKind},
};

/// Places fuel, pickup and dropoff stops along `route`, ordered by distance.
pub fn plan_stops(route: &Route, rules: &StopRules) -> Vec<Stop> {
    let total = route.distance;
    let distance_to_pickup = route.distance_to_first_waypoint();
    let distance_to_dropoff = total;

    let clear_of = |offset: f64, anchor: f64| (offset - anchor).abs() > rules.fuel_exclusion_miles;

    let fuel_stops = fuel_candidates(total, rules.fuel_interval_miles)
        .filter(|&offset| clear_of(offset, distance_to_pickup) && clear_of(offset, distance_to_dropoff))
        .map(|offset| Stop {
            kind: StopKind::FuelStop,
            distance_from_start: offset,
            duration: rules.fuel_stop_hours,
            coordinates: interpolate(&route.coordinates, offset, total),
        });

    let pickup = Stop {
        kind: StopKind::Pickup,
        distance_from_start: distance_to_pickup,
        duration: rules.pickup_hours,
        coordinates: route
            .coordinates
            .get(route.coordinates.len() / 3)
            .copied(),
    };

    let dropoff = Stop {
        kind: StopKind::Dropoff,
        distance_from_start: distance_to_dropoff,
        duration: rules.dropoff_hours,
        coordinates: route.coordinates.last().copied(),
    };

    let stops = fuel_stops
        .chain([pickup, dropoff])
        .sorted_by(|a, b| a.distance_from_start.total_cmp(&b.distance_from_start))
        .collect_vec();

    for stop in &stops {
        debug!(
            kind = %stop.kind,
            distance = stop.distance_from_start,
            duration = stop.duration,
            "Placed stop"
        );
    }

    stops
}

/// Multiples of `interval` strictly below `total`.
fn fuel_candidates(total: f64, interval: f64) -> impl Iterator<Item = f64> {
    (1u32..)
        .map(move |n| f64::from(n) * interval)
        .take_while(move |&offset| interval > 0.0 && offset < total)
}

/// Picks the polyline vertex at the same fractional position as `offset` along `total`.
pub fn interpolate(polyline: &[Point], offset: f64, total: f64) -> Option<Point> {
    let last = polyline.len().checked_sub(1)?;
    if total <= 0.0 {
        return polyline.first().copied();
    }
    let ratio = (offset / total).max(0.0);
    let index = ((ratio * polyline.len() as f64) as usize).min(last);
    polyline.get(index).copied()
}
