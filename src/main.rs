use std::{env, time::Duration};

use anyhow::{bail, Context};
use chrono::Local;
use tracing::info;

use hos_planner::{
    config::Settings,
    data::Route,
    feed::RouteFeed,
    logging::init_logger,
    routing::{CityTable, FallbackRouter, RetryingGeocoder, StraightLineRouter},
    trip::{validate_cycle_hours, TripPlan, TripPlanner, TripRequest, Waypoint},
};

const USAGE: &str = "usage:
  hos-planner <current location> <pickup location> <dropoff location> <cycle hours>
  hos-planner --feed <legs.csv> <polyline.csv> <cycle hours>";

fn parse_cycle_hours(raw: &str) -> anyhow::Result<f64> {
    raw.parse()
        .with_context(|| format!("cycle hours must be a number, got {raw:?}"))
}

fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    init_logger(&settings.log_filter);

    let args: Vec<String> = env::args().skip(1).collect();
    let start_time = Local::now().naive_local();

    let plan = match args.as_slice() {
        [flag, legs, polyline, cycle] if flag == "--feed" => {
            let cycle_hours = parse_cycle_hours(cycle)?;
            validate_cycle_hours(cycle_hours)?;

            info!(legs = %legs, polyline = %polyline, "Loading route feed");
            let route = Route::from(RouteFeed::from_paths(legs, polyline)?);
            let waypoints = match (route.coordinates.first(), route.coordinates.last()) {
                (Some(&start), Some(&end)) => vec![
                    Waypoint::new("Start", start),
                    Waypoint::new("Dropoff", end),
                ],
                _ => Vec::new(),
            };

            TripPlan::assemble(route, waypoints, cycle_hours, start_time, &settings)
        }
        [current, pickup, dropoff, cycle] => {
            let request = TripRequest {
                current_location: current.to_owned(),
                pickup_location: pickup.to_owned(),
                dropoff_location: dropoff.to_owned(),
                current_cycle_hours: parse_cycle_hours(cycle)?,
            };

            let planner = TripPlanner::new(
                RetryingGeocoder::new(CityTable::default(), settings.geocode_attempts)
                    .with_delay(Duration::ZERO),
                FallbackRouter::new(StraightLineRouter),
                settings,
            );

            info!(
                current = %request.current_location,
                pickup = %request.pickup_location,
                dropoff = %request.dropoff_location,
                "Planning trip"
            );
            planner.plan(&request, start_time)?
        }
        _ => bail!(USAGE),
    };

    info!(
        days = plan.summary.total_days,
        stops = plan.summary.total_stops,
        "Trip planned"
    );
    println!("{}", serde_json::to_string_pretty(&plan)?);

    Ok(())
}
