use chrono::{NaiveDate, NaiveDateTime};
use hos_planner::{
    config::{HosRules, MidnightPolicy, StopRules},
    data::{Leg, Point, Route, Simulation, StopKind},
    planner::plan_stops,
    simulator::simulate,
};

const DISTANCES: &[f64] = &[0.0, 12.5, 50.0, 640.0, 999.0, 1020.0, 1500.0, 2049.0, 2890.4, 4100.0];
const PICKUP_SHARES: &[f64] = &[0.0, 0.1, 0.5, 0.97];

fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 2, 27)
        .unwrap()
        .and_hms_opt(14, 0, 0)
        .unwrap()
}

fn routes() -> impl Iterator<Item = Route> {
    DISTANCES.iter().flat_map(|&distance| {
        PICKUP_SHARES.iter().map(move |&share| {
            let to_pickup = (distance * share).round();
            Route {
                distance,
                duration: distance / 60.0,
                coordinates: (0u32..25).map(|i| Point(f64::from(i), 0.0)).collect(),
                legs: vec![
                    Leg {
                        distance: to_pickup,
                        duration: to_pickup / 60.0,
                    },
                    Leg {
                        distance: distance - to_pickup,
                        duration: (distance - to_pickup) / 60.0,
                    },
                ],
            }
        })
    })
}

fn on_duty_hours(simulation: &Simulation) -> f64 {
    simulation
        .daily_logs
        .iter()
        .map(|log| log.totals.on_duty)
        .sum()
}

#[test]
fn stops_are_sorted_and_complete() {
    let rules = StopRules::default();
    for route in routes() {
        let stops = plan_stops(&route, &rules);

        assert!(stops
            .windows(2)
            .all(|pair| pair[0].distance_from_start <= pair[1].distance_from_start));

        let count = |kind: StopKind| stops.iter().filter(|stop| stop.kind == kind).count();
        assert_eq!(count(StopKind::Pickup), 1);
        assert_eq!(count(StopKind::Dropoff), 1);

        let pickup = route.legs[0].distance;
        let candidates = (1u32..)
            .map(|n| f64::from(n) * rules.fuel_interval_miles)
            .take_while(|&offset| offset < route.distance)
            .collect::<Vec<_>>();
        let excluded = candidates
            .iter()
            .filter(|&&offset| {
                (offset - pickup).abs() <= rules.fuel_exclusion_miles
                    || (offset - route.distance).abs() <= rules.fuel_exclusion_miles
            })
            .count();
        assert_eq!(count(StopKind::FuelStop), candidates.len() - excluded);
        assert_eq!(
            candidates.len(),
            (route.distance / rules.fuel_interval_miles).floor() as usize
                - usize::from(route.distance > 0.0 && route.distance % rules.fuel_interval_miles == 0.0)
        );

        assert!(stops
            .iter()
            .all(|stop| stop.distance_from_start >= 0.0 && stop.distance_from_start <= route.distance));
    }
}

#[test]
fn cycle_hours_accumulate_all_duty_time() {
    for route in routes() {
        let stops = plan_stops(&route, &StopRules::default());
        let simulation = simulate(route.distance, &stops, 20.0, start(), &HosRules::default());

        let stop_hours: f64 = stops.iter().map(|stop| stop.duration).sum();
        let expected = 20.0 + route.distance / 60.0 + stop_hours;
        assert!(
            (simulation.summary.final_cycle_hours - expected).abs() <= 0.005 + 1e-9,
            "distance {}: expected {expected}, got {}",
            route.distance,
            simulation.summary.final_cycle_hours
        );
    }
}

#[test]
fn carried_day_logs_partition_duty_time() {
    let rules = HosRules {
        midnight_policy: MidnightPolicy::Carry,
        ..HosRules::default()
    };
    for route in routes() {
        let stops = plan_stops(&route, &StopRules::default());
        let simulation = simulate(route.distance, &stops, 0.0, start(), &rules);

        let tolerance = 0.01 * simulation.daily_logs.len() as f64 + 1e-9;
        assert!(
            (on_duty_hours(&simulation) - simulation.summary.final_cycle_hours).abs() <= tolerance,
            "distance {}",
            route.distance
        );

        for log in &simulation.daily_logs {
            assert!(log
                .timeline
                .iter()
                .all(|segment| 0.0 <= segment.start && segment.start <= segment.end && segment.end <= 24.0));
            let on_duty_segments: f64 = log
                .timeline
                .iter()
                .filter(|segment| segment.status.is_on_duty())
                .map(|segment| segment.hours())
                .sum();
            // Segment boundaries are kept to the minute.
            let slack = log.timeline.len() as f64 / 60.0 + 0.01;
            assert!((on_duty_segments - log.totals.on_duty).abs() <= slack);
        }
    }
}

#[test]
fn truncation_only_changes_presentation() {
    let carry = HosRules {
        midnight_policy: MidnightPolicy::Carry,
        ..HosRules::default()
    };
    for route in routes() {
        let stops = plan_stops(&route, &StopRules::default());
        let truncated = simulate(route.distance, &stops, 3.0, start(), &HosRules::default());
        let carried = simulate(route.distance, &stops, 3.0, start(), &carry);

        assert_eq!(truncated.summary.final_cycle_hours, carried.summary.final_cycle_hours);
        assert_eq!(truncated.summary.end_time, carried.summary.end_time);
        // A carried remainder can open one extra page at the end of the trip.
        let (t, c) = (truncated.daily_logs.len(), carried.daily_logs.len());
        assert!(t <= c && c <= t + 1);
        if let (Some(a), Some(b)) = (truncated.daily_logs.first(), carried.daily_logs.first()) {
            assert_eq!(a.timeline, b.timeline);
        }
    }
}

#[test]
fn simulation_is_deterministic() {
    for route in routes() {
        let stops = plan_stops(&route, &StopRules::default());
        let first = simulate(route.distance, &stops, 42.5, start(), &HosRules::default());
        let second = simulate(route.distance, &stops, 42.5, start(), &HosRules::default());
        assert_eq!(first, second);
    }
}

#[test]
fn days_are_consecutive_and_unique() {
    for route in routes() {
        let stops = plan_stops(&route, &StopRules::default());
        let simulation = simulate(route.distance, &stops, 0.0, start(), &HosRules::default());

        assert_eq!(simulation.summary.total_days, simulation.daily_logs.len());
        assert!(simulation
            .daily_logs
            .windows(2)
            .all(|pair| pair[0].date < pair[1].date));
        if let Some(first) = simulation.daily_logs.first() {
            assert_eq!(first.date, start().date());
        }
    }
}
