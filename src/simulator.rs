use std::mem;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use tracing::{debug, info};

use crate::{
    config::{HosRules, MidnightPolicy},
    data::{DailyLog, DutyEvent, DutyStatus, Simulation, Stop, TripSummary},
    logbook::{build_daily_log, round2},
};

/// Running counters for one pass over a trip's stops.
#[derive(Debug)]
pub struct Simulator<'r> {
    pub rules: &'r HosRules,

    pub start_time: NaiveDateTime,
    pub current_time: NaiveDateTime,
    pub current_cycle_hours: f64,
    pub current_distance: f64,

    pub daily_driving_hours: f64,
    pub daily_on_duty_hours: f64,

    pub current_day_start: NaiveDate,
    pub current_day_events: Vec<DutyEvent>,
    pub daily_logs: Vec<DailyLog>,
}

impl<'r> Simulator<'r> {
    pub fn new(rules: &'r HosRules, start_time: NaiveDateTime, starting_cycle_hours: f64) -> Self {
        let start_time = top_of_hour(start_time);

        Self {
            rules,
            start_time,
            current_time: start_time,
            current_cycle_hours: starting_cycle_hours,
            current_distance: 0.0,
            daily_driving_hours: 0.0,
            daily_on_duty_hours: 0.0,
            current_day_start: start_time.date(),
            current_day_events: Vec::new(),
            daily_logs: Vec::new(),
        }
    }

    /// Drives to `stop` (resting first if a daily limit is already reached) and works the stop.
    pub fn visit(mut self, stop: &Stop) -> Self {
        let distance_to_stop = stop.distance_from_start - self.current_distance;

        if distance_to_stop > 0.0 {
            if self.limits_reached() {
                self.rest();
            }
            self.drive(distance_to_stop, stop);
        }

        if stop.duration > 0.0 {
            let event = DutyEvent::new(
                DutyStatus::OnDuty,
                self.current_time,
                stop.duration,
                stop.kind.label(),
            );
            self.record(event);
            self.daily_on_duty_hours += stop.duration;
            self.current_cycle_hours += stop.duration;

            if self.roll_over_day() {
                self.reset_daily_counters();
            }
        }

        self
    }

    pub fn limits_reached(&self) -> bool {
        self.daily_driving_hours >= self.rules.max_driving_hours
            || self.daily_on_duty_hours >= self.rules.max_on_duty_hours
    }

    fn rest(&mut self) {
        let event = DutyEvent::new(
            DutyStatus::Sleeper,
            self.current_time,
            self.rules.required_rest_hours,
            "Required rest break",
        );
        self.record(event);
        self.roll_over_day();
        self.reset_daily_counters();
    }

    fn drive(&mut self, distance: f64, stop: &Stop) {
        let drive_hours = distance / self.rules.average_speed_mph;
        let event = DutyEvent::new(
            DutyStatus::Driving,
            self.current_time,
            drive_hours,
            format!("Driving to {}", stop.kind),
        );
        self.record(event);
        self.daily_driving_hours += drive_hours;
        self.daily_on_duty_hours += drive_hours;
        self.current_cycle_hours += drive_hours;
        self.current_distance = stop.distance_from_start;

        if self.roll_over_day() {
            self.reset_daily_counters();
        }
    }

    fn record(&mut self, event: DutyEvent) {
        debug!(
            status = ?event.status,
            start = %event.start_time,
            hours = event.duration,
            description = %event.description,
            "Duty event"
        );
        self.current_time = event.end_time;
        self.current_day_events.push(event);
    }

    fn reset_daily_counters(&mut self) {
        self.daily_driving_hours = 0.0;
        self.daily_on_duty_hours = 0.0;
    }

    /// Closes the day in progress if `current_time` has moved past its date.
    fn roll_over_day(&mut self) -> bool {
        let today = self.current_time.date();
        if today == self.current_day_start {
            return false;
        }

        let events = mem::take(&mut self.current_day_events);
        self.daily_logs.push(build_daily_log(
            self.current_day_start,
            &events,
            self.rules.midnight_policy,
        ));

        if self.rules.midnight_policy == MidnightPolicy::Carry {
            let midnight = today.and_hms_opt(0, 0, 0).unwrap_or_default();
            self.current_day_events = events
                .into_iter()
                .filter(|event| event.end_time > midnight)
                .collect();
        }

        self.current_day_start = today;
        true
    }

    pub fn finish(mut self, total_distance: f64, total_stops: usize) -> Simulation {
        if !self.current_day_events.is_empty() {
            let events = mem::take(&mut self.current_day_events);
            self.daily_logs.push(build_daily_log(
                self.current_day_start,
                &events,
                self.rules.midnight_policy,
            ));
        }

        let summary = TripSummary {
            total_days: self.daily_logs.len(),
            final_cycle_hours: round2(self.current_cycle_hours),
            cycle_hours_remaining: round2(self.rules.max_cycle_hours - self.current_cycle_hours),
            start_time: self.start_time,
            end_time: self.current_time,
            total_distance,
            total_stops,
            estimated_duration: None,
        };

        info!(
            days = summary.total_days,
            cycle_hours = summary.final_cycle_hours,
            remaining = summary.cycle_hours_remaining,
            "Simulated trip"
        );

        Simulation {
            daily_logs: self.daily_logs,
            summary,
        }
    }
}

/// Replays `stops` (sorted by distance) against the hours-of-service rules.
pub fn simulate(
    total_distance: f64,
    stops: &[Stop],
    starting_cycle_hours: f64,
    start_time: NaiveDateTime,
    rules: &HosRules,
) -> Simulation {
    stops
        .iter()
        .fold(
            Simulator::new(rules, start_time, starting_cycle_hours),
            Simulator::visit,
        )
        .finish(total_distance, stops.len())
}

fn top_of_hour(time: NaiveDateTime) -> NaiveDateTime {
    time.date()
        .and_hms_opt(time.hour(), 0, 0)
        .unwrap_or(time)
}
