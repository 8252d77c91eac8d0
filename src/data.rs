use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A polyline vertex in `[lng, lat]` order, as routing services emit them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point(pub f64, pub f64);

impl Point {
    pub fn from_lat_lng(lat: f64, lng: f64) -> Self {
        Self(lng, lat)
    }

    pub fn lng(&self) -> f64 {
        self.0
    }

    pub fn lat(&self) -> f64 {
        self.1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Leg {
    pub distance: f64,
    pub duration: f64,
}

/// Distances are in miles, durations in hours.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Route {
    pub distance: f64,
    pub duration: f64,
    pub coordinates: Vec<Point>,
    pub legs: Vec<Leg>,
}

impl Route {
    pub fn distance_to_first_waypoint(&self) -> f64 {
        self.legs.first().map_or(0.0, |leg| leg.distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StopKind {
    #[serde(rename = "Fuel Stop")]
    FuelStop,
    Pickup,
    Dropoff,
}

impl StopKind {
    pub fn label(&self) -> &'static str {
        match self {
            StopKind::FuelStop => "Fuel Stop",
            StopKind::Pickup => "Pickup",
            StopKind::Dropoff => "Dropoff",
        }
    }
}

impl fmt::Display for StopKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    #[serde(rename = "type")]
    pub kind: StopKind,
    pub distance_from_start: f64,
    pub duration: f64,
    pub coordinates: Option<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DutyStatus {
    OffDuty,
    Sleeper,
    Driving,
    OnDuty,
}

impl DutyStatus {
    /// Whether time in this status counts against the on-duty window and cycle.
    pub fn is_on_duty(&self) -> bool {
        matches!(self, DutyStatus::Driving | DutyStatus::OnDuty)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DutyEvent {
    pub status: DutyStatus,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub duration: f64,
    pub description: String,
}

impl DutyEvent {
    pub fn new(
        status: DutyStatus,
        start_time: NaiveDateTime,
        hours: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            status,
            start_time,
            end_time: start_time + hours_to_duration(hours),
            duration: hours,
            description: description.into(),
        }
    }

    pub fn spans_midnight(&self) -> bool {
        self.end_time.date() > self.start_time.date()
    }
}

pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::microseconds((hours * 3_600_000_000.0).round() as i64)
}

/// One status interval on a logbook page, in hours of the day (0 to 24).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineSegment {
    pub status: DutyStatus,
    pub start: f64,
    pub end: f64,
    pub description: String,
}

impl TimelineSegment {
    pub fn hours(&self) -> f64 {
        self.end - self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DayTotals {
    pub driving: f64,
    pub on_duty: f64,
    pub off_duty: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyLog {
    pub date: NaiveDate,
    pub timeline: Vec<TimelineSegment>,
    pub totals: DayTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSummary {
    pub total_days: usize,
    pub final_cycle_hours: f64,
    pub cycle_hours_remaining: f64,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub total_distance: f64,
    pub total_stops: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Simulation {
    pub daily_logs: Vec<DailyLog>,
    pub summary: TripSummary,
}
