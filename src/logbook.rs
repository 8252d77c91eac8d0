//! Turns the simulator's duty events into one logbook page per calendar day.

use chrono::{NaiveDate, NaiveDateTime, Timelike};

use crate::{
    config::MidnightPolicy,
    data::{DailyLog, DayTotals, DutyEvent, DutyStatus, TimelineSegment},
};

pub const HOURS_PER_DAY: f64 = 24.0;

pub fn build_daily_log(date: NaiveDate, events: &[DutyEvent], policy: MidnightPolicy) -> DailyLog {
    let (timeline, driving, on_duty) = match policy {
        MidnightPolicy::Truncate => truncated_page(date, events),
        MidnightPolicy::Carry => carried_page(date, events),
    };

    DailyLog {
        date,
        timeline,
        totals: DayTotals {
            driving: round2(driving),
            on_duty: round2(on_duty),
            off_duty: round2(HOURS_PER_DAY - on_duty),
        },
    }
}

/// Segments past midnight are cut at 24; totals count events that start on `date`.
fn truncated_page(date: NaiveDate, events: &[DutyEvent]) -> (Vec<TimelineSegment>, f64, f64) {
    let timeline = events
        .iter()
        .map(|event| TimelineSegment {
            status: event.status,
            start: hour_of_day(event.start_time),
            end: if event.spans_midnight() {
                HOURS_PER_DAY
            } else {
                hour_of_day(event.end_time)
            },
            description: event.description.clone(),
        })
        .collect();

    let (driving, on_duty) = events
        .iter()
        .filter(|event| event.start_time.date() == date)
        .fold((0.0, 0.0), |(driving, on_duty), event| match event.status {
            DutyStatus::Driving => (driving + event.duration, on_duty + event.duration),
            DutyStatus::OnDuty => (driving, on_duty + event.duration),
            DutyStatus::Sleeper | DutyStatus::OffDuty => (driving, on_duty),
        });

    (timeline, driving, on_duty)
}

/// Every event is clipped to `date`; totals count only the hours inside it.
fn carried_page(date: NaiveDate, events: &[DutyEvent]) -> (Vec<TimelineSegment>, f64, f64) {
    let mut timeline = Vec::with_capacity(events.len());
    let mut driving = 0.0;
    let mut on_duty = 0.0;

    for event in events {
        let overlap = overlap_hours(date, event);
        if overlap <= 0.0 {
            continue;
        }

        let start = if event.start_time.date() < date {
            0.0
        } else {
            hour_of_day(event.start_time)
        };
        let end = if event.end_time.date() > date {
            HOURS_PER_DAY
        } else {
            hour_of_day(event.end_time)
        };

        if event.status == DutyStatus::Driving {
            driving += overlap;
        }
        if event.status.is_on_duty() {
            on_duty += overlap;
        }

        timeline.push(TimelineSegment {
            status: event.status,
            start,
            end,
            description: event.description.clone(),
        });
    }

    (timeline, driving, on_duty)
}

fn overlap_hours(date: NaiveDate, event: &DutyEvent) -> f64 {
    let day_start = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    let day_end = date
        .succ_opt()
        .and_then(|next| next.and_hms_opt(0, 0, 0))
        .unwrap_or(NaiveDateTime::MAX);
    let from = event.start_time.max(day_start);
    let to = event.end_time.min(day_end);
    if to <= from {
        return 0.0;
    }
    (to - from).num_microseconds().unwrap_or(i64::MAX) as f64 / 3_600_000_000.0
}

/// Fractional hour of the day, to the minute.
pub fn hour_of_day(time: NaiveDateTime) -> f64 {
    f64::from(time.hour()) + f64::from(time.minute()) / 60.0
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn totals_and_segments_for_a_single_day() {
        let events = vec![
            DutyEvent::new(DutyStatus::Driving, at(1, 8, 0), 2.5, "Driving to Pickup"),
            DutyEvent::new(DutyStatus::OnDuty, at(1, 10, 30), 1.0, "Pickup"),
            DutyEvent::new(DutyStatus::Sleeper, at(1, 11, 30), 10.0, "Required rest break"),
        ];
        let log = build_daily_log(day(1), &events, MidnightPolicy::Truncate);

        assert_eq!(log.date, day(1));
        assert_eq!(log.timeline.len(), 3);
        assert_eq!(log.timeline[0].start, 8.0);
        assert_eq!(log.timeline[0].end, 10.5);
        assert_eq!(log.timeline[2].end, 21.5);
        assert_eq!(
            log.totals,
            DayTotals {
                driving: 2.5,
                on_duty: 3.5,
                off_duty: 20.5
            }
        );
    }

    #[test]
    fn truncate_clips_at_midnight() {
        let events = vec![DutyEvent::new(
            DutyStatus::Driving,
            at(1, 20, 0),
            6.0,
            "Driving to Dropoff",
        )];
        let log = build_daily_log(day(1), &events, MidnightPolicy::Truncate);

        assert_eq!(log.timeline[0].start, 20.0);
        assert_eq!(log.timeline[0].end, 24.0);
        // The whole event still counts toward the day it started on.
        assert_eq!(log.totals.driving, 6.0);
        assert_eq!(log.totals.off_duty, 18.0);
    }

    #[test]
    fn carry_splits_hours_across_days() {
        let event = DutyEvent::new(DutyStatus::Driving, at(1, 20, 0), 6.0, "Driving to Dropoff");

        let first = build_daily_log(day(1), &[event.clone()], MidnightPolicy::Carry);
        assert_eq!(first.timeline[0].end, 24.0);
        assert_eq!(first.totals.driving, 4.0);

        let second = build_daily_log(day(2), &[event], MidnightPolicy::Carry);
        assert_eq!(second.timeline[0].start, 0.0);
        assert_eq!(second.timeline[0].end, 2.0);
        assert_eq!(second.totals.driving, 2.0);
        assert_eq!(second.totals.off_duty, 22.0);
    }

    #[test]
    fn carry_drops_zero_length_remainders() {
        let event = DutyEvent::new(DutyStatus::OnDuty, at(1, 23, 0), 1.0, "Dropoff");
        let next = build_daily_log(day(2), &[event], MidnightPolicy::Carry);
        assert!(next.timeline.is_empty());
        assert_eq!(next.totals.on_duty, 0.0);
    }

    #[test]
    fn hour_of_day_ignores_seconds() {
        let time = day(1).and_hms_opt(13, 45, 59).unwrap();
        assert_eq!(hour_of_day(time), 13.75);
    }

    #[test]
    fn rounds_to_two_decimals() {
        assert_eq!(round2(11.666_666), 11.67);
        assert_eq!(round2(-3.004), -3.0);
    }
}
