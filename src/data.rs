use crate::config::SchedulerConfig;
use crate::report::{Occupancy, SchedulingResult};
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

// Type aliases for clarity
pub type TaskId = u32;
pub type ExaminerId = u32;
pub type RoomId = u32;
pub type GroupId = u32;
pub type DepartmentId = u32;
pub type BookingId = u32;

/// Longest exam a booking may cover.
pub const MAX_DURATION_MINUTES: u32 = 24 * 60;

/// A cohort of students following the same programme.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    pub department_id: DepartmentId,
    pub enrolled: u32,
}

/// A course module as stored by the external system.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: TaskId,
    pub name: String,
    pub group_id: GroupId,
}

/// A module that still needs an exam, with its derived headcount.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub name: String,
    pub group_id: GroupId,
    pub department_id: DepartmentId,
    pub headcount: u32,
}

/// Someone who can supervise an exam.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Examiner {
    pub id: ExaminerId,
    pub name: String,
    pub department_id: DepartmentId,
}

/// Represents a physical room with a given capacity.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
}

/// A booking that has not been committed yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub task_id: TaskId,
    pub examiner_id: ExaminerId,
    pub room_id: RoomId,
}

impl NewBooking {
    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.duration_minutes)
    }
}

/// A committed exam.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: BookingId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    pub task_id: TaskId,
    pub examiner_id: ExaminerId,
    pub room_id: RoomId,
}

impl Booking {
    pub fn from_new(id: BookingId, booking: NewBooking) -> Self {
        Self {
            id,
            date: booking.date,
            start_time: booking.start_time,
            duration_minutes: booking.duration_minutes,
            task_id: booking.task_id,
            examiner_id: booking.examiner_id,
            room_id: booking.room_id,
        }
    }

    pub fn interval(&self) -> Interval {
        Interval::new(self.start_time, self.duration_minutes)
    }

    /// Same date and intersecting time ranges.
    pub fn clashes_with(&self, date: NaiveDate, interval: Interval) -> bool {
        self.date == date && self.interval().overlaps(&interval)
    }
}

/// A candidate (date, start time) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub date: NaiveDate,
    pub start_time: NaiveTime,
}

impl Slot {
    pub fn interval(&self, duration_minutes: u32) -> Interval {
        Interval::new(self.start_time, duration_minutes)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.date, self.start_time.format("%H:%M"))
    }
}

/// Half-open minute range `[start, end)` within a single date.
///
/// Minutes are counted from midnight; an exam running past midnight simply
/// ends above 1440 and is still compared against bookings of its start date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    pub start: u32,
    pub end: u32,
}

impl Interval {
    pub fn new(start_time: NaiveTime, duration_minutes: u32) -> Self {
        let start = start_time.num_seconds_from_midnight() / 60;
        Self {
            start,
            end: start.saturating_add(duration_minutes),
        }
    }

    /// Touching intervals (one ends exactly when the other starts) do not overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// The complete input for one scheduling request.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingInput {
    pub groups: Vec<Group>,
    pub modules: Vec<Module>,
    pub examiners: Vec<Examiner>,
    pub rooms: Vec<Room>,
    /// Exams already on the calendar.
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub config: SchedulerConfig,
}

/// The final output of a scheduling request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingOutput {
    pub result: SchedulingResult,
    pub bookings: Vec<Booking>,
    pub room_occupation: Vec<Occupancy>,
    pub examiner_load: Vec<Occupancy>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_interval_overlap_is_half_open() {
        let morning = Interval::new(at(9, 0), 120);
        assert!(morning.overlaps(&Interval::new(at(10, 0), 120)));
        assert!(morning.overlaps(&Interval::new(at(8, 0), 90)));
        assert!(morning.overlaps(&Interval::new(at(9, 30), 10)));
        assert!(!morning.overlaps(&Interval::new(at(11, 0), 120)));
        assert!(!morning.overlaps(&Interval::new(at(7, 0), 120)));
    }

    #[test]
    fn test_huge_duration_saturates_instead_of_wrapping() {
        let endless = Interval::new(at(9, 0), u32::MAX);
        assert_eq!(endless.end, u32::MAX);
        assert!(endless.overlaps(&Interval::new(at(11, 0), 120)));
    }

    #[test]
    fn test_booking_clash_requires_same_date() {
        let day = NaiveDate::from_ymd_opt(2026, 6, 1).unwrap();
        let booking = Booking {
            id: 1,
            date: day,
            start_time: at(9, 0),
            duration_minutes: 120,
            task_id: 1,
            examiner_id: 1,
            room_id: 1,
        };
        let probe = Interval::new(at(10, 0), 60);
        assert!(booking.clashes_with(day, probe));
        assert!(!booking.clashes_with(day.succ_opt().unwrap(), probe));
    }

    #[test]
    fn test_slot_display() {
        let slot = Slot {
            date: NaiveDate::from_ymd_opt(2026, 6, 1).unwrap(),
            start_time: at(9, 0),
        };
        assert_eq!(slot.to_string(), "2026-06-01 at 09:00");
    }
}
