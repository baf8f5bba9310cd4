use crate::attempt::Infeasibility;
use crate::data::{Booking, BookingId, Examiner, ExaminerId, Room, RoomId, Task, TaskId};
use chrono::{NaiveDate, NaiveTime};
use itertools::Itertools;
use serde::Serialize;
use std::collections::HashMap;

/// Where a task ended up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub booking_id: BookingId,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub examiner_id: ExaminerId,
    pub examiner_name: String,
    pub room_id: RoomId,
    pub room_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutcome {
    pub task_id: TaskId,
    pub status: OutcomeStatus,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placement: Option<Placement>,
}

/// The result of one scheduling run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulingResult {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    /// In task-processing order.
    pub details: Vec<TaskOutcome>,
}

/// Collects per-task outcomes in processing order.
#[derive(Debug, Default)]
pub struct OutcomeReporter {
    result: SchedulingResult,
}

impl OutcomeReporter {
    pub fn new(total: usize) -> Self {
        Self {
            result: SchedulingResult {
                total,
                ..SchedulingResult::default()
            },
        }
    }

    pub fn placed(&mut self, task: &Task, placement: Placement) {
        let message = format!(
            "Module '{}' scheduled on {} at {} with {} in {}",
            task.name,
            placement.date,
            placement.start_time.format("%H:%M"),
            placement.examiner_name,
            placement.room_name
        );
        self.result.success += 1;
        self.result.details.push(TaskOutcome {
            task_id: task.id,
            status: OutcomeStatus::Success,
            message,
            placement: Some(placement),
        });
    }

    pub fn failed(&mut self, task: &Task, attempts: u32, last_reason: Option<&Infeasibility>) {
        let message = match last_reason {
            Some(reason) => format!(
                "Module '{}' could not be scheduled after {} attempts: {}",
                task.name, attempts, reason
            ),
            None => format!(
                "Module '{}' could not be scheduled: no slot available after {} attempts",
                task.name, attempts
            ),
        };
        self.result.failed += 1;
        self.result.details.push(TaskOutcome {
            task_id: task.id,
            status: OutcomeStatus::Failed,
            message,
            placement: None,
        });
    }

    pub fn finish(self) -> SchedulingResult {
        self.result
    }
}

/// Bookings held by one room or examiner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Occupancy {
    pub id: u32,
    pub name: String,
    pub bookings: usize,
}

/// Bookings per room, busiest first. Unused rooms are listed with zero.
pub fn room_occupation(rooms: &[Room], bookings: &[Booking]) -> Vec<Occupancy> {
    let counts = bookings.iter().counts_by(|b| b.room_id);
    rank(rooms.iter().map(|r| (r.id, r.name.as_str())), &counts)
}

/// Bookings per examiner, busiest first. Idle examiners are listed with zero.
pub fn examiner_load(examiners: &[Examiner], bookings: &[Booking]) -> Vec<Occupancy> {
    let counts = bookings.iter().counts_by(|b| b.examiner_id);
    rank(examiners.iter().map(|e| (e.id, e.name.as_str())), &counts)
}

fn rank<'a>(
    entries: impl Iterator<Item = (u32, &'a str)>,
    counts: &HashMap<u32, usize>,
) -> Vec<Occupancy> {
    entries
        .map(|(id, name)| Occupancy {
            id,
            name: name.to_string(),
            bookings: counts.get(&id).copied().unwrap_or(0),
        })
        .sorted_by(|a, b| b.bookings.cmp(&a.bookings).then_with(|| a.name.cmp(&b.name)))
        .collect()
}
