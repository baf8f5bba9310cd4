//! Commits one exam for one task at one slot.

use crate::data::{Examiner, NewBooking, Room, Slot, Task};
use crate::error::{BookingRejection, InsertError, StoreError};
use crate::report::Placement;
use crate::store::BookingStore;
use log::warn;
use std::fmt;

/// Why a slot could not be used for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Infeasibility {
    NoExaminer,
    NoRoom { headcount: u32 },
    Rejected(BookingRejection),
}

impl fmt::Display for Infeasibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Infeasibility::NoExaminer => write!(f, "no examiner available"),
            Infeasibility::NoRoom { headcount } => {
                write!(f, "no free room seats {} students", headcount)
            }
            Infeasibility::Rejected(reason) => write!(f, "booking rejected: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Placed(Placement),
    Infeasible(Infeasibility),
}

/// Inserts the booking. A store rejection is an ordinary outcome; only a
/// store fault is an error.
pub fn commit<B: BookingStore + ?Sized>(
    store: &B,
    task: &Task,
    slot: Slot,
    examiner: &Examiner,
    room: &Room,
    duration_minutes: u32,
) -> Result<AttemptOutcome, StoreError> {
    let booking = NewBooking {
        date: slot.date,
        start_time: slot.start_time,
        duration_minutes,
        task_id: task.id,
        examiner_id: examiner.id,
        room_id: room.id,
    };
    match store.insert(booking) {
        Ok(committed) => Ok(AttemptOutcome::Placed(Placement {
            booking_id: committed.id,
            date: committed.date,
            start_time: committed.start_time,
            examiner_id: examiner.id,
            examiner_name: examiner.name.clone(),
            room_id: room.id,
            room_name: room.name.clone(),
        })),
        Err(InsertError::Rejected(reason)) => {
            warn!("Task {} not placed at {}: {}", task.id, slot, reason);
            Ok(AttemptOutcome::Infeasible(Infeasibility::Rejected(reason)))
        }
        Err(InsertError::Fault(e)) => Err(e),
    }
}
