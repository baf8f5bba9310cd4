//! Error types for scheduling runs and the booking store.

use crate::data::{BookingId, ExaminerId, GroupId, RoomId, TaskId};
use thiserror::Error;

/// Integrity violations the booking store reports on insert.
///
/// A rejection is never fatal to a run: the driver moves on to the next slot.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingRejection {
    #[error("task {task_id} already has booking {booking_id}")]
    TaskAlreadyScheduled {
        task_id: TaskId,
        booking_id: BookingId,
    },
    #[error("examiner {examiner_id} is busy (booking {booking_id})")]
    ExaminerBusy {
        examiner_id: ExaminerId,
        booking_id: BookingId,
    },
    #[error("room {room_id} is busy (booking {booking_id})")]
    RoomBusy {
        room_id: RoomId,
        booking_id: BookingId,
    },
    #[error("students of group {group_id} already sit another exam (booking {booking_id})")]
    GroupBusy {
        group_id: GroupId,
        booking_id: BookingId,
    },
    #[error("room {room_id} holds {capacity} but {headcount} students are expected")]
    InsufficientCapacity {
        room_id: RoomId,
        capacity: u32,
        headcount: u32,
    },
    #[error("unknown task {0}")]
    UnknownTask(TaskId),
    #[error("unknown examiner {0}")]
    UnknownExaminer(ExaminerId),
    #[error("unknown room {0}")]
    UnknownRoom(RoomId),
}

/// A collaborator could not answer: unreachable or returned garbage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{collaborator} is unavailable: {message}")]
    Unavailable {
        collaborator: &'static str,
        message: String,
    },
    #[error("{collaborator} returned malformed data: {message}")]
    Malformed {
        collaborator: &'static str,
        message: String,
    },
}

impl StoreError {
    pub fn unavailable(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Unavailable {
            collaborator,
            message: message.into(),
        }
    }

    pub fn malformed(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self::Malformed {
            collaborator,
            message: message.into(),
        }
    }
}

/// Outcome of a failed insert.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsertError {
    #[error("booking rejected: {0}")]
    Rejected(#[from] BookingRejection),
    #[error(transparent)]
    Fault(#[from] StoreError),
}

/// Run-level errors. Task-level failures are reported in the result instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("collaborator fault: {0}")]
    Collaborator(#[from] StoreError),
}
