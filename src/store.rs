//! Collaborator contracts and an in-memory implementation of all three.

use crate::data::{
    Booking, BookingId, Examiner, ExaminerId, Group, GroupId, Interval, MAX_DURATION_MINUTES, Module,
    NewBooking, Room, RoomId, Task, TaskId,
};
use crate::error::{BookingRejection, InsertError, StoreError};
use chrono::NaiveDate;
use itertools::Itertools;
use log::{trace, warn};
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Which resource a booking query is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Examiner,
    Room,
}

/// Enumerates modules that still lack an exam.
pub trait TaskSource {
    fn pending_tasks(&self) -> Result<Vec<Task>, StoreError>;
}

/// Examiners and rooms available for the whole run.
pub trait ResourceCatalog {
    fn examiners(&self) -> Result<Vec<Examiner>, StoreError>;
    fn rooms(&self) -> Result<Vec<Room>, StoreError>;
}

/// Existing bookings, and the only write path for new ones.
pub trait BookingStore {
    /// Whether `resource_id` has a booking on `date` intersecting `interval`.
    fn overlaps(
        &self,
        kind: ResourceKind,
        resource_id: u32,
        date: NaiveDate,
        interval: Interval,
    ) -> Result<bool, StoreError>;

    /// Commits a booking atomically, or rejects it if it breaks an integrity rule.
    fn insert(&self, booking: NewBooking) -> Result<Booking, InsertError>;
}

#[derive(Debug)]
struct State {
    groups: HashMap<GroupId, Group>,
    modules: HashMap<TaskId, Module>,
    examiners: HashMap<ExaminerId, Examiner>,
    rooms: HashMap<RoomId, Room>,
    bookings: Vec<Booking>,
    next_id: BookingId,
}

impl State {
    fn task(&self, task_id: TaskId) -> Result<Task, StoreError> {
        let module = self
            .modules
            .get(&task_id)
            .ok_or_else(|| StoreError::malformed("task source", format!("no module {task_id}")))?;
        let group = self.groups.get(&module.group_id).ok_or_else(|| {
            StoreError::malformed(
                "task source",
                format!("module {} references missing group {}", module.id, module.group_id),
            )
        })?;
        Ok(Task {
            id: module.id,
            name: module.name.clone(),
            group_id: group.id,
            department_id: group.department_id,
            headcount: group.enrolled,
        })
    }

    fn check(&self, booking: &NewBooking) -> Result<(), InsertError> {
        if booking.duration_minutes == 0 || booking.duration_minutes > MAX_DURATION_MINUTES {
            return Err(StoreError::malformed(
                "booking store",
                format!(
                    "duration of {} minutes is outside 1..={}",
                    booking.duration_minutes, MAX_DURATION_MINUTES
                ),
            )
            .into());
        }
        if !self.modules.contains_key(&booking.task_id) {
            return Err(BookingRejection::UnknownTask(booking.task_id).into());
        }
        if !self.examiners.contains_key(&booking.examiner_id) {
            return Err(BookingRejection::UnknownExaminer(booking.examiner_id).into());
        }
        let room = self
            .rooms
            .get(&booking.room_id)
            .ok_or(BookingRejection::UnknownRoom(booking.room_id))?;
        let task = self.task(booking.task_id)?;

        if let Some(existing) = self.bookings.iter().find(|b| b.task_id == task.id) {
            return Err(BookingRejection::TaskAlreadyScheduled {
                task_id: task.id,
                booking_id: existing.id,
            }
            .into());
        }
        if room.capacity < task.headcount {
            return Err(BookingRejection::InsufficientCapacity {
                room_id: room.id,
                capacity: room.capacity,
                headcount: task.headcount,
            }
            .into());
        }

        let interval = booking.interval();
        let clashing: Vec<&Booking> = self
            .bookings
            .iter()
            .filter(|b| b.clashes_with(booking.date, interval))
            .collect();
        if let Some(b) = clashing.iter().find(|b| b.examiner_id == booking.examiner_id) {
            return Err(BookingRejection::ExaminerBusy {
                examiner_id: booking.examiner_id,
                booking_id: b.id,
            }
            .into());
        }
        if let Some(b) = clashing.iter().find(|b| b.room_id == booking.room_id) {
            return Err(BookingRejection::RoomBusy {
                room_id: booking.room_id,
                booking_id: b.id,
            }
            .into());
        }
        if let Some(b) = clashing.iter().find(|b| {
            self.modules
                .get(&b.task_id)
                .is_some_and(|m| m.group_id == task.group_id)
        }) {
            return Err(BookingRejection::GroupBusy {
                group_id: task.group_id,
                booking_id: b.id,
            }
            .into());
        }
        Ok(())
    }
}

/// Thread-safe store enforcing the same integrity rules a database would.
#[derive(Debug)]
pub struct InMemoryStore {
    state: Mutex<State>,
}

impl InMemoryStore {
    pub fn new(
        groups: Vec<Group>,
        modules: Vec<Module>,
        examiners: Vec<Examiner>,
        rooms: Vec<Room>,
    ) -> Self {
        let state = State {
            groups: groups.into_iter().map(|g| (g.id, g)).collect(),
            modules: modules.into_iter().map(|m| (m.id, m)).collect(),
            examiners: examiners.into_iter().map(|e| (e.id, e)).collect(),
            rooms: rooms.into_iter().map(|r| (r.id, r)).collect(),
            bookings: Vec::new(),
            next_id: 1,
        };
        Self {
            state: Mutex::new(state),
        }
    }

    /// Loads a booking made outside the scheduler, keeping its identity.
    pub fn restore(&self, booking: Booking) -> Result<(), InsertError> {
        let mut state = self.lock()?;
        let candidate = NewBooking {
            date: booking.date,
            start_time: booking.start_time,
            duration_minutes: booking.duration_minutes,
            task_id: booking.task_id,
            examiner_id: booking.examiner_id,
            room_id: booking.room_id,
        };
        state.check(&candidate)?;
        if state.bookings.iter().any(|b| b.id == booking.id) {
            return Err(StoreError::malformed(
                "booking store",
                format!("duplicate booking id {}", booking.id),
            )
            .into());
        }
        let after = booking.id.checked_add(1).ok_or_else(|| {
            StoreError::malformed("booking store", format!("booking id {} is out of range", booking.id))
        })?;
        state.next_id = state.next_id.max(after);
        state.bookings.push(booking);
        Ok(())
    }

    /// Snapshot of every committed booking, ordered by identity.
    pub fn bookings(&self) -> Result<Vec<Booking>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .bookings
            .iter()
            .cloned()
            .sorted_by_key(|b| b.id)
            .collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, StoreError> {
        self.state
            .lock()
            .map_err(|e| StoreError::unavailable("booking store", e.to_string()))
    }
}

impl TaskSource for InMemoryStore {
    fn pending_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let state = self.lock()?;
        let booked: HashSet<TaskId> = state.bookings.iter().map(|b| b.task_id).collect();
        state
            .modules
            .keys()
            .filter(|id| !booked.contains(*id))
            .sorted()
            .map(|id| state.task(*id))
            .collect()
    }
}

impl ResourceCatalog for InMemoryStore {
    fn examiners(&self) -> Result<Vec<Examiner>, StoreError> {
        let state = self.lock()?;
        Ok(state
            .examiners
            .values()
            .cloned()
            .sorted_by_key(|e| e.id)
            .collect())
    }

    fn rooms(&self) -> Result<Vec<Room>, StoreError> {
        let state = self.lock()?;
        Ok(state.rooms.values().cloned().sorted_by_key(|r| r.id).collect())
    }
}

impl BookingStore for InMemoryStore {
    fn overlaps(
        &self,
        kind: ResourceKind,
        resource_id: u32,
        date: NaiveDate,
        interval: Interval,
    ) -> Result<bool, StoreError> {
        let state = self.lock()?;
        Ok(state.bookings.iter().any(|b| {
            let owner = match kind {
                ResourceKind::Examiner => b.examiner_id,
                ResourceKind::Room => b.room_id,
            };
            owner == resource_id && b.clashes_with(date, interval)
        }))
    }

    fn insert(&self, booking: NewBooking) -> Result<Booking, InsertError> {
        let mut state = self.lock()?;
        if let Err(e) = state.check(&booking) {
            warn!("Rejected booking for task {}: {}", booking.task_id, e);
            return Err(e);
        }
        let id = state.next_id;
        state.next_id = id
            .checked_add(1)
            .ok_or_else(|| StoreError::malformed("booking store", "booking ids exhausted"))?;
        let committed = Booking::from_new(id, booking);
        trace!("Committed booking {:?}", committed);
        state.bookings.push(committed.clone());
        Ok(committed)
    }
}
