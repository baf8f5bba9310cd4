//! Picks a free examiner and a free room for a candidate slot.
//!
//! The checks here only read the booking store. They keep obviously doomed
//! inserts away from it, but the store's own integrity rules stay the final
//! word since another writer may book in between.

use crate::data::{DepartmentId, Examiner, Room, Slot, Task};
use crate::error::StoreError;
use crate::store::{BookingStore, ResourceKind};
use itertools::Itertools;
use log::trace;

/// First examiner free at `slot`, preferring the task's own department, then lowest id.
pub fn find_examiner<'a, B: BookingStore + ?Sized>(
    store: &B,
    examiners: &'a [Examiner],
    slot: Slot,
    duration_minutes: u32,
    department_id: DepartmentId,
) -> Result<Option<&'a Examiner>, StoreError> {
    let interval = slot.interval(duration_minutes);
    let ranked = examiners
        .iter()
        .sorted_by_key(|e| (u8::from(e.department_id != department_id), e.id));
    for examiner in ranked {
        if store.overlaps(ResourceKind::Examiner, examiner.id, slot.date, interval)? {
            trace!("Examiner {} busy at {}", examiner.id, slot);
            continue;
        }
        return Ok(Some(examiner));
    }
    Ok(None)
}

/// Smallest free room at `slot` that seats the whole task.
pub fn find_room<'a, B: BookingStore + ?Sized>(
    store: &B,
    rooms: &'a [Room],
    slot: Slot,
    duration_minutes: u32,
    task: &Task,
) -> Result<Option<&'a Room>, StoreError> {
    let interval = slot.interval(duration_minutes);
    let ranked = rooms
        .iter()
        .filter(|r| r.capacity >= task.headcount)
        .sorted_by_key(|r| (r.capacity, r.id));
    for room in ranked {
        if store.overlaps(ResourceKind::Room, room.id, slot.date, interval)? {
            trace!("Room {} busy at {}", room.id, slot);
            continue;
        }
        return Ok(Some(room));
    }
    Ok(None)
}
