use crate::attempt::{self, AttemptOutcome, Infeasibility};
use crate::availability::{find_examiner, find_room};
use crate::config::SchedulerConfig;
use crate::cursor::TimeCursor;
use crate::data::{Examiner, Room, Task};
use crate::error::SchedulerError;
use crate::report::{OutcomeReporter, Placement, SchedulingResult};
use crate::store::{BookingStore, ResourceCatalog, TaskSource};
use chrono::NaiveDate;
use log::{debug, info, trace, warn};
use std::time::Instant;

enum Resolution {
    Placed(Placement),
    Failed(Option<Infeasibility>),
}

/// Greedily books an exam for every pending task.
///
/// Tasks are handled one at a time in ascending id order. Each gets at most
/// `max_attempts` slots, taken from a single cursor shared by the whole run,
/// so later tasks continue where earlier ones stopped. Failed slots still
/// move the cursor forward.
///
/// Store rejections only cost an attempt. A collaborator fault aborts the
/// run; bookings committed before the fault stay in place.
pub fn solve<T, C, B>(
    source: &T,
    catalog: &C,
    store: &B,
    config: &SchedulerConfig,
    today: NaiveDate,
) -> Result<SchedulingResult, SchedulerError>
where
    T: TaskSource + ?Sized,
    C: ResourceCatalog + ?Sized,
    B: BookingStore + ?Sized,
{
    config.validate()?;
    let start_time = Instant::now();

    let mut tasks = source.pending_tasks()?;
    tasks.sort_by_key(|t| t.id);
    let mut reporter = OutcomeReporter::new(tasks.len());
    if tasks.is_empty() {
        info!("No modules without an exam, nothing to schedule.");
        return Ok(reporter.finish());
    }

    let examiners = catalog.examiners()?;
    let rooms = catalog.rooms()?;
    let mut cursor = TimeCursor::new(config, today);
    info!(
        "Scheduling {} modules with {} examiners and {} rooms from {}...",
        tasks.len(),
        examiners.len(),
        rooms.len(),
        cursor.current()
    );

    for task in &tasks {
        match place_task(store, task, &examiners, &rooms, &mut cursor, config)? {
            Resolution::Placed(placement) => reporter.placed(task, placement),
            Resolution::Failed(reason) => {
                warn!(
                    "Module {} could not be placed after {} attempts",
                    task.id, config.max_attempts
                );
                reporter.failed(task, config.max_attempts, reason.as_ref());
            }
        }
    }

    let result = reporter.finish();
    info!(
        "Scheduled {}/{} modules ({} failed) in {:.2?}",
        result.success,
        result.total,
        result.failed,
        start_time.elapsed()
    );
    Ok(result)
}

fn place_task<B: BookingStore + ?Sized>(
    store: &B,
    task: &Task,
    examiners: &[Examiner],
    rooms: &[Room],
    cursor: &mut TimeCursor,
    config: &SchedulerConfig,
) -> Result<Resolution, SchedulerError> {
    let duration = config.duration_minutes;
    let mut last_reason = None;

    for _ in 0..config.max_attempts {
        let slot = cursor.current();
        let Some(examiner) = find_examiner(store, examiners, slot, duration, task.department_id)?
        else {
            trace!("Module {}: no examiner at {}", task.id, slot);
            last_reason = Some(Infeasibility::NoExaminer);
            cursor.advance();
            continue;
        };
        let Some(room) = find_room(store, rooms, slot, duration, task)? else {
            trace!("Module {}: no room for {} at {}", task.id, task.headcount, slot);
            last_reason = Some(Infeasibility::NoRoom {
                headcount: task.headcount,
            });
            cursor.advance();
            continue;
        };

        match attempt::commit(store, task, slot, examiner, room, duration)? {
            AttemptOutcome::Placed(placement) => {
                debug!(
                    "Module {} placed at {} with examiner {} in room {}",
                    task.id, slot, examiner.id, room.id
                );
                cursor.mark_consumed();
                cursor.advance();
                return Ok(Resolution::Placed(placement));
            }
            AttemptOutcome::Infeasible(reason) => {
                last_reason = Some(reason);
                cursor.advance();
            }
        }
    }

    Ok(Resolution::Failed(last_reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Group, Module};
    use crate::error::StoreError;
    use crate::report::OutcomeStatus;
    use crate::store::InMemoryStore;
    use chrono::NaiveTime;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn at(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn config() -> SchedulerConfig {
        SchedulerConfig {
            start_date: Some(day(1)),
            ..SchedulerConfig::default()
        }
    }

    fn run(store: &InMemoryStore, config: &SchedulerConfig) -> SchedulingResult {
        solve(store, store, store, config, day(1)).unwrap()
    }

    #[test]
    fn test_empty_task_list() {
        let store = InMemoryStore::new(vec![], vec![], vec![], vec![]);
        let result = run(&store, &config());
        assert_eq!(result, SchedulingResult::default());
    }

    #[test]
    fn test_invalid_config_is_run_error() {
        let store = InMemoryStore::new(vec![], vec![], vec![], vec![]);
        let config = SchedulerConfig {
            max_attempts: 0,
            ..config()
        };
        assert!(matches!(
            solve(&store, &store, &store, &config, day(1)),
            Err(SchedulerError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_no_examiners_fails_every_task() {
        let store = InMemoryStore::new(
            vec![Group { id: 1, name: "L3".into(), department_id: 1, enrolled: 10 }],
            vec![
                Module { id: 1, name: "Algebra".into(), group_id: 1 },
                Module { id: 2, name: "Physics".into(), group_id: 1 },
            ],
            vec![],
            vec![Room { id: 1, name: "B12".into(), capacity: 50 }],
        );
        let result = run(&store, &config());
        assert_eq!((result.success, result.failed, result.total), (0, 2, 2));
        assert!(result.details.iter().all(|d| d.status == OutcomeStatus::Failed));
        assert!(result.details[0].message.ends_with("no examiner available"));
    }

    #[test]
    fn test_store_rejection_costs_one_attempt() {
        // Three-hour exams on a two-hour grid: at 11:00 a second examiner and
        // room are free, but both modules share a cohort still sitting the
        // 09:00 exam, so the store refuses and the module lands at 13:00.
        let store = InMemoryStore::new(
            vec![Group { id: 1, name: "L3".into(), department_id: 1, enrolled: 10 }],
            vec![
                Module { id: 1, name: "Algebra".into(), group_id: 1 },
                Module { id: 2, name: "Physics".into(), group_id: 1 },
            ],
            vec![
                Examiner { id: 1, name: "Ada".into(), department_id: 1 },
                Examiner { id: 2, name: "Ben".into(), department_id: 1 },
            ],
            vec![
                Room { id: 1, name: "B12".into(), capacity: 50 },
                Room { id: 2, name: "B13".into(), capacity: 50 },
            ],
        );
        let config = SchedulerConfig {
            duration_minutes: 180,
            ..config()
        };
        let result = run(&store, &config);
        assert_eq!(result.success, 2);
        let second = result.details[1].placement.as_ref().unwrap();
        assert_eq!((second.date, second.start_time), (day(1), at(13)));
        assert_eq!((second.examiner_id, second.room_id), (1, 1));
    }

    #[test]
    fn test_failed_attempts_still_move_the_cursor() {
        // Module 1 needs 100 seats and can never fit; its ten attempts push
        // module 2 past two full days (five slots a day) to day 3.
        let store = InMemoryStore::new(
            vec![
                Group { id: 1, name: "Big".into(), department_id: 1, enrolled: 100 },
                Group { id: 2, name: "Small".into(), department_id: 1, enrolled: 10 },
            ],
            vec![
                Module { id: 1, name: "Algebra".into(), group_id: 1 },
                Module { id: 2, name: "Physics".into(), group_id: 2 },
            ],
            vec![Examiner { id: 1, name: "Ada".into(), department_id: 1 }],
            vec![Room { id: 1, name: "B12".into(), capacity: 50 }],
        );
        let result = run(&store, &config());
        assert_eq!(result.details[0].status, OutcomeStatus::Failed);
        let placed = result.details[1].placement.as_ref().unwrap();
        assert_eq!((placed.date, placed.start_time), (day(3), at(9)));
    }

    struct BrokenCatalog;

    impl ResourceCatalog for BrokenCatalog {
        fn examiners(&self) -> Result<Vec<Examiner>, StoreError> {
            Err(StoreError::unavailable("resource catalog", "connection refused"))
        }

        fn rooms(&self) -> Result<Vec<Room>, StoreError> {
            Ok(vec![])
        }
    }

    #[test]
    fn test_catalog_fault_aborts_run() {
        let store = InMemoryStore::new(
            vec![Group { id: 1, name: "L3".into(), department_id: 1, enrolled: 10 }],
            vec![Module { id: 1, name: "Algebra".into(), group_id: 1 }],
            vec![],
            vec![],
        );
        let err = solve(&store, &BrokenCatalog, &store, &config(), day(1)).unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::Collaborator(StoreError::Unavailable { collaborator: "resource catalog", .. })
        ));
    }
}
