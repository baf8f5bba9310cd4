//! Walks candidate exam slots day by day.

use crate::config::SchedulerConfig;
use crate::data::Slot;
use chrono::{Days, NaiveDate, NaiveTime, TimeDelta, Timelike};

/// Position in the planning horizon, shared by every task of a run.
///
/// The cursor only moves forward. It is threaded through the driver by value
/// so that each run starts from a fresh, explicit position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeCursor {
    date: NaiveDate,
    time: NaiveTime,
    consumed_today: u32,
    day_start: NaiveTime,
    increment: TimeDelta,
    daily_cap: u32,
    closing_hour: u32,
}

impl TimeCursor {
    pub fn new(config: &SchedulerConfig, today: NaiveDate) -> Self {
        Self {
            date: config.first_day(today),
            time: config.start_time,
            consumed_today: 0,
            day_start: config.start_time,
            increment: TimeDelta::minutes(i64::from(config.slot_increment_minutes)),
            daily_cap: config.slots_per_day,
            closing_hour: config.closing_hour,
        }
    }

    pub fn current(&self) -> Slot {
        Slot {
            date: self.date,
            start_time: self.time,
        }
    }

    pub fn consumed_today(&self) -> u32 {
        self.consumed_today
    }

    /// Moves to the next candidate slot.
    ///
    /// Rolls over to the next morning once the daily cap is reached or the
    /// next start would fall at or after closing time.
    pub fn advance(&mut self) {
        if self.consumed_today >= self.daily_cap {
            self.next_day();
            return;
        }
        let (next, wrapped) = self.time.overflowing_add_signed(self.increment);
        if wrapped != 0 || next.hour() >= self.closing_hour {
            self.next_day();
        } else {
            self.time = next;
        }
    }

    /// Records a booking at the current slot. Failed attempts never count.
    pub fn mark_consumed(&mut self) {
        self.consumed_today += 1;
    }

    fn next_day(&mut self) {
        self.date = self
            .date
            .checked_add_days(Days::new(1))
            .unwrap_or(self.date);
        self.time = self.day_start;
        self.consumed_today = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 6, d).unwrap()
    }

    fn at(h: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, 0, 0).unwrap()
    }

    fn cursor(slots_per_day: u32) -> TimeCursor {
        let config = SchedulerConfig {
            start_date: Some(day(1)),
            slots_per_day,
            ..SchedulerConfig::default()
        };
        TimeCursor::new(&config, day(1))
    }

    #[test]
    fn test_starts_at_configured_slot() {
        let c = cursor(4);
        assert_eq!(c.current(), Slot { date: day(1), start_time: at(9) });
        assert_eq!(c.consumed_today(), 0);
    }

    #[test]
    fn test_defaults_to_day_after_run_date() {
        let c = TimeCursor::new(&SchedulerConfig::default(), day(1));
        assert_eq!(c.current().date, day(2));
    }

    #[test]
    fn test_unconsumed_slots_roll_at_closing_hour() {
        let mut c = cursor(4);
        let mut seen = vec![c.current()];
        for _ in 0..5 {
            c.advance();
            seen.push(c.current());
        }
        let times: Vec<_> = seen.iter().map(|s| (s.date, s.start_time)).collect();
        assert_eq!(
            times,
            vec![
                (day(1), at(9)),
                (day(1), at(11)),
                (day(1), at(13)),
                (day(1), at(15)),
                (day(1), at(17)),
                (day(2), at(9)),
            ]
        );
    }

    #[test]
    fn test_daily_cap_forces_rollover() {
        let mut c = cursor(1);
        c.mark_consumed();
        c.advance();
        assert_eq!(c.current(), Slot { date: day(2), start_time: at(9) });
        assert_eq!(c.consumed_today(), 0);
    }

    #[test]
    fn test_cap_counts_only_consumed_slots() {
        let mut c = cursor(2);
        c.advance();
        c.advance();
        c.mark_consumed();
        c.advance();
        assert_eq!(c.current(), Slot { date: day(1), start_time: at(15) });
        c.mark_consumed();
        c.advance();
        assert_eq!(c.current().date, day(2));
    }

    #[test]
    fn test_increment_past_midnight_rolls() {
        let config = SchedulerConfig {
            start_date: Some(day(1)),
            start_time: at(22),
            closing_hour: 24,
            slot_increment_minutes: 180,
            ..SchedulerConfig::default()
        };
        let mut c = TimeCursor::new(&config, day(1));
        c.advance();
        assert_eq!(c.current(), Slot { date: day(2), start_time: at(22) });
    }
}
