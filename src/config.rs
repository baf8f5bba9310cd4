use crate::data::MAX_DURATION_MINUTES;
use crate::error::SchedulerError;
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

const ADDR_ENV: &str = "EXAM_SCHEDULER_ADDR";
const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Knobs for a single scheduling run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SchedulerConfig {
    /// First day to consider. `None` starts the day after the run date.
    pub start_date: Option<NaiveDate>,
    pub start_time: NaiveTime,
    pub duration_minutes: u32,
    /// Cap on exams placed per day.
    pub slots_per_day: u32,
    pub slot_increment_minutes: u32,
    /// No slot starts at or after this hour.
    pub closing_hour: u32,
    /// Slot attempts per task before giving up.
    pub max_attempts: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            start_date: None,
            start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            duration_minutes: 120,
            slots_per_day: 4,
            slot_increment_minutes: 120,
            closing_hour: 18,
            max_attempts: 10,
        }
    }
}

impl SchedulerConfig {
    pub fn validate(&self) -> Result<(), SchedulerError> {
        let invalid = |msg: &str| -> Result<(), SchedulerError> {
            Err(SchedulerError::InvalidConfig(msg.to_string()))
        };
        if self.duration_minutes == 0 {
            return invalid("exam duration must be positive");
        }
        if self.duration_minutes > MAX_DURATION_MINUTES {
            return invalid("exam duration must not exceed a day");
        }
        if self.slots_per_day == 0 {
            return invalid("at least one slot per day is required");
        }
        if self.slot_increment_minutes == 0 {
            return invalid("slot increment must be positive");
        }
        if self.max_attempts == 0 {
            return invalid("at least one attempt per task is required");
        }
        if self.closing_hour > 24 {
            return invalid("closing hour must be within the day");
        }
        if self.start_time.hour() >= self.closing_hour {
            return invalid("start time must be before the closing hour");
        }
        Ok(())
    }

    /// The configured start date, or the day after `today`.
    pub fn first_day(&self, today: NaiveDate) -> NaiveDate {
        self.start_date
            .unwrap_or_else(|| today.succ_opt().unwrap_or(today))
    }
}

/// Where the HTTP server listens.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub addr: SocketAddr,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, SchedulerError> {
        let raw = std::env::var(ADDR_ENV).unwrap_or_else(|_| DEFAULT_ADDR.to_string());
        let addr = raw
            .parse()
            .map_err(|e| SchedulerError::InvalidConfig(format!("{ADDR_ENV}={raw}: {e}")))?;
        Ok(Self { addr })
    }
}
