//! Greedy exam timetabling.
//!
//! Every course module without an exam gets a date, a start time, an
//! examiner and a room, first feasible slot wins. Modules are visited in
//! ascending id order and all of them draw from one forward-moving cursor
//! over the planning horizon.
//!
//! Storage stays behind the [`store::TaskSource`], [`store::ResourceCatalog`]
//! and [`store::BookingStore`] traits; [`store::InMemoryStore`] implements
//! all three with the integrity rules a database would enforce.

pub mod attempt;
pub mod availability;
pub mod config;
pub mod cursor;
pub mod data;
pub mod error;
pub mod report;
pub mod server;
pub mod solver;
pub mod store;

pub use config::SchedulerConfig;
pub use error::SchedulerError;
pub use report::SchedulingResult;
pub use solver::solve;
