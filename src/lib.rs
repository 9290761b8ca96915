//! Geofenced employee attendance core: the daily check-in/break/check-out
//! lifecycle, on-time streak bookkeeping, per-user statistics, and manager
//! rollups, behind a pluggable record store.
//!
//! The HTTP layer, authentication, and the real persistence engine live
//! outside this crate; embedders implement [`store::AttendanceStore`] and
//! [`store::UserStore`] (or use [`store::memory::MemoryStore`]) and stamp
//! each action with the request time.

pub mod config;
pub mod error;
pub mod geofence;
pub mod model;
pub mod service;
pub mod store;

pub use config::Config;
pub use error::{AttendanceError, AttendanceResult};
