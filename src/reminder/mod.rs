//! Reminder scheduling: timers, the event channel between trigger and UI,
//! and the pure due/upcoming queries.

pub mod channel;
pub mod queries;
pub mod scheduler;
pub mod trigger;

pub use channel::{EventChannel, ReminderEvent, Subscription};
pub use scheduler::{MissedReminderPolicy, ReminderScheduler};
