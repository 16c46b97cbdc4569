// Scheduler module for reminder notification scheduling

pub mod engine;

pub use engine::{
    ReminderScheduler, DEFAULT_BODY, DEFAULT_CHANNEL_ID, REINFORCEMENT_OFFSET_SECONDS,
};
