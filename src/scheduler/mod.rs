// src/scheduler/mod.rs
pub mod clock;
pub mod schedule;

pub use clock::{ControlClock, ManualClock, StdClock};
pub use schedule::{CommandSchedule, ScheduledCommand};
