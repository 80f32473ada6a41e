// src/lib.rs - Joint angular-velocity model for lateral undulation of a snake robot
pub mod config;
pub mod motion;
pub mod scheduler;
pub mod sim;

pub use config::{Config, ConfigError, ControlConfig, SnakeConfig, load_config};
pub use motion::{GaitParameters, MotionError, PendingChange, PropagationPolicy, SnakeJoints, TickReport};
pub use scheduler::{CommandSchedule, ControlClock, ManualClock, ScheduledCommand, StdClock};
