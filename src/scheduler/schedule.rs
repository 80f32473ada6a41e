// src/scheduler/schedule.rs
use serde::{Deserialize, Serialize};

use crate::motion::{GaitParameters, MotionError, SnakeJoints};

/// A command issued to the model once the control loop reaches `at` seconds.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ScheduledCommand {
    pub at: f64,
    #[serde(default)]
    pub gait: Option<GaitParameters>,
    #[serde(default)]
    pub target_speed: Option<f64>,
}

/// Time-ordered commands, each released exactly once.
#[derive(Debug, Clone, Default)]
pub struct CommandSchedule {
    commands: Vec<ScheduledCommand>,
    next: usize,
}

impl CommandSchedule {
    pub fn new(mut commands: Vec<ScheduledCommand>) -> Self {
        // Stable sort keeps file order for commands sharing a timestamp
        commands.sort_by(|a, b| a.at.total_cmp(&b.at));
        Self { commands, next: 0 }
    }

    /// Commands that became due at or before `now` since the last call.
    pub fn due(&mut self, now: f64) -> &[ScheduledCommand] {
        let start = self.next;
        while self.next < self.commands.len() && self.commands[self.next].at <= now {
            self.next += 1;
        }
        &self.commands[start..self.next]
    }

    /// Issue every due command to `snake`, returning how many were issued.
    pub fn apply_due(&mut self, now: f64, snake: &mut SnakeJoints) -> Result<usize, MotionError> {
        let due = self.due(now).to_vec();
        for command in &due {
            if let Some(speed) = command.target_speed {
                snake.set_target_speed(speed)?;
            }
            if let Some(gait) = command.gait {
                snake.request_gait(gait)?;
            }
            tracing::info!("Issued scheduled command for t={:.3}s at t={:.3}s", command.at, now);
        }
        Ok(due.len())
    }

    pub fn remaining(&self) -> usize {
        self.commands.len() - self.next
    }

    pub fn is_finished(&self) -> bool {
        self.remaining() == 0
    }
}
