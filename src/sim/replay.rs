// src/sim/replay.rs
//! Deterministic replay of a configured run on a [`ManualClock`].

use std::io::Write;

use crate::config::Config;
use crate::motion::{MotionError, SnakeJoints};
use crate::scheduler::{CommandSchedule, ControlClock, ManualClock};

const MAX_PREALLOCATED_TICKS: usize = 1 << 16;

/// One row of replay output.
#[derive(Debug, Clone, PartialEq)]
pub struct TickRecord {
    pub time: f64,
    pub head_distance: f64,
    pub head_amplitude: f64,
    pub head_angle: f64,
    pub applied_changes: usize,
    pub phis: Vec<f64>,
}

/// Arm at t=0 and run `ticks` ticks spaced `dt` apart, issuing scheduled
/// commands before each tick they fall due on.
pub fn replay(config: &Config, ticks: usize, dt: f64) -> Result<Vec<TickRecord>, MotionError> {
    if !(dt.is_finite() && dt >= 0.0) {
        return Err(MotionError::InvalidConfig(format!("tick spacing must be >= 0, got {}", dt)));
    }
    let mut snake = SnakeJoints::from_config(&config.snake, config.gait)?;
    let mut schedule = CommandSchedule::new(config.schedule.clone());
    let clock = ManualClock::new(0.0);
    snake.arm_with(&clock);

    let mut records = Vec::with_capacity(ticks.min(MAX_PREALLOCATED_TICKS));
    for tick in 0..ticks {
        clock.set(tick as f64 * dt);
        let now = clock.now_seconds();
        schedule.apply_due(now, &mut snake)?;
        let report = snake.step(now)?;
        records.push(TickRecord {
            time: now,
            head_distance: snake.head_distance(),
            head_amplitude: snake.gait(0).map_or(f64::NAN, |g| g.a),
            head_angle: report.head_angle,
            applied_changes: report.applied_changes,
            phis: report.phis.iter().copied().collect(),
        });
    }
    tracing::info!(
        "Replayed {} ticks ({:.3}s), {} scheduled commands left",
        ticks,
        ticks as f64 * dt,
        schedule.remaining()
    );
    Ok(records)
}

/// Write records as CSV with one `phi_<joint>` column per joint.
pub fn write_csv<W: Write>(records: &[TickRecord], writer: W) -> Result<(), csv::Error> {
    let mut wtr = csv::Writer::from_writer(writer);
    let joints = records.first().map_or(0, |r| r.phis.len());
    let mut header = vec![
        "time".to_string(),
        "head_distance".to_string(),
        "head_amplitude".to_string(),
        "head_angle".to_string(),
        "applied_changes".to_string(),
    ];
    header.extend((1..=joints).map(|j| format!("phi_{}", j)));
    wtr.write_record(&header)?;
    for record in records {
        let mut row = vec![
            record.time.to_string(),
            record.head_distance.to_string(),
            record.head_amplitude.to_string(),
            record.head_angle.to_string(),
            record.applied_changes.to_string(),
        ];
        row.extend(record.phis.iter().map(f64::to_string));
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
