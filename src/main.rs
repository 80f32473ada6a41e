// src/main.rs - Real-time control loop driving the snake joint model
use std::env;
use std::path::Path;
use std::time::Duration;

use slither_rs::config::{self, Config};
use slither_rs::{CommandSchedule, ControlClock, SnakeJoints, StdClock};

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("Starting slither joint velocity controller");
    tracing::info!("Version: {}", env!("CARGO_PKG_VERSION"));

    // Get configuration file path
    let args: Vec<String> = env::args().collect();
    let explicit_path = args.get(1).map(String::as_str);
    let config_path = explicit_path.unwrap_or("snake.toml");

    let config = if explicit_path.is_none() && !Path::new(config_path).exists() {
        tracing::info!("No {} found, using built-in defaults", config_path);
        Config::default()
    } else {
        tracing::info!("Loading configuration from: {}", config_path);
        config::load_config(config_path).map_err(|e| {
            tracing::error!("Failed to load config from '{}': {}", config_path, e);
            Box::new(e) as Box<dyn std::error::Error + Send + Sync + 'static>
        })?
    };

    config.validate()?;

    tracing::info!(
        "Body: {} segments over {} ({} propagation)",
        config.snake.segment_count,
        config.snake.body_length,
        match config.snake.propagation {
            slither_rs::PropagationPolicy::SingleStep => "single-step",
            slither_rs::PropagationPolicy::Drain => "drain",
        }
    );
    tracing::info!(
        "Gait: a={:.4} b={:.4} c={:.4}, speed {}",
        config.gait.a,
        config.gait.b,
        config.gait.c,
        config.snake.target_speed
    );
    tracing::info!(
        "Control loop: {} Hz for {} s",
        config.control.rate_hz,
        config.control.duration
    );

    let mut snake = SnakeJoints::from_config(&config.snake, config.gait)?;
    let mut schedule = CommandSchedule::new(config.schedule.clone());
    let clock = StdClock::new();
    let period = config.control.period_duration()?;

    snake.arm_with(&clock);
    let mut ticks = 0u64;
    loop {
        let now = clock.now_seconds();
        if now > config.control.duration {
            break;
        }
        schedule.apply_due(now, &mut snake)?;
        let phis = snake.query_angular_velocities(now)?;
        ticks += 1;
        tracing::info!(
            "t={:.3}s phis=[{}]",
            now,
            phis.iter().map(|p| format!("{:.5}", p)).collect::<Vec<_>>().join(", ")
        );

        let next = ticks as f64 * period.as_secs_f64();
        let remaining = next - clock.now_seconds();
        if remaining > 0.0 {
            clock.sleep(Duration::from_secs_f64(remaining));
        }
    }

    tracing::info!("Control loop finished after {} ticks", ticks);
    Ok(())
}
