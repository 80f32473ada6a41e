// src/sim/mod.rs
pub mod replay;

pub use replay::{TickRecord, replay, write_csv};
