// src/motion/propagation.rs
//! Delayed propagation of gait changes from the head towards the tail.
//!
//! A change requested while the head is at distance `D` reaches segment `i`
//! once that segment has itself travelled to `D`, so the new shape travels
//! down the body at the same speed as the body moves.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::gait::{GaitParameters, PendingChange};

/// How many eligible changes a segment may consume per tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropagationPolicy {
    /// Only the front entry is checked, once per tick.
    #[default]
    SingleStep,
    /// Every eligible entry is applied in FIFO order within the same tick.
    Drain,
}

#[derive(Debug, Clone)]
pub struct ParameterPropagationQueue {
    queues: Vec<VecDeque<PendingChange>>,
    policy: PropagationPolicy,
}

impl ParameterPropagationQueue {
    pub fn new(segments: usize, policy: PropagationPolicy) -> Self {
        Self {
            queues: vec![VecDeque::new(); segments],
            policy,
        }
    }

    /// Queue `gait` on every segment, the head included.
    pub fn request_change(&mut self, gait: GaitParameters, head_distance: f64) {
        let change = PendingChange {
            gait,
            trigger_distance: head_distance,
        };
        for queue in self.queues.iter_mut() {
            queue.push_back(change);
        }
    }

    /// Pop due changes into `gait`, returning how many were applied.
    pub fn apply_eligible(&mut self, distances: &[f64], gait: &mut [GaitParameters]) -> usize {
        let mut applied = 0;
        for (segment, queue) in self.queues.iter_mut().enumerate() {
            let distance = distances[segment];
            while let Some(change) = queue.front().copied() {
                if !change.is_due(distance) {
                    break;
                }
                queue.pop_front();
                gait[segment] = change.gait;
                applied += 1;
                tracing::trace!(
                    "Segment {} picked up gait a={:.4} b={:.4} c={:.4} at {:.3}",
                    segment,
                    change.gait.a,
                    change.gait.b,
                    change.gait.c,
                    distance
                );
                if self.policy == PropagationPolicy::SingleStep {
                    break;
                }
            }
        }
        applied
    }

    pub fn pending(&self, segment: usize) -> Option<&VecDeque<PendingChange>> {
        self.queues.get(segment)
    }

    pub fn total_pending(&self) -> usize {
        self.queues.iter().map(VecDeque::len).sum()
    }

    pub fn policy(&self) -> PropagationPolicy {
        self.policy
    }
}
