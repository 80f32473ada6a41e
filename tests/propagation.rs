// Integration tests for head-to-tail propagation of gait changes

#[cfg(test)]
mod tests {
    use slither_rs::{GaitParameters, PropagationPolicy, SnakeJoints};

    const INITIAL: GaitParameters = GaitParameters { a: 0.8, b: 0.01, c: 0.0 };

    fn short_snake(policy: PropagationPolicy) -> SnakeJoints {
        // 4 segments of 100, travelling 100 per second
        SnakeJoints::with_policy(INITIAL, 4, 400.0, 100.0, policy).unwrap()
    }

    #[test]
    fn test_change_reaches_each_segment_at_head_distance() {
        let mut snake = short_snake(PropagationPolicy::SingleStep);
        let updated = GaitParameters::new(0.3, 0.02, 0.0);
        snake.arm(0.0);
        snake.step(1.0).unwrap();
        let trigger = snake.head_distance();
        assert_eq!(trigger, 100.0);
        snake.request_gait(updated).unwrap();

        let mut now = 1.0;
        while now <= 5.0 {
            snake.step(now).unwrap();
            for segment in 0..=4 {
                let reached = snake.distances()[segment] >= trigger;
                let expected = if reached { updated } else { INITIAL };
                assert_eq!(
                    snake.gait(segment),
                    Some(&expected),
                    "segment {} at t={} distance {}",
                    segment,
                    now,
                    snake.distances()[segment]
                );
            }
            now += 0.5;
        }
        for segment in 0..=4 {
            assert!(snake.pending_changes(segment).unwrap().is_empty());
        }
    }

    #[test]
    fn test_change_first_visible_on_threshold_tick() {
        let mut snake = short_snake(PropagationPolicy::SingleStep);
        snake.arm(0.0);
        snake.request_change(0.1, 0.01, 0.0).unwrap();
        // Segment 2 starts 200 behind the head
        snake.step(1.5).unwrap();
        assert_eq!(snake.gait(2), Some(&INITIAL));
        snake.step(2.0).unwrap();
        assert_eq!(snake.gait(2).map(|g| g.a), Some(0.1));
        assert_eq!(snake.gait(3), Some(&INITIAL));
    }

    #[test]
    fn test_successive_changes_apply_in_fifo_order() {
        let mut snake = short_snake(PropagationPolicy::SingleStep);
        let first = GaitParameters::new(0.1, 0.01, 0.0);
        let second = GaitParameters::new(0.2, 0.01, 0.0);
        snake.arm(0.0);
        snake.request_gait(first).unwrap();
        snake.request_gait(second).unwrap();
        assert_eq!(snake.pending_changes(3).unwrap().len(), 2);

        let mut seen = Vec::new();
        let mut now = 0.0;
        for _ in 0..60 {
            snake.step(now).unwrap();
            let a = snake.gait(3).map(|g| g.a).unwrap();
            if seen.last() != Some(&a) {
                seen.push(a);
            }
            now += 0.1;
        }
        assert_eq!(seen, vec![INITIAL.a, 0.1, 0.2]);
    }

    #[test]
    fn test_single_step_lags_one_tick_per_extra_entry() {
        let mut snake = short_snake(PropagationPolicy::SingleStep);
        snake.arm(0.0);
        snake.request_change(0.1, 0.01, 0.0).unwrap();
        snake.request_change(0.2, 0.01, 0.0).unwrap();
        let report = snake.step(0.0).unwrap();
        assert_eq!(report.applied_changes, 1);
        assert_eq!(snake.gait(0).map(|g| g.a), Some(0.1));
        snake.step(0.0).unwrap();
        assert_eq!(snake.gait(0).map(|g| g.a), Some(0.2));
    }

    #[test]
    fn test_drain_applies_everything_due_in_one_tick() {
        let mut snake = short_snake(PropagationPolicy::Drain);
        snake.arm(0.0);
        snake.request_change(0.1, 0.01, 0.0).unwrap();
        snake.request_change(0.2, 0.01, 0.0).unwrap();
        let report = snake.step(0.0).unwrap();
        assert_eq!(report.applied_changes, 2);
        assert_eq!(snake.gait(0).map(|g| g.a), Some(0.2));
        // One large tick carries the whole body past the trigger
        let report = snake.step(10.0).unwrap();
        assert_eq!(report.applied_changes, 8);
        for segment in 0..=4 {
            assert_eq!(snake.gait(segment).map(|g| g.a), Some(0.2));
        }
    }

    #[test]
    fn test_new_gait_does_not_rewrite_past_phase() {
        let mut snake = short_snake(PropagationPolicy::SingleStep);
        snake.arm(0.0);
        snake.step(1.0).unwrap();
        let phase_before = snake.curvature().phase()[0];
        snake.request_change(0.8, 0.05, 0.0).unwrap();
        snake.step(1.0).unwrap();
        assert_eq!(snake.curvature().phase()[0], phase_before);
        snake.step(2.0).unwrap();
        assert!((snake.curvature().phase()[0] - (phase_before + 0.05 * 100.0)).abs() < 1e-12);
    }
}
