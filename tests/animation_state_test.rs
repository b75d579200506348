//! Long-run checks over the pure animation state machine. No GPU required.

use veilcast::animator::{
    MAX_VEIL_OPACITY, MIN_VEIL_OPACITY, MODEL_START_POSITION, MOVEMENT_AMPLITUDE, MOVEMENT_SPEED,
    SceneAnimator,
};

#[test]
fn time_accumulator_is_monotonic_and_fixed_step() {
    let mut animator = SceneAnimator::new();
    let mut last = animator.time();
    for frame in 1..=5_000 {
        animator.advance();
        assert!(animator.time() > last);
        last = animator.time();
        let expected = frame as f64 * MOVEMENT_SPEED;
        assert!((animator.time() - expected).abs() < 1e-9);
    }
}

#[test]
fn frames_before_load_are_motionless_no_ops() {
    let mut animator = SceneAnimator::new();
    assert!(!animator.model_present());
    // A long stretch of frames with no model: never a pose, never a panic.
    for _ in 0..10_000 {
        assert!(animator.advance().is_none());
    }
}

#[test]
fn load_transition_is_one_way() {
    let mut animator = SceneAnimator::new();
    animator.set_model_present();
    assert!(animator.model_present());
    for _ in 0..100 {
        assert!(animator.advance().is_some());
    }
}

#[test]
fn pose_invariants_hold_over_a_long_session() {
    let mut animator = SceneAnimator::new();
    animator.set_model_present();

    // Enough frames to cover several full oscillation periods.
    for _ in 0..50_000 {
        let pose = animator.advance().expect("model is present");

        let z_min = MODEL_START_POSITION[2] as f64 - MOVEMENT_AMPLITUDE;
        let z_max = MODEL_START_POSITION[2] as f64 + MOVEMENT_AMPLITUDE;
        assert!(pose.model_z >= z_min && pose.model_z <= z_max);

        assert!(pose.veil_opacity >= MIN_VEIL_OPACITY && pose.veil_opacity <= MAX_VEIL_OPACITY);

        assert!(pose.fog_near >= 8.0 && pose.fog_near <= 12.0);
        assert!(pose.fog_far >= 16.0 && pose.fog_far <= 20.0);
        assert!((pose.fog_far - pose.fog_near - 8.0).abs() < 1e-9);
    }
}

#[test]
fn veil_is_most_opaque_when_model_is_farthest() {
    let mut animator = SceneAnimator::new();
    animator.set_model_present();

    let mut poses = Vec::new();
    // A full period of the oscillation (2 * pi / 0.001 frames).
    for _ in 0..6_284 {
        poses.push(animator.advance().expect("model is present"));
    }

    let farthest = poses
        .iter()
        .min_by(|a, b| a.model_z.total_cmp(&b.model_z))
        .unwrap();
    let closest = poses
        .iter()
        .max_by(|a, b| a.model_z.total_cmp(&b.model_z))
        .unwrap();
    assert!(farthest.veil_opacity > closest.veil_opacity);
    // The fog band also sits closest to the camera at the back extreme.
    assert!(farthest.fog_near < closest.fog_near);
}
