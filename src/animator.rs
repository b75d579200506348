//! Pure per-frame animation state.
//!
//! The animator owns the time accumulator and derives everything else from it:
//! the model's z offset, the veil opacity and the fog band. Nothing in here
//! touches the GPU, so the whole motion model is testable without a surface
//! or device. The app applies the resulting [`FramePose`] to uniforms and
//! buffers each frame.

/// Fixed time increment per rendered frame.
///
/// The accumulator advances by this amount on every frame, not by wall-clock
/// time, so animation speed scales with the display refresh rate. That is the
/// intended behavior of this demo, not an oversight.
pub const MOVEMENT_SPEED: f64 = 0.001;

/// Half-width of the z oscillation around the model's start position.
pub const MOVEMENT_AMPLITUDE: f64 = 1.0;

/// Veil opacity when the model is at its closest (forward) extreme.
pub const MIN_VEIL_OPACITY: f64 = 0.2;
/// Veil opacity when the model is at its farthest (back) extreme.
pub const MAX_VEIL_OPACITY: f64 = 0.5;

/// Fog band start/end distances with the model at its midpoint, and how far
/// the whole band slides toward the camera as the model recedes.
pub const FOG_NEAR_AT_REST: f64 = 12.0;
pub const FOG_FAR_AT_REST: f64 = 20.0;
pub const FOG_SHIFT: f64 = 4.0;

/// Where the loaded model is placed: slightly above the floor, well behind
/// the veil plane.
pub const MODEL_START_POSITION: [f32; 3] = [0.0, 1.0, -11.0];

/// Everything the renderer needs to apply for one frame of animation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FramePose {
    /// Absolute z position for the model this frame.
    pub model_z: f64,
    /// Veil plane opacity, in `[MIN_VEIL_OPACITY, MAX_VEIL_OPACITY]`.
    pub veil_opacity: f64,
    /// Fog band start distance.
    pub fog_near: f64,
    /// Fog band end distance.
    pub fog_far: f64,
}

/// Compute the pose for a given accumulator value.
///
/// `sin(time)` drives the oscillation; `back_position` normalizes it to
/// `[0, 1]` where 1 means the model is at its farthest excursion. Veil
/// opacity interpolates linearly with it and the fog band slides closer by
/// up to [`FOG_SHIFT`] units.
pub fn pose_at(time: f64) -> FramePose {
    let movement_factor = movement_factor(time);
    let back_position = back_position(movement_factor);
    FramePose {
        model_z: MODEL_START_POSITION[2] as f64 + movement_factor * MOVEMENT_AMPLITUDE,
        veil_opacity: MIN_VEIL_OPACITY + back_position * (MAX_VEIL_OPACITY - MIN_VEIL_OPACITY),
        fog_near: FOG_NEAR_AT_REST - back_position * FOG_SHIFT,
        fog_far: FOG_FAR_AT_REST - back_position * FOG_SHIFT,
    }
}

/// The sine-wave value driving position and opacity, in `[-1, 1]`.
pub fn movement_factor(time: f64) -> f64 {
    time.sin()
}

/// Normalized measure of how far the model is into its backward excursion:
/// 0 at the forward extreme, 1 at the back extreme.
pub fn back_position(movement_factor: f64) -> f64 {
    (1.0 - movement_factor) / 2.0
}

/// The animation state machine: a time accumulator plus the one-way
/// "model absent" -> "model present" flag.
///
/// The flag flips exactly once, when the async load completes. Until then
/// [`advance`](Self::advance) keeps ticking the accumulator but yields no
/// pose, so the renderer draws the background, lights, fog and veil with
/// their initial values and nothing else moves.
#[derive(Debug)]
pub struct SceneAnimator {
    time: f64,
    model_present: bool,
}

impl SceneAnimator {
    pub fn new() -> Self {
        Self {
            time: 0.0,
            model_present: false,
        }
    }

    /// Advance one frame and return the pose to apply, if a model is loaded.
    pub fn advance(&mut self) -> Option<FramePose> {
        self.time += MOVEMENT_SPEED;
        if !self.model_present {
            return None;
        }
        Some(pose_at(self.time))
    }

    /// Mark the model as loaded. Irreversible; called once from the load
    /// completion event.
    pub fn set_model_present(&mut self) {
        self.model_present = true;
    }

    pub fn model_present(&self) -> bool {
        self.model_present
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}

impl Default for SceneAnimator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn factor_and_back_position_stay_in_range() {
        let mut time = 0.0;
        while time < 4.0 * PI {
            let factor = movement_factor(time);
            assert!((-1.0..=1.0).contains(&factor));
            let back = back_position(factor);
            assert!((0.0..=1.0).contains(&back));
            time += 0.0137;
        }
    }

    #[test]
    fn veil_and_fog_stay_in_range_for_any_time() {
        let mut time = 0.0;
        while time < 4.0 * PI {
            let pose = pose_at(time);
            assert!((MIN_VEIL_OPACITY..=MAX_VEIL_OPACITY).contains(&pose.veil_opacity));
            assert!((8.0..=12.0).contains(&pose.fog_near));
            assert!((16.0..=20.0).contains(&pose.fog_far));
            time += 0.0137;
        }
    }

    #[test]
    fn fog_band_width_is_constant() {
        for step in 0..10_000 {
            let pose = pose_at(step as f64 * 0.003);
            assert_relative_eq!(pose.fog_far - pose.fog_near, 8.0);
        }
    }

    #[test]
    fn pose_at_time_zero_is_the_midpoint() {
        let pose = pose_at(0.0);
        assert_relative_eq!(movement_factor(0.0), 0.0);
        assert_relative_eq!(back_position(0.0), 0.5);
        assert_relative_eq!(pose.model_z, -11.0);
        assert_relative_eq!(pose.veil_opacity, 0.35);
        assert_relative_eq!(pose.fog_near, 10.0);
        assert_relative_eq!(pose.fog_far, 18.0);
    }

    #[test]
    fn pose_at_forward_extreme() {
        let pose = pose_at(PI / 2.0);
        assert_relative_eq!(movement_factor(PI / 2.0), 1.0);
        assert_relative_eq!(back_position(1.0), 0.0);
        assert_relative_eq!(pose.model_z, -10.0);
        assert_relative_eq!(pose.veil_opacity, 0.2);
        assert_relative_eq!(pose.fog_near, 12.0);
        assert_relative_eq!(pose.fog_far, 20.0);
    }

    #[test]
    fn pose_at_back_extreme() {
        let pose = pose_at(3.0 * PI / 2.0);
        assert_relative_eq!(movement_factor(3.0 * PI / 2.0), -1.0);
        assert_relative_eq!(back_position(-1.0), 1.0);
        assert_relative_eq!(pose.model_z, -12.0);
        assert_relative_eq!(pose.veil_opacity, 0.5);
        assert_relative_eq!(pose.fog_near, 8.0);
        assert_relative_eq!(pose.fog_far, 16.0);
    }

    #[test]
    fn advance_without_model_ticks_time_but_yields_no_pose() {
        let mut animator = SceneAnimator::new();
        for _ in 0..100 {
            assert!(animator.advance().is_none());
        }
        assert_relative_eq!(animator.time(), 100.0 * MOVEMENT_SPEED);
    }

    #[test]
    fn first_pose_after_load_reflects_accumulated_time() {
        let mut animator = SceneAnimator::new();
        for _ in 0..250 {
            animator.advance();
        }
        animator.set_model_present();
        let pose = animator.advance().expect("model is present");
        // Accumulate the same way the animator does; 251 additions of 0.001
        // are not the same float as one multiplication.
        let mut expected_time = 0.0;
        for _ in 0..251 {
            expected_time += MOVEMENT_SPEED;
        }
        assert_eq!(pose, pose_at(expected_time));
    }
}
