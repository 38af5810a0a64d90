use glam::{Mat4, Vec2, Vec3};
use std::f32::consts::{PI, TAU};

use crate::controller::InputState;

/// Walk animation of the loaded model, driven by the movement keys.
///
/// The model is drawn after a half turn about Z, so `position` lives in that
/// flipped frame: screen-right is -X and screen-up is -Y.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Motion {
    pub position: Vec3,
    pub beta: f32,
    pub phi: f32,
    pub theta: f32,
}

impl Motion {
    /// Units per second.
    pub const SPEED: f32 = 0.8;
    /// How far the model may wander from the origin on each axis.
    pub const BOUND: f32 = 1.0;
    const BETA_RATE: f32 = 2.0 * PI;
    const PHI_RATE: f32 = 3.0 * PI;
    const THETA_RATE: f32 = PI;

    pub fn update(&mut self, dt: f32, input: &InputState) {
        let screen = input.direction_vector();
        if screen == Vec2::ZERO || dt <= 0.0 {
            return;
        }

        let step = screen.normalize() * Self::SPEED * dt;
        self.position.x = (self.position.x - step.x).clamp(-Self::BOUND, Self::BOUND);
        self.position.y = (self.position.y - step.y).clamp(-Self::BOUND, Self::BOUND);

        self.beta = (self.beta + Self::BETA_RATE * dt).rem_euclid(TAU);
        self.phi = (self.phi + Self::PHI_RATE * dt).rem_euclid(TAU);
        self.theta = (self.theta + Self::THETA_RATE * dt).rem_euclid(TAU);
    }

    /// Nodding pitch about X.
    pub fn pitch(&self) -> f32 {
        -PI / 12.0 * self.beta.cos() - self.phi.sin() / 4.0
    }

    /// Swaying yaw about Y.
    pub fn yaw(&self) -> f32 {
        self.theta.sin() / 3.0
    }

    /// `Rz(pi) * T(position) * Rx(pitch) * Ry(yaw)`
    pub fn transform(&self) -> Mat4 {
        Mat4::from_rotation_z(PI)
            * Mat4::from_translation(self.position)
            * Mat4::from_rotation_x(self.pitch())
            * Mat4::from_rotation_y(self.yaw())
    }
}

impl Default for Motion {
    fn default() -> Self {
        Self { position: Vec3::ZERO, beta: 0.0, phi: 0.0, theta: 0.0 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Direction;

    #[test]
    fn test_idle_motion_holds_pose() {
        let mut motion = Motion::default();
        motion.update(0.5, &InputState::default());
        assert_eq!(motion, Motion::default());
        assert!((motion.pitch() + PI / 12.0).abs() < 1e-6);
        assert_eq!(motion.yaw(), 0.0);
    }

    #[test]
    fn test_walking_moves_and_stays_in_bounds() {
        let mut input = InputState::default();
        input.set(Direction::Right);

        let mut motion = Motion::default();
        motion.update(0.25, &input);
        assert!(motion.position.x < 0.0, "Right is -X in the flipped frame");
        assert!(motion.beta > 0.0 && motion.theta > 0.0);

        for _ in 0..100 {
            motion.update(0.25, &input);
        }
        assert_eq!(motion.position.x, -Motion::BOUND);
        assert!(motion.beta < TAU && motion.phi < TAU && motion.theta < TAU);
    }

    #[test]
    fn test_transform_flips_half_turn() {
        let motion = Motion { position: Vec3::new(0.5, 0.0, 0.0), ..Default::default() };
        let origin = motion.transform().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(-0.5, 0.0, 0.0)).length() < 1e-5);
    }
}
