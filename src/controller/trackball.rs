use glam::{Mat4, Quat, Vec2, Vec3};

/// Virtual trackball: dragging rotates about the axis perpendicular to the
/// drag on a unit sphere, and the rotation keeps spinning after release at the
/// last measured angular velocity.
#[derive(Debug, Clone)]
pub struct Trackball {
    rotation: Quat,
    axis: Vec3,
    /// Radians per second.
    velocity: f32,
    last_position: Vec3,
    tracking: bool,
    /// Angle dragged since the last `update`, used to measure velocity.
    pending_angle: f32,
    viewport: Vec2,
}

impl Trackball {
    pub fn new() -> Self {
        Self {
            rotation: Quat::IDENTITY,
            axis: Vec3::Y,
            velocity: 0.0,
            last_position: Vec3::Z,
            tracking: false,
            pending_angle: 0.0,
            viewport: Vec2::ONE,
        }
    }

    pub fn resize_viewport(&mut self, width: u32, height: u32) {
        self.viewport = Vec2::new(width.max(1) as f32, height.max(1) as f32);
    }

    pub fn set_axis(&mut self, axis: Vec3) {
        let axis = axis.normalize_or_zero();
        self.axis = if axis == Vec3::ZERO { Vec3::Y } else { axis };
    }

    pub fn set_velocity(&mut self, velocity: f32) {
        self.velocity = velocity;
    }

    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }

    pub fn mouse_press(&mut self, position: Vec2) {
        self.last_position = self.project(position);
        self.tracking = true;
        self.velocity = 0.0;
        self.pending_angle = 0.0;
    }

    pub fn mouse_move(&mut self, position: Vec2) {
        if !self.tracking {
            return;
        }

        let current = self.project(position);
        let axis = self.last_position.cross(current);
        if axis.length_squared() < 1e-12 {
            return;
        }

        let angle = self.last_position.angle_between(current);
        self.axis = axis.normalize();
        self.rotation = (Quat::from_axis_angle(self.axis, angle) * self.rotation).normalize();
        self.pending_angle += angle;
        self.last_position = current;
    }

    pub fn mouse_release(&mut self, position: Vec2) {
        self.mouse_move(position);
        self.tracking = false;
        self.pending_angle = 0.0;
    }

    /// Advance time: measures drag velocity while tracking, spins otherwise.
    pub fn update(&mut self, dt: f32) {
        if dt <= 0.0 {
            return;
        }
        if self.tracking {
            self.velocity = self.pending_angle / dt;
            self.pending_angle = 0.0;
        } else if self.velocity != 0.0 {
            let spin = Quat::from_axis_angle(self.axis, self.velocity * dt);
            self.rotation = (spin * self.rotation).normalize();
        }
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_quat(self.rotation)
    }

    /// Maps a cursor position in pixels onto the unit sphere (or its rim).
    fn project(&self, position: Vec2) -> Vec3 {
        let x = 2.0 * position.x / self.viewport.x - 1.0;
        let y = 1.0 - 2.0 * position.y / self.viewport.y;
        let d2 = x * x + y * y;
        if d2 <= 1.0 {
            Vec3::new(x, y, (1.0 - d2).sqrt())
        } else {
            Vec3::new(x, y, 0.0).normalize()
        }
    }
}

impl Default for Trackball {
    fn default() -> Self {
        Self::new()
    }
}
