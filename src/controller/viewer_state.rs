use glam::{Mat4, Vec2, Vec3, Vec4};
use std::f32::consts::{FRAC_PI_2, TAU};

use super::input::{InputState, MouseButton, ViewerEvent};
use super::trackball::Trackball;
use crate::config::LIT_PROGRAM_COUNT;
use crate::model::{Lighting, MappingMode, Material, ModelInfo, Motion, TextureVariant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Orthographic,
    Perspective,
}

impl Projection {
    pub const ALL: [Projection; 2] = [Projection::Orthographic, Projection::Perspective];

    pub fn label(self) -> &'static str {
        match self {
            Projection::Orthographic => "Orthographic",
            Projection::Perspective => "Perspective",
        }
    }

    pub fn matrix(self, aspect: f32) -> Mat4 {
        match self {
            Projection::Orthographic => Mat4::orthographic_rh(-aspect, aspect, -1.0, 1.0, 0.1, 5.0),
            Projection::Perspective => Mat4::perspective_rh(45f32.to_radians(), aspect, 0.1, 5.0),
        }
    }
}

/// Everything the viewer mutates between frames that does not live on the GPU.
pub struct ViewerState {
    pub input: InputState,
    pub model_trackball: Trackball,
    pub light_trackball: Trackball,
    pub lighting: Lighting,
    pub material: Material,
    pub mapping_mode: MappingMode,
    pub projection: Projection,
    pub motion: Motion,
    cursor: Vec2,
    zoom: f32,
    angle: f32,
    texture_variant: TextureVariant,
    current_program: usize,
    program_count: usize,
    viewport: (u32, u32),
    model_rotation: Mat4,
    view_matrix: Mat4,
    proj_matrix: Mat4,
}

impl ViewerState {
    pub const ZOOM_STEP: f32 = 0.2;
    pub const ZOOM_MIN: f32 = -1.5;
    pub const ZOOM_MAX: f32 = 1.0;
    /// Light direction before the light trackball rotation.
    pub const LIGHT_DIR: Vec4 = Vec4::new(-1.0, -1.0, -1.0, 0.0);
    /// Idle spin of the model trackball, radians per second.
    pub const INITIAL_SPIN: f32 = 0.1;

    pub fn new(program_count: usize, width: u32, height: u32) -> Self {
        let mut state = Self {
            input: InputState::default(),
            model_trackball: Trackball::new(),
            light_trackball: Trackball::new(),
            lighting: Lighting::default(),
            material: Material::default(),
            mapping_mode: MappingMode::default(),
            projection: Projection::default(),
            motion: Motion::default(),
            cursor: Vec2::ZERO,
            zoom: 0.0,
            angle: 0.0,
            texture_variant: TextureVariant::default(),
            current_program: 0,
            program_count,
            viewport: (width.max(1), height.max(1)),
            model_rotation: Mat4::IDENTITY,
            view_matrix: Mat4::IDENTITY,
            proj_matrix: Mat4::IDENTITY,
        };
        state.resize(width, height);
        state.reset_spin();
        state
    }

    pub fn handle_event(&mut self, event: &ViewerEvent) {
        match *event {
            ViewerEvent::KeyDown(dir) => self.input.set(dir),
            ViewerEvent::KeyUp(dir) => self.input.reset(dir),
            ViewerEvent::FocusLost => self.input.clear(),
            ViewerEvent::CursorMoved(pos) => {
                self.cursor = pos;
                self.model_trackball.mouse_move(pos);
                self.light_trackball.mouse_move(pos);
            }
            ViewerEvent::MouseDown(MouseButton::Primary) => self.model_trackball.mouse_press(self.cursor),
            ViewerEvent::MouseDown(MouseButton::Secondary) => self.light_trackball.mouse_press(self.cursor),
            ViewerEvent::MouseUp(MouseButton::Primary) => self.model_trackball.mouse_release(self.cursor),
            ViewerEvent::MouseUp(MouseButton::Secondary) => self.light_trackball.mouse_release(self.cursor),
            ViewerEvent::Wheel(delta) => {
                if delta != 0.0 {
                    let step = if delta > 0.0 { Self::ZOOM_STEP } else { -Self::ZOOM_STEP };
                    self.zoom = (self.zoom + step).clamp(Self::ZOOM_MIN, Self::ZOOM_MAX);
                }
            }
            ViewerEvent::Resized { width, height } => self.resize(width, height),
        }
    }

    fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = (width, height);
        self.model_trackball.resize_viewport(width, height);
        self.light_trackball.resize_viewport(width, height);
    }

    /// Per-frame update, run once before drawing.
    pub fn update(&mut self, dt: f32) {
        self.model_trackball.update(dt);
        self.light_trackball.update(dt);

        self.model_rotation = self.model_trackball.matrix();
        self.angle = (self.angle + 3.0 * FRAC_PI_2 * dt).rem_euclid(TAU);

        self.view_matrix = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 2.0 + self.zoom), Vec3::ZERO, Vec3::Y);
        self.proj_matrix = self.projection.matrix(self.aspect());

        self.motion.update(dt, &self.input);
    }

    /// Trackball rotation followed by the walk animation.
    pub fn model_matrix(&self) -> Mat4 {
        self.model_rotation * self.motion.transform()
    }

    pub fn view_matrix(&self) -> Mat4 {
        self.view_matrix
    }

    pub fn projection_matrix(&self) -> Mat4 {
        self.proj_matrix
    }

    /// Inverse transpose of the model-view upper 3x3, widened back to 4x4.
    pub fn normal_matrix(&self) -> Mat4 {
        let model_view = glam::Mat3::from_mat4(self.view_matrix * self.model_matrix());
        Mat4::from_mat3(model_view.inverse().transpose())
    }

    pub fn light_direction(&self) -> Vec4 {
        (self.light_trackball.rotation() * Self::LIGHT_DIR.truncate()).extend(0.0)
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Decorative angle in [0, 2pi), advancing at 3pi/2 radians per second.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    pub fn aspect(&self) -> f32 {
        self.viewport.0 as f32 / self.viewport.1 as f32
    }

    pub fn texture_variant(&self) -> TextureVariant {
        self.texture_variant
    }

    /// Advance to the next built-in texture. The caller reloads the model.
    pub fn cycle_texture(&mut self) -> TextureVariant {
        self.texture_variant = self.texture_variant.next();
        self.texture_variant
    }

    pub fn current_program(&self) -> usize {
        self.current_program
    }

    pub fn program_count(&self) -> usize {
        self.program_count
    }

    /// Returns true when the active program changed and the model must be
    /// rebound to it.
    pub fn select_program(&mut self, index: usize) -> bool {
        if index >= self.program_count || index == self.current_program {
            return false;
        }
        self.current_program = index;
        true
    }

    /// Light and material uniforms only matter to the lit programs.
    pub fn shows_lighting_panel(&self) -> bool {
        self.current_program < LIT_PROGRAM_COUNT
    }

    /// Republish material constants and pick the mapping mode for a freshly
    /// loaded model. GUI edits to the previous material are discarded.
    pub fn apply_loaded_model(&mut self, info: &ModelInfo) {
        self.material = info.material;
        self.mapping_mode = MappingMode::for_mesh(info.has_uv);
    }

    /// Restore the slow idle spin about (1, 1, 1).
    pub fn reset_spin(&mut self) {
        self.model_trackball.set_axis(Vec3::ONE);
        self.model_trackball.set_velocity(Self::INITIAL_SPIN);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Direction;
    use std::path::PathBuf;

    fn state() -> ViewerState {
        ViewerState::new(6, 800, 600)
    }

    fn wheel(state: &mut ViewerState, delta: f32, notches: usize) {
        for _ in 0..notches {
            state.handle_event(&ViewerEvent::Wheel(delta));
        }
    }

    #[test]
    fn test_key_events_toggle_input_bits() {
        let mut s = state();
        s.handle_event(&ViewerEvent::KeyDown(Direction::Left));
        s.handle_event(&ViewerEvent::KeyDown(Direction::Up));
        assert!(s.input.is_set(Direction::Left) && s.input.is_set(Direction::Up));

        s.handle_event(&ViewerEvent::KeyUp(Direction::Left));
        assert!(!s.input.is_set(Direction::Left));
        assert!(s.input.is_set(Direction::Up));

        s.handle_event(&ViewerEvent::FocusLost);
        assert_eq!(s.input.bits(), 0);
    }

    #[test]
    fn test_zoom_steps_and_clamps() {
        for n in 0..10 {
            let mut s = state();
            wheel(&mut s, 1.0, n);
            let expected = (n as f32 * 0.2).min(1.0);
            assert!((s.zoom() - expected).abs() < 1e-5, "{n} notches up: {}", s.zoom());

            let mut s = state();
            wheel(&mut s, -3.0, n);
            let expected = (-(n as f32) * 0.2).max(-1.5);
            assert!((s.zoom() - expected).abs() < 1e-5, "{n} notches down: {}", s.zoom());
        }
    }

    #[test]
    fn test_four_cycles_restore_texture() {
        let mut s = state();
        let start = s.texture_variant();
        for _ in 0..3 {
            assert_ne!(s.cycle_texture(), start);
        }
        assert_eq!(s.cycle_texture(), start);
    }

    #[test]
    fn test_select_program_reports_changes_once() {
        let mut s = state();
        assert!(!s.select_program(0), "Already active");
        assert!(s.select_program(4));
        assert_eq!(s.current_program(), 4);
        assert!(!s.shows_lighting_panel());
        assert!(!s.select_program(4));
        assert!(!s.select_program(6), "Out of range is ignored");
        assert!(s.select_program(1));
        assert!(s.shows_lighting_panel());
    }

    #[test]
    fn test_loaded_model_sets_mapping_and_material() {
        let mut s = state();
        s.material.shininess = 3.0;
        let mut info = ModelInfo {
            path: PathBuf::from("cat.obj"),
            triangles: 12,
            has_uv: true,
            material: Material::default(),
        };
        s.apply_loaded_model(&info);
        assert_eq!(s.mapping_mode, MappingMode::FromMesh);
        assert_eq!(s.material, Material::default(), "GUI edits are overwritten");

        info.has_uv = false;
        s.apply_loaded_model(&info);
        assert_eq!(s.mapping_mode, MappingMode::Triplanar);
    }

    #[test]
    fn test_mouse_buttons_route_to_their_trackball() {
        let mut s = state();
        s.handle_event(&ViewerEvent::CursorMoved(Vec2::new(400.0, 300.0)));
        s.handle_event(&ViewerEvent::MouseDown(MouseButton::Secondary));
        assert!(s.light_trackball.is_tracking());
        assert!(!s.model_trackball.is_tracking());

        s.handle_event(&ViewerEvent::CursorMoved(Vec2::new(500.0, 300.0)));
        s.handle_event(&ViewerEvent::MouseUp(MouseButton::Secondary));
        assert!(!s.light_trackball.is_tracking());
        assert_ne!(s.light_direction(), ViewerState::LIGHT_DIR);
    }

    #[test]
    fn test_update_wraps_angle_and_places_camera() {
        let mut s = state();
        wheel(&mut s, 1.0, 2);
        for _ in 0..10 {
            s.update(0.5);
            assert!((0.0..TAU).contains(&s.angle()));
        }

        let eye = s.view_matrix().inverse().transform_point3(Vec3::ZERO);
        assert!((eye - Vec3::new(0.0, 0.0, 2.4)).length() < 1e-4);
        assert!(s.model_trackball.velocity() > 0.0, "Idle spin is on by default");
    }

    #[test]
    fn test_resize_updates_aspect() {
        let mut s = state();
        s.handle_event(&ViewerEvent::Resized { width: 1000, height: 500 });
        assert_eq!(s.viewport(), (1000, 500));
        assert_eq!(s.aspect(), 2.0);

        s.handle_event(&ViewerEvent::Resized { width: 0, height: 500 });
        assert_eq!(s.viewport(), (1000, 500), "Minimized windows keep the last size");
    }
}
