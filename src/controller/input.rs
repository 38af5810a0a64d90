//! Platform-agnostic input handling

use glam::Vec2;
use winit::event::{ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Movement directions, one bit each in [`InputState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up = 0,
    Down = 1,
    Left = 2,
    Right = 3,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Arrow keys and WASD.
    pub fn from_key(code: KeyCode) -> Option<Self> {
        match code {
            KeyCode::ArrowUp | KeyCode::KeyW => Some(Direction::Up),
            KeyCode::ArrowDown | KeyCode::KeyS => Some(Direction::Down),
            KeyCode::ArrowLeft | KeyCode::KeyA => Some(Direction::Left),
            KeyCode::ArrowRight | KeyCode::KeyD => Some(Direction::Right),
            _ => None,
        }
    }

    fn bit(self) -> u8 {
        1 << self as u8
    }
}

/// Pressed movement directions as a bitset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InputState {
    bits: u8,
}

impl InputState {
    pub fn set(&mut self, dir: Direction) {
        self.bits |= dir.bit();
    }

    pub fn reset(&mut self, dir: Direction) {
        self.bits &= !dir.bit();
    }

    pub fn is_set(&self, dir: Direction) -> bool {
        self.bits & dir.bit() != 0
    }

    pub fn bits(&self) -> u8 {
        self.bits
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }

    /// Screen-space direction: +X right, +Y up. Opposite keys cancel out.
    pub fn direction_vector(&self) -> Vec2 {
        let axis = |pos: Direction, neg: Direction| {
            (self.is_set(pos) as i8 - self.is_set(neg) as i8) as f32
        };
        Vec2::new(axis(Direction::Right, Direction::Left), axis(Direction::Up, Direction::Down))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    /// Rotates the model.
    Primary,
    /// Rotates the light.
    Secondary,
}

/// Events the viewer reacts to. Everything else never makes it past
/// [`ViewerEvent::from_window_event`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerEvent {
    KeyDown(Direction),
    KeyUp(Direction),
    CursorMoved(Vec2),
    MouseDown(MouseButton),
    MouseUp(MouseButton),
    /// Vertical scroll amount; only the sign matters.
    Wheel(f32),
    Resized { width: u32, height: u32 },
    /// Window lost focus: release every key.
    FocusLost,
}

impl ViewerEvent {
    pub fn from_window_event(event: &WindowEvent) -> Option<Self> {
        match event {
            WindowEvent::KeyboardInput {
                event: KeyEvent { state, physical_key: PhysicalKey::Code(code), .. },
                ..
            } => {
                let dir = Direction::from_key(*code)?;
                Some(match state {
                    ElementState::Pressed => ViewerEvent::KeyDown(dir),
                    ElementState::Released => ViewerEvent::KeyUp(dir),
                })
            }
            WindowEvent::CursorMoved { position, .. } => {
                Some(ViewerEvent::CursorMoved(Vec2::new(position.x as f32, position.y as f32)))
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    winit::event::MouseButton::Left => MouseButton::Primary,
                    winit::event::MouseButton::Right => MouseButton::Secondary,
                    _ => return None,
                };
                Some(match state {
                    ElementState::Pressed => ViewerEvent::MouseDown(button),
                    ElementState::Released => ViewerEvent::MouseUp(button),
                })
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let dy = match delta {
                    MouseScrollDelta::LineDelta(_, y) => *y,
                    MouseScrollDelta::PixelDelta(p) => p.y as f32,
                };
                (dy != 0.0).then_some(ViewerEvent::Wheel(dy))
            }
            WindowEvent::Resized(size) => {
                Some(ViewerEvent::Resized { width: size.width, height: size.height })
            }
            WindowEvent::Focused(false) => Some(ViewerEvent::FocusLost),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_reset_touch_only_their_bit() {
        for dir in Direction::ALL {
            let mut input = InputState::default();
            input.set(dir);
            assert_eq!(input.bits(), 1 << dir as u8);
            input.set(dir);
            assert_eq!(input.bits(), 1 << dir as u8, "Repeated key-down is idempotent");

            let mut all = InputState::default();
            Direction::ALL.iter().for_each(|d| all.set(*d));
            all.reset(dir);
            for other in Direction::ALL {
                assert_eq!(all.is_set(other), other != dir);
            }
        }
    }

    #[test]
    fn test_arrow_and_wasd_keys_map_to_same_direction() {
        assert_eq!(Direction::from_key(KeyCode::ArrowUp), Some(Direction::Up));
        assert_eq!(Direction::from_key(KeyCode::KeyW), Some(Direction::Up));
        assert_eq!(Direction::from_key(KeyCode::KeyA), Some(Direction::Left));
        assert_eq!(Direction::from_key(KeyCode::ArrowRight), Some(Direction::Right));
        assert_eq!(Direction::from_key(KeyCode::Space), None);
    }

    #[test]
    fn test_direction_vector_cancels_opposites() {
        let mut input = InputState::default();
        input.set(Direction::Up);
        input.set(Direction::Right);
        assert_eq!(input.direction_vector(), Vec2::new(1.0, 1.0));

        input.set(Direction::Down);
        assert_eq!(input.direction_vector(), Vec2::new(1.0, 0.0));

        input.clear();
        assert_eq!(input.direction_vector(), Vec2::ZERO);
    }

    #[test]
    fn test_window_events_are_translated() {
        let resized = WindowEvent::Resized(winit::dpi::PhysicalSize::new(640, 480));
        assert_eq!(
            ViewerEvent::from_window_event(&resized),
            Some(ViewerEvent::Resized { width: 640, height: 480 })
        );
        assert_eq!(
            ViewerEvent::from_window_event(&WindowEvent::Focused(false)),
            Some(ViewerEvent::FocusLost)
        );
        assert_eq!(ViewerEvent::from_window_event(&WindowEvent::Focused(true)), None);
        assert_eq!(ViewerEvent::from_window_event(&WindowEvent::CloseRequested), None);
    }
}
