// CONTROLLER: Input, trackballs, and the per-frame update
pub mod input;
pub mod trackball;
pub mod viewer_state;

pub use input::{Direction, InputState, MouseButton, ViewerEvent};
pub use trackball::Trackball;
pub use viewer_state::{Projection, ViewerState};
