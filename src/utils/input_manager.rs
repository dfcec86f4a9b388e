use winit::event::{KeyEvent, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};
use crate::particles::StopHandle;

/// Maps window input onto the frame loop's stop request.
pub struct InputManager {}

impl InputManager {
    pub fn new() -> InputManager {
        InputManager {}
    }

    /// Returns true when the event asked the particle field to stop.
    pub fn manage_input(&self, event: &WindowEvent, stop_handle: &StopHandle) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                stop_handle.stop();
                true
            }
            WindowEvent::KeyboardInput {
                event:
                KeyEvent {
                    physical_key: PhysicalKey::Code(code),
                    state: key_state,
                    ..
                },
                ..
            } => self.handle_key(stop_handle, code, key_state.is_pressed()),
            _ => false,
        }
    }

    fn handle_key(&self, stop_handle: &StopHandle, code: &KeyCode, is_pressed: bool) -> bool {
        match (code, is_pressed) {
            (KeyCode::Escape, true) => {
                stop_handle.stop();
                true
            }
            _ => false,
        }
    }
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}
