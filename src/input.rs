use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
    MouseEventKind,
};
use glam::Vec2;
use ratatui::layout::Rect;
use std::time::Duration;

use crate::app::Phase;
use crate::arena::FrameInput;

/// Frames a key counts as held after its last press or repeat, on terminals
/// that never report key releases
const HOLD_FRAMES: u32 = 6;

/// Represents semantic game actions that can be triggered by input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Pause,
    Resume,
    Restart,
    Quit,
    /// Pick the offered upgrade at this index
    ChooseUpgrade(usize),
}

/// Tracks the state of keys that can be held down for continuous input
#[derive(Debug, Default)]
struct KeyState {
    up: bool,
    down: bool,
    left: bool,
    right: bool,
    fire: bool,
}

/// Latest mouse state, in terminal cells
#[derive(Debug, Default)]
struct PointerState {
    cell: Option<(u16, u16)>,
    pressed: bool,
}

/// Manages input polling and translates raw terminal events into game input
pub struct InputManager {
    key_state: KeyState,
    pointer: PointerState,
    oneshot_actions: Vec<InputAction>,
    reports_release: bool,
    idle_frames: u32,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new(true)
    }
}

impl InputManager {
    /// `reports_release` says whether the terminal sends key release events.
    pub fn new(reports_release: bool) -> Self {
        Self {
            key_state: KeyState::default(),
            pointer: PointerState::default(),
            oneshot_actions: Vec::new(),
            reports_release,
            idle_frames: 0,
        }
    }

    /// Polls for all input events and stores one-shot actions
    /// Should be called once per frame before getting actions
    pub fn poll_events(&mut self, phase: Phase) -> color_eyre::Result<()> {
        self.oneshot_actions.clear();
        self.idle_frames = self.idle_frames.saturating_add(1);

        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key_event) => self.handle_key_event(key_event, phase),
                Event::Mouse(mouse_event) => self.handle_mouse_event(mouse_event),
                Event::FocusLost => self.key_state = KeyState::default(),
                // Resize is picked up from the terminal size every frame
                _ => {}
            }
        }

        if !self.reports_release && self.idle_frames > HOLD_FRAMES {
            self.key_state = KeyState::default();
        }

        Ok(())
    }

    /// Processes a key event and updates key state and one-shot actions
    pub fn handle_key_event(&mut self, key_event: KeyEvent, phase: Phase) {
        match key_event.kind {
            KeyEventKind::Press => self.handle_key_press(key_event, phase),
            KeyEventKind::Repeat => {
                self.idle_frames = 0;
                self.set_held(key_event.code, true);
            }
            KeyEventKind::Release => self.set_held(key_event.code, false),
        }
    }

    fn handle_key_press(&mut self, key_event: KeyEvent, phase: Phase) {
        // Quit works in any phase
        if matches!(
            key_event.code,
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
        ) || (key_event.code == KeyCode::Char('c')
            && key_event.modifiers.contains(KeyModifiers::CONTROL))
        {
            self.oneshot_actions.push(InputAction::Quit);
            return;
        }

        match (phase, key_event.code) {
            (Phase::Playing, KeyCode::Char('p') | KeyCode::Char('P')) => {
                self.oneshot_actions.push(InputAction::Pause);
                return;
            }
            (Phase::Paused, KeyCode::Char('p') | KeyCode::Char('P')) => {
                self.oneshot_actions.push(InputAction::Resume);
                return;
            }
            (Phase::ChoosingUpgrade, KeyCode::Char(c @ '1'..='3')) => {
                let index = c as usize - '1' as usize;
                self.oneshot_actions.push(InputAction::ChooseUpgrade(index));
                return;
            }
            (Phase::GameOver, KeyCode::Char('r') | KeyCode::Char('R')) => {
                self.oneshot_actions.push(InputAction::Restart);
                return;
            }
            _ => {}
        }

        if phase == Phase::Playing {
            self.idle_frames = 0;
            self.set_held(key_event.code, true);
        }
    }

    fn set_held(&mut self, code: KeyCode, held: bool) {
        match code {
            KeyCode::Char('w') | KeyCode::Char('W') | KeyCode::Up => {
                self.key_state.up = held;
                if held {
                    self.key_state.down = false;
                }
            }
            KeyCode::Char('s') | KeyCode::Char('S') | KeyCode::Down => {
                self.key_state.down = held;
                if held {
                    self.key_state.up = false;
                }
            }
            KeyCode::Char('a') | KeyCode::Char('A') | KeyCode::Left => {
                self.key_state.left = held;
                if held {
                    self.key_state.right = false;
                }
            }
            KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Right => {
                self.key_state.right = held;
                if held {
                    self.key_state.left = false;
                }
            }
            KeyCode::Char(' ') => self.key_state.fire = held,
            _ => {}
        }
    }

    /// Tracks pointer position and the left button
    pub fn handle_mouse_event(&mut self, mouse_event: MouseEvent) {
        self.pointer.cell = Some((mouse_event.column, mouse_event.row));
        match mouse_event.kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                self.pointer.pressed = true;
            }
            MouseEventKind::Up(MouseButton::Left) => self.pointer.pressed = false,
            _ => {}
        }
    }

    /// Returns the one-shot actions gathered by the last poll
    pub fn get_actions(&self) -> &[InputAction] {
        &self.oneshot_actions
    }

    /// Builds this frame's arena input. `world_area` is where the world is
    /// drawn and `cell` is the world size of one terminal cell.
    pub fn frame_input(&self, world_area: Rect, cell: Vec2) -> FrameInput {
        let pointer = self.pointer.cell.and_then(|(column, row)| {
            let inside = column >= world_area.x
                && column < world_area.x + world_area.width
                && row >= world_area.y
                && row < world_area.y + world_area.height;
            inside.then(|| {
                // Aim at the centre of the cell
                let local = Vec2::new(
                    (column - world_area.x) as f32 + 0.5,
                    (row - world_area.y) as f32 + 0.5,
                );
                local * cell
            })
        });

        FrameInput {
            up: self.key_state.up,
            down: self.key_state.down,
            left: self.key_state.left,
            right: self.key_state.right,
            pointer,
            fire: self.key_state.fire || self.pointer.pressed,
        }
    }
}
