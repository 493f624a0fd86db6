/// Input state tracker.
///
/// Tracks which keys are currently held down so movement and jump stay
/// continuous while a key is held. Mouse presses and terminal resizes are
/// collected per frame and handed to the main loop.
///
/// Uses crossterm's keyboard enhancement for Release events when available.
/// Falls back to timeout-based release detection on terminals that don't support it.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEventKind, poll,
};

use crate::domain::entity::{Facing, FrameInput};

/// After this duration without a Press/Repeat event, consider the key released.
/// Only used when the terminal doesn't report Release events.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

const LEFT_KEYS: [KeyCode; 3] = [KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
const RIGHT_KEYS: [KeyCode; 3] = [KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
const JUMP_KEYS: [KeyCode; 4] = [KeyCode::Char(' '), KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
const QUIT_KEYS: [KeyCode; 3] = [KeyCode::Esc, KeyCode::Char('q'), KeyCode::Char('Q')];

pub struct InputState {
    /// Timestamp of last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,

    /// Left-button presses this frame, in terminal cells (column, row).
    pub clicks: Vec<(u16, u16)>,

    /// Latest terminal size reported this frame, in cells.
    pub resized: Option<(u16, u16)>,

    quit: bool,

    /// Whether to honor Release events. Only true when keyboard
    /// enhancement is confirmed working.
    pub honor_release: bool,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            clicks: Vec::with_capacity(4),
            resized: None,
            quit: false,
            honor_release: false,
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call this once per frame, before the simulation step.
    pub fn drain_events(&mut self) {
        self.clicks.clear();
        self.resized = None;

        // Read all available events without blocking
        while poll(Duration::ZERO).unwrap_or(false) {
            match event::read() {
                Ok(ev) => self.handle_event(ev, Instant::now()),
                Err(_) => break,
            }
        }

        self.expire(Instant::now());
    }

    /// Apply a single terminal event observed at `now`.
    pub fn handle_event(&mut self, ev: Event, now: Instant) {
        match ev {
            Event::Key(key) => self.handle_key(key, now),
            Event::Mouse(m) => {
                if let MouseEventKind::Down(MouseButton::Left) = m.kind {
                    self.clicks.push((m.column, m.row));
                }
            }
            Event::Resize(cols, rows) => self.resized = Some((cols, rows)),
            _ => {}
        }
    }

    fn handle_key(&mut self, key: KeyEvent, now: Instant) {
        match key.kind {
            KeyEventKind::Release if self.honor_release => {
                self.last_active.remove(&key.code);
            }
            KeyEventKind::Release => {
                // Rely on timeout-based expiry instead
            }
            _ => {
                if is_ctrl_c(&key) || QUIT_KEYS.contains(&key.code) {
                    self.quit = true;
                }
                self.last_active.insert(key.code, now);
            }
        }
    }

    /// Forget keys not refreshed within the hold timeout.
    pub fn expire(&mut self, now: Instant) {
        self.last_active.retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is this key currently held down?
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.last_active.contains_key(&code)
    }

    /// Convenience: is any of these keys held?
    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Movement and jump for this frame. Left wins when both directions are held.
    pub fn frame_input(&self) -> FrameInput {
        let horizontal = if self.any_held(&LEFT_KEYS) {
            Some(Facing::Left)
        } else if self.any_held(&RIGHT_KEYS) {
            Some(Facing::Right)
        } else {
            None
        };
        FrameInput { horizontal, jump: self.any_held(&JUMP_KEYS) }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && (key.code == KeyCode::Char('c') || key.code == KeyCode::Char('C'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseEvent};

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn release(code: KeyCode) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        })
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent { kind, column, row, modifiers: KeyModifiers::NONE })
    }

    #[test]
    fn held_keys_map_to_frame_input() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.handle_event(press(KeyCode::Right), now);
        input.handle_event(press(KeyCode::Char(' ')), now);
        assert_eq!(input.frame_input(), FrameInput { horizontal: Some(Facing::Right), jump: true });
    }

    #[test]
    fn left_wins_over_right() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.handle_event(press(KeyCode::Right), now);
        input.handle_event(press(KeyCode::Left), now);
        assert_eq!(input.frame_input().horizontal, Some(Facing::Left));
    }

    #[test]
    fn keys_expire_without_release_events() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.handle_event(press(KeyCode::Left), now);
        input.handle_event(release(KeyCode::Left), now);
        assert!(input.is_held(KeyCode::Left));

        input.expire(now + HOLD_TIMEOUT);
        assert_eq!(input.frame_input(), FrameInput::default());
    }

    #[test]
    fn release_honored_when_enhanced() {
        let mut input = InputState::new();
        input.honor_release = true;
        let now = Instant::now();
        input.handle_event(press(KeyCode::Char('a')), now);
        input.handle_event(release(KeyCode::Char('a')), now);
        assert!(!input.is_held(KeyCode::Char('a')));
    }

    #[test]
    fn quit_keys() {
        let mut input = InputState::new();
        assert!(!input.quit_requested());
        input.handle_event(Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)), Instant::now());
        assert!(input.quit_requested());

        let mut input = InputState::new();
        input.handle_event(press(KeyCode::Esc), Instant::now());
        assert!(input.quit_requested());
    }

    #[test]
    fn left_clicks_and_resize_collected() {
        let mut input = InputState::new();
        let now = Instant::now();
        input.handle_event(mouse(MouseEventKind::Down(MouseButton::Left), 75, 2), now);
        input.handle_event(mouse(MouseEventKind::Down(MouseButton::Right), 10, 10), now);
        input.handle_event(mouse(MouseEventKind::Moved, 5, 5), now);
        input.handle_event(Event::Resize(100, 30), now);
        input.handle_event(Event::Resize(120, 40), now);
        assert_eq!(input.clicks, vec![(75, 2)]);
        assert_eq!(input.resized, Some((120, 40)));
    }
}
