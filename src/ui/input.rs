/// Keyboard input: a key-state tracker plus the startup binding table.
///
/// The tracker records when each key was last reported active, enabling:
///   - Continuous movement while a key is held
///   - Edge-triggered jump (only fires on a fresh press)
/// Most terminals never report Release events, so a key counts as held
/// until it goes quiet for `HOLD_TIMEOUT`.
///
/// `KeyBindings` resolves the config's key-name strings into key codes
/// once at startup; unknown names are dropped with a warning so a typo in
/// config.toml can't silently eat an action.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::KeyConfig;

/// After this duration without a Press/Repeat event, consider the key released.
const HOLD_TIMEOUT: Duration = Duration::from_millis(160);

pub struct InputState {
    /// Timestamp of the last Press/Repeat event for each key.
    last_active: HashMap<KeyCode, Instant>,
    /// Keys that went "not held" → "held" during the latest drain.
    fresh_presses: Vec<KeyCode>,
    /// Raw key events from the latest drain, for modifier checks.
    raw_events: Vec<KeyEvent>,
}

impl InputState {
    pub fn new() -> Self {
        InputState {
            last_active: HashMap::with_capacity(16),
            fresh_presses: Vec::with_capacity(8),
            raw_events: Vec::with_capacity(8),
        }
    }

    /// Drain all pending terminal events and update key states.
    /// Call once per frame, before the simulation tick.
    pub fn drain_events(&mut self) {
        self.fresh_presses.clear();
        self.raw_events.clear();

        while poll(Duration::ZERO).unwrap_or(false) {
            if let Ok(Event::Key(key)) = event::read() {
                self.raw_events.push(key);
                if key.kind != KeyEventKind::Release {
                    let was_held = self.held_inner(key.code);
                    self.last_active.insert(key.code, Instant::now());
                    if !was_held {
                        self.fresh_presses.push(key.code);
                    }
                }
            }
        }

        // Expire keys that have gone quiet
        let now = Instant::now();
        self.last_active
            .retain(|_, t| now.duration_since(*t) < HOLD_TIMEOUT);
    }

    /// Is this key currently held? Used for continuous actions (movement).
    pub fn is_held(&self, code: KeyCode) -> bool {
        self.held_inner(code)
    }

    pub fn any_held(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.is_held(*c))
    }

    /// Was this key freshly pressed this frame? Used for one-shot actions.
    pub fn was_pressed(&self, code: KeyCode) -> bool {
        self.fresh_presses.contains(&code)
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        codes.iter().any(|c| self.was_pressed(*c))
    }

    pub fn ctrl_c_pressed(&self) -> bool {
        self.raw_events.iter().any(|k| {
            k.modifiers.contains(KeyModifiers::CONTROL)
                && matches!(k.code, KeyCode::Char('c') | KeyCode::Char('C'))
        })
    }

    fn held_inner(&self, code: KeyCode) -> bool {
        self.last_active
            .get(&code)
            .map(|t| t.elapsed() < HOLD_TIMEOUT)
            .unwrap_or(false)
    }
}

// ══════════════════════════════════════════════════════════════
// Binding table
// ══════════════════════════════════════════════════════════════

/// The keyboard half of the input binding table, resolved from config
/// once at startup. Movement entries are queried as held, jump and
/// restart as fresh presses.
pub struct KeyBindings {
    pub left: Vec<KeyCode>,
    pub right: Vec<KeyCode>,
    pub jump: Vec<KeyCode>,
    pub restart: Vec<KeyCode>,
}

impl KeyBindings {
    pub fn from_config(keys: &KeyConfig) -> Self {
        KeyBindings {
            left: resolve_list(&keys.left, "keys.left"),
            right: resolve_list(&keys.right, "keys.right"),
            jump: resolve_list(&keys.jump, "keys.jump"),
            restart: resolve_list(&keys.restart, "keys.restart"),
        }
    }
}

fn resolve_list(names: &[String], which: &str) -> Vec<KeyCode> {
    let mut codes = vec![];
    for name in names {
        match parse_key(name) {
            Some(code) => {
                codes.push(code);
                // Letter keys respond regardless of Shift/Caps state
                if let KeyCode::Char(c) = code {
                    if c.is_ascii_lowercase() {
                        codes.push(KeyCode::Char(c.to_ascii_uppercase()));
                    }
                }
            }
            None => eprintln!("Warning: unknown key name {name:?} in config {which}"),
        }
    }
    codes
}

/// Parse a config key name into a key code.
pub fn parse_key(name: &str) -> Option<KeyCode> {
    let trimmed = name.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "left" => Some(KeyCode::Left),
        "right" => Some(KeyCode::Right),
        "up" => Some(KeyCode::Up),
        "down" => Some(KeyCode::Down),
        "space" => Some(KeyCode::Char(' ')),
        "enter" | "return" => Some(KeyCode::Enter),
        "esc" | "escape" => Some(KeyCode::Esc),
        "tab" => Some(KeyCode::Tab),
        "backspace" => Some(KeyCode::Backspace),
        _ => {
            let mut chars = trimmed.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Some(KeyCode::Char(c)),
                _ => None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_named_keys() {
        assert_eq!(parse_key("Left"), Some(KeyCode::Left));
        assert_eq!(parse_key("space"), Some(KeyCode::Char(' ')));
        assert_eq!(parse_key("Esc"), Some(KeyCode::Esc));
        assert_eq!(parse_key("a"), Some(KeyCode::Char('a')));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_key("NotAKey"), None);
        assert_eq!(parse_key(""), None);
    }

    #[test]
    fn letter_bindings_cover_both_cases() {
        let keys = KeyConfig {
            left: vec!["a".into()],
            right: vec!["Right".into()],
            jump: vec![],
            restart: vec![],
        };
        let bindings = KeyBindings::from_config(&keys);
        assert!(bindings.left.contains(&KeyCode::Char('a')));
        assert!(bindings.left.contains(&KeyCode::Char('A')));
        assert_eq!(bindings.right, vec![KeyCode::Right]);
    }
}
