//! Key bindings: arrows and vim-style.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Action from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    Reset,
    Pause,
    Quit,
    None,
}

/// Map key event to game action. Anything unbound (or with Alt/Super held) is `Action::None`.
pub fn key_to_action(key: KeyEvent) -> Action {
    let KeyEvent { code, modifiers, .. } = key;
    let no_mod = modifiers.is_empty() || modifiers == KeyModifiers::SHIFT;
    if modifiers == KeyModifiers::CONTROL {
        return match code {
            KeyCode::Char('c') => Action::Quit,
            _ => Action::None,
        };
    }
    if !no_mod {
        return Action::None;
    }
    match code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
        KeyCode::Char('p') => Action::Pause,
        KeyCode::Char('r') | KeyCode::Char('R') => Action::Reset,
        KeyCode::Left | KeyCode::Char('h') => Action::MoveLeft,
        KeyCode::Right | KeyCode::Char('l') => Action::MoveRight,
        KeyCode::Down | KeyCode::Char('j') => Action::SoftDrop,
        KeyCode::Up | KeyCode::Char('k') | KeyCode::Char('i') => Action::Rotate,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_arrows_and_vim_keys() {
        let none = KeyModifiers::NONE;
        assert_eq!(key_to_action(key(KeyCode::Left, none)), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Char('h'), none)), Action::MoveLeft);
        assert_eq!(key_to_action(key(KeyCode::Right, none)), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Char('l'), none)), Action::MoveRight);
        assert_eq!(key_to_action(key(KeyCode::Down, none)), Action::SoftDrop);
        assert_eq!(key_to_action(key(KeyCode::Char('j'), none)), Action::SoftDrop);
        assert_eq!(key_to_action(key(KeyCode::Up, none)), Action::Rotate);
        assert_eq!(key_to_action(key(KeyCode::Char('k'), none)), Action::Rotate);
    }

    #[test]
    fn test_reset_pause_quit() {
        let none = KeyModifiers::NONE;
        assert_eq!(key_to_action(key(KeyCode::Char('r'), none)), Action::Reset);
        assert_eq!(
            key_to_action(key(KeyCode::Char('R'), KeyModifiers::SHIFT)),
            Action::Reset
        );
        assert_eq!(key_to_action(key(KeyCode::Char('p'), none)), Action::Pause);
        assert_eq!(key_to_action(key(KeyCode::Esc, none)), Action::Quit);
        assert_eq!(
            key_to_action(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }

    #[test]
    fn test_unbound_keys_are_noops() {
        assert_eq!(key_to_action(key(KeyCode::Char('x'), KeyModifiers::NONE)), Action::None);
        assert_eq!(key_to_action(key(KeyCode::Left, KeyModifiers::ALT)), Action::None);
        assert_eq!(
            key_to_action(key(KeyCode::Char('r'), KeyModifiers::CONTROL)),
            Action::None
        );
    }
}
