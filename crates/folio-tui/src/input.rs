use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    HalfPageDown,
    HalfPageUp,
    /// Natural flip to a zero-based page
    FlipToPage(usize),
    FirstPage,
    LastPage,
    Contact,
    SmartContact,
    /// Interrupt the active navigation
    Cancel,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('q'), KeyModifiers::NONE) => Action::Quit,
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,

        // Raw scrolling
        (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, _) => Action::ScrollDown,
        (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, _) => Action::ScrollUp,
        (KeyCode::Char('J'), _) | (KeyCode::PageDown, _) => Action::HalfPageDown,
        (KeyCode::Char('K'), _) | (KeyCode::PageUp, _) => Action::HalfPageUp,
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::HalfPageDown,
        (KeyCode::Char('u'), KeyModifiers::CONTROL) => Action::HalfPageUp,

        // Navigation
        (KeyCode::Char(c @ '1'..='9'), KeyModifiers::NONE) => {
            Action::FlipToPage(c as usize - '1' as usize)
        }
        (KeyCode::Char('g'), KeyModifiers::NONE) | (KeyCode::Home, _) => Action::FirstPage,
        (KeyCode::Char('G'), _) | (KeyCode::End, _) => Action::LastPage,
        (KeyCode::Char('c'), KeyModifiers::NONE) => Action::Contact,
        (KeyCode::Char('s'), KeyModifiers::NONE) => Action::SmartContact,
        (KeyCode::Char('x'), KeyModifiers::NONE) | (KeyCode::Esc, _) => Action::Cancel,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_digits_flip_to_zero_based_page() {
        assert_eq!(handle_key_event(key(KeyCode::Char('1'))), Action::FlipToPage(0));
        assert_eq!(handle_key_event(key(KeyCode::Char('9'))), Action::FlipToPage(8));
        assert_eq!(handle_key_event(key(KeyCode::Char('0'))), Action::None);
    }

    #[test]
    fn test_shifted_keys() {
        let shifted = |c| KeyEvent::new(KeyCode::Char(c), KeyModifiers::SHIFT);
        assert_eq!(handle_key_event(shifted('G')), Action::LastPage);
        assert_eq!(handle_key_event(shifted('J')), Action::HalfPageDown);
        assert_eq!(handle_key_event(shifted('K')), Action::HalfPageUp);
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(handle_key_event(key(KeyCode::Char('g'))), Action::FirstPage);
        assert_eq!(handle_key_event(key(KeyCode::Char('c'))), Action::Contact);
        assert_eq!(handle_key_event(key(KeyCode::Char('s'))), Action::SmartContact);
        assert_eq!(handle_key_event(key(KeyCode::Char('x'))), Action::Cancel);
        assert_eq!(handle_key_event(key(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
    }
}
