use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy)]
pub(crate) enum Action {
    None,
    Quit,
    /// Re-fetch all network widgets now instead of waiting for the timer.
    Refresh,
}

pub(crate) fn handle_key_event(key: KeyEvent) -> Action {
    use KeyCode::Char;

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }
    if key.code == Char('q') && key.modifiers.is_empty() {
        return Action::Quit;
    }

    if key.code == Char('r') && key.modifiers.is_empty() {
        return Action::Refresh;
    }

    Action::None
}
