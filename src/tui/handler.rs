use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::Focus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppAction {
    Quit,
    NextFocus,
    PrevFocus,
    ShowHelp,
    HideHelp,
    ToggleTheme,
    GenerateNews,
    UseCurrentLocation,
    // Focused-panel actions
    InputChar(char),
    Backspace,
    Delete,
    MoveUp,
    MoveDown,
    Confirm,
    Cancel,
    OpenInBrowser,
}

pub fn handle_key_event(key: KeyEvent, focus: Focus, show_help: bool) -> Option<AppAction> {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return Some(AppAction::Quit);
    }

    // If help is showing, any key closes it
    if show_help {
        return Some(AppAction::HideHelp);
    }

    match (key.code, key.modifiers) {
        (KeyCode::F(1), _) => Some(AppAction::ShowHelp),
        (KeyCode::F(2), _) => Some(AppAction::UseCurrentLocation),
        (KeyCode::F(3), _) => Some(AppAction::ToggleTheme),
        (KeyCode::F(5), _) => Some(AppAction::GenerateNews),

        (KeyCode::Tab, _) => Some(AppAction::NextFocus),
        (KeyCode::BackTab, _) => Some(AppAction::PrevFocus),

        (KeyCode::Up, _) => Some(AppAction::MoveUp),
        (KeyCode::Down, _) => Some(AppAction::MoveDown),
        (KeyCode::Enter, _) => Some(AppAction::Confirm),
        (KeyCode::Esc, _) => Some(AppAction::Cancel),
        (KeyCode::Backspace, _) => Some(AppAction::Backspace),
        (KeyCode::Delete, _) => Some(AppAction::Delete),

        (KeyCode::Char('o'), _) if focus == Focus::Results => Some(AppAction::OpenInBrowser),
        (KeyCode::Char('j'), _) if focus == Focus::Results => Some(AppAction::MoveDown),
        (KeyCode::Char('k'), _) if focus == Focus::Results => Some(AppAction::MoveUp),
        (KeyCode::Char(c), m) if !m.contains(KeyModifiers::CONTROL) => {
            Some(AppAction::InputChar(c))
        }

        _ => None,
    }
}
