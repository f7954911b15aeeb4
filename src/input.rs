//! Key mapping.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Browsing command resulting from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Quit the application.
    Quit,
    /// Select the previous row.
    Up,
    /// Select the next row.
    Down,
    /// Move up one screen.
    PageUp,
    /// Move down one screen.
    PageDown,
    /// Select the first row.
    Home,
    /// Select the last row.
    End,
    /// Ask to terminate the selected process.
    Kill,
    /// Resample immediately.
    Refresh,
    /// No action.
    None,
}

/// Answer to the termination prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalChoice {
    /// Send the signal.
    Confirm,
    /// Leave the process alone.
    Cancel,
}

/// Input handler with optional vim keys.
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Enable `j`/`k` navigation. `k` then no longer requests termination.
    pub vim_keys: bool,
}

impl InputHandler {
    /// Creates a new input handler.
    #[must_use]
    pub fn new(vim_keys: bool) -> Self {
        Self { vim_keys }
    }

    /// Maps a key in browsing mode.
    #[must_use]
    pub fn handle_key(&self, event: KeyEvent) -> Action {
        if event.modifiers.contains(KeyModifiers::CONTROL) {
            return match event.code {
                KeyCode::Char('c' | 'q') => Action::Quit,
                _ => Action::None,
            };
        }

        match event.code {
            KeyCode::Char('q' | 'Q') | KeyCode::Esc => Action::Quit,

            KeyCode::Up => Action::Up,
            KeyCode::Down => Action::Down,
            KeyCode::PageUp => Action::PageUp,
            KeyCode::PageDown => Action::PageDown,
            KeyCode::Home => Action::Home,
            KeyCode::End => Action::End,

            KeyCode::Char('k') if self.vim_keys => Action::Up,
            KeyCode::Char('j') if self.vim_keys => Action::Down,

            KeyCode::Char('k' | 'K') => Action::Kill,

            KeyCode::Char('r') | KeyCode::F(5) => Action::Refresh,

            _ => Action::None,
        }
    }

    /// Maps the single key read by the termination prompt.
    #[must_use]
    pub fn handle_modal_key(&self, event: KeyEvent) -> ModalChoice {
        match event.code {
            KeyCode::Char('1' | 'y' | 'Y') => ModalChoice::Confirm,
            _ => ModalChoice::Cancel,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn key_event_ctrl(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::CONTROL)
    }

    #[test]
    fn test_quit_actions() {
        let handler = InputHandler::default();

        assert_eq!(handler.handle_key(key_event(KeyCode::Char('q'))), Action::Quit);
        assert_eq!(handler.handle_key(key_event(KeyCode::Esc)), Action::Quit);
        assert_eq!(handler.handle_key(key_event_ctrl(KeyCode::Char('c'))), Action::Quit);
        assert_eq!(handler.handle_key(key_event_ctrl(KeyCode::Char('q'))), Action::Quit);
    }

    #[test]
    fn test_navigation() {
        let handler = InputHandler::default();

        assert_eq!(handler.handle_key(key_event(KeyCode::Up)), Action::Up);
        assert_eq!(handler.handle_key(key_event(KeyCode::Down)), Action::Down);
        assert_eq!(handler.handle_key(key_event(KeyCode::PageUp)), Action::PageUp);
        assert_eq!(handler.handle_key(key_event(KeyCode::PageDown)), Action::PageDown);
        assert_eq!(handler.handle_key(key_event(KeyCode::Home)), Action::Home);
        assert_eq!(handler.handle_key(key_event(KeyCode::End)), Action::End);
    }

    #[test]
    fn test_kill_without_vim_keys() {
        let handler = InputHandler::new(false);

        assert_eq!(handler.handle_key(key_event(KeyCode::Char('k'))), Action::Kill);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('K'))), Action::Kill);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('j'))), Action::None);
    }

    #[test]
    fn test_vim_keys_take_k() {
        let handler = InputHandler::new(true);

        assert_eq!(handler.handle_key(key_event(KeyCode::Char('k'))), Action::Up);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('j'))), Action::Down);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('K'))), Action::Kill);
    }

    #[test]
    fn test_refresh_action() {
        let handler = InputHandler::default();
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('r'))), Action::Refresh);
        assert_eq!(handler.handle_key(key_event(KeyCode::F(5))), Action::Refresh);
    }

    #[test]
    fn test_ctrl_other_key_no_action() {
        let handler = InputHandler::default();
        assert_eq!(handler.handle_key(key_event_ctrl(KeyCode::Char('k'))), Action::None);
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let handler = InputHandler::default();
        assert_eq!(handler.handle_key(key_event(KeyCode::Tab)), Action::None);
        assert_eq!(handler.handle_key(key_event(KeyCode::Char('x'))), Action::None);
    }

    #[test]
    fn test_modal_keys() {
        let handler = InputHandler::default();

        assert_eq!(handler.handle_modal_key(key_event(KeyCode::Char('1'))), ModalChoice::Confirm);
        assert_eq!(handler.handle_modal_key(key_event(KeyCode::Char('y'))), ModalChoice::Confirm);
        assert_eq!(handler.handle_modal_key(key_event(KeyCode::Char('2'))), ModalChoice::Cancel);
        assert_eq!(handler.handle_modal_key(key_event(KeyCode::Esc)), ModalChoice::Cancel);
        assert_eq!(handler.handle_modal_key(key_event(KeyCode::Enter)), ModalChoice::Cancel);
    }
}
