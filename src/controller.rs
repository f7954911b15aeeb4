//! Interaction state machine.
//!
//! ```text
//! Browsing ──kill──▶ ConfirmingTermination ──confirm──▶ ShowingOutcome
//!    ▲                      │ any other key                  │ any key
//!    └──────────────────────┴────────────────────────────────┘
//! Browsing ──quit──▶ Quitting
//! ```
//!
//! While a modal state is active every key goes to the modal and the main
//! loop does not resample.

use crossterm::event::KeyEvent;

use crate::input::{Action, InputHandler, ModalChoice};
use crate::scheduler::RefreshSchedule;
use crate::signal::Terminator;
use crate::state::ViewState;
use crate::types::Snapshot;

/// Result of a termination request, as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminationOutcome {
    /// The OS accepted the signal.
    Sent,
    /// The OS rejected the signal; holds the error text.
    Failed(String),
}

/// Top-level interaction state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Navigating the process table.
    Browsing,
    /// Waiting for the operator to confirm or cancel.
    ConfirmingTermination {
        /// Target process.
        pid: u32,
        /// Target name at the time of the request.
        name: String,
    },
    /// Waiting for the operator to acknowledge the result.
    ShowingOutcome {
        /// Target process.
        pid: u32,
        /// Target name at the time of the request.
        name: String,
        /// What the OS said.
        outcome: TerminationOutcome,
    },
    /// Terminal state; the loop exits.
    Quitting,
}

/// How much of the screen the next frame must repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redraw {
    /// Normal diffed frame.
    Incremental,
    /// Clear the terminal first so no modal residue survives.
    Full,
}

/// Everything one key press may touch.
pub struct Session<'a> {
    /// Selection state.
    pub view: &'a mut ViewState,
    /// Refresh schedule, for refresh-now.
    pub schedule: &'a mut RefreshSchedule,
    /// Current snapshot, if any collection has succeeded.
    pub snapshot: Option<&'a Snapshot>,
    /// Rows moved by page up/down.
    pub page_rows: usize,
    /// Signal delivery.
    pub terminator: &'a mut dyn Terminator,
}

/// Maps keys to state changes.
#[derive(Debug, Clone)]
pub struct InteractionController {
    mode: Mode,
    input: InputHandler,
}

impl InteractionController {
    /// Starts in [`Mode::Browsing`].
    #[must_use]
    pub fn new(input: InputHandler) -> Self {
        Self { mode: Mode::Browsing, input }
    }

    /// Current state.
    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// True while the termination modal is open.
    #[must_use]
    pub fn is_modal(&self) -> bool {
        matches!(self.mode, Mode::ConfirmingTermination { .. } | Mode::ShowingOutcome { .. })
    }

    /// True once quit was requested.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.mode == Mode::Quitting
    }

    /// Consumes one key press.
    pub fn handle_key(&mut self, key: KeyEvent, session: Session<'_>) -> Redraw {
        match std::mem::replace(&mut self.mode, Mode::Browsing) {
            Mode::Browsing => {
                let action = self.input.handle_key(key);
                self.apply(action, session);
                Redraw::Incremental
            }
            Mode::ConfirmingTermination { pid, name } => match self.input.handle_modal_key(key) {
                ModalChoice::Confirm => {
                    let outcome = match session.terminator.terminate(pid) {
                        Ok(()) => {
                            crate::info!("signal", "sent SIGTERM to {} ({})", pid, name);
                            TerminationOutcome::Sent
                        }
                        Err(e) => {
                            crate::warn!("signal", "{}", e);
                            TerminationOutcome::Failed(e.os_message())
                        }
                    };
                    self.mode = Mode::ShowingOutcome { pid, name, outcome };
                    Redraw::Incremental
                }
                ModalChoice::Cancel => {
                    crate::debug!("signal", "termination of {} cancelled", pid);
                    Redraw::Full
                }
            },
            Mode::ShowingOutcome { .. } => Redraw::Full,
            Mode::Quitting => {
                self.mode = Mode::Quitting;
                Redraw::Incremental
            }
        }
    }

    /// Applies a browsing command.
    pub fn apply(&mut self, action: Action, session: Session<'_>) {
        let count = session.snapshot.map_or(0, Snapshot::len);
        let view = session.view;

        match action {
            Action::Quit => self.mode = Mode::Quitting,
            Action::Up => view.move_up(),
            Action::Down => view.move_down(count),
            Action::PageUp => view.page_up(session.page_rows),
            Action::PageDown => view.page_down(count, session.page_rows),
            Action::Home => view.select_first(),
            Action::End => view.select_last(count),
            Action::Kill => {
                if let Some(record) = session.snapshot.and_then(|s| s.get(view.selected_index())) {
                    self.mode = Mode::ConfirmingTermination {
                        pid: record.pid(),
                        name: record.name().to_string(),
                    };
                }
            }
            Action::Refresh => session.schedule.force(),
            Action::None => {}
        }
    }
}

impl Default for InteractionController {
    fn default() -> Self {
        Self::new(InputHandler::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{MonitorError, Result};
    use crate::types::ProcessRecord;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::time::Instant;

    /// Records requests; fails every pid in `reject`.
    #[derive(Default)]
    struct Recorder {
        sent: Vec<u32>,
        reject: Vec<u32>,
    }

    impl Terminator for Recorder {
        fn terminate(&mut self, pid: u32) -> Result<()> {
            if self.reject.contains(&pid) {
                return Err(MonitorError::Termination {
                    pid,
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "No such process"),
                });
            }
            self.sent.push(pid);
            Ok(())
        }
    }

    struct Fixture {
        controller: InteractionController,
        view: ViewState,
        schedule: RefreshSchedule,
        snapshot: Snapshot,
        terminator: Recorder,
    }

    impl Fixture {
        fn new(n: u32) -> Self {
            let records = (1..=n)
                .map(|i| ProcessRecord::new(i * 10, format!("p{i}"), 'S', 0).unwrap())
                .collect();
            let now = Instant::now();
            Self {
                controller: InteractionController::default(),
                view: ViewState::new(),
                schedule: RefreshSchedule::new(now).mark_refreshed(now),
                snapshot: Snapshot::new(records),
                terminator: Recorder::default(),
            }
        }

        fn press(&mut self, code: KeyCode) -> Redraw {
            let session = Session {
                view: &mut self.view,
                schedule: &mut self.schedule,
                snapshot: Some(&self.snapshot),
                page_rows: 5,
                terminator: &mut self.terminator,
            };
            self.controller.handle_key(KeyEvent::new(code, KeyModifiers::empty()), session)
        }
    }

    #[test]
    fn test_starts_browsing() {
        let controller = InteractionController::default();
        assert_eq!(controller.mode(), &Mode::Browsing);
        assert!(!controller.is_modal());
        assert!(!controller.should_quit());
    }

    #[test]
    fn test_quit() {
        let mut fx = Fixture::new(3);
        fx.press(KeyCode::Char('q'));
        assert!(fx.controller.should_quit());

        fx.press(KeyCode::Down);
        assert!(fx.controller.should_quit(), "quitting is terminal");
        assert_eq!(fx.view.selected_index(), 0);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut fx = Fixture::new(3);
        fx.press(KeyCode::Up);
        assert_eq!(fx.view.selected_index(), 0);

        fx.press(KeyCode::Down);
        fx.press(KeyCode::Down);
        fx.press(KeyCode::Down);
        assert_eq!(fx.view.selected_index(), 2);

        fx.press(KeyCode::Home);
        assert_eq!(fx.view.selected_index(), 0);
        fx.press(KeyCode::End);
        assert_eq!(fx.view.selected_index(), 2);
    }

    #[test]
    fn test_refresh_forces_schedule() {
        let mut fx = Fixture::new(1);
        assert!(!fx.schedule.forced);
        fx.press(KeyCode::Char('r'));
        assert!(fx.schedule.forced);
    }

    #[test]
    fn test_kill_on_empty_snapshot_is_noop() {
        let mut fx = Fixture::new(0);
        fx.press(KeyCode::Char('k'));
        assert_eq!(fx.controller.mode(), &Mode::Browsing);
    }

    #[test]
    fn test_kill_without_snapshot_is_noop() {
        let mut controller = InteractionController::default();
        let mut view = ViewState::new();
        let mut schedule = RefreshSchedule::new(Instant::now());
        let mut terminator = Recorder::default();

        controller.apply(
            Action::Kill,
            Session {
                view: &mut view,
                schedule: &mut schedule,
                snapshot: None,
                page_rows: 1,
                terminator: &mut terminator,
            },
        );
        assert_eq!(controller.mode(), &Mode::Browsing);
    }

    #[test]
    fn test_kill_confirm_sends_signal() {
        let mut fx = Fixture::new(3);
        fx.press(KeyCode::Down);
        fx.press(KeyCode::Char('k'));
        assert_eq!(
            fx.controller.mode(),
            &Mode::ConfirmingTermination { pid: 20, name: "p2".to_string() }
        );
        assert!(fx.controller.is_modal());

        assert_eq!(fx.press(KeyCode::Char('1')), Redraw::Incremental);
        assert_eq!(fx.terminator.sent, vec![20]);
        assert!(matches!(
            fx.controller.mode(),
            Mode::ShowingOutcome { pid: 20, outcome: TerminationOutcome::Sent, .. }
        ));

        assert_eq!(fx.press(KeyCode::Char('x')), Redraw::Full);
        assert_eq!(fx.controller.mode(), &Mode::Browsing);
        assert_eq!(fx.view.selected_index(), 1);
        assert!(!fx.schedule.forced, "closing the modal does not force a refresh");
    }

    #[test]
    fn test_kill_cancel_sends_nothing() {
        let mut fx = Fixture::new(2);
        fx.press(KeyCode::Char('k'));

        assert_eq!(fx.press(KeyCode::Char('2')), Redraw::Full);
        assert!(fx.terminator.sent.is_empty());
        assert_eq!(fx.controller.mode(), &Mode::Browsing);
    }

    #[test]
    fn test_modal_swallows_navigation_and_quit() {
        let mut fx = Fixture::new(3);
        fx.press(KeyCode::Char('k'));

        // 'q' cancels the modal, it does not quit.
        fx.press(KeyCode::Char('q'));
        assert_eq!(fx.controller.mode(), &Mode::Browsing);
        assert!(!fx.controller.should_quit());
    }

    #[test]
    fn test_kill_failure_is_reported() {
        let mut fx = Fixture::new(1);
        fx.terminator.reject.push(10);

        fx.press(KeyCode::Char('k'));
        fx.press(KeyCode::Char('y'));

        match fx.controller.mode() {
            Mode::ShowingOutcome { pid, outcome: TerminationOutcome::Failed(msg), .. } => {
                assert_eq!(*pid, 10);
                assert!(!msg.is_empty());
            }
            other => panic!("unexpected mode {other:?}"),
        }

        fx.press(KeyCode::Enter);
        assert_eq!(fx.controller.mode(), &Mode::Browsing);
        assert_eq!(fx.view.selected_index(), 0);
    }
}
