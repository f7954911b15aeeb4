//! Main application loop.
//!
//! Each iteration: resample if due, draw, wait up to `poll_ms` for one key.
//! While the termination modal is open nothing is resampled, so the table
//! behind it does not move.

use crate::collectors::{MemoryCollector, ProcessCollector};
use crate::config::Config;
use crate::controller::{InteractionController, Mode, Redraw, Session};
use crate::error::Result;
use crate::input::InputHandler;
use crate::scheduler::{RefreshSchedule, RefreshScheduler};
use crate::signal::{SigtermTerminator, Terminator};
use crate::state::ViewState;
use crate::theme::Theme;
use crate::types::{Collector, MemorySample, Snapshot};
use crate::ui::{self, Screen};

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::{Frame, Terminal};
use std::io::stdout;
use std::time::{Duration, Instant};

/// Where key presses come from.
pub trait KeySource {
    /// Waits up to `timeout` for one key press.
    ///
    /// # Errors
    ///
    /// Returns an error if the input device fails.
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>>;
}

/// Reads keys from the controlling terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct CrosstermKeys;

impl KeySource for CrosstermKeys {
    fn poll_key(&mut self, timeout: Duration) -> Result<Option<KeyEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
            _ => Ok(None),
        }
    }
}

/// The dashboard.
pub struct App {
    config: Config,
    theme: Theme,
    scheduler: RefreshScheduler,
    schedule: RefreshSchedule,
    processes: ProcessCollector,
    memory: MemoryCollector,
    snapshot: Option<Snapshot>,
    memory_sample: MemorySample,
    /// Error from the most recent enumeration, cleared on success.
    last_error: Option<String>,
    view: ViewState,
    controller: InteractionController,
    terminator: Box<dyn Terminator>,
    page_rows: usize,
    needs_clear: bool,
}

impl App {
    /// Creates an application that signals with `SIGTERM`.
    #[must_use]
    pub fn new(config: Config) -> Self {
        let theme = config.resolve_theme();
        let scheduler = RefreshScheduler::new(config.update_interval());
        let processes = ProcessCollector::with_root(config.global.proc_root.clone());
        let memory = MemoryCollector::with_path(config.global.meminfo_path.clone());
        let controller = InteractionController::new(InputHandler::new(config.global.vim_keys));

        Self {
            config,
            theme,
            scheduler,
            schedule: RefreshSchedule::new(Instant::now()),
            processes,
            memory,
            snapshot: None,
            memory_sample: MemorySample::default(),
            last_error: None,
            view: ViewState::new(),
            controller,
            terminator: Box::new(SigtermTerminator),
            page_rows: 1,
            needs_clear: false,
        }
    }

    /// Replaces the signal delivery.
    #[must_use]
    pub fn with_terminator(mut self, terminator: impl Terminator + 'static) -> Self {
        self.terminator = Box::new(terminator);
        self
    }

    /// Current snapshot, `None` until an enumeration succeeds.
    #[must_use]
    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    /// Current memory sample.
    #[must_use]
    pub fn memory(&self) -> &MemorySample {
        &self.memory_sample
    }

    /// Selection state.
    #[must_use]
    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Interaction state.
    #[must_use]
    pub fn mode(&self) -> &Mode {
        self.controller.mode()
    }

    /// Error text of the last failed enumeration.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// True once quit was requested.
    #[must_use]
    pub fn should_quit(&self) -> bool {
        self.controller.should_quit()
    }

    /// Resamples if the schedule is due and no modal is open.
    ///
    /// Returns true if a resample happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        if self.controller.is_modal() || !self.scheduler.should_refresh(now, &self.schedule) {
            return false;
        }
        self.refresh(now);
        true
    }

    /// Resamples unconditionally.
    ///
    /// A failed enumeration keeps the previous snapshot. A failed memory
    /// sample is replaced by zeros, which render as unavailable.
    pub fn refresh(&mut self, now: Instant) {
        match self.processes.collect() {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.last_error = None;
            }
            Err(e) => {
                crate::error!("process", "{}", e);
                self.last_error = Some(e.to_string());
            }
        }

        self.memory_sample = self.memory.collect().unwrap_or_else(|e| {
            crate::warn!("memory", "{}", e);
            MemorySample::default()
        });

        self.view.reconcile(self.snapshot.as_ref().map_or(0, Snapshot::len));
        self.schedule = self.schedule.mark_refreshed(now);
    }

    /// Feeds one key press to the controller.
    pub fn handle_key(&mut self, key: KeyEvent) {
        let session = Session {
            view: &mut self.view,
            schedule: &mut self.schedule,
            snapshot: self.snapshot.as_ref(),
            page_rows: self.page_rows,
            terminator: &mut *self.terminator,
        };

        if self.controller.handle_key(key, session) == Redraw::Full {
            self.needs_clear = true;
        }
    }

    /// Draws one frame, sizing the viewport to the frame.
    pub fn draw(&mut self, frame: &mut Frame) {
        let rows = ui::visible_rows(usize::from(frame.area().height));
        self.page_rows = rows.max(1);
        self.view.scroll_to_fit(rows);

        let screen = Screen {
            snapshot: self.snapshot.as_ref(),
            memory: &self.memory_sample,
            view: &self.view,
            mode: self.controller.mode(),
            last_error: self.last_error.as_deref(),
            theme: &self.theme,
            vim_keys: self.config.global.vim_keys,
        };
        ui::draw(frame, &screen);
    }

    /// Key wait for this iteration: `poll_ms`, cut short if a resample is
    /// due sooner. The modal blocks resampling, so it always gets `poll_ms`.
    fn poll_timeout(&self, now: Instant) -> Duration {
        let poll = self.config.poll_interval();
        if self.controller.is_modal() {
            return poll;
        }
        poll.min(self.scheduler.time_until_due(now, &self.schedule))
    }

    /// Runs the loop on any backend until quit.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing or reading input fails.
    pub fn run_with<B: Backend, K: KeySource>(
        &mut self,
        terminal: &mut Terminal<B>,
        keys: &mut K,
    ) -> Result<()> {
        while !self.should_quit() {
            self.tick(Instant::now());

            if self.needs_clear {
                terminal.clear()?;
                self.needs_clear = false;
            }
            terminal.draw(|frame| self.draw(frame))?;

            if let Some(key) = keys.poll_key(self.poll_timeout(Instant::now()))? {
                self.handle_key(key);
            }
        }

        crate::info!("app", "quit");
        Ok(())
    }

    /// Takes over the terminal, runs until quit, and restores it.
    ///
    /// # Errors
    ///
    /// Returns an error if terminal setup, rendering, or restoring fails.
    pub fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        if let Err(e) = stdout().execute(EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }

        let result = match Terminal::new(CrosstermBackend::new(stdout())) {
            Ok(mut terminal) => {
                let result = self.run_with(&mut terminal, &mut CrosstermKeys);
                let _ = terminal.show_cursor();
                result
            }
            Err(e) => Err(e.into()),
        };

        // Restore even if the loop failed; the loop error wins.
        let restored = disable_raw_mode();
        let left = stdout().execute(LeaveAlternateScreen).map(|_| ());

        result?;
        restored?;
        left?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MonitorError;
    use crossterm::event::{KeyCode, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::cell::RefCell;
    use std::fs;
    use std::path::Path;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn write_proc(root: &Path, pid: u32, name: &str) {
        let dir = root.join(pid.to_string());
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("status"), format!("Name:\t{name}\nState:\tS (sleeping)\nVmRSS:\t  {pid}00 kB\n"))
            .unwrap();
    }

    fn fake_proc(pids: &[u32]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for &pid in pids {
            write_proc(dir.path(), pid, &format!("proc{pid}"));
        }
        fs::write(
            dir.path().join("meminfo"),
            "MemTotal: 8000000 kB\nMemFree: 2000000 kB\nCached: 1000000 kB\n",
        )
        .unwrap();
        dir
    }

    /// Shares its log with the test through an `Rc`.
    #[derive(Clone, Default)]
    struct SharedRecorder(Rc<RefCell<Vec<u32>>>);

    impl Terminator for SharedRecorder {
        fn terminate(&mut self, pid: u32) -> Result<()> {
            self.0.borrow_mut().push(pid);
            Ok(())
        }
    }

    fn app_for(dir: &TempDir) -> App {
        let mut config = Config::new();
        config.global.proc_root = dir.path().to_path_buf();
        config.global.meminfo_path = dir.path().join("meminfo");
        App::new(config)
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    #[test]
    fn test_first_tick_collects() {
        let dir = fake_proc(&[1, 2, 3]);
        let mut app = app_for(&dir);
        assert!(app.snapshot().is_none());

        assert!(app.tick(Instant::now()));
        assert_eq!(app.snapshot().map(Snapshot::len), Some(3));
        assert_eq!(app.memory().total_mb(), 7812);
        assert!(app.last_error().is_none());

        assert!(!app.tick(Instant::now()), "not due again yet");
    }

    #[test]
    fn test_tick_after_interval() {
        let dir = fake_proc(&[1]);
        let mut app = app_for(&dir);
        let start = Instant::now();
        app.tick(start);

        write_proc(dir.path(), 2, "late");
        assert!(app.tick(start + Duration::from_millis(3000)));
        assert_eq!(app.snapshot().map(Snapshot::len), Some(2));
    }

    #[test]
    fn test_enumeration_failure_keeps_previous_snapshot() {
        let dir = fake_proc(&[1, 2]);
        let mut app = app_for(&dir);
        app.refresh(Instant::now());

        app.processes = ProcessCollector::with_root(dir.path().join("gone"));
        app.refresh(Instant::now());

        assert_eq!(app.snapshot().map(Snapshot::len), Some(2));
        assert!(app.last_error().is_some_and(|e| e.contains("gone")));
    }

    #[test]
    fn test_enumeration_failure_without_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        config.global.proc_root = dir.path().join("missing");
        config.global.meminfo_path = dir.path().join("missing-meminfo");
        let mut app = App::new(config);

        app.refresh(Instant::now());
        assert!(app.snapshot().is_none());
        assert!(app.last_error().is_some());
        assert!(app.memory().is_unavailable());
    }

    #[test]
    fn test_memory_failure_substitutes_zero_sample() {
        let dir = fake_proc(&[1]);
        let mut app = app_for(&dir);
        app.refresh(Instant::now());
        assert!(!app.memory().is_unavailable());

        fs::remove_file(dir.path().join("meminfo")).unwrap();
        app.refresh(Instant::now());
        assert!(app.memory().is_unavailable());
        assert_eq!(app.snapshot().map(Snapshot::len), Some(1));
    }

    #[test]
    fn test_selection_reconciled_after_shrink() {
        let dir = fake_proc(&[1, 2, 3, 4, 5]);
        let mut app = app_for(&dir);
        app.refresh(Instant::now());
        app.handle_key(key(KeyCode::End));
        assert_eq!(app.view().selected_index(), 4);

        for pid in [3, 4, 5] {
            fs::remove_dir_all(dir.path().join(pid.to_string())).unwrap();
        }
        app.refresh(Instant::now());
        assert_eq!(app.view().selected_index(), 1);
    }

    #[test]
    fn test_modal_blocks_resampling() {
        let dir = fake_proc(&[1, 2]);
        let recorder = SharedRecorder::default();
        let mut app = app_for(&dir).with_terminator(recorder.clone());
        let start = Instant::now();
        app.tick(start);

        app.handle_key(key(KeyCode::Char('k')));
        assert!(matches!(app.mode(), Mode::ConfirmingTermination { .. }));
        assert!(!app.tick(start + Duration::from_secs(60)));

        app.handle_key(key(KeyCode::Char('1')));
        assert!(!app.tick(start + Duration::from_secs(60)));
        assert_eq!(*recorder.0.borrow(), vec![app.snapshot().unwrap().records()[0].pid()]);

        app.handle_key(key(KeyCode::Char(' ')));
        assert!(app.needs_clear);
        assert!(app.tick(start + Duration::from_secs(60)));
    }

    #[test]
    fn test_refresh_key_forces_resample() {
        let dir = fake_proc(&[1]);
        let mut app = app_for(&dir);
        let start = Instant::now();
        app.tick(start);

        app.handle_key(key(KeyCode::Char('r')));
        assert!(app.tick(start));
    }

    #[test]
    fn test_draw_sets_page_rows() {
        let dir = fake_proc(&[1, 2, 3]);
        let mut app = app_for(&dir);
        app.refresh(Instant::now());

        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        assert_eq!(app.page_rows, 13);
    }

    #[test]
    fn test_poll_timeout() {
        let dir = fake_proc(&[1]);
        let mut app = app_for(&dir);
        let start = Instant::now();
        app.tick(start);

        assert_eq!(app.poll_timeout(start), Duration::from_millis(100));
        assert_eq!(app.poll_timeout(start + Duration::from_millis(2950)), Duration::from_millis(50));

        app.handle_key(key(KeyCode::Char('k')));
        assert_eq!(app.poll_timeout(start + Duration::from_secs(10)), Duration::from_millis(100));
    }

    struct Script(std::vec::IntoIter<KeyEvent>);

    impl KeySource for Script {
        fn poll_key(&mut self, _timeout: Duration) -> Result<Option<KeyEvent>> {
            Ok(Some(self.0.next().unwrap_or_else(|| key(KeyCode::Char('q')))))
        }
    }

    #[test]
    fn test_run_with_quits() {
        let dir = fake_proc(&[1, 2]);
        let mut app = app_for(&dir);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        let mut keys = Script(vec![key(KeyCode::Down)].into_iter());

        app.run_with(&mut terminal, &mut keys).unwrap();
        assert!(app.should_quit());
        assert_eq!(app.view().selected_index(), 1);
    }

    struct Broken;

    impl KeySource for Broken {
        fn poll_key(&mut self, _timeout: Duration) -> Result<Option<KeyEvent>> {
            Err(MonitorError::TerminalError(std::io::Error::other("tty gone")))
        }
    }

    #[test]
    fn test_run_with_propagates_input_errors() {
        let dir = fake_proc(&[1]);
        let mut app = app_for(&dir);
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();

        assert!(matches!(app.run_with(&mut terminal, &mut Broken), Err(MonitorError::TerminalError(_))));
    }
}
