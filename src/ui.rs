//! Rendering.
//!
//! Layout, top to bottom:
//!
//! ```text
//! row 0      memory summary
//! row 1      swap summary
//! row 2      (blank)
//! row 3      PID NAME STATE MEM(KB)
//! row 4      ─────────────────────
//! rows 5..   process lines, windowed around the selection
//! row h-2    count / selection / stale marker
//! row h-1    key help
//! ```
//!
//! Nothing here mutates application state. Every rect is clipped to the frame
//! so tiny terminals degrade to fewer lines instead of panicking.

use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

use crate::controller::{Mode, TerminationOutcome};
use crate::state::ViewState;
use crate::theme::Theme;
use crate::types::{MemorySample, ProcessRecord, Snapshot};

/// Rows above the process list.
pub const HEADER_ROWS: usize = 5;

/// Rows below the process list.
pub const FOOTER_ROWS: usize = 2;

/// Display width of the name column.
pub const NAME_WIDTH: usize = 22;

const MODAL_WIDTH: u16 = 50;
const MODAL_HEIGHT: u16 = 8;

/// Number of process lines that fit in a terminal of `terminal_rows`.
#[must_use]
pub fn visible_rows(terminal_rows: usize) -> usize {
    terminal_rows.saturating_sub(HEADER_ROWS + FOOTER_ROWS)
}

/// First visible index that keeps `selected` on screen.
///
/// With no visible rows nothing is drawn and the offset is 0.
#[must_use]
pub fn window_offset(selected: usize, visible_rows: usize) -> usize {
    if visible_rows > 0 && selected >= visible_rows {
        selected - visible_rows + 1
    } else {
        0
    }
}

/// Everything one frame shows.
#[derive(Debug, Clone, Copy)]
pub struct Screen<'a> {
    /// Current snapshot; `None` if no collection has ever succeeded.
    pub snapshot: Option<&'a Snapshot>,
    /// Current memory sample.
    pub memory: &'a MemorySample,
    /// Selection state.
    pub view: &'a ViewState,
    /// Interaction state, for the modal.
    pub mode: &'a Mode,
    /// Most recent enumeration error, if the last attempt failed.
    pub last_error: Option<&'a str>,
    /// Colors.
    pub theme: &'a Theme,
    /// Whether `k` navigates (so kill is `K`).
    pub vim_keys: bool,
}

/// Formats one table line with fixed column widths.
fn table_line(pid: &str, name: &str, state: &str, mem: &str) -> String {
    format!("{pid:<8} {name:<NAME_WIDTH$} {state:<6} {mem:<12}")
}

fn truncate(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

/// The text of one process line.
#[must_use]
pub fn process_line(record: &ProcessRecord) -> String {
    table_line(
        &record.pid().to_string(),
        &truncate(record.name(), NAME_WIDTH),
        &record.state().to_string(),
        &record.resident_memory_kb().to_string(),
    )
}

/// The two memory summary lines.
#[must_use]
pub fn memory_lines(memory: &MemorySample, theme: &Theme) -> [Line<'static>; 2] {
    let header = Style::default().fg(theme.header_color());

    if memory.is_unavailable() {
        return [
            Line::styled("Mem:  data unavailable", header),
            Line::styled("Swap: data unavailable", header),
        ];
    }

    let fraction = if memory.total_mb() > 0 {
        memory.used_mb() as f64 / memory.total_mb() as f64
    } else {
        0.0
    };

    let mem = Line::from(vec![
        Span::styled("Mem:  ", header),
        Span::styled(
            format!("{} MB used", memory.used_mb()),
            Style::default().fg(theme.memory.sample(fraction)).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(
                " / {} MB total | free {} MB | avail {} MB | cached {} MB | buffers {} MB",
                memory.total_mb(),
                memory.free_mb(),
                memory.available_mb(),
                memory.cached_mb(),
                memory.buffers_mb()
            ),
            header,
        ),
    ]);
    let swap = Line::styled(
        format!(
            "Swap: {} MB used / {} MB total",
            memory.swap_used_mb(),
            memory.swap_total_mb()
        ),
        header,
    );

    [mem, swap]
}

/// One-row rect at `y`, or `None` if that row is outside `area`.
fn row(area: Rect, y: usize) -> Option<Rect> {
    let y = u16::try_from(y).ok()?;
    (y < area.height && area.width > 0).then(|| Rect::new(area.x, area.y + y, area.width, 1))
}

fn draw_line(f: &mut Frame, area: Rect, y: usize, line: Line<'_>) {
    if let Some(rect) = row(area, y) {
        f.render_widget(Paragraph::new(line), rect);
    }
}

/// Draws a full frame.
pub fn draw(f: &mut Frame, screen: &Screen<'_>) {
    let area = f.area();

    let Some(snapshot) = screen.snapshot else {
        let message = screen.last_error.map_or_else(
            || "Collecting process data...".to_string(),
            |e| format!("Process data unavailable: {e}"),
        );
        draw_line(f, area, 0, Line::styled(message, Style::default().fg(screen.theme.error_color())));
        return;
    };

    draw_table(f, area, snapshot, screen);

    match screen.mode {
        Mode::ConfirmingTermination { .. } | Mode::ShowingOutcome { .. } => {
            draw_modal(f, area, screen.mode, screen.theme);
        }
        Mode::Browsing | Mode::Quitting => {}
    }
}

fn draw_table(f: &mut Frame, area: Rect, snapshot: &Snapshot, screen: &Screen<'_>) {
    let theme = screen.theme;
    let height = usize::from(area.height);

    let [mem, swap] = memory_lines(screen.memory, theme);
    draw_line(f, area, 0, mem);
    draw_line(f, area, 1, swap);

    let column_style = Style::default().fg(theme.column_header_color()).add_modifier(Modifier::BOLD);
    draw_line(f, area, 3, Line::styled(table_line("PID", "NAME", "STATE", "MEM(KB)"), column_style));
    draw_line(f, area, 4, Line::styled("─".repeat(usize::from(area.width)), column_style));

    let rows = visible_rows(height);
    let selected = screen.view.selected_index();
    let offset = window_offset(selected, rows);

    for (i, record) in snapshot.records().iter().enumerate().skip(offset).take(rows) {
        let style = if i == selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        draw_line(f, area, HEADER_ROWS + i - offset, Line::styled(process_line(record), style));
    }

    if height < HEADER_ROWS + FOOTER_ROWS {
        return;
    }

    let count = snapshot.len();
    let shown = if count == 0 { 0 } else { selected + 1 };
    let footer = Style::default().fg(theme.footer_color());
    let mut status = vec![Span::styled(format!("Processes: {count} | Selected {shown}"), footer)];
    if screen.last_error.is_some() {
        status.push(Span::styled(" [stale]", Style::default().fg(theme.error_color())));
    }
    draw_line(f, area, height - 2, Line::from(status));

    let kill_key = if screen.vim_keys { 'K' } else { 'k' };
    draw_line(
        f,
        area,
        height - 1,
        Line::styled(
            format!("q:Quit  ↑↓:Navigate  PgUp/PgDn:Page  {kill_key}:Kill  r:Refresh"),
            footer,
        ),
    );
}

/// Centered modal rect, clipped to `area`.
fn modal_area(area: Rect) -> Rect {
    let width = MODAL_WIDTH.min(area.width);
    let height = MODAL_HEIGHT.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn draw_modal(f: &mut Frame, area: Rect, mode: &Mode, theme: &Theme) {
    let lines: Vec<Line<'_>> = match mode {
        Mode::ConfirmingTermination { pid, name } => vec![
            Line::from(format!("Terminate process: PID {pid}")),
            Line::from(format!("Name: {name}")),
            Line::from("──────────────────────────────"),
            Line::from("  1. SIGTERM"),
            Line::from("  2. Cancel"),
            Line::from("  Select option [1-2]: "),
        ],
        Mode::ShowingOutcome { pid, name, outcome } => {
            let mut lines = Vec::with_capacity(5);
            match outcome {
                TerminationOutcome::Sent => {
                    lines.push(Line::from(format!("Successfully sent SIGTERM to PID {pid}")));
                    lines.push(Line::from(format!("Name: {name}")));
                    lines.push(Line::from(""));
                }
                TerminationOutcome::Failed(message) => {
                    let error = Style::default().fg(theme.error_color());
                    lines.push(Line::styled(format!("Failed to send SIGTERM to PID {pid}"), error));
                    lines.push(Line::from(format!("Name: {name}")));
                    lines.push(Line::styled(format!("Error: {message}"), error));
                }
            }
            lines.push(Line::from(""));
            lines.push(Line::from("Press any key to continue..."));
            lines
        }
        Mode::Browsing | Mode::Quitting => return,
    };

    let popup = modal_area(area);
    if popup.width == 0 || popup.height == 0 {
        return;
    }

    f.render_widget(Clear, popup);
    let block = Block::default()
        .title(" Terminate ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.modal_border_color()));
    f.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: true }), popup);
}
