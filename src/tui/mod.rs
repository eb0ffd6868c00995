//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel for choosing the signal column and the
//! specification limits, then renders the verdict, Cp/Cpk and the two-panel
//! figure. The file is read once per signal; limit changes only recompute
//! the capability step.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::analysis::{CapabilityOutcome, NormalityOutcome};
use crate::app::pipeline::{AnalysisRun, run_analysis};
use crate::cli::TuiArgs;
use crate::domain::{LAYER_COLUMN, NormalityVerdict, SourceReference, SpecLimits};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::FigureChart;

/// Default step for LSL/USL adjustments.
const DEFAULT_LIMIT_STEP: f64 = 0.1;

const FIELD_SIGNAL: usize = 0;
const FIELD_LSL: usize = 1;
const FIELD_USL: usize = 2;
const FIELD_STEP: usize = 3;
const FIELD_COUNT: usize = 4;

/// Start the TUI.
pub fn run(args: TuiArgs) -> Result<(), AppError> {
    // Pick the file before entering raw mode so the prompt behaves normally.
    let path = crate::app::resolve_csv_path(args.file.clone())?;
    let limits = crate::app::limits_from_args(&args.limits)?;
    let mut app = App::new(path, &args.limits.signal, limits, (args.svg_width, args.svg_height));

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::runtime(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode()
            .map_err(|e| AppError::runtime(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::runtime(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    path: PathBuf,
    /// Signal candidates: every header column except `layer`.
    signals: Vec<String>,
    signal: String,
    limits: SpecLimits,
    step: f64,
    selected_field: usize,
    svg_size: (u32, u32),
    status: String,
    run: AnalysisRun,
}

impl App {
    fn new(path: PathBuf, signal: &str, limits: SpecLimits, svg_size: (u32, u32)) -> Self {
        let (signals, status) = match signal_candidates(&path) {
            Ok(signals) => {
                let status = format!("{} signal column(s) found.", signals.len());
                (signals, status)
            }
            Err(err) => (Vec::new(), err.to_string()),
        };
        let run = run_analysis(&SourceReference::with_signal(&path, signal), limits);
        Self {
            path,
            signals,
            signal: signal.to_string(),
            limits,
            step: DEFAULT_LIMIT_STEP,
            selected_field: FIELD_SIGNAL,
            svg_size,
            status,
            run,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::runtime(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            let ready = event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::runtime(format!("Event poll error: {e}")))?;
            if !ready {
                continue;
            }

            let next =
                event::read().map_err(|e| AppError::runtime(format!("Event read error: {e}")))?;
            match next {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply one key press; returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => {
                self.selected_field = self.selected_field.saturating_sub(1);
            }
            KeyCode::Down => {
                if self.selected_field + 1 < FIELD_COUNT {
                    self.selected_field += 1;
                }
            }
            KeyCode::Left => self.adjust_field(-1),
            KeyCode::Right => self.adjust_field(1),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('e') => self.export_svg(),
            _ => {}
        }
        false
    }

    fn adjust_field(&mut self, delta: i32) {
        let sign = f64::from(delta.signum());
        match self.selected_field {
            FIELD_SIGNAL => self.cycle_signal(delta),
            FIELD_LSL => {
                let lower = round_to_step(self.limits.lower + sign * self.step, self.step);
                self.set_limits(lower, self.limits.upper);
            }
            FIELD_USL => {
                let upper = round_to_step(self.limits.upper + sign * self.step, self.step);
                self.set_limits(self.limits.lower, upper);
            }
            FIELD_STEP => {
                self.step = if delta >= 0 { self.step * 10.0 } else { self.step / 10.0 };
                self.status = format!("step: {}", fmt_step(self.step));
            }
            _ => {}
        }
    }

    fn cycle_signal(&mut self, delta: i32) {
        if self.signals.is_empty() {
            self.status = "No signal columns to choose from.".to_string();
            return;
        }
        let n = self.signals.len();
        let next = match self.signals.iter().position(|s| *s == self.signal) {
            Some(idx) if delta >= 0 => (idx + 1) % n,
            Some(idx) => (idx + n - 1) % n,
            None => 0,
        };
        self.signal = self.signals[next].clone();
        self.rerun();
        self.status = format!("signal: {}", self.signal);
    }

    fn set_limits(&mut self, lower: f64, upper: f64) {
        match SpecLimits::validated(lower, upper) {
            Ok(limits) => {
                self.limits = limits;
                self.run.set_limits(limits);
                self.status = format!("limits: [{}, {}]", fmt_limit(lower), fmt_limit(upper));
            }
            Err(err) => self.status = err.to_string(),
        }
    }

    fn reload(&mut self) {
        self.signals = match signal_candidates(&self.path) {
            Ok(signals) => signals,
            Err(err) => {
                self.status = err.to_string();
                Vec::new()
            }
        };
        self.rerun();
        if self.run.loaded() {
            self.status = format!("Reloaded {} rows.", self.run.dataset.len());
        }
    }

    fn rerun(&mut self) {
        let source = SourceReference::with_signal(&self.path, self.signal.clone());
        self.run = run_analysis(&source, self.limits);
        if let Some(failure) = &self.run.load_failure {
            self.status = failure.to_string();
        }
    }

    fn export_svg(&mut self) {
        let name = format!("spc_{}_{}.svg", self.signal, Local::now().format("%Y%m%d_%H%M%S"));
        let path = PathBuf::from(name);
        match crate::plot::write_svg(&path, &self.run.figure, self.svg_size.0, self.svg_size.1) {
            Ok(()) => self.status = format!("Wrote {}", path.display()),
            Err(err) => self.status = format!("SVG export failed: {err}"),
        }
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(6), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let run = &self.run;
        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("spc", Style::default().fg(Color::Cyan)),
            Span::raw(" - process capability"),
        ]));

        lines.push(Line::from(Span::styled(
            format!(
                "file: {} | signal: {} | n={}",
                crate::cli::picker::pretty_path(&self.path),
                self.signal,
                run.dataset.len()
            ),
            Style::default().fg(Color::Gray),
        )));

        let (verdict_text, verdict_color) = match (&run.load_failure, &run.normality) {
            (Some(failure), _) => (format!("could not load: {}", failure.kind()), Color::Red),
            (None, NormalityOutcome::Tested(sw)) => (
                format!(
                    "{} (W={:.4}, p={:.4})",
                    run.verdict().display_name(),
                    sw.w,
                    sw.p_value
                ),
                verdict_color(run.verdict()),
            ),
            (None, NormalityOutcome::Untested(reason)) => {
                (format!("not normal ({})", reason.describe()), Color::Yellow)
            }
        };
        lines.push(Line::from(vec![
            Span::raw("normality: "),
            Span::styled(verdict_text, Style::default().fg(verdict_color)),
        ]));

        let capability = match run.capability {
            CapabilityOutcome::Computed(idx) => format!(
                "Cp={:.3} | Cpk={:.3} | mean={:.4} | sigma={:.4}",
                idx.cp, idx.cpk, idx.mean, idx.sigma
            ),
            CapabilityOutcome::NotNormal => "Cp/Cpk not computed".to_string(),
            CapabilityOutcome::DegenerateSignal { sigma } => {
                format!("Cp/Cpk not computed (degenerate signal, sigma={sigma})")
            }
        };
        lines.push(Line::from(Span::styled(
            capability,
            Style::default().add_modifier(Modifier::BOLD),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(6)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title(format!("Histogram / trend of {}", self.signal))
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if self.run.figure.is_empty() {
            let msg = Paragraph::new("No data to plot.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        }

        frame.render_widget(FigureChart { figure: &self.run.figure }, inner);
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items = vec![
            ListItem::new(format!("Signal: {}", self.signal)),
            ListItem::new(format!("LSL: {}", fmt_limit(self.limits.lower))),
            ListItem::new(format!("USL: {}", fmt_limit(self.limits.upper))),
            ListItem::new(format!("Step: {}", fmt_step(self.step))),
        ];

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected_field));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  r reload  e export svg  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

/// Header columns usable as a signal.
fn signal_candidates(path: &Path) -> Result<Vec<String>, AppError> {
    let columns = crate::io::list_columns(path)?;
    Ok(columns.into_iter().filter(|c| c != LAYER_COLUMN).collect())
}

fn verdict_color(verdict: NormalityVerdict) -> Color {
    match verdict {
        NormalityVerdict::Normal => Color::Green,
        NormalityVerdict::NotNormal => Color::Yellow,
    }
}

fn round_to_step(value: f64, step: f64) -> f64 {
    if step > 0.0 && step.is_finite() {
        (value / step).round() * step
    } else {
        value
    }
}

fn fmt_limit(v: f64) -> String {
    format!("{v:.4}")
}

fn fmt_step(v: f64) -> String {
    format!("{v:e}")
}
