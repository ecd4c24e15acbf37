//! voxie-telemetry — live terminal view of voxie voxel indicators.
//!
//! Binds UDP 127.0.0.1:9100 and renders the JSON snapshots that
//! `voxie::diag::DiagSender` fires at it: every indicator's grid one Z slice
//! at a time, its current and pending state, the recent state changes, frame
//! timing, per-system cost and the captured log.
//!
//! ```text
//!   voxie program ──UDP JSON, 10 Hz──► voxie-telemetry ──► terminal
//!   (DiagSender)                       (ratatui + crossterm)
//! ```
//!
//! Start any voxie program built with `diagnostics` (the default), for example
//! `cargo run -p voxie --example state_cycle`, then `cargo run -p voxie-telemetry`.

use std::collections::VecDeque;
use std::io::{self, Stdout};
use std::net::UdpSocket;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Sparkline, Table, Tabs};
use serde::Deserialize;

const LISTEN_ADDR: &str = "127.0.0.1:9100";
/// Samples kept for the FPS and frame-time sparklines.
const HISTORY_LEN: usize = 600;
const MAX_LOG_LINES: usize = 2000;
const MAX_STATE_CHANGES: usize = 200;
/// How long to wait for a key before redrawing.
const INPUT_POLL: Duration = Duration::from_millis(50);

// ── Snapshot wire format (mirrors voxie::diag) ──────────────────────────

#[derive(Deserialize, Clone, Default)]
struct Snapshot {
    fps: f32,
    delta_ms: f32,
    frame_count: u64,
    elapsed_secs: f32,
    entity_count: usize,
    #[serde(default)]
    system_timings: Vec<SystemCost>,
    #[serde(default)]
    indicators: Vec<IndicatorView>,
    #[serde(default)]
    logs: Vec<LogLine>,
}

#[derive(Deserialize, Clone, Default)]
struct SystemCost {
    name: String,
    duration_us: f64,
}

#[derive(Deserialize, Clone, Default)]
struct IndicatorView {
    entity: u64,
    state: String,
    pending_state: Option<String>,
    width: u32,
    height: u32,
    depth: u32,
    visible_count: usize,
    voxels: Vec<VoxelView>,
    /// The sender dropped `voxels` to stay within one datagram.
    #[serde(default)]
    voxels_omitted: bool,
}

#[derive(Deserialize, Clone, Default)]
struct VoxelView {
    index: usize,
    color: [u8; 3],
    brightness: f32,
    scale: f32,
    animation: String,
}

#[derive(Deserialize, Clone, Default)]
struct LogLine {
    level: String,
    target: String,
    message: String,
    timestamp_secs: f32,
}

// ── Model ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Page {
    Grid,
    Systems,
    Log,
}

impl Page {
    const ORDER: [Page; 3] = [Page::Grid, Page::Systems, Page::Log];

    fn title(self) -> &'static str {
        match self {
            Page::Grid => "Indicators",
            Page::Systems => "Systems",
            Page::Log => "Log",
        }
    }

    fn position(self) -> usize {
        Self::ORDER.iter().position(|&p| p == self).unwrap_or(0)
    }

    fn cycle(self, step: isize) -> Self {
        let n = Self::ORDER.len() as isize;
        let next = (self.position() as isize + step).rem_euclid(n);
        Self::ORDER[next as usize]
    }
}

/// Log levels from most to least verbose.
const LEVELS: [&str; 5] = ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"];

fn level_rank(level: &str) -> usize {
    LEVELS.iter().position(|&l| l == level).unwrap_or(0)
}

fn level_color(level: &str) -> Color {
    match level {
        "ERROR" => Color::Red,
        "WARN" => Color::Yellow,
        "INFO" => Color::Cyan,
        "DEBUG" => Color::Gray,
        _ => Color::DarkGray,
    }
}

/// Fixed-size sample window.
struct History {
    samples: VecDeque<u64>,
}

impl History {
    fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    fn record(&mut self, value: f32) {
        if self.samples.len() == HISTORY_LEN {
            self.samples.pop_front();
        }
        self.samples.push_back(value.round().max(0.0) as u64);
    }

    fn to_vec(&self) -> Vec<u64> {
        self.samples.iter().copied().collect()
    }

    /// `(min, mean, max)`, all zero when empty.
    fn summary(&self) -> (f64, f64, f64) {
        let (Some(lo), Some(hi)) = (self.samples.iter().min(), self.samples.iter().max()) else {
            return (0.0, 0.0, 0.0);
        };
        let mean = self.samples.iter().sum::<u64>() as f64 / self.samples.len() as f64;
        (*lo as f64, mean, *hi as f64)
    }
}

/// A committed state change spotted between two snapshots.
#[derive(Clone)]
struct StateChange {
    at_secs: f32,
    entity: u64,
    from: String,
    to: String,
}

struct Dashboard {
    snapshot: Snapshot,
    received: u64,
    frozen: bool,
    page: Page,

    fps: History,
    /// Frame time in microseconds.
    frame_us: History,

    selected: usize,
    z: u32,
    changes: VecDeque<StateChange>,

    log: VecDeque<LogLine>,
    min_level: usize,
    /// `None` follows the tail.
    log_scroll: Option<usize>,
}

impl Dashboard {
    fn new() -> Self {
        Self {
            snapshot: Snapshot::default(),
            received: 0,
            frozen: false,
            page: Page::Grid,
            fps: History::new(),
            frame_us: History::new(),
            selected: 0,
            z: 0,
            changes: VecDeque::new(),
            log: VecDeque::new(),
            min_level: level_rank("INFO"),
            log_scroll: None,
        }
    }

    fn ingest(&mut self, next: Snapshot) {
        if self.frozen {
            return;
        }
        self.fps.record(next.fps);
        self.frame_us.record(next.delta_ms * 1000.0);

        for indicator in &next.indicators {
            let Some(before) = self
                .snapshot
                .indicators
                .iter()
                .find(|old| old.entity == indicator.entity)
            else {
                continue;
            };
            if before.state == indicator.state {
                continue;
            }
            if self.changes.len() == MAX_STATE_CHANGES {
                self.changes.pop_front();
            }
            self.changes.push_back(StateChange {
                at_secs: next.elapsed_secs,
                entity: indicator.entity,
                from: before.state.clone(),
                to: indicator.state.clone(),
            });
        }

        for line in &next.logs {
            if self.log.len() == MAX_LOG_LINES {
                self.log.pop_front();
            }
            self.log.push_back(line.clone());
        }

        self.snapshot = next;
        self.received += 1;
        self.keep_selection_in_range();
    }

    fn keep_selection_in_range(&mut self) {
        let Some(last) = self.snapshot.indicators.len().checked_sub(1) else {
            self.selected = 0;
            self.z = 0;
            return;
        };
        self.selected = self.selected.min(last);
        let depth = self.snapshot.indicators[self.selected].depth;
        self.z = self.z.min(depth.saturating_sub(1));
    }

    fn indicator(&self) -> Option<&IndicatorView> {
        self.snapshot.indicators.get(self.selected)
    }

    fn visible_log(&self) -> Vec<&LogLine> {
        self.log
            .iter()
            .filter(|line| level_rank(&line.level) >= self.min_level)
            .collect()
    }

    /// Returns `false` when the user asked to quit.
    fn on_key(&mut self, key: KeyEvent) -> bool {
        let ctrl_c = key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c');
        if ctrl_c || matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
            return false;
        }

        match key.code {
            KeyCode::Char(' ') | KeyCode::Char('p') => self.frozen = !self.frozen,
            KeyCode::Tab => self.page = self.page.cycle(1),
            KeyCode::BackTab => self.page = self.page.cycle(-1),
            KeyCode::Char(c @ '1'..='3') => {
                let index = c as usize - '1' as usize;
                self.page = Page::ORDER[index];
            }
            code => match self.page {
                Page::Grid => self.on_grid_key(code),
                Page::Log => self.on_log_key(code),
                Page::Systems => {}
            },
        }
        true
    }

    fn on_grid_key(&mut self, code: KeyCode) {
        let count = self.snapshot.indicators.len();
        if count == 0 {
            return;
        }
        match code {
            KeyCode::Right | KeyCode::Char('l') => self.selected = (self.selected + 1) % count,
            KeyCode::Left | KeyCode::Char('h') => self.selected = (self.selected + count - 1) % count,
            KeyCode::Up | KeyCode::Char('k') => self.z = self.z.saturating_add(1),
            KeyCode::Down | KeyCode::Char('j') => self.z = self.z.saturating_sub(1),
            _ => {}
        }
        self.keep_selection_in_range();
    }

    fn on_log_key(&mut self, code: KeyCode) {
        let tail = self.visible_log().len();
        match code {
            KeyCode::Char('f') => self.min_level = (self.min_level + 1) % LEVELS.len(),
            KeyCode::End | KeyCode::Char('G') => self.log_scroll = None,
            KeyCode::Up | KeyCode::Char('k') => {
                let at = self.log_scroll.unwrap_or(tail);
                self.log_scroll = Some(at.saturating_sub(1));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let at = self.log_scroll.unwrap_or(tail) + 1;
                self.log_scroll = (at < tail).then_some(at);
            }
            _ => {}
        }
    }
}

// ── Entry point ─────────────────────────────────────────────────────────

type Term = Terminal<CrosstermBackend<Stdout>>;

fn main() -> io::Result<()> {
    let socket = UdpSocket::bind(LISTEN_ADDR).map_err(|e| {
        io::Error::new(
            e.kind(),
            format!("cannot listen on {LISTEN_ADDR} ({e}); is another voxie-telemetry open?"),
        )
    })?;
    socket.set_nonblocking(true)?;

    let mut terminal = enter_terminal()?;
    let outcome = event_loop(&mut terminal, &socket);
    leave_terminal(&mut terminal)?;
    outcome
}

fn enter_terminal() -> io::Result<Term> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    Terminal::new(CrosstermBackend::new(stdout))
}

fn leave_terminal(terminal: &mut Term) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

fn event_loop(terminal: &mut Term, socket: &UdpSocket) -> io::Result<()> {
    let mut dashboard = Dashboard::new();
    let mut datagram = vec![0u8; 64 * 1024];

    loop {
        while let Ok(len) = socket.recv(&mut datagram) {
            // Malformed datagrams are dropped.
            if let Ok(snapshot) = serde_json::from_slice::<Snapshot>(&datagram[..len]) {
                dashboard.ingest(snapshot);
            }
        }

        terminal.draw(|frame| render(frame, &dashboard))?;

        if !event::poll(INPUT_POLL)? {
            continue;
        }
        if let Event::Key(key) = event::read()? {
            if !dashboard.on_key(key) {
                return Ok(());
            }
        }
    }
}

// ── Layout ──────────────────────────────────────────────────────────────

fn render(frame: &mut ratatui::Frame, dash: &Dashboard) {
    let [status, tabs, body, keys] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .areas(frame.area());

    render_status(frame, dash, status);
    render_tabs(frame, dash, tabs);
    match dash.page {
        Page::Grid => render_grid_page(frame, dash, body),
        Page::Systems => render_systems_page(frame, dash, body),
        Page::Log => render_log_page(frame, dash, body),
    }
    render_keys(frame, dash, keys);
}

fn panel(title: impl Into<String>, accent: Color) -> Block<'static> {
    Block::default()
        .title(format!(" {} ", title.into()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
}

fn dim(text: impl Into<String>) -> Span<'static> {
    Span::styled(text.into(), Style::default().fg(Color::DarkGray))
}

fn render_status(frame: &mut ratatui::Frame, dash: &Dashboard, area: Rect) {
    let snap = &dash.snapshot;
    let (badge, badge_bg) = match (dash.frozen, dash.received) {
        (true, _) => ("FROZEN", Color::Yellow),
        (false, 0) => ("WAITING", Color::DarkGray),
        (false, _) => ("LIVE", Color::Green),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {badge} "),
            Style::default()
                .bg(badge_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
    ];
    let fields = [
        ("fps", format!("{:.0}", snap.fps)),
        ("frame", snap.frame_count.to_string()),
        ("entities", snap.entity_count.to_string()),
        ("indicators", snap.indicators.len().to_string()),
        ("uptime", format_uptime(snap.elapsed_secs)),
    ];
    for (label, value) in fields {
        spans.push(dim(format!(" {label} ")));
        spans.push(Span::styled(
            value,
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        ));
        spans.push(dim(" │"));
    }

    frame.render_widget(
        Paragraph::new(Line::from(spans)).block(panel("voxie-telemetry", Color::Cyan)),
        area,
    );
}

fn render_tabs(frame: &mut ratatui::Frame, dash: &Dashboard, area: Rect) {
    let titles = Page::ORDER
        .iter()
        .enumerate()
        .map(|(i, page)| Line::from(format!("{} {}", i + 1, page.title())));
    let tabs = Tabs::new(titles)
        .select(dash.page.position())
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .divider(" ");
    frame.render_widget(tabs, area);
}

fn render_keys(frame: &mut ratatui::Frame, dash: &Dashboard, area: Rect) {
    let page_keys: &[(&str, &str)] = match dash.page {
        Page::Grid => &[("←→", "indicator"), ("↑↓", "z slice")],
        Page::Systems => &[],
        Page::Log => &[("f", "min level"), ("↑↓", "scroll"), ("G", "follow")],
    };
    let common = [("1-3/Tab", "page"), ("space", "freeze"), ("q", "quit")];

    let spans: Vec<Span> = page_keys
        .iter()
        .chain(common.iter())
        .flat_map(|(key, what)| {
            [
                Span::styled(format!(" {key}"), Style::default().fg(Color::Cyan)),
                Span::raw(format!(" {what} ")),
            ]
        })
        .collect();
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

// ── Indicators page ─────────────────────────────────────────────────────

fn render_grid_page(frame: &mut ratatui::Frame, dash: &Dashboard, area: Rect) {
    let [charts, rest] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(6)])
        .areas(area);
    let [fps_area, frame_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 2), Constraint::Ratio(1, 2)])
        .areas(charts);
    let [grid_area, changes_area] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(30), Constraint::Length(42)])
        .areas(rest);

    let (lo, mean, hi) = dash.fps.summary();
    render_history(
        frame,
        fps_area,
        "FPS",
        &dash.fps,
        Color::Green,
        format!("{lo:.0} / {mean:.0} / {hi:.0}  (min / mean / max)"),
    );
    let (lo, mean, hi) = dash.frame_us.summary();
    render_history(
        frame,
        frame_area,
        "Frame time",
        &dash.frame_us,
        Color::Yellow,
        format!(
            "{:.1} / {:.1} / {:.1} ms",
            lo / 1000.0,
            mean / 1000.0,
            hi / 1000.0
        ),
    );

    render_indicator(frame, dash, grid_area);
    render_changes(frame, dash, changes_area);
}

fn render_history(
    frame: &mut ratatui::Frame,
    area: Rect,
    title: &str,
    history: &History,
    color: Color,
    caption: String,
) {
    let block = panel(title, Color::DarkGray);
    let inner = block.inner(area);
    frame.render_widget(block, area);
    let [chart, footer] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .areas(inner);

    let samples = history.to_vec();
    frame.render_widget(
        Sparkline::default()
            .data(&samples)
            .style(Style::default().fg(color)),
        chart,
    );
    frame.render_widget(Paragraph::new(dim(caption)), footer);
}

fn render_indicator(frame: &mut ratatui::Frame, dash: &Dashboard, area: Rect) {
    let Some(view) = dash.indicator() else {
        let hint = dim("  no indicators yet; is a voxie program running with diagnostics?");
        frame.render_widget(
            Paragraph::new(hint).block(panel("Indicator", Color::Cyan)),
            area,
        );
        return;
    };

    let title = format!(
        "#{}  {}/{}  {}×{}×{}  z {}/{}",
        view.entity,
        dash.selected + 1,
        dash.snapshot.indicators.len(),
        view.width,
        view.height,
        view.depth,
        dash.z,
        view.depth.saturating_sub(1),
    );

    let mut header = vec![
        dim("  state "),
        Span::styled(
            view.state.clone(),
            Style::default()
                .fg(state_color(&view.state))
                .add_modifier(Modifier::BOLD),
        ),
    ];
    if let Some(pending) = &view.pending_state {
        header.push(dim("  settling into "));
        header.push(Span::styled(
            pending.clone(),
            Style::default().fg(state_color(pending)),
        ));
    }

    let mut lines = vec![Line::from(header), Line::default()];
    lines.extend(slice_rows(view, dash.z).into_iter().map(|row| {
        let mut spans = vec![Span::raw("  ")];
        spans.extend(row.into_iter().map(|cell| match cell {
            Some(color) => Span::styled("██", Style::default().fg(color)),
            None => dim("· "),
        }));
        Line::from(spans)
    }));

    lines.push(Line::default());
    lines.push(Line::from(dim(format!("  {}", indicator_footer(view)))));

    frame.render_widget(Paragraph::new(lines).block(panel(title, Color::Cyan)), area);
}

fn render_changes(frame: &mut ratatui::Frame, dash: &Dashboard, area: Rect) {
    let block = panel("State changes", Color::DarkGray);
    let rows = block.inner(area).height as usize;
    let lines: Vec<Line> = if dash.changes.is_empty() {
        vec![Line::from(dim("  none yet"))]
    } else {
        dash.changes
            .iter()
            .rev()
            .take(rows)
            .map(|change| {
                Line::from(vec![
                    dim(format!(" {:>7.1}s #{:<3}", change.at_secs, change.entity)),
                    Span::styled(
                        change.from.clone(),
                        Style::default().fg(state_color(&change.from)),
                    ),
                    dim(" → "),
                    Span::styled(
                        change.to.clone(),
                        Style::default().fg(state_color(&change.to)),
                    ),
                ])
            })
            .collect()
    };
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

// ── Systems page ────────────────────────────────────────────────────────

fn render_systems_page(frame: &mut ratatui::Frame, dash: &Dashboard, area: Rect) {
    let block = panel("Per-system cost, last frame", Color::Cyan);
    let mut costs: Vec<&SystemCost> = dash.snapshot.system_timings.iter().collect();
    if costs.is_empty() {
        frame.render_widget(Paragraph::new(dim("  no systems reported")).block(block), area);
        return;
    }
    costs.sort_by(|a, b| b.duration_us.total_cmp(&a.duration_us));

    let slowest = costs[0].duration_us.max(1.0);
    let bar_room = f64::from(block.inner(area).width.saturating_sub(40).max(1));
    let rows = costs.iter().map(|cost| {
        let ms = cost.duration_us / 1000.0;
        let heat = match ms {
            m if m >= 5.0 => Color::Red,
            m if m >= 1.0 => Color::Yellow,
            _ => Color::Green,
        };
        let width = ((cost.duration_us / slowest) * bar_room).ceil() as usize;
        Row::new(vec![
            Cell::from(cost.name.clone()),
            Cell::from(format!("{ms:8.3} ms")).style(Style::default().fg(Color::Gray)),
            Cell::from("▇".repeat(width.max(1))).style(Style::default().fg(heat)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(24),
            Constraint::Length(12),
            Constraint::Min(1),
        ],
    )
    .header(
        Row::new(vec!["system", "time", ""]).style(
            Style::default()
                .fg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        ),
    )
    .block(block);
    frame.render_widget(table, area);
}

// ── Log page ────────────────────────────────────────────────────────────

fn render_log_page(frame: &mut ratatui::Frame, dash: &Dashboard, area: Rect) {
    let lines = dash.visible_log();
    let title = format!(
        "Log  ≥{}  {} of {}  {}",
        LEVELS[dash.min_level],
        lines.len(),
        dash.log.len(),
        if dash.log_scroll.is_none() {
            "following"
        } else {
            "scrolled"
        },
    );
    let block = panel(title, Color::Cyan);
    if lines.is_empty() {
        frame.render_widget(Paragraph::new(dim("  nothing logged")).block(block), area);
        return;
    }

    let height = block.inner(area).height as usize;
    let last_page = lines.len().saturating_sub(height);
    let top = dash.log_scroll.map_or(last_page, |at| at.min(last_page));

    let text: Vec<Line> = lines
        .iter()
        .map(|line| {
            Line::from(vec![
                dim(format!(" {:>7.2} ", line.timestamp_secs)),
                Span::styled(
                    format!("{:5} ", line.level),
                    Style::default()
                        .fg(level_color(&line.level))
                        .add_modifier(Modifier::BOLD),
                ),
                dim(format!("{} ", line.target)),
                Span::raw(line.message.clone()),
            ])
        })
        .collect();
    let top = u16::try_from(top).unwrap_or(u16::MAX);
    frame.render_widget(Paragraph::new(text).block(block).scroll((top, 0)), area);
}

// ── Helpers ─────────────────────────────────────────────────────────────

/// Cells of one Z slice, highest row first. `None` is an empty cell.
fn indicator_footer(view: &IndicatorView) -> String {
    if view.voxels_omitted {
        return format!(
            "lit {}  voxels omitted (snapshot over the datagram budget)",
            view.visible_count
        );
    }
    let animating = view
        .voxels
        .iter()
        .filter(|v| matches!(v.animation.as_str(), "appear" | "disappear"))
        .count();
    format!(
        "lit {}  drawn {}  in motion {animating}",
        view.visible_count,
        view.voxels.len()
    )
}

fn slice_rows(view: &IndicatorView, z: u32) -> Vec<Vec<Option<Color>>> {
    let (w, h) = (view.width as usize, view.height as usize);
    let mut rows = vec![vec![None; w]; h];
    let plane = w * h;
    if plane == 0 {
        return rows;
    }
    for voxel in &view.voxels {
        if voxel.index / plane != z as usize || voxel.scale <= 0.0 {
            continue;
        }
        let within = voxel.index % plane;
        let (x, y) = (within % w, within / w);
        rows[h - 1 - y][x] = Some(shade(voxel.color, voxel.brightness));
    }
    rows
}

/// Color scaled by brightness, with a floor so dim voxels stay visible.
fn shade(color: [u8; 3], brightness: f32) -> Color {
    let k = 0.2 + 0.8 * brightness.clamp(0.0, 1.0);
    let [r, g, b] = color.map(|c| (f32::from(c) * k).round() as u8);
    Color::Rgb(r, g, b)
}

fn state_color(state: &str) -> Color {
    match state {
        "thinking" => Color::Blue,
        "responding" => Color::Yellow,
        "error" => Color::Red,
        "success" => Color::Green,
        "notification" => Color::Magenta,
        _ => Color::Cyan,
    }
}

fn format_uptime(secs: f32) -> String {
    if secs < 60.0 {
        return format!("{secs:.1}s");
    }
    let whole = secs as u64;
    let (hours, minutes, seconds) = (whole / 3600, whole / 60 % 60, whole % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}
