//! Terminal source reader demo
//!
//! Opens a host document (embedded sources plus annotation tuples) in a tabbed/tiled set of
//! read-only panels built with crossterm and ratatui.
//!
//! # Usage
//!
//! ```bash
//! cargo run -p tui-reader -- <document.json> [--config <config.json>]
//! ```
//!
//! Set `READER_LOG=<file>` to write logs (filtered by `RUST_LOG`, default `debug`) to a file.
//!
//! # Keys
//!
//! - Arrows / PageUp / PageDown / Home / End: move the cursor
//! - Enter: follow the link under the cursor
//! - Tab: next panel
//! - t: toggle tabs / tiles
//! - w: close the focused panel
//! - q / Esc: quit

mod layout;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use layout::{Arrangement, TileLayout};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use reader_core::{ColumnEncoding, LineSnapshot, ResolvedStyle, StyledSpan, Theme};
use reader_panels::{ContainerHandle, HostDocument, PanelHost, PanelRect, ReaderConfig};
use std::{
    collections::HashMap,
    env, fs,
    io::{self, stdout},
    path::PathBuf,
    process,
    sync::Mutex,
    time::Duration,
};
use tracing_subscriber::EnvFilter;
use unicode_width::UnicodeWidthStr;

/// Width of the line-number gutter, separator included.
const GUTTER_WIDTH: u16 = 6;

const PAGE_BACKGROUND: Color = Color::Rgb(255, 255, 255);

/// Cursor and scroll position of one panel (1-based row/column).
#[derive(Debug, Clone, Copy)]
struct Cursor {
    row: usize,
    column: usize,
    scroll_top: usize,
    scroll_left: usize,
}

impl Default for Cursor {
    fn default() -> Self {
        Self {
            row: 1,
            column: 1,
            scroll_top: 0,
            scroll_left: 0,
        }
    }
}

struct App {
    host: PanelHost,
    layout: TileLayout,
    theme: Theme,
    cursors: HashMap<ContainerHandle, Cursor>,
    /// Errors and notices; hides the tooltip until the cursor moves.
    status_message: String,
    should_quit: bool,
}

impl App {
    fn new(document: HostDocument, config: &ReaderConfig) -> Self {
        let mut app = Self {
            host: PanelHost::with_config(document, config),
            layout: TileLayout::new(),
            theme: config.theme(),
            cursors: HashMap::new(),
            status_message: String::new(),
            should_quit: false,
        };

        for component in app.host.initial_layout() {
            if let Err(err) = app.layout.add(&mut app.host, &component) {
                tracing::warn!(error = %err, "failed to open startup panel");
                app.status_message = err.to_string();
            }
        }
        app
    }

    fn cursor(&self, container: ContainerHandle) -> Cursor {
        self.cursors.get(&container).copied().unwrap_or_default()
    }

    fn handle_key_event(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Tab => self.layout.next_tab(),
            KeyCode::Char('t') => self.layout.toggle_arrangement(),
            KeyCode::Char('w') => self.close_active(),
            KeyCode::Enter => self.follow_link(),
            KeyCode::Up => self.move_cursor(-1, 0),
            KeyCode::Down => self.move_cursor(1, 0),
            KeyCode::Left => self.move_cursor(0, -1),
            KeyCode::Right => self.move_cursor(0, 1),
            KeyCode::PageUp => self.move_cursor(-20, 0),
            KeyCode::PageDown => self.move_cursor(20, 0),
            KeyCode::Home => self.move_cursor(0, isize::MIN),
            KeyCode::End => self.move_cursor(0, isize::MAX),
            _ => {}
        }
    }

    fn move_cursor(&mut self, rows: isize, columns: isize) {
        let Some(container) = self.layout.active() else {
            return;
        };
        let Some(panel) = self.host.panel(container) else {
            return;
        };
        let index = panel.view().line_index();

        let mut cursor = self.cursor(container);
        cursor.row = cursor
            .row
            .saturating_add_signed(rows)
            .clamp(1, index.line_count());
        let max_column = index.line_len(cursor.row).unwrap_or(0) + 1;
        cursor.column = cursor
            .column
            .saturating_add_signed(columns)
            .clamp(1, max_column);

        self.cursors.insert(container, cursor);
        self.status_message.clear();
    }

    fn follow_link(&mut self) {
        let Some(container) = self.layout.active() else {
            return;
        };
        let cursor = self.cursor(container);
        let Some(pos) = self.host.panel(container).and_then(|panel| {
            panel
                .view()
                .line_index()
                .offset_at(cursor.row, cursor.column, ColumnEncoding::Chars)
        }) else {
            return;
        };

        match self.host.follow_link(container, pos) {
            Ok(Some(_)) => {
                let errors = self.layout.run_pending(&mut self.host);
                if let Some(err) = errors.last() {
                    self.status_message = err.to_string();
                }
            }
            Ok(None) => self.status_message = "No link under cursor".to_string(),
            Err(err) => self.status_message = err.to_string(),
        }
    }

    fn close_active(&mut self) {
        match self.layout.close_active(&mut self.host) {
            Ok(Some(panel)) => {
                self.cursors.remove(&panel.container());
                self.status_message = format!("Closed {}", panel.title());
            }
            Ok(None) => {}
            Err(err) => self.status_message = err.to_string(),
        }
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),    // panels
                Constraint::Length(1), // status line
                Constraint::Length(1), // key hints
            ])
            .split(frame.area());
        let area = chunks[0];

        let root = PanelRect::new(
            f64::from(area.x),
            f64::from(area.y),
            f64::from(area.width),
            f64::from(area.height),
        );
        if let Err(err) = self.layout.arrange(&mut self.host, root) {
            self.status_message = err.to_string();
        }

        if self.layout.arrangement() == Arrangement::Tabs {
            self.render_tab_bar(frame, Rect { height: 1, ..area });
        }

        let containers = self.layout.containers().to_vec();
        for container in containers {
            self.render_panel(frame, area, container);
        }

        self.render_status_line(frame, chunks[1]);
        self.render_shortcuts(frame, chunks[2]);
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let active = self.layout.active();
        let mut spans = Vec::new();
        for container in self.layout.containers() {
            let Some(panel) = self.host.panel(*container) else {
                continue;
            };
            let style = if Some(*container) == active {
                Style::default().bg(Color::Blue).fg(Color::White)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" {} ", panel.title()), style));
            spans.push(Span::raw(" "));
        }
        frame.render_widget(Paragraph::new(Line::from(spans)), area);
    }

    fn render_panel(&mut self, frame: &mut Frame, root: Rect, container: ContainerHandle) {
        let Some(panel) = self.host.panel(container) else {
            return;
        };
        if !panel.is_visible() {
            return;
        }

        let style = panel.style();
        let to_cells = |value: Option<f64>| value.unwrap_or(0.0).max(0.0) as u16;
        let area = Rect {
            x: root.x + to_cells(style.left),
            y: root.y + to_cells(style.top),
            width: to_cells(style.width),
            height: to_cells(style.height),
        }
        .intersection(root);

        let is_active = self.layout.active() == Some(container);
        let border_style = if is_active {
            Style::default().fg(Color::Blue)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(panel.title().to_string());
        let inner = block.inner(area);
        frame.render_widget(block, area);
        if inner.width <= GUTTER_WIDTH || inner.height == 0 {
            return;
        }

        let view = panel.view();
        let index = view.line_index();
        let height = usize::from(inner.height);
        let text_width = usize::from(inner.width - GUTTER_WIDTH);

        let mut cursor = self.cursor(container);
        if cursor.row <= cursor.scroll_top {
            cursor.scroll_top = cursor.row - 1;
        } else if cursor.row > cursor.scroll_top + height {
            cursor.scroll_top = cursor.row - height;
        }
        let line_text = index.line_text(cursor.row).unwrap_or_default();
        let prefix: String = line_text.chars().take(cursor.column - 1).collect();
        let cursor_x = prefix.width();
        if cursor_x < cursor.scroll_left {
            cursor.scroll_left = cursor_x;
        } else if cursor_x >= cursor.scroll_left + text_width {
            cursor.scroll_left = cursor_x + 1 - text_width;
        }

        let mut gutter = Vec::with_capacity(height);
        let mut lines = Vec::with_capacity(height);
        for row in cursor.scroll_top + 1..=cursor.scroll_top + height {
            let Some(snapshot) = LineSnapshot::build(index, view.decorations(), row) else {
                break;
            };
            gutter.push(Line::from(format!("{row:>4} ")));
            let cursor_column = (is_active && row == cursor.row).then_some(cursor.column);
            lines.push(self.styled_line(&snapshot, cursor_column));
        }

        let [gutter_area, text_area] = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(GUTTER_WIDTH), Constraint::Min(1)])
            .areas(inner);
        frame.render_widget(
            Paragraph::new(gutter).style(Style::default().fg(Color::DarkGray)),
            gutter_area,
        );
        frame.render_widget(
            Paragraph::new(lines)
                .style(Style::default().bg(PAGE_BACKGROUND).fg(Color::Black))
                .scroll((0, u16::try_from(cursor.scroll_left).unwrap_or(u16::MAX))),
            text_area,
        );

        self.cursors.insert(container, cursor);
    }

    fn styled_line(&self, snapshot: &LineSnapshot, cursor_column: Option<usize>) -> Line<'static> {
        let mut spans = Vec::with_capacity(snapshot.spans.len() + 2);
        for span in &snapshot.spans {
            let style = self.span_style(span);
            // 1-based column relative to this span.
            let local = cursor_column
                .filter(|c| *c > span.column && *c <= span.column + span.text.chars().count())
                .map(|c| c - span.column - 1);
            match local {
                Some(at) => {
                    let before: String = span.text.chars().take(at).collect();
                    let under: String = span.text.chars().skip(at).take(1).collect();
                    let after: String = span.text.chars().skip(at + 1).collect();
                    spans.push(Span::styled(before, style));
                    spans.push(Span::styled(under, style.add_modifier(Modifier::REVERSED)));
                    spans.push(Span::styled(after, style));
                }
                None => spans.push(Span::styled(span.text.clone(), style)),
            }
        }

        let line_len: usize = snapshot.spans.iter().map(|s| s.text.chars().count()).sum();
        if cursor_column == Some(line_len + 1) {
            spans.push(Span::styled(
                " ",
                Style::default().add_modifier(Modifier::REVERSED),
            ));
        }
        Line::from(spans)
    }

    fn span_style(&self, span: &StyledSpan) -> Style {
        let mut style = terminal_style(self.theme.resolve(&span.classes));
        if span.link.is_some() {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        style
    }

    fn render_status_line(&self, frame: &mut Frame, area: Rect) {
        let status_text = if !self.status_message.is_empty() {
            self.status_message.clone()
        } else if let Some(container) = self.layout.active()
            && let Some(panel) = self.host.panel(container)
        {
            let cursor = self.cursor(container);
            let tooltip = panel
                .view()
                .line_index()
                .offset_at(cursor.row, cursor.column, ColumnEncoding::Chars)
                .and_then(|pos| self.host.hover(container, pos).ok().flatten());
            match tooltip {
                Some(tooltip) => tooltip.content.summary(),
                None => {
                    let failures = panel.view().failures().len();
                    let failed = if failures > 0 {
                        format!(" | {failures} annotation kind(s) failed")
                    } else {
                        String::new()
                    };
                    format!(
                        "{} | Ln {}, Col {} | Panels: {}{}",
                        panel.title(),
                        cursor.row,
                        cursor.column,
                        self.host.len(),
                        failed
                    )
                }
            }
        } else {
            "No open panels".to_string()
        };

        let status_line = Paragraph::new(status_text).style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
        frame.render_widget(status_line, area);
    }

    fn render_shortcuts(&self, frame: &mut Frame, area: Rect) {
        let shortcuts = "Arrows:Move  Enter:Follow link  Tab:Next panel  t:Tabs/Tiles  w:Close  q:Quit";
        let shortcuts_line =
            Paragraph::new(shortcuts).style(Style::default().bg(Color::Blue).fg(Color::White));
        frame.render_widget(shortcuts_line, area);
    }
}

fn terminal_style(resolved: ResolvedStyle) -> Style {
    let mut style = Style::default();
    if let Some(color) = resolved.color {
        style = style.fg(Color::Rgb(color.r, color.g, color.b));
    }
    let mut mods = Modifier::empty();
    if resolved.bold {
        mods |= Modifier::BOLD;
    }
    if resolved.italic {
        mods |= Modifier::ITALIC;
    }
    if resolved.underline {
        mods |= Modifier::UNDERLINED;
    }
    if resolved.dotted {
        mods |= Modifier::DIM;
    }
    style.add_modifier(mods)
}

fn init_logging() -> io::Result<()> {
    let Ok(path) = env::var("READER_LOG") else {
        return Ok(());
    };
    let file = fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

struct Args {
    document: PathBuf,
    config: Option<PathBuf>,
}

fn parse_args(args: &[String]) -> Option<Args> {
    let mut document = None;
    let mut config = None;
    let mut rest = args.iter().skip(1);
    while let Some(arg) = rest.next() {
        if arg == "--config" {
            config = Some(PathBuf::from(rest.next()?));
        } else if document.is_none() {
            document = Some(PathBuf::from(arg));
        } else {
            return None;
        }
    }
    Some(Args {
        document: document?,
        config,
    })
}

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(args) = parse_args(&args) else {
        let program = env::args().next().unwrap_or_else(|| "tui-reader".to_string());
        eprintln!("Usage: {program} <document.json> [--config <config.json>]");
        process::exit(1);
    };

    init_logging()?;

    let config = match &args.config {
        Some(path) => ReaderConfig::load(path).unwrap_or_else(|err| {
            eprintln!("Error: {}: {err}", path.display());
            process::exit(1);
        }),
        None => ReaderConfig::default(),
    };
    let text = fs::read_to_string(&args.document)?;
    let document = HostDocument::from_json(&text).unwrap_or_else(|err| {
        eprintln!("Error: {}: {err}", args.document.display());
        process::exit(1);
    });
    tracing::info!(
        document = %args.document.display(),
        files = document.file_ids().len(),
        "opening host document"
    );

    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(document, &config);
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {err}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| app.render(f))?;

        if app.should_quit {
            break;
        }

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
        {
            app.handle_key_event(key);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args() {
        let parsed = parse_args(&args(&["tui-reader", "doc.json", "--config", "c.json"])).unwrap();
        assert_eq!(parsed.document, PathBuf::from("doc.json"));
        assert_eq!(parsed.config, Some(PathBuf::from("c.json")));

        assert!(parse_args(&args(&["tui-reader"])).is_none());
        assert!(parse_args(&args(&["tui-reader", "doc.json", "--config"])).is_none());
        assert!(parse_args(&args(&["tui-reader", "a.json", "b.json"])).is_none());
    }

    #[test]
    fn test_terminal_style_from_theme() {
        let theme = Theme::default();
        let style = terminal_style(theme.resolve(&["semantics", "header_name"]));
        assert_eq!(style.fg, Some(Color::Rgb(0xa3, 0x15, 0x15)));
        assert!(style.add_modifier.contains(Modifier::UNDERLINED));
    }
}
