use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use crossterm::{event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind}, execute, terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen}};
use ratatui::{backend::CrosstermBackend, Terminal, widgets::{Block, Borders, List, ListItem, Paragraph, ListState}, layout::{Layout, Constraint, Direction}, style::{Style, Modifier, Color}, text::{Line, Span}};

use family_todo::{
    cache::LocalCache,
    client::{ApiClient, FamilyTodoApi},
    config::ClientConfig,
    domain::todo::{NewTodo, Priority, Todo, TodoId},
    ui::{Board, DueChoice, MemberFilter, Notice, NoticeLevel, Source},
};

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let config = ClientConfig::from_env();
    let api = ApiClient::new(config.api_base_url.clone());
    let cache = LocalCache::new(config.cache_path.clone());
    let (board, notice) = Board::load(api, cache).await;

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, App::new(board, config, notice)).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    res
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode { View, Create }

enum Row {
    Header(&'static str),
    Item(TodoId),
}

struct Draft {
    title: String,
    assignee: usize,
    priority: Priority,
    due: DueChoice,
}

impl Draft {
    fn empty() -> Self { Self { title: String::new(), assignee: 0, priority: Priority::Normal, due: DueChoice::None } }
}

struct App<A: FamilyTodoApi> {
    board: Board<A>,
    config: ClientConfig,
    rows: Vec<Row>,
    selected: usize,
    list_state: ListState,
    last_tick: Instant,
    mode: Mode,
    draft: Draft,
    notice: Option<Notice>,
}

impl<A: FamilyTodoApi> App<A> {
    fn new(board: Board<A>, config: ClientConfig, notice: Option<Notice>) -> Self {
        let mut app = Self {
            board,
            config,
            rows: Vec::new(),
            selected: 0,
            list_state: ListState::default(),
            last_tick: Instant::now(),
            mode: Mode::View,
            draft: Draft::empty(),
            notice,
        };
        app.rebuild_rows();
        app
    }

    fn rebuild_rows(&mut self) {
        let today = Utc::now().date_naive();
        let groups = self.board.groups(today);
        self.rows = groups
            .sections()
            .into_iter()
            .flat_map(|(title, items)| {
                std::iter::once(Row::Header(title)).chain(items.iter().map(|t| Row::Item(t.id.clone())))
            })
            .collect();
        let len = self.item_count();
        if len == 0 { self.selected = 0; } else if self.selected >= len { self.selected = len - 1; }
        self.list_state.select(self.row_index(self.selected));
    }

    fn item_count(&self) -> usize { self.rows.iter().filter(|r| matches!(r, Row::Item(_))).count() }

    /// Position in `rows` of the n-th todo, skipping headers.
    fn row_index(&self, nth: usize) -> Option<usize> {
        self.rows.iter().enumerate().filter(|(_, r)| matches!(r, Row::Item(_))).nth(nth).map(|(i, _)| i)
    }

    fn selected_id(&self) -> Option<TodoId> {
        match self.row_index(self.selected).and_then(|i| self.rows.get(i)) {
            Some(Row::Item(id)) => Some(id.clone()),
            _ => None,
        }
    }

    async fn submit_draft(&mut self) {
        let title = self.draft.title.trim().to_string();
        if title.is_empty() { return; }
        let Some(member) = self.board.members.get(self.draft.assignee).cloned() else { return };
        let input = NewTodo {
            title,
            assigned_to: member.name,
            assigned_to_color: member.color,
            priority: self.draft.priority,
            due_date: self.draft.due.date(Utc::now().date_naive()),
            ..NewTodo::default()
        };
        self.notice = Some(self.board.add(input).await);
    }
}

async fn run_app<A: FamilyTodoApi>(terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>, mut app: App<A>) -> Result<()> {
    let tick_rate = Duration::from_millis(200);

    loop {
        terminal.draw(|f| {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([
                    Constraint::Length(3),
                    Constraint::Min(1),
                    Constraint::Length(3),
                ])
                .split(f.size());

            let today = Utc::now().date_naive();
            let progress = app.board.progress(today);
            let member = match &app.board.member { MemberFilter::All => "everyone".to_string(), MemberFilter::Named(n) => n.clone() };
            let header = Paragraph::new(format!(
                "{}/{} done, {} due today  |  showing {} for {}  |  Enter: done, p: priority, n: new, d: delete, f/m: filters, q: quit",
                progress.completed, progress.total, progress.due_today, app.board.status.label(), member,
            ))
            .block(Block::default().borders(Borders::ALL).title(match app.board.source { Source::Api => "family-todo", Source::Cache => "family-todo (offline)" }));
            f.render_widget(header, chunks[0]);

            let middle = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(70), Constraint::Percentage(30)])
                .split(chunks[1]);

            let list_items: Vec<ListItem> = app.rows.iter().map(|row| match row {
                Row::Header(title) => ListItem::new(Line::from(Span::styled(*title, Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED)))),
                Row::Item(id) => match app.board.find(id) {
                    Some(t) => ListItem::new(todo_line(t)),
                    None => ListItem::new(""),
                },
            }).collect();
            let list = List::new(list_items)
                .block(Block::default().borders(Borders::ALL).title("tasks"))
                .highlight_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD | Modifier::REVERSED))
                .highlight_symbol(">> ");
            f.render_stateful_widget(list, middle[0], &mut app.list_state);

            let members: Vec<ListItem> = app.board.members.iter().map(|m| {
                let pending = app.board.pending_count_for(&m.name);
                ListItem::new(Line::from(vec![
                    Span::styled("● ", Style::default().fg(hex_color(&m.color))),
                    Span::raw(format!("{} ({pending})", m.name)),
                ]))
            }).collect();
            f.render_widget(List::new(members).block(Block::default().borders(Borders::ALL).title("family")), middle[1]);

            let (title, text, style) = match app.mode {
                Mode::Create => {
                    let assignee = app.board.members.get(app.draft.assignee).map(|m| m.name.as_str()).unwrap_or("-");
                    ("new task", format!("{}_  |  for {} ({}, {})  |  Tab: assignee, BackTab: priority, Down: due, Enter: save, Esc: cancel", app.draft.title, assignee, app.draft.priority.as_str(), app.draft.due.label()), Style::default())
                }
                Mode::View => match &app.notice {
                    Some(n) => ("notice", format!("{}{}", n.title, n.detail.as_deref().map(|d| format!(": {d}")).unwrap_or_default()), notice_style(n.level)),
                    None => ("info", format!("API_BASE_URL={}  |  cache={}", app.config.api_base_url, app.config.cache_path.display()), Style::default()),
                },
            };
            f.render_widget(Paragraph::new(text).style(style).block(Block::default().borders(Borders::ALL).title(title)), chunks[2]);
        })?;

        let timeout = tick_rate.saturating_sub(app.last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                // Only act on key presses; ignore repeats and releases to prevent duplicate input
                if key.kind != KeyEventKind::Press { continue; }
                match app.mode {
                    Mode::View => {
                        app.notice = None;
                        match key.code {
                            KeyCode::Char('q') => break,
                            KeyCode::Up => { if app.selected > 0 { app.selected -= 1; } }
                            KeyCode::Down => { if app.selected + 1 < app.item_count() { app.selected += 1; } }
                            KeyCode::Enter => {
                                if let Some(id) = app.selected_id() { app.notice = app.board.toggle_completed(&id).await; }
                            }
                            KeyCode::Char('p') => {
                                if let Some(id) = app.selected_id() { app.notice = app.board.toggle_priority(&id).await; }
                            }
                            KeyCode::Char('d') => {
                                if let Some(id) = app.selected_id() { app.notice = app.board.remove(&id).await; }
                            }
                            KeyCode::Char('n') => {
                                app.mode = Mode::Create;
                                app.draft = Draft::empty();
                            }
                            KeyCode::Char('f') => { app.board.status = app.board.status.next(); }
                            KeyCode::Char('m') => { app.board.cycle_member(); }
                            _ => {}
                        }
                        app.rebuild_rows();
                    }
                    Mode::Create => match key.code {
                        KeyCode::Esc => { app.mode = Mode::View; }
                        KeyCode::Enter => {
                            app.submit_draft().await;
                            app.mode = Mode::View;
                            app.rebuild_rows();
                        }
                        KeyCode::Backspace => { app.draft.title.pop(); }
                        KeyCode::Tab => {
                            let n = app.board.members.len().max(1);
                            app.draft.assignee = (app.draft.assignee + 1) % n;
                        }
                        KeyCode::BackTab => { app.draft.priority = app.draft.priority.toggled(); }
                        KeyCode::Down => { app.draft.due = app.draft.due.next(); }
                        KeyCode::Char(c) => app.draft.title.push(c),
                        _ => {}
                    },
                }
            }
        }
        if app.last_tick.elapsed() >= tick_rate {
            app.last_tick = Instant::now();
        }
    }
    Ok(())
}

fn todo_line(t: &Todo) -> Line<'static> {
    let mark = if t.completed { "[x]" } else { "[ ]" };
    let mut spans = vec![Span::raw(format!("{mark} "))];
    if t.priority == Priority::High { spans.push(Span::styled("! ", Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))); }
    spans.push(Span::raw(t.title.clone()));
    spans.push(Span::styled(format!("  {}", t.assigned_to), Style::default().fg(hex_color(&t.assigned_to_color))));
    if let Some(due) = t.due_date { spans.push(Span::styled(format!("  {due}"), Style::default().fg(Color::DarkGray))); }
    if let Some(c) = &t.category { spans.push(Span::styled(format!("  #{c}"), Style::default().fg(Color::DarkGray))); }
    Line::from(spans)
}

fn notice_style(level: NoticeLevel) -> Style {
    match level {
        NoticeLevel::Success => Style::default().fg(Color::Green),
        NoticeLevel::Info => Style::default().fg(Color::Blue),
        NoticeLevel::Error => Style::default().fg(Color::Red),
    }
}

fn hex_color(hex: &str) -> Color {
    let channel = |i: usize| hex.get(i..i + 2).and_then(|s| u8::from_str_radix(s, 16).ok());
    match (hex.starts_with('#'), channel(1), channel(3), channel(5)) {
        (true, Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Reset,
    }
}
