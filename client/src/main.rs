//! Terminal UI for the todo service.
//!
//! Connects to a running todo-server (base URL as the first argument,
//! default `http://127.0.0.1:8787`) and drives the API through the
//! library's build/parse pairs. `QueryCache` keeps the two lists fresh:
//! every successful mutation invalidates the names it staled and the next
//! frame re-fetches.
//!
//! Keys:
//!   Up/Down  move the cursor    a  add       e    edit title
//!   Tab      active/deleted     d  delete    r    restore
//!   q        quit               space        toggle completed

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;

use todo_client::{
    CreateTodo, HttpMethod, HttpRequest, HttpResponse, Mutation, QueryCache, Todo, TodoClient,
    UpdateTodo, QUERY_DELETED_TODOS, QUERY_TODOS,
};

/// Title length cap, enforced at input time.
const TITLE_MAX_CHARS: usize = 100;

/// Which list the cursor lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Active,
    Deleted,
}

/// An open text prompt in the footer.
#[derive(Debug)]
enum Prompt {
    Add { buffer: String },
    Edit { id: i64, buffer: String },
}

struct App {
    client: TodoClient,
    agent: ureq::Agent,
    cache: QueryCache,
    view: View,
    selected: usize,
    prompt: Option<Prompt>,
    /// One inline error line; cleared by the next successful mutation.
    error: Option<String>,
}

impl App {
    fn new(base_url: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            client: TodoClient::new(base_url),
            agent,
            cache: QueryCache::new(),
            view: View::Active,
            selected: 0,
            prompt: None,
            error: None,
        }
    }

    /// Make sure both lists are cached, recording fetch failures inline.
    fn refresh(&mut self) {
        let client = &self.client;
        let agent = &self.agent;

        let active = self.cache.fetch_with(QUERY_TODOS, || {
            let response = execute_request(agent, client.build_list_todos())?;
            client.parse_list(response).map_err(|e| e.to_string())
        });
        if let Err(message) = active {
            self.error = Some(format!("Failed to fetch todos: {message}"));
        }

        let deleted = self.cache.fetch_with(QUERY_DELETED_TODOS, || {
            let response = execute_request(agent, client.build_list_deleted())?;
            client.parse_list(response).map_err(|e| e.to_string())
        });
        if let Err(message) = deleted {
            self.error = Some(format!("Failed to fetch deleted todos: {message}"));
        }

        self.clamp_selection();
    }

    fn rows(&self, view: View) -> &[Todo] {
        let name = match view {
            View::Active => QUERY_TODOS,
            View::Deleted => QUERY_DELETED_TODOS,
        };
        self.cache.get(name).unwrap_or(&[])
    }

    fn selected_todo(&self) -> Option<&Todo> {
        self.rows(self.view).get(self.selected)
    }

    fn clamp_selection(&mut self) {
        let len = self.rows(self.view).len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        if self.prompt.is_some() {
            self.handle_prompt_key(code);
            return false;
        }
        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Tab => {
                self.view = match self.view {
                    View::Active => View::Deleted,
                    View::Deleted => View::Active,
                };
                self.selected = 0;
            }
            KeyCode::Up => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
            }
            KeyCode::Down => {
                let len = self.rows(self.view).len();
                if len > 0 && self.selected < len - 1 {
                    self.selected += 1;
                }
            }
            KeyCode::Char('a') => {
                if self.view == View::Active {
                    self.prompt = Some(Prompt::Add {
                        buffer: String::new(),
                    });
                }
            }
            KeyCode::Char('e') => {
                if self.view == View::Active {
                    if let Some((id, title)) =
                        self.selected_todo().map(|t| (t.id, t.title.clone()))
                    {
                        self.prompt = Some(Prompt::Edit { id, buffer: title });
                    }
                }
            }
            KeyCode::Char(' ') => self.toggle_completed(),
            KeyCode::Char('d') => self.delete_selected(),
            KeyCode::Char('r') => self.restore_selected(),
            _ => {}
        }
        false
    }

    fn handle_prompt_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Esc => self.prompt = None,
            KeyCode::Enter => self.commit_prompt(),
            KeyCode::Backspace => {
                if let Some(Prompt::Add { buffer } | Prompt::Edit { buffer, .. }) =
                    self.prompt.as_mut()
                {
                    buffer.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(Prompt::Add { buffer } | Prompt::Edit { buffer, .. }) =
                    self.prompt.as_mut()
                {
                    if buffer.chars().count() < TITLE_MAX_CHARS {
                        buffer.push(c);
                    }
                }
            }
            _ => {}
        }
    }

    fn commit_prompt(&mut self) {
        let Some(prompt) = self.prompt.take() else {
            return;
        };
        match prompt {
            Prompt::Add { buffer } => {
                let title = buffer.trim().to_string();
                if title.is_empty() {
                    return;
                }
                let input = CreateTodo { title };
                match self.client.build_create_todo(&input) {
                    Ok(request) => self.submit(Mutation::Create, request),
                    Err(err) => self.error = Some(format!("Failed to create todo: {err}")),
                }
            }
            Prompt::Edit { id, buffer } => {
                let title = buffer.trim().to_string();
                // An emptied title cancels the edit.
                if title.is_empty() {
                    return;
                }
                let input = UpdateTodo {
                    title: Some(title),
                    completed: None,
                };
                match self.client.build_update_todo(id, &input) {
                    Ok(request) => self.submit(Mutation::Update, request),
                    Err(err) => self.error = Some(format!("Failed to update todo: {err}")),
                }
            }
        }
    }

    fn toggle_completed(&mut self) {
        if self.view != View::Active {
            return;
        }
        let Some((id, completed)) = self.selected_todo().map(|t| (t.id, t.completed)) else {
            return;
        };
        let input = UpdateTodo {
            title: None,
            completed: Some(!completed),
        };
        match self.client.build_update_todo(id, &input) {
            Ok(request) => self.submit(Mutation::Update, request),
            Err(err) => self.error = Some(format!("Failed to update todo: {err}")),
        }
    }

    fn delete_selected(&mut self) {
        let Some(id) = self.selected_todo().map(|t| t.id) else {
            return;
        };
        let request = self.client.build_delete_todo(id);
        self.submit(Mutation::Delete, request);
    }

    fn restore_selected(&mut self) {
        if self.view != View::Deleted {
            return;
        }
        let Some(id) = self.selected_todo().map(|t| t.id) else {
            return;
        };
        let request = self.client.build_restore_todo(id);
        self.submit(Mutation::Restore, request);
    }

    /// Run a mutation end to end and invalidate the queries it staled.
    fn submit(&mut self, mutation: Mutation, request: HttpRequest) {
        let outcome = execute_request(&self.agent, request)
            .and_then(|response| self.client.parse_mutation(response).map_err(|e| e.to_string()));
        match outcome {
            Ok(_) => {
                self.cache.invalidate_after(mutation);
                self.error = None;
            }
            Err(message) => {
                self.error = Some(format!("{}: {message}", failure_headline(mutation)));
            }
        }
    }
}

fn failure_headline(mutation: Mutation) -> &'static str {
    match mutation {
        Mutation::Create => "Failed to create todo",
        Mutation::Update => "Failed to update todo",
        Mutation::Delete => "Failed to delete todo",
        Mutation::Restore => "Failed to restore todo",
    }
}

/// Execute an `HttpRequest` using ureq and return an `HttpResponse`.
///
/// The agent is built with status-as-error disabled, so 4xx/5xx come back
/// as data for the library to interpret; only transport failures land in
/// `Err`.
fn execute_request(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, String> {
    let mut response = match (req.method, req.body) {
        (HttpMethod::Get, _) => agent.get(&req.path).call(),
        (HttpMethod::Delete, _) => agent.delete(&req.path).call(),
        (HttpMethod::Post, Some(body)) => agent
            .post(&req.path)
            .content_type("application/json")
            .send(body.as_bytes()),
        (HttpMethod::Post, None) => agent.post(&req.path).send_empty(),
    }
    .map_err(|e| e.to_string())?;

    let status = response.status().as_u16();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    Ok(HttpResponse {
        status,
        headers: Vec::new(),
        body,
    })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let base_url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "http://127.0.0.1:8787".to_string());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&base_url);
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("{err:?}");
    }
    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    // One frame before the first fetch, so a slow server still shows
    // something.
    terminal.draw(|f| {
        let loading = Paragraph::new("Loading todos...")
            .block(Block::default().title("Todos").borders(Borders::ALL));
        f.render_widget(loading, f.area());
    })?;

    loop {
        app.refresh();
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if app.handle_key(key.code) {
                return Ok(());
            }
        }
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Min(3),
            Constraint::Length(3),
            Constraint::Length(3),
        ])
        .split(f.area());

    draw_list(f, app, chunks[0]);
    draw_stats(f, app, chunks[1]);
    draw_footer(f, app, chunks[2]);
}

fn draw_list(f: &mut Frame, app: &App, area: Rect) {
    let rows = app.rows(app.view);
    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, todo)| {
            let marker = if todo.completed { "[x]" } else { "[ ]" };
            let mut spans = vec![
                Span::raw(format!("{marker} ")),
                Span::styled(&todo.title, Style::default().fg(Color::White)),
                Span::styled(
                    format!("  ({})", todo.status),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if let Some(deleted_at) = &todo.deleted_at {
                let day = deleted_at.get(..10).unwrap_or(deleted_at);
                spans.push(Span::styled(
                    format!("  deleted {day}"),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            let item = ListItem::new(Line::from(spans));
            if i == app.selected {
                item.style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
            } else {
                item
            }
        })
        .collect();

    let title = match app.view {
        View::Active => "Todos",
        View::Deleted => "Deleted todos",
    };
    let list = List::new(items).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(list, area);
}

fn draw_stats(f: &mut Frame, app: &App, area: Rect) {
    let rows = app.rows(View::Active);
    let total = rows.len();
    let completed = rows.iter().filter(|t| t.completed).count();
    let open = total - completed;
    let rate = if total == 0 { 0 } else { completed * 100 / total };

    let line = Line::from(vec![
        Span::raw(format!("total {total}  ")),
        Span::styled(format!("done {completed}  "), Style::default().fg(Color::Green)),
        Span::raw(format!("open {open}  ")),
        Span::styled(format!("{rate}%"), Style::default().add_modifier(Modifier::BOLD)),
    ]);
    let stats = Paragraph::new(line).block(Block::default().title("Stats").borders(Borders::ALL));
    f.render_widget(stats, area);
}

fn draw_footer(f: &mut Frame, app: &App, area: Rect) {
    let (title, line) = if let Some(prompt) = &app.prompt {
        let (label, buffer) = match prompt {
            Prompt::Add { buffer } => ("New title", buffer),
            Prompt::Edit { buffer, .. } => ("Edit title", buffer),
        };
        (
            "Input",
            Line::from(vec![
                Span::raw(format!("{label}: ")),
                Span::styled(buffer.as_str(), Style::default().fg(Color::Yellow)),
                Span::raw("_"),
            ]),
        )
    } else if let Some(error) = &app.error {
        (
            "Error",
            Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))),
        )
    } else {
        (
            "Keys",
            Line::from(Span::raw(
                "a add  e edit  space toggle  d delete  r restore  tab view  q quit",
            )),
        )
    };
    let footer = Paragraph::new(line).block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(footer, area);
}
