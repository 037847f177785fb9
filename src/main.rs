mod app;
mod components;
mod config;
mod event;
mod notes;
mod reminder;
mod theme;
mod tui;

use std::time::Duration;

use app::{App, InputMode, ViewMode};
use color_eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::layout::{Constraint, Layout, Rect};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::reminder::ReminderEvent;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let config = Config::load();
    let data_dir = config.data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let _log_guard = init_logging(&data_dir);
    theme::init(config.theme.clone());

    let (mut app, mut reminders) = App::new(&config)?;

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let mut terminal = tui::init()?;
    let result = run(&mut terminal, &mut app, &mut reminders, &config).await;
    tui::restore()?;
    result
}

/// File-based logging; the terminal belongs to the TUI.
fn init_logging(data_dir: &std::path::Path) -> tracing_appender::non_blocking::WorkerGuard {
    let appender = tracing_appender::rolling::never(data_dir, "notes-tui.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(writer)
        .with_ansi(false)
        .init();
    guard
}

async fn run(
    terminal: &mut tui::Tui,
    app: &mut App,
    reminders: &mut mpsc::UnboundedReceiver<ReminderEvent>,
    config: &Config,
) -> Result<()> {
    let mut keys = event::spawn_input_thread();
    let mut rescan = tokio::time::interval(Duration::from_secs(
        config.reminders.rescan_minutes.max(1) * 60,
    ));
    rescan.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    rescan.tick().await; // the first tick completes immediately

    while app.running {
        terminal.draw(|frame| render(frame, app))?;

        tokio::select! {
            Some(key) = keys.recv() => handle_key(app, key),
            Some(reminder) = reminders.recv() => app.on_reminder(reminder),
            _ = rescan.tick() => app.rescan(),
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Clear status message on any key
    app.status_message = None;

    // Help overlay takes priority
    if app.show_help {
        if key.code == KeyCode::Esc || key.code == KeyCode::Char('?') {
            app.show_help = false;
        }
        return;
    }

    match app.input_mode {
        InputMode::Form => handle_form_input(app, key.code, key.modifiers),
        InputMode::Search => handle_search_input(app, key.code),
        InputMode::Tag => handle_tag_input(app, key.code),
        InputMode::Normal => handle_normal_input(app, key.code, key.modifiers),
    }
}

fn handle_normal_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
        }
        (KeyCode::Char('1'), _) => app.view_mode = ViewMode::Notes,
        (KeyCode::Char('2'), _) => app.view_mode = ViewMode::Calendar,
        (KeyCode::Char('?'), _) => app.show_help = true,
        (KeyCode::Char('v'), _) => app.view_top_toast(),
        (KeyCode::Char('x'), _) => app.dismiss_top_toast(),
        (KeyCode::Char('u'), _) => {
            app.rescan();
            app.status_message = Some("Notes and reminders refreshed".to_string());
        }
        _ => match app.view_mode {
            ViewMode::Notes => handle_notes_input(app, code),
            ViewMode::Calendar => handle_calendar_input(app, code),
        },
    }
}

fn handle_notes_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Down | KeyCode::Char('j') => app.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.select_prev(),
        KeyCode::Char('n') => app.create_note(),
        KeyCode::Char('d') => app.delete_selected(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_form(),
        KeyCode::Char('t') => {
            if app.selected_note().is_some() {
                app.tag_input.clear();
                app.input_mode = InputMode::Tag;
            }
        }
        KeyCode::Char('/') => {
            app.input_mode = InputMode::Search;
        }
        KeyCode::Esc => {
            app.search.clear();
        }
        _ => {}
    }
}

fn handle_calendar_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Left | KeyCode::Char('h') => app.prev_day(),
        KeyCode::Right | KeyCode::Char('l') => app.next_day(),
        KeyCode::Up | KeyCode::Char('k') => app.prev_week(),
        KeyCode::Down | KeyCode::Char('j') => app.next_week(),
        KeyCode::Char('[') => app.prev_month(),
        KeyCode::Char(']') => app.next_month(),
        KeyCode::Char('g') => app.go_to_today(),
        _ => {}
    }
}

fn handle_form_input(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    match (code, modifiers) {
        (KeyCode::Char('x'), KeyModifiers::CONTROL) => {
            if let Some(ref mut form) = app.form {
                form.clear_dates();
            }
        }
        (KeyCode::Esc, _) => app.close_form(),
        (KeyCode::Enter, _) => app.submit_form(),
        (KeyCode::Tab, _) => {
            if let Some(ref mut form) = app.form {
                form.active_field = form.active_field.next();
            }
        }
        (KeyCode::BackTab, _) => {
            if let Some(ref mut form) = app.form {
                form.active_field = form.active_field.prev();
            }
        }
        (KeyCode::Backspace, _) => {
            if let Some(ref mut form) = app.form {
                form.backspace();
            }
        }
        (KeyCode::Char(c), _) => {
            if let Some(ref mut form) = app.form {
                form.input_char(c);
            }
        }
        _ => {}
    }
}

fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.search.clear();
            app.selected = 0;
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            app.search.pop();
            app.selected = 0;
        }
        KeyCode::Char(c) => {
            app.search.push(c);
            app.selected = 0;
        }
        _ => {}
    }
}

fn handle_tag_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.tag_input.clear();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => app.add_tag(),
        KeyCode::Backspace => {
            app.tag_input.pop();
        }
        KeyCode::Char(c) => app.tag_input.push(c),
        _ => {}
    }
}

fn render(frame: &mut ratatui::Frame, app: &App) {
    let area = frame.area();

    // Main layout: content + status bar
    let layout = Layout::vertical([
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .split(area);

    let content_area = layout[0];

    match app.view_mode {
        ViewMode::Notes => render_notes_layout(frame, content_area, app),
        ViewMode::Calendar => render_calendar_layout(frame, content_area, app),
    }

    // Render form overlay
    if let Some(ref form) = app.form {
        components::NoteForm::render(frame, area, form);
    }

    // Render help overlay
    if app.show_help {
        render_help(frame, area);
    }

    // Status bar
    components::StatusBar::render(frame, layout[1], app);

    // Reminder toasts sit above everything else
    components::ToastStack::render(frame, content_area, &app.toasts);
}

fn render_notes_layout(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    use ratatui::text::{Line, Span};
    use ratatui::widgets::Paragraph;

    let rows = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(1),
    ])
    .split(area);

    let header = Line::from(vec![
        Span::styled(" Notes ", theme::current().header),
        Span::styled(app.reminder_summary(), theme::current().dim),
    ]);
    frame.render_widget(Paragraph::new(header), rows[0]);

    let filtered = app.filtered();
    let in_list = app.input_mode != InputMode::Form;

    if area.width < 60 {
        components::NoteList::render(frame, rows[1], &filtered, app.selected, in_list, &app.search);
    } else {
        let list_w = if area.width >= 110 { 44 } else { 34 };
        let content = Layout::horizontal([
            Constraint::Length(list_w),
            Constraint::Min(20),
        ])
        .split(rows[1]);

        components::NoteList::render(frame, content[0], &filtered, app.selected, in_list, &app.search);
        components::NoteView::render(
            frame,
            content[1],
            app.selected_note(),
            app.selected_note_armed(),
        );
    }
}

fn render_calendar_layout(frame: &mut ratatui::Frame, area: Rect, app: &App) {
    let days_with_due = app.days_with_due();
    let days_with_reminders = app.days_with_reminders();

    if area.width < 60 {
        components::MonthView::render(
            frame,
            area,
            app.selected_date,
            app.today,
            &days_with_due,
            &days_with_reminders,
        );
    } else {
        let month_w = if area.width >= 100 { 44 } else { 30 };
        let content = Layout::horizontal([
            Constraint::Length(month_w),
            Constraint::Min(20),
        ])
        .split(area);

        components::MonthView::render(
            frame,
            content[0],
            app.selected_date,
            app.today,
            &days_with_due,
            &days_with_reminders,
        );

        components::DayView::render(
            frame,
            content[1],
            app.selected_date,
            &app.due_on_selected(),
            &app.reminding_on_selected(),
        );
    }
}

fn render_help(frame: &mut ratatui::Frame, area: Rect) {
    use ratatui::style::{Modifier, Style};
    use ratatui::text::{Line, Span};
    use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

    let popup_w = area.width.min(52).max(30);
    let popup_h = area.height.min(24).max(12);
    let x = area.x + (area.width.saturating_sub(popup_w)) / 2;
    let y = area.y + (area.height.saturating_sub(popup_h)) / 2;
    let popup_area = Rect::new(x, y, popup_w, popup_h);

    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(" Keybindings ")
        .title_style(theme::current().header)
        .borders(Borders::ALL)
        .border_style(theme::current().border);

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    let key_style = Style::default().add_modifier(Modifier::BOLD);
    let desc_style = Style::default();
    let section_style = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);

    let lines = vec![
        Line::from(Span::styled("Views", section_style)),
        Line::from(vec![
            Span::styled("  1/2       ", key_style),
            Span::styled("Notes / Calendar", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Notes", section_style)),
        Line::from(vec![
            Span::styled("  j/k       ", key_style),
            Span::styled("Select note", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  n         ", key_style),
            Span::styled("New note", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  e/Enter   ", key_style),
            Span::styled("Edit title, due date and reminder", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  t         ", key_style),
            Span::styled("Add a tag", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  d         ", key_style),
            Span::styled("Delete note", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  /         ", key_style),
            Span::styled("Search title, content and tags", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Reminders", section_style)),
        Line::from(vec![
            Span::styled("  v         ", key_style),
            Span::styled("View the note behind the newest toast", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  x         ", key_style),
            Span::styled("Dismiss the newest toast", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  u         ", key_style),
            Span::styled("Refresh notes and reschedule now", desc_style),
        ]),
        Line::from(""),
        Line::from(Span::styled("Calendar", section_style)),
        Line::from(vec![
            Span::styled("  h/l j/k   ", key_style),
            Span::styled("Move by day / week", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  [/]       ", key_style),
            Span::styled("Previous/next month", desc_style),
        ]),
        Line::from(vec![
            Span::styled("  g         ", key_style),
            Span::styled("Jump to today", desc_style),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("  q", key_style),
            Span::styled(" / ", theme::current().dim),
            Span::styled("Esc     ", key_style),
            Span::styled("Quit / close popup", desc_style),
        ]),
    ];

    let para = Paragraph::new(lines).wrap(Wrap { trim: false });
    frame.render_widget(para, inner);
}
