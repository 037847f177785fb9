use std::collections::HashSet;

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeZone};
use color_eyre::Result;
use tokio::sync::mpsc;

use crate::components::month_view::days_in_month;
use crate::components::NoteFormState;
use crate::config::Config;
use crate::notes::{Note, NoteStore, ReminderFields};
use crate::reminder::{
    queries, EventChannel, ReminderEvent, ReminderScheduler, Subscription,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    Notes,
    Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Form,
    Search,
    Tag,
}

/// A reminder notification waiting on screen. Toasts don't expire; they
/// leave when viewed or dismissed.
pub struct Toast {
    pub event: ReminderEvent,
    #[allow(dead_code)]
    pub received_at: DateTime<Local>,
}

/// Application state: the note list, the selection, the calendar cursor and
/// the reminder plumbing. Owns the store and the scheduler; the in-memory
/// note list is mutated only here.
pub struct App {
    pub running: bool,
    pub view_mode: ViewMode,
    pub input_mode: InputMode,
    pub notes: Vec<Note>,
    pub selected: usize,
    pub search: String,
    pub tag_input: String,
    pub form: Option<NoteFormState>,
    pub toasts: Vec<Toast>,
    pub status_message: Option<String>,
    pub selected_date: NaiveDate,
    pub today: NaiveDate,
    pub show_help: bool,
    default_time: String,
    upcoming_days: i64,
    store: NoteStore,
    scheduler: ReminderScheduler,
    _subscription: Subscription,
}

impl App {
    /// Build the app: open the store, wire the event channel into an mpsc
    /// the main loop can select on, and run the first fetch-and-schedule
    /// pass. Must be called from within the tokio runtime.
    pub fn new(config: &Config) -> Result<(Self, mpsc::UnboundedReceiver<ReminderEvent>)> {
        let data_dir = config.data_dir();
        std::fs::create_dir_all(&data_dir)?;

        let store = NoteStore::open(&data_dir)?;
        let channel = EventChannel::new();
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = channel.subscribe(move |event: &ReminderEvent| {
            let _ = tx.send(event.clone());
        });
        let scheduler = ReminderScheduler::new(channel, &data_dir, config.missed_policy());

        let today = Local::now().date_naive();
        let mut app = Self {
            running: true,
            view_mode: ViewMode::Notes,
            input_mode: InputMode::Normal,
            notes: Vec::new(),
            selected: 0,
            search: String::new(),
            tag_input: String::new(),
            form: None,
            toasts: Vec::new(),
            status_message: None,
            selected_date: today,
            today,
            show_help: false,
            default_time: config.reminders.default_time.clone(),
            upcoming_days: config.reminders.upcoming_days,
            store,
            scheduler,
            _subscription: subscription,
        };

        app.refresh_notes();
        app.reschedule();
        Ok((app, rx))
    }

    pub fn refresh_notes(&mut self) {
        self.notes = self.store.fetch();
        self.clamp_selection();
    }

    /// One scheduling pass over the store's reminder snapshot.
    pub fn reschedule(&self) {
        let notes = self.store.fetch_notes_with_reminders();
        self.scheduler.schedule(&notes);
    }

    /// Periodic pass: refresh today, the note list and every timer, picking
    /// up reminders created or edited since the last pass.
    pub fn rescan(&mut self) {
        self.today = Local::now().date_naive();
        self.refresh_notes();
        self.reschedule();
    }

    // ── Note list ──

    /// Notes matching the search query, over title, content and tags.
    pub fn filtered(&self) -> Vec<&Note> {
        let query = self.search.to_lowercase();
        self.notes
            .iter()
            .filter(|note| {
                query.is_empty()
                    || note.title.to_lowercase().contains(&query)
                    || note.content.to_lowercase().contains(&query)
                    || note.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .collect()
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.filtered().get(self.selected).copied()
    }

    pub fn selected_note_armed(&self) -> bool {
        self.selected_note()
            .is_some_and(|n| self.scheduler.is_armed(&n.id))
    }

    pub fn select_next(&mut self) {
        let len = self.filtered().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    fn clamp_selection(&mut self) {
        let len = self.filtered().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// "N due today, M upcoming" header line for the notes view.
    pub fn reminder_summary(&self) -> String {
        let due = queries::notes_due_today(&self.notes).len();
        let upcoming = queries::notes_with_upcoming_reminders(&self.notes, self.upcoming_days).len();
        format!("{} due today, {} upcoming", due, upcoming)
    }

    // ── CRUD ──

    pub fn create_note(&mut self) {
        match self.store.create("Untitled Note") {
            Ok(note) => {
                self.search.clear();
                self.refresh_notes();
                self.selected = self
                    .notes
                    .iter()
                    .position(|n| n.id == note.id)
                    .unwrap_or(0);
                self.open_form();
            }
            Err(err) => self.report("failed to create note", err),
        }
    }

    pub fn delete_selected(&mut self) {
        let Some(note) = self.selected_note().cloned() else {
            return;
        };
        // The note's timer goes with it; no full reschedule needed.
        self.scheduler.cancel_one(&note.id);
        match self.store.delete(&note.id) {
            Ok(()) => {
                self.refresh_notes();
                self.status_message = Some(format!("Deleted \"{}\"", note.title));
            }
            Err(err) => self.report("failed to delete note", err),
        }
    }

    pub fn add_tag(&mut self) {
        let tag = self.tag_input.trim().to_string();
        self.tag_input.clear();
        self.input_mode = InputMode::Normal;
        if tag.is_empty() {
            return;
        }
        let Some(note) = self.selected_note() else {
            return;
        };
        if note.tags.contains(&tag) {
            return;
        }
        let mut note = note.clone();
        note.tags.push(tag);
        match self.store.update(&note) {
            Ok(_) => self.refresh_notes(),
            Err(err) => self.report("failed to save tags", err),
        }
    }

    // ── Settings form ──

    pub fn open_form(&mut self) {
        if let Some(note) = self.selected_note() {
            self.form = Some(NoteFormState::for_note(note, &self.default_time));
            self.input_mode = InputMode::Form;
        }
    }

    pub fn close_form(&mut self) {
        self.form = None;
        self.input_mode = InputMode::Normal;
    }

    /// Persist the form: title via the plain update path, reminder fields
    /// via the metadata path, then a fresh scheduling pass.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };
        if !form.is_valid() {
            self.status_message = Some("Dates are YYYY-MM-DD, time is HH:MM".to_string());
            return;
        }

        if let Some(mut note) = self.store.get(&form.note_id) {
            let title = form.title.trim().to_string();
            if title != note.title {
                note.title = title;
                if let Err(err) = self.store.update(&note) {
                    self.report("failed to save title", err);
                    return;
                }
            }
        }

        let fields = ReminderFields {
            due_date: form.parsed_due_date().and_then(local_midnight),
            reminder_date: form.parsed_reminder_date().and_then(local_midnight),
            reminder_time: form
                .parsed_reminder_date()
                .map(|_| form.reminder_time.trim().to_string()),
        };

        match self.store.persist_reminder_fields(&form.note_id, fields) {
            Ok(_) => {
                self.close_form();
                self.refresh_notes();
                // Reminder data changed, so every timer is rebuilt.
                self.reschedule();
            }
            Err(err) => self.report("failed to save reminder", err),
        }
    }

    // ── Reminder toasts ──

    pub fn on_reminder(&mut self, event: ReminderEvent) {
        self.toasts.push(Toast {
            event,
            received_at: Local::now(),
        });
    }

    /// View Note on the newest toast: select the note in the loaded list,
    /// or re-resolve it from the store via the event id (the TUI analog of
    /// following the event's url), and open it for editing.
    pub fn view_top_toast(&mut self) {
        let Some(toast) = self.toasts.pop() else {
            return;
        };
        let id = toast.event.id;
        self.view_mode = ViewMode::Notes;
        self.search.clear();

        if !self.notes.iter().any(|n| n.id == id) {
            if self.store.get(&id).is_none() {
                self.status_message =
                    Some("The note for this reminder no longer exists".to_string());
                return;
            }
            self.refresh_notes();
        }

        if let Some(pos) = self.notes.iter().position(|n| n.id == id) {
            self.selected = pos;
            self.open_form();
        }
    }

    pub fn dismiss_top_toast(&mut self) {
        self.toasts.pop();
    }

    // ── Calendar ──

    pub fn days_with_due(&self) -> HashSet<u32> {
        self.days_matching(|n| n.due_date)
    }

    pub fn days_with_reminders(&self) -> HashSet<u32> {
        self.days_matching(|n| n.reminder_date)
    }

    fn days_matching(
        &self,
        field: impl Fn(&Note) -> Option<DateTime<Local>>,
    ) -> HashSet<u32> {
        let year = self.selected_date.year();
        let month = self.selected_date.month();
        self.notes
            .iter()
            .filter_map(|n| field(n))
            .map(|d| d.date_naive())
            .filter(|d| d.year() == year && d.month() == month)
            .map(|d| d.day())
            .collect()
    }

    pub fn due_on_selected(&self) -> Vec<Note> {
        queries::notes_due_on(self.selected_date, &self.notes)
    }

    pub fn reminding_on_selected(&self) -> Vec<Note> {
        queries::notes_with_reminder_on(self.selected_date, &self.notes)
    }

    pub fn next_day(&mut self) {
        self.selected_date = self.selected_date.succ_opt().unwrap_or(self.selected_date);
    }

    pub fn prev_day(&mut self) {
        self.selected_date = self.selected_date.pred_opt().unwrap_or(self.selected_date);
    }

    pub fn next_week(&mut self) {
        self.selected_date += chrono::Duration::weeks(1);
    }

    pub fn prev_week(&mut self) {
        self.selected_date -= chrono::Duration::weeks(1);
    }

    pub fn next_month(&mut self) {
        let month = self.selected_date.month();
        let year = self.selected_date.year();
        let (new_year, new_month) = if month == 12 {
            (year + 1, 1)
        } else {
            (year, month + 1)
        };
        self.jump_to_month(new_year, new_month);
    }

    pub fn prev_month(&mut self) {
        let month = self.selected_date.month();
        let year = self.selected_date.year();
        let (new_year, new_month) = if month == 1 {
            (year - 1, 12)
        } else {
            (year, month - 1)
        };
        self.jump_to_month(new_year, new_month);
    }

    fn jump_to_month(&mut self, year: i32, month: u32) {
        let day = self.selected_date.day().min(days_in_month(year, month));
        if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
            self.selected_date = date;
        }
    }

    pub fn go_to_today(&mut self) {
        self.today = Local::now().date_naive();
        self.selected_date = self.today;
    }

    fn report(&mut self, what: &str, err: color_eyre::eyre::Report) {
        tracing::error!(%err, "{what}");
        self.status_message = Some(format!("{what}: {err}"));
    }
}

fn local_midnight(date: NaiveDate) -> Option<DateTime<Local>> {
    date.and_hms_opt(0, 0, 0)
        .and_then(|dt| Local.from_local_datetime(&dt).earliest())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_app() -> (tempfile::TempDir, App, mpsc::UnboundedReceiver<ReminderEvent>) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        };
        let (app, rx) = App::new(&config).unwrap();
        (dir, app, rx)
    }

    #[tokio::test]
    async fn create_select_and_tag() {
        let (_dir, mut app, _rx) = test_app();
        app.create_note();
        assert_eq!(app.notes.len(), 1);
        assert_eq!(app.input_mode, InputMode::Form);
        app.close_form();

        app.tag_input = "work".to_string();
        app.add_tag();
        assert_eq!(app.notes[0].tags, vec!["work"]);

        // Duplicate tags are ignored.
        app.tag_input = "work".to_string();
        app.add_tag();
        assert_eq!(app.notes[0].tags.len(), 1);
    }

    #[tokio::test]
    async fn search_filters_by_title_and_tag() {
        let (_dir, mut app, _rx) = test_app();
        app.create_note();
        app.close_form();
        app.tag_input = "shopping".to_string();
        app.add_tag();

        app.search = "shopping".to_string();
        assert_eq!(app.filtered().len(), 1);
        app.search = "nothing-matches".to_string();
        assert!(app.filtered().is_empty());
    }

    #[tokio::test]
    async fn saving_a_future_reminder_arms_a_timer() {
        let (_dir, mut app, _rx) = test_app();
        app.create_note();

        let when = Local::now() + chrono::Duration::days(1);
        let form = app.form.as_mut().unwrap();
        form.title = "dentist".to_string();
        form.reminder_date = when.format("%Y-%m-%d").to_string();
        form.reminder_time = "09:00".to_string();
        app.submit_form();

        assert!(app.form.is_none());
        assert_eq!(app.notes[0].title, "dentist");
        assert!(app.notes[0].reminder_date.is_some());
        assert!(app.selected_note_armed());

        // Deleting the note cancels its timer.
        app.delete_selected();
        assert!(app.notes.is_empty());
    }

    #[tokio::test]
    async fn toast_view_selects_the_note() {
        let (_dir, mut app, _rx) = test_app();
        app.create_note();
        app.close_form();
        let id = app.notes[0].id.clone();

        app.on_reminder(ReminderEvent {
            id: id.clone(),
            title: "Untitled Note".to_string(),
            content: String::new(),
            url: format!("/dashboard?note={id}"),
        });
        assert_eq!(app.toasts.len(), 1);

        app.view_top_toast();
        assert!(app.toasts.is_empty());
        assert_eq!(app.selected_note().unwrap().id, id);
        assert_eq!(app.input_mode, InputMode::Form);
    }

    #[tokio::test]
    async fn toast_for_missing_note_reports_instead_of_panicking() {
        let (_dir, mut app, _rx) = test_app();
        app.on_reminder(ReminderEvent {
            id: "gone".to_string(),
            title: "Reminder".to_string(),
            content: String::new(),
            url: "/dashboard?note=gone".to_string(),
        });
        app.view_top_toast();
        assert!(app.status_message.is_some());
    }
}
