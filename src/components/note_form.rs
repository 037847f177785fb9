use chrono::{NaiveDate, NaiveTime};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::notes::Note;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Title,
    DueDate,
    ReminderDate,
    ReminderTime,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Title => FormField::DueDate,
            FormField::DueDate => FormField::ReminderDate,
            FormField::ReminderDate => FormField::ReminderTime,
            FormField::ReminderTime => FormField::Title,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            FormField::Title => FormField::ReminderTime,
            FormField::DueDate => FormField::Title,
            FormField::ReminderDate => FormField::DueDate,
            FormField::ReminderTime => FormField::ReminderDate,
        }
    }
}

/// Edit state for a note's title and reminder fields. Dates are kept as raw
/// text while editing; empty means "not set".
#[derive(Debug, Clone)]
pub struct NoteFormState {
    pub note_id: String,
    pub title: String,
    pub due_date: String,
    pub reminder_date: String,
    pub reminder_time: String,
    pub active_field: FormField,
    default_time: String,
}

impl NoteFormState {
    pub fn for_note(note: &Note, default_time: &str) -> Self {
        Self {
            note_id: note.id.clone(),
            title: note.title.clone(),
            due_date: note
                .due_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            reminder_date: note
                .reminder_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            reminder_time: note
                .reminder_time
                .clone()
                .unwrap_or_else(|| default_time.to_string()),
            active_field: FormField::Title,
            default_time: default_time.to_string(),
        }
    }

    pub fn parsed_due_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d").ok()
    }

    pub fn parsed_reminder_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.reminder_date.trim(), "%Y-%m-%d").ok()
    }

    pub fn parsed_reminder_time(&self) -> Option<NaiveTime> {
        NaiveTime::parse_from_str(self.reminder_time.trim(), "%H:%M").ok()
    }

    pub fn input_char(&mut self, c: char) {
        match self.active_field {
            FormField::Title => self.title.push(c),
            FormField::DueDate => self.due_date.push(c),
            FormField::ReminderDate => self.reminder_date.push(c),
            FormField::ReminderTime => self.reminder_time.push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.active_field {
            FormField::Title => {
                self.title.pop();
            }
            FormField::DueDate => {
                self.due_date.pop();
            }
            FormField::ReminderDate => {
                self.reminder_date.pop();
            }
            FormField::ReminderTime => {
                self.reminder_time.pop();
            }
        }
    }

    /// The form's Clear All: drop both dates, reset the time.
    pub fn clear_dates(&mut self) {
        self.due_date.clear();
        self.reminder_date.clear();
        self.reminder_time = self.default_time.clone();
    }

    pub fn is_valid(&self) -> bool {
        if self.title.trim().is_empty() {
            return false;
        }
        if !self.due_date.trim().is_empty() && self.parsed_due_date().is_none() {
            return false;
        }
        if !self.reminder_date.trim().is_empty() {
            if self.parsed_reminder_date().is_none() {
                return false;
            }
            // A reminder needs a parsable fire time.
            if self.parsed_reminder_time().is_none() {
                return false;
            }
        }
        true
    }
}

pub struct NoteForm;

impl NoteForm {
    pub fn render(frame: &mut Frame, area: Rect, state: &NoteFormState) {
        // Center the form popup
        let form_w = area.width.min(52).max(32);
        let form_h = area.height.min(12).max(9);
        let x = area.x + (area.width.saturating_sub(form_w)) / 2;
        let y = area.y + (area.height.saturating_sub(form_h)) / 2;
        let form_area = Rect::new(x, y, form_w, form_h);

        frame.render_widget(Clear, form_area);

        let block = Block::default()
            .title(" Note Settings ")
            .title_style(theme::current().header)
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        let inner = block.inner(form_area);
        frame.render_widget(block, form_area);

        let rows = Layout::vertical([
            Constraint::Length(1), // title
            Constraint::Length(1), // due date
            Constraint::Length(1), // reminder date
            Constraint::Length(1), // reminder time
            Constraint::Length(1), // validity note
            Constraint::Length(1), // spacer
            Constraint::Length(1), // help
            Constraint::Min(0),
        ])
        .split(inner);

        render_field(frame, rows[0], "Title:", &state.title, state.active_field == FormField::Title);
        render_field(frame, rows[1], "Due:", &state.due_date, state.active_field == FormField::DueDate);
        render_field(
            frame,
            rows[2],
            "Remind:",
            &state.reminder_date,
            state.active_field == FormField::ReminderDate,
        );
        render_field(
            frame,
            rows[3],
            "At:",
            &state.reminder_time,
            state.active_field == FormField::ReminderTime,
        );

        if !state.is_valid() {
            let hint = Paragraph::new("dates are YYYY-MM-DD, time is HH:MM")
                .style(theme::current().dim);
            frame.render_widget(hint, rows[4]);
        }

        let help = Line::from(vec![
            Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Next ", theme::current().dim),
            Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Save ", theme::current().dim),
            Span::styled("^X", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Clear dates ", theme::current().dim),
            Span::styled("Esc", Style::default().add_modifier(Modifier::BOLD)),
            Span::styled(":Cancel", theme::current().dim),
        ]);
        frame.render_widget(Paragraph::new(help), rows[6]);
    }
}

fn render_field(frame: &mut Frame, area: Rect, label: &str, value: &str, active: bool) {
    let cursor = if active { "_" } else { "" };

    let style = if active {
        theme::current().tag
    } else {
        Style::default()
    };

    let spans = vec![
        Span::styled(format!("{:<8}", label), theme::current().dim),
        Span::styled(format!("{}{}", value, cursor), style),
    ];

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_form() -> NoteFormState {
        NoteFormState::for_note(&Note::new("errands"), "09:00")
    }

    #[test]
    fn prefills_from_note() {
        let form = blank_form();
        assert_eq!(form.title, "errands");
        assert!(form.due_date.is_empty());
        assert_eq!(form.reminder_time, "09:00");
        assert!(form.is_valid());
    }

    #[test]
    fn validates_dates_and_time() {
        let mut form = blank_form();
        form.reminder_date = "2024-06-01".to_string();
        assert!(form.is_valid());

        form.reminder_time = "9am".to_string();
        assert!(!form.is_valid());

        form.reminder_time = "14:30".to_string();
        form.due_date = "junk".to_string();
        assert!(!form.is_valid());
    }

    #[test]
    fn clear_dates_resets_reminder_fields() {
        let mut form = blank_form();
        form.due_date = "2024-06-01".to_string();
        form.reminder_date = "2024-06-01".to_string();
        form.reminder_time = "14:30".to_string();

        form.clear_dates();
        assert!(form.due_date.is_empty());
        assert!(form.reminder_date.is_empty());
        assert_eq!(form.reminder_time, "09:00");
    }

    #[test]
    fn field_cycle_wraps() {
        let mut field = FormField::Title;
        for _ in 0..4 {
            field = field.next();
        }
        assert_eq!(field, FormField::Title);
        assert_eq!(FormField::Title.prev(), FormField::ReminderTime);
    }
}
