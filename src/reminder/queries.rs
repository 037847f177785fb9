use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::notes::Note;

/// Default look-ahead window for [`notes_with_upcoming_reminders`].
pub const DEFAULT_UPCOMING_DAYS: i64 = 7;

/// Notes whose due date falls on the given calendar day.
///
/// Comparison is by local calendar date only; the time-of-day component of
/// the stored timestamp is ignored. Expects canonicalized notes.
pub fn notes_due_on(date: NaiveDate, notes: &[Note]) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| {
            note.due_date
                .is_some_and(|due| due.with_timezone(&Local).date_naive() == date)
        })
        .cloned()
        .collect()
}

/// Notes due today.
pub fn notes_due_today(notes: &[Note]) -> Vec<Note> {
    notes_due_on(Local::now().date_naive(), notes)
}

/// Notes whose reminder date falls within `[now, now + days_ahead]`,
/// by direct timestamp comparison, both bounds inclusive.
pub fn notes_with_upcoming_reminders(notes: &[Note], days_ahead: i64) -> Vec<Note> {
    let now = Local::now();
    let until = now + Duration::days(days_ahead);
    notes
        .iter()
        .filter(|note| {
            note.reminder_date
                .is_some_and(|when| when >= now && when <= until)
        })
        .cloned()
        .collect()
}

/// Notes with a reminder on the given calendar day (for the calendar pane).
pub fn notes_with_reminder_on(date: NaiveDate, notes: &[Note]) -> Vec<Note> {
    notes
        .iter()
        .filter(|note| reminder_day(note) == Some(date))
        .cloned()
        .collect()
}

fn reminder_day(note: &Note) -> Option<NaiveDate> {
    note.reminder_date
        .map(|when: DateTime<Local>| when.with_timezone(&Local).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn note_due(title: &str, due: DateTime<Local>) -> Note {
        let mut note = Note::new(title);
        note.due_date = Some(due);
        note
    }

    fn note_reminding(title: &str, when: DateTime<Local>) -> Note {
        let mut note = Note::new(title);
        note.reminder_date = Some(when);
        note
    }

    #[test]
    fn due_on_matches_calendar_day_only() {
        let midnight = Local.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let evening = Local.with_ymd_and_hms(2024, 6, 1, 22, 15, 0).unwrap();
        let notes = vec![
            note_due("midnight", midnight),
            note_due("evening", evening),
            Note::new("no due date"),
        ];

        let day = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let due = notes_due_on(day, &notes);
        assert_eq!(due.len(), 2);

        let next_day = NaiveDate::from_ymd_opt(2024, 6, 2).unwrap();
        assert!(notes_due_on(next_day, &notes).is_empty());
    }

    #[test]
    fn upcoming_window_is_inclusive() {
        let now = Local::now();
        let notes = vec![
            note_reminding("in three days", now + Duration::days(3)),
            note_reminding("in eight days", now + Duration::days(8)),
            note_reminding("an hour ago", now - Duration::hours(1)),
            Note::new("no reminder"),
        ];

        let upcoming = notes_with_upcoming_reminders(&notes, DEFAULT_UPCOMING_DAYS);
        assert_eq!(upcoming.len(), 1);
        assert_eq!(upcoming[0].title, "in three days");
    }

    #[test]
    fn upcoming_with_wider_window() {
        let now = Local::now();
        let notes = vec![note_reminding("in eight days", now + Duration::days(8))];
        assert_eq!(notes_with_upcoming_reminders(&notes, 10).len(), 1);
    }

    #[test]
    fn reminder_on_day() {
        let when = Local.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        let notes = vec![note_reminding("standup", when)];
        let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(notes_with_reminder_on(day, &notes).len(), 1);
        let other = NaiveDate::from_ymd_opt(2024, 6, 4).unwrap();
        assert!(notes_with_reminder_on(other, &notes).is_empty());
    }
}
