use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Time of day a reminder fires when the note doesn't carry one.
pub const DEFAULT_REMINDER_TIME: &str = "09:00";

/// Reminder fields stored under the nested `metadata` key.
///
/// The original backing table had no first-class reminder columns, so the
/// fields were tucked into a metadata object. Notes may arrive with either
/// shape; [`Note::canonical`] folds this one away.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteMetadata {
    #[serde(rename = "dueDate", default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Local>>,
    #[serde(rename = "reminderDate", default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<DateTime<Local>>,
    #[serde(rename = "reminderTime", default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub title: String,
    /// Rich-text markup. Display-only: the list and toast excerpts strip it.
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Local>,
    #[serde(rename = "dueDate", default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Local>>,
    #[serde(rename = "reminderDate", default, skip_serializing_if = "Option::is_none")]
    pub reminder_date: Option<DateTime<Local>>,
    #[serde(rename = "reminderTime", default, skip_serializing_if = "Option::is_none")]
    pub reminder_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<NoteMetadata>,
}

impl Note {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            content: String::new(),
            tags: Vec::new(),
            created_at: Local::now(),
            due_date: None,
            reminder_date: None,
            reminder_time: None,
            metadata: None,
        }
    }

    /// Fold the nested metadata shape into the direct fields.
    ///
    /// Direct fields win when both are set. The store applies this on every
    /// fetch; the scheduler applies it again on its input so it accepts both
    /// shapes regardless of where the notes came from.
    pub fn canonical(mut self) -> Self {
        if let Some(meta) = self.metadata.take() {
            if self.due_date.is_none() {
                self.due_date = meta.due_date;
            }
            if self.reminder_date.is_none() {
                self.reminder_date = meta.reminder_date;
            }
            if self.reminder_time.is_none() {
                self.reminder_time = meta.reminder_time;
            }
        }
        self
    }

    /// True when the note carries any reminder data, in either shape.
    pub fn has_reminder_data(&self) -> bool {
        let meta = self.metadata.as_ref();
        self.due_date.is_some()
            || self.reminder_date.is_some()
            || meta.is_some_and(|m| m.due_date.is_some() || m.reminder_date.is_some())
    }

    /// `HH:MM` reminder time, falling back to [`DEFAULT_REMINDER_TIME`].
    pub fn reminder_time_or_default(&self) -> &str {
        self.reminder_time.as_deref().unwrap_or(DEFAULT_REMINDER_TIME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(y: i32, m: u32, d: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn canonical_lifts_metadata_fields() {
        let mut note = Note::new("meeting");
        note.metadata = Some(NoteMetadata {
            due_date: Some(ts(2024, 6, 1)),
            reminder_date: Some(ts(2024, 5, 31)),
            reminder_time: Some("14:30".to_string()),
        });

        let note = note.canonical();
        assert_eq!(note.due_date, Some(ts(2024, 6, 1)));
        assert_eq!(note.reminder_date, Some(ts(2024, 5, 31)));
        assert_eq!(note.reminder_time.as_deref(), Some("14:30"));
        assert!(note.metadata.is_none());
    }

    #[test]
    fn canonical_prefers_direct_fields() {
        let mut note = Note::new("meeting");
        note.reminder_date = Some(ts(2024, 7, 1));
        note.metadata = Some(NoteMetadata {
            reminder_date: Some(ts(2024, 5, 31)),
            ..Default::default()
        });

        let note = note.canonical();
        assert_eq!(note.reminder_date, Some(ts(2024, 7, 1)));
    }

    #[test]
    fn canonical_without_metadata_is_identity() {
        let mut note = Note::new("plain");
        note.due_date = Some(ts(2024, 6, 1));
        let before = note.clone();
        assert_eq!(note.canonical(), before);
    }

    #[test]
    fn has_reminder_data_checks_both_shapes() {
        let mut direct = Note::new("a");
        direct.due_date = Some(ts(2024, 6, 1));
        assert!(direct.has_reminder_data());

        let mut nested = Note::new("b");
        nested.metadata = Some(NoteMetadata {
            reminder_date: Some(ts(2024, 6, 1)),
            ..Default::default()
        });
        assert!(nested.has_reminder_data());

        assert!(!Note::new("c").has_reminder_data());
    }

    #[test]
    fn parses_nested_metadata_shape() {
        let json = r#"{
            "id": "n1",
            "title": "groceries",
            "content": "<p>milk</p>",
            "tags": ["home"],
            "created_at": "2024-05-01T10:00:00Z",
            "metadata": {
                "reminderDate": "2024-06-01T00:00:00Z",
                "reminderTime": "09:00"
            }
        }"#;

        let note: Note = serde_json::from_str(json).unwrap();
        assert!(note.reminder_date.is_none());
        let note = note.canonical();
        assert!(note.reminder_date.is_some());
        assert_eq!(note.reminder_time.as_deref(), Some("09:00"));
    }

    #[test]
    fn reminder_time_default() {
        let note = Note::new("a");
        assert_eq!(note.reminder_time_or_default(), "09:00");
    }
}
