use std::fs;
use std::path::{Path, PathBuf};

use color_eyre::eyre::{eyre, Result};

use super::note::{Note, NoteMetadata};

const NOTES_FILE: &str = "notes.json";

/// Reminder fields as written by the settings form.
#[derive(Debug, Clone, Default)]
pub struct ReminderFields {
    pub due_date: Option<chrono::DateTime<chrono::Local>>,
    pub reminder_date: Option<chrono::DateTime<chrono::Local>>,
    pub reminder_time: Option<String>,
}

/// JSON-file-backed note store.
///
/// Stands in for the original hosted table storage: same operation surface,
/// one file per user on disk. Reminder fields are persisted under the nested
/// `metadata` key (the backing schema has no first-class columns for them);
/// every fetch returns canonicalized notes so callers see one shape.
pub struct NoteStore {
    path: PathBuf,
    notes: Vec<Note>,
}

impl NoteStore {
    pub fn open(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(NOTES_FILE);
        let notes = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(notes) => notes,
                Err(err) => {
                    tracing::warn!(path = %path.display(), %err, "notes file unreadable, starting empty");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Ok(Self { path, notes })
    }

    /// All notes, newest first, canonicalized.
    pub fn fetch(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = self.notes.iter().cloned().map(Note::canonical).collect();
        notes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        notes
    }

    /// Notes carrying any reminder data, canonicalized, due-date order
    /// (notes without a due date last).
    pub fn fetch_notes_with_reminders(&self) -> Vec<Note> {
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|n| n.has_reminder_data())
            .cloned()
            .map(Note::canonical)
            .collect();
        notes.sort_by(|a, b| match (a.due_date, b.due_date) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        notes
    }

    pub fn get(&self, id: &str) -> Option<Note> {
        self.notes
            .iter()
            .find(|n| n.id == id)
            .cloned()
            .map(Note::canonical)
    }

    pub fn create(&mut self, title: impl Into<String>) -> Result<Note> {
        let note = Note::new(title);
        self.notes.insert(0, note.clone());
        self.save()?;
        Ok(note)
    }

    /// Replace title, content and tags of an existing note.
    pub fn update(&mut self, updated: &Note) -> Result<Note> {
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == updated.id)
            .ok_or_else(|| eyre!("no note with id {}", updated.id))?;
        note.title = updated.title.clone();
        note.content = updated.content.clone();
        note.tags = updated.tags.clone();
        let result = note.clone().canonical();
        self.save()?;
        Ok(result)
    }

    pub fn delete(&mut self, id: &str) -> Result<()> {
        let before = self.notes.len();
        self.notes.retain(|n| n.id != id);
        if self.notes.len() == before {
            return Err(eyre!("no note with id {id}"));
        }
        self.save()
    }

    /// Write reminder fields for a note and return the canonicalized result.
    ///
    /// Writes go to the nested metadata shape only, mirroring the backing
    /// schema; the returned note has the fields lifted for the UI.
    pub fn persist_reminder_fields(&mut self, id: &str, fields: ReminderFields) -> Result<Note> {
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or_else(|| eyre!("no note with id {id}"))?;

        note.due_date = None;
        note.reminder_date = None;
        note.reminder_time = None;
        note.metadata = Some(NoteMetadata {
            due_date: fields.due_date,
            reminder_date: fields.reminder_date,
            reminder_time: fields.reminder_time,
        });

        let result = note.clone().canonical();
        self.save()?;
        Ok(result)
    }

    fn save(&self) -> Result<()> {
        let raw = serde_json::to_string_pretty(&self.notes)?;
        fs::write(&self.path, raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local};

    fn open_temp() -> (tempfile::TempDir, NoteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = NoteStore::open(dir.path()).unwrap();
        (dir, store)
    }

    #[test]
    fn create_and_fetch_round_trip() {
        let (dir, mut store) = open_temp();
        let note = store.create("first").unwrap();

        let reopened = NoteStore::open(dir.path()).unwrap();
        let notes = reopened.fetch();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].id, note.id);
        assert_eq!(notes[0].title, "first");
    }

    #[test]
    fn fetch_is_newest_first() {
        let (_dir, mut store) = open_temp();
        store.create("old").unwrap();
        // Creation timestamps need to differ for the ordering to be observable.
        let newer = store.create("new").unwrap();
        store
            .notes
            .iter_mut()
            .find(|n| n.id == newer.id)
            .unwrap()
            .created_at += Duration::seconds(1);

        let notes = store.fetch();
        assert_eq!(notes[0].title, "new");
        assert_eq!(notes[1].title, "old");
    }

    #[test]
    fn persist_reminder_fields_writes_metadata_and_lifts() {
        let (dir, mut store) = open_temp();
        let note = store.create("dentist").unwrap();
        let when = Local::now() + Duration::days(2);

        let updated = store
            .persist_reminder_fields(
                &note.id,
                ReminderFields {
                    reminder_date: Some(when),
                    reminder_time: Some("14:00".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        // Returned note is canonical.
        assert_eq!(updated.reminder_date, Some(when));
        assert_eq!(updated.reminder_time.as_deref(), Some("14:00"));

        // On disk the fields live under metadata.
        let raw = fs::read_to_string(dir.path().join(NOTES_FILE)).unwrap();
        let stored: Vec<Note> = serde_json::from_str(&raw).unwrap();
        assert!(stored[0].reminder_date.is_none());
        assert_eq!(
            stored[0].metadata.as_ref().unwrap().reminder_time.as_deref(),
            Some("14:00")
        );
    }

    #[test]
    fn fetch_notes_with_reminders_filters_and_sorts() {
        let (_dir, mut store) = open_temp();
        let plain = store.create("plain").unwrap();
        let later = store.create("later").unwrap();
        let sooner = store.create("sooner").unwrap();
        let reminder_only = store.create("reminder only").unwrap();

        let now = Local::now();
        store
            .persist_reminder_fields(
                &later.id,
                ReminderFields {
                    due_date: Some(now + Duration::days(5)),
                    ..Default::default()
                },
            )
            .unwrap();
        store
            .persist_reminder_fields(
                &sooner.id,
                ReminderFields {
                    due_date: Some(now + Duration::days(1)),
                    ..Default::default()
                },
            )
            .unwrap();
        store
            .persist_reminder_fields(
                &reminder_only.id,
                ReminderFields {
                    reminder_date: Some(now + Duration::days(3)),
                    ..Default::default()
                },
            )
            .unwrap();

        let notes = store.fetch_notes_with_reminders();
        let titles: Vec<&str> = notes.iter().map(|n| n.title.as_str()).collect();
        assert_eq!(titles, vec!["sooner", "later", "reminder only"]);
        assert!(!notes.iter().any(|n| n.id == plain.id));
        // Canonicalized on the way out.
        assert!(notes.iter().all(|n| n.metadata.is_none()));
    }

    #[test]
    fn delete_removes_note() {
        let (_dir, mut store) = open_temp();
        let note = store.create("gone").unwrap();
        store.delete(&note.id).unwrap();
        assert!(store.fetch().is_empty());
        assert!(store.delete(&note.id).is_err());
    }

    #[test]
    fn corrupt_file_degrades_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(NOTES_FILE), "{not json").unwrap();
        let store = NoteStore::open(dir.path()).unwrap();
        assert!(store.fetch().is_empty());
    }
}
