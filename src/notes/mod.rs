pub mod note;
pub mod store;

pub use note::{Note, NoteMetadata, DEFAULT_REMINDER_TIME};
pub use store::{NoteStore, ReminderFields};
