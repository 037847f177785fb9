use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveTime, TimeZone};
use tokio::task::AbortHandle;

use crate::notes::Note;

use super::channel::EventChannel;
use super::trigger;

const REGISTRY_FILE: &str = "scheduled_reminders.json";
const DUE_SOON_WINDOW_MINUTES: i64 = 5;

/// What to do with reminders whose fire instant already passed when a
/// startup scheduling pass sees them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissedReminderPolicy {
    /// Log and skip (the historical behavior).
    #[default]
    Skip,
    /// Fire them immediately, once, on the first pass after startup.
    NotifyOnStart,
}

struct ArmedTimer {
    token: u64,
    abort: AbortHandle,
}

/// Converts notes with reminder data into live one-shot timers and keeps a
/// persisted registry of them for cleanup.
///
/// Timers are tokio tasks tracked in-memory by abort handle; the registry
/// file only maps note ids to opaque handle tokens. Tokens surviving a
/// process restart refer to timers that no longer exist, so the registry is
/// advisory: it is cleared unconditionally on construction and rebuilt on
/// every scheduling pass.
pub struct ReminderScheduler {
    channel: EventChannel,
    timers: Mutex<HashMap<String, ArmedTimer>>,
    registry_path: PathBuf,
    next_token: AtomicU64,
    missed_policy: MissedReminderPolicy,
    startup_pass: AtomicBool,
}

impl ReminderScheduler {
    pub fn new(channel: EventChannel, data_dir: &Path, missed_policy: MissedReminderPolicy) -> Self {
        let scheduler = Self {
            channel,
            timers: Mutex::new(HashMap::new()),
            registry_path: data_dir.join(REGISTRY_FILE),
            next_token: AtomicU64::new(1),
            missed_policy,
            startup_pass: AtomicBool::new(true),
        };
        // Whatever the registry held belonged to a previous process.
        scheduler.persist_registry(&HashMap::new());
        scheduler
    }

    /// One scheduling pass: tear down every live timer, then re-arm from the
    /// given snapshot. Calling this twice in a row with the same input leaves
    /// exactly one live timer per qualifying note.
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule(&self, notes: &[Note]) {
        self.clear_all();
        let startup = self.startup_pass.swap(false, Ordering::SeqCst);
        let now = Local::now();

        let with_reminders: Vec<Note> = notes
            .iter()
            .cloned()
            .map(Note::canonical)
            .filter(|n| n.reminder_date.is_some())
            .collect();
        tracing::info!("scheduling reminders for {} notes", with_reminders.len());

        let mut timers = HashMap::new();
        let mut registry = HashMap::new();

        for note in &with_reminders {
            let Some(fire_at) = fire_instant(note) else {
                tracing::warn!(
                    note_id = %note.id,
                    time = %note.reminder_time_or_default(),
                    "unparsable reminder time, skipping note"
                );
                continue;
            };

            if fire_at > now {
                let delay = (fire_at - now).to_std().unwrap_or_default();
                tracing::info!(
                    note_id = %note.id,
                    title = %note.title,
                    minutes = (delay.as_secs() + 59) / 60,
                    "scheduled reminder"
                );

                let token = self.next_token.fetch_add(1, Ordering::Relaxed);
                let channel = self.channel.clone();
                let armed_note = note.clone();
                let handle = tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    trigger::fire(&armed_note, &channel);
                });

                timers.insert(
                    note.id.clone(),
                    ArmedTimer {
                        token,
                        abort: handle.abort_handle(),
                    },
                );
                registry.insert(note.id.clone(), token);
            } else if startup && self.missed_policy == MissedReminderPolicy::NotifyOnStart {
                tracing::info!(note_id = %note.id, title = %note.title, "firing missed reminder");
                trigger::fire(note, &self.channel);
            } else {
                tracing::info!(
                    note_id = %note.id,
                    title = %note.title,
                    "reminder is in the past, not scheduling"
                );
            }
        }

        *self.timers.lock().expect("timer map lock") = timers;
        self.persist_registry(&registry);

        // Informational only: reminders landing within the next few minutes,
        // typically right after a page of notes was (re)loaded.
        let window = chrono::Duration::minutes(DUE_SOON_WINDOW_MINUTES);
        let due_soon: Vec<&Note> = with_reminders
            .iter()
            .filter(|n| fire_instant(n).is_some_and(|at| at > now && at - now < window))
            .collect();
        if !due_soon.is_empty() {
            tracing::info!("found {} reminders due soon", due_soon.len());
            for note in due_soon {
                tracing::debug!(note_id = %note.id, title = %note.title, "reminder due soon");
            }
        }
    }

    /// Cancel every tracked timer and reset the persisted registry.
    ///
    /// Safe when nothing is scheduled and when the registry holds stale
    /// tokens from a previous process; cancelling those is a silent no-op.
    pub fn clear_all(&self) {
        let persisted = self.load_registry();
        let mut timers = self.timers.lock().expect("timer map lock");

        let stale = persisted
            .keys()
            .filter(|id| !timers.contains_key(id.as_str()))
            .count();
        if stale > 0 {
            tracing::debug!(stale, "dropping persisted handles with no live timer");
        }

        for (_, timer) in timers.drain() {
            timer.abort.abort();
        }
        drop(timers);
        self.persist_registry(&HashMap::new());
    }

    /// Cancel the timer for a single note, if any, and drop its registry
    /// entry. Used when a note is deleted or its reminder cleared.
    pub fn cancel_one(&self, id: &str) {
        let mut timers = self.timers.lock().expect("timer map lock");
        if let Some(timer) = timers.remove(id) {
            timer.abort.abort();
            tracing::info!(note_id = %id, "cancelled reminder");
        }
        let registry: HashMap<String, u64> = timers
            .iter()
            .map(|(id, t)| (id.clone(), t.token))
            .collect();
        drop(timers);
        self.persist_registry(&registry);
    }

    /// Whether a live timer is armed for the given note id.
    pub fn is_armed(&self, id: &str) -> bool {
        self.timers
            .lock()
            .expect("timer map lock")
            .contains_key(id)
    }

    pub fn armed_count(&self) -> usize {
        self.timers.lock().expect("timer map lock").len()
    }

    fn load_registry(&self) -> HashMap<String, u64> {
        match fs::read_to_string(&self.registry_path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                tracing::warn!(%err, "timer registry unreadable, treating as empty");
                HashMap::new()
            }),
            Err(_) => HashMap::new(),
        }
    }

    fn persist_registry(&self, registry: &HashMap<String, u64>) {
        match serde_json::to_string(registry) {
            Ok(raw) => {
                if let Err(err) = fs::write(&self.registry_path, raw) {
                    tracing::warn!(%err, "failed to persist timer registry");
                }
            }
            Err(err) => tracing::warn!(%err, "failed to encode timer registry"),
        }
    }
}

/// Combine a note's reminder date and `HH:MM` time into an absolute local
/// fire instant, seconds zeroed. `None` when the time string doesn't parse
/// or the local datetime doesn't exist (DST gap).
fn fire_instant(note: &Note) -> Option<DateTime<Local>> {
    let date = note.reminder_date?.with_timezone(&Local).date_naive();
    let time = NaiveTime::parse_from_str(note.reminder_time_or_default(), "%H:%M").ok()?;
    Local.from_local_datetime(&date.and_time(time)).earliest()
}
