use std::path::PathBuf;

use serde::Deserialize;

use crate::reminder::MissedReminderPolicy;
use crate::theme::ThemeConfig;

/// Application config, read once at startup from
/// `<config dir>/notes-tui/config.toml`. A missing or unreadable file means
/// defaults; a bad file is reported but never fatal.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Override for the data directory (notes, timer registry, log file).
    pub data_dir: Option<PathBuf>,
    pub reminders: ReminderConfig,
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReminderConfig {
    /// Minutes between fetch-and-schedule passes.
    pub rescan_minutes: u64,
    /// Pre-filled `HH:MM` time when a reminder date is set without a time.
    pub default_time: String,
    /// Fire reminders missed while the app was closed, once, on startup.
    pub notify_missed_on_start: bool,
    /// Look-ahead window of the upcoming-reminders pane, in days.
    pub upcoming_days: i64,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            rescan_minutes: 5,
            default_time: crate::notes::DEFAULT_REMINDER_TIME.to_string(),
            notify_missed_on_start: false,
            upcoming_days: crate::reminder::queries::DEFAULT_UPCOMING_DAYS,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        let Ok(raw) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        match toml::from_str(&raw) {
            Ok(config) => config,
            Err(err) => {
                eprintln!("warning: ignoring bad config at {}: {err}", path.display());
                Self::default()
            }
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .map(|d| d.join("notes-tui"))
                .unwrap_or_else(|| PathBuf::from("."))
        })
    }

    pub fn missed_policy(&self) -> MissedReminderPolicy {
        if self.reminders.notify_missed_on_start {
            MissedReminderPolicy::NotifyOnStart
        } else {
            MissedReminderPolicy::Skip
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("notes-tui").join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.reminders.rescan_minutes, 5);
        assert_eq!(config.reminders.default_time, "09:00");
        assert!(!config.reminders.notify_missed_on_start);
        assert_eq!(config.reminders.upcoming_days, 7);
        assert_eq!(config.missed_policy(), MissedReminderPolicy::Skip);
    }

    #[test]
    fn parses_partial_toml() {
        let config: Config = toml::from_str(
            r#"
            data_dir = "/tmp/notes"

            [reminders]
            rescan_minutes = 10
            notify_missed_on_start = true

            [theme]
            preset = "nord"
            "#,
        )
        .unwrap();

        assert_eq!(config.data_dir.as_deref(), Some(std::path::Path::new("/tmp/notes")));
        assert_eq!(config.reminders.rescan_minutes, 10);
        // Unset keys keep their defaults.
        assert_eq!(config.reminders.default_time, "09:00");
        assert_eq!(config.missed_policy(), MissedReminderPolicy::NotifyOnStart);
    }
}
