use crate::notes::Note;

use super::channel::{EventChannel, ReminderEvent};

/// Maximum length of the plain-text excerpt carried by a reminder event.
pub const EXCERPT_LEN: usize = 100;

/// Fire-time handler for an elapsed reminder timer.
///
/// Sole producer side of the event channel: builds the event payload from
/// the note and publishes it.
pub fn fire(note: &Note, channel: &EventChannel) {
    let title = if note.title.trim().is_empty() {
        "Reminder".to_string()
    } else {
        note.title.clone()
    };

    let event = ReminderEvent {
        id: note.id.clone(),
        title,
        content: excerpt(&note.content),
        url: format!("/dashboard?note={}", note.id),
    };

    tracing::info!(note_id = %event.id, title = %event.title, "triggered reminder");
    channel.publish(&event);
}

/// Plain-text excerpt of rich-text markup: tags stripped, first
/// [`EXCERPT_LEN`] characters. Malformed markup degrades to an empty string,
/// never an error.
pub fn excerpt(markup: &str) -> String {
    match strip_markup(markup) {
        Some(text) => text.chars().take(EXCERPT_LEN).collect(),
        None => String::new(),
    }
}

/// Strip `<...>` tags and decode the common entities.
///
/// Returns `None` for malformed input (a tag bracket opened but never
/// closed), which callers map to an empty excerpt.
pub fn strip_markup(markup: &str) -> Option<String> {
    let mut text = String::with_capacity(markup.len());
    let mut chars = markup.chars().peekable();
    let mut in_tag = false;

    while let Some(c) = chars.next() {
        match c {
            '<' if !in_tag => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if in_tag => {}
            '&' => {
                let mut entity = String::new();
                while let Some(&next) = chars.peek() {
                    if next == ';'
                        || entity.len() > 6
                        || !(next.is_ascii_alphanumeric() || next == '#')
                    {
                        break;
                    }
                    entity.push(next);
                    chars.next();
                }
                match (entity.as_str(), chars.peek().copied()) {
                    ("amp", Some(';')) => text.push('&'),
                    ("lt", Some(';')) => text.push('<'),
                    ("gt", Some(';')) => text.push('>'),
                    ("quot", Some(';')) => text.push('"'),
                    ("#39", Some(';')) | ("apos", Some(';')) => text.push('\''),
                    ("nbsp", Some(';')) => text.push(' '),
                    // Unknown entity, keep it verbatim.
                    _ => {
                        text.push('&');
                        text.push_str(&entity);
                        continue;
                    }
                }
                chars.next();
            }
            _ => text.push(c),
        }
    }

    if in_tag {
        return None;
    }
    Some(text.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn collect(channel: &EventChannel) -> Arc<Mutex<Vec<ReminderEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        channel.subscribe(move |ev: &ReminderEvent| {
            sink.lock().unwrap().push(ev.clone());
        });
        events
    }

    #[test]
    fn fire_publishes_full_payload() {
        let channel = EventChannel::new();
        let events = collect(&channel);

        let mut note = Note::new("dentist");
        note.content = "<p>bring the <b>forms</b></p>".to_string();
        fire(&note, &channel);

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, note.id);
        assert_eq!(events[0].title, "dentist");
        assert_eq!(events[0].content, "bring the forms");
        assert_eq!(events[0].url, format!("/dashboard?note={}", note.id));
    }

    #[test]
    fn empty_title_defaults_to_reminder() {
        let channel = EventChannel::new();
        let events = collect(&channel);

        let note = Note::new("  ");
        fire(&note, &channel);

        assert_eq!(events.lock().unwrap()[0].title, "Reminder");
    }

    #[test]
    fn excerpt_strips_tags() {
        assert_eq!(excerpt("<p>hello <em>world</em></p>"), "hello world");
        assert_eq!(excerpt("plain text"), "plain text");
        assert_eq!(excerpt(""), "");
    }

    #[test]
    fn excerpt_is_capped_at_100_chars() {
        let long = format!("<div>{}</div>", "x".repeat(300));
        assert_eq!(excerpt(&long).chars().count(), EXCERPT_LEN);
    }

    #[test]
    fn excerpt_cap_respects_char_boundaries() {
        let long = "é".repeat(300);
        let result = excerpt(&long);
        assert_eq!(result.chars().count(), EXCERPT_LEN);
        assert!(result.chars().all(|c| c == 'é'));
    }

    #[test]
    fn malformed_markup_yields_empty_excerpt() {
        // Tag bracket opened, never closed.
        assert_eq!(excerpt("call mom <b unclosed"), "");
        assert_eq!(strip_markup("<div class="), None);
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(excerpt("a &amp; b &lt;tag&gt;"), "a & b <tag>");
        assert_eq!(excerpt("it&#39;s&nbsp;fine"), "it's fine");
        // Unknown entities pass through untouched.
        assert_eq!(excerpt("&bogus; stays"), "&bogus; stays");
    }

    #[test]
    fn bare_ampersand_does_not_swallow_markup() {
        assert_eq!(excerpt("Tom & Jerry <b>show</b>"), "Tom & Jerry show");
        assert_eq!(excerpt("5 & 3"), "5 & 3");
    }
}
