use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::notes::Note;
use crate::reminder::trigger;
use crate::theme;

pub struct NoteView;

impl NoteView {
    pub fn render(frame: &mut Frame, area: Rect, note: Option<&Note>, armed: bool) {
        let block = Block::default()
            .title(" Note ")
            .title_style(theme::current().header)
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        let Some(note) = note else {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("Select a note or create a new one")
                .style(theme::current().dim);
            frame.render_widget(msg, inner);
            return;
        };

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = vec![
            Line::from(Span::styled(note.title.clone(), theme::current().header)),
            Line::from(Span::styled(
                format!("created {}", note.created_at.format("%Y-%m-%d %H:%M")),
                theme::current().dim,
            )),
        ];

        if !note.tags.is_empty() {
            lines.push(Line::from(Span::styled(
                note.tags.join(" "),
                theme::current().tag,
            )));
        }

        if let Some(due) = note.due_date {
            lines.push(Line::from(vec![
                Span::styled("Due: ", theme::current().dim),
                Span::styled(due.format("%Y-%m-%d").to_string(), theme::current().due),
            ]));
        }
        if let Some(reminder) = note.reminder_date {
            let mut spans = vec![
                Span::styled("Reminder: ", theme::current().dim),
                Span::styled(
                    format!(
                        "{} at {}",
                        reminder.format("%Y-%m-%d"),
                        note.reminder_time_or_default()
                    ),
                    theme::current().reminder,
                ),
            ];
            if armed {
                spans.push(Span::styled(" (scheduled)", theme::current().dim));
            }
            lines.push(Line::from(spans));
        }

        lines.push(Line::from(""));
        let body = trigger::excerpt(&note.content);
        if body.is_empty() {
            lines.push(Line::from(Span::styled("(empty)", theme::current().dim)));
        } else {
            // Excerpt only; the full rich-text body is not rendered here.
            lines.push(Line::from(body));
        }

        let para = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(para, inner);
    }
}
