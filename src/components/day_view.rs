use chrono::NaiveDate;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::notes::Note;
use crate::theme;

use super::note_list::truncate;

pub struct DayView;

impl DayView {
    /// Notes scheduled on the selected day, due dates first, then reminders.
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        date: NaiveDate,
        due: &[Note],
        reminding: &[Note],
    ) {
        let w = area.width as usize;

        let title = if w >= 30 {
            format!(" {} ", date.format("%A, %B %d, %Y"))
        } else if w >= 18 {
            format!(" {} ", date.format("%b %d, %Y"))
        } else {
            format!(" {} ", date.format("%m/%d"))
        };

        let mut counts = Vec::new();
        if !due.is_empty() {
            let n = due.len();
            counts.push(format!("{} due", n));
        }
        if !reminding.is_empty() {
            let n = reminding.len();
            counts.push(format!("{} reminder{}", n, if n == 1 { "" } else { "s" }));
        }
        let count_str = if counts.is_empty() {
            String::new()
        } else {
            format!(" {} ", counts.join(", "))
        };

        let block = Block::default()
            .title(title)
            .title_style(theme::current().header)
            .title_bottom(Line::from(Span::styled(count_str, theme::current().dim)))
            .borders(Borders::ALL)
            .border_style(theme::current().border);

        if due.is_empty() && reminding.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = Paragraph::new("No notes scheduled for this date")
                .style(theme::current().dim);
            frame.render_widget(msg, inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;
        let mut items: Vec<ListItem> = Vec::new();

        if !due.is_empty() {
            items.push(ListItem::new(Line::from(Span::styled(
                "Due",
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ))));
            for note in due {
                items.push(format_scheduled_note(note, inner_w, theme::current().due, None));
            }
            if !reminding.is_empty() {
                items.push(ListItem::new(Line::from("")));
            }
        }

        if !reminding.is_empty() {
            items.push(ListItem::new(Line::from(Span::styled(
                "Reminders",
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ))));
            for note in reminding {
                items.push(format_scheduled_note(
                    note,
                    inner_w,
                    theme::current().reminder,
                    Some(note.reminder_time_or_default()),
                ));
            }
        }

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

fn format_scheduled_note(
    note: &Note,
    max_width: usize,
    marker_style: Style,
    time: Option<&str>,
) -> ListItem<'static> {
    let mut spans = vec![
        Span::styled(" \u{25cf} ", marker_style),
        Span::styled(
            truncate(&note.title, max_width.saturating_sub(12)),
            Style::default(),
        ),
    ];
    if let Some(time) = time {
        spans.push(Span::styled(format!(" {}", time), theme::current().dim));
    }
    ListItem::new(Line::from(spans))
}
