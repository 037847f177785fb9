use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::notes::Note;
use crate::reminder::trigger;
use crate::theme;

pub struct NoteList;

impl NoteList {
    pub fn render(
        frame: &mut Frame,
        area: Rect,
        notes: &[&Note],
        selected_index: usize,
        focused: bool,
        search: &str,
    ) {
        let w = area.width as usize;

        let title = if !search.is_empty() && w >= 25 {
            format!(" Notes ({}) /{} ", notes.len(), search)
        } else if w >= 20 {
            format!(" Notes ({}) ", notes.len())
        } else {
            " Notes ".to_string()
        };

        let border_style = if focused {
            theme::current().tag
        } else {
            theme::current().border
        };

        let block = Block::default()
            .title(title)
            .title_style(theme::current().header)
            .borders(Borders::ALL)
            .border_style(border_style);

        if notes.is_empty() {
            let inner = block.inner(area);
            frame.render_widget(block, area);
            let msg = if search.is_empty() {
                "No notes yet, press n".to_string()
            } else {
                format!("No notes match \"{search}\"")
            };
            frame.render_widget(Paragraph::new(msg).style(theme::current().dim), inner);
            return;
        }

        let inner_w = area.width.saturating_sub(2) as usize;
        let mut items: Vec<ListItem> = Vec::new();

        for (i, note) in notes.iter().enumerate() {
            let is_selected = i == selected_index && focused;
            let row_style = if is_selected {
                theme::current().selected
            } else {
                Style::default()
            };

            let mut spans = vec![Span::styled(
                format!(" {}", truncate(&note.title, inner_w.saturating_sub(7))),
                row_style,
            )];
            if note.due_date.is_some() {
                spans.push(Span::styled(" \u{25cf}", theme::current().due));
            }
            if note.reminder_date.is_some() {
                spans.push(Span::styled(" \u{25cb}", theme::current().reminder));
            }

            let preview = trigger::excerpt(&note.content);
            let mut lines = vec![Line::from(spans)];
            if !preview.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("   {}", truncate(&preview, inner_w.saturating_sub(4))),
                    theme::current().dim,
                )));
            }
            if !note.tags.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!("   {}", truncate(&note.tags.join(" "), inner_w.saturating_sub(4))),
                    theme::current().tag,
                )));
            }

            items.push(ListItem::new(lines));
        }

        let list = List::new(items).block(block);
        frame.render_widget(list, area);
    }
}

/// Char-boundary-safe truncation with an ellipsis.
pub fn truncate(s: &str, max: usize) -> String {
    let count = s.chars().count();
    if count <= max {
        s.to_string()
    } else if max > 3 {
        let cut: String = s.chars().take(max - 3).collect();
        format!("{cut}...")
    } else {
        s.chars().take(max).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long note title", 10), "a very ...");
        assert_eq!(truncate("ééééééé", 5), "éé...");
        assert_eq!(truncate("abcdef", 2), "ab");
    }
}
