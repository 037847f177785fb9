use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::Toast;
use crate::theme;

use super::note_list::truncate;

/// How many toasts are shown at once; older ones wait underneath.
const VISIBLE_TOASTS: usize = 3;

pub struct ToastStack;

impl ToastStack {
    /// Reminder toasts, newest on top, anchored to the top-right corner.
    /// They stay until viewed or dismissed.
    pub fn render(frame: &mut Frame, area: Rect, toasts: &[Toast]) {
        if toasts.is_empty() {
            return;
        }

        let shown = toasts.iter().rev().take(VISIBLE_TOASTS);
        let hidden = toasts.len().saturating_sub(VISIBLE_TOASTS);

        let popup_w = area.width.min(46).max(24);
        let popup_h = (shown.clone().count() as u16 * 2 + 3).min(area.height);
        let x = area.x + area.width.saturating_sub(popup_w);
        let popup_area = Rect::new(x, area.y, popup_w, popup_h);

        frame.render_widget(Clear, popup_area);

        let title = if hidden > 0 {
            format!(" Reminders (+{hidden} more) ")
        } else {
            " Reminders ".to_string()
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::current().header)
            .borders(Borders::ALL)
            .border_style(theme::current().reminder);

        let inner = block.inner(popup_area);
        frame.render_widget(block, popup_area);

        let inner_w = inner.width as usize;
        let mut lines: Vec<Line> = Vec::new();
        for (i, toast) in shown.enumerate() {
            let style = if i == 0 {
                theme::current().toast
            } else {
                ratatui::style::Style::default()
            };
            lines.push(Line::from(Span::styled(
                format!(
                    " Reminder: {} ",
                    truncate(&toast.event.title, inner_w.saturating_sub(13))
                ),
                style,
            )));
            let excerpt = if toast.event.content.is_empty() {
                "You have a reminder for this note".to_string()
            } else {
                toast.event.content.clone()
            };
            lines.push(Line::from(Span::styled(
                format!(" {}", truncate(&excerpt, inner_w.saturating_sub(2))),
                theme::current().dim,
            )));
        }
        lines.push(Line::from(vec![
            Span::styled(" v", theme::current().header),
            Span::styled(":View Note ", theme::current().dim),
            Span::styled("x", theme::current().header),
            Span::styled(":Dismiss", theme::current().dim),
        ]));

        frame.render_widget(Paragraph::new(lines), inner);
    }
}
