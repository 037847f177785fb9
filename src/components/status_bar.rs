use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::{App, InputMode, ViewMode};
use crate::theme;

pub struct StatusBar;

impl StatusBar {
    pub fn render(frame: &mut Frame, area: Rect, app: &App) {
        let w = area.width as usize;

        let mode_str = match app.view_mode {
            ViewMode::Notes => "[1]Notes",
            ViewMode::Calendar => "[2]Calendar",
        };

        let focus_indicator = match app.input_mode {
            InputMode::Form => " [Edit]",
            InputMode::Search => " [Search]",
            InputMode::Tag => " [Tag]",
            InputMode::Normal => "",
        };

        // Show status message if present, otherwise context-aware hints
        let right_text = if let Some(ref msg) = app.status_message {
            format!(" {} ", msg)
        } else {
            match app.input_mode {
                InputMode::Search => " type to filter  Enter:Keep  Esc:Clear".to_string(),
                InputMode::Tag => " type a tag  Enter:Add  Esc:Cancel".to_string(),
                InputMode::Form => " Tab:Next  Enter:Save  ^X:Clear dates  Esc:Cancel".to_string(),
                InputMode::Normal => match app.view_mode {
                    ViewMode::Notes if w >= 90 => {
                        " jk:Nav /:Search n:New e:Edit t:Tag d:Del v:View x:Dismiss ?:Help q:Quit"
                            .to_string()
                    }
                    ViewMode::Notes if w >= 50 => " jk:Nav n:New e:Edit q:Quit".to_string(),
                    ViewMode::Calendar if w >= 70 => {
                        " hjkl:Nav [/]:Month g:Today ?:Help q:Quit".to_string()
                    }
                    _ => " ?:Help q:Quit".to_string(),
                },
            }
        };

        let left = format!(" {}{} ", mode_str, focus_indicator);
        let padding_len = w.saturating_sub(left.len() + right_text.len());
        let padding = " ".repeat(padding_len);

        let line = Line::from(vec![
            Span::styled(left, theme::current().status),
            Span::styled(padding, theme::current().status),
            Span::styled(right_text, theme::current().status),
        ]);

        let bar = Paragraph::new(line).style(theme::current().status);
        frame.render_widget(bar, area);
    }
}
