use ratatui::style::Color;
use ratatui::style::Style;
use ratatui::widgets::Block;
use ratatui::widgets::BorderType;
use ratatui::widgets::Borders;
use ratatui::widgets::Padding;

pub struct TextArea {}

impl<'a> TextArea {
    pub fn default() -> tui_textarea::TextArea<'a> {
        let mut textarea = tui_textarea::TextArea::default();
        textarea.set_block(TextArea::block(false));
        textarea.set_cursor_line_style(Style::default());

        return textarea;
    }

    pub fn block(focused: bool) -> Block<'a> {
        let mut border_style = Style::default();
        if focused {
            border_style = border_style.fg(Color::Yellow);
        }

        return Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Double)
            .border_style(border_style)
            .title("Ask a follow-up question")
            .padding(Padding::new(1, 1, 0, 0));
    }
}
