use ratatui::{
    layout::Rect,
    style::Color,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

fn keybind(key: &'static str, pad: usize, what: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::raw("  "),
        Span::styled(key, Style::default().fg(Color::Magenta)),
        Span::raw(" ".repeat(pad)),
        Span::raw(what),
    ])
}

pub fn draw_help(area: Rect, f: &mut Frame) {
    let p = Paragraph::new(vec![
        Line::from("Keybinds:"),
        keybind("Tab / Shift-Tab", 3, "Move between fields"),
        keybind("Enter", 13, "New line (entities) / Calculate (button)"),
        keybind("Ctrl-S", 12, "Calculate from any field"),
        keybind("←/→ or ↑/↓", 8, "Change statistic"),
        keybind("Backspace", 9, "Delete last character"),
        keybind("Enter / Esc", 7, "Close result dialog"),
        keybind("F1", 16, "Toggle this help"),
        keybind("Esc / Ctrl-C", 6, "Quit"),
        Line::from(""),
        Line::from("Entities:"),
        Line::from("  One entity per line. Blank lines are sent as empty entries."),
        Line::from("  Results are computed remotely and emailed to the given address."),
    ])
    .block(Block::default().borders(Borders::ALL).title("Help"));
    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
