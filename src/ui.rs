//! UI rendering for the keypair TUI.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::app::App;
use crate::component::{EditorProps, Field, KeyValueListEditor, RowControl};
use crate::pairs::{Entry, PairList};

const KEY_PLACEHOLDER: &str = "Type key...";
const VALUE_PLACEHOLDER: &str = "Type a value...";

/// Width of the trailing add/remove control.
const CONTROL_WIDTH: u16 = 5;

/// Renders the full application UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let main = Rect::new(0, 0, area.width, area.height.saturating_sub(2));

    let mut title = String::from(" keypair ");
    if app.document.is_dirty() {
        title.push_str("[modified] ");
    }
    if app.is_disabled() {
        title.push_str("[disabled] ");
    }
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(main);
    frame.render_widget(block, main);

    render_pair_list(frame, inner, &app.editor, &app.value);
    render_help_bar(frame, app);

    if let Some(ref msg) = app.status_message {
        render_status_bar(frame, msg);
    }
}

/// Height of one row: bordered inputs take three lines, compact ones one.
fn row_height(props: EditorProps) -> u16 {
    if props.edit_node {
        1
    } else {
        3
    }
}

/// Blank lines between rows.
fn row_gap(props: EditorProps) -> u16 {
    if props.edit_node {
        0
    } else {
        1
    }
}

/// Outer vertical margin. Compact mode adds one only for multi-row lists.
fn list_margin(props: EditorProps, len: usize) -> u16 {
    if props.edit_node && len > 1 {
        1
    } else {
        0
    }
}

/// Renders one row per entry: key input, value input, trailing control.
pub fn render_pair_list(frame: &mut Frame, area: Rect, editor: &KeyValueListEditor, value: &PairList) {
    let props = editor.props();
    let margin = list_margin(props, value.len());
    let area = Rect::new(
        area.x,
        area.y.saturating_add(margin),
        area.width,
        area.height.saturating_sub(margin * 2),
    );

    let height = row_height(props);
    let stride = height + row_gap(props);
    let (focus_row, focus_field) = editor.focus();

    for (index, entry) in value.entries().iter().enumerate() {
        let offset = stride.saturating_mul(index as u16);
        if offset + height > area.height {
            break;
        }
        let row_area = Rect::new(area.x, area.y + offset, area.width, height);
        let focused = (index == focus_row).then_some(focus_field);
        render_row(frame, row_area, props, value, index, entry, focused);
    }
}

fn render_row(
    frame: &mut Frame,
    area: Rect,
    props: EditorProps,
    value: &PairList,
    index: usize,
    entry: &Entry,
    focused: Option<Field>,
) {
    let cells = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Fill(1),
            Constraint::Length(CONTROL_WIDTH),
        ])
        .spacing(1)
        .split(area);

    let key_focused = focused == Some(Field::Key);
    let key_style = input_border_style(key_focused, props.duplicate_key);
    render_input(
        frame,
        cells[0],
        props,
        entry.key.trim(),
        KEY_PLACEHOLDER,
        key_style,
        key_focused,
    );

    let value_focused = focused == Some(Field::Value);
    let value_style = input_border_style(value_focused, false);
    render_input(
        frame,
        cells[1],
        props,
        &entry.value,
        VALUE_PLACEHOLDER,
        value_style,
        value_focused,
    );

    let control = RowControl::for_row(value, index);
    let mut control_style = match control {
        RowControl::Append => Style::default().fg(Color::Green),
        RowControl::Remove => Style::default().fg(Color::Red),
    };
    if focused == Some(Field::Control) {
        control_style = control_style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
    }
    let control_area = Rect::new(cells[2].x, cells[2].y + (area.height - 1) / 2, cells[2].width, 1);
    frame.render_widget(
        Paragraph::new(control.label()).style(control_style),
        control_area,
    );
}

/// Invalid beats focused, focused beats plain.
fn input_border_style(focused: bool, invalid: bool) -> Style {
    if invalid {
        Style::default().fg(Color::Red)
    } else if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Columns to scroll so the end of the text and the cursor after it stay visible.
fn input_scroll(text_width: u16, inner_width: u16) -> u16 {
    text_width.saturating_add(1).saturating_sub(inner_width)
}

fn render_input(
    frame: &mut Frame,
    area: Rect,
    props: EditorProps,
    text: &str,
    placeholder: &str,
    style: Style,
    focused: bool,
) {
    let (content, text_style) = if text.is_empty() {
        (placeholder, Style::default().fg(Color::DarkGray))
    } else {
        (text, Style::default().fg(Color::White))
    };

    let mut paragraph = Paragraph::new(content).style(text_style);
    let inner = if props.edit_node {
        // Compact inputs carry their state in the text colour instead of a border.
        if style.fg != Some(Color::DarkGray) {
            paragraph = paragraph.style(text_style.patch(style).add_modifier(Modifier::UNDERLINED));
        }
        area
    } else {
        let block = Block::default().borders(Borders::ALL).border_style(style);
        let inner = block.inner(area);
        paragraph = paragraph.block(block);
        inner
    };

    if focused && inner.width > 0 && inner.height > 0 {
        let text_width = u16::try_from(text.width()).unwrap_or(u16::MAX);
        let scroll = input_scroll(text_width, inner.width);
        paragraph = paragraph.scroll((0, scroll));
        if !props.disabled {
            let column = text_width.saturating_sub(scroll).min(inner.width - 1);
            frame.set_cursor_position((inner.x + column, inner.y));
        }
    }
    frame.render_widget(paragraph, area);
}

/// Renders the key help line.
fn render_help_bar(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let bar_area = Rect::new(0, area.height.saturating_sub(2), area.width, 1);
    let text = format!(
        " Esc: quit | Tab: next field | ↑↓: row | Enter: [+]/[x] | Ctrl+S: save | Ctrl+E: $EDITOR | Ctrl+D: disable | {}",
        app.document.path().display()
    );
    let bar = Paragraph::new(text).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(bar, bar_area);
}

/// Renders a status bar at the bottom of the screen.
fn render_status_bar(frame: &mut Frame, message: &str) {
    let area = frame.area();
    let bar_area = Rect::new(0, area.height.saturating_sub(1), area.width, 1);
    let bar = Paragraph::new(message).style(Style::default().fg(Color::Black).bg(Color::Yellow));
    frame.render_widget(bar, bar_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn draw(editor: &KeyValueListEditor, value: &PairList, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_pair_list(frame, area, editor, value);
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..height)
            .map(|y| (0..width).map(|x| buffer[(x, y)].symbol()).collect::<String>())
            .collect()
    }

    fn sample() -> PairList {
        PairList::new(vec![Entry::new("host", "example.org"), Entry::default()])
    }

    #[test]
    fn test_row_metrics() {
        let normal = EditorProps::default();
        let compact = EditorProps {
            edit_node: true,
            ..EditorProps::default()
        };
        assert_eq!(row_height(normal), 3);
        assert_eq!(row_gap(normal), 1);
        assert_eq!(row_height(compact), 1);
        assert_eq!(row_gap(compact), 0);
        assert_eq!(list_margin(normal, 5), 0);
        assert_eq!(list_margin(compact, 1), 0);
        assert_eq!(list_margin(compact, 2), 1);
    }

    #[test]
    fn test_input_border_style() {
        assert_eq!(input_border_style(true, true).fg, Some(Color::Red));
        assert_eq!(input_border_style(true, false).fg, Some(Color::Cyan));
        assert_eq!(input_border_style(false, false).fg, Some(Color::DarkGray));
    }

    #[test]
    fn test_render_rows_and_controls() {
        let editor = KeyValueListEditor::new(EditorProps::default());
        let lines = draw(&editor, &sample(), 60, 8);

        assert!(lines[1].contains("host"));
        assert!(lines[1].contains("example.org"));
        assert!(lines[1].contains("[x]"));
        // Second row starts after a three-line row and a one-line gap
        assert!(lines[5].contains(KEY_PLACEHOLDER));
        assert!(lines[5].contains(VALUE_PLACEHOLDER));
        assert!(lines[5].contains("[+]"));
    }

    #[test]
    fn test_render_compact() {
        let editor = KeyValueListEditor::new(EditorProps {
            edit_node: true,
            ..EditorProps::default()
        });
        let lines = draw(&editor, &sample(), 60, 4);

        // One line of margin, then one line per row
        assert!(lines[0].trim().is_empty());
        assert!(lines[1].contains("host"));
        assert!(lines[2].contains("[+]"));
    }

    #[test]
    fn test_input_scroll() {
        assert_eq!(input_scroll(0, 10), 0);
        assert_eq!(input_scroll(9, 10), 0);
        assert_eq!(input_scroll(10, 10), 1);
        assert_eq!(input_scroll(25, 10), 16);
    }

    #[test]
    fn test_focused_input_scrolls_to_end_and_places_cursor() {
        let editor = KeyValueListEditor::new(EditorProps::default());
        let value = PairList::new(vec![Entry::new("abcdefghijklmnopqrstuvwxyz", "v")]);
        let mut terminal = Terminal::new(TestBackend::new(30, 3)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_pair_list(frame, area, &editor, &value);
            })
            .unwrap();

        let cursor = terminal.get_cursor_position().unwrap();
        let buffer = terminal.backend().buffer();
        let row: String = (0..30).map(|x| buffer[(x, 1)].symbol()).collect();
        assert!(row.contains("xyz"));
        assert!(!row.contains("abc"));

        // Cursor sits just past the last visible character
        assert_eq!(cursor.y, 1);
        assert_eq!(buffer[(cursor.x - 1, 1)].symbol(), "z");
        assert_eq!(buffer[(cursor.x, 1)].symbol(), " ");
    }

    #[test]
    fn test_unfocused_input_does_not_scroll() {
        let editor = KeyValueListEditor::new(EditorProps::default());
        let value = PairList::new(vec![Entry::new("k", "abcdefghijklmnopqrstuvwxyz")]);
        let lines = draw(&editor, &value, 30, 3);
        assert!(lines[1].contains("│abc"));
        assert!(!lines[1].contains("xyz"));
    }

    #[test]
    fn test_render_trims_key() {
        let editor = KeyValueListEditor::new(EditorProps::default());
        let value = PairList::new(vec![Entry::new("  padded  ", "v")]);
        let lines = draw(&editor, &value, 60, 3);
        assert!(lines[1].contains("│padded "));
    }

    #[test]
    fn test_render_duplicate_key_marks_key_inputs() {
        let editor = KeyValueListEditor::new(EditorProps {
            duplicate_key: true,
            ..EditorProps::default()
        });
        let mut terminal = Terminal::new(TestBackend::new(40, 3)).unwrap();
        terminal
            .draw(|frame| {
                let area = frame.area();
                render_pair_list(frame, area, &editor, &sample());
            })
            .unwrap();
        let buffer = terminal.backend().buffer();
        // Top-left corner of the key input border
        assert_eq!(buffer[(0, 0)].fg, Color::Red);
    }
}
