//! The key/value list editor component.
//!
//! The component never stores the list. Every operation takes the host's
//! current value, builds a new [`PairList`] and hands it to a [`ChangeSink`].

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

use crate::pairs::PairList;

/// Receives every new list the editor produces.
pub trait ChangeSink {
    fn on_change(&mut self, value: PairList);
}

impl<F: FnMut(PairList)> ChangeSink for F {
    fn on_change(&mut self, value: PairList) {
        self(value)
    }
}

/// Host-supplied configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditorProps {
    /// Clears the list when switched on. Text inputs ignore edits while set.
    pub disabled: bool,
    /// Compact display mode.
    pub edit_node: bool,
    /// Draw key inputs as invalid. Computed by the host.
    pub duplicate_key: bool,
}

/// Which part of a row has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Key,
    Value,
    Control,
}

/// The trailing control shown on a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowControl {
    Append,
    Remove,
}

impl RowControl {
    /// The last row appends, every other row removes itself.
    pub fn for_row(value: &PairList, index: usize) -> Self {
        if Some(index) == value.last_index() {
            RowControl::Append
        } else {
            RowControl::Remove
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RowControl::Append => "[+]",
            RowControl::Remove => "[x]",
        }
    }
}

pub struct KeyValueListEditor {
    props: EditorProps,
    focus_row: usize,
    focus_field: Field,
}

impl KeyValueListEditor {
    pub fn new(props: EditorProps) -> Self {
        Self {
            props,
            focus_row: 0,
            focus_field: Field::Key,
        }
    }

    pub fn props(&self) -> EditorProps {
        self.props
    }

    pub fn focus(&self) -> (usize, Field) {
        (self.focus_row, self.focus_field)
    }

    pub fn set_duplicate_key(&mut self, duplicate_key: bool) {
        self.props.duplicate_key = duplicate_key;
    }

    /// Mount handshake: confirms the host's value, or clears it when disabled.
    pub fn attach(&mut self, value: &PairList, sink: &mut dyn ChangeSink) {
        self.clamp_focus(value);
        if self.props.disabled {
            self.reset(sink);
        } else {
            debug!(len = value.len(), "attach: confirming host value");
            sink.on_change(value.clone());
        }
    }

    /// Echoes a value the host replaced from outside the editor.
    pub fn rebind(&mut self, value: &PairList, sink: &mut dyn ChangeSink) {
        self.clamp_focus(value);
        debug!(len = value.len(), "rebind: confirming host value");
        sink.on_change(value.clone());
    }

    /// Updates the disabled flag. Turning it on clears the list.
    pub fn set_disabled(&mut self, value: &PairList, disabled: bool, sink: &mut dyn ChangeSink) {
        let was_disabled = self.props.disabled;
        self.props.disabled = disabled;
        if disabled && !was_disabled {
            self.reset(sink);
        }
        self.clamp_focus(value);
    }

    fn reset(&mut self, sink: &mut dyn ChangeSink) {
        debug!("disabled: resetting to a blank list");
        self.focus_row = 0;
        self.focus_field = Field::Key;
        sink.on_change(PairList::blank());
    }

    pub fn rename_key(&self, value: &PairList, index: usize, key: &str, sink: &mut dyn ChangeSink) {
        if let Some(next) = value.with_key(index, key) {
            debug!(index, key, "rename key");
            sink.on_change(next);
        }
    }

    pub fn change_value(
        &self,
        value: &PairList,
        index: usize,
        new_value: &str,
        sink: &mut dyn ChangeSink,
    ) {
        if let Some(next) = value.with_value(index, new_value) {
            debug!(index, "change value");
            sink.on_change(next);
        }
    }

    pub fn append(&self, value: &PairList, sink: &mut dyn ChangeSink) {
        debug!(len = value.len() + 1, "append entry");
        sink.on_change(value.appended());
    }

    /// Removes a row. The last row has no remove control, so it is left alone.
    pub fn remove(&self, value: &PairList, index: usize, sink: &mut dyn ChangeSink) {
        if RowControl::for_row(value, index) != RowControl::Remove {
            return;
        }
        if let Some(next) = value.without(index) {
            debug!(index, "remove entry");
            sink.on_change(next);
        }
    }

    /// Presses the trailing control of a row.
    pub fn activate_control(&mut self, value: &PairList, index: usize, sink: &mut dyn ChangeSink) {
        if index >= value.len() {
            return;
        }
        match RowControl::for_row(value, index) {
            RowControl::Append => {
                self.append(value, sink);
                self.focus_row = index + 1;
                self.focus_field = Field::Key;
            }
            RowControl::Remove => self.remove(value, index, sink),
        }
    }

    /// Handles a key press against the focused row. Returns whether the key was consumed.
    pub fn handle_key(&mut self, value: &PairList, key: KeyEvent, sink: &mut dyn ChangeSink) -> bool {
        if value.is_empty() {
            return false;
        }
        self.clamp_focus(value);
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        // AltGr arrives as Ctrl+Alt on some platforms
        let alt_gr = key.modifiers.contains(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match key.code {
            KeyCode::Up => {
                self.focus_row = self.focus_row.saturating_sub(1);
                true
            }
            KeyCode::Down => {
                if self.focus_row + 1 < value.len() {
                    self.focus_row += 1;
                }
                true
            }
            KeyCode::Tab => {
                self.focus_next(value);
                true
            }
            KeyCode::BackTab => {
                self.focus_prev();
                true
            }
            KeyCode::Enter | KeyCode::Char(' ') if self.focus_field == Field::Control => {
                self.activate_control(value, self.focus_row, sink);
                true
            }
            KeyCode::Backspace if ctrl => {
                if self.focus_field == Field::Value && !self.props.disabled {
                    self.delete_word(value, sink);
                }
                // Key input swallows word-delete
                self.focus_field != Field::Control
            }
            KeyCode::Backspace => {
                if let Some(mut text) = self.focused_text(value) {
                    text.pop();
                    self.write_focused(value, &text, sink);
                    true
                } else {
                    false
                }
            }
            KeyCode::Char(c) if !ctrl || alt_gr => {
                if let Some(mut text) = self.focused_text(value) {
                    text.push(c);
                    self.write_focused(value, &text, sink);
                    true
                } else {
                    false
                }
            }
            _ => false,
        }
    }

    /// Text shown in the focused input, or `None` on the control.
    fn focused_text(&self, value: &PairList) -> Option<String> {
        let entry = value.get(self.focus_row)?;
        match self.focus_field {
            Field::Key => Some(entry.key.trim().to_string()),
            Field::Value => Some(entry.value.clone()),
            Field::Control => None,
        }
    }

    fn write_focused(&self, value: &PairList, text: &str, sink: &mut dyn ChangeSink) {
        if self.props.disabled {
            return;
        }
        match self.focus_field {
            Field::Key => self.rename_key(value, self.focus_row, text, sink),
            Field::Value => self.change_value(value, self.focus_row, text, sink),
            Field::Control => {}
        }
    }

    fn delete_word(&self, value: &PairList, sink: &mut dyn ChangeSink) {
        let Some(text) = self.focused_text(value) else {
            return;
        };
        let trimmed = text.trim_end();
        let cut = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0);
        self.write_focused(value, &trimmed[..cut], sink);
    }

    fn focus_next(&mut self, value: &PairList) {
        self.focus_field = match self.focus_field {
            Field::Key => Field::Value,
            Field::Value => Field::Control,
            Field::Control => {
                if self.focus_row + 1 < value.len() {
                    self.focus_row += 1;
                    Field::Key
                } else {
                    Field::Control
                }
            }
        };
    }

    fn focus_prev(&mut self) {
        self.focus_field = match self.focus_field {
            Field::Control => Field::Value,
            Field::Value => Field::Key,
            Field::Key => {
                if self.focus_row > 0 {
                    self.focus_row -= 1;
                    Field::Control
                } else {
                    Field::Key
                }
            }
        };
    }

    /// Keeps focus on an existing row after the host's list shrank.
    pub fn clamp_focus(&mut self, value: &PairList) {
        match value.last_index() {
            Some(last) if self.focus_row > last => self.focus_row = last,
            None => self.focus_row = 0,
            _ => {}
        }
    }
}
