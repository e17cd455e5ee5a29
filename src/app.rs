//! Application state for the keypair TUI. The app is the host of the list editor.

use crossterm::event::KeyEvent;
use tracing::warn;

use crate::component::{ChangeSink, EditorProps, KeyValueListEditor};
use crate::document::Document;
use crate::pairs::PairList;

/// Application state.
pub struct App {
    pub document: Document,
    /// The authoritative list. The editor only ever sees it borrowed.
    pub value: PairList,
    pub editor: KeyValueListEditor,
    pub should_quit: bool,
    pub status_message: Option<String>,
}

impl App {
    /// Creates the app and runs the editor's attach handshake.
    pub fn new(document: Document, value: PairList, props: EditorProps) -> Self {
        // An empty list has no last row, so nothing to append from.
        let value = if value.is_empty() {
            PairList::blank()
        } else {
            value
        };
        let mut app = Self {
            document,
            editor: KeyValueListEditor::new(EditorProps {
                duplicate_key: value.has_duplicate_keys(),
                ..props
            }),
            value,
            should_quit: false,
            status_message: None,
        };
        app.dispatch(|editor, value, sink| editor.attach(value, sink));
        app
    }

    /// Runs one editor call and applies what it emitted, in order.
    fn dispatch(&mut self, f: impl FnOnce(&mut KeyValueListEditor, &PairList, &mut dyn ChangeSink)) {
        let mut emitted = Vec::new();
        f(&mut self.editor, &self.value, &mut |next: PairList| emitted.push(next));
        for next in emitted {
            self.apply_change(next);
        }
    }

    fn apply_change(&mut self, next: PairList) {
        if next == self.value {
            return;
        }
        self.value = next;
        self.editor.set_duplicate_key(self.value.has_duplicate_keys());
        self.editor.clamp_focus(&self.value);
        self.document.mark_dirty();
    }

    /// Forwards a key to the editor. Returns whether it was consumed.
    pub fn handle_editor_key(&mut self, key: KeyEvent) -> bool {
        let mut handled = false;
        self.dispatch(|editor, value, sink| handled = editor.handle_key(value, key, sink));
        handled
    }

    pub fn toggle_disabled(&mut self) {
        let disabled = !self.editor.props().disabled;
        self.dispatch(|editor, value, sink| editor.set_disabled(value, disabled, sink));
        self.status_message = Some(if disabled {
            "Editor disabled".to_string()
        } else {
            "Editor enabled".to_string()
        });
    }

    /// Replaces the list from outside the editor (e.g. `$EDITOR`) and confirms it.
    pub fn apply_editor_result(&mut self, edited: PairList) {
        let edited = if edited.is_empty() {
            PairList::blank()
        } else {
            edited
        };
        self.apply_change(edited);
        self.dispatch(|editor, value, sink| editor.rebind(value, sink));
    }

    /// Saves the list to disk.
    pub fn save(&mut self) {
        match self.document.save(&self.value) {
            Ok(()) => self.status_message = Some("Saved!".to_string()),
            Err(e) => {
                warn!(error = %e, "save failed");
                self.status_message = Some(format!("Save failed: {e}"));
            }
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.editor.props().disabled
    }
}
