//! Single-line input buffer for raw-mode prompts.
//!
//! Stores a `String` and a character-offset cursor. Used by the masked
//! secret prompt, where the terminal echoes `*` instead of the content.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press means for the prompt reading this line.
#[derive(Debug, PartialEq, Eq)]
pub enum LineAction {
    /// Keep reading.
    Continue,
    /// Enter pressed.
    Submit,
    /// Ctrl+C / Ctrl+D / Esc.
    Abort,
}

/// A single-line text buffer with cursor position (character offset).
#[derive(Debug, Default)]
pub struct InputLine {
    content: String,
    /// Cursor position as a character offset (0 = before first char).
    cursor: usize,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of characters, for masked echo.
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Clear content and reset cursor.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Extract content, clearing the buffer.
    pub fn take(&mut self) -> String {
        let text = std::mem::take(&mut self.content);
        self.cursor = 0;
        text
    }

    /// Insert a character at the cursor position.
    /// Bare `\r` is silently dropped — only physical Enter submits.
    pub fn insert_char(&mut self, ch: char) {
        if ch == '\r' || ch == '\n' {
            return;
        }
        let byte_offset = self.byte_offset();
        self.content.insert(byte_offset, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor (Backspace).
    pub fn delete_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let byte_offset = self.byte_offset();
        if let Some(ch) = self.content[byte_offset..].chars().next() {
            self.content
                .replace_range(byte_offset..byte_offset + ch.len_utf8(), "");
        }
    }

    /// Move cursor one character left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor one character right.
    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    /// Apply a key event to the buffer.
    pub fn handle_key(&mut self, key: KeyEvent) -> LineAction {
        if key.kind == KeyEventKind::Release {
            return LineAction::Continue;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => LineAction::Submit,
            KeyCode::Esc => LineAction::Abort,
            KeyCode::Char('c') | KeyCode::Char('d') if ctrl => LineAction::Abort,
            KeyCode::Char('u') if ctrl => {
                self.clear();
                LineAction::Continue
            }
            KeyCode::Char(ch) => {
                self.insert_char(ch);
                LineAction::Continue
            }
            KeyCode::Backspace => {
                self.delete_back();
                LineAction::Continue
            }
            KeyCode::Left => {
                self.move_left();
                LineAction::Continue
            }
            KeyCode::Right => {
                self.move_right();
                LineAction::Continue
            }
            _ => LineAction::Continue,
        }
    }

    fn byte_offset(&self) -> usize {
        self.content
            .char_indices()
            .nth(self.cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.content.len())
    }
}
