//! Context stream
//!
//! The simulated stream of consciousness: an append-only text buffer owned
//! exclusively by the worker. The whole session stays in memory; only a
//! bounded tail is ever handed to the model. The buffer therefore grows for
//! the life of the process — the display surfaces its size so the growth is
//! visible rather than hidden.

/// Separator written between appended fragments.
const SEPARATOR: &str = "\n\n";

#[derive(Debug, Default)]
pub struct ThoughtStream {
    text: String,
}

impl ThoughtStream {
    pub fn new() -> Self {
        Self { text: String::new() }
    }

    /// Unconditional concatenation, separator first when non-empty.
    pub fn append(&mut self, fragment: &str) {
        if !self.text.is_empty() {
            self.text.push_str(SEPARATOR);
        }
        self.text.push_str(fragment);
    }

    /// Suffix of at most `max_chars` characters. A raw character cut: it
    /// may begin mid-word, and the only adjustment is staying on a UTF-8
    /// character boundary.
    pub fn tail(&self, max_chars: usize) -> &str {
        tail_chars(&self.text, max_chars)
    }

    /// Characters accumulated this session.
    pub fn chars(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Last `max_chars` characters of `s`.
pub fn tail_chars(s: &str, max_chars: usize) -> &str {
    let total = s.chars().count();
    if total <= max_chars {
        return s;
    }
    let skip = total - max_chars;
    match s.char_indices().nth(skip) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}
