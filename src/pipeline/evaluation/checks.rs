use crate::pipeline::text_rules::{char_len, emoji_count, has_cta, shouting_word_count, MAX_PUSH_CHARS};

/// Highest emoji count a text may carry and still pass.
pub const MAX_EMOJI: usize = 1;

/// Independent copy-rule predicates for one push text, with the raw values
/// they were derived from kept for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordChecks {
    pub length: usize,
    pub emoji_count: usize,
    pub len_ok: bool,
    pub cta_ok: bool,
    pub caps_ok: bool,
    pub emoji_ok: bool,
    pub not_empty: bool,
}

impl RecordChecks {
    pub fn inspect(text: &str) -> Self {
        let length = char_len(text);
        let emoji_count = emoji_count(text);
        Self {
            length,
            emoji_count,
            len_ok: length <= MAX_PUSH_CHARS,
            cta_ok: has_cta(text),
            caps_ok: shouting_word_count(text) <= 1,
            emoji_ok: emoji_count <= MAX_EMOJI,
            not_empty: !text.trim().is_empty(),
        }
    }

    pub fn passed(&self) -> bool {
        self.len_ok && self.cta_ok && self.caps_ok && self.emoji_ok && self.not_empty
    }
}
