//! Copy rules enforced by the push generator and checked by the evaluator.

/// Upper bound on push length, in characters.
pub const MAX_PUSH_CHARS: usize = 200;

/// Call-to-action stems, matched case-insensitively as substrings.
pub const CTA_KEYWORDS: [&str; 5] = ["оформ", "посмотр", "узна", "открыт", "открыть"];

/// Appended when a text carries no call to action.
pub const DEFAULT_CTA: &str = "Посмотреть.";

pub const ELLIPSIS: char = '…';

const EMOJI_RANGES: [(u32, u32); 4] = [
    (0x1F300, 0x1F5FF),
    (0x1F600, 0x1F64F),
    (0x1F680, 0x1F6FF),
    (0x1F900, 0x1F9FF),
];

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn is_emoji(c: char) -> bool {
    let code = c as u32;
    EMOJI_RANGES
        .iter()
        .any(|(start, end)| (*start..=*end).contains(&code))
}

pub fn emoji_count(text: &str) -> usize {
    text.chars().filter(|c| is_emoji(*c)).count()
}

pub fn has_cta(text: &str) -> bool {
    let lowered = text.to_lowercase();
    CTA_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

pub fn exclamation_count(text: &str) -> usize {
    text.chars().filter(|c| *c == '!').count()
}

/// A whitespace-delimited token made only of letters, with at least one
/// uppercase letter and no lowercase ones.
pub fn is_shouting(token: &str) -> bool {
    !token.is_empty()
        && token.chars().all(char::is_alphabetic)
        && token.chars().any(char::is_uppercase)
        && !token.chars().any(char::is_lowercase)
}

pub fn shouting_word_count(text: &str) -> usize {
    text.split_whitespace()
        .filter(|token| is_shouting(token))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_cta_case_insensitively() {
        assert!(has_cta("Нажмите и ОФОРМИТЕ карту"));
        assert!(has_cta("Узнать больше"));
        assert!(!has_cta("Просто текст."));
    }

    #[test]
    fn counts_pictographs_only() {
        assert_eq!(emoji_count("Привет 😀🚀 ≈ ₸ —"), 2);
        assert_eq!(emoji_count("🤑"), 1);
        assert_eq!(emoji_count("₸"), 0);
    }

    #[test]
    fn shouting_tokens_are_alphabetic_uppercase() {
        assert_eq!(shouting_word_count("СРОЧНО купите КАРТУ"), 2);
        assert_eq!(shouting_word_count("FX/переводы ATM, Карта"), 0);
        assert_eq!(shouting_word_count("Я и Ты"), 1);
    }
}
