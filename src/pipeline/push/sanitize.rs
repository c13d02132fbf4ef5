use crate::pipeline::text_rules::{
    char_len, exclamation_count, has_cta, is_emoji, is_shouting, DEFAULT_CTA, ELLIPSIS,
    MAX_PUSH_CHARS,
};
use regex::{Captures, Regex};
use std::sync::OnceLock;

fn caps_word() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b[A-ZА-ЯЁ]{2,}\b").expect("caps pattern compiles"))
}

fn token() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\S+").expect("token pattern compiles"))
}

/// Brings rendered text within the copy rules. Steps run in a fixed order,
/// each feeding the next:
///
/// 1. all-caps words of two or more letters become title case, and any
///    remaining fully-uppercase token after the first is lower-cased;
/// 2. pictographic emoji are removed;
/// 3. more than one `!` turns every `!` into `.`;
/// 4. text over the length limit is cut at a word boundary with `…`;
/// 5. a default call to action is appended when none is present, shortening
///    the body further if needed to stay within the limit;
/// 6. surrounding whitespace is trimmed.
pub fn sanitize(text: &str) -> String {
    let text = collapse_shouting(text);
    let stripped = strip_emoji(&text);
    // removing a pictograph can glue letters into a new uppercase token
    let text = if stripped.len() == text.len() {
        stripped
    } else {
        collapse_shouting(&stripped)
    };
    let text = neutralize_exclamations(text);
    let text = truncate_at_word(&text, MAX_PUSH_CHARS);
    let text = ensure_cta(text);
    text.trim().to_string()
}

fn collapse_shouting(text: &str) -> String {
    let titled = caps_word().replace_all(text, |caps: &Captures<'_>| title_case(&caps[0]));

    let mut kept = 0usize;
    token()
        .replace_all(&titled, |caps: &Captures<'_>| {
            let word = &caps[0];
            if is_shouting(word) {
                kept += 1;
                if kept > 1 {
                    return word.to_lowercase();
                }
            }
            word.to_string()
        })
        .into_owned()
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn strip_emoji(text: &str) -> String {
    text.chars().filter(|c| !is_emoji(*c)).collect()
}

fn neutralize_exclamations(text: String) -> String {
    if exclamation_count(&text) > 1 {
        text.replace('!', ".")
    } else {
        text
    }
}

/// Cuts text longer than `max_chars` to `max_chars - 3` characters, backs off
/// to the last whitespace so no word is split, and appends an ellipsis.
fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if char_len(text) <= max_chars {
        return text.to_string();
    }
    let prefix: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    let body = match prefix.rfind(char::is_whitespace) {
        Some(index) => prefix[..index].trim_end(),
        None => prefix.as_str(),
    };
    format!("{body}{ELLIPSIS}")
}

fn ensure_cta(text: String) -> String {
    if has_cta(&text) {
        return text;
    }

    let body = text.trim_end().trim_end_matches('.').trim_end();
    if body.is_empty() {
        return DEFAULT_CTA.to_string();
    }

    let separator = ". ";
    let budget = MAX_PUSH_CHARS - char_len(separator) - char_len(DEFAULT_CTA);
    let body = truncate_at_word(body, budget);
    format!("{body}{separator}{DEFAULT_CTA}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::text_rules::{emoji_count, shouting_word_count};

    #[test]
    fn collapses_all_caps_words_to_title_case() {
        assert_eq!(
            sanitize("СРОЧНО оформите КАРТУ TODAY"),
            "Срочно оформите Карту Today"
        );
    }

    #[test]
    fn leaves_at_most_one_shouting_token() {
        let text = sanitize("Я и Я и Я. Посмотреть.");
        assert_eq!(shouting_word_count(&text), 1);
        assert_eq!(text, "Я и я и Я. Посмотреть.");
    }

    #[test]
    fn strips_emoji() {
        assert_eq!(sanitize("Оформить 🚀 карту 😀"), "Оформить  карту");
    }

    #[test]
    fn multiple_exclamations_become_periods() {
        assert_eq!(sanitize("Успейте! Оформить!"), "Успейте. Оформить.");
        assert_eq!(sanitize("Оформить!"), "Оформить!");
    }

    #[test]
    fn long_text_is_cut_at_word_boundary() {
        let long = format!("Оформить {}", "слово ".repeat(60));
        let text = sanitize(&long);
        assert!(char_len(&text) <= MAX_PUSH_CHARS);
        assert!(text.ends_with(ELLIPSIS));
        let without_ellipsis = text.trim_end_matches(ELLIPSIS);
        assert!(without_ellipsis.ends_with("слово"));
    }

    #[test]
    fn appends_default_cta_when_missing() {
        assert_eq!(sanitize("Новая карта."), "Новая карта. Посмотреть.");
        assert_eq!(sanitize(""), "Посмотреть.");
    }

    #[test]
    fn appended_cta_never_breaks_the_length_limit() {
        let long = "текст ".repeat(60);
        let text = sanitize(&long);
        assert!(char_len(&text) <= MAX_PUSH_CHARS, "{} chars", char_len(&text));
        assert!(has_cta(&text));
        assert!(text.ends_with(DEFAULT_CTA));
    }

    #[test]
    fn output_satisfies_every_rule() {
        let raw = format!(
            "АЛИЯ, ВНИМАНИЕ!!! 🎉🎉 {} СУПЕР ПРЕДЛОЖЕНИЕ!",
            "очень ".repeat(40)
        );
        let text = sanitize(&raw);
        assert!(char_len(&text) <= MAX_PUSH_CHARS);
        assert!(exclamation_count(&text) <= 1);
        assert_eq!(emoji_count(&text), 0);
        assert!(has_cta(&text));
        assert!(shouting_word_count(&text) <= 1);
    }

    #[test]
    fn letters_joined_by_emoji_removal_are_normalized() {
        let text = sanitize("Я😀Я и Б😀Б. Узнать.");
        assert_eq!(shouting_word_count(&text), 0);
        assert_eq!(text, "Яя и Бб. Узнать.");
    }

    #[test]
    fn sanitize_is_idempotent() {
        let raw = "АЛИЯ, у вас ЕСТЬ предложение!! 😀";
        let once = sanitize(raw);
        assert_eq!(sanitize(&once), once);
    }
}
