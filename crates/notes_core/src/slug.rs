//! Slug derivation and validation.
//!
//! # Responsibility
//! - Derive URL-safe slugs from note titles, transliterating Cyrillic text
//!   with the phonetic scheme popularised by `pytils`.
//! - Validate explicitly supplied slugs.
//!
//! # Invariants
//! - `slugify` is deterministic: equal titles always produce equal slugs.
//! - Generated slugs only contain ASCII letters, digits, `-` and `_`.

use crate::model::note::SLUG_MAX_CHARS;
use once_cell::sync::Lazy;
use regex::Regex;

static AMPERSAND_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"&amp;|&").expect("valid ampersand regex"));
static SEPARATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s]+").expect("valid separator regex"));
static NON_WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("valid non-word regex"));

/// Transliterates one lowercase character.
///
/// Hard and soft signs map to the empty string; characters outside the table
/// return `None`.
fn transliterate_lower(ch: char) -> Option<&'static str> {
    let mapped = match ch {
        'а' => "a",
        'б' => "b",
        'в' => "v",
        'г' => "g",
        'д' => "d",
        'е' => "e",
        'ё' => "yo",
        'ж' => "zh",
        'з' => "z",
        'и' => "i",
        'й' => "j",
        'к' => "k",
        'л' => "l",
        'м' => "m",
        'н' => "n",
        'о' => "o",
        'п' => "p",
        'р' => "r",
        'с' => "s",
        'т' => "t",
        'у' => "u",
        'ф' => "f",
        'х' => "h",
        'ц' => "ts",
        'ч' => "ch",
        'ш' => "sh",
        'щ' => "sch",
        'ъ' | 'ь' => "",
        'ы' => "y",
        'э' => "e",
        'ю' => "yu",
        'я' => "ya",
        // Ukrainian
        'є' => "ye",
        'і' => "i",
        'ї' => "yi",
        'ґ' => "g",
        // typography
        '–' | '—' | '‒' | '−' => "-",
        '…' => "...",
        '№' => "#",
        _ => return None,
    };
    Some(mapped)
}

fn has_transliteration(ch: char) -> bool {
    if transliterate_lower(ch).is_some() {
        return true;
    }
    let mut lowered = ch.to_lowercase();
    match (lowered.next(), lowered.next()) {
        (Some(lower), None) if lower != ch => transliterate_lower(lower).is_some(),
        _ => false,
    }
}

/// Transliterates Cyrillic characters to Latin, leaving everything else as is.
///
/// Uppercase letters map to a capitalised replacement (`Ж` -> `Zh`).
pub fn transliterate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        if let Some(mapped) = transliterate_lower(ch) {
            out.push_str(mapped);
            continue;
        }

        let mut lowered = ch.to_lowercase();
        let mapped = match (lowered.next(), lowered.next()) {
            (Some(lower), None) if lower != ch => transliterate_lower(lower),
            _ => None,
        };
        match mapped {
            Some(mapped) => {
                let mut letters = mapped.chars();
                if let Some(first) = letters.next() {
                    out.extend(first.to_uppercase());
                    out.push_str(letters.as_str());
                }
            }
            None => out.push(ch),
        }
    }
    out
}

/// Builds a slug from arbitrary text.
///
/// Steps: lowercase, `&` to ` and `, collapse whitespace/hyphen runs into one
/// `-`, drop characters that are neither ASCII word characters nor
/// transliterable, transliterate, strip leftover punctuation.
pub fn slugify(input: &str) -> String {
    let lowered = input.to_lowercase();
    let with_and = AMPERSAND_RE.replace_all(&lowered, " and ");
    let separated = SEPARATOR_RE.replace_all(&with_and, "-");
    let kept: String = separated
        .chars()
        .filter(|ch| {
            ch.is_ascii_lowercase()
                || ch.is_ascii_digit()
                || *ch == '-'
                || *ch == '_'
                || has_transliteration(*ch)
        })
        .collect();
    let latin = transliterate(&kept);
    NON_WORD_RE
        .replace_all(&latin, "")
        .trim()
        .to_lowercase()
}

/// Slug used for a note whose author did not supply one.
///
/// Truncated to [`SLUG_MAX_CHARS`]; may be empty when the title has no
/// sluggable characters.
pub fn slug_for_title(title: &str) -> String {
    slugify(title).chars().take(SLUG_MAX_CHARS).collect()
}

/// Returns whether `value` is an acceptable explicit slug.
///
/// Accepts one or more ASCII letters, digits, `-` or `_`.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::{is_valid_slug, slug_for_title, slugify, transliterate};

    #[test]
    fn slugify_transliterates_russian_title() {
        assert_eq!(slugify("Заголовок"), "zagolovok");
        assert_eq!(slugify("Пора сажать цветочки"), "pora-sazhat-tsvetochki");
    }

    #[test]
    fn slugify_keeps_digits_and_joins_words_with_hyphen() {
        assert_eq!(slugify("Заметка 1"), "zametka-1");
        assert_eq!(slugify("Hello,   World!"), "hello-world");
    }

    #[test]
    fn slugify_drops_hard_and_soft_signs() {
        assert_eq!(slugify("Объявление"), "obyavlenie");
        assert_eq!(slugify("Тетрадь"), "tetrad");
    }

    #[test]
    fn slugify_spells_out_ampersand() {
        assert_eq!(slugify("Щука & Ёж"), "schuka-and-yozh");
    }

    #[test]
    fn slugify_is_deterministic() {
        let title = "Обновлённый заголовок";
        assert_eq!(slugify(title), slugify(title));
    }

    #[test]
    fn slugify_of_punctuation_only_is_empty() {
        assert_eq!(slugify("?!"), "");
    }

    #[test]
    fn slug_for_title_truncates_to_limit() {
        let title = "я".repeat(80);
        let slug = slug_for_title(&title);
        assert_eq!(slug.chars().count(), 100);
        assert!(slug.starts_with("yaya"));
    }

    #[test]
    fn transliterate_capitalises_uppercase_letters() {
        assert_eq!(transliterate("Жук и Щётка"), "Zhuk i Schyotka");
    }

    #[test]
    fn valid_slug_accepts_word_characters_and_hyphens() {
        assert!(is_valid_slug("note-slug"));
        assert!(is_valid_slug("new_logic"));
        assert!(is_valid_slug("Zametka_1"));
        assert!(!is_valid_slug(""));
        assert!(!is_valid_slug("has space"));
        assert!(!is_valid_slug("заметка"));
    }
}
