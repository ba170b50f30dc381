//! String derivations shared by the models: slugs, tag lists, excerpts and
//! the human-readable price/dimension strings.

use once_cell::sync::Lazy;
use regex::Regex;

/// Slugs are stored in 200-char columns; leave room for a `-NNN` suffix.
const SLUG_BASE_MAX: usize = 190;

/// Longest excerpt body before the trailing ellipsis.
const EXCERPT_MAX: usize = 500;
const EXCERPT_CUT: usize = 497;

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag regex"));

/// Lowercase, ASCII-transliterated, dash-separated slug of `source`.
///
/// Falls back to `fallback` when nothing URL-safe survives (e.g. a title
/// made only of punctuation).
pub fn slug_base(source: &str, fallback: &str) -> String {
    let mut slug = slug::slugify(source);
    if slug.len() > SLUG_BASE_MAX {
        // slugify output is pure ASCII, byte truncation is safe
        slug.truncate(SLUG_BASE_MAX);
        while slug.ends_with('-') {
            slug.pop();
        }
    }
    if slug.is_empty() {
        fallback.to_string()
    } else {
        slug
    }
}

pub fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn strip_tags(html: &str) -> String {
    TAG_RE.replace_all(html, "").into_owned()
}

/// Plain-text summary of rich `content`, cut on a word boundary.
pub fn generate_excerpt(content: &str) -> String {
    let plain = strip_tags(content);
    let plain = plain.trim();
    let mut chars: Vec<char> = plain.chars().take(EXCERPT_MAX).collect();

    if chars.len() > EXCERPT_CUT {
        match chars.iter().rposition(|c| *c == ' ') {
            Some(pos) => chars.truncate(pos),
            None => chars.truncate(EXCERPT_CUT),
        }
    }

    let mut excerpt: String = chars.into_iter().collect();
    excerpt.push_str("...");
    excerpt
}

pub fn price_display(sold: bool, price: Option<i64>) -> String {
    if sold {
        return "Нет в наличии".to_string();
    }
    match price {
        Some(p) if p != 0 => format!("{} руб.", group_thousands(p)),
        _ => "Цена по запросу".to_string(),
    }
}

pub fn dimensions_display(width_cm: i32, height_cm: i32) -> String {
    format!("{}×{} см", width_cm, height_cm)
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_base_transliterates_and_normalizes() {
        assert_eq!(slug_base("Sunset", "artwork"), "sunset");
        assert_eq!(slug_base("  Morning   Sea! ", "artwork"), "morning-sea");
        assert_eq!(slug_base("Закат", "artwork"), "zakat");
    }

    #[test]
    fn slug_base_falls_back_when_empty() {
        assert_eq!(slug_base("!!!", "post"), "post");
        assert_eq!(slug_base("", "collection"), "collection");
    }

    #[test]
    fn slug_base_is_bounded() {
        let long = "word ".repeat(100);
        let slug = slug_base(&long, "artwork");
        assert!(slug.len() <= SLUG_BASE_MAX);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn tags_are_trimmed_and_empty_entries_dropped() {
        assert_eq!(split_tags("пейзаж, море ,лето"), vec!["пейзаж", "море", "лето"]);
        assert_eq!(split_tags("a,,b,"), vec!["a", "b"]);
        assert!(split_tags("").is_empty());
    }

    #[test]
    fn excerpt_strips_markup() {
        assert_eq!(generate_excerpt("<p>Hello <b>world</b></p>"), "Hello world...");
    }

    #[test]
    fn long_excerpt_is_cut_on_word_boundary() {
        let content = format!("<p>{}</p>", "слово ".repeat(200));
        let excerpt = generate_excerpt(&content);
        let body = excerpt.strip_suffix("...").unwrap();
        assert!(body.chars().count() <= EXCERPT_CUT);
        assert!(body.ends_with("слово"));
    }

    #[test]
    fn long_excerpt_without_spaces_is_hard_cut() {
        let content = "x".repeat(800);
        let excerpt = generate_excerpt(&content);
        assert_eq!(excerpt.chars().count(), EXCERPT_CUT + 3);
    }

    #[test]
    fn price_display_variants() {
        assert_eq!(price_display(false, Some(125000)), "125 000 руб.");
        assert_eq!(price_display(false, Some(900)), "900 руб.");
        assert_eq!(price_display(false, None), "Цена по запросу");
        assert_eq!(price_display(false, Some(0)), "Цена по запросу");
        assert_eq!(price_display(true, Some(125000)), "Нет в наличии");
    }

    #[test]
    fn dimensions_use_multiplication_sign() {
        assert_eq!(dimensions_display(30, 40), "30×40 см");
    }
}
