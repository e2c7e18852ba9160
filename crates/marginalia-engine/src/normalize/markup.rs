use std::sync::OnceLock;

use regex::Regex;

use super::{ContentNormalizer, Normalized};

/// Strips markup tags (`<...>`) so raw HTML fragments compare by their text.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkupNormalizer;

impl MarkupNormalizer {
    pub fn new() -> Self {
        Self
    }
}

fn tag_regex() -> &'static Regex {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    TAG_REGEX.get_or_init(|| Regex::new(r"<[^<>]*>").expect("Invalid tag regex"))
}

impl ContentNormalizer for MarkupNormalizer {
    fn normalize(&self, text: &str) -> Normalized {
        let mut kept = Vec::new();
        let mut cursor = 0;

        for tag in tag_regex().find_iter(text) {
            if tag.start() > cursor {
                kept.push(cursor..tag.start());
            }
            cursor = tag.end();
        }
        if cursor < text.len() {
            kept.push(cursor..text.len());
        }

        Normalized::from_kept_ranges(text, kept)
    }
}
