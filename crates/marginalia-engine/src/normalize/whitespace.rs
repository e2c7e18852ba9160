use super::{ContentNormalizer, Normalized};

/// Removes every whitespace character.
///
/// Word boundaries in the rendered stream are carried by space events, which
/// contribute nothing to the projection, so selections are compared with all
/// whitespace stripped.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceNormalizer;

impl ContentNormalizer for WhitespaceNormalizer {
    fn normalize(&self, text: &str) -> Normalized {
        let mut kept = Vec::new();
        let mut run_start = None;

        for (offset, ch) in text.char_indices() {
            match (ch.is_whitespace(), run_start) {
                (true, Some(start)) => {
                    kept.push(start..offset);
                    run_start = None;
                }
                (false, None) => run_start = Some(offset),
                _ => {}
            }
        }
        if let Some(start) = run_start {
            kept.push(start..text.len());
        }

        Normalized::from_kept_ranges(text, kept)
    }
}
