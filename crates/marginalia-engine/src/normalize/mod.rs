//! # Content normalization
//!
//! Annotation selections are captured from rendered output, where whitespace
//! and markup rarely survive intact. Before any text is compared it goes
//! through a [`ContentNormalizer`], which produces a canonical form plus an
//! [`Alteration`] describing how to walk offsets in the canonical form back
//! to offsets in the original fragment.
//!
//! Offsets are UTF-8 byte offsets on both sides.

mod markup;
mod whitespace;

use std::ops::Range;

pub use markup::MarkupNormalizer;
pub use whitespace::WhitespaceNormalizer;

/// Canonicalizes text fragments before they are compared.
pub trait ContentNormalizer {
    fn normalize(&self, text: &str) -> Normalized;
}

impl<T: ContentNormalizer + ?Sized> ContentNormalizer for &T {
    fn normalize(&self, text: &str) -> Normalized {
        (**self).normalize(text)
    }
}

impl<T: ContentNormalizer + ?Sized> ContentNormalizer for Box<T> {
    fn normalize(&self, text: &str) -> Normalized {
        (**self).normalize(text)
    }
}

/// Maps every byte of a normalized string back to the byte it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alteration {
    origins: Vec<usize>,
    original_len: usize,
}

impl Alteration {
    /// Offset in the original text of the byte at `offset` in the normalized text.
    ///
    /// Offsets past the end of the normalized text map to the end of the original.
    pub fn original_offset(&self, offset: usize) -> usize {
        self.origins
            .get(offset)
            .copied()
            .unwrap_or(self.original_len)
    }

    pub fn original_len(&self) -> usize {
        self.original_len
    }

    /// Chain `self` (applied first) with `next` (applied to the output of `self`).
    fn then(&self, next: &Alteration) -> Alteration {
        Alteration {
            origins: next
                .origins
                .iter()
                .map(|&offset| self.original_offset(offset))
                .collect(),
            original_len: self.original_len,
        }
    }
}

/// Result of normalizing one fragment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Normalized {
    pub content: String,
    alteration: Option<Alteration>,
}

impl Normalized {
    pub fn unchanged(text: &str) -> Self {
        Self {
            content: text.to_string(),
            alteration: None,
        }
    }

    /// Build the normalized form from the byte ranges of `text` that survive.
    ///
    /// Ranges must be ascending, non-overlapping and on char boundaries.
    pub fn from_kept_ranges(text: &str, kept: impl IntoIterator<Item = Range<usize>>) -> Self {
        let mut content = String::with_capacity(text.len());
        let mut origins = Vec::with_capacity(text.len());

        for range in kept {
            content.push_str(&text[range.clone()]);
            origins.extend(range);
        }

        if content.len() == text.len() {
            return Self::unchanged(text);
        }

        Self {
            content,
            alteration: Some(Alteration {
                origins,
                original_len: text.len(),
            }),
        }
    }

    pub fn is_altered(&self) -> bool {
        self.alteration.is_some()
    }

    pub fn alteration(&self) -> Option<&Alteration> {
        self.alteration.as_ref()
    }

    pub fn original_offset(&self, offset: usize) -> usize {
        match &self.alteration {
            Some(alteration) => alteration.original_offset(offset),
            None => offset,
        }
    }

    pub fn into_parts(self) -> (String, Option<Alteration>) {
        (self.content, self.alteration)
    }

    /// Normalize the output of `self` again, keeping offsets relative to the
    /// text `self` was produced from.
    fn then(self, next: &dyn ContentNormalizer) -> Normalized {
        let Normalized {
            content: next_content,
            alteration: next_alteration,
        } = next.normalize(&self.content);

        let alteration = match (self.alteration, next_alteration) {
            (None, None) => None,
            (Some(first), None) => Some(first),
            (None, Some(second)) => Some(second),
            (Some(first), Some(second)) => Some(first.then(&second)),
        };

        Normalized {
            content: next_content,
            alteration,
        }
    }
}

/// Applies several normalizers in sequence.
#[derive(Default)]
pub struct NormalizerChain {
    stages: Vec<Box<dyn ContentNormalizer>>,
}

impl NormalizerChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, stage: impl ContentNormalizer + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Markup stripping followed by whitespace removal
    pub fn markup_and_whitespace() -> Self {
        Self::new()
            .with(MarkupNormalizer::new())
            .with(WhitespaceNormalizer)
    }
}

impl ContentNormalizer for NormalizerChain {
    fn normalize(&self, text: &str) -> Normalized {
        self.stages
            .iter()
            .fold(Normalized::unchanged(text), |acc, stage| acc.then(stage.as_ref()))
    }
}
