use crate::annotation::{Annotation, AnnotationId};
use crate::normalize::ContentNormalizer;

use super::bookmarks::{AnnotationEvent, BookmarkTable};
use super::error::Unlocatable;
use super::projection::{EventPosition, Projection};

/// How to choose between several occurrences of an annotation's context
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MatchPolicy {
    /// The first occurrence in the document wins
    #[default]
    FirstOccurrence,
    /// The occurrence closest to the annotation's context offset wins,
    /// earliest on ties
    NearestToHint,
}

/// An annotation placed on the event stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocatedAnnotation {
    /// Index in the annotation slice of the pass
    pub annotation: usize,
    pub start: EventPosition,
    pub end: EventPosition,
    /// Projection offsets of the first and last selected characters
    pub span: (usize, usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnlocatedAnnotation {
    pub annotation: usize,
    pub id: AnnotationId,
    pub reason: Unlocatable,
}

/// Result of the locate pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocateReport {
    pub bookmarks: BookmarkTable,
    pub located: Vec<LocatedAnnotation>,
    pub unlocatable: Vec<UnlocatedAnnotation>,
}

/// Finds annotations in a projection and turns them into bookmarks
pub struct Locator<N> {
    normalizer: N,
    policy: MatchPolicy,
}

impl<N: ContentNormalizer> Locator<N> {
    pub fn new(normalizer: N) -> Self {
        Self {
            normalizer,
            policy: MatchPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Locate every annotation. Failures are collected, never propagated.
    pub fn locate(&self, projection: &Projection, annotations: &[Annotation]) -> LocateReport {
        let mut report = LocateReport::default();

        for (index, annotation) in annotations.iter().enumerate() {
            match self.locate_one(projection, annotation) {
                Ok((start, end, span)) => {
                    report
                        .bookmarks
                        .add(start.event, start.offset, AnnotationEvent::start(index));
                    report
                        .bookmarks
                        .add(end.event, end.offset, AnnotationEvent::end(index));
                    report.located.push(LocatedAnnotation {
                        annotation: index,
                        start,
                        end,
                        span,
                    });
                }
                Err(reason) => {
                    log::warn!("annotation {} not located: {reason}", annotation.id);
                    report.unlocatable.push(UnlocatedAnnotation {
                        annotation: index,
                        id: annotation.id.clone(),
                        reason,
                    });
                }
            }
        }

        log::debug!(
            "located {} of {} annotations on {} events",
            report.located.len(),
            annotations.len(),
            report.bookmarks.len()
        );
        report
    }

    /// Resolve both boundaries of one annotation
    pub fn locate_one(
        &self,
        projection: &Projection,
        annotation: &Annotation,
    ) -> Result<(EventPosition, EventPosition, (usize, usize)), Unlocatable> {
        let context = self
            .normalizer
            .normalize(&annotation.selection_context)
            .content;
        if context.is_empty() {
            return Err(Unlocatable::EmptyContext);
        }
        let context_index = self
            .find_context(projection.text(), &context, annotation.context_offset)
            .ok_or(Unlocatable::ContextNotFound)?;

        let selection = self.normalizer.normalize(&annotation.selection).content;
        let last_char_len = selection
            .chars()
            .next_back()
            .map(char::len_utf8)
            .ok_or(Unlocatable::EmptySelection)?;
        let selection_index = context
            .find(selection.as_str())
            .ok_or(Unlocatable::SelectionNotInContext)?;

        let start = context_index + selection_index;
        let end = start + selection.len() - last_char_len;

        let start_position = projection
            .resolve(start)
            .ok_or(Unlocatable::NoCoveringEvent { offset: start })?;
        let end_position = projection
            .resolve(end)
            .ok_or(Unlocatable::NoCoveringEvent { offset: end })?;

        Ok((start_position, end_position, (start, end)))
    }

    fn find_context(&self, text: &str, context: &str, hint: usize) -> Option<usize> {
        match self.policy {
            MatchPolicy::FirstOccurrence => text.find(context),
            // Occurrences may overlap, so every char boundary is a candidate
            MatchPolicy::NearestToHint => text
                .char_indices()
                .map(|(index, _)| index)
                .filter(|&index| text[index..].starts_with(context))
                .min_by_key(|index| index.abs_diff(hint)),
        }
    }
}
