use thiserror::Error;

use crate::annotation::AnnotationId;
use crate::events::EventRef;

/// Why an annotation could not be placed on the current document.
///
/// These are expected outcomes: the annotation is skipped and the rest of
/// the pass continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Unlocatable {
    #[error("selection context is empty after normalization")]
    EmptyContext,

    #[error("selection context not found in document text")]
    ContextNotFound,

    #[error("selection is empty after normalization")]
    EmptySelection,

    #[error("selection not found inside its context")]
    SelectionNotInContext,

    #[error("no event covers projection offset {offset}")]
    NoCoveringEvent { offset: usize },
}

/// Broken coordination between the locate and replay passes.
///
/// Every variant points at a defect, never at bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    #[error(
        "document {document}: annotation {annotation} ends at {event} offset {offset} but was never opened"
    )]
    UnopenedAnnotation {
        document: String,
        annotation: AnnotationId,
        event: EventRef,
        offset: usize,
    },

    #[error(
        "document {document}: bookmark for annotation {annotation} at {event} offset {offset} references an event absent from the replayed stream"
    )]
    OrphanBookmark {
        document: String,
        annotation: AnnotationId,
        event: EventRef,
        offset: usize,
    },

    #[error(
        "document {document}: bookmark at {event} offset {offset} refers to annotation #{annotation}, but only {available} annotations were given"
    )]
    UnknownAnnotation {
        document: String,
        annotation: usize,
        available: usize,
        event: EventRef,
        offset: usize,
    },

    #[error("document {document}: annotations still open at end of document: {annotations:?}")]
    UnclosedAnnotations {
        document: String,
        annotations: Vec<AnnotationId>,
    },
}
