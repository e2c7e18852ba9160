//! # Aligning annotations with a rendered document
//!
//! Annotations are stored as text (a selection plus the context around it),
//! never as positions in the source. Placing them on a rendering happens in
//! three passes over the event stream:
//!
//! 1. **Record** ([`EventRecorder`]): buffer every event and build the
//!    plain-text [`Projection`] of the document, indexed by the event that
//!    contributed each span.
//! 2. **Locate** ([`Locator`]): find each annotation's context and selection
//!    in the projection and turn the two boundaries into bookmarks on the
//!    events that cover them.
//! 3. **Replay** ([`OverlayRenderer`]): feed the buffered events to the
//!    downstream renderer, inserting begin/end markers so that they only wrap
//!    text and always nest properly.
//!
//! Annotations that cannot be placed are reported and skipped. The replay
//! fails only when the passes disagree with each other, which is a defect.

mod bookmarks;
mod error;
mod locator;
mod overlay;
mod projection;
mod recorder;

#[cfg(test)]
mod tests;

pub use bookmarks::{
    AnnotationEvent, AnnotationEventKind, BookmarkTable, EventBookmarks, of_kind,
};
pub use error::{OverlayError, Unlocatable};
pub use locator::{LocateReport, LocatedAnnotation, Locator, MatchPolicy, UnlocatedAnnotation};
pub use overlay::OverlayRenderer;
pub use projection::{EventPosition, IndexEntry, Projection};
pub use recorder::{EventRecorder, RecordedStream};

use crate::annotation::Annotation;
use crate::events::{DefaultLinkLabels, LinkLabelGenerator, RenderEvent};
use crate::normalize::{ContentNormalizer, WhitespaceNormalizer};
use crate::render::AnnotationListener;

/// Runs the three passes with one normalizer and one label generator, so
/// that every pass sees the same projection.
#[derive(Debug, Clone, Default)]
pub struct Aligner<N = WhitespaceNormalizer, G = DefaultLinkLabels> {
    normalizer: N,
    labels: G,
    policy: MatchPolicy,
}

impl Aligner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<N: ContentNormalizer, G: LinkLabelGenerator> Aligner<N, G> {
    pub fn with_normalizer<M: ContentNormalizer>(self, normalizer: M) -> Aligner<M, G> {
        Aligner {
            normalizer,
            labels: self.labels,
            policy: self.policy,
        }
    }

    pub fn with_labels<H: LinkLabelGenerator>(self, labels: H) -> Aligner<N, H> {
        Aligner {
            normalizer: self.normalizer,
            labels,
            policy: self.policy,
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// Collect pass
    pub fn record(&self, events: impl IntoIterator<Item = RenderEvent>) -> RecordedStream {
        let mut recorder = EventRecorder::new(&self.normalizer, &self.labels);
        for event in events {
            recorder.record(event);
        }
        recorder.finish()
    }

    /// Locate pass
    pub fn locate(&self, stream: &RecordedStream, annotations: &[Annotation]) -> LocateReport {
        Locator::new(&self.normalizer)
            .with_policy(self.policy)
            .locate(&stream.projection, annotations)
    }

    /// Replay pass. Drains the bookmarks of `report`, which must come from
    /// [`Self::locate`] over the same `annotations`.
    pub fn replay<L: AnnotationListener + ?Sized>(
        &self,
        document: &str,
        stream: &RecordedStream,
        annotations: &[Annotation],
        report: &mut LocateReport,
        listener: &mut L,
    ) -> Result<(), OverlayError> {
        let bookmarks = std::mem::take(&mut report.bookmarks);
        OverlayRenderer::new(document, annotations, bookmarks, listener).replay(&stream.events)
    }

    /// All three passes over `events`, rendering into `listener`.
    ///
    /// The returned report lists which annotations were placed and why the
    /// others were not. Its bookmark table has been consumed by the replay.
    pub fn align<L: AnnotationListener + ?Sized>(
        &self,
        document: &str,
        events: impl IntoIterator<Item = RenderEvent>,
        annotations: &[Annotation],
        listener: &mut L,
    ) -> Result<LocateReport, OverlayError> {
        let stream = self.record(events);
        let mut report = self.locate(&stream, annotations);
        self.replay(document, &stream, annotations, &mut report, listener)?;
        log::debug!(
            "document {document}: rendered {} annotations, skipped {}",
            report.located.len(),
            report.unlocatable.len()
        );
        Ok(report)
    }
}
