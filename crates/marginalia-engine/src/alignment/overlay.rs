use crate::annotation::Annotation;
use crate::events::{EventCounters, EventKind, EventRef, LinkTracker, RenderEvent};
use crate::render::AnnotationListener;

use super::bookmarks::{AnnotationEventKind, BookmarkTable, EventBookmarks, of_kind};
use super::error::OverlayError;

/// Replays a recorded stream to a downstream renderer, interleaving
/// annotation markers.
///
/// Markers only ever wrap text: every structural boundary closes the markers
/// of all open annotations, and the next text event reopens them. Ending an
/// annotation that has others opened after it closes those first and reopens
/// them afterwards, so the emitted markers always nest even when the
/// annotated ranges overlap.
pub struct OverlayRenderer<'a, L: ?Sized> {
    document: String,
    annotations: &'a [Annotation],
    bookmarks: BookmarkTable,
    listener: &'a mut L,
    counters: EventCounters,
    links: LinkTracker,
    /// Whether the markers of `open_annotations` are currently in the output
    open: bool,
    /// Annotations begun but not yet ended, in the order they began
    open_annotations: Vec<usize>,
}

impl<'a, L: AnnotationListener + ?Sized> OverlayRenderer<'a, L> {
    pub fn new(
        document: impl Into<String>,
        annotations: &'a [Annotation],
        bookmarks: BookmarkTable,
        listener: &'a mut L,
    ) -> Self {
        Self {
            document: document.into(),
            annotations,
            bookmarks,
            listener,
            counters: EventCounters::new(),
            links: LinkTracker::new(),
            open: false,
            open_annotations: Vec::new(),
        }
    }

    /// Replay `events` in order, then check that every bookmark was consumed
    /// and every annotation closed.
    ///
    /// Bookmarks must index into the annotations given to [`Self::new`];
    /// a stray index fails before anything is forwarded.
    pub fn replay(mut self, events: &[RenderEvent]) -> Result<(), OverlayError> {
        let available = self.annotations.len();
        if let Some((event, offset, annotation_event)) = self
            .bookmarks
            .entries()
            .into_iter()
            .find(|(_, _, annotation_event)| annotation_event.annotation >= available)
        {
            return Err(OverlayError::UnknownAnnotation {
                document: self.document,
                annotation: annotation_event.annotation,
                available,
                event,
                offset,
            });
        }

        for event in events {
            self.on_event(event)?;
        }
        self.finish()
    }

    fn on_event(&mut self, event: &RenderEvent) -> Result<(), OverlayError> {
        let link_end = self.links.observe(event);

        if event.is_boundary() {
            self.close_all();
            self.listener.on_event(event);
            return Ok(());
        }

        match event {
            RenderEvent::EndLink { .. } if link_end == Some(true) => {
                // The generated label is the only text of an empty link:
                // markers wrap it and close before the link does.
                let reference = self.next_reference(EventKind::LinkLabel);
                let bookmarks = self.bookmarks.take(&reference);
                self.begin_annotations(bookmarks.as_ref());
                self.open_all();
                self.listener.on_event(event);
                self.close_all();
                self.end_annotations(reference, bookmarks.as_ref())
            }
            RenderEvent::EndLink { .. } => {
                self.close_all();
                self.listener.on_event(event);
                Ok(())
            }
            RenderEvent::Space => {
                self.open_all();
                self.listener.on_event(event);
                Ok(())
            }
            _ => match event.text_kind() {
                Some(kind) => {
                    let reference = self.next_reference(kind);
                    let bookmarks = self.bookmarks.take(&reference);
                    self.begin_annotations(bookmarks.as_ref());
                    self.open_all();
                    self.listener.on_event(event);
                    self.end_annotations(reference, bookmarks.as_ref())
                }
                None => {
                    self.listener.on_event(event);
                    Ok(())
                }
            },
        }
    }

    fn finish(mut self) -> Result<(), OverlayError> {
        self.close_all();

        if let Some((event, offset, annotation_event)) = self.bookmarks.entries().into_iter().next()
        {
            return Err(OverlayError::OrphanBookmark {
                document: self.document,
                annotation: self.annotations[annotation_event.annotation].id.clone(),
                event,
                offset,
            });
        }

        if !self.open_annotations.is_empty() {
            return Err(OverlayError::UnclosedAnnotations {
                document: self.document,
                annotations: self
                    .open_annotations
                    .iter()
                    .map(|&index| self.annotations[index].id.clone())
                    .collect(),
            });
        }

        Ok(())
    }

    fn next_reference(&mut self, kind: EventKind) -> EventRef {
        let (reference, counters) = self.counters.advance(kind);
        self.counters = counters;
        reference
    }

    fn begin_annotations(&mut self, bookmarks: Option<&EventBookmarks>) {
        let Some(bookmarks) = bookmarks else {
            return;
        };
        for (_, index) in of_kind(bookmarks, AnnotationEventKind::Start) {
            self.open_annotations.push(index);
            if self.open {
                self.print_start_marker(index);
            }
        }
    }

    fn end_annotations(
        &mut self,
        reference: EventRef,
        bookmarks: Option<&EventBookmarks>,
    ) -> Result<(), OverlayError> {
        let Some(bookmarks) = bookmarks else {
            return Ok(());
        };
        for (offset, index) in of_kind(bookmarks, AnnotationEventKind::End) {
            self.end_annotation(index, reference, offset)?;
        }
        Ok(())
    }

    fn end_annotation(
        &mut self,
        index: usize,
        reference: EventRef,
        offset: usize,
    ) -> Result<(), OverlayError> {
        let Some(position) = self.open_annotations.iter().position(|&open| open == index) else {
            return Err(OverlayError::UnopenedAnnotation {
                document: self.document.clone(),
                annotation: self.annotations[index].id.clone(),
                event: reference,
                offset,
            });
        };

        if self.open {
            let after: Vec<usize> = self.open_annotations[position + 1..].to_vec();
            for &later in after.iter().rev() {
                self.print_end_marker(later);
            }
            self.print_end_marker(index);
            for &later in &after {
                self.print_start_marker(later);
            }
        }
        self.open_annotations.remove(position);
        Ok(())
    }

    fn open_all(&mut self) {
        if self.open {
            return;
        }
        for i in 0..self.open_annotations.len() {
            self.print_start_marker(self.open_annotations[i]);
        }
        self.open = true;
    }

    fn close_all(&mut self) {
        if !self.open {
            return;
        }
        for i in (0..self.open_annotations.len()).rev() {
            self.print_end_marker(self.open_annotations[i]);
        }
        self.open = false;
    }

    fn print_start_marker(&mut self, index: usize) {
        let annotation = &self.annotations[index];
        log::trace!("begin marker for annotation {}", annotation.id);
        self.listener.begin_annotation_marker(annotation);
    }

    fn print_end_marker(&mut self, index: usize) {
        let annotation = &self.annotations[index];
        log::trace!("end marker for annotation {}", annotation.id);
        self.listener.end_annotation_marker(annotation);
    }
}
