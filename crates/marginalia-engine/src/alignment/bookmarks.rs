use std::collections::{BTreeMap, HashMap};

use crate::events::EventRef;

/// Whether an annotation starts or ends at a bookmark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnnotationEventKind {
    Start,
    End,
}

/// Start or end of the annotation at `annotation` in the slice of the pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnnotationEvent {
    pub kind: AnnotationEventKind,
    pub annotation: usize,
}

impl AnnotationEvent {
    pub fn start(annotation: usize) -> Self {
        Self {
            kind: AnnotationEventKind::Start,
            annotation,
        }
    }

    pub fn end(annotation: usize) -> Self {
        Self {
            kind: AnnotationEventKind::End,
            annotation,
        }
    }
}

/// Annotation events of one render event, ordered by intra-event offset
pub type EventBookmarks = BTreeMap<usize, Vec<AnnotationEvent>>;

/// Where each located annotation starts and ends in the event stream.
///
/// Built once by the locator and drained by the overlay renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkTable {
    events: HashMap<EventRef, EventBookmarks>,
}

impl BookmarkTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, event: EventRef, offset: usize, annotation_event: AnnotationEvent) {
        self.events
            .entry(event)
            .or_default()
            .entry(offset)
            .or_default()
            .push(annotation_event);
    }

    pub fn get(&self, event: &EventRef) -> Option<&EventBookmarks> {
        self.events.get(event)
    }

    /// Remove and return the bookmarks of `event`
    pub fn take(&mut self, event: &EventRef) -> Option<EventBookmarks> {
        self.events.remove(event)
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Number of events carrying at least one bookmark
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// All remaining bookmarks as `(event, offset, annotation event)`, sorted by event
    pub fn entries(&self) -> Vec<(EventRef, usize, AnnotationEvent)> {
        let mut entries: Vec<_> = self
            .events
            .iter()
            .flat_map(|(event, offsets)| {
                offsets.iter().flat_map(move |(offset, annotation_events)| {
                    annotation_events
                        .iter()
                        .map(move |annotation_event| (*event, *offset, *annotation_event))
                })
            })
            .collect();
        entries.sort_by_key(|(event, offset, _)| (*event, *offset));
        entries
    }
}

/// Annotation events of one kind, in offset order then insertion order
pub fn of_kind(
    bookmarks: &EventBookmarks,
    kind: AnnotationEventKind,
) -> impl Iterator<Item = (usize, usize)> + '_ {
    bookmarks.iter().flat_map(move |(offset, annotation_events)| {
        annotation_events
            .iter()
            .filter(move |annotation_event| annotation_event.kind == kind)
            .map(move |annotation_event| (*offset, annotation_event.annotation))
    })
}
