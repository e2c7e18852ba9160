use std::collections::{BTreeMap, HashMap};

use crate::events::EventRef;
use crate::normalize::Alteration;

/// Span of the projection contributed by one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexEntry {
    pub event: EventRef,
    /// First byte of the span
    pub start: usize,
}

/// A boundary resolved to the event that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventPosition {
    pub event: EventRef,
    /// Offset inside the event's original, unnormalized text
    pub offset: usize,
}

/// Plain-text projection of a rendered document, with the index mapping
/// every byte back to the event that contributed it.
///
/// The index is keyed by the inclusive end offset of each event's span.
/// Keys strictly increase and the spans tile the text with no gaps.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Projection {
    text: String,
    index: BTreeMap<usize, IndexEntry>,
    alterations: HashMap<EventRef, Alteration>,
}

impl Projection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Number of events with a span in the projection
    pub fn indexed_events(&self) -> usize {
        self.index.len()
    }

    /// Append the text contributed by `event`.
    ///
    /// Empty contributions are not indexed: they own no byte of the projection.
    pub fn append(&mut self, event: EventRef, text: &str, alteration: Option<Alteration>) {
        if text.is_empty() {
            return;
        }
        let start = self.text.len();
        self.text.push_str(text);
        self.index
            .insert(self.text.len() - 1, IndexEntry { event, start });
        if let Some(alteration) = alteration {
            self.alterations.insert(event, alteration);
        }
    }

    /// The entry whose span covers `offset`: the smallest end offset `>= offset`
    pub fn covering(&self, offset: usize) -> Option<IndexEntry> {
        self.index
            .range(offset..)
            .next()
            .map(|(_, entry)| *entry)
            .filter(|entry| entry.start <= offset)
    }

    /// Translate a projection offset into a position inside the original text
    /// of the covering event.
    pub fn resolve(&self, offset: usize) -> Option<EventPosition> {
        let entry = self.covering(offset)?;
        let local = offset - entry.start;
        let offset = match self.alterations.get(&entry.event) {
            Some(alteration) => alteration.original_offset(local),
            None => local,
        };
        Some(EventPosition {
            event: entry.event,
            offset,
        })
    }

    pub fn alteration(&self, event: &EventRef) -> Option<&Alteration> {
        self.alterations.get(event)
    }

    /// Iterate over `(span start, inclusive span end, event)` in text order
    pub fn spans(&self) -> impl Iterator<Item = (usize, usize, EventRef)> + '_ {
        self.index
            .iter()
            .map(|(&end, entry)| (entry.start, end, entry.event))
    }
}
