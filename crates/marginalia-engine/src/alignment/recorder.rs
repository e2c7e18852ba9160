use crate::events::{
    EventCounters, EventKind, EventRef, LinkLabelGenerator, LinkTracker, RenderEvent,
};
use crate::normalize::{Alteration, ContentNormalizer};
use crate::render::Listener;

use super::projection::Projection;

/// Output of the collect pass: the buffered events and the frozen projection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedStream {
    pub events: Vec<RenderEvent>,
    pub projection: Projection,
}

/// Text an event adds to the projection
#[derive(Debug, Clone, PartialEq, Eq)]
struct Contribution {
    event: EventRef,
    text: String,
    alteration: Option<Alteration>,
}

/// Buffers a whole event stream and builds its plain-text projection.
pub struct EventRecorder<N, L> {
    normalizer: N,
    labels: L,
    events: Vec<RenderEvent>,
    projection: Projection,
    counters: EventCounters,
    links: LinkTracker,
}

impl<N: ContentNormalizer, L: LinkLabelGenerator> EventRecorder<N, L> {
    pub fn new(normalizer: N, labels: L) -> Self {
        Self {
            normalizer,
            labels,
            events: Vec::new(),
            projection: Projection::new(),
            counters: EventCounters::new(),
            links: LinkTracker::new(),
        }
    }

    pub fn record(&mut self, event: RenderEvent) {
        let empty_link = self.links.observe(&event) == Some(true);
        let (contribution, counters) = self.contribution(self.counters, &event, empty_link);
        self.counters = counters;

        if let Some(contribution) = contribution {
            log::trace!(
                "recorded {} as {:?}",
                contribution.event,
                contribution.text
            );
            self.projection
                .append(contribution.event, &contribution.text, contribution.alteration);
        }
        self.events.push(event);
    }

    pub fn finish(self) -> RecordedStream {
        log::debug!(
            "recorded {} events, projection of {} bytes over {} spans",
            self.events.len(),
            self.projection.len(),
            self.projection.indexed_events()
        );
        RecordedStream {
            events: self.events,
            projection: self.projection,
        }
    }

    /// One recording step: number the event and compute the text it contributes.
    fn contribution(
        &self,
        counters: EventCounters,
        event: &RenderEvent,
        empty_link: bool,
    ) -> (Option<Contribution>, EventCounters) {
        let (kind, text, normalize) = match event {
            RenderEvent::Word(word) => (EventKind::Word, word.clone(), false),
            RenderEvent::SpecialSymbol(symbol) => {
                (EventKind::SpecialSymbol, symbol.to_string(), false)
            }
            RenderEvent::Verbatim { text, .. } => (EventKind::Verbatim, text.clone(), true),
            RenderEvent::RawText { text, .. } => (EventKind::RawText, text.clone(), true),
            RenderEvent::EndLink { link, .. } if empty_link => {
                (EventKind::LinkLabel, self.labels.generate(link), true)
            }
            _ => return (None, counters),
        };

        let (reference, counters) = counters.advance(kind);
        let (text, alteration) = if normalize {
            self.normalizer.normalize(&text).into_parts()
        } else {
            (text, None)
        };

        (
            Some(Contribution {
                event: reference,
                text,
                alteration,
            }),
            counters,
        )
    }
}

impl<N: ContentNormalizer, L: LinkLabelGenerator> Listener for EventRecorder<N, L> {
    fn on_event(&mut self, event: &RenderEvent) {
        self.record(event.clone());
    }
}
