//! Consumers of render events.
//!
//! [`Listener`] is the upstream seam: event sources push into it and the
//! recorder is one. [`AnnotationListener`] is the downstream seam: the
//! overlay drives it with the replayed events plus annotation markers.

pub mod html;

use crate::annotation::Annotation;
use crate::events::RenderEvent;

pub use html::HtmlRenderer;

pub trait Listener {
    fn on_event(&mut self, event: &RenderEvent);
}

/// A renderer that can show where annotations begin and end
pub trait AnnotationListener: Listener {
    fn begin_annotation_marker(&mut self, annotation: &Annotation);
    fn end_annotation_marker(&mut self, annotation: &Annotation);
}

impl Listener for Vec<RenderEvent> {
    fn on_event(&mut self, event: &RenderEvent) {
        self.push(event.clone());
    }
}
