pub mod alignment;
pub mod annotation;
pub mod events;
pub mod io;
pub mod markdown;
pub mod normalize;
pub mod render;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use alignment::{
    Aligner, LocateReport, LocatedAnnotation, MatchPolicy, OverlayError, Unlocatable,
    UnlocatedAnnotation,
};
pub use annotation::{Annotation, AnnotationId};
pub use events::{EventKind, EventRef, RenderEvent};
pub use io::*;
pub use normalize::{ContentNormalizer, MarkupNormalizer, NormalizerChain, WhitespaceNormalizer};
pub use render::{AnnotationListener, HtmlRenderer, Listener};

/// Settings for [`annotate_markdown`]
#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    /// Document identifier used in error reports
    pub document: String,
    pub policy: MatchPolicy,
    /// Strip `<...>` markup before removing whitespace
    pub strip_markup: bool,
    pub marker_class: String,
    pub include_title: bool,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            document: "document".to_string(),
            policy: MatchPolicy::default(),
            strip_markup: false,
            marker_class: render::html::DEFAULT_MARKER_CLASS.to_string(),
            include_title: true,
        }
    }
}

/// Annotated XHTML together with what happened to each annotation
#[derive(Debug, Clone)]
pub struct AnnotatedDocument {
    pub html: String,
    pub report: LocateReport,
}

/// Render a Markdown document to XHTML with annotation markers
pub fn annotate_markdown(
    source: &str,
    annotations: &[Annotation],
    options: &AnnotateOptions,
) -> Result<AnnotatedDocument, OverlayError> {
    let mut renderer = HtmlRenderer::new()
        .with_marker_class(options.marker_class.clone())
        .with_title(options.include_title);
    let report = annotate_into(source, annotations, options, &mut renderer)?;
    Ok(AnnotatedDocument {
        html: renderer.into_string(),
        report,
    })
}

/// Run the alignment of a Markdown document into any annotation-aware renderer
pub fn annotate_into<L: AnnotationListener + ?Sized>(
    source: &str,
    annotations: &[Annotation],
    options: &AnnotateOptions,
    listener: &mut L,
) -> Result<LocateReport, OverlayError> {
    let events = markdown::events(source);
    if options.strip_markup {
        Aligner::new()
            .with_normalizer(NormalizerChain::markup_and_whitespace())
            .with_policy(options.policy)
            .align(&options.document, events, annotations, listener)
    } else {
        Aligner::new()
            .with_policy(options.policy)
            .align(&options.document, events, annotations, listener)
    }
}
