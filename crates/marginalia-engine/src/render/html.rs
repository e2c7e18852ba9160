use crate::annotation::Annotation;
use crate::events::{
    Block, DefaultLinkLabels, Format, Link, LinkKind, LinkLabelGenerator, LinkTracker, ListType,
    RenderEvent,
};

use super::{AnnotationListener, Listener};

pub const DEFAULT_MARKER_CLASS: &str = "annotation";

/// Writes render events as XHTML.
///
/// The opening tag of a link is held back until the link's first content,
/// so that markers wrapping the generated label of an empty link end up
/// around the whole `<a>` element.
pub struct HtmlRenderer<G = DefaultLinkLabels> {
    output: String,
    labels: G,
    links: LinkTracker,
    marker_class: String,
    include_title: bool,
    pending_link: Option<Link>,
    pending_markers: String,
}

impl Default for HtmlRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlRenderer {
    pub fn new() -> Self {
        Self::with_labels(DefaultLinkLabels)
    }
}

impl<G: LinkLabelGenerator> HtmlRenderer<G> {
    pub fn with_labels(labels: G) -> Self {
        Self {
            output: String::new(),
            labels,
            links: LinkTracker::new(),
            marker_class: DEFAULT_MARKER_CLASS.to_string(),
            include_title: true,
            pending_link: None,
            pending_markers: String::new(),
        }
    }

    pub fn with_marker_class(mut self, class: impl Into<String>) -> Self {
        self.marker_class = class.into();
        self
    }

    /// Whether annotation markers carry the annotation text as `title`
    pub fn with_title(mut self, include_title: bool) -> Self {
        self.include_title = include_title;
        self
    }

    pub fn as_str(&self) -> &str {
        &self.output
    }

    pub fn into_string(mut self) -> String {
        self.flush_pending_link();
        self.output
    }

    /// Render a whole stream without annotations
    pub fn render<'e>(mut self, events: impl IntoIterator<Item = &'e RenderEvent>) -> String {
        for event in events {
            self.on_event(event);
        }
        self.into_string()
    }

    fn flush_pending_link(&mut self) {
        if let Some(link) = self.pending_link.take() {
            self.open_link(&link);
        }
        let markers = std::mem::take(&mut self.pending_markers);
        self.output.push_str(&markers);
    }

    fn open_link(&mut self, link: &Link) {
        let href = match link.kind {
            LinkKind::Email if !link.reference.starts_with("mailto:") => {
                format!("mailto:{}", link.reference)
            }
            _ => link.reference.clone(),
        };
        self.output.push_str("<a href=\"");
        html_escape::encode_double_quoted_attribute_to_string(&href, &mut self.output);
        self.output.push_str("\">");
    }

    fn text(&mut self, text: &str) {
        html_escape::encode_text_to_string(text, &mut self.output);
    }

    fn write_event(&mut self, event: &RenderEvent) {
        match event {
            RenderEvent::BeginDocument | RenderEvent::EndDocument => {}
            RenderEvent::Begin(block) => {
                let tag = open_tag(block);
                self.output.push_str(&tag);
            }
            RenderEvent::End(block) => {
                let tag = close_tag(block);
                self.output.push_str(&tag);
            }
            RenderEvent::BeginLink(link) => self.pending_link = Some(link.clone()),
            RenderEvent::EndLink { .. } => self.output.push_str("</a>"),
            RenderEvent::Word(word) => self.text(word),
            RenderEvent::Space => self.output.push(' '),
            RenderEvent::NewLine => self.output.push_str("<br/>"),
            RenderEvent::SpecialSymbol(symbol) => self.text(symbol.encode_utf8(&mut [0; 4])),
            RenderEvent::Verbatim { text, inline: true } => {
                self.output.push_str("<code>");
                self.text(text);
                self.output.push_str("</code>");
            }
            RenderEvent::Verbatim {
                text,
                inline: false,
            } => {
                self.output.push_str("<pre>");
                self.text(text);
                self.output.push_str("</pre>");
            }
            RenderEvent::RawText { text, syntax } if syntax == "html" => {
                self.output.push_str(text)
            }
            RenderEvent::RawText { text, .. } => self.text(text),
            RenderEvent::Image { source, alt } => {
                self.output.push_str("<img src=\"");
                html_escape::encode_double_quoted_attribute_to_string(source, &mut self.output);
                self.output.push_str("\" alt=\"");
                html_escape::encode_double_quoted_attribute_to_string(alt, &mut self.output);
                self.output.push_str("\"/>");
            }
            RenderEvent::HorizontalLine => self.output.push_str("<hr/>"),
            RenderEvent::EmptyLines(count) => {
                for _ in 0..*count {
                    self.output.push_str("<div class=\"emptyline\"></div>");
                }
            }
        }
    }
}

impl<G: LinkLabelGenerator> Listener for HtmlRenderer<G> {
    fn on_event(&mut self, event: &RenderEvent) {
        let link_end = self.links.observe(event);

        match event {
            RenderEvent::EndLink { link, .. } if link_end == Some(true) => {
                // Markers received since the link began belong outside it
                self.pending_link = None;
                let markers = std::mem::take(&mut self.pending_markers);
                self.output.push_str(&markers);
                self.open_link(link);
                let label = self.labels.generate(link);
                self.text(&label);
                self.output.push_str("</a>");
            }
            _ => {
                self.flush_pending_link();
                self.write_event(event);
            }
        }
    }
}

impl<G: LinkLabelGenerator> AnnotationListener for HtmlRenderer<G> {
    fn begin_annotation_marker(&mut self, annotation: &Annotation) {
        let mut marker = String::from("<span class=\"");
        html_escape::encode_double_quoted_attribute_to_string(&self.marker_class, &mut marker);
        marker.push_str(" ID");
        html_escape::encode_double_quoted_attribute_to_string(annotation.id.as_str(), &mut marker);
        marker.push('"');
        if self.include_title {
            marker.push_str(" title=\"");
            html_escape::encode_double_quoted_attribute_to_string(annotation.label(), &mut marker);
            marker.push('"');
        }
        marker.push('>');

        if self.pending_link.is_some() {
            self.pending_markers.push_str(&marker);
        } else {
            self.output.push_str(&marker);
        }
    }

    fn end_annotation_marker(&mut self, _annotation: &Annotation) {
        self.flush_pending_link();
        self.output.push_str("</span>");
    }
}

fn open_tag(block: &Block) -> String {
    match block {
        Block::Header(level) => format!("<h{level}>"),
        Block::Section => "<div class=\"section\">".to_string(),
        block => format!("<{}>", element(block)),
    }
}

fn close_tag(block: &Block) -> String {
    match block {
        Block::Header(level) => format!("</h{level}>"),
        block => format!("</{}>", element(block)),
    }
}

fn element(block: &Block) -> &'static str {
    match block {
        Block::Paragraph | Block::QuotationLine => "p",
        Block::List(ListType::Bulleted) => "ul",
        Block::List(ListType::Numbered) => "ol",
        Block::ListItem => "li",
        Block::Table => "table",
        Block::TableRow => "tr",
        Block::TableCell => "td",
        Block::TableHeadCell => "th",
        Block::Quotation => "blockquote",
        Block::DefinitionList => "dl",
        Block::DefinitionTerm => "dt",
        Block::DefinitionDescription => "dd",
        Block::Section | Block::Group | Block::Header(_) => "div",
        Block::Format(Format::Bold) => "strong",
        Block::Format(Format::Italic) => "em",
        Block::Format(Format::Strikeout) => "del",
        Block::Format(Format::Superscript) => "sup",
        Block::Format(Format::Subscript) => "sub",
    }
}
