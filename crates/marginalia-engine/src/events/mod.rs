//! # Render events
//!
//! A rendered document is a flat sequence of [`RenderEvent`]s: leaf events
//! that produce text (words, symbols, verbatim and raw fragments), spacing,
//! and structural begin/end pairs. This is the vocabulary shared by the event
//! source, the alignment passes and downstream renderers.
//!
//! ```text
//! BeginDocument
//!   Begin(Paragraph)
//!     Word("A") Space Word("robot") Space Word("may") ...
//!   End(Paragraph)
//! EndDocument
//! ```
//!
//! Text-producing leaves are identified across passes by an [`EventRef`]:
//! their kind plus their sequence number among events of that kind. The
//! reference ignores nesting, so it stays valid when two renderings of the
//! same text differ only in structure.

mod link;

use std::fmt;

pub use link::{DefaultLinkLabels, LinkLabelGenerator, LinkTracker};

/// Kind of list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Bulleted,
    Numbered,
}

/// Inline formatting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Bold,
    Italic,
    Strikeout,
    Superscript,
    Subscript,
}

/// What a link points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    /// Another document of the same collection (e.g. a wiki link)
    Document,
    Url,
    Email,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub kind: LinkKind,
    pub reference: String,
}

impl Link {
    pub fn new(kind: LinkKind, reference: impl Into<String>) -> Self {
        Self {
            kind,
            reference: reference.into(),
        }
    }
}

/// Block-level and inline containers that open and close around content
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Paragraph,
    List(ListType),
    ListItem,
    Table,
    TableRow,
    TableCell,
    TableHeadCell,
    Header(u8),
    Section,
    Quotation,
    QuotationLine,
    DefinitionList,
    DefinitionTerm,
    DefinitionDescription,
    Group,
    Format(Format),
}

/// One atomic emission of the rendering of a document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderEvent {
    BeginDocument,
    EndDocument,
    Begin(Block),
    End(Block),
    BeginLink(Link),
    /// `free_standing` is set for bare URIs written directly in the text
    EndLink { link: Link, free_standing: bool },
    Word(String),
    Space,
    NewLine,
    SpecialSymbol(char),
    Verbatim { text: String, inline: bool },
    RawText { text: String, syntax: String },
    Image { source: String, alt: String },
    HorizontalLine,
    EmptyLines(usize),
}

impl RenderEvent {
    pub fn word(word: impl Into<String>) -> Self {
        RenderEvent::Word(word.into())
    }

    pub fn verbatim(text: impl Into<String>, inline: bool) -> Self {
        RenderEvent::Verbatim {
            text: text.into(),
            inline,
        }
    }

    pub fn raw_html(text: impl Into<String>) -> Self {
        RenderEvent::RawText {
            text: text.into(),
            syntax: "html".to_string(),
        }
    }

    /// Kind under which this event is numbered, for leaves that always
    /// produce text. Empty-link labels are numbered separately, by whoever
    /// tracks link content.
    pub fn text_kind(&self) -> Option<EventKind> {
        match self {
            RenderEvent::Word(_) => Some(EventKind::Word),
            RenderEvent::SpecialSymbol(_) => Some(EventKind::SpecialSymbol),
            RenderEvent::Verbatim { .. } => Some(EventKind::Verbatim),
            RenderEvent::RawText { .. } => Some(EventKind::RawText),
            _ => None,
        }
    }

    /// Whether annotation markers must not span across this event.
    ///
    /// `EndLink` is excluded: whether it bounds content depends on whether the
    /// link was empty.
    pub fn is_boundary(&self) -> bool {
        matches!(
            self,
            RenderEvent::BeginDocument
                | RenderEvent::EndDocument
                | RenderEvent::Begin(_)
                | RenderEvent::End(_)
                | RenderEvent::BeginLink(_)
        )
    }
}

/// Kinds of events that contribute text to the plain-text projection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventKind {
    Word,
    SpecialSymbol,
    Verbatim,
    RawText,
    LinkLabel,
}

impl EventKind {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        self as usize
    }
}

/// Stable identity of a text-producing event: its kind and its sequence
/// number among events of the same kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventRef {
    pub kind: EventKind,
    pub seq: usize,
}

impl EventRef {
    pub fn new(kind: EventKind, seq: usize) -> Self {
        Self { kind, seq }
    }
}

impl fmt::Display for EventRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}#{}", self.kind, self.seq)
    }
}

/// Per-kind sequence counters, threaded by value through a pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventCounters {
    counts: [usize; EventKind::COUNT],
}

impl EventCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reference for the next event of `kind`, and the counters after it
    #[must_use]
    pub fn advance(self, kind: EventKind) -> (EventRef, EventCounters) {
        let mut next = self;
        let seq = next.counts[kind.index()];
        next.counts[kind.index()] += 1;
        (EventRef::new(kind, seq), next)
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.counts[kind.index()]
    }
}
