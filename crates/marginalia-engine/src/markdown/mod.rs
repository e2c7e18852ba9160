//! Markdown as a source of render events.
//!
//! Parsing is done by `pulldown-cmark`; this module only translates its
//! events into [`RenderEvent`]s. Start tags push a frame and end tags pop it,
//! so closing events always mirror the opening ones.

use pulldown_cmark::{CodeBlockKind, Event, LinkType, Options, Parser, Tag};

use crate::events::{Block, Format, Link, LinkKind, ListType, RenderEvent};
use crate::render::Listener;

/// Parser options used for every document
pub fn options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_DEFINITION_LIST);
    options.insert(Options::ENABLE_WIKILINKS);
    options
}

/// Render `source` into a buffered event stream
pub fn events(source: &str) -> Vec<RenderEvent> {
    let mut events = Vec::new();
    stream(source, &mut events);
    events
}

/// Render `source`, pushing each event into `listener`
pub fn stream<L: Listener + ?Sized>(source: &str, listener: &mut L) {
    let mut translator = Translator::new(listener);
    translator.emit(RenderEvent::BeginDocument);
    for event in Parser::new_ext(source, options()) {
        translator.process_event(event);
    }
    translator.emit(RenderEvent::EndDocument);
}

/// Split running text into words, spaces and symbols.
///
/// Words are runs of alphanumeric characters, a run of whitespace becomes a
/// single space, and every other character is a symbol of its own.
pub fn split_text(text: &str) -> Vec<RenderEvent> {
    let mut events = Vec::new();
    let mut word = String::new();
    let mut in_space = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            word.push(c);
            in_space = false;
            continue;
        }
        if !word.is_empty() {
            events.push(RenderEvent::Word(std::mem::take(&mut word)));
        }
        if c.is_whitespace() {
            if !in_space {
                events.push(RenderEvent::Space);
                in_space = true;
            }
        } else {
            events.push(RenderEvent::SpecialSymbol(c));
            in_space = false;
        }
    }
    if !word.is_empty() {
        events.push(RenderEvent::Word(word));
    }
    events
}

/// What an open tag turns into when it closes
enum Frame {
    Block(Block),
    Link { link: Link, free_standing: bool },
    /// Content is collected and emitted as a single event on close
    Code(String),
    Html(String),
    Image { source: String, alt: String },
    Ignored,
}

struct Translator<'l, L: ?Sized> {
    listener: &'l mut L,
    frames: Vec<Frame>,
    in_table_head: bool,
}

impl<'l, L: Listener + ?Sized> Translator<'l, L> {
    fn new(listener: &'l mut L) -> Self {
        Self {
            listener,
            frames: Vec::new(),
            in_table_head: false,
        }
    }

    fn emit(&mut self, event: RenderEvent) {
        self.listener.on_event(&event);
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start(tag),
            Event::End(_) => self.end(),
            Event::Text(text) => self.text(&text),
            Event::Code(code) => match self.image_alt() {
                Some(alt) => alt.push_str(&code),
                None => self.emit(RenderEvent::verbatim(code.to_string(), true)),
            },
            // Markup has no place in alt text
            Event::Html(_) | Event::InlineHtml(_) if self.image_alt().is_some() => {}
            Event::Html(html) | Event::InlineHtml(html) => {
                if let Some(Frame::Html(buffer)) = self.frames.last_mut() {
                    buffer.push_str(&html);
                } else {
                    self.emit(RenderEvent::raw_html(html.to_string()));
                }
            }
            Event::SoftBreak => self.text(" "),
            Event::HardBreak if self.image_alt().is_some() => self.text(" "),
            Event::HardBreak => self.emit(RenderEvent::NewLine),
            Event::Rule => self.emit(RenderEvent::HorizontalLine),
            Event::TaskListMarker(checked) => {
                self.emit(RenderEvent::SpecialSymbol(if checked { '☑' } else { '☐' }));
                self.emit(RenderEvent::Space);
            }
            _ => {}
        }
    }

    /// Alt text of the image being read, if any. Everything nested in an
    /// image is flattened into its alt text.
    fn image_alt(&mut self) -> Option<&mut String> {
        self.frames.iter_mut().rev().find_map(|frame| match frame {
            Frame::Image { alt, .. } => Some(alt),
            _ => None,
        })
    }

    fn start(&mut self, tag: Tag) {
        if self.image_alt().is_some() {
            self.frames.push(Frame::Ignored);
            return;
        }

        let frame = match tag {
            Tag::Paragraph => Frame::Block(Block::Paragraph),
            Tag::Heading { level, .. } => Frame::Block(Block::Header(level as u8)),
            Tag::BlockQuote(_) => Frame::Block(Block::Quotation),
            Tag::CodeBlock(kind) => {
                if let CodeBlockKind::Fenced(language) = &kind {
                    log::trace!("fenced code block, language {language:?}");
                }
                Frame::Code(String::new())
            }
            Tag::HtmlBlock => Frame::Html(String::new()),
            Tag::List(Some(_)) => Frame::Block(Block::List(ListType::Numbered)),
            Tag::List(None) => Frame::Block(Block::List(ListType::Bulleted)),
            Tag::Item => Frame::Block(Block::ListItem),
            Tag::DefinitionList => Frame::Block(Block::DefinitionList),
            Tag::DefinitionListTitle => Frame::Block(Block::DefinitionTerm),
            Tag::DefinitionListDefinition => Frame::Block(Block::DefinitionDescription),
            Tag::Table(_) => Frame::Block(Block::Table),
            Tag::TableHead => {
                self.in_table_head = true;
                Frame::Block(Block::TableRow)
            }
            Tag::TableRow => Frame::Block(Block::TableRow),
            Tag::TableCell if self.in_table_head => Frame::Block(Block::TableHeadCell),
            Tag::TableCell => Frame::Block(Block::TableCell),
            Tag::Emphasis => Frame::Block(Block::Format(Format::Italic)),
            Tag::Strong => Frame::Block(Block::Format(Format::Bold)),
            Tag::Strikethrough => Frame::Block(Block::Format(Format::Strikeout)),
            Tag::Link {
                link_type,
                dest_url,
                ..
            } => {
                let (kind, free_standing) = match link_type {
                    LinkType::WikiLink { .. } => (LinkKind::Document, false),
                    LinkType::Autolink => (LinkKind::Url, true),
                    LinkType::Email => (LinkKind::Email, true),
                    _ => (LinkKind::Url, false),
                };
                Frame::Link {
                    link: Link::new(kind, dest_url.to_string()),
                    free_standing,
                }
            }
            Tag::Image { dest_url, .. } => Frame::Image {
                source: dest_url.to_string(),
                alt: String::new(),
            },
            _ => Frame::Ignored,
        };

        match &frame {
            Frame::Block(block) => self.emit(RenderEvent::Begin(block.clone())),
            Frame::Link { link, .. } => self.emit(RenderEvent::BeginLink(link.clone())),
            _ => {}
        }
        self.frames.push(frame);
    }

    fn end(&mut self) {
        let Some(frame) = self.frames.pop() else {
            log::warn!("end tag without a matching start");
            return;
        };

        match frame {
            Frame::Block(block) => {
                if block == Block::TableRow && self.in_table_head {
                    self.in_table_head = false;
                }
                self.emit(RenderEvent::End(block));
            }
            Frame::Link {
                link,
                free_standing,
            } => self.emit(RenderEvent::EndLink {
                link,
                free_standing,
            }),
            Frame::Code(code) => self.emit(RenderEvent::verbatim(code, false)),
            Frame::Html(html) => self.emit(RenderEvent::raw_html(html)),
            Frame::Image { source, alt } => self.emit(RenderEvent::Image { source, alt }),
            Frame::Ignored => {}
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(alt) = self.image_alt() {
            alt.push_str(text);
            return;
        }
        match self.frames.last_mut() {
            Some(Frame::Code(buffer)) | Some(Frame::Html(buffer)) => buffer.push_str(text),
            _ => {
                for event in split_text(text) {
                    self.emit(event);
                }
            }
        }
    }
}
