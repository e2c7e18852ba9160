use marginalia_engine::events::{
    Block, DefaultLinkLabels, Format, LinkLabelGenerator, LinkTracker, RenderEvent,
};
use marginalia_engine::{Annotation, AnnotationId, AnnotationListener, Listener};
use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
};

/// Renders an annotated stream as styled terminal lines.
///
/// Annotated text gets a highlighted background; text of the selected
/// annotation a stronger one.
pub struct TerminalRenderer {
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    selected: Option<AnnotationId>,
    /// Annotations whose markers are open, innermost last
    open: Vec<AnnotationId>,
    modifiers: Vec<Modifier>,
    quote_depth: usize,
    links: LinkTracker,
    labels: DefaultLinkLabels,
}

impl TerminalRenderer {
    pub fn new(selected: Option<AnnotationId>) -> Self {
        Self {
            lines: Vec::new(),
            current: Vec::new(),
            selected,
            open: Vec::new(),
            modifiers: Vec::new(),
            quote_depth: 0,
            links: LinkTracker::new(),
            labels: DefaultLinkLabels,
        }
    }

    pub fn into_lines(mut self) -> Vec<Line<'static>> {
        self.flush_line();
        self.lines
    }

    fn text_style(&self) -> Style {
        let mut style = self
            .modifiers
            .iter()
            .fold(Style::default(), |style, modifier| style.add_modifier(*modifier));

        let selected = self
            .selected
            .as_ref()
            .is_some_and(|selected| self.open.contains(selected));
        if selected {
            style = style.bg(Color::Magenta).fg(Color::White);
        } else if !self.open.is_empty() {
            style = style.bg(Color::Yellow).fg(Color::Black);
        }
        style
    }

    fn push(&mut self, text: impl Into<String>, style: Style) {
        if self.current.is_empty() && self.quote_depth > 0 {
            self.current.push(Span::styled(
                "> ".repeat(self.quote_depth),
                Style::default().fg(Color::DarkGray),
            ));
        }
        self.current.push(Span::styled(text.into(), style));
    }

    fn push_text(&mut self, text: impl Into<String>) {
        let style = self.text_style();
        self.push(text, style);
    }

    fn flush_line(&mut self) {
        if !self.current.is_empty() {
            self.lines.push(Line::from(std::mem::take(&mut self.current)));
        }
    }

    fn blank_line(&mut self) {
        self.flush_line();
        if self.lines.last().is_some_and(|line| !line.spans.is_empty()) {
            self.lines.push(Line::default());
        }
    }

    fn begin(&mut self, block: &Block) {
        match block {
            Block::Header(level) => {
                self.flush_line();
                self.push(
                    format!("{} ", "#".repeat(*level as usize)),
                    Style::default().fg(Color::DarkGray),
                );
                self.modifiers.push(Modifier::BOLD);
            }
            Block::Format(format) => self.modifiers.push(match format {
                Format::Bold => Modifier::BOLD,
                Format::Italic => Modifier::ITALIC,
                Format::Strikeout => Modifier::CROSSED_OUT,
                Format::Superscript | Format::Subscript => Modifier::DIM,
            }),
            Block::ListItem => {
                self.flush_line();
                self.push("• ", Style::default());
            }
            Block::Quotation => {
                self.flush_line();
                self.quote_depth += 1;
            }
            Block::TableRow | Block::DefinitionTerm | Block::QuotationLine => self.flush_line(),
            Block::DefinitionDescription => {
                self.flush_line();
                self.push("    ", Style::default());
            }
            _ => {}
        }
    }

    fn end(&mut self, block: &Block) {
        match block {
            Block::Header(_) => {
                self.modifiers.pop();
                self.blank_line();
            }
            Block::Format(_) => {
                self.modifiers.pop();
            }
            Block::Paragraph | Block::List(_) | Block::Table | Block::DefinitionList => {
                self.blank_line()
            }
            Block::Quotation => {
                self.flush_line();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank_line();
            }
            Block::TableCell | Block::TableHeadCell => {
                self.push(" │ ", Style::default().fg(Color::DarkGray))
            }
            _ => {}
        }
    }
}

impl Listener for TerminalRenderer {
    fn on_event(&mut self, event: &RenderEvent) {
        let link_end = self.links.observe(event);

        match event {
            RenderEvent::Begin(block) => self.begin(block),
            RenderEvent::End(block) => self.end(block),
            RenderEvent::EndLink { link, .. } if link_end == Some(true) => {
                let label = self.labels.generate(link);
                let style = self.text_style().add_modifier(Modifier::UNDERLINED);
                self.push(label, style);
            }
            RenderEvent::Word(word) => self.push_text(word.clone()),
            RenderEvent::Space => self.push_text(" "),
            RenderEvent::SpecialSymbol(symbol) => self.push_text(symbol.to_string()),
            RenderEvent::NewLine => self.flush_line(),
            RenderEvent::Verbatim { text, inline: true } => {
                let style = self.text_style().fg(Color::Cyan);
                self.push(text.clone(), style);
            }
            RenderEvent::Verbatim {
                text,
                inline: false,
            } => {
                self.flush_line();
                let style = self.text_style().fg(Color::Cyan);
                for line in text.lines() {
                    self.push(format!("    {line}"), style);
                    self.flush_line();
                }
                self.blank_line();
            }
            RenderEvent::RawText { text, .. } => {
                let style = self.text_style().add_modifier(Modifier::DIM);
                self.push(text.clone(), style);
            }
            RenderEvent::Image { alt, .. } => {
                let style = self.text_style().add_modifier(Modifier::DIM);
                self.push(format!("[image: {alt}]"), style);
            }
            RenderEvent::HorizontalLine => {
                self.flush_line();
                self.lines.push(Line::from("─".repeat(40)));
            }
            _ => {}
        }
    }
}

impl AnnotationListener for TerminalRenderer {
    fn begin_annotation_marker(&mut self, annotation: &Annotation) {
        self.open.push(annotation.id.clone());
    }

    fn end_annotation_marker(&mut self, annotation: &Annotation) {
        if let Some(position) = self.open.iter().rposition(|id| *id == annotation.id) {
            self.open.remove(position);
        }
    }
}
