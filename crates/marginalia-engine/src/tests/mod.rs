use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use crate::annotation::{Annotation, AnnotationId};
use crate::events::RenderEvent;
use crate::render::{AnnotationListener, Listener};

pub fn create_test_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

pub fn create_test_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let file_path = dir.path().join(name);
    if let Some(parent) = file_path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent dirs");
    }
    fs::write(&file_path, content).expect("Failed to write test file");
    file_path
}

/// What a downstream renderer received, markers included
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Emitted {
    Event(RenderEvent),
    Begin(AnnotationId),
    End(AnnotationId),
}

/// Listener that keeps everything it is sent
#[derive(Debug, Default)]
pub struct Transcript {
    pub emitted: Vec<Emitted>,
}

impl Transcript {
    /// The events alone, markers dropped
    pub fn events(&self) -> Vec<RenderEvent> {
        self.emitted
            .iter()
            .filter_map(|emitted| match emitted {
                Emitted::Event(event) => Some(event.clone()),
                _ => None,
            })
            .collect()
    }

    /// The markers alone, as `+id` / `-id`
    pub fn markers(&self) -> Vec<String> {
        self.emitted
            .iter()
            .filter_map(|emitted| match emitted {
                Emitted::Begin(id) => Some(format!("+{id}")),
                Emitted::End(id) => Some(format!("-{id}")),
                Emitted::Event(_) => None,
            })
            .collect()
    }

    /// Words and markers in order, one token each: `[a robot] may`
    pub fn compact(&self) -> String {
        let mut tokens = Vec::new();
        for emitted in &self.emitted {
            match emitted {
                Emitted::Begin(id) => tokens.push(format!("[{id}")),
                Emitted::End(id) => tokens.push(format!("{id}]")),
                Emitted::Event(RenderEvent::Word(word)) => tokens.push(word.clone()),
                Emitted::Event(RenderEvent::SpecialSymbol(symbol)) => {
                    tokens.push(symbol.to_string())
                }
                Emitted::Event(RenderEvent::Begin(_)) => tokens.push("<".to_string()),
                Emitted::Event(RenderEvent::End(_)) => tokens.push(">".to_string()),
                Emitted::Event(_) => {}
            }
        }
        tokens.join(" ")
    }
}

impl Listener for Transcript {
    fn on_event(&mut self, event: &RenderEvent) {
        self.emitted.push(Emitted::Event(event.clone()));
    }
}

impl AnnotationListener for Transcript {
    fn begin_annotation_marker(&mut self, annotation: &Annotation) {
        self.emitted.push(Emitted::Begin(annotation.id.clone()));
    }

    fn end_annotation_marker(&mut self, annotation: &Annotation) {
        self.emitted.push(Emitted::End(annotation.id.clone()));
    }
}

/// Split a sentence into word, space and symbol events inside one paragraph
pub fn paragraph(text: &str) -> Vec<RenderEvent> {
    let mut events = vec![
        RenderEvent::BeginDocument,
        RenderEvent::Begin(crate::events::Block::Paragraph),
    ];
    events.extend(crate::markdown::split_text(text));
    events.push(RenderEvent::End(crate::events::Block::Paragraph));
    events.push(RenderEvent::EndDocument);
    events
}
