use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of an annotation, stable across alignment passes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationId(String);

impl AnnotationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnnotationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnnotationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for AnnotationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// An annotation anchored by the text it selected and the text around it.
///
/// Both strings were captured against the flattened plain-text view of the
/// document as it was rendered at creation time. They are normalized again
/// before being searched, so whitespace differences do not matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Annotation {
    pub id: AnnotationId,
    /// The exact text the author selected
    pub selection: String,
    /// Text surrounding the selection, containing it
    pub selection_context: String,
    /// Approximate byte offset of the context in the normalized projection,
    /// the document's text after the normalizer has run (whitespace removed
    /// by default). Only `MatchPolicy::NearestToHint` reads it.
    #[serde(default)]
    pub context_offset: usize,
    #[serde(default)]
    pub author: String,
    pub created_at: DateTime<Utc>,
    /// What the author wrote about the selection
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl Annotation {
    /// Create an annotation whose context is the selection itself
    pub fn new(id: impl Into<AnnotationId>, selection: impl Into<String>) -> Self {
        let selection = selection.into();
        Self {
            id: id.into(),
            selection_context: selection.clone(),
            selection,
            context_offset: 0,
            author: String::new(),
            created_at: Utc::now(),
            content: String::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.selection_context = context.into();
        self
    }

    pub fn with_context_offset(mut self, offset: usize) -> Self {
        self.context_offset = offset;
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Text shown alongside the annotation marker
    pub fn label(&self) -> &str {
        &self.content
    }
}
