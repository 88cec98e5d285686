use serde::{Deserialize, Serialize};

/// Granularity of a code element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Method,
    Class,
    File,
}

/// A method, class, or file with a text summary and its declared relationships
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeElement {
    /// Unique qualified name (e.g., "game.Board.move_piece", "src/board.py")
    pub id: String,

    pub kind: ElementKind,

    /// Natural-language summary of what the element does
    pub summary: String,

    /// Method name (e.g., "Board.move_piece")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,

    /// Ids of elements this element calls. Targets are matched against
    /// `id`, not `method_name`; a target naming no element id is dropped
    /// when the relationship graph is built.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<String>,

    /// Ids of elements this element inherits from (matched like `calls`)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub inherits_from: Vec<String>,

    /// Member methods (class elements only)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<String>,
}

impl CodeElement {
    pub fn new(id: impl Into<String>, kind: ElementKind, summary: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            summary: summary.into(),
            method_name: None,
            class_name: None,
            file_path: None,
            calls: Vec::new(),
            inherits_from: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Create a method element whose method name equals its id
    pub fn method(id: impl Into<String>, summary: impl Into<String>) -> Self {
        let id = id.into();
        Self::new(id.clone(), ElementKind::Method, summary).method_name(id)
    }

    /// Builder: set method name
    #[must_use]
    pub fn method_name(mut self, name: impl Into<String>) -> Self {
        self.method_name = Some(name.into());
        self
    }

    /// Builder: set class name
    #[must_use]
    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    /// Builder: set file path
    #[must_use]
    pub fn file_path(mut self, path: impl Into<String>) -> Self {
        self.file_path = Some(path.into());
        self
    }

    /// Builder: add a call target (an element id)
    #[must_use]
    pub fn calls(mut self, target: impl Into<String>) -> Self {
        self.calls.push(target.into());
        self
    }

    /// Builder: add an inheritance parent (an element id)
    #[must_use]
    pub fn inherits_from(mut self, parent: impl Into<String>) -> Self {
        self.inherits_from.push(parent.into());
        self
    }

    /// Short label used when elements are rendered into prompt text
    #[must_use]
    pub fn label(&self) -> &str {
        self.method_name
            .as_deref()
            .or(self.file_path.as_deref())
            .unwrap_or("doc")
    }

    /// Identifier exposed in feature maps: method name, else file path,
    /// else `doc_<index>`
    #[must_use]
    pub fn public_id(&self, index: usize) -> String {
        match (&self.method_name, &self.file_path) {
            (Some(method), _) if !method.is_empty() => method.clone(),
            (_, Some(path)) if !path.is_empty() => path.clone(),
            _ => format!("doc_{index}"),
        }
    }

    /// Summary prefixed with its label, as fed to recursive summarization
    #[must_use]
    pub fn labeled_text(&self) -> String {
        format!("[{}]\n{}", self.label(), self.summary)
    }
}

/// Element persisted together with its embedding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredElement {
    #[serde(flatten)]
    pub element: CodeElement,
    pub embedding: Vec<f32>,
}
