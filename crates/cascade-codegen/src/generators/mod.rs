//! Rust code generation for classified types.

mod accessors;
mod index;
pub mod naming;
mod scaffold;

pub use index::IndexEntry;

use crate::emit::{CodeSink, Emission};
use crate::model::TypeModel;
use scaffold::TypeScaffold;

pub(crate) const RC: &str = "::std::rc::Rc";
pub(crate) const REF_CELL: &str = "::std::cell::RefCell";
pub(crate) const CELL: &str = "::std::cell::Cell";
pub(crate) const OPTION: &str = "::std::option::Option";

/// Default path of the runtime crate in generated code.
pub const DEFAULT_RUNTIME_PATH: &str = "::cascade_core";

/// Synthesizes the change-tracking implementation of a [`TypeModel`].
#[derive(Debug, Clone)]
pub struct TrackingGenerator {
    runtime_path: String,
}

impl TrackingGenerator {
    /// Create a generator targeting the runtime at `::cascade_core`.
    pub fn new() -> Self {
        Self::with_runtime_path(DEFAULT_RUNTIME_PATH)
    }

    /// Create a generator targeting the runtime at `path` (e.g. a re-export).
    pub fn with_runtime_path(path: impl Into<String>) -> Self {
        Self {
            runtime_path: path.into(),
        }
    }

    pub fn runtime_path(&self) -> &str {
        &self.runtime_path
    }

    /// Emit the full implementation of `model` into `sink`.
    pub fn synthesize<S: CodeSink>(&self, model: &TypeModel, sink: &mut S) {
        TypeScaffold::new(model, &self.runtime_path).emit(sink);
    }

    /// Record the implementation of `model` as structural instructions.
    pub fn emission(&self, model: &TypeModel) -> Emission {
        let mut emission = Emission::new();
        self.synthesize(model, &mut emission);
        emission
    }

    /// Emit the index that places generated files into modules.
    pub fn synthesize_index<S: CodeSink>(&self, entries: &[IndexEntry], sink: &mut S) {
        index::emit_index(entries, sink);
    }
}

impl Default for TrackingGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generated project output.
#[derive(Debug, Clone, Default)]
pub struct GeneratedProject {
    /// Generated files, in declaration order, index last.
    pub files: Vec<GeneratedFile>,
    /// Types skipped because the pass was cancelled.
    pub skipped: Vec<String>,
}

impl GeneratedProject {
    pub fn file(&self, path: &str) -> Option<&GeneratedFile> {
        self.files.iter().find(|file| file.path == path)
    }
}

/// A generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// File path relative to the output directory.
    pub path: String,
    /// File content.
    pub content: String,
    /// Whether this is the module index rather than a type.
    pub is_index: bool,
}
