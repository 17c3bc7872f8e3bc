//! Module index for a generated project.
//!
//! Every type lands in its own file. The index nests `include!`s into one
//! module per namespace segment and container type, so two files that share
//! a namespace end up in the same module.

use indexmap::IndexMap;

use super::naming::{module_ident, namespace_segments};
use crate::emit::CodeSink;

/// Where one generated file belongs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Module path, outermost first.
    pub modules: Vec<String>,
    /// File name relative to the index.
    pub file: String,
}

impl IndexEntry {
    pub fn new(namespace: Option<&str>, containers: &[String], file: impl Into<String>) -> Self {
        let mut modules = namespace.map(namespace_segments).unwrap_or_default();
        modules.extend(containers.iter().map(|container| module_ident(container)));
        Self {
            modules,
            file: file.into(),
        }
    }
}

#[derive(Default)]
struct ModuleNode {
    files: Vec<String>,
    children: IndexMap<String, ModuleNode>,
}

impl ModuleNode {
    fn insert(&mut self, modules: &[String], file: &str) {
        match modules.split_first() {
            None => self.files.push(file.to_string()),
            Some((head, rest)) => self
                .children
                .entry(head.clone())
                .or_default()
                .insert(rest, file),
        }
    }

    fn emit<S: CodeSink>(&self, sink: &mut S) {
        for file in &self.files {
            sink.line(&format!("include!(\"{}\");", file));
        }
        for (name, child) in &self.children {
            sink.blank();
            sink.block(&format!("pub mod {}", name), |sink| {
                sink.line("#[allow(unused_imports)]");
                sink.line("use super::*;");
                sink.blank();
                child.emit(sink);
            });
        }
    }
}

pub(crate) fn emit_index<S: CodeSink>(entries: &[IndexEntry], sink: &mut S) {
    let mut root = ModuleNode::default();
    for entry in entries {
        root.insert(&entry.modules, &entry.file);
    }
    root.emit(sink);
}
