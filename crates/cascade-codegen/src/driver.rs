//! Generation driver and build-script helper.
//!
//! [`Generator`] runs classification and synthesis for every declaration in
//! a [`DeclarationSet`]. Types are independent, so the pass fans out over
//! `rayon` and collects results back in declaration order.
//!
//! [`Builder`] wraps the driver for `build.rs`:
//!
//! ```ignore
//! fn main() {
//!     cascade_codegen::Builder::new()
//!         .compile("tracked.json")
//!         .expect("change-tracking generation failed");
//! }
//! ```
//!
//! and the crate includes the result with
//! `include!(concat!(env!("OUT_DIR"), "/cascade_generated.rs"));`.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::analyzer::{CancellationToken, TypeClassifier, TypeGraph};
use crate::declaration::{DeclarationSet, TypeDeclaration};
use crate::emit::CodeWriter;
use crate::error::{CodegenError, Result};
use crate::generators::naming::file_name;
use crate::generators::{
    GeneratedFile, GeneratedProject, IndexEntry, TrackingGenerator, DEFAULT_RUNTIME_PATH,
};

/// Default name of the index file.
pub const DEFAULT_INDEX_FILE: &str = "cascade_generated.rs";

const HEADER: &str = "// <auto-generated>\n// Generated by cascade-codegen. Do not edit.\n// </auto-generated>\n";

/// Options for a generation pass.
#[derive(Debug, Clone)]
pub struct GeneratorOptions {
    /// Path of the runtime crate in generated code.
    pub runtime_path: String,
    /// Name of the module index file.
    pub index_file: String,
    /// Prepend the auto-generated banner.
    pub header: bool,
    /// Re-format output through `syn` + `prettyplease`.
    pub format: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            runtime_path: DEFAULT_RUNTIME_PATH.to_string(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            header: true,
            format: false,
        }
    }
}

/// Drives classification and synthesis over a declaration set.
pub struct Generator {
    options: GeneratorOptions,
    synthesizer: TrackingGenerator,
}

impl Generator {
    pub fn new(options: GeneratorOptions) -> Self {
        let synthesizer = TrackingGenerator::with_runtime_path(options.runtime_path.clone());
        Self {
            options,
            synthesizer,
        }
    }

    pub fn options(&self) -> &GeneratorOptions {
        &self.options
    }

    /// Type graph for `set`: built-ins, the feed's resolved types, then
    /// every declaration registered as tracked.
    pub fn build_graph(set: &DeclarationSet) -> TypeGraph {
        let mut graph = TypeGraph::with_builtins();
        for (name, info) in &set.types {
            graph.insert(name.clone(), info.clone());
        }
        for decl in &set.declarations {
            graph.register_tracked(decl);
        }
        graph
    }

    /// Generate one type. `Ok(None)` when the pass was cancelled.
    pub fn generate_type(
        &self,
        graph: &TypeGraph,
        decl: &TypeDeclaration,
        token: &CancellationToken,
    ) -> Result<Option<GeneratedFile>> {
        let Ok(model) = TypeClassifier::new(graph).classify_with(decl, token) else {
            tracing::debug!(name = %decl.qualified_name(), "generation cancelled");
            return Ok(None);
        };

        let mut writer = CodeWriter::new();
        self.synthesizer.synthesize(&model, &mut writer);
        if token.is_cancelled() {
            tracing::debug!(name = %decl.qualified_name(), "generation cancelled");
            return Ok(None);
        }

        let content = self.finish(writer.finish())?;
        Ok(Some(GeneratedFile {
            path: file_name(model.namespace.as_deref(), &model.containers, &model.name),
            content,
            is_index: false,
        }))
    }

    /// Generate every declaration plus the module index.
    pub fn generate(&self, set: &DeclarationSet) -> Result<GeneratedProject> {
        self.generate_with(set, &CancellationToken::new())
    }

    /// Like [`Generator::generate`], abandoning types once `token` is cancelled.
    pub fn generate_with(
        &self,
        set: &DeclarationSet,
        token: &CancellationToken,
    ) -> Result<GeneratedProject> {
        let graph = Self::build_graph(set);

        let results: Vec<Result<Option<GeneratedFile>>> = set
            .declarations
            .par_iter()
            .map(|decl| self.generate_type(&graph, decl, token))
            .collect();

        let mut project = GeneratedProject::default();
        let mut entries = Vec::new();
        for (decl, result) in set.declarations.iter().zip(results) {
            match result? {
                Some(file) => {
                    entries.push(IndexEntry::new(
                        decl.namespace.as_deref(),
                        &decl.containers,
                        file.path.clone(),
                    ));
                    project.files.push(file);
                }
                None => project.skipped.push(decl.qualified_name()),
            }
        }

        let mut writer = CodeWriter::new();
        self.synthesizer.synthesize_index(&entries, &mut writer);
        project.files.push(GeneratedFile {
            path: self.options.index_file.clone(),
            content: self.finish(writer.finish())?,
            is_index: true,
        });

        tracing::debug!(
            generated = entries.len(),
            skipped = project.skipped.len(),
            "generation finished"
        );
        Ok(project)
    }

    fn finish(&self, code: String) -> Result<String> {
        let code = if self.options.format {
            format_source(&code)?
        } else {
            code
        };
        if self.options.header {
            Ok(format!("{}\n{}", HEADER, code))
        } else {
            Ok(code)
        }
    }
}

impl Default for Generator {
    fn default() -> Self {
        Self::new(GeneratorOptions::default())
    }
}

#[cfg(feature = "format")]
fn format_source(code: &str) -> Result<String> {
    let file = syn::parse_file(code).map_err(|e| CodegenError::FormattingError(e.to_string()))?;
    Ok(prettyplease::unparse(&file))
}

#[cfg(not(feature = "format"))]
fn format_source(_code: &str) -> Result<String> {
    Err(CodegenError::FormattingError(
        "built without the `format` feature".to_string(),
    ))
}

/// Configures and runs generation from a build script.
#[derive(Debug, Clone)]
pub struct Builder {
    options: GeneratorOptions,
    out_dir: Option<PathBuf>,
    emit_rerun: bool,
}

impl Builder {
    pub fn new() -> Self {
        Self {
            options: GeneratorOptions::default(),
            out_dir: None,
            emit_rerun: true,
        }
    }

    /// Output directory. Defaults to `$OUT_DIR`.
    pub fn out_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_dir = Some(path.into());
        self
    }

    pub fn runtime_path(mut self, path: impl Into<String>) -> Self {
        self.options.runtime_path = path.into();
        self
    }

    pub fn index_file(mut self, name: impl Into<String>) -> Self {
        self.options.index_file = name.into();
        self
    }

    pub fn format(mut self, enabled: bool) -> Self {
        self.options.format = enabled;
        self
    }

    /// Print `cargo:rerun-if-changed` for the feed. On by default.
    pub fn emit_rerun_if_changed(mut self, enabled: bool) -> Self {
        self.emit_rerun = enabled;
        self
    }

    /// Read the feed at `feed`, generate, and write every file.
    /// Returns the written paths, index last.
    pub fn compile(self, feed: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
        let feed = feed.as_ref();
        if self.emit_rerun {
            println!("cargo:rerun-if-changed={}", feed.display());
        }

        let out_dir = match self.out_dir {
            Some(dir) => dir,
            None => std::env::var_os("OUT_DIR")
                .map(PathBuf::from)
                .ok_or(CodegenError::MissingEnv("OUT_DIR"))?,
        };

        let set = DeclarationSet::from_path(feed)?;
        let project = Generator::new(self.options).generate(&set)?;

        std::fs::create_dir_all(&out_dir)?;
        let mut written = Vec::with_capacity(project.files.len());
        for file in &project.files {
            let path = out_dir.join(&file.path);
            std::fs::write(&path, &file.content)?;
            written.push(path);
        }

        tracing::debug!(files = written.len(), out_dir = %out_dir.display(), "wrote generated files");
        Ok(written)
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}
