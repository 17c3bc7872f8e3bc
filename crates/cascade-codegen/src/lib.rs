//! Build-time generation of cascading change tracking.
//!
//! This crate reads declarations of types marked for change tracking and
//! generates, for each one, the Rust implementation of the `cascade-core`
//! protocol: own/cascaded dirty state, change notifications, forwarding of
//! child notifications to the parent, and tracking wrappers around list and
//! map properties.
//!
//! # Features
//!
//! - `format` - Re-format generated source with `prettyplease` (default)
//!
//! # Example
//!
//! ```ignore
//! use cascade_codegen::{DeclarationSet, Generator, GeneratorOptions};
//!
//! let set = DeclarationSet::from_path("tracked.json")?;
//! let project = Generator::new(GeneratorOptions::default()).generate(&set)?;
//! for file in &project.files {
//!     println!("{}: {} bytes", file.path, file.content.len());
//! }
//! ```

pub mod analyzer;
pub mod declaration;
pub mod driver;
pub mod emit;
pub mod error;
pub mod generators;
pub mod model;

pub use analyzer::{
    CancellationToken, Cancelled, Capability, CapabilitySet, TypeClassifier, TypeGraph, TypeInfo,
    TypeKind,
};
pub use declaration::{
    Accessibility, DeclarationSet, PropertyDeclaration, TypeDeclaration, TypeRef,
};
pub use driver::{Builder, Generator, GeneratorOptions, DEFAULT_INDEX_FILE};
pub use emit::{CodeSink, CodeWriter, EmitOp, Emission};
pub use error::{CodegenError, Result};
pub use generators::{
    GeneratedFile, GeneratedProject, IndexEntry, TrackingGenerator, DEFAULT_RUNTIME_PATH,
};
pub use model::{PropertyKind, PropertyModel, TypeModel};
