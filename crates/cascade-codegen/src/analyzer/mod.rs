//! Type classification for code generation.
//!
//! [`TypeClassifier`] turns a [`TypeDeclaration`] into a [`TypeModel`]. It is a
//! pure function of the declaration and the [`TypeGraph`]: no state survives
//! between calls, so the driver may classify independent types concurrently.

mod cancel;
mod graph;

pub use cancel::{CancellationToken, Cancelled};
pub use graph::{Capability, CapabilitySet, TypeGraph, TypeInfo, TypeKind};

use crate::declaration::{PropertyDeclaration, TypeDeclaration, TypeRef};
use crate::model::{PropertyKind, PropertyModel, TypeModel};

/// Classifies declarations against a type graph.
pub struct TypeClassifier<'g> {
    graph: &'g TypeGraph,
}

impl<'g> TypeClassifier<'g> {
    /// Create a classifier over `graph`.
    pub fn new(graph: &'g TypeGraph) -> Self {
        Self { graph }
    }

    /// Classify `decl`. Total over well-formed declarations.
    pub fn classify(&self, decl: &TypeDeclaration) -> TypeModel {
        let properties = decl
            .properties
            .iter()
            .map(|property| self.classify_property(property))
            .collect();
        self.type_model(decl, properties)
    }

    /// Classify `decl`, abandoning the pass as soon as `token` is cancelled.
    pub fn classify_with(
        &self,
        decl: &TypeDeclaration,
        token: &CancellationToken,
    ) -> Result<TypeModel, Cancelled> {
        token.check()?;

        let mut properties = Vec::with_capacity(decl.properties.len());
        for property in &decl.properties {
            token.check()?;
            properties.push(self.classify_property(property));
        }
        Ok(self.type_model(decl, properties))
    }

    fn type_model(&self, decl: &TypeDeclaration, properties: Vec<PropertyModel>) -> TypeModel {
        let base = decl.base.as_deref();
        let inherits_tracking = base.is_some_and(|base| self.graph.is_tracked(base));
        let surface = base
            .map(|base| self.graph.capabilities(base))
            .unwrap_or_default();

        tracing::debug!(
            name = %decl.qualified_name(),
            inherits_tracking,
            properties = properties.len(),
            "classified type"
        );

        TypeModel {
            name: decl.name.clone(),
            namespace: decl.namespace.clone(),
            containers: decl.containers.clone(),
            sealed: decl.sealed,
            record: decl.record,
            base: decl.base.clone(),
            inherits_tracking,
            has_property_changing: surface.property_changing,
            has_property_changed: surface.property_changed,
            has_collection_changed: surface.collection_changed,
            properties,
            doc: decl.doc.clone(),
        }
    }

    /// Classify one property. Rules apply in order; Object is the residual case.
    pub fn classify_property(&self, property: &PropertyDeclaration) -> PropertyModel {
        let ty = &property.ty;
        let info = self.graph.resolve(&ty.name);

        let (kind, caps) = match (info.kind, ty.args.as_slice()) {
            (kind, _) if kind.is_value() => (PropertyKind::Value, CapabilitySet::default()),
            (TypeKind::MapAbstraction, [key, element]) => (
                PropertyKind::Dictionary {
                    key: key.clone(),
                    element: element.clone(),
                },
                wrapper_capabilities(),
            ),
            (TypeKind::SequenceAbstraction, [element]) => (
                PropertyKind::Collection {
                    element: element.clone(),
                },
                wrapper_capabilities(),
            ),
            _ if info.tracked => (PropertyKind::Object, CapabilitySet::all()),
            _ => (PropertyKind::Object, self.graph.capabilities(&ty.name)),
        };

        let accessibility = property.accessibility;
        let get_accessibility = property
            .getter
            .unwrap_or(accessibility)
            .narrowest(accessibility);
        let set_accessibility = (!property.read_only).then(|| {
            property
                .setter
                .unwrap_or(accessibility)
                .narrowest(accessibility)
        });

        let mut model = PropertyModel {
            name: property.name.clone(),
            ty: ty.clone(),
            kind,
            accessibility,
            get_accessibility,
            set_accessibility,
            required: property.required,
            init_only: property.init_only,
            is_virtual: property.is_virtual,
            is_override: property.is_override,
            is_sealed: property.sealed,
            notifies_changing: caps.property_changing,
            notifies_changed: caps.property_changed,
            notifies_collection_changed: caps.collection_changed,
            participates_in_change_tracking: caps.change_tracking,
            has_default_initializer: false,
            observed_element: None,
            initializer: property.initializer.clone(),
            doc: property.doc.clone(),
        };
        model.has_default_initializer = model.initializer.is_some() && model.has_capabilities();
        model.observed_element = match &model.kind {
            PropertyKind::Collection { element } | PropertyKind::Dictionary { element, .. } => {
                self.observed_element(element)
            }
            _ => None,
        };

        tracing::trace!(
            property = %model.name,
            ty = %model.ty,
            kind = ?model.kind,
            "classified property"
        );
        model
    }

    /// The `X` of an `Rc<X>` element when `X` can be observed as a whole:
    /// a tracked type, or one with every surface a wrapper forwards.
    fn observed_element(&self, element: &TypeRef) -> Option<TypeRef> {
        let [inner] = element.args.as_slice() else {
            return None;
        };
        if element.base_name() != SHARED_POINTER || !inner.args.is_empty() {
            return None;
        }
        let caps = self.graph.capabilities(&inner.name);
        let observable = self.graph.is_tracked(&inner.name)
            || (caps.property_changed && caps.collection_changed && caps.change_tracking);
        observable.then(|| inner.clone())
    }
}

const SHARED_POINTER: &str = "Rc";

/// What a tracking wrapper always supplies.
fn wrapper_capabilities() -> CapabilitySet {
    CapabilitySet {
        property_changing: false,
        property_changed: true,
        collection_changed: true,
        change_tracking: true,
    }
}
