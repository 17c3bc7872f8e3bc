//! Type-level scaffolding: struct, constructor, tracker, accept-changes and
//! the capability trait impls.

use super::accessors::PropertyAccessors;
use super::RC;
use crate::emit::CodeSink;
use crate::model::TypeModel;

/// Emits one tracked type.
pub(crate) struct TypeScaffold<'a> {
    model: &'a TypeModel,
    rt: &'a str,
    properties: Vec<PropertyAccessors<'a>>,
}

impl<'a> TypeScaffold<'a> {
    pub(crate) fn new(model: &'a TypeModel, rt: &'a str) -> Self {
        let properties = model
            .properties
            .iter()
            .map(|property| PropertyAccessors::new(property, rt))
            .collect();
        Self {
            model,
            rt,
            properties,
        }
    }

    pub(crate) fn emit<S: CodeSink>(&self, sink: &mut S) {
        self.emit_struct(sink);
        sink.blank();
        self.emit_inherent_impl(sink);

        if self.required_params().is_empty() {
            sink.blank();
            self.emit_default(sink);
        }
        if let Some(base) = &self.model.base {
            sink.blank();
            self.emit_deref(sink, base);
        }
        sink.blank();
        self.emit_notification_impls(sink);
        sink.blank();
        self.emit_tracking_impls(sink);
        if self.model.record {
            sink.blank();
            self.emit_equality(sink);
        }
    }

    fn name(&self) -> &str {
        &self.model.name
    }

    /// Visibility for the protocol hooks. Sealed types keep them private.
    fn hook_visibility(&self) -> &'static str {
        if self.model.sealed {
            ""
        } else {
            "pub "
        }
    }

    fn emit_hook_attrs<S: CodeSink>(&self, sink: &mut S) {
        if !self.model.sealed {
            sink.line("#[doc(hidden)]");
        }
    }

    fn required_params(&self) -> Vec<String> {
        self.properties
            .iter()
            .filter(|p| p.property.required)
            .map(PropertyAccessors::constructor_param)
            .collect()
    }

    fn emit_struct<S: CodeSink>(&self, sink: &mut S) {
        let model = self.model;
        if let Some(doc) = &model.doc {
            for line in doc.lines() {
                sink.line(format!("/// {}", line).trim_end());
            }
        }
        if model.sealed {
            if model.doc.is_some() {
                sink.line("///");
            }
            sink.line("/// Sealed: not intended as a base.");
        }
        sink.block(&format!("pub struct {}", self.name()), |sink| {
            if let Some(base) = &model.base {
                sink.line(&format!("__base: {},", base));
            }
            if model.defines_tracking() {
                sink.line(&format!("__tracker: {}<{}::Tracker>,", RC, self.rt));
            }
            for property in &self.properties {
                property.emit_fields(sink);
            }
        });
    }

    fn emit_inherent_impl<S: CodeSink>(&self, sink: &mut S) {
        sink.line("#[allow(dead_code)]");
        sink.block(&format!("impl {}", self.name()), |sink| {
            self.emit_constructor(sink);
            sink.blank();
            self.emit_tracker_hook(sink);
            sink.blank();
            self.emit_accept_hook(sink);

            for property in &self.properties {
                sink.blank();
                property.emit_getter(sink);
                property.emit_setter(sink);
                sink.blank();
                property.emit_assignment(sink);
            }
        });
    }

    fn emit_constructor<S: CodeSink>(&self, sink: &mut S) {
        let model = self.model;
        let params = self.required_params().join(", ");
        let assigns: Vec<&PropertyAccessors<'_>> =
            self.properties.iter().filter(|p| p.assigns_param()).collect();

        sink.block(&format!("pub fn new({}) -> Self", params), |sink| {
            if let Some(base) = &model.base {
                sink.line(&format!(
                    "let __base: {} = ::std::default::Default::default();",
                    base
                ));
            }
            if model.defines_tracking() {
                self.emit_tracker_binding(sink);
            }
            for property in &self.properties {
                property.emit_initializer_binding(sink);
            }

            let binding = if assigns.is_empty() { "Self" } else { "let this = Self" };
            sink.open(binding);
            if model.base.is_some() {
                sink.line("__base,");
            }
            if model.defines_tracking() {
                sink.line("__tracker,");
            }
            for property in &self.properties {
                property.emit_field_inits(sink);
            }

            if assigns.is_empty() {
                sink.close();
            } else {
                sink.close_with(";");
                for property in &assigns {
                    sink.line(&format!(
                        "this.__set_{0}({0});",
                        property.ident()
                    ));
                }
                sink.line("this.__tracker().clear_own_changed();");
                sink.line("this");
            }
        });
    }

    /// Build the tracker, reusing any event the base already exposes.
    fn emit_tracker_binding<S: CodeSink>(&self, sink: &mut S) {
        let model = self.model;
        let reused = [
            (model.has_property_changing, "NotifyPropertyChanging", "property_changing"),
            (model.has_property_changed, "NotifyPropertyChanged", "property_changed"),
            (model.has_collection_changed, "NotifyCollectionChanged", "collection_changed"),
        ];
        let reused: Vec<_> = reused.iter().filter(|(present, _, _)| *present).collect();

        if reused.is_empty() {
            sink.line(&format!("let __tracker = {}::Tracker::new();", self.rt));
            return;
        }

        sink.line(&format!("let __tracker = {}::Tracker::builder()", self.rt));
        sink.indent();
        for (_, capability, event) in reused {
            sink.line(&format!(
                ".{event}({rt}::{capability}::{event}(&__base).clone())",
                event = event,
                rt = self.rt,
                capability = capability
            ));
        }
        sink.line(".build();");
        sink.dedent();
    }

    fn emit_tracker_hook<S: CodeSink>(&self, sink: &mut S) {
        self.emit_hook_attrs(sink);
        let header = format!(
            "{}fn __tracker(&self) -> &{}<{}::Tracker>",
            self.hook_visibility(),
            RC,
            self.rt
        );
        sink.block(&header, |sink| {
            if self.model.defines_tracking() {
                sink.line("&self.__tracker");
            } else {
                sink.line("self.__base.__tracker()");
            }
        });
    }

    fn emit_accept_hook<S: CodeSink>(&self, sink: &mut S) {
        self.emit_hook_attrs(sink);
        let header = format!("{}fn __accept_changes(&self)", self.hook_visibility());
        let tracked: Vec<&PropertyAccessors<'_>> = self
            .properties
            .iter()
            .filter(|p| p.property.participates_in_change_tracking)
            .collect();

        sink.block(&header, |sink| {
            if self.model.defines_tracking() {
                sink.line("let tracker = self.__tracker();");
                sink.block("if tracker.is_cascaded_changed()", |sink| {
                    for property in &tracked {
                        property.emit_accept(sink);
                    }
                    sink.line("tracker.clear_cascaded_changed();");
                });
                sink.line("tracker.clear_own_changed();");
            } else {
                if !tracked.is_empty() {
                    sink.block("if self.__tracker().is_cascaded_changed()", |sink| {
                        for property in &tracked {
                            property.emit_accept(sink);
                        }
                    });
                }
                sink.line("self.__base.__accept_changes();");
            }
        });
    }

    fn emit_default<S: CodeSink>(&self, sink: &mut S) {
        sink.block(
            &format!("impl ::std::default::Default for {}", self.name()),
            |sink| {
                sink.block("fn default() -> Self", |sink| {
                    sink.line("Self::new()");
                });
            },
        );
    }

    fn emit_deref<S: CodeSink>(&self, sink: &mut S, base: &str) {
        sink.block(&format!("impl ::std::ops::Deref for {}", self.name()), |sink| {
            sink.line(&format!("type Target = {};", base));
            sink.blank();
            sink.block(&format!("fn deref(&self) -> &{}", base), |sink| {
                sink.line("&self.__base");
            });
        });
    }

    fn emit_notification_impls<S: CodeSink>(&self, sink: &mut S) {
        let model = self.model;
        let surfaces = [
            (
                model.has_property_changing,
                "NotifyPropertyChanging",
                "property_changing",
                "PropertyChangingArgs",
            ),
            (
                model.has_property_changed,
                "NotifyPropertyChanged",
                "property_changed",
                "PropertyChangedArgs",
            ),
            (
                model.has_collection_changed,
                "NotifyCollectionChanged",
                "collection_changed",
                "CollectionChangedArgs",
            ),
        ];

        for (index, (present, capability, event, args)) in surfaces.iter().enumerate() {
            if index > 0 {
                sink.blank();
            }
            let body = if model.inherits_tracking {
                format!("self.__tracker().{}()", event)
            } else if *present {
                format!("{}::{}::{}(&self.__base)", self.rt, capability, event)
            } else {
                format!("self.__tracker.{}()", event)
            };

            sink.block(
                &format!("impl {}::{} for {}", self.rt, capability, self.name()),
                |sink| {
                    let header = format!(
                        "fn {}(&self) -> &{}::Event<{}::{}>",
                        event, self.rt, self.rt, args
                    );
                    sink.block(&header, |sink| sink.line(&body));
                },
            );
        }
    }

    fn emit_tracking_impls<S: CodeSink>(&self, sink: &mut S) {
        let rt = self.rt;
        sink.block(
            &format!("impl {}::ChangeTracking for {}", rt, self.name()),
            |sink| {
                sink.block("fn is_changed(&self) -> bool", |sink| {
                    sink.line("self.__tracker().is_changed()");
                });
                sink.blank();
                sink.block("fn accept_changes(&self)", |sink| {
                    sink.line("self.__accept_changes();");
                });
            },
        );
        sink.blank();
        sink.block(
            &format!("impl {}::CascadingChangeTracking for {}", rt, self.name()),
            |sink| {
                sink.block("fn is_own_changed(&self) -> bool", |sink| {
                    sink.line("self.__tracker().is_own_changed()");
                });
                sink.blank();
                sink.block("fn is_cascaded_changed(&self) -> bool", |sink| {
                    sink.line("self.__tracker().is_cascaded_changed()");
                });
            },
        );
    }

    /// Value-semantics equality over this type's own properties.
    fn emit_equality<S: CodeSink>(&self, sink: &mut S) {
        let terms: Vec<String> = self
            .properties
            .iter()
            .map(PropertyAccessors::equality_term)
            .collect();
        let other = if terms.is_empty() { "_other" } else { "other" };

        sink.block(
            &format!("impl ::std::cmp::PartialEq for {}", self.name()),
            |sink| {
                sink.block(&format!("fn eq(&self, {}: &Self) -> bool", other), |sink| {
                    match terms.split_first() {
                        None => sink.line("true"),
                        Some((first, rest)) => {
                            sink.line(first);
                            sink.indent();
                            for term in rest {
                                sink.line(&format!("&& {}", term));
                            }
                            sink.dedent();
                        }
                    }
                });
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{Capability, TypeClassifier, TypeGraph, TypeInfo};
    use crate::declaration::{PropertyDeclaration, TypeDeclaration, TypeRef};
    use crate::emit::{CodeWriter, Emission};

    fn graph() -> TypeGraph {
        let mut graph = TypeGraph::with_builtins();
        graph.insert(
            "ObservableBase",
            TypeInfo::opaque().with_capabilities(&[
                Capability::PropertyChanging,
                Capability::PropertyChanged,
            ]),
        );
        graph
    }

    fn render(graph: &TypeGraph, decl: &TypeDeclaration) -> String {
        let model = TypeClassifier::new(graph).classify(decl);
        let mut writer = CodeWriter::new();
        TypeScaffold::new(&model, "::cascade_core").emit(&mut writer);
        writer.finish()
    }

    fn leaf() -> TypeDeclaration {
        TypeDeclaration::new("Leaf")
            .with_property(PropertyDeclaration::new("value", TypeRef::named("i32")))
    }

    #[test]
    fn test_root_definer_struct_and_accept() {
        let mut graph = graph();
        let leaf = leaf();
        graph.register_tracked(&leaf);
        let code = render(&graph, &leaf);

        insta::assert_snapshot!(code.split("\n\n").take(1).collect::<String>(), @r###"
        pub struct Leaf {
            __tracker: ::std::rc::Rc<::cascade_core::Tracker>,
            value: ::std::cell::RefCell<i32>,
        }
        "###);
        assert!(code.contains("let __tracker = ::cascade_core::Tracker::new();"));
        assert!(code.contains("tracker.clear_cascaded_changed();"));
        assert!(code.contains("impl ::std::default::Default for Leaf {"));
        assert!(code.contains("#[doc(hidden)]\n    pub fn __accept_changes(&self) {"));
        assert!(!code.contains("Deref"));
    }

    #[test]
    fn test_inheriting_type_shares_base_tracker() {
        let mut graph = graph();
        let base = leaf();
        let derived = TypeDeclaration::new("Twig")
            .with_base("Leaf")
            .with_property(PropertyDeclaration::new("child", TypeRef::named("Leaf")));
        graph.register_tracked(&base);
        graph.register_tracked(&derived);
        let code = render(&graph, &derived);

        assert!(!code.contains("__tracker: ::std::rc::Rc"));
        assert!(code.contains("self.__base.__tracker()"));
        assert!(code.contains("if self.__tracker().is_cascaded_changed() {"));
        assert!(code.contains("self.__base.__accept_changes();"));
        assert!(code.contains("type Target = Leaf;"));
        assert!(!code.contains("Tracker::new()"));
    }

    #[test]
    fn test_existing_surface_is_not_redeclared() {
        let mut graph = graph();
        let gadget = TypeDeclaration::new("Gadget")
            .with_base("ObservableBase")
            .with_property(PropertyDeclaration::new("label", TypeRef::named("String")));
        graph.register_tracked(&gadget);
        let code = render(&graph, &gadget);

        assert!(code.contains(
            ".property_changing(::cascade_core::NotifyPropertyChanging::property_changing(&__base).clone())"
        ));
        assert!(code.contains(
            ".property_changed(::cascade_core::NotifyPropertyChanged::property_changed(&__base).clone())"
        ));
        assert!(!code.contains(".collection_changed(::cascade_core"));
        assert!(code.contains("::cascade_core::NotifyPropertyChanged::property_changed(&self.__base)"));
        assert!(code.contains("self.__tracker.collection_changed()"));
    }

    #[test]
    fn test_sealed_hooks_are_private() {
        let mut graph = graph();
        let mut sealed = leaf();
        sealed.sealed = true;
        graph.register_tracked(&sealed);
        let code = render(&graph, &sealed);

        assert!(code.contains("\n    fn __accept_changes(&self) {"));
        assert!(code.contains("\n    fn __tracker(&self)"));
        assert!(!code.contains("#[doc(hidden)]"));
    }

    #[test]
    fn test_required_values_are_constructor_params() {
        let mut graph = graph();
        let mut name = PropertyDeclaration::new("name", TypeRef::named("String"));
        name.required = true;
        let mut leaf_prop = PropertyDeclaration::new("leaf", TypeRef::named("Leaf"));
        leaf_prop.required = true;
        graph.register_tracked(&leaf());
        let person = TypeDeclaration::new("Person")
            .with_property(name)
            .with_property(leaf_prop);
        graph.register_tracked(&person);
        let code = render(&graph, &person);

        assert!(code.contains(
            "pub fn new(name: String, leaf: ::std::option::Option<::std::rc::Rc<Leaf>>) -> Self {"
        ));
        assert!(code.contains("name: ::std::cell::RefCell::new(name),"));
        assert!(code.contains("this.__set_leaf(leaf);"));
        assert!(code.contains("this.__tracker().clear_own_changed();"));
        assert!(!code.contains("impl ::std::default::Default for Person"));
    }

    #[test]
    fn test_record_equality() {
        let mut graph = graph();
        let mut point = TypeDeclaration::new("Point")
            .with_property(PropertyDeclaration::new("x", TypeRef::named("i32")))
            .with_property(PropertyDeclaration::new("y", TypeRef::named("i32")));
        point.record = true;
        graph.register_tracked(&point);

        let model = TypeClassifier::new(&graph).classify(&point);
        let mut emission = Emission::new();
        TypeScaffold::new(&model, "::cascade_core").emit(&mut emission);

        assert!(emission
            .headers()
            .any(|header| header == "impl ::std::cmp::PartialEq for Point"));
        let code = emission.render();
        assert!(code.contains("*self.x.borrow() == *other.x.borrow()\n"));
        assert!(code.contains("&& *self.y.borrow() == *other.y.borrow()"));
    }

    #[test]
    fn test_every_type_implements_all_capabilities() {
        let mut graph = graph();
        graph.register_tracked(&leaf());
        let model = TypeClassifier::new(&graph).classify(&leaf());
        let mut emission = Emission::new();
        TypeScaffold::new(&model, "::cascade_core").emit(&mut emission);

        let impls: Vec<&str> = emission
            .headers()
            .filter(|header| header.starts_with("impl ::cascade_core::"))
            .collect();
        assert_eq!(
            impls,
            vec![
                "impl ::cascade_core::NotifyPropertyChanging for Leaf",
                "impl ::cascade_core::NotifyPropertyChanged for Leaf",
                "impl ::cascade_core::NotifyCollectionChanged for Leaf",
                "impl ::cascade_core::ChangeTracking for Leaf",
                "impl ::cascade_core::CascadingChangeTracking for Leaf",
            ]
        );
    }
}
