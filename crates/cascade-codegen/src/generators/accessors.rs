//! Per-property storage, getters and assignment bodies.

use super::naming::property_ident;
use super::{CELL, OPTION, RC, REF_CELL};
use crate::emit::CodeSink;
use crate::model::{PropertyKind, PropertyModel};

/// Emits everything one property contributes to its type.
pub(crate) struct PropertyAccessors<'a> {
    pub(crate) property: &'a PropertyModel,
    rt: &'a str,
    ident: String,
}

impl<'a> PropertyAccessors<'a> {
    pub(crate) fn new(property: &'a PropertyModel, rt: &'a str) -> Self {
        Self {
            property,
            rt,
            ident: property_ident(&property.name),
        }
    }

    pub(crate) fn ident(&self) -> &str {
        &self.ident
    }

    fn latch(&self) -> String {
        format!("__{}_wired", self.ident)
    }

    fn wiring(&self) -> String {
        format!("__{}_wiring", self.ident)
    }

    /// Whether a subscription slot is kept for the held value.
    fn has_wiring(&self) -> bool {
        !self.property.kind.is_value() && self.property.has_notifications()
    }

    /// Type held inside the `Rc` for reference kinds.
    fn pointee(&self) -> String {
        match &self.property.kind {
            PropertyKind::Value | PropertyKind::Object => self.property.ty.to_string(),
            PropertyKind::Collection { element } => format!("dyn {}::List<{}>", self.rt, element),
            PropertyKind::Dictionary { key, element } => {
                format!("dyn {}::Map<{}, {}>", self.rt, key, element)
            }
        }
    }

    /// Type seen by callers of the getter and setter.
    pub(crate) fn public_type(&self) -> String {
        match self.property.kind {
            PropertyKind::Value => self.property.ty.to_string(),
            _ => format!("{}<{}<{}>>", OPTION, RC, self.pointee()),
        }
    }

    /// Type an initializer expression must produce.
    fn initializer_type(&self) -> String {
        match self.property.kind {
            PropertyKind::Value => self.property.ty.to_string(),
            _ => format!("{}<{}>", RC, self.pointee()),
        }
    }

    pub(crate) fn constructor_param(&self) -> String {
        format!("{}: {}", self.ident, self.public_type())
    }

    /// Stored directly by the constructor rather than assigned after it.
    pub(crate) fn stores_param_directly(&self) -> bool {
        self.property.required && self.property.kind.is_value()
    }

    /// Assigned through `__set_<name>` once the instance exists.
    pub(crate) fn assigns_param(&self) -> bool {
        self.property.required && !self.property.kind.is_value()
    }

    pub(crate) fn emit_fields<S: CodeSink>(&self, sink: &mut S) {
        sink.line(&format!(
            "{}: {}<{}>,",
            self.ident,
            REF_CELL,
            self.public_type()
        ));
        if self.property.has_default_initializer {
            sink.line(&format!("{}: {}<bool>,", self.latch(), CELL));
        }
        if self.has_wiring() {
            sink.line(&format!(
                "{}: {}<{}::Wiring>,",
                self.wiring(),
                REF_CELL,
                self.rt
            ));
        }
    }

    /// `let` binding that evaluates the initializer, if one runs at construction.
    pub(crate) fn emit_initializer_binding<S: CodeSink>(&self, sink: &mut S) {
        if self.property.required {
            return;
        }
        if let Some(expression) = &self.property.initializer {
            sink.line(&format!(
                "let __init_{}: {} = {};",
                self.ident,
                self.initializer_type(),
                expression
            ));
        }
    }

    pub(crate) fn emit_field_inits<S: CodeSink>(&self, sink: &mut S) {
        let initial = if self.stores_param_directly() {
            self.ident.clone()
        } else if self.property.initializer.is_some() && !self.property.required {
            match self.property.kind {
                PropertyKind::Value => format!("__init_{}", self.ident),
                _ => format!("{}::Some(__init_{})", OPTION, self.ident),
            }
        } else {
            match self.property.kind {
                PropertyKind::Value => "::std::default::Default::default()".to_string(),
                _ => format!("{}::None", OPTION),
            }
        };

        sink.line(&format!("{}: {}::new({}),", self.ident, REF_CELL, initial));
        if self.property.has_default_initializer {
            sink.line(&format!("{}: {}::new(false),", self.latch(), CELL));
        }
        if self.has_wiring() {
            sink.line(&format!(
                "{}: {}::new({}::Wiring::new()),",
                self.wiring(),
                REF_CELL,
                self.rt
            ));
        }
    }

    fn emit_posture<S: CodeSink>(&self, sink: &mut S) {
        let property = self.property;
        if let Some(doc) = &property.doc {
            for line in doc.lines() {
                sink.line(&format!("/// {}", line).trim_end().to_string());
            }
        }
        let posture = if property.is_sealed {
            Some("Sealed accessor.")
        } else if property.is_override {
            Some("Overrides the base accessor.")
        } else if property.is_virtual {
            Some("Overridable accessor.")
        } else {
            None
        };
        if let Some(posture) = posture {
            if property.doc.is_some() {
                sink.line("///");
            }
            sink.line(&format!("/// {}", posture));
        }
    }

    pub(crate) fn emit_getter<S: CodeSink>(&self, sink: &mut S) {
        self.emit_posture(sink);
        let header = format!(
            "{}fn {}(&self) -> {}",
            self.property.get_accessibility.visibility(),
            self.ident,
            self.public_type()
        );
        sink.block(&header, |sink| {
            if self.property.has_default_initializer {
                sink.block(&format!("if !self.{}.get()", self.latch()), |sink| {
                    sink.line(&format!("let current = self.{}.borrow().clone();", self.ident));
                    if self.property.kind.is_wrapped() {
                        // A raw initializer is wrapped on first read.
                        sink.block("if let Some(value) = current", |sink| {
                            sink.open(&format!("if {}.is_none()", self.as_tracked("value")));
                            self.emit_store(sink);
                            sink.dedent();
                            sink.open("} else");
                            sink.line("let stored = value;");
                            self.emit_attach(sink);
                            sink.close();
                            sink.line(&format!("self.{}.set(true);", self.latch()));
                        });
                    } else {
                        sink.block("if let Some(stored) = current", |sink| {
                            self.emit_attach(sink);
                            sink.line(&format!("self.{}.set(true);", self.latch()));
                        });
                    }
                });
            }
            sink.line(&format!("self.{}.borrow().clone()", self.ident));
        });
    }

    /// Public setter (or consuming `with_` builder for init-only properties).
    pub(crate) fn emit_setter<S: CodeSink>(&self, sink: &mut S) {
        let Some(accessibility) = self.property.set_accessibility else {
            return;
        };
        let vis = accessibility.visibility();
        let ty = self.public_type();

        sink.blank();
        if self.property.init_only {
            let header = format!("{}fn with_{}(self, value: {}) -> Self", vis, self.ident, ty);
            sink.block(&header, |sink| {
                sink.line(&format!("self.__set_{}(value);", self.ident));
                sink.line("self");
            });
        } else {
            let header = format!("{}fn set_{}(&self, value: {})", vis, self.ident, ty);
            sink.block(&header, |sink| {
                sink.line(&format!("self.__set_{}(value);", self.ident));
            });
        }
    }

    /// The assignment body shared by setters and the constructor.
    pub(crate) fn emit_assignment<S: CodeSink>(&self, sink: &mut S) {
        let header = format!("fn __set_{}(&self, value: {})", self.ident, self.public_type());
        sink.block(&header, |sink| {
            if self.property.has_default_initializer {
                sink.line(&format!("self.{}.set(true);", self.latch()));
            }
            match self.property.kind {
                PropertyKind::Value => self.emit_value_assignment(sink),
                _ => self.emit_reference_assignment(sink),
            }
        });
    }

    fn emit_value_assignment<S: CodeSink>(&self, sink: &mut S) {
        sink.line(&format!("let changed = *self.{}.borrow() != value;", self.ident));
        sink.block("if changed", |sink| {
            self.emit_changing(sink);
            sink.line(&format!("*self.{}.borrow_mut() = value;", self.ident));
            self.emit_changed(sink);
        });
    }

    fn emit_reference_assignment<S: CodeSink>(&self, sink: &mut S) {
        sink.line(&format!("let current = self.{}.borrow().clone();", self.ident));
        let condition = format!(
            "if !{}::same_ref(current.as_ref(), value.as_ref())",
            self.rt
        );
        sink.open(&condition);
        self.emit_changing(sink);
        self.emit_detach(sink);
        sink.block("match value", |sink| {
            sink.block("Some(value) =>", |sink| {
                self.emit_store(sink);
            });
            sink.line(&format!("None => *self.{}.borrow_mut() = None,", self.ident));
        });
        self.emit_changed(sink);

        if self.property.kind.is_wrapped() {
            // Equal reference that was never wrapped: wrap it now, silently.
            sink.dedent();
            sink.open("} else if let Some(value) = value");
            sink.block(
                &format!("if {}.is_none()", self.as_tracked("value")),
                |sink| {
                    if self.has_wiring() {
                        sink.line(&format!("self.{}.borrow_mut().detach_all();", self.wiring()));
                    }
                    self.emit_store(sink);
                },
            );
        }
        sink.close();
    }

    fn as_tracked(&self, binding: &str) -> String {
        let abstraction = match self.property.kind {
            PropertyKind::Dictionary { .. } => "Map",
            _ => "List",
        };
        format!("{}::{}::as_tracked(&*{})", self.rt, abstraction, binding)
    }

    /// Expression building a fresh wrapper around a snapshot of `value`.
    fn wrapper_expression(&self) -> Option<String> {
        let (wrapper, constructor) = match self.property.kind {
            PropertyKind::Collection { .. } => ("TrackingList", "from_list"),
            PropertyKind::Dictionary { .. } => ("TrackingMap", "from_map"),
            _ => return None,
        };
        Some(match &self.property.observed_element {
            Some(element) => format!(
                "{}::{}::{}_observing(&*value, {}::tracked_element::<{}>)",
                self.rt, wrapper, constructor, self.rt, element
            ),
            None => format!("{}::{}::{}(&*value)", self.rt, wrapper, constructor),
        })
    }

    /// Store `value` (wrapping collections) and attach to what was stored.
    fn emit_store<S: CodeSink>(&self, sink: &mut S) {
        match self.wrapper_expression() {
            Some(wrapper) => sink.line(&format!(
                "let stored: {}<{}> = {}::new({});",
                RC,
                self.pointee(),
                RC,
                wrapper
            )),
            None => sink.line("let stored = value;"),
        }
        sink.line(&format!(
            "*self.{}.borrow_mut() = Some({}::clone(&stored));",
            self.ident, RC
        ));
        self.emit_attach(sink);
    }

    /// Install forwarding handlers on `stored` and fold in its dirty state.
    pub(crate) fn emit_attach<S: CodeSink>(&self, sink: &mut S) {
        let property = self.property;
        if !property.has_capabilities() {
            return;
        }

        if property.kind.is_wrapped() {
            let header = format!("if let Some(target) = {}", self.as_tracked("stored"));
            sink.block(&header, |sink| self.emit_attach_lines(sink, "target"));
        } else {
            self.emit_attach_lines(sink, "&*stored");
        }
    }

    fn emit_attach_lines<S: CodeSink>(&self, sink: &mut S, target: &str) {
        let property = self.property;
        sink.line("let tracker = self.__tracker();");
        if self.has_wiring() {
            sink.line(&format!("let mut wiring = self.{}.borrow_mut();", self.wiring()));
            let attachments = [
                (property.notifies_changing, "property_changing"),
                (property.notifies_changed, "property_changed"),
                (property.notifies_collection_changed, "collection_changed"),
            ];
            for (_, event) in attachments.iter().filter(|(enabled, _)| *enabled) {
                sink.line(&format!(
                    "wiring.attach_{}(tracker.forward_{}({}));",
                    event, event, target
                ));
            }
        }
        if property.participates_in_change_tracking {
            sink.line(&format!("tracker.absorb({});", target));
        }
    }

    fn emit_detach<S: CodeSink>(&self, sink: &mut S) {
        if !self.has_wiring() {
            return;
        }
        let property = self.property;
        sink.block("if current.is_some()", |sink| {
            sink.line(&format!("let mut wiring = self.{}.borrow_mut();", self.wiring()));
            if property.notifies_changing {
                sink.line("wiring.detach_property_changing();");
            }
            if property.notifies_changed {
                sink.line("wiring.detach_property_changed();");
            }
            if property.notifies_collection_changed {
                sink.line("wiring.detach_collection_changed();");
            }
        });
    }

    fn emit_changing<S: CodeSink>(&self, sink: &mut S) {
        sink.line(&format!(
            "self.__tracker().on_property_changing(\"{}\");",
            self.ident
        ));
    }

    fn emit_changed<S: CodeSink>(&self, sink: &mut S) {
        sink.line(&format!(
            "self.__tracker().on_property_changed(\"{}\");",
            self.ident
        ));
    }

    /// Recursive accept for a participating property.
    pub(crate) fn emit_accept<S: CodeSink>(&self, sink: &mut S) {
        if !self.property.participates_in_change_tracking {
            return;
        }
        let header = format!("if let Some(value) = self.{}()", self.ident);
        sink.block(&header, |sink| {
            if self.property.kind.is_wrapped() {
                sink.block(
                    &format!("if let Some(tracked) = {}", self.as_tracked("value")),
                    |sink| {
                        sink.line(&format!("{}::ChangeTracking::accept_changes(tracked);", self.rt));
                    },
                );
            } else {
                sink.line(&format!("{}::ChangeTracking::accept_changes(&*value);", self.rt));
            }
        });
    }

    /// Equality term for record types.
    pub(crate) fn equality_term(&self) -> String {
        match self.property.kind {
            PropertyKind::Value => format!(
                "*self.{0}.borrow() == *other.{0}.borrow()",
                self.ident
            ),
            _ => format!(
                "{1}::same_ref(self.{0}.borrow().as_ref(), other.{0}.borrow().as_ref())",
                self.ident, self.rt
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{TypeClassifier, TypeGraph};
    use crate::declaration::{PropertyDeclaration, TypeDeclaration, TypeRef};
    use crate::emit::{CodeWriter, Emission, EmitOp};

    fn classify(name: &str, ty: &str) -> PropertyModel {
        let mut graph = TypeGraph::with_builtins();
        graph.register_tracked(&TypeDeclaration::new("Leaf"));
        TypeClassifier::new(&graph)
            .classify_property(&PropertyDeclaration::new(name, TypeRef::parse(ty).unwrap()))
    }

    fn render(emit: impl FnOnce(&mut CodeWriter)) -> String {
        let mut writer = CodeWriter::new();
        emit(&mut writer);
        writer.finish()
    }

    #[test]
    fn test_value_assignment_is_equality_gated() {
        let property = classify("Count", "u32");
        let accessors = PropertyAccessors::new(&property, "::cascade_core");

        insta::assert_snapshot!(render(|w| accessors.emit_assignment(w)), @r###"
        fn __set_count(&self, value: u32) {
            let changed = *self.count.borrow() != value;
            if changed {
                self.__tracker().on_property_changing("count");
                *self.count.borrow_mut() = value;
                self.__tracker().on_property_changed("count");
            }
        }
        "###);
    }

    #[test]
    fn test_object_assignment_detaches_then_attaches() {
        let property = classify("leaf", "Leaf");
        let accessors = PropertyAccessors::new(&property, "::cascade_core");

        insta::assert_snapshot!(render(|w| accessors.emit_assignment(w)), @r###"
        fn __set_leaf(&self, value: ::std::option::Option<::std::rc::Rc<Leaf>>) {
            let current = self.leaf.borrow().clone();
            if !::cascade_core::same_ref(current.as_ref(), value.as_ref()) {
                self.__tracker().on_property_changing("leaf");
                if current.is_some() {
                    let mut wiring = self.__leaf_wiring.borrow_mut();
                    wiring.detach_property_changing();
                    wiring.detach_property_changed();
                    wiring.detach_collection_changed();
                }
                match value {
                    Some(value) => {
                        let stored = value;
                        *self.leaf.borrow_mut() = Some(::std::rc::Rc::clone(&stored));
                        let tracker = self.__tracker();
                        let mut wiring = self.__leaf_wiring.borrow_mut();
                        wiring.attach_property_changing(tracker.forward_property_changing(&*stored));
                        wiring.attach_property_changed(tracker.forward_property_changed(&*stored));
                        wiring.attach_collection_changed(tracker.forward_collection_changed(&*stored));
                        tracker.absorb(&*stored);
                    }
                    None => *self.leaf.borrow_mut() = None,
                }
                self.__tracker().on_property_changed("leaf");
            }
        }
        "###);
    }

    #[test]
    fn test_collection_assignment_wraps_in_both_branches() {
        let property = classify("items", "List<i32>");
        let accessors = PropertyAccessors::new(&property, "::cascade_core");

        let mut emission = Emission::new();
        accessors.emit_assignment(&mut emission);
        let code = emission.render();

        assert_eq!(code.matches("TrackingList::from_list(&*value)").count(), 2);
        assert!(code.contains("} else if let Some(value) = value {"));
        assert!(code.contains("self.__items_wiring.borrow_mut().detach_all();"));
        assert!(!code.contains("detach_property_changing"));
        assert!(emission
            .ops()
            .contains(&EmitOp::Open("if let Some(target) = ::cascade_core::List::as_tracked(&*stored)".to_string())));
    }

    #[test]
    fn test_dictionary_uses_map_wrapper() {
        let property = classify("prices", "Map<String, f64>");
        let accessors = PropertyAccessors::new(&property, "::cascade_core");

        assert_eq!(
            accessors.public_type(),
            "::std::option::Option<::std::rc::Rc<dyn ::cascade_core::Map<String, f64>>>"
        );
        let code = render(|w| accessors.emit_assignment(w));
        assert!(code.contains("::cascade_core::TrackingMap::from_map(&*value)"));
        assert!(code.contains("::cascade_core::Map::as_tracked(&*value).is_none()"));
    }

    #[test]
    fn test_plain_getter_has_no_latch() {
        let property = classify("value", "i32");
        let accessors = PropertyAccessors::new(&property, "::cascade_core");

        let code = render(|w| accessors.emit_getter(w));
        assert_eq!(code, "pub fn value(&self) -> i32 {\n    self.value.borrow().clone()\n}\n");
    }

    #[test]
    fn test_initialized_child_gets_lazy_getter() {
        let mut property = classify("leaf", "Leaf");
        property.initializer = Some("::std::rc::Rc::new(Leaf::new())".to_string());
        property.has_default_initializer = true;
        let accessors = PropertyAccessors::new(&property, "::cascade_core");

        let code = render(|w| accessors.emit_getter(w));
        assert!(code.contains("if !self.__leaf_wired.get() {"));
        assert!(code.contains("self.__leaf_wired.set(true);"));
        assert!(code.contains("tracker.absorb(&*stored);"));

        let setter = render(|w| accessors.emit_assignment(w));
        assert!(setter.starts_with(
            "fn __set_leaf(&self, value: ::std::option::Option<::std::rc::Rc<Leaf>>) {\n    self.__leaf_wired.set(true);"
        ));
    }

    #[test]
    fn test_initialized_collection_is_wrapped_on_first_read() {
        let mut property = classify("items", "List<i32>");
        property.initializer = Some("::std::rc::Rc::new(::std::cell::RefCell::new(vec![1]))".to_string());
        property.has_default_initializer = true;
        let accessors = PropertyAccessors::new(&property, "::cascade_core");

        let code = render(|w| accessors.emit_getter(w));
        assert!(code.contains("if ::cascade_core::List::as_tracked(&*value).is_none() {"));
        assert!(code.contains(
            "let stored: ::std::rc::Rc<dyn ::cascade_core::List<i32>> = ::std::rc::Rc::new(::cascade_core::TrackingList::from_list(&*value));"
        ));
        assert!(code.contains("*self.items.borrow_mut() = Some(::std::rc::Rc::clone(&stored));"));
        assert!(code.contains("} else {\n"));
        assert_eq!(code.matches("wiring.attach_collection_changed").count(), 2);
        assert_eq!(code.matches("self.__items_wired.set(true);").count(), 1);
    }

    #[test]
    fn test_tracked_elements_use_observing_wrappers() {
        let trees = classify("trees", "List<Rc<Leaf>>");
        let code = render(|w| PropertyAccessors::new(&trees, "::cascade_core").emit_assignment(w));
        assert_eq!(
            code.matches(
                "::cascade_core::TrackingList::from_list_observing(&*value, ::cascade_core::tracked_element::<Leaf>)"
            )
            .count(),
            2
        );

        let members = classify("members", "Map<String, Rc<Leaf>>");
        let code = render(|w| PropertyAccessors::new(&members, "::cascade_core").emit_assignment(w));
        assert!(code.contains(
            "::cascade_core::TrackingMap::from_map_observing(&*value, ::cascade_core::tracked_element::<Leaf>)"
        ));

        let numbers = classify("numbers", "List<i32>");
        let code = render(|w| PropertyAccessors::new(&numbers, "::cascade_core").emit_assignment(w));
        assert!(!code.contains("_observing"));
    }

    #[test]
    fn test_capability_free_object_has_no_wiring() {
        let property = classify("handle", "Opaque");
        let accessors = PropertyAccessors::new(&property, "::cascade_core");

        let mut fields = Emission::new();
        accessors.emit_fields(&mut fields);
        assert_eq!(fields.ops().len(), 1);

        let code = render(|w| accessors.emit_assignment(w));
        assert!(!code.contains("wiring"));
        assert!(!code.contains("tracker.absorb"));
    }

    #[test]
    fn test_init_only_setter_consumes() {
        let mut property = classify("nickname", "String");
        property.init_only = true;
        let accessors = PropertyAccessors::new(&property, "::cascade_core");

        let code = render(|w| accessors.emit_setter(w));
        assert!(code.contains("pub fn with_nickname(self, value: String) -> Self {"));
    }
}
