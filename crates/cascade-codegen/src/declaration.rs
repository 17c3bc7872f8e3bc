//! Declaration feed: the types to instrument and the resolved types they reference.
//!
//! The feed is the JSON document a build script hands to the generator. Type
//! references are written the way they appear in Rust source
//! (`"Map<String, f64>"`, `"(i32, bool)"`) and parsed into [`TypeRef`].

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::analyzer::TypeInfo;
use crate::error::{CodegenError, Result};

/// Pseudo-name used for tuple types.
pub const TUPLE: &str = "tuple";

/// A reference to a (possibly generic) type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TypeRef {
    /// Type name, possibly a path (`std::rc::Rc`).
    pub name: String,
    /// Generic arguments in declaration order.
    pub args: Vec<TypeRef>,
}

impl TypeRef {
    /// A non-generic type.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// A generic type applied to `args`.
    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            name: name.into(),
            args,
        }
    }

    pub fn tuple(items: Vec<TypeRef>) -> Self {
        Self::generic(TUPLE, items)
    }

    pub fn is_tuple(&self) -> bool {
        self.name == TUPLE
    }

    /// Last path segment of the name.
    pub fn base_name(&self) -> &str {
        self.name.rsplit("::").next().unwrap_or(&self.name)
    }

    /// Parse a type written in Rust syntax.
    pub fn parse(input: &str) -> Result<Self> {
        let mut parser = TypeRefParser { input, pos: 0 };
        let ty = parser.parse_type()?;
        parser.skip_ws();
        if parser.pos != input.len() {
            return Err(parser.error("unexpected trailing input"));
        }
        Ok(ty)
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args = self
            .args
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        if self.is_tuple() {
            match self.args.len() {
                1 => write!(f, "({},)", args),
                _ => write!(f, "({})", args),
            }
        } else if self.args.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}<{}>", self.name, args)
        }
    }
}

impl TryFrom<String> for TypeRef {
    type Error = CodegenError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<TypeRef> for String {
    fn from(value: TypeRef) -> Self {
        value.to_string()
    }
}

struct TypeRefParser<'a> {
    input: &'a str,
    pos: usize,
}

impl TypeRefParser<'_> {
    fn parse_type(&mut self) -> Result<TypeRef> {
        self.skip_ws();
        if self.eat('(') {
            let items = self.parse_list(')')?;
            return Ok(TypeRef::tuple(items));
        }

        let name = self.parse_path()?;
        self.skip_ws();
        let args = if self.eat('<') {
            self.parse_list('>')?
        } else {
            Vec::new()
        };
        Ok(TypeRef::generic(name, args))
    }

    fn parse_list(&mut self, close: char) -> Result<Vec<TypeRef>> {
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(close) {
                return Ok(items);
            }
            items.push(self.parse_type()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(close) {
                return Ok(items);
            }
            return Err(self.error(&format!("expected ',' or '{}'", close)));
        }
    }

    fn parse_path(&mut self) -> Result<String> {
        let rest = &self.input[self.pos..];
        let len = rest
            .char_indices()
            .find(|(_, c)| !(c.is_alphanumeric() || *c == '_' || *c == ':'))
            .map(|(index, _)| index)
            .unwrap_or(rest.len());

        if len == 0 {
            return Err(self.error("expected a type name"));
        }
        self.pos += len;
        Ok(rest[..len].to_string())
    }

    fn skip_ws(&mut self) {
        let rest = &self.input[self.pos..];
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, expected: char) -> bool {
        if self.input[self.pos..].starts_with(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> CodegenError {
        CodegenError::InvalidTypeRef {
            input: self.input.to_string(),
            message: format!("{} at offset {}", message, self.pos),
        }
    }
}

/// Declared accessibility of a property or accessor.
///
/// Ordered from narrowest to widest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accessibility {
    Private,
    ProtectedAndInternal,
    Protected,
    Internal,
    ProtectedOrInternal,
    #[default]
    Public,
}

impl Accessibility {
    fn rank(self) -> u8 {
        match self {
            Self::Private => 0,
            Self::ProtectedAndInternal => 1,
            Self::Protected | Self::Internal => 2,
            Self::ProtectedOrInternal => 3,
            Self::Public => 4,
        }
    }

    /// The narrower of `self` and `other`.
    pub fn narrowest(self, other: Self) -> Self {
        if other.rank() < self.rank() {
            other
        } else {
            self
        }
    }

    /// Rust visibility prefix, including the trailing space.
    pub fn visibility(self) -> &'static str {
        match self {
            Self::Public => "pub ",
            Self::Private => "",
            _ => "pub(crate) ",
        }
    }
}

/// One property of a declared type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: TypeRef,
    #[serde(default)]
    pub accessibility: Accessibility,
    /// Getter accessibility; `None` inherits the property's.
    #[serde(default)]
    pub getter: Option<Accessibility>,
    /// Setter accessibility; `None` inherits the property's.
    #[serde(default)]
    pub setter: Option<Accessibility>,
    /// No public setter is generated.
    #[serde(default)]
    pub read_only: bool,
    /// Value must be supplied to the constructor.
    #[serde(default)]
    pub required: bool,
    /// Settable only while the instance is being built.
    #[serde(default)]
    pub init_only: bool,
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    #[serde(default, rename = "override")]
    pub is_override: bool,
    #[serde(default)]
    pub sealed: bool,
    /// Rust expression evaluated at construction.
    #[serde(default)]
    pub initializer: Option<String>,
    #[serde(default)]
    pub doc: Option<String>,
}

impl PropertyDeclaration {
    /// Public read/write property with no initializer.
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty,
            accessibility: Accessibility::Public,
            getter: None,
            setter: None,
            read_only: false,
            required: false,
            init_only: false,
            is_virtual: false,
            is_override: false,
            sealed: false,
            initializer: None,
            doc: None,
        }
    }

    pub fn with_initializer(mut self, expression: impl Into<String>) -> Self {
        self.initializer = Some(expression.into());
        self
    }
}

/// A type carrying the change-tracking marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    /// Enclosing types, outermost first.
    #[serde(default)]
    pub containers: Vec<String>,
    #[serde(default)]
    pub sealed: bool,
    /// Value-semantics equality.
    #[serde(default)]
    pub record: bool,
    #[serde(default)]
    pub base: Option<String>,
    #[serde(default)]
    pub properties: Vec<PropertyDeclaration>,
    #[serde(default)]
    pub doc: Option<String>,
}

impl TypeDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: None,
            containers: Vec::new(),
            sealed: false,
            record: false,
            base: None,
            properties: Vec::new(),
            doc: None,
        }
    }

    pub fn with_base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    pub fn with_property(mut self, property: PropertyDeclaration) -> Self {
        self.properties.push(property);
        self
    }

    /// `namespace::Container::Name`, for diagnostics.
    pub fn qualified_name(&self) -> String {
        self.namespace
            .iter()
            .chain(self.containers.iter())
            .chain(std::iter::once(&self.name))
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("::")
    }
}

/// The full feed for one generation pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeclarationSet {
    /// Resolved types referenced by properties and bases.
    #[serde(default)]
    pub types: IndexMap<String, TypeInfo>,
    /// Types to instrument, in output order.
    #[serde(default)]
    pub declarations: Vec<TypeDeclaration>,
}

impl DeclarationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let set: Self = serde_json::from_str(json)?;
        set.validate()?;
        Ok(set)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Reject feeds the generator cannot place: declarations share one
    /// name space, and a property name appears once per type.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for decl in &self.declarations {
            if !names.insert(decl.name.as_str()) {
                return Err(CodegenError::InvalidDeclaration(format!(
                    "duplicate type '{}'",
                    decl.qualified_name()
                )));
            }

            let mut properties = HashSet::new();
            for property in &decl.properties {
                if !properties.insert(property.name.as_str()) {
                    return Err(CodegenError::InvalidDeclaration(format!(
                        "duplicate property '{}' on '{}'",
                        property.name,
                        decl.qualified_name()
                    )));
                }
            }
        }
        Ok(())
    }
}
