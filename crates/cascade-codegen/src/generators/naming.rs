//! Identifier and file naming.

use convert_case::{Case, Casing};

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true",
    "type", "unsafe", "use", "where", "while", "abstract", "become", "box", "do", "final",
    "macro", "override", "priv", "try", "typeof", "unsized", "virtual", "yield",
];

/// Snake-case identifier for a property, suffixed with `_` when it collides
/// with a keyword so that `set_<name>` and friends stay valid.
pub fn property_ident(name: &str) -> String {
    let ident = name.to_case(Case::Snake);
    if KEYWORDS.contains(&ident.as_str()) {
        format!("{}_", ident)
    } else {
        ident
    }
}

/// Module name for a namespace segment or container type.
pub fn module_ident(name: &str) -> String {
    property_ident(name)
}

/// Output file name: `<namespace or "global">_<containers>_<name>.rs`.
pub fn file_name(namespace: Option<&str>, containers: &[String], name: &str) -> String {
    let mut parts = vec![namespace
        .map(|ns| ns.replace('.', "_").replace("::", "_"))
        .unwrap_or_else(|| "global".to_string())];
    parts.extend(containers.iter().cloned());
    parts.push(name.to_string());

    let stem = parts
        .iter()
        .map(|part| part.to_case(Case::Snake))
        .collect::<Vec<_>>()
        .join("_");
    format!("{}.rs", stem)
}

/// Namespace split into module path segments (`a.b` or `a::b`).
pub fn namespace_segments(namespace: &str) -> Vec<String> {
    namespace
        .split(['.', ':'])
        .filter(|segment| !segment.is_empty())
        .map(module_ident)
        .collect()
}
