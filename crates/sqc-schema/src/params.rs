//! # Parameter Substitution
//!
//! Scenario files may declare named constants in `ParameterDeclaration`
//! elements and reference them as `$name` anywhere in attribute values.
//! Before the model is loaded, every reference to a constant is replaced in
//! the raw text by the declared value.
//!
//! Declarations nested inside the `Storyboard` are runtime parameters and
//! are left untouched, so their `$name` references survive into the model.
//! The checkers skip such placeholder names.
//!
//! Replacement is plain text, applied in declaration order: with parameters
//! `speed` and `speed_max`, `$speed_max` is rewritten by the `speed` rule
//! first.

use roxmltree::Document;

use sqc_core::PLACEHOLDER_MARKER;

/// A `name → value` parameter declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDeclaration {
    pub name: String,
    pub value: String,
}

/// Collect declarations that are not nested inside the `Storyboard`.
///
/// Declarations without a `name` are ignored. A missing `value` is treated
/// as the empty string.
pub fn collect_parameters(document: &Document<'_>) -> Vec<ParameterDeclaration> {
    let mut params: Vec<ParameterDeclaration> = Vec::new();
    for node in document
        .descendants()
        .filter(|n| n.has_tag_name("ParameterDeclaration"))
    {
        if node.ancestors().any(|a| a.has_tag_name("Storyboard")) {
            continue;
        }
        let Some(name) = node.attribute("name") else {
            continue;
        };
        let value = node.attribute("value").unwrap_or_default().to_string();
        // Later declarations of the same name override earlier ones.
        match params.iter_mut().find(|p| p.name == name) {
            Some(existing) => existing.value = value,
            None => params.push(ParameterDeclaration {
                name: name.to_string(),
                value,
            }),
        }
    }
    params
}

/// Replace every `$name` occurrence by its value.
pub fn substitute_parameters(content: &str, params: &[ParameterDeclaration]) -> String {
    let mut out = content.to_string();
    for param in params {
        let placeholder = format!("{PLACEHOLDER_MARKER}{}", param.name);
        if out.contains(&placeholder) {
            out = out.replace(&placeholder, &param.value);
        }
    }
    out
}
