//! Identifier mangling shared by name suggestion and package naming.
//!
//! Source-language names may contain characters the target runtime does not accept
//! in identifiers (`<init>`, backquoted names, operators). Everything that ends up as
//! the text of a [`SymbolicName`](crate::scope::SymbolicName) passes through
//! [`sanitize_identifier`] first.

use std::sync::OnceLock;

use lodestar_core::CanonicalName;
use regex::Regex;

fn invalid_identifier_chars() -> &'static Regex {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    INVALID.get_or_init(|| Regex::new(r"[^A-Za-z0-9_$]").expect("identifier pattern is valid"))
}

/// Make `name` a valid target-runtime identifier
///
/// # Examples
/// ```
/// use lodestar_naming::naming::sanitize_identifier;
/// assert_eq!(sanitize_identifier("count"), "count");
/// assert_eq!(sanitize_identifier("<init>"), "_init_");
/// assert_eq!(sanitize_identifier("is valid?"), "is_valid_");
/// assert_eq!(sanitize_identifier("2d"), "_2d");
/// assert_eq!(sanitize_identifier(""), "_");
/// ```
pub fn sanitize_identifier(name: &str) -> String {
    if name.is_empty() {
        return "_".to_string();
    }
    let mut result = invalid_identifier_chars().replace_all(name, "_").into_owned();
    if result.starts_with(|c: char| c.is_ascii_digit()) {
        result.insert(0, '_');
    }
    result
}

/// Identifier of a package object: its last segment, or `root` for the root package
///
/// # Examples
/// ```
/// use lodestar_core::CanonicalName;
/// use lodestar_naming::naming::package_object_name;
/// assert_eq!(package_object_name(&CanonicalName::from("a.b"), "_"), "b");
/// assert_eq!(package_object_name(&CanonicalName::root(), "_"), "_");
/// ```
pub fn package_object_name(package: &CanonicalName, root: &str) -> String {
    if package.is_root() {
        root.to_string()
    } else {
        sanitize_identifier(package.short_name())
    }
}

/// Name of a property accessor, e.g. `get_size` / `set_size`
pub fn accessor_name(property: &str, setter: bool) -> String {
    let prefix = if setter { "set_" } else { "get_" };
    format!("{}{}", prefix, sanitize_identifier(property))
}

/// Append a disambiguating suffix
pub fn with_suffix(base: &str, suffix: &str) -> String {
    format!("{}{}", base, suffix)
}
