//! Platform identity map
//!
//! Closed correspondence between host-platform classes and the built-in classes of
//! the source language. The tables are facts about two fixed standard libraries, so
//! they are populated once and never extended afterwards.
//!
//! Shapes of the mapping:
//!
//! | family | host → source | source → host |
//! |---|---|---|
//! | root types, primitive wrappers, companions | 1:1 | 1:1 |
//! | collections | 1 → read-only | read-only and mutable → 1 |
//! | function arities | 1:1 per arity | 1:1 per arity |
//! | reflective function arities | – | n → 1 |
//! | `Nothing` | – | → `java.lang.Void` |

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::canonical::{CanonicalName, ClassIdentity};
use crate::config::PlatformConfig;
use crate::error::CoreError;
use crate::symbols::{DeclId, SymbolTable};

const FUNCTION_HOST_PREFIX: &str = "kotlin.jvm.functions.Function";
const FUNCTION_PREFIX: &str = "kotlin.Function";
const REFLECT_FUNCTION: &str = "kotlin.reflect.KFunction";

const ROOT_TYPES: &[(&str, &str)] = &[
    ("java.lang.Object", "kotlin.Any"),
    ("java.lang.String", "kotlin.String"),
    ("java.lang.CharSequence", "kotlin.CharSequence"),
    ("java.lang.Throwable", "kotlin.Throwable"),
    ("java.lang.Cloneable", "kotlin.Cloneable"),
    ("java.lang.Number", "kotlin.Number"),
    ("java.lang.Comparable", "kotlin.Comparable"),
    ("java.lang.Enum", "kotlin.Enum"),
    ("java.lang.annotation.Annotation", "kotlin.Annotation"),
];

/// Host class path (nested classes after `$`), read-only name, mutable name
const COLLECTIONS: &[(&str, &str, &str)] = &[
    (
        "java.lang.Iterable",
        "kotlin.collections.Iterable",
        "kotlin.collections.MutableIterable",
    ),
    (
        "java.util.Iterator",
        "kotlin.collections.Iterator",
        "kotlin.collections.MutableIterator",
    ),
    (
        "java.util.Collection",
        "kotlin.collections.Collection",
        "kotlin.collections.MutableCollection",
    ),
    (
        "java.util.List",
        "kotlin.collections.List",
        "kotlin.collections.MutableList",
    ),
    (
        "java.util.Set",
        "kotlin.collections.Set",
        "kotlin.collections.MutableSet",
    ),
    (
        "java.util.Map",
        "kotlin.collections.Map",
        "kotlin.collections.MutableMap",
    ),
    (
        "java.util.Map$Entry",
        "kotlin.collections.Map.Entry",
        "kotlin.collections.MutableMap.MutableEntry",
    ),
    (
        "java.util.ListIterator",
        "kotlin.collections.ListIterator",
        "kotlin.collections.MutableListIterator",
    ),
];

const PRIMITIVE_WRAPPERS: &[(&str, &str)] = &[
    ("java.lang.Boolean", "kotlin.Boolean"),
    ("java.lang.Character", "kotlin.Char"),
    ("java.lang.Byte", "kotlin.Byte"),
    ("java.lang.Short", "kotlin.Short"),
    ("java.lang.Integer", "kotlin.Int"),
    ("java.lang.Float", "kotlin.Float"),
    ("java.lang.Long", "kotlin.Long"),
    ("java.lang.Double", "kotlin.Double"),
];

/// Built-ins whose companion object is provided intrinsically by the runtime
const INTRINSIC_COMPANIONS: &[&str] = &[
    "kotlin.Int",
    "kotlin.Long",
    "kotlin.Short",
    "kotlin.Byte",
    "kotlin.Char",
    "kotlin.Float",
    "kotlin.Double",
    "kotlin.String",
    "kotlin.Enum",
];

/// Read-only correspondence between host classes and source built-ins
#[derive(Debug)]
pub struct PlatformMap {
    host_to_source: HashMap<ClassIdentity, CanonicalName>,
    source_to_host: HashMap<CanonicalName, ClassIdentity>,
    mutable_to_read_only: HashMap<CanonicalName, CanonicalName>,
    read_only_to_mutable: HashMap<CanonicalName, CanonicalName>,
    companions: HashMap<CanonicalName, CanonicalName>,
    function_arity_bound: usize,
}

impl PlatformMap {
    /// Shared instance built with the default configuration on first use
    pub fn global() -> &'static PlatformMap {
        static GLOBAL: OnceLock<PlatformMap> = OnceLock::new();
        GLOBAL.get_or_init(|| PlatformMap::new(&PlatformConfig::default()))
    }

    /// Build the full map; the result is never mutated again
    pub fn new(config: &PlatformConfig) -> Self {
        let mut map = Self {
            host_to_source: HashMap::new(),
            source_to_host: HashMap::new(),
            mutable_to_read_only: HashMap::new(),
            read_only_to_mutable: HashMap::new(),
            companions: HashMap::new(),
            function_arity_bound: config.function_arity_bound,
        };

        for (host, source) in ROOT_TYPES {
            map.add(host_class(host), CanonicalName::from(*source));
        }

        for (host, read_only, mutable) in COLLECTIONS {
            map.add_collection(
                host_class(host),
                CanonicalName::from(*read_only),
                CanonicalName::from(*mutable),
            );
        }

        for (host, source) in PRIMITIVE_WRAPPERS {
            map.add(host_class(host), CanonicalName::from(*source));
        }

        for builtin in INTRINSIC_COMPANIONS {
            let builtin = CanonicalName::from(*builtin);
            let host_name = format!("kotlin.jvm.internal.{}CompanionObject", builtin.short_name());
            let host = ClassIdentity::top_level(host_name.as_str());
            let companion = builtin.child("Companion");
            map.companions.insert(companion.clone(), builtin);
            map.add(host, companion);
        }

        let umbrella = ClassIdentity::top_level(REFLECT_FUNCTION);
        for arity in 0..config.function_arity_bound {
            map.add(
                ClassIdentity::top_level(format!("{}{}", FUNCTION_HOST_PREFIX, arity).as_str()),
                CanonicalName::from(format!("{}{}", FUNCTION_PREFIX, arity).as_str()),
            );
            map.add_source_to_host(
                CanonicalName::from(format!("{}{}", REFLECT_FUNCTION, arity).as_str()),
                umbrella.clone(),
            );
        }

        map.add_source_to_host(
            CanonicalName::from("kotlin.Nothing"),
            ClassIdentity::top_level("java.lang.Void"),
        );

        tracing::debug!(
            "Built platform map: {} host classes, {} source names, {} collection pairs",
            map.host_to_source.len(),
            map.source_to_host.len(),
            map.read_only_to_mutable.len()
        );
        map
    }

    /// Source built-in corresponding to a host class
    ///
    /// - `java.lang.String` -> `kotlin.String`
    /// - `java.lang.Integer` -> `kotlin.Int`
    /// - `java.util.List` -> `kotlin.collections.List`
    /// - `java.util.Map$Entry` -> `kotlin.collections.Map.Entry`
    /// - `java.lang.Void` -> none
    pub fn to_source_type(&self, host: &ClassIdentity) -> Option<&CanonicalName> {
        self.host_to_source.get(host)
    }

    /// Host class corresponding to a source built-in
    ///
    /// - `kotlin.Int` -> `java.lang.Integer`
    /// - `kotlin.collections.MutableList` -> `java.util.List`
    /// - `kotlin.Nothing` -> `java.lang.Void`
    /// - `kotlin.reflect.KFunction3` -> `kotlin.reflect.KFunction`
    pub fn to_host_class(&self, name: &CanonicalName) -> Option<&ClassIdentity> {
        self.source_to_host.get(name)
    }

    pub fn is_mutable_variant(&self, name: &CanonicalName) -> bool {
        self.mutable_to_read_only.contains_key(name)
    }

    pub fn is_read_only_variant(&self, name: &CanonicalName) -> bool {
        self.read_only_to_mutable.contains_key(name)
    }

    /// Name on the other side of a read-only/mutable pair
    pub fn opposite_mutability_name(&self, name: &CanonicalName) -> Option<&CanonicalName> {
        self.read_only_to_mutable
            .get(name)
            .or_else(|| self.mutable_to_read_only.get(name))
    }

    /// Map a collection declaration to its counterpart of the other mutability
    pub fn to_opposite_mutability(
        &self,
        table: &SymbolTable,
        decl: DeclId,
    ) -> Result<DeclId, CoreError> {
        let opposite = table
            .canonical_name(decl)
            .and_then(|name| self.opposite_mutability_name(name))
            .ok_or_else(|| CoreError::InvalidMutabilityKind {
                declaration: table.describe(decl),
            })?;

        table
            .find_by_canonical_name(opposite)
            .ok_or_else(|| CoreError::UnknownBuiltIn(opposite.to_string()))
    }

    /// Source views of a host class: none, `{read-only}` or `{read-only, mutable}`
    pub fn mapped_collection_views(&self, host: &ClassIdentity) -> Vec<CanonicalName> {
        let Some(read_only) = self.to_source_type(host) else {
            return Vec::new();
        };
        match self.read_only_to_mutable.get(read_only) {
            Some(mutable) => vec![read_only.clone(), mutable.clone()],
            None => vec![read_only.clone()],
        }
    }

    /// Whether `name` is a companion object the runtime provides intrinsically
    pub fn is_mapped_companion(&self, name: &CanonicalName) -> bool {
        self.companions.contains_key(name)
    }

    pub fn function_arity_bound(&self) -> usize {
        self.function_arity_bound
    }

    fn add(&mut self, host: ClassIdentity, source: CanonicalName) {
        self.host_to_source.insert(host.clone(), source.clone());
        self.add_source_to_host(source, host);
    }

    fn add_collection(&mut self, host: ClassIdentity, read_only: CanonicalName, mutable: CanonicalName) {
        self.add(host.clone(), read_only.clone());
        self.add_source_to_host(mutable.clone(), host);
        self.mutable_to_read_only
            .insert(mutable.clone(), read_only.clone());
        self.read_only_to_mutable.insert(read_only, mutable);
    }

    fn add_source_to_host(&mut self, source: CanonicalName, host: ClassIdentity) {
        self.source_to_host.insert(source, host);
    }
}

/// Parse `pkg.Outer$Inner` into a class identity with its nesting chain
fn host_class(path: &str) -> ClassIdentity {
    let mut parts = path.split('$');
    let top = parts.next().unwrap_or(path);
    parts.fold(ClassIdentity::top_level(top), |outer, inner| outer.nested(inner))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map() -> &'static PlatformMap {
        PlatformMap::global()
    }

    #[test]
    fn test_root_types_are_one_to_one() {
        let object = ClassIdentity::top_level("java.lang.Object");
        let any = CanonicalName::from("kotlin.Any");
        assert_eq!(map().to_source_type(&object), Some(&any));
        assert_eq!(map().to_host_class(&any), Some(&object));
    }

    #[test]
    fn test_primitive_wrappers() {
        let integer = ClassIdentity::top_level("java.lang.Integer");
        assert_eq!(
            map().to_source_type(&integer).map(CanonicalName::as_str),
            Some("kotlin.Int")
        );
        assert_eq!(
            map().to_host_class(&CanonicalName::from("kotlin.Char")),
            Some(&ClassIdentity::top_level("java.lang.Character"))
        );
    }

    #[test]
    fn test_collection_maps_both_variants_back() {
        let list = ClassIdentity::top_level("java.util.List");
        let read_only = CanonicalName::from("kotlin.collections.List");
        let mutable = CanonicalName::from("kotlin.collections.MutableList");
        assert_eq!(map().to_source_type(&list), Some(&read_only));
        assert_eq!(map().to_host_class(&read_only), Some(&list));
        assert_eq!(map().to_host_class(&mutable), Some(&list));
        assert!(map().is_read_only_variant(&read_only));
        assert!(map().is_mutable_variant(&mutable));
        assert!(!map().is_mutable_variant(&read_only));
    }

    #[test]
    fn test_nested_map_entry() {
        let entry = ClassIdentity::top_level("java.util.Map").nested("Entry");
        assert_eq!(
            map().mapped_collection_views(&entry),
            vec![
                CanonicalName::from("kotlin.collections.Map.Entry"),
                CanonicalName::from("kotlin.collections.MutableMap.MutableEntry"),
            ]
        );
        // The flat spelling is a different identity.
        let flat = ClassIdentity::top_level("java.util.Map.Entry");
        assert_eq!(
            map().to_host_class(&CanonicalName::from("kotlin.collections.Map.Entry")),
            Some(&entry)
        );
        assert!(map().to_source_type(&flat).is_none());
    }

    #[test]
    fn test_mapped_views_for_non_collection_and_unknown() {
        let string = ClassIdentity::top_level("java.lang.String");
        assert_eq!(
            map().mapped_collection_views(&string),
            vec![CanonicalName::from("kotlin.String")]
        );
        let unknown = ClassIdentity::top_level("java.util.concurrent.Future");
        assert!(map().mapped_collection_views(&unknown).is_empty());
    }

    #[test]
    fn test_function_family() {
        let host = ClassIdentity::top_level("kotlin.jvm.functions.Function3");
        let source = CanonicalName::from("kotlin.Function3");
        assert_eq!(map().to_source_type(&host), Some(&source));
        assert_eq!(map().to_host_class(&source), Some(&host));

        let last = CanonicalName::from("kotlin.Function22");
        assert!(map().to_host_class(&last).is_some());
        let beyond = CanonicalName::from("kotlin.Function23");
        assert!(map().to_host_class(&beyond).is_none());
    }

    #[test]
    fn test_reflective_functions_are_reverse_only() {
        let umbrella = ClassIdentity::top_level("kotlin.reflect.KFunction");
        for arity in [0, 5, 22] {
            let name = CanonicalName::from(format!("kotlin.reflect.KFunction{}", arity).as_str());
            assert_eq!(map().to_host_class(&name), Some(&umbrella));
        }
        assert!(map().to_source_type(&umbrella).is_none());
    }

    #[test]
    fn test_nothing_is_reverse_only() {
        let void = ClassIdentity::top_level("java.lang.Void");
        assert_eq!(
            map().to_host_class(&CanonicalName::from("kotlin.Nothing")),
            Some(&void)
        );
        assert!(map().to_source_type(&void).is_none());
    }

    #[test]
    fn test_companions() {
        let host = ClassIdentity::top_level("kotlin.jvm.internal.IntCompanionObject");
        let companion = CanonicalName::from("kotlin.Int.Companion");
        assert_eq!(map().to_source_type(&host), Some(&companion));
        assert!(map().is_mapped_companion(&companion));
        assert!(!map().is_mapped_companion(&CanonicalName::from("kotlin.Boolean.Companion")));
    }

    #[test]
    fn test_configured_arity_bound() {
        let small = PlatformMap::new(&PlatformConfig {
            function_arity_bound: 2,
        });
        assert_eq!(small.function_arity_bound(), 2);
        assert!(small.to_host_class(&CanonicalName::from("kotlin.Function1")).is_some());
        assert!(small.to_host_class(&CanonicalName::from("kotlin.Function2")).is_none());
    }

    #[test]
    fn test_host_class_parsing() {
        let entry = host_class("java.util.Map$Entry");
        assert_eq!(entry.package().as_str(), "java.util");
        assert_eq!(entry.nesting(), &["Map".to_string(), "Entry".to_string()]);
    }
}
