//! Integration tests for the platform identity map against a symbol table of built-ins

use lodestar_core::{
    CanonicalName, ClassIdentity, CoreError, DeclId, DeclSpec, PlatformMap, SymbolTable,
};
use proptest::prelude::*;

const READ_ONLY_COLLECTIONS: &[(&str, &str)] = &[
    ("java.lang.Iterable", "Iterable"),
    ("java.util.Iterator", "Iterator"),
    ("java.util.Collection", "Collection"),
    ("java.util.List", "List"),
    ("java.util.Set", "Set"),
    ("java.util.Map", "Map"),
    ("java.util.ListIterator", "ListIterator"),
];

/// Built-ins module with every collection class and the `Map.Entry` pair
fn builtins() -> SymbolTable {
    let mut table = SymbolTable::new();
    let module = table.add_module("<builtins>", true);
    let root = table.module_root(module).unwrap();
    let collections = table
        .insert(DeclSpec::package("kotlin.collections").in_parent(root))
        .unwrap();
    for (_, name) in READ_ONLY_COLLECTIONS {
        table
            .insert(DeclSpec::class(*name).in_parent(collections))
            .unwrap();
        table
            .insert(DeclSpec::class(format!("Mutable{}", name)).in_parent(collections))
            .unwrap();
    }
    let map = table
        .find_by_canonical_name(&CanonicalName::from("kotlin.collections.Map"))
        .unwrap();
    let mutable_map = table
        .find_by_canonical_name(&CanonicalName::from("kotlin.collections.MutableMap"))
        .unwrap();
    table.insert(DeclSpec::class("Entry").in_parent(map)).unwrap();
    table
        .insert(DeclSpec::class("MutableEntry").in_parent(mutable_map))
        .unwrap();
    let kotlin = table.insert(DeclSpec::package("kotlin").in_parent(root)).unwrap();
    table.insert(DeclSpec::class("String").in_parent(kotlin)).unwrap();
    table
}

fn decl(table: &SymbolTable, fq: &str) -> DeclId {
    table
        .find_by_canonical_name(&CanonicalName::from(fq))
        .unwrap_or_else(|| panic!("missing {}", fq))
}

#[test]
fn test_collection_bijection() {
    let map = PlatformMap::global();
    let table = builtins();
    for (host, name) in READ_ONLY_COLLECTIONS {
        let host = ClassIdentity::top_level(*host);
        let read_only = map.to_source_type(&host).unwrap().clone();
        assert_eq!(read_only.short_name(), *name);
        assert_eq!(map.to_host_class(&read_only), Some(&host));

        let ro_decl = decl(&table, read_only.as_str());
        let mutable_decl = map.to_opposite_mutability(&table, ro_decl).unwrap();
        assert_eq!(
            table.canonical_name(mutable_decl).unwrap().short_name(),
            format!("Mutable{}", name)
        );
        assert_eq!(map.to_opposite_mutability(&table, mutable_decl).unwrap(), ro_decl);
    }
}

#[test]
fn test_map_entry_round_trip() {
    let map = PlatformMap::global();
    let table = builtins();
    let entry = decl(&table, "kotlin.collections.Map.Entry");
    let mutable_entry = map.to_opposite_mutability(&table, entry).unwrap();
    assert_eq!(
        table.canonical_name(mutable_entry).unwrap().as_str(),
        "kotlin.collections.MutableMap.MutableEntry"
    );
    assert_eq!(map.to_opposite_mutability(&table, mutable_entry).unwrap(), entry);
}

#[test]
fn test_opposite_mutability_rejects_unregistered() {
    let map = PlatformMap::global();
    let table = builtins();
    let string = decl(&table, "kotlin.String");
    let err = map.to_opposite_mutability(&table, string).unwrap_err();
    match err {
        CoreError::InvalidMutabilityKind { declaration } => {
            assert_eq!(declaration, "class String (kotlin.String)");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_opposite_mutability_missing_counterpart() {
    let map = PlatformMap::global();
    let mut table = SymbolTable::new();
    let module = table.add_module("<builtins>", true);
    let root = table.module_root(module).unwrap();
    let pkg = table
        .insert(DeclSpec::package("kotlin.collections").in_parent(root))
        .unwrap();
    let list = table.insert(DeclSpec::class("List").in_parent(pkg)).unwrap();
    let err = map.to_opposite_mutability(&table, list).unwrap_err();
    assert!(matches!(err, CoreError::UnknownBuiltIn(name) if name == "kotlin.collections.MutableList"));
}

proptest! {
    #[test]
    fn prop_function_arities_round_trip(arity in 0usize..23) {
        let map = PlatformMap::global();
        let host = ClassIdentity::top_level(format!("kotlin.jvm.functions.Function{}", arity).as_str());
        let expected = format!("kotlin.Function{}", arity);
        let source = map.to_source_type(&host).cloned();
        prop_assert_eq!(source.as_ref().map(CanonicalName::as_str), Some(expected.as_str()));
        prop_assert_eq!(map.to_host_class(&source.unwrap()), Some(&host));
    }

    #[test]
    fn prop_opposite_mutability_is_an_involution(idx in 0usize..READ_ONLY_COLLECTIONS.len(), start_mutable in any::<bool>()) {
        let map = PlatformMap::global();
        let (_, name) = READ_ONLY_COLLECTIONS[idx];
        let read_only = CanonicalName::from(format!("kotlin.collections.{}", name).as_str());
        let start = if start_mutable {
            map.opposite_mutability_name(&read_only).unwrap().clone()
        } else {
            read_only
        };
        let there = map.opposite_mutability_name(&start).unwrap();
        let back = map.opposite_mutability_name(there).unwrap();
        prop_assert_eq!(back, &start);
        prop_assert_ne!(there, &start);
    }
}
