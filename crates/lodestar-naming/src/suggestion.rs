//! Name suggestions derived from a declaration's position
//!
//! A suggestion says *where* a declaration's name lives (the declaration whose scope
//! owns it), *what* the name is made of, and whether it must be stable. It does not
//! declare anything; [`StaticContext`](crate::context::StaticContext) turns it into
//! symbolic names.
//!
//! | declaration | owner | parts | stable |
//! |---|---|---|---|
//! | module, root package | – | – | – |
//! | package `a.b` | module | `a`, `b` | yes |
//! | accessor of `p` | owner of `p` | `get_p` / `set_p` | as `p` |
//! | constructor of `C` | as `C` | as `C` | as `C` |
//! | anything else | enclosing declaration | simple name | unless private or local |

use lodestar_core::{CoreError, DeclId, DeclKind, SymbolTable, Visibility};

use crate::naming::{accessor_name, sanitize_identifier};

/// Where a declaration's name lives and what it is made of
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameSuggestion {
    /// The declaration being named
    pub declaration: DeclId,
    /// Declaration whose scope owns the name
    pub scope: DeclId,
    /// Name parts, outermost first
    pub names: Vec<String>,
    /// Whether the name is part of the public surface and must be reproducible
    pub stable: bool,
}

/// Suggest a name for `decl`; `None` for module roots and the root package
pub fn suggest(table: &SymbolTable, decl: DeclId) -> Result<Option<NameSuggestion>, CoreError> {
    let declaration = table.get(decl)?;
    let Some(parent) = declaration.parent else {
        return Ok(None);
    };

    let suggestion = match declaration.kind {
        DeclKind::Module => return Ok(None),
        DeclKind::Package => {
            let Some(fq_name) = declaration.canonical_name.as_ref().filter(|n| !n.is_root()) else {
                return Ok(None);
            };
            NameSuggestion {
                declaration: decl,
                scope: parent,
                names: fq_name.segments().map(sanitize_identifier).collect(),
                stable: true,
            }
        }
        DeclKind::Accessor { property, setter } => {
            let property_decl = table.get(property)?;
            let owner = property_decl.parent.unwrap_or(parent);
            NameSuggestion {
                declaration: decl,
                scope: owner,
                names: vec![accessor_name(&property_decl.name, setter)],
                stable: is_stable(table, property)?,
            }
        }
        // A constructor is emitted as its class, so both share one name.
        DeclKind::Constructor => return suggest(table, parent),
        DeclKind::Class | DeclKind::Function | DeclKind::Property | DeclKind::Variable => {
            NameSuggestion {
                declaration: decl,
                scope: parent,
                names: vec![sanitize_identifier(&declaration.name)],
                stable: is_stable(table, decl)?,
            }
        }
    };

    Ok(Some(suggestion))
}

/// Declared with local visibility or directly inside a callable body
pub fn has_local_visibility(table: &SymbolTable, decl: DeclId) -> Result<bool, CoreError> {
    let declaration = table.get(decl)?;
    if declaration.is_local() {
        return Ok(true);
    }
    match declaration.parent {
        Some(parent) => Ok(table.get(parent)?.is_callable()),
        None => Ok(false),
    }
}

fn is_stable(table: &SymbolTable, decl: DeclId) -> Result<bool, CoreError> {
    let declaration = table.get(decl)?;
    if declaration.visibility == Visibility::Private {
        return Ok(false);
    }
    Ok(!has_local_visibility(table, decl)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodestar_core::DeclSpec;
    use pretty_assertions::assert_eq;

    struct Sample {
        table: SymbolTable,
        module: DeclId,
        package: DeclId,
        class: DeclId,
    }

    fn sample() -> Sample {
        let mut table = SymbolTable::new();
        let module_id = table.add_module("<main>", false);
        let module = table.module_root(module_id).unwrap();
        let package = table.insert(DeclSpec::package("a.b").in_parent(module)).unwrap();
        let class = table.insert(DeclSpec::class("Box").in_parent(package)).unwrap();
        Sample {
            table,
            module,
            package,
            class,
        }
    }

    #[test]
    fn test_roots_have_no_suggestion() {
        let mut s = sample();
        assert_eq!(suggest(&s.table, s.module).unwrap(), None);
        let root_package = s
            .table
            .insert(DeclSpec::package("").in_parent(s.module))
            .unwrap();
        assert_eq!(suggest(&s.table, root_package).unwrap(), None);
    }

    #[test]
    fn test_package_suggests_all_segments() {
        let s = sample();
        let suggestion = suggest(&s.table, s.package).unwrap().unwrap();
        assert_eq!(suggestion.scope, s.module);
        assert_eq!(suggestion.names, vec!["a".to_string(), "b".to_string()]);
        assert!(suggestion.stable);
    }

    #[test]
    fn test_public_member_is_stable() {
        let mut s = sample();
        let method = s
            .table
            .insert(DeclSpec::function("open").in_parent(s.class))
            .unwrap();
        let suggestion = suggest(&s.table, method).unwrap().unwrap();
        assert_eq!(
            suggestion,
            NameSuggestion {
                declaration: method,
                scope: s.class,
                names: vec!["open".to_string()],
                stable: true,
            }
        );
    }

    #[test]
    fn test_private_and_local_declarations_are_unstable() {
        let mut s = sample();
        let private = s
            .table
            .insert(
                DeclSpec::property("secret")
                    .in_parent(s.class)
                    .with_visibility(Visibility::Private),
            )
            .unwrap();
        assert!(!suggest(&s.table, private).unwrap().unwrap().stable);
        assert!(!has_local_visibility(&s.table, private).unwrap());

        let method = s
            .table
            .insert(DeclSpec::function("run").in_parent(s.class))
            .unwrap();
        let local = s
            .table
            .insert(DeclSpec::function("helper").in_parent(method))
            .unwrap();
        let suggestion = suggest(&s.table, local).unwrap().unwrap();
        assert!(!suggestion.stable);
        assert_eq!(suggestion.scope, method);
        assert!(has_local_visibility(&s.table, local).unwrap());
    }

    #[test]
    fn test_accessor_uses_property_owner() {
        let mut s = sample();
        let property = s
            .table
            .insert(DeclSpec::property("size").in_parent(s.class))
            .unwrap();
        let setter = s
            .table
            .insert(DeclSpec::accessor(property, true).in_parent(property))
            .unwrap();
        let suggestion = suggest(&s.table, setter).unwrap().unwrap();
        assert_eq!(suggestion.scope, s.class);
        assert_eq!(suggestion.names, vec!["set_size".to_string()]);
        assert!(suggestion.stable);
    }

    #[test]
    fn test_constructor_takes_class_suggestion() {
        let mut s = sample();
        let ctor = s
            .table
            .insert(DeclSpec::constructor("<init>").in_parent(s.class))
            .unwrap();
        let suggestion = suggest(&s.table, ctor).unwrap().unwrap();
        assert_eq!(suggestion, suggest(&s.table, s.class).unwrap().unwrap());
        assert_eq!(suggestion.declaration, s.class);
        assert_eq!(suggestion.scope, s.package);
        assert_eq!(suggestion.names, vec!["Box".to_string()]);
    }

    #[test]
    fn test_names_are_sanitized() {
        let mut s = sample();
        let odd = s
            .table
            .insert(DeclSpec::function("is empty").in_parent(s.class))
            .unwrap();
        assert_eq!(
            suggest(&s.table, odd).unwrap().unwrap().names,
            vec!["is_empty".to_string()]
        );
    }
}
