//! Naming scopes of the emitted program
//!
//! Scopes form a tree that mirrors how the target runtime resolves identifiers:
//! an unresolved lookup in a scope falls back to its parent, the way a lexical
//! environment or a prototype chain delegates. All scopes and names of one
//! compilation live in a single [`ScopeTree`] and are addressed by index, so two
//! handles are the same scope exactly when they compare equal.
//!
//! Each scope keeps one table from identifier text to [`SymbolicName`], shared by
//! both declaration styles:
//! - [`ScopeTree::declare_name`] returns the entry for the text, creating a stable
//!   name if there is none
//! - [`ScopeTree::declare_fresh_name`] always creates a new entry, suffixing the
//!   base text until it clashes with nothing visible from the scope
//!
//! The table does not tell the two styles apart on lookup. A stable request for text
//! a fresh name already took (`x_0` after a fresh `x`) returns that fresh entry, so
//! callers must keep stable texts out of the suffixed space.

use std::collections::HashMap;
use std::fmt;

/// Handle of a scope in its [`ScopeTree`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u32);

/// Handle of a declared identifier in its [`ScopeTree`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolicName(u32);

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

impl fmt::Debug for SymbolicName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolicName({})", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeKind {
    /// The global scope
    Root,
    /// Members of an object: a package, a class, the runtime global
    Object,
    /// Body of a function object
    Function,
    /// Identifiers resolved by the runtime at call time
    Dynamic,
}

#[derive(Debug)]
struct ScopeData {
    parent: Option<ScopeId>,
    kind: ScopeKind,
    label: String,
    names: HashMap<String, SymbolicName>,
}

#[derive(Debug)]
struct NameData {
    text: String,
    scope: ScopeId,
    fresh: bool,
}

/// Arena of all scopes and names of one compilation
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<ScopeData>,
    names: Vec<NameData>,
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeTree {
    /// Create a tree holding only the global root scope
    pub fn new() -> Self {
        Self {
            scopes: vec![ScopeData {
                parent: None,
                kind: ScopeKind::Root,
                label: "<root>".to_string(),
                names: HashMap::new(),
            }],
            names: Vec::new(),
        }
    }

    pub fn root(&self) -> ScopeId {
        ScopeId(0)
    }

    /// Create a child of `parent`; lookups that miss in the child continue in `parent`
    pub fn inner_scope(&mut self, parent: ScopeId, kind: ScopeKind, label: impl Into<String>) -> ScopeId {
        self.push_scope(Some(parent), kind, label.into())
    }

    /// Create a scope outside the tree, with no fallback
    pub fn detached_scope(&mut self, kind: ScopeKind, label: impl Into<String>) -> ScopeId {
        self.push_scope(None, kind, label.into())
    }

    /// Entry for `text` in `scope`, declared as a stable name on first request
    pub fn declare_name(&mut self, scope: ScopeId, text: &str) -> SymbolicName {
        if let Some(&name) = self.scope(scope).names.get(text) {
            return name;
        }
        self.push_name(scope, text.to_string(), false)
    }

    /// New name in `scope` whose text is not visible from `scope` yet
    ///
    /// The text is `base` if that is free, otherwise `base_0`, `base_1`, ...
    pub fn declare_fresh_name(&mut self, scope: ScopeId, base: &str) -> SymbolicName {
        let mut candidate = base.to_string();
        let mut counter = 0usize;
        while self.lookup(scope, &candidate).is_some() {
            candidate = format!("{}_{}", base, counter);
            counter += 1;
        }
        self.push_name(scope, candidate, true)
    }

    /// Resolve `text` in `scope`, falling back through the parents
    pub fn lookup(&self, scope: ScopeId, text: &str) -> Option<SymbolicName> {
        let mut current = Some(scope);
        while let Some(id) = current {
            let data = self.scope(id);
            if let Some(&name) = data.names.get(text) {
                return Some(name);
            }
            current = data.parent;
        }
        None
    }

    /// Resolve `text` in `scope` only
    pub fn find_own(&self, scope: ScopeId, text: &str) -> Option<SymbolicName> {
        self.scope(scope).names.get(text).copied()
    }

    pub fn text(&self, name: SymbolicName) -> &str {
        &self.name(name).text
    }

    /// Scope the name was declared in
    pub fn scope_of(&self, name: SymbolicName) -> ScopeId {
        self.name(name).scope
    }

    pub fn is_fresh(&self, name: SymbolicName) -> bool {
        self.name(name).fresh
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scope(scope).parent
    }

    pub fn kind(&self, scope: ScopeId) -> ScopeKind {
        self.scope(scope).kind
    }

    pub fn label(&self, scope: ScopeId) -> &str {
        &self.scope(scope).label
    }

    /// Whether `ancestor` is a strict ancestor of `scope`
    pub fn is_descendant(&self, scope: ScopeId, ancestor: ScopeId) -> bool {
        let mut current = self.parent(scope);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    pub fn name_count(&self) -> usize {
        self.names.len()
    }

    fn push_scope(&mut self, parent: Option<ScopeId>, kind: ScopeKind, label: String) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        tracing::debug!("Created {:?} scope {:?} ({}) under {:?}", kind, id, label, parent);
        self.scopes.push(ScopeData {
            parent,
            kind,
            label,
            names: HashMap::new(),
        });
        id
    }

    fn push_name(&mut self, scope: ScopeId, text: String, fresh: bool) -> SymbolicName {
        let name = SymbolicName(self.names.len() as u32);
        tracing::trace!("Declared {} name {} in {:?}", if fresh { "fresh" } else { "stable" }, text, scope);
        self.scopes[scope.0 as usize].names.insert(text.clone(), name);
        self.names.push(NameData { text, scope, fresh });
        name
    }

    fn scope(&self, id: ScopeId) -> &ScopeData {
        &self.scopes[id.0 as usize]
    }

    fn name(&self, id: SymbolicName) -> &NameData {
        &self.names[id.0 as usize]
    }
}
