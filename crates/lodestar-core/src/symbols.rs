//! Declaration arena consumed by the naming layer
//!
//! The front-end resolves the program into a graph of declarations; this module is
//! the narrow view of that graph the backend needs. Declarations are allocated in a
//! single [`SymbolTable`] per compilation and addressed by [`DeclId`], so every cache
//! downstream is keyed by identity rather than by name.
//!
//! A declaration may only be inserted after its enclosing declaration and its
//! supertype, which keeps enclosing chains acyclic by construction.

use std::collections::HashMap;
use std::fmt;

use crate::canonical::CanonicalName;
use crate::error::CoreError;

/// Index of a declaration in its [`SymbolTable`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclId(u32);

/// Index of a module in its [`SymbolTable`]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(u32);

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}

impl fmt::Debug for ModuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModuleId({})", self.0)
    }
}

/// Category of a declaration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKind {
    /// Module root; the one declaration without a parent
    Module,
    /// Package fragment of a module
    Package,
    Class,
    Function,
    Constructor,
    /// Getter or setter of `property`
    Accessor { property: DeclId, setter: bool },
    Property,
    /// Local variable or parameter
    Variable,
}

impl DeclKind {
    /// Functions, constructors and accessors
    pub fn is_callable(self) -> bool {
        matches!(
            self,
            DeclKind::Function | DeclKind::Constructor | DeclKind::Accessor { .. }
        )
    }

    pub fn is_class(self) -> bool {
        matches!(self, DeclKind::Class)
    }

    fn describe(self) -> &'static str {
        match self {
            DeclKind::Module => "module",
            DeclKind::Package => "package",
            DeclKind::Class => "class",
            DeclKind::Function => "function",
            DeclKind::Constructor => "constructor",
            DeclKind::Accessor { setter: false, .. } => "getter",
            DeclKind::Accessor { setter: true, .. } => "setter",
            DeclKind::Property => "property",
            DeclKind::Variable => "variable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Internal,
    Protected,
    Private,
    /// Visible only inside the enclosing body
    Local,
}

/// Classification flags supplied by the front-end
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeclFlags {
    /// Implemented natively by the target runtime
    pub native: bool,
    /// Provided by the runtime support library
    pub library: bool,
    /// Defined outside the program; resolved dynamically
    pub external: bool,
}

/// A declaration as recorded in the symbol table
#[derive(Debug, Clone)]
pub struct Declaration {
    pub name: String,
    pub kind: DeclKind,
    pub parent: Option<DeclId>,
    pub module: ModuleId,
    pub supertype: Option<DeclId>,
    pub visibility: Visibility,
    pub flags: DeclFlags,
    /// Fully-qualified name for packages and classes
    pub canonical_name: Option<CanonicalName>,
}

impl Declaration {
    pub fn is_callable(&self) -> bool {
        self.kind.is_callable()
    }

    pub fn is_local(&self) -> bool {
        self.visibility == Visibility::Local
    }
}

/// Builder for a declaration that has not been inserted yet
///
/// ```
/// use lodestar_core::symbols::{DeclSpec, SymbolTable};
///
/// let mut table = SymbolTable::new();
/// let module = table.add_module("<main>", false);
/// let root = table.module_root(module).unwrap();
/// let pkg = table.insert(DeclSpec::package("demo").in_parent(root)).unwrap();
/// let class = table.insert(DeclSpec::class("Widget").in_parent(pkg)).unwrap();
/// assert_eq!(table.canonical_name(class).unwrap().as_str(), "demo.Widget");
/// ```
#[derive(Debug, Clone)]
pub struct DeclSpec {
    name: String,
    kind: DeclKind,
    parent: Option<DeclId>,
    supertype: Option<DeclId>,
    visibility: Visibility,
    flags: DeclFlags,
}

impl DeclSpec {
    fn new(name: impl Into<String>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            parent: None,
            supertype: None,
            visibility: Visibility::Public,
            flags: DeclFlags::default(),
        }
    }

    /// Package fragment; `fq_name` is the full dotted package name
    pub fn package(fq_name: impl Into<String>) -> Self {
        Self::new(fq_name, DeclKind::Package)
    }

    pub fn class(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Class)
    }

    pub fn function(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Function)
    }

    pub fn constructor(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Constructor)
    }

    pub fn property(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Property)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(name, DeclKind::Variable).with_visibility(Visibility::Local)
    }

    pub fn accessor(property: DeclId, setter: bool) -> Self {
        let prefix = if setter { "set" } else { "get" };
        Self::new(prefix, DeclKind::Accessor { property, setter })
    }

    pub fn in_parent(mut self, parent: DeclId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn extends(mut self, supertype: DeclId) -> Self {
        self.supertype = Some(supertype);
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn native(mut self) -> Self {
        self.flags.native = true;
        self
    }

    pub fn library(mut self) -> Self {
        self.flags.library = true;
        self
    }

    pub fn external(mut self) -> Self {
        self.flags.external = true;
        self
    }
}

/// Information about a compiled module
#[derive(Debug, Clone)]
pub struct ModuleInfo {
    /// Name as given by the front-end, e.g. `<main>`
    pub name: String,
    /// Whether this is the distinguished built-ins module
    pub is_builtins: bool,
    /// Root declaration of the module
    pub root: DeclId,
}

impl ModuleInfo {
    /// Module name without the surrounding angle brackets the front-end adds
    pub fn display_name(&self) -> &str {
        self.name
            .strip_prefix('<')
            .and_then(|n| n.strip_suffix('>'))
            .unwrap_or(&self.name)
    }
}

/// Arena of all declarations of one compilation
#[derive(Debug, Default)]
pub struct SymbolTable {
    decls: Vec<Declaration>,
    modules: Vec<ModuleInfo>,
    by_canonical_name: HashMap<CanonicalName, DeclId>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a module together with its root declaration
    pub fn add_module(&mut self, name: impl Into<String>, is_builtins: bool) -> ModuleId {
        let name = name.into();
        let module = ModuleId(self.modules.len() as u32);
        let root = DeclId(self.decls.len() as u32);
        self.decls.push(Declaration {
            name: name.clone(),
            kind: DeclKind::Module,
            parent: None,
            module,
            supertype: None,
            visibility: Visibility::Public,
            flags: DeclFlags::default(),
            canonical_name: None,
        });
        tracing::debug!("Registered module {} as {:?}", name, module);
        self.modules.push(ModuleInfo {
            name,
            is_builtins,
            root,
        });
        module
    }

    /// Insert a declaration; its module is inherited from its parent
    pub fn insert(&mut self, spec: DeclSpec) -> Result<DeclId, CoreError> {
        let parent_id = spec.parent.ok_or_else(|| {
            CoreError::InvalidDeclaration(format!(
                "{} {} has no enclosing declaration",
                spec.kind.describe(),
                spec.name
            ))
        })?;
        let parent = self.get(parent_id)?;
        let module = parent.module;

        if let Some(supertype) = spec.supertype {
            if !spec.kind.is_class() {
                return Err(CoreError::InvalidDeclaration(format!(
                    "only classes declare a supertype, got {} {}",
                    spec.kind.describe(),
                    spec.name
                )));
            }
            if !self.get(supertype)?.kind.is_class() {
                return Err(CoreError::InvalidDeclaration(format!(
                    "supertype of {} is not a class: {}",
                    spec.name,
                    self.describe(supertype)
                )));
            }
        }

        if let DeclKind::Accessor { property, .. } = spec.kind {
            if self.get(property)?.kind != DeclKind::Property {
                return Err(CoreError::InvalidDeclaration(format!(
                    "accessor target is not a property: {}",
                    self.describe(property)
                )));
            }
        }

        let canonical_name = match spec.kind {
            DeclKind::Package => Some(
                CanonicalName::parse(&spec.name)
                    .map_err(|err| CoreError::InvalidDeclaration(format!("package {}", err)))?,
            ),
            DeclKind::Class => {
                let owner = self.nearest_canonical_name(parent_id);
                Some(owner.child(&spec.name))
            }
            _ => None,
        };

        let id = DeclId(self.decls.len() as u32);
        if let Some(name) = &canonical_name {
            // Local classes share names with top-level ones; the first one wins the index.
            if self.is_top_level_chain(parent_id) {
                self.by_canonical_name.entry(name.clone()).or_insert(id);
            }
        }

        self.decls.push(Declaration {
            name: spec.name,
            kind: spec.kind,
            parent: Some(parent_id),
            module,
            supertype: spec.supertype,
            visibility: spec.visibility,
            flags: spec.flags,
            canonical_name,
        });
        Ok(id)
    }

    pub fn get(&self, id: DeclId) -> Result<&Declaration, CoreError> {
        self.decls
            .get(id.0 as usize)
            .ok_or(CoreError::UnknownDeclaration(id))
    }

    pub fn module(&self, id: ModuleId) -> Result<&ModuleInfo, CoreError> {
        self.modules
            .get(id.0 as usize)
            .ok_or(CoreError::UnknownModule(id))
    }

    pub fn module_root(&self, id: ModuleId) -> Result<DeclId, CoreError> {
        Ok(self.module(id)?.root)
    }

    /// Module containing `id`
    pub fn module_of(&self, id: DeclId) -> Result<ModuleId, CoreError> {
        Ok(self.get(id)?.module)
    }

    pub fn parent(&self, id: DeclId) -> Result<Option<DeclId>, CoreError> {
        Ok(self.get(id)?.parent)
    }

    pub fn supertype(&self, id: DeclId) -> Result<Option<DeclId>, CoreError> {
        Ok(self.get(id)?.supertype)
    }

    pub fn canonical_name(&self, id: DeclId) -> Option<&CanonicalName> {
        self.get(id).ok().and_then(|d| d.canonical_name.as_ref())
    }

    /// Look up a package or non-local class by its fully-qualified name
    pub fn find_by_canonical_name(&self, name: &CanonicalName) -> Option<DeclId> {
        self.by_canonical_name.get(name).copied()
    }

    /// Whether `id` is native, or is an accessor of a native property
    pub fn is_native(&self, id: DeclId) -> Result<bool, CoreError> {
        let decl = self.get(id)?;
        if decl.flags.native {
            return Ok(true);
        }
        match decl.kind {
            DeclKind::Accessor { property, .. } => self.is_native(property),
            _ => Ok(false),
        }
    }

    pub fn len(&self) -> usize {
        self.decls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DeclId, &Declaration)> {
        self.decls
            .iter()
            .enumerate()
            .map(|(idx, decl)| (DeclId(idx as u32), decl))
    }

    /// Human-readable label used in diagnostics, e.g. `class B (p.A.B)`
    pub fn describe(&self, id: DeclId) -> String {
        match self.get(id) {
            Ok(decl) => match &decl.canonical_name {
                Some(fq) if !fq.is_root() => format!("{} {} ({})", decl.kind.describe(), decl.name, fq),
                _ => format!("{} {}", decl.kind.describe(), decl.name),
            },
            Err(_) => format!("<unknown {:?}>", id),
        }
    }

    fn nearest_canonical_name(&self, mut id: DeclId) -> CanonicalName {
        loop {
            let Ok(decl) = self.get(id) else {
                return CanonicalName::root();
            };
            if let Some(name) = &decl.canonical_name {
                return name.clone();
            }
            match decl.parent {
                Some(parent) => id = parent,
                None => return CanonicalName::root(),
            }
        }
    }

    /// True when every declaration from `id` up to the module root is a package or class
    fn is_top_level_chain(&self, mut id: DeclId) -> bool {
        loop {
            let Ok(decl) = self.get(id) else {
                return false;
            };
            match decl.kind {
                DeclKind::Module => return true,
                DeclKind::Package | DeclKind::Class => {}
                _ => return false,
            }
            match decl.parent {
                Some(parent) => id = parent,
                None => return true,
            }
        }
    }
}
