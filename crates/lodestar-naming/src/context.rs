//! Per-compilation naming state
//!
//! [`StaticContext`] answers the emitter's questions about declarations: which scope
//! a declaration's body lives in, which identifier it is emitted as, and how it is
//! reached from the top of the emitted program. Every answer is memoized for the
//! lifetime of the context, so asking twice yields the same [`SymbolicName`] and the
//! same [`Reference`] instance.
//!
//! Scopes are built lazily by a [`Generator`] with these rules, in precedence order:
//!
//! 1. `callable`: functions, constructors and accessors get a new function scope
//!    directly under the global root, whatever their semantic nesting
//! 2. `class`: a class without a supertype gets a new scope under the global root
//! 3. `derived-class`: a class with a supertype gets a new scope inside the scope of
//!    its supertype, mirroring prototype delegation
//! 4. `package`: a module maps to the global root; a package gets a new scope under it
//! 5. `member`: anything else shares the scope of its enclosing declaration

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::rc::Rc;

use lodestar_core::{
    CanonicalName, ClassIdentity, DeclId, DeclKind, Declaration, ModuleId, NamingConfig, PlatformMap,
    SymbolTable,
};

use crate::error::NamingError;
use crate::generator::Generator;
use crate::naming::{package_object_name, with_suffix};
use crate::reference::Reference;
use crate::scope::{ScopeId, ScopeKind, ScopeTree, SymbolicName};
use crate::suggestion::{has_local_visibility, suggest, NameSuggestion};

type ScopeGenerator<'a> = Generator<DeclId, ScopeId, StaticContext<'a>>;

/// Naming state of one compilation unit
#[derive(Debug)]
pub struct StaticContext<'a> {
    table: &'a SymbolTable,
    platform: &'a PlatformMap,
    config: NamingConfig,
    current_module: ModuleId,

    scopes: ScopeTree,
    root_package_scope: ScopeId,
    runtime_scope: ScopeId,
    external_scope: ScopeId,
    scope_generator: ScopeGenerator<'a>,
    scope_to_function: HashMap<ScopeId, DeclId>,

    names: HashMap<DeclId, SymbolicName>,
    backing_field_names: HashMap<DeclId, SymbolicName>,
    references: HashMap<DeclId, Rc<Reference>>,
    package_names: HashMap<CanonicalName, SymbolicName>,
    closures: HashMap<DeclId, Vec<DeclId>>,
}

impl<'a> StaticContext<'a> {
    /// Context with the default naming configuration and the shared platform map
    pub fn new(table: &'a SymbolTable, current_module: ModuleId) -> Self {
        Self::with_config(table, PlatformMap::global(), NamingConfig::default(), current_module)
    }

    pub fn with_config(
        table: &'a SymbolTable,
        platform: &'a PlatformMap,
        config: NamingConfig,
        current_module: ModuleId,
    ) -> Self {
        let mut scopes = ScopeTree::new();
        let root = scopes.root();
        let root_package_scope = scopes.inner_scope(root, ScopeKind::Object, "<root package>");
        let runtime_scope = scopes.inner_scope(root, ScopeKind::Object, config.runtime_global.clone());
        let external_scope = scopes.detached_scope(ScopeKind::Dynamic, "<external>");

        let mut scope_generator = ScopeGenerator::new();
        scope_generator.add_rule("callable", callable_scope);
        scope_generator.add_rule("class", class_scope);
        scope_generator.add_rule("derived-class", derived_class_scope);
        scope_generator.add_rule("package", package_scope);
        scope_generator.add_rule("member", member_scope);

        Self {
            table,
            platform,
            config,
            current_module,
            scopes,
            root_package_scope,
            runtime_scope,
            external_scope,
            scope_generator,
            scope_to_function: HashMap::new(),
            names: HashMap::new(),
            backing_field_names: HashMap::new(),
            references: HashMap::new(),
            package_names: HashMap::new(),
            closures: HashMap::new(),
        }
    }

    pub fn table(&self) -> &'a SymbolTable {
        self.table
    }

    pub fn platform(&self) -> &'a PlatformMap {
        self.platform
    }

    pub fn config(&self) -> &NamingConfig {
        &self.config
    }

    pub fn current_module(&self) -> ModuleId {
        self.current_module
    }

    pub fn scopes(&self) -> &ScopeTree {
        &self.scopes
    }

    pub fn root_scope(&self) -> ScopeId {
        self.scopes.root()
    }

    /// Scope holding the names of package objects
    pub fn root_package_scope(&self) -> ScopeId {
        self.root_package_scope
    }

    /// Scope holding the members of the runtime support object
    pub fn runtime_scope(&self) -> ScopeId {
        self.runtime_scope
    }

    /// Scope for identifiers the runtime resolves dynamically
    pub fn external_scope(&self) -> ScopeId {
        self.external_scope
    }

    /// Text of a name declared through this context
    pub fn text(&self, name: SymbolicName) -> &str {
        self.scopes.text(name)
    }

    fn scope_generator(&mut self) -> &mut ScopeGenerator<'a> {
        &mut self.scope_generator
    }

    /// Scope of `decl`'s body or members, created on first request
    pub fn scope_for(&mut self, decl: DeclId) -> Result<ScopeId, NamingError> {
        Generator::get(self, decl, Self::scope_generator).map_err(|err| match err {
            NamingError::NoApplicableRule { .. } => NamingError::NoApplicableRule {
                key: self.table.describe(decl),
            },
            other => other,
        })
    }

    /// Function scope of a callable, checked against the recorded association
    pub fn function_scope(&mut self, callable: DeclId) -> Result<ScopeId, NamingError> {
        let scope = self.scope_for(callable)?;
        match self.scope_to_function.get(&scope) {
            Some(&owner) if owner == callable => Ok(scope),
            Some(&owner) => Err(NamingError::Consistency(format!(
                "scope {:?} of {} is associated with {}",
                scope,
                self.table.describe(callable),
                self.table.describe(owner)
            ))),
            None => Err(NamingError::Consistency(format!(
                "{} has no function scope",
                self.table.describe(callable)
            ))),
        }
    }

    /// Access chain reaching `decl` from the top of the emitted program
    pub fn qualified_reference(&mut self, decl: DeclId) -> Result<Rc<Reference>, NamingError> {
        if let Some(reference) = self.references.get(&decl) {
            return Ok(Rc::clone(reference));
        }
        let reference = self.build_reference(decl)?;
        tracing::debug!(
            "Qualified {} as {}",
            self.table.describe(decl),
            reference.render(&self.scopes, &self.config)
        );
        self.references.insert(decl, Rc::clone(&reference));
        Ok(reference)
    }

    fn build_reference(&mut self, decl: DeclId) -> Result<Rc<Reference>, NamingError> {
        let table = self.table;
        let Some(suggestion) = suggest(table, decl)? else {
            return self.module_reference(table.module_of(decl)?);
        };

        let declaration = table.get(decl)?;
        let owner = table.get(suggestion.scope)?;
        let side_effect_free =
            declaration.is_callable() || matches!(declaration.kind, DeclKind::Package | DeclKind::Class);

        let (mut reference, names) = if let Some(object_name) = self.standard_object_name(decl) {
            let name = self.scopes.declare_name(self.runtime_scope, &object_name);
            (Some(Rc::new(Reference::RuntimeGlobal)), vec![name])
        } else if declaration.flags.library {
            (Some(Rc::new(Reference::RuntimeGlobal)), self.actual_names(&suggestion)?)
        } else if table.is_native(decl)? && !owner.flags.native {
            (None, self.actual_names(&suggestion)?)
        } else if owner.is_callable() && is_closure_member(table.get(suggestion.declaration)?) {
            // Locals are captured by the enclosing function's closure.
            (None, self.actual_names(&suggestion)?)
        } else {
            let qualifier = self.qualified_reference(suggestion.scope)?;
            (Some(qualifier), self.actual_names(&suggestion)?)
        };

        for name in names {
            reference = Some(Rc::new(Reference::member(name, reference, side_effect_free)));
        }
        reference.ok_or_else(|| {
            NamingError::Consistency(format!("empty name suggestion for {}", table.describe(decl)))
        })
    }

    fn module_reference(&self, module: ModuleId) -> Result<Rc<Reference>, NamingError> {
        if module == self.current_module {
            return Ok(Rc::new(Reference::RootPackage));
        }
        let info = self.table.module(module)?;
        let name = if info.is_builtins {
            self.config.builtins_module.clone()
        } else {
            info.display_name().to_string()
        };
        Ok(Rc::new(Reference::Module(name)))
    }

    fn standard_object_name(&self, decl: DeclId) -> Option<String> {
        let name = self.table.canonical_name(decl)?;
        self.config.standard_objects.get(name.as_str()).cloned()
    }

    /// Local identifier of `decl`: the first name its suggestion resolves to
    pub fn name_for(&mut self, decl: DeclId) -> Result<SymbolicName, NamingError> {
        if let Some(&name) = self.names.get(&decl) {
            return Ok(name);
        }
        let suggestion = self.require_suggestion(decl)?;
        let name = self
            .actual_names(&suggestion)?
            .first()
            .copied()
            .ok_or_else(|| {
                NamingError::Consistency(format!("empty name suggestion for {}", self.table.describe(decl)))
            })?;
        self.names.insert(decl, name);
        Ok(name)
    }

    /// Fresh identifier of the storage behind `property`, e.g. `size_0`
    pub fn backing_field_name_for(&mut self, property: DeclId) -> Result<SymbolicName, NamingError> {
        if let Some(&name) = self.backing_field_names.get(&property) {
            return Ok(name);
        }

        let table = self.table;
        let declaration = table.get(property)?;
        if declaration.kind != DeclKind::Property {
            return Err(NamingError::Consistency(format!(
                "backing field requested for {}",
                table.describe(property)
            )));
        }

        let suggestion = self.require_suggestion(property)?;
        let base = single_part(table, &suggestion)?;
        let scope = if declaration.flags.external {
            self.external_scope
        } else {
            self.scope_for(suggestion.scope)?
        };
        let name = self
            .scopes
            .declare_fresh_name(scope, &with_suffix(base, &self.config.private_suffix));
        tracing::debug!(
            "Backing field of {} named {}",
            table.describe(property),
            self.scopes.text(name)
        );
        self.backing_field_names.insert(property, name);
        Ok(name)
    }

    fn require_suggestion(&self, decl: DeclId) -> Result<NameSuggestion, NamingError> {
        suggest(self.table, decl)?.ok_or_else(|| NamingError::MissingNameSuggestion {
            declaration: self.table.describe(decl),
        })
    }

    /// Resolve every part of a suggestion to a name in the owner's scope
    fn actual_names(&mut self, suggestion: &NameSuggestion) -> Result<Vec<SymbolicName>, NamingError> {
        let table = self.table;
        let decl = suggestion.declaration;
        let scope = if table.get(decl)?.flags.external {
            self.external_scope
        } else {
            self.scope_for(suggestion.scope)?
        };

        if suggestion.stable {
            let mut names = Vec::with_capacity(suggestion.names.len());
            for part in &suggestion.names {
                names.push(self.scopes.declare_name(scope, part));
            }
            return Ok(names);
        }

        if let Some(&name) = self.names.get(&decl) {
            return Ok(vec![name]);
        }
        let base = single_part(table, suggestion)?;
        let name = if has_local_visibility(table, decl)? {
            self.scopes.declare_fresh_name(scope, base)
        } else {
            self.scopes
                .declare_fresh_name(scope, &with_suffix(base, &self.config.private_suffix))
        };
        tracing::debug!("Named {} as {}", table.describe(decl), self.scopes.text(name));
        self.names.insert(decl, name);
        Ok(vec![name])
    }

    /// Name of a package object, interned in the root package scope
    pub fn name_for_package(&mut self, package: &CanonicalName) -> SymbolicName {
        if let Some(&name) = self.package_names.get(package) {
            return name;
        }
        let text = package_object_name(package, &self.config.root_package);
        let name = self.scopes.declare_name(self.root_package_scope, &text);
        self.package_names.insert(package.clone(), name);
        name
    }

    /// Side-effect-free chain `_.a.b` reaching package `a.b`
    pub fn package_reference(&mut self, package: &CanonicalName) -> Rc<Reference> {
        let mut reference = Rc::new(Reference::RootPackage);
        let mut prefix = CanonicalName::root();
        for segment in package.segments() {
            prefix = prefix.child(segment);
            let name = self.name_for_package(&prefix);
            reference = Rc::new(Reference::member(name, Some(reference), true));
        }
        reference
    }

    /// Declare `text` in the scope enclosing `decl`, e.g. for a synthesized accessor
    pub fn declare_member_name(&mut self, decl: DeclId, text: &str, fresh: bool) -> Result<SymbolicName, NamingError> {
        let parent = self
            .table
            .parent(decl)?
            .ok_or_else(|| NamingError::MissingNameSuggestion {
                declaration: self.table.describe(decl),
            })?;
        let scope = self.scope_for(parent)?;
        Ok(if fresh {
            self.scopes.declare_fresh_name(scope, text)
        } else {
            self.scopes.declare_name(scope, text)
        })
    }

    /// Record the declarations captured by a local declaration; only the first write sticks
    pub fn record_closure(&mut self, decl: DeclId, captured: Vec<DeclId>) -> Result<(), NamingError> {
        match self.closures.entry(decl) {
            Entry::Occupied(_) => {
                let declaration = self.table.describe(decl);
                tracing::warn!("Rejected second closure record for {}", declaration);
                Err(NamingError::ClosureAlreadyRecorded { declaration })
            }
            Entry::Vacant(entry) => {
                tracing::debug!(
                    "Recorded closure of {} with {} captures",
                    self.table.describe(decl),
                    captured.len()
                );
                entry.insert(captured);
                Ok(())
            }
        }
    }

    /// Captured declarations of `decl`, or `None` if none were recorded
    pub fn closure_of(&self, decl: DeclId) -> Option<&[DeclId]> {
        self.closures.get(&decl).map(Vec::as_slice)
    }

    /// Like [`closure_of`](Self::closure_of), but a missing record is a consistency failure
    pub fn require_closure(&self, decl: DeclId) -> Result<&[DeclId], NamingError> {
        self.closure_of(decl)
            .ok_or_else(|| NamingError::ClosureNotRecorded {
                declaration: self.table.describe(decl),
            })
    }

    /// Host class corresponding to a built-in declaration
    pub fn host_class_for(&self, decl: DeclId) -> Option<&'a ClassIdentity> {
        let (table, platform) = (self.table, self.platform);
        table
            .canonical_name(decl)
            .and_then(|name| platform.to_host_class(name))
    }

    /// Built-in declaration corresponding to a host class
    pub fn source_declaration_for(&self, host: &ClassIdentity) -> Option<DeclId> {
        self.platform
            .to_source_type(host)
            .and_then(|name| self.table.find_by_canonical_name(name))
    }

    /// Counterpart of a collection declaration with the other mutability
    pub fn opposite_mutability(&self, decl: DeclId) -> Result<DeclId, NamingError> {
        Ok(self.platform.to_opposite_mutability(self.table, decl)?)
    }

    /// Render a reference as target-runtime source text
    pub fn render(&self, reference: &Reference) -> String {
        reference.render(&self.scopes, &self.config)
    }
}

fn is_closure_member(declaration: &Declaration) -> bool {
    declaration.is_callable() || matches!(declaration.kind, DeclKind::Property | DeclKind::Variable)
}

fn single_part<'s>(table: &SymbolTable, suggestion: &'s NameSuggestion) -> Result<&'s str, NamingError> {
    match suggestion.names.as_slice() {
        [part] => Ok(part),
        _ => Err(NamingError::Consistency(format!(
            "unstable name of {} must have exactly one part",
            table.describe(suggestion.declaration)
        ))),
    }
}

fn callable_scope(ctx: &mut StaticContext<'_>, decl: DeclId) -> Result<Option<ScopeId>, NamingError> {
    let table = ctx.table;
    if !table.get(decl)?.is_callable() {
        return Ok(None);
    }
    let root = ctx.scopes.root();
    let scope = ctx
        .scopes
        .inner_scope(root, ScopeKind::Function, table.describe(decl));
    if let Some(previous) = ctx.scope_to_function.insert(scope, decl) {
        return Err(NamingError::Consistency(format!(
            "function scope {:?} of {} was already associated with {}",
            scope,
            table.describe(decl),
            table.describe(previous)
        )));
    }
    Ok(Some(scope))
}

fn class_scope(ctx: &mut StaticContext<'_>, decl: DeclId) -> Result<Option<ScopeId>, NamingError> {
    let declaration = ctx.table.get(decl)?;
    if declaration.kind != DeclKind::Class || declaration.supertype.is_some() {
        return Ok(None);
    }
    let label = format!("class {}", declaration.name);
    let root = ctx.scopes.root();
    Ok(Some(ctx.scopes.inner_scope(root, ScopeKind::Object, label)))
}

fn derived_class_scope(ctx: &mut StaticContext<'_>, decl: DeclId) -> Result<Option<ScopeId>, NamingError> {
    let table = ctx.table;
    let declaration = table.get(decl)?;
    let (DeclKind::Class, Some(supertype)) = (declaration.kind, declaration.supertype) else {
        return Ok(None);
    };
    let parent = ctx.scope_for(supertype)?;
    let label = format!("class {}", declaration.name);
    Ok(Some(ctx.scopes.inner_scope(parent, ScopeKind::Object, label)))
}

fn package_scope(ctx: &mut StaticContext<'_>, decl: DeclId) -> Result<Option<ScopeId>, NamingError> {
    let declaration = ctx.table.get(decl)?;
    let root = ctx.scopes.root();
    match declaration.kind {
        DeclKind::Module => Ok(Some(root)),
        DeclKind::Package => {
            let label = format!("package {}", declaration.name);
            Ok(Some(ctx.scopes.inner_scope(root, ScopeKind::Object, label)))
        }
        _ => Ok(None),
    }
}

fn member_scope(ctx: &mut StaticContext<'_>, decl: DeclId) -> Result<Option<ScopeId>, NamingError> {
    match ctx.table.parent(decl)? {
        Some(parent) => ctx.scope_for(parent).map(Some),
        None => Ok(None),
    }
}
