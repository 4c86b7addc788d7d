//! Test fixtures for lodestar naming tests
//!
//! Provides small, hand-built symbol tables covering the shapes the naming layer
//! cares about, plus temporary configuration files.

use std::fs;
use std::path::{Path, PathBuf};

use lodestar_core::{CanonicalName, DeclId, DeclSpec, ModuleId, SymbolTable, Visibility};

/// `package p; class A { class B : A() { fun f() } }` in module `<main>`
pub struct Inheritance {
    pub table: SymbolTable,
    pub module: ModuleId,
    pub package: DeclId,
    pub a: DeclId,
    pub b: DeclId,
    pub f: DeclId,
}

pub fn inheritance() -> Inheritance {
    let mut table = SymbolTable::new();
    let module = table.add_module("<main>", false);
    let root = table.module_root(module).unwrap();
    let package = table.insert(DeclSpec::package("p").in_parent(root)).unwrap();
    let a = table.insert(DeclSpec::class("A").in_parent(package)).unwrap();
    let b = table
        .insert(DeclSpec::class("B").in_parent(a).extends(a))
        .unwrap();
    let f = table.insert(DeclSpec::function("f").in_parent(b)).unwrap();
    Inheritance {
        table,
        module,
        package,
        a,
        b,
        f,
    }
}

/// Three modules: built-ins, a library `<lib>` and the program `<main>`
///
/// ```text
/// <builtins>  kotlin.{Any, String}
///             kotlin.collections.{List, MutableList}
/// <lib>       util.Helper.help()
/// <main>      app.Counter : Any { count, private total, get count() }
///             app.Counter.increment() { local step; fun inner(); class Local() }
///             private app.Secret()
///             app.Console (native) { log() }
///             app.alert() (native)
///             app.Runtime (library)
///             app.window (external)
///             top() in the root package
/// ```
pub struct Program {
    pub table: SymbolTable,
    pub builtins: ModuleId,
    pub lib: ModuleId,
    pub main: ModuleId,

    pub any: DeclId,
    pub string: DeclId,
    pub list: DeclId,
    pub mutable_list: DeclId,

    pub helper: DeclId,
    pub help: DeclId,

    pub app: DeclId,
    pub counter: DeclId,
    pub count: DeclId,
    pub total: DeclId,
    pub count_getter: DeclId,
    pub increment: DeclId,
    pub step: DeclId,
    pub inner: DeclId,
    pub local: DeclId,
    pub local_init: DeclId,
    pub secret: DeclId,
    pub secret_init: DeclId,
    pub console: DeclId,
    pub log: DeclId,
    pub alert: DeclId,
    pub runtime: DeclId,
    pub window: DeclId,
    pub root_package: DeclId,
    pub top: DeclId,
}

pub fn program() -> Program {
    let mut table = SymbolTable::new();

    let builtins = table.add_module("<builtins>", true);
    let builtins_root = table.module_root(builtins).unwrap();
    let kotlin = table
        .insert(DeclSpec::package("kotlin").in_parent(builtins_root))
        .unwrap();
    let any = table.insert(DeclSpec::class("Any").in_parent(kotlin)).unwrap();
    let string = table
        .insert(DeclSpec::class("String").in_parent(kotlin).extends(any))
        .unwrap();
    let collections = table
        .insert(DeclSpec::package("kotlin.collections").in_parent(builtins_root))
        .unwrap();
    let list = table
        .insert(DeclSpec::class("List").in_parent(collections))
        .unwrap();
    let mutable_list = table
        .insert(DeclSpec::class("MutableList").in_parent(collections).extends(list))
        .unwrap();

    let lib = table.add_module("<lib>", false);
    let lib_root = table.module_root(lib).unwrap();
    let util = table.insert(DeclSpec::package("util").in_parent(lib_root)).unwrap();
    let helper = table.insert(DeclSpec::class("Helper").in_parent(util)).unwrap();
    let help = table.insert(DeclSpec::function("help").in_parent(helper)).unwrap();

    let main = table.add_module("<main>", false);
    let main_root = table.module_root(main).unwrap();
    let app = table.insert(DeclSpec::package("app").in_parent(main_root)).unwrap();
    let counter = table
        .insert(DeclSpec::class("Counter").in_parent(app).extends(any))
        .unwrap();
    let count = table
        .insert(DeclSpec::property("count").in_parent(counter))
        .unwrap();
    let total = table
        .insert(
            DeclSpec::property("total")
                .in_parent(counter)
                .with_visibility(Visibility::Private),
        )
        .unwrap();
    let count_getter = table
        .insert(DeclSpec::accessor(count, false).in_parent(count))
        .unwrap();
    let increment = table
        .insert(DeclSpec::function("increment").in_parent(counter))
        .unwrap();
    let step = table
        .insert(DeclSpec::variable("step").in_parent(increment))
        .unwrap();
    let inner = table
        .insert(DeclSpec::function("inner").in_parent(increment))
        .unwrap();
    let local = table
        .insert(DeclSpec::class("Local").in_parent(increment))
        .unwrap();
    let local_init = table
        .insert(DeclSpec::constructor("<init>").in_parent(local))
        .unwrap();
    let secret = table
        .insert(
            DeclSpec::class("Secret")
                .in_parent(app)
                .with_visibility(Visibility::Private),
        )
        .unwrap();
    let secret_init = table
        .insert(DeclSpec::constructor("<init>").in_parent(secret))
        .unwrap();
    let console = table
        .insert(DeclSpec::class("Console").in_parent(app).native())
        .unwrap();
    let log = table.insert(DeclSpec::function("log").in_parent(console)).unwrap();
    let alert = table
        .insert(DeclSpec::function("alert").in_parent(app).native())
        .unwrap();
    let runtime = table
        .insert(DeclSpec::class("Runtime").in_parent(app).library())
        .unwrap();
    let window = table
        .insert(DeclSpec::property("window").in_parent(app).external())
        .unwrap();
    let root_package = table.insert(DeclSpec::package("").in_parent(main_root)).unwrap();
    let top = table
        .insert(DeclSpec::function("top").in_parent(root_package))
        .unwrap();

    Program {
        table,
        builtins,
        lib,
        main,
        any,
        string,
        list,
        mutable_list,
        helper,
        help,
        app,
        counter,
        count,
        total,
        count_getter,
        increment,
        step,
        inner,
        local,
        local_init,
        secret,
        secret_init,
        console,
        log,
        alert,
        runtime,
        window,
        root_package,
        top,
    }
}

/// Look up a declaration that must exist
pub fn decl(table: &SymbolTable, fq_name: &str) -> DeclId {
    table
        .find_by_canonical_name(&CanonicalName::from(fq_name))
        .unwrap_or_else(|| panic!("fixture has no declaration {}", fq_name))
}

/// A configuration file in a temporary directory, removed on drop
pub struct ConfigFile {
    _dir: tempfile::TempDir,
    path: PathBuf,
}

impl ConfigFile {
    pub fn write(contents: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lodestar.toml");
        fs::write(&path, contents).unwrap();
        Self { _dir: dir, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
