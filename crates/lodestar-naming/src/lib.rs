//! Scopes, symbolic names and qualified references for the lodestar backend
//!
//! The entry point is [`StaticContext`], which owns the naming state of one
//! compilation unit. The remaining modules are its building blocks and can be used on
//! their own.

pub mod context;
pub mod error;
pub mod generator;
pub mod naming;
pub mod reference;
pub mod scope;
pub mod suggestion;

pub use context::StaticContext;
pub use error::{ErrorCategory, NamingError};
pub use generator::{Generator, RuleFn};
pub use reference::Reference;
pub use scope::{ScopeId, ScopeKind, ScopeTree, SymbolicName};
pub use suggestion::{suggest, NameSuggestion};
