//! Qualified references handed to the emitter
//!
//! A [`Reference`] is an access chain such as `_.p.A.B.f`: a root followed by member
//! links. Links are shared through [`Rc`] so that every reference qualified by the
//! same declaration points at the same qualifier instance.

use std::fmt::Write as _;
use std::rc::Rc;

use lodestar_core::NamingConfig;

use crate::scope::{ScopeTree, SymbolicName};

/// An access chain in the emitted program
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Root package object of the current module
    RootPackage,
    /// Root package object of another module, by module name
    Module(String),
    /// The runtime support object
    RuntimeGlobal,
    /// `qualifier.name`, or a free identifier when there is no qualifier
    Member {
        name: SymbolicName,
        qualifier: Option<Rc<Reference>>,
        /// Evaluating this link has no observable effect
        side_effect_free: bool,
    },
}

impl Reference {
    pub fn member(name: SymbolicName, qualifier: Option<Rc<Reference>>, side_effect_free: bool) -> Self {
        Reference::Member {
            name,
            qualifier,
            side_effect_free,
        }
    }

    /// Name of the last link, if it is a member
    pub fn name(&self) -> Option<SymbolicName> {
        match self {
            Reference::Member { name, .. } => Some(*name),
            _ => None,
        }
    }

    pub fn qualifier(&self) -> Option<&Rc<Reference>> {
        match self {
            Reference::Member { qualifier, .. } => qualifier.as_ref(),
            _ => None,
        }
    }

    /// Whether the emitter may duplicate or reorder this link
    ///
    /// Roots are always side-effect-free.
    pub fn is_side_effect_free(&self) -> bool {
        match self {
            Reference::Member {
                side_effect_free, ..
            } => *side_effect_free,
            Reference::RootPackage | Reference::Module(_) | Reference::RuntimeGlobal => true,
        }
    }

    /// Whether the chain starts at a free identifier rather than a root object
    pub fn is_unqualified(&self) -> bool {
        self.links().last().is_some_and(|link| {
            matches!(
                link,
                Reference::Member {
                    qualifier: None,
                    ..
                }
            )
        })
    }

    /// Links from this one outwards: the reference itself, its qualifier, and so on
    pub fn links(&self) -> Links<'_> {
        Links {
            next: Some(self),
        }
    }

    /// Number of member links in the chain
    pub fn depth(&self) -> usize {
        self.links()
            .filter(|link| matches!(link, Reference::Member { .. }))
            .count()
    }

    /// Render the chain as target-runtime source text
    pub fn render(&self, scopes: &ScopeTree, config: &NamingConfig) -> String {
        let mut links: Vec<&Reference> = self.links().collect();
        links.reverse();

        let mut out = String::new();
        for link in links {
            match link {
                Reference::RootPackage => out.push_str(&config.root_package),
                Reference::RuntimeGlobal => out.push_str(&config.runtime_global),
                Reference::Module(name) => {
                    let _ = write!(out, "{}.modules[\"{}\"]", config.runtime_global, name);
                }
                Reference::Member { name, .. } => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(scopes.text(*name));
                }
            }
        }
        out
    }
}

/// Iterator over the links of a [`Reference`], innermost first
pub struct Links<'a> {
    next: Option<&'a Reference>,
}

impl<'a> Iterator for Links<'a> {
    type Item = &'a Reference;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.qualifier().map(|q| q.as_ref());
        Some(current)
    }
}
