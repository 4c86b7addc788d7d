//! Symbol identities and platform correspondences for the lodestar backend

pub mod canonical;
pub mod config;
pub mod error;
pub mod platform;
pub mod symbols;

pub use canonical::{CanonicalName, CanonicalNameError, ClassIdentity};
pub use config::{LodestarConfig, NamingConfig, PlatformConfig};
pub use error::CoreError;
pub use platform::PlatformMap;
pub use symbols::{DeclFlags, DeclId, DeclKind, DeclSpec, Declaration, ModuleId, ModuleInfo, SymbolTable, Visibility};
