use thiserror::Error;

use crate::symbols::{DeclId, ModuleId};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Given declaration {declaration} is neither a mutable nor a read-only collection")]
    InvalidMutabilityKind { declaration: String },

    #[error("Built-in class not found in symbol table: {0}")]
    UnknownBuiltIn(String),

    #[error("Unknown declaration: {0:?}")]
    UnknownDeclaration(DeclId),

    #[error("Unknown module: {0:?}")]
    UnknownModule(ModuleId),

    #[error("Invalid declaration: {0}")]
    InvalidDeclaration(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
